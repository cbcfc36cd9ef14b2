//! CLI argument structures
//!
//! This module defines the command-line interface of `order-digest`: the
//! top-level [`Cli`] parser and one subcommand per way of looking at a month.

use crate::auth::SessionArtifacts;
use crate::config::SessionConfig;
use crate::report::{ReportFormat, SortDirection, SortKey};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Summarize what you ordered in a month
#[derive(Parser)]
#[command(name = "order-digest")]
#[command(about = "order-digest - Monthly summaries of your delivered orders", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate the products ordered in a month and print them
    #[command(name = "summary")]
    Summary {
        #[command(flatten)]
        month: MonthArgs,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,

        /// Column to sort by
        #[arg(short = 's', long, value_enum, default_value_t = SortKey::Name)]
        sort: SortKey,

        /// Sort in descending order
        #[arg(long)]
        desc: bool,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// List the products ordered on each day of a month
    #[command(name = "calendar")]
    Calendar {
        #[command(flatten)]
        month: MonthArgs,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Print the signed headers for one page request without sending it
    #[command(name = "sign")]
    Sign {
        /// Page number to sign
        #[arg(short = 'p', long, default_value = "1")]
        page: u32,

        /// Request id to sign with (random when omitted)
        #[arg(long, value_name = "ID")]
        request_id: Option<String>,

        /// Print the unsigned header variant instead
        #[arg(long)]
        unsigned: bool,

        #[command(flatten)]
        session: SessionArgs,
    },
}

/// Month selection shared by the aggregating commands.
#[derive(Args, Debug, Clone, Default)]
pub struct MonthArgs {
    /// Calendar month, 1-12 (defaults to the current month)
    #[arg(
        short = 'm',
        long,
        value_parser = clap::value_parser!(u32).range(1..=12),
        conflicts_with = "previous"
    )]
    pub month: Option<u32>,

    /// Use the month before the current one
    #[arg(long)]
    pub previous: bool,
}

impl MonthArgs {
    /// Zero-based target month relative to `current` (also zero-based).
    pub fn target_month(&self, current: u32) -> u32 {
        match (self.month, self.previous) {
            (Some(month), _) => month - 1,
            (None, true) => (current + 11) % 12,
            (None, false) => current,
        }
    }
}

/// Session cookie values supplied on the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Value of the `device_id` cookie
    #[arg(long, value_name = "ID")]
    pub device_id: Option<String>,

    /// Value of the `XSRF-TOKEN` cookie (percent-encoded as stored)
    #[arg(long, value_name = "TOKEN")]
    pub xsrf_token: Option<String>,

    /// Value of the `csrfSecret` cookie
    #[arg(long, value_name = "SECRET")]
    pub csrf_secret: Option<String>,

    /// Raw `Cookie` header copied from the browser
    #[arg(long, value_name = "HEADER")]
    pub cookie: Option<String>,
}

impl SessionArgs {
    /// Explicit flags win over values parsed from `--cookie`.
    pub fn artifacts(&self) -> SessionArtifacts {
        SessionConfig {
            device_id: self.device_id.clone(),
            xsrf_token: self.xsrf_token.clone(),
            csrf_secret: self.csrf_secret.clone(),
            cookie: self.cookie.clone(),
        }
        .artifacts()
    }
}

pub fn sort_direction(desc: bool) -> SortDirection {
    if desc {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    }
}
