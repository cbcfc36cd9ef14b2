//! Command routing and execution
//!
//! This module handles routing CLI commands to their respective implementations.

use crate::auth::{order_page_path, AuthHeaders, RequestId, SessionArtifacts, SignatureDeriver};
use crate::cli::args::{sort_direction, Commands, MonthArgs, SessionArgs};
use crate::config::{ApiConfig, Config};
use crate::report::{MonthlyReport, ReportFormat, ReportFormatter, SortDirection, SortKey};
use crate::service::OrderDigest;
use anyhow::{Context, Result};
use chrono::Datelike;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Execute a CLI command against the loaded configuration
pub async fn execute_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Summary {
            month,
            format,
            sort,
            desc,
            session,
        } => {
            let digest = connect(&config, &session)?;
            let output = run_summary(&digest, &month, format, sort, sort_direction(desc)).await?;
            print!("{output}");
        }
        Commands::Calendar { month, session } => {
            let digest = connect(&config, &session)?;
            let output = run_calendar(&digest, &month).await?;
            print!("{output}");
        }
        Commands::Sign {
            page,
            request_id,
            unsigned,
            session,
        } => {
            let session = resolve_session(&config, &session);
            print!(
                "{}",
                render_signed_request(&config.api, &session, page, request_id, unsigned)
            );
        }
    }

    Ok(())
}

/// Run one aggregation and format it as a monthly report.
pub async fn run_summary(
    digest: &OrderDigest,
    month: &MonthArgs,
    format: ReportFormat,
    sort: SortKey,
    direction: SortDirection,
) -> Result<String> {
    let report = build_report(digest, month, sort, direction).await?;
    Ok(ReportFormatter::new(format).format(&report)?)
}

/// Run one aggregation and list the products per day.
pub async fn run_calendar(digest: &OrderDigest, month: &MonthArgs) -> Result<String> {
    let report = build_report(digest, month, SortKey::Name, SortDirection::Ascending).await?;
    Ok(ReportFormatter::new(ReportFormat::Text).format_calendar(&report))
}

/// Request line and headers for one page, one per line.
pub fn render_signed_request(
    api: &ApiConfig,
    session: &SessionArtifacts,
    page: u32,
    request_id: Option<String>,
    unsigned: bool,
) -> String {
    let deriver = SignatureDeriver::new(api.extension_id.clone());
    let headers = if unsigned {
        AuthHeaders::unsigned(deriver.extension_id())
    } else {
        let request_id = request_id
            .map(RequestId::from)
            .unwrap_or_else(RequestId::generate);
        let ctx = deriver.derive(session, request_id, page);
        deriver.headers(session, &ctx)
    };

    let mut output = format!("GET {}\n", order_page_path(page));
    for (name, value) in headers.iter() {
        output.push_str(&format!("{name}: {value}\n"));
    }
    output
}

async fn build_report(
    digest: &OrderDigest,
    month: &MonthArgs,
    sort: SortKey,
    direction: SortDirection,
) -> Result<MonthlyReport> {
    let target = month.target_month(digest.today().month0());
    let window = digest.window(target)?;

    let outcome = digest
        .run(target)
        .await
        .with_context(|| format!("Failed to aggregate orders for {}", window.label()))?;
    info!(
        "Fetched {} page(s) with {} order(s) for {}",
        outcome.pages_fetched,
        outcome.orders_seen,
        window.label()
    );
    if outcome.skipped_orders > 0 {
        warn!("{} malformed order(s) were skipped", outcome.skipped_orders);
    }

    Ok(MonthlyReport::new(window, outcome.products, sort, direction))
}

fn resolve_session(config: &Config, flags: &SessionArgs) -> SessionArtifacts {
    let session = flags.artifacts().or(config.session.artifacts());
    debug!("Session: {}", session.describe());
    session
}

/// Build the service and cancel its current run on Ctrl-C.
fn connect(config: &Config, flags: &SessionArgs) -> Result<Arc<OrderDigest>> {
    let session = resolve_session(config, flags);
    if session.is_empty() {
        warn!("No session cookies configured; the order history API will reject the request");
    }

    let digest = Arc::new(OrderDigest::connect(&config.api, session)?);

    let handle = Arc::clone(&digest);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling the current run");
            handle.cancel();
        }
    });

    Ok(digest)
}
