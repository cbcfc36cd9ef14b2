//! Presentation helpers for a finished aggregate
//!
//! The engine hands back an unordered list. Everything about ordering,
//! de-duplicating dates and grouping by day lives here.

pub mod formatter;

pub use formatter::{ReportFormat, ReportFormatter};

use crate::orders::model::parse_timestamp;
use crate::orders::{AggregatedProduct, MonthWindow};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortKey {
    #[default]
    Name,
    Count,
    Dates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// One row of the summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub name: String,
    pub count: u64,
    pub image_url: String,
    /// Distinct days of the month the product was ordered on, ascending.
    pub days: Vec<u32>,
    pub order_dates: Vec<String>,
}

/// A sorted, presentation-ready monthly summary.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub title: String,
    pub month: u32,
    pub year: i32,
    pub rows: Vec<ReportRow>,
    #[serde(skip)]
    window: MonthWindow,
}

impl MonthlyReport {
    pub fn new(
        window: MonthWindow,
        products: Vec<AggregatedProduct>,
        key: SortKey,
        direction: SortDirection,
    ) -> Self {
        let mut rows: Vec<ReportRow> = products
            .into_iter()
            .map(|product| ReportRow {
                days: order_days(&product, &window),
                name: product.name,
                count: product.count,
                image_url: product.image_url,
                order_dates: product.order_dates,
            })
            .collect();
        sort_rows(&mut rows, key, direction);

        Self {
            title: title(&window),
            month: window.month,
            year: window.year,
            rows,
            window,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_items(&self) -> u64 {
        self.rows
            .iter()
            .fold(0u64, |total, row| total.saturating_add(row.count))
    }

    /// Product names ordered on each day of the month.
    pub fn calendar(&self) -> BTreeMap<NaiveDate, BTreeSet<String>> {
        let mut days: BTreeMap<NaiveDate, BTreeSet<String>> = BTreeMap::new();

        for row in &self.rows {
            for raw in &row.order_dates {
                if let Some(placed) = parse_timestamp(raw, self.window.offset) {
                    days.entry(placed.date())
                        .or_default()
                        .insert(row.name.clone());
                }
            }
        }

        days
    }
}

/// `Summary for October, 2026`
pub fn title(window: &MonthWindow) -> String {
    match window.first_day() {
        Some(first) => format!("Summary for {}, {}", first.format("%B"), window.year),
        None => format!("Summary for {:02}/{}", window.month + 1, window.year),
    }
}

/// Distinct days of the month a product was ordered on, ascending.
pub fn order_days(product: &AggregatedProduct, window: &MonthWindow) -> Vec<u32> {
    product
        .order_dates
        .iter()
        .filter_map(|raw| parse_timestamp(raw, window.offset))
        .map(|placed| placed.day())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn sort_rows(rows: &mut [ReportRow], key: SortKey, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Name => compare_names(&a.name, &b.name),
            SortKey::Count => a.count.cmp(&b.count),
            SortKey::Dates => a.days.cmp(&b.days),
        }
        .then_with(|| compare_names(&a.name, &b.name));

        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
