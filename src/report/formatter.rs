//! Output formatting for monthly reports
//!
//! This module renders a [`MonthlyReport`] in the formats the CLI offers.

use super::MonthlyReport;
use crate::error::Result;

const EMPTY_MESSAGE: &str = "No orders to display for the selected month.";

/// Format type for output presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// Plain text table
    #[default]
    Text,
    /// JSON format
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Markdown table format
    Markdown,
    /// CSV format
    Csv,
}

/// Output formatter for monthly reports
pub struct ReportFormatter {
    format: ReportFormat,
}

impl ReportFormatter {
    /// Create a new formatter with the specified format type
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format the report according to the configured format type
    pub fn format(&self, report: &MonthlyReport) -> Result<String> {
        match self.format {
            ReportFormat::Text => Ok(self.format_text(report)),
            ReportFormat::Json => Ok(serde_json::to_string(report)?),
            ReportFormat::JsonPretty => Ok(serde_json::to_string_pretty(report)?),
            ReportFormat::Markdown => Ok(self.format_markdown(report)),
            ReportFormat::Csv => self.format_csv(report),
        }
    }

    /// Day-by-day listing of what was ordered
    pub fn format_calendar(&self, report: &MonthlyReport) -> String {
        let mut output = format!("{}\n", report.title);
        let calendar = report.calendar();

        if calendar.is_empty() {
            output.push_str(EMPTY_MESSAGE);
            output.push('\n');
            return output;
        }

        for (day, names) in calendar {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            output.push_str(&format!("{}  {}\n", day.format("%a %d"), names.join(", ")));
        }

        output
    }

    /// Format as plain text
    fn format_text(&self, report: &MonthlyReport) -> String {
        let mut output = format!("{}\n", report.title);

        if report.is_empty() {
            output.push_str(EMPTY_MESSAGE);
            output.push('\n');
            return output;
        }

        let width = report
            .rows
            .iter()
            .map(|row| row.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Product".len());

        output.push_str(&format!("{:<width$}  {:>5}  Dates\n", "Product", "Count"));
        for row in &report.rows {
            output.push_str(&format!(
                "{:<width$}  {:>5}  {}\n",
                row.name,
                row.count,
                join_days(&row.days)
            ));
        }
        output.push_str(&format!(
            "\n{} product(s), {} item(s)\n",
            report.rows.len(),
            report.total_items()
        ));

        output
    }

    /// Format as Markdown table
    fn format_markdown(&self, report: &MonthlyReport) -> String {
        let mut output = format!("## {}\n\n", report.title);

        if report.is_empty() {
            output.push_str(EMPTY_MESSAGE);
            output.push('\n');
            return output;
        }

        output.push_str("| Product | Count | Dates |\n");
        output.push_str("|---------|-------|-------|\n");
        for row in &report.rows {
            output.push_str(&format!(
                "| {} | {} | {} |\n",
                row.name.replace('|', "\\|"),
                row.count,
                join_days(&row.days)
            ));
        }

        output
    }

    /// Format as CSV
    fn format_csv(&self, report: &MonthlyReport) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["name", "count", "days", "image_url"])?;

        for row in &report.rows {
            let count = row.count.to_string();
            let days = join_days(&row.days);
            writer.write_record([
                row.name.as_str(),
                count.as_str(),
                days.as_str(),
                row.image_url.as_str(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn join_days(days: &[u32]) -> String {
    days.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
