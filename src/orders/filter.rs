//! Month window classification

use super::model::Order;
use crate::error::{Error, Result};
use chrono::{Datelike, FixedOffset, NaiveDate};

/// Where an order falls relative to the target month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// Delivered and placed inside the target month.
    InScope,
    /// Placed in the month before the target, any status.
    Boundary,
    Irrelevant,
}

/// A calendar month (0-indexed) and year, evaluated at a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub month: u32,
    pub year: i32,
    pub offset: FixedOffset,
}

impl MonthWindow {
    pub fn new(month: u32, year: i32, offset: FixedOffset) -> Result<Self> {
        if month > 11 {
            return Err(Error::InvalidMonth(month));
        }
        Ok(Self {
            month,
            year,
            offset,
        })
    }

    /// Resolve the year for `target_month` as seen on `today`.
    ///
    /// Only the current and earlier months are offered, so a target month
    /// numerically after today's month belongs to last year.
    pub fn resolve(target_month: u32, today: NaiveDate, offset: FixedOffset) -> Result<Self> {
        let year = if target_month > today.month0() {
            today.year() - 1
        } else {
            today.year()
        };
        Self::new(target_month, year, offset)
    }

    /// The month immediately before this one, wrapping January to December.
    pub fn previous(&self) -> (u32, i32) {
        if self.month == 0 {
            (11, self.year - 1)
        } else {
            (self.month - 1, self.year)
        }
    }

    /// First day of the window, for titles and calendars.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
    }

    /// `October 2026`
    pub fn label(&self) -> String {
        match self.first_day() {
            Some(first) => first.format("%B %Y").to_string(),
            None => format!("{:02}/{}", self.month + 1, self.year),
        }
    }

    pub fn classify(&self, order: &Order) -> OrderScope {
        let Some(placed) = order.placed_at(self.offset) else {
            return OrderScope::Irrelevant;
        };
        let placed = (placed.month0(), placed.year());

        if placed == (self.month, self.year) && order.is_delivered() {
            OrderScope::InScope
        } else if placed == self.previous() {
            OrderScope::Boundary
        } else {
            OrderScope::Irrelevant
        }
    }
}

/// Orders of one page split by scope.
#[derive(Debug, Default)]
pub struct PageSplit<'a> {
    pub in_scope: Vec<&'a Order>,
    pub boundary: usize,
}

impl PageSplit<'_> {
    pub fn has_boundary(&self) -> bool {
        self.boundary > 0
    }
}

/// Classify every order of a page.
pub fn split_page<'a>(window: &MonthWindow, orders: &'a [Order]) -> PageSplit<'a> {
    orders
        .iter()
        .fold(PageSplit::default(), |mut split, order| {
            match window.classify(order) {
                OrderScope::InScope => split.in_scope.push(order),
                OrderScope::Boundary => split.boundary += 1,
                OrderScope::Irrelevant => {}
            }
            split
        })
}
