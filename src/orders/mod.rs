//! Order history aggregation
//!
//! - `model` - wire records and the aggregate entry type
//! - `filter` - target month window and order classification
//! - `aggregator` - per-product accumulation
//! - `controller` - the pagination state machine

pub mod aggregator;
pub mod controller;
pub mod filter;
pub mod model;

pub use aggregator::Aggregator;
pub use controller::{
    AggregationOutcome, CancelFlag, ControllerSettings, PaginationController,
};
pub use filter::{split_page, MonthWindow, OrderScope};
pub use model::{AggregatedProduct, Order, OrderPage, ProductLineItem};
