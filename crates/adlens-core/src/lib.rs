//! Aggregation engine for the marketing dashboard: turns per-campaign
//! breakdown records into grouped totals and derived rates per view.

pub mod config;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod rates;
pub mod table;
pub mod views;

pub use dataset::Dataset;
pub use error::{CoreError, CoreResult};
pub use metrics::{accumulate, BaseMetrics, MetricSource};
pub use rates::Rates;
pub use views::{aggregate_view, AggregationOptions, View, ViewModel};
