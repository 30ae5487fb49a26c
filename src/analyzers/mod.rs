//! Aggregation stage of the dashboard.
//!
//! Every function here is a pure computation over a [`FilteredView`]:
//! summary statistics, monthly resampling, rolling means, time-of-day and
//! rain groupings, correlations, distributions and trend lines. An empty
//! view yields empty or missing results, never a panic.
//!
//! [`FilteredView`]: crate::filter::FilteredView

pub mod aggregate;
pub mod correlation;
pub mod distribution;
pub mod grouping;
pub mod summary;
pub mod trend;
pub mod types;
pub mod utility;
