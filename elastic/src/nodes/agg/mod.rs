mod date_histogram;
mod filter;
mod histogram;
mod metric;
mod range;
mod terms;
mod time_zone;

pub use date_histogram::DateHistogram;
pub use filter::Filter;
pub use histogram::Histogram;
pub use metric::{Metric, MetricKind};
pub use range::{Range, RangeEntry};
pub use terms::Terms;
pub use time_zone::TimeZone;
