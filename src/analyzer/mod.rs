// Aggregation layer: pure functions over normalized rows, no I/O.

pub mod correlation;
pub mod pivot;
pub mod ranking;
pub mod stats;

pub use correlation::{correlation_matrix, pearson, CorrelationMatrix};
pub use pivot::{pivot, Aggregation, PivotTable};
pub use ranking::{count_by, distinct_count, top_n};
pub use stats::{describe, summary_stats, GroupStats};
