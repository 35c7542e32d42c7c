mod charts;
pub mod format;
mod stats;
mod tables;

pub use charts::{Chart, ChartBuilder, ChartKind, ChartSeries, ChartSpec, Point, Source, Transform};
pub use stats::{
    ContinuousStats, CounterStats, NetworkStats, continuous_stats, counter_stats, max_count,
    mean_range, network_stats,
};
pub use tables::{Cell, Row, Table, TableBuilder, TableKind};
