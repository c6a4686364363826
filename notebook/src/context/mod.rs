mod aggregator;

pub use aggregator::{AggregatedContext, ContextAggregator};
