// Filedex - Ordered Filename Indexing
// Root library module

pub mod observability;
pub mod contracts;
pub mod validation;
pub mod pure;
pub mod types;
pub mod builders;
pub mod wrappers;
pub mod balanced_index;
pub mod multiway_index;

// Re-export key types
pub use observability::{
    init_logging,
    init_logging_with_level,
    log_operation,
    record_metric,
    with_trace_id,
    MetricType,
    Operation,
    OperationContext,
};

pub use contracts::{IndexEntry, OrderedIndex, RangeScan};

// Re-export validated types
pub use types::{ValidatedDegree, ValidatedFileName, ValidatedPath, ValidatedTimestamp};

// Re-export builders
pub use builders::{EntryBuilder, IndexConfigBuilder};

// Re-export wrappers
pub use wrappers::MeteredIndex;

// Re-export index implementations and factories
pub use balanced_index::{create_balanced_index, BalancedIndex};
pub use multiway_index::{create_multiway_index, MultiwayIndex};
