// Wrapper Components - Stage 6: Component Library
// MeteredIndex decorates any OrderedIndex with per-operation timing so the
// two index structures can be compared on identical workloads. Wrapping is
// transparent: the wrapper implements the same traits as the inner index.

use anyhow::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::contracts::{IndexEntry, OrderedIndex, RangeScan};
use crate::observability::{record_metric, MetricType};
use crate::types::{ValidatedFileName, ValidatedPath};

/// Index wrapper that records operation timings
pub struct MeteredIndex<I: OrderedIndex> {
    inner: I,
    name: String,
    operation_timings: Arc<Mutex<HashMap<String, Vec<Duration>>>>,
}

impl<I: OrderedIndex> MeteredIndex<I> {
    /// Create a new metered index
    pub fn new(inner: I, name: String) -> Self {
        Self {
            inner,
            name,
            operation_timings: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Access the wrapped index
    pub fn inner(&self) -> &I {
        &self.inner
    }

    /// Name the index was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record operation timing
    fn record_timing(&self, operation: &str, duration: Duration) {
        let mut timings = self.operation_timings.lock();
        timings
            .entry(operation.to_string())
            .or_default()
            .push(duration);

        debug!(
            index = %self.name,
            operation,
            elapsed_us = duration.as_micros() as u64,
            "index operation timed"
        );
        record_metric(MetricType::Histogram {
            name: "index.operation.duration",
            value: duration.as_millis() as f64,
            unit: "ms",
        });
    }

    /// Get timing statistics as (min, avg, max) per operation
    pub fn timing_stats(&self) -> HashMap<String, (Duration, Duration, Duration)> {
        let timings = self.operation_timings.lock();
        let mut stats = HashMap::new();

        for (op, durations) in timings.iter() {
            if !durations.is_empty() {
                let sum: Duration = durations.iter().sum();
                let avg = sum / durations.len() as u32;
                let min = *durations.iter().min().expect("durations is non-empty");
                let max = *durations.iter().max().expect("durations is non-empty");
                stats.insert(op.clone(), (min, avg, max));
            }
        }

        stats
    }

    /// Number of timed calls per operation
    pub fn operation_counts(&self) -> HashMap<String, usize> {
        let timings = self.operation_timings.lock();
        timings
            .iter()
            .map(|(op, durations)| (op.clone(), durations.len()))
            .collect()
    }
}

impl<I: OrderedIndex> OrderedIndex for MeteredIndex<I> {
    fn insert(&mut self, key: ValidatedFileName, value: ValidatedPath) -> Result<()> {
        let start = Instant::now();
        let result = self.inner.insert(key, value);
        self.record_timing("insert", start.elapsed());
        result
    }

    fn search(&self, key: &ValidatedFileName) -> Result<Option<ValidatedPath>> {
        let start = Instant::now();
        let result = self.inner.search(key);
        self.record_timing("search", start.elapsed());
        result
    }

    fn delete(&mut self, key: &ValidatedFileName) -> Result<bool> {
        let start = Instant::now();
        let result = self.inner.delete(key);
        self.record_timing("delete", start.elapsed());
        result
    }

    fn list_all(&self) -> Result<Vec<IndexEntry>> {
        let start = Instant::now();
        let result = self.inner.list_all();
        self.record_timing("list_all", start.elapsed());
        result
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn index_type(&self) -> &str {
        self.inner.index_type()
    }
}

impl<I: RangeScan> RangeScan for MeteredIndex<I> {
    fn range_query(
        &self,
        start_key: &ValidatedFileName,
        end_key: &ValidatedFileName,
    ) -> Result<Vec<IndexEntry>> {
        let start = Instant::now();
        let result = self.inner.range_query(start_key, end_key);
        self.record_timing("range_query", start.elapsed());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balanced_index::BalancedIndex;
    use crate::multiway_index::MultiwayIndex;
    use crate::types::ValidatedDegree;

    fn name(s: &str) -> ValidatedFileName {
        ValidatedFileName::new(s).expect("test filename should be valid")
    }

    fn path(s: &str) -> ValidatedPath {
        ValidatedPath::new(s).expect("test path should be valid")
    }

    #[test]
    fn test_wrapper_is_transparent() -> Result<()> {
        let mut index = MeteredIndex::new(BalancedIndex::new(), "balanced".to_string());
        index.insert(name("a.txt"), path("/a.txt"))?;

        assert_eq!(index.search(&name("a.txt"))?, Some(path("/a.txt")));
        assert_eq!(index.len(), 1);
        assert_eq!(index.index_type(), "balanced");
        assert_eq!(index.name(), "balanced");
        Ok(())
    }

    #[test]
    fn test_timings_are_collected() -> Result<()> {
        let mut index = MeteredIndex::new(BalancedIndex::new(), "balanced".to_string());
        for i in 0..10 {
            index.insert(name(&format!("f{i}.txt")), path(&format!("/{i}")))?;
        }
        index.search(&name("f3.txt"))?;

        let counts = index.operation_counts();
        assert_eq!(counts.get("insert"), Some(&10));
        assert_eq!(counts.get("search"), Some(&1));

        let stats = index.timing_stats();
        let (min, avg, max) = stats["insert"];
        assert!(min <= avg && avg <= max);
        Ok(())
    }

    #[test]
    fn test_range_query_passes_through() -> Result<()> {
        let degree = ValidatedDegree::new(3).expect("valid degree");
        let mut index = MeteredIndex::new(MultiwayIndex::new(degree), "multiway".to_string());
        for n in ["a", "b", "c", "d"] {
            index.insert(name(&format!("{n}.rs")), path(&format!("/{n}")))?;
        }

        let found = index.range_query(&name("b.rs"), &name("c.rs"))?;
        assert_eq!(found.len(), 2);
        assert_eq!(index.operation_counts().get("range_query"), Some(&1));
        Ok(())
    }
}
