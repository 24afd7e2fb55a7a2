//! Per-subschema instrumentation collected while generating test vectors
//! (spec §4.6). Purely additive bookkeeping: nothing here ever changes the
//! instance set the generator emits, only what gets reported afterwards.
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TelemetryEntry {
    pub pointer: String,
    pub invocations: u64,
    pub instances_produced: u64,
    pub cumulative_time: Duration,
}

#[derive(Debug, Default, Clone)]
struct Counters {
    invocations: u64,
    instances_produced: u64,
    cumulative_time: Duration,
}

/// Interior-mutable counters keyed by schema pointer. `record` is called by
/// the composition engine each time it finishes composing candidates for a
/// node; collection is a no-op unless `GenerationConfig::collect_telemetry`
/// is set, since walking the map on every call would otherwise tax runs that
/// never read the report.
#[derive(Debug, Default, Clone)]
pub struct Telemetry {
    counters: RefCell<HashMap<String, Counters>>,
}

impl Telemetry {
    pub fn new() -> Self {
        Telemetry {
            counters: RefCell::new(HashMap::new()),
        }
    }

    pub(crate) fn record(&self, pointer: &str, instances_produced: usize, elapsed: Duration) {
        let mut counters = self.counters.borrow_mut();
        let entry = counters.entry(pointer.to_string()).or_default();
        entry.invocations += 1;
        entry.instances_produced += instances_produced as u64;
        entry.cumulative_time += elapsed;
    }

    /// A snapshot of the counters so far, sorted by cumulative time spent
    /// composing candidates for that node, descending (the busiest
    /// subschemas first).
    pub fn report(&self) -> Vec<TelemetryEntry> {
        let mut entries: Vec<TelemetryEntry> = self
            .counters
            .borrow()
            .iter()
            .map(|(pointer, counters)| TelemetryEntry {
                pointer: pointer.clone(),
                invocations: counters.invocations,
                instances_produced: counters.instances_produced,
                cumulative_time: counters.cumulative_time,
            })
            .collect();
        entries.sort_by(|a, b| b.cumulative_time.cmp(&a.cumulative_time));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_is_sorted_by_cumulative_time_descending() {
        let telemetry = Telemetry::new();
        telemetry.record("#/a", 3, Duration::from_micros(10));
        telemetry.record("#/b", 1, Duration::from_micros(50));
        telemetry.record("#/a", 2, Duration::from_micros(10));
        let report = telemetry.report();
        assert_eq!(report[0].pointer, "#/b");
        assert_eq!(report[1].pointer, "#/a");
        assert_eq!(report[1].invocations, 2);
        assert_eq!(report[1].instances_produced, 5);
    }
}
