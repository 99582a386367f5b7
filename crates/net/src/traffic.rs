use std::collections::HashMap;
use std::fmt;

use core_types::ProductId;

use crate::FetchResult;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Traffic {
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl Traffic {
    fn add(self, other: Traffic) -> Traffic {
        Traffic {
            bytes_in: self.bytes_in.saturating_add(other.bytes_in),
            bytes_out: self.bytes_out.saturating_add(other.bytes_out),
        }
    }

    fn is_zero(self) -> bool {
        self.bytes_in == 0 && self.bytes_out == 0
    }
}

/// Running total for one product after a completion, plus what that
/// completion added.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrafficReport {
    pub product: ProductId,
    pub total: Traffic,
    pub delta: Traffic,
}

impl fmt::Display for TrafficReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "📡 product {} ↑ {} B ↓ {} B (Δ ↑ {} ↓ {})",
            self.product,
            self.total.bytes_out,
            self.total.bytes_in,
            self.delta.bytes_out,
            self.delta.bytes_in
        )
    }
}

/// Per-product byte counters, accumulated across completions.
#[derive(Debug, Default)]
pub struct TrafficStats {
    totals: HashMap<ProductId, Traffic>,
}

impl TrafficStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one exchange. Returns `None` when nothing moved, so unchanged
    /// counters are not reported again.
    pub fn record(&mut self, product: ProductId, delta: Traffic) -> Option<TrafficReport> {
        if delta.is_zero() {
            return None;
        }
        let entry = self.totals.entry(product).or_default();
        *entry = entry.add(delta);
        Some(TrafficReport {
            product,
            total: *entry,
            delta,
        })
    }

    pub fn record_result(&mut self, result: &FetchResult) -> Option<TrafficReport> {
        self.record(
            result.product,
            Traffic {
                bytes_in: result.bytes as u64,
                bytes_out: result.sent_bytes as u64,
            },
        )
    }

    pub fn total(&self, product: ProductId) -> Traffic {
        self.totals.get(&product).copied().unwrap_or_default()
    }

    pub fn grand_total(&self) -> Traffic {
        self.totals.values().fold(Traffic::default(), |acc, t| acc.add(*t))
    }
}
