//! Send-failure accounting for backpressured endpoints.
//!
//! A peer that stops reading fills the kernel buffer, after which every
//! `send` fails. Logging each failure would flood the output, so
//! [`SendFailures`] only reports when the failure count reaches the next
//! power of ten: 1, 10, 100, 1000, ...
//!
//! # Example
//!
//! ```
//! use nbpipe::backpressure::SendFailures;
//!
//! let mut failures = SendFailures::new();
//! assert_eq!(failures.record(), Some(1));
//! for _ in 2..10 {
//!     assert_eq!(failures.record(), None);
//! }
//! assert_eq!(failures.record(), Some(10));
//! ```

/// Watermark multiplier between two consecutive reports.
pub const REPORT_FACTOR: u64 = 10;

/// Failure counter with an exponentially growing report watermark.
///
/// Owned by a single endpoint; never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendFailures {
    /// Total failed sends so far.
    count: u64,
    /// Count at which the next report fires.
    next_report: u64,
}

impl SendFailures {
    /// Create a counter with no failures recorded.
    pub fn new() -> Self {
        Self {
            count: 0,
            next_report: 1,
        }
    }

    /// Record one failed send.
    ///
    /// Returns `Some(count)` when this failure reaches the report watermark,
    /// in which case the watermark advances by [`REPORT_FACTOR`].
    pub fn record(&mut self) -> Option<u64> {
        self.count = self.count.saturating_add(1);
        if self.count != self.next_report {
            return None;
        }
        self.next_report = self.next_report.saturating_mul(REPORT_FACTOR);
        Some(self.count)
    }

    /// Total failed sends recorded.
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Count at which the next report fires.
    #[inline]
    pub fn next_report(&self) -> u64 {
        self.next_report
    }
}

impl Default for SendFailures {
    fn default() -> Self {
        Self::new()
    }
}
