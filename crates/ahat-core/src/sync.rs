use serde::Serialize;

/// Tallies from one deal-provider sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncCounts {
    /// Deals received from the provider.
    pub synced: u64,
    /// Deals that created new catalog rows.
    pub inserted: u64,
    /// Deals that overwrote existing rows.
    pub updated: u64,
    /// Duplicate source ids within the batch.
    pub skipped: u64,
    /// Deals that failed normalization.
    pub failed: u64,
}
