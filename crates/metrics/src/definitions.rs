//! Metric name and label definitions.
//!
//! Every metric emitted by autodelete is named here so the exported set is
//! documented in one place.

/// Deletion scheduler metrics
pub mod scheduler {
    /// Deletions accepted into the queue
    pub const DELETIONS_SCHEDULED_TOTAL: &str = "autodelete_deletions_scheduled_total";
    /// Deletions currently waiting in the queue
    pub const DELETIONS_PENDING: &str = "autodelete_deletions_pending";
    /// Delete requests that the platform accepted
    pub const DELETIONS_SUCCEEDED_TOTAL: &str = "autodelete_deletions_succeeded_total";
    /// Delete requests that failed (label: `reason`)
    pub const DELETIONS_FAILED_TOTAL: &str = "autodelete_deletions_failed_total";
    /// Queued deletions dropped because their channel was disabled
    pub const DELETIONS_CANCELLED_TOTAL: &str = "autodelete_deletions_cancelled_total";
    /// Delay between a deletion's due time and the delete request, in seconds
    pub const DISPATCH_LAG_SECONDS: &str = "autodelete_dispatch_lag_seconds";
}

/// Admin command metrics
pub mod commands {
    /// Control commands received (label: `outcome`)
    pub const COMMANDS_TOTAL: &str = "autodelete_commands_total";
}

/// Common label keys
pub mod labels {
    pub const REASON: &str = "reason";
    pub const OUTCOME: &str = "outcome";
}

/// Standard histogram buckets
pub mod buckets {
    /// Dispatch lag buckets (in seconds), 1ms to 60s
    pub const DISPATCH_LAG: &[f64] = &[
        0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
    ];
}
