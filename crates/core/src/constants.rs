//! Shared constants for goal lifecycle timing.

/// Hours an EXPIRED goal sits before the archive pass picks it up.
pub const ARCHIVE_RETENTION_HOURS: i64 = 24;

/// Horizon of the daily expiration warning tier, in hours.
pub const WARNING_HORIZON_HOURS: i64 = 24;

/// Horizon of the urgent expiration warning tier, in hours.
pub const URGENT_HORIZON_HOURS: i64 = 3;

/// Default goal priority when none is supplied.
pub const DEFAULT_PRIORITY: i32 = 1;
