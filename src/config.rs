//! Tunable constants shared by the loader binaries.

use std::time::Duration;

/// Timeout for downloading a remote source file.
///
/// The monthly taxi files are a few hundred megabytes; ten minutes leaves
/// headroom for slow links without hanging forever on a dead one.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Upper bound on bind parameters per INSERT statement.
///
/// PostgreSQL caps prepared-statement parameters at 65535. Chunks whose
/// rows * columns exceed this are split across statements; the chunk is still
/// reported as a single insert operation.
pub const MAX_BIND_PARAMS: usize = 60_000;
