use std::time::Duration;

use trellis_env::{EnvError, Environment};

pub const TRELLIS_LOG: &str = "TRELLIS_LOG";

pub const TRELLIS_EXECUTION_TIMEOUT_MS: &str = "TRELLIS_EXECUTION_TIMEOUT_MS";
pub const TRELLIS_TIMEOUT_GRACE_MS: &str = "TRELLIS_TIMEOUT_GRACE_MS";

pub const TRELLIS_MAX_QUERY_DEPTH: &str = "TRELLIS_MAX_QUERY_DEPTH";

pub const TRELLIS_LOADER_MAX_BATCH_SIZE: &str = "TRELLIS_LOADER_MAX_BATCH_SIZE";

pub const DEFAULT_TIMEOUT_GRACE: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_QUERY_DEPTH: usize = 64;

/// The execution timeout. Unset means operations may run indefinitely.
pub fn get_execution_timeout(env: &dyn Environment) -> Result<Option<Duration>, EnvError> {
    Ok(env
        .get_u64(TRELLIS_EXECUTION_TIMEOUT_MS)?
        .map(Duration::from_millis))
}

pub fn get_timeout_grace(env: &dyn Environment) -> Result<Duration, EnvError> {
    Ok(env
        .get_u64(TRELLIS_TIMEOUT_GRACE_MS)?
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TIMEOUT_GRACE))
}

pub fn get_max_query_depth(env: &dyn Environment) -> Result<usize, EnvError> {
    Ok(env
        .get_u64(TRELLIS_MAX_QUERY_DEPTH)?
        .map(|depth| depth as usize)
        .unwrap_or(DEFAULT_MAX_QUERY_DEPTH))
}

pub fn get_loader_max_batch_size(env: &dyn Environment) -> Result<Option<usize>, EnvError> {
    Ok(env
        .get_u64(TRELLIS_LOADER_MAX_BATCH_SIZE)?
        .filter(|size| *size > 0)
        .map(|size| size as usize))
}
