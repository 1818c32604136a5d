//! Query parameters of a connection descriptor.

use std::time::Duration;

use super::{config_err, ConnectionInfo};
use crate::error::StoreError;
use crate::retry::RetryPolicy;

fn millis(name: &str, value: &str) -> Result<Duration, StoreError> {
    value
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| config_err(format!("{name} must be a whole number of milliseconds, got {value:?}")))
}

/// Apply one `name=value` query parameter to `info`.
pub(super) fn apply_param(info: &mut ConnectionInfo, name: &str, value: &str) -> Result<(), StoreError> {
    match name {
        "endpoint" => {
            if value.is_empty() {
                return Err(config_err("endpoint must not be empty"));
            }
            info.endpoint = Some(value.to_string());
        }
        "read_wait_ms" => {
            info.consistency.budget = millis(name, value)?;
        }
        "read_gap_ms" => {
            let gap = millis(name, value)?;
            if gap.is_zero() {
                return Err(config_err("read_gap_ms must be at least 1"));
            }
            info.consistency.gap = gap;
        }
        "retry" => {
            info.retry = RetryPolicy::preset(value).ok_or_else(|| {
                config_err(format!("retry must be \"bounded\" or \"fast\", got {value:?}"))
            })?;
        }
        other => return Err(config_err(format!("unknown parameter {other:?}"))),
    }
    Ok(())
}
