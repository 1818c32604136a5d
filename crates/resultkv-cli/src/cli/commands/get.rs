//! `resultkv get <key>` – print the stored result.

use anyhow::{bail, Result};
use resultkv_core::{StoreClient, Table};
use std::io::Write;
use std::time::Duration;

use super::write_value;

pub fn run_get<T: Table>(
    client: &StoreClient<T>,
    key: &str,
    wait_ms: Option<u64>,
    out: &mut impl Write,
) -> Result<()> {
    let found = match wait_ms {
        Some(ms) => client.get_within(key, Duration::from_millis(ms)),
        None => client.get(key),
    };
    match found {
        Ok(value) => {
            write_value(out, &value)?;
            writeln!(out)?;
        }
        Err(e) if e.is_not_found() => bail!("no result stored for {key:?}"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
