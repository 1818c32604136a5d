//! `resultkv mget <key>...` – print results for several keys.

use anyhow::Result;
use resultkv_core::{StoreClient, Table};
use std::io::Write;

use super::write_value;

pub fn run_mget<T: Table>(client: &StoreClient<T>, keys: &[String], out: &mut impl Write) -> Result<()> {
    let found = client.mget_keyed(keys)?;
    for (key, value) in &found {
        write!(out, "{key}\t")?;
        write_value(out, value)?;
        writeln!(out)?;
    }
    tracing::info!(requested = keys.len(), found = found.len(), "mget");
    Ok(())
}
