//! `resultkv incr <key>` – atomic counter increment.

use anyhow::Result;
use resultkv_core::{StoreClient, Table};
use std::io::Write;

pub fn run_incr<T: Table>(client: &StoreClient<T>, key: &str, out: &mut impl Write) -> Result<()> {
    let n = client.incr(key)?;
    writeln!(out, "{n}")?;
    Ok(())
}
