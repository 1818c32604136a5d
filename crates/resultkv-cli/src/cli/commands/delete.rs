//! `resultkv delete <key>` – remove a record.

use anyhow::Result;
use resultkv_core::{StoreClient, Table};
use std::io::Write;

pub fn run_delete<T: Table>(client: &StoreClient<T>, key: &str, out: &mut impl Write) -> Result<()> {
    client.delete(key)?;
    writeln!(out, "Deleted {key}")?;
    Ok(())
}
