//! `resultkv set <key> <value>` – store a value.

use anyhow::{Context, Result};
use resultkv_core::{StoreClient, Table, Value};
use std::io::Write;

pub fn run_set<T: Table>(
    client: &StoreClient<T>,
    key: &str,
    value: &str,
    number: bool,
    out: &mut impl Write,
) -> Result<()> {
    let value = if number {
        let n: i64 = value
            .trim()
            .parse()
            .with_context(|| format!("--number value {value:?} is not an integer"))?;
        Value::Number(n)
    } else {
        Value::from(value)
    };
    client.set(key, value)?;
    writeln!(out, "Stored {key}")?;
    Ok(())
}
