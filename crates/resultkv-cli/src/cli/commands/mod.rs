//! CLI command handlers. Each command is in its own file.

mod delete;
mod get;
mod incr;
mod mget;
mod set;

pub use delete::run_delete;
pub use get::run_get;
pub use incr::run_incr;
pub use mget::run_mget;
pub use set::run_set;

use std::io::{self, Write};

use resultkv_core::Value;

/// Write a stored value: numbers as decimals, binary payloads byte for byte.
pub(crate) fn write_value(out: &mut impl Write, value: &Value) -> io::Result<()> {
    match value {
        Value::Number(n) => write!(out, "{n}"),
        Value::Binary(bytes) => out.write_all(bytes),
    }
}
