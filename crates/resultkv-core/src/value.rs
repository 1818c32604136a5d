//! The `result` attribute of a stored record.

/// Value held in a record's `result` attribute.
///
/// Text and byte payloads are always stored with the store's binary encoding so
/// arbitrary bytes round-trip exactly. Numbers are exact integers; they are only
/// produced by `set` with a number and by `incr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Binary(Vec<u8>),
    Number(i64),
}

impl Value {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            Value::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Binary(_) => None,
        }
    }

    /// Consume into raw bytes; numbers become their decimal text.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Value::Binary(b) => b,
            Value::Number(n) => n.to_string().into_bytes(),
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Binary(v.to_vec())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Binary(v.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Binary(v.into_bytes())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v)
    }
}
