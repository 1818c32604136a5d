//! DynamoDB transport built on `aws-sdk-dynamodb`.
//!
//! The SDK is async; this transport owns a current-thread tokio runtime and
//! blocks on each request so the client stays a plain blocking API. It must not
//! be called from inside another tokio runtime.
//!
//! SDK-level retries are disabled: throttling is handled by the client's
//! retry policy, which needs to see every throttling error.

use std::collections::HashMap;

use aws_sdk_dynamodb::config::retry::RetryConfig;
use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::{AttributeValue, KeysAndAttributes, ReturnValue};
use aws_sdk_dynamodb::Client;

use super::{BatchGetPage, Table, COUNTER_OVERFLOW};
use crate::connection::ConnectionInfo;
use crate::error::StoreError;
use crate::retry::TransportError;
use crate::value::Value;

/// Primary key attribute.
const ID_ATTR: &str = "id";
/// Payload attribute.
const RESULT_ATTR: &str = "result";
/// Code used for records this client cannot decode.
const MALFORMED_RECORD: &str = "MalformedRecord";

type Item = HashMap<String, AttributeValue>;

#[derive(Debug)]
pub struct DynamoTable {
    client: Client,
    table: String,
    runtime: tokio::runtime::Runtime,
}

impl DynamoTable {
    /// Build a client for the table named in `info`. No request is sent.
    pub fn new(info: &ConnectionInfo) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                StoreError::StoreUnavailable(TransportError::new(
                    "RuntimeUnavailable",
                    format!("failed to start I/O runtime: {e}"),
                ))
            })?;

        let credentials = Credentials::new(
            info.access_key.clone(),
            info.secret_key.clone(),
            None,
            None,
            "resultkv-connection",
        );
        let mut builder = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(info.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled());
        if let Some(endpoint) = &info.endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }

        tracing::debug!(region = %info.region, table = %info.table, endpoint = ?info.endpoint, "dynamodb transport configured");

        Ok(Self {
            client: Client::from_conf(builder.build()),
            table: info.table.clone(),
            runtime,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }
}

fn key_item(key: &str) -> Item {
    HashMap::from([(ID_ATTR.to_string(), AttributeValue::S(key.to_string()))])
}

fn malformed(message: impl Into<String>) -> TransportError {
    TransportError::new(MALFORMED_RECORD, message)
}

fn encode(value: &Value) -> AttributeValue {
    match value {
        Value::Binary(bytes) => AttributeValue::B(Blob::new(bytes.clone())),
        Value::Number(n) => AttributeValue::N(n.to_string()),
    }
}

fn parse_number(n: &str) -> Result<i64, TransportError> {
    n.parse::<i64>()
        .map_err(|_| malformed(format!("numeric result {n:?} is not an exact 64-bit integer")))
}

fn decode(item: &Item) -> Result<Value, TransportError> {
    match item.get(RESULT_ATTR) {
        Some(AttributeValue::B(blob)) => Ok(Value::Binary(blob.as_ref().to_vec())),
        Some(AttributeValue::N(n)) => parse_number(n).map(Value::Number),
        Some(_) => Err(malformed("result is neither binary nor number")),
        None => Err(malformed("record has no result attribute")),
    }
}

/// Condition that holds unless adding `delta` to the stored number would leave
/// the `i64` range. Non-numeric results pass so the update reports its own
/// type error.
const COUNTER_GUARD: &str =
    "attribute_not_exists(#r) OR NOT attribute_type(#r, :num) OR #r BETWEEN :lo AND :hi";

/// Stored values for which `n + delta` still fits in `i64`.
fn counter_bounds(delta: i64) -> (i64, i64) {
    if delta >= 0 {
        (i64::MIN, i64::MAX - delta)
    } else {
        (i64::MIN - delta, i64::MAX)
    }
}

fn item_id(item: &Item) -> Result<String, TransportError> {
    match item.get(ID_ATTR) {
        Some(AttributeValue::S(s)) => Ok(s.clone()),
        _ => Err(malformed("record has no string id")),
    }
}

/// Map an SDK error to a transport error, keeping the service error code.
fn transport_error<E>(err: SdkError<E>) -> TransportError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let code = match ProvideErrorMetadata::code(&err) {
        Some(code) => code.to_string(),
        None => match &err {
            SdkError::TimeoutError(_) => "Timeout".to_string(),
            SdkError::DispatchFailure(_) => "DispatchFailure".to_string(),
            SdkError::ConstructionFailure(_) => "ConstructionFailure".to_string(),
            SdkError::ResponseError(_) => "ResponseError".to_string(),
            _ => "Unknown".to_string(),
        },
    };
    TransportError::new(code, DisplayErrorContext(&err).to_string())
}

impl Table for DynamoTable {
    fn get_item(&self, key: &str, consistent: bool) -> Result<Option<Value>, TransportError> {
        let request = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(ID_ATTR, AttributeValue::S(key.to_string()))
            .consistent_read(consistent)
            .send();
        let out = self.runtime.block_on(request).map_err(transport_error)?;
        out.item().map(decode).transpose()
    }

    fn batch_get_item(
        &self,
        keys: &[String],
        consistent: bool,
    ) -> Result<BatchGetPage, TransportError> {
        let wanted = KeysAndAttributes::builder()
            .set_keys(Some(keys.iter().map(|k| key_item(k)).collect()))
            .consistent_read(consistent)
            .build()
            .map_err(|e| TransportError::new("ConstructionFailure", e.to_string()))?;
        let request = self
            .client
            .batch_get_item()
            .request_items(&self.table, wanted)
            .send();
        let out = self.runtime.block_on(request).map_err(transport_error)?;

        let mut page = BatchGetPage::default();
        if let Some(rows) = out.responses().and_then(|r| r.get(&self.table)) {
            for row in rows {
                page.items.push((item_id(row)?, decode(row)?));
            }
        }
        if let Some(pending) = out.unprocessed_keys().and_then(|u| u.get(&self.table)) {
            for key in pending.keys() {
                page.unprocessed.push(item_id(key)?);
            }
        }
        Ok(page)
    }

    fn put_item(&self, key: &str, value: &Value) -> Result<(), TransportError> {
        let request = self
            .client
            .put_item()
            .table_name(&self.table)
            .item(ID_ATTR, AttributeValue::S(key.to_string()))
            .item(RESULT_ATTR, encode(value))
            .send();
        self.runtime.block_on(request).map_err(transport_error)?;
        Ok(())
    }

    fn delete_item(&self, key: &str) -> Result<(), TransportError> {
        let request = self
            .client
            .delete_item()
            .table_name(&self.table)
            .key(ID_ATTR, AttributeValue::S(key.to_string()))
            .send();
        self.runtime.block_on(request).map_err(transport_error)?;
        Ok(())
    }

    fn add_to_counter(&self, key: &str, delta: i64) -> Result<i64, TransportError> {
        let (lo, hi) = counter_bounds(delta);
        let request = self
            .client
            .update_item()
            .table_name(&self.table)
            .key(ID_ATTR, AttributeValue::S(key.to_string()))
            .update_expression("ADD #r :val")
            .condition_expression(COUNTER_GUARD)
            .expression_attribute_names("#r", RESULT_ATTR)
            .expression_attribute_values(":val", AttributeValue::N(delta.to_string()))
            .expression_attribute_values(":num", AttributeValue::S("N".to_string()))
            .expression_attribute_values(":lo", AttributeValue::N(lo.to_string()))
            .expression_attribute_values(":hi", AttributeValue::N(hi.to_string()))
            .return_values(ReturnValue::UpdatedNew)
            .send();
        let out = self.runtime.block_on(request).map_err(|e| {
            let err = transport_error(e);
            if err.code == "ConditionalCheckFailedException" {
                TransportError::new(COUNTER_OVERFLOW, format!("adding {delta} to {key:?} leaves the 64-bit range"))
            } else {
                err
            }
        })?;
        match out.attributes().and_then(|a| a.get(RESULT_ATTR)) {
            Some(AttributeValue::N(n)) => parse_number(n),
            _ => Err(malformed("update returned no numeric result")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_and_number_encodings_round_trip() {
        let bytes = Value::Binary(vec![0, 159, 146, 150, 255]);
        let mut item = key_item("k");
        item.insert(RESULT_ATTR.to_string(), encode(&bytes));
        assert_eq!(decode(&item).unwrap(), bytes);

        item.insert(RESULT_ATTR.to_string(), encode(&Value::Number(-42)));
        assert_eq!(decode(&item).unwrap(), Value::Number(-42));
        assert_eq!(item_id(&item).unwrap(), "k");
    }

    #[test]
    fn string_result_is_malformed() {
        let mut item = key_item("k");
        item.insert(RESULT_ATTR.to_string(), AttributeValue::S("legacy".into()));
        assert_eq!(decode(&item).unwrap_err().code, MALFORMED_RECORD);
        assert_eq!(decode(&key_item("k")).unwrap_err().code, MALFORMED_RECORD);
    }

    #[test]
    fn fractional_number_is_malformed() {
        assert_eq!(parse_number("1.5").unwrap_err().code, MALFORMED_RECORD);
        assert_eq!(parse_number("17").unwrap(), 17);
    }

    #[test]
    fn counter_bounds_stop_short_of_overflow() {
        assert_eq!(counter_bounds(1), (i64::MIN, i64::MAX - 1));
        assert_eq!(counter_bounds(0), (i64::MIN, i64::MAX));
        assert_eq!(counter_bounds(-3), (i64::MIN + 3, i64::MAX));
    }

    #[test]
    fn builds_without_network() {
        let info = ConnectionInfo::parse("dynamodb://a:b@us-east-1:8000/results").unwrap();
        let table = DynamoTable::new(&info).unwrap();
        assert_eq!(table.table_name(), "results");
    }
}
