use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::money::deserialize_lenient_amount;

/// Reads timestamps in the shapes the backend emits: RFC 3339 strings,
/// epoch milliseconds, or Firestore's `{ "_seconds", "_nanoseconds" }`
/// object. Anything else is `None`.
pub fn timestamp_from_json(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::Object(map) => {
            let seconds = map
                .get("_seconds")
                .or_else(|| map.get("seconds"))
                .and_then(Value::as_i64)?;
            let nanos = map
                .get("_nanoseconds")
                .or_else(|| map.get("nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            let nanos = u32::try_from(nanos).ok()?;
            Utc.timestamp_opt(seconds, nanos).single()
        }
        _ => None,
    }
}

fn deserialize_lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(timestamp_from_json))
}

/// Reads loosely typed text: strings as-is, numbers and bools in their JSON
/// spelling. Null, arrays and objects are `None`.
pub fn text_from_json(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn deserialize_lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(text_from_json))
}

/// Record ids arrive as strings or numbers. An unusable id becomes empty
/// rather than failing the whole listing.
fn deserialize_lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_lenient_text(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub amount: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    pub due_date: Option<DateTime<Utc>>,
    /// When the backend will approve this milestone on the buyer's behalf.
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    pub auto_approve_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    #[serde(default, deserialize_with = "deserialize_lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub total_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub escrow_fee: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub buyer_email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub seller_email: Option<String>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    #[serde(default, deserialize_with = "deserialize_lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub project_title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub total_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub escrow_fee: Option<Decimal>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, deserialize_with = "deserialize_lenient_id")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "deserialize_lenient_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub amount: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub escrow_fee: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DealEnvelope {
    pub deal: Deal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DealsEnvelope {
    #[serde(default)]
    pub deals: Vec<Deal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProposalEnvelope {
    pub proposal: Proposal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProposalsEnvelope {
    #[serde(default)]
    pub proposals: Vec<Proposal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionsEnvelope {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}
