use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::models::{coerce_amount, parse_date, Cadence, EntryId, EntryKind, MoneyEntry};

/// An export file: ours, or the older kind that has no `budgets` map.
/// Entry fields are read as loose JSON values and coerced one by one.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RestorePayload {
    pub(crate) exported_at: Option<String>,
    pub(crate) income: Vec<RawEntry>,
    pub(crate) expenses: Vec<RawEntry>,
    pub(crate) budgets: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawEntry {
    pub(crate) id: Option<Value>,
    pub(crate) name: Option<Value>,
    pub(crate) amount: Value,
    pub(crate) category: Option<Value>,
    pub(crate) cadence: Option<Value>,
    pub(crate) date: Option<Value>,
    pub(crate) created_at: Option<Value>,
}

/// Entries and caps ready to hand to the session.
#[derive(Debug, Default)]
pub(crate) struct Restore {
    pub(crate) entries: Vec<MoneyEntry>,
    pub(crate) caps: Vec<(String, Decimal)>,
    pub(crate) skipped: usize,
}

/// Numbers and numeric strings both count; anything else is 0.
fn value_amount(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => coerce_amount(&n.to_string()),
        Value::String(s) => coerce_amount(s),
        _ => Decimal::ZERO,
    }
}

/// Strings as-is, numbers and booleans as their JSON text.
fn value_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Epoch milliseconds (integer, float or numeric string) or an RFC 3339
/// timestamp.
fn value_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let millis = match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                return Some(ts.with_timezone(&Utc));
            }
            s.parse::<f64>().ok().map(|f| f as i64)
        }
        _ => None,
    }?;
    Utc.timestamp_millis_opt(millis).single()
}

fn value_id(value: Option<&Value>) -> EntryId {
    match value {
        Some(Value::String(s)) => EntryId::from_raw(s),
        Some(Value::Number(n)) => EntryId::from_raw(&n.to_string()),
        _ => EntryId::generate(),
    }
}

impl RawEntry {
    fn into_entry(self, kind: EntryKind, now: DateTime<Utc>) -> MoneyEntry {
        let created_at = value_timestamp(self.created_at.as_ref()).unwrap_or(now);
        let cadence = value_text(self.cadence.as_ref())
            .map_or(Cadence::Monthly, |c| Cadence::parse(&c));
        let name = value_text(self.name.as_ref()).unwrap_or_default();
        let category = value_text(self.category.as_ref());
        MoneyEntry::new(
            kind,
            &name,
            value_amount(&self.amount),
            category.as_deref(),
            cadence,
            value_text(self.date.as_ref()).as_deref().and_then(parse_date),
            created_at,
        )
        .with_id(value_id(self.id.as_ref()))
    }
}

impl RestorePayload {
    pub(crate) fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse export file")
    }

    pub(crate) fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&json)
    }

    /// Coerce every record. Entries with no name or a zero amount are
    /// dropped and counted.
    pub(crate) fn into_restore(self, now: DateTime<Utc>) -> Restore {
        tracing::debug!(exported_at = ?self.exported_at, "restoring export");
        let mut restore = Restore::default();
        let tagged = self
            .income
            .into_iter()
            .map(|r| (EntryKind::Income, r))
            .chain(self.expenses.into_iter().map(|r| (EntryKind::Expense, r)));

        for (kind, raw) in tagged {
            let entry = raw.into_entry(kind, now);
            if entry.is_submittable() {
                restore.entries.push(entry);
            } else {
                tracing::debug!(id = %entry.id, "skipping restored entry without name or amount");
                restore.skipped += 1;
            }
        }

        restore.caps = self
            .budgets
            .iter()
            .map(|(category, amount)| (category.clone(), value_amount(amount)))
            .collect();
        restore
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
