use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use crate::ledger::Snapshot;
use crate::models::MoneyEntry;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportPayload<'a> {
    exported_at: String,
    income: &'a [MoneyEntry],
    expenses: &'a [MoneyEntry],
    budgets: BTreeMap<&'a str, ExactAmount>,
}

/// Written as a JSON number with every digit of the decimal.
#[derive(Serialize)]
struct ExactAmount(
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")] Decimal,
);

/// Pretty-printed JSON backup of everything in `snapshot`. Restoring it
/// gives back the same entries and caps.
pub(crate) fn to_json(snapshot: &Snapshot, exported_at: DateTime<Utc>) -> Result<String> {
    let payload = ExportPayload {
        exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        income: &snapshot.income,
        expenses: &snapshot.expenses,
        budgets: snapshot
            .caps
            .iter()
            .map(|(category, cap)| (category.as_str(), ExactAmount(*cap)))
            .collect(),
    };
    serde_json::to_string_pretty(&payload).context("Failed to serialize export")
}

pub(crate) const CSV_HEADER: [&str; 7] = [
    "type",
    "name",
    "amount",
    "category",
    "cadence",
    "date",
    "created_at",
];

/// Write every entry as CSV, income first. Returns the number of rows.
pub(crate) fn write_csv<W: Write>(snapshot: &Snapshot, out: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(CSV_HEADER)?;

    let mut count = 0;
    for entry in snapshot.all_entries() {
        let amount = entry.amount.to_string();
        let date = entry.date.map(|d| d.to_string()).unwrap_or_default();
        let created = entry
            .created_at
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        wtr.write_record([
            entry.kind.as_str(),
            entry.name.as_str(),
            amount.as_str(),
            entry.category.as_ref().map_or("", |c| c.as_str()),
            entry.cadence.as_str(),
            date.as_str(),
            created.as_str(),
        ])?;
        count += 1;
    }
    wtr.flush().context("Failed to write CSV")?;
    Ok(count)
}

/// Export to `path`, picking CSV or JSON from the file extension
/// (anything other than `.csv` gets JSON).
pub(crate) fn export_to_path(
    snapshot: &Snapshot,
    path: &Path,
    exported_at: DateTime<Utc>,
) -> Result<usize> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_csv(snapshot, file)
    } else {
        let json = to_json(snapshot, exported_at)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(snapshot.income.len() + snapshot.expenses.len())
    }
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
