use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::models::{EntryDraft, EntryKind, MoneyEntry};

/// Where each field lives in an entries CSV. Located by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CsvColumns {
    pub(crate) kind: Option<usize>,
    pub(crate) name: usize,
    pub(crate) amount: usize,
    pub(crate) category: Option<usize>,
    pub(crate) cadence: Option<usize>,
    pub(crate) date: Option<usize>,
}

impl CsvColumns {
    pub(crate) fn from_headers(headers: &[String]) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };
        let name = find(&["name", "description", "label"])
            .context("CSV needs a 'name' or 'description' column")?;
        let amount = find(&["amount", "value"]).context("CSV needs an 'amount' column")?;
        Ok(Self {
            kind: find(&["type", "kind"]),
            name,
            amount,
            category: find(&["category"]),
            cadence: find(&["cadence", "frequency", "recurrence"]),
            date: find(&["date", "due", "due date"]),
        })
    }
}

/// Result of turning CSV rows into entries.
#[derive(Debug, Default)]
pub(crate) struct CsvImport {
    pub(crate) entries: Vec<MoneyEntry>,
    /// Rows dropped because they had no name, no amount or an unknown type.
    pub(crate) skipped: usize,
}

pub(crate) struct CsvImporter;

impl CsvImporter {
    /// Read the header row and every data row as strings.
    pub(crate) fn read(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        let mut all_rows: Vec<Vec<String>> = Vec::new();
        for result in rdr.records() {
            let record = result.context("Failed to read CSV record")?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            all_rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        if all_rows.is_empty() {
            anyhow::bail!("CSV file is empty");
        }

        let headers = all_rows.remove(0);
        Ok((headers, all_rows))
    }

    /// Build entries from `rows`. `default_kind` applies when the file has no
    /// type column. Every field goes through the usual coercions; rows the
    /// entry form would refuse are counted in `skipped`.
    pub(crate) fn parse(
        rows: &[Vec<String>],
        columns: &CsvColumns,
        default_kind: EntryKind,
        now: DateTime<Utc>,
    ) -> CsvImport {
        let mut import = CsvImport::default();
        let cell = |row: &[String], col: Option<usize>| -> Option<String> {
            col.and_then(|c| row.get(c))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        for (i, row) in rows.iter().enumerate() {
            let row = row.as_slice();
            let kind = match cell(row, columns.kind) {
                Some(raw) => match EntryKind::parse(&raw) {
                    Some(kind) => kind,
                    None => {
                        tracing::debug!(row = i + 1, kind = %raw, "skipping row with unknown type");
                        import.skipped += 1;
                        continue;
                    }
                },
                None => default_kind,
            };

            let draft = EntryDraft {
                kind,
                name: cell(row, Some(columns.name)).unwrap_or_default(),
                amount: cell(row, Some(columns.amount)).unwrap_or_default(),
                category: cell(row, columns.category),
                cadence: cell(row, columns.cadence).unwrap_or_else(|| "oneoff".into()),
                date: cell(row, columns.date),
            };
            let mut entry = draft.into_entry(now);
            if !entry.is_submittable() {
                tracing::debug!(row = i + 1, "skipping row without name or amount");
                import.skipped += 1;
                continue;
            }
            entry.import_hash = entry.content_hash();
            import.entries.push(entry);
        }

        import
    }

    pub(crate) fn load(path: &Path, default_kind: EntryKind, now: DateTime<Utc>) -> Result<CsvImport> {
        let (headers, rows) = Self::read(path)?;
        let columns = CsvColumns::from_headers(&headers)?;
        Ok(Self::parse(&rows, &columns, default_kind, now))
    }
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
