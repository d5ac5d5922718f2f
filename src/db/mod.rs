mod schema;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::ledger::Snapshot;
use crate::models::*;

const ENTRY_COLUMNS: &str =
    "id, kind, name, amount, category, cadence, date, import_hash, created_at";

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(version = schema::CURRENT_VERSION, "created database schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                tracing::info!(from_version, "applying schema migration");
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    /// Everything the aggregator needs, newest entries first.
    pub(crate) fn load_snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            income: self.get_entries(EntryKind::Income)?,
            expenses: self.get_entries(EntryKind::Expense)?,
            caps: self.get_budget_caps()?,
        })
    }

    // ── Entries ───────────────────────────────────────────────

    pub(crate) fn insert_entry(&self, entry: &MoneyEntry) -> Result<()> {
        insert_entry_on(&self.conn, entry)
            .with_context(|| format!("Failed to save entry '{}'", entry.name))
    }

    /// Insert many entries in one transaction, skipping any whose id or
    /// non-empty import hash is already stored. Returns how many were added.
    pub(crate) fn insert_entries_batch(&mut self, entries: &[MoneyEntry]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut count = 0;
        for entry in entries {
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM entries
                 WHERE id = ?1 OR (import_hash = ?2 AND import_hash != ''))",
                params![entry.id.as_str(), entry.import_hash],
                |row| row.get(0),
            )?;
            if exists {
                tracing::debug!(id = %entry.id, name = %entry.name, "skipping duplicate entry");
                continue;
            }
            insert_entry_on(&tx, entry)?;
            count += 1;
        }
        tx.commit()?;
        Ok(count)
    }

    pub(crate) fn get_entries(&self, kind: EntryKind) -> Result<Vec<MoneyEntry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE kind = ?1
             ORDER BY created_at DESC, rowid DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![kind.as_str()], row_to_entry)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    #[cfg(test)]
    pub(crate) fn get_entry_by_id(&self, id: &str) -> Result<Option<MoneyEntry>> {
        use rusqlite::OptionalExtension;

        let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id], row_to_entry)
            .optional()?)
    }

    pub(crate) fn get_entry_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?)
    }

    /// Returns false when no entry had that id.
    pub(crate) fn delete_entry(&self, id: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    /// Remove every income and expense entry. Budget caps and rules stay.
    pub(crate) fn delete_all_entries(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM entries", [])?)
    }

    // ── Budget caps ───────────────────────────────────────────

    pub(crate) fn get_budget_caps(&self) -> Result<BudgetCaps> {
        let mut stmt = self
            .conn
            .prepare("SELECT category, amount FROM budget_caps ORDER BY category")?;
        let rows = stmt.query_map([], |row| {
            let category: String = row.get(0)?;
            let amt_str: String = row.get(1)?;
            Ok((
                CategoryName::new(&category),
                Decimal::from_str(&amt_str).unwrap_or_default(),
            ))
        })?;
        Ok(rows.collect::<std::result::Result<BudgetCaps, _>>()?)
    }

    pub(crate) fn upsert_cap(&self, category: &CategoryName, amount: Decimal) -> Result<()> {
        self.conn.execute(
            "INSERT INTO budget_caps (category, amount) VALUES (?1, ?2)
             ON CONFLICT(category) DO UPDATE SET amount = ?2",
            params![category.as_str(), amount.to_string()],
        )?;
        Ok(())
    }

    pub(crate) fn delete_cap(&self, category: &CategoryName) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM budget_caps WHERE category = ?1",
            params![category.as_str()],
        )?;
        Ok(removed > 0)
    }

    // ── Import Rules ──────────────────────────────────────────

    pub(crate) fn get_import_rules(&self) -> Result<Vec<ImportRule>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, pattern, category, is_regex, priority FROM import_rules ORDER BY priority DESC, pattern",
        )?;
        let rows = stmt.query_map([], |row| {
            let category: String = row.get(2)?;
            Ok(ImportRule {
                id: Some(row.get(0)?),
                pattern: row.get(1)?,
                category: CategoryName::new(&category),
                is_regex: row.get(3)?,
                priority: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn insert_import_rule(&self, rule: &ImportRule) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO import_rules (pattern, category, is_regex, priority)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                rule.pattern,
                rule.category.as_str(),
                rule.is_regex,
                rule.priority
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn delete_import_rule(&self, id: i64) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM import_rules WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }
}

fn insert_entry_on(conn: &Connection, entry: &MoneyEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO entries (id, kind, name, amount, category, cadence, date, import_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            entry.id.as_str(),
            entry.kind.as_str(),
            entry.name,
            entry.amount.to_string(),
            entry.category.as_ref().map(|c| c.as_str()),
            entry.cadence.as_str(),
            entry.date.map(|d| d.format("%Y-%m-%d").to_string()),
            entry.import_hash,
            entry
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        ],
    )?;
    Ok(())
}

/// Decode a row, applying the same coercions as freshly entered data.
fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<MoneyEntry> {
    let kind_str: String = row.get(1)?;
    let kind = EntryKind::parse(&kind_str).unwrap_or(EntryKind::Expense);
    let amount_str: String = row.get(3)?;
    let category: Option<String> = row.get(4)?;
    let category = match kind {
        EntryKind::Expense => Some(CategoryName::new(category.as_deref().unwrap_or_default())),
        EntryKind::Income => category.map(|c| CategoryName::new(&c)),
    };
    let cadence_str: String = row.get(5)?;
    let date: Option<String> = row.get(6)?;
    let created_at: String = row.get(8)?;
    Ok(MoneyEntry {
        id: EntryId::from_raw(&row.get::<_, String>(0)?),
        kind,
        name: row.get(2)?,
        amount: coerce_amount(&amount_str),
        category,
        cadence: Cadence::parse(&cadence_str),
        date: date.as_deref().and_then(parse_date),
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_default(),
        import_hash: row.get(7)?,
    })
}

#[cfg(test)]
mod tests;
