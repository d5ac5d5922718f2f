use anyhow::Result;
use rust_decimal::Decimal;

use crate::clock::Clock;
use crate::db::Database;
use crate::ledger::{Aggregator, Snapshot};
use crate::models::{CategoryName, EntryDraft, MoneyEntry};

/// The one place entries and caps are held and mutated. Every mutation is
/// written through to the database before the in-memory snapshot changes.
pub(crate) struct Session {
    db: Database,
    snapshot: Snapshot,
    clock: Box<dyn Clock>,
}

impl Session {
    pub(crate) fn open(db: Database, clock: Box<dyn Clock>) -> Result<Self> {
        let snapshot = db.load_snapshot()?;
        tracing::debug!(
            income = snapshot.income.len(),
            expenses = snapshot.expenses.len(),
            caps = snapshot.caps.len(),
            "session loaded"
        );
        Ok(Self {
            db,
            snapshot,
            clock,
        })
    }

    pub(crate) fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub(crate) fn db(&self) -> &Database {
        &self.db
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn aggregator(&self) -> Aggregator<'_> {
        Aggregator::new(&self.snapshot, self.clock.as_ref())
    }

    /// Save a drafted entry. Returns `None` (and saves nothing) when the name
    /// is blank or the amount coerces to zero.
    pub(crate) fn add_entry(&mut self, draft: EntryDraft) -> Result<Option<MoneyEntry>> {
        let entry = draft.into_entry(self.clock.now());
        if !entry.is_submittable() {
            tracing::debug!(name = %entry.name, amount = %entry.amount, "ignoring entry without name or amount");
            return Ok(None);
        }
        self.db.insert_entry(&entry)?;
        tracing::info!(id = %entry.id, kind = %entry.kind, cadence = %entry.cadence, "entry added");
        self.snapshot
            .entries_mut(entry.kind)
            .insert(0, entry.clone());
        Ok(Some(entry))
    }

    /// Store a batch of already-built entries, skipping duplicates. Returns
    /// how many were new.
    pub(crate) fn import_entries(&mut self, entries: &[MoneyEntry]) -> Result<usize> {
        let added = self.db.insert_entries_batch(entries)?;
        tracing::info!(added, skipped = entries.len() - added, "entries imported");
        self.reload()?;
        Ok(added)
    }

    pub(crate) fn delete_entry(&mut self, id: &str) -> Result<Option<MoneyEntry>> {
        let Some(entry) = self.snapshot.find(id).cloned() else {
            return Ok(None);
        };
        self.db.delete_entry(id)?;
        self.snapshot
            .entries_mut(entry.kind)
            .retain(|e| e.id.as_str() != id);
        tracing::info!(id, "entry deleted");
        Ok(Some(entry))
    }

    /// Delete every income and expense entry. Caps are kept.
    pub(crate) fn wipe(&mut self) -> Result<usize> {
        let removed = self.db.delete_all_entries()?;
        self.snapshot.income.clear();
        self.snapshot.expenses.clear();
        tracing::info!(removed, "all entries wiped");
        Ok(removed)
    }

    /// Set the monthly cap for a category, normalizing the name and clamping
    /// negatives to 0. Returns the normalized key.
    pub(crate) fn set_cap(&mut self, category: &str, amount: Decimal) -> Result<CategoryName> {
        let mut caps = self.snapshot.caps.clone();
        let key = caps.set(category, amount);
        self.db.upsert_cap(&key, caps.cap_for(&key))?;
        self.snapshot.caps = caps;
        tracing::info!(category = %key, "budget cap set");
        Ok(key)
    }

    /// Remove a cap entirely. Returns false when there was none.
    pub(crate) fn remove_cap(&mut self, category: &str) -> Result<bool> {
        let key = CategoryName::new(category);
        let removed = self.db.delete_cap(&key)?;
        self.snapshot.caps.remove(category);
        if removed {
            tracing::info!(category = %key, "budget cap removed");
        }
        Ok(removed)
    }

    pub(crate) fn reload(&mut self) -> Result<()> {
        self.snapshot = self.db.load_snapshot()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
