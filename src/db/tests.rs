#![allow(clippy::unwrap_used)]

use super::*;
use chrono::{NaiveDate, TimeZone};
use rust_decimal_macros::dec;

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap()
}

fn make_entry(kind: EntryKind, name: &str, amount: Decimal, day: u32) -> MoneyEntry {
    MoneyEntry::new(
        kind,
        name,
        amount,
        Some("food"),
        Cadence::Monthly,
        NaiveDate::from_ymd_opt(2024, 1, day),
        at(day),
    )
}

// ── Entry CRUD ────────────────────────────────────────────────

#[test]
fn test_entry_insert_and_fetch() {
    let db = Database::open_in_memory().unwrap();
    let entry = make_entry(EntryKind::Expense, "Groceries", dec!(87.30), 5);
    db.insert_entry(&entry).unwrap();

    let fetched = db.get_entry_by_id(entry.id.as_str()).unwrap().unwrap();
    assert_eq!(fetched, entry);
    assert_eq!(fetched.category.unwrap().as_str(), "Food");
}

#[test]
fn test_entry_by_id_not_found() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get_entry_by_id("nope").unwrap().is_none());
}

#[test]
fn test_entries_filtered_by_kind() {
    let db = Database::open_in_memory().unwrap();
    db.insert_entry(&make_entry(EntryKind::Income, "Salary", dec!(3000), 1))
        .unwrap();
    db.insert_entry(&make_entry(EntryKind::Expense, "Rent", dec!(1200), 2))
        .unwrap();
    db.insert_entry(&make_entry(EntryKind::Expense, "Gym", dec!(40), 3))
        .unwrap();

    assert_eq!(db.get_entries(EntryKind::Income).unwrap().len(), 1);
    assert_eq!(db.get_entries(EntryKind::Expense).unwrap().len(), 2);
    assert_eq!(db.get_entry_count().unwrap(), 3);
}

#[test]
fn test_entries_newest_first() {
    let db = Database::open_in_memory().unwrap();
    for (name, day) in [("A", 3), ("B", 9), ("C", 1)] {
        db.insert_entry(&make_entry(EntryKind::Expense, name, dec!(1), day))
            .unwrap();
    }
    let names: Vec<String> = db
        .get_entries(EntryKind::Expense)
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["B", "A", "C"]);
}

#[test]
fn test_income_without_category_roundtrips_as_none() {
    let db = Database::open_in_memory().unwrap();
    let entry = MoneyEntry::new(
        EntryKind::Income,
        "Salary",
        dec!(3000),
        None,
        Cadence::Biweekly,
        None,
        at(1),
    );
    db.insert_entry(&entry).unwrap();
    let fetched = db.get_entry_by_id(entry.id.as_str()).unwrap().unwrap();
    assert!(fetched.category.is_none());
    assert!(fetched.date.is_none());
    assert_eq!(fetched.cadence, Cadence::Biweekly);
}

#[test]
fn test_entry_delete() {
    let db = Database::open_in_memory().unwrap();
    let entry = make_entry(EntryKind::Expense, "Coffee", dec!(4.5), 1);
    db.insert_entry(&entry).unwrap();
    assert!(db.delete_entry(entry.id.as_str()).unwrap());
    assert!(!db.delete_entry(entry.id.as_str()).unwrap());
    assert_eq!(db.get_entry_count().unwrap(), 0);
}

#[test]
fn test_duplicate_id_rejected_by_single_insert() {
    let db = Database::open_in_memory().unwrap();
    let entry = make_entry(EntryKind::Expense, "Coffee", dec!(4.5), 1);
    db.insert_entry(&entry).unwrap();
    assert!(db.insert_entry(&entry).is_err());
}

#[test]
fn test_delete_all_entries_keeps_caps() {
    let db = Database::open_in_memory().unwrap();
    db.insert_entry(&make_entry(EntryKind::Income, "Salary", dec!(1), 1))
        .unwrap();
    db.insert_entry(&make_entry(EntryKind::Expense, "Rent", dec!(1), 1))
        .unwrap();
    db.upsert_cap(&CategoryName::new("Rent"), dec!(1000)).unwrap();

    assert_eq!(db.delete_all_entries().unwrap(), 2);
    assert_eq!(db.get_entry_count().unwrap(), 0);
    assert_eq!(db.get_budget_caps().unwrap().len(), 1);
}

// ── Batch insert ──────────────────────────────────────────────

#[test]
fn test_batch_insert_dedup_by_hash() {
    let mut db = Database::open_in_memory().unwrap();
    let mut a = make_entry(EntryKind::Expense, "Coffee", dec!(4.5), 1);
    a.import_hash = a.content_hash();
    // Same content, different id: a re-import of the same CSV row.
    let mut b = a.clone().with_id(EntryId::generate());
    b.import_hash = b.content_hash();

    assert_eq!(db.insert_entries_batch(&[a]).unwrap(), 1);
    assert_eq!(db.insert_entries_batch(&[b]).unwrap(), 0);
    assert_eq!(db.get_entry_count().unwrap(), 1);
}

#[test]
fn test_batch_insert_dedup_by_id() {
    let mut db = Database::open_in_memory().unwrap();
    let a = make_entry(EntryKind::Income, "Salary", dec!(3000), 1);
    assert_eq!(db.insert_entries_batch(std::slice::from_ref(&a)).unwrap(), 1);
    assert_eq!(db.insert_entries_batch(std::slice::from_ref(&a)).unwrap(), 0);
}

#[test]
fn test_batch_insert_empty_hash_not_deduped() {
    let mut db = Database::open_in_memory().unwrap();
    let a = make_entry(EntryKind::Expense, "Coffee", dec!(4.5), 1);
    let b = make_entry(EntryKind::Expense, "Coffee", dec!(4.5), 1);
    assert!(a.import_hash.is_empty());
    assert_eq!(db.insert_entries_batch(&[a, b]).unwrap(), 2);
}

// ── Budget caps ───────────────────────────────────────────────

#[test]
fn test_cap_upsert_and_delete() {
    let db = Database::open_in_memory().unwrap();
    let key = CategoryName::new("groceries");
    db.upsert_cap(&key, dec!(400)).unwrap();
    db.upsert_cap(&key, dec!(500)).unwrap();

    let caps = db.get_budget_caps().unwrap();
    assert_eq!(caps.len(), 1);
    assert_eq!(caps.get("GROCERIES"), dec!(500));

    assert!(db.delete_cap(&key).unwrap());
    assert!(!db.delete_cap(&key).unwrap());
    assert!(db.get_budget_caps().unwrap().is_empty());
}

#[test]
fn test_zero_cap_persists() {
    let db = Database::open_in_memory().unwrap();
    db.upsert_cap(&CategoryName::new("Travel"), Decimal::ZERO)
        .unwrap();
    let caps = db.get_budget_caps().unwrap();
    assert!(caps.contains("travel"));
}

// ── Snapshot ──────────────────────────────────────────────────

#[test]
fn test_load_snapshot() {
    let db = Database::open_in_memory().unwrap();
    db.insert_entry(&make_entry(EntryKind::Income, "Salary", dec!(3000), 1))
        .unwrap();
    db.insert_entry(&make_entry(EntryKind::Expense, "Rent", dec!(1200), 2))
        .unwrap();
    db.upsert_cap(&CategoryName::new("Food"), dec!(300)).unwrap();

    let snapshot = db.load_snapshot().unwrap();
    assert_eq!(snapshot.income.len(), 1);
    assert_eq!(snapshot.expenses.len(), 1);
    assert_eq!(snapshot.caps.get("food"), dec!(300));
}

// ── Import Rules ──────────────────────────────────────────────

#[test]
fn test_import_rule_crud() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .insert_import_rule(&ImportRule::new_contains("coffee".into(), "coffee shops"))
        .unwrap();
    let rules = db.get_import_rules().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].category.as_str(), "Coffee Shops");
    assert!(db.delete_import_rule(id).unwrap());
    assert!(db.get_import_rules().unwrap().is_empty());
}

#[test]
fn test_import_rules_ordered_by_priority() {
    let db = Database::open_in_memory().unwrap();
    db.insert_import_rule(&ImportRule::new_contains("low".into(), "A"))
        .unwrap();
    db.insert_import_rule(&ImportRule::new_contains("high".into(), "B").with_priority(10))
        .unwrap();
    let rules = db.get_import_rules().unwrap();
    assert_eq!(rules[0].pattern, "high");
    assert_eq!(rules[1].pattern, "low");
}

// ── Schema migration ──────────────────────────────────────────

#[test]
fn test_schema_version_set() {
    let db = Database::open_in_memory().unwrap();
    let version: i32 = db
        .conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(version, schema::CURRENT_VERSION);
}

#[test]
fn test_double_migrate_idempotent() {
    let mut db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();
    let version: i32 = db
        .conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(version, schema::CURRENT_VERSION);
}

#[test]
fn test_open_on_disk_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("budget.db");
    {
        let db = Database::open(&path).unwrap();
        db.insert_entry(&make_entry(EntryKind::Income, "Salary", dec!(1), 1))
            .unwrap();
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(db.get_entry_count().unwrap(), 1);
}

// ── Amount storage ────────────────────────────────────────────

#[test]
fn test_decimal_precision_preserved() {
    let db = Database::open_in_memory().unwrap();
    let entry = make_entry(EntryKind::Expense, "Precise", dec!(1234.5678), 1);
    db.insert_entry(&entry).unwrap();
    let fetched = db.get_entry_by_id(entry.id.as_str()).unwrap().unwrap();
    assert_eq!(fetched.amount, dec!(1234.5678));
}

#[test]
fn test_corrupt_amount_reads_as_zero() {
    let db = Database::open_in_memory().unwrap();
    db.conn
        .execute(
            "INSERT INTO entries (id, kind, name, amount, category, cadence, date, created_at)
             VALUES ('x1', 'expense', 'Bad', 'abc', NULL, 'sometimes', 'never', 'garbage')",
            [],
        )
        .unwrap();
    let e = db.get_entry_by_id("x1").unwrap().unwrap();
    assert_eq!(e.amount, Decimal::ZERO);
    assert_eq!(e.cadence, Cadence::Unknown);
    assert!(e.date.is_none());
    assert!(e.category.unwrap().is_uncategorized());
}
