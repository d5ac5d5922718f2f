#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;
use crate::clock::FixedClock;
use crate::models::{EntryKind, UNCATEGORIZED};

fn session_on(y: i32, m: u32, d: u32) -> Session {
    let db = Database::open_in_memory().unwrap();
    let clock = FixedClock::on(NaiveDate::from_ymd_opt(y, m, d).unwrap());
    Session::open(db, Box::new(clock)).unwrap()
}

fn expense_draft(name: &str, amount: &str, category: &str, cadence: &str) -> EntryDraft {
    let mut draft = EntryDraft::new(EntryKind::Expense, name, amount);
    draft.category = Some(category.into());
    draft.cadence = cadence.into();
    draft
}

#[test]
fn test_add_entry_persists_and_updates_snapshot() {
    let mut session = session_on(2024, 5, 10);
    let entry = session
        .add_entry(expense_draft("Rent", "1200", "housing", "monthly"))
        .unwrap()
        .unwrap();
    assert_eq!(session.snapshot().expenses.len(), 1);
    assert_eq!(session.db().get_entry_count().unwrap(), 1);
    assert_eq!(entry.category.unwrap().as_str(), "Housing");
    assert_eq!(session.aggregator().monthly_expenses(), dec!(1200));
}

#[test]
fn test_add_entry_newest_first() {
    let mut session = session_on(2024, 5, 10);
    session
        .add_entry(EntryDraft::new(EntryKind::Income, "First", "1"))
        .unwrap();
    session
        .add_entry(EntryDraft::new(EntryKind::Income, "Second", "2"))
        .unwrap();
    let names: Vec<&str> = session
        .snapshot()
        .income
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, vec!["Second", "First"]);
}

#[test]
fn test_blank_or_zero_entries_are_ignored() {
    let mut session = session_on(2024, 5, 10);
    assert!(session
        .add_entry(EntryDraft::new(EntryKind::Expense, "", "10"))
        .unwrap()
        .is_none());
    assert!(session
        .add_entry(EntryDraft::new(EntryKind::Expense, "Coffee", "free"))
        .unwrap()
        .is_none());
    assert!(session.snapshot().is_empty());
    assert_eq!(session.db().get_entry_count().unwrap(), 0);
}

#[test]
fn test_missing_category_defaults() {
    let mut session = session_on(2024, 5, 10);
    let entry = session
        .add_entry(expense_draft("Mystery", "9", "", "oneoff"))
        .unwrap()
        .unwrap();
    assert_eq!(entry.category.unwrap().as_str(), UNCATEGORIZED);
}

#[test]
fn test_delete_entry() {
    let mut session = session_on(2024, 5, 10);
    let entry = session
        .add_entry(EntryDraft::new(EntryKind::Income, "Salary", "3000"))
        .unwrap()
        .unwrap();
    let removed = session.delete_entry(entry.id.as_str()).unwrap().unwrap();
    assert_eq!(removed.name, "Salary");
    assert!(session.snapshot().income.is_empty());
    assert!(session.delete_entry(entry.id.as_str()).unwrap().is_none());
}

#[test]
fn test_set_cap_then_progress_any_casing() {
    let mut session = session_on(2024, 5, 10);
    let key = session.set_cap("groceries", dec!(500)).unwrap();
    assert_eq!(key.as_str(), "Groceries");
    let p = session.aggregator().progress("Groceries");
    assert_eq!(p.cap, dec!(500));
    assert_eq!(session.db().get_budget_caps().unwrap().get("groceries"), dec!(500));
}

#[test]
fn test_cap_survives_reload_for_multi_char_upper_case() {
    let mut session = session_on(2024, 5, 10);
    session.set_cap("ßauna", dec!(100)).unwrap();
    session
        .add_entry(expense_draft("Spa day", "40", "ßAUNA", "monthly"))
        .unwrap();
    session.reload().unwrap();
    let p = session.aggregator().progress("ßauna");
    assert_eq!(p.cap, dec!(100));
    assert_eq!(p.spent, dec!(40));
    assert_eq!(session.aggregator().progress_all().len(), 1);
}

#[test]
fn test_set_cap_negative_stores_zero() {
    let mut session = session_on(2024, 5, 10);
    session.set_cap("fun", dec!(-20)).unwrap();
    let p = session.aggregator().progress("FUN");
    assert_eq!(p.cap, dec!(0));
    assert_eq!(p.percent, 0);
    assert!(!p.over);
}

#[test]
fn test_remove_cap_drops_category_from_progress() {
    let mut session = session_on(2024, 5, 10);
    session.set_cap("travel", dec!(200)).unwrap();
    assert_eq!(session.aggregator().progress_all().len(), 1);
    assert!(session.remove_cap("TRAVEL").unwrap());
    assert!(session.aggregator().progress_all().is_empty());
    assert!(!session.remove_cap("travel").unwrap());
}

#[test]
fn test_cap_joins_with_expense_category() {
    let mut session = session_on(2024, 5, 10);
    session
        .add_entry(expense_draft("Shop", "300", "GROCERIES", "monthly"))
        .unwrap();
    session.set_cap("groceries", dec!(250)).unwrap();
    let all = session.aggregator().progress_all();
    assert_eq!(all.len(), 1);
    assert!(all[0].over);
    assert_eq!(all[0].percent, 100);
}

#[test]
fn test_oneoff_this_month_vs_next_month() {
    let db = Database::open_in_memory().unwrap();
    let may = FixedClock::on(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
    let mut session = Session::open(db, Box::new(may)).unwrap();
    session
        .add_entry(expense_draft("Groceries", "100", "Food", "monthly"))
        .unwrap();
    let mut draft = expense_draft("Party", "50", "Food", "oneoff");
    draft.date = Some("2024-05-10".into());
    session.add_entry(draft).unwrap();

    let spend = session.aggregator().category_spend();
    assert_eq!(spend[&CategoryName::new("Food")], dec!(150));

    let june = FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
    let later = Aggregator::new(session.snapshot(), &june);
    assert_eq!(later.category_spend()[&CategoryName::new("Food")], dec!(100));
}

#[test]
fn test_wipe_keeps_caps() {
    let mut session = session_on(2024, 5, 10);
    session
        .add_entry(EntryDraft::new(EntryKind::Income, "Salary", "3000"))
        .unwrap();
    session.set_cap("rent", dec!(1000)).unwrap();
    assert_eq!(session.wipe().unwrap(), 1);
    assert!(session.snapshot().is_empty());
    session.reload().unwrap();
    assert!(session.snapshot().is_empty());
    assert_eq!(session.snapshot().caps.len(), 1);
}

#[test]
fn test_import_entries_reloads() {
    let mut session = session_on(2024, 5, 10);
    let now = session.clock().now();
    let entries = vec![
        EntryDraft::new(EntryKind::Income, "Bonus", "500").into_entry(now),
        EntryDraft::new(EntryKind::Expense, "Bike", "200").into_entry(now),
    ];
    assert_eq!(session.import_entries(&entries).unwrap(), 2);
    assert_eq!(session.import_entries(&entries).unwrap(), 0);
    assert_eq!(session.snapshot().income.len(), 1);
    assert_eq!(session.snapshot().expenses.len(), 1);
}
