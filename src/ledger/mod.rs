//! Monthly aggregation over a snapshot of entries and budget caps.
//!
//! Recurring entries contribute their monthly-equivalent every month. One-off
//! entries contribute their full amount only in the calendar month (UTC) they
//! are dated in, and nothing otherwise.

mod budget;

pub(crate) use budget::BudgetProgress;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::clock::Clock;
use crate::models::{BudgetCaps, Cadence, CategoryName, EntryKind, MoneyEntry};

pub(crate) const DEFAULT_UPCOMING_DAYS: u32 = 14;

/// Everything the aggregation needs, as loaded from storage.
#[derive(Debug, Clone, Default)]
pub(crate) struct Snapshot {
    pub(crate) income: Vec<MoneyEntry>,
    pub(crate) expenses: Vec<MoneyEntry>,
    pub(crate) caps: BudgetCaps,
}

impl Snapshot {
    pub(crate) fn entries(&self, kind: EntryKind) -> &[MoneyEntry] {
        match kind {
            EntryKind::Income => &self.income,
            EntryKind::Expense => &self.expenses,
        }
    }

    pub(crate) fn entries_mut(&mut self, kind: EntryKind) -> &mut Vec<MoneyEntry> {
        match kind {
            EntryKind::Income => &mut self.income,
            EntryKind::Expense => &mut self.expenses,
        }
    }

    pub(crate) fn all_entries(&self) -> impl Iterator<Item = &MoneyEntry> {
        self.income.iter().chain(self.expenses.iter())
    }

    pub(crate) fn find(&self, id: &str) -> Option<&MoneyEntry> {
        self.all_entries().find(|e| e.id.as_str() == id)
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.income.is_empty() && self.expenses.is_empty()
    }
}

/// Headline monthly figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MonthlySummary {
    pub(crate) income: Decimal,
    pub(crate) expenses: Decimal,
    pub(crate) net: Decimal,
}

pub(crate) fn in_same_month(date: NaiveDate, today: NaiveDate) -> bool {
    date.year() == today.year() && date.month() == today.month()
}

/// What one entry adds to the month containing `today`.
pub(crate) fn monthly_contribution(entry: &MoneyEntry, today: NaiveDate) -> Decimal {
    let recurring = entry.cadence.monthly_equivalent(entry.amount);
    if entry.cadence == Cadence::OneOff && entry.date.is_some_and(|d| in_same_month(d, today)) {
        recurring.saturating_add(entry.amount)
    } else {
        recurring
    }
}

pub(crate) fn monthly_total<'a>(
    entries: impl IntoIterator<Item = &'a MoneyEntry>,
    today: NaiveDate,
) -> Decimal {
    entries
        .into_iter()
        .map(|e| monthly_contribution(e, today))
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Monthly spend per category. Every capped category is present, with 0 when
/// nothing was spent.
pub(crate) fn category_spend<'a>(
    expenses: impl IntoIterator<Item = &'a MoneyEntry>,
    caps: &BudgetCaps,
    today: NaiveDate,
) -> BTreeMap<CategoryName, Decimal> {
    let mut spend: BTreeMap<CategoryName, Decimal> = caps
        .categories()
        .map(|c| (c.clone(), Decimal::ZERO))
        .collect();
    for entry in expenses {
        let total = spend.entry(entry.spend_category()).or_default();
        *total = total.saturating_add(monthly_contribution(entry, today));
    }
    spend
}

/// Dated entries due within `window_days` of `today` (inclusive at both ends),
/// ascending by date. Undated entries never appear.
pub(crate) fn upcoming<'a>(
    entries: impl IntoIterator<Item = &'a MoneyEntry>,
    today: NaiveDate,
    window_days: u32,
) -> Vec<&'a MoneyEntry> {
    let window = i64::from(window_days);
    let mut due: Vec<&MoneyEntry> = entries
        .into_iter()
        .filter(|e| {
            e.date.is_some_and(|d| {
                let diff = d.signed_duration_since(today).num_days();
                (0..=window).contains(&diff)
            })
        })
        .collect();
    due.sort_by_key(|e| e.date);
    due
}

/// Read-only view of a snapshot as of one instant.
pub(crate) struct Aggregator<'a> {
    snapshot: &'a Snapshot,
    today: NaiveDate,
}

impl<'a> Aggregator<'a> {
    pub(crate) fn new(snapshot: &'a Snapshot, clock: &dyn Clock) -> Self {
        Self::at(snapshot, clock.today())
    }

    pub(crate) fn at(snapshot: &'a Snapshot, today: NaiveDate) -> Self {
        Self { snapshot, today }
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.today
    }

    pub(crate) fn monthly_income(&self) -> Decimal {
        monthly_total(&self.snapshot.income, self.today)
    }

    pub(crate) fn monthly_expenses(&self) -> Decimal {
        monthly_total(&self.snapshot.expenses, self.today)
    }

    pub(crate) fn net(&self) -> Decimal {
        self.monthly_income()
            .saturating_sub(self.monthly_expenses())
    }

    pub(crate) fn summary(&self) -> MonthlySummary {
        MonthlySummary {
            income: self.monthly_income(),
            expenses: self.monthly_expenses(),
            net: self.net(),
        }
    }

    pub(crate) fn category_spend(&self) -> BTreeMap<CategoryName, Decimal> {
        category_spend(&self.snapshot.expenses, &self.snapshot.caps, self.today)
    }

    /// Income and expenses due in the next `window_days`, ascending by date.
    /// Same-day income is listed before same-day expenses.
    pub(crate) fn upcoming(&self, window_days: u32) -> Vec<&'a MoneyEntry> {
        upcoming(self.snapshot.all_entries(), self.today, window_days)
    }

    /// One-off entries dated in the current month, ascending by date.
    pub(crate) fn this_month_one_offs(&self) -> Vec<&'a MoneyEntry> {
        let mut items: Vec<&MoneyEntry> = self
            .snapshot
            .all_entries()
            .filter(|e| {
                e.cadence == Cadence::OneOff
                    && e.date.is_some_and(|d| in_same_month(d, self.today))
            })
            .collect();
        items.sort_by_key(|e| e.date);
        items
    }

    /// Budget progress for one category, looked up case-insensitively.
    pub(crate) fn progress(&self, category: &str) -> BudgetProgress {
        let key = CategoryName::new(category);
        let spent = monthly_total(
            self.snapshot
                .expenses
                .iter()
                .filter(|e| e.spend_category() == key),
            self.today,
        );
        let cap = self.snapshot.caps.cap_for(&key);
        BudgetProgress::new(key, spent, cap)
    }

    /// Progress for every category that has spend or a cap, sorted by name.
    pub(crate) fn progress_all(&self) -> Vec<BudgetProgress> {
        self.category_spend()
            .into_iter()
            .map(|(category, spent)| {
                let cap = self.snapshot.caps.cap_for(&category);
                BudgetProgress::new(category, spent, cap)
            })
            .collect()
    }
}
