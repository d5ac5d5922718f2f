mod amount;
mod budget;
mod cadence;
mod category;
mod entry;
mod import_rule;

pub(crate) use amount::coerce_amount;
pub(crate) use budget::BudgetCaps;
pub(crate) use cadence::Cadence;
pub(crate) use category::{CategoryName, UNCATEGORIZED};
pub(crate) use entry::{parse_date, EntryDraft, EntryId, EntryKind, MoneyEntry};
pub(crate) use import_rule::ImportRule;
