use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::amount::{clamp_amount, coerce_amount};
use super::{Cadence, CategoryName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "inc" | "in" => Some(Self::Income),
            "expense" | "expenses" | "exp" | "out" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque entry identifier. Entries created here get a UUID; imported ones
/// keep whatever id they came with.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub(crate) struct EntryId(String);

impl EntryId {
    pub(crate) fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Wrap an existing id, generating a fresh one when it is blank.
    pub(crate) fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::generate()
        } else {
            Self(trimmed.to_string())
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An income or expense line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MoneyEntry {
    pub(crate) id: EntryId,
    #[serde(skip)]
    pub(crate) kind: EntryKind,
    pub(crate) name: String,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub(crate) amount: Decimal,
    /// Always set for expenses. Income only carries one when it was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) category: Option<CategoryName>,
    pub(crate) cadence: Cadence,
    pub(crate) date: Option<NaiveDate>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub(crate) created_at: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) import_hash: String,
}

impl MoneyEntry {
    /// Build an entry, applying the coercion rules: negative amounts become
    /// 0, names are trimmed and expense categories are normalized (blank
    /// becomes "Uncategorized").
    pub(crate) fn new(
        kind: EntryKind,
        name: &str,
        amount: Decimal,
        category: Option<&str>,
        cadence: Cadence,
        date: Option<NaiveDate>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let category = match kind {
            EntryKind::Expense => Some(CategoryName::new(category.unwrap_or_default())),
            EntryKind::Income => category
                .filter(|c| !c.trim().is_empty())
                .map(CategoryName::new),
        };
        Self {
            id: EntryId::generate(),
            kind,
            name: name.trim().to_string(),
            amount: clamp_amount(amount),
            category,
            cadence,
            date,
            created_at,
            import_hash: String::new(),
        }
    }

    pub(crate) fn with_id(mut self, id: EntryId) -> Self {
        self.id = id;
        self
    }

    pub(crate) fn is_income(&self) -> bool {
        self.kind == EntryKind::Income
    }

    pub(crate) fn is_expense(&self) -> bool {
        self.kind == EntryKind::Expense
    }

    /// The category used for spend grouping.
    pub(crate) fn spend_category(&self) -> CategoryName {
        self.category
            .clone()
            .unwrap_or_else(CategoryName::uncategorized)
    }

    /// Mirrors the entry forms: a blank name or a zero amount is not saved.
    pub(crate) fn is_submittable(&self) -> bool {
        !self.name.is_empty() && !self.amount.is_zero()
    }

    /// Stable hash of the fields that identify an imported row.
    pub(crate) fn content_hash(&self) -> String {
        let date = self.date.map(|d| d.to_string()).unwrap_or_default();
        let input = format!(
            "{}|{date}|{}|{}",
            self.kind.as_str(),
            self.name,
            self.amount.normalize()
        );
        format!("{:016x}", fnv1a(input.as_bytes()))
    }
}

/// FNV-1a (64-bit): stable across Rust releases, unlike `DefaultHasher`.
fn fnv1a(data: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &byte in data {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Raw form input before coercion.
#[derive(Debug, Clone)]
pub(crate) struct EntryDraft {
    pub(crate) kind: EntryKind,
    pub(crate) name: String,
    pub(crate) amount: String,
    pub(crate) category: Option<String>,
    pub(crate) cadence: String,
    pub(crate) date: Option<String>,
}

impl EntryDraft {
    pub(crate) fn new(kind: EntryKind, name: &str, amount: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            amount: amount.to_string(),
            category: None,
            cadence: Cadence::Monthly.as_str().to_string(),
            date: None,
        }
    }

    pub(crate) fn into_entry(self, created_at: DateTime<Utc>) -> MoneyEntry {
        let cadence = Cadence::parse(&self.cadence);
        if cadence == Cadence::Unknown {
            tracing::warn!(cadence = %self.cadence, "unrecognized cadence, entry will not count toward monthly totals");
        }
        MoneyEntry::new(
            self.kind,
            &self.name,
            coerce_amount(&self.amount),
            self.category.as_deref(),
            cadence,
            self.date.as_deref().and_then(parse_date),
            created_at,
        )
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%m-%d-%Y", "%d/%m/%Y"];

/// Parse a calendar date in ISO or one of the common US layouts.
/// Blank or unparsable text is treated as "no date".
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Accept full timestamps by looking at the date part only.
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| {
            // `%Y` also takes "24"; a two-digit year belongs to `%y`.
            NaiveDate::parse_from_str(date_part, fmt)
                .ok()
                .filter(|d| d.year() >= 1000)
        })
}
