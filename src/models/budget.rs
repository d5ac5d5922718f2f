use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::amount::clamp_amount;
use super::CategoryName;

/// Monthly spending caps keyed by normalized category.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct BudgetCaps {
    caps: BTreeMap<CategoryName, Decimal>,
}

impl BudgetCaps {
    /// Store `max(0, amount)` under the normalized category and return the
    /// key it was stored under. A zero cap stays in the map.
    pub(crate) fn set(&mut self, category: &str, amount: Decimal) -> CategoryName {
        let key = CategoryName::new(category);
        self.caps.insert(key.clone(), clamp_amount(amount));
        key
    }

    /// Remove the cap entirely. Returns the previous cap, if any.
    pub(crate) fn remove(&mut self, category: &str) -> Option<Decimal> {
        self.caps.remove(&CategoryName::new(category))
    }

    /// Cap for `category` (any casing), 0 when none is set.
    pub(crate) fn get(&self, category: &str) -> Decimal {
        self.cap_for(&CategoryName::new(category))
    }

    pub(crate) fn cap_for(&self, category: &CategoryName) -> Decimal {
        self.caps.get(category).copied().unwrap_or_default()
    }

    pub(crate) fn contains(&self, category: &str) -> bool {
        self.caps.contains_key(&CategoryName::new(category))
    }

    pub(crate) fn categories(&self) -> impl Iterator<Item = &CategoryName> {
        self.caps.keys()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&CategoryName, &Decimal)> {
        self.caps.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.caps.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.caps.is_empty()
    }
}

impl FromIterator<(CategoryName, Decimal)> for BudgetCaps {
    fn from_iter<I: IntoIterator<Item = (CategoryName, Decimal)>>(iter: I) -> Self {
        let caps = iter
            .into_iter()
            .map(|(category, amount)| (category, clamp_amount(amount)))
            .collect();
        Self { caps }
    }
}
