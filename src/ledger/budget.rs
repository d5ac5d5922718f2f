use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::CategoryName;

/// Spend against the cap for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BudgetProgress {
    pub(crate) category: CategoryName,
    pub(crate) spent: Decimal,
    pub(crate) cap: Decimal,
    /// Whole percent of the cap used, capped at 100. 0 when there is no cap.
    pub(crate) percent: u32,
    pub(crate) over: bool,
}

impl BudgetProgress {
    pub(crate) fn new(category: CategoryName, spent: Decimal, cap: Decimal) -> Self {
        let has_cap = cap > Decimal::ZERO;
        Self {
            category,
            spent,
            cap,
            percent: if has_cap { percent_used(spent, cap) } else { 0 },
            over: has_cap && spent > cap,
        }
    }

    pub(crate) fn has_cap(&self) -> bool {
        self.cap > Decimal::ZERO
    }

    pub(crate) fn remaining(&self) -> Decimal {
        self.cap.saturating_sub(self.spent)
    }
}

fn percent_used(spent: Decimal, cap: Decimal) -> u32 {
    let Some(ratio) = spent
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|v| v.checked_div(cap))
    else {
        return if spent > cap { 100 } else { 0 };
    };
    ratio
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .min(Decimal::ONE_HUNDRED)
        .to_u32()
        .unwrap_or(0)
}
