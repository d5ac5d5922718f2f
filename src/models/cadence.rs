use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// How often a money entry recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Cadence {
    OneOff,
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
    /// Anything we could not recognise. Kept so bad input never fails, but
    /// it contributes nothing to monthly figures.
    Unknown,
}

const WEEKS_PER_YEAR: Decimal = Decimal::from_parts(52, 0, 0, false, 0);
const FORTNIGHTS_PER_YEAR: Decimal = Decimal::from_parts(26, 0, 0, false, 0);
const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

impl Cadence {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::OneOff => "oneoff",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Unknown => "unknown",
        }
    }

    pub(crate) fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "oneoff" | "one-off" | "one off" | "once" => Self::OneOff,
            "weekly" => Self::Weekly,
            "biweekly" | "bi-weekly" | "fortnightly" => Self::Biweekly,
            "monthly" => Self::Monthly,
            "yearly" | "annual" | "annually" => Self::Yearly,
            _ => Self::Unknown,
        }
    }

    pub(crate) fn all() -> &'static [Cadence] {
        &[
            Self::OneOff,
            Self::Weekly,
            Self::Biweekly,
            Self::Monthly,
            Self::Yearly,
        ]
    }

    /// Monthly-equivalent of `amount` at this cadence.
    ///
    /// One-off and unknown cadences are 0 here; one-offs are added back by the
    /// aggregator only for the month they fall in.
    pub(crate) fn monthly_equivalent(&self, amount: Decimal) -> Decimal {
        match self {
            Self::Weekly => amount.saturating_mul(WEEKS_PER_YEAR) / MONTHS_PER_YEAR,
            Self::Biweekly => amount.saturating_mul(FORTNIGHTS_PER_YEAR) / MONTHS_PER_YEAR,
            Self::Yearly => amount / MONTHS_PER_YEAR,
            Self::Monthly => amount,
            Self::OneOff | Self::Unknown => Decimal::ZERO,
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Cadence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
