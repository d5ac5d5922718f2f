use serde::{Deserialize, Serialize};

pub(crate) const UNCATEGORIZED: &str = "Uncategorized";

/// A normalized category label.
///
/// The only way to build one is through [`CategoryName::new`], so every key
/// used to join expenses with budget caps has gone through the same
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub(crate) struct CategoryName(String);

impl CategoryName {
    pub(crate) fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self(UNCATEGORIZED.to_string());
        }
        Self(title_case(trimmed))
    }

    pub(crate) fn uncategorized() -> Self {
        Self(UNCATEGORIZED.to_string())
    }

    pub(crate) fn is_uncategorized(&self) -> bool {
        self.0 == UNCATEGORIZED
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lower-case everything, then upper-case the first character of every word.
/// A word starts at an alphanumeric or `_` that follows anything else, so
/// "rock'n'roll" becomes "Rock'N'Roll" and "food & dining" becomes
/// "Food & Dining".
///
/// Characters whose upper case is more than one character ("ß", "ﬁ") are
/// left lower case, so running the result through again changes nothing.
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars().flat_map(char::to_lowercase) {
        let word_char = c.is_alphanumeric() || c == '_';
        if word_char && !in_word {
            out.push(single_upper(c));
        } else {
            out.push(c);
        }
        in_word = word_char;
    }
    out
}

fn single_upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

impl From<String> for CategoryName {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for CategoryName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<CategoryName> for String {
    fn from(name: CategoryName) -> Self {
        name.0
    }
}

impl std::fmt::Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
