use regex::{Regex, RegexBuilder};

use crate::models::{CategoryName, ImportRule, MoneyEntry};

pub(crate) struct Categorizer {
    rules: Vec<CompiledRule>,
}

struct CompiledRule {
    pattern: String,
    regex: Option<Regex>,
    category: CategoryName,
}

impl Categorizer {
    /// Compile `rules` (already in priority order). Regex rules that fail to
    /// compile are left out and their patterns returned alongside.
    pub(crate) fn new(rules: &[ImportRule]) -> (Self, Vec<String>) {
        let mut bad_patterns = Vec::new();
        let mut compiled = Vec::with_capacity(rules.len());
        for r in rules {
            let regex = if r.is_regex {
                match RegexBuilder::new(&r.pattern).case_insensitive(true).build() {
                    Ok(re) => Some(re),
                    Err(e) => {
                        tracing::warn!(pattern = %r.pattern, error = %e, "skipping invalid regex rule");
                        bad_patterns.push(r.pattern.clone());
                        continue;
                    }
                }
            } else {
                None
            };
            compiled.push(CompiledRule {
                pattern: r.pattern.to_lowercase(),
                regex,
                category: r.category.clone(),
            });
        }

        (Self { rules: compiled }, bad_patterns)
    }

    pub(crate) fn categorize(&self, description: &str) -> Option<&CategoryName> {
        let desc_lower = description.to_lowercase();

        self.rules
            .iter()
            .find(|rule| match &rule.regex {
                Some(re) => re.is_match(description),
                None => desc_lower.contains(&rule.pattern),
            })
            .map(|rule| &rule.category)
    }

    /// Fill in categories for expenses that are still uncategorized.
    /// Returns how many were assigned.
    pub(crate) fn categorize_batch(&self, entries: &mut [MoneyEntry]) -> usize {
        let mut assigned = 0;
        for entry in entries.iter_mut().filter(|e| e.is_expense()) {
            let uncategorized = entry
                .category
                .as_ref()
                .map_or(true, CategoryName::is_uncategorized);
            if !uncategorized {
                continue;
            }
            if let Some(category) = self.categorize(&entry.name) {
                entry.category = Some(category.clone());
                assigned += 1;
            }
        }
        assigned
    }
}

/// Suggest a contains-pattern for an uncategorized description: its first
/// one or two words with digits and store-number noise removed.
pub(crate) fn suggest_rule(description: &str) -> String {
    let cleaned = description
        .to_uppercase()
        .replace(|c: char| c.is_ascii_digit(), "")
        .replace('#', "")
        .replace('*', " ")
        .trim()
        .to_string();

    let words: Vec<&str> = cleaned.split_whitespace().collect();
    let pattern = match words.as_slice() {
        [first, second, ..] => format!("{first} {second}"),
        [only] => only.to_string(),
        [] => description.to_string(),
    };

    pattern.to_lowercase()
}
