use super::CategoryName;

/// Assigns a category to imported expenses whose description matches.
#[derive(Debug, Clone)]
pub(crate) struct ImportRule {
    pub(crate) id: Option<i64>,
    pub(crate) pattern: String,
    pub(crate) category: CategoryName,
    pub(crate) is_regex: bool,
    pub(crate) priority: i32,
}

impl ImportRule {
    pub(crate) fn new_contains(pattern: String, category: &str) -> Self {
        Self {
            id: None,
            pattern,
            category: CategoryName::new(category),
            is_regex: false,
            priority: 0,
        }
    }

    pub(crate) fn new_regex(pattern: String, category: &str) -> Self {
        Self {
            id: None,
            pattern,
            category: CategoryName::new(category),
            is_regex: true,
            priority: 0,
        }
    }

    pub(crate) fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}
