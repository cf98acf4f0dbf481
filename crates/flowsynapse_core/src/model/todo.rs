//! Todo record model.

use serde::{Deserialize, Serialize};

/// Category assigned when a task is added under the "All Tasks" view.
pub const GENERAL_CATEGORY: &str = "General";

/// Built-in categories offered by the task view, in display order.
pub const CATEGORIES: &[&str] = &["School", "Personal", "Project"];

/// One task entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    pub category: String,
}

/// Category filter used by list projections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TodoFilter {
    #[default]
    AllTasks,
    Category(String),
}

impl TodoFilter {
    /// Returns whether `todo` is visible under this filter.
    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            Self::AllTasks => true,
            Self::Category(category) => todo.category == *category,
        }
    }

    /// Category a newly added task receives under this filter.
    pub fn category_for_new(&self) -> &str {
        match self {
            Self::AllTasks => GENERAL_CATEGORY,
            Self::Category(category) => category.as_str(),
        }
    }
}
