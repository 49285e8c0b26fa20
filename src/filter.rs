//! Search, filter and summary helpers over an in-memory todo list.

use crate::task::{Priority, Todo};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Active,
            StatusFilter::Active => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        }
    }

    fn matches(self, completed: bool) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !completed,
            StatusFilter::Completed => completed,
        }
    }
}

/// Independent predicates combined with AND. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub search: String,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub status: StatusFilter,
}

impl Filter {
    pub fn matches(&self, todo: &Todo) -> bool {
        self.matches_search(todo)
            && self.priority.map_or(true, |p| todo.priority == p)
            && self
                .category
                .as_deref()
                .map_or(true, |c| todo.category.as_deref() == Some(c))
            && self.status.matches(todo.completed)
    }

    /// Case-insensitive substring match on title or description.
    fn matches_search(&self, todo: &Todo) -> bool {
        let needle = self.search.to_lowercase();
        todo.title.to_lowercase().contains(&needle)
            || todo
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }

    pub fn apply<'a>(&self, todos: &'a [Todo]) -> Vec<&'a Todo> {
        todos.iter().filter(|t| self.matches(t)).collect()
    }

    pub fn is_active(&self) -> bool {
        self != &Filter::default()
    }

    /// all -> high -> medium -> low -> all
    pub fn cycle_priority(&mut self) {
        self.priority = match self.priority {
            None => Some(Priority::High),
            Some(Priority::High) => Some(Priority::Medium),
            Some(Priority::Medium) => Some(Priority::Low),
            Some(Priority::Low) => None,
        };
    }

    /// Steps through "all" and then each known category in order.
    pub fn cycle_category(&mut self, categories: &[String]) {
        let position = self
            .category
            .as_ref()
            .and_then(|c| categories.iter().position(|known| known == c));
        self.category = match position {
            None if self.category.is_none() => categories.first().cloned(),
            None => None,
            Some(i) => categories.get(i + 1).cloned(),
        };
    }

    pub fn cycle_status(&mut self) {
        self.status = self.status.next();
    }
}

/// Distinct categories in first-seen order.
pub fn categories(todos: &[Todo]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for category in todos.iter().filter_map(|t| t.category.as_deref()) {
        if !category.is_empty() && !seen.iter().any(|c| c == category) {
            seen.push(category.to_string());
        }
    }
    seen
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

impl Stats {
    pub fn from_todos(todos: &[Todo]) -> Self {
        let completed = todos.iter().filter(|t| t.completed).count();
        Self {
            total: todos.len(),
            active: todos.len() - completed,
            completed,
        }
    }
}
