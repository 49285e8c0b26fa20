use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::info;

use crate::filter::{self, Filter, Stats};
use crate::storage::KeyValueStore;
use crate::task::{Clock, SystemClock, Todo, TodoDraft};
use crate::todo_store::{Outcome, TodoStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Description,
    Priority,
    Category,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Title,
        FormField::Description,
        FormField::Priority,
        FormField::Category,
    ];

    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Priority,
            FormField::Priority => FormField::Category,
            FormField::Category => FormField::Title,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            FormField::Title => FormField::Category,
            FormField::Description => FormField::Title,
            FormField::Priority => FormField::Description,
            FormField::Category => FormField::Priority,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Priority => "Priority",
            FormField::Category => "Category",
        }
    }
}

/// Create form, or inline edit of a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub editing: Option<String>,
    pub draft: TodoDraft,
    pub field: FormField,
}

impl Form {
    pub fn create() -> Self {
        Self {
            editing: None,
            draft: TodoDraft::default(),
            field: FormField::Title,
        }
    }

    pub fn edit(todo: &Todo) -> Self {
        Self {
            editing: Some(todo.id.clone()),
            draft: TodoDraft::from_todo(todo),
            field: FormField::Title,
        }
    }

    pub fn title(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit todo"
        } else {
            "New todo"
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.field {
            FormField::Title => Some(&mut self.draft.title),
            FormField::Description => Some(&mut self.draft.description),
            FormField::Category => Some(&mut self.draft.category),
            FormField::Priority => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Search,
    Form(Form),
}

pub struct App<S, C = SystemClock> {
    store: TodoStore<S, C>,
    pub todos: Vec<Todo>,
    pub filter: Filter,
    pub selected: usize,
    pub mode: Mode,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl<S: KeyValueStore, C: Clock> App<S, C> {
    pub fn new(store: TodoStore<S, C>) -> Self {
        let todos = store.load();
        Self {
            store,
            todos,
            filter: Filter::default(),
            selected: 0,
            mode: Mode::Normal,
            status: None,
            should_quit: false,
        }
    }

    pub fn store(&self) -> &TodoStore<S, C> {
        &self.store
    }

    pub fn visible(&self) -> Vec<&Todo> {
        self.filter.apply(&self.todos)
    }

    pub fn selected_todo(&self) -> Option<&Todo> {
        self.visible().get(self.selected).copied()
    }

    pub fn stats(&self) -> Stats {
        Stats::from_todos(&self.todos)
    }

    pub fn categories(&self) -> Vec<String> {
        filter::categories(&self.todos)
    }

    /// Re-reads the list from storage and keeps the selection in range.
    pub fn refresh(&mut self) {
        self.todos = self.store.load();
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Search => self.handle_search_key(key),
            Mode::Form(_) => self.handle_form_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        self.status = None;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.visible().len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('a') => self.mode = Mode::Form(Form::create()),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(todo) = self.selected_todo() {
                    self.mode = Mode::Form(Form::edit(todo));
                }
            }
            KeyCode::Char(' ') => {
                if let Some(id) = self.selected_id() {
                    let outcome = self.store.toggle(&id);
                    self.after_mutation(outcome, "Toggled");
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    let outcome = self.store.delete(&id);
                    self.after_mutation(outcome, "Deleted");
                }
            }
            KeyCode::Char('/') => self.mode = Mode::Search,
            KeyCode::Char('p') => self.refilter(|f, _| f.cycle_priority()),
            KeyCode::Char('c') => self.refilter(|f, known| f.cycle_category(known)),
            KeyCode::Char('s') => self.refilter(|f, _| f.cycle_status()),
            KeyCode::Char('x') => self.refilter(|f, _| *f = Filter::default()),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.mode = Mode::Normal,
            KeyCode::Esc => {
                self.filter.search.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Backspace => {
                self.filter.search.pop();
            }
            KeyCode::Char(c) => self.filter.search.push(c),
            _ => {}
        }
        self.clamp_selection();
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                return;
            }
            KeyCode::Enter => {
                self.submit_form();
                return;
            }
            _ => {}
        }
        let Mode::Form(form) = &mut self.mode else {
            return;
        };

        match key.code {
            KeyCode::Tab | KeyCode::Down => form.field = form.field.next(),
            KeyCode::BackTab | KeyCode::Up => form.field = form.field.previous(),
            KeyCode::Left if form.field == FormField::Priority => {
                form.draft.priority = form.draft.priority.previous();
            }
            KeyCode::Right | KeyCode::Char(' ') if form.field == FormField::Priority => {
                form.draft.priority = form.draft.priority.next();
            }
            KeyCode::Backspace => {
                if let Some(text) = form.text_mut() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = form.text_mut() {
                    text.push(c);
                }
            }
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let Mode::Form(form) = &self.mode else {
            return;
        };
        let Form { editing, draft, .. } = form.clone();

        let submitted = match editing.as_deref() {
            None => draft.into_new_todo(self.store.now()).map(|todo| {
                info!(id = %todo.id, "adding todo");
                self.store.add(todo)
            }),
            Some(id) => draft
                .into_patch()
                .map(|patch| self.store.update(id, &patch)),
        };
        let outcome = match submitted {
            Ok(outcome) => outcome,
            Err(err) => {
                self.status = Some(format!("Not saved: {err}"));
                return;
            }
        };

        self.mode = Mode::Normal;
        self.after_mutation(outcome, "Saved");
        if editing.is_none() && outcome.is_saved() {
            // Jump to the new entry when the filters show it.
            if self.todos.last().is_some_and(|t| self.filter.matches(t)) {
                self.selected = self.visible().len().saturating_sub(1);
            }
        }
    }

    fn after_mutation(&mut self, outcome: Outcome, done: &str) {
        self.status = Some(match outcome {
            Outcome::Saved => done.to_string(),
            Outcome::NoMatch => "That todo no longer exists".to_string(),
            Outcome::DuplicateId => "A todo with that id already exists".to_string(),
            Outcome::WriteFailed => "Could not write to storage; showing saved state".to_string(),
        });
        self.refresh();
    }

    fn refilter(&mut self, change: impl FnOnce(&mut Filter, &[String])) {
        let known = self.categories();
        change(&mut self.filter, &known);
        self.clamp_selection();
    }

    fn selected_id(&self) -> Option<String> {
        self.selected_todo().map(|t| t.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};
    use crate::task::{Priority, TodoPatch};

    fn press(app: &mut App<MemoryStore>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App<MemoryStore>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn app() -> App<MemoryStore> {
        App::new(TodoStore::new(MemoryStore::new()))
    }

    fn add(app: &mut App<MemoryStore>, title: &str) {
        press(app, KeyCode::Char('a'));
        type_text(app, title);
        press(app, KeyCode::Enter);
    }

    #[test]
    fn test_add_through_form() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "  Buy milk ");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "2 litres");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "home");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Normal);
        let stored = app.store().load();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "Buy milk");
        assert_eq!(stored[0].description.as_deref(), Some("2 litres"));
        assert_eq!(stored[0].priority, Priority::High);
        assert_eq!(stored[0].category.as_deref(), Some("home"));
        assert_eq!(app.todos, stored);
    }

    #[test]
    fn test_blank_title_is_not_submitted() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.mode, Mode::Form(_)));
        assert!(app.store().backend().raw("todos").is_none());
        assert!(app.status.as_deref().unwrap().contains("title"));
    }

    #[test]
    fn test_edit_replaces_fields() {
        let mut app = app();
        add(&mut app, "Draft");
        press(&mut app, KeyCode::Char('e'));
        for _ in 0.."Draft".len() {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "Final");
        press(&mut app, KeyCode::Enter);

        let stored = app.store().load();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "Final");
        assert!(stored[0].updated_at >= stored[0].created_at);
    }

    #[test]
    fn test_cancel_edit_keeps_record() {
        let mut app = app();
        add(&mut app, "Keep me");
        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, " changed");
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.store().load()[0].title, "Keep me");
    }

    #[test]
    fn test_toggle_and_delete_selected() {
        let mut app = app();
        add(&mut app, "one");
        add(&mut app, "two");
        assert_eq!(app.selected, 1);

        press(&mut app, KeyCode::Char(' '));
        assert!(app.store().load()[1].completed);

        press(&mut app, KeyCode::Char('d'));
        let titles: Vec<String> = app.store().load().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, ["one"]);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_search_narrows_visible_list() {
        let mut app = app();
        add(&mut app, "Buy milk");
        add(&mut app, "Write report");

        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "MILK");
        press(&mut app, KeyCode::Enter);

        let visible: Vec<&str> = app.visible().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(visible, ["Buy milk"]);
        assert_eq!(app.selected, 0);

        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.visible().len(), 2);
    }

    #[test]
    fn test_status_filter_hides_completed() {
        let mut app = app();
        add(&mut app, "done");
        press(&mut app, KeyCode::Char(' '));
        add(&mut app, "open");

        press(&mut app, KeyCode::Char('s'));
        let visible: Vec<&str> = app.visible().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(visible, ["open"]);

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.visible().len(), 2);
    }

    #[test]
    fn test_update_of_vanished_record_reports_no_match() {
        let mut app = app();
        add(&mut app, "ghost");
        let id = app.todos[0].id.clone();
        app.store().backend().insert_raw("todos", "[]");

        let outcome = app.store().update(&id, &TodoPatch::default().completed(true));
        assert_eq!(outcome, Outcome::NoMatch);
    }

    struct ReadOnly(MemoryStore);

    impl KeyValueStore for ReadOnly {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut app = App::new(TodoStore::new(ReadOnly(MemoryStore::new())));
        app.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        assert!(app.todos.is_empty());
        assert!(app.status.as_deref().unwrap().contains("Could not write"));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);

        let mut app = self::app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
