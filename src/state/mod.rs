use crate::api::ApiClient;
use crate::models::{Teacher, TeacherFilters, TeacherPage, TeacherSummary, EMPTY_FIELD};
use crate::repository::{ErrorScope, RepositoryEvent};

#[derive(Clone)]
pub(crate) struct AppState {
    /// Configured once from `window.ENV`.
    pub api_client: ApiClient,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            api_client: ApiClient::from_env(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);

/// Number of columns in the teacher table.
pub(crate) const TABLE_COLUMNS: u32 = 7;
pub(crate) const NO_DATA: &str = "No teachers found";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TeacherRow {
    pub id: i64,
    pub last_name: String,
    pub initial: String,
    pub degree: String,
    pub position: String,
    pub email: String,
    pub experience: String,
}

impl TeacherRow {
    fn from_summary(s: &TeacherSummary) -> Self {
        let text = |v: &Option<String>| {
            v.as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(EMPTY_FIELD)
                .to_string()
        };
        Self {
            id: s.id,
            last_name: text(&s.last_name),
            initial: text(&s.first_initial),
            degree: text(&s.academic_degree),
            position: text(&s.administrative_position),
            email: text(&s.email),
            experience: format!(
                "{} yrs",
                s.experience_years
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| EMPTY_FIELD.to_string())
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TableRow {
    Teacher(TeacherRow),
    /// Single full-width row shown for an empty result.
    Placeholder,
}

pub(crate) fn table_rows(page: &TeacherPage) -> Vec<TableRow> {
    if page.items.is_empty() {
        return vec![TableRow::Placeholder];
    }
    page.items
        .iter()
        .map(|s| TableRow::Teacher(TeacherRow::from_summary(s)))
        .collect()
}

pub(crate) fn table_status(page: &TeacherPage) -> String {
    format!(
        "Total: {} · Page {} · Page size: {}",
        page.total,
        page.page,
        page.effective_page_size()
    )
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum DetailOverlay {
    #[default]
    Hidden,
    Loading(i64),
    Showing(Teacher),
    /// Keeps the id so edit and a delete retry still work.
    Failed { id: i64, message: String },
}

impl DetailOverlay {
    pub fn is_open(&self) -> bool {
        !matches!(self, DetailOverlay::Hidden)
    }

    /// Id the edit/delete/open-tab actions apply to.
    pub fn current_id(&self) -> Option<i64> {
        match self {
            DetailOverlay::Loading(id) | DetailOverlay::Failed { id, .. } => Some(*id),
            DetailOverlay::Showing(t) => Some(t.id_teacher),
            DetailOverlay::Hidden => None,
        }
    }

    pub fn title(&self) -> String {
        match self {
            DetailOverlay::Hidden => String::new(),
            DetailOverlay::Loading(_) => "Loading card…".to_string(),
            DetailOverlay::Showing(t) => t.display_name(),
            DetailOverlay::Failed { .. } => "Error".to_string(),
        }
    }

    /// Edit/delete/open-tab are offered once the fetch has settled.
    pub fn is_actionable(&self) -> bool {
        matches!(
            self,
            DetailOverlay::Showing(_) | DetailOverlay::Failed { .. }
        )
    }
}

/// Label/value pairs rendered by the overlay and the detail page.
pub(crate) fn detail_fields(t: &Teacher) -> Vec<(&'static str, String)> {
    let text = |v: Option<&str>| match v.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => EMPTY_FIELD.to_string(),
    };
    let experience = match t.experience_years {
        Some(y) => format!("{y} yrs"),
        None => EMPTY_FIELD.to_string(),
    };
    vec![
        ("Last name", text(Some(&t.last_name))),
        ("First name", text(Some(&t.first_name))),
        ("Email", text(Some(&t.email))),
        ("Academic degree", text(t.academic_degree.as_deref())),
        ("Position", text(t.administrative_position.as_deref())),
        ("Experience", experience),
        ("ID", t.id_teacher.to_string()),
    ]
}

/// What the list page must do after applying an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Followup {
    None,
    ReloadList,
}

/// List page model: last rendered page, status line and overlay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ListModel {
    pub page: Option<TeacherPage>,
    pub status: String,
    pub loading: bool,
    pub overlay: DetailOverlay,
}

impl ListModel {
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.status = "Loading…".to_string();
    }

    /// Optimistic: the overlay shows a placeholder before the fetch starts.
    pub fn select(&mut self, id: i64) {
        self.overlay = DetailOverlay::Loading(id);
    }

    pub fn close_overlay(&mut self) {
        self.overlay = DetailOverlay::Hidden;
    }

    pub fn apply(&mut self, event: &RepositoryEvent) -> Followup {
        match event {
            RepositoryEvent::List(page) => {
                self.loading = false;
                self.status = table_status(page);
                self.page = Some(page.clone());
                Followup::None
            }
            RepositoryEvent::Detail(teacher) => {
                // Only the pending selection is filled in; responses for a
                // dismissed or superseded selection are dropped.
                if self.overlay == DetailOverlay::Loading(teacher.id_teacher) {
                    self.overlay = DetailOverlay::Showing(teacher.clone());
                }
                Followup::None
            }
            RepositoryEvent::Deleted { id } => {
                if self.overlay.current_id() == Some(*id) {
                    self.overlay = DetailOverlay::Hidden;
                }
                Followup::ReloadList
            }
            RepositoryEvent::Error { scope, message } => {
                match scope {
                    ErrorScope::List => {
                        self.loading = false;
                        self.status = message.clone();
                    }
                    ErrorScope::Detail(id) => {
                        if self.overlay == DetailOverlay::Loading(*id) {
                            self.overlay = DetailOverlay::Failed {
                                id: *id,
                                message: message.clone(),
                            };
                        }
                    }
                    ErrorScope::Delete(id) => {
                        if self.overlay.current_id() == Some(*id) {
                            self.overlay = DetailOverlay::Failed {
                                id: *id,
                                message: message.clone(),
                            };
                        }
                    }
                }
                Followup::None
            }
        }
    }
}

/// Raw filter inputs as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FilterInput {
    pub degree: String,
    pub surname_prefix: String,
    pub min_experience: String,
    pub max_experience: String,
}

impl FilterInput {
    pub fn to_filters(&self) -> TeacherFilters {
        let text = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        TeacherFilters {
            degree: text(&self.degree),
            surname_prefix: text(&self.surname_prefix),
            min_experience: crate::form::parse_experience(&self.min_experience),
            max_experience: crate::form::parse_experience(&self.max_experience),
        }
    }
}

pub(crate) fn filter_status(filters: &TeacherFilters) -> String {
    if filters.is_empty() {
        return "No filters applied".to_string();
    }
    let parts: Vec<String> = filters
        .pairs()
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    format!("Filters applied: {}", parts.join(", "))
}

pub(crate) const FILTERS_RESET: &str = "Filters reset";
