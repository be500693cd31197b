use serde::{Deserialize, Serialize};

/// Placeholder shown for absent text fields.
pub(crate) const EMPTY_FIELD: &str = "—";

/// Full teacher record as returned by `GET /teachers/{id}`.
///
/// The backend names the key `id_teacher`; `id` is accepted as well.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Teacher {
    #[serde(alias = "id")]
    pub id_teacher: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    /// Nullable columns: `null` and a missing key both decode to `None`.
    #[serde(default)]
    pub academic_degree: Option<String>,
    #[serde(default)]
    pub administrative_position: Option<String>,
    #[serde(default)]
    pub experience_years: Option<u32>,
}

impl Teacher {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name).trim().to_string()
    }
}

/// Row of the main table (short form of a teacher).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct TeacherSummary {
    pub id: i64,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub first_initial: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub academic_degree: Option<String>,
    #[serde(default)]
    pub administrative_position: Option<String>,
    #[serde(default)]
    pub experience_years: Option<u32>,
}

/// One page of the filtered teacher list.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct TeacherPage {
    #[serde(default)]
    pub items: Vec<TeacherSummary>,
    #[serde(default)]
    pub total: u32,
    #[serde(default = "first_page")]
    pub page: u32,
    /// Absent when the server returned everything on one page.
    #[serde(default)]
    pub page_size: Option<u32>,
}

fn first_page() -> u32 {
    1
}

impl TeacherPage {
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.unwrap_or(self.items.len() as u32)
    }

    pub fn page_count(&self) -> u32 {
        let size = self.effective_page_size();
        if size == 0 {
            return 1;
        }
        self.total.div_ceil(size).max(1)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }
}

/// Optional list filters; `None` fields are not sent.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TeacherFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_experience: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_experience: Option<u32>,
}

impl TeacherFilters {
    /// Active filters as `(key, value)` pairs, in query order.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(v) = &self.degree {
            out.push(("degree", v.clone()));
        }
        if let Some(v) = &self.surname_prefix {
            out.push(("surname_prefix", v.clone()));
        }
        if let Some(v) = self.min_experience {
            out.push(("min_experience", v.to_string()));
        }
        if let Some(v) = self.max_experience {
            out.push(("max_experience", v.to_string()));
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }
}

/// Body of `POST /teachers` and `PUT /teachers/{id}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct TeacherPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub academic_degree: String,
    pub administrative_position: String,
    pub experience_years: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct SaveResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct DeleteResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error envelope used by the backend for 4xx responses.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .filter(|m| !m.trim().is_empty())
    }
}
