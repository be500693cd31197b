use crate::api::ApiResult;
use crate::models::{SaveResponse, Teacher, TeacherPayload};
use crate::popup::PopupMessage;
use regex::Regex;
use std::sync::LazyLock;

/// Delay before the popup closes itself after a successful save.
pub(crate) const CLOSE_DELAY_MS: i32 = 700;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+@[A-Za-z0-9_.-]+\.[A-Za-z0-9_]+$").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FormMode {
    Add,
    Edit(i64),
}

impl FormMode {
    /// `mode=edit` needs a positive integer `id`; anything else means add.
    pub fn from_query(mode: Option<&str>, id: Option<&str>) -> Result<Self, String> {
        if mode.map(str::trim) != Some("edit") {
            return Ok(FormMode::Add);
        }
        parse_teacher_id(id).map(FormMode::Edit)
    }

    pub fn title(&self) -> &'static str {
        match self {
            FormMode::Add => "New teacher",
            FormMode::Edit(_) => "Edit teacher",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormMode::Add => "Create",
            FormMode::Edit(_) => "Edit",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            FormMode::Add => "Save",
            FormMode::Edit(_) => "Save changes",
        }
    }

    pub fn initial_status(&self) -> String {
        match self {
            FormMode::Add => "Fill in all fields".to_string(),
            FormMode::Edit(id) => format!("ID: {id}"),
        }
    }

    /// Message posted to the opener when a save succeeds.
    pub fn success_message(&self) -> PopupMessage {
        match self {
            FormMode::Add => PopupMessage::TeacherAdded,
            FormMode::Edit(_) => PopupMessage::TeacherUpdated,
        }
    }
}

/// Parse a record id from a query value; only positive integers are valid.
pub(crate) fn parse_teacher_id(raw: Option<&str>) -> Result<i64, String> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| "Invalid teacher identifier".to_string())
}

/// Raw form input, exactly as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TeacherForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub academic_degree: String,
    pub administrative_position: String,
    pub experience_years: String,
}

impl TeacherForm {
    pub fn from_teacher(t: &Teacher) -> Self {
        Self {
            first_name: t.first_name.clone(),
            last_name: t.last_name.clone(),
            email: t.email.clone(),
            academic_degree: t.academic_degree.clone().unwrap_or_default(),
            administrative_position: t.administrative_position.clone().unwrap_or_default(),
            experience_years: t
                .experience_years
                .map(|y| y.to_string())
                .unwrap_or_default(),
        }
    }

    fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("academic_degree", &self.academic_degree),
            ("administrative_position", &self.administrative_position),
            ("experience_years", &self.experience_years),
        ]
    }

    /// Validate and convert to the wire payload.
    ///
    /// Checks run in order: required fields, email pattern, experience.
    pub fn validate(&self) -> Result<TeacherPayload, String> {
        let missing: Vec<&str> = self
            .fields()
            .iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(format!("Fill in the fields: {}", missing.join(", ")));
        }

        if !is_valid_email(&self.email) {
            return Err("Invalid email".to_string());
        }

        let experience_years = parse_experience(&self.experience_years)
            .ok_or_else(|| "Experience must be a non-negative integer".to_string())?;

        Ok(TeacherPayload {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            academic_degree: self.academic_degree.clone(),
            administrative_position: self.administrative_position.clone(),
            experience_years,
        })
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Non-negative integer; surrounding whitespace is allowed, fractions and signs are not.
pub(crate) fn parse_experience(raw: &str) -> Option<u32> {
    let s = raw.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Submit availability for the popup form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FormGate {
    /// Edit mode only becomes loaded once the record has been fetched.
    pub loaded: bool,
    pub busy: bool,
    pub done: bool,
}

impl FormGate {
    pub fn new(mode: FormMode) -> Self {
        Self {
            loaded: matches!(mode, FormMode::Add),
            busy: false,
            done: false,
        }
    }

    pub fn can_submit(&self) -> bool {
        self.loaded && !self.busy && !self.done
    }
}

/// What the popup does after a save attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SubmitOutcome {
    pub status: String,
    /// Set only on success; also becomes the unload message.
    pub notify: Option<PopupMessage>,
    pub close_after_ms: Option<i32>,
}

impl SubmitOutcome {
    pub fn succeeded(&self) -> bool {
        self.notify.is_some()
    }
}

pub(crate) fn submit_outcome(mode: FormMode, result: ApiResult<SaveResponse>) -> SubmitOutcome {
    match result {
        Ok(res) => {
            let status = match mode {
                FormMode::Add => match res.id {
                    Some(id) => format!("Saved. ID: {id}. The window will close."),
                    None => "Saved. The window will close.".to_string(),
                },
                FormMode::Edit(_) => "Changes saved. The window will close.".to_string(),
            };
            SubmitOutcome {
                status,
                notify: Some(mode.success_message()),
                close_after_ms: Some(CLOSE_DELAY_MS),
            }
        }
        Err(e) => SubmitOutcome {
            status: e.to_string(),
            notify: None,
            close_after_ms: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ApiErrorKind};

    fn valid_form() -> TeacherForm {
        TeacherForm {
            first_name: "Anna".to_string(),
            last_name: "Ivanova".to_string(),
            email: "anna.ivanova@uni.example.org".to_string(),
            academic_degree: "PhD".to_string(),
            administrative_position: "Head of department".to_string(),
            experience_years: "12".to_string(),
        }
    }

    #[test]
    fn test_valid_form_produces_payload() {
        let payload = valid_form().validate().expect("form should validate");
        assert_eq!(payload.experience_years, 12);
        assert_eq!(payload.last_name, "Ivanova");
    }

    #[test]
    fn test_missing_fields_are_named() {
        let form = TeacherForm {
            email: String::new(),
            academic_degree: "   ".to_string(),
            ..valid_form()
        };
        let err = form.validate().unwrap_err();
        assert!(err.contains("email"), "{err}");
        assert!(err.contains("academic_degree"), "{err}");
        assert!(!err.contains("first_name"), "{err}");
    }

    #[test]
    fn test_empty_form_names_every_field() {
        let err = TeacherForm::default().validate().unwrap_err();
        for field in [
            "first_name",
            "last_name",
            "email",
            "academic_degree",
            "administrative_position",
            "experience_years",
        ] {
            assert!(err.contains(field), "missing {field} in {err}");
        }
    }

    #[test]
    fn test_bad_email_rejected() {
        let form = TeacherForm {
            email: "not-an-email".to_string(),
            ..valid_form()
        };
        assert_eq!(form.validate().unwrap_err(), "Invalid email");
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a_b.c-d@host.example.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@host.com"));
        assert!(!is_valid_email("@host.com"));
        assert!(!is_valid_email("user@host."));
    }

    #[test]
    fn test_experience_rules() {
        for bad in ["-1", "3.5", "abc", "1e3", "+2"] {
            let form = TeacherForm {
                experience_years: bad.to_string(),
                ..valid_form()
            };
            assert_eq!(
                form.validate().unwrap_err(),
                "Experience must be a non-negative integer",
                "input {bad}"
            );
        }
        for good in ["0", "12", " 7 "] {
            let form = TeacherForm {
                experience_years: good.to_string(),
                ..valid_form()
            };
            assert!(form.validate().is_ok(), "input {good}");
        }
    }

    #[test]
    fn test_form_mode_from_query() {
        assert_eq!(FormMode::from_query(None, None), Ok(FormMode::Add));
        assert_eq!(FormMode::from_query(Some("add"), Some("5")), Ok(FormMode::Add));
        assert_eq!(FormMode::from_query(Some("edit"), Some("5")), Ok(FormMode::Edit(5)));
        assert!(FormMode::from_query(Some("edit"), None).is_err());
        assert!(FormMode::from_query(Some("edit"), Some("0")).is_err());
        assert!(FormMode::from_query(Some("edit"), Some("x1")).is_err());
    }

    #[test]
    fn test_form_from_teacher_prefills() {
        let t = Teacher {
            id_teacher: 4,
            first_name: "Oleg".to_string(),
            last_name: "Smirnov".to_string(),
            email: "oleg@example.com".to_string(),
            academic_degree: Some("DSc".to_string()),
            administrative_position: Some("Professor".to_string()),
            experience_years: Some(0),
        };
        let form = TeacherForm::from_teacher(&t);
        assert_eq!(form.experience_years, "0");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_form_from_teacher_blanks_null_columns() {
        let t = Teacher {
            id_teacher: 4,
            first_name: "Oleg".to_string(),
            last_name: "Smirnov".to_string(),
            email: "oleg@example.com".to_string(),
            academic_degree: None,
            administrative_position: None,
            experience_years: None,
        };
        let form = TeacherForm::from_teacher(&t);
        assert_eq!(form.academic_degree, "");
        assert_eq!(form.administrative_position, "");
        assert_eq!(form.experience_years, "");
        let err = form.validate().unwrap_err();
        assert!(err.contains("experience_years"), "{err}");
    }

    #[test]
    fn test_add_form_is_submittable_immediately() {
        let gate = FormGate::new(FormMode::Add);
        assert!(gate.can_submit());
        assert!(!FormGate { busy: true, ..gate }.can_submit());
        assert!(!FormGate { done: true, ..gate }.can_submit());
    }

    #[test]
    fn test_edit_form_locked_until_record_loads() {
        let mut gate = FormGate::new(FormMode::Edit(9));
        assert!(!gate.can_submit());

        // Prefill finished with an error: still locked.
        gate = FormGate {
            busy: false,
            ..gate
        };
        assert!(!gate.can_submit());

        gate.loaded = true;
        assert!(gate.can_submit());
    }

    #[test]
    fn test_add_success_reports_id_and_schedules_close() {
        let outcome = submit_outcome(
            FormMode::Add,
            Ok(SaveResponse {
                success: true,
                id: Some(42),
                message: None,
            }),
        );
        assert!(outcome.status.contains("42"));
        assert_eq!(outcome.close_after_ms, Some(CLOSE_DELAY_MS));
        assert_eq!(outcome.notify, Some(PopupMessage::TeacherAdded));
        assert!(outcome.succeeded());
    }

    #[test]
    fn test_edit_success_notifies_update() {
        let outcome = submit_outcome(
            FormMode::Edit(3),
            Ok(SaveResponse {
                success: true,
                id: None,
                message: None,
            }),
        );
        assert_eq!(outcome.notify, Some(PopupMessage::TeacherUpdated));
    }

    #[test]
    fn test_failure_keeps_window_open() {
        let outcome = submit_outcome(
            FormMode::Add,
            Err(ApiError {
                kind: ApiErrorKind::Rejected,
                message: "Failed to save the teacher".to_string(),
            }),
        );
        assert_eq!(outcome.status, "Failed to save the teacher");
        assert!(outcome.close_after_ms.is_none());
        assert!(!outcome.succeeded());
    }
}
