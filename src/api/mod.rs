use crate::models::{
    DeleteResponse, ErrorBody, SaveResponse, Teacher, TeacherFilters, TeacherPage, TeacherPayload,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub(crate) const LIST_FAILED: &str = "Failed to load the teacher list";
pub(crate) const DETAIL_FAILED: &str = "Failed to load the teacher card";
pub(crate) const CREATE_FAILED: &str = "Failed to save the teacher";
pub(crate) const UPDATE_FAILED: &str = "Failed to update the teacher";
pub(crate) const DELETE_FAILED: &str = "Failed to delete the teacher";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    /// The request never produced a response.
    Network,
    /// Non-2xx status.
    Http,
    /// 2xx with `success: false`.
    Rejected,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn http(message: String) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message,
        }
    }

    fn rejected(message: String) -> Self {
        Self {
            kind: ApiErrorKind::Rejected,
            message,
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
    /// `None` lets the server pick (it returns everything on one page).
    pub page_size: Option<u32>,
}

impl EnvConfig {
    pub fn new() -> Self {
        let mut config = Self {
            api_url: default_api_url(),
            page_size: None,
        };

        // Both `window.ENV.API_URL` and `window.ENV.api_url` are honoured.
        let Some(env) = web_sys::window()
            .and_then(|w| w.get("ENV"))
            .filter(|env| !env.is_undefined() && env.is_object())
        else {
            return config;
        };

        let read = |upper: &str, lower: &str| {
            js_sys::Reflect::get(&env, &upper.into())
                .ok()
                .filter(|v| !v.is_undefined() && !v.is_null())
                .or_else(|| js_sys::Reflect::get(&env, &lower.into()).ok())
        };

        if let Some(url) = read("API_URL", "api_url").and_then(|v| v.as_string()) {
            config.api_url = url.trim_end_matches('/').to_string();
        }

        if let Some(size) = read("PAGE_SIZE", "page_size")
            .and_then(|v| v.as_f64())
            .and_then(page_size_from_f64)
        {
            config.page_size = Some(size);
        }

        config
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Positive whole numbers that fit in `u32`; anything else is ignored.
fn page_size_from_f64(size: f64) -> Option<u32> {
    if size.fract() != 0.0 || size < 1.0 || size > u32::MAX as f64 {
        return None;
    }
    Some(size as u32)
}

/// Same-origin `/api`; reqwest needs an absolute URL in the browser.
fn default_api_url() -> String {
    let origin = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default();
    format!("{origin}/api")
}

/// Query string for `GET /teachers`, without the leading `?`.
pub(crate) fn list_query(page: u32, page_size: Option<u32>, filters: &TeacherFilters) -> String {
    let mut parts = vec![format!("page={}", page.max(1))];
    if let Some(size) = page_size {
        parts.push(format!("page_size={size}"));
    }
    for (key, value) in filters.pairs() {
        parts.push(format!("{key}={}", urlencoding::encode(&value)));
    }
    parts.join("&")
}

/// Best human-readable message from an error response body.
fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| fallback.to_string())
}

/// Decode a read response (`GET`): any 2xx body is the payload.
pub(crate) fn decode_read<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    fallback: &str,
) -> ApiResult<T> {
    if !status.is_success() {
        return Err(ApiError::http(error_message(body, fallback)));
    }
    serde_json::from_str(body).map_err(ApiError::parse)
}

/// Responses that carry a `success` marker.
pub(crate) trait Acknowledged {
    fn success(&self) -> bool;
    fn message(&self) -> Option<&str>;
}

impl Acknowledged for SaveResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl Acknowledged for DeleteResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Decode a write response: it must be 2xx *and* carry `success: true`.
pub(crate) fn decode_write<T: DeserializeOwned + Acknowledged>(
    status: StatusCode,
    body: &str,
    fallback: &str,
) -> ApiResult<T> {
    let parsed = serde_json::from_str::<T>(body);

    match parsed {
        Ok(ack) if status.is_success() && ack.success() => Ok(ack),
        Ok(ack) => {
            let message = ack
                .message()
                .filter(|m| !m.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| error_message(body, fallback));
            if status.is_success() {
                Err(ApiError::rejected(message))
            } else {
                Err(ApiError::http(message))
            }
        }
        Err(_) if !status.is_success() => Err(ApiError::http(error_message(body, fallback))),
        Err(e) => Err(ApiError::parse(e)),
    }
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) page_size: Option<u32>,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            page_size: None,
        }
    }

    pub fn from_env() -> Self {
        let env = EnvConfig::new();
        Self {
            page_size: env.page_size,
            ..Self::new(env.api_url)
        }
    }

    pub(crate) fn teachers_url(&self) -> String {
        format!("{}/teachers", self.base_url)
    }

    pub(crate) fn teacher_url(&self, id: i64) -> String {
        format!("{}/teachers/{}", self.base_url, id)
    }

    async fn send(req: reqwest::RequestBuilder) -> ApiResult<(StatusCode, String)> {
        let res = req.send().await.map_err(ApiError::network)?;
        let status = res.status();
        let body = res.text().await.map_err(ApiError::network)?;
        Ok((status, body))
    }

    pub async fn list_teachers(&self, page: u32, filters: &TeacherFilters) -> ApiResult<TeacherPage> {
        let url = format!(
            "{}?{}",
            self.teachers_url(),
            list_query(page, self.page_size, filters)
        );
        let (status, body) = Self::send(reqwest::Client::new().get(url)).await?;
        decode_read(status, &body, LIST_FAILED)
    }

    pub async fn get_teacher(&self, id: i64) -> ApiResult<Teacher> {
        let req = reqwest::Client::new().get(self.teacher_url(id));
        let (status, body) = Self::send(req).await?;
        decode_read(status, &body, DETAIL_FAILED)
    }

    pub async fn create_teacher(&self, payload: &TeacherPayload) -> ApiResult<SaveResponse> {
        let req = reqwest::Client::new().post(self.teachers_url()).json(payload);
        let (status, body) = Self::send(req).await?;
        decode_write(status, &body, CREATE_FAILED)
    }

    pub async fn update_teacher(&self, id: i64, payload: &TeacherPayload) -> ApiResult<SaveResponse> {
        let req = reqwest::Client::new().put(self.teacher_url(id)).json(payload);
        let (status, body) = Self::send(req).await?;
        decode_write(status, &body, UPDATE_FAILED)
    }

    pub async fn delete_teacher(&self, id: i64) -> ApiResult<DeleteResponse> {
        let req = reqwest::Client::new().delete(self.teacher_url(id));
        let (status, body) = Self::send(req).await?;
        decode_write(status, &body, DELETE_FAILED)
    }
}
