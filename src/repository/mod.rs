use crate::api::{ApiClient, ApiResult};
use crate::models::{Teacher, TeacherFilters, TeacherPage};
use leptos::task::spawn_local;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum EventKind {
    List,
    Detail,
    Deleted,
    Error,
}

/// Which operation an error event belongs to, with the record it targeted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum ErrorScope {
    List,
    Detail(i64),
    Delete(i64),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum RepositoryEvent {
    List(TeacherPage),
    Detail(Teacher),
    Deleted { id: i64 },
    Error { scope: ErrorScope, message: String },
}

impl RepositoryEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            RepositoryEvent::List(_) => EventKind::List,
            RepositoryEvent::Detail(_) => EventKind::Detail,
            RepositoryEvent::Deleted { .. } => EventKind::Deleted,
            RepositoryEvent::Error { .. } => EventKind::Error,
        }
    }

    fn from_result<T>(
        result: ApiResult<T>,
        scope: ErrorScope,
        ok: impl FnOnce(T) -> RepositoryEvent,
    ) -> Self {
        match result {
            Ok(v) => ok(v),
            Err(e) => RepositoryEvent::Error {
                scope,
                message: e.to_string(),
            },
        }
    }
}

type Handler = Arc<dyn Fn(&RepositoryEvent) + Send + Sync>;

/// Subscriber registry keyed by event kind.
#[derive(Clone, Default)]
pub(crate) struct Subscribers {
    handlers: Arc<Mutex<HashMap<EventKind, Vec<Handler>>>>,
}

impl Subscribers {
    pub fn subscribe(
        &self,
        kind: EventKind,
        handler: impl Fn(&RepositoryEvent) + Send + Sync + 'static,
    ) {
        if let Ok(mut map) = self.handlers.lock() {
            map.entry(kind).or_default().push(Arc::new(handler));
        }
    }

    /// Deliver `event` to every subscriber of its kind, in subscription order.
    pub fn publish(&self, event: &RepositoryEvent) {
        // Snapshot under the lock; handlers run unlocked so they may subscribe.
        let handlers: Vec<Handler> = self
            .handlers
            .lock()
            .ok()
            .and_then(|map| map.get(&event.kind()).cloned())
            .unwrap_or_default();
        for handler in handlers {
            handler(event);
        }
    }
}

#[derive(Clone, Debug, Default)]
struct ListQuery {
    page: u32,
    filters: TeacherFilters,
}

/// Asynchronous list / fetch-one / delete with outcomes published to subscribers.
///
/// One instance per page; calls never block and are never retried.
#[derive(Clone)]
pub(crate) struct TeacherRepository {
    api: ApiClient,
    subscribers: Subscribers,
    query: Arc<Mutex<ListQuery>>,
}

impl TeacherRepository {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            subscribers: Subscribers::default(),
            query: Arc::new(Mutex::new(ListQuery {
                page: 1,
                filters: TeacherFilters::default(),
            })),
        }
    }

    pub fn subscribe(
        &self,
        kind: EventKind,
        handler: impl Fn(&RepositoryEvent) + Send + Sync + 'static,
    ) {
        self.subscribers.subscribe(kind, handler);
    }

    pub fn current_page(&self) -> u32 {
        self.query.lock().map(|q| q.page).unwrap_or(1)
    }

    /// Remember `filters` when given, otherwise keep the last applied ones.
    fn remember(&self, page: u32, filters: Option<TeacherFilters>) -> ListQuery {
        let Ok(mut q) = self.query.lock() else {
            return ListQuery {
                page: page.max(1),
                filters: filters.unwrap_or_default(),
            };
        };
        if let Some(f) = filters {
            q.filters = f;
        }
        q.page = page.max(1);
        q.clone()
    }

    pub fn load_list(&self, page: u32, filters: Option<TeacherFilters>) {
        let ListQuery { page, filters } = self.remember(page, filters);
        let api = self.api.clone();
        let subscribers = self.subscribers.clone();
        console_debug!("load list page={page} filters={filters:?}");

        spawn_local(async move {
            let result = api.list_teachers(page, &filters).await;
            subscribers.publish(&RepositoryEvent::from_result(
                result,
                ErrorScope::List,
                RepositoryEvent::List,
            ));
        });
    }

    /// Reload the current page with the current filters.
    pub fn reload(&self) {
        self.load_list(self.current_page(), None);
    }

    pub fn load_teacher(&self, id: i64) {
        let api = self.api.clone();
        let subscribers = self.subscribers.clone();

        spawn_local(async move {
            let result = api.get_teacher(id).await;
            subscribers.publish(&RepositoryEvent::from_result(
                result,
                ErrorScope::Detail(id),
                RepositoryEvent::Detail,
            ));
        });
    }

    pub fn delete_teacher(&self, id: i64) {
        let api = self.api.clone();
        let subscribers = self.subscribers.clone();
        console_debug!("delete teacher {id}");

        spawn_local(async move {
            let result = api.delete_teacher(id).await;
            subscribers.publish(&RepositoryEvent::from_result(
                result,
                ErrorScope::Delete(id),
                |_| RepositoryEvent::Deleted { id },
            ));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::api::ApiErrorKind;

    fn teacher(id: i64) -> Teacher {
        Teacher {
            id_teacher: id,
            first_name: "Ivan".to_string(),
            last_name: "Petrov".to_string(),
            email: "ivan@example.com".to_string(),
            academic_degree: Some("PhD".to_string()),
            administrative_position: Some("Dean".to_string()),
            experience_years: Some(5),
        }
    }

    #[test]
    fn test_event_kind_names() {
        assert_eq!(EventKind::List.to_string(), "list");
        assert_eq!(EventKind::Deleted.as_ref(), "deleted");
        assert_eq!(ErrorScope::Delete(4).to_string(), "delete");
    }

    #[test]
    fn test_publish_routes_by_kind_in_order() {
        let subs = Subscribers::default();
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(vec![]));

        let s1 = seen.clone();
        subs.subscribe(EventKind::Detail, move |ev| {
            if let RepositoryEvent::Detail(t) = ev {
                s1.lock().unwrap().push(format!("first:{}", t.id_teacher));
            }
        });
        let s2 = seen.clone();
        subs.subscribe(EventKind::Detail, move |_| {
            s2.lock().unwrap().push("second".to_string())
        });
        let s3 = seen.clone();
        subs.subscribe(EventKind::Error, move |_| s3.lock().unwrap().push("error".to_string()));

        subs.publish(&RepositoryEvent::Detail(teacher(3)));

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first:3".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let subs = Subscribers::default();
        subs.publish(&RepositoryEvent::Deleted { id: 1 });
    }

    #[test]
    fn test_handler_may_subscribe_during_publish() {
        let subs = Subscribers::default();
        let inner = subs.clone();
        subs.subscribe(EventKind::List, move |_| {
            inner.subscribe(EventKind::List, |_| {});
        });
        subs.publish(&RepositoryEvent::List(TeacherPage {
            items: vec![],
            total: 0,
            page: 1,
            page_size: None,
        }));
    }

    #[test]
    fn test_from_result_maps_errors_to_scope() {
        let err: ApiResult<Teacher> = Err(ApiError {
            kind: ApiErrorKind::Network,
            message: "error sending request".to_string(),
        });
        let ev = RepositoryEvent::from_result(err, ErrorScope::Detail(8), RepositoryEvent::Detail);
        assert_eq!(
            ev,
            RepositoryEvent::Error {
                scope: ErrorScope::Detail(8),
                message: "error sending request".to_string()
            }
        );
        assert_eq!(ev.kind(), EventKind::Error);

        let ok = RepositoryEvent::from_result(Ok(teacher(8)), ErrorScope::Detail(8), RepositoryEvent::Detail);
        assert_eq!(ok.kind(), EventKind::Detail);
    }

    #[test]
    fn test_remember_keeps_filters_until_replaced() {
        let repo = TeacherRepository::new(ApiClient::new("http://localhost/api".to_string()));
        let filters = TeacherFilters {
            degree: Some("PhD".to_string()),
            ..Default::default()
        };

        repo.remember(2, Some(filters.clone()));
        assert_eq!(repo.current_page(), 2);

        let kept = repo.remember(3, None);
        assert_eq!(kept.filters, filters);
        assert_eq!(repo.current_page(), 3);

        let reset = repo.remember(0, Some(TeacherFilters::default()));
        assert!(reset.filters.is_empty());
        assert_eq!(repo.current_page(), 1);
    }
}
