//! Cross-window notifications between the list page (opener) and the add/edit popups.
//!
//! The popup posts `{type}` to its opener on success and again on unload; the
//! opener reloads on any known message. A 1000 ms poll of `popup.closed` is the
//! fallback when no message arrives, so messages are advisory and the poll is
//! what guarantees the opener eventually reloads. Duplicate reloads are harmless.

use leptos::ev;
use leptos::prelude::*;
use leptos_dom::helpers::{window_event_listener, WindowListenerHandle};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;

pub(crate) const POPUP_POLL_INTERVAL_MS: i32 = 1000;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub(crate) enum PopupMessage {
    TeacherAdded,
    TeacherUpdated,
    RefreshMain,
}

/// Wire form: `{"type": "teacher-added"}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct PopupEnvelope {
    #[serde(rename = "type")]
    pub kind: PopupMessage,
}

impl PopupMessage {
    pub fn from_type(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    pub fn to_json(self) -> String {
        serde_json::to_string(&PopupEnvelope { kind: self }).unwrap_or_default()
    }

    pub fn to_js(self) -> JsValue {
        let obj = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&obj, &"type".into(), &self.as_ref().into());
        obj.into()
    }

    /// Decode `event.data`; anything without a known `type` is ignored.
    pub fn from_js(data: &JsValue) -> Option<Self> {
        if !data.is_object() {
            return None;
        }
        js_sys::Reflect::get(data, &"type".into())
            .ok()
            .and_then(|v| v.as_string())
            .and_then(|s| Self::from_type(&s))
    }
}

/// Popup-side lifecycle: `Opened -> Submitted | Cancelled | ClosedWithoutAction`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PopupLifecycle {
    Opened,
    Submitted(PopupMessage),
    Cancelled,
    ClosedWithoutAction,
}

impl PopupLifecycle {
    /// Message posted from `beforeunload`.
    pub fn unload_message(&self) -> PopupMessage {
        match self {
            PopupLifecycle::Submitted(msg) => *msg,
            _ => PopupMessage::RefreshMain,
        }
    }

    /// State after the window unloads.
    pub fn on_unload(self) -> Self {
        match self {
            PopupLifecycle::Opened => PopupLifecycle::ClosedWithoutAction,
            other => other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WatchAction {
    Idle,
    /// Full page reload.
    Reload,
    /// Reload the list only.
    Refresh,
}

/// Opener-side state shared by all popups spawned from one page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct OpenerState {
    refresh_requested: bool,
}

impl OpenerState {
    pub fn popup_opened(&mut self) {
        self.refresh_requested = true;
    }

    pub fn refresh_requested(&self) -> bool {
        self.refresh_requested
    }

    pub fn on_message(&mut self, msg: Option<PopupMessage>) -> WatchAction {
        match msg {
            Some(_) => {
                self.refresh_requested = false;
                WatchAction::Reload
            }
            None => WatchAction::Idle,
        }
    }

    pub fn on_focus(&mut self) -> WatchAction {
        if self.refresh_requested {
            self.refresh_requested = false;
            WatchAction::Refresh
        } else {
            WatchAction::Idle
        }
    }

    pub fn on_poll(&mut self, watch: &mut PopupWatch, popup_closed: bool) -> WatchAction {
        if watch.finished || !popup_closed {
            return WatchAction::Idle;
        }
        watch.finished = true;
        self.refresh_requested = false;
        WatchAction::Reload
    }
}

/// Per-popup poll state; finishes once the popup has been seen closed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PopupWatch {
    finished: bool,
}

impl PopupWatch {
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Which popup to open from the list page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PopupTarget {
    Add,
    Edit(i64),
}

impl PopupTarget {
    pub fn url(&self) -> String {
        match self {
            PopupTarget::Add => "/form?mode=add".to_string(),
            PopupTarget::Edit(id) => format!("/form?mode=edit&id={id}"),
        }
    }

    pub fn window_name(&self) -> String {
        match self {
            PopupTarget::Add => "teacher-form-add".to_string(),
            PopupTarget::Edit(id) => format!("edit-teacher-{id}"),
        }
    }

    pub fn features(&self) -> &'static str {
        match self {
            PopupTarget::Add => "width=720,height=720",
            PopupTarget::Edit(_) => "width=760,height=760",
        }
    }
}

/// Opener side of the convention, installed once by the list page.
#[derive(Clone, Copy)]
pub(crate) struct OpenerChannel {
    state: StoredValue<OpenerState>,
    on_reload: Callback<()>,
    _message_handle: StoredValue<Option<WindowListenerHandle>>,
    _focus_handle: StoredValue<Option<WindowListenerHandle>>,
}

impl OpenerChannel {
    /// `on_reload` performs the full reload, `on_refresh` a list-only reload.
    pub fn new(on_reload: Callback<()>, on_refresh: Callback<()>) -> Self {
        let state = StoredValue::new(OpenerState::default());

        let message = window_event_listener(ev::message, move |ev: web_sys::MessageEvent| {
            let msg = PopupMessage::from_js(&ev.data());
            let action = state
                .try_update_value(|s| s.on_message(msg))
                .unwrap_or(WatchAction::Idle);
            if action == WatchAction::Reload {
                console_debug!("popup message {:?}, reloading", msg);
                on_reload.run(());
            }
        });

        let focus = window_event_listener(ev::focus, move |_ev: web_sys::FocusEvent| {
            let action = state
                .try_update_value(|s| s.on_focus())
                .unwrap_or(WatchAction::Idle);
            if action == WatchAction::Refresh {
                on_refresh.run(());
            }
        });

        Self {
            state,
            on_reload,
            _message_handle: StoredValue::new(Some(message)),
            _focus_handle: StoredValue::new(Some(focus)),
        }
    }

    /// Open a popup and start polling its `closed` flag.
    pub fn open(&self, target: PopupTarget) {
        let Some(win) = web_sys::window() else {
            return;
        };

        let popup = win
            .open_with_url_and_target_and_features(
                &target.url(),
                &target.window_name(),
                target.features(),
            )
            .ok()
            .flatten();

        match &popup {
            Some(p) => {
                let _ = p.focus();
                console_debug!("opened popup {}", target.window_name());
            }
            None => console_warn!("popup {} was blocked", target.window_name()),
        }

        self.state.update_value(|s| s.popup_opened());
        self.watch_closed(popup);
    }

    fn watch_closed(&self, popup: Option<web_sys::Window>) {
        let Some(win) = web_sys::window() else {
            return;
        };

        let state = self.state;
        let on_reload = self.on_reload;
        let timer_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        let timer_id_in_cb = timer_id.clone();
        let mut watch = PopupWatch::default();

        let cb = wasm_bindgen::closure::Closure::wrap(Box::new(move || {
            if watch.is_finished() {
                return;
            }
            // A popup we could not open counts as closed.
            let closed = popup
                .as_ref()
                .map(|p| p.closed().unwrap_or(true))
                .unwrap_or(true);
            let action = state
                .try_update_value(|s| s.on_poll(&mut watch, closed))
                .unwrap_or(WatchAction::Idle);
            if action == WatchAction::Reload {
                if let (Some(w), Some(tid)) = (web_sys::window(), timer_id_in_cb.get()) {
                    w.clear_interval_with_handle(tid);
                }
                console_debug!("popup closed, reloading");
                on_reload.run(());
            }
        }) as Box<dyn FnMut()>);

        let tid = win
            .set_interval_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                POPUP_POLL_INTERVAL_MS,
            )
            .unwrap_or(0);
        timer_id.set(Some(tid));

        // The interval clears itself once the popup is gone.
        cb.forget();
    }
}

/// Post `msg` to `window.opener`, if there is one.
pub(crate) fn notify_opener(msg: PopupMessage) {
    let Some(opener) = web_sys::window()
        .and_then(|w| w.opener().ok())
        .filter(|o| o.is_object())
    else {
        return;
    };

    // The opener belongs to another realm, so `dyn_into` would fail.
    let opener: web_sys::Window = opener.unchecked_into();
    console_debug!("notify opener {}", msg.to_json());
    if let Err(e) = opener.post_message(&msg.to_js(), "*") {
        console_warn!("postMessage to opener failed: {:?}", e);
    }
}

/// Popup side of the convention, installed once by the form page.
#[derive(Clone, Copy)]
pub(crate) struct PopupSession {
    lifecycle: StoredValue<PopupLifecycle>,
    _unload_handle: StoredValue<Option<WindowListenerHandle>>,
}

impl PopupSession {
    pub fn start() -> Self {
        let lifecycle = StoredValue::new(PopupLifecycle::Opened);

        let unload = window_event_listener(ev::beforeunload, move |_ev: web_sys::BeforeUnloadEvent| {
            let msg = lifecycle.with_value(|l| l.unload_message());
            lifecycle.update_value(|l| *l = l.on_unload());
            notify_opener(msg);
        });

        Self {
            lifecycle,
            _unload_handle: StoredValue::new(Some(unload)),
        }
    }

    /// Record a successful save and tell the opener right away.
    pub fn submitted(&self, msg: PopupMessage) {
        self.lifecycle.set_value(PopupLifecycle::Submitted(msg));
        notify_opener(msg);
    }

    pub fn cancel(&self) {
        if self.lifecycle.get_value() == PopupLifecycle::Opened {
            self.lifecycle.set_value(PopupLifecycle::Cancelled);
        }
        close_window();
    }

    pub fn close_after(&self, delay_ms: i32) {
        let Some(win) = web_sys::window() else {
            return;
        };
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            wasm_bindgen::closure::Closure::once_into_js(close_window)
                .as_ref()
                .unchecked_ref(),
            delay_ms,
        );
    }
}

fn close_window() {
    if let Some(win) = web_sys::window() {
        let _ = win.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_names() {
        assert_eq!(PopupMessage::TeacherAdded.as_ref(), "teacher-added");
        assert_eq!(PopupMessage::TeacherUpdated.to_string(), "teacher-updated");
        assert_eq!(PopupMessage::RefreshMain.as_ref(), "refresh-main");
    }

    #[test]
    fn test_message_from_type() {
        assert_eq!(
            PopupMessage::from_type("teacher-added"),
            Some(PopupMessage::TeacherAdded)
        );
        assert_eq!(
            PopupMessage::from_type("refresh-main"),
            Some(PopupMessage::RefreshMain)
        );
        assert_eq!(PopupMessage::from_type("teacher-deleted"), None);
        assert_eq!(PopupMessage::from_type(""), None);
    }

    #[test]
    fn test_envelope_json() {
        assert_eq!(
            PopupMessage::TeacherUpdated.to_json(),
            r#"{"type":"teacher-updated"}"#
        );
        let env: PopupEnvelope =
            serde_json::from_str(r#"{"type":"refresh-main"}"#).expect("envelope parses");
        assert_eq!(env.kind, PopupMessage::RefreshMain);
        assert!(serde_json::from_str::<PopupEnvelope>(r#"{"type":"other"}"#).is_err());
    }

    #[test]
    fn test_unload_message_defaults_to_refresh() {
        assert_eq!(
            PopupLifecycle::Opened.unload_message(),
            PopupMessage::RefreshMain
        );
        assert_eq!(
            PopupLifecycle::Cancelled.unload_message(),
            PopupMessage::RefreshMain
        );
        assert_eq!(
            PopupLifecycle::Submitted(PopupMessage::TeacherAdded).unload_message(),
            PopupMessage::TeacherAdded
        );
    }

    #[test]
    fn test_lifecycle_on_unload() {
        assert_eq!(
            PopupLifecycle::Opened.on_unload(),
            PopupLifecycle::ClosedWithoutAction
        );
        assert_eq!(PopupLifecycle::Cancelled.on_unload(), PopupLifecycle::Cancelled);
        let done = PopupLifecycle::Submitted(PopupMessage::TeacherUpdated);
        assert_eq!(done.on_unload(), done);
    }

    #[test]
    fn test_opener_reloads_on_any_known_message() {
        let mut s = OpenerState::default();
        for msg in [
            PopupMessage::TeacherAdded,
            PopupMessage::TeacherUpdated,
            PopupMessage::RefreshMain,
        ] {
            assert_eq!(s.on_message(Some(msg)), WatchAction::Reload);
        }
        assert_eq!(s.on_message(None), WatchAction::Idle);
    }

    #[test]
    fn test_poll_reloads_once_after_close() {
        let mut s = OpenerState::default();
        let mut w = PopupWatch::default();
        s.popup_opened();

        assert_eq!(s.on_poll(&mut w, false), WatchAction::Idle);
        assert_eq!(s.on_poll(&mut w, true), WatchAction::Reload);
        assert!(w.is_finished());
        assert!(!s.refresh_requested());
        assert_eq!(s.on_poll(&mut w, true), WatchAction::Idle);
    }

    #[test]
    fn test_focus_refreshes_only_when_requested() {
        let mut s = OpenerState::default();
        assert_eq!(s.on_focus(), WatchAction::Idle);

        s.popup_opened();
        assert_eq!(s.on_focus(), WatchAction::Refresh);
        assert_eq!(s.on_focus(), WatchAction::Idle);
    }

    /// Timed event on the opener's single-threaded loop.
    enum Tick {
        Message(i64, PopupMessage),
        Poll(i64),
    }

    /// Run a popup session where the popup closes at `closed_at`, returning
    /// the time of the first reload and what caused it.
    fn first_reload(message: Option<(i64, PopupMessage)>, closed_at: i64) -> (i64, &'static str) {
        let mut ticks: Vec<Tick> = (1..=10)
            .map(|n| Tick::Poll(n * POPUP_POLL_INTERVAL_MS as i64))
            .collect();
        if let Some((t, msg)) = message {
            ticks.push(Tick::Message(t, msg));
        }
        // Messages queued at the same instant as a poll are delivered first.
        ticks.sort_by_key(|t| match t {
            Tick::Message(at, _) => (*at, 0),
            Tick::Poll(at) => (*at, 1),
        });

        let mut state = OpenerState::default();
        let mut watch = PopupWatch::default();
        state.popup_opened();

        for tick in ticks {
            match tick {
                Tick::Message(at, msg) => {
                    if state.on_message(Some(msg)) == WatchAction::Reload {
                        return (at, "message");
                    }
                }
                Tick::Poll(at) => {
                    if state.on_poll(&mut watch, at >= closed_at) == WatchAction::Reload {
                        return (at, "poll");
                    }
                }
            }
        }
        panic!("opener never reloaded");
    }

    #[test]
    fn test_message_preempts_poll() {
        let (at, cause) = first_reload(Some((300, PopupMessage::TeacherAdded)), 1000);
        assert_eq!(cause, "message");
        assert!(at < POPUP_POLL_INTERVAL_MS as i64);
    }

    #[test]
    fn test_silent_close_reloads_within_one_interval() {
        for closed_at in [1, 999, 1000, 1500, 4321] {
            let (at, cause) = first_reload(None, closed_at);
            assert_eq!(cause, "poll");
            assert!(at >= closed_at);
            assert!(
                at - closed_at <= POPUP_POLL_INTERVAL_MS as i64,
                "closed at {closed_at}, reloaded at {at}"
            );
        }
    }

    #[test]
    fn test_popup_target_urls() {
        assert_eq!(PopupTarget::Add.url(), "/form?mode=add");
        assert_eq!(PopupTarget::Edit(5).url(), "/form?mode=edit&id=5");
        assert_eq!(PopupTarget::Edit(5).window_name(), "edit-teacher-5");
        assert_eq!(PopupTarget::Add.features(), "width=720,height=720");
    }
}
