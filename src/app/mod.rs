use crate::pages::{DetailPage, ListPage, TeacherFormPage};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(AppState::new()));

    // Router hooks (`use_query_map`) require a <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("detail") view=DetailPage />
                <Route path=path!("form") view=TeacherFormPage />
                <Route path=path!("") view=ListPage />
            </Routes>
        </Router>
    }
}
