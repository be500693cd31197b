use crate::components::teachers::{DetailOverlay, FilterPanel, TeacherTable};
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription,
    CardFooter, CardHeader, CardTitle, Input, Label, Spinner,
};
use crate::form::{parse_teacher_id, submit_outcome, FormGate, FormMode, TeacherForm};
use crate::models::{Teacher, TeacherFilters};
use crate::popup::{OpenerChannel, PopupSession, PopupTarget};
use crate::repository::{EventKind, RepositoryEvent, TeacherRepository};
use crate::state::{detail_fields, AppContext, Followup, ListModel};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_query_map;

#[component]
pub fn ListPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let repo = TeacherRepository::new(app_state.0.api_client.clone());
    let model: RwSignal<ListModel> = RwSignal::new(ListModel::default());

    let load = {
        let repo = repo.clone();
        move |page: u32, filters: Option<TeacherFilters>| {
            model.update(|m| m.begin_load());
            repo.load_list(page, filters);
        }
    };

    for kind in [
        EventKind::List,
        EventKind::Detail,
        EventKind::Deleted,
        EventKind::Error,
    ] {
        let repo_for_reload = repo.clone();
        repo.subscribe(kind, move |ev: &RepositoryEvent| {
            let next = model
                .try_update(|m| m.apply(ev))
                .unwrap_or(Followup::None);
            if next == Followup::ReloadList {
                model.update(|m| m.begin_load());
                repo_for_reload.reload();
            }
        });
    }

    let reload_list = {
        let repo = repo.clone();
        Callback::new(move |_: ()| {
            model.update(|m| m.begin_load());
            repo.reload();
        })
    };

    // Any popup outcome ends in a full reload; focus only refreshes the list.
    let channel = OpenerChannel::new(
        Callback::new(|_: ()| {
            let _ = window().location().reload();
        }),
        reload_list,
    );

    let on_select = {
        let repo = repo.clone();
        Callback::new(move |id: i64| {
            model.update(|m| m.select(id));
            repo.load_teacher(id);
        })
    };

    let on_page = {
        let load = load.clone();
        Callback::new(move |page: u32| load(page, None))
    };

    let on_apply = {
        let load = load.clone();
        Callback::new(move |filters: TeacherFilters| load(1, Some(filters)))
    };

    let on_reset = {
        let load = load.clone();
        Callback::new(move |_: ()| load(1, Some(TeacherFilters::default())))
    };

    let on_delete = {
        let repo = repo.clone();
        Callback::new(move |id: i64| {
            let confirmed = window()
                .confirm_with_message(&format!("Delete teacher #{id}?"))
                .unwrap_or(false);
            if confirmed {
                repo.delete_teacher(id);
            }
        })
    };

    let on_open_tab = Callback::new(|id: i64| {
        if window()
            .open_with_url_and_target(&format!("/detail?id={id}"), "_blank")
            .is_err()
        {
            console_warn!("could not open detail tab for {id}");
        }
    });

    load(1, None);

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex w-full max-w-5xl flex-col gap-4 px-4 py-8">
                <div class="flex items-center justify-between">
                    <div>
                        <div class="text-lg font-semibold">"Teaching staff"</div>
                        <div class="text-xs text-muted-foreground">"Select a row to open the card."</div>
                    </div>
                    <Button size=ButtonSize::Sm on:click=move |_| channel.open(PopupTarget::Add)>
                        "Add teacher"
                    </Button>
                </div>

                <FilterPanel on_apply=on_apply on_reset=on_reset />

                <TeacherTable
                    page=Signal::derive(move || model.with(|m| m.page.clone()))
                    status=Signal::derive(move || model.with(|m| m.status.clone()))
                    loading=Signal::derive(move || model.with(|m| m.loading))
                    on_select=on_select
                    on_refresh=reload_list
                    on_page=on_page
                />

                <DetailOverlay
                    state=Signal::derive(move || model.with(|m| m.overlay.clone()))
                    on_close=Callback::new(move |_: ()| model.update(|m| m.close_overlay()))
                    on_edit=Callback::new(move |id: i64| channel.open(PopupTarget::Edit(id)))
                    on_delete=on_delete
                    on_open_tab=on_open_tab
                />
            </div>
        </div>
    }
}

/// Standalone card for `/detail?id=`.
#[component]
pub fn DetailPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let query = use_query_map();

    let teacher: RwSignal<Option<Teacher>> = RwSignal::new(None);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    match parse_teacher_id(query.get_untracked().get("id").as_deref()) {
        Ok(id) => {
            let api_client = app_state.0.api_client.clone();
            loading.set(true);
            spawn_local(async move {
                match api_client.get_teacher(id).await {
                    Ok(t) => teacher.set(Some(t)),
                    Err(e) => error.set(Some(e.to_string())),
                }
                loading.set(false);
            });
        }
        Err(e) => error.set(Some(e)),
    }

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex w-full max-w-md flex-col gap-4 px-4 py-10">
                <a href="/" class="text-xs text-muted-foreground hover:underline">"← Back to list"</a>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">
                            {move || {
                                teacher
                                    .get()
                                    .map(|t| t.display_name())
                                    .unwrap_or_else(|| "Teacher card".to_string())
                            }}
                        </CardTitle>
                        <Show when=move || loading.get() fallback=|| ().into_view()>
                            <CardDescription class="text-xs">
                                <span class="inline-flex items-center gap-2">
                                    <Spinner />
                                    "Loading…"
                                </span>
                            </CardDescription>
                        </Show>
                    </CardHeader>

                    <CardContent>
                        {move || {
                            error.get().map(|e| {
                                view! {
                                    <Alert class="border-destructive/30">
                                        <AlertDescription class="text-destructive text-xs">
                                            {e}
                                        </AlertDescription>
                                    </Alert>
                                }
                            })
                        }}
                        {move || {
                            teacher.get().map(|t| {
                                view! {
                                    <dl class="grid grid-cols-[auto_1fr] gap-x-4 gap-y-2 text-sm">
                                        {detail_fields(&t)
                                            .into_iter()
                                            .map(|(label, value)| view! {
                                                <dt class="text-xs text-muted-foreground">{label}</dt>
                                                <dd>{value}</dd>
                                            })
                                            .collect_view()}
                                    </dl>
                                }
                            })
                        }}
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

/// Popup form for `/form?mode=add|edit&id=`.
#[component]
pub fn TeacherFormPage() -> impl IntoView {
    let query = use_query_map();
    let session = PopupSession::start();

    let params = query.get_untracked();
    let mode = FormMode::from_query(params.get("mode").as_deref(), params.get("id").as_deref());

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex w-full max-w-lg flex-col px-4 py-8">
                {match mode {
                    Ok(mode) => view! { <TeacherFormCard mode=mode session=session /> }.into_any(),
                    Err(message) => view! {
                        <Card>
                            <CardContent>
                                <Alert class="border-destructive/30">
                                    <AlertDescription class="text-destructive text-xs">
                                        {message}
                                    </AlertDescription>
                                </Alert>
                            </CardContent>
                            <CardFooter>
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Sm
                                    on:click=move |_| session.cancel()
                                >
                                    "Close"
                                </Button>
                            </CardFooter>
                        </Card>
                    }
                    .into_any(),
                }}
            </div>
        </div>
    }
}

#[component]
fn TeacherFormCard(mode: FormMode, session: PopupSession) -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let first_name: RwSignal<String> = RwSignal::new(String::new());
    let last_name: RwSignal<String> = RwSignal::new(String::new());
    let email: RwSignal<String> = RwSignal::new(String::new());
    let academic_degree: RwSignal<String> = RwSignal::new(String::new());
    let administrative_position: RwSignal<String> = RwSignal::new(String::new());
    let experience_years: RwSignal<String> = RwSignal::new(String::new());

    let status: RwSignal<String> = RwSignal::new(mode.initial_status());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let gate: RwSignal<FormGate> = RwSignal::new(FormGate::new(mode));

    let fill = move |form: TeacherForm| {
        first_name.set(form.first_name);
        last_name.set(form.last_name);
        email.set(form.email);
        academic_degree.set(form.academic_degree);
        administrative_position.set(form.administrative_position);
        experience_years.set(form.experience_years);
    };

    if let FormMode::Edit(id) = mode {
        let api_client = app_state.0.api_client.clone();
        status.set("Loading teacher…".to_string());
        gate.update(|g| g.busy = true);
        spawn_local(async move {
            let loaded = match api_client.get_teacher(id).await {
                Ok(t) => {
                    fill(TeacherForm::from_teacher(&t));
                    status.set(mode.initial_status());
                    true
                }
                Err(e) => {
                    status.set(format!("Could not load teacher {id}"));
                    error.set(Some(e.to_string()));
                    false
                }
            };
            gate.update(|g| {
                g.busy = false;
                g.loaded = loaded;
            });
        });
    }

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if !gate.get_untracked().can_submit() {
            return;
        }

        let form = TeacherForm {
            first_name: first_name.get_untracked(),
            last_name: last_name.get_untracked(),
            email: email.get_untracked(),
            academic_degree: academic_degree.get_untracked(),
            administrative_position: administrative_position.get_untracked(),
            experience_years: experience_years.get_untracked(),
        };
        let payload = match form.validate() {
            Ok(p) => p,
            Err(e) => {
                error.set(Some(e));
                return;
            }
        };

        let api_client = app_state.0.api_client.clone();
        error.set(None);
        status.set("Saving…".to_string());
        gate.update(|g| g.busy = true);

        spawn_local(async move {
            let result = match mode {
                FormMode::Add => api_client.create_teacher(&payload).await,
                FormMode::Edit(id) => api_client.update_teacher(id, &payload).await,
            };
            let outcome = submit_outcome(mode, result);
            gate.update(|g| {
                g.busy = false;
                g.done = outcome.succeeded();
            });

            if let Some(msg) = outcome.notify {
                session.submitted(msg);
            }
            if let Some(delay) = outcome.close_after_ms {
                session.close_after(delay);
            }
            if outcome.succeeded() {
                status.set(outcome.status);
            } else {
                status.set(mode.initial_status());
                error.set(Some(outcome.status));
            }
        });
    };

    let fields: [(&'static str, &'static str, &'static str, RwSignal<String>); 6] = [
        ("last_name", "Last name", "text", last_name),
        ("first_name", "First name", "text", first_name),
        ("email", "Email", "email", email),
        ("academic_degree", "Academic degree", "text", academic_degree),
        ("administrative_position", "Position", "text", administrative_position),
        ("experience_years", "Experience (years)", "number", experience_years),
    ];

    view! {
        <Card>
            <CardHeader>
                <CardTitle class="text-lg">{mode.title()}</CardTitle>
                <CardDescription class="text-xs">
                    <span class="inline-flex items-center gap-2">
                        <Show when=move || gate.with(|g| g.busy) fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        {move || status.get()}
                    </span>
                </CardDescription>
            </CardHeader>

            <CardContent>
                <form class="flex flex-col gap-3" on:submit=on_submit>
                    // Edit mode shows the fields only once the record is in.
                    <Show when=move || gate.with(|g| g.loaded) fallback=|| ().into_view()>
                        {fields
                            .into_iter()
                            .map(|(id, label, kind, value)| view! {
                                <div class="flex flex-col gap-1.5">
                                    <Label html_for=id class="text-xs">{label}</Label>
                                    <Input
                                        id=id
                                        name=id
                                        r#type=kind
                                        bind_value=value
                                        class="h-8 text-sm"
                                    />
                                </div>
                            })
                            .collect_view()}
                    </Show>

                    <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                        {move || {
                            error.get().map(|e| {
                                view! {
                                    <Alert class="border-destructive/30">
                                        <AlertDescription class="text-destructive text-xs">
                                            {e}
                                        </AlertDescription>
                                    </Alert>
                                }
                            })
                        }}
                    </Show>

                    <div class="flex items-center gap-2 pt-1">
                        <Button
                            size=ButtonSize::Sm
                            attr:disabled=move || !gate.with(|g| g.can_submit())
                        >
                            {mode.submit_label()}
                        </Button>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            attr:r#type="button"
                            on:click=move |_| session.cancel()
                        >
                            "Cancel"
                        </Button>
                        <span class="ml-auto text-xs text-muted-foreground">{mode.label()}</span>
                    </div>
                </form>
            </CardContent>
        </Card>
    }
}
