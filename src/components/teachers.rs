use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription,
    CardHeader, CardTitle, Input, Label, Spinner,
};
use crate::models::{TeacherFilters, TeacherPage};
use crate::state::{
    detail_fields, filter_status, table_rows, DetailOverlay as OverlayState, FilterInput,
    TableRow, FILTERS_RESET, NO_DATA, TABLE_COLUMNS,
};
use leptos::prelude::*;

/// Pure renderer of one page of teachers.
#[component]
pub fn TeacherTable(
    #[prop(into)] page: Signal<Option<TeacherPage>>,
    #[prop(into)] status: Signal<String>,
    #[prop(into)] loading: Signal<bool>,
    #[prop(into)] on_select: Callback<i64>,
    #[prop(into)] on_refresh: Callback<()>,
    #[prop(into)] on_page: Callback<u32>,
) -> impl IntoView {
    let has_prev = move || page.with(|p| p.as_ref().is_some_and(|p| p.has_prev()));
    let has_next = move || page.with(|p| p.as_ref().is_some_and(|p| p.has_next()));
    let current = move || page.with(|p| p.as_ref().map(|p| p.page).unwrap_or(1));

    view! {
        <Card>
            <CardHeader>
                <div class="flex w-full items-center justify-between gap-2">
                    <CardTitle class="text-sm">"Teachers"</CardTitle>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        attr:disabled=move || loading.get()
                        on:click=move |_| on_refresh.run(())
                    >
                        "Refresh"
                    </Button>
                </div>
                <CardDescription class="text-xs">
                    <span class="inline-flex items-center gap-2">
                        <Show when=move || loading.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        {move || status.get()}
                    </span>
                </CardDescription>
            </CardHeader>

            <CardContent>
                <table class="w-full text-left text-sm">
                    <thead class="text-xs text-muted-foreground">
                        <tr>
                            <th class="py-2">"ID"</th>
                            <th class="py-2">"Last name"</th>
                            <th class="py-2">"Initial"</th>
                            <th class="py-2">"Degree"</th>
                            <th class="py-2">"Position"</th>
                            <th class="py-2">"Email"</th>
                            <th class="py-2">"Experience"</th>
                        </tr>
                    </thead>
                    <tbody>
                        {move || {
                            page.get()
                                .map(|p| table_rows(&p))
                                .unwrap_or_default()
                                .into_iter()
                                .map(|row| match row {
                                    TableRow::Placeholder => view! {
                                        <tr>
                                            <td
                                                class="py-6 text-center text-xs text-muted-foreground"
                                                colspan=TABLE_COLUMNS.to_string()
                                            >
                                                {NO_DATA}
                                            </td>
                                        </tr>
                                    }
                                    .into_any(),
                                    TableRow::Teacher(r) => {
                                        let id = r.id;
                                        view! {
                                            <tr
                                                class="cursor-pointer border-t hover:bg-accent/50"
                                                on:click=move |_| on_select.run(id)
                                            >
                                                <td class="py-2 text-xs text-muted-foreground">{r.id}</td>
                                                <td class="py-2">{r.last_name}</td>
                                                <td class="py-2">{r.initial}</td>
                                                <td class="py-2">
                                                    <span class="rounded-full bg-secondary px-2 py-0.5 text-xs">
                                                        {r.degree}
                                                    </span>
                                                </td>
                                                <td class="py-2">{r.position}</td>
                                                <td class="py-2">{r.email}</td>
                                                <td class="py-2">{r.experience}</td>
                                            </tr>
                                        }
                                        .into_any()
                                    }
                                })
                                .collect_view()
                        }}
                    </tbody>
                </table>

                <div class="flex items-center justify-end gap-2 pt-3">
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:disabled=move || !has_prev() || loading.get()
                        on:click=move |_| on_page.run(current().saturating_sub(1))
                    >
                        "Previous"
                    </Button>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:disabled=move || !has_next() || loading.get()
                        on:click=move |_| on_page.run(current() + 1)
                    >
                        "Next"
                    </Button>
                </div>
            </CardContent>
        </Card>
    }
}

/// Modal card for one teacher; dismissed by the close button or a backdrop click.
#[component]
pub fn DetailOverlay(
    #[prop(into)] state: Signal<OverlayState>,
    #[prop(into)] on_close: Callback<()>,
    #[prop(into)] on_edit: Callback<i64>,
    #[prop(into)] on_delete: Callback<i64>,
    #[prop(into)] on_open_tab: Callback<i64>,
) -> impl IntoView {
    let current_id = move || state.with(|s| s.current_id());
    let actionable = move || state.with(|s| s.is_actionable());

    let act = move |cb: Callback<i64>| {
        move |_: web_sys::MouseEvent| {
            if let Some(id) = current_id() {
                cb.run(id);
            }
        }
    };

    view! {
        <Show when=move || state.with(|s| s.is_open()) fallback=|| ().into_view()>
            <div
                class="fixed inset-0 z-40 flex items-center justify-center bg-black/40 px-4"
                on:click=move |_| on_close.run(())
            >
                <div
                    class="w-full max-w-md"
                    on:click=|ev: web_sys::MouseEvent| ev.stop_propagation()
                >
                    <Card>
                        <CardHeader>
                            <div class="flex w-full items-center justify-between gap-2">
                                <CardTitle class="text-base">{move || state.with(|s| s.title())}</CardTitle>
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Sm
                                    attr:aria-label="Close"
                                    on:click=move |_| on_close.run(())
                                >
                                    "×"
                                </Button>
                            </div>
                        </CardHeader>

                        <CardContent>
                            {move || match state.get() {
                                OverlayState::Hidden => ().into_any(),
                                OverlayState::Loading(_) => view! {
                                    <div class="flex items-center gap-2 text-xs text-muted-foreground">
                                        <Spinner />
                                        "Loading…"
                                    </div>
                                }
                                .into_any(),
                                OverlayState::Failed { message, .. } => view! {
                                    <Alert class="border-destructive/30">
                                        <AlertDescription class="text-destructive text-xs">
                                            {message}
                                        </AlertDescription>
                                    </Alert>
                                }
                                .into_any(),
                                OverlayState::Showing(teacher) => view! {
                                    <dl class="grid grid-cols-[auto_1fr] gap-x-4 gap-y-2 text-sm">
                                        {detail_fields(&teacher)
                                            .into_iter()
                                            .map(|(label, value)| view! {
                                                <dt class="text-xs text-muted-foreground">{label}</dt>
                                                <dd>{value}</dd>
                                            })
                                            .collect_view()}
                                    </dl>
                                }
                                .into_any(),
                            }}

                            <div class="flex flex-wrap items-center justify-end gap-2 pt-4">
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Sm
                                    attr:disabled=move || !actionable()
                                    on:click=act(on_open_tab)
                                >
                                    "Open in new tab"
                                </Button>
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    attr:disabled=move || !actionable()
                                    on:click=act(on_edit)
                                >
                                    "Edit"
                                </Button>
                                <Button
                                    variant=ButtonVariant::Destructive
                                    size=ButtonSize::Sm
                                    attr:disabled=move || !actionable()
                                    on:click=act(on_delete)
                                >
                                    "Delete"
                                </Button>
                            </div>
                        </CardContent>
                    </Card>
                </div>
            </div>
        </Show>
    }
}

#[component]
pub fn FilterPanel(
    #[prop(into)] on_apply: Callback<TeacherFilters>,
    #[prop(into)] on_reset: Callback<()>,
) -> impl IntoView {
    let degree: RwSignal<String> = RwSignal::new(String::new());
    let surname_prefix: RwSignal<String> = RwSignal::new(String::new());
    let min_experience: RwSignal<String> = RwSignal::new(String::new());
    let max_experience: RwSignal<String> = RwSignal::new(String::new());
    let status: RwSignal<String> = RwSignal::new(filter_status(&TeacherFilters::default()));

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let filters = FilterInput {
            degree: degree.get_untracked(),
            surname_prefix: surname_prefix.get_untracked(),
            min_experience: min_experience.get_untracked(),
            max_experience: max_experience.get_untracked(),
        }
        .to_filters();
        status.set(filter_status(&filters));
        on_apply.run(filters);
    };

    let reset = move |_| {
        for field in [degree, surname_prefix, min_experience, max_experience] {
            field.set(String::new());
        }
        status.set(FILTERS_RESET.to_string());
        on_reset.run(());
    };

    view! {
        <Card>
            <CardHeader>
                <CardTitle class="text-sm">"Filters"</CardTitle>
                <CardDescription class="text-xs">{move || status.get()}</CardDescription>
            </CardHeader>
            <CardContent>
                <form class="grid grid-cols-2 gap-3 md:grid-cols-4" on:submit=on_submit>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="filter-degree" class="text-xs">"Degree"</Label>
                        <Input id="filter-degree" bind_value=degree class="h-8 text-sm" />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="filter-surname" class="text-xs">"Surname starts with"</Label>
                        <Input id="filter-surname" bind_value=surname_prefix class="h-8 text-sm" />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="filter-min-exp" class="text-xs">"Min experience"</Label>
                        <Input
                            id="filter-min-exp"
                            r#type="number"
                            bind_value=min_experience
                            class="h-8 text-sm"
                        />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="filter-max-exp" class="text-xs">"Max experience"</Label>
                        <Input
                            id="filter-max-exp"
                            r#type="number"
                            bind_value=max_experience
                            class="h-8 text-sm"
                        />
                    </div>
                    <div class="col-span-full flex items-center gap-2">
                        <Button size=ButtonSize::Sm>"Apply"</Button>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            attr:r#type="button"
                            on:click=reset
                        >
                            "Reset"
                        </Button>
                    </div>
                </form>
            </CardContent>
        </Card>
    }
}
