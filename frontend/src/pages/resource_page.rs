use std::rc::Rc;

use edu_admin_shared::{
    entity::{status_label, STATUS_FILTER},
    derivation::UNCATEGORIZED,
    EntityId,
};
use yew::prelude::*;
use yew_hooks::prelude::use_title;

use super::{admin_guard::BackendContext, columns::TableRow};
use crate::{
    api::GlooBackend,
    components::{
        confirm_dialog::ConfirmDialog,
        filter_bar::{FilterBar, FilterField},
        loading_spinner::{LoadingSpinner, SpinnerSize},
        pagination::Pagination,
        stats_card::StatsCard,
        toast::Toast,
    },
    hooks::use_resource_controller,
};

/// Row waiting for the user to confirm its deletion.
#[derive(Clone, PartialEq)]
struct PendingDelete {
    id: EntityId,
    name: String,
    dependents: u64,
}

/// Searchable, filterable, paginated admin table for one resource.
#[function_component(ResourcePage)]
pub fn resource_page<E>() -> Html
where
    E: TableRow,
{
    use_title(format!("{} · Edu Admin", E::TITLE));
    let backend = use_context::<BackendContext>()
        .map(|context| context.0)
        .unwrap_or_else(|| Rc::new(GlooBackend::new(None)));
    let handle = use_resource_controller::<E>(backend);
    let pending_delete = use_state(|| None::<PendingDelete>);

    let controller = handle.borrow();
    let rows = controller.visible_items();
    let stats = controller.stats();
    let filters = controller.filters();
    let has_filters = !filters.is_empty() || filters.has_pending_search();

    let fields: Vec<FilterField> = E::FILTERS
        .iter()
        .map(|&name| {
            let selected = filters.filter(name).to_string();
            let mut options = if name == STATUS_FILTER {
                vec![status_label(true).to_string(), status_label(false).to_string()]
            } else {
                controller.filter_options(name)
            };
            if !selected.is_empty() && !options.iter().any(|option| option.eq_ignore_ascii_case(&selected)) {
                options.push(selected.clone());
            }
            FilterField {
                name,
                selected,
                options,
            }
        })
        .collect();

    let on_search = {
        let handle = handle.clone();
        Callback::from(move |text: String| handle.set_search_text(text))
    };
    let on_filter = {
        let handle = handle.clone();
        Callback::from(move |(name, value): (&'static str, String)| handle.set_filter(name, &value))
    };
    let on_clear = {
        let handle = handle.clone();
        Callback::from(move |_| handle.clear_all())
    };
    let on_page_change = {
        let handle = handle.clone();
        Callback::from(move |index: usize| handle.set_page(index))
    };
    let on_page_size_change = {
        let handle = handle.clone();
        Callback::from(move |size: usize| handle.set_page_size(size))
    };
    let on_retry = {
        let handle = handle.clone();
        Callback::from(move |_: MouseEvent| handle.refetch())
    };
    let on_toast_close = {
        let handle = handle.clone();
        Callback::from(move |_| handle.dismiss_toast())
    };

    let body = if controller.is_loading() && rows.is_empty() {
        html! { <LoadingSpinner label={format!("Loading {}...", E::TITLE.to_lowercase())} /> }
    } else if let Some(err) = controller.last_error() {
        html! {
            <div class="empty-state space-y-3 p-8 text-center" role="alert">
                <p>{ format!("{} could not be loaded.", E::TITLE) }</p>
                <p class="text-sm text-[var(--muted)]">{ err.to_string() }</p>
                <button type="button" class="btn-fluent-secondary" onclick={on_retry}>{ "Retry" }</button>
            </div>
        }
    } else if rows.is_empty() {
        let message = if has_filters {
            format!("No {} match the current search and filters.", E::TITLE.to_lowercase())
        } else {
            format!("No {} yet.", E::TITLE.to_lowercase())
        };
        html! { <div class="empty-state p-8 text-center text-[var(--muted)]">{ message }</div> }
    } else {
        html! {
            <div class="overflow-x-auto">
                <table class={classes!("w-full", "text-sm")}>
                    <thead>
                        <tr class={classes!("text-left", "text-[var(--muted)]")}>
                            <th class={classes!("py-2", "pr-3")}>{ "Name" }</th>
                            { for E::headers().iter().map(|header| html! {
                                <th class={classes!("py-2", "pr-3")}>{ *header }</th>
                            }) }
                            <th class={classes!("py-2", "pr-3")}>{ E::DEPENDENTS_LABEL }</th>
                            <th class={classes!("py-2", "pr-3")}>{ "Status" }</th>
                            <th class={classes!("py-2", "pr-3")}>{ "Created" }</th>
                            <th class={classes!("py-2", "pr-3")}>{ "Actions" }</th>
                        </tr>
                    </thead>
                    <tbody>
                        { for rows.iter().map(|row| {
                            let toggle_click = {
                                let handle = handle.clone();
                                let id = row.id().clone();
                                Callback::from(move |_| handle.toggle_active(id.clone()))
                            };
                            let delete_click = {
                                let pending_delete = pending_delete.clone();
                                let pending = PendingDelete {
                                    id: row.id().clone(),
                                    name: row.display_name().to_string(),
                                    dependents: row.dependents(),
                                };
                                Callback::from(move |_| pending_delete.set(Some(pending.clone())))
                            };
                            let active = row.is_active();
                            html! {
                                <tr key={row.id().as_str().to_string()} class={classes!("border-t", "border-[var(--border)]")}>
                                    <td class={classes!("py-2", "pr-3")}>
                                        <div class="font-semibold">{ row.display_name().to_string() }</div>
                                        if let Some(subtitle) = row.subtitle() {
                                            <div class="text-xs text-[var(--muted)] line-clamp-1">{ subtitle }</div>
                                        }
                                    </td>
                                    { for row.cells().into_iter().map(|cell| html! {
                                        <td class={classes!("py-2", "pr-3")}>{ cell }</td>
                                    }) }
                                    <td class={classes!("py-2", "pr-3")}>{ row.dependents() }</td>
                                    <td class={classes!("py-2", "pr-3")}>
                                        <span class={classes!("status-badge", if active { "status-active" } else { "status-inactive" })}>
                                            { status_label(active) }
                                        </span>
                                    </td>
                                    <td class={classes!("py-2", "pr-3")}>
                                        { row.created_at().map(|at| at.format("%Y-%m-%d").to_string()).unwrap_or_default() }
                                    </td>
                                    <td class={classes!("py-2", "pr-3")}>
                                        <div class={classes!("flex", "gap-2", "flex-wrap")}>
                                            <button class={classes!("btn-fluent-secondary", "!px-2", "!py-1", "!text-xs")} onclick={toggle_click}>
                                                { if active { "Deactivate" } else { "Activate" } }
                                            </button>
                                            <button class={classes!("btn-fluent-secondary", "!px-2", "!py-1", "!text-xs")} onclick={delete_click}>
                                                { "Delete" }
                                            </button>
                                        </div>
                                    </td>
                                </tr>
                            }
                        }) }
                    </tbody>
                </table>
            </div>
        }
    };

    let dialog = (*pending_delete).clone().map(|pending| {
        let message = if pending.dependents > 0 {
            format!(
                "\"{}\" has {} {}. It will be deactivated instead of deleted.",
                pending.name,
                pending.dependents,
                E::DEPENDENTS_LABEL.to_lowercase()
            )
        } else {
            format!("\"{}\" will be permanently deleted.", pending.name)
        };
        let on_confirm = {
            let handle = handle.clone();
            let pending_delete = pending_delete.clone();
            Callback::from(move |_| {
                handle.remove(handle.confirm_remove(&pending.id));
                pending_delete.set(None);
            })
        };
        let on_cancel = {
            let pending_delete = pending_delete.clone();
            Callback::from(move |_| pending_delete.set(None))
        };
        html! {
            <ConfirmDialog
                title={format!("Delete {}?", E::LABEL.to_lowercase())}
                message={message}
                on_confirm={on_confirm}
                on_cancel={on_cancel}
            />
        }
    });

    let window = controller.window();
    let top_categories: Vec<(String, usize)> = {
        let mut counts: Vec<(String, usize)> = stats
            .by_category
            .iter()
            .filter(|(name, _)| name.as_str() != UNCATEGORIZED)
            .map(|(name, count)| (name.clone(), *count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts.truncate(3);
        counts
    };

    html! {
        <main class={classes!("space-y-6", "p-6")}>
            <header class={classes!("flex", "items-center", "justify-between", "gap-3")}>
                <h1 class="text-2xl font-bold">{ E::TITLE }</h1>
                if controller.is_loading() && !rows.is_empty() {
                    <LoadingSpinner size={SpinnerSize::Small} label="Refreshing" />
                }
            </header>
            <section class={classes!("grid", "grid-cols-2", "md:grid-cols-6", "gap-3")}>
                <StatsCard label="Total" value={stats.total} />
                <StatsCard label="Active" value={stats.active} tone={Some("stats-card-positive")} />
                <StatsCard label="Inactive" value={stats.inactive} tone={Some("stats-card-muted")} />
                { for top_categories.into_iter().map(|(name, count)| html! {
                    <StatsCard key={name.clone()} label={name.clone()} value={count} />
                }) }
            </section>
            <FilterBar
                search={filters.input_text().to_string()}
                placeholder={E::SEARCH_PLACEHOLDER}
                fields={fields}
                on_search={on_search}
                on_filter={on_filter}
                on_clear={on_clear}
            />
            { body }
            <Pagination
                page_index={window.page_index()}
                total_pages={controller.total_pages()}
                total_count={controller.total_count()}
                page_size={window.page_size()}
                on_page_change={on_page_change}
                on_page_size_change={on_page_size_change}
            />
            <Toast notification={controller.notifications().current().cloned()} on_close={on_toast_close} />
            { for dialog }
        </main>
    }
}
