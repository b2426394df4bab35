use web_sys::HtmlSelectElement;
use yew::prelude::*;

/// Page sizes offered next to the pager.
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 20, 50, 100];

#[derive(Properties, PartialEq)]
pub struct PaginationProps {
    /// 0-based page index.
    pub page_index: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub page_size: usize,
    /// Emits the 0-based index of the requested page.
    pub on_page_change: Callback<usize>,
    /// Emits the requested rows per page.
    pub on_page_size_change: Callback<usize>,
}

#[derive(Debug, PartialEq)]
enum PageSlot {
    Page(usize),
    Ellipsis(&'static str),
}

#[function_component(Pagination)]
pub fn pagination(props: &PaginationProps) -> Html {
    let summary = range_summary(props.page_index, props.page_size, props.total_count);
    let size_picker = page_size_picker(props.page_size, props.on_page_size_change.clone());
    if props.total_pages <= 1 {
        return html! {
            <div class={classes!("flex", "flex-wrap", "items-center", "justify-between", "gap-3")}>
                <p class={classes!("text-sm", "text-[var(--muted)]")}>{ summary }</p>
                { size_picker }
            </div>
        };
    }

    let total_pages = props.total_pages;
    // Buttons are labelled 1-based.
    let current_page = (props.page_index + 1).clamp(1, total_pages);
    let on_page_change = props.on_page_change.clone();

    let go_to = |page: usize| {
        let on_page_change = on_page_change.clone();
        Callback::from(move |_: MouseEvent| on_page_change.emit(page - 1))
    };

    let btn_classes = classes!(
        "inline-flex",
        "items-center",
        "justify-center",
        "min-w-[2.5rem]",
        "h-9",
        "px-3",
        "rounded-lg",
        "border",
        "border-[var(--border)]",
        "text-sm",
        "font-semibold",
        "transition-colors",
        "hover:border-[var(--primary)]",
        "hover:text-[var(--primary)]",
        "disabled:opacity-50",
        "disabled:cursor-not-allowed"
    );

    html! {
        <div class={classes!("flex", "flex-wrap", "items-center", "justify-between", "gap-3")}>
            <p class={classes!("text-sm", "text-[var(--muted)]")}>{ summary }</p>
            { size_picker }
            <nav class="flex flex-wrap items-center gap-2" aria-label="Pagination">
                <button
                    type="button"
                    class={btn_classes.clone()}
                    disabled={current_page <= 1}
                    onclick={go_to(current_page.saturating_sub(1).max(1))}
                    aria-label="Previous page"
                >
                    {"<"}
                </button>
                { for visible_slots(current_page, total_pages).into_iter().map(|slot| match slot {
                    PageSlot::Page(page) => {
                        let is_current = page == current_page;
                        let page_classes = classes!(
                            btn_classes.clone(),
                            is_current.then_some("bg-[var(--primary)] text-white border-transparent")
                        );
                        html! {
                            <button
                                key={format!("page-{page}")}
                                type="button"
                                class={page_classes}
                                aria-label={format!("Go to page {page}")}
                                aria-current={is_current.then(|| AttrValue::from("page"))}
                                disabled={is_current}
                                onclick={go_to(page)}
                            >
                                { page }
                            </button>
                        }
                    }
                    PageSlot::Ellipsis(side) => html! {
                        <span key={format!("ellipsis-{side}")} class="px-1 select-none opacity-60" aria-hidden="true">
                            {"..."}
                        </span>
                    },
                }) }
                <button
                    type="button"
                    class={btn_classes.clone()}
                    disabled={current_page >= total_pages}
                    onclick={go_to((current_page + 1).min(total_pages))}
                    aria-label="Next page"
                >
                    {">"}
                </button>
            </nav>
        </div>
    }
}

fn page_size_picker(current: usize, on_change: Callback<usize>) -> Html {
    let onchange = Callback::from(move |event: Event| {
        let size = event
            .target_dyn_into::<HtmlSelectElement>()
            .and_then(|target| target.value().parse::<usize>().ok());
        if let Some(size) = size {
            on_change.emit(size);
        }
    });
    html! {
        <label class={classes!("flex", "items-center", "gap-2", "text-sm", "text-[var(--muted)]")}>
            { "Rows per page" }
            <select class="rounded-lg border border-[var(--border)] bg-transparent px-2 py-1" onchange={onchange}>
                { for size_choices(current).into_iter().map(|size| html! {
                    <option key={size.to_string()} value={size.to_string()} selected={size == current}>{ size }</option>
                }) }
            </select>
        </label>
    }
}

/// Offered sizes, with a non-standard current size kept selectable.
fn size_choices(current: usize) -> Vec<usize> {
    let mut choices = PAGE_SIZE_OPTIONS.to_vec();
    if !choices.contains(&current) {
        choices.push(current);
        choices.sort_unstable();
    }
    choices
}

fn range_summary(page_index: usize, page_size: usize, total_count: usize) -> String {
    if total_count == 0 {
        return "No results".to_string();
    }
    let first = (page_index * page_size + 1).min(total_count);
    let last = ((page_index + 1) * page_size).min(total_count);
    format!("Showing {first}-{last} of {total_count}")
}

/// First, last, and a window of two around the current page.
fn visible_slots(current: usize, total: usize) -> Vec<PageSlot> {
    if total <= 7 {
        return (1..=total).map(PageSlot::Page).collect();
    }
    let (start, end) = if current <= 3 {
        (2, 5)
    } else if current + 2 >= total {
        (total - 4, total - 1)
    } else {
        (current - 1, current + 1)
    };

    let mut slots = vec![PageSlot::Page(1)];
    if start > 2 {
        slots.push(PageSlot::Ellipsis("left"));
    }
    slots.extend((start..=end).map(PageSlot::Page));
    if end < total - 1 {
        slots.push(PageSlot::Ellipsis("right"));
    }
    slots.push(PageSlot::Page(total));
    slots
}
