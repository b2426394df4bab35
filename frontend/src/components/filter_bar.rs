use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

/// One categorical filter and the values it can take.
#[derive(Clone, PartialEq)]
pub struct FilterField {
    pub name: &'static str,
    pub selected: String,
    pub options: Vec<String>,
}

#[derive(Properties, PartialEq)]
pub struct FilterBarProps {
    /// Text currently in the search box, including uncommitted input.
    pub search: String,
    pub placeholder: AttrValue,
    pub fields: Vec<FilterField>,
    pub on_search: Callback<String>,
    /// `(filter name, value)`; an empty value clears the filter.
    pub on_filter: Callback<(&'static str, String)>,
    pub on_clear: Callback<()>,
}

#[function_component(FilterBar)]
pub fn filter_bar(props: &FilterBarProps) -> Html {
    let on_input = {
        let on_search = props.on_search.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(target) = event.target_dyn_into::<HtmlInputElement>() {
                on_search.emit(target.value());
            }
        })
    };
    let on_clear = {
        let on_clear = props.on_clear.clone();
        Callback::from(move |_| on_clear.emit(()))
    };

    html! {
        <div class={classes!("flex", "flex-wrap", "items-end", "gap-3")}>
            <input
                type="search"
                class={classes!("flex-1", "min-w-[14rem]", "rounded-lg", "border", "border-[var(--border)]", "px-3", "py-2", "text-sm")}
                placeholder={props.placeholder.clone()}
                value={props.search.clone()}
                oninput={on_input}
            />
            { for props.fields.iter().map(|field| {
                let name = field.name;
                let onchange = {
                    let on_filter = props.on_filter.clone();
                    Callback::from(move |event: Event| {
                        if let Some(target) = event.target_dyn_into::<HtmlSelectElement>() {
                            on_filter.emit((name, target.value()));
                        }
                    })
                };
                html! {
                    <label key={name} class={classes!("flex", "flex-col", "gap-1", "text-xs", "text-[var(--muted)]")}>
                        { title_case(name) }
                        <select
                            class={classes!("rounded-lg", "border", "border-[var(--border)]", "px-3", "py-2", "text-sm")}
                            onchange={onchange}
                        >
                            <option value="" selected={field.selected.is_empty()}>{ "All" }</option>
                            { for field.options.iter().map(|option| html! {
                                <option
                                    value={option.clone()}
                                    selected={option.eq_ignore_ascii_case(&field.selected)}
                                >
                                    { option.clone() }
                                </option>
                            }) }
                        </select>
                    </label>
                }
            }) }
            <button type="button" class="btn-fluent-secondary" onclick={on_clear}>{ "Clear filters" }</button>
        </div>
    }
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
