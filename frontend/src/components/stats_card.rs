use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct StatsCardProps {
    pub label: AttrValue,
    pub value: usize,
    #[prop_or_default]
    pub tone: Option<&'static str>,
}

#[function_component(StatsCard)]
pub fn stats_card(props: &StatsCardProps) -> Html {
    html! {
        <div class={classes!("stats-card", props.tone)} role="status">
            <span class="stats-card-label">{ props.label.clone() }</span>
            <strong class="stats-card-value">{ props.value }</strong>
        </div>
    }
}
