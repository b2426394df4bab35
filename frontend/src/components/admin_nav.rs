use yew::prelude::*;
use yew_router::prelude::*;

use crate::router::Route;

const SECTIONS: [(Route, &str); 4] = [
    (Route::Users, "Users"),
    (Route::Courses, "Courses"),
    (Route::Nfts, "NFTs"),
    (Route::Quests, "Quests"),
];

#[function_component(AdminNav)]
pub fn admin_nav() -> Html {
    let current = use_route::<Route>();
    html! {
        <nav class={classes!("flex", "gap-2", "border-b", "border-[var(--border)]", "px-6", "py-3")} aria-label="Admin sections">
            <span class="font-bold mr-4">{ "Edu Admin" }</span>
            { for SECTIONS.iter().map(|(route, label)| {
                let active = current.as_ref() == Some(route);
                html! {
                    <Link<Route>
                        to={route.clone()}
                        classes={classes!(
                            "px-3",
                            "py-1",
                            "rounded-lg",
                            active.then_some("bg-[var(--primary)] text-white")
                        )}
                    >
                        { *label }
                    </Link<Route>>
                }
            }) }
        </nav>
    }
}
