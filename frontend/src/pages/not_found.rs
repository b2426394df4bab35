use yew::prelude::*;
use yew_router::prelude::*;

use crate::router::Route;

#[function_component(NotFoundPage)]
pub fn not_found_page() -> Html {
    html! {
        <main class="p-8 space-y-2">
            <h2 class="text-xl font-semibold">{"404 - Page not found"}</h2>
            <Link<Route> to={Route::Users}>{ "Back to the admin console" }</Link<Route>>
        </main>
    }
}
