//! Browser admin console for the education platform.

mod api;
mod components;
pub mod hooks;
mod pages;
mod router;

use yew::prelude::*;

use crate::pages::admin_guard::SessionContext;

#[function_component(App)]
fn app() -> Html {
    // No in-app login flow yet; the guard falls back to the persisted session.
    let session = use_state(SessionContext::default);
    html! {
        <ContextProvider<SessionContext> context={(*session).clone()}>
            <router::AppRouter />
        </ContextProvider<SessionContext>>
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
