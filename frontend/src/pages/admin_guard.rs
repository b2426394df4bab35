use std::rc::Rc;

use edu_admin_shared::{resolve_session, Session};
use yew::prelude::*;

use crate::api::{GlooBackend, LocalStorageSession};

/// Session handed down by the login flow, when it runs in the same app.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionContext(pub Option<Session>);

/// Authenticated transport for the admin pages.
#[derive(Clone, PartialEq)]
pub struct BackendContext(pub Rc<GlooBackend>);

#[derive(Properties, PartialEq)]
pub struct AdminGuardProps {
    pub children: Html,
}

#[derive(PartialEq)]
enum Access {
    SignedOut,
    Forbidden(Option<String>),
    Granted(Rc<GlooBackend>),
}

/// Render children only for an admin session; the live context wins over the
/// one persisted in `localStorage`.
#[function_component(AdminGuard)]
pub fn admin_guard(props: &AdminGuardProps) -> Html {
    let context = use_context::<SessionContext>().unwrap_or_default();
    let access = use_memo(context, |context| {
        match resolve_session(context.0.as_ref(), &LocalStorageSession) {
            None => Access::SignedOut,
            Some(session) if !session.is_admin() => Access::Forbidden(session.user_name),
            Some(session) => Access::Granted(Rc::new(GlooBackend::new(Some(&session)))),
        }
    });

    match &*access {
        Access::SignedOut => html! {
            <main class="p-8 space-y-2">
                <h2 class="text-xl font-semibold">{ "Sign in required" }</h2>
                <p class="text-[var(--muted)]">{ "Log in with an administrator account to manage the platform." }</p>
            </main>
        },
        Access::Forbidden(name) => html! {
            <main class="p-8 space-y-2">
                <h2 class="text-xl font-semibold">{ "Access denied" }</h2>
                <p class="text-[var(--muted)]">
                    { match name {
                        Some(name) => format!("{name} does not have administrator access."),
                        None => "This account does not have administrator access.".to_string(),
                    } }
                </p>
            </main>
        },
        Access::Granted(backend) => html! {
            <ContextProvider<BackendContext> context={BackendContext(backend.clone())}>
                { props.children.clone() }
            </ContextProvider<BackendContext>>
        },
    }
}
