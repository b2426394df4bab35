use edu_admin_shared::{Notification, Severity};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ToastProps {
    pub notification: Option<Notification>,
    pub on_close: Callback<()>,
}

/// Single toast slot. Visibility and the auto-hide timer are owned by the
/// page's notification channel; this only renders it.
#[function_component(Toast)]
pub fn toast(props: &ToastProps) -> Html {
    let Some(notification) = props.notification.as_ref() else {
        return Html::default();
    };

    let (icon, tone) = match notification.severity {
        Severity::Success => ("✓", "border-emerald-500/40 bg-emerald-500/10"),
        Severity::Error => ("⚠️", "border-red-500/40 bg-red-500/10"),
        Severity::Warning => ("!", "border-amber-500/40 bg-amber-500/10"),
        Severity::Info => ("i", "border-sky-500/40 bg-sky-500/10"),
    };
    let role = if notification.severity == Severity::Error { "alert" } else { "status" };

    let close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_| on_close.emit(()))
    };

    html! {
        <div
            class={classes!(
                "toast",
                format!("toast-{}", notification.severity.as_str()),
                "fixed",
                "bottom-6",
                "right-6",
                "z-50",
                "flex",
                "items-start",
                "gap-3",
                "rounded-2xl",
                "border",
                "px-5",
                "py-4",
                "text-sm",
                "shadow-xl",
                "max-w-md",
                tone
            )}
            role={role}
            aria-live={if role == "alert" { "assertive" } else { "polite" }}
        >
            <span class="text-lg" aria-hidden="true">{ icon }</span>
            <p class="flex-1">{ notification.message.clone() }</p>
            <button
                type="button"
                class={classes!(
                    "inline-flex",
                    "h-7",
                    "w-7",
                    "items-center",
                    "justify-center",
                    "rounded-full",
                    "hover:bg-black/10",
                    "dark:hover:bg-white/15"
                )}
                aria-label="Dismiss notification"
                onclick={close}
            >
                {"×"}
            </button>
        </div>
    }
}
