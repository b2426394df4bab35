use yew::prelude::*;
use yew_hooks::prelude::use_event_with_window;

#[derive(Properties, PartialEq)]
pub struct ConfirmDialogProps {
    pub title: AttrValue,
    pub message: AttrValue,
    #[prop_or(AttrValue::Static("Delete"))]
    pub confirm_label: AttrValue,
    pub on_confirm: Callback<()>,
    pub on_cancel: Callback<()>,
}

/// Modal yes/no prompt. Escape cancels.
#[function_component(ConfirmDialog)]
pub fn confirm_dialog(props: &ConfirmDialogProps) -> Html {
    {
        let on_cancel = props.on_cancel.clone();
        use_event_with_window("keydown", move |event: KeyboardEvent| {
            if event.key() == "Escape" {
                on_cancel.emit(());
            }
        });
    }

    let confirm = {
        let on_confirm = props.on_confirm.clone();
        Callback::from(move |_| on_confirm.emit(()))
    };
    let cancel = {
        let on_cancel = props.on_cancel.clone();
        Callback::from(move |_| on_cancel.emit(()))
    };

    html! {
        <div
            class={classes!("fixed", "inset-0", "z-40", "flex", "items-center", "justify-center", "bg-black/40")}
            role="dialog"
            aria-modal="true"
            aria-labelledby="confirm-dialog-title"
        >
            <div class={classes!("w-full", "max-w-md", "rounded-2xl", "bg-[var(--surface)]", "p-6", "shadow-xl", "space-y-4")}>
                <h3 id="confirm-dialog-title" class="text-lg font-semibold">{ props.title.clone() }</h3>
                <p class="text-sm text-[var(--muted)]">{ props.message.clone() }</p>
                <div class={classes!("flex", "justify-end", "gap-2")}>
                    <button type="button" class="btn-fluent-secondary" onclick={cancel}>{ "Cancel" }</button>
                    <button type="button" class="btn-fluent-danger" onclick={confirm}>{ props.confirm_label.clone() }</button>
                </div>
            </div>
        </div>
    }
}
