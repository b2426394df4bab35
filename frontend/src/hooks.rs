//! Yew hooks binding the shared resource controller to components.

use std::{cell::RefCell, rc::Rc};

use edu_admin_shared::{
    AdminEntity, CollectionBackend, ControllerConfig, ControllerError, DeleteConfirmation,
    EntityId, FetchOutcome, Reaction, ResourceController,
};
use gloo_timers::callback::Timeout;
use yew::{functional::UseForceUpdateHandle, prelude::*};

use crate::api::GlooBackend;

/// Shared handle to one page's [`ResourceController`].
///
/// Every method borrows the controller only synchronously; network work runs
/// in `spawn_local` and folds its result back through the two-phase
/// `begin_*`/`apply_*` API, so no borrow is ever held across an `.await`.
///
/// # Example
/// ```rust
/// #[function_component(CoursesPage)]
/// fn courses_page() -> Html {
///     let backend = Rc::new(GlooBackend::new(None));
///     let courses = use_resource_controller::<Course>(backend);
///     let rows = courses.borrow().visible_items();
///     html! { <p>{ format!("{} courses", rows.len()) }</p> }
/// }
/// ```
pub struct ControllerHandle<E: AdminEntity> {
    controller: Rc<RefCell<ResourceController<E>>>,
    backend: Rc<GlooBackend>,
    redraw: UseForceUpdateHandle,
}

impl<E: AdminEntity> Clone for ControllerHandle<E> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            backend: self.backend.clone(),
            redraw: self.redraw.clone(),
        }
    }
}

impl<E: AdminEntity> ControllerHandle<E> {
    /// Read access for rendering.
    pub fn borrow(&self) -> std::cell::Ref<'_, ResourceController<E>> {
        self.controller.borrow()
    }

    fn redraw(&self) {
        self.redraw.force_update();
    }

    /// Run what a state change asks for.
    pub fn react(&self, reaction: Reaction) {
        match reaction {
            Reaction::Refetch => self.refetch(),
            Reaction::Rederived => self.redraw(),
            Reaction::Unchanged => {},
        }
    }

    /// Issue a list request; an older one still in flight becomes stale.
    pub fn refetch(&self) {
        let ticket = self.controller.borrow_mut().begin_fetch();
        self.redraw();
        let handle = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = handle.backend.fetch_page(E::RESOURCE, ticket.query()).await;
            if let Err(err) = &result {
                web_sys::console::error_1(&format!("Failed to fetch {}: {}", E::RESOURCE, err).into());
            }
            let outcome = handle.controller.borrow_mut().apply_fetch(ticket, result);
            match outcome {
                FetchOutcome::Stale => return,
                FetchOutcome::Clamped {
                    ..
                } => handle.refetch(),
                FetchOutcome::Applied | FetchOutcome::Failed => {},
            }
            handle.schedule_toast();
            handle.redraw();
        });
    }

    /// Load the unfiltered collection behind the stats cards and filter
    /// choices. Only server-paginated resources need one.
    pub fn refresh_catalog(&self) {
        let ticket = self.controller.borrow_mut().begin_catalog();
        let handle = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = handle.backend.fetch_page(E::RESOURCE, ticket.query()).await;
            let outcome = handle.controller.borrow_mut().apply_catalog(ticket, result);
            match outcome {
                Ok(FetchOutcome::Stale) => return,
                Ok(_) => {},
                Err(err) => web_sys::console::error_1(&err.to_string().into()),
            }
            handle.schedule_toast();
            handle.redraw();
        });
    }

    /// Record search input and commit it once the debounce delay passes
    /// without newer input.
    pub fn set_search_text(&self, text: String) {
        let (token, delay) = {
            let mut controller = self.controller.borrow_mut();
            (controller.set_search_text(text), controller.search_debounce())
        };
        self.redraw();
        let handle = self.clone();
        Timeout::new(millis(delay), move || {
            let reaction = handle.controller.borrow_mut().commit_search(token);
            handle.react(reaction);
        })
        .forget();
    }

    /// Select a categorical filter value; empty clears it.
    pub fn set_filter(&self, name: &str, value: &str) {
        let reaction = self.controller.borrow_mut().set_filter(name, value);
        self.react(reaction);
    }

    /// Reset search, filters and page.
    pub fn clear_all(&self) {
        let reaction = self.controller.borrow_mut().clear_all();
        self.react(reaction);
    }

    /// Jump to a 0-based page.
    pub fn set_page(&self, index: usize) {
        let reaction = self.controller.borrow_mut().set_page(index);
        self.react(reaction);
    }

    /// Change rows per page; returns to the first page.
    pub fn set_page_size(&self, size: usize) {
        let reaction = self.controller.borrow_mut().set_page_size(size);
        self.react(reaction);
    }

    /// Flip a row's status once the server confirms it.
    pub fn toggle_active(&self, id: EntityId) {
        let plan = match self.controller.borrow().prepare_toggle(&id) {
            Ok(plan) => plan,
            Err(err) => {
                web_sys::console::error_1(&format!("Cannot toggle {}: {}", id, err).into());
                return;
            },
        };
        let handle = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = handle
                .backend
                .patch_entity(E::RESOURCE, &plan.id, &plan.payload)
                .await;
            let outcome = handle.controller.borrow_mut().apply_toggled(&plan, result);
            handle.after_mutation(outcome.map(|_| ()));
        });
    }

    /// Delete after the confirm dialog was accepted.
    pub fn remove(&self, confirmation: DeleteConfirmation) {
        let handle = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = handle
                .backend
                .delete_entity(E::RESOURCE, confirmation.id())
                .await;
            let outcome = handle
                .controller
                .borrow_mut()
                .apply_removed(confirmation, result);
            handle.after_mutation(outcome.map(|_| ()));
        });
    }

    /// Confirmation token for the delete dialog.
    pub fn confirm_remove(&self, id: &EntityId) -> DeleteConfirmation {
        self.controller.borrow().confirm_remove(id)
    }

    /// Hide the toast before its timer fires.
    pub fn dismiss_toast(&self) {
        self.controller.borrow_mut().notifications_mut().dismiss();
        self.redraw();
    }

    fn after_mutation(&self, outcome: Result<(), ControllerError>) {
        if let Err(err) = outcome {
            web_sys::console::error_1(&format!("{} mutation failed: {}", E::LABEL, err).into());
        }
        if self.controller.borrow().needs_fetch() {
            self.refetch();
        }
        self.schedule_toast();
        self.redraw();
    }

    /// Start the auto-hide timer for the visible toast.
    fn schedule_toast(&self) {
        let (token, delay) = {
            let controller = self.controller.borrow();
            let channel = controller.notifications();
            match channel.current_token() {
                Some(token) => (token, channel.auto_hide()),
                None => return,
            }
        };
        let handle = self.clone();
        Timeout::new(millis(delay), move || {
            let expired = handle
                .controller
                .borrow_mut()
                .notifications_mut()
                .expire(token);
            if expired {
                handle.redraw();
            }
        })
        .forget();
    }
}

fn millis(delay: std::time::Duration) -> u32 {
    u32::try_from(delay.as_millis()).unwrap_or(u32::MAX)
}

/// Own a [`ResourceController`] for the lifetime of a page and load its first
/// page (and, for server-paginated resources, its catalog) on mount.
#[hook]
pub fn use_resource_controller<E>(backend: Rc<GlooBackend>) -> ControllerHandle<E>
where
    E: AdminEntity,
{
    let controller = use_mut_ref(|| ResourceController::<E>::new(ControllerConfig::for_entity::<E>()));
    let redraw = use_force_update();
    let handle = ControllerHandle {
        controller,
        backend,
        redraw,
    };

    {
        let handle = handle.clone();
        use_effect_with((), move |_| {
            if handle.borrow().needs_fetch() {
                handle.refetch();
            }
            if handle.borrow().needs_catalog() {
                handle.refresh_catalog();
            }
            || ()
        });
    }

    handle
}
