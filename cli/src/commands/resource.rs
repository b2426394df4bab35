use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use edu_admin_cli::HttpBackend;
use edu_admin_shared::{
    AdminEntity, CollectionStats, ControllerConfig, EntityId, FetchOutcome, FetchStrategy,
    ResourceController,
};
use serde::Serialize;
use serde_json::Value;

use super::print_json;
use crate::cli::ResourceAction;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageOutput<E> {
    resource: &'static str,
    page: usize,
    page_size: usize,
    total_count: usize,
    total_pages: usize,
    items: Vec<E>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsOutput {
    resource: &'static str,
    #[serde(flatten)]
    stats: CollectionStats,
}

pub async fn run<E: AdminEntity>(backend: &HttpBackend, action: ResourceAction) -> Result<()> {
    let mut controller = ResourceController::<E>::new(ControllerConfig::for_entity::<E>());
    match action {
        ResourceAction::List {
            page,
            page_size,
            search,
            filters,
            stats,
        } => {
            let _ = controller.set_page_size(page_size);
            for (name, value) in &filters {
                if !E::FILTERS.contains(&name.as_str()) {
                    bail!(
                        "unknown filter `{name}` for {}; expected one of: {}",
                        E::RESOURCE,
                        E::FILTERS.join(", ")
                    );
                }
                let _ = controller.set_filter(name, value);
            }
            if let Some(search) = search {
                let token = controller.set_search_text(search);
                let _ = controller.commit_search(token);
            }
            if stats {
                controller.refresh_catalog(backend).await?;
                return print_json(&StatsOutput {
                    resource: E::RESOURCE,
                    stats: controller.stats(),
                });
            }
            let target = page.saturating_sub(1);
            match controller.strategy() {
                FetchStrategy::ServerPaginated => {
                    let _ = controller.set_page(target);
                    fetch(&mut controller, backend).await?;
                },
                FetchStrategy::ClientCached => {
                    fetch(&mut controller, backend).await?;
                    let _ = controller.set_page(target);
                },
            }
            print_json(&PageOutput {
                resource: E::RESOURCE,
                page: controller.window().page_index() + 1,
                page_size: controller.window().page_size(),
                total_count: controller.total_count(),
                total_pages: controller.total_pages(),
                items: controller.visible_items(),
            })
        },
        ResourceAction::Show {
            id,
        } => {
            let entity = controller.load_detail(backend, &EntityId::new(id)).await?;
            print_json(&entity)
        },
        ResourceAction::Create {
            data,
            file,
        } => {
            let payload = read_payload(data, file)?;
            let created = controller.create(backend, &payload).await?;
            report(&controller);
            print_json(&created)
        },
        ResourceAction::Update {
            id,
            data,
            file,
        } => {
            let payload = read_payload(data, file)?;
            let updated = controller
                .update(backend, &EntityId::new(id), &payload)
                .await?;
            report(&controller);
            print_json(&updated)
        },
        ResourceAction::Toggle {
            id,
        } => {
            let id = EntityId::new(id);
            controller.load_detail(backend, &id).await?;
            let toggled = controller.toggle_active(backend, &id).await?;
            report(&controller);
            print_json(&toggled)
        },
        ResourceAction::Delete {
            id,
            yes,
        } => {
            if !yes {
                bail!("refusing to delete {} {id} without --yes", E::RESOURCE);
            }
            let id = EntityId::new(id);
            controller.load_detail(backend, &id).await?;
            let confirmation = controller.confirm_remove(&id);
            let action = controller.remove(backend, confirmation).await?;
            report(&controller);
            print_json(&serde_json::json!({ "id": id, "action": action }))
        },
    }
}

async fn fetch<E: AdminEntity>(
    controller: &mut ResourceController<E>,
    backend: &HttpBackend,
) -> Result<()> {
    match controller.refresh(backend).await {
        FetchOutcome::Failed => match controller.last_error() {
            Some(err) => Err(err.clone().into()),
            None => bail!("failed to load {}", E::RESOURCE),
        },
        _ => Ok(()),
    }
}

/// Echo the controller's toast to the log.
fn report<E: AdminEntity>(controller: &ResourceController<E>) {
    if let Some(notification) = controller.notifications().current() {
        tracing::info!("{}", notification.message);
    }
}

fn read_payload(data: Option<String>, file: Option<PathBuf>) -> Result<Value> {
    let raw = match (data, file) {
        (Some(data), _) => data,
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("failed to read payload file {}", path.display()))?,
        (None, None) => bail!("either --data or --file is required"),
    };
    let payload: Value = serde_json::from_str(&raw).context("payload is not valid JSON")?;
    if !payload.is_object() {
        bail!("payload must be a JSON object");
    }
    Ok(payload)
}
