use anyhow::Result;
use edu_admin_cli::HttpBackend;
use edu_admin_shared::{
    AdminEntity, CollectionStats, ControllerConfig, Course, Nft, Quest, ResourceController, User,
};
use serde::Serialize;

use super::print_json;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceOverview {
    resource: &'static str,
    /// Rows in the whole collection.
    total_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<CollectionStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Fetch every resource once and print its totals. A failing resource is
/// reported inline instead of aborting the others.
pub async fn run(backend: &HttpBackend) -> Result<()> {
    let overview = vec![
        summarize::<User>(backend).await,
        summarize::<Course>(backend).await,
        summarize::<Nft>(backend).await,
        summarize::<Quest>(backend).await,
    ];
    print_json(&overview)
}

async fn summarize<E: AdminEntity>(backend: &HttpBackend) -> ResourceOverview {
    let mut controller = ResourceController::<E>::new(ControllerConfig::for_entity::<E>());
    match controller.refresh_catalog(backend).await {
        Ok(_) => {
            let stats = controller.stats();
            ResourceOverview {
                resource: E::RESOURCE,
                total_count: stats.total,
                stats: Some(stats),
                error: None,
            }
        },
        Err(err) => ResourceOverview {
            resource: E::RESOURCE,
            total_count: 0,
            stats: None,
            error: Some(err.to_string()),
        },
    }
}
