//! Resource Kind Registry
//!
//! Named set of fetchers, keyed by Terraform resource type. The order of
//! [`RESOURCE_KINDS`] is the order records appear in the generated files.

use super::fetcher::{ClientResourceFetcher, ResourceDataFetcher, ResourceServerResourceFetcher};
use crate::auth0::client::Auth0Client;
use anyhow::Result;

/// Kinds exported when `--resources` is not given
pub const DEFAULT_RESOURCE_KINDS: &[&str] = &["auth0_client"];

/// Resource kind definition
struct ResourceKind {
    name: &'static str,
    build: fn(&Auth0Client) -> Box<dyn ResourceDataFetcher>,
}

/// Registered kinds, in output order
const RESOURCE_KINDS: &[ResourceKind] = &[
    ResourceKind {
        name: "auth0_client",
        build: build_client_fetcher,
    },
    ResourceKind {
        name: "auth0_resource_server",
        build: build_resource_server_fetcher,
    },
];

fn build_client_fetcher(client: &Auth0Client) -> Box<dyn ResourceDataFetcher> {
    Box::new(ClientResourceFetcher::new(client.clone()))
}

fn build_resource_server_fetcher(client: &Auth0Client) -> Box<dyn ResourceDataFetcher> {
    Box::new(ResourceServerResourceFetcher::new(client.clone()))
}

/// Get all resource kind names (for help text and error messages)
pub fn get_all_resource_kinds() -> Vec<&'static str> {
    RESOURCE_KINDS.iter().map(|k| k.name).collect()
}

/// Build the fetchers for the selected kinds
///
/// Selection is matched case-insensitively, duplicates collapse, and the
/// result follows registration order rather than selection order.
pub fn fetchers_for(
    client: &Auth0Client,
    selected: &[String],
) -> Result<Vec<Box<dyn ResourceDataFetcher>>> {
    let selected: Vec<String> = selected
        .iter()
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    if let Some(unknown) = selected
        .iter()
        .find(|s| !RESOURCE_KINDS.iter().any(|k| k.name == s.as_str()))
    {
        return Err(anyhow::anyhow!(
            "Unknown resource kind: {} (supported: {})",
            unknown,
            get_all_resource_kinds().join(", ")
        ));
    }

    if selected.is_empty() {
        return Err(anyhow::anyhow!("No resource kinds selected"));
    }

    Ok(RESOURCE_KINDS
        .iter()
        .filter(|k| selected.iter().any(|s| s == k.name))
        .map(|k| (k.build)(client))
        .collect())
}
