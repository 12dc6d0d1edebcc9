//! Auth0 Resource Servers
//!
//! Listing of APIs (`/api/v2/resource-servers`).

use super::client::Auth0Client;
use anyhow::Result;
use serde::Deserialize;

/// Resource server (API) information
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceServer {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Tenant-owned APIs such as the Management API itself
    #[serde(default)]
    pub is_system: bool,
}

/// List every resource server in the tenant, in API order
pub async fn list_resource_servers(client: &Auth0Client) -> Result<Vec<ResourceServer>> {
    client
        .list_all("resource-servers", "resource_servers", &[])
        .await
}
