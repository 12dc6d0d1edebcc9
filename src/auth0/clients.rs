//! Auth0 Clients
//!
//! Listing of client applications (`/api/v2/clients`).

use super::client::Auth0Client;
use anyhow::Result;
use serde::Deserialize;

/// Client application information
#[derive(Debug, Clone, Deserialize)]
pub struct Client {
    pub client_id: String,
    #[serde(default)]
    pub name: String,
    /// The tenant-wide "All Applications" pseudo-client
    #[serde(default)]
    pub global: bool,
}

/// List every client application in the tenant, in API order
pub async fn list_clients(client: &Auth0Client) -> Result<Vec<Client>> {
    let query = [
        ("fields", "client_id,name,global".to_string()),
        ("include_fields", "true".to_string()),
    ];
    client.list_all("clients", "clients", &query).await
}
