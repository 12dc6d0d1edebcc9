//! Auth0 Management API interaction module
//!
//! Only the read-only listing calls needed to discover importable resources
//! live here.
//!
//! # Module Structure
//!
//! - [`client`] - Tenant client: base URL, access token, pagination
//! - [`http`] - HTTP utilities for REST API calls
//! - [`clients`] - Client application listing
//! - [`resource_servers`] - Resource server (API) listing
//!
//! # Example
//!
//! ```ignore
//! use crate::auth0::client::Auth0Client;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = Auth0Client::new("example.eu.auth0.com", "<token>")?;
//!     let apps = crate::auth0::clients::list_clients(&client).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod clients;
pub mod http;
pub mod resource_servers;
