//! Terraform import generation
//!
//! Turns existing tenant resources into Terraform `import` blocks.
//!
//! # Architecture
//!
//! - [`fetcher`] - Per-kind fetchers and the sequential aggregator
//! - [`registry`] - Named resource kinds selectable with `--resources`
//! - [`generator`] - Writes `main.tf` and `auth0_import.tf`
//!
//! # Example
//!
//! ```ignore
//! use crate::terraform::{fetch_import_data, generate_config_files, fetchers_for};
//!
//! async fn export(client: &Auth0Client) -> anyhow::Result<()> {
//!     let fetchers = fetchers_for(client, &["auth0_client".to_string()])?;
//!     let data = fetch_import_data(&fetchers).await?;
//!     generate_config_files("./out", &data)?;
//!     Ok(())
//! }
//! ```

mod fetcher;
mod generator;
mod registry;

pub use fetcher::fetch_import_data;
pub use generator::generate_config_files;
pub use registry::{fetchers_for, DEFAULT_RESOURCE_KINDS};

/// A single remote resource to bring under Terraform management
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    /// Remote identifier understood by the provider's importer
    pub import_id: String,
    /// Local resource address, `<resource_type>.<local_name>`
    pub resource_name: String,
}

impl ImportRecord {
    pub fn new(import_id: impl Into<String>, resource_name: impl Into<String>) -> Self {
        Self {
            import_id: import_id.into(),
            resource_name: resource_name.into(),
        }
    }
}

/// Import records in fetch order
pub type ImportDataList = Vec<ImportRecord>;
