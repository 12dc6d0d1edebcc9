//! Resource Fetcher
//!
//! Fetchers turn one kind of tenant resource into import records. The
//! aggregator runs a list of them in order and stops at the first failure.

use super::{ImportDataList, ImportRecord};
use crate::auth0::client::Auth0Client;
use crate::auth0::{clients, resource_servers};
use anyhow::Result;
use async_trait::async_trait;

/// Retrieves import records for one resource kind
#[async_trait]
pub trait ResourceDataFetcher: Send + Sync {
    /// Terraform resource type of the records this fetcher produces
    fn resource_type(&self) -> &'static str;

    /// List the remote resources of this kind; an empty list is not an error
    async fn fetch_data(&self) -> Result<ImportDataList>;
}

/// Client applications (`auth0_client`)
pub struct ClientResourceFetcher {
    client: Auth0Client,
}

impl ClientResourceFetcher {
    pub fn new(client: Auth0Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceDataFetcher for ClientResourceFetcher {
    fn resource_type(&self) -> &'static str {
        "auth0_client"
    }

    async fn fetch_data(&self) -> Result<ImportDataList> {
        let apps = clients::list_clients(&self.client).await?;

        Ok(apps
            .into_iter()
            .filter(|app| !app.global)
            .map(|app| {
                let name = local_name(&app.name, &app.client_id);
                ImportRecord::new(app.client_id, format!("{}.{}", self.resource_type(), name))
            })
            .collect())
    }
}

/// APIs (`auth0_resource_server`)
pub struct ResourceServerResourceFetcher {
    client: Auth0Client,
}

impl ResourceServerResourceFetcher {
    pub fn new(client: Auth0Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceDataFetcher for ResourceServerResourceFetcher {
    fn resource_type(&self) -> &'static str {
        "auth0_resource_server"
    }

    async fn fetch_data(&self) -> Result<ImportDataList> {
        let servers = resource_servers::list_resource_servers(&self.client).await?;

        Ok(servers
            .into_iter()
            .filter(|server| !server.is_system)
            .map(|server| {
                let name = local_name(&server.name, &server.id);
                ImportRecord::new(server.id, format!("{}.{}", self.resource_type(), name))
            })
            .collect())
    }
}

/// Run every fetcher in order and concatenate their records
///
/// The first failing fetcher aborts the whole run; records gathered by the
/// fetchers before it are dropped.
pub async fn fetch_import_data(
    fetchers: &[Box<dyn ResourceDataFetcher>],
) -> Result<ImportDataList> {
    let mut import_data = ImportDataList::new();

    for fetcher in fetchers {
        tracing::debug!("Fetching {} resources", fetcher.resource_type());

        let data = fetcher.fetch_data().await.map_err(|e| {
            tracing::warn!("Fetching {} failed: {:#}", fetcher.resource_type(), e);
            e
        })?;

        tracing::info!("Fetched {} {} record(s)", data.len(), fetcher.resource_type());
        import_data.extend(data);
    }

    Ok(import_data)
}

/// Turn a display name into a valid Terraform local name
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single `_`, and strips leading digits and underscores. Non-ASCII letters
/// count as separators and are dropped, so "über app" becomes "ber_app".
/// e.g., "My App" -> "my_app", "2nd Tenant API!" -> "nd_tenant_api"
pub fn sanitize_resource_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !sanitized.is_empty() {
                sanitized.push('_');
            }
            pending_separator = false;
            sanitized.push(c);
        } else {
            pending_separator = true;
        }
    }

    sanitized
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '_')
        .to_string()
}

/// Local name from the display name, falling back to the remote identifier
fn local_name(name: &str, id: &str) -> String {
    let sanitized = sanitize_resource_name(name);
    if !sanitized.is_empty() {
        return sanitized;
    }

    let from_id = sanitize_resource_name(id);
    if from_id.is_empty() {
        "unnamed".to_string()
    } else {
        from_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StaticFetcher {
        records: ImportDataList,
        calls: Arc<AtomicUsize>,
    }

    impl StaticFetcher {
        fn boxed(records: ImportDataList, calls: &Arc<AtomicUsize>) -> Box<dyn ResourceDataFetcher> {
            Box::new(Self {
                records,
                calls: Arc::clone(calls),
            })
        }
    }

    #[async_trait]
    impl ResourceDataFetcher for StaticFetcher {
        fn resource_type(&self) -> &'static str {
            "static"
        }

        async fn fetch_data(&self) -> Result<ImportDataList> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.clone())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl ResourceDataFetcher for FailingFetcher {
        fn resource_type(&self) -> &'static str {
            "failing"
        }

        async fn fetch_data(&self) -> Result<ImportDataList> {
            Err(anyhow::anyhow!("API request failed: 403 Forbidden"))
        }
    }

    #[test]
    fn test_sanitize_resource_name() {
        assert_eq!(sanitize_resource_name("My App"), "my_app");
        assert_eq!(sanitize_resource_name("my_app"), "my_app");
        assert_eq!(sanitize_resource_name("  Spaced -- Out  "), "spaced_out");
        assert_eq!(sanitize_resource_name("123 Numbers First"), "numbers_first");
        assert_eq!(sanitize_resource_name("2nd Tenant API!"), "nd_tenant_api");
        assert_eq!(sanitize_resource_name("API v2"), "api_v2");
        assert_eq!(sanitize_resource_name("!!!"), "");
    }

    #[test]
    fn test_sanitize_drops_non_ascii_letters() {
        assert_eq!(sanitize_resource_name("über app"), "ber_app");
        assert_eq!(sanitize_resource_name("Café Ünïcode"), "caf_n_code");
    }

    /// `[a-z][a-z0-9]*(_[a-z0-9]+)*`
    fn is_terraform_local_name(name: &str) -> bool {
        let mut segments = name.split('_');
        let first_ok = segments.next().is_some_and(|first| {
            first.starts_with(|c: char| c.is_ascii_lowercase())
                && first.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        });
        first_ok
            && segments.all(|segment| {
                !segment.is_empty()
                    && segment.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            })
    }

    #[test]
    fn test_is_terraform_local_name() {
        assert!(is_terraform_local_name("my_app2"));
        assert!(!is_terraform_local_name("_app"));
        assert!(!is_terraform_local_name("app_"));
        assert!(!is_terraform_local_name("my__app"));
        assert!(!is_terraform_local_name("2app"));
        assert!(!is_terraform_local_name(""));
    }

    proptest::proptest! {
        /// Any display name yields a valid, stable Terraform local name
        #[test]
        fn local_name_is_always_valid(name in proptest::prelude::any::<String>(), id in proptest::prelude::any::<String>()) {
            let local = local_name(&name, &id);
            proptest::prop_assert!(!local.is_empty());
            proptest::prop_assert!(is_terraform_local_name(&local), "invalid local name {:?}", local);

            let sanitized = sanitize_resource_name(&name);
            proptest::prop_assert_eq!(sanitize_resource_name(&sanitized), sanitized);
        }
    }

    #[test]
    fn test_local_name_falls_back_to_id() {
        assert_eq!(local_name("My App", "abc"), "my_app");
        assert_eq!(local_name("***", "Abc123XYZ"), "abc123xyz");
        assert_eq!(local_name("", "123"), "unnamed");
    }

    #[tokio::test]
    async fn test_fetch_import_data_preserves_fetcher_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetchers = vec![
            StaticFetcher::boxed(
                vec![
                    ImportRecord::new("a1", "auth0_client.a1"),
                    ImportRecord::new("a2", "auth0_client.a2"),
                ],
                &calls,
            ),
            StaticFetcher::boxed(vec![], &calls),
            StaticFetcher::boxed(vec![ImportRecord::new("b1", "auth0_resource_server.b1")], &calls),
        ];

        let data = fetch_import_data(&fetchers).await.unwrap();

        let ids: Vec<&str> = data.iter().map(|r| r.import_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "b1"]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fetch_import_data_stops_at_first_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetchers: Vec<Box<dyn ResourceDataFetcher>> = vec![
            StaticFetcher::boxed(vec![ImportRecord::new("a1", "auth0_client.a1")], &calls),
            Box::new(FailingFetcher),
            StaticFetcher::boxed(vec![ImportRecord::new("c1", "auth0_client.c1")], &calls),
        ];

        let err = fetch_import_data(&fetchers).await.unwrap_err();

        assert_eq!(err.to_string(), "API request failed: 403 Forbidden");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    proptest::proptest! {
        /// Aggregation is the in-order concatenation of every fetcher's records
        #[test]
        fn fetch_import_data_concatenates_in_order(
            batches in proptest::collection::vec(
                proptest::collection::vec(("[a-z0-9|]{1,12}", "auth0_client\\.[a-z]{1,8}"), 0..5),
                0..6,
            )
        ) {
            let calls = Arc::new(AtomicUsize::new(0));
            let batches: Vec<ImportDataList> = batches
                .into_iter()
                .map(|batch| batch.into_iter().map(|(id, name)| ImportRecord::new(id, name)).collect())
                .collect();
            let fetchers: Vec<Box<dyn ResourceDataFetcher>> = batches
                .iter()
                .map(|batch| StaticFetcher::boxed(batch.clone(), &calls))
                .collect();

            let data = tokio_test::block_on(fetch_import_data(&fetchers)).unwrap();

            proptest::prop_assert_eq!(data, batches.concat());
            proptest::prop_assert_eq!(calls.load(Ordering::SeqCst), batches.len());
        }
    }

    #[tokio::test]
    async fn test_fetch_import_data_without_fetchers_is_empty() {
        let data = fetch_import_data(&[]).await.unwrap();
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn test_client_fetcher_builds_records_and_skips_global() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/clients"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "start": 0, "limit": 100, "total": 3,
                "clients": [
                    {"client_id": "global-id", "name": "All Applications", "global": true},
                    {"client_id": "auth0|123", "name": "My App", "global": false},
                    {"client_id": "xyz789", "name": "Back-Office (M2M)"}
                ]
            })))
            .mount(&server)
            .await;

        let client = Auth0Client::new(&server.uri(), "test-token").unwrap();
        let data = ClientResourceFetcher::new(client).fetch_data().await.unwrap();

        assert_eq!(
            data,
            vec![
                ImportRecord::new("auth0|123", "auth0_client.my_app"),
                ImportRecord::new("xyz789", "auth0_client.back_office_m2m"),
            ]
        );
    }

    #[tokio::test]
    async fn test_client_fetcher_empty_tenant_is_not_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/clients"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "start": 0, "limit": 100, "total": 0, "clients": []
            })))
            .mount(&server)
            .await;

        let client = Auth0Client::new(&server.uri(), "test-token").unwrap();
        let data = ClientResourceFetcher::new(client).fetch_data().await.unwrap();

        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn test_client_fetcher_surfaces_api_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/clients"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "statusCode": 403,
                "error": "Forbidden",
                "message": "Insufficient scope, expected any of: read:clients"
            })))
            .mount(&server)
            .await;

        let client = Auth0Client::new(&server.uri(), "test-token").unwrap();
        let err = ClientResourceFetcher::new(client).fetch_data().await.unwrap_err();

        assert!(err.to_string().contains("read:clients"), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_resource_server_fetcher_skips_system_apis() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/resource-servers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "start": 0, "limit": 100, "total": 2,
                "resource_servers": [
                    {"id": "rs-system", "name": "Auth0 Management API", "is_system": true},
                    {"id": "rs-orders", "name": "Orders API"}
                ]
            })))
            .mount(&server)
            .await;

        let client = Auth0Client::new(&server.uri(), "test-token").unwrap();
        let data = ResourceServerResourceFetcher::new(client)
            .fetch_data()
            .await
            .unwrap();

        assert_eq!(
            data,
            vec![ImportRecord::new("rs-orders", "auth0_resource_server.orders_api")]
        );
    }
}
