//! `PostgREST` implementation of [`RemoteStore`].

use async_trait::async_trait;
use lumina_core::{Classification, ClassificationKind, Product, ProductId, SiteConfig};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::rows::{
    ClassificationRecord, ClassificationRow, ProductRecord, ProductRow, SiteConfigRecord,
    SiteConfigRow, keep_valid,
};
use super::{RemoteError, RemoteStore};
use crate::config::SupabaseConfig;

/// Value no real key equals, used to express "delete every row" as a filter.
const DELETE_ALL_SENTINEL: &str = "__lumina_delete_all__";

const PREFER_MINIMAL: &str = "return=minimal";
const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=minimal";

/// `PostgREST` client for the catalog tables.
#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    rest_url: Url,
}

impl RestClient {
    /// Create a client authenticated with the anon key.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, RemoteError> {
        let key = config.anon_key.expose_secret();
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| RemoteError::Parse(format!("Invalid API key format: {e}")))?,
        );
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| RemoteError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            rest_url: service_url(&config.url, "rest/v1/")?,
        })
    }

    fn table_url(&self, table: &str, filters: &[(&str, String)]) -> Result<Url, RemoteError> {
        let mut url = self
            .rest_url
            .join(table)
            .map_err(|e| RemoteError::Parse(e.to_string()))?;
        if !filters.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in filters {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<RequestBuilder, RemoteError> {
        Ok(self.client.request(method, self.table_url(table, filters)?))
    }

    async fn select<R: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<R>, RemoteError> {
        let response = send(self.request(Method::GET, table, filters)?).await?;
        response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))
    }

    async fn write<B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        table: &str,
        filters: &[(&str, String)],
        prefer: &'static str,
        body: &B,
    ) -> Result<(), RemoteError> {
        let request = self
            .request(method, table, filters)?
            .header("Prefer", prefer)
            .json(body);
        send(request).await.map(drop)
    }

    async fn delete(&self, table: &str, filters: &[(&str, String)]) -> Result<(), RemoteError> {
        send(self.request(Method::DELETE, table, filters)?)
            .await
            .map(drop)
    }
}

/// Resolve a path under the project URL, keeping any path prefix.
pub(super) fn service_url(base: &Url, path: &str) -> Result<Url, RemoteError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path).map_err(|e| RemoteError::Parse(e.to_string()))
}

/// Send a request, turning non-success statuses into [`RemoteError::Api`].
pub(super) async fn send(request: RequestBuilder) -> Result<Response, RemoteError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(RemoteError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response)
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

fn select_all(order: &str) -> Vec<(&'static str, String)> {
    vec![("select", "*".to_owned()), ("order", order.to_owned())]
}

#[async_trait]
impl RemoteStore for RestClient {
    #[instrument(skip(self))]
    async fn ping(&self) -> Result<(), RemoteError> {
        let filters = [("select", "id".to_owned()), ("limit", "1".to_owned())];
        send(self.request(Method::GET, "site_config", &filters)?)
            .await
            .map(drop)
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, RemoteError> {
        let rows: Vec<ProductRow> = self
            .select("products", &select_all("created_at.desc"))
            .await?;
        Ok(keep_valid(rows, Product::try_from))
    }

    #[instrument(skip(self, products), fields(count = products.len()))]
    async fn upsert_products(&self, products: &[Product]) -> Result<(), RemoteError> {
        let records: Vec<ProductRecord<'_>> = products.iter().map(ProductRecord::from).collect();
        self.write(Method::POST, "products", &[], PREFER_UPSERT, &records)
            .await
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: &ProductId) -> Result<(), RemoteError> {
        self.delete("products", &[("id", eq(id.as_str()))]).await
    }

    #[instrument(skip(self))]
    async fn delete_all_products(&self) -> Result<(), RemoteError> {
        self.delete("products", &[("id", format!("neq.{DELETE_ALL_SENTINEL}"))])
            .await
    }

    #[instrument(skip(self))]
    async fn reassign_products(
        &self,
        kind: ClassificationKind,
        from: &str,
        to: &str,
    ) -> Result<(), RemoteError> {
        let column = kind.product_column();
        let mut body = serde_json::Map::new();
        body.insert(column.to_owned(), serde_json::Value::from(to));
        self.write(
            Method::PATCH,
            "products",
            &[(column, eq(from))],
            PREFER_MINIMAL,
            &body,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_classifications(
        &self,
        kind: ClassificationKind,
    ) -> Result<Vec<Classification>, RemoteError> {
        let rows: Vec<ClassificationRow> =
            self.select(kind.table(), &select_all("name.asc")).await?;
        Ok(keep_valid(rows, |row| row.into_classification(kind)))
    }

    #[instrument(skip(self, data), fields(name = %data.name))]
    async fn insert_classification(
        &self,
        kind: ClassificationKind,
        data: &Classification,
    ) -> Result<(), RemoteError> {
        self.write(
            Method::POST,
            kind.table(),
            &[],
            PREFER_MINIMAL,
            &ClassificationRecord::from(data),
        )
        .await
    }

    #[instrument(skip(self, data), fields(count = data.len()))]
    async fn upsert_classifications(
        &self,
        kind: ClassificationKind,
        data: &[Classification],
    ) -> Result<(), RemoteError> {
        let records: Vec<ClassificationRecord<'_>> =
            data.iter().map(ClassificationRecord::from).collect();
        self.write(
            Method::POST,
            kind.table(),
            &[("on_conflict", "name".to_owned())],
            PREFER_UPSERT,
            &records,
        )
        .await
    }

    #[instrument(skip(self, description))]
    async fn update_description(
        &self,
        kind: ClassificationKind,
        name: &str,
        description: &str,
    ) -> Result<(), RemoteError> {
        self.write(
            Method::PATCH,
            kind.table(),
            &[("name", eq(name))],
            PREFER_MINIMAL,
            &serde_json::json!({ "description": description }),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete_classification(
        &self,
        kind: ClassificationKind,
        name: &str,
    ) -> Result<(), RemoteError> {
        self.delete(kind.table(), &[("name", eq(name))]).await
    }

    #[instrument(skip(self))]
    async fn delete_all_classifications(
        &self,
        kind: ClassificationKind,
    ) -> Result<(), RemoteError> {
        self.delete(
            kind.table(),
            &[("name", format!("neq.{DELETE_ALL_SENTINEL}"))],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn load_site_config(&self) -> Result<Option<SiteConfig>, RemoteError> {
        let filters = [
            ("select", "*".to_owned()),
            ("id", eq(&lumina_core::SITE_CONFIG_ID.to_string())),
        ];
        let rows: Vec<SiteConfigRow> = self.select("site_config", &filters).await?;
        rows.into_iter().next().map(SiteConfig::try_from).transpose()
    }

    #[instrument(skip(self, config))]
    async fn save_site_config(&self, config: &SiteConfig) -> Result<(), RemoteError> {
        self.write(
            Method::POST,
            "site_config",
            &[("on_conflict", "id".to_owned())],
            PREFER_UPSERT,
            &SiteConfigRecord::from(config),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn client(base: &str) -> RestClient {
        RestClient::new(&SupabaseConfig {
            url: Url::parse(base).unwrap(),
            anon_key: SecretString::from("anon-key"),
            service_role_key: None,
        })
        .unwrap()
    }

    #[test]
    fn test_table_url_with_filters() {
        let client = client("https://abc.supabase.co");
        let url = client
            .table_url("collections", &[("name", eq("Orgánica"))])
            .unwrap();
        assert_eq!(url.path(), "/rest/v1/collections");
        assert_eq!(
            url.query_pairs().next().unwrap(),
            ("name".into(), "eq.Orgánica".into())
        );
    }

    #[test]
    fn test_service_url_keeps_prefix() {
        let base = Url::parse("http://localhost:54321/proxy").unwrap();
        let url = service_url(&base, "rest/v1/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:54321/proxy/rest/v1/");
    }
}
