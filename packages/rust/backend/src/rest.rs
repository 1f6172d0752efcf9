//! PostgREST client for a hosted Supabase project.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;
use yanaflow_shared::{AppConfig, Result, YanaFlowError, resolve_api_key};

use crate::{Table, TableSource};

/// User-Agent string for backend requests.
const USER_AGENT: &str = concat!("yanaflow/", env!("CARGO_PKG_VERSION"));

/// Default timeout in seconds for a single table query.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Path prefix of the REST endpoint on a Supabase project.
const REST_PREFIX: &str = "rest/v1";

/// Connection settings for [`RestClient`].
#[derive(Debug, Clone)]
pub struct RestOptions {
    /// Timeout for each HTTP request in seconds.
    pub timeout_secs: u64,
    /// Postgres schema, sent as `Accept-Profile`.
    pub schema: String,
}

impl Default for RestOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            schema: "public".into(),
        }
    }
}

/// Error object returned by PostgREST on a failed query.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

impl PostgrestError {
    fn describe(&self) -> String {
        let mut out = self.message.clone();
        if let Some(code) = &self.code {
            out.push_str(&format!(" (code {code})"));
        }
        if let Some(details) = &self.details {
            out.push_str(&format!("; {details}"));
        }
        if let Some(hint) = &self.hint {
            out.push_str(&format!("; hint: {hint}"));
        }
        out
    }
}

/// Reads tables through `GET {url}/rest/v1/{table}?select=*`.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: Url,
}

impl RestClient {
    /// Build a client for the project at `base_url`, authenticating with the
    /// project's anon key.
    pub fn new(base_url: Url, api_key: &str, opts: &RestOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|e| YanaFlowError::config(format!("invalid API key: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| YanaFlowError::config(format!("invalid API key: {e}")))?;
        let profile = HeaderValue::from_str(&opts.schema)
            .map_err(|e| YanaFlowError::config(format!("invalid schema name: {e}")))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("accept-profile", profile);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| YanaFlowError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Build a client from the `[backend]` config section and its env vars.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let base_url = config.backend.base_url()?;
        let api_key = resolve_api_key(config)?;
        let opts = RestOptions {
            timeout_secs: config.backend.timeout_secs,
            schema: config.backend.schema.clone(),
        };
        Self::new(base_url, &api_key, &opts)
    }

    /// Endpoint for a full-table select.
    fn table_url(&self, table: Table) -> Result<Url> {
        let root = self.base_url.as_str().trim_end_matches('/');
        let raw = format!("{root}/{REST_PREFIX}/{}?select=*", table.as_str());
        Url::parse(&raw).map_err(|e| YanaFlowError::validation(format!("{raw}: {e}")))
    }
}

impl TableSource for RestClient {
    #[instrument(skip_all, fields(table = %table))]
    async fn select_all<T>(&self, table: Table) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        let url = self.table_url(table)?;
        debug!(%url, "querying table");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| YanaFlowError::Network(format!("{table}: {e}")))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| YanaFlowError::Network(format!("{table}: failed to read body: {e}")))?;

        if !status.is_success() {
            let message = match serde_json::from_slice::<PostgrestError>(&body) {
                Ok(err) => err.describe(),
                Err(_) => format!("HTTP {status}"),
            };
            return Err(YanaFlowError::backend(table.as_str(), message));
        }

        let rows: Option<Vec<T>> = serde_json::from_slice(&body)
            .map_err(|e| YanaFlowError::parse(format!("{table}: {e}")))?;
        let rows = rows.unwrap_or_default();

        debug!(rows = rows.len(), "table fetched");
        Ok(rows)
    }
}
