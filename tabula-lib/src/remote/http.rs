//! HTTP data source built on reqwest.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Method;

use super::DataSource;
use super::RemoteRequest;
use crate::error::RemoteError;
use crate::options::ServerOptions;

/// Fetches pages from a JSON HTTP endpoint.
///
/// GET requests carry the grid state as query parameters; any other method
/// sends it as a JSON body. The source is cheap to clone.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tabula_lib::remote::HttpDataSource;
///
/// let source = HttpDataSource::builder("https://api.example.com/users")
///     .method(reqwest::Method::POST)
///     .header("Authorization", "Bearer token")
///     .timeout(Duration::from_secs(10))
///     .build();
/// ```
#[derive(Clone)]
pub struct HttpDataSource {
    inner: Arc<HttpDataSourceInner>,
}

struct HttpDataSourceInner {
    url: String,
    method: Method,
    headers: BTreeMap<String, String>,
    http_client: Client,
    timeout: Option<Duration>,
}

impl HttpDataSource {
    /// Creates a new builder for the endpoint at `url`.
    pub fn builder(url: impl Into<String>) -> HttpDataSourceBuilder {
        HttpDataSourceBuilder::new(url)
    }

    /// Builds a source from declarative server options.
    ///
    /// Returns `None` when no URL is configured. An unknown method name is
    /// logged and replaced by GET.
    pub fn from_options(options: &ServerOptions) -> Option<Self> {
        let url = options.url.as_ref()?;
        let method = Method::from_bytes(options.method.to_ascii_uppercase().as_bytes())
            .unwrap_or_else(|_| {
                log::warn!("unknown HTTP method '{}', using GET", options.method);
                Method::GET
            });

        let mut builder = Self::builder(url.clone()).method(method);
        for (name, value) in &options.headers {
            builder = builder.header(name.clone(), value.clone());
        }
        Some(builder.build())
    }

    /// Returns the endpoint URL.
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    fn map_send_error(&self, error: reqwest::Error) -> RemoteError {
        match (error.is_timeout(), self.inner.timeout) {
            (true, Some(timeout)) => RemoteError::Timeout(timeout),
            _ => RemoteError::Network(error),
        }
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch(&self, request: &RemoteRequest) -> Result<serde_json::Value, RemoteError> {
        let inner = &self.inner;

        let mut builder = if inner.method == Method::GET {
            let url = request.to_url(&inner.url)?;
            inner.http_client.get(url)
        } else {
            inner
                .http_client
                .request(inner.method.clone(), &inner.url)
                .json(&request.to_body())
        };

        for (name, value) in &inner.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = inner.timeout {
            builder = builder.timeout(timeout);
        }

        log::debug!("{} {} page={}", inner.method, inner.url, request.page);
        let response = builder.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            return Err(RemoteError::http(status.as_u16(), body));
        }

        serde_json::from_str(&body)
            .map_err(|e| RemoteError::parse_with_body(e.to_string(), body))
    }
}

impl std::fmt::Debug for HttpDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDataSource")
            .field("url", &self.inner.url)
            .field("method", &self.inner.method)
            .finish()
    }
}

/// Builder for [`HttpDataSource`].
#[derive(Debug)]
pub struct HttpDataSourceBuilder {
    url: String,
    method: Method,
    headers: BTreeMap<String, String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl HttpDataSourceBuilder {
    /// Creates a builder for a GET endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            headers: BTreeMap::new(),
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Adds a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// Ignored if a custom HTTP client is supplied.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the [`HttpDataSource`].
    pub fn build(self) -> HttpDataSource {
        let http_client = self.http_client.unwrap_or_else(|| {
            let mut builder = Client::builder();
            if let Some(timeout) = self.connect_timeout {
                builder = builder.connect_timeout(timeout);
            }
            builder.build().unwrap_or_else(|e| {
                log::warn!("failed to build configured HTTP client: {}", e);
                Client::new()
            })
        });

        HttpDataSource {
            inner: Arc::new(HttpDataSourceInner {
                url: self.url,
                method: self.method,
                headers: self.headers,
                http_client,
                timeout: self.timeout,
            }),
        }
    }
}
