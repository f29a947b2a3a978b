//! HTTP request plumbing shared by all sub-clients
//!
//! Every call goes through [`FetchBuilder`] (JSON, empty and binary
//! responses) or [`upload_multipart`] (spreadsheet uploads with progress).
//! Non-success responses become [`Error::Api`] carrying the `error` field
//! of the body when present, otherwise the operation's fallback message.
//! A request that never reaches the service becomes [`Error::NoResponse`].
//! Nothing here retries.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{multipart, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use crate::error::Error;
use crate::file::SelectedFile;

/// Observer for upload progress, called with percent values 0..=100
///
/// Values are monotonically non-decreasing; a successful upload always
/// ends with 100.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

const DEFAULT_FALLBACK: &str = "Request failed";

/// Bytes handed to the transport per progress tick
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
}

/// Helper for building and executing HTTP requests
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    query_params: Option<HashMap<String, String>>,
    body: Option<Vec<u8>>,
    fallback: Option<String>,
}

impl<'a> FetchBuilder<'a> {
    /// Create a new FetchBuilder
    pub fn new(client: &'a Client, url: &str, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        Self {
            client,
            url: url.to_string(),
            method,
            headers,
            query_params: None,
            body: None,
            fallback: None,
        }
    }

    /// Add a header to the request
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add bearer token authentication to the request
    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {}", token))
    }

    /// Add bearer token authentication when a token is present
    pub fn bearer_auth_opt(self, token: Option<String>) -> Self {
        match token {
            Some(token) => self.bearer_auth(&token),
            None => self,
        }
    }

    /// Add query parameters to the request
    pub fn query(mut self, params: HashMap<String, String>) -> Self {
        self.query_params = Some(params);
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(body)?;
        self.body = Some(json);
        Ok(self)
    }

    /// Set the message used when the service reports no error of its own
    pub fn error_context(mut self, fallback: &str) -> Self {
        self.fallback = Some(fallback.to_string());
        self
    }

    /// Build the request
    fn build(&self) -> Result<RequestBuilder, Error> {
        let mut url = Url::parse(&self.url)?;

        if let Some(params) = &self.query_params {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in params {
                query_pairs.append_pair(key, value);
            }
        }

        debug!("{} {}", self.method, url);

        let mut req = self.client.request(self.method.clone(), url.as_str());
        req = req.headers(self.headers.clone());

        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }

        Ok(req)
    }

    async fn send(&self) -> Result<reqwest::Response, Error> {
        let req = self.build()?;
        let response = req.send().await.map_err(Error::NoResponse)?;

        if !response.status().is_success() {
            let fallback = self.fallback.as_deref().unwrap_or(DEFAULT_FALLBACK);
            return Err(api_error(response, fallback).await);
        }

        Ok(response)
    }

    /// Execute the request and parse the response as JSON
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let response = self.send().await?;
        let result = response.json::<T>().await?;
        Ok(result)
    }

    /// Execute the request, discarding the response body
    pub async fn execute_empty(&self) -> Result<(), Error> {
        self.send().await?;
        Ok(())
    }

    /// Execute the request and return the raw response bytes
    pub async fn execute_bytes(&self) -> Result<Bytes, Error> {
        let response = self.send().await?;
        let bytes = response.bytes().await?;
        Ok(bytes)
    }
}

/// Helper for creating HTTP requests
pub struct Fetch;

impl Fetch {
    /// Create a GET request
    pub fn get<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::GET)
    }

    /// Create a POST request
    pub fn post<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::POST)
    }

    /// Create a PUT request
    pub fn put<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::PUT)
    }

    /// Create a DELETE request
    pub fn delete<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::DELETE)
    }
}

/// Turn a non-success response into an [`Error::Api`]
pub(crate) async fn api_error(response: reqwest::Response, fallback: &str) -> Error {
    let status = response.status();
    let message = match response.text().await {
        Ok(text) => serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| fallback.to_string()),
        Err(_) => fallback.to_string(),
    };
    Error::api(status, message)
}

/// POST a file as a multipart form with a single `file` part
///
/// The body is handed to the transport in chunks so `on_progress` can
/// observe percent sent; a final 100 is reported once the service has
/// answered with success.
pub(crate) async fn upload_multipart<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    token: Option<String>,
    file: &SelectedFile,
    on_progress: Option<ProgressFn>,
    fallback: &str,
) -> Result<T, Error> {
    debug!("POST {} (multipart, {} bytes)", url, file.size());

    let body = progress_body(file.data().clone(), on_progress.clone());
    let part = multipart::Part::stream_with_length(body, file.size())
        .file_name(file.name().to_string());
    let form = multipart::Form::new().part("file", part);

    let mut request = client.post(url).multipart(form);
    if let Some(token) = token {
        request = request.header("Authorization", format!("Bearer {}", token));
    }

    let response = request.send().await.map_err(Error::NoResponse)?;

    if !response.status().is_success() {
        return Err(api_error(response, fallback).await);
    }

    if let Some(progress) = &on_progress {
        progress(100);
    }

    let result = response.json::<T>().await?;
    Ok(result)
}

fn progress_body(data: Bytes, on_progress: Option<ProgressFn>) -> reqwest::Body {
    let total = data.len();
    if total == 0 {
        return reqwest::Body::from(data);
    }

    let mut sent = 0usize;
    let chunks = (0..total).step_by(UPLOAD_CHUNK_SIZE).map(move |start| {
        let end = (start + UPLOAD_CHUNK_SIZE).min(total);
        let chunk = data.slice(start..end);
        sent += chunk.len();
        if let Some(progress) = &on_progress {
            progress((sent * 100 / total) as u8);
        }
        Ok::<Bytes, std::io::Error>(chunk)
    });

    reqwest::Body::wrap_stream(futures_util::stream::iter(chunks))
}
