use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HttpError {
    #[error("{status_code} {status_text} >> {message}")]
    Status {
        status_code: u16,
        status_text: String,
        message: String,
    },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("could not read {path}: {message}")]
    Io { path: String, message: String },
}

impl From<reqwest::Error> for HttpError {
    fn from(error: reqwest::Error) -> Self {
        HttpError::Transport(error.to_string())
    }
}

/// Basic-auth login for the TestRail API.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Thin JSON/multipart transport for the TestRail v2 API.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl ApiClient {
    pub fn new(domain: &str, credentials: Credentials) -> Self {
        Self {
            client: Client::new(),
            base_url: build_base_url(domain),
            credentials,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, slug: &str) -> Result<T, HttpError> {
        let response = self.request(Method::GET, slug).send().await?;
        decode(check_status(response).await?).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        slug: &str,
        body: &B,
    ) -> Result<T, HttpError> {
        let response = self.request(Method::POST, slug).json(body).send().await?;
        decode(check_status(response).await?).await
    }

    /// Uploads a file as the `attachment` form field.
    pub async fn post_file(&self, slug: &str, path: &str) -> Result<Value, HttpError> {
        let bytes = tokio::fs::read(path).await.map_err(|error| HttpError::Io {
            path: path.to_string(),
            message: error.to_string(),
        })?;
        let file_name = Path::new(path)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "screenshot.png".to_string());
        let part = Part::bytes(bytes).file_name(file_name);
        let form = Form::new().part("attachment", part);
        let response = self
            .request(Method::POST, slug)
            .multipart(form)
            .send()
            .await?;
        decode(check_status(response).await?).await
    }

    fn request(&self, method: Method, slug: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, slug.trim_start_matches('/'));
        debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
    }
}

/// TestRail lives under `index.php?/api/v2`; a bare host means https.
pub fn build_base_url(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.starts_with("http://") || domain.starts_with("https://") {
        format!("{}/index.php?/api/v2", domain)
    } else {
        format!("https://{}/index.php?/api/v2", domain)
    }
}

async fn check_status(response: Response) -> Result<Response, HttpError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    Err(HttpError::Status {
        status_code: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("").to_string(),
        message: extract_error_message(&text),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, HttpError> {
    let text = response.text().await?;
    // some endpoints answer with an empty body
    let text = if text.trim().is_empty() { "null" } else { text.as_str() };
    serde_json::from_str(text).map_err(|error| HttpError::Decode(error.to_string()))
}

/// TestRail reports failures as `{"error": "..."}`; anything else is passed through.
pub fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
