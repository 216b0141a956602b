use bytes::Bytes;
use lazy_static::lazy_static;
use reqwest::header::USER_AGENT;
use reqwest::{Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use thiserror::Error as ThisError;
use url::Url;

// Some utility sites refuse requests without a browser-like agent.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

lazy_static! {
    static ref CLIENT: ClientWithMiddleware = ClientBuilder::new(reqwest::Client::new())
        .with(TracingMiddleware::default())
        .build();
}

pub struct HttpClient;

#[derive(ThisError, Debug)]
pub enum HttpClientError {
    #[error("request to {url} failed")]
    Request {
        url: Url,
        #[source]
        source: reqwest_middleware::Error,
    },
    #[error("{url} responded with {status}")]
    Status { url: Url, status: StatusCode },
    #[error("failed to read the response body from {url}")]
    Body {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
}

impl HttpClient {
    async fn post_form(url: &Url, form: &[(&str, &str)]) -> Result<Response, HttpClientError> {
        let response = CLIENT
            .post(url.clone())
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .form(form)
            .send()
            .await
            .map_err(|source| HttpClientError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpClientError::Status {
                url: url.clone(),
                status,
            });
        }
        Ok(response)
    }

    pub async fn post_form_text(url: &Url, form: &[(&str, &str)]) -> Result<String, HttpClientError> {
        Self::post_form(url, form)
            .await?
            .text()
            .await
            .map_err(|source| HttpClientError::Body {
                url: url.clone(),
                source,
            })
    }

    pub async fn post_form_bytes(url: &Url, form: &[(&str, &str)]) -> Result<Bytes, HttpClientError> {
        Self::post_form(url, form)
            .await?
            .bytes()
            .await
            .map_err(|source| HttpClientError::Body {
                url: url.clone(),
                source,
            })
    }
}
