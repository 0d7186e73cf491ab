use std::io::Read;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, RANGE, USER_AGENT};

use crate::config::Settings;
use crate::error::{AvrcError, TransportError};

pub struct RemoteBody {
    /// True when the server answered a ranged request with partial content.
    pub partial: bool,
    pub content_length: Option<u64>,
    pub reader: Box<dyn Read + Send>,
}

impl std::fmt::Debug for RemoteBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteBody")
            .field("partial", &self.partial)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

pub trait Transport: Send + Sync {
    /// Issues one anonymous GET. `range_start` adds `Range: bytes=<n>-`.
    fn get(&self, url: &str, range_start: Option<u64>) -> Result<RemoteBody, TransportError>;
}

#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(settings: &Settings) -> Result<Self, AvrcError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&settings.user_agent)
                .map_err(|err| AvrcError::HttpClient(format!("user agent: {err}")))?,
        );
        // Archives run to many gigabytes, so only the connect phase is bounded.
        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .timeout(None::<Duration>)
            .build()
            .map_err(|err| AvrcError::HttpClient(err.to_string()))?;
        Ok(Self { client })
    }

    fn handle_status(response: Response) -> Result<Response, TransportError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "request failed".to_string());
        Err(TransportError::Status { status, message })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, range_start: Option<u64>) -> Result<RemoteBody, TransportError> {
        let mut request = self.client.get(url);
        if let Some(offset) = range_start {
            request = request.header(RANGE, format!("bytes={offset}-"));
        }
        let response = request
            .send()
            .map_err(|err| TransportError::Http(err.to_string()))?;
        let response = Self::handle_status(response)?;
        Ok(RemoteBody {
            partial: response.status() == StatusCode::PARTIAL_CONTENT,
            content_length: response.content_length(),
            reader: Box::new(response),
        })
    }
}
