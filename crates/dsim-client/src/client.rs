//! Blocking client for the prediction service.

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use reqwest::header::USER_AGENT;
use tracing::{debug, info, warn};

use dsim_model::Payload;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Content type declared for the uploaded file part.
const CSV_MIME: &str = "text/csv";

/// Client for the prediction service API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submits a CSV file and mapping text to `POST {base}/simulate`.
    ///
    /// Returns the raw response tree; callers sanitize it. A transport
    /// failure is retried once when the config allows it. Error statuses
    /// are never retried.
    pub fn simulate(&self, file_name: &str, bytes: &[u8], mapping: &str) -> Result<Payload> {
        match self.simulate_once(file_name, bytes, mapping) {
            Err(err) if self.config.retry && err.is_retryable() => {
                warn!(error = %err, "Simulation request failed, retrying once");
                self.simulate_once(file_name, bytes, mapping)
            }
            outcome => outcome,
        }
    }

    fn simulate_once(&self, file_name: &str, bytes: &[u8], mapping: &str) -> Result<Payload> {
        let url = self.config.endpoint("simulate");
        info!(%url, file = file_name, bytes = bytes.len(), "Submitting simulation");

        let part = Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str(CSV_MIME)?;
        let form = Form::new().part("file", part).text("mapping", mapping.to_string());

        let response = self
            .client
            .post(&url)
            .header(USER_AGENT, user_agent())
            .multipart(form)
            .send()?;
        read_payload(response)
    }

    /// Fetches `GET {url}` and parses the body.
    pub(crate) fn get_payload(&self, url: &str) -> Result<Payload> {
        debug!(%url, "Fetching");
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent())
            .send()?;
        read_payload(response)
    }
}

fn user_agent() -> String {
    format!("dsim/{}", env!("CARGO_PKG_VERSION"))
}

/// Turns a response into a payload or a [`ClientError::Server`].
fn read_payload(response: Response) -> Result<Payload> {
    let status = response.status();
    let body = response.text()?;
    debug!(status = status.as_u16(), bytes = body.len(), "Response received");

    if !status.is_success() {
        let err = ClientError::from_response(status.as_u16(), &body);
        warn!(status = status.as_u16(), message = err.user_message(), "Service returned an error");
        return Err(err);
    }

    Ok(Payload::parse(&body)?)
}
