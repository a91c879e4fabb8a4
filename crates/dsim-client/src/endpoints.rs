//! Read-only dashboard endpoints.
//!
//! Every body goes through the same lenient parser and sanitizer as a
//! simulation result.

use dsim_model::{
    AiReport, AnomalyAlert, ClusterPoint, FeatureImportance, ForecastPoint, FromPayload,
    HealthStatus, decode_list, sanitize,
};

use crate::client::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// `GET {base}/forecast`
    pub fn fetch_forecast(&self) -> Result<Vec<ForecastPoint>> {
        self.fetch_list("forecast")
    }

    /// `GET {base}/clusters`
    pub fn fetch_clusters(&self) -> Result<Vec<ClusterPoint>> {
        self.fetch_list("clusters")
    }

    /// `GET {base}/anomalies`
    pub fn fetch_anomalies(&self) -> Result<Vec<AnomalyAlert>> {
        self.fetch_list("anomalies")
    }

    /// `GET {base}/insights`
    pub fn fetch_insights(&self) -> Result<Vec<FeatureImportance>> {
        self.fetch_list("insights")
    }

    /// `GET {base}/generate_report`
    pub fn fetch_report(&self) -> Result<AiReport> {
        let payload = sanitize(self.get_payload(&self.config().endpoint("generate_report"))?);
        Ok(AiReport::from_payload(&payload))
    }

    /// `GET {root}/`
    pub fn health(&self) -> Result<HealthStatus> {
        let payload = sanitize(self.get_payload(&self.config().root_url())?);
        Ok(HealthStatus::from_payload(&payload))
    }

    fn fetch_list<T: FromPayload>(&self, path: &str) -> Result<Vec<T>> {
        let payload = sanitize(self.get_payload(&self.config().endpoint(path))?);
        let rows: Vec<T> = decode_list(Some(&payload));
        tracing::debug!(endpoint = path, rows = rows.len(), "Decoded dashboard rows");
        Ok(rows)
    }
}
