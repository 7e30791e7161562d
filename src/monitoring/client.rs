use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{signer::RequestSigner, MetricData, MonitoringClient, SummarizeMetricsDataRequest};
use crate::{PluginError, Result};

const API_VERSION: &str = "20180401";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error body returned by the OCI REST APIs.
#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<String>,
    message: Option<String>,
}

/// Monitoring REST client for one region.
pub struct OciMonitoringClient {
    http: Client,
    endpoint: Url,
    signer: Box<dyn RequestSigner>,
}

impl OciMonitoringClient {
    pub fn new(endpoint: &str, signer: Box<dyn RequestSigner>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| PluginError::Configuration(format!("Invalid endpoint {}: {}", endpoint, e)))?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, endpoint, signer })
    }

    pub fn for_region(region: &str, signer: Box<dyn RequestSigner>) -> Result<Self> {
        Self::new(&Self::regional_endpoint(region), signer)
    }

    pub fn regional_endpoint(region: &str) -> String {
        format!("https://telemetry.{}.oraclecloud.com", region)
    }

    fn summarize_url(&self, compartment_id: &str) -> Result<Url> {
        let mut url = self
            .endpoint
            .join(&format!("/{}/metrics/actions/summarizeMetricsData", API_VERSION))
            .map_err(|e| PluginError::Configuration(format!("Invalid endpoint: {}", e)))?;
        url.query_pairs_mut().append_pair("compartmentId", compartment_id);
        Ok(url)
    }
}

#[async_trait]
impl MonitoringClient for OciMonitoringClient {
    async fn summarize_metrics_data(&self, request: &SummarizeMetricsDataRequest) -> Result<Vec<MetricData>> {
        let url = self.summarize_url(&request.compartment_id)?;
        debug!("POST {} query={}", url.path(), request.details.query);

        let mut http_request = self.http.post(url).json(&request.details).build()?;
        self.signer.sign(&mut http_request)?;

        let response = self.http.execute(http_request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(remote_error(status, &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

fn remote_error(status: StatusCode, body: &[u8]) -> PluginError {
    match serde_json::from_slice::<ApiError>(body) {
        Ok(ApiError { code, message }) => PluginError::RemoteQuery(format!(
            "{} {}: {}",
            status.as_u16(),
            code.unwrap_or_default(),
            message.unwrap_or_default()
        )),
        Err(_) => PluginError::RemoteQuery(format!(
            "{} {}",
            status.as_u16(),
            String::from_utf8_lossy(body)
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopSigner;

    impl RequestSigner for NoopSigner {
        fn sign(&self, _request: &mut reqwest::Request) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_regional_endpoint() {
        assert_eq!(
            OciMonitoringClient::regional_endpoint("ap-tokyo-1"),
            "https://telemetry.ap-tokyo-1.oraclecloud.com"
        );
    }

    #[test]
    fn test_summarize_url_encodes_compartment() {
        let client = OciMonitoringClient::for_region("us-ashburn-1", Box::new(NoopSigner)).unwrap();
        let url = client.summarize_url("ocid1.compartment.oc1..aaaa").unwrap();
        assert_eq!(
            url.as_str(),
            "https://telemetry.us-ashburn-1.oraclecloud.com/20180401/metrics/actions/summarizeMetricsData?compartmentId=ocid1.compartment.oc1..aaaa"
        );
    }

    #[test]
    fn test_invalid_endpoint_is_configuration_error() {
        assert!(matches!(
            OciMonitoringClient::new("not a url", Box::new(NoopSigner)),
            Err(PluginError::Configuration(_))
        ));
    }

    #[test]
    fn test_remote_error_uses_api_body() {
        let err = remote_error(
            StatusCode::BAD_REQUEST,
            br#"{"code": "InvalidParameter", "message": "Query has a syntax error"}"#,
        );
        assert_eq!(
            err.to_string(),
            "Remote query error: 400 InvalidParameter: Query has a syntax error"
        );

        let err = remote_error(StatusCode::BAD_GATEWAY, b"upstream down");
        assert_eq!(err.to_string(), "Remote query error: 502 upstream down");
    }
}
