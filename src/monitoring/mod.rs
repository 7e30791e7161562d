pub mod client;
pub mod retry;
pub mod signer;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    metrics::{self, QueryTimer},
    models::{DataPoint, QueryDescriptor, ResultSeries, TimeWindow},
    Result,
};

pub use client::OciMonitoringClient;
pub use retry::{BackoffPolicy, ExponentialBackoff};

/// Body of a SummarizeMetricsData call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeMetricsDataDetails {
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    pub query: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummarizeMetricsDataRequest {
    pub compartment_id: String,
    pub details: SummarizeMetricsDataDetails,
}

/// One row of a SummarizeMetricsData response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dimensions: HashMap<String, String>,
    #[serde(default)]
    pub aggregated_datapoints: Vec<AggregatedDatapoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedDatapoint {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub value: Option<f64>,
}

/// The remote monitoring API.
#[async_trait]
pub trait MonitoringClient: Send + Sync {
    async fn summarize_metrics_data(&self, request: &SummarizeMetricsDataRequest) -> Result<Vec<MetricData>>;
}

#[async_trait]
impl<T: MonitoringClient + ?Sized> MonitoringClient for Arc<T> {
    async fn summarize_metrics_data(&self, request: &SummarizeMetricsDataRequest) -> Result<Vec<MetricData>> {
        (**self).summarize_metrics_data(request).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryInput {
    pub compartment_id: String,
    pub namespace: String,
    pub query: String,
    pub resource_group: Option<String>,
    pub resolution: Option<String>,
}

impl QueryInput {
    pub fn for_descriptor(compartment_id: &str, namespace: &str, descriptor: &QueryDescriptor) -> Self {
        Self {
            compartment_id: compartment_id.to_string(),
            namespace: namespace.to_string(),
            query: descriptor.query.clone(),
            resource_group: descriptor.resource_group.clone(),
            resolution: descriptor.resolution.clone(),
        }
    }
}

/// Issues queries against one client over a fixed time window.
pub struct MonitoringHandler<C> {
    client: C,
    window: TimeWindow,
    policy: BackoffPolicy,
}

impl<C: MonitoringClient> MonitoringHandler<C> {
    pub fn new(client: C, window: TimeWindow, policy: BackoffPolicy) -> Self {
        Self { client, window, policy }
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// One live round trip, flattened into series that each carry at least one point.
    pub async fn query(&self, input: &QueryInput) -> Result<Vec<ResultSeries>> {
        let request = SummarizeMetricsDataRequest {
            compartment_id: input.compartment_id.clone(),
            details: SummarizeMetricsDataDetails {
                namespace: input.namespace.clone(),
                resource_group: input.resource_group.clone(),
                query: input.query.clone(),
                start_time: self.window.start,
                end_time: self.window.end,
                resolution: input.resolution.clone(),
            },
        };

        let _timer = QueryTimer::new();
        let rows = self.client.summarize_metrics_data(&request).await?;
        Ok(flatten(rows))
    }

    /// Run `query` until it succeeds or the back-off policy gives up.
    ///
    /// Every error is retried; the last one is returned once the policy is exhausted.
    pub async fn query_with_retry(&self, input: &QueryInput) -> Result<Vec<ResultSeries>> {
        let mut backoff = self.policy.start();
        loop {
            let err = match self.query(input).await {
                Ok(series) => return Ok(series),
                Err(err) => err,
            };
            metrics::record_query_failure();

            match backoff.next_wait() {
                Some(wait) => {
                    warn!(
                        "Query failed (attempt {}), retrying in {:?}: {}",
                        backoff.retries(),
                        wait,
                        err
                    );
                    tokio::time::sleep(wait).await;
                }
                None => {
                    debug!(
                        "Giving up on query after {} retries over {:?}",
                        backoff.retries(),
                        backoff.elapsed()
                    );
                    return Err(err);
                }
            }
        }
    }
}

fn flatten(rows: Vec<MetricData>) -> Vec<ResultSeries> {
    rows.into_iter()
        .filter_map(|row| {
            let name = match row.name {
                Some(name) => name,
                None => {
                    debug!("Skipping unnamed series");
                    return None;
                }
            };
            let points: Vec<DataPoint> = row
                .aggregated_datapoints
                .into_iter()
                .filter_map(|dp| {
                    dp.value.map(|value| DataPoint {
                        timestamp: dp.timestamp,
                        value,
                    })
                })
                .collect();
            if points.is_empty() {
                debug!("Dropping series {} with no datapoints", name);
                return None;
            }
            Some(ResultSeries {
                name,
                dimensions: row.dimensions,
                points,
            })
        })
        .collect()
}
