//! Flexible load balancer (`oci_lbaas`).

use super::ResourceTarget;
use crate::graphdef::{Graph, GraphDef, GraphMetric};
use crate::models::QueryDescriptor;

/// Byte counters are per-minute sums; report them per second.
const PER_SECOND: f64 = 1.0 / 60.0;
/// PeakBandwidth is published in Mbps.
const MEGABITS: f64 = 1024.0 * 1024.0;

pub fn graphs() -> GraphDef {
    GraphDef::from_graphs([
        ("HttpRequests", Graph::default_graph("HttpRequests", "float")),
        ("ActiveConnections", Graph::default_graph("ActiveConnections", "float")),
        ("ActiveSSLConnections", Graph::default_graph("ActiveSSLConnections", "float")),
        (
            "Traffic.#",
            Graph::new(
                "Traffic",
                "bytes/sec",
                vec![
                    GraphMetric::new("BytesReceived", "Received Bytes"),
                    GraphMetric::new("BytesSent", "Sent Bytes"),
                ],
            ),
        ),
        ("AcceptedConnections", Graph::default_graph("AcceptedConnections", "float")),
        ("HandledConnections", Graph::default_graph("HandledConnections", "float")),
        (
            "SSLHandshake",
            Graph::new(
                "SSLHandshake",
                "float",
                vec![
                    GraphMetric::new("FailedSSLHandshake", "Failed"),
                    GraphMetric::new("AcceptedSSLHandshake", "Accepted"),
                    GraphMetric::new("FailedSSLClientCertVerify", "FailedSSLClientCertVerify"),
                ],
            ),
        ),
        ("PeakBandwidth", Graph::default_graph("PeakBandwidth", "bits/sec")),
        (
            "HttpResponses.#",
            Graph::new(
                "HttpResponses",
                "float",
                vec![
                    GraphMetric::new("HttpResponses2xx", "2xx"),
                    GraphMetric::new("HttpResponses200", "200"),
                    GraphMetric::new("HttpResponses3xx", "3xx"),
                    GraphMetric::new("HttpResponses4xx", "4xx"),
                    GraphMetric::new("HttpResponses502", "502"),
                    GraphMetric::new("HttpResponses504", "504"),
                    GraphMetric::new("HttpResponses5xx", "5xx"),
                ],
            ),
        ),
    ])
}

// https://docs.oracle.com/en-us/iaas/Content/Balance/Reference/loadbalancermetrics.htm
pub fn queries(target: &ResourceTarget) -> Vec<QueryDescriptor> {
    let total = |metric: &str| {
        QueryDescriptor::new(
            metric,
            target.fill_in(&format!(r#"{}[1m]{{resourceId = "RESOURCE_ID"}}.grouping().sum()"#, metric)),
        )
    };
    let traffic = |metric: &str| {
        QueryDescriptor::new(
            "Traffic",
            target.fill_in(&format!(r#"{}[1m]{{resourceId = "RESOURCE_ID"}}.groupBy(lbComponent).sum()"#, metric)),
        )
        .grouped_by("lbComponent")
        .scaled(PER_SECOND)
    };
    let responses = |metric: &str| {
        QueryDescriptor::new(
            "HttpResponses",
            target.fill_in(&format!(
                r#"{}[1m]{{resourceId = "RESOURCE_ID", lbComponent = "Listener"}}.groupBy(listenerName).sum()"#,
                metric
            )),
        )
        .grouped_by("listenerName")
    };

    vec![
        total("HttpRequests"),
        total("ActiveConnections"),
        total("ActiveSSLConnections"),
        traffic("BytesReceived"),
        traffic("BytesSent"),
        total("AcceptedConnections"),
        total("HandledConnections"),
        QueryDescriptor {
            metric_group: "SSLHandshake".to_string(),
            ..total("FailedSSLHandshake")
        },
        QueryDescriptor {
            metric_group: "SSLHandshake".to_string(),
            ..total("AcceptedSSLHandshake")
        },
        QueryDescriptor {
            metric_group: "SSLHandshake".to_string(),
            ..total("FailedSSLClientCertVerify")
        },
        total("PeakBandwidth").scaled(MEGABITS),
        responses("HttpResponses200"),
        responses("HttpResponses2xx"),
        responses("HttpResponses3xx"),
        responses("HttpResponses4xx"),
        responses("HttpResponses502"),
        responses("HttpResponses504"),
        responses("HttpResponses5xx"),
    ]
}
