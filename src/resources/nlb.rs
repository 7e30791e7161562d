//! Network load balancer (`oci_nlb`).

use super::ResourceTarget;
use crate::graphdef::{Graph, GraphDef, GraphMetric};
use crate::models::QueryDescriptor;

pub fn graphs() -> GraphDef {
    GraphDef::from_graphs([
        ("ProcessedBytes", Graph::default_graph("ProcessedBytes", "bytes")),
        ("ProcessedPackets", Graph::default_graph("ProcessedPackets", "float")),
        (
            "DroppedBySecurityLists",
            Graph::new(
                "Dropped by Security lists",
                "float",
                vec![
                    GraphMetric::new("IngressPacketsDroppedBySL", "Ingress Packets"),
                    GraphMetric::new("EgressPacketsDroppedBySL", "Egress Packets"),
                ],
            ),
        ),
        (
            "Backends",
            Graph::new(
                "Backends",
                "float",
                vec![
                    GraphMetric::new("HealthyBackendsPerNlb", "Healthy"),
                    GraphMetric::new("UnhealthyBackendsPerNlb", "Unhealthy"),
                ],
            ),
        ),
        (
            "NewConnections",
            Graph::new(
                "NewConnections",
                "float",
                vec![
                    GraphMetric::new("NewConnections", "New"),
                    GraphMetric::new("NewConnectionsTCP", "TCP"),
                    GraphMetric::new("NewConnectionsUDP", "UDP"),
                ],
            ),
        ),
    ])
}

// https://docs.oracle.com/en-us/iaas/Content/NetworkLoadBalancer/Metrics/metrics.htm
pub fn queries(target: &ResourceTarget) -> Vec<QueryDescriptor> {
    let q = |group: &str, metric: &str, aggregation: &str| {
        QueryDescriptor::new(
            group,
            target.fill_in(&format!(
                r#"{}[1m]{{resourceId = "RESOURCE_ID", resourceName = "RESOURCE_NAME"}}.{}()"#,
                metric, aggregation
            )),
        )
    };

    vec![
        q("ProcessedBytes", "ProcessedBytes", "sum"),
        q("ProcessedPackets", "ProcessedPackets", "sum"),
        q("DroppedBySecurityLists", "IngressPacketsDroppedBySL", "sum"),
        q("DroppedBySecurityLists", "EgressPacketsDroppedBySL", "sum"),
        q("Backends", "HealthyBackendsPerNlb", "max"),
        q("Backends", "UnhealthyBackendsPerNlb", "max"),
        q("NewConnections", "NewConnections", "sum"),
        q("NewConnections", "NewConnectionsTCP", "sum"),
        q("NewConnections", "NewConnectionsUDP", "sum"),
    ]
}
