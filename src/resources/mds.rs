//! MySQL HeatWave database system (`oci_mysql_database`).

use super::ResourceTarget;
use crate::graphdef::{Graph, GraphDef, GraphMetric};
use crate::models::QueryDescriptor;

pub fn graphs() -> GraphDef {
    GraphDef::from_graphs([
        ("CurrentConnections", Graph::default_graph("CurrentConnections", "float")),
        ("ActiveConnections", Graph::default_graph("ActiveConnections", "float")),
        ("Statements", Graph::default_graph("Statements", "float")),
        ("StatementLatency", Graph::default_graph("StatementLatency", "milliseconds")),
        ("CPUUtilization", Graph::default_graph("CPUUtilization", "percentage")),
        ("MemoryUtilization", Graph::default_graph("MemoryUtilization", "percentage")),
        (
            "Traffic",
            Graph::new(
                "Traffic",
                "bytes/sec",
                vec![
                    GraphMetric::new("NetworkReceiveBytes", "Received Bytes"),
                    GraphMetric::new("NetworkTransmitBytes", "Transmit Bytes"),
                ],
            ),
        ),
        (
            "DbVolumeOperations",
            Graph::new(
                "Volume Operations",
                "iops",
                vec![
                    GraphMetric::new("DbVolumeReadOperations", "Read"),
                    GraphMetric::new("DbVolumeWriteOperations", "Write"),
                ],
            ),
        ),
        (
            "DbVolumeBytes",
            Graph::new(
                "Volume Bytes",
                "bytes/sec",
                vec![
                    GraphMetric::new("DbVolumeReadBytes", "Read"),
                    GraphMetric::new("DbVolumeWriteBytes", "Write"),
                ],
            ),
        ),
        ("DbVolumeUtilization", Graph::default_graph("DbVolumeUtilization", "percentage")),
    ])
}

// https://docs.oracle.com/en-us/iaas/mysql-database/doc/metrics.html
pub fn queries(target: &ResourceTarget) -> Vec<QueryDescriptor> {
    let q = |group: &str, metric: &str, chain: &str| {
        QueryDescriptor::new(
            group,
            target.fill_in(&format!(r#"{}[1m]{{resourceId="RESOURCE_ID"}}.{}"#, metric, chain)),
        )
    };

    vec![
        q("CurrentConnections", "CurrentConnections", "max()"),
        q("ActiveConnections", "ActiveConnections", "max()"),
        q("Statements", "Statements", "rate()"),
        q("StatementLatency", "StatementLatency", "rate()"),
        q("CPUUtilization", "CPUUtilization", "grouping().mean()"),
        q("MemoryUtilization", "MemoryUtilization", "grouping().mean()"),
        q("Traffic", "NetworkReceiveBytes", "rate().grouping().mean()"),
        q("Traffic", "NetworkTransmitBytes", "rate().grouping().mean()"),
        q("DbVolumeOperations", "DbVolumeReadOperations", "grouping().rate()"),
        q("DbVolumeOperations", "DbVolumeWriteOperations", "grouping().rate()"),
        q("DbVolumeBytes", "DbVolumeReadBytes", "grouping().rate()"),
        q("DbVolumeBytes", "DbVolumeWriteBytes", "grouping().rate()"),
        q("DbVolumeUtilization", "DbVolumeUtilization", "grouping().max()"),
    ]
}
