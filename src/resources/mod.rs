//! Static graph and query tables for each supported resource type.

pub mod flb;
pub mod mds;
pub mod nlb;

use crate::{graphdef::GraphDef, models::QueryDescriptor};

const RESOURCE_ID: &str = "RESOURCE_ID";
const RESOURCE_NAME: &str = "RESOURCE_NAME";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    NetworkLoadBalancer,
    FlexibleLoadBalancer,
    MySqlDatabase,
}

/// The resource a run is collecting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTarget {
    pub resource_id: String,
    pub resource_name: String,
}

impl ResourceTarget {
    /// Substitute `RESOURCE_ID` and `RESOURCE_NAME` placeholders in a query template.
    pub fn fill_in(&self, template: &str) -> String {
        template
            .replace(RESOURCE_NAME, &self.resource_name)
            .replace(RESOURCE_ID, &self.resource_id)
    }
}

impl ResourceKind {
    /// Monitoring namespace the resource publishes into.
    pub fn namespace(self) -> &'static str {
        match self {
            ResourceKind::NetworkLoadBalancer => "oci_nlb",
            ResourceKind::FlexibleLoadBalancer => "oci_lbaas",
            ResourceKind::MySqlDatabase => "oci_mysql_database",
        }
    }

    pub fn default_prefix(self) -> &'static str {
        match self {
            ResourceKind::NetworkLoadBalancer => "ocinlb",
            ResourceKind::FlexibleLoadBalancer => "ociflb",
            ResourceKind::MySqlDatabase => "ocimds",
        }
    }

    /// Network load balancer metrics are filtered by name as well as id.
    pub fn requires_resource_name(self) -> bool {
        matches!(self, ResourceKind::NetworkLoadBalancer)
    }

    pub fn graphs(self) -> GraphDef {
        match self {
            ResourceKind::NetworkLoadBalancer => nlb::graphs(),
            ResourceKind::FlexibleLoadBalancer => flb::graphs(),
            ResourceKind::MySqlDatabase => mds::graphs(),
        }
    }

    pub fn queries(self, target: &ResourceTarget) -> Vec<QueryDescriptor> {
        match self {
            ResourceKind::NetworkLoadBalancer => nlb::queries(target),
            ResourceKind::FlexibleLoadBalancer => flb::queries(target),
            ResourceKind::MySqlDatabase => mds::queries(target),
        }
    }
}
