//! Graph definitions consumed by the mackerel agent in metadata mode.

use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

use crate::Result;

/// First line of the metadata document.
pub const MARKER: &str = "# mackerel-agent-plugin";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphDef {
    pub graphs: BTreeMap<String, Graph>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Graph {
    pub label: String,
    pub unit: String,
    pub metrics: Vec<GraphMetric>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphMetric {
    pub name: String,
    pub label: String,
    pub stacked: bool,
}

impl GraphMetric {
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            stacked: false,
        }
    }
}

impl Graph {
    pub fn new(label: &str, unit: &str, metrics: Vec<GraphMetric>) -> Self {
        Self {
            label: label.to_string(),
            unit: unit.to_string(),
            metrics,
        }
    }

    /// A graph with a single wildcard metric labelled by its name.
    pub fn default_graph(label: &str, unit: &str) -> Self {
        Self::new(label, unit, vec![GraphMetric::new("*", "%1")])
    }
}

impl GraphDef {
    pub fn from_graphs<I>(graphs: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Graph)>,
    {
        Self {
            graphs: graphs.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    /// Re-key every graph under `prefix`, prepending `title_prefix` to labels when non-empty.
    pub fn with_prefix(&self, prefix: &str, title_prefix: &str) -> Self {
        let graphs = self
            .graphs
            .iter()
            .map(|(key, graph)| {
                let mut graph = graph.clone();
                if !title_prefix.is_empty() {
                    graph.label = format!("{} {}", title_prefix, graph.label);
                }
                (format!("{}.{}", prefix, key), graph)
            })
            .collect();
        Self { graphs }
    }
}

pub fn write_definition<W: Write>(out: &mut W, def: &GraphDef) -> Result<()> {
    writeln!(out, "{}", MARKER)?;
    serde_json::to_writer(&mut *out, def)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
