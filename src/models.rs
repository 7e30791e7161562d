use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt;

/// Dimension value used when a series lacks the dimension a query names.
pub const UNDEFINED_DIMENSION: &str = "undefined";

/// One monitoring query and the rules for naming its output.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    pub query: String,
    pub metric_group: String,
    /// Dimension whose value is appended to the metric group.
    pub grouping_dimension: Option<String>,
    /// Dimension whose value replaces the series name as the leaf.
    pub sub_metric_dimension: Option<String>,
    pub scale: f64,
    pub resolution: Option<String>,
    pub resource_group: Option<String>,
}

impl QueryDescriptor {
    pub fn new(metric_group: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            metric_group: metric_group.into(),
            grouping_dimension: None,
            sub_metric_dimension: None,
            scale: 1.0,
            resolution: None,
            resource_group: None,
        }
    }

    pub fn grouped_by(mut self, dimension: impl Into<String>) -> Self {
        self.grouping_dimension = Some(dimension.into());
        self
    }

    pub fn sub_metric(mut self, dimension: impl Into<String>) -> Self {
        self.sub_metric_dimension = Some(dimension.into());
        self
    }

    pub fn scaled(mut self, factor: f64) -> Self {
        self.scale = factor;
        self
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    pub fn with_resource_group(mut self, group: impl Into<String>) -> Self {
        self.resource_group = Some(group.into());
        self
    }

    /// Metric group name for `series`, suffixed by the grouping dimension if set.
    pub fn group_name(&self, series: &ResultSeries) -> String {
        match &self.grouping_dimension {
            Some(dimension) => format!("{}.{}", self.metric_group, series.dimension_or_undefined(dimension)),
            None => self.metric_group.clone(),
        }
    }

    /// Leaf metric name for `series`.
    pub fn leaf_name(&self, series: &ResultSeries) -> String {
        match &self.sub_metric_dimension {
            Some(dimension) => series.dimension_or_undefined(dimension).to_string(),
            None => series.name.clone(),
        }
    }
}

/// Aggregation interval shared by every query of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub const LOOKBACK_MINUTES: i64 = 2;

    pub fn lookback(end: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            start: end - duration,
            end,
        }
    }

    pub fn last_two_minutes() -> Self {
        Self::lookback(Utc::now(), Duration::minutes(Self::LOOKBACK_MINUTES))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// A named, dimension-tagged series with at least one point.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSeries {
    pub name: String,
    pub dimensions: HashMap<String, String>,
    /// Ascending by time.
    pub points: Vec<DataPoint>,
}

impl ResultSeries {
    pub fn latest(&self) -> Option<&DataPoint> {
        self.points.last()
    }

    fn dimension_or_undefined(&self, key: &str) -> &str {
        match self.dimensions.get(key) {
            Some(value) if !value.is_empty() => value,
            _ => UNDEFINED_DIMENSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputLine {
    pub key: String,
    pub value: f64,
    pub timestamp: i64,
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{:.6}\t{}", self.key, self.value, self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn series(name: &str, dims: &[(&str, &str)]) -> ResultSeries {
        ResultSeries {
            name: name.to_string(),
            dimensions: dims.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            points: vec![DataPoint {
                timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
                value: 1.0,
            }],
        }
    }

    #[test]
    fn test_descriptor_defaults() {
        let q = QueryDescriptor::new("HttpRequests", "HttpRequests[1m].sum()");
        assert_eq!(q.scale, 1.0);
        assert!(q.grouping_dimension.is_none());
        assert!(q.sub_metric_dimension.is_none());
    }

    #[test]
    fn test_group_name_uses_dimension() {
        let q = QueryDescriptor::new("Traffic", "").grouped_by("lbComponent");
        let s = series("BytesReceived", &[("lbComponent", "Listener")]);
        assert_eq!(q.group_name(&s), "Traffic.Listener");
        assert_eq!(q.leaf_name(&s), "BytesReceived");
    }

    #[test]
    fn test_missing_dimension_is_undefined() {
        let q = QueryDescriptor::new("HttpResponses", "")
            .grouped_by("listenerName")
            .sub_metric("backendSetName");
        let s = series("HttpResponses2xx", &[]);
        assert_eq!(q.group_name(&s), "HttpResponses.undefined");
        assert_eq!(q.leaf_name(&s), "undefined");
    }

    #[test]
    fn test_window_is_two_minutes() {
        let end = Utc.timestamp_opt(1_700_000_120, 0).unwrap();
        let window = TimeWindow::lookback(end, Duration::minutes(TimeWindow::LOOKBACK_MINUTES));
        assert_eq!(window.start.timestamp(), 1_700_000_000);
        assert_eq!(window.end, end);
    }

    #[test]
    fn test_output_line_format() {
        let line = OutputLine {
            key: "ociflb.Traffic.Listener.BytesReceived".to_string(),
            value: 10.0,
            timestamp: 1_700_000_000,
        };
        assert_eq!(line.to_string(), "ociflb.Traffic.Listener.BytesReceived\t10.000000\t1700000000");
    }
}
