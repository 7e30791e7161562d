use std::io::Write;
use tracing::{debug, info};

use crate::{
    metrics,
    models::{OutputLine, QueryDescriptor, ResultSeries},
    monitoring::{MonitoringClient, MonitoringHandler, QueryInput},
    Result,
};

/// Executes descriptors in order and prints one line per returned series.
pub struct Runner<C> {
    handler: MonitoringHandler<C>,
}

impl<C: MonitoringClient> Runner<C> {
    pub fn new(handler: MonitoringHandler<C>) -> Self {
        Self { handler }
    }

    /// Returns the number of lines written. The first query that exhausts its
    /// retries aborts the run; lines for earlier descriptors stay written.
    pub async fn run<W: Write>(
        &self,
        prefix: &str,
        compartment_id: &str,
        namespace: &str,
        descriptors: &[QueryDescriptor],
        out: &mut W,
    ) -> Result<usize> {
        let window = self.handler.window();
        info!(
            "Collecting {} queries from {} ({} .. {})",
            descriptors.len(),
            namespace,
            window.start,
            window.end
        );

        let mut written = 0;
        for descriptor in descriptors {
            let input = QueryInput::for_descriptor(compartment_id, namespace, descriptor);
            let series = self.handler.query_with_retry(&input).await?;
            debug!("{} returned {} series", descriptor.query, series.len());

            for item in &series {
                if let Some(line) = output_line(prefix, descriptor, item) {
                    writeln!(out, "{}", line)?;
                    written += 1;
                }
            }
            out.flush()?;
        }

        metrics::record_lines_emitted(written);
        Ok(written)
    }
}

/// Line for the most recent point of `series`.
pub fn output_line(prefix: &str, descriptor: &QueryDescriptor, series: &ResultSeries) -> Option<OutputLine> {
    let point = series.latest()?;
    Some(OutputLine {
        key: format!(
            "{}.{}.{}",
            prefix,
            descriptor.group_name(series),
            descriptor.leaf_name(series)
        ),
        value: point.value * descriptor.scale,
        timestamp: point.timestamp.timestamp(),
    })
}
