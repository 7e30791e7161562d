use std::io::Write;
use tracing::{debug, info};

use crate::{
    cli::{Cli, Mode, Settings},
    config::OciConfig,
    graphdef,
    metrics,
    models::TimeWindow,
    monitoring::{signer::ApiKeySigner, BackoffPolicy, MonitoringClient, MonitoringHandler, OciMonitoringClient},
    runner::Runner,
    PluginError, Result,
};

/// Validate the command line, then describe or collect.
pub async fn execute<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    // The window is fixed before anything else so every query reports the same interval.
    let window = TimeWindow::last_two_minutes();
    let settings = cli.settings()?;

    match settings.mode {
        Mode::DescribeMetrics => describe(&settings, out),
        Mode::Collect => {
            let client = connect(&settings)?;
            collect(&settings, client, BackoffPolicy::default(), window, out).await?;
            Ok(())
        }
    }
}

pub fn describe<W: Write>(settings: &Settings, out: &mut W) -> Result<()> {
    let def = settings
        .kind
        .graphs()
        .with_prefix(&settings.prefix, &settings.title_prefix);
    debug!("Describing {} graphs", def.graphs.len());
    graphdef::write_definition(out, &def)
}

/// Build the production client from the OCI config file.
pub fn connect(settings: &Settings) -> Result<OciMonitoringClient> {
    let path = match &settings.config_file {
        Some(path) => path.clone(),
        None => OciConfig::default_path()
            .ok_or_else(|| PluginError::Configuration("Cannot locate home directory".to_string()))?,
    };
    let config = OciConfig::load(&path, &settings.profile)?;
    let signer = Box::new(ApiKeySigner::from_config(&config)?);

    match &settings.endpoint {
        Some(endpoint) => OciMonitoringClient::new(endpoint, signer),
        None => OciMonitoringClient::for_region(&config.region, signer),
    }
}

pub async fn collect<C, W>(
    settings: &Settings,
    client: C,
    policy: BackoffPolicy,
    window: TimeWindow,
    out: &mut W,
) -> Result<usize>
where
    C: MonitoringClient,
    W: Write,
{
    let descriptors = settings.kind.queries(&settings.target);
    let runner = Runner::new(MonitoringHandler::new(client, window, policy));

    let written = runner
        .run(
            &settings.prefix,
            &settings.compartment_id,
            settings.kind.namespace(),
            &descriptors,
            out,
        )
        .await?;

    info!("Wrote {} metrics", written);
    metrics::log_summary();
    Ok(written)
}
