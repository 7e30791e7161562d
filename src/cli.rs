//! Command line surface.
//!
//! The agent configures plugins with Go-style single-dash long flags
//! (`-compartmentId ...`); [`normalize_args`] rewrites those before parsing.

use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::{
    config::DEFAULT_PROFILE,
    resources::{ResourceKind, ResourceTarget},
    PluginError, Result,
};

/// Environment variable the agent sets when it wants graph definitions.
pub const PLUGIN_META_ENV: &str = "MACKEREL_AGENT_PLUGIN_META";

#[derive(Debug, Parser)]
#[command(name = "oci-metrics-plugin", version, about = "OCI Monitoring metrics for the mackerel agent")]
pub struct Cli {
    /// Print graph definitions instead of collecting metrics
    #[arg(
        long = "describe-metrics",
        global = true,
        env = PLUGIN_META_ENV,
        value_parser = FalseyValueParser::new()
    )]
    pub describe_metrics: bool,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub resource: ResourceCommand,
}

#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    /// Network load balancer
    Nlb(NlbArgs),
    /// Flexible load balancer
    Flb(CommonArgs),
    /// MySQL database system
    Mds(CommonArgs),
}

#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Metric key prefix (defaults per resource type)
    #[arg(long = "metric-key-prefix")]
    pub metric_key_prefix: Option<String>,

    #[arg(long = "compartmentId")]
    pub compartment_id: Option<String>,

    #[arg(long = "resourceId")]
    pub resource_id: Option<String>,

    /// Prepended to every graph label
    #[arg(long = "title-prefix")]
    pub title_prefix: Option<String>,

    /// OCI config file (defaults to ~/.oci/config)
    #[arg(long = "config-file", env = "OCI_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    #[arg(long, env = "OCI_CLI_PROFILE", default_value = DEFAULT_PROFILE)]
    pub profile: String,

    /// Monitoring endpoint (defaults to the profile's regional endpoint)
    #[arg(long)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct NlbArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long = "resourceName")]
    pub resource_name: Option<String>,
}

/// What to do once arguments have been validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Collect,
    DescribeMetrics,
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub kind: ResourceKind,
    pub mode: Mode,
    /// Full metric key prefix, including the resource name for network load balancers.
    pub prefix: String,
    pub title_prefix: String,
    pub compartment_id: String,
    pub target: ResourceTarget,
    pub config_file: Option<PathBuf>,
    pub profile: String,
    pub endpoint: Option<String>,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.describe_metrics {
            Mode::DescribeMetrics
        } else {
            Mode::Collect
        }
    }

    /// Check required flags. Describing metrics needs no compartment or resource id.
    pub fn settings(&self) -> Result<Settings> {
        let mode = self.mode();
        let (kind, common, resource_name) = match &self.resource {
            ResourceCommand::Nlb(args) => (ResourceKind::NetworkLoadBalancer, &args.common, args.resource_name.as_deref()),
            ResourceCommand::Flb(args) => (ResourceKind::FlexibleLoadBalancer, args, None),
            ResourceCommand::Mds(args) => (ResourceKind::MySqlDatabase, args, None),
        };

        let collecting = mode == Mode::Collect;
        let compartment_id = required("compartmentId", common.compartment_id.as_deref(), collecting)?;
        let resource_id = required("resourceId", common.resource_id.as_deref(), collecting)?;
        let resource_name = required("resourceName", resource_name, kind.requires_resource_name())?;

        let base_prefix = non_empty(common.metric_key_prefix.as_deref()).unwrap_or(kind.default_prefix());
        let title_prefix = non_empty(common.title_prefix.as_deref()).unwrap_or_default();
        let (prefix, title_prefix) = if kind.requires_resource_name() {
            let title = if title_prefix.is_empty() { resource_name.as_str() } else { title_prefix };
            (format!("{}.{}", base_prefix, resource_name), title.to_string())
        } else {
            (base_prefix.to_string(), title_prefix.to_string())
        };

        Ok(Settings {
            kind,
            mode,
            prefix,
            title_prefix,
            compartment_id,
            target: ResourceTarget {
                resource_id,
                resource_name,
            },
            config_file: common.config_file.clone(),
            profile: common.profile.clone(),
            endpoint: non_empty(common.endpoint.as_deref()).map(str::to_string),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn required(flag: &str, value: Option<&str>, needed: bool) -> Result<String> {
    match non_empty(value) {
        Some(v) => Ok(v.to_string()),
        None if needed => Err(PluginError::Configuration(format!("need -{}", flag))),
        None => Ok(String::new()),
    }
}

/// Rewrite `-longFlag` into `--longFlag`, leaving short flags, values and `--` alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || passthrough {
                return arg;
            }
            let rewritten = match arg.to_str() {
                Some("--") => {
                    passthrough = true;
                    None
                }
                Some(s) if is_single_dash_long(s) => Some(OsString::from(format!("-{}", s))),
                _ => None,
            };
            rewritten.unwrap_or(arg)
        })
        .collect()
}

fn is_single_dash_long(arg: &str) -> bool {
    let Some(rest) = arg.strip_prefix('-') else {
        return false;
    };
    !rest.starts_with('-') && rest.len() > 1 && rest.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["oci-metrics-plugin"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(normalize_args(argv)).unwrap()
    }

    #[test]
    fn test_normalize_single_dash_flags() {
        let args = normalize_args(["prog", "flb", "-compartmentId", "ocid1.c", "-v", "--profile", "X", "-resourceId=ocid1.r"]);
        let args: Vec<&str> = args.iter().map(|a| a.to_str().unwrap()).collect();
        assert_eq!(
            args,
            vec!["prog", "flb", "--compartmentId", "ocid1.c", "-v", "--profile", "X", "--resourceId=ocid1.r"]
        );
    }

    #[test]
    fn test_negative_numbers_and_passthrough_untouched() {
        let args = normalize_args(["prog", "-1", "--", "-compartmentId"]);
        let args: Vec<&str> = args.iter().map(|a| a.to_str().unwrap()).collect();
        assert_eq!(args, vec!["prog", "-1", "--", "-compartmentId"]);
    }

    #[test]
    fn test_flb_settings() {
        let cli = parse(&["flb", "-compartmentId", "ocid1.c", "-resourceId", "ocid1.lb"]);
        let settings = cli.settings().unwrap();
        assert_eq!(settings.kind, ResourceKind::FlexibleLoadBalancer);
        assert_eq!(settings.mode, Mode::Collect);
        assert_eq!(settings.prefix, "ociflb");
        assert_eq!(settings.title_prefix, "");
        assert_eq!(settings.profile, DEFAULT_PROFILE);
        assert_eq!(settings.target.resource_id, "ocid1.lb");
    }

    #[test]
    fn test_missing_compartment_is_configuration_error() {
        let cli = parse(&["mds", "-resourceId", "ocid1.db"]);
        let err = cli.settings().unwrap_err();
        assert!(matches!(err, PluginError::Configuration(ref msg) if msg == "need -compartmentId"));

        let cli = parse(&["flb", "-compartmentId", "", "-resourceId", "ocid1.lb"]);
        assert!(matches!(cli.settings(), Err(PluginError::Configuration(_))));
    }

    #[test]
    fn test_nlb_prefix_includes_resource_name() {
        let cli = parse(&[
            "nlb",
            "-compartmentId",
            "ocid1.c",
            "-resourceId",
            "ocid1.nlb",
            "-resourceName",
            "edge",
            "-metric-key-prefix",
            "custom",
        ]);
        let settings = cli.settings().unwrap();
        assert_eq!(settings.prefix, "custom.edge");
        assert_eq!(settings.title_prefix, "edge");

        let cli = parse(&["nlb", "-compartmentId", "ocid1.c", "-resourceId", "ocid1.nlb"]);
        assert!(matches!(cli.settings(), Err(PluginError::Configuration(ref m)) if m == "need -resourceName"));
    }

    #[test]
    fn test_describe_metrics_skips_collection_flags() {
        let cli = parse(&["--describe-metrics", "mds", "-title-prefix", "prod"]);
        let settings = cli.settings().unwrap();
        assert_eq!(settings.mode, Mode::DescribeMetrics);
        assert_eq!(settings.prefix, "ocimds");
        assert_eq!(settings.title_prefix, "prod");
        assert_eq!(settings.compartment_id, "");
    }
}
