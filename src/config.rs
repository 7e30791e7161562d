//! OCI SDK/CLI configuration file.
//!
//! The file is INI-style: `[PROFILE]` headers followed by `key=value` lines.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{PluginError, Result};

pub const DEFAULT_PROFILE: &str = "DEFAULT";

/// Credentials and region for one profile.
#[derive(Debug, Clone, PartialEq)]
pub struct OciConfig {
    pub user: String,
    pub fingerprint: String,
    pub tenancy: String,
    pub region: String,
    pub key_file: PathBuf,
    pub pass_phrase: Option<String>,
}

impl OciConfig {
    /// Default location, `~/.oci/config`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".oci").join("config"))
    }

    pub fn load(path: &Path, profile: &str) -> Result<Self> {
        debug!("Loading OCI profile {} from {}", profile, path.display());
        let content = fs::read_to_string(path).map_err(|e| {
            PluginError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content, profile)
    }

    /// Keys missing from `profile` are inherited from `DEFAULT`.
    pub fn parse(content: &str, profile: &str) -> Result<Self> {
        let sections = parse_sections(content);
        if !sections.contains_key(profile) {
            return Err(PluginError::Configuration(format!("Profile {} not found", profile)));
        }

        let lookup = |key: &str| -> Option<String> {
            sections
                .get(profile)
                .and_then(|s| s.get(key))
                .or_else(|| sections.get(DEFAULT_PROFILE).and_then(|s| s.get(key)))
                .cloned()
        };
        let require = |key: &str| -> Result<String> {
            lookup(key).ok_or_else(|| {
                PluginError::Configuration(format!("Profile {} is missing {}", profile, key))
            })
        };

        Ok(Self {
            user: require("user")?,
            fingerprint: require("fingerprint")?,
            tenancy: require("tenancy")?,
            region: require("region")?,
            key_file: expand_home(&require("key_file")?),
            pass_phrase: lookup("pass_phrase").filter(|p| !p.is_empty()),
        })
    }

    /// `keyId` of the HTTP signature.
    pub fn key_id(&self) -> String {
        format!("{}/{}/{}", self.tenancy, self.user, self.fingerprint)
    }
}

fn parse_sections(content: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }
        if let (Some(section), Some((key, value))) = (&current, line.split_once('=')) {
            sections
                .entry(section.clone())
                .or_default()
                .insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    sections
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
# generated by oci setup config
[DEFAULT]
user=ocid1.user.oc1..aaaa
fingerprint=20:3b:97:13:55:1c:5b:0d:d3:37:d8:50:4e:c5:3a:34
tenancy=ocid1.tenancy.oc1..bbbb
region=ap-tokyo-1
key_file=/etc/oci/key.pem

[OSAKA]
region = ap-osaka-1
";

    #[test]
    fn test_parse_default_profile() {
        let config = OciConfig::parse(SAMPLE, DEFAULT_PROFILE).unwrap();
        assert_eq!(config.region, "ap-tokyo-1");
        assert_eq!(config.key_file, PathBuf::from("/etc/oci/key.pem"));
        assert_eq!(config.pass_phrase, None);
        assert_eq!(
            config.key_id(),
            "ocid1.tenancy.oc1..bbbb/ocid1.user.oc1..aaaa/20:3b:97:13:55:1c:5b:0d:d3:37:d8:50:4e:c5:3a:34"
        );
    }

    #[test]
    fn test_profile_inherits_from_default() {
        let config = OciConfig::parse(SAMPLE, "OSAKA").unwrap();
        assert_eq!(config.region, "ap-osaka-1");
        assert_eq!(config.user, "ocid1.user.oc1..aaaa");
    }

    #[test]
    fn test_missing_profile_and_key() {
        assert!(matches!(
            OciConfig::parse(SAMPLE, "NOPE"),
            Err(PluginError::Configuration(_))
        ));

        let partial = "[DEFAULT]\nuser=u\nfingerprint=f\ntenancy=t\nregion=r\n";
        let err = OciConfig::parse(partial, DEFAULT_PROFILE).unwrap_err();
        assert!(err.to_string().contains("key_file"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = OciConfig::load(file.path(), DEFAULT_PROFILE).unwrap();
        assert_eq!(config.tenancy, "ocid1.tenancy.oc1..bbbb");
    }
}
