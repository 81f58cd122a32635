use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};

/// Product version plus release time, persisted as `<version>-<releaseTime>`.
///
/// Markers are compared by string equality only. The stored marker is
/// parsed into a [`Version`] solely to read its major component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMarker {
    pub version: String,
    pub release_time: String,
}

impl VersionMarker {
    pub fn new(version: impl Into<String>, release_time: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            release_time: release_time.into(),
        }
    }
}

impl fmt::Display for VersionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.version, self.release_time)
    }
}

/// Dotted version (`major.minor.micro[.qualifier]`) read back from a marker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub micro: u64,
    pub qualifier: Option<String>,
}

impl Version {
    /// Parses a stored marker such as `5.3.7.47-1611064498000`.
    ///
    /// A trailing all-digit `-<releaseTime>` is stripped first. Missing
    /// minor/micro parts default to zero; anything after the third dot is
    /// kept verbatim as the qualifier.
    pub fn parse_marker(marker: &str) -> Option<Self> {
        let marker = marker.trim();
        let version = match marker.rsplit_once('-') {
            Some((head, tail)) if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) => {
                head
            }
            _ => marker,
        };

        let mut parts = version.splitn(4, '.');
        let major = parse_component(parts.next())?;
        let minor = parts.next().map_or(Some(0), |p| parse_component(Some(p)))?;
        let micro = parts.next().map_or(Some(0), |p| parse_component(Some(p)))?;
        let qualifier = parts
            .next()
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        Some(Self {
            major,
            minor,
            micro,
            qualifier,
        })
    }
}

fn parse_component(part: Option<&str>) -> Option<u64> {
    let part = part?;
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if let Some(qualifier) = &self.qualifier {
            write!(f, ".{qualifier}")?;
        }
        Ok(())
    }
}

/// How the current run relates to the last recorded installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateClassification {
    /// Stored marker equals the current one.
    Unchanged,
    /// No marker existed.
    Fresh,
    MinorUpgrade { previous: Version },
    /// Previous major version was below the upgrade threshold.
    MajorUpgrade { previous: Version },
}

impl UpdateClassification {
    pub fn previous(&self) -> Option<&Version> {
        match self {
            Self::MinorUpgrade { previous } | Self::MajorUpgrade { previous } => Some(previous),
            Self::Unchanged | Self::Fresh => None,
        }
    }

    /// Stable label used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "new-none",
            Self::Fresh => "new-fresh",
            Self::MinorUpgrade { .. } => "new-minor",
            Self::MajorUpgrade { .. } => "new-from4",
        }
    }

    /// Only an upgrade across the major threshold requires translating the
    /// legacy document.
    pub fn needs_migration(&self) -> bool {
        matches!(self, Self::MajorUpgrade { .. })
    }
}

impl fmt::Display for UpdateClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which configuration document a file holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ConfigKind {
    Server,
    Web,
}

impl ConfigKind {
    /// Bundled template path, e.g. `/resource/config/server.json`.
    pub fn template_resource(self) -> String {
        format!("/resource/config/{self}.json")
    }

    /// Quarantine file name for the `n`th corrupt copy.
    pub fn quarantine_name(self, n: u32) -> String {
        format!("lucee-{self}.{n}.buggy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_display() {
        let marker = VersionMarker::new("6.0.0.1", "1700000000000");
        assert_eq!(marker.to_string(), "6.0.0.1-1700000000000");
    }

    #[test]
    fn test_parse_marker_with_release_time() {
        let version = Version::parse_marker("5.3.7.47-1611064498000").unwrap();
        assert_eq!(version.major, 5);
        assert_eq!(version.minor, 3);
        assert_eq!(version.micro, 7);
        assert_eq!(version.qualifier.as_deref(), Some("47"));
    }

    #[test]
    fn test_parse_marker_keeps_textual_qualifier() {
        let version = Version::parse_marker("4.5.2.018-SNAPSHOT").unwrap();
        assert_eq!(version.major, 4);
        assert_eq!(version.qualifier.as_deref(), Some("018-SNAPSHOT"));
    }

    #[test]
    fn test_parse_marker_short_forms() {
        assert_eq!(Version::parse_marker("6").unwrap().to_string(), "6.0.0");
        assert_eq!(Version::parse_marker(" 6.1\n").unwrap().minor, 1);
    }

    #[test]
    fn test_parse_marker_rejects_garbage() {
        assert!(Version::parse_marker("").is_none());
        assert!(Version::parse_marker("latest").is_none());
        assert!(Version::parse_marker("5.x.1").is_none());
    }

    #[test]
    fn test_classification_labels() {
        let previous = Version::parse_marker("4.5.0").unwrap();
        assert_eq!(UpdateClassification::Unchanged.as_str(), "new-none");
        assert_eq!(UpdateClassification::Fresh.as_str(), "new-fresh");
        assert_eq!(
            UpdateClassification::MinorUpgrade {
                previous: previous.clone()
            }
            .as_str(),
            "new-minor"
        );
        let major = UpdateClassification::MajorUpgrade { previous };
        assert_eq!(major.to_string(), "new-from4");
        assert!(major.needs_migration());
        assert_eq!(major.previous().unwrap().major, 4);
    }

    #[test]
    fn test_config_kind_names() {
        assert_eq!(ConfigKind::Server.to_string(), "server");
        assert_eq!("WEB".parse::<ConfigKind>().unwrap(), ConfigKind::Web);
        assert_eq!(
            ConfigKind::Web.template_resource(),
            "/resource/config/web.json"
        );
        assert_eq!(ConfigKind::Server.quarantine_name(3), "lucee-server.3.buggy");
    }
}
