//! Deployment stages and the retention policy they imply.
use std::str::FromStr;

/// A deployment environment.
///
/// The known stages have a canonical lowercase label. Anything else is an
/// ephemeral environment, typically a pull request or feature branch like
/// `pr-123`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Develop,
    Staging,
    Prod,
    Test,
    /// Holds the trimmed, lowercased label.
    Ephemeral(String),
}

impl Stage {
    /// Classifies a free-form label. Never fails.
    ///
    /// Leading and trailing whitespace is ignored and comparison is case
    /// insensitive. `dev` is accepted as an alias of `develop`.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "develop" | "dev" => Stage::Develop,
            "staging" => Stage::Staging,
            "prod" => Stage::Prod,
            "test" => Stage::Test,
            _ => Stage::Ephemeral(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Stage::Develop => "develop",
            Stage::Staging => "staging",
            Stage::Prod => "prod",
            Stage::Test => "test",
            Stage::Ephemeral(label) => label.as_str(),
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Stage::Ephemeral(_))
    }

    /// Production and pre-production keep their stateful resources when a
    /// stack is torn down, every other stage is disposable.
    pub fn removal_policy(&self) -> RemovalPolicy {
        match self {
            Stage::Prod | Stage::Staging => RemovalPolicy::Retain,
            Stage::Develop | Stage::Test | Stage::Ephemeral(_) => RemovalPolicy::Destroy,
        }
    }
}

impl core::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Stage::parse(s))
    }
}

impl From<&str> for Stage {
    fn from(value: &str) -> Self {
        Stage::parse(value)
    }
}

impl serde::Serialize for Stage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Stage {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Stage::parse(&raw))
    }
}

/// Whether a resource's data survives deletion of its owning stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RemovalPolicy {
    Retain,
    Destroy,
}

impl core::fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RemovalPolicy::Retain => "RETAIN",
            RemovalPolicy::Destroy => "DESTROY",
        })
    }
}

/// Returns the canonical label of a stage.
///
/// Known stages map to their canonical literal, anything else is returned
/// trimmed and lowercased, eg `PR-123` becomes `pr-123`.
pub fn classify_stage(raw: &str) -> String {
    let stage = Stage::parse(raw);
    log::trace!("classified stage {raw:?} as {stage:?}");
    stage.as_str().to_owned()
}

/// Decides the removal policy for a free-form stage label.
///
/// `prod` and `staging` retain, everything else is destroyed. Comparison
/// ignores case and surrounding whitespace.
pub fn resolve_removal_policy(raw_stage: &str) -> RemovalPolicy {
    let policy = Stage::parse(raw_stage).removal_policy();
    log::debug!("removal policy for stage {raw_stage:?} is {policy}");
    policy
}
