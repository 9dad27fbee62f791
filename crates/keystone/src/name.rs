//! Deterministic, constraint-checked physical resource names.
//!
//! Names are built from ordered components, `stage-service-resource-suffix-region`,
//! where empty components are dropped, the remainder is joined with `-` and the
//! result is lowercased. Two composers share that algorithm:
//!
//! - [`compose_resource_name`] for general resources, which only enforces a
//!   ceiling of [`RESOURCE_NAME_MAX_LEN`] characters.
//! - [`compose_bucket_name`] for object storage buckets, which always inserts
//!   the literal `bucket` segment and additionally enforces a floor and a
//!   DNS-label-like character class.
use std::sync::OnceLock;

use regex::Regex;

use crate::{InvalidNameCharactersSnafu, NameTooLongSnafu, NameTooShortSnafu, Result};

/// Maximum length of a general resource name.
pub const RESOURCE_NAME_MAX_LEN: usize = 64;

/// Maximum length of a bucket name.
pub const BUCKET_NAME_MAX_LEN: usize = 63;

/// Minimum length of a bucket name.
///
/// The fixed `bucket` segment alone is longer than this, so the floor is
/// enforced against the caller-supplied components of the name.
pub const BUCKET_NAME_MIN_LEN: usize = 3;

/// The segment inserted into every bucket name in place of a resource kind.
const BUCKET_SEGMENT: &str = "bucket";

const SEPARATOR: &str = "-";

fn bucket_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // UNWRAP: safe because the pattern is a literal that is known to compile
        Regex::new(r"^[a-z0-9][a-z0-9.-]*[a-z0-9]$").unwrap()
    })
}

/// Drops empty components and joins the rest, without changing case.
fn join_components<'a>(components: impl IntoIterator<Item = Option<&'a str>>) -> String {
    components
        .into_iter()
        .flatten()
        .filter(|component| !component.is_empty())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Inputs to general resource name composition.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResourceNameParts {
    /// Deployment environment, eg `develop`, `prod` or `pr-123`.
    pub stage: String,
    /// Logical service or domain that owns the resource.
    pub service: String,
    /// Resource kind, eg `table` or `queue`.
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl ResourceNameParts {
    pub fn new(
        stage: impl Into<String>,
        service: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            stage: stage.into(),
            service: service.into(),
            resource: resource.into(),
            suffix: None,
            region: None,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Composes the name. See [`compose_resource_name`].
    pub fn compose(&self) -> Result<String> {
        compose_resource_name(self)
    }
}

/// Inputs to bucket name composition.
///
/// There is no resource component, the `bucket` segment is always used.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BucketNameParts {
    pub stage: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl BucketNameParts {
    pub fn new(stage: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            service: service.into(),
            suffix: None,
            region: None,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Composes the name. See [`compose_bucket_name`].
    pub fn compose(&self) -> Result<String> {
        compose_bucket_name(self)
    }
}

/// Composes a general resource name.
///
/// Empty components are treated the same as absent ones, so they never
/// produce a doubled separator. Lowercasing happens after joining.
///
/// ## Errors
/// [`Error::NameTooLong`](crate::Error::NameTooLong) if the name is longer
/// than [`RESOURCE_NAME_MAX_LEN`] characters. A name of exactly that length
/// is valid.
pub fn compose_resource_name(parts: &ResourceNameParts) -> Result<String> {
    let name = join_components([
        Some(parts.stage.as_str()),
        Some(parts.service.as_str()),
        Some(parts.resource.as_str()),
        parts.suffix.as_deref(),
        parts.region.as_deref(),
    ])
    .to_lowercase();

    snafu::ensure!(
        name.chars().count() <= RESOURCE_NAME_MAX_LEN,
        NameTooLongSnafu {
            name,
            limit: RESOURCE_NAME_MAX_LEN,
        }
    );
    log::debug!("composed resource name '{name}'");
    Ok(name)
}

/// Composes a bucket name.
///
/// Rules are checked in order and the first violation is returned:
/// 1. the caller-supplied components must be at least
///    [`BUCKET_NAME_MIN_LEN`] characters
/// 2. the full name must be at most [`BUCKET_NAME_MAX_LEN`] characters
/// 3. the full name must only contain lowercase alphanumerics, `.` and `-`,
///    and must start and end with an alphanumeric
pub fn compose_bucket_name(parts: &BucketNameParts) -> Result<String> {
    let supplied = join_components([
        Some(parts.stage.as_str()),
        Some(parts.service.as_str()),
        parts.suffix.as_deref(),
        parts.region.as_deref(),
    ])
    .to_lowercase();
    let name = join_components([
        Some(parts.stage.as_str()),
        Some(parts.service.as_str()),
        Some(BUCKET_SEGMENT),
        parts.suffix.as_deref(),
        parts.region.as_deref(),
    ])
    .to_lowercase();

    snafu::ensure!(
        supplied.chars().count() >= BUCKET_NAME_MIN_LEN,
        NameTooShortSnafu {
            name: supplied,
            min: BUCKET_NAME_MIN_LEN,
        }
    );
    snafu::ensure!(
        name.chars().count() <= BUCKET_NAME_MAX_LEN,
        NameTooLongSnafu {
            name,
            limit: BUCKET_NAME_MAX_LEN,
        }
    );
    snafu::ensure!(
        bucket_name_pattern().is_match(&name),
        InvalidNameCharactersSnafu { name }
    );
    log::debug!("composed bucket name '{name}'");
    Ok(name)
}
