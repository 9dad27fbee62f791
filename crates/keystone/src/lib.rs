//! # Keystone
//!
//! Keystone is the naming and compliance layer that sits underneath a set of
//! infrastructure "constructs" (CDN distributions, REST gateways, key-value
//! tables, functions with progressive rollout, dashboards). Constructs are
//! thin compositions of provider resources; what they share, and what lives
//! here, is the logic that must be identical everywhere:
//!
//! - **Resource naming**: deterministic, constraint-checked physical names
//!   built from a stage, a service and a resource kind. See [`name`].
//! - **Stage-aware lifecycle**: free-form environment labels are classified
//!   into a [`Stage`] which decides whether stateful resources are retained
//!   or destroyed with their stack. See [`stage`].
//! - **Tag compliance**: a visitor walks a tree of [`Construct`]s and collects
//!   a [`Diagnostic`] for every deployable unit that is missing a required
//!   tag. See [`compliance`].
//! - **Configuration layering**: defaults, user overrides and mandatory
//!   overrides are merged with an explicit precedence. See [`layer`].
//!
//! ## Usage
//!
//! ```
//! use keystone::{Construct, ResourceNameParts, RemovalPolicy, Tags};
//!
//! let name = ResourceNameParts::new("prod", "orders", "table").compose().unwrap();
//! assert_eq!("prod-orders-table", name);
//!
//! assert_eq!(RemovalPolicy::Retain, keystone::resolve_removal_policy("prod"));
//!
//! let stack = Construct::stack("OrdersStack")
//!     .with_tags(Tags::from_iter([("Environment", "prod")]))
//!     .with_child(Construct::resource("Table", "AWS::DynamoDB::Table"));
//! let diagnostics = keystone::check_required_tags(&stack, ["Environment", "Owner"]);
//! assert_eq!(1, diagnostics.len());
//! ```
//!
//! ## Error Handling
//!
//! Name composition fails fast with the top-level [`Error`] enum: a name a
//! provider would reject is never returned. Tag compliance on the other hand
//! never fails; it reports every problem it finds into a [`Diagnostics`]
//! collector so a single pass surfaces everything that needs fixing.

pub use keystone_derive::Layer;

pub mod compliance;
pub mod diagnostics;
pub mod layer;
pub mod name;
pub mod stage;
pub mod tags;
#[cfg(test)]
mod test;
pub mod tree;

pub use compliance::{check_required_tags, RequiredTags};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use layer::{merge_config, Layer};
pub use name::{
    compose_bucket_name, compose_resource_name, BucketNameParts, ResourceNameParts,
    BUCKET_NAME_MAX_LEN, BUCKET_NAME_MIN_LEN, RESOURCE_NAME_MAX_LEN,
};
pub use stage::{classify_stage, resolve_removal_policy, RemovalPolicy, Stage};
pub use tags::{apply_tags, Taggable, Tags};
pub use tree::{walk, Construct, ConstructKind, Node, Visitor};

/// Top-level error enum that encompasses all errors.
#[derive(snafu::Snafu, Debug, Clone, PartialEq)]
pub enum Error {
    #[snafu(display(
        "generated resource name '{name}' exceeds the maximum allowed length of {limit} characters"
    ))]
    NameTooLong { name: String, limit: usize },

    #[snafu(display(
        "generated name '{name}' is shorter than the minimum allowed length of {min} characters"
    ))]
    NameTooShort { name: String, min: usize },

    #[snafu(display(
        "generated resource name '{name}' may only contain lowercase alphanumerics, '.' and '-', \
         and must start and end with a lowercase alphanumeric"
    ))]
    InvalidNameCharacters { name: String },
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
