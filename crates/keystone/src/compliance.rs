//! Required-tag compliance.
//!
//! [`RequiredTags`] is a [`Visitor`] that audits every deployable unit in a
//! tree. It collects all findings instead of stopping at the first one:
//!
//! - a unit with no tags at all gets a [`DiagnosticKind::NoTagsPresent`]
//! - every required key that is absent gets its own
//!   [`DiagnosticKind::MissingRequiredTag`], in declaration order
//!
//! The two checks are independent, so a unit with no tags receives one
//! `NoTagsPresent` followed by one `MissingRequiredTag` per required key.
//!
//! Nodes that are not units are inert, their tags are expected to be
//! propagated from the enclosing unit by the provisioning engine.
use crate::{
    diagnostics::{DiagnosticKind, Diagnostics, Severity},
    tree::{walk, Node, Visitor},
};

/// Tag keys every deployable unit must carry.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RequiredTags {
    keys: Vec<String>,
}

impl RequiredTags {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl Visitor for RequiredTags {
    fn visit(&mut self, node: &dyn Node, diagnostics: &mut Diagnostics) {
        if !node.is_unit() {
            return;
        }

        let unit = node.name();
        let tags = node.tags();
        log::debug!("checking required tags on '{unit}': {tags}");
        if tags.is_empty() {
            diagnostics.report(unit, Severity::Error, DiagnosticKind::NoTagsPresent);
        }
        for key in self.keys.iter() {
            if !tags.contains_key(key) {
                diagnostics.report(
                    unit,
                    Severity::Error,
                    DiagnosticKind::MissingRequiredTag { key: key.clone() },
                );
            }
        }
    }
}

/// Runs a full compliance pass over `root` and returns what it found.
pub fn check_required_tags<I, S>(root: &dyn Node, required: I) -> Diagnostics
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut visitor = RequiredTags::new(required);
    let mut diagnostics = Diagnostics::default();
    walk(root, &mut visitor, &mut diagnostics);
    if diagnostics.is_empty() {
        log::debug!("'{}' is tag compliant", root.name());
    } else {
        log::warn!(
            "'{}' has {} tag compliance problem(s)",
            root.name(),
            diagnostics.len()
        );
    }
    diagnostics
}
