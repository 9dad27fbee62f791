//! Layered configuration.
//!
//! Construct properties are assembled from three layers: library defaults,
//! user overrides and mandatory overrides. Each layer is merged over the one
//! below it with [`Layer::layer`], and [`merge_config`] fixes the order so a
//! mandatory value always wins no matter how the call site is written.
//!
//! Structs with named fields can derive [`Layer`] field by field:
//!
//! ```
//! use keystone::Layer;
//!
//! #[derive(Clone, Debug, Default, PartialEq, Layer)]
//! struct TableProps {
//!     billing_mode: Option<String>,
//!     point_in_time_recovery: Option<bool>,
//!     // Never overridden, always taken from the defaults.
//!     #[layer(ignore)]
//!     table_class: Option<String>,
//! }
//!
//! let props = keystone::merge_config(
//!     TableProps {
//!         billing_mode: Some("PAY_PER_REQUEST".into()),
//!         point_in_time_recovery: Some(false),
//!         table_class: Some("STANDARD".into()),
//!     },
//!     TableProps {
//!         point_in_time_recovery: Some(true),
//!         table_class: Some("STANDARD_IA".into()),
//!         ..Default::default()
//!     },
//!     TableProps {
//!         billing_mode: Some("PROVISIONED".into()),
//!         ..Default::default()
//!     },
//! );
//! assert_eq!(Some("PROVISIONED"), props.billing_mode.as_deref());
//! assert_eq!(Some(true), props.point_in_time_recovery);
//! assert_eq!(Some("STANDARD"), props.table_class.as_deref());
//! ```
use std::collections::{BTreeMap, HashMap};

use crate::{compliance::RequiredTags, tags::apply_tags, Tags};

/// Merging one configuration layer over another.
///
/// This trait can be derived for structs with named fields.
pub trait Layer {
    /// Returns `self` with `over` merged on top, `over` wins.
    fn layer(self, over: Self) -> Self;
}

impl<T> Layer for Option<T> {
    fn layer(self, over: Self) -> Self {
        over.or(self)
    }
}

impl Layer for String {
    fn layer(self, over: Self) -> Self {
        if over.is_empty() {
            self
        } else {
            over
        }
    }
}

impl<T> Layer for Vec<T> {
    fn layer(self, over: Self) -> Self {
        if over.is_empty() {
            self
        } else {
            over
        }
    }
}

impl<K: Ord, V> Layer for BTreeMap<K, V> {
    fn layer(mut self, over: Self) -> Self {
        self.extend(over);
        self
    }
}

impl<K, V, S> Layer for HashMap<K, V, S>
where
    K: Eq + std::hash::Hash,
    S: std::hash::BuildHasher,
{
    fn layer(mut self, over: Self) -> Self {
        self.extend(over);
        self
    }
}

impl Layer for Tags {
    fn layer(mut self, over: Self) -> Self {
        apply_tags(&mut self, &over);
        self
    }
}

/// Required tags accumulate, later layers can add keys but never remove them.
impl Layer for RequiredTags {
    fn layer(self, over: Self) -> Self {
        let mut keys = self.keys().to_vec();
        for key in over.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        RequiredTags::new(keys)
    }
}

/// Objects are merged recursively, any other non-null value replaces the
/// value below it.
impl Layer for serde_json::Value {
    fn layer(self, over: Self) -> Self {
        use serde_json::Value;

        match (self, over) {
            (Value::Object(mut base), Value::Object(over)) => {
                for (key, value) in over {
                    let merged = match base.remove(&key) {
                        Some(below) => below.layer(value),
                        None => value,
                    };
                    base.insert(key, merged);
                }
                Value::Object(base)
            }
            (base, Value::Null) => base,
            (_, over) => over,
        }
    }
}

/// Merges `defaults < user_overrides < mandatory_overrides`.
pub fn merge_config<T>(defaults: T, user_overrides: T, mandatory_overrides: T) -> T
where
    T: Layer + Clone + PartialEq + core::fmt::Debug,
{
    let requested = defaults.layer(user_overrides);
    if !log::log_enabled!(log::Level::Debug) {
        return requested.layer(mandatory_overrides);
    }

    let merged = requested.clone().layer(mandatory_overrides);
    if merged != requested {
        let cmp = pretty_assertions::Comparison::new(&requested, &merged);
        let change_string = format!("{cmp}")
            .lines()
            .map(|line| format!("  {line}"))
            .collect::<Vec<_>>()
            .join("\n");
        log::debug!(
            "mandatory overrides changed {}:\n{change_string}",
            std::any::type_name::<T>()
        );
    }
    merged
}
