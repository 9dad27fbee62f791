//! Tag maps and tag application.
use std::collections::BTreeMap;

/// A string-keyed, string-valued tag map.
///
/// Keys are compared case-sensitively and iterate in sorted order.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Tags {
    inner: BTreeMap<String, String>,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a tag, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.inner.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tags = Tags::default();
        tags.extend(iter);
        tags
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Tags {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl IntoIterator for Tags {
    type Item = (String, String);

    type IntoIter = <BTreeMap<String, String> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl core::fmt::Display for Tags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(
            &self
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

/// Anything that can carry tags.
pub trait Taggable {
    fn set_tag(&mut self, key: &str, value: &str);
}

impl Taggable for Tags {
    fn set_tag(&mut self, key: &str, value: &str) {
        self.insert(key, value);
    }
}

/// Applies every tag in `tags` to `unit`, one `set_tag` call per entry.
///
/// Matching keys are overwritten, tags already on the unit are otherwise
/// kept. No validation happens here, compliance is audited separately.
pub fn apply_tags<T: Taggable + ?Sized>(unit: &mut T, tags: &Tags) {
    for (key, value) in tags.iter() {
        log::trace!("  tagging {key}={value}");
        unit.set_tag(key, value);
    }
}
