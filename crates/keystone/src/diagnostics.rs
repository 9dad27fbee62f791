//! Collected, non-fatal findings about deployable units.
//!
//! Diagnostics are reported into a [`Diagnostics`] collector owned by the
//! caller. Reporting never fails and never stops a traversal.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl core::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The unit carries no tags at all.
    NoTagsPresent,
    /// The unit is missing one required tag.
    MissingRequiredTag { key: String },
}

/// A finding reported against a specific unit.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    pub unit: String,
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn message(&self) -> String {
        let unit = &self.unit;
        match &self.kind {
            DiagnosticKind::NoTagsPresent => format!("no tags are present on '{unit}'"),
            DiagnosticKind::MissingRequiredTag { key } => {
                format!("required tag '{key}' is missing on '{unit}'")
            }
        }
    }
}

impl core::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.unit, self.message())
    }
}

/// An append-only diagnostics collector.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    inner: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, unit: impl Into<String>, severity: Severity, kind: DiagnosticKind) {
        let diagnostic = Diagnostic {
            unit: unit.into(),
            severity,
            kind,
        };
        log::debug!("reported {diagnostic}");
        self.inner.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// All diagnostics, in the order they were reported.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.inner.iter()
    }

    /// Diagnostics reported against `unit`, in the order they were reported.
    pub fn for_unit<'a>(&'a self, unit: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.inner.iter().filter(move |d| d.unit == unit)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.inner.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;

    type IntoIter = <Vec<Diagnostic> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl core::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for diagnostic in self.inner.iter() {
            writeln!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}
