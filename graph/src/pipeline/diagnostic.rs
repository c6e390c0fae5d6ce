//! Non-fatal findings collected while passes run.

use std::collections::BTreeMap;
use std::fmt;

/// How noteworthy a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Note,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Note => f.write_str("note"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// A finding that does not stop compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    pass: &'static str,
    message: String,
    attributes: BTreeMap<String, String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, pass: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            pass,
            message: message.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn note(pass: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Note, pass, message)
    }

    pub fn warning(pass: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, pass, message)
    }

    /// Attach a named attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.insert(name.into(), value.to_string());
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Name of the pass that emitted this diagnostic.
    pub fn pass(&self) -> &'static str {
        self.pass
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.pass, self.message)
    }
}
