//! Error types for graph construction and compilation.
//!
//! Two layers:
//!
//! - [`GraphError`] - structural problems rejected by the
//!   [`GraphBuilder`](crate::GraphBuilder) while the graph is being described.
//! - [`CompilerError`] - the structured error returned by compilation. It
//!   carries a stable [`ErrorCode`], a message, named attributes (offending
//!   operation, port, sub-resource...), an optional remediation hint and the
//!   diagnostics collected before the failure.
//!
//! Every [`GraphError`] converts into a [`CompilerError`] with the same code.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::pipeline::Diagnostic;
use crate::port::{PortHandle, PortRole};

/// Broad family an [`ErrorCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Rejected while building the logical graph.
    Structural,
    /// The pass pipeline itself is misconfigured.
    Configuration,
    /// A compiler pass rejected the graph.
    Validation,
    /// The compiler broke one of its own invariants.
    Internal,
}

/// Stable identifier of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UnknownPort,
    IncompatibleRoles,
    CycleDetected,
    DuplicateConnection,
    TargetAlreadyConnected,
    DuplicateOperation,
    DuplicatePort,
    EmptyName,

    PassDependencyCycle,
    PassDependencyMissing,
    PassDuplicate,
    PipelineAlreadyRun,

    EmptyGraph,
    DisconnectedPort,
    DuplicateSubresource,
    CardinalityMismatch,
    MixedModifierConstraint,
    ResourceKindMismatch,
    FormatMismatch,
    BufferUsageMismatch,
    ProducerMissingLayout,
    OrphanedPrimitivePort,

    InternalInvariant,
}

impl ErrorCode {
    /// The stable string form of this code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownPort => "UNKNOWN_PORT",
            Self::IncompatibleRoles => "INCOMPATIBLE_ROLES",
            Self::CycleDetected => "CYCLE_DETECTED",
            Self::DuplicateConnection => "DUPLICATE_CONNECTION",
            Self::TargetAlreadyConnected => "TARGET_ALREADY_CONNECTED",
            Self::DuplicateOperation => "DUPLICATE_OPERATION",
            Self::DuplicatePort => "DUPLICATE_PORT",
            Self::EmptyName => "EMPTY_NAME",
            Self::PassDependencyCycle => "PASS_DEPENDENCY_CYCLE",
            Self::PassDependencyMissing => "PASS_DEPENDENCY_MISSING",
            Self::PassDuplicate => "PASS_DUPLICATE",
            Self::PipelineAlreadyRun => "PIPELINE_ALREADY_RUN",
            Self::EmptyGraph => "EMPTY_GRAPH",
            Self::DisconnectedPort => "DISCONNECTED_PORT",
            Self::DuplicateSubresource => "DUPLICATE_SUBRESOURCE",
            Self::CardinalityMismatch => "CARDINALITY_MISMATCH",
            Self::MixedModifierConstraint => "MIXED_MODIFIER_CONSTRAINT",
            Self::ResourceKindMismatch => "RESOURCE_KIND_MISMATCH",
            Self::FormatMismatch => "FORMAT_MISMATCH",
            Self::BufferUsageMismatch => "BUFFER_USAGE_MISMATCH",
            Self::ProducerMissingLayout => "PRODUCER_MISSING_LAYOUT",
            Self::OrphanedPrimitivePort => "ORPHANED_PRIMITIVE_PORT",
            Self::InternalInvariant => "INTERNAL_INVARIANT",
        }
    }

    /// The family this code belongs to.
    pub fn category(self) -> ErrorCategory {
        match self {
            Self::UnknownPort
            | Self::IncompatibleRoles
            | Self::CycleDetected
            | Self::DuplicateConnection
            | Self::TargetAlreadyConnected
            | Self::DuplicateOperation
            | Self::DuplicatePort
            | Self::EmptyName => ErrorCategory::Structural,
            Self::PassDependencyCycle
            | Self::PassDependencyMissing
            | Self::PassDuplicate
            | Self::PipelineAlreadyRun => ErrorCategory::Configuration,
            Self::EmptyGraph
            | Self::DisconnectedPort
            | Self::DuplicateSubresource
            | Self::CardinalityMismatch
            | Self::MixedModifierConstraint
            | Self::ResourceKindMismatch
            | Self::FormatMismatch
            | Self::BufferUsageMismatch
            | Self::ProducerMissingLayout
            | Self::OrphanedPrimitivePort => ErrorCategory::Validation,
            Self::InternalInvariant => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the [`GraphBuilder`](crate::GraphBuilder).
///
/// Port names are qualified as `operation.port`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The handle does not belong to this graph.
    #[error("unknown port handle {0:?}")]
    UnknownPort(PortHandle),

    /// No operation declares a port with this name.
    #[error("no port named '{operation}.{port}'")]
    UnknownPortName { operation: String, port: String },

    /// Source must produce, target must consume.
    #[error("cannot connect {from_role} port '{from_port}' to {to_role} port '{to_port}'")]
    IncompatibleRoles {
        from_port: String,
        from_role: PortRole,
        to_port: String,
        to_role: PortRole,
    },

    /// The connection would make an operation depend on itself.
    #[error(
        "connecting '{from_port}' to '{to_port}' would create a cycle between operations '{from_operation}' and '{to_operation}'"
    )]
    CycleDetected {
        from_port: String,
        to_port: String,
        from_operation: String,
        to_operation: String,
    },

    /// The same connection was added twice.
    #[error("'{from_port}' is already connected to '{to_port}'")]
    DuplicateConnection { from_port: String, to_port: String },

    /// A consuming port reads exactly one resource.
    #[error("port '{port}' already consumes the output of '{existing}'")]
    TargetAlreadyConnected { port: String, existing: String },

    /// Operation names are unique within a graph.
    #[error("operation '{0}' is already defined")]
    DuplicateOperation(String),

    /// Port names are unique within an operation.
    #[error("operation '{operation}' declares port '{port}' more than once")]
    DuplicatePort { operation: String, port: String },

    /// Operations and ports must be named.
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),
}

impl GraphError {
    /// Stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownPort(_) | Self::UnknownPortName { .. } => ErrorCode::UnknownPort,
            Self::IncompatibleRoles { .. } => ErrorCode::IncompatibleRoles,
            Self::CycleDetected { .. } => ErrorCode::CycleDetected,
            Self::DuplicateConnection { .. } => ErrorCode::DuplicateConnection,
            Self::TargetAlreadyConnected { .. } => ErrorCode::TargetAlreadyConnected,
            Self::DuplicateOperation(_) => ErrorCode::DuplicateOperation,
            Self::DuplicatePort { .. } => ErrorCode::DuplicatePort,
            Self::EmptyName(_) => ErrorCode::EmptyName,
        }
    }

    fn attributes(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::UnknownPort(handle) => vec![("port_index", handle.index().to_string())],
            Self::UnknownPortName { operation, port } => {
                vec![("operation", operation.clone()), ("port", port.clone())]
            }
            Self::IncompatibleRoles {
                from_port,
                from_role,
                to_port,
                to_role,
            } => vec![
                ("source", from_port.clone()),
                ("source_role", from_role.to_string()),
                ("target", to_port.clone()),
                ("target_role", to_role.to_string()),
            ],
            Self::CycleDetected {
                from_port,
                to_port,
                from_operation,
                to_operation,
            } => vec![
                ("source", from_port.clone()),
                ("target", to_port.clone()),
                ("source_operation", from_operation.clone()),
                ("target_operation", to_operation.clone()),
            ],
            Self::DuplicateConnection { from_port, to_port } => {
                vec![("source", from_port.clone()), ("target", to_port.clone())]
            }
            Self::TargetAlreadyConnected { port, existing } => {
                vec![("target", port.clone()), ("existing_source", existing.clone())]
            }
            Self::DuplicateOperation(name) => vec![("operation", name.clone())],
            Self::DuplicatePort { operation, port } => {
                vec![("operation", operation.clone()), ("port", port.clone())]
            }
            Self::EmptyName(what) => vec![("kind", (*what).to_string())],
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            Self::IncompatibleRoles { .. } => {
                Some("connect a producer or modifier output to a consumer or modifier input")
            }
            Self::CycleDetected { .. } => {
                Some("split the work into separate operations or use a persistent terminal resource")
            }
            Self::TargetAlreadyConnected { .. } => {
                Some("insert a modifier or merge operation instead of feeding one input twice")
            }
            _ => None,
        }
    }
}

/// Structured compilation error.
///
/// This is the only channel through which the compiler reports problems.
///
/// ```
/// use framegraph::{CompilerError, ErrorCode};
///
/// let err = CompilerError::new(ErrorCode::EmptyGraph, "graph contains no operations")
///     .with_hint("add at least one operation");
/// assert_eq!(err.to_string(), "[EMPTY_GRAPH] graph contains no operations");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{code}] {message}")]
pub struct CompilerError {
    code: ErrorCode,
    message: String,
    attributes: BTreeMap<String, String>,
    hint: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl CompilerError {
    /// Create an error with a code and a human-readable message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            attributes: BTreeMap::new(),
            hint: None,
            diagnostics: Vec::new(),
        }
    }

    /// Shorthand for an [`ErrorCode::InternalInvariant`] error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalInvariant, message)
    }

    /// Attach a named diagnostic attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.insert(name.into(), value.to_string());
        self
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub(crate) fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Stable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// All diagnostic attributes, ordered by name.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Look up a single attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Optional remediation hint.
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Diagnostics collected by passes that ran before the failure.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl From<GraphError> for CompilerError {
    fn from(err: GraphError) -> Self {
        let mut compiler_error = CompilerError::new(err.code(), err.to_string());
        for (name, value) in err.attributes() {
            compiler_error = compiler_error.with_attribute(name, value);
        }
        if let Some(hint) = err.hint() {
            compiler_error = compiler_error.with_hint(hint);
        }
        compiler_error
    }
}
