//! Typed attachment points on operations.

use std::fmt;

use crate::resource::ResourceConstraint;

/// Handle to a port in a logical graph.
///
/// `PortHandle` is `Copy` and cheap to pass around. It is only valid within
/// the graph that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortHandle(u32);

impl PortHandle {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw arena index of this port.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Role of a port with respect to the resource flowing through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortRole {
    /// Creates a resource.
    Producer,
    /// Reads a resource.
    Consumer,
    /// Reads a resource and passes it on, possibly in a different state.
    Modifier,
}

impl PortRole {
    /// Whether a port with this role may be the source of a connection.
    pub fn can_source(self) -> bool {
        matches!(self, Self::Producer | Self::Modifier)
    }

    /// Whether a port with this role may be the target of a connection.
    pub fn can_target(self) -> bool {
        matches!(self, Self::Consumer | Self::Modifier)
    }

    /// Lower-case role name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Producer => "producer",
            Self::Consumer => "consumer",
            Self::Modifier => "modifier",
        }
    }
}

impl fmt::Display for PortRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Role together with the declared type constraints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// Declares the produced type only.
    Producer(ResourceConstraint),
    /// Declares the consumed type only.
    Consumer(ResourceConstraint),
    /// Declares both; they may differ (e.g. a layout change).
    Modifier {
        /// Constraint on the incoming resource.
        consumes: ResourceConstraint,
        /// Constraint on the outgoing resource.
        produces: ResourceConstraint,
    },
}

impl PortKind {
    /// The role of this port.
    pub fn role(&self) -> PortRole {
        match self {
            Self::Producer(_) => PortRole::Producer,
            Self::Consumer(_) => PortRole::Consumer,
            Self::Modifier { .. } => PortRole::Modifier,
        }
    }

    /// Constraint on the resource read by this port, if it reads one.
    pub fn consumes(&self) -> Option<&ResourceConstraint> {
        match self {
            Self::Producer(_) => None,
            Self::Consumer(c) => Some(c),
            Self::Modifier { consumes, .. } => Some(consumes),
        }
    }

    /// Constraint on the resource written by this port, if it writes one.
    pub fn produces(&self) -> Option<&ResourceConstraint> {
        match self {
            Self::Producer(c) => Some(c),
            Self::Consumer(_) => None,
            Self::Modifier { produces, .. } => Some(produces),
        }
    }
}

/// A typed attachment point on an operation.
///
/// ```
/// use framegraph::{ImageLayout, Port, PrimitiveConstraint};
///
/// let color = Port::producer("color", PrimitiveConstraint::image_in(ImageLayout::ColorAttachment));
/// let history = Port::consumer("history", PrimitiveConstraint::image()).terminal();
/// assert!(history.is_terminal());
/// # let _ = color;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Port {
    name: String,
    kind: PortKind,
    terminal: bool,
}

impl Port {
    /// Create a port from an explicit kind.
    pub fn new(name: impl Into<String>, kind: PortKind) -> Self {
        Self {
            name: name.into(),
            kind,
            terminal: false,
        }
    }

    /// Create a producer port.
    pub fn producer(name: impl Into<String>, produces: impl Into<ResourceConstraint>) -> Self {
        Self::new(name, PortKind::Producer(produces.into()))
    }

    /// Create a consumer port.
    pub fn consumer(name: impl Into<String>, consumes: impl Into<ResourceConstraint>) -> Self {
        Self::new(name, PortKind::Consumer(consumes.into()))
    }

    /// Create a modifier port.
    pub fn modifier(
        name: impl Into<String>,
        consumes: impl Into<ResourceConstraint>,
        produces: impl Into<ResourceConstraint>,
    ) -> Self {
        Self::new(
            name,
            PortKind::Modifier {
                consumes: consumes.into(),
                produces: produces.into(),
            },
        )
    }

    /// Allow this port to stay unconnected.
    ///
    /// Terminal ports are graph inputs or outputs fed by something outside
    /// the graph (a swapchain image, a persistent history buffer...).
    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    /// Port name, unique within its operation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Role and constraints.
    pub fn kind(&self) -> &PortKind {
        &self.kind
    }

    /// Role of this port.
    pub fn role(&self) -> PortRole {
        self.kind.role()
    }

    /// Whether this port may stay unconnected.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}
