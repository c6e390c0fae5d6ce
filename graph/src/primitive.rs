//! The primitive graph: logical ports split into indivisible resources.
//!
//! Every logical port expands into one [`PrimitivePort`] per sub-resource
//! (a single `"Main"` port for primitive constraints). Each primitive port
//! refers back to its parent logical port by handle; ownership stays with
//! the compiled graph.

use crate::logical::ConnectionHandle;
use crate::operation::OperationHandle;
use crate::port::{PortHandle, PortRole};
use crate::resource::PrimitiveConstraint;

/// Handle to a primitive port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitivePortHandle(u32);

impl PrimitivePortHandle {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw arena index of this primitive port.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Role and sub-constraints of a primitive port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Producer(PrimitiveConstraint),
    Consumer(PrimitiveConstraint),
    Modifier {
        consumes: PrimitiveConstraint,
        produces: PrimitiveConstraint,
    },
}

impl PrimitiveKind {
    pub fn role(&self) -> PortRole {
        match self {
            Self::Producer(_) => PortRole::Producer,
            Self::Consumer(_) => PortRole::Consumer,
            Self::Modifier { .. } => PortRole::Modifier,
        }
    }

    /// Constraint on the incoming resource, if this port reads one.
    pub fn consumes(&self) -> Option<&PrimitiveConstraint> {
        match self {
            Self::Producer(_) => None,
            Self::Consumer(c) | Self::Modifier { consumes: c, .. } => Some(c),
        }
    }

    /// Constraint on the outgoing resource, if this port writes one.
    pub fn produces(&self) -> Option<&PrimitiveConstraint> {
        match self {
            Self::Consumer(_) => None,
            Self::Producer(c) | Self::Modifier { produces: c, .. } => Some(c),
        }
    }

    /// Whether the resource flowing through this port is a buffer.
    ///
    /// Modifiers are judged by the resource they receive.
    pub fn is_buffer(&self) -> bool {
        match self {
            Self::Producer(c) | Self::Consumer(c) | Self::Modifier { consumes: c, .. } => {
                c.is_buffer()
            }
        }
    }
}

/// One indivisible resource slot of a logical port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrimitivePort {
    parent: PortHandle,
    operation: OperationHandle,
    subresource: String,
    kind: PrimitiveKind,
}

impl PrimitivePort {
    pub(crate) fn new(
        parent: PortHandle,
        operation: OperationHandle,
        subresource: impl Into<String>,
        kind: PrimitiveKind,
    ) -> Self {
        Self {
            parent,
            operation,
            subresource: subresource.into(),
            kind,
        }
    }

    /// Logical port this primitive port was expanded from.
    pub fn parent(&self) -> PortHandle {
        self.parent
    }

    /// Operation owning the parent port.
    pub fn operation(&self) -> OperationHandle {
        self.operation
    }

    /// Sub-resource name, `"Main"` for primitive-constrained ports.
    pub fn subresource(&self) -> &str {
        &self.subresource
    }

    pub fn kind(&self) -> &PrimitiveKind {
        &self.kind
    }
}

/// Edge between two primitive ports sharing a sub-resource name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveConnection {
    source: PrimitivePortHandle,
    target: PrimitivePortHandle,
    parent: ConnectionHandle,
}

impl PrimitiveConnection {
    pub fn source(&self) -> PrimitivePortHandle {
        self.source
    }

    pub fn target(&self) -> PrimitivePortHandle {
        self.target
    }

    /// Logical connection this edge mirrors.
    pub fn parent(&self) -> ConnectionHandle {
        self.parent
    }
}

/// DAG of primitive ports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimitiveGraph {
    ports: Vec<PrimitivePort>,
    /// Indexed by logical port.
    by_parent: Vec<Vec<PrimitivePortHandle>>,
    edges: Vec<PrimitiveConnection>,
    incoming: Vec<Vec<PrimitivePortHandle>>,
    outgoing: Vec<Vec<PrimitivePortHandle>>,
}

impl PrimitiveGraph {
    pub(crate) fn new(logical_port_count: usize) -> Self {
        Self {
            by_parent: vec![Vec::new(); logical_port_count],
            ..Self::default()
        }
    }

    /// Register a primitive port.
    ///
    /// Returns `None` when the parent already has a port with this
    /// sub-resource name, or the parent handle is out of range.
    pub(crate) fn add_port(&mut self, port: PrimitivePort) -> Option<PrimitivePortHandle> {
        if self.find(port.parent, &port.subresource).is_some() {
            return None;
        }
        let siblings = self.by_parent.get_mut(port.parent.index())?;
        let handle = PrimitivePortHandle::new(self.ports.len() as u32);
        siblings.push(handle);
        self.ports.push(port);
        self.incoming.push(Vec::new());
        self.outgoing.push(Vec::new());
        Some(handle)
    }

    pub(crate) fn add_edge(
        &mut self,
        source: PrimitivePortHandle,
        target: PrimitivePortHandle,
        parent: ConnectionHandle,
    ) {
        self.edges.push(PrimitiveConnection {
            source,
            target,
            parent,
        });
        self.outgoing[source.index()].push(target);
        self.incoming[target.index()].push(source);
    }

    /// Number of primitive ports.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Returns true if there are no primitive ports.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Iterate over primitive ports with their handles.
    pub fn ports(&self) -> impl Iterator<Item = (PrimitivePortHandle, &PrimitivePort)> {
        self.ports
            .iter()
            .enumerate()
            .map(|(i, port)| (PrimitivePortHandle::new(i as u32), port))
    }

    pub fn port(&self, handle: PrimitivePortHandle) -> Option<&PrimitivePort> {
        self.ports.get(handle.index())
    }

    /// Primitive ports expanded from a logical port, in sub-resource order.
    pub fn ports_of(&self, logical: PortHandle) -> &[PrimitivePortHandle] {
        self.by_parent
            .get(logical.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Find the primitive port of `logical` named `subresource`.
    pub fn find(&self, logical: PortHandle, subresource: &str) -> Option<PrimitivePortHandle> {
        self.ports_of(logical)
            .iter()
            .copied()
            .find(|handle| self.ports[handle.index()].subresource == subresource)
    }

    /// All edges in creation order.
    pub fn edges(&self) -> &[PrimitiveConnection] {
        &self.edges
    }

    /// Ports feeding `handle`.
    pub fn incoming(&self, handle: PrimitivePortHandle) -> &[PrimitivePortHandle] {
        self.incoming
            .get(handle.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Ports fed by `handle`.
    pub fn outgoing(&self, handle: PrimitivePortHandle) -> &[PrimitivePortHandle] {
        self.outgoing
            .get(handle.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Ports with no incoming edge, in port order.
    pub fn roots(&self) -> impl Iterator<Item = PrimitivePortHandle> + '_ {
        self.incoming
            .iter()
            .enumerate()
            .filter(|(_, sources)| sources.is_empty())
            .map(|(i, _)| PrimitivePortHandle::new(i as u32))
    }
}
