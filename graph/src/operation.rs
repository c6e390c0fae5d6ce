//! Operations: named units of GPU work.

use crate::port::Port;

/// Handle to an operation in a logical graph.
///
/// Only valid within the graph that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationHandle(u32);

impl OperationHandle {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw arena index of this operation.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Declarative description of an operation and its ports.
///
/// The operation should be fully configured before it is added to a
/// [`GraphBuilder`](crate::GraphBuilder).
///
/// ```
/// use framegraph::{ImageLayout, Operation, Port, PrimitiveConstraint};
///
/// let tonemap = Operation::new("tonemap")
///     .with_port(Port::consumer("hdr", PrimitiveConstraint::image_in(ImageLayout::ShaderReadOnly)))
///     .with_port(Port::producer("ldr", PrimitiveConstraint::image_in(ImageLayout::ColorAttachment)));
/// assert_eq!(tonemap.ports().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    name: String,
    ports: Vec<Port>,
}

impl Operation {
    /// Create an operation without ports.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ports: Vec::new(),
        }
    }

    /// Add a port.
    pub fn with_port(mut self, port: Port) -> Self {
        self.ports.push(port);
        self
    }

    /// Add a port in place.
    pub fn add_port(&mut self, port: Port) {
        self.ports.push(port);
    }

    /// Operation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared ports in declaration order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Port>) {
        (self.name, self.ports)
    }
}
