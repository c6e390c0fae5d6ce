//! The result of a successful compilation.

use crate::error::CompilerError;
use crate::logical::LogicalGraph;
use crate::operation::OperationHandle;
use crate::pipeline::Diagnostic;
use crate::primitive::{PrimitiveConnection, PrimitiveGraph, PrimitivePort, PrimitivePortHandle};
use crate::transition::{Transition, TransitionMap};

/// Immutable compiled render graph.
///
/// Holds the logical graph, its primitive expansion, one layout transition
/// per image primitive port and the diagnostics gathered while compiling.
/// Nothing mutates it after construction, so it can be shared across
/// threads and read by several schedulers at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledGraph {
    logical: LogicalGraph,
    primitive: PrimitiveGraph,
    transitions: TransitionMap,
    operation_order: Vec<OperationHandle>,
    diagnostics: Vec<Diagnostic>,
}

static_assertions::assert_impl_all!(CompiledGraph: Send, Sync);

impl CompiledGraph {
    pub(crate) fn new(
        logical: LogicalGraph,
        primitive: PrimitiveGraph,
        transitions: TransitionMap,
        diagnostics: Vec<Diagnostic>,
    ) -> Result<Self, CompilerError> {
        let checked = Self::check_transitions(&primitive, &transitions)
            .and_then(|()| logical.operation_order());
        match checked {
            Ok(operation_order) => Ok(Self {
                logical,
                primitive,
                transitions,
                operation_order,
                diagnostics,
            }),
            Err(err) => Err(err.with_diagnostics(diagnostics)),
        }
    }

    /// Every image port has exactly one descriptor and no buffer port has one.
    fn check_transitions(
        primitive: &PrimitiveGraph,
        transitions: &TransitionMap,
    ) -> Result<(), CompilerError> {
        if transitions.port_count() != primitive.len() {
            return Err(CompilerError::internal(
                "transition map does not cover the primitive graph",
            )
            .with_attribute("primitive_ports", primitive.len())
            .with_attribute("transition_slots", transitions.port_count()));
        }

        for (handle, port) in primitive.ports() {
            let is_buffer = port.kind().is_buffer();
            let recorded = transitions.get(handle).is_some();
            if is_buffer == recorded {
                let message = if is_buffer {
                    "buffer primitive port has a layout transition"
                } else {
                    "image primitive port has no layout transition"
                };
                return Err(CompilerError::internal(message)
                    .with_attribute("primitive_port", handle.index())
                    .with_attribute("subresource", port.subresource()));
            }
        }
        Ok(())
    }

    /// The logical graph this was compiled from.
    pub fn logical(&self) -> &LogicalGraph {
        &self.logical
    }

    /// The primitive graph.
    pub fn primitive_graph(&self) -> &PrimitiveGraph {
        &self.primitive
    }

    /// Iterate over all primitive ports.
    pub fn primitive_ports(&self) -> impl Iterator<Item = (PrimitivePortHandle, &PrimitivePort)> {
        self.primitive.ports()
    }

    /// A single primitive port.
    pub fn primitive_port(&self, handle: PrimitivePortHandle) -> Option<&PrimitivePort> {
        self.primitive.port(handle)
    }

    /// Primitive ports of every port of `operation`, in declaration order.
    pub fn primitive_ports_of(&self, operation: OperationHandle) -> Vec<PrimitivePortHandle> {
        self.logical
            .operation(operation)
            .map(|op| {
                op.ports()
                    .iter()
                    .flat_map(|&port| self.primitive.ports_of(port).iter().copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up a primitive port by operation, port and sub-resource name.
    pub fn find_primitive_port(
        &self,
        operation: &str,
        port: &str,
        subresource: &str,
    ) -> Option<PrimitivePortHandle> {
        let port = self.logical.find_port(operation, port)?;
        self.primitive.find(port, subresource)
    }

    /// Layout transition of an image primitive port. `None` for buffers.
    pub fn transition(&self, handle: PrimitivePortHandle) -> Option<Transition> {
        self.transitions.get(handle)
    }

    /// All transition descriptors, indexed by primitive port.
    pub fn transitions(&self) -> &TransitionMap {
        &self.transitions
    }

    /// Edges of the primitive DAG.
    pub fn primitive_edges(&self) -> &[PrimitiveConnection] {
        self.primitive.edges()
    }

    /// Operations in dependency order.
    pub fn operation_order(&self) -> &[OperationHandle] {
        &self.operation_order
    }

    /// Notes and warnings emitted during compilation.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
