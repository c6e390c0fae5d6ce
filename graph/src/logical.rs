//! The logical operation/port graph.
//!
//! [`LogicalGraph`] is the immutable result of
//! [`GraphBuilder::finalize`](crate::GraphBuilder::finalize). Operations,
//! ports and connections live in flat arenas addressed by handles; the
//! operation-level dependency DAG is maintained alongside so cycles are
//! rejected the moment a connection is added.

use std::collections::HashMap;

use framegraph_core::dag::{Dag, NodeIndex};

use crate::error::CompilerError;
use crate::operation::OperationHandle;
use crate::port::{Port, PortHandle};

/// Handle to a connection in a logical graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionHandle(u32);

impl ConnectionHandle {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw arena index of this connection.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A directed edge from a producing port to a consuming port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    source: PortHandle,
    target: PortHandle,
}

impl Connection {
    /// Producer or modifier port the resource comes from.
    pub fn source(&self) -> PortHandle {
        self.source
    }

    /// Consumer or modifier port the resource flows into.
    pub fn target(&self) -> PortHandle {
        self.target
    }
}

/// An operation as stored in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationNode {
    name: String,
    ports: Vec<PortHandle>,
}

impl OperationNode {
    /// Operation name, unique within the graph.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handles of this operation's ports in declaration order.
    pub fn ports(&self) -> &[PortHandle] {
        &self.ports
    }
}

/// Immutable logical graph of operations, ports and connections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicalGraph {
    operations: Vec<OperationNode>,
    operation_names: HashMap<String, OperationHandle>,
    ports: Vec<Port>,
    port_operations: Vec<OperationHandle>,
    connections: Vec<Connection>,
    /// Incoming connection per port; a consuming port reads one resource.
    port_incoming: Vec<Option<ConnectionHandle>>,
    port_outgoing: Vec<Vec<ConnectionHandle>>,
    /// Operation-level dependencies. Node index == operation index.
    operation_dag: Dag,
}

impl LogicalGraph {
    pub(crate) fn push_operation(&mut self, name: String, ports: Vec<Port>) -> OperationHandle {
        let handle = OperationHandle::new(self.operations.len() as u32);
        let node = self.operation_dag.add_node();
        debug_assert_eq!(node.index(), handle.index());

        let mut port_handles = Vec::with_capacity(ports.len());
        for port in ports {
            let port_handle = PortHandle::new(self.ports.len() as u32);
            self.ports.push(port);
            self.port_operations.push(handle);
            self.port_incoming.push(None);
            self.port_outgoing.push(Vec::new());
            port_handles.push(port_handle);
        }

        self.operation_names.insert(name.clone(), handle);
        self.operations.push(OperationNode {
            name,
            ports: port_handles,
        });
        handle
    }

    pub(crate) fn push_connection(&mut self, source: PortHandle, target: PortHandle) -> ConnectionHandle {
        let handle = ConnectionHandle::new(self.connections.len() as u32);
        self.connections.push(Connection { source, target });
        self.port_incoming[target.index()] = Some(handle);
        self.port_outgoing[source.index()].push(handle);
        handle
    }

    pub(crate) fn operation_dag_mut(&mut self) -> &mut Dag {
        &mut self.operation_dag
    }

    /// Number of operations.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Iterate over operations with their handles, in insertion order.
    pub fn operations(&self) -> impl Iterator<Item = (OperationHandle, &OperationNode)> {
        self.operations
            .iter()
            .enumerate()
            .map(|(i, op)| (OperationHandle::new(i as u32), op))
    }

    /// Look up an operation.
    pub fn operation(&self, handle: OperationHandle) -> Option<&OperationNode> {
        self.operations.get(handle.index())
    }

    /// Look up an operation by name.
    pub fn find_operation(&self, name: &str) -> Option<OperationHandle> {
        self.operation_names.get(name).copied()
    }

    /// Number of ports across all operations.
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    /// Iterate over all ports with their handles.
    pub fn ports(&self) -> impl Iterator<Item = (PortHandle, &Port)> {
        self.ports
            .iter()
            .enumerate()
            .map(|(i, port)| (PortHandle::new(i as u32), port))
    }

    /// Look up a port.
    pub fn port(&self, handle: PortHandle) -> Option<&Port> {
        self.ports.get(handle.index())
    }

    /// Check whether `handle` belongs to this graph.
    pub fn contains_port(&self, handle: PortHandle) -> bool {
        handle.index() < self.ports.len()
    }

    /// Operation owning a port.
    pub fn port_operation(&self, handle: PortHandle) -> Option<OperationHandle> {
        self.port_operations.get(handle.index()).copied()
    }

    /// Look up a port by operation name and port name.
    pub fn find_port(&self, operation: &str, port: &str) -> Option<PortHandle> {
        let op = self.operation(self.find_operation(operation)?)?;
        op.ports
            .iter()
            .copied()
            .find(|&handle| self.ports[handle.index()].name() == port)
    }

    /// `operation.port` name for messages and error attributes.
    pub fn qualified_port_name(&self, handle: PortHandle) -> String {
        match (self.port(handle), self.port_operation(handle)) {
            (Some(port), Some(op)) => {
                format!("{}.{}", self.operations[op.index()].name, port.name())
            }
            _ => format!("<port {}>", handle.index()),
        }
    }

    /// Name of the operation owning a port, or an empty string for foreign handles.
    pub fn port_operation_name(&self, handle: PortHandle) -> &str {
        self.port_operation(handle)
            .and_then(|op| self.operation(op))
            .map(OperationNode::name)
            .unwrap_or_default()
    }

    /// All connections in insertion order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Look up a connection.
    pub fn connection(&self, handle: ConnectionHandle) -> Option<&Connection> {
        self.connections.get(handle.index())
    }

    /// The connection feeding a port, if any.
    pub fn incoming(&self, port: PortHandle) -> Option<ConnectionHandle> {
        self.port_incoming.get(port.index()).copied().flatten()
    }

    /// Connections leaving a port.
    pub fn outgoing(&self, port: PortHandle) -> &[ConnectionHandle] {
        self.port_outgoing
            .get(port.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether a port participates in at least one connection.
    pub fn is_connected(&self, port: PortHandle) -> bool {
        self.incoming(port).is_some() || !self.outgoing(port).is_empty()
    }

    /// Operations directly connected into `operation`. Empty for a
    /// foreign handle.
    pub fn operation_dependencies(
        &self,
        operation: OperationHandle,
    ) -> impl Iterator<Item = OperationHandle> + '_ {
        let node = NodeIndex::new(operation.index() as u32);
        let predecessors = if self.operation_dag.contains(node) {
            self.operation_dag.predecessors(node)
        } else {
            &[]
        };
        predecessors
            .iter()
            .map(|node| OperationHandle::new(node.index() as u32))
    }

    /// Operations in an order that respects every connection.
    pub fn operation_order(&self) -> Result<Vec<OperationHandle>, CompilerError> {
        self.operation_dag
            .topological_order()
            .map(|order| {
                order
                    .into_iter()
                    .map(|node| OperationHandle::new(node.index() as u32))
                    .collect()
            })
            .map_err(|stuck| {
                CompilerError::internal("operation graph contains a cycle")
                    .with_attribute("operations", stuck.len())
            })
    }
}
