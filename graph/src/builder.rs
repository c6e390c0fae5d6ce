//! Incremental construction of a [`LogicalGraph`].
//!
//! ```
//! use framegraph::{GraphBuilder, ImageLayout, Operation, Port, PrimitiveConstraint};
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_operation(
//!     Operation::new("shade")
//!         .with_port(Port::producer("color", PrimitiveConstraint::image_in(ImageLayout::ColorAttachment))),
//! )?;
//! builder.add_operation(
//!     Operation::new("present")
//!         .with_port(Port::consumer("image", PrimitiveConstraint::image_in(ImageLayout::PresentSrc))),
//! )?;
//! builder.connect_named(("shade", "color"), ("present", "image"))?;
//!
//! let compiled = builder.compile()?;
//! assert_eq!(compiled.primitive_edges().len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::HashSet;

use framegraph_core::dag::NodeIndex;
use framegraph_core::profile_function;

use crate::compiled::CompiledGraph;
use crate::config::CompilerConfig;
use crate::error::{CompilerError, GraphError};
use crate::logical::{ConnectionHandle, LogicalGraph};
use crate::operation::{Operation, OperationHandle};
use crate::pipeline::{CompileContext, PassPipeline};
use crate::port::PortHandle;

/// Builds a logical graph one operation and connection at a time.
///
/// Structural mistakes (unknown ports, role mismatches, cycles) are rejected
/// immediately, so a finalized graph is always a DAG.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: LogicalGraph,
}

impl GraphBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The graph built so far.
    pub fn graph(&self) -> &LogicalGraph {
        &self.graph
    }

    /// Add an operation and all of its ports.
    ///
    /// Nothing is added if the operation is rejected.
    pub fn add_operation(&mut self, operation: Operation) -> Result<OperationHandle, GraphError> {
        let (name, ports) = operation.into_parts();

        if name.is_empty() {
            return Err(GraphError::EmptyName("operation"));
        }
        if self.graph.find_operation(&name).is_some() {
            return Err(GraphError::DuplicateOperation(name));
        }

        let mut seen = HashSet::with_capacity(ports.len());
        for port in &ports {
            if port.name().is_empty() {
                return Err(GraphError::EmptyName("port"));
            }
            if !seen.insert(port.name()) {
                return Err(GraphError::DuplicatePort {
                    operation: name.clone(),
                    port: port.name().to_string(),
                });
            }
        }

        log::trace!("Adding operation '{}' with {} ports", name, ports.len());
        Ok(self.graph.push_operation(name, ports))
    }

    /// Look up a port of `operation` by name.
    pub fn port(&self, operation: OperationHandle, name: &str) -> Option<PortHandle> {
        let op = self.graph.operation(operation)?;
        op.ports()
            .iter()
            .copied()
            .find(|&handle| self.graph.port(handle).is_some_and(|port| port.name() == name))
    }

    /// Look up a port by operation name and port name.
    pub fn find_port(&self, operation: &str, port: &str) -> Option<PortHandle> {
        self.graph.find_port(operation, port)
    }

    /// Connect a producing port to a consuming port.
    pub fn connect(
        &mut self,
        source: PortHandle,
        target: PortHandle,
    ) -> Result<ConnectionHandle, GraphError> {
        let (Some(source_port), Some(target_port)) = (self.graph.port(source), self.graph.port(target))
        else {
            let unknown = if self.graph.contains_port(source) {
                target
            } else {
                source
            };
            return Err(GraphError::UnknownPort(unknown));
        };

        let (source_role, target_role) = (source_port.role(), target_port.role());
        if !source_role.can_source() || !target_role.can_target() {
            return Err(GraphError::IncompatibleRoles {
                from_port: self.graph.qualified_port_name(source),
                from_role: source_role,
                to_port: self.graph.qualified_port_name(target),
                to_role: target_role,
            });
        }

        if let Some(existing) = self.graph.incoming(target).and_then(|c| self.graph.connection(c)) {
            if existing.source() == source {
                return Err(GraphError::DuplicateConnection {
                    from_port: self.graph.qualified_port_name(source),
                    to_port: self.graph.qualified_port_name(target),
                });
            }
            return Err(GraphError::TargetAlreadyConnected {
                port: self.graph.qualified_port_name(target),
                existing: self.graph.qualified_port_name(existing.source()),
            });
        }

        let (Some(source_op), Some(target_op)) = (
            self.graph.port_operation(source),
            self.graph.port_operation(target),
        ) else {
            return Err(GraphError::UnknownPort(source));
        };

        let from = NodeIndex::new(source_op.index() as u32);
        let to = NodeIndex::new(target_op.index() as u32);
        if self.graph.operation_dag_mut().try_add_edge(from, to).is_err() {
            return Err(GraphError::CycleDetected {
                from_port: self.graph.qualified_port_name(source),
                to_port: self.graph.qualified_port_name(target),
                from_operation: self.graph.port_operation_name(source).to_string(),
                to_operation: self.graph.port_operation_name(target).to_string(),
            });
        }

        log::trace!(
            "Connected '{}' -> '{}'",
            self.graph.qualified_port_name(source),
            self.graph.qualified_port_name(target)
        );
        Ok(self.graph.push_connection(source, target))
    }

    /// [`connect`](Self::connect) using `(operation, port)` name pairs.
    pub fn connect_named(
        &mut self,
        source: (&str, &str),
        target: (&str, &str),
    ) -> Result<ConnectionHandle, GraphError> {
        let lookup = |(operation, port): (&str, &str)| {
            self.find_port(operation, port)
                .ok_or_else(|| GraphError::UnknownPortName {
                    operation: operation.to_string(),
                    port: port.to_string(),
                })
        };
        let source = lookup(source)?;
        let target = lookup(target)?;
        self.connect(source, target)
    }

    /// Freeze the graph.
    pub fn finalize(self) -> LogicalGraph {
        self.graph
    }

    /// Compile with the built-in passes and the default configuration.
    pub fn compile(self) -> Result<CompiledGraph, CompilerError> {
        self.compile_with(PassPipeline::with_default_passes(), CompilerConfig::default())
    }

    /// Compile with a custom pipeline and configuration.
    ///
    /// The pipeline must include [`PrimitiveExpansionPass`](crate::passes::PrimitiveExpansionPass)
    /// and [`LayoutInferencePass`](crate::passes::LayoutInferencePass) for a
    /// compiled graph to be produced.
    pub fn compile_with(
        self,
        mut pipeline: PassPipeline,
        config: CompilerConfig,
    ) -> Result<CompiledGraph, CompilerError> {
        profile_function!();

        let mut ctx = CompileContext::new(self.finalize(), config);
        pipeline.run(&mut ctx)?;
        ctx.into_compiled()
    }
}
