//! Splits logical ports into primitive ports and mirrors connections.

use framegraph_core::{profile_plot, profile_scope};

use crate::config::OrphanPolicy;
use crate::error::{CompilerError, ErrorCode};
use crate::logical::{ConnectionHandle, LogicalGraph};
use crate::operation::OperationHandle;
use crate::pipeline::{CompileContext, CompilerPass, PassId};
use crate::port::{PortHandle, PortKind};
use crate::primitive::{PrimitiveGraph, PrimitiveKind, PrimitivePort};
use crate::resource::{CompositeConstraint, MAIN_SUBRESOURCE, PrimitiveConstraint, ResourceConstraint};

use super::ConnectivityPass;

/// Builds the [`PrimitiveGraph`].
///
/// A primitive constraint yields one `"Main"` primitive port, a composite
/// one primitive port per sub-resource. Each logical connection becomes one
/// primitive connection per sub-resource name present on both ends. Under
/// [`OrphanPolicy::Error`] a name missing on the target end fails with
/// `ORPHANED_PRIMITIVE_PORT`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrimitiveExpansionPass;

impl CompilerPass for PrimitiveExpansionPass {
    fn name(&self) -> &'static str {
        "primitive_expansion"
    }

    fn dependencies(&self) -> Vec<PassId> {
        vec![PassId::of::<ConnectivityPass>()]
    }

    fn run(&mut self, ctx: &mut CompileContext) -> Result<(), CompilerError> {
        let primitive = expand(ctx.graph(), ctx.config().orphan_policy)?;
        log::trace!(
            "Expanded {} logical ports into {} primitive ports with {} edges",
            ctx.graph().port_count(),
            primitive.len(),
            primitive.edges().len()
        );
        profile_plot!("primitive_ports", primitive.len());
        ctx.set_primitive(primitive);
        Ok(())
    }
}

fn expand(graph: &LogicalGraph, orphans: OrphanPolicy) -> Result<PrimitiveGraph, CompilerError> {
    let mut primitive = PrimitiveGraph::new(graph.port_count());

    {
        profile_scope!("expand_ports");
        for (handle, port) in graph.ports() {
            let operation = graph
                .port_operation(handle)
                .ok_or_else(|| CompilerError::internal("port without an owning operation"))?;
            let mut expander = PortExpander {
                graph,
                primitive: &mut primitive,
                port: handle,
                operation,
            };
            match port.kind() {
                PortKind::Producer(produces) => {
                    expander.expand_single(produces, PrimitiveKind::Producer)?;
                }
                PortKind::Consumer(consumes) => {
                    expander.expand_single(consumes, PrimitiveKind::Consumer)?;
                }
                PortKind::Modifier { consumes, produces } => {
                    expander.expand_modifier(consumes, produces)?;
                }
            }
        }
    }

    profile_scope!("mirror_connections");
    for (index, connection) in graph.connections().iter().enumerate() {
        let sources = primitive.ports_of(connection.source());
        let targets = primitive.ports_of(connection.target());
        if sources.len() != targets.len() {
            return Err(CompilerError::new(
                ErrorCode::CardinalityMismatch,
                format!(
                    "'{}' provides {} sub-resources but '{}' expects {}",
                    graph.qualified_port_name(connection.source()),
                    sources.len(),
                    graph.qualified_port_name(connection.target()),
                    targets.len()
                ),
            )
            .with_attribute("source", graph.qualified_port_name(connection.source()))
            .with_attribute("target", graph.qualified_port_name(connection.target()))
            .with_attribute("source_count", sources.len())
            .with_attribute("target_count", targets.len())
            .with_hint("both ends of a connection must declare the same sub-resources"));
        }

        let mut pairs = Vec::with_capacity(sources.len());
        for &source in sources {
            let port = primitive
                .port(source)
                .ok_or_else(|| CompilerError::internal("primitive port index out of range"))?;
            match primitive.find(connection.target(), port.subresource()) {
                Some(target) => pairs.push((source, target)),
                None if orphans == OrphanPolicy::Error => {
                    return Err(unmatched_subresource(
                        graph,
                        connection.source(),
                        connection.target(),
                        port.subresource(),
                    ));
                }
                None => {}
            }
        }
        let parent = ConnectionHandle::new(index as u32);
        for (source, target) in pairs {
            primitive.add_edge(source, target, parent);
        }
    }

    Ok(primitive)
}

fn unmatched_subresource(
    graph: &LogicalGraph,
    source: PortHandle,
    target: PortHandle,
    subresource: &str,
) -> CompilerError {
    let source_name = graph.qualified_port_name(source);
    let target_name = graph.qualified_port_name(target);
    CompilerError::new(
        ErrorCode::OrphanedPrimitivePort,
        format!("sub-resource '{source_name}[{subresource}]' has no counterpart on '{target_name}'"),
    )
    .with_attribute("operation", graph.port_operation_name(source))
    .with_attribute("port", source_name)
    .with_attribute("target", target_name)
    .with_attribute("subresource", subresource)
    .with_hint(
        "use the same sub-resource names on both ends of the connection, \
         or compile with OrphanPolicy::Undefined",
    )
}

struct PortExpander<'a> {
    graph: &'a LogicalGraph,
    primitive: &'a mut PrimitiveGraph,
    port: PortHandle,
    operation: OperationHandle,
}

impl PortExpander<'_> {
    fn expand_single(
        &mut self,
        constraint: &ResourceConstraint,
        make: fn(PrimitiveConstraint) -> PrimitiveKind,
    ) -> Result<(), CompilerError> {
        if let ResourceConstraint::Composite(composite) = constraint {
            self.check_unique(composite)?;
        }
        for (name, sub) in constraint.subresources() {
            self.add(name, make(*sub))?;
        }
        Ok(())
    }

    fn expand_modifier(
        &mut self,
        consumes: &ResourceConstraint,
        produces: &ResourceConstraint,
    ) -> Result<(), CompilerError> {
        match (consumes, produces) {
            (ResourceConstraint::Primitive(consumes), ResourceConstraint::Primitive(produces)) => {
                self.add(
                    MAIN_SUBRESOURCE,
                    PrimitiveKind::Modifier {
                        consumes: *consumes,
                        produces: *produces,
                    },
                )
            }
            (ResourceConstraint::Composite(consumes), ResourceConstraint::Composite(produces)) => {
                self.check_unique(consumes)?;
                self.check_unique(produces)?;
                for (name, entry) in consumes.iter() {
                    // Sub-resources present on one side only get no primitive port
                    if let Some(exit) = produces.get(name) {
                        self.add(
                            name,
                            PrimitiveKind::Modifier {
                                consumes: *entry,
                                produces: *exit,
                            },
                        )?;
                    }
                }
                Ok(())
            }
            _ => Err(CompilerError::new(
                ErrorCode::MixedModifierConstraint,
                format!(
                    "modifier port '{}' consumes a {} resource but produces a {} one",
                    self.graph.qualified_port_name(self.port),
                    consumes.shape_name(),
                    produces.shape_name()
                ),
            )
            .with_attribute("operation", self.graph.port_operation_name(self.port))
            .with_attribute("port", self.port_name())
            .with_attribute("consumes", consumes.shape_name())
            .with_attribute("produces", produces.shape_name())
            .with_hint("declare both sides as primitive or both as composite")),
        }
    }

    fn check_unique(&self, composite: &CompositeConstraint) -> Result<(), CompilerError> {
        let names: Vec<&str> = composite.iter().map(|(name, _)| name).collect();
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(self.duplicate_subresource(name));
            }
        }
        Ok(())
    }

    fn add(&mut self, subresource: &str, kind: PrimitiveKind) -> Result<(), CompilerError> {
        self.primitive
            .add_port(PrimitivePort::new(self.port, self.operation, subresource, kind))
            .map(|_| ())
            .ok_or_else(|| self.duplicate_subresource(subresource))
    }

    fn duplicate_subresource(&self, subresource: &str) -> CompilerError {
        CompilerError::new(
            ErrorCode::DuplicateSubresource,
            format!(
                "port '{}' declares sub-resource '{}' more than once",
                self.graph.qualified_port_name(self.port),
                subresource
            ),
        )
        .with_attribute("operation", self.graph.port_operation_name(self.port))
        .with_attribute("port", self.port_name())
        .with_attribute("subresource", subresource)
    }

    fn port_name(&self) -> &str {
        self.graph
            .port(self.port)
            .map(|port| port.name())
            .unwrap_or_default()
    }
}
