//! Checks that connected primitive ports agree on what flows between them.

use crate::error::{CompilerError, ErrorCode};
use crate::logical::LogicalGraph;
use crate::pipeline::{CompileContext, CompilerPass, PassId};
use crate::primitive::{PrimitiveGraph, PrimitiveKind, PrimitivePortHandle};
use crate::resource::PrimitiveConstraint;

use super::{PrimitiveExpansionPass, describe_primitive_port};

/// Rejects image/buffer mix-ups, format mismatches and buffers whose
/// usages do not cover what the reader needs.
///
/// A modifier must also pass on the same kind of resource it receives.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResourceCompatibilityPass;

impl CompilerPass for ResourceCompatibilityPass {
    fn name(&self) -> &'static str {
        "resource_compatibility"
    }

    fn dependencies(&self) -> Vec<PassId> {
        vec![PassId::of::<PrimitiveExpansionPass>()]
    }

    fn run(&mut self, ctx: &mut CompileContext) -> Result<(), CompilerError> {
        let graph = ctx.graph();
        let primitive = ctx.require_primitive(self.name())?;
        let checker = Checker { graph, primitive };

        for (handle, port) in primitive.ports() {
            if let PrimitiveKind::Modifier { consumes, produces } = port.kind() {
                if consumes.is_buffer() != produces.is_buffer() {
                    let name = checker.describe(handle);
                    return Err(CompilerError::new(
                        ErrorCode::ResourceKindMismatch,
                        format!(
                            "modifier '{name}' receives a {} but passes on a {}",
                            consumes.kind_name(),
                            produces.kind_name()
                        ),
                    )
                    .with_attribute("port", name)
                    .with_attribute("consumes", consumes.kind_name())
                    .with_attribute("produces", produces.kind_name())
                    .with_hint("a modifier passes on the kind of resource it receives"));
                }
            }
        }

        for edge in primitive.edges() {
            checker.check_edge(edge.source(), edge.target())?;
        }
        Ok(())
    }
}

struct Checker<'a> {
    graph: &'a LogicalGraph,
    primitive: &'a PrimitiveGraph,
}

impl Checker<'_> {
    fn check_edge(
        &self,
        source: PrimitivePortHandle,
        target: PrimitivePortHandle,
    ) -> Result<(), CompilerError> {
        let written = self
            .primitive
            .port(source)
            .and_then(|port| port.kind().produces());
        let read = self
            .primitive
            .port(target)
            .and_then(|port| port.kind().consumes());
        let (Some(written), Some(read)) = (written, read) else {
            return Err(CompilerError::internal(
                "primitive edge does not run from a writing port to a reading port",
            )
            .with_attribute("source", source.index())
            .with_attribute("target", target.index()));
        };

        match (written, read) {
            (PrimitiveConstraint::Image(w), PrimitiveConstraint::Image(r)) => {
                match (w.format, r.format) {
                    (Some(wf), Some(rf)) if wf != rf => Err(self
                        .mismatch(ErrorCode::FormatMismatch, source, target, written, read)
                        .with_attribute("source_format", format!("{wf:?}"))
                        .with_attribute("target_format", format!("{rf:?}"))),
                    _ => Ok(()),
                }
            }
            (PrimitiveConstraint::Buffer(w), PrimitiveConstraint::Buffer(r)) => {
                if w.usage.is_empty() || w.usage.contains(r.usage) {
                    Ok(())
                } else {
                    Err(self
                        .mismatch(ErrorCode::BufferUsageMismatch, source, target, written, read)
                        .with_attribute("source_usage", format!("{:?}", w.usage))
                        .with_attribute("target_usage", format!("{:?}", r.usage)))
                }
            }
            _ => Err(self
                .mismatch(ErrorCode::ResourceKindMismatch, source, target, written, read)
                .with_hint("images and buffers cannot be connected to each other")),
        }
    }

    fn mismatch(
        &self,
        code: ErrorCode,
        source: PrimitivePortHandle,
        target: PrimitivePortHandle,
        written: &PrimitiveConstraint,
        read: &PrimitiveConstraint,
    ) -> CompilerError {
        let source_name = self.describe(source);
        let target_name = self.describe(target);
        let message = match code {
            ErrorCode::FormatMismatch => {
                format!("'{source_name}' and '{target_name}' declare different image formats")
            }
            ErrorCode::BufferUsageMismatch => {
                format!("'{source_name}' does not provide the buffer usages '{target_name}' needs")
            }
            _ => format!(
                "'{source_name}' provides a resource of kind '{}' but '{target_name}' expects '{}'",
                written.kind_name(),
                read.kind_name()
            ),
        };
        CompilerError::new(code, message)
            .with_attribute("source", source_name)
            .with_attribute("target", target_name)
            .with_attribute("source_kind", written.kind_name())
            .with_attribute("target_kind", read.kind_name())
    }

    fn describe(&self, handle: PrimitivePortHandle) -> String {
        describe_primitive_port(self.graph, self.primitive, handle)
    }
}
