//! Layout transition inference.
//!
//! Layouts are propagated forward through the primitive graph starting at
//! every root port (no incoming edge) with [`ImageLayout::Undefined`]:
//!
//! - producers must declare the layout they write in and record `Constant`;
//! - consumers record `Pre(incoming, required)` when they need a different
//!   layout, `Constant(incoming)` otherwise, and pass `incoming` on unchanged;
//! - modifiers use their declared entry layout (or the incoming one) while
//!   running, leave the image in their declared exit layout (or the entry
//!   one) and record the matching [`Transition`].
//!
//! Buffer ports carry no layout and are skipped along with everything
//! downstream of them. Sub-resources left unmatched by expansion (only
//! possible under `OrphanPolicy::Undefined`) are roots and start from
//! `Undefined`.

use crate::error::{CompilerError, ErrorCode};
use crate::layout::ImageLayout;
use crate::logical::LogicalGraph;
use crate::pipeline::{CompileContext, CompilerPass, Diagnostic, PassId};
use crate::primitive::{PrimitiveGraph, PrimitiveKind, PrimitivePortHandle};
use crate::resource::PrimitiveConstraint;
use crate::transition::{Transition, TransitionMap};

use super::{PrimitiveExpansionPass, ResourceCompatibilityPass, describe_primitive_port};

/// Records one [`Transition`] per image primitive port.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayoutInferencePass;

impl CompilerPass for LayoutInferencePass {
    fn name(&self) -> &'static str {
        "layout_inference"
    }

    fn dependencies(&self) -> Vec<PassId> {
        vec![
            PassId::of::<PrimitiveExpansionPass>(),
            PassId::of::<ResourceCompatibilityPass>(),
        ]
    }

    fn run(&mut self, ctx: &mut CompileContext) -> Result<(), CompilerError> {
        let (transitions, diagnostics) = {
            let primitive = ctx.require_primitive(self.name())?;
            let mut inference = Inference {
                pass: self.name(),
                graph: ctx.graph(),
                primitive,
                warn_undefined_reads: ctx.config().warn_undefined_reads,
                transitions: TransitionMap::new(primitive.len()),
                diagnostics: Vec::new(),
            };

            inference.propagate()?;
            (inference.transitions, inference.diagnostics)
        };

        for diagnostic in diagnostics {
            ctx.push_diagnostic(diagnostic);
        }
        ctx.set_transitions(transitions);
        Ok(())
    }
}

struct Inference<'a> {
    pass: &'static str,
    graph: &'a LogicalGraph,
    primitive: &'a PrimitiveGraph,
    warn_undefined_reads: bool,
    transitions: TransitionMap,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Inference<'a> {
    /// Depth-first walk from every root, in root and edge order.
    fn propagate(&mut self) -> Result<(), CompilerError> {
        let primitive = self.primitive;
        let roots: Vec<_> = primitive.roots().collect();
        let mut pending: Vec<(PrimitivePortHandle, ImageLayout)> = roots
            .into_iter()
            .rev()
            .map(|root| (root, ImageLayout::Undefined))
            .collect();

        while let Some((handle, then)) = pending.pop() {
            let Some(leaving) = self.visit(handle, then)? else {
                continue;
            };
            pending.extend(
                primitive
                    .outgoing(handle)
                    .iter()
                    .rev()
                    .map(|&next| (next, leaving)),
            );
        }
        Ok(())
    }

    /// Records the transition of one port and returns the layout it hands
    /// downstream, or `None` for buffers.
    fn visit(
        &mut self,
        handle: PrimitivePortHandle,
        then: ImageLayout,
    ) -> Result<Option<ImageLayout>, CompilerError> {
        let primitive = self.primitive;
        let port = primitive.port(handle).ok_or_else(|| {
            CompilerError::internal("primitive edge refers to a missing port")
                .with_attribute("primitive_port", handle.index())
        })?;

        let leaving = match *port.kind() {
            PrimitiveKind::Producer(PrimitiveConstraint::Image(image)) => {
                let Some(required) = image.layout else {
                    let name = self.describe(handle);
                    return Err(CompilerError::new(
                        ErrorCode::ProducerMissingLayout,
                        format!("producer '{name}' does not declare the layout it writes"),
                    )
                    .with_attribute("operation", self.graph.port_operation_name(port.parent()))
                    .with_attribute("port", self.graph.qualified_port_name(port.parent()))
                    .with_attribute("subresource", port.subresource())
                    .with_hint("declare the output layout, e.g. PrimitiveConstraint::image_in(..)"));
                };
                self.record(handle, Transition::Constant(required));
                required
            }
            PrimitiveKind::Consumer(PrimitiveConstraint::Image(image)) => {
                self.check_undefined_read(handle, then, image.layout);
                let transition = match image.layout {
                    Some(required) if required != then => Transition::Pre {
                        from: then,
                        to: required,
                    },
                    _ => Transition::Constant(then),
                };
                self.record(handle, transition);
                then
            }
            PrimitiveKind::Modifier {
                consumes: PrimitiveConstraint::Image(entry),
                produces,
            } => {
                self.check_undefined_read(handle, then, entry.layout);
                let during = entry.layout.unwrap_or(then);
                let leaving = produces.layout().unwrap_or(during);
                self.record(handle, Transition::select(then, during, leaving));
                leaving
            }
            PrimitiveKind::Producer(PrimitiveConstraint::Buffer(_))
            | PrimitiveKind::Consumer(PrimitiveConstraint::Buffer(_))
            | PrimitiveKind::Modifier {
                consumes: PrimitiveConstraint::Buffer(_),
                ..
            } => return Ok(None),
        };
        Ok(Some(leaving))
    }

    fn record(&mut self, handle: PrimitivePortHandle, transition: Transition) {
        log::trace!("{}: {}", self.describe(handle), transition);
        self.transitions.set(handle, transition);
    }

    /// Reading a never-written image is legal but usually a mistake, unless
    /// the port is fed from outside the graph.
    fn check_undefined_read(
        &mut self,
        handle: PrimitivePortHandle,
        then: ImageLayout,
        required: Option<ImageLayout>,
    ) {
        let reads_defined = required.is_some_and(|layout| layout != ImageLayout::Undefined);
        if !self.warn_undefined_reads
            || then != ImageLayout::Undefined
            || !reads_defined
            || self.is_terminal(handle)
        {
            return;
        }
        let name = self.describe(handle);
        self.diagnostics.push(
            Diagnostic::warning(self.pass, format!("'{name}' reads undefined contents"))
                .with_attribute("port", name),
        );
    }

    fn is_terminal(&self, handle: PrimitivePortHandle) -> bool {
        self.primitive
            .port(handle)
            .and_then(|port| self.graph.port(port.parent()))
            .is_some_and(|port| port.is_terminal())
    }

    fn describe(&self, handle: PrimitivePortHandle) -> String {
        describe_primitive_port(self.graph, self.primitive, handle)
    }
}
