//! Whole-graph structural checks.

use crate::error::{CompilerError, ErrorCode};
use crate::pipeline::{CompileContext, CompilerPass, Diagnostic, PassId};

/// Rejects graphs without operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonEmptyGraphPass;

impl CompilerPass for NonEmptyGraphPass {
    fn name(&self) -> &'static str {
        "non_empty_graph"
    }

    fn run(&mut self, ctx: &mut CompileContext) -> Result<(), CompilerError> {
        if ctx.graph().operation_count() == 0 {
            return Err(
                CompilerError::new(ErrorCode::EmptyGraph, "graph contains no operations")
                    .with_hint("add at least one operation before compiling"),
            );
        }
        Ok(())
    }
}

/// Requires every non-terminal port to take part in a connection.
///
/// Unconnected terminal ports are reported as notes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConnectivityPass;

impl CompilerPass for ConnectivityPass {
    fn name(&self) -> &'static str {
        "connectivity"
    }

    fn dependencies(&self) -> Vec<PassId> {
        vec![PassId::of::<NonEmptyGraphPass>()]
    }

    fn run(&mut self, ctx: &mut CompileContext) -> Result<(), CompilerError> {
        let mut notes = Vec::new();
        {
            let graph = ctx.graph();
            for (handle, port) in graph.ports() {
                if graph.is_connected(handle) {
                    continue;
                }
                let operation = graph.port_operation_name(handle);
                if !port.is_terminal() {
                    return Err(CompilerError::new(
                        ErrorCode::DisconnectedPort,
                        format!(
                            "{} port '{}' is not connected",
                            port.role(),
                            graph.qualified_port_name(handle)
                        ),
                    )
                    .with_attribute("operation", operation)
                    .with_attribute("port", port.name())
                    .with_attribute("role", port.role())
                    .with_hint("connect the port or mark it with Port::terminal()"));
                }
                notes.push(
                    Diagnostic::note(
                        self.name(),
                        format!(
                            "terminal port '{}' is not connected",
                            graph.qualified_port_name(handle)
                        ),
                    )
                    .with_attribute("operation", operation)
                    .with_attribute("port", port.name()),
                );
            }
        }

        for note in notes {
            ctx.push_diagnostic(note);
        }
        Ok(())
    }
}
