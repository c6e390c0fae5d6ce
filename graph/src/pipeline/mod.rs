//! Dependency-ordered compiler pass pipeline.
//!
//! Passes declare the passes they depend on by type. The pipeline orders
//! them with Kahn's algorithm over a [`Dag`], registration order breaking
//! ties, and runs each exactly once against a shared [`CompileContext`].
//!
//! ```
//! use framegraph::{CompileContext, CompilerError, CompilerPass, PassId, PassPipeline};
//! use framegraph::passes::NonEmptyGraphPass;
//!
//! struct CountOperations;
//!
//! impl CompilerPass for CountOperations {
//!     fn name(&self) -> &'static str {
//!         "count_operations"
//!     }
//!
//!     fn dependencies(&self) -> Vec<PassId> {
//!         vec![PassId::of::<NonEmptyGraphPass>()]
//!     }
//!
//!     fn run(&mut self, ctx: &mut CompileContext) -> Result<(), CompilerError> {
//!         let _ = ctx.graph().operation_count();
//!         Ok(())
//!     }
//! }
//!
//! let mut pipeline = PassPipeline::new();
//! pipeline.add(CountOperations).add(NonEmptyGraphPass);
//! assert_eq!(
//!     pipeline.execution_order().unwrap(),
//!     vec!["non_empty_graph", "count_operations"]
//! );
//! ```

mod context;
mod diagnostic;

pub use context::CompileContext;
pub use diagnostic::{Diagnostic, Severity};

use std::any::TypeId;
use std::collections::HashMap;

use framegraph_core::dag::{Dag, NodeIndex};
use framegraph_core::profile_scope_dynamic;

use crate::error::{CompilerError, ErrorCode};
use crate::passes::{
    ConnectivityPass, LayoutInferencePass, NonEmptyGraphPass, PrimitiveExpansionPass,
    ResourceCompatibilityPass,
};

/// Identity of a pass type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassId {
    type_id: TypeId,
    type_name: &'static str,
}

impl PassId {
    /// Identity of pass type `P`.
    pub fn of<P: CompilerPass>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            type_name: std::any::type_name::<P>(),
        }
    }

    /// Fully qualified Rust type name of the pass.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// One step of the compiler.
pub trait CompilerPass: 'static {
    /// Short name used in logs, diagnostics and error attributes.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Passes that must complete before this one runs.
    fn dependencies(&self) -> Vec<PassId> {
        Vec::new()
    }

    /// Inspect or extend the compilation state.
    fn run(&mut self, ctx: &mut CompileContext) -> Result<(), CompilerError>;
}

struct StoredPass {
    id: PassId,
    pass: Box<dyn CompilerPass>,
}

/// Ordered collection of compiler passes.
///
/// A pipeline runs once; build a new one to compile again.
#[derive(Default)]
pub struct PassPipeline {
    passes: Vec<StoredPass>,
    has_run: bool,
}

impl PassPipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in passes: structure checks, primitive expansion, resource
    /// compatibility and layout inference.
    pub fn with_default_passes() -> Self {
        let mut pipeline = Self::new();
        pipeline
            .add(NonEmptyGraphPass)
            .add(ConnectivityPass)
            .add(PrimitiveExpansionPass)
            .add(ResourceCompatibilityPass)
            .add(LayoutInferencePass);
        pipeline
    }

    /// Register a pass. Ordering is resolved when the pipeline runs.
    pub fn add<P: CompilerPass>(&mut self, pass: P) -> &mut Self {
        self.passes.push(StoredPass {
            id: PassId::of::<P>(),
            pass: Box::new(pass),
        });
        self
    }

    /// Builder-style [`add`](Self::add).
    pub fn with_pass<P: CompilerPass>(mut self, pass: P) -> Self {
        self.add(pass);
        self
    }

    /// Number of registered passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Returns true if no pass is registered.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Whether a pass of type `P` is registered.
    pub fn contains<P: CompilerPass>(&self) -> bool {
        let id = PassId::of::<P>();
        self.passes.iter().any(|stored| stored.id == id)
    }

    /// Names of the passes in the order they would run.
    pub fn execution_order(&self) -> Result<Vec<&'static str>, CompilerError> {
        Ok(self
            .resolve_order()?
            .into_iter()
            .map(|index| self.passes[index].pass.name())
            .collect())
    }

    /// Run every pass in dependency order.
    ///
    /// Stops at the first failing pass; the returned error carries every
    /// diagnostic collected up to that point.
    pub fn run(&mut self, ctx: &mut CompileContext) -> Result<(), CompilerError> {
        if self.has_run {
            return Err(CompilerError::new(
                ErrorCode::PipelineAlreadyRun,
                "pass pipeline has already been run",
            )
            .with_hint("create a new pipeline for each compilation"));
        }
        let order = self.resolve_order()?;
        self.has_run = true;
        log::debug!(
            "Compiler pass order: [{}]",
            order
                .iter()
                .map(|&index| self.passes[index].pass.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        for index in order {
            let stored = &mut self.passes[index];
            let name = stored.pass.name();
            profile_scope_dynamic!(name);
            log::trace!("Running compiler pass '{}'", name);

            if let Err(err) = stored.pass.run(ctx) {
                return Err(err
                    .with_attribute("pass", name)
                    .with_diagnostics(ctx.diagnostics().to_vec()));
            }

            ctx.mark_completed(stored.id);
            log::trace!("Finished compiler pass '{}'", name);
        }

        Ok(())
    }

    fn resolve_order(&self) -> Result<Vec<usize>, CompilerError> {
        let mut index_of: HashMap<PassId, usize> = HashMap::with_capacity(self.passes.len());
        for (i, stored) in self.passes.iter().enumerate() {
            if index_of.insert(stored.id, i).is_some() {
                return Err(CompilerError::new(
                    ErrorCode::PassDuplicate,
                    format!("pass '{}' is registered more than once", stored.pass.name()),
                )
                .with_attribute("pass", stored.pass.name()));
            }
        }

        let mut dag = Dag::with_capacity(self.passes.len());
        for _ in &self.passes {
            dag.add_node();
        }

        for (i, stored) in self.passes.iter().enumerate() {
            for dependency in stored.pass.dependencies() {
                let &dep_index = index_of.get(&dependency).ok_or_else(|| {
                    CompilerError::new(
                        ErrorCode::PassDependencyMissing,
                        format!(
                            "pass '{}' depends on '{}', which is not registered",
                            stored.pass.name(),
                            dependency.type_name()
                        ),
                    )
                    .with_attribute("pass", stored.pass.name())
                    .with_attribute("dependency", dependency.type_name())
                })?;
                // Dependency runs first
                dag.add_edge_unchecked(NodeIndex::new(dep_index as u32), NodeIndex::new(i as u32));
            }
        }

        dag.topological_order()
            .map(|order| order.into_iter().map(NodeIndex::index).collect())
            .map_err(|stuck| {
                let names: Vec<&str> = stuck
                    .iter()
                    .map(|node| self.passes[node.index()].pass.name())
                    .collect();
                CompilerError::new(
                    ErrorCode::PassDependencyCycle,
                    format!("dependency cycle among passes: [{}]", names.join(", ")),
                )
                .with_attribute("passes", names.join(","))
            })
    }
}
