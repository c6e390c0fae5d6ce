use std::collections::HashSet;

use crate::compiled::CompiledGraph;
use crate::config::CompilerConfig;
use crate::error::CompilerError;
use crate::logical::LogicalGraph;
use crate::primitive::PrimitiveGraph;
use crate::transition::TransitionMap;

use super::{Diagnostic, PassId};

/// State shared by the passes of one compilation.
///
/// The pipeline hands it to each pass by exclusive borrow. The logical graph
/// and configuration are read-only; later stages are written into slots by
/// the passes that produce them.
#[derive(Debug)]
pub struct CompileContext {
    graph: LogicalGraph,
    config: CompilerConfig,
    primitive: Option<PrimitiveGraph>,
    transitions: Option<TransitionMap>,
    diagnostics: Vec<Diagnostic>,
    completed: HashSet<PassId>,
}

impl CompileContext {
    pub fn new(graph: LogicalGraph, config: CompilerConfig) -> Self {
        Self {
            graph,
            config,
            primitive: None,
            transitions: None,
            diagnostics: Vec::new(),
            completed: HashSet::new(),
        }
    }

    /// The logical graph being compiled.
    pub fn graph(&self) -> &LogicalGraph {
        &self.graph
    }

    /// Compiler settings for this run.
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// The primitive graph, once expansion has run.
    pub fn primitive(&self) -> Option<&PrimitiveGraph> {
        self.primitive.as_ref()
    }

    /// The primitive graph, or an internal error naming the pass that needed it.
    pub fn require_primitive(&self, pass: &'static str) -> Result<&PrimitiveGraph, CompilerError> {
        self.primitive.as_ref().ok_or_else(|| {
            CompilerError::internal(format!("pass '{pass}' ran before primitive expansion"))
                .with_attribute("pass", pass)
        })
    }

    /// Store the primitive graph, replacing any earlier one.
    pub fn set_primitive(&mut self, primitive: PrimitiveGraph) {
        self.primitive = Some(primitive);
    }

    /// Transition descriptors, once layout inference has run.
    pub fn transitions(&self) -> Option<&TransitionMap> {
        self.transitions.as_ref()
    }

    /// Store the transition descriptors.
    pub fn set_transitions(&mut self, transitions: TransitionMap) {
        self.transitions = Some(transitions);
    }

    /// Diagnostics emitted so far, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Whether the pass has already completed successfully.
    pub fn has_completed(&self, pass: PassId) -> bool {
        self.completed.contains(&pass)
    }

    pub(crate) fn mark_completed(&mut self, pass: PassId) {
        self.completed.insert(pass);
    }

    /// Assemble the compiled graph from the filled slots.
    pub(crate) fn into_compiled(self) -> Result<CompiledGraph, CompilerError> {
        let primitive = self.primitive.ok_or_else(|| {
            CompilerError::internal("pipeline finished without producing a primitive graph")
                .with_hint("register PrimitiveExpansionPass")
        })?;
        let transitions = self.transitions.ok_or_else(|| {
            CompilerError::internal("pipeline finished without producing layout transitions")
                .with_hint("register LayoutInferencePass")
        })?;
        CompiledGraph::new(self.graph, primitive, transitions, self.diagnostics)
    }
}
