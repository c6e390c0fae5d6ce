//! Shared helpers for the compiler integration tests.

#![allow(dead_code)]

use framegraph::{
    CompiledGraph, CompilerError, CompositeConstraint, GraphBuilder, ImageConstraint, ImageLayout,
    Operation, Port, PrimitiveConstraint, Transition,
};

/// Install a test logger once per process.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Image constraint with an optional layout.
pub fn image(layout: Option<ImageLayout>) -> PrimitiveConstraint {
    PrimitiveConstraint::Image(ImageConstraint {
        format: None,
        layout,
    })
}

/// Operation with a single image producer port named `out`.
pub fn image_producer(name: &str, layout: ImageLayout) -> Operation {
    Operation::new(name).with_port(Port::producer("out", PrimitiveConstraint::image_in(layout)))
}

/// Operation with a single image consumer port named `in`.
pub fn image_consumer(name: &str, layout: Option<ImageLayout>) -> Operation {
    Operation::new(name).with_port(Port::consumer("in", image(layout)))
}

/// Operation with a single image modifier port named `io`.
pub fn image_modifier(
    name: &str,
    entry: Option<ImageLayout>,
    exit: Option<ImageLayout>,
) -> Operation {
    Operation::new(name).with_port(Port::modifier("io", image(entry), image(exit)))
}

/// G-buffer style composite with the given `(name, layout)` entries.
pub fn composite(entries: &[(&str, ImageLayout)]) -> CompositeConstraint {
    entries
        .iter()
        .fold(CompositeConstraint::new(), |composite, &(name, layout)| {
            composite.with(name, PrimitiveConstraint::image_in(layout))
        })
}

/// Producer `a` feeding modifier `b` feeding consumer `c`.
pub fn modifier_chain(
    entry: Option<ImageLayout>,
    exit: Option<ImageLayout>,
    producer_layout: ImageLayout,
) -> Result<CompiledGraph, CompilerError> {
    let mut builder = GraphBuilder::new();
    builder.add_operation(image_producer("a", producer_layout))?;
    builder.add_operation(image_modifier("b", entry, exit))?;
    builder.add_operation(image_consumer("c", None))?;
    builder.connect_named(("a", "out"), ("b", "io"))?;
    builder.connect_named(("b", "io"), ("c", "in"))?;
    builder.compile()
}

/// Transition of the `Main` primitive port of `operation.port`.
pub fn main_transition(compiled: &CompiledGraph, operation: &str, port: &str) -> Option<Transition> {
    let handle = compiled.find_primitive_port(operation, port, "Main")?;
    compiled.transition(handle)
}
