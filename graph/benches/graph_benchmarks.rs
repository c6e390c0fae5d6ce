use criterion::{Criterion, black_box, criterion_group, criterion_main};

use framegraph::{
    CompositeConstraint, GraphBuilder, ImageLayout, Operation, Port, PrimitiveConstraint,
};

// ---------------------------------------------------------------------------
// Graph construction
// ---------------------------------------------------------------------------

fn modifier_chain(length: usize) -> GraphBuilder {
    let mut builder = GraphBuilder::new();
    builder
        .add_operation(Operation::new("source").with_port(Port::producer(
            "out",
            PrimitiveConstraint::image_in(ImageLayout::ColorAttachment),
        )))
        .ok();
    let mut previous = ("source".to_string(), "out");
    for i in 0..length {
        let name = format!("pass_{i}");
        let layout = if i % 2 == 0 {
            ImageLayout::ShaderReadOnly
        } else {
            ImageLayout::ColorAttachment
        };
        builder
            .add_operation(Operation::new(name.clone()).with_port(Port::modifier(
                "io",
                PrimitiveConstraint::image(),
                PrimitiveConstraint::image_in(layout),
            )))
            .ok();
        builder
            .connect_named((&previous.0, previous.1), (&name, "io"))
            .ok();
        previous = (name, "io");
    }
    builder
        .add_operation(Operation::new("sink").with_port(Port::consumer(
            "in",
            PrimitiveConstraint::image_in(ImageLayout::PresentSrc),
        )))
        .ok();
    builder
        .connect_named((&previous.0, previous.1), ("sink", "in"))
        .ok();
    builder
}

fn bench_build_chain(c: &mut Criterion) {
    c.bench_function("graph_build_64_modifier_chain", |b| {
        b.iter(|| black_box(modifier_chain(64)));
    });
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

fn bench_compile_chain(c: &mut Criterion) {
    c.bench_function("graph_compile_64_modifier_chain", |b| {
        b.iter(|| black_box(modifier_chain(64).compile()));
    });
}

fn bench_compile_gbuffer_fan_out(c: &mut Criterion) {
    let gbuffer = (0..8).fold(CompositeConstraint::new(), |composite, i| {
        composite.with(
            format!("target_{i}"),
            PrimitiveConstraint::image_in(ImageLayout::ColorAttachment),
        )
    });
    let sampled = (0..8).fold(CompositeConstraint::new(), |composite, i| {
        composite.with(
            format!("target_{i}"),
            PrimitiveConstraint::image_in(ImageLayout::ShaderReadOnly),
        )
    });

    c.bench_function("graph_compile_8_target_gbuffer_16_readers", |b| {
        b.iter(|| {
            let mut builder = GraphBuilder::new();
            builder
                .add_operation(
                    Operation::new("geometry").with_port(Port::producer("gbuffer", gbuffer.clone())),
                )
                .ok();
            for i in 0..16 {
                let name = format!("reader_{i}");
                builder
                    .add_operation(
                        Operation::new(name.clone())
                            .with_port(Port::consumer("gbuffer", sampled.clone())),
                    )
                    .ok();
                builder
                    .connect_named(("geometry", "gbuffer"), (&name, "gbuffer"))
                    .ok();
            }
            black_box(builder.compile())
        });
    });
}

criterion_group!(
    benches,
    bench_build_chain,
    bench_compile_chain,
    bench_compile_gbuffer_fan_out,
);
criterion_main!(benches);
