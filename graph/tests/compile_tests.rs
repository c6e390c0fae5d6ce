//! End-to-end compilation tests.
//!
//! Graphs are described through the public builder API, compiled with the
//! default pipeline and checked through the `CompiledGraph` read surface.
//!
//! # Test Categories
//!
//! - **Layout inference**: transition descriptors for producers, consumers and modifiers
//! - **Primitive expansion**: composite ports, cardinality and orphaned sub-resources
//! - **Validation**: structural, compatibility and pipeline configuration errors
//! - **Determinism**: repeated compilation yields identical output

mod common;

use rstest::rstest;

use common::{
    composite, image, image_consumer, image_modifier, image_producer, init_logging,
    main_transition, modifier_chain,
};
use framegraph::passes::{ConnectivityPass, NonEmptyGraphPass, PrimitiveExpansionPass};
use framegraph::{
    BufferUsage, CompileContext, CompiledGraph, CompilerConfig, CompilerError, CompilerPass,
    ErrorCode, GraphBuilder, ImageConstraint, ImageLayout, Operation, OrphanPolicy, PassId,
    PassPipeline, Port, PrimitiveConstraint, Severity, TextureFormat, Transition,
};

use framegraph::ImageLayout::{
    ColorAttachment as Color, DepthStencilAttachment as Depth, ShaderReadOnly as Read,
    TransferDst as Dst, Undefined,
};

// ============================================================================
// Layout inference
// ============================================================================

#[test]
fn test_producer_modifier_consumer_chain() {
    init_logging();

    let mut builder = GraphBuilder::new();
    builder.add_operation(image_producer("a", Color)).unwrap();
    builder
        .add_operation(image_modifier("b", Some(Color), Some(Read)))
        .unwrap();
    builder.add_operation(image_consumer("c", Some(Read))).unwrap();
    builder.connect_named(("a", "out"), ("b", "io")).unwrap();
    builder.connect_named(("b", "io"), ("c", "in")).unwrap();

    let compiled = builder.compile().unwrap();
    assert_eq!(main_transition(&compiled, "a", "out"), Some(Transition::Constant(Color)));
    assert_eq!(
        main_transition(&compiled, "b", "io"),
        Some(Transition::Post { from: Color, to: Read })
    );
    assert_eq!(main_transition(&compiled, "c", "in"), Some(Transition::Constant(Read)));
    assert!(compiled.diagnostics().is_empty());
}

/// Producer writes `incoming`; the modifier declares `entry`/`exit`.
#[rstest]
#[case::constant(Color, Some(Color), Some(Color), Transition::Constant(Color))]
#[case::pre(Dst, Some(Color), Some(Color), Transition::Pre { from: Dst, to: Color })]
#[case::post(Color, Some(Color), Some(Read), Transition::Post { from: Color, to: Read })]
#[case::pre_and_post(Dst, Some(Color), Some(Read), Transition::PreAndPost { from: Dst, during: Color, after: Read })]
#[case::entry_only(Dst, Some(Color), None, Transition::Pre { from: Dst, to: Color })]
#[case::exit_only(Color, None, Some(Read), Transition::Post { from: Color, to: Read })]
#[case::neither(Read, None, None, Transition::Constant(Read))]
fn test_modifier_transitions(
    #[case] incoming: ImageLayout,
    #[case] entry: Option<ImageLayout>,
    #[case] exit: Option<ImageLayout>,
    #[case] expected: Transition,
) {
    init_logging();

    let compiled = modifier_chain(entry, exit, incoming).unwrap();
    assert_eq!(main_transition(&compiled, "b", "io"), Some(expected));
    // The unconstrained consumer sees whatever the modifier left behind.
    assert_eq!(
        main_transition(&compiled, "c", "in"),
        Some(Transition::Constant(expected.exit_layout()))
    );
}

#[rstest]
#[case::matching(Read, Transition::Constant(Read))]
#[case::needs_transition(Color, Transition::Pre { from: Read, to: Color })]
fn test_consumer_transitions(#[case] required: ImageLayout, #[case] expected: Transition) {
    let mut builder = GraphBuilder::new();
    builder.add_operation(image_producer("a", Read)).unwrap();
    builder.add_operation(image_consumer("c", Some(required))).unwrap();
    builder.connect_named(("a", "out"), ("c", "in")).unwrap();

    let compiled = builder.compile().unwrap();
    assert_eq!(main_transition(&compiled, "c", "in"), Some(expected));
}

#[test]
fn test_fan_out_consumers_transition_independently() {
    let mut builder = GraphBuilder::new();
    builder.add_operation(image_producer("a", Color)).unwrap();
    builder.add_operation(image_consumer("sample", Some(Read))).unwrap();
    builder.add_operation(image_consumer("copy", Some(ImageLayout::TransferSrc))).unwrap();
    builder.connect_named(("a", "out"), ("sample", "in")).unwrap();
    builder.connect_named(("a", "out"), ("copy", "in")).unwrap();

    let compiled = builder.compile().unwrap();
    assert_eq!(
        main_transition(&compiled, "sample", "in"),
        Some(Transition::Pre { from: Color, to: Read })
    );
    assert_eq!(
        main_transition(&compiled, "copy", "in"),
        Some(Transition::Pre { from: Color, to: ImageLayout::TransferSrc })
    );
}

#[test]
fn test_long_modifier_chain_compiles() {
    const LENGTH: usize = 5000;

    let mut builder = GraphBuilder::new();
    builder.add_operation(image_producer("source", Color)).unwrap();
    let mut previous = ("source".to_string(), "out");
    for i in 0..LENGTH {
        let name = format!("pass_{i}");
        builder.add_operation(image_modifier(&name, None, None)).unwrap();
        builder
            .connect_named((&previous.0, previous.1), (&name, "io"))
            .unwrap();
        previous = (name, "io");
    }
    builder.add_operation(image_consumer("sink", Some(Read))).unwrap();
    builder
        .connect_named((&previous.0, previous.1), ("sink", "in"))
        .unwrap();

    let compiled = builder.compile().unwrap();
    assert_eq!(compiled.transitions().len(), LENGTH + 2);
    assert_eq!(
        main_transition(&compiled, &format!("pass_{}", LENGTH - 1), "io"),
        Some(Transition::Constant(Color))
    );
    assert_eq!(
        main_transition(&compiled, "sink", "in"),
        Some(Transition::Pre { from: Color, to: Read })
    );
}

#[test]
fn test_producers_record_declared_layout() {
    let mut builder = GraphBuilder::new();
    builder.add_operation(image_producer("color", Color)).unwrap();
    builder.add_operation(image_producer("depth", Depth)).unwrap();
    builder.add_operation(image_consumer("a", None)).unwrap();
    builder.add_operation(image_consumer("b", None)).unwrap();
    builder.connect_named(("color", "out"), ("a", "in")).unwrap();
    builder.connect_named(("depth", "out"), ("b", "in")).unwrap();

    let compiled = builder.compile().unwrap();
    for (handle, port) in compiled.primitive_ports() {
        if let framegraph::PrimitiveKind::Producer(constraint) = port.kind() {
            let declared = constraint.layout().unwrap();
            assert_eq!(compiled.transition(handle), Some(Transition::Constant(declared)));
        }
    }
}

#[test]
fn test_buffer_edge_has_no_transitions() {
    let mut builder = GraphBuilder::new();
    builder
        .add_operation(Operation::new("upload").with_port(Port::producer(
            "data",
            PrimitiveConstraint::buffer(BufferUsage::STORAGE | BufferUsage::COPY_DST),
        )))
        .unwrap();
    builder
        .add_operation(Operation::new("cull").with_port(Port::consumer(
            "instances",
            PrimitiveConstraint::buffer(BufferUsage::STORAGE),
        )))
        .unwrap();
    builder
        .connect_named(("upload", "data"), ("cull", "instances"))
        .unwrap();

    let compiled = builder.compile().unwrap();
    assert_eq!(compiled.primitive_edges().len(), 1);
    for (handle, _) in compiled.primitive_ports() {
        assert_eq!(compiled.transition(handle), None);
    }
    assert!(compiled.transitions().is_empty());
}

#[test]
fn test_composite_modifier_transitions_per_subresource() {
    let gbuffer = composite(&[("albedo", Color), ("depth", Depth)]);
    let sampled = composite(&[("albedo", Read), ("depth", ImageLayout::DepthStencilReadOnly)]);

    let mut builder = GraphBuilder::new();
    builder
        .add_operation(Operation::new("geometry").with_port(Port::producer("gbuffer", gbuffer.clone())))
        .unwrap();
    builder
        .add_operation(
            Operation::new("decals").with_port(Port::modifier("gbuffer", gbuffer.clone(), sampled.clone())),
        )
        .unwrap();
    builder
        .add_operation(Operation::new("lighting").with_port(Port::consumer("gbuffer", sampled)))
        .unwrap();
    builder
        .connect_named(("geometry", "gbuffer"), ("decals", "gbuffer"))
        .unwrap();
    builder
        .connect_named(("decals", "gbuffer"), ("lighting", "gbuffer"))
        .unwrap();

    let compiled = builder.compile().unwrap();
    assert_eq!(compiled.primitive_ports().count(), 6);
    assert_eq!(compiled.primitive_edges().len(), 4);

    let albedo = compiled.find_primitive_port("decals", "gbuffer", "albedo").unwrap();
    let depth = compiled.find_primitive_port("decals", "gbuffer", "depth").unwrap();
    assert_eq!(
        compiled.transition(albedo),
        Some(Transition::Post { from: Color, to: Read })
    );
    assert_eq!(
        compiled.transition(depth),
        Some(Transition::Post { from: Depth, to: ImageLayout::DepthStencilReadOnly })
    );

    let lit_depth = compiled.find_primitive_port("lighting", "gbuffer", "depth").unwrap();
    assert_eq!(
        compiled.transition(lit_depth),
        Some(Transition::Constant(ImageLayout::DepthStencilReadOnly))
    );
}

#[test]
fn test_edges_connect_same_subresource() {
    let gbuffer = composite(&[("normal", Color), ("albedo", Color), ("depth", Depth)]);
    let reversed = composite(&[("depth", Depth), ("albedo", Read), ("normal", Read)]);

    let mut builder = GraphBuilder::new();
    builder
        .add_operation(Operation::new("geometry").with_port(Port::producer("gbuffer", gbuffer)))
        .unwrap();
    builder
        .add_operation(Operation::new("lighting").with_port(Port::consumer("gbuffer", reversed)))
        .unwrap();
    builder
        .connect_named(("geometry", "gbuffer"), ("lighting", "gbuffer"))
        .unwrap();

    let compiled = builder.compile().unwrap();
    assert_eq!(compiled.primitive_edges().len(), 3);
    for edge in compiled.primitive_edges() {
        let source = compiled.primitive_port(edge.source()).unwrap();
        let target = compiled.primitive_port(edge.target()).unwrap();
        assert_eq!(source.subresource(), target.subresource());
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn test_undefined_read_warning() {
    let build = |terminal: bool| {
        let clear = Port::modifier("target", image(Some(Dst)), image(Some(Color)));
        let clear = if terminal { clear.terminal() } else { clear };
        let mut builder = GraphBuilder::new();
        builder.add_operation(Operation::new("clear").with_port(clear)).unwrap();
        builder.add_operation(image_consumer("present", Some(Color))).unwrap();
        builder
            .connect_named(("clear", "target"), ("present", "in"))
            .unwrap();
        builder
    };

    let compiled = build(false).compile().unwrap();
    assert_eq!(
        main_transition(&compiled, "clear", "target"),
        Some(Transition::PreAndPost { from: Undefined, during: Dst, after: Color })
    );
    assert_eq!(compiled.diagnostics().len(), 1);
    let warning = &compiled.diagnostics()[0];
    assert_eq!(warning.severity(), Severity::Warning);
    assert_eq!(warning.pass(), "layout_inference");
    assert_eq!(warning.attribute("port"), Some("clear.target[Main]"));

    let quiet = build(false)
        .compile_with(
            PassPipeline::with_default_passes(),
            CompilerConfig::default().with_warn_undefined_reads(false),
        )
        .unwrap();
    assert!(quiet.diagnostics().is_empty());

    let external = build(true).compile().unwrap();
    assert!(external.diagnostics().is_empty());
}

#[test]
fn test_unconnected_terminal_port_is_noted() {
    let mut builder = GraphBuilder::new();
    builder
        .add_operation(
            image_producer("a", Color)
                .with_port(Port::consumer("history", PrimitiveConstraint::image_in(Read)).terminal()),
        )
        .unwrap();
    builder.add_operation(image_consumer("b", None)).unwrap();
    builder.connect_named(("a", "out"), ("b", "in")).unwrap();

    let compiled = builder.compile().unwrap();
    let notes: Vec<_> = compiled
        .diagnostics()
        .iter()
        .filter(|d| d.severity() == Severity::Note)
        .collect();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].attribute("port"), Some("history"));
    // Seeded like any root; a terminal input does not warn.
    assert_eq!(
        main_transition(&compiled, "a", "history"),
        Some(Transition::Pre { from: Undefined, to: Read })
    );
    assert!(compiled.diagnostics().iter().all(|d| d.severity() == Severity::Note));
}

// ============================================================================
// Validation errors
// ============================================================================

#[test]
fn test_empty_graph() {
    let err = GraphBuilder::new().compile().unwrap_err();
    assert_eq!(err.code(), ErrorCode::EmptyGraph);
    assert!(err.hint().is_some());
}

#[test]
fn test_disconnected_port() {
    let mut builder = GraphBuilder::new();
    builder.add_operation(image_producer("a", Color)).unwrap();
    builder.add_operation(image_consumer("b", None)).unwrap();

    let err = builder.compile().unwrap_err();
    assert_eq!(err.code(), ErrorCode::DisconnectedPort);
    assert_eq!(err.attribute("operation"), Some("a"));
    assert_eq!(err.attribute("port"), Some("out"));
    assert_eq!(err.attribute("pass"), Some("connectivity"));
}

#[test]
fn test_cardinality_mismatch() {
    let mut builder = GraphBuilder::new();
    builder
        .add_operation(
            Operation::new("a")
                .with_port(Port::producer("out", composite(&[("color", Color), ("depth", Depth)]))),
        )
        .unwrap();
    builder
        .add_operation(
            Operation::new("b").with_port(Port::consumer("in", composite(&[("color", Read)]))),
        )
        .unwrap();
    builder.connect_named(("a", "out"), ("b", "in")).unwrap();

    let err = builder.compile().unwrap_err();
    assert_eq!(err.code(), ErrorCode::CardinalityMismatch);
    assert_eq!(err.attribute("source"), Some("a.out"));
    assert_eq!(err.attribute("source_count"), Some("2"));
    assert_eq!(err.attribute("target_count"), Some("1"));
}

#[test]
fn test_primitive_to_composite_is_cardinality_checked() {
    let mut builder = GraphBuilder::new();
    builder.add_operation(image_producer("a", Color)).unwrap();
    builder
        .add_operation(
            Operation::new("b").with_port(Port::consumer("in", composite(&[("color", Read), ("depth", Read)]))),
        )
        .unwrap();
    builder.connect_named(("a", "out"), ("b", "in")).unwrap();

    assert_eq!(builder.compile().unwrap_err().code(), ErrorCode::CardinalityMismatch);
}

fn renamed_subresources() -> GraphBuilder {
    let mut builder = GraphBuilder::new();
    builder
        .add_operation(
            Operation::new("a")
                .with_port(Port::producer("out", composite(&[("color", Color), ("velocity", Color)]))),
        )
        .unwrap();
    builder
        .add_operation(
            Operation::new("b")
                .with_port(Port::consumer("in", composite(&[("color", Read), ("motion", Read)]))),
        )
        .unwrap();
    builder.connect_named(("a", "out"), ("b", "in")).unwrap();
    builder
}

#[test]
fn test_orphaned_subresource_is_an_error() {
    let err = renamed_subresources().compile().unwrap_err();
    assert_eq!(err.code(), ErrorCode::OrphanedPrimitivePort);
    assert_eq!(err.attribute("subresource"), Some("velocity"));
    assert_eq!(err.attribute("port"), Some("a.out"));
}

#[test]
fn test_orphaned_subresource_with_undefined_policy() {
    let compiled = renamed_subresources()
        .compile_with(
            PassPipeline::with_default_passes(),
            CompilerConfig::default().with_orphan_policy(OrphanPolicy::Undefined),
        )
        .unwrap();

    assert_eq!(compiled.primitive_edges().len(), 1);
    let velocity = compiled.find_primitive_port("a", "out", "velocity").unwrap();
    let motion = compiled.find_primitive_port("b", "in", "motion").unwrap();
    assert_eq!(compiled.transition(velocity), Some(Transition::Constant(Color)));
    assert_eq!(
        compiled.transition(motion),
        Some(Transition::Pre { from: Undefined, to: Read })
    );
    assert!(compiled
        .diagnostics()
        .iter()
        .any(|d| d.severity() == Severity::Warning && d.attribute("port") == Some("b.in[motion]")));
}

/// `m.io[velocity]` keeps a downstream edge while nothing feeds it.
#[test]
fn test_renamed_subresource_feeding_a_modifier_is_an_error() {
    let mut builder = GraphBuilder::new();
    builder
        .add_operation(
            Operation::new("p")
                .with_port(Port::producer("out", composite(&[("color", Color), ("depth", Color)]))),
        )
        .unwrap();
    builder
        .add_operation(
            Operation::new("d")
                .with_port(Port::consumer("in", composite(&[("color", Read), ("depth", Read)]))),
        )
        .unwrap();
    let gbuffer = composite(&[("color", Read), ("velocity", Read)]);
    builder
        .add_operation(Operation::new("m").with_port(Port::modifier("io", gbuffer.clone(), gbuffer.clone())))
        .unwrap();
    builder
        .add_operation(Operation::new("c").with_port(Port::consumer("in", gbuffer)))
        .unwrap();
    builder.connect_named(("p", "out"), ("d", "in")).unwrap();
    builder.connect_named(("p", "out"), ("m", "io")).unwrap();
    builder.connect_named(("m", "io"), ("c", "in")).unwrap();

    let err = builder.compile().unwrap_err();
    assert_eq!(err.code(), ErrorCode::OrphanedPrimitivePort);
    assert_eq!(err.attribute("port"), Some("p.out"));
    assert_eq!(err.attribute("target"), Some("m.io"));
    assert_eq!(err.attribute("subresource"), Some("depth"));
}

#[test]
fn test_producer_missing_layout() {
    let mut builder = GraphBuilder::new();
    builder
        .add_operation(Operation::new("a").with_port(Port::producer("out", image(None))))
        .unwrap();
    builder.add_operation(image_consumer("b", None)).unwrap();
    builder.connect_named(("a", "out"), ("b", "in")).unwrap();

    let err = builder.compile().unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProducerMissingLayout);
    assert_eq!(err.attribute("operation"), Some("a"));
    assert_eq!(err.attribute("subresource"), Some("Main"));
}

#[rstest]
#[case::image_to_buffer(
    PrimitiveConstraint::image_in(Color),
    PrimitiveConstraint::buffer(BufferUsage::STORAGE),
    ErrorCode::ResourceKindMismatch
)]
#[case::format(
    ImageConstraint::in_layout(Color).with_format(TextureFormat::Rgba8Unorm).into(),
    ImageConstraint::any().with_format(TextureFormat::Rgba16Float).into(),
    ErrorCode::FormatMismatch
)]
#[case::buffer_usage(
    PrimitiveConstraint::buffer(BufferUsage::VERTEX),
    PrimitiveConstraint::buffer(BufferUsage::STORAGE),
    ErrorCode::BufferUsageMismatch
)]
fn test_incompatible_resources(
    #[case] produced: PrimitiveConstraint,
    #[case] consumed: PrimitiveConstraint,
    #[case] expected: ErrorCode,
) {
    let mut builder = GraphBuilder::new();
    builder
        .add_operation(Operation::new("a").with_port(Port::producer("out", produced)))
        .unwrap();
    builder
        .add_operation(Operation::new("b").with_port(Port::consumer("in", consumed)))
        .unwrap();
    builder.connect_named(("a", "out"), ("b", "in")).unwrap();

    let err = builder.compile().unwrap_err();
    assert_eq!(err.code(), expected);
    assert_eq!(err.attribute("source"), Some("a.out[Main]"));
    assert_eq!(err.attribute("target"), Some("b.in[Main]"));
}

#[rstest]
#[case::buffer_to_image(
    PrimitiveConstraint::buffer(BufferUsage::STORAGE),
    PrimitiveConstraint::image_in(Color),
    "buffer",
    "image"
)]
#[case::image_to_buffer(
    PrimitiveConstraint::image_in(Color),
    PrimitiveConstraint::buffer(BufferUsage::STORAGE),
    "image",
    "buffer"
)]
fn test_modifier_must_keep_resource_kind(
    #[case] consumes: PrimitiveConstraint,
    #[case] produces: PrimitiveConstraint,
    #[case] consumes_kind: &str,
    #[case] produces_kind: &str,
) {
    let mut builder = GraphBuilder::new();
    builder
        .add_operation(Operation::new("a").with_port(Port::modifier("io", consumes, produces).terminal()))
        .unwrap();

    let err = builder.compile().unwrap_err();
    assert_eq!(err.code(), ErrorCode::ResourceKindMismatch);
    assert_eq!(err.attribute("port"), Some("a.io[Main]"));
    assert_eq!(err.attribute("consumes"), Some(consumes_kind));
    assert_eq!(err.attribute("produces"), Some(produces_kind));
}

#[test]
fn test_unspecified_buffer_usage_is_compatible() {
    let mut builder = GraphBuilder::new();
    builder
        .add_operation(
            Operation::new("a").with_port(Port::producer("out", PrimitiveConstraint::buffer(BufferUsage::empty()))),
        )
        .unwrap();
    builder
        .add_operation(
            Operation::new("b").with_port(Port::consumer("in", PrimitiveConstraint::buffer(BufferUsage::INDIRECT))),
        )
        .unwrap();
    builder.connect_named(("a", "out"), ("b", "in")).unwrap();

    assert!(builder.compile().is_ok());
}

#[test]
fn test_failure_carries_earlier_diagnostics() {
    let mut builder = GraphBuilder::new();
    builder
        .add_operation(
            Operation::new("a")
                .with_port(Port::producer("out", composite(&[("color", Color), ("depth", Depth)])))
                .with_port(Port::consumer("history", image(Some(Read))).terminal()),
        )
        .unwrap();
    builder
        .add_operation(Operation::new("b").with_port(Port::consumer("in", composite(&[("color", Read)]))))
        .unwrap();
    builder.connect_named(("a", "out"), ("b", "in")).unwrap();

    let err = builder.compile().unwrap_err();
    assert_eq!(err.code(), ErrorCode::CardinalityMismatch);
    assert_eq!(err.diagnostics().len(), 1);
    assert_eq!(err.diagnostics()[0].pass(), "connectivity");
}

// ============================================================================
// Cycles
// ============================================================================

#[test]
fn test_cycle_between_two_operations() {
    let mut builder = GraphBuilder::new();
    for name in ["a", "b"] {
        builder
            .add_operation(
                Operation::new(name)
                    .with_port(Port::producer("out", PrimitiveConstraint::image_in(Color)))
                    .with_port(Port::consumer("in", PrimitiveConstraint::image_in(Read))),
            )
            .unwrap();
    }
    builder.connect_named(("a", "out"), ("b", "in")).unwrap();

    let err: CompilerError = builder
        .connect_named(("b", "out"), ("a", "in"))
        .unwrap_err()
        .into();
    assert_eq!(err.code(), ErrorCode::CycleDetected);
    assert_eq!(err.attribute("source_operation"), Some("b"));
    assert_eq!(err.attribute("target_operation"), Some("a"));
}

#[test]
fn test_long_cycle_is_rejected() {
    let mut builder = GraphBuilder::new();
    for i in 0..5 {
        builder
            .add_operation(image_modifier(&format!("m{i}"), None, None))
            .unwrap();
    }
    for i in 0..4 {
        builder
            .connect_named((&format!("m{i}"), "io"), (&format!("m{}", i + 1), "io"))
            .unwrap();
    }
    let err = builder.connect_named(("m4", "io"), ("m0", "io")).unwrap_err();
    assert_eq!(err.code(), ErrorCode::CycleDetected);
}

// ============================================================================
// Pipeline
// ============================================================================

struct Ping;
struct Pong;

impl CompilerPass for Ping {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn dependencies(&self) -> Vec<PassId> {
        vec![PassId::of::<Pong>()]
    }

    fn run(&mut self, _ctx: &mut CompileContext) -> Result<(), CompilerError> {
        Ok(())
    }
}

impl CompilerPass for Pong {
    fn name(&self) -> &'static str {
        "pong"
    }

    fn dependencies(&self) -> Vec<PassId> {
        vec![PassId::of::<Ping>()]
    }

    fn run(&mut self, _ctx: &mut CompileContext) -> Result<(), CompilerError> {
        panic!("must not run when the pipeline is misconfigured");
    }
}

#[test]
fn test_pass_dependency_cycle_is_reported_before_running() {
    let mut builder = GraphBuilder::new();
    builder.add_operation(image_producer("a", Color)).unwrap();
    let pipeline = PassPipeline::new().with_pass(Ping).with_pass(Pong);

    let err = builder
        .compile_with(pipeline, CompilerConfig::default())
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PassDependencyCycle);
    assert_eq!(err.attribute("passes"), Some("ping,pong"));
}

/// Counts operations after the structural passes have run.
struct OperationCounter;

impl CompilerPass for OperationCounter {
    fn name(&self) -> &'static str {
        "operation_counter"
    }

    fn dependencies(&self) -> Vec<PassId> {
        vec![PassId::of::<ConnectivityPass>()]
    }

    fn run(&mut self, ctx: &mut CompileContext) -> Result<(), CompilerError> {
        assert!(ctx.has_completed(PassId::of::<NonEmptyGraphPass>()));
        assert!(ctx.primitive().is_none());
        let count = ctx.graph().operation_count();
        ctx.push_diagnostic(framegraph::Diagnostic::note(
            self.name(),
            format!("{count} operations"),
        ));
        Ok(())
    }
}

#[test]
fn test_custom_pass_runs_in_default_pipeline() {
    let mut builder = GraphBuilder::new();
    builder.add_operation(image_producer("a", Color)).unwrap();
    builder.add_operation(image_consumer("b", None)).unwrap();
    builder.connect_named(("a", "out"), ("b", "in")).unwrap();

    // Registered first, ordered after connectivity but before expansion.
    let mut pipeline = PassPipeline::new();
    pipeline
        .add(OperationCounter)
        .add(NonEmptyGraphPass)
        .add(ConnectivityPass)
        .add(PrimitiveExpansionPass)
        .add(framegraph::passes::ResourceCompatibilityPass)
        .add(framegraph::passes::LayoutInferencePass);
    assert_eq!(pipeline.execution_order().unwrap()[2], "operation_counter");

    let compiled = builder.compile_with(pipeline, CompilerConfig::default()).unwrap();
    assert_eq!(compiled.diagnostics().len(), 1);
    assert_eq!(compiled.diagnostics()[0].message(), "2 operations");
}

#[test]
fn test_pipeline_without_inference_does_not_compile() {
    let mut builder = GraphBuilder::new();
    builder.add_operation(image_producer("a", Color)).unwrap();
    builder.add_operation(image_consumer("b", None)).unwrap();
    builder.connect_named(("a", "out"), ("b", "in")).unwrap();

    let pipeline = PassPipeline::new()
        .with_pass(NonEmptyGraphPass)
        .with_pass(ConnectivityPass)
        .with_pass(PrimitiveExpansionPass);
    let err = builder
        .compile_with(pipeline, CompilerConfig::default())
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InternalInvariant);
}

// ============================================================================
// Determinism and sharing
// ============================================================================

fn deferred_frame() -> Result<CompiledGraph, CompilerError> {
    let gbuffer = composite(&[("albedo", Color), ("normal", Color), ("depth", Depth)]);
    let sampled = composite(&[
        ("albedo", Read),
        ("normal", Read),
        ("depth", ImageLayout::DepthStencilReadOnly),
    ]);

    let mut builder = GraphBuilder::new();
    builder.add_operation(Operation::new("geometry").with_port(Port::producer("gbuffer", gbuffer)))?;
    builder.add_operation(
        Operation::new("lighting")
            .with_port(Port::consumer("gbuffer", sampled))
            .with_port(Port::producer("hdr", PrimitiveConstraint::image_in(Color))),
    )?;
    builder.add_operation(image_modifier("bloom", Some(Color), Some(Read)))?;
    builder.add_operation(
        Operation::new("tonemap")
            .with_port(Port::consumer("hdr", PrimitiveConstraint::image_in(Read)))
            .with_port(Port::producer("ldr", PrimitiveConstraint::image_in(Color))),
    )?;
    builder.add_operation(image_consumer("present", Some(ImageLayout::PresentSrc)))?;
    builder.connect_named(("geometry", "gbuffer"), ("lighting", "gbuffer"))?;
    builder.connect_named(("lighting", "hdr"), ("bloom", "io"))?;
    builder.connect_named(("bloom", "io"), ("tonemap", "hdr"))?;
    builder.connect_named(("tonemap", "ldr"), ("present", "in"))?;
    builder.compile()
}

#[test]
fn test_compilation_is_deterministic() {
    let first = deferred_frame().unwrap();
    let second = deferred_frame().unwrap();
    assert_eq!(first, second);

    let transitions: Vec<_> = first.transitions().iter().collect();
    assert_eq!(transitions.len(), first.primitive_ports().count());
}

#[test]
fn test_operation_order_follows_connections() {
    let compiled = deferred_frame().unwrap();
    let names: Vec<_> = compiled
        .operation_order()
        .iter()
        .map(|&op| compiled.logical().operation(op).unwrap().name())
        .collect();
    assert_eq!(names, vec!["geometry", "lighting", "bloom", "tonemap", "present"]);

    let lighting = compiled.logical().find_operation("lighting").unwrap();
    assert_eq!(compiled.primitive_ports_of(lighting).len(), 4);
}

#[test]
fn test_compiled_graph_is_shared_across_threads() {
    let compiled = deferred_frame().unwrap();
    let present = compiled.find_primitive_port("present", "in", "Main").unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                assert_eq!(
                    compiled.transition(present),
                    Some(Transition::Pre { from: Color, to: ImageLayout::PresentSrc })
                );
            });
        }
    });
}
