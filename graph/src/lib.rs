//! # Framegraph
//!
//! A render graph compiler. Operations declare typed ports (producers,
//! consumers and modifiers of images and buffers); the compiler splits
//! composite ports into primitive resources and infers the image layout
//! transitions each operation needs.
//!
//! ## Architecture
//!
//! ```text
//! GraphBuilder ──finalize──► LogicalGraph
//!                               │
//!                      PassPipeline (CompileContext)
//!                               │  structure checks
//!                               │  primitive expansion  ──► PrimitiveGraph
//!                               │  resource compatibility
//!                               │  layout inference     ──► TransitionMap
//!                               ▼
//!                         CompiledGraph
//! ```
//!
//! ## Example
//!
//! ```
//! use framegraph::{GraphBuilder, ImageLayout, Operation, Port, PrimitiveConstraint, Transition};
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_operation(Operation::new("draw").with_port(Port::producer(
//!     "color",
//!     PrimitiveConstraint::image_in(ImageLayout::ColorAttachment),
//! )))?;
//! builder.add_operation(Operation::new("blur").with_port(Port::modifier(
//!     "image",
//!     PrimitiveConstraint::image_in(ImageLayout::ColorAttachment),
//!     PrimitiveConstraint::image_in(ImageLayout::ShaderReadOnly),
//! )))?;
//! builder.add_operation(Operation::new("compose").with_port(Port::consumer(
//!     "image",
//!     PrimitiveConstraint::image_in(ImageLayout::ShaderReadOnly),
//! )))?;
//! builder.connect_named(("draw", "color"), ("blur", "image"))?;
//! builder.connect_named(("blur", "image"), ("compose", "image"))?;
//!
//! let compiled = builder.compile()?;
//! let blur = compiled.find_primitive_port("blur", "image", "Main").unwrap();
//! assert_eq!(
//!     compiled.transition(blur),
//!     Some(Transition::Post { from: ImageLayout::ColorAttachment, to: ImageLayout::ShaderReadOnly })
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod compiled;
pub mod config;
pub mod error;
pub mod layout;
pub mod logical;
pub mod operation;
pub mod passes;
pub mod pipeline;
pub mod port;
pub mod primitive;
pub mod resource;
pub mod transition;

pub use builder::GraphBuilder;
pub use compiled::CompiledGraph;
pub use config::{CompilerConfig, OrphanPolicy};
pub use error::{CompilerError, ErrorCategory, ErrorCode, GraphError};
pub use layout::{ImageLayout, TextureAccessMode};
pub use logical::{Connection, ConnectionHandle, LogicalGraph, OperationNode};
pub use operation::{Operation, OperationHandle};
pub use pipeline::{CompileContext, CompilerPass, Diagnostic, PassId, PassPipeline, Severity};
pub use port::{Port, PortHandle, PortKind, PortRole};
pub use primitive::{
    PrimitiveConnection, PrimitiveGraph, PrimitiveKind, PrimitivePort, PrimitivePortHandle,
};
pub use resource::{
    BufferConstraint, BufferUsage, CompositeConstraint, ImageConstraint, MAIN_SUBRESOURCE,
    PrimitiveConstraint, ResourceConstraint, TextureFormat,
};
pub use transition::{Transition, TransitionMap};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
