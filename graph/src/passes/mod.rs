//! Built-in compiler passes.
//!
//! | Pass | Depends on | Produces |
//! |------|------------|----------|
//! | [`NonEmptyGraphPass`] | | |
//! | [`ConnectivityPass`] | `NonEmptyGraphPass` | notes for unconnected terminal ports |
//! | [`PrimitiveExpansionPass`] | `ConnectivityPass` | [`PrimitiveGraph`] |
//! | [`ResourceCompatibilityPass`] | `PrimitiveExpansionPass` | |
//! | [`LayoutInferencePass`] | `PrimitiveExpansionPass`, `ResourceCompatibilityPass` | [`TransitionMap`](crate::TransitionMap) |

mod compatibility;
mod expansion;
mod layout;
mod structure;

pub use compatibility::ResourceCompatibilityPass;
pub use expansion::PrimitiveExpansionPass;
pub use layout::LayoutInferencePass;
pub use structure::{ConnectivityPass, NonEmptyGraphPass};

use crate::logical::LogicalGraph;
use crate::primitive::{PrimitiveGraph, PrimitivePortHandle};

/// `operation.port[subresource]` for messages and attributes.
pub(crate) fn describe_primitive_port(
    graph: &LogicalGraph,
    primitive: &PrimitiveGraph,
    handle: PrimitivePortHandle,
) -> String {
    match primitive.port(handle) {
        Some(port) => format!(
            "{}[{}]",
            graph.qualified_port_name(port.parent()),
            port.subresource()
        ),
        None => format!("<primitive port {}>", handle.index()),
    }
}
