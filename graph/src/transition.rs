//! Per-port layout transition descriptors.

use std::fmt;

use crate::layout::ImageLayout;
use crate::primitive::PrimitivePortHandle;

/// Required layout changes around one primitive port.
///
/// `from`/`then` is the layout the image arrives in, `during` the layout the
/// operation uses it in, and `after`/`to` the layout it is left in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// No layout change.
    Constant(ImageLayout),
    /// Transition before the operation runs.
    Pre { from: ImageLayout, to: ImageLayout },
    /// Transition after the operation runs.
    Post { from: ImageLayout, to: ImageLayout },
    /// Transitions on both sides of the operation.
    PreAndPost {
        from: ImageLayout,
        during: ImageLayout,
        after: ImageLayout,
    },
}

impl Transition {
    /// Pick the descriptor for an image that arrives in `then`, is used in
    /// `during` and left in `leaving`.
    ///
    /// ```
    /// use framegraph::{ImageLayout, Transition};
    ///
    /// let t = Transition::select(
    ///     ImageLayout::ColorAttachment,
    ///     ImageLayout::ColorAttachment,
    ///     ImageLayout::ShaderReadOnly,
    /// );
    /// assert_eq!(
    ///     t,
    ///     Transition::Post { from: ImageLayout::ColorAttachment, to: ImageLayout::ShaderReadOnly }
    /// );
    /// ```
    pub fn select(then: ImageLayout, during: ImageLayout, leaving: ImageLayout) -> Self {
        match (then == during, during == leaving) {
            (true, true) => Self::Constant(then),
            (false, true) => Self::Pre {
                from: then,
                to: during,
            },
            (true, false) => Self::Post {
                from: during,
                to: leaving,
            },
            (false, false) => Self::PreAndPost {
                from: then,
                during,
                after: leaving,
            },
        }
    }

    /// Layout the image is in when the operation is reached.
    pub fn entry_layout(&self) -> ImageLayout {
        match *self {
            Self::Constant(layout) => layout,
            Self::Pre { from, .. } | Self::Post { from, .. } | Self::PreAndPost { from, .. } => from,
        }
    }

    /// Layout the operation accesses the image in.
    pub fn during_layout(&self) -> ImageLayout {
        match *self {
            Self::Constant(layout) => layout,
            Self::Pre { to, .. } => to,
            Self::Post { from, .. } => from,
            Self::PreAndPost { during, .. } => during,
        }
    }

    /// Layout the image is left in for downstream operations.
    pub fn exit_layout(&self) -> ImageLayout {
        match *self {
            Self::Constant(layout) => layout,
            Self::Pre { to, .. } | Self::Post { to, .. } => to,
            Self::PreAndPost { after, .. } => after,
        }
    }

    /// Whether a barrier is needed before the operation.
    pub fn has_pre(&self) -> bool {
        matches!(self, Self::Pre { .. } | Self::PreAndPost { .. })
    }

    /// Whether a barrier is needed after the operation.
    pub fn has_post(&self) -> bool {
        matches!(self, Self::Post { .. } | Self::PreAndPost { .. })
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(layout) => write!(f, "constant({layout})"),
            Self::Pre { from, to } => write!(f, "pre({from} -> {to})"),
            Self::Post { from, to } => write!(f, "post({from} -> {to})"),
            Self::PreAndPost {
                from,
                during,
                after,
            } => write!(f, "pre_and_post({from} -> {during} -> {after})"),
        }
    }
}

/// Transition descriptors indexed by primitive port.
///
/// Buffer ports never have a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionMap {
    entries: Vec<Option<Transition>>,
}

impl TransitionMap {
    pub(crate) fn new(port_count: usize) -> Self {
        Self {
            entries: vec![None; port_count],
        }
    }

    pub(crate) fn set(&mut self, port: PrimitivePortHandle, transition: Transition) {
        if let Some(slot) = self.entries.get_mut(port.index()) {
            *slot = Some(transition);
        }
    }

    /// Descriptor recorded for a port.
    pub fn get(&self, port: PrimitivePortHandle) -> Option<Transition> {
        self.entries.get(port.index()).copied().flatten()
    }

    /// Number of primitive ports covered by this map, with or without a descriptor.
    pub fn port_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of recorded descriptors.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }

    /// Returns true if no descriptor was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over recorded descriptors in port order.
    pub fn iter(&self) -> impl Iterator<Item = (PrimitivePortHandle, Transition)> + '_ {
        self.entries.iter().enumerate().filter_map(|(i, entry)| {
            entry.map(|transition| (PrimitivePortHandle::new(i as u32), transition))
        })
    }
}
