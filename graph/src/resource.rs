//! Resource type constraints declared by ports.
//!
//! A port either carries one indivisible resource ([`PrimitiveConstraint`]:
//! an image or a buffer) or a named bundle of them ([`CompositeConstraint`],
//! e.g. a G-buffer with `albedo`, `normal` and `depth` attachments).

use bitflags::bitflags;

use crate::layout::{ImageLayout, TextureAccessMode};

/// Sub-resource name given to the single primitive of a primitive-constrained port.
pub const MAIN_SUBRESOURCE: &str = "Main";

/// Texture format enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TextureFormat {
    /// 8-bit red channel, unsigned normalized.
    R8Unorm,
    /// 8-bit RG channels, unsigned normalized.
    Rg8Unorm,
    /// 16-bit red channel, float.
    R16Float,
    /// 32-bit red channel, float.
    R32Float,
    /// 16-bit RG channels, float.
    Rg16Float,
    /// 8-bit RGBA channels, unsigned normalized.
    Rgba8Unorm,
    /// 8-bit RGBA channels, sRGB.
    Rgba8UnormSrgb,
    /// 8-bit BGRA channels, unsigned normalized.
    Bgra8Unorm,
    /// 8-bit BGRA channels, sRGB.
    Bgra8UnormSrgb,
    /// 16-bit RGBA channels, float.
    Rgba16Float,
    /// 32-bit RGBA channels, float.
    Rgba32Float,
    /// 16-bit depth.
    Depth16Unorm,
    /// 24-bit depth with 8-bit stencil.
    Depth24PlusStencil8,
    /// 32-bit depth, float.
    Depth32Float,
}

impl TextureFormat {
    /// Returns true if this is a depth or stencil format.
    pub fn is_depth_stencil(&self) -> bool {
        matches!(
            self,
            Self::Depth16Unorm | Self::Depth24PlusStencil8 | Self::Depth32Float
        )
    }
}

bitflags! {
    /// Usage flags for buffers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Buffer can be used as a vertex buffer.
        const VERTEX = 1 << 0;
        /// Buffer can be used as an index buffer.
        const INDEX = 1 << 1;
        /// Buffer can be used as a uniform buffer.
        const UNIFORM = 1 << 2;
        /// Buffer can be used as a storage buffer.
        const STORAGE = 1 << 3;
        /// Buffer can be used as an indirect buffer.
        const INDIRECT = 1 << 4;
        /// Buffer can be copied from.
        const COPY_SRC = 1 << 5;
        /// Buffer can be copied to.
        const COPY_DST = 1 << 6;
    }
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Constraint on a single image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ImageConstraint {
    /// Required format, if the port cares.
    pub format: Option<TextureFormat>,
    /// Required (on entry) or ensured (on exit) layout.
    pub layout: Option<ImageLayout>,
}

impl ImageConstraint {
    /// An image with no format or layout requirement.
    pub fn any() -> Self {
        Self::default()
    }

    /// An image that must be in `layout`.
    pub fn in_layout(layout: ImageLayout) -> Self {
        Self {
            format: None,
            layout: Some(layout),
        }
    }

    /// Set the required format.
    pub fn with_format(mut self, format: TextureFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the required layout.
    pub fn with_layout(mut self, layout: ImageLayout) -> Self {
        self.layout = Some(layout);
        self
    }
}

/// Constraint on a single buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BufferConstraint {
    /// Usages the buffer must support at this port.
    pub usage: BufferUsage,
}

/// Constraint on one indivisible resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveConstraint {
    /// A single image.
    Image(ImageConstraint),
    /// A single buffer. Buffers have no layout state.
    Buffer(BufferConstraint),
}

impl PrimitiveConstraint {
    /// An image with no requirements.
    pub fn image() -> Self {
        Self::Image(ImageConstraint::any())
    }

    /// An image required to be in `layout`.
    pub fn image_in(layout: ImageLayout) -> Self {
        Self::Image(ImageConstraint::in_layout(layout))
    }

    /// An image used with the given access mode.
    pub fn image_for(access: TextureAccessMode) -> Self {
        Self::image_in(access.to_layout())
    }

    /// A buffer with the given usages.
    pub fn buffer(usage: BufferUsage) -> Self {
        Self::Buffer(BufferConstraint { usage })
    }

    /// Returns true for buffer constraints.
    pub fn is_buffer(&self) -> bool {
        matches!(self, Self::Buffer(_))
    }

    /// Declared layout for image constraints, `None` for buffers.
    pub fn layout(&self) -> Option<ImageLayout> {
        match self {
            Self::Image(image) => image.layout,
            Self::Buffer(_) => None,
        }
    }

    /// Short name of the resource kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Image(_) => "image",
            Self::Buffer(_) => "buffer",
        }
    }
}

impl From<ImageConstraint> for PrimitiveConstraint {
    fn from(image: ImageConstraint) -> Self {
        Self::Image(image)
    }
}

impl From<BufferConstraint> for PrimitiveConstraint {
    fn from(buffer: BufferConstraint) -> Self {
        Self::Buffer(buffer)
    }
}

/// A named bundle of primitive constraints exposed through one port.
///
/// Entries keep their insertion order. Names are expected to be unique;
/// duplicates are accepted here and rejected during primitive expansion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CompositeConstraint {
    entries: Vec<(String, PrimitiveConstraint)>,
}

impl CompositeConstraint {
    /// Create an empty composite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named sub-resource.
    pub fn with(mut self, name: impl Into<String>, constraint: impl Into<PrimitiveConstraint>) -> Self {
        self.entries.push((name.into(), constraint.into()));
        self
    }

    /// Iterate over `(name, constraint)` entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PrimitiveConstraint)> {
        self.entries.iter().map(|(name, c)| (name.as_str(), c))
    }

    /// Look up a sub-resource by name (first match).
    pub fn get(&self, name: &str) -> Option<&PrimitiveConstraint> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, c)| c)
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Type constraint of a port: one primitive or a composite.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceConstraint {
    /// A single image or buffer.
    Primitive(PrimitiveConstraint),
    /// Named sub-resources.
    Composite(CompositeConstraint),
}

impl ResourceConstraint {
    /// Returns true for composite constraints.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }

    /// Short name of the constraint shape.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Primitive(_) => "primitive",
            Self::Composite(_) => "composite",
        }
    }

    /// Iterate over `(sub-resource name, constraint)` pairs.
    ///
    /// A primitive constraint yields a single [`MAIN_SUBRESOURCE`] entry.
    pub fn subresources(&self) -> Vec<(&str, &PrimitiveConstraint)> {
        match self {
            Self::Primitive(c) => vec![(MAIN_SUBRESOURCE, c)],
            Self::Composite(composite) => composite.iter().collect(),
        }
    }
}

impl From<PrimitiveConstraint> for ResourceConstraint {
    fn from(c: PrimitiveConstraint) -> Self {
        Self::Primitive(c)
    }
}

impl From<ImageConstraint> for ResourceConstraint {
    fn from(c: ImageConstraint) -> Self {
        Self::Primitive(c.into())
    }
}

impl From<BufferConstraint> for ResourceConstraint {
    fn from(c: BufferConstraint) -> Self {
        Self::Primitive(c.into())
    }
}

impl From<CompositeConstraint> for ResourceConstraint {
    fn from(c: CompositeConstraint) -> Self {
        Self::Composite(c)
    }
}
