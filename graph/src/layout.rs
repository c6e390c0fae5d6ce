//! Image layout states tracked by the layout inference pass.
//!
//! [`ImageLayout`] mirrors the Vulkan image layouts the engine cares about,
//! abstracted away from any particular backend. Buffers carry no layout and
//! are exempt from transition inference.
//!
//! [`TextureAccessMode`] is the usage-oriented vocabulary: operations usually
//! know *how* they touch an image (render target, sampled, copy source...) and
//! the access mode maps that to the layout the image must be in.

use std::fmt;

/// Layout states an image can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum ImageLayout {
    /// Initial state, contents undefined. Every propagation starts here.
    #[default]
    Undefined,
    /// Optimal for color attachment writes.
    ColorAttachment,
    /// Optimal for depth/stencil attachment writes.
    DepthStencilAttachment,
    /// Optimal for depth read-only (sampling + depth testing).
    DepthStencilReadOnly,
    /// Optimal for shader sampling (texture reads).
    ShaderReadOnly,
    /// Optimal for transfer source operations.
    TransferSrc,
    /// Optimal for transfer destination operations.
    TransferDst,
    /// Optimal for presentation to swapchain.
    PresentSrc,
    /// General layout (least optimal but most flexible).
    General,
}

impl ImageLayout {
    /// Stable lower-case name, used in error attributes and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::ColorAttachment => "color_attachment",
            Self::DepthStencilAttachment => "depth_stencil_attachment",
            Self::DepthStencilReadOnly => "depth_stencil_read_only",
            Self::ShaderReadOnly => "shader_read_only",
            Self::TransferSrc => "transfer_src",
            Self::TransferDst => "transfer_dst",
            Self::PresentSrc => "present_src",
            Self::General => "general",
        }
    }

    /// Check if this is a depth/stencil layout.
    pub fn is_depth_stencil(self) -> bool {
        matches!(
            self,
            Self::DepthStencilAttachment | Self::DepthStencilReadOnly
        )
    }

    /// Check if an operation may write the image while it is in this layout.
    pub fn is_writable(self) -> bool {
        matches!(
            self,
            Self::ColorAttachment | Self::DepthStencilAttachment | Self::TransferDst | Self::General
        )
    }
}

impl fmt::Display for ImageLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a texture is used within an operation.
///
/// Each access mode corresponds to the image layout the texture must be in
/// for the operation to be valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureAccessMode {
    /// Written as color render target (color attachment).
    RenderTargetWrite,
    /// Written as depth/stencil render target (depth attachment).
    DepthStencilWrite,
    /// Read-only depth/stencil (sampling + depth test).
    DepthStencilReadOnly,
    /// Sampled in a shader (texture read).
    ShaderRead,
    /// Read/write as storage texture.
    StorageReadWrite,
    /// Source of a copy/transfer operation.
    TransferRead,
    /// Destination of a copy/transfer operation.
    TransferWrite,
    /// Handed to the presentation engine.
    Present,
}

impl TextureAccessMode {
    /// The layout required for this access.
    pub fn to_layout(self) -> ImageLayout {
        match self {
            Self::RenderTargetWrite => ImageLayout::ColorAttachment,
            Self::DepthStencilWrite => ImageLayout::DepthStencilAttachment,
            Self::DepthStencilReadOnly => ImageLayout::DepthStencilReadOnly,
            Self::ShaderRead => ImageLayout::ShaderReadOnly,
            Self::StorageReadWrite => ImageLayout::General,
            Self::TransferRead => ImageLayout::TransferSrc,
            Self::TransferWrite => ImageLayout::TransferDst,
            Self::Present => ImageLayout::PresentSrc,
        }
    }

    /// Check if this access mode is a write operation.
    pub fn is_write(self) -> bool {
        matches!(
            self,
            Self::RenderTargetWrite
                | Self::DepthStencilWrite
                | Self::StorageReadWrite
                | Self::TransferWrite
        )
    }

    /// Check if this access mode is a read operation.
    pub fn is_read(self) -> bool {
        matches!(
            self,
            Self::DepthStencilReadOnly
                | Self::ShaderRead
                | Self::StorageReadWrite
                | Self::TransferRead
                | Self::Present
        )
    }
}
