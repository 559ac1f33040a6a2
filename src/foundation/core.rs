use crate::foundation::error::{TableauError, TableauResult};

/// Pixel dimensions of a frame or surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a size, rejecting zero-area dimensions.
    pub fn new(width: u32, height: u32) -> TableauResult<Self> {
        if width == 0 || height == 0 {
            return Err(TableauError::validation(format!(
                "size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels covered.
    pub fn area(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// Byte length of a tightly packed RGBA8 buffer of this size.
    pub fn rgba_len(self) -> usize {
        self.area().saturating_mul(4)
    }

    /// Width over height.
    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }

    /// Largest size with this size's aspect ratio that fits inside `bounds`.
    ///
    /// Both axes are truncated to whole pixels and never collapse below one pixel.
    pub fn fit_within(self, bounds: Size) -> Size {
        let src = self.aspect();
        let dst = bounds.aspect();
        if src > dst {
            let h = (f64::from(bounds.width) / src) as u32;
            Size {
                width: bounds.width,
                height: h.clamp(1, bounds.height),
            }
        } else {
            let w = (f64::from(bounds.height) * src) as u32;
            Size {
                width: w.clamp(1, bounds.width),
                height: bounds.height,
            }
        }
    }
}

/// Axis-aligned pixel rectangle inside a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Region {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Region {
    /// Region covering a whole surface of `size`.
    pub fn full(size: Size) -> Self {
        Self {
            x: 0,
            y: 0,
            width: size.width,
            height: size.height,
        }
    }

    /// Region of `inner` centered inside `outer`.
    pub fn centered(inner: Size, outer: Size) -> Self {
        Self {
            x: outer.width.saturating_sub(inner.width) / 2,
            y: outer.height.saturating_sub(inner.height) / 2,
            width: inner.width.min(outer.width),
            height: inner.height.min(outer.height),
        }
    }

    /// Dimensions of this region.
    pub fn size(self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// Intersect with a surface of `size`; `None` when nothing remains visible.
    pub fn clip_to(self, size: Size) -> Option<Self> {
        if self.x >= size.width || self.y >= size.height {
            return None;
        }
        let width = self.width.min(size.width - self.x);
        let height = self.height.min(size.height - self.y);
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            x: self.x,
            y: self.y,
            width,
            height,
        })
    }
}

/// Premultiplied RGBA8 pixel.
pub type Rgba8Premul = [u8; 4];

/// Opaque black.
pub const BLACK: Rgba8Premul = [0, 0, 0, 255];
/// Opaque white.
pub const WHITE: Rgba8Premul = [255, 255, 255, 255];
/// Fully transparent.
pub const TRANSPARENT: Rgba8Premul = [0, 0, 0, 0];

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
