use std::path::Path;

use anyhow::Context;
use image::imageops::{self, FilterType};

use crate::foundation::core::Size;
use crate::foundation::error::TableauResult;
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::render::frame::{Frame, FrameFactory};

/// What the letterbox padding around a fitted image is filled with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Padding {
    /// Opaque black; the source alpha channel is discarded.
    Opaque,
    /// Fully transparent; the source alpha channel is kept.
    Transparent,
}

/// How a decoded image is fitted to its destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fit {
    pub size: Size,
    pub keep_aspect: bool,
    pub padding: Padding,
}

impl Fit {
    /// Aspect-preserving fit for playback frames.
    pub fn letterbox(size: Size) -> Self {
        Self {
            size,
            keep_aspect: true,
            padding: Padding::Opaque,
        }
    }

    /// Aspect-preserving fit for overlays, which need their alpha.
    pub fn overlay(size: Size) -> Self {
        Self {
            size,
            keep_aspect: true,
            padding: Padding::Transparent,
        }
    }
}

/// Reads one still image and fits it to a fixed size.
///
/// Failures are absorbed: a missing or undecodable file yields `None`.
pub trait FrameLoader: Send + Sync {
    fn load(&self, path: &Path, fit: Fit) -> Option<Frame>;
}

/// [`FrameLoader`] backed by the `image` crate.
#[derive(Clone, Debug)]
pub struct ImageFileLoader {
    factory: FrameFactory,
}

impl ImageFileLoader {
    pub fn new(factory: FrameFactory) -> Self {
        Self { factory }
    }

    /// Decode and fit `path`, surfacing the error instead of absorbing it.
    pub fn decode_fitted(&self, path: &Path, fit: Fit) -> TableauResult<Frame> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        let decoded = image::load_from_memory(&bytes)
            .with_context(|| format!("decode image '{}'", path.display()))?;

        let mut rgba = decoded.to_rgba8();
        if fit.padding == Padding::Opaque {
            for px in rgba.pixels_mut() {
                px.0[3] = 255;
            }
        }

        let (w, h) = rgba.dimensions();
        let source = Size {
            width: w.max(1),
            height: h.max(1),
        };
        let fitted = if fit.keep_aspect {
            let inner = source.fit_within(fit.size);
            let resized = imageops::resize(&rgba, inner.width, inner.height, FilterType::Lanczos3);
            let pad = match fit.padding {
                Padding::Opaque => image::Rgba([0, 0, 0, 255]),
                Padding::Transparent => image::Rgba([0, 0, 0, 0]),
            };
            let mut canvas = image::RgbaImage::from_pixel(fit.size.width, fit.size.height, pad);
            let x = i64::from((fit.size.width - inner.width) / 2);
            let y = i64::from((fit.size.height - inner.height) / 2);
            imageops::replace(&mut canvas, &resized, x, y);
            canvas
        } else {
            imageops::resize(&rgba, fit.size.width, fit.size.height, FilterType::Lanczos3)
        };

        let mut data = fitted.into_raw();
        premultiply_rgba8_in_place(&mut data);
        self.factory.from_premul(fit.size, data)
    }
}

impl FrameLoader for ImageFileLoader {
    fn load(&self, path: &Path, fit: Fit) -> Option<Frame> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "image not found");
            return None;
        }
        match self.decode_fitted(path, fit) {
            Ok(frame) => Some(frame),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "image load failed");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
