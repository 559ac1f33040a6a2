use std::borrow::Cow;
use std::path::Path;

use crate::effects::composite::draw;
use crate::foundation::core::{Region, Size};
use crate::foundation::error::{TableauError, TableauResult};
use crate::render::frame::{Frame, FrameFactory};

/// Fonts tried in order when none is configured.
pub const DEFAULT_FONT_PATHS: &[&str] = &[
    "/System/Library/Fonts/SFNS.ttf",
    "/System/Library/Fonts/SFNSMono.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/ubuntu/Ubuntu-R.ttf",
];

pub const DEFAULT_FONT_SIZE_PX: f32 = 24.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TextBrush;

/// Draws one line of white text on an opaque black plate.
pub struct StatsPainter {
    factory: FrameFactory,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    family: String,
    font: vello_cpu::peniko::FontData,
    size_px: f32,
}

impl StatsPainter {
    /// Use the first font in `paths` that can be read and registered.
    ///
    /// `None` when no candidate works; statistics are then simply not drawn.
    pub fn discover<P: AsRef<Path>>(
        factory: FrameFactory,
        paths: &[P],
        size_px: f32,
    ) -> Option<Self> {
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                continue;
            }
            match Self::from_file(factory.clone(), path, size_px) {
                Ok(painter) => {
                    tracing::info!(
                        font = %path.display(),
                        family = %painter.family,
                        "statistics font loaded"
                    );
                    return Some(painter);
                }
                Err(err) => tracing::debug!(font = %path.display(), error = %err, "font rejected"),
            }
        }
        tracing::warn!("no usable font found, statistics overlay disabled");
        None
    }

    pub fn from_file(factory: FrameFactory, path: &Path, size_px: f32) -> TableauResult<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| TableauError::asset(format!("read font '{}': {e}", path.display())))?;
        Self::from_bytes(factory, bytes, size_px)
    }

    pub fn from_bytes(factory: FrameFactory, bytes: Vec<u8>, size_px: f32) -> TableauResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(TableauError::validation("font size_px must be finite and > 0"));
        }

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| TableauError::asset("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| TableauError::asset("registered font family has no name"))?
            .to_string();

        Ok(Self {
            factory,
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0),
            size_px,
        })
    }

    /// Rasterize `text` into its own frame.
    pub fn render(&mut self, text: &str) -> Option<Frame> {
        let mut builder = self.layout_ctx.ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(self.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrush));
        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);

        let width = layout.width().ceil().clamp(1.0, f32::from(u16::MAX)) as u16;
        let height = layout.height().ceil().clamp(1.0, f32::from(u16::MAX)) as u16;

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 255));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);

        let size = Size {
            width: u32::from(width),
            height: u32::from(height),
        };
        match self
            .factory
            .from_premul(size, pixmap.data_as_u8_slice().to_vec())
        {
            Ok(frame) => Some(frame),
            Err(err) => {
                tracing::warn!(error = %err, "statistics text rejected");
                None
            }
        }
    }

    /// Draw `text` onto `dst` with its top-left corner at (`x`, `y`).
    pub fn paint(&mut self, dst: &mut Frame, text: &str, x: u32, y: u32) {
        let Some(plate) = self.render(text) else {
            return;
        };
        let region = Region {
            x,
            y,
            width: plate.width(),
            height: plate.height(),
        };
        draw(dst, &plate, region, 1.0);
    }
}

impl std::fmt::Debug for StatsPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsPainter")
            .field("family", &self.family)
            .field("size_px", &self.size_px)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
