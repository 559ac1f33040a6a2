use crate::animation::ease::Ease;
use crate::effects::composite::{draw, fill_region};
use crate::foundation::core::{BLACK, Region, WHITE};
use crate::foundation::math::unit_to_alpha_u8;
use crate::render::frame::{Frame, FrameFactory};
use crate::render::layout::ScreenLayout;

/// Fade sets above this size are reported when the generator is built.
const LARGE_FADE_BYTES: usize = 1 << 30;

/// Which way a fade runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeDirection {
    /// Live composite dissolves into the white panel (exponential ease-in).
    ToWhite,
    /// White panel dissolves into the live composite (exponential ease-out).
    FromWhite,
}

/// Number of frames in one fade: `round(duration × fps)`, never less than one.
///
/// A zero-length fade degenerates to a single frame showing the end state.
pub fn transition_frame_count(fade_duration_s: f64, transition_fps: u32) -> usize {
    let m = (fade_duration_s * f64::from(transition_fps)).round();
    if !m.is_finite() || m < 1.0 {
        return 1;
    }
    m as usize
}

/// Normalized progress of fade frame `i` out of `count`.
pub fn fade_progress(i: usize, count: usize) -> f64 {
    if count <= 1 {
        return 1.0;
    }
    i as f64 / (count - 1) as f64
}

/// Alpha of the white panel for fade frame `i` out of `count`.
pub fn white_alpha(direction: FadeDirection, i: usize, count: usize) -> u8 {
    let progress = fade_progress(i, count);
    match direction {
        FadeDirection::ToWhite => unit_to_alpha_u8(Ease::InExpo.apply(progress)),
        FadeDirection::FromWhite => unit_to_alpha_u8(1.0 - Ease::OutExpo.apply(progress)),
    }
}

/// Precomputes fully rendered fades between a live composite and the white panel.
///
/// A fade is held as `frame_count` output-size frames and is generated on the calling thread.
/// At 3840x2160, 60 fps and 2 s that is 120 frames, close to 4 GB.
#[derive(Clone, Debug)]
pub struct TransitionGenerator {
    factory: FrameFactory,
    layout: ScreenLayout,
    frame_count: usize,
}

impl TransitionGenerator {
    /// Create a generator producing `transition_frame_count(fade_duration_s, transition_fps)`
    /// frames per fade.
    pub fn new(
        factory: FrameFactory,
        layout: ScreenLayout,
        fade_duration_s: f64,
        transition_fps: u32,
    ) -> Self {
        let generator = Self {
            factory,
            layout,
            frame_count: transition_frame_count(fade_duration_s, transition_fps),
        };
        let bytes = generator.fade_memory_bytes();
        if bytes > LARGE_FADE_BYTES {
            tracing::warn!(
                frames = generator.frame_count,
                mib = bytes >> 20,
                "each fade holds a large precomputed frame set"
            );
        }
        generator
    }

    /// Frames per fade.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Pixel memory held by one generated fade.
    pub fn fade_memory_bytes(&self) -> usize {
        self.frame_count.saturating_mul(self.layout.output().rgba_len())
    }

    /// Fade from the live composite to the white panel.
    pub fn fade_to_white(&self, live: &Frame, overlay: Option<&Frame>) -> Vec<Frame> {
        self.fade(live, overlay, FadeDirection::ToWhite)
    }

    /// Fade from the white panel to the live composite.
    pub fn fade_from_white(&self, live: &Frame, overlay: Option<&Frame>) -> Vec<Frame> {
        self.fade(live, overlay, FadeDirection::FromWhite)
    }

    /// Working-resolution black frame with the white panel between the letterbox bars.
    pub fn white_placeholder(&self) -> Frame {
        let mut white = self.factory.filled(self.layout.working(), BLACK);
        fill_region(&mut white, self.layout.white_panel(), WHITE);
        white
    }

    /// Output-resolution composite of `live` in the working band with `overlay` on top.
    pub fn compose_live(&self, live: &Frame, overlay: Option<&Frame>) -> Frame {
        let mut base = self.factory.filled(self.layout.output(), BLACK);
        draw(&mut base, live, self.layout.working_region(), 1.0);
        if let Some(overlay) = overlay {
            let full = Region::full(base.size());
            draw(&mut base, overlay, full, 1.0);
        }
        base
    }

    #[tracing::instrument(skip_all, fields(direction = ?direction, frames = self.frame_count))]
    fn fade(&self, live: &Frame, overlay: Option<&Frame>, direction: FadeDirection) -> Vec<Frame> {
        let base = self.compose_live(live, overlay);
        let white = self.white_placeholder();
        let region = self.layout.working_region();

        let frames: Vec<Frame> = (0..self.frame_count)
            .map(|i| {
                let alpha = white_alpha(direction, i, self.frame_count);
                let mut frame = self.factory.duplicate(&base);
                draw(&mut frame, &white, region, f32::from(alpha) / 255.0);
                frame
            })
            .collect();
        tracing::debug!(frames = frames.len(), "fade frames ready");
        frames
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/transitions.rs"]
mod tests;
