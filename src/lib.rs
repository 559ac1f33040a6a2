//! Tableau is an unattended fullscreen player for art installations.
//!
//! A playlist of sequences loops forever. Each sequence is a directory of numbered stills shown
//! with eased in-between frames under an overlay. When a trigger is reached, the picture fades to
//! white, a video plays, and the next sequence fades back in.
//!
//! - Describe the installation with a [`Config`]
//! - Bundle the outside world into [`Backends`]
//! - Drive it with an [`Orchestrator`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod assets;
pub(crate) mod config;
pub(crate) mod effects;
pub(crate) mod playback;
pub(crate) mod render;
pub(crate) mod sequence;

pub use crate::foundation::core::{BLACK, Region, Rgba8Premul, Size, TRANSPARENT, WHITE};
pub use crate::foundation::error::{TableauError, TableauResult};

pub use crate::animation::ease::Ease;
pub use crate::assets::decode::{Fit, FrameLoader, ImageFileLoader, Padding};
pub use crate::assets::media::{
    EndedFeeder, FfmpegVideoFeeder, FfmpegVideoOpener, VideoFeeder, VideoFrame, VideoOpener,
    is_ffmpeg_on_path, letterbox_filter,
};
pub use crate::config::{Config, Playlist, SequenceDescriptor};
pub use crate::effects::composite::{draw, fill, fill_region, over};
pub use crate::effects::interpolate::{interpolate, interpolate_between, interpolation_alphas};
pub use crate::effects::transitions::{
    FadeDirection, TransitionGenerator, fade_progress, transition_frame_count, white_alpha,
};
pub use crate::playback::orchestrator::{Backends, Orchestrator, Phase};
pub use crate::playback::stats::PlaybackStats;
pub use crate::playback::wait::{WaitOutcome, poll_until};
pub use crate::render::frame::{Frame, FrameFactory, FrameLedger, FrameLedgerStats};
pub use crate::render::layout::ScreenLayout;
pub use crate::render::surface::{Display, EventSource, InputEvent};
pub use crate::render::text::{DEFAULT_FONT_PATHS, DEFAULT_FONT_SIZE_PX, StatsPainter};
#[cfg(feature = "display")]
pub use crate::render::window::{WindowDisplay, aspect_fit};
pub use crate::sequence::buffer::{BufferEntry, BufferOptions, FrameSourceBuffer, frame_path};
