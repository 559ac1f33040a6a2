use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

use crate::effects::transitions::transition_frame_count;
use crate::foundation::core::Size;
use crate::foundation::error::{TableauError, TableauResult};
use crate::render::layout::ScreenLayout;
use crate::render::text::{DEFAULT_FONT_PATHS, DEFAULT_FONT_SIZE_PX};

/// One playlist entry: numbered stills, the overlay drawn over them, and the video that follows.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SequenceDescriptor {
    pub id: String,
    pub image_directory: PathBuf,
    pub overlay_path: PathBuf,
    pub video_path: PathBuf,
}

/// Installation settings. Every field falls back to its default when absent from the file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output_size: Size,
    pub working_size: Size,
    pub letterbox_bar_px: u32,

    pub buffer_capacity: usize,
    pub frame_step: u64,
    pub source_fps: u32,
    pub interpolation_count: usize,
    pub sequence_start_index: u64,
    pub image_extension: String,

    pub video_trigger_frame: u64,
    pub video_trigger_time_s: f64,
    pub fade_duration_s: f64,
    pub transition_fps: u32,

    pub missing_file_backoff_ms: u64,
    pub full_buffer_backoff_ms: u64,
    pub producer_poll_ms: u64,
    pub wait_poll_ms: u64,

    pub show_stats: bool,
    pub font_paths: Vec<PathBuf>,
    pub font_size_px: f32,

    pub playlist: Vec<SequenceDescriptor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_size: Size {
                width: 3840,
                height: 2160,
            },
            working_size: Size {
                width: 3840,
                height: 1280,
            },
            letterbox_bar_px: 40,
            buffer_capacity: 12,
            frame_step: 1,
            source_fps: 4,
            interpolation_count: 4,
            sequence_start_index: 50,
            image_extension: "jpg".to_string(),
            video_trigger_frame: 200,
            video_trigger_time_s: 15.0,
            fade_duration_s: 2.0,
            transition_fps: 60,
            missing_file_backoff_ms: 500,
            full_buffer_backoff_ms: 100,
            producer_poll_ms: 1,
            wait_poll_ms: 100,
            show_stats: true,
            font_paths: DEFAULT_FONT_PATHS.iter().map(PathBuf::from).collect(),
            font_size_px: DEFAULT_FONT_SIZE_PX,
            playlist: vec![SequenceDescriptor {
                id: "tmpl".to_string(),
                image_directory: PathBuf::from("results/tmpl"),
                overlay_path: PathBuf::from("results/overlay.png"),
                video_path: PathBuf::from("results/0145.mp4"),
            }],
        }
    }
}

impl Config {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> TableauResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json(&text)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> TableauResult<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            let cfg = Self::default();
            cfg.validate()?;
            return Ok(cfg);
        }
        Self::load(path)
    }

    pub fn from_json(text: &str) -> TableauResult<Self> {
        let cfg: Self = serde_json::from_str(text)
            .map_err(|e| TableauError::serde(format!("config JSON is invalid: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> TableauResult<()> {
        Size::new(self.output_size.width, self.output_size.height)?;
        Size::new(self.working_size.width, self.working_size.height)?;
        self.layout()?;

        if self.buffer_capacity == 0 {
            return Err(TableauError::validation("buffer_capacity must be non-zero"));
        }
        if self.frame_step == 0 {
            return Err(TableauError::validation("frame_step must be non-zero"));
        }
        if self.source_fps == 0 {
            return Err(TableauError::validation("source_fps must be non-zero"));
        }
        if self.transition_fps == 0 {
            return Err(TableauError::validation("transition_fps must be non-zero"));
        }
        for (name, v) in [
            ("video_trigger_time_s", self.video_trigger_time_s),
            ("fade_duration_s", self.fade_duration_s),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(TableauError::validation(format!(
                    "{name} must be finite and >= 0, got {v}"
                )));
            }
        }
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(TableauError::validation("font_size_px must be finite and > 0"));
        }
        if self.image_extension.is_empty() || self.image_extension.contains(['/', '.']) {
            return Err(TableauError::validation(format!(
                "image_extension '{}' must be a bare extension like \"jpg\"",
                self.image_extension
            )));
        }
        if self.playlist.is_empty() {
            return Err(TableauError::validation("playlist must contain at least one sequence"));
        }
        Ok(())
    }

    pub fn layout(&self) -> TableauResult<ScreenLayout> {
        ScreenLayout::new(self.output_size, self.working_size, self.letterbox_bar_px)
    }

    /// Display cadence: one source frame plus its interpolated frames per source period.
    pub fn display_fps(&self) -> u32 {
        let per_source =
            u32::try_from(self.interpolation_count.saturating_add(1)).unwrap_or(u32::MAX);
        self.source_fps.saturating_mul(per_source)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.display_fps().max(1)))
    }

    pub fn source_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.source_fps.max(1)))
    }

    pub fn transition_frame_count(&self) -> usize {
        transition_frame_count(self.fade_duration_s, self.transition_fps)
    }

    pub fn playlist(&self) -> TableauResult<Playlist> {
        Playlist::new(self.playlist.clone())
    }
}

/// Cyclic cursor over the configured sequences.
#[derive(Clone, Debug)]
pub struct Playlist {
    entries: Vec<SequenceDescriptor>,
    index: usize,
}

impl Playlist {
    pub fn new(entries: Vec<SequenceDescriptor>) -> TableauResult<Self> {
        if entries.is_empty() {
            return Err(TableauError::validation("playlist must contain at least one sequence"));
        }
        Ok(Self { entries, index: 0 })
    }

    pub fn current(&self) -> &SequenceDescriptor {
        &self.entries[self.index]
    }

    /// Move to the next sequence, wrapping after the last one.
    pub fn advance(&mut self) -> &SequenceDescriptor {
        self.index = (self.index + 1) % self.entries.len();
        self.current()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
