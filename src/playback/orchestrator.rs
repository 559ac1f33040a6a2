use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::assets::decode::{Fit, FrameLoader, ImageFileLoader};
use crate::assets::media::{EndedFeeder, FfmpegVideoOpener, VideoFeeder, VideoFrame, VideoOpener};
use crate::config::{Config, Playlist};
use crate::effects::composite::{draw, fill};
use crate::effects::interpolate::interpolate_between;
use crate::effects::transitions::TransitionGenerator;
use crate::foundation::core::{BLACK, Region, Size};
use crate::foundation::error::{TableauError, TableauResult};
use crate::playback::stats::PlaybackStats;
use crate::playback::wait::{WaitOutcome, poll_until};
use crate::render::frame::{Frame, FrameFactory};
use crate::render::layout::ScreenLayout;
use crate::render::surface::{Display, EventSource, InputEvent};
use crate::render::text::StatsPainter;
use crate::sequence::buffer::{BufferOptions, FrameSourceBuffer};

const STATS_ORIGIN: (u32, u32) = (10, 10);

/// Everything the orchestrator needs from the outside world.
pub struct Backends<S> {
    pub surface: S,
    /// Shared by every collaborator so all frames land in one ledger.
    pub factory: FrameFactory,
    pub loader: Arc<dyn FrameLoader>,
    pub videos: Box<dyn VideoOpener>,
    /// `None` disables the statistics line.
    pub painter: Option<StatsPainter>,
}

impl<S> Backends<S> {
    /// Image files through `image`, videos through `ffmpeg`, statistics in the first usable font.
    pub fn system(surface: S, cfg: &Config) -> Self {
        let factory = FrameFactory::new();
        let painter = if cfg.show_stats {
            StatsPainter::discover(factory.clone(), &cfg.font_paths, cfg.font_size_px)
        } else {
            None
        };
        Self {
            surface,
            loader: Arc::new(ImageFileLoader::new(factory.clone())),
            videos: Box::new(FfmpegVideoOpener::new(factory.clone(), cfg.working_size)),
            painter,
            factory,
        }
    }
}

/// Which state the orchestrator is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Sequence,
    FadeOut,
    Video,
    FadeIn,
    Stopped,
}

// Fields drop in declaration order, so the most recently acquired frames go first.
struct SequencePhase {
    interpolated: Vec<Frame>,
    next: Option<Frame>,
    current: Frame,
    buffer: FrameSourceBuffer,
    frame_in_sequence: usize,
}

impl SequencePhase {
    fn new(buffer: FrameSourceBuffer, current: Frame) -> Self {
        Self {
            interpolated: Vec::new(),
            next: None,
            current,
            buffer,
            frame_in_sequence: 0,
        }
    }

    /// The lookahead frame becomes current; the old current and the interpolated set go.
    fn promote(&mut self) {
        self.interpolated.clear();
        if let Some(next) = self.next.take() {
            self.current = next;
        }
        self.frame_in_sequence = 0;
    }
}

struct Fade {
    frames: Vec<Frame>,
    started: Instant,
}

enum VideoShown {
    /// White panel held until the decoder produces its first frame.
    Placeholder(Frame),
    Playing(Frame),
}

enum State {
    Sequence(SequencePhase),
    FadeOut {
        fade: Fade,
        sequence: SequencePhase,
    },
    Video {
        shown: VideoShown,
        feeder: Box<dyn VideoFeeder>,
    },
    FadeIn {
        fade: Fade,
        sequence: SequencePhase,
    },
    Stopped,
}

impl State {
    fn phase(&self) -> Phase {
        match self {
            Self::Sequence(_) => Phase::Sequence,
            Self::FadeOut { .. } => Phase::FadeOut,
            Self::Video { .. } => Phase::Video,
            Self::FadeIn { .. } => Phase::FadeIn,
            Self::Stopped => Phase::Stopped,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Placement {
    /// Into the working band on black.
    Working,
    /// Into the working band on black, overlay on top.
    WorkingWithOverlay,
    /// Already a full output composite.
    Full,
}

/// Screen composition and presentation.
struct Stage<S> {
    surface: S,
    layout: ScreenLayout,
    screen: Option<Frame>,
    overlay: Option<Frame>,
    painter: Option<StatsPainter>,
}

impl<S: Display> Stage<S> {
    fn show(&mut self, frame: &Frame, placement: Placement, status: Option<&str>) {
        let Some(screen) = self.screen.as_mut() else {
            return;
        };
        let full = Region::full(screen.size());
        fill(screen, BLACK);
        match placement {
            Placement::Full => draw(screen, frame, full, 1.0),
            Placement::Working | Placement::WorkingWithOverlay => {
                draw(screen, frame, self.layout.working_region(), 1.0);
                if placement == Placement::WorkingWithOverlay
                    && let Some(overlay) = self.overlay.as_ref()
                {
                    draw(screen, overlay, full, 1.0);
                }
            }
        }
        if let (Some(painter), Some(text)) = (self.painter.as_mut(), status) {
            painter.paint(screen, text, STATS_ORIGIN.0, STATS_ORIGIN.1);
        }
        self.surface.present(screen);
    }
}

impl<S: EventSource> EventSource for Stage<S> {
    fn poll(&mut self) -> Vec<InputEvent> {
        self.surface.poll()
    }
}

/// Drives playback: image sequence, fade to white, video, fade back, next sequence, forever.
pub struct Orchestrator<S: Display + EventSource> {
    config: Config,
    factory: FrameFactory,
    loader: Arc<dyn FrameLoader>,
    videos: Box<dyn VideoOpener>,
    transitions: TransitionGenerator,
    playlist: Playlist,
    stats: PlaybackStats,
    state: State,
    stage: Stage<S>,
    running: bool,
    torn_down: bool,
    last_tick: Option<Instant>,
    ticks: u64,
}

impl<S: Display + EventSource> Orchestrator<S> {
    /// Load the first sequence's overlay, start its buffer and wait for its first frame.
    ///
    /// A missing overlay is fatal. A quit request during the wait yields a stopped orchestrator.
    #[tracing::instrument(skip_all)]
    pub fn start(config: Config, backends: Backends<S>) -> TableauResult<Self> {
        config.validate()?;
        let layout = config.layout()?;
        let playlist = config.playlist()?;
        let Backends {
            surface,
            factory,
            loader,
            videos,
            painter,
        } = backends;

        let first = playlist.current().clone();
        let overlay = load_overlay(loader.as_ref(), &first.overlay_path, layout.output())
            .ok_or_else(|| {
                TableauError::asset(format!(
                    "failed to load overlay '{}'",
                    first.overlay_path.display()
                ))
            })?;

        if surface.size() != layout.output() {
            tracing::debug!(
                surface = ?surface.size(),
                output = ?layout.output(),
                "composing at output size, the surface scales"
            );
        }

        let mut buffer = FrameSourceBuffer::new(
            Arc::clone(&loader),
            BufferOptions::from_config(&config),
            &first.image_directory,
        )?;
        buffer.start(config.sequence_start_index)?;

        let transitions = TransitionGenerator::new(
            factory.clone(),
            layout,
            config.fade_duration_s,
            config.transition_fps,
        );
        let mut stage = Stage {
            surface,
            layout,
            screen: Some(factory.filled(layout.output(), BLACK)),
            overlay: Some(overlay),
            painter,
        };

        tracing::info!(
            sequence = %first.id,
            directory = %first.image_directory.display(),
            start_index = config.sequence_start_index,
            display_fps = config.display_fps(),
            "waiting for the first source frame"
        );
        let wait_poll = Duration::from_millis(config.wait_poll_ms);
        let outcome = poll_until(&mut stage, wait_poll, |_| buffer.try_pop());
        let (state, running) = match outcome {
            WaitOutcome::Ready(entry) => {
                tracing::info!(index = entry.index, "sequence playing");
                (State::Sequence(SequencePhase::new(buffer, entry.frame)), true)
            }
            WaitOutcome::Cancelled => (State::Stopped, false),
        };

        Ok(Self {
            config,
            factory,
            loader,
            videos,
            transitions,
            playlist,
            stats: PlaybackStats::new(Instant::now()),
            state,
            stage,
            running,
            torn_down: false,
            last_tick: None,
            ticks: 0,
        })
    }

    /// Run ticks at the display cadence until quit, then tear down.
    pub fn run(&mut self) -> TableauResult<()> {
        let interval = self.config.tick_interval();
        let result = loop {
            if !self.running {
                break Ok(());
            }
            let now = Instant::now();
            if let Some(last) = self.last_tick
                && now.duration_since(last) < interval
            {
                self.handle_events();
                std::thread::sleep(Duration::from_millis(1));
                continue;
            }
            self.last_tick = Some(now);
            if let Err(err) = self.tick(now) {
                break Err(err);
            }
        };
        self.teardown();
        result
    }

    /// One render-loop iteration at time `now`.
    pub fn tick(&mut self, now: Instant) -> TableauResult<()> {
        if self.torn_down {
            return Ok(());
        }
        self.handle_events();
        let status = self.status_line();
        let status = status.as_deref();

        let state = std::mem::replace(&mut self.state, State::Stopped);
        self.state = match state {
            State::Sequence(phase) => self.step_sequence(phase, now, status),
            State::FadeOut { fade, sequence } => self.step_fade_out(fade, sequence, now, status),
            State::Video { shown, feeder } => self.step_video(shown, feeder, now, status)?,
            State::FadeIn { fade, sequence } => self.step_fade_in(fade, sequence, now, status),
            State::Stopped => State::Stopped,
        };

        if !matches!(self.state, State::Stopped) {
            self.stats.update_playback_time(now);
            self.stats.note_displayed_frame();
        }
        self.ticks += 1;
        Ok(())
    }

    /// Release every live frame, the buffer and any video decoder. Later calls do nothing.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.running = false;

        let phase = self.state.phase();
        drop(std::mem::replace(&mut self.state, State::Stopped));
        self.stage.overlay = None;
        self.stage.screen = None;

        let ledger = self.factory.ledger().stats();
        tracing::info!(
            ?phase,
            ticks = self.ticks,
            allocated = ledger.allocated,
            released = ledger.released,
            live = ledger.live(),
            "teardown complete"
        );
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn stats(&self) -> &PlaybackStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut PlaybackStats {
        &mut self.stats
    }

    /// Position in the source/interpolated cadence, while a sequence is playing.
    pub fn frame_in_sequence(&self) -> Option<usize> {
        match &self.state {
            State::Sequence(phase) => Some(phase.frame_in_sequence),
            _ => None,
        }
    }

    /// Entries waiting in the active sequence's buffer.
    pub fn buffered_frames(&self) -> usize {
        match &self.state {
            State::Sequence(phase)
            | State::FadeOut {
                sequence: phase, ..
            }
            | State::FadeIn {
                sequence: phase, ..
            } => phase.buffer.len(),
            State::Video { .. } | State::Stopped => 0,
        }
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn has_overlay(&self) -> bool {
        self.stage.overlay.is_some()
    }

    pub fn factory(&self) -> &FrameFactory {
        &self.factory
    }

    fn handle_events(&mut self) {
        for event in self.stage.surface.poll() {
            match event {
                InputEvent::Quit => {
                    if self.running {
                        tracing::info!("quit requested");
                    }
                    self.running = false;
                }
                InputEvent::Key(key) => tracing::trace!(%key, "key ignored"),
            }
        }
    }

    fn status_line(&self) -> Option<String> {
        (self.config.show_stats && self.stage.painter.is_some()).then(|| self.stats.format())
    }

    fn trigger_reached(&self) -> bool {
        self.stats.playback_time() >= self.config.video_trigger_time_s
            || self.stats.total_source_frames() >= self.config.video_trigger_frame
    }

    /// Frame to show for a fade at `now`, and whether the fade is over.
    fn fade_position(&self, fade: &Fade, now: Instant) -> (usize, bool) {
        let m = fade.frames.len();
        let duration = self.config.fade_duration_s;
        let progress = if duration > 0.0 {
            now.saturating_duration_since(fade.started).as_secs_f64() / duration
        } else {
            1.0
        };
        let index = ((progress * m as f64).floor() as usize).min(m.saturating_sub(1));
        (index, progress >= 1.0)
    }

    fn step_sequence(
        &mut self,
        mut phase: SequencePhase,
        now: Instant,
        status: Option<&str>,
    ) -> State {
        if self.trigger_reached() {
            tracing::info!(
                playback_time = self.stats.playback_time(),
                source_frames = self.stats.total_source_frames(),
                "video trigger reached, fading out"
            );
            self.stage.show(&phase.current, Placement::WorkingWithOverlay, status);
            let generating = Instant::now();
            let frames = self
                .transitions
                .fade_to_white(&phase.current, self.stage.overlay.as_ref());
            let fade = Fade {
                frames,
                started: now + generating.elapsed(),
            };
            return State::FadeOut {
                fade,
                sequence: phase,
            };
        }

        let k = self.config.interpolation_count;
        if phase.frame_in_sequence == 0 {
            match phase.buffer.try_pop() {
                Some(entry) => {
                    if !self.stats.is_playing() {
                        tracing::debug!(index = entry.index, "source resumed");
                    }
                    self.stats.resume(now);
                    phase.interpolated.clear();
                    phase.interpolated =
                        interpolate_between(&self.factory, &phase.current, &entry.frame, k);
                    phase.next = Some(entry.frame);

                    self.stage.show(&phase.current, Placement::WorkingWithOverlay, status);
                    self.stats.note_source_frame();
                    if k == 0 {
                        phase.promote();
                    } else {
                        phase.frame_in_sequence = 1;
                    }
                }
                None => {
                    self.stage.show(&phase.current, Placement::WorkingWithOverlay, status);
                    if self.stats.is_playing() {
                        tracing::debug!("source starved, redisplaying the last frame");
                    }
                    self.stats.pause(now);
                }
            }
        } else {
            if let Some(frame) = phase.interpolated.get(phase.frame_in_sequence - 1) {
                self.stage.show(frame, Placement::WorkingWithOverlay, status);
            }
            if phase.frame_in_sequence >= k {
                phase.promote();
            } else {
                phase.frame_in_sequence += 1;
            }
        }
        State::Sequence(phase)
    }

    fn step_fade_out(
        &mut self,
        fade: Fade,
        sequence: SequencePhase,
        now: Instant,
        status: Option<&str>,
    ) -> State {
        let (index, done) = self.fade_position(&fade, now);
        if let Some(frame) = fade.frames.get(index) {
            self.stage.show(frame, Placement::Full, status);
        }
        if !done {
            return State::FadeOut { fade, sequence };
        }

        drop(fade);
        drop(sequence);

        let descriptor = self.playlist.current();
        let video_path = descriptor.video_path.clone();
        tracing::info!(
            sequence = %descriptor.id,
            video = %video_path.display(),
            "fade out complete, starting video"
        );
        let placeholder = self.transitions.white_placeholder();
        let feeder = self.open_video(&video_path);
        State::Video {
            shown: VideoShown::Placeholder(placeholder),
            feeder,
        }
    }

    fn step_video(
        &mut self,
        shown: VideoShown,
        mut feeder: Box<dyn VideoFeeder>,
        now: Instant,
        status: Option<&str>,
    ) -> TableauResult<State> {
        match shown {
            VideoShown::Placeholder(white) => {
                self.stage.show(&white, Placement::Working, status);
                match feeder.next_frame() {
                    VideoFrame::Frame(frame) => {
                        tracing::info!("first video frame");
                        drop(white);
                        Ok(State::Video {
                            shown: VideoShown::Playing(frame),
                            feeder,
                        })
                    }
                    VideoFrame::End => {
                        tracing::warn!("video ended before its first frame");
                        drop(white);
                        drop(feeder);
                        self.begin_next_sequence(now)
                    }
                }
            }
            VideoShown::Playing(frame) => {
                self.stage.show(&frame, Placement::Working, status);
                match feeder.next_frame() {
                    VideoFrame::Frame(next) => {
                        drop(frame);
                        Ok(State::Video {
                            shown: VideoShown::Playing(next),
                            feeder,
                        })
                    }
                    VideoFrame::End => {
                        drop(frame);
                        drop(feeder);
                        self.begin_next_sequence(now)
                    }
                }
            }
        }
    }

    fn step_fade_in(
        &mut self,
        fade: Fade,
        mut sequence: SequencePhase,
        now: Instant,
        status: Option<&str>,
    ) -> State {
        let (index, done) = self.fade_position(&fade, now);
        if let Some(frame) = fade.frames.get(index) {
            self.stage.show(frame, Placement::Full, status);
        }
        if !done {
            return State::FadeIn { fade, sequence };
        }

        drop(fade);
        self.stats = PlaybackStats::new(now);
        sequence.frame_in_sequence = 0;
        tracing::info!(sequence = %self.playlist.current().id, "fade in complete");
        State::Sequence(sequence)
    }

    /// Advance the playlist, swap the overlay and block on the new sequence's first frame while
    /// the white panel stays up.
    #[tracing::instrument(skip_all)]
    fn begin_next_sequence(&mut self, now: Instant) -> TableauResult<State> {
        let descriptor = self.playlist.advance().clone();
        let placeholder = self.transitions.white_placeholder();

        match load_overlay(
            self.loader.as_ref(),
            &descriptor.overlay_path,
            self.stage.layout.output(),
        ) {
            Some(overlay) => {
                self.stage.overlay = Some(overlay);
                tracing::info!(overlay = %descriptor.overlay_path.display(), "overlay replaced");
            }
            None => {
                self.stage.overlay = None;
                tracing::warn!(
                    overlay = %descriptor.overlay_path.display(),
                    "overlay failed to load, continuing without one"
                );
            }
        }

        let mut buffer = FrameSourceBuffer::new(
            Arc::clone(&self.loader),
            BufferOptions::from_config(&self.config),
            &descriptor.image_directory,
        )?;
        buffer.start(self.config.sequence_start_index)?;
        tracing::info!(
            sequence = %descriptor.id,
            index = self.playlist.index(),
            "waiting for the next sequence"
        );

        if !self.running {
            return Ok(State::Stopped);
        }

        let waited_from = Instant::now();
        self.stage.show(&placeholder, Placement::Working, None);
        let wait_poll = Duration::from_millis(self.config.wait_poll_ms);
        let outcome = poll_until(&mut self.stage, wait_poll, |stage| {
            buffer.try_pop().or_else(|| {
                stage.show(&placeholder, Placement::Working, None);
                None
            })
        });

        match outcome {
            WaitOutcome::Ready(entry) => {
                let frames = self
                    .transitions
                    .fade_from_white(&entry.frame, self.stage.overlay.as_ref());
                drop(placeholder);
                tracing::info!(index = entry.index, "sequence ready, fading in");
                Ok(State::FadeIn {
                    fade: Fade {
                        frames,
                        started: now + waited_from.elapsed(),
                    },
                    sequence: SequencePhase::new(buffer, entry.frame),
                })
            }
            WaitOutcome::Cancelled => {
                self.running = false;
                Ok(State::Stopped)
            }
        }
    }

    fn open_video(&self, path: &Path) -> Box<dyn VideoFeeder> {
        match self.videos.open(path) {
            Ok(feeder) => feeder,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "video failed to open");
                Box::new(EndedFeeder)
            }
        }
    }
}

impl<S: Display + EventSource> Drop for Orchestrator<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn load_overlay(loader: &dyn FrameLoader, path: &Path, size: Size) -> Option<Frame> {
    loader.load(path, Fit::overlay(size))
}
