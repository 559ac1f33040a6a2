#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tableau::{
    Backends, Config, Display, EventSource, Fit, Frame, FrameFactory, FrameLoader, InputEvent,
    Rgba8Premul, SequenceDescriptor, Size, TRANSPARENT, TableauResult, VideoFeeder, VideoFrame,
    VideoOpener, frame_path,
};

pub const OUTPUT: Size = Size {
    width: 8,
    height: 6,
};
pub const WORKING: Size = Size {
    width: 8,
    height: 4,
};
/// Centre of the working band, inside the white panel of the placeholder.
pub const SAMPLE_AT: (u32, u32) = (4, 3);
pub const VIDEO_RGBA: Rgba8Premul = [200, 0, 0, 255];

pub fn gray(index: u64) -> u8 {
    (index * 40 % 256) as u8
}

/// Loader that ignores file contents: numbered stills become gray frames, overlays transparent.
pub struct GrayLoader {
    factory: FrameFactory,
}

impl GrayLoader {
    pub fn new(factory: FrameFactory) -> Self {
        Self { factory }
    }
}

impl FrameLoader for GrayLoader {
    fn load(&self, path: &Path, fit: Fit) -> Option<Frame> {
        if !path.exists() {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        if let Ok(index) = stem.parse::<u64>() {
            let v = gray(index);
            return Some(self.factory.filled(fit.size, [v, v, v, 255]));
        }
        stem.starts_with("overlay")
            .then(|| self.factory.filled(fit.size, TRANSPARENT))
    }
}

/// Every opened video yields `frames` solid frames, then ends.
pub struct ScriptedVideos {
    factory: FrameFactory,
    frames: usize,
    opened: Arc<Mutex<Vec<PathBuf>>>,
}

impl ScriptedVideos {
    pub fn new(factory: FrameFactory, frames: usize) -> (Self, Arc<Mutex<Vec<PathBuf>>>) {
        let opened = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                factory,
                frames,
                opened: Arc::clone(&opened),
            },
            opened,
        )
    }
}

impl VideoOpener for ScriptedVideos {
    fn open(&self, path: &Path) -> TableauResult<Box<dyn VideoFeeder>> {
        self.opened.lock().push(path.to_path_buf());
        Ok(Box::new(ScriptedFeeder {
            factory: self.factory.clone(),
            remaining: self.frames,
        }))
    }
}

struct ScriptedFeeder {
    factory: FrameFactory,
    remaining: usize,
}

impl VideoFeeder for ScriptedFeeder {
    fn next_frame(&mut self) -> VideoFrame {
        if self.remaining == 0 {
            return VideoFrame::End;
        }
        self.remaining -= 1;
        VideoFrame::Frame(self.factory.filled(WORKING, VIDEO_RGBA))
    }
}

/// Handles into a [`RecordingDisplay`] that stay usable after the display moves.
#[derive(Clone, Default)]
pub struct Recording {
    samples: Arc<Mutex<Vec<Rgba8Premul>>>,
    pending: Arc<Mutex<VecDeque<InputEvent>>>,
    quit: Arc<AtomicBool>,
    polls: Arc<AtomicUsize>,
}

impl Recording {
    pub fn display(&self) -> RecordingDisplay {
        RecordingDisplay { rec: self.clone() }
    }

    /// Sampled pixel of every presented frame, in order.
    pub fn samples(&self) -> Vec<Rgba8Premul> {
        self.samples.lock().clone()
    }

    pub fn presented(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn count(&self, rgba: Rgba8Premul) -> usize {
        self.samples.lock().iter().filter(|p| **p == rgba).count()
    }

    pub fn push_event(&self, event: InputEvent) {
        self.pending.lock().push_back(event);
    }

    /// From now on every poll reports `Quit`.
    pub fn hold_quit(&self) {
        self.quit.store(true, Ordering::Release);
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::Acquire)
    }
}

pub struct RecordingDisplay {
    rec: Recording,
}

impl Display for RecordingDisplay {
    fn size(&self) -> Size {
        OUTPUT
    }

    fn present(&mut self, frame: &Frame) {
        let sample = frame.pixel(SAMPLE_AT.0, SAMPLE_AT.1).unwrap_or(TRANSPARENT);
        self.rec.samples.lock().push(sample);
    }
}

impl EventSource for RecordingDisplay {
    fn poll(&mut self) -> Vec<InputEvent> {
        self.rec.polls.fetch_add(1, Ordering::AcqRel);
        let mut events: Vec<InputEvent> = self.rec.pending.lock().drain(..).collect();
        if self.rec.quit.load(Ordering::Acquire) {
            events.push(InputEvent::Quit);
        }
        events
    }
}

/// Scratch installation: one directory per sequence with touched stills and an overlay.
pub struct Installation {
    dir: tempfile::TempDir,
}

impl Installation {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn sequence(&self, id: &str, indices: impl IntoIterator<Item = u64>) -> SequenceDescriptor {
        let root = self.dir.path().join(id);
        let frames = root.join("frames");
        std::fs::create_dir_all(&frames).expect("create sequence dir");
        let overlay_path = root.join("overlay.png");
        std::fs::write(&overlay_path, b"").expect("touch overlay");
        let descriptor = SequenceDescriptor {
            id: id.to_string(),
            image_directory: frames,
            overlay_path,
            video_path: root.join("clip.mp4"),
        };
        add_frames(&descriptor, indices);
        descriptor
    }
}

pub fn add_frames(descriptor: &SequenceDescriptor, indices: impl IntoIterator<Item = u64>) {
    for index in indices {
        let path = frame_path(&descriptor.image_directory, index, "png");
        std::fs::write(path, b"").expect("touch still");
    }
}

/// Tiny screen, fast producer, triggers out of reach.
pub fn config(playlist: Vec<SequenceDescriptor>) -> Config {
    Config {
        output_size: OUTPUT,
        working_size: WORKING,
        letterbox_bar_px: 1,
        buffer_capacity: 4,
        frame_step: 1,
        source_fps: 50,
        interpolation_count: 4,
        sequence_start_index: 1,
        image_extension: "png".to_string(),
        video_trigger_frame: u64::MAX,
        video_trigger_time_s: 1.0e9,
        fade_duration_s: 0.1,
        transition_fps: 20,
        missing_file_backoff_ms: 2,
        full_buffer_backoff_ms: 2,
        producer_poll_ms: 1,
        wait_poll_ms: 2,
        show_stats: false,
        font_paths: Vec::new(),
        playlist,
        ..Config::default()
    }
}

pub fn backends(
    rec: &Recording,
    factory: &FrameFactory,
    video_frames: usize,
) -> (Backends<RecordingDisplay>, Arc<Mutex<Vec<PathBuf>>>) {
    let (videos, opened) = ScriptedVideos::new(factory.clone(), video_frames);
    let backends = Backends {
        surface: rec.display(),
        factory: factory.clone(),
        loader: Arc::new(GrayLoader::new(factory.clone())),
        videos: Box::new(videos),
        painter: None,
    };
    (backends, opened)
}

/// Poll `cond` until it holds, failing the test after a few seconds.
pub fn wait_for(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        std::thread::sleep(Duration::from_millis(2));
    }
}

/// Collapse consecutive duplicates.
pub fn runs<T: PartialEq + Copy>(items: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for item in items {
        if out.last() != Some(item) {
            out.push(*item);
        }
    }
    out
}
