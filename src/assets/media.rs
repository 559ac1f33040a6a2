use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::foundation::core::Size;
use crate::foundation::error::{TableauError, TableauResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::render::frame::{Frame, FrameFactory};

/// One pull from a video source.
#[derive(Debug)]
pub enum VideoFrame {
    Frame(Frame),
    /// The stream is exhausted (or failed); every later pull returns `End` again.
    End,
}

/// Sequential frame source for one opened video.
pub trait VideoFeeder {
    fn next_frame(&mut self) -> VideoFrame;
}

/// Opens video files as [`VideoFeeder`]s.
pub trait VideoOpener {
    fn open(&self, path: &Path) -> TableauResult<Box<dyn VideoFeeder>>;
}

/// A feeder that has nothing to give. Stands in for a video that could not be opened.
#[derive(Clone, Copy, Debug, Default)]
pub struct EndedFeeder;

impl VideoFeeder for EndedFeeder {
    fn next_frame(&mut self) -> VideoFrame {
        VideoFrame::End
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// `ffmpeg` filter that letterboxes any input to exactly `size`.
pub fn letterbox_filter(size: Size) -> String {
    let (w, h) = (size.width, size.height);
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,\
         pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black"
    )
}

/// Opens videos with the system `ffmpeg` binary, decoding to letterboxed RGBA frames.
#[derive(Clone, Debug)]
pub struct FfmpegVideoOpener {
    factory: FrameFactory,
    size: Size,
}

impl FfmpegVideoOpener {
    pub fn new(factory: FrameFactory, size: Size) -> Self {
        Self { factory, size }
    }
}

impl VideoOpener for FfmpegVideoOpener {
    fn open(&self, path: &Path) -> TableauResult<Box<dyn VideoFeeder>> {
        Ok(Box::new(FfmpegVideoFeeder::spawn(
            path,
            self.size,
            self.factory.clone(),
        )?))
    }
}

/// Streams raw RGBA frames from an `ffmpeg` child process.
pub struct FfmpegVideoFeeder {
    path: PathBuf,
    size: Size,
    factory: FrameFactory,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    frames_read: u64,
}

impl FfmpegVideoFeeder {
    #[tracing::instrument(skip(factory), fields(path = %path.display()))]
    pub fn spawn(path: &Path, size: Size, factory: FrameFactory) -> TableauResult<Self> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.args(["-loglevel", "error", "-nostdin", "-i"])
            .arg(path)
            .args([
                "-an",
                "-vf",
                &letterbox_filter(size),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ]);

        let mut child = cmd.spawn().map_err(|e| {
            TableauError::decode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TableauError::decode("failed to open ffmpeg stdout (unexpected)"))?;

        if let Some(stderr) = child.stderr.take() {
            let shown = path.display().to_string();
            std::thread::Builder::new()
                .name("ffmpeg-stderr".to_string())
                .spawn(move || {
                    for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                        tracing::warn!(path = %shown, "ffmpeg: {line}");
                    }
                })
                .map_err(|e| TableauError::decode(format!("failed to spawn stderr reader: {e}")))?;
        }

        tracing::info!("video opened");
        Ok(Self {
            path: path.to_path_buf(),
            size,
            factory,
            child: Some(child),
            stdout: Some(stdout),
            frames_read: 0,
        })
    }

    /// Frames delivered so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    fn read_frame(&mut self) -> Option<Frame> {
        let stdout = self.stdout.as_mut()?;
        let mut data = vec![0u8; self.size.rgba_len()];
        match stdout.read_exact(&mut data) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                tracing::info!(
                    path = %self.path.display(),
                    frames = self.frames_read,
                    "video ended"
                );
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "video read failed");
                return None;
            }
        }
        premultiply_rgba8_in_place(&mut data);
        match self.factory.from_premul(self.size, data) {
            Ok(frame) => Some(frame),
            Err(err) => {
                tracing::warn!(error = %err, "video frame rejected");
                None
            }
        }
    }

    fn finish(&mut self) {
        drop(self.stdout.take());
        if let Some(mut child) = self.child.take() {
            // Kill is a no-op error when the process already exited.
            let _ = child.kill();
            match child.wait() {
                Ok(status) => tracing::debug!(%status, "ffmpeg exited"),
                Err(e) => tracing::warn!(error = %e, "failed to reap ffmpeg"),
            }
        }
    }
}

impl VideoFeeder for FfmpegVideoFeeder {
    fn next_frame(&mut self) -> VideoFrame {
        match self.read_frame() {
            Some(frame) => {
                self.frames_read += 1;
                VideoFrame::Frame(frame)
            }
            None => {
                self.finish();
                VideoFrame::End
            }
        }
    }
}

impl Drop for FfmpegVideoFeeder {
    fn drop(&mut self) {
        self.finish();
    }
}

impl std::fmt::Debug for FfmpegVideoFeeder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegVideoFeeder")
            .field("path", &self.path)
            .field("size", &self.size)
            .field("frames_read", &self.frames_read)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
