use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::assets::decode::{Fit, FrameLoader};
use crate::config::Config;
use crate::foundation::core::Size;
use crate::foundation::error::{TableauError, TableauResult};
use crate::render::frame::Frame;

/// Longest single sleep the producer takes before rechecking for retirement.
const RETIRE_CHECK: Duration = Duration::from_millis(10);

/// One decoded source frame and its index on disk.
#[derive(Debug)]
pub struct BufferEntry {
    pub index: u64,
    pub frame: Frame,
}

/// Producer tunables for a [`FrameSourceBuffer`].
#[derive(Clone, Debug, PartialEq)]
pub struct BufferOptions {
    pub capacity: usize,
    pub frame_step: u64,
    pub extension: String,
    pub working_size: Size,
    /// Minimum spacing between two successful loads.
    pub source_interval: Duration,
    pub missing_file_backoff: Duration,
    pub full_buffer_backoff: Duration,
    pub poll: Duration,
}

impl BufferOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            capacity: cfg.buffer_capacity,
            frame_step: cfg.frame_step,
            extension: cfg.image_extension.clone(),
            working_size: cfg.working_size,
            source_interval: cfg.source_interval(),
            missing_file_backoff: Duration::from_millis(cfg.missing_file_backoff_ms),
            full_buffer_backoff: Duration::from_millis(cfg.full_buffer_backoff_ms),
            poll: Duration::from_millis(cfg.producer_poll_ms),
        }
    }
}

/// Path of source frame `index`: nine zero-padded digits plus the extension.
pub fn frame_path(directory: &Path, index: u64, extension: &str) -> PathBuf {
    directory.join(format!("{index:09}.{extension}"))
}

struct Shared {
    queue: Mutex<VecDeque<BufferEntry>>,
    capacity: usize,
    retired: AtomicBool,
    peak: AtomicUsize,
}

impl Shared {
    fn len(&self) -> usize {
        self.queue.lock().len()
    }

    fn push(&self, entry: BufferEntry) {
        let mut queue = self.queue.lock();
        queue.push_back(entry);
        self.peak.fetch_max(queue.len(), Ordering::Relaxed);
    }

    fn retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    /// Sleep for `d`, waking early once the buffer is retired.
    fn nap(&self, d: Duration) {
        let deadline = Instant::now() + d;
        loop {
            if self.retired() {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            std::thread::sleep((deadline - now).min(RETIRE_CHECK));
        }
    }
}

/// Bounded queue of decoded source frames filled by one background producer.
///
/// The orchestrator is the only consumer. Dropping the buffer retires the producer, joins it and
/// releases every queued frame.
pub struct FrameSourceBuffer {
    shared: Arc<Shared>,
    loader: Arc<dyn FrameLoader>,
    options: BufferOptions,
    directory: PathBuf,
    producer: Option<JoinHandle<()>>,
}

impl FrameSourceBuffer {
    pub fn new(
        loader: Arc<dyn FrameLoader>,
        options: BufferOptions,
        directory: impl Into<PathBuf>,
    ) -> TableauResult<Self> {
        if options.capacity == 0 {
            return Err(TableauError::validation("buffer capacity must be non-zero"));
        }
        if options.frame_step == 0 {
            return Err(TableauError::validation("frame step must be non-zero"));
        }
        Ok(Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(VecDeque::with_capacity(options.capacity)),
                capacity: options.capacity,
                retired: AtomicBool::new(false),
                peak: AtomicUsize::new(0),
            }),
            loader,
            options,
            directory: directory.into(),
            producer: None,
        })
    }

    /// Point the buffer at another directory, releasing any residual entries.
    ///
    /// Only allowed before [`FrameSourceBuffer::start`]; a running producer is never redirected.
    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) -> TableauResult<()> {
        if self.producer.is_some() {
            return Err(TableauError::validation(
                "cannot change the directory of a buffer whose producer is running",
            ));
        }
        self.shared.queue.lock().clear();
        self.directory = directory.into();
        Ok(())
    }

    /// Launch the producer at `from_index`. A buffer is started at most once.
    #[tracing::instrument(skip(self), fields(directory = %self.directory.display()))]
    pub fn start(&mut self, from_index: u64) -> TableauResult<()> {
        if self.producer.is_some() {
            return Err(TableauError::validation("buffer producer already started"));
        }
        let producer = Producer {
            shared: Arc::clone(&self.shared),
            loader: Arc::clone(&self.loader),
            options: self.options.clone(),
            directory: self.directory.clone(),
        };
        let handle = std::thread::Builder::new()
            .name("tableau-producer".to_string())
            .spawn(move || producer.run(from_index))
            .map_err(|e| TableauError::backend(format!("failed to spawn producer thread: {e}")))?;
        self.producer = Some(handle);
        tracing::info!(from_index, "producer started");
        Ok(())
    }

    /// Take the oldest entry, if any. Never blocks beyond the queue lock.
    pub fn try_pop(&self) -> Option<BufferEntry> {
        self.shared.queue.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.shared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Largest queue length observed so far.
    pub fn peak_len(&self) -> usize {
        self.shared.peak.load(Ordering::Relaxed)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn is_started(&self) -> bool {
        self.producer.is_some()
    }
}

impl Drop for FrameSourceBuffer {
    fn drop(&mut self) {
        self.shared.retired.store(true, Ordering::Release);
        if let Some(handle) = self.producer.take()
            && handle.join().is_err()
        {
            tracing::warn!("producer thread panicked");
        }
        let residual = {
            let mut queue = self.shared.queue.lock();
            std::mem::take(&mut *queue)
        };
        tracing::debug!(
            directory = %self.directory.display(),
            released = residual.len(),
            "buffer retired"
        );
    }
}

impl std::fmt::Debug for FrameSourceBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSourceBuffer")
            .field("directory", &self.directory)
            .field("len", &self.len())
            .field("capacity", &self.shared.capacity)
            .field("started", &self.producer.is_some())
            .finish()
    }
}

struct Producer {
    shared: Arc<Shared>,
    loader: Arc<dyn FrameLoader>,
    options: BufferOptions,
    directory: PathBuf,
}

impl Producer {
    fn run(self, from_index: u64) {
        let fit = Fit::letterbox(self.options.working_size);
        let mut index = from_index;
        let mut last_load = Instant::now();

        while !self.shared.retired() {
            let now = Instant::now();
            if now.duration_since(last_load) >= self.options.source_interval {
                if self.shared.len() >= self.shared.capacity {
                    self.shared.nap(self.options.full_buffer_backoff);
                    continue;
                }

                let path = frame_path(&self.directory, index, &self.options.extension);
                if !path.exists() {
                    tracing::trace!(path = %path.display(), "waiting for source frame");
                    self.shared.nap(self.options.missing_file_backoff);
                    continue;
                }

                match self.loader.load(&path, fit) {
                    Some(frame) => {
                        if self.shared.retired() {
                            break;
                        }
                        self.shared.push(BufferEntry { index, frame });
                        tracing::trace!(index, "source frame buffered");
                        index = index.saturating_add(self.options.frame_step);
                        last_load = now;
                    }
                    None => self.shared.nap(self.options.missing_file_backoff),
                }
            }
            self.shared.nap(self.options.poll);
        }
        tracing::info!(next_index = index, "producer retired");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/buffer.rs"]
mod tests;
