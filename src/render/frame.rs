use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::core::{Rgba8Premul, Size};
use crate::foundation::error::{TableauError, TableauResult};

/// Allocation/release counters shared by every frame a [`FrameFactory`] hands out.
#[derive(Debug, Default)]
pub struct FrameLedger {
    allocated: AtomicU64,
    released: AtomicU64,
}

/// Point-in-time copy of a [`FrameLedger`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameLedgerStats {
    /// Frames created so far.
    pub allocated: u64,
    /// Frames dropped so far.
    pub released: u64,
}

impl FrameLedgerStats {
    /// Frames currently alive.
    pub fn live(self) -> u64 {
        self.allocated.saturating_sub(self.released)
    }
}

impl FrameLedger {
    /// Snapshot the counters.
    pub fn stats(&self) -> FrameLedgerStats {
        // Read `released` first so a concurrent drop can never make `live` underflow.
        let released = self.released.load(Ordering::Acquire);
        let allocated = self.allocated.load(Ordering::Acquire);
        FrameLedgerStats {
            allocated,
            released,
        }
    }

    fn note_alloc(&self) {
        self.allocated.fetch_add(1, Ordering::AcqRel);
    }

    fn note_release(&self) {
        self.released.fetch_add(1, Ordering::AcqRel);
    }
}

/// Factory for renderable frames.
///
/// Cheap to clone; clones share one ledger, so frames built on the producer thread and on the
/// render thread are accounted together.
#[derive(Clone, Debug, Default)]
pub struct FrameFactory {
    ledger: Arc<FrameLedger>,
}

impl FrameFactory {
    /// Create a factory with a fresh ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared ledger for every frame this factory (and its clones) produced.
    pub fn ledger(&self) -> &FrameLedger {
        &self.ledger
    }

    /// Allocate a frame filled with one premultiplied color.
    pub fn filled(&self, size: Size, rgba: Rgba8Premul) -> Frame {
        let mut data = vec![0u8; size.rgba_len()];
        if rgba != [0, 0, 0, 0] {
            for px in data.chunks_exact_mut(4) {
                px.copy_from_slice(&rgba);
            }
        }
        self.wrap(size, data)
    }

    /// Adopt a tightly packed premultiplied RGBA8 buffer.
    pub fn from_premul(&self, size: Size, data: Vec<u8>) -> TableauResult<Frame> {
        if data.len() != size.rgba_len() {
            return Err(TableauError::validation(format!(
                "frame buffer has {} bytes, expected {} for {}x{}",
                data.len(),
                size.rgba_len(),
                size.width,
                size.height
            )));
        }
        Ok(self.wrap(size, data))
    }

    /// Allocate an independent copy of `frame`.
    pub fn duplicate(&self, frame: &Frame) -> Frame {
        self.wrap(frame.size, frame.data.clone())
    }

    fn wrap(&self, size: Size, data: Vec<u8>) -> Frame {
        self.ledger.note_alloc();
        Frame {
            size,
            data,
            ledger: Arc::clone(&self.ledger),
        }
    }
}

/// An owned premultiplied RGBA8 pixel buffer.
///
/// Frames are deliberately not `Clone`: whoever holds the value owns it, moving it hands it off,
/// and dropping it is the one and only release.
pub struct Frame {
    size: Size,
    data: Vec<u8>,
    ledger: Arc<FrameLedger>,
}

impl Frame {
    /// Frame dimensions.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.size.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// Pixel bytes, row-major premultiplied RGBA8.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable pixel bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Read one pixel; `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let i = ((y as usize) * (self.size.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        self.ledger.note_release();
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.size.width)
            .field("height", &self.size.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
