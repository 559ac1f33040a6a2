use crate::foundation::core::{Region, Size};
use crate::foundation::error::{TableauError, TableauResult};

/// Screen geometry: a full output surface with a letterboxed working band centered vertically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenLayout {
    output: Size,
    working: Size,
    bar_px: u32,
}

impl ScreenLayout {
    /// Validate and build a layout.
    ///
    /// `bar_px` is the height of the black bars kept above and below the white panel inside the
    /// working band.
    pub fn new(output: Size, working: Size, bar_px: u32) -> TableauResult<Self> {
        if working.width > output.width || working.height > output.height {
            return Err(TableauError::validation(format!(
                "working area {}x{} does not fit the output {}x{}",
                working.width, working.height, output.width, output.height
            )));
        }
        if bar_px.saturating_mul(2) >= working.height {
            return Err(TableauError::validation(format!(
                "letterbox bars of {bar_px}px leave no room in a {}px working area",
                working.height
            )));
        }
        Ok(Self {
            output,
            working,
            bar_px,
        })
    }

    /// Full output resolution.
    pub fn output(&self) -> Size {
        self.output
    }

    /// Working (letterboxed image) resolution.
    pub fn working(&self) -> Size {
        self.working
    }

    /// Where the working band sits on the output surface.
    pub fn working_region(&self) -> Region {
        Region::centered(self.working, self.output)
    }

    /// The white panel inside a working-resolution frame.
    pub fn white_panel(&self) -> Region {
        Region {
            x: 0,
            y: self.bar_px,
            width: self.working.width,
            height: self.working.height - 2 * self.bar_px,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/layout.rs"]
mod tests;
