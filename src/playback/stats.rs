use std::time::Instant;

/// Elapsed-time and frame-rate accounting for one sequence's playback.
///
/// Time is only accumulated while playing. All clock readings are passed in, so callers decide
/// what "now" is.
#[derive(Clone, Debug)]
pub struct PlaybackStats {
    playback_time: f64,
    total_source_frames: u64,
    total_displayed_frames: u64,
    playing: bool,
    last_resume: Instant,
}

impl PlaybackStats {
    /// Fresh statistics, playing from `now` with every counter at zero.
    pub fn new(now: Instant) -> Self {
        Self {
            playback_time: 0.0,
            total_source_frames: 0,
            total_displayed_frames: 0,
            playing: true,
            last_resume: now,
        }
    }

    /// Seconds of playback so far.
    pub fn playback_time(&self) -> f64 {
        self.playback_time
    }

    pub fn total_source_frames(&self) -> u64 {
        self.total_source_frames
    }

    pub fn total_displayed_frames(&self) -> u64 {
        self.total_displayed_frames
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Fold the time elapsed since the last reading into `playback_time`, if playing.
    pub fn update_playback_time(&mut self, now: Instant) {
        if self.playing {
            self.playback_time += now.saturating_duration_since(self.last_resume).as_secs_f64();
            self.last_resume = now;
        }
    }

    /// Resume after a stall. The timer base moves to `now`, so the stall is not counted.
    pub fn resume(&mut self, now: Instant) {
        if !self.playing {
            self.last_resume = now;
            self.playing = true;
        }
    }

    pub fn pause(&mut self, now: Instant) {
        if self.playing {
            self.playback_time += now.saturating_duration_since(self.last_resume).as_secs_f64();
            self.playing = false;
        }
    }

    pub fn note_source_frame(&mut self) {
        self.total_source_frames += 1;
    }

    pub fn note_displayed_frame(&mut self) {
        self.total_displayed_frames += 1;
    }

    /// Count `n` source frames at once.
    pub fn add_source_frames(&mut self, n: u64) {
        self.total_source_frames = self.total_source_frames.saturating_add(n);
    }

    /// `HH:MM:SS.ss | Source frames: N (R/s) | Total frames: N (R/s)`
    pub fn format(&self) -> String {
        let t = self.playback_time.max(0.0);
        let hours = (t / 3600.0).floor();
        let minutes = ((t - hours * 3600.0) / 60.0).floor();
        let seconds = t - hours * 3600.0 - minutes * 60.0;

        let denom = t.max(0.001);
        let source_rate = self.total_source_frames as f64 / denom;
        let total_rate = self.total_displayed_frames as f64 / denom;

        format!(
            "{:02}:{:02}:{:05.2} | Source frames: {} ({:.1}/s) | Total frames: {} ({:.1}/s)",
            hours as u64,
            minutes as u64,
            seconds,
            self.total_source_frames,
            source_rate,
            self.total_displayed_frames,
            total_rate
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/stats.rs"]
mod tests;
