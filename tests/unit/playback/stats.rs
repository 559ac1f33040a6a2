use std::time::Duration;

use super::*;

fn at(t0: Instant, ms: u64) -> Instant {
    t0 + Duration::from_millis(ms)
}

#[test]
fn fresh_instance_starts_at_zero_and_playing() {
    let s = PlaybackStats::new(Instant::now());
    assert_eq!(s.playback_time(), 0.0);
    assert_eq!(s.total_source_frames(), 0);
    assert_eq!(s.total_displayed_frames(), 0);
    assert!(s.is_playing());
}

#[test]
fn time_accumulates_only_while_playing() {
    let t0 = Instant::now();
    let mut s = PlaybackStats::new(t0);
    s.update_playback_time(at(t0, 1000));
    assert!((s.playback_time() - 1.0).abs() < 1e-9);

    s.pause(at(t0, 1500));
    assert!((s.playback_time() - 1.5).abs() < 1e-9);
    s.update_playback_time(at(t0, 9000));
    assert!((s.playback_time() - 1.5).abs() < 1e-9);

    s.resume(at(t0, 10_000));
    s.update_playback_time(at(t0, 10_250));
    assert!((s.playback_time() - 1.75).abs() < 1e-9);
}

#[test]
fn pause_and_resume_are_idempotent() {
    let t0 = Instant::now();
    let mut s = PlaybackStats::new(t0);
    s.pause(at(t0, 100));
    s.pause(at(t0, 900));
    assert!((s.playback_time() - 0.1).abs() < 1e-9);
    s.resume(at(t0, 1000));
    s.resume(at(t0, 5000));
    s.update_playback_time(at(t0, 1100));
    assert!((s.playback_time() - 0.2).abs() < 1e-9);
}

#[test]
fn format_matches_status_line() {
    let t0 = Instant::now();
    let mut s = PlaybackStats::new(t0);
    assert_eq!(
        s.format(),
        "00:00:00.00 | Source frames: 0 (0.0/s) | Total frames: 0 (0.0/s)"
    );

    for _ in 0..4 {
        s.note_source_frame();
    }
    for _ in 0..20 {
        s.note_displayed_frame();
    }
    s.update_playback_time(at(t0, 3_723_500));
    assert_eq!(
        s.format(),
        "01:02:03.50 | Source frames: 4 (0.0/s) | Total frames: 20 (0.0/s)"
    );

    let mut s = PlaybackStats::new(t0);
    s.add_source_frames(8);
    for _ in 0..40 {
        s.note_displayed_frame();
    }
    s.update_playback_time(at(t0, 2000));
    assert_eq!(
        s.format(),
        "00:00:02.00 | Source frames: 8 (4.0/s) | Total frames: 40 (20.0/s)"
    );
}
