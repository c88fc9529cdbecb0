use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::render::DrawReport;

/// Simulation time added per tick. One tick corresponds to one display refresh.
pub const TIME_STEP: f32 = 1.0;

/// Lifecycle of a [`crate::FrameLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// Waiting for the next frame signal.
    #[default]
    Idle,
    /// Inside `tick`.
    FrameActive,
    /// No further ticks will run.
    Stopped,
}

/// What a [`FrameSignal`] reports when the loop asks for the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    Tick,
    Stop,
}

/// Source of frame pacing for [`crate::FrameLoop::run`].
///
/// Implementations block until the next refresh or report that the loop
/// should end.
pub trait FrameSignal {
    fn wait_next(&mut self) -> FrameEvent;
}

impl<F> FrameSignal for F
where
    F: FnMut() -> FrameEvent,
{
    fn wait_next(&mut self) -> FrameEvent {
        self()
    }
}

/// Cloneable cancellation flag for a running loop.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// Result of one `tick`.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// 1-based frame number.
    pub frame: u64,
    /// Accumulated time after this tick.
    pub time: f32,
    /// Whether the primary geometry was rebuilt during this tick.
    pub rebuilt: bool,
    pub draws: DrawReport,
}

/// Counts frames and reports the rate once per window.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: Duration,
    started: Option<Instant>,
    frames: u32,
    last: Option<f32>,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl FpsCounter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            started: None,
            frames: 0,
            last: None,
        }
    }

    /// Registers a frame presented at `now`; returns the rate when a window closes.
    pub fn record(&mut self, now: Instant) -> Option<f32> {
        let started = *self.started.get_or_insert(now);
        self.frames += 1;
        let elapsed = now.saturating_duration_since(started);
        if elapsed < self.window {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        tracing::debug!(fps = format_args!("{fps:.1}"), "frame rate");
        self.started = Some(now);
        self.frames = 0;
        self.last = Some(fps);
        Some(fps)
    }

    /// Most recently reported rate.
    pub fn last(&self) -> Option<f32> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_reports_once_per_window() {
        let mut counter = FpsCounter::new(Duration::from_secs(1));
        let origin = Instant::now();
        assert_eq!(counter.record(origin), None);
        for frame in 1..60 {
            let at = origin + Duration::from_millis(frame * 16);
            assert_eq!(counter.record(at), None);
        }
        let fps = counter.record(origin + Duration::from_secs(1)).unwrap();
        assert!((fps - 61.0).abs() < 0.01);
        assert_eq!(counter.last(), Some(fps));
        assert_eq!(counter.record(origin + Duration::from_millis(1100)), None);
    }

    #[test]
    fn stop_handle_is_shared_between_clones() {
        let handle = StopHandle::new();
        let remote = handle.clone();
        assert!(!handle.is_stopped());
        remote.stop();
        assert!(handle.is_stopped());
    }

    #[test]
    fn closures_are_signals() {
        let mut left = 1;
        let mut signal = move || {
            if left == 0 {
                FrameEvent::Stop
            } else {
                left -= 1;
                FrameEvent::Tick
            }
        };
        assert_eq!(signal.wait_next(), FrameEvent::Tick);
        assert_eq!(signal.wait_next(), FrameEvent::Stop);
    }
}
