use std::time::{Duration, Instant};

use serde::Serialize;

/// Gate for repeated streaming calls. Frames arriving faster than the target
/// rate are reported as skippable instead of queueing up behind extraction.
#[derive(Debug)]
pub struct FrameRateController {
    min_interval: Duration,
    target_fps: u32,
    last_frame: Option<Instant>,
    in_flight: Option<Instant>,
    last_elapsed_ms: u64,
    processed: u64,
    dropped: u64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FrameStats {
    pub target_fps: u32,
    pub processed: u64,
    pub dropped: u64,
    pub last_elapsed_ms: u64,
}

impl FrameRateController {
    pub fn new(target_fps: u32) -> Self {
        let fps = target_fps.max(1);
        Self {
            min_interval: Duration::from_millis(1000 / fps as u64),
            target_fps: fps,
            last_frame: None,
            in_flight: None,
            last_elapsed_ms: 0,
            processed: 0,
            dropped: 0,
        }
    }

    pub fn set_target_fps(&mut self, target_fps: u32) {
        let fps = target_fps.max(1);
        self.target_fps = fps;
        self.min_interval = Duration::from_millis(1000 / fps as u64);
    }

    /// Whether enough time has passed since the last accepted frame. A `false`
    /// answer counts the frame as dropped.
    pub fn should_process(&mut self) -> bool {
        let due = match self.last_frame {
            None => true,
            Some(at) => at.elapsed() >= self.min_interval,
        };
        if !due {
            self.dropped += 1;
        }
        due
    }

    pub fn frame_started(&mut self) {
        let now = Instant::now();
        self.last_frame = Some(now);
        self.in_flight = Some(now);
    }

    pub fn frame_finished(&mut self) {
        if let Some(started) = self.in_flight.take() {
            self.last_elapsed_ms = started.elapsed().as_millis() as u64;
            self.processed += 1;
        }
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            target_fps: self.target_fps,
            processed: self.processed,
            dropped: self.dropped,
            last_elapsed_ms: self.last_elapsed_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_always_passes() {
        let mut gate = FrameRateController::new(10);
        assert!(gate.should_process());
    }

    #[test]
    fn early_frames_are_dropped_and_counted() {
        let mut gate = FrameRateController::new(1);
        assert!(gate.should_process());
        gate.frame_started();
        gate.frame_finished();

        // Immediately after a frame, a 1 fps gate refuses the next one.
        assert!(!gate.should_process());
        assert!(!gate.should_process());

        let stats = gate.stats();
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.dropped, 2);
    }

    #[test]
    fn interval_elapse_reopens_the_gate() {
        let mut gate = FrameRateController::new(100);
        assert!(gate.should_process());
        gate.frame_started();
        gate.frame_finished();

        std::thread::sleep(Duration::from_millis(25));
        assert!(gate.should_process());
    }

    #[test]
    fn zero_fps_is_clamped() {
        let gate = FrameRateController::new(0);
        assert_eq!(gate.stats().target_fps, 1);
    }
}
