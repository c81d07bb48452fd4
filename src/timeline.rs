use crate::error::{FluxelError, FluxelResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LoopMode {
    /// Clamp at the end of the timeline.
    Hold,
    Repeat,
    PingPong,
}

/// Explicit-tick playback clock.
///
/// The host drives this with elapsed-time deltas; there is no internal
/// scheduling state, so feeding synthetic deltas gives deterministic replays.
/// Seeking is always safe mid-frame: the next evaluation simply uses the new
/// cursor, no partial frame survives.
#[derive(Clone, Debug)]
pub struct Timeline {
    duration: f64,
    mode: LoopMode,
    cursor: f64,     // unwrapped elapsed time
}

impl Timeline {
    pub fn new(duration_secs: f64) -> FluxelResult<Self> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(FluxelError::validation(
                "timeline duration must be finite and > 0",
            ));
        }
        Ok(Self {
            duration: duration_secs,
            mode: LoopMode::Hold,
            cursor: 0.0,
        })
    }

    pub fn with_mode(mut self, mode: LoopMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Advance by a host-provided delta and return the new query time.
    pub fn tick(&mut self, dt_secs: f64) -> FluxelResult<f64> {
        if !dt_secs.is_finite() || dt_secs < 0.0 {
            return Err(FluxelError::validation(
                "tick delta must be finite and >= 0",
            ));
        }
        self.cursor += dt_secs;
        Ok(self.time())
    }

    /// Jump the cursor; clamped into `[0, duration]`.
    pub fn seek(&mut self, t_secs: f64) {
        let t = if t_secs.is_finite() { t_secs } else { 0.0 };
        self.cursor = t.clamp(0.0, self.duration);
    }

    /// Current query time folded into `[0, duration]` per the loop mode.
    pub fn time(&self) -> f64 {
        match self.mode {
            LoopMode::Hold => self.cursor.min(self.duration),
            LoopMode::Repeat => {
                let t = self.cursor % self.duration;
                if t < 0.0 { 0.0 } else { t }
            }
            LoopMode::PingPong => {
                let cycle = 2.0 * self.duration;
                let pos = self.cursor % cycle;
                if pos <= self.duration {
                    pos
                } else {
                    cycle - pos
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_duration() {
        assert!(Timeline::new(0.0).is_err());
        assert!(Timeline::new(-1.0).is_err());
        assert!(Timeline::new(f64::INFINITY).is_err());
    }

    #[test]
    fn hold_clamps_at_end() {
        let mut tl = Timeline::new(2.0).unwrap();
        assert_eq!(tl.tick(1.5).unwrap(), 1.5);
        assert_eq!(tl.tick(1.5).unwrap(), 2.0);
        assert_eq!(tl.time(), 2.0);
    }

    #[test]
    fn repeat_wraps() {
        let mut tl = Timeline::new(2.0).unwrap().with_mode(LoopMode::Repeat);
        tl.tick(5.0).unwrap();
        assert!((tl.time() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ping_pong_reflects() {
        let mut tl = Timeline::new(2.0).unwrap().with_mode(LoopMode::PingPong);
        tl.tick(3.0).unwrap();
        assert!((tl.time() - 1.0).abs() < 1e-12);
        tl.tick(2.0).unwrap();
        assert!((tl.time() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn seek_is_clamped_and_safe() {
        let mut tl = Timeline::new(2.0).unwrap();
        tl.tick(1.0).unwrap();
        tl.seek(99.0);
        assert_eq!(tl.time(), 2.0);
        tl.seek(-1.0);
        assert_eq!(tl.time(), 0.0);
    }

    #[test]
    fn synthetic_deltas_are_deterministic() {
        let run = || {
            let mut tl = Timeline::new(1.0).unwrap().with_mode(LoopMode::Repeat);
            (0..10)
                .map(|_| tl.tick(0.3).unwrap())
                .collect::<Vec<f64>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn rejects_bad_delta() {
        let mut tl = Timeline::new(1.0).unwrap();
        assert!(tl.tick(-0.1).is_err());
        assert!(tl.tick(f64::NAN).is_err());
    }
}
