//! Frame-driven animation timer.
//!
//! A [`Timer`] is advanced with the frame delta and reports how far into its
//! duration it is, either once ([`TimerType::Single`]), repeatedly
//! ([`TimerType::Loop`]) or without bound ([`TimerType::Infinite`]).

use instant::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerType {
    Loop,
    Single,
    Infinite,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TimerError {
    #[error("duration cannot be less than or equal to 0")]
    NonPositiveDuration,
}

#[derive(Debug, Clone)]
pub struct Timer {
    kind: TimerType,
    duration: f32,
    has_updated: bool,
    paused: bool,
    abs_prev_time: f64,
    accum_time: f32,
    elapsed: Duration,
}

impl Default for Timer {
    fn default() -> Self {
        Self {
            kind: TimerType::Infinite,
            duration: 1.0,
            has_updated: false,
            paused: false,
            abs_prev_time: 0.0,
            accum_time: 0.0,
            elapsed: Duration::ZERO,
        }
    }
}

impl Timer {
    /// `duration` is in seconds and must be positive unless the timer is infinite.
    pub fn new(kind: TimerType, duration: f32) -> Result<Self, TimerError> {
        if kind != TimerType::Infinite && duration <= 0.0 {
            return Err(TimerError::NonPositiveDuration);
        }
        Ok(Self {
            kind,
            duration,
            ..Default::default()
        })
    }

    pub fn kind(&self) -> TimerType {
        self.kind
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Rewinds to zero. The next update only records a baseline.
    pub fn reset(&mut self) {
        self.has_updated = false;
        self.accum_time = 0.0;
    }

    /// Toggles pause and returns `true` when the timer is now paused.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Advances the timer by `dt`. Returns `true` once a single-shot timer has
    /// run past its duration.
    pub fn update(&mut self, dt: Duration) -> bool {
        self.elapsed += dt;
        let current = self.elapsed.as_secs_f64();

        if !self.has_updated {
            self.abs_prev_time = current;
            self.has_updated = true;
        }

        if self.paused {
            self.abs_prev_time = current;
            return false;
        }

        self.accum_time += (current - self.abs_prev_time) as f32;
        self.abs_prev_time = current;

        self.kind == TimerType::Single && self.accum_time > self.duration
    }

    /// Moves the timer back by `secs` seconds, never below zero. Negative
    /// values fast forward.
    pub fn rewind(&mut self, secs: f32) {
        self.accum_time = (self.accum_time - secs).max(0.0);
    }

    pub fn fast_forward(&mut self, secs: f32) {
        self.rewind(-secs);
    }

    /// Ratio of elapsed time to duration: wraps for loops, saturates at 1 for
    /// single-shot timers and is `None` for infinite ones.
    pub fn alpha(&self) -> Option<f32> {
        match self.kind {
            TimerType::Loop => Some((self.accum_time % self.duration) / self.duration),
            TimerType::Single => Some((self.accum_time / self.duration).clamp(0.0, 1.0)),
            TimerType::Infinite => None,
        }
    }

    /// Seconds into the current loop, or into the single-shot duration.
    pub fn progression(&self) -> Option<f32> {
        match self.kind {
            TimerType::Loop => Some(self.accum_time % self.duration),
            TimerType::Single => Some(self.accum_time.clamp(0.0, self.duration)),
            TimerType::Infinite => None,
        }
    }

    /// Total unpaused seconds accumulated since the last reset.
    pub fn time_since_start(&self) -> f32 {
        self.accum_time
    }
}
