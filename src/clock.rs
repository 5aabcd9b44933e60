use std::time::{Duration, Instant};

/// Wall-clock frame delta source.
///
/// Deltas are clamped so a debugger pause or a minimised window does not
/// produce a huge jump in simulated time, and a tight loop never yields zero.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            dt_min,
            dt_max,
        }
    }

    /// Restarts measurement from now.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Seconds since the previous call (or reset), clamped.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;
        dt.as_secs_f32()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulated shader time, fed to `iGlobalTime`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimClock {
    global_time: f32,
    time_speed: f32,
}

impl SimClock {
    pub fn new(time_speed: f32) -> Self {
        Self {
            global_time: 0.0,
            time_speed,
        }
    }

    /// Advances by `time_speed * frame_delta`. Negative deltas are ignored
    /// so time never runs backwards.
    pub fn advance(&mut self, frame_delta: f32) -> f32 {
        self.global_time += self.time_speed * frame_delta.max(0.0);
        self.global_time
    }

    pub fn global_time(&self) -> f32 {
        self.global_time
    }

    pub fn time_speed(&self) -> f32 {
        self.time_speed
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Turns irregular paint deltas into ticks at a fixed interval.
///
/// Each tick consumes the whole intervals pending; the remainder carries
/// over to the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct TickGate {
    interval: f32,
    pending: f32,
}

impl TickGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.as_secs_f32().max(f32::EPSILON),
            pending: 0.0,
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn reset(&mut self) {
        self.pending = 0.0;
    }

    /// Adds `frame_delta` and returns the time the next tick covers once at
    /// least one interval is pending.
    pub fn advance(&mut self, frame_delta: f32) -> Option<f32> {
        self.pending += frame_delta.max(0.0);
        if self.pending < self.interval {
            return None;
        }
        let covered = (self.pending / self.interval).floor() * self.interval;
        self.pending = (self.pending - covered).max(0.0);
        Some(covered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sim_clock_accumulates_scaled_deltas() {
        let mut clock = SimClock::new(2.0);
        clock.advance(0.25);
        clock.advance(0.5);
        assert_relative_eq!(clock.global_time(), 1.5);
    }

    #[test]
    fn sim_clock_ignores_negative_delta() {
        let mut clock = SimClock::default();
        clock.advance(0.1);
        clock.advance(-5.0);
        assert_relative_eq!(clock.global_time(), 0.1);
    }

    #[test]
    fn frame_clock_clamps_to_maximum() {
        let mut clock = FrameClock::with_clamps(Duration::ZERO, Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(5));
        assert!(clock.tick() <= 0.001 + f32::EPSILON);
    }

    #[test]
    fn frame_clock_never_reports_zero() {
        let mut clock = FrameClock::new();
        clock.reset();
        assert!(clock.tick() > 0.0);
    }

    #[test]
    fn gate_holds_ticks_until_an_interval_passes() {
        let mut gate = TickGate::new(Duration::from_millis(100));
        for _ in 0..3 {
            assert_eq!(gate.advance(0.03), None);
        }
        let covered = gate.advance(0.03).unwrap();
        assert_relative_eq!(covered, 0.1, epsilon = 1e-6);
        assert_eq!(gate.advance(0.03), None);
        assert_relative_eq!(gate.advance(0.06).unwrap(), 0.1, epsilon = 1e-6);
    }

    #[test]
    fn gate_folds_a_long_frame_into_one_tick() {
        let mut gate = TickGate::new(Duration::from_millis(100));
        assert_relative_eq!(gate.advance(0.25).unwrap(), 0.2, epsilon = 1e-6);
        assert_eq!(gate.advance(0.02), None);
        gate.reset();
        assert_eq!(gate.advance(0.09), None);
    }
}
