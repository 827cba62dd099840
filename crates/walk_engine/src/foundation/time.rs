//! Frame timing utilities

/// Converts host animation timestamps into clamped per-frame deltas
///
/// Render loops hand out monotonically increasing timestamps in milliseconds.
/// A long stall (tab switch, debugger pause) would otherwise produce one huge
/// step and let the player tunnel through thin geometry, so every delta is
/// capped at `max_delta` seconds.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_timestamp_ms: Option<f64>,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
    max_delta: f32,
}

impl FrameClock {
    /// Create a new clock with the given delta cap in seconds
    pub fn new(max_delta: f32) -> Self {
        Self {
            last_timestamp_ms: None,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
            max_delta: max_delta.max(0.0),
        }
    }

    /// Advance the clock to `timestamp_ms` and return the clamped delta in seconds
    ///
    /// The first tick primes the clock and yields zero.
    pub fn tick(&mut self, timestamp_ms: f64) -> f32 {
        let delta = match self.last_timestamp_ms {
            Some(last) if timestamp_ms.is_finite() => {
                #[allow(clippy::cast_possible_truncation)]
                let seconds = ((timestamp_ms - last) / 1000.0) as f32;
                seconds.clamp(0.0, self.max_delta)
            }
            _ => 0.0,
        };

        if timestamp_ms.is_finite() {
            self.last_timestamp_ms = Some(timestamp_ms);
        }
        self.delta_time = delta;
        self.total_time += delta;
        self.frame_count += 1;
        delta
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the accumulated (clamped) time
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
