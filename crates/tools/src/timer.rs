use std::time::Duration;

/// Rolling window of tick durations.
#[derive(Debug, Clone)]
pub struct TickTimer {
    history: Vec<Duration>,
    next: usize,
    filled: bool,
}

impl TickTimer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        Self {
            history: vec![Duration::ZERO; capacity],
            next: 0,
            filled: false,
        }
    }

    pub fn record(&mut self, tick: Duration) {
        self.history[self.next] = tick;
        self.next = (self.next + 1) % self.history.len();
        if self.next == 0 {
            self.filled = true;
        }
    }

    fn window(&self) -> &[Duration] {
        if self.filled {
            &self.history
        } else {
            &self.history[..self.next]
        }
    }

    /// Number of samples in the window.
    pub fn len(&self) -> usize {
        self.window().len()
    }

    pub fn is_empty(&self) -> bool {
        self.window().is_empty()
    }

    pub fn average(&self) -> Duration {
        let window = self.window();
        if window.is_empty() {
            return Duration::ZERO;
        }
        window.iter().sum::<Duration>() / window.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.window().iter().copied().max().unwrap_or(Duration::ZERO)
    }

    /// Ticks per second at the average duration. Zero with no samples.
    pub fn rate(&self) -> f64 {
        let average = self.average();
        if average.is_zero() {
            0.0
        } else {
            1.0 / average.as_secs_f64()
        }
    }
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new(60)
    }
}
