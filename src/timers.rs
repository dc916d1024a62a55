use std::time::{Duration, Instant};

/// Default rate at which both timers are decremented, independent of how
/// fast instructions execute.
pub const TIMER_HZ: u32 = 60;

/// What a timer does when it counts down to zero.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tone {
    Silent,
    Chime,
}

/// An 8-bit countdown counter. Decrements by exactly one per tick while
/// above zero and then stays at zero until reloaded. A `Chime` timer reports
/// the 1 -> 0 transition exactly once; it never re-fires while sitting at
/// zero.
pub struct Timer {
    value: u8,
    tone: Tone,
}

impl Timer {
    pub fn new(tone: Tone) -> Self {
        Timer { value: 0, tone }
    }

    pub fn reload(&mut self, value: u8) {
        self.value = value;
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Count down one step. Returns true exactly when a chiming timer
    /// reaches zero from one.
    pub fn tick(&mut self) -> bool {
        if self.value == 0 {
            return false;
        }
        self.value -= 1;
        self.value == 0 && self.tone == Tone::Chime
    }
}

/// Fixed-rate logical scheduler for timer decrements. The rate is explicit
/// configuration rather than an ambient constant so tests can run at
/// whatever rate they like. `poll` converts wall time elapsed since the
/// last poll into a whole number of due ticks; the remainder carries over.
pub struct QuartzClock {
    period: Duration,
    last: Instant,
}

impl QuartzClock {
    /// A zero rate is clamped to 1 Hz; the run loop rejects zero rates
    /// before they get here.
    pub fn new(rate_hz: u32) -> Self {
        QuartzClock {
            period: Duration::from_secs(1) / rate_hz.max(1),
            last: Instant::now(),
        }
    }

    /// Whole ticks contained in `elapsed`.
    fn ticks_in(&self, elapsed: Duration) -> u32 {
        (elapsed.as_nanos() / self.period.as_nanos()) as u32
    }

    /// How many ticks have become due since the last poll.
    pub fn poll(&mut self) -> u32 {
        let due = self.ticks_in(self.last.elapsed());
        // advance by the consumed whole ticks only, keeping the fraction
        self.last += self.period * due;
        due
    }
}
