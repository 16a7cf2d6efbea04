use embassy_time::Instant;

/// Milliseconds since boot, wrapping at `u32::MAX` like a hardware tick counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Millis(pub u32);

impl Millis {
    pub const fn new(ms: u32) -> Self {
        Self(ms)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Time elapsed since `earlier`. Stays correct across a single counter wrap.
    pub const fn elapsed_since(self, earlier: Millis) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    pub const fn wrapping_add(self, ms: u32) -> Millis {
        Millis(self.0.wrapping_add(ms))
    }
}

/// Whole seconds covering `ms`, rounded up.
pub const fn secs_ceil(ms: u32) -> u32 {
    ms.div_ceil(1000)
}

pub trait Clock {
    fn now(&self) -> Millis;
}

#[derive(Debug, Clone)]
pub struct EmbassyClock {
    boot_instant: Instant,
}

impl EmbassyClock {
    pub fn new() -> Self {
        Self {
            boot_instant: Instant::now(),
        }
    }
}

impl Clock for EmbassyClock {
    fn now(&self) -> Millis {
        // Truncation is the wrap.
        Millis(self.boot_instant.elapsed().as_millis() as u32)
    }
}

impl Default for EmbassyClock {
    fn default() -> Self {
        Self::new()
    }
}
