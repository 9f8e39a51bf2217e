//! `sysUpTime` accessor.

use std::time::{Duration, Instant};

use super::{Accessor, MibEntry};
use crate::error::ErrorStatus;
use crate::value::Value;

/// Elapsed time since creation, in hundredths of a second.
///
/// Reads as [`Value::TimeTicks`], wrapping at 2^32.
#[derive(Debug, Clone, Copy)]
pub struct Uptime {
    started: Instant,
}

impl Uptime {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Start counting from `started` instead of now.
    pub fn since(started: Instant) -> Self {
        Self { started }
    }

    /// Current uptime in centiseconds.
    pub fn ticks(&self) -> u32 {
        to_ticks(self.started.elapsed())
    }
}

impl Default for Uptime {
    fn default() -> Self {
        Self::new()
    }
}

fn to_ticks(elapsed: Duration) -> u32 {
    (elapsed.as_millis() / 10) as u32
}

impl Accessor for Uptime {
    fn get(&self, _entry: &MibEntry) -> Result<Value, ErrorStatus> {
        Ok(Value::TimeTicks(self.ticks()))
    }
}
