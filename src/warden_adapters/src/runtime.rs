//! Injected clock and code-source implementations.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use warden_core::{Clock, CodeSource, OtpCode};

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Test double for expiry logic.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
        }
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.write().expect("clock lock poisoned") = to;
    }

    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.write().expect("clock lock poisoned");
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().expect("clock lock poisoned")
    }
}

/// Uniformly random six-digit codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeSource;

impl CodeSource for RandomCodeSource {
    fn generate(&self) -> OtpCode {
        let n: u32 = rand::rng().random_range(100_000..1_000_000);
        OtpCode::parse(n.to_string()).expect("generated code is six digits")
    }
}

/// Always returns the same code. Test double.
#[derive(Debug, Clone)]
pub struct FixedCodeSource(OtpCode);

impl FixedCodeSource {
    pub fn new(code: OtpCode) -> Self {
        Self(code)
    }
}

impl CodeSource for FixedCodeSource {
    fn generate(&self) -> OtpCode {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_codes_are_always_six_digits() {
        let source = RandomCodeSource;
        for _ in 0..256 {
            let code = source.generate();
            assert_eq!(code.as_str().len(), 6);
        }
    }

    #[test]
    fn manual_clock_advances_on_demand() {
        let clock = ManualClock::starting_at(Utc::now());
        let before = clock.now();
        clock.advance(Duration::minutes(11));
        assert_eq!(clock.now() - before, Duration::minutes(11));
    }
}
