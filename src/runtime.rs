//! Entropic value runtime linked by every emitted Entropy program.
//!
//! Every read of a value is also a write: the stored number drifts by a
//! random amount bounded by the [`MutationRate`] before it is returned.
//! Comparisons and arithmetic read their operands, so they mutate them too.
//! The mutating operations are named methods (`add_and_mutate`,
//! `lt_and_mutate`, ...) so the side effect is visible at every call site.
//!
//! All reads go through a [`Runtime`], which owns the rate and the random
//! source. Values hold their state in a `Cell` and the runtime its generator
//! in a `RefCell`: neither is `Sync`, so a value can never be read from two
//! threads at once.

use std::{cell::RefCell, fmt, str::FromStr};

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::trace;

mod character;
mod real;
mod text;

pub use character::CharValue;
pub use real::RealValue;
pub use text::StringValue;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    #[error("invalid mutation rate `{0}`")]
    InvalidRate(String),

    #[error(
        "mutation rate {0} is out of range: it must lie between {min} and {max}",
        min = MutationRate::MIN,
        max = MutationRate::MAX
    )]
    RateOutOfRange(f64),
}

// ============================================================================
// Mutation rate
// ============================================================================

/// Upper bound of the drift applied by a single read.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct MutationRate(f64);

impl MutationRate {
    pub const MIN: f64 = 0.001;
    pub const MAX: f64 = 100.0;
    pub const DEFAULT: MutationRate = MutationRate(2.0);

    pub fn new(rate: f64) -> Result<Self, RuntimeError> {
        if (Self::MIN..=Self::MAX).contains(&rate) {
            Ok(MutationRate(rate))
        } else {
            Err(RuntimeError::RateOutOfRange(rate))
        }
    }

    pub fn get(&self) -> f64 {
        self.0
    }
}

impl Default for MutationRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for MutationRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MutationRate {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let rate: f64 = trimmed
            .parse()
            .map_err(|_| RuntimeError::InvalidRate(trimmed.to_owned()))?;
        if rate.is_nan() {
            return Err(RuntimeError::InvalidRate(trimmed.to_owned()));
        }
        MutationRate::new(rate)
    }
}

// ============================================================================
// Runtime context
// ============================================================================

/// Rate and random source shared by every value read through it.
#[derive(Debug)]
pub struct Runtime {
    rate: MutationRate,
    rng: RefCell<StdRng>,
}

impl Runtime {
    /// Runtime whose generator is seeded from the operating system.
    pub fn new(rate: MutationRate) -> Self {
        Runtime {
            rate,
            rng: RefCell::new(StdRng::from_os_rng()),
        }
    }

    /// Reproducible runtime, for tests and replays.
    pub fn seeded(rate: MutationRate, seed: u64) -> Self {
        Runtime {
            rate,
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn rate(&self) -> MutationRate {
        self.rate
    }

    /// Signed drift for one read: `rate / magnitude`, magnitude in [1, 255],
    /// negative when the sign selector falls below 128.
    pub(crate) fn drift(&self) -> f64 {
        let mut rng = self.rng.borrow_mut();
        // gate byte, drawn for parity with the three-byte draw and unused
        let _gate: u8 = rng.random();
        let magnitude: u8 = rng.random_range(1..=255);
        let sign: u8 = rng.random_range(1..=255);
        let delta = self.rate.get() / f64::from(magnitude);
        let delta = if sign < 128 { -delta } else { delta };
        trace!(delta, "entropic drift");
        delta
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new(MutationRate::default())
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// Values that read as a number. Both operands of a comparison are read,
/// left first, whatever the outcome.
pub trait Numeric {
    fn read_numeric(&self, rt: &Runtime) -> f64;

    fn lt_and_mutate<R: Numeric + ?Sized>(&self, rhs: &R, rt: &Runtime) -> bool {
        let lhs = self.read_numeric(rt);
        lhs < rhs.read_numeric(rt)
    }

    fn gt_and_mutate<R: Numeric + ?Sized>(&self, rhs: &R, rt: &Runtime) -> bool {
        let lhs = self.read_numeric(rt);
        lhs > rhs.read_numeric(rt)
    }

    fn le_and_mutate<R: Numeric + ?Sized>(&self, rhs: &R, rt: &Runtime) -> bool {
        let lhs = self.read_numeric(rt);
        lhs <= rhs.read_numeric(rt)
    }

    fn ge_and_mutate<R: Numeric + ?Sized>(&self, rhs: &R, rt: &Runtime) -> bool {
        let lhs = self.read_numeric(rt);
        lhs >= rhs.read_numeric(rt)
    }
}

/// Values that read as text and can be appended to a [`StringValue`].
pub trait Textual {
    fn read_text(&self, rt: &Runtime) -> String;

    /// Concatenation with a [`StringValue`] on the right. Both sides are
    /// read, left first.
    fn concat_and_mutate(&self, rhs: &StringValue, rt: &Runtime) -> StringValue {
        let mut text = self.read_text(rt);
        text.push_str(&rhs.read(rt));
        StringValue::new(&text)
    }
}

impl Textual for str {
    fn read_text(&self, _rt: &Runtime) -> String {
        self.to_owned()
    }
}

impl Textual for String {
    fn read_text(&self, _rt: &Runtime) -> String {
        self.clone()
    }
}

/// Rendering used by `print`. Rendering reads, so it mutates.
pub trait Observe {
    fn observe(&self, rt: &Runtime) -> String;
}

impl Observe for bool {
    fn observe(&self, _rt: &Runtime) -> String {
        self.to_string()
    }
}
