use std::cell::Cell;

use super::{Numeric, Observe, Runtime};

/// A number that drifts every time it is read.
///
/// Cloning copies the stored value without reading it.
#[derive(Debug, Clone, Default)]
pub struct RealValue {
    stored: Cell<f64>,
}

impl RealValue {
    pub fn new(value: f64) -> Self {
        RealValue {
            stored: Cell::new(value),
        }
    }

    /// Drifts the stored value, then returns it.
    pub fn read(&self, rt: &Runtime) -> f64 {
        let value = self.stored.get() + rt.drift();
        self.stored.set(value);
        value
    }

    /// Replaces the stored value. Writing never drifts.
    pub fn write(&self, value: f64) {
        self.stored.set(value);
    }

    fn combine<R: Numeric + ?Sized>(
        &self,
        rhs: &R,
        rt: &Runtime,
        op: impl Fn(f64, f64) -> f64,
    ) -> RealValue {
        let lhs = self.read(rt);
        RealValue::new(op(lhs, rhs.read_numeric(rt)))
    }

    fn combine_bits<R: Numeric + ?Sized>(
        &self,
        rhs: &R,
        rt: &Runtime,
        op: impl Fn(i64, i64) -> i64,
    ) -> RealValue {
        self.combine(rhs, rt, |a, b| op(a as i64, b as i64) as f64)
    }

    pub fn add_and_mutate<R: Numeric + ?Sized>(&self, rhs: &R, rt: &Runtime) -> RealValue {
        self.combine(rhs, rt, |a, b| a + b)
    }

    pub fn sub_and_mutate<R: Numeric + ?Sized>(&self, rhs: &R, rt: &Runtime) -> RealValue {
        self.combine(rhs, rt, |a, b| a - b)
    }

    pub fn mul_and_mutate<R: Numeric + ?Sized>(&self, rhs: &R, rt: &Runtime) -> RealValue {
        self.combine(rhs, rt, |a, b| a * b)
    }

    pub fn div_and_mutate<R: Numeric + ?Sized>(&self, rhs: &R, rt: &Runtime) -> RealValue {
        self.combine(rhs, rt, |a, b| a / b)
    }

    pub fn rem_and_mutate<R: Numeric + ?Sized>(&self, rhs: &R, rt: &Runtime) -> RealValue {
        self.combine(rhs, rt, |a, b| a % b)
    }

    // Bitwise forms work on both operands truncated toward zero.

    pub fn and_and_mutate<R: Numeric + ?Sized>(&self, rhs: &R, rt: &Runtime) -> RealValue {
        self.combine_bits(rhs, rt, |a, b| a & b)
    }

    pub fn or_and_mutate<R: Numeric + ?Sized>(&self, rhs: &R, rt: &Runtime) -> RealValue {
        self.combine_bits(rhs, rt, |a, b| a | b)
    }

    pub fn xor_and_mutate<R: Numeric + ?Sized>(&self, rhs: &R, rt: &Runtime) -> RealValue {
        self.combine_bits(rhs, rt, |a, b| a ^ b)
    }

    pub fn shl_and_mutate<R: Numeric + ?Sized>(&self, rhs: &R, rt: &Runtime) -> RealValue {
        self.combine_bits(rhs, rt, |a, b| a.wrapping_shl(b.clamp(0, 63) as u32))
    }

    pub fn shr_and_mutate<R: Numeric + ?Sized>(&self, rhs: &R, rt: &Runtime) -> RealValue {
        self.combine_bits(rhs, rt, |a, b| a.wrapping_shr(b.clamp(0, 63) as u32))
    }

    pub fn increment_and_mutate(&self, rt: &Runtime) -> RealValue {
        RealValue::new(self.read(rt) + 1.0)
    }

    pub fn decrement_and_mutate(&self, rt: &Runtime) -> RealValue {
        RealValue::new(self.read(rt) - 1.0)
    }
}

impl From<f64> for RealValue {
    fn from(value: f64) -> Self {
        RealValue::new(value)
    }
}

impl Numeric for RealValue {
    fn read_numeric(&self, rt: &Runtime) -> f64 {
        self.read(rt)
    }
}

impl Observe for RealValue {
    fn observe(&self, rt: &Runtime) -> String {
        self.read(rt).to_string()
    }
}
