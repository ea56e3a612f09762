use super::{Numeric, Observe, RealValue, Runtime, Textual};

/// A character stored as a drifting code point.
///
/// Reading rounds the drifted code point to the nearest integer. Code points
/// that are negative, surrogates or past U+10FFFF read as U+FFFD.
#[derive(Debug, Clone, Default)]
pub struct CharValue {
    code: RealValue,
}

impl CharValue {
    pub fn new(c: char) -> Self {
        CharValue {
            code: RealValue::new(f64::from(u32::from(c))),
        }
    }

    fn from_code(code: f64) -> Self {
        CharValue {
            code: RealValue::new(code),
        }
    }

    pub fn read(&self, rt: &Runtime) -> char {
        let code = self.code.read(rt).round();
        if code < 0.0 {
            return char::REPLACEMENT_CHARACTER;
        }
        char::from_u32(code as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    pub fn write(&self, c: char) {
        self.code.write(f64::from(u32::from(c)));
    }

    pub fn sub_and_mutate<R: Numeric + ?Sized>(&self, rhs: &R, rt: &Runtime) -> CharValue {
        let lhs = self.code.read(rt);
        CharValue::from_code(lhs - rhs.read_numeric(rt))
    }

    pub fn add_and_mutate<R: Numeric + ?Sized>(&self, rhs: &R, rt: &Runtime) -> CharValue {
        let lhs = self.code.read(rt);
        CharValue::from_code(lhs + rhs.read_numeric(rt))
    }
}

impl From<char> for CharValue {
    fn from(c: char) -> Self {
        CharValue::new(c)
    }
}

/// The raw drifted code point, without rounding.
impl Numeric for CharValue {
    fn read_numeric(&self, rt: &Runtime) -> f64 {
        self.code.read(rt)
    }
}

impl Textual for CharValue {
    fn read_text(&self, rt: &Runtime) -> String {
        self.read(rt).to_string()
    }
}

impl Observe for CharValue {
    fn observe(&self, rt: &Runtime) -> String {
        self.read(rt).to_string()
    }
}
