use super::{CharValue, Observe, Runtime, Textual};

/// An ordered run of drifting characters. Reading the string reads, and so
/// drifts, every character in it.
#[derive(Debug, Clone, Default)]
pub struct StringValue {
    chars: Vec<CharValue>,
}

impl StringValue {
    pub fn new(text: &str) -> Self {
        StringValue {
            chars: text.chars().map(CharValue::new).collect(),
        }
    }

    pub fn read(&self, rt: &Runtime) -> String {
        self.chars.iter().map(|c| c.read(rt)).collect()
    }

    /// Replaces the content. Writing never drifts.
    pub fn write(&mut self, text: &str) {
        self.chars = text.chars().map(CharValue::new).collect();
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[CharValue] {
        &self.chars
    }

    /// Concatenation. Both sides are read, left first.
    pub fn add_and_mutate<R: Textual + ?Sized>(&self, rhs: &R, rt: &Runtime) -> StringValue {
        let mut text = self.read(rt);
        text.push_str(&rhs.read_text(rt));
        StringValue::new(&text)
    }
}

impl From<&str> for StringValue {
    fn from(text: &str) -> Self {
        StringValue::new(text)
    }
}

impl Textual for StringValue {
    fn read_text(&self, rt: &Runtime) -> String {
        self.read(rt)
    }
}

impl Observe for StringValue {
    fn observe(&self, rt: &Runtime) -> String {
        self.read(rt)
    }
}
