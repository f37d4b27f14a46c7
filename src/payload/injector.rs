//! Injection combinations: probe URL + context modifier + payload.

/// Inserted between the probe URL and the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// Payload lands directly in the parameter value
    Plain,
    /// Closes a quoted attribute and its tag first
    AttributeBreak,
}

impl Modifier {
    pub const ALL: [Modifier; 2] = [Modifier::Plain, Modifier::AttributeBreak];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Plain => "",
            Modifier::AttributeBreak => "\">",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    pub probe_url: String,
    pub modifier: Modifier,
    pub payload: String,
}

impl Combination {
    pub fn new(probe_url: &str, modifier: Modifier, payload: &str) -> Self {
        Self {
            probe_url: probe_url.to_string(),
            modifier,
            payload: payload.to_string(),
        }
    }

    /// Concatenated target; also the identity used for resume.
    pub fn target(&self) -> String {
        let mut s = String::with_capacity(
            self.probe_url.len() + self.modifier.as_str().len() + self.payload.len(),
        );
        s.push_str(&self.probe_url);
        s.push_str(self.modifier.as_str());
        s.push_str(&self.payload);
        s
    }
}
