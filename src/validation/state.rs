//! Validation outcome of a single cell.

/// Result of checking one raw value against the active rules.
///
/// Invalid values are ordinary data here, never errors: the presentation
/// layer reads `valid` for styling and shows `messages` as the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationState {
    pub valid: bool,
    pub messages: Vec<String>,
}

impl Default for ValidationState {
    fn default() -> Self {
        Self::valid()
    }
}

impl ValidationState {
    /// The unconditionally valid outcome, used when no validator is attached.
    pub fn valid() -> Self {
        Self {
            valid: true,
            messages: Vec::new(),
        }
    }

    /// A failing outcome carrying a single reason.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            messages: vec![message.into()],
        }
    }

    /// Record a failure reason; the state becomes invalid.
    pub fn add_message(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.messages.push(message.into());
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// All reasons joined for single-line display.
    pub fn summary(&self) -> String {
        self.messages.join("; ")
    }
}
