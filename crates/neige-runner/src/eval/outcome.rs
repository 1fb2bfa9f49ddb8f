//! The result of a single evaluation.

use rmpv::Value;

/// Success flag plus the rendered value or fault description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalOutcome {
    success: bool,
    text: String,
}

impl EvalOutcome {
    /// A successful evaluation rendering as `text`.
    #[must_use]
    pub fn succeeded(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: text.into(),
        }
    }

    /// A failed evaluation described by `text`.
    #[must_use]
    pub fn failed(text: impl Into<String>) -> Self {
        Self {
            success: false,
            text: text.into(),
        }
    }

    /// Whether the snippet ran without a fault.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Rendered value or fault description.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Encodes the outcome as the `[success, text]` pair the host expects.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Array(vec![
            Value::Boolean(self.success),
            Value::from(self.text.as_str()),
        ])
    }
}
