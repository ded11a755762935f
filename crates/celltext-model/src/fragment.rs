use core::fmt;

use serde::{Deserialize, Serialize};

use crate::RunStyle;

/// A contiguous run of text sharing one [`RunStyle`].
///
/// The style is always present: a run with no special formatting carries the
/// default style value, never an absence. Equality and cloning are value
/// semantic; a clone shares no mutable state with the original.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StyledRun {
    pub style: RunStyle,
    pub text: String,
}

impl StyledRun {
    pub fn new(style: RunStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }

    /// A run with the default (no-override) style.
    pub fn plain_styled(text: impl Into<String>) -> Self {
        Self::new(RunStyle::default(), text)
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl fmt::Display for StyledRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The style collapses to the sentinel "default" when it carries no
        // overrides; the text is always rendered verbatim.
        write!(f, "[{}] {}", self.style, self.text)
    }
}
