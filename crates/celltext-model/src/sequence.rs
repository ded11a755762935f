use core::fmt;
use std::ops::{Add, AddAssign, Range};

use serde::{Deserialize, Serialize};

use crate::{RichTextError, RunStyle, StyledRun};

/// One element of a [`RichString`]: either bare text or a styled run.
///
/// Making this a sum type moves the "string or fragment" check to compile
/// time; there is no runtime path by which a foreign value can enter a
/// sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RichElement {
    Plain(String),
    Styled(StyledRun),
}

impl RichElement {
    pub fn text(&self) -> &str {
        match self {
            RichElement::Plain(s) => s,
            RichElement::Styled(run) => &run.text,
        }
    }

    pub fn char_len(&self) -> usize {
        self.text().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }

    /// The run style, or `None` for bare text.
    pub fn style(&self) -> Option<&RunStyle> {
        match self {
            RichElement::Plain(_) => None,
            RichElement::Styled(run) => Some(&run.style),
        }
    }

    fn push_text(&mut self, more: &str) {
        match self {
            RichElement::Plain(s) => s.push_str(more),
            RichElement::Styled(run) => run.text.push_str(more),
        }
    }

    /// Two elements merge during canonicalization when both are bare text or
    /// both are runs with equal style.
    fn merges_with(&self, other: &RichElement) -> bool {
        match (self, other) {
            (RichElement::Plain(_), RichElement::Plain(_)) => true,
            (RichElement::Styled(a), RichElement::Styled(b)) => a.style == b.style,
            _ => false,
        }
    }
}

impl From<&str> for RichElement {
    fn from(text: &str) -> Self {
        RichElement::Plain(text.to_owned())
    }
}

impl From<String> for RichElement {
    fn from(text: String) -> Self {
        RichElement::Plain(text)
    }
}

impl From<StyledRun> for RichElement {
    fn from(run: StyledRun) -> Self {
        RichElement::Styled(run)
    }
}

impl fmt::Display for RichElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RichElement::Plain(s) => f.write_str(s),
            RichElement::Styled(run) => fmt::Display::fmt(run, f),
        }
    }
}

/// Rich (multi-style) cell text: an ordered sequence of [`RichElement`]s in
/// left-to-right reading order.
///
/// The backing list is private; only the operations below mutate it, and each
/// of them ends by re-canonicalizing. After any mutator returns, the sequence
/// holds no empty element, no two adjacent bare-text elements, and no two
/// adjacent runs with equal style. Element counts can therefore shrink across
/// a call, invalidating any element indices the caller computed earlier.
///
/// ## Indexing
/// Character offsets throughout this crate are **Unicode scalar value**
/// (`char`) indices, not UTF-8 byte offsets. See [`crate::char_index`] for the
/// character-addressed API.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RichString {
    pub(crate) elements: Vec<RichElement>,
}

impl RichString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a sequence from elements as given, preserving order and without
    /// canonicalizing. Call [`RichString::canonicalize`] (or any mutator) to
    /// establish the minimal form.
    pub fn from_elements(elements: Vec<RichElement>) -> Self {
        Self { elements }
    }

    /// Number of elements (not characters).
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// `true` when no element carries a style; post-canonicalization this
    /// means the sequence is at most one bare-text element.
    pub fn is_plain(&self) -> bool {
        self.elements.iter().all(|e| e.style().is_none())
    }

    pub fn elements(&self) -> &[RichElement] {
        &self.elements
    }

    pub fn get(&self, index: usize) -> Option<&RichElement> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RichElement> {
        self.elements.iter()
    }

    /// The logical string value: every element's text, concatenated.
    pub fn text(&self) -> String {
        self.elements.iter().map(|e| e.text()).collect()
    }

    /// Length of the logical string in characters.
    pub fn char_len(&self) -> usize {
        self.elements.iter().map(|e| e.char_len()).sum()
    }

    /// Appends one element, then canonicalizes.
    pub fn push(&mut self, element: impl Into<RichElement>) {
        self.elements.push(element.into());
        self.canonicalize();
    }

    /// Appends every element of `iter`, then canonicalizes.
    pub fn extend<I, E>(&mut self, iter: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<RichElement>,
    {
        self.elements.extend(iter.into_iter().map(Into::into));
        self.canonicalize();
    }

    /// Replaces the element at `index`, then canonicalizes.
    pub fn set(&mut self, index: usize, element: impl Into<RichElement>) -> Result<(), RichTextError> {
        let len = self.elements.len();
        let slot = self
            .elements
            .get_mut(index)
            .ok_or(RichTextError::FragmentIndexOutOfRange { index, len })?;
        *slot = element.into();
        self.canonicalize();
        Ok(())
    }

    /// Replaces the elements in `range` (element indices) with `iter`, then
    /// canonicalizes.
    pub fn replace_elements<I, E>(&mut self, range: Range<usize>, iter: I) -> Result<(), RichTextError>
    where
        I: IntoIterator<Item = E>,
        E: Into<RichElement>,
    {
        let len = self.elements.len();
        if range.start > range.end || range.end > len {
            return Err(RichTextError::FragmentIndexOutOfRange {
                index: range.end,
                len,
            });
        }
        self.elements.splice(range, iter.into_iter().map(Into::into));
        self.canonicalize();
        Ok(())
    }

    /// The canonicalization pass: drops empty elements and merges adjacent
    /// compatible ones (bare text with bare text, runs with equal style).
    ///
    /// Idempotent, infallible, and preserves the logical string. Every mutator
    /// on this type calls it before returning; it is public so sequences built
    /// with [`RichString::from_elements`] can be normalized explicitly.
    pub fn canonicalize(&mut self) {
        let mut out: Vec<RichElement> = Vec::with_capacity(self.elements.len());
        let mut last: Option<RichElement> = None;
        for element in self.elements.drain(..) {
            if element.is_empty() {
                continue;
            }
            match &mut last {
                Some(prev) if prev.merges_with(&element) => prev.push_text(element.text()),
                _ => {
                    if let Some(prev) = last.take() {
                        out.push(prev);
                    }
                    last = Some(element);
                }
            }
        }
        if let Some(prev) = last {
            out.push(prev);
        }
        self.elements = out;
    }
}

impl From<&str> for RichString {
    fn from(text: &str) -> Self {
        Self {
            elements: vec![RichElement::Plain(text.to_owned())],
        }
    }
}

impl From<String> for RichString {
    fn from(text: String) -> Self {
        Self {
            elements: vec![RichElement::Plain(text)],
        }
    }
}

impl From<StyledRun> for RichString {
    fn from(run: StyledRun) -> Self {
        Self {
            elements: vec![RichElement::Styled(run)],
        }
    }
}

impl fmt::Display for RichString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.elements {
            f.write_str(element.text())?;
        }
        Ok(())
    }
}

// Concatenation clones every element from both operands, so a later
// canonicalization merge on the result (which rewrites element text in place)
// cannot reach back into either source sequence.
impl Add<&RichString> for &RichString {
    type Output = RichString;

    fn add(self, rhs: &RichString) -> RichString {
        let mut out = RichString {
            elements: Vec::with_capacity(self.elements.len() + rhs.elements.len()),
        };
        out.elements.extend(self.elements.iter().cloned());
        out.elements.extend(rhs.elements.iter().cloned());
        out.canonicalize();
        out
    }
}

impl Add for RichString {
    type Output = RichString;

    fn add(self, rhs: RichString) -> RichString {
        &self + &rhs
    }
}

impl AddAssign<&RichString> for RichString {
    fn add_assign(&mut self, rhs: &RichString) {
        self.elements.extend(rhs.elements.iter().cloned());
        self.canonicalize();
    }
}

impl AddAssign for RichString {
    fn add_assign(&mut self, rhs: RichString) {
        *self += &rhs;
    }
}
