//! Character-offset addressing over a [`RichString`].
//!
//! The sequence is treated as one logical string; a [`CharRange`] selects a
//! half-open span of it, and the operations here map that span back onto
//! (element, intra-element offset) pairs. The mapping is recomputed on every
//! call by walking the elements and accumulating lengths — it is never cached,
//! since any mutator can reshape the element list.
//!
//! Offsets are Unicode scalar value (`char`) indices, not byte offsets.

use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use crate::{RichElement, RichString, RichTextError, StyledRun};

/// A character span with Python-slice semantics: signed bounds (negative
/// counts from the end of the string), omitted bounds defaulting to the start
/// and end, and an explicit step that must be 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharRange {
    start: Option<isize>,
    stop: Option<isize>,
    step: isize,
}

impl CharRange {
    pub fn new(start: Option<isize>, stop: Option<isize>) -> Self {
        Self {
            start,
            stop,
            step: 1,
        }
    }

    /// Only step 1 resolves; any other value is rejected at resolution time.
    pub fn with_step(start: Option<isize>, stop: Option<isize>, step: isize) -> Self {
        Self { start, stop, step }
    }

    /// Converts to an absolute half-open `(start, stop)` pair for a string of
    /// `len` characters.
    pub(crate) fn resolve(self, len: usize) -> Result<(usize, usize), RichTextError> {
        if self.step != 1 {
            return Err(RichTextError::UnsupportedStep(self.step));
        }
        let start = resolve_bound(self.start.unwrap_or(0), len)?;
        let stop = match self.stop {
            None => len,
            Some(bound) => resolve_bound(bound, len)?,
        };
        if start > stop {
            return Err(RichTextError::InvertedCharRange { start, stop });
        }
        Ok((start, stop))
    }
}

fn resolve_bound(bound: isize, len: usize) -> Result<usize, RichTextError> {
    let adjusted = if bound < 0 { bound + len as isize } else { bound };
    if adjusted < 0 || adjusted as usize > len {
        return Err(RichTextError::CharIndexOutOfRange { index: bound, len });
    }
    Ok(adjusted as usize)
}

impl From<Range<usize>> for CharRange {
    fn from(r: Range<usize>) -> Self {
        CharRange::new(Some(r.start as isize), Some(r.end as isize))
    }
}

impl From<RangeFrom<usize>> for CharRange {
    fn from(r: RangeFrom<usize>) -> Self {
        CharRange::new(Some(r.start as isize), None)
    }
}

impl From<RangeTo<usize>> for CharRange {
    fn from(r: RangeTo<usize>) -> Self {
        CharRange::new(None, Some(r.end as isize))
    }
}

impl From<RangeFull> for CharRange {
    fn from(_: RangeFull) -> Self {
        CharRange::new(None, None)
    }
}

/// A single character index `i` selects `i..i + 1`.
impl From<usize> for CharRange {
    fn from(i: usize) -> Self {
        CharRange::new(Some(i as isize), Some(i as isize + 1))
    }
}

/// Signed bounds, for ranges measured from the end (e.g. `(-3, -1)`).
impl From<(isize, isize)> for CharRange {
    fn from((start, stop): (isize, isize)) -> Self {
        CharRange::new(Some(start), Some(stop))
    }
}

impl RichString {
    /// Copies the characters in `range` out as a new sequence.
    ///
    /// Each element overlapping the span is cloned, with the first and last
    /// clones trimmed at the interior offsets. A stop boundary that coincides
    /// with an element end closes inside that element, so styles are never
    /// picked up from the element after the span. The receiver is unchanged.
    pub fn slice_chars(&self, range: impl Into<CharRange>) -> Result<RichString, RichTextError> {
        let (start, stop) = range.into().resolve(self.char_len())?;
        Ok(RichString::from_elements(self.copy_char_span(start, stop)))
    }

    /// Replaces the characters in `range` with `replacement`, keeping the
    /// style of the element being edited.
    ///
    /// The resolved span must lie within a single element; a span that crosses
    /// an element boundary is rejected with
    /// [`RichTextError::PlainSpliceAcrossFragments`] before any mutation, since
    /// there is no single style to give the replacement text. Canonicalizes on
    /// success.
    ///
    /// An empty span at the very end of the string extends the last element;
    /// on an empty sequence the replacement becomes a bare-text element.
    pub fn splice_plain(
        &mut self,
        range: impl Into<CharRange>,
        replacement: &str,
    ) -> Result<(), RichTextError> {
        let total = self.char_len();
        let (start, stop) = range.into().resolve(total)?;

        if self.elements.is_empty() {
            if !replacement.is_empty() {
                self.elements.push(RichElement::Plain(replacement.to_owned()));
            }
            self.canonicalize();
            return Ok(());
        }

        let (index, local_start, local_stop) = self.locate_single_element(start, stop, total)?;
        let new_text = {
            let text = self.elements[index].text();
            let mut out = String::with_capacity(text.len() + replacement.len());
            out.push_str(slice_str_chars(text, 0, local_start));
            out.push_str(replacement);
            out.push_str(slice_str_chars(text, local_stop, usize::MAX));
            out
        };
        match &mut self.elements[index] {
            RichElement::Plain(s) => *s = new_text,
            RichElement::Styled(run) => run.text = new_text,
        }
        self.canonicalize();
        Ok(())
    }

    /// Replaces the characters in `range` with copies of `value`'s elements.
    ///
    /// The backing list becomes: the trimmed elements before `start`, then
    /// `value`'s elements, then the trimmed elements after `stop`. No
    /// single-element restriction applies; an empty span at an interior run
    /// offset splits that run and both halves keep its style. Canonicalizes on
    /// success.
    pub fn splice_rich(
        &mut self,
        range: impl Into<CharRange>,
        value: &RichString,
    ) -> Result<(), RichTextError> {
        let total = self.char_len();
        let (start, stop) = range.into().resolve(total)?;

        let mut rebuilt = self.copy_char_span(0, start);
        rebuilt.extend(value.elements.iter().cloned());
        rebuilt.extend(self.copy_char_span(stop, total));
        self.elements = rebuilt;
        self.canonicalize();
        Ok(())
    }

    /// Clones the elements overlapping `[start, stop)`, trimming the first and
    /// last at their interior offsets. Bounds must already be resolved.
    fn copy_char_span(&self, start: usize, stop: usize) -> Vec<RichElement> {
        let mut out = Vec::new();
        let mut pos = 0usize;
        for element in &self.elements {
            let len = element.char_len();
            let lo = start.max(pos);
            let hi = stop.min(pos + len);
            if lo < hi {
                out.push(trim_element(element, lo - pos, hi - pos));
            }
            pos += len;
            if pos >= stop {
                break;
            }
        }
        out
    }

    /// Finds the single element containing `[start, stop)` and its local
    /// offsets.
    ///
    /// The start boundary advances past every element ending at or before
    /// `start`; the stop boundary stops at the first element whose end reaches
    /// `stop`, so a stop on an element boundary attributes to the element
    /// ending there. When the two disagree the span crosses a boundary.
    ///
    /// `start == total` (an empty span at the end of the string) has no owning
    /// element under the start rule; it is attributed to the element the stop
    /// rule found, i.e. insertion extends the final element.
    fn locate_single_element(
        &self,
        start: usize,
        stop: usize,
        total: usize,
    ) -> Result<(usize, usize, usize), RichTextError> {
        let mut pos = 0usize;
        let mut start_index = None;
        for (i, element) in self.elements.iter().enumerate() {
            let len = element.char_len();
            if pos + len > start {
                start_index = Some((i, start - pos));
                break;
            }
            pos += len;
        }

        pos = 0;
        let mut stop_index = None;
        for (i, element) in self.elements.iter().enumerate() {
            let len = element.char_len();
            if pos + len >= stop {
                stop_index = Some((i, stop - pos));
                break;
            }
            pos += len;
        }
        let Some((stop_elem, local_stop)) = stop_index else {
            return Err(RichTextError::CharIndexOutOfRange {
                index: stop as isize,
                len: total,
            });
        };

        match start_index {
            Some((start_elem, local_start)) if start_elem == stop_elem => {
                Ok((start_elem, local_start, local_stop))
            }
            None if start == total => Ok((stop_elem, local_stop, local_stop)),
            _ => Err(RichTextError::PlainSpliceAcrossFragments),
        }
    }
}

fn trim_element(element: &RichElement, start: usize, stop: usize) -> RichElement {
    if start == 0 && stop >= element.char_len() {
        return element.clone();
    }
    let text = slice_str_chars(element.text(), start, stop).to_owned();
    match element {
        RichElement::Plain(_) => RichElement::Plain(text),
        RichElement::Styled(run) => RichElement::Styled(StyledRun::new(run.style.clone(), text)),
    }
}

/// Slices `text` by char indices; `stop` saturates at the end of the string.
fn slice_str_chars(text: &str, start: usize, stop: usize) -> &str {
    if start >= stop {
        return "";
    }
    let start_byte = byte_offset(text, start);
    let stop_byte = byte_offset(text, stop);
    &text[start_byte..stop_byte]
}

fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}
