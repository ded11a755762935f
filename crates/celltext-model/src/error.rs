use thiserror::Error;

/// Errors raised by [`crate::RichString`] indexing and mutation.
///
/// All of these represent caller mistakes, not transient conditions; no
/// operation performs partial mutation before returning one of them.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RichTextError {
    #[error("fragment index {index} out of range for sequence of {len} elements")]
    FragmentIndexOutOfRange { index: usize, len: usize },
    #[error("character index {index} out of range for text of length {len}")]
    CharIndexOutOfRange { index: isize, len: usize },
    #[error("character range start {start} is past stop {stop}")]
    InvertedCharRange { start: usize, stop: usize },
    #[error("plain text cannot replace a range spanning multiple elements; splice rich text instead")]
    PlainSpliceAcrossFragments,
    #[error("character ranges only support step 1, got {0}")]
    UnsupportedStep(isize),
}
