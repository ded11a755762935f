//! `celltext-model` defines the in-memory representation of rich (multi-style)
//! spreadsheet cell text.
//!
//! The crate is intentionally self-contained so it can be reused by:
//! - `.xlsx` shared-string / inline-string import/export layers
//! - IPC boundaries via `serde` (JSON-safe schema)
//!
//! A [`RichString`] is an ordered list of elements, each either a plain string
//! or a [`StyledRun`]. Every mutating operation re-canonicalizes the list
//! (adjacent compatible elements merge, empty elements drop), so consumers can
//! rely on a minimal representation. On top of the element-indexed API,
//! [`char_index`] adds addressing by character offset across the whole logical
//! string.

pub mod char_index;
mod error;
mod fragment;
mod sequence;
mod style;

pub use char_index::CharRange;
pub use error::RichTextError;
pub use fragment::StyledRun;
pub use sequence::{RichElement, RichString};
pub use style::{Color, RunStyle, Underline};
