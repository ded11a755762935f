//! Translation between [`celltext_model`] rich strings and the OOXML
//! shared-strings / inline-string XML shape.
//!
//! The recognized structure is deliberately narrow: an `<si>` (shared string
//! item) or `<is>` (inline string) element holding either a direct `<t>` text
//! node or a list of `<r>` runs, each with an optional `<rPr>` run-properties
//! block and a `<t>` node, per the SpreadsheetML shared-strings schema. The
//! whole-table entry points handle `xl/sharedStrings.xml` (`<sst>`).

mod parse;
mod write;

use celltext_model::RichString;

pub use parse::parse_rich_string_xml;
pub use parse::parse_shared_strings_xml;
pub use parse::SharedStringsError;
pub use write::rich_string_to_xml;
pub use write::write_shared_strings_xml;
pub use write::RootTag;
pub use write::WriteSharedStringsError;

pub(crate) const OOXML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Shared strings table (`xl/sharedStrings.xml`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SharedStrings {
    pub items: Vec<RichString>,
}

impl SharedStrings {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&RichString> {
        self.items.get(index as usize)
    }

    /// Index of an equal existing item, or the index `rich` was appended at.
    pub fn get_or_insert(&mut self, rich: &RichString) -> u32 {
        if let Some(idx) = self.items.iter().position(|item| item == rich) {
            return idx as u32;
        }
        self.items.push(rich.clone());
        (self.items.len() - 1) as u32
    }
}
