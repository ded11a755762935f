use std::io::Write;

use celltext_model::{RichString, RunStyle};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::{SharedStrings, OOXML_NS};

#[derive(Debug, Error)]
pub enum WriteSharedStringsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Root tag for a single rich text item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RootTag {
    /// `<si>`: shared string item in `xl/sharedStrings.xml`.
    Si,
    /// `<is>`: inline string inside a worksheet cell.
    Is,
}

impl RootTag {
    fn as_str(self) -> &'static str {
        match self {
            RootTag::Si => "si",
            RootTag::Is => "is",
        }
    }
}

/// Serializes one rich string as an `<si>`/`<is>` element.
///
/// A plain sequence (no styled element) emits a single direct `<t>` node;
/// otherwise every element becomes an `<r>` run, with `<rPr>` before the run
/// text when the element carries a style.
pub fn rich_string_to_xml(
    rich: &RichString,
    root: RootTag,
) -> Result<String, WriteSharedStringsError> {
    let mut writer = Writer::new(Vec::new());
    write_item(&mut writer, rich, root.as_str())?;
    Ok(String::from_utf8(writer.into_inner())?)
}

/// Serializes a whole `xl/sharedStrings.xml` document.
///
/// `ref_count` is the workbook-wide number of cells referencing the table (the
/// `count` attribute); when unknown, the unique item count is used for both
/// attributes.
pub fn write_shared_strings_xml(
    shared: &SharedStrings,
    ref_count: Option<u32>,
) -> Result<String, WriteSharedStringsError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let unique = shared.len() as u32;
    let count = ref_count.unwrap_or(unique);
    let mut sst = BytesStart::new("sst");
    sst.push_attribute(("xmlns", OOXML_NS));
    sst.push_attribute(("count", count.to_string().as_str()));
    sst.push_attribute(("uniqueCount", unique.to_string().as_str()));
    writer.write_event(Event::Start(sst))?;

    for item in &shared.items {
        write_item(&mut writer, item, "si")?;
    }

    writer.write_event(Event::End(BytesEnd::new("sst")))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_item<W: Write>(
    writer: &mut Writer<W>,
    rich: &RichString,
    tag: &str,
) -> Result<(), WriteSharedStringsError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    if rich.is_plain() {
        write_t(writer, &rich.text())?;
    } else {
        for element in rich.elements() {
            writer.write_event(Event::Start(BytesStart::new("r")))?;
            if let Some(style) = element.style() {
                writer.write_event(Event::Start(BytesStart::new("rPr")))?;
                write_run_properties(writer, style)?;
                writer.write_event(Event::End(BytesEnd::new("rPr")))?;
            }
            write_t(writer, element.text())?;
            writer.write_event(Event::End(BytesEnd::new("r")))?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_t<W: Write>(writer: &mut Writer<W>, text: &str) -> Result<(), WriteSharedStringsError> {
    let mut t = BytesStart::new("t");
    if needs_space_preserve(text) {
        t.push_attribute(("xml:space", "preserve"));
    }
    writer.write_event(Event::Start(t))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("t")))?;
    Ok(())
}

fn write_run_properties<W: Write>(
    writer: &mut Writer<W>,
    style: &RunStyle,
) -> Result<(), WriteSharedStringsError> {
    if let Some(font) = &style.font {
        let mut rfont = BytesStart::new("rFont");
        rfont.push_attribute(("val", font.as_str()));
        writer.write_event(Event::Empty(rfont))?;
    }

    if let Some(size_100pt) = style.size_100pt {
        let mut sz = BytesStart::new("sz");
        let value = format_size_100pt(size_100pt);
        sz.push_attribute(("val", value.as_str()));
        writer.write_event(Event::Empty(sz))?;
    }

    if let Some(color) = style.color {
        let mut c = BytesStart::new("color");
        let value = format!("{:08X}", color.argb);
        c.push_attribute(("rgb", value.as_str()));
        writer.write_event(Event::Empty(c))?;
    }

    if let Some(bold) = style.bold {
        let mut b = BytesStart::new("b");
        if !bold {
            b.push_attribute(("val", "0"));
        }
        writer.write_event(Event::Empty(b))?;
    }

    if let Some(italic) = style.italic {
        let mut i = BytesStart::new("i");
        if !italic {
            i.push_attribute(("val", "0"));
        }
        writer.write_event(Event::Empty(i))?;
    }

    if let Some(ul) = style.underline {
        let mut u = BytesStart::new("u");
        if let Some(val) = ul.to_ooxml() {
            u.push_attribute(("val", val));
        }
        writer.write_event(Event::Empty(u))?;
    }

    Ok(())
}

fn needs_space_preserve(s: &str) -> bool {
    s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace)
}

fn format_size_100pt(size_100pt: u16) -> String {
    let int = size_100pt / 100;
    let frac = size_100pt % 100;
    if frac == 0 {
        return int.to_string();
    }

    let mut s = format!("{int}.{frac:02}");
    while s.ends_with('0') {
        s.pop();
    }
    s
}
