use std::borrow::Cow;

use celltext_model::{Color, RichElement, RichString, RunStyle, StyledRun, Underline};
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;
use thiserror::Error;

use crate::SharedStrings;

#[derive(Debug, Error)]
pub enum SharedStringsError {
    #[error("xml parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("unrecognized rich text structure: {0}")]
    Malformed(&'static str),
}

/// Parses a whole `xl/sharedStrings.xml` document into its table of items.
pub fn parse_shared_strings_xml(xml: &str) -> Result<SharedStrings, SharedStringsError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut items = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"si" => {
                items.push(parse_item(&mut reader, b"si")?);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"si" => {
                items.push(RichString::new());
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(SharedStrings { items })
}

/// Parses a single rich text item whose root is `<si>` (shared string item) or
/// `<is>` (inline string).
///
/// A direct `<t>` child yields a bare-text element; each `<r>` run yields a
/// bare-text or styled element depending on whether it carries `<rPr>`. The
/// result is canonicalized.
pub fn parse_rich_string_xml(xml: &str) -> Result<RichString, SharedStringsError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                return match e.local_name().as_ref() {
                    b"si" => parse_item(&mut reader, b"si"),
                    b"is" => parse_item(&mut reader, b"is"),
                    _ => Err(SharedStringsError::Malformed("expected <si> or <is> root")),
                };
            }
            Event::Empty(e) if matches!(e.local_name().as_ref(), b"si" | b"is") => {
                return Ok(RichString::new());
            }
            Event::Empty(_) => {
                return Err(SharedStringsError::Malformed("expected <si> or <is> root"));
            }
            Event::Eof => {
                return Err(SharedStringsError::Malformed("no root element"));
            }
            _ => {}
        }
        buf.clear();
    }
}

fn parse_item(reader: &mut Reader<&[u8]>, end: &[u8]) -> Result<RichString, SharedStringsError> {
    let mut buf = Vec::new();
    let mut elements: Vec<RichElement> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => {
                let text = read_text(reader, QName(b"t"))?;
                elements.push(RichElement::Plain(strip_char_escapes(text)));
            }
            Event::Empty(e) if e.local_name().as_ref() == b"t" => {
                elements.push(RichElement::Plain(String::new()));
            }
            Event::Start(e) if e.local_name().as_ref() == b"r" => {
                elements.push(parse_run(reader)?);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"r" => {}
            // Phonetic guide ("ruby") annotations are not part of the
            // displayed string; skip them rather than folding their `<t>`
            // nodes into the text.
            Event::Start(e) if e.local_name().as_ref() == b"rPh" => {
                reader.read_to_end_into(e.name(), &mut Vec::new())?;
            }
            Event::Empty(e)
                if matches!(e.local_name().as_ref(), b"rPh" | b"phoneticPr") => {}
            Event::Start(e) if e.local_name().as_ref() == b"phoneticPr" => {
                reader.read_to_end_into(e.name(), &mut Vec::new())?;
            }
            Event::Start(_) | Event::Empty(_) => {
                return Err(SharedStringsError::Malformed(
                    "unexpected element in rich text item",
                ));
            }
            Event::End(e) if e.local_name().as_ref() == end => break,
            Event::Eof => {
                return Err(SharedStringsError::Malformed(
                    "unexpected eof in rich text item",
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    let mut rich = RichString::from_elements(elements);
    rich.canonicalize();
    Ok(rich)
}

fn parse_run(reader: &mut Reader<&[u8]>) -> Result<RichElement, SharedStringsError> {
    let mut buf = Vec::new();
    let mut style: Option<RunStyle> = None;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"rPr" => {
                style = Some(parse_run_properties(reader)?);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"rPr" => {
                style = Some(RunStyle::default());
            }
            Event::Start(e) if e.local_name().as_ref() == b"t" => {
                text.push_str(&strip_char_escapes(read_text(reader, QName(b"t"))?));
            }
            Event::Empty(e) if e.local_name().as_ref() == b"t" => {}
            Event::Start(_) | Event::Empty(_) => {
                return Err(SharedStringsError::Malformed("unexpected element in <r>"));
            }
            Event::End(e) if e.local_name().as_ref() == b"r" => break,
            Event::Eof => return Err(SharedStringsError::Malformed("unexpected eof in <r>")),
            _ => {}
        }
        buf.clear();
    }

    // A run without `<rPr>` stays bare text; the presence of run properties,
    // even empty ones, makes it a styled run.
    Ok(match style {
        Some(style) => RichElement::Styled(StyledRun::new(style, text)),
        None => RichElement::Plain(text),
    })
}

fn parse_run_properties(reader: &mut Reader<&[u8]>) -> Result<RunStyle, SharedStringsError> {
    let mut buf = Vec::new();
    let mut style = RunStyle::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => apply_run_property(&e, &mut style)?,
            Event::Start(e) => {
                apply_run_property(&e, &mut style)?;
                reader.read_to_end_into(e.name(), &mut Vec::new())?;
            }
            Event::End(e) if e.local_name().as_ref() == b"rPr" => break,
            Event::Eof => return Err(SharedStringsError::Malformed("unexpected eof in <rPr>")),
            _ => {}
        }
        buf.clear();
    }

    Ok(style)
}

// Unknown run properties (theme colors, font family/scheme, etc.) are ignored;
// the style type only models the overrides the rich text model round-trips.
fn apply_run_property(
    e: &quick_xml::events::BytesStart<'_>,
    style: &mut RunStyle,
) -> Result<(), SharedStringsError> {
    match e.local_name().as_ref() {
        b"b" => style.bold = Some(parse_bool_val(e)?),
        b"i" => style.italic = Some(parse_bool_val(e)?),
        b"u" => {
            let val = attr_value(e, b"val")?;
            if let Some(ul) = Underline::from_ooxml(val.as_deref()) {
                style.underline = Some(ul);
            }
        }
        b"color" => {
            if let Some(rgb) = attr_value(e, b"rgb")? {
                if rgb.len() == 8 {
                    if let Ok(argb) = u32::from_str_radix(&rgb, 16) {
                        style.color = Some(Color::new_argb(argb));
                    }
                }
            }
        }
        b"rFont" | b"name" => {
            if let Some(val) = attr_value(e, b"val")? {
                style.font = Some(val);
            }
        }
        b"sz" => {
            if let Some(val) = attr_value(e, b"val")? {
                if let Some(sz) = parse_size_100pt(&val) {
                    style.size_100pt = Some(sz);
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn parse_bool_val(e: &quick_xml::events::BytesStart<'_>) -> Result<bool, SharedStringsError> {
    let Some(val) = attr_value(e, b"val")? else {
        return Ok(true);
    };
    Ok(!(val == "0" || val.eq_ignore_ascii_case("false")))
}

fn read_text(reader: &mut Reader<&[u8]>, end: QName<'_>) -> Result<String, SharedStringsError> {
    let mut buf = Vec::new();
    let mut text = String::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => {
                let t: Cow<'_, str> = e.unescape()?;
                text.push_str(&t);
            }
            Event::CData(e) => {
                text.push_str(std::str::from_utf8(e.as_ref())?);
            }
            Event::End(e) if e.name() == end => break,
            Event::Eof => return Err(SharedStringsError::Malformed("unexpected eof in <t>")),
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}

fn attr_value(
    e: &quick_xml::events::BytesStart<'_>,
    key: &[u8],
) -> Result<Option<String>, SharedStringsError> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Strips the OOXML `x005F_` character-escape prefix that producers emit in
/// front of literal `_xHHHH_` sequences.
fn strip_char_escapes(text: String) -> String {
    if text.contains("x005F_") {
        text.replace("x005F_", "")
    } else {
        text
    }
}

/// `<sz val="11.5"/>` → 1150; fractional digits beyond 1/100pt are dropped.
fn parse_size_100pt(val: &str) -> Option<u16> {
    let val = val.trim();
    if val.is_empty() {
        return None;
    }

    if let Some((int_part, frac_part)) = val.split_once('.') {
        let int: u16 = int_part.parse().ok()?;
        let mut frac = frac_part.chars().take(2).collect::<String>();
        while frac.len() < 2 {
            frac.push('0');
        }
        let frac: u16 = frac.parse().ok()?;
        int.checked_mul(100)?.checked_add(frac)
    } else {
        let int: u16 = val.parse().ok()?;
        int.checked_mul(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_item_parses_to_single_element() {
        let rich = parse_rich_string_xml("<si><t>a</t></si>").unwrap();
        assert_eq!(rich.elements(), &[RichElement::Plain("a".into())]);
    }

    #[test]
    fn inline_string_root_is_accepted() {
        let rich = parse_rich_string_xml("<is><t>inline</t></is>").unwrap();
        assert_eq!(rich.text(), "inline");
    }

    #[test]
    fn mixed_runs_preserve_order_and_styles() {
        let xml = r#"<si><r><t>a</t></r><r><rPr><b/><sz val="11"/><rFont val="Calibri"/></rPr><t>c</t></r><r><t>e</t></r></si>"#;
        let rich = parse_rich_string_xml(xml).unwrap();
        assert_eq!(
            rich.elements(),
            &[
                RichElement::Plain("a".into()),
                RichElement::Styled(StyledRun::new(
                    RunStyle {
                        bold: Some(true),
                        font: Some("Calibri".into()),
                        size_100pt: Some(1100),
                        ..Default::default()
                    },
                    "c",
                )),
                RichElement::Plain("e".into()),
            ]
        );
    }

    #[test]
    fn run_with_empty_rpr_is_styled_with_default_style() {
        let rich = parse_rich_string_xml("<si><r><rPr/><t>x</t></r></si>").unwrap();
        assert_eq!(
            rich.elements(),
            &[RichElement::Styled(StyledRun::plain_styled("x"))]
        );
    }

    #[test]
    fn adjacent_unstyled_runs_canonicalize_into_one_element() {
        let rich = parse_rich_string_xml("<si><r><t>a</t></r><r><t>b</t></r></si>").unwrap();
        assert_eq!(rich.elements(), &[RichElement::Plain("ab".into())]);
    }

    #[test]
    fn escape_prefix_is_stripped_from_text() {
        let rich = parse_rich_string_xml("<si><t>ax005F_x0001_b</t></si>").unwrap();
        assert_eq!(rich.text(), "ax0001_b");

        let rich = parse_rich_string_xml("<si><r><t>x005F_x000D_</t></r></si>").unwrap();
        assert_eq!(rich.text(), "x000D_");
    }

    #[test]
    fn underline_and_color_and_bool_vals() {
        let xml = r#"<si><r><rPr><b val="0"/><u val="double"/><color rgb="FF00FF00"/></rPr><t>q</t></r></si>"#;
        let rich = parse_rich_string_xml(xml).unwrap();
        let style = rich.elements()[0].style().unwrap();
        assert_eq!(style.bold, Some(false));
        assert_eq!(style.underline, Some(Underline::Double));
        assert_eq!(style.color, Some(Color::new_argb(0xFF00FF00)));
    }

    #[test]
    fn phonetic_annotations_are_skipped() {
        let xml = r#"<si><t>Base</t><phoneticPr fontId="0"/><rPh sb="0" eb="4"><t>PHO</t></rPh></si>"#;
        let rich = parse_rich_string_xml(xml).unwrap();
        assert_eq!(rich.text(), "Base");
    }

    #[test]
    fn unrecognized_structure_is_rejected() {
        let err = parse_rich_string_xml("<si><bogus/></si>").unwrap_err();
        assert!(matches!(err, SharedStringsError::Malformed(_)));

        let err = parse_rich_string_xml("<si><r><q/><t>a</t></r></si>").unwrap_err();
        assert!(matches!(err, SharedStringsError::Malformed(_)));

        let err = parse_rich_string_xml("<sst><si><t>a</t></si></sst>").unwrap_err();
        assert!(matches!(err, SharedStringsError::Malformed(_)));
    }

    #[test]
    fn truncated_input_is_rejected() {
        let err = parse_rich_string_xml("<si><t>a</t>").unwrap_err();
        assert!(matches!(err, SharedStringsError::Malformed(_)));
    }

    #[test]
    fn shared_strings_table_parses_in_document_order() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="2">
  <si><t>first</t></si>
  <si><r><rPr><i/></rPr><t>second</t></r></si>
</sst>"#;
        let shared = parse_shared_strings_xml(xml).unwrap();
        assert_eq!(shared.len(), 2);
        assert_eq!(shared.items[0].text(), "first");
        assert_eq!(shared.items[1].elements()[0].style().unwrap().italic, Some(true));
    }

    #[test]
    fn fractional_font_sizes() {
        assert_eq!(parse_size_100pt("11"), Some(1100));
        assert_eq!(parse_size_100pt("11.5"), Some(1150));
        assert_eq!(parse_size_100pt("9.75"), Some(975));
        assert_eq!(parse_size_100pt(""), None);
        assert_eq!(parse_size_100pt("abc"), None);
    }
}
