use celltext_model::{RichElement, RichString, RunStyle, StyledRun, Underline};
use celltext_xlsx::{
    parse_rich_string_xml, parse_shared_strings_xml, rich_string_to_xml, write_shared_strings_xml,
    RootTag, SharedStrings,
};
use pretty_assertions::assert_eq;

fn bold() -> RunStyle {
    RunStyle {
        bold: Some(true),
        ..Default::default()
    }
}

#[test]
fn plain_item_round_trips() {
    let xml = "<si><t>a</t></si>";
    let rich = parse_rich_string_xml(xml).unwrap();
    assert_eq!(rich.elements(), &[RichElement::Plain("a".into())]);
    assert_eq!(rich_string_to_xml(&rich, RootTag::Si).unwrap(), xml);
}

#[test]
fn mixed_runs_round_trip() {
    let xml = "<si><r><t>a</t></r><r><rPr><b/></rPr><t>c</t></r><r><t>e</t></r></si>";
    let rich = parse_rich_string_xml(xml).unwrap();
    assert_eq!(
        rich.elements(),
        &[
            RichElement::Plain("a".into()),
            RichElement::Styled(StyledRun::new(bold(), "c")),
            RichElement::Plain("e".into()),
        ]
    );
    assert_eq!(rich_string_to_xml(&rich, RootTag::Si).unwrap(), xml);
}

#[test]
fn full_style_round_trips_through_write_then_parse() {
    let style = RunStyle {
        bold: Some(true),
        italic: Some(false),
        underline: Some(Underline::Double),
        color: Some(celltext_model::Color::new_argb(0xFFFF0000)),
        font: Some("Calibri".into()),
        size_100pt: Some(1150),
    };
    let rich = RichString::from_elements(vec![
        RichElement::Plain("pre".into()),
        RichElement::Styled(StyledRun::new(style.clone(), "mid")),
        RichElement::Plain("post".into()),
    ]);

    let xml = rich_string_to_xml(&rich, RootTag::Si).unwrap();
    let back = parse_rich_string_xml(&xml).unwrap();
    assert_eq!(back, rich);
    assert_eq!(back.elements()[1].style(), Some(&style));
}

#[test]
fn inline_string_round_trips() {
    let rich = RichString::from_elements(vec![
        RichElement::Plain("x".into()),
        RichElement::Styled(StyledRun::new(bold(), "y")),
    ]);
    let xml = rich_string_to_xml(&rich, RootTag::Is).unwrap();
    assert!(xml.starts_with("<is>") && xml.ends_with("</is>"));
    assert_eq!(parse_rich_string_xml(&xml).unwrap(), rich);
}

#[test]
fn concatenated_sequences_serialize_merged() {
    // Two sequences ending/starting with identically styled runs concatenate
    // into a single merged run, and that is what reaches the XML.
    let left = RichString::from_elements(vec![
        RichElement::Plain("a".into()),
        RichElement::Styled(StyledRun::new(bold(), "c")),
    ]);
    let right = RichString::from_elements(vec![
        RichElement::Styled(StyledRun::new(bold(), "d")),
        RichElement::Plain("e".into()),
    ]);
    let joined = &left + &right;
    assert_eq!(
        rich_string_to_xml(&joined, RootTag::Si).unwrap(),
        "<si><r><t>a</t></r><r><rPr><b/></rPr><t>cd</t></r><r><t>e</t></r></si>"
    );
}

#[test]
fn shared_strings_table_round_trips() {
    let mut shared = SharedStrings::default();
    shared.get_or_insert(&RichString::from("plain"));
    shared.get_or_insert(&RichString::from_elements(vec![
        RichElement::Plain("a".into()),
        RichElement::Styled(StyledRun::new(bold(), "b")),
    ]));
    // Duplicate insert returns the existing index and does not grow the table.
    assert_eq!(shared.get_or_insert(&RichString::from("plain")), 0);
    assert_eq!(shared.len(), 2);

    let xml = write_shared_strings_xml(&shared, None).unwrap();
    let back = parse_shared_strings_xml(&xml).unwrap();
    assert_eq!(back, shared);
}

#[test]
fn character_edits_survive_a_round_trip() {
    let xml = r#"<si><r><t>ab</t></r><r><rPr><sz val="22"/></rPr><t>cd</t></r><r><t>ef</t></r></si>"#;
    let mut rich = parse_rich_string_xml(xml).unwrap();

    let insert = RichString::from(StyledRun::new(bold(), "XX"));
    rich.splice_rich(3..3, &insert).unwrap();
    assert_eq!(rich.text(), "abcXXdef");

    let rewritten = rich_string_to_xml(&rich, RootTag::Si).unwrap();
    let back = parse_rich_string_xml(&rewritten).unwrap();
    assert_eq!(back, rich);
    // Both halves of the split run keep the original size.
    let sz = RunStyle {
        size_100pt: Some(2200),
        ..Default::default()
    };
    assert_eq!(back.elements()[1], RichElement::Styled(StyledRun::new(sz.clone(), "c")));
    assert_eq!(back.elements()[3], RichElement::Styled(StyledRun::new(sz, "d")));
}
