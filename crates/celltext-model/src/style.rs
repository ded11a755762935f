use core::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An ARGB color.
///
/// Serialized as a `#AARRGGBB` hex string for IPC friendliness.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub argb: u32,
}

impl Color {
    pub const fn new_argb(argb: u32) -> Self {
        Self { argb }
    }

    fn to_hex(self) -> String {
        format!("#{:08X}", self.argb)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let hex = s.trim().strip_prefix('#').ok_or_else(|| {
            D::Error::custom("color must be a #AARRGGBB hex string (missing '#')")
        })?;
        if hex.len() != 8 {
            return Err(D::Error::custom(
                "color must be a #AARRGGBB hex string (8 hex digits)",
            ));
        }
        let argb = u32::from_str_radix(hex, 16).map_err(|_| D::Error::custom("invalid hex"))?;
        Ok(Color { argb })
    }
}

/// Per-run font overrides.
///
/// All fields are optional; `None` means "inherit from the cell font". The
/// `Default` value carries no overrides at all and is the style of a run with
/// no special formatting.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStyle {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<Underline>,
    pub color: Option<Color>,
    pub font: Option<String>,
    /// Font size in 1/100 points (e.g. 1100 = 11pt).
    pub size_100pt: Option<u16>,
}

impl RunStyle {
    pub fn is_default(&self) -> bool {
        self.bold.is_none()
            && self.italic.is_none()
            && self.underline.is_none()
            && self.color.is_none()
            && self.font.is_none()
            && self.size_100pt.is_none()
    }
}

impl fmt::Display for RunStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            return f.write_str("default");
        }
        let mut parts = Vec::new();
        if let Some(b) = self.bold {
            parts.push(format!("bold={b}"));
        }
        if let Some(i) = self.italic {
            parts.push(format!("italic={i}"));
        }
        if let Some(u) = self.underline {
            parts.push(format!("underline={u:?}"));
        }
        if let Some(c) = self.color {
            parts.push(format!("color={c}"));
        }
        if let Some(name) = &self.font {
            parts.push(format!("font={name}"));
        }
        if let Some(sz) = self.size_100pt {
            parts.push(format!("sz={sz}"));
        }
        f.write_str(&parts.join(" "))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Underline {
    Single,
    Double,
    SingleAccounting,
    DoubleAccounting,
    None,
}

impl Underline {
    /// OOXML `<u val="..."/>`; an absent `val` means single underline.
    pub fn from_ooxml(val: Option<&str>) -> Option<Self> {
        match val {
            None => Some(Underline::Single),
            Some("single") => Some(Underline::Single),
            Some("double") => Some(Underline::Double),
            Some("singleAccounting") => Some(Underline::SingleAccounting),
            Some("doubleAccounting") => Some(Underline::DoubleAccounting),
            Some("none") => Some(Underline::None),
            _ => None,
        }
    }

    /// The `val` attribute to emit, or `None` for the single-underline default.
    pub fn to_ooxml(self) -> Option<&'static str> {
        match self {
            Underline::Single => None,
            Underline::Double => Some("double"),
            Underline::SingleAccounting => Some("singleAccounting"),
            Underline::DoubleAccounting => Some("doubleAccounting"),
            Underline::None => Some("none"),
        }
    }
}
