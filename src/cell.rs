//! Cell model: a tagged union of seven value kinds (spec §3/§4.1).

use crate::coord::cell_address;
use crate::datetime;
use crate::error::{Result, SheetcraftError};
use crate::numfmt;
use crate::xml_writer::XmlWriter;
use chrono::{DateTime, FixedOffset};
use std::io::Write;

/// How a boolean value is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoolExpression {
    TrueFalse,
    TF,
    ZeroOne,
    YesNo,
    Custom(String, String),
}

impl Default for BoolExpression {
    fn default() -> Self {
        BoolExpression::ZeroOne
    }
}

/// Case transform applied to a boolean's textual representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseStrategy {
    Upper,
    Lower,
    FirstLetterUpper,
}

impl Default for CaseStrategy {
    fn default() -> Self {
        CaseStrategy::Upper
    }
}

fn apply_case(s: &str, case: CaseStrategy) -> String {
    match case {
        CaseStrategy::Upper => s.to_uppercase(),
        CaseStrategy::Lower => s.to_lowercase(),
        CaseStrategy::FirstLetterUpper => {
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        }
    }
}

/// An absolute URI. This crate does not parse or validate URI grammar
/// beyond requiring a `scheme://` prefix — spec §3 treats `Url` as an
/// opaque already-absolute value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri(String);

impl Uri {
    pub fn parse(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if !s.contains("://") {
            return Err(SheetcraftError::EncodingError(format!(
                "not an absolute URI: {s}"
            )));
        }
        Ok(Uri(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Tagged union of the seven Excel-native value kinds (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    Text(Option<String>),
    Integer(Option<i64>),
    Number(Option<f64>),
    Percentage(Option<f64>, u8),
    Date(Option<DateTime<FixedOffset>>, FixedOffset),
    Boolean(Option<bool>, BoolExpression, CaseStrategy),
    Url(Option<Uri>),
}

impl CellKind {
    /// The boolean's textual form under its expression/case config.
    fn boolean_text(value: bool, expr: &BoolExpression, case: CaseStrategy) -> String {
        let (t, f) = match expr {
            BoolExpression::TrueFalse => ("True".to_string(), "False".to_string()),
            BoolExpression::TF => ("T".to_string(), "F".to_string()),
            BoolExpression::ZeroOne => ("1".to_string(), "0".to_string()),
            BoolExpression::YesNo => ("Yes".to_string(), "No".to_string()),
            BoolExpression::Custom(t, f) => (t.clone(), f.clone()),
        };
        apply_case(if value { &t } else { &f }, case)
    }

    /// Text that must go through the shared-string register before this
    /// cell can be emitted, or `None` if the cell carries its value
    /// inline/numerically.
    pub fn shared_string_payload(&self) -> Option<String> {
        match self {
            CellKind::Text(Some(s)) => Some(s.clone()),
            CellKind::Url(Some(u)) => Some(u.as_str().to_string()),
            CellKind::Boolean(Some(v), expr, case) if !matches!(expr, BoolExpression::ZeroOne) => {
                Some(Self::boolean_text(*v, expr, *case))
            }
            _ => None,
        }
    }

    /// Content of `<v>` for cells that carry their value numerically
    /// (everything except shared-stringed text/url/non-fast-path bool).
    fn numeric_value_string(&self) -> String {
        match self {
            CellKind::Integer(Some(i)) => {
                let mut buf = itoa::Buffer::new();
                buf.format(*i).to_string()
            }
            CellKind::Integer(None) => String::new(),
            CellKind::Number(Some(f)) => numfmt::format_number(*f),
            CellKind::Number(None) => String::new(),
            CellKind::Percentage(Some(v), p) => numfmt::format_percentage(*v, *p),
            CellKind::Percentage(None, _) => String::new(),
            CellKind::Date(Some(instant), tz) => {
                numfmt::format_number(datetime::to_excel_serial(*instant, *tz))
            }
            CellKind::Date(None, _) => String::new(),
            CellKind::Boolean(Some(v), BoolExpression::ZeroOne, _) => {
                if *v { "1".to_string() } else { "0".to_string() }
            }
            CellKind::Boolean(None, _, _) => String::new(),
            _ => String::new(),
        }
    }

    /// The cell's number-format selection (spec §4.5), independent of
    /// any caller-supplied style.
    pub fn implied_number_format(&self) -> NumberFormat {
        match self {
            CellKind::Percentage(_, p) => NumberFormat::Percentage(*p),
            CellKind::Date(_, _) => NumberFormat::BuiltinDateTime,
            _ => NumberFormat::None,
        }
    }

    pub fn is_empty_value(&self) -> bool {
        matches!(
            self,
            CellKind::Text(None)
                | CellKind::Integer(None)
                | CellKind::Number(None)
                | CellKind::Percentage(None, _)
                | CellKind::Date(None, _)
                | CellKind::Boolean(None, _, _)
                | CellKind::Url(None)
        )
    }
}

/// Number format implied purely by a cell's kind (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberFormat {
    None,
    Percentage(u8),
    BuiltinDateTime,
}

/// One worksheet cell (spec §3). `style_id`/`shared_string_id` are
/// filled in by the sheet assembler after registering with the two
/// global registries.
#[derive(Debug, Clone)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    pub value: CellKind,
    pub style_id: Option<u32>,
    pub shared_string_id: Option<u32>,
}

impl Cell {
    pub fn new(row: u32, col: u32, value: CellKind) -> Self {
        Cell {
            row,
            col,
            value,
            style_id: None,
            shared_string_id: None,
        }
    }

    pub fn address(&self) -> String {
        cell_address(self.row, self.col)
    }

    pub fn write_xml<W: Write>(&self, writer: &mut XmlWriter<W>) -> Result<()> {
        writer.start_element("c")?;
        writer.attribute("r", &self.address())?;
        if let Some(style_id) = self.style_id {
            writer.attribute_int("s", style_id as i64)?;
        }

        let is_text_like = matches!(self.value, CellKind::Text(_) | CellKind::Url(_));

        match (self.shared_string_id, is_text_like) {
            (Some(id), _) => {
                writer.attribute("t", "s")?;
                writer.close_start_tag()?;
                writer.start_element("v")?;
                writer.close_start_tag()?;
                let mut buf = itoa::Buffer::new();
                writer.write_str(buf.format(id))?;
                writer.end_element("v")?;
            }
            (None, true) => {
                writer.attribute("t", "inlineStr")?;
                writer.close_start_tag()?;
                writer.start_element("is")?;
                writer.close_start_tag()?;
                writer.start_element("t")?;
                writer.close_start_tag()?;
                if let CellKind::Text(Some(s)) = &self.value {
                    writer.write_escaped(s)?;
                }
                writer.end_element("t")?;
                writer.end_element("is")?;
            }
            (None, false) => {
                if matches!(self.value, CellKind::Boolean(Some(_), BoolExpression::ZeroOne, _)) {
                    writer.attribute("t", "b")?;
                }
                let value_str = self.value.numeric_value_string();
                if value_str.is_empty() {
                    writer.close_empty_tag()?;
                    return Ok(());
                }
                writer.close_start_tag()?;
                writer.start_element("v")?;
                writer.close_start_tag()?;
                writer.write_str(&value_str)?;
                writer.end_element("v")?;
            }
        }

        writer.end_element("c")?;
        Ok(())
    }
}
