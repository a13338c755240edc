//! Style model and register (spec §4.5): fonts, fills, borders, alignment,
//! merged into `CellStyle` records and deduplicated down to a `cellXfs`
//! table, grounded on the hand-written `styles.xml` skeleton in the
//! teacher's `fast_writer/workbook.rs` but driven by a real dedup registry
//! instead of a fixed, hardcoded table.

use crate::cell::NumberFormat;
use crate::error::Result;
use crate::numfmt::percentage_format_code;
use crate::registry::Registry;
use crate::xml_writer::XmlWriter;
use std::collections::HashMap;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Font {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub size: Option<u32>,
    pub name: Option<String>,
    pub color_rgb: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Fill {
    pub fg_color_rgb: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderEdgeStyle {
    None,
    Thin,
    Medium,
    Thick,
}

impl Default for BorderEdgeStyle {
    fn default() -> Self {
        BorderEdgeStyle::None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Border {
    pub left: BorderEdgeStyle,
    pub right: BorderEdgeStyle,
    pub top: BorderEdgeStyle,
    pub bottom: BorderEdgeStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAlign {
    General,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Alignment {
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
    pub wrap_text: bool,
}

impl Default for Alignment {
    fn default() -> Self {
        Alignment {
            horizontal: HorizontalAlign::General,
            vertical: VerticalAlign::Bottom,
            wrap_text: false,
        }
    }
}

/// `{ font, fill, alignment, border }` (spec §3). Every field is a value
/// type the registry dedups by structural equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CellStyle {
    pub font: Option<Font>,
    pub fill: Option<Fill>,
    pub alignment: Option<Alignment>,
    pub border: Option<Border>,
}

impl CellStyle {
    /// Field-wise fold: a `Some` in `over` replaces the field in `self`;
    /// `None` preserves it (spec §4.5 merge order).
    pub fn merge_under(&self, over: &CellStyle) -> CellStyle {
        CellStyle {
            font: over.font.clone().or_else(|| self.font.clone()),
            fill: over.fill.clone().or_else(|| self.fill.clone()),
            alignment: over.alignment.or(self.alignment),
            border: over.border.clone().or_else(|| self.border.clone()),
        }
    }
}

/// Fully resolved `<xf>` record: a style plus the number format it was
/// composed with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResolvedStyle {
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    alignment: Option<Alignment>,
    num_fmt_id: u32,
}

/// Six deduplicated pools feeding `styles.xml` (spec §4.5): fonts, fills,
/// borders, alignments, number formats, and resolved `<xf>` records.
pub struct StyleRegister {
    fonts: Registry<Font>,
    fills: Registry<Fill>,
    borders: Registry<Border>,
    number_formats: Registry<String>,
    resolved: Registry<ResolvedStyle>,
    custom_format_ids: HashMap<String, u32>,
}

const FIRST_CUSTOM_NUM_FMT_ID: u32 = 164;
const BUILTIN_DATE_TIME_NUM_FMT_ID: u32 = 22;

impl StyleRegister {
    pub fn new() -> Self {
        let mut reg = StyleRegister {
            fonts: Registry::new(),
            fills: Registry::new(),
            borders: Registry::new(),
            number_formats: Registry::new(),
            resolved: Registry::new(),
            custom_format_ids: HashMap::new(),
        };
        reg.fonts.append(Font::default());
        reg.fills.append(Fill::default());
        reg.borders.append(Border::default());
        let (index, _) = reg.resolved.append(ResolvedStyle {
            font_id: 0,
            fill_id: 0,
            border_id: 0,
            alignment: None,
            num_fmt_id: 0,
        });
        debug_assert_eq!(index, 0);
        reg
    }

    fn number_format_id(&mut self, format: NumberFormat) -> u32 {
        match format {
            NumberFormat::None => 0,
            NumberFormat::BuiltinDateTime => BUILTIN_DATE_TIME_NUM_FMT_ID,
            NumberFormat::Percentage(precision) => {
                let code = percentage_format_code(precision);
                if let Some(id) = self.custom_format_ids.get(&code) {
                    return *id;
                }
                let (index, _) = self.number_formats.append(code.clone());
                let id = FIRST_CUSTOM_NUM_FMT_ID + index;
                self.custom_format_ids.insert(code, id);
                id
            }
        }
    }

    /// Registers `style` composed with `format`, returning the index into
    /// `<cellXfs>` (`None` only if the caller passes no style and no
    /// format, in which case the default entry at index 0 applies).
    pub fn register(&mut self, style: &CellStyle, format: NumberFormat) -> Option<u32> {
        let num_fmt_id = self.number_format_id(format);
        let font_id = style
            .font
            .clone()
            .map(|f| self.fonts.append(f).0)
            .unwrap_or(0);
        let fill_id = style
            .fill
            .clone()
            .map(|f| self.fills.append(f).0)
            .unwrap_or(0);
        let border_id = style
            .border
            .clone()
            .map(|b| self.borders.append(b).0)
            .unwrap_or(0);

        if font_id == 0 && fill_id == 0 && border_id == 0 && style.alignment.is_none() && num_fmt_id == 0 {
            return None;
        }

        let (index, _) = self.resolved.append(ResolvedStyle {
            font_id,
            fill_id,
            border_id,
            alignment: style.alignment,
            num_fmt_id,
        });
        Some(index)
    }

    fn write_font_xml<W: Write>(writer: &mut XmlWriter<W>, font: &Font) -> Result<()> {
        writer.start_element("font")?;
        writer.close_start_tag()?;
        if font.bold {
            writer.start_element("b")?;
            writer.close_empty_tag()?;
        }
        if font.italic {
            writer.start_element("i")?;
            writer.close_empty_tag()?;
        }
        if font.underline {
            writer.start_element("u")?;
            writer.close_empty_tag()?;
        }
        writer.start_element("sz")?;
        writer.attribute_int("val", font.size.unwrap_or(11) as i64)?;
        writer.close_empty_tag()?;
        writer.start_element("name")?;
        writer.attribute("val", font.name.as_deref().unwrap_or("Calibri"))?;
        writer.close_empty_tag()?;
        if let Some(rgb) = &font.color_rgb {
            writer.start_element("color")?;
            writer.attribute("rgb", rgb)?;
            writer.close_empty_tag()?;
        }
        writer.end_element("font")?;
        Ok(())
    }

    fn write_fill_xml<W: Write>(writer: &mut XmlWriter<W>, fill: &Fill) -> Result<()> {
        writer.start_element("fill")?;
        writer.close_start_tag()?;
        writer.start_element("patternFill")?;
        match &fill.fg_color_rgb {
            Some(rgb) => {
                writer.attribute("patternType", "solid")?;
                writer.close_start_tag()?;
                writer.start_element("fgColor")?;
                writer.attribute("rgb", rgb)?;
                writer.close_empty_tag()?;
                writer.end_element("patternFill")?;
            }
            None => {
                writer.attribute("patternType", "none")?;
                writer.close_empty_tag()?;
            }
        }
        writer.end_element("fill")?;
        Ok(())
    }

    fn border_edge_attr(style: BorderEdgeStyle) -> Option<&'static str> {
        match style {
            BorderEdgeStyle::None => None,
            BorderEdgeStyle::Thin => Some("thin"),
            BorderEdgeStyle::Medium => Some("medium"),
            BorderEdgeStyle::Thick => Some("thick"),
        }
    }

    fn write_border_edge<W: Write>(
        writer: &mut XmlWriter<W>,
        name: &str,
        style: BorderEdgeStyle,
    ) -> Result<()> {
        writer.start_element(name)?;
        match Self::border_edge_attr(style) {
            Some(attr) => {
                writer.attribute("style", attr)?;
                writer.close_start_tag()?;
                writer.start_element("color")?;
                writer.attribute("auto", "1")?;
                writer.close_empty_tag()?;
                writer.end_element(name)?;
            }
            None => writer.close_empty_tag()?,
        }
        Ok(())
    }

    fn write_border_xml<W: Write>(writer: &mut XmlWriter<W>, border: &Border) -> Result<()> {
        writer.start_element("border")?;
        writer.close_start_tag()?;
        Self::write_border_edge(writer, "left", border.left)?;
        Self::write_border_edge(writer, "right", border.right)?;
        Self::write_border_edge(writer, "top", border.top)?;
        Self::write_border_edge(writer, "bottom", border.bottom)?;
        writer.start_element("diagonal")?;
        writer.close_empty_tag()?;
        writer.end_element("border")?;
        Ok(())
    }

    fn write_xf_xml<W: Write>(writer: &mut XmlWriter<W>, xf: &ResolvedStyle) -> Result<()> {
        writer.start_element("xf")?;
        writer.attribute_int("numFmtId", xf.num_fmt_id as i64)?;
        writer.attribute_int("fontId", xf.font_id as i64)?;
        writer.attribute_int("fillId", xf.fill_id as i64)?;
        writer.attribute_int("borderId", xf.border_id as i64)?;
        writer.attribute_int("xfId", 0)?;
        if xf.font_id != 0 {
            writer.attribute("applyFont", "1")?;
        }
        if xf.fill_id != 0 {
            writer.attribute("applyFill", "1")?;
        }
        if xf.border_id != 0 {
            writer.attribute("applyBorder", "1")?;
        }
        if xf.num_fmt_id != 0 {
            writer.attribute("applyNumberFormat", "1")?;
        }
        if let Some(alignment) = &xf.alignment {
            writer.close_start_tag()?;
            writer.start_element("alignment")?;
            let horizontal = match alignment.horizontal {
                HorizontalAlign::General => "general",
                HorizontalAlign::Left => "left",
                HorizontalAlign::Center => "center",
                HorizontalAlign::Right => "right",
            };
            let vertical = match alignment.vertical {
                VerticalAlign::Top => "top",
                VerticalAlign::Center => "center",
                VerticalAlign::Bottom => "bottom",
            };
            writer.attribute("horizontal", horizontal)?;
            writer.attribute("vertical", vertical)?;
            if alignment.wrap_text {
                writer.attribute("wrapText", "1")?;
            }
            writer.close_empty_tag()?;
            writer.end_element("xf")?;
        } else {
            writer.close_empty_tag()?;
        }
        Ok(())
    }

    pub fn write_xml<W: Write>(&self, writer: &mut XmlWriter<W>) -> Result<()> {
        writer.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n")?;
        writer.start_element("styleSheet")?;
        writer.attribute(
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        )?;
        writer.close_start_tag()?;

        if !self.number_formats.is_empty() {
            writer.start_element("numFmts")?;
            writer.attribute_int("count", self.number_formats.len() as i64)?;
            writer.close_start_tag()?;
            for (i, code) in self.number_formats.iter().enumerate() {
                writer.start_element("numFmt")?;
                writer.attribute_int("numFmtId", (FIRST_CUSTOM_NUM_FMT_ID as usize + i) as i64)?;
                writer.attribute("formatCode", code)?;
                writer.close_empty_tag()?;
            }
            writer.end_element("numFmts")?;
        }

        writer.start_element("fonts")?;
        writer.attribute_int("count", self.fonts.len() as i64)?;
        writer.close_start_tag()?;
        for font in self.fonts.iter() {
            Self::write_font_xml(writer, font)?;
        }
        writer.end_element("fonts")?;

        writer.start_element("fills")?;
        writer.attribute_int("count", self.fills.len() as i64)?;
        writer.close_start_tag()?;
        for fill in self.fills.iter() {
            Self::write_fill_xml(writer, fill)?;
        }
        writer.end_element("fills")?;

        writer.start_element("borders")?;
        writer.attribute_int("count", self.borders.len() as i64)?;
        writer.close_start_tag()?;
        for border in self.borders.iter() {
            Self::write_border_xml(writer, border)?;
        }
        writer.end_element("borders")?;

        writer.start_element("cellStyleXfs")?;
        writer.attribute_int("count", 1)?;
        writer.close_start_tag()?;
        writer.start_element("xf")?;
        writer.attribute_int("numFmtId", 0)?;
        writer.attribute_int("fontId", 0)?;
        writer.attribute_int("fillId", 0)?;
        writer.attribute_int("borderId", 0)?;
        writer.close_empty_tag()?;
        writer.end_element("cellStyleXfs")?;

        writer.start_element("cellXfs")?;
        writer.attribute_int("count", self.resolved.len() as i64)?;
        writer.close_start_tag()?;
        for xf in self.resolved.iter() {
            Self::write_xf_xml(writer, xf)?;
        }
        writer.end_element("cellXfs")?;

        writer.start_element("cellStyles")?;
        writer.attribute_int("count", 1)?;
        writer.close_start_tag()?;
        writer.start_element("cellStyle")?;
        writer.attribute("name", "Normal")?;
        writer.attribute_int("xfId", 0)?;
        writer.attribute_int("builtinId", 0)?;
        writer.close_empty_tag()?;
        writer.end_element("cellStyles")?;

        writer.end_element("styleSheet")?;
        writer.flush()
    }
}

impl Default for StyleRegister {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-sheet style configuration (spec §3): widths, heights, tab color,
/// view flags, and the two layers (`column_header_style`/
/// `column_body_style`) that sit below per-column and per-cell overrides.
#[derive(Debug, Clone)]
pub struct SheetStyle {
    pub default_column_width: f64,
    pub default_row_height: f64,
    pub column_widths: HashMap<u32, ColumnWidth>,
    pub row_heights: HashMap<u32, f64>,
    pub tab_color_rgb: Option<String>,
    pub frozen_rows: u32,
    pub frozen_cols: u32,
    pub zoom: u32,
    pub show_gridlines: bool,
    pub show_headings: bool,
    pub show_formulas: bool,
    pub show_zeros: bool,
    pub column_header_style: Option<CellStyle>,
    pub column_body_style: Option<CellStyle>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnWidth {
    pub width: f64,
    pub is_custom: bool,
}

impl Default for SheetStyle {
    fn default() -> Self {
        SheetStyle {
            default_column_width: 10.0,
            default_row_height: 15.0,
            column_widths: HashMap::new(),
            row_heights: HashMap::new(),
            tab_color_rgb: None,
            frozen_rows: 0,
            frozen_cols: 0,
            zoom: 100,
            show_gridlines: true,
            show_headings: true,
            show_formulas: false,
            show_zeros: true,
            column_header_style: None,
            column_body_style: None,
        }
    }
}

impl SheetStyle {
    /// Column-supplied widths win only when no explicit width is already
    /// registered for that index (spec §4.6 step 6).
    pub fn propagate_column_width(&mut self, column_index: u32, width: u32) {
        let entry = self.column_widths.entry(column_index).or_insert(ColumnWidth {
            width: width as f64,
            is_custom: false,
        });
        if !entry.is_custom {
            *entry = ColumnWidth {
                width: width as f64,
                is_custom: true,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_dedups_identical_styles() {
        let mut reg = StyleRegister::new();
        let style = CellStyle {
            font: Some(Font {
                bold: true,
                ..Default::default()
            }),
            ..Default::default()
        };
        let id1 = reg.register(&style, NumberFormat::None);
        let id2 = reg.register(&style, NumberFormat::None);
        assert_eq!(id1, id2);
        assert!(id1.is_some());
    }

    #[test]
    fn percentage_formats_get_ids_starting_at_164() {
        let mut reg = StyleRegister::new();
        let id = reg
            .register(&CellStyle::default(), NumberFormat::Percentage(2))
            .unwrap();
        assert!(id > 0);
        assert_eq!(reg.number_format_id(NumberFormat::Percentage(2)), {
            let ResolvedStyle { num_fmt_id, .. } = reg.resolved.get_index(id).unwrap().clone();
            num_fmt_id
        });
    }

    #[test]
    fn merge_under_prefers_later_layer_fields() {
        let base = CellStyle {
            font: Some(Font {
                bold: true,
                ..Default::default()
            }),
            fill: Some(Fill {
                fg_color_rgb: Some("FFFF0000".to_string()),
            }),
            ..Default::default()
        };
        let over = CellStyle {
            font: Some(Font {
                italic: true,
                ..Default::default()
            }),
            fill: None,
            ..Default::default()
        };
        let merged = base.merge_under(&over);
        assert_eq!(merged.font.unwrap().italic, true);
        assert_eq!(merged.fill.unwrap().fg_color_rgb.as_deref(), Some("FFFF0000"));
    }

    #[test]
    fn no_style_and_no_format_returns_none() {
        let mut reg = StyleRegister::new();
        assert_eq!(reg.register(&CellStyle::default(), NumberFormat::None), None);
    }

    #[test]
    fn column_width_propagation_respects_explicit_sheet_width() {
        let mut style = SheetStyle::default();
        style.column_widths.insert(
            1,
            ColumnWidth {
                width: 25.0,
                is_custom: true,
            },
        );
        style.propagate_column_width(1, 12);
        assert_eq!(style.column_widths[&1].width, 25.0);

        style.propagate_column_width(2, 12);
        assert_eq!(style.column_widths[&2].width, 12.0);
        assert!(style.column_widths[&2].is_custom);
    }
}
