//! Sheet Assembler (spec §4.6): resolves active columns, emits header and
//! data rows, registers shared strings and styles, computes the
//! dimension range, and serializes `sheetN.xml`.

use crate::cell::Cell;
use crate::error::Result;
use crate::sheet::{DataRange, Sheet, SheetMeta};
use crate::shared_strings::SharedStringRegister;
use crate::style::{CellStyle, ColumnWidth, StyleRegister};
use crate::xml_writer::XmlWriter;
use std::io::Write;

/// Which columns (by index into `sheet.columns`) produced a visible cell
/// for at least one record — spec §4.6 step 1.
fn active_columns<Record>(sheet: &Sheet<Record>) -> Vec<usize> {
    let records = sheet.loaded_data();
    sheet
        .columns
        .iter()
        .enumerate()
        .filter(|(_, col)| records.iter().any(|r| col.is_visible(r)))
        .map(|(i, _)| i)
        .collect()
}

fn merged_style(sheet_layer: Option<&CellStyle>, column_layer: Option<&CellStyle>, cell_layer: Option<&CellStyle>) -> Option<CellStyle> {
    let mut acc: Option<CellStyle> = None;
    for layer in [sheet_layer, column_layer, cell_layer].into_iter().flatten() {
        acc = Some(match acc {
            Some(base) => base.merge_under(layer),
            None => layer.clone(),
        });
    }
    acc
}

struct RowEmission {
    row_number: u32,
    cells: Vec<Cell>,
}

fn assemble_rows<Record>(
    sheet: &Sheet<Record>,
    active: &[usize],
    shared_strings: &mut SharedStringRegister,
    styles: &mut StyleRegister,
) -> Vec<RowEmission> {
    let mut rows = Vec::new();
    let mut row_number = 1u32;

    if sheet.has_header {
        let mut cells = Vec::with_capacity(active.len());
        for (col_index, &source_index) in active.iter().enumerate() {
            let column = &sheet.columns[source_index];
            let col = col_index as u32 + 1;
            let mut cell = Cell::new(row_number, col, crate::cell::CellKind::Text(Some(column.name().to_string())));
            cell.shared_string_id = Some(shared_strings.register(column.name()));
            let merged = merged_style(sheet.style.column_header_style.as_ref(), column.header_style(), None);
            if let Some(style) = &merged {
                cell.style_id = styles.register(style, crate::cell::NumberFormat::None);
            }
            cells.push(cell);
        }
        rows.push(RowEmission { row_number, cells });
        row_number += 1;
    }

    for record in sheet.loaded_data() {
        let mut cells = Vec::with_capacity(active.len());
        for (col_index, &source_index) in active.iter().enumerate() {
            let column = &sheet.columns[source_index];
            let col = col_index as u32 + 1;

            if !column.is_visible(record) {
                let mut cell = Cell::new(row_number, col, crate::cell::CellKind::Number(None));
                let merged = merged_style(sheet.style.column_body_style.as_ref(), column.body_style(), None);
                if let Some(style) = &merged {
                    cell.style_id = styles.register(style, crate::cell::NumberFormat::None);
                }
                cells.push(cell);
                continue;
            }

            let mut cell = column.emit(record, row_number, col);

            if let Some(text) = cell.value.shared_string_payload() {
                cell.shared_string_id = Some(shared_strings.register(&text));
            }

            let number_format = cell.value.implied_number_format();
            let merged = merged_style(sheet.style.column_body_style.as_ref(), column.body_style(), None);
            if let Some(style) = &merged {
                cell.style_id = styles.register(style, number_format);
            } else if !matches!(number_format, crate::cell::NumberFormat::None) {
                cell.style_id = styles.register(&CellStyle::default(), number_format);
            }

            cells.push(cell);
        }
        rows.push(RowEmission { row_number, cells });
        row_number += 1;
    }

    rows
}

fn propagate_column_widths<Record>(sheet: &mut Sheet<Record>, active: &[usize]) {
    for (col_index, &source_index) in active.iter().enumerate() {
        if let Some(width) = sheet.columns[source_index].width() {
            sheet.style.propagate_column_width(col_index as u32 + 1, width);
        }
    }
}

fn compute_data_range(rows: &[RowEmission], active_column_count: u32) -> Option<DataRange> {
    if rows.is_empty() || active_column_count == 0 {
        return None;
    }
    let start_row = rows.first().map(|r| r.row_number).unwrap_or(1);
    let end_row = rows.last().map(|r| r.row_number).unwrap_or(1);
    Some(DataRange {
        start_row,
        start_col: 1,
        end_row,
        end_col: active_column_count,
    })
}

fn write_sheet_xml<W: Write>(
    writer: &mut W,
    rows: &[RowEmission],
    active_column_count: u32,
    sheet_style: &crate::style::SheetStyle,
    range: Option<DataRange>,
) -> Result<()> {
    let mut xml = XmlWriter::new(writer);
    xml.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n")?;
    xml.start_element("worksheet")?;
    xml.attribute(
        "xmlns",
        "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
    )?;
    xml.attribute(
        "xmlns:r",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
    )?;
    xml.close_start_tag()?;

    xml.start_element("dimension")?;
    let dim_ref = match range {
        Some(r) => format!(
            "{}:{}",
            crate::coord::cell_address(r.start_row, r.start_col),
            crate::coord::cell_address(r.end_row, r.end_col)
        ),
        None => "A1".to_string(),
    };
    xml.attribute("ref", &dim_ref)?;
    xml.close_empty_tag()?;

    xml.start_element("sheetViews")?;
    xml.close_start_tag()?;
    xml.start_element("sheetView")?;
    if !sheet_style.show_gridlines {
        xml.attribute("showGridLines", "0")?;
    }
    xml.attribute_int("zoomScale", sheet_style.zoom as i64)?;
    xml.attribute("workbookViewId", "0")?;
    if sheet_style.frozen_rows > 0 || sheet_style.frozen_cols > 0 {
        xml.close_start_tag()?;
        xml.start_element("pane")?;
        xml.attribute_int("xSplit", sheet_style.frozen_cols as i64)?;
        xml.attribute_int("ySplit", sheet_style.frozen_rows as i64)?;
        xml.attribute("topLeftCell", &crate::coord::cell_address(
            sheet_style.frozen_rows + 1,
            sheet_style.frozen_cols + 1,
        ))?;
        xml.attribute("state", "frozen")?;
        xml.close_empty_tag()?;
        xml.end_element("sheetView")?;
    } else {
        xml.close_empty_tag()?;
    }
    xml.end_element("sheetViews")?;

    xml.start_element("sheetFormatPr")?;
    xml.attribute("defaultRowHeight", &crate::numfmt::format_number(sheet_style.default_row_height))?;
    xml.attribute("defaultColWidth", &crate::numfmt::format_number(sheet_style.default_column_width))?;
    xml.close_empty_tag()?;

    let mut custom_widths: Vec<(u32, ColumnWidth)> = sheet_style
        .column_widths
        .iter()
        .filter(|(_, w)| w.is_custom)
        .map(|(i, w)| (*i, *w))
        .collect();
    custom_widths.sort_by_key(|(i, _)| *i);
    if !custom_widths.is_empty() {
        xml.start_element("cols")?;
        xml.close_start_tag()?;
        for (index, width) in &custom_widths {
            xml.start_element("col")?;
            xml.attribute_int("min", *index as i64)?;
            xml.attribute_int("max", *index as i64)?;
            xml.attribute("width", &crate::numfmt::format_number(width.width))?;
            xml.attribute("customWidth", "1")?;
            xml.close_empty_tag()?;
        }
        xml.end_element("cols")?;
    }

    xml.start_element("sheetData")?;
    xml.close_start_tag()?;
    for row in rows {
        xml.start_element("row")?;
        xml.attribute_int("r", row.row_number as i64)?;
        if let Some(height) = sheet_style.row_heights.get(&row.row_number) {
            xml.attribute("ht", &crate::numfmt::format_number(*height))?;
            xml.attribute("customHeight", "1")?;
        }
        xml.close_start_tag()?;
        for cell in &row.cells {
            cell.write_xml(&mut xml)?;
        }
        xml.end_element("row")?;
    }
    xml.end_element("sheetData")?;

    let _ = active_column_count;
    xml.end_element("worksheet")?;
    xml.flush()
}

/// Runs the full spec §4.6 algorithm for `sheet`, writing `sheetN.xml` to
/// `out` and returning the populated `SheetMeta`.
pub fn assemble_sheet<Record, W: Write>(
    sheet: &mut Sheet<Record>,
    sheet_id: u32,
    shared_strings: &mut SharedStringRegister,
    styles: &mut StyleRegister,
    out: &mut W,
) -> Result<SheetMeta> {
    let active = active_columns(sheet);
    propagate_column_widths(sheet, &active);

    let rows = assemble_rows(sheet, &active, shared_strings, styles);
    let active_column_count = active.len() as u32;
    let range = compute_data_range(&rows, active_column_count);

    write_sheet_xml(out, &rows, active_column_count, &sheet.style, range)?;

    let mut meta = SheetMeta::new(sheet.name.clone(), sheet_id, sheet.has_header);
    meta.active_column_count = active_column_count;
    meta.data_row_count = sheet.loaded_data().len() as u32;
    meta.data_range = range;
    meta.tab_color_rgb = sheet.style.tab_color_rgb.clone();
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Column, TextOutput, IntegerOutput};
    use crate::column::ColumnCapability;

    struct Record {
        name: String,
        age: i64,
    }

    fn build_sheet() -> Sheet<Record> {
        let mut sheet = Sheet::new("People");
        sheet.columns.push(Box::new(Column::new(
            "Name",
            |r: &Record| r.name.clone(),
            |s| TextOutput(Some(s)),
        )) as Box<dyn ColumnCapability<Record>>);
        sheet.columns.push(Box::new(Column::new(
            "Age",
            |r: &Record| r.age,
            |n| IntegerOutput(Some(n)),
        )) as Box<dyn ColumnCapability<Record>>);
        sheet.set_data_provider(|| {
            vec![
                Record { name: "Alice".to_string(), age: 30 },
                Record { name: "Bob".to_string(), age: 25 },
            ]
        });
        sheet.load_data();
        sheet
    }

    #[test]
    fn assembles_header_and_data_rows_with_shared_strings() {
        let mut sheet = build_sheet();
        let mut ss = SharedStringRegister::new();
        let mut styles = StyleRegister::new();
        let mut buf = Vec::new();
        let meta = assemble_sheet(&mut sheet, 1, &mut ss, &mut styles, &mut buf).unwrap();

        assert_eq!(meta.active_column_count, 2);
        assert_eq!(meta.data_row_count, 2);
        assert!(ss.contains("Name"));
        assert!(ss.contains("Age"));
        assert!(ss.contains("Alice"));
        assert!(ss.contains("Bob"));

        let xml = String::from_utf8(buf).unwrap();
        assert!(xml.contains("<dimension ref=\"A1:B3\""));
        assert!(xml.contains("<v>30</v>"));
    }

    #[test]
    fn empty_sheet_has_no_active_columns() {
        let mut sheet: Sheet<Record> = Sheet::new("Empty");
        sheet.columns.push(Box::new(Column::new(
            "Name",
            |r: &Record| r.name.clone(),
            |s| TextOutput(Some(s)),
        )) as Box<dyn ColumnCapability<Record>>);
        sheet.load_data();
        let mut ss = SharedStringRegister::new();
        let mut styles = StyleRegister::new();
        let mut buf = Vec::new();
        let meta = assemble_sheet(&mut sheet, 1, &mut ss, &mut styles, &mut buf).unwrap();
        assert_eq!(meta.active_column_count, 0);
    }
}
