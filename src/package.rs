//! Package Assembler and relationship wiring (spec §4.8), grounded on
//! the hand-written `write_content_types`/`write_root_rels`/
//! `write_workbook_xml`/`write_workbook_rels` functions in the teacher's
//! `fast_writer/workbook.rs`, generalized to register and sheet counts
//! that vary per build instead of being hardcoded.

use crate::error::Result;
use crate::sheet::SheetMeta;
use crate::xml_writer::XmlWriter;
use std::io::Write;

/// `docProps/core.xml` / `docProps/app.xml` metadata a caller may
/// override (spec §4.8).
#[derive(Debug, Clone)]
pub struct DocumentProperties {
    pub title: String,
    pub subject: String,
    pub creator: String,
    pub last_modified_by: String,
    pub created: String,
    pub modified: String,
    pub application: String,
    pub company: String,
}

impl Default for DocumentProperties {
    fn default() -> Self {
        DocumentProperties {
            title: String::new(),
            subject: String::new(),
            creator: "sheetcraft".to_string(),
            last_modified_by: "sheetcraft".to_string(),
            created: "2024-01-01T00:00:00Z".to_string(),
            modified: "2024-01-01T00:00:00Z".to_string(),
            application: "sheetcraft".to_string(),
            company: String::new(),
        }
    }
}

pub fn write_content_types<W: Write>(writer: &mut W, sheets: &[SheetMeta]) -> Result<()> {
    let mut xml = XmlWriter::new(writer);
    xml.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n")?;
    xml.start_element("Types")?;
    xml.attribute(
        "xmlns",
        "http://schemas.openxmlformats.org/package/2006/content-types",
    )?;
    xml.close_start_tag()?;

    xml.start_element("Default")?;
    xml.attribute("Extension", "rels")?;
    xml.attribute(
        "ContentType",
        "application/vnd.openxmlformats-package.relationships+xml",
    )?;
    xml.close_empty_tag()?;

    xml.start_element("Default")?;
    xml.attribute("Extension", "xml")?;
    xml.attribute("ContentType", "application/xml")?;
    xml.close_empty_tag()?;

    let overrides: &[(&str, &str)] = &[
        (
            "/xl/workbook.xml",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
        ),
        (
            "/xl/styles.xml",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml",
        ),
        (
            "/xl/sharedStrings.xml",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml",
        ),
        (
            "/docProps/core.xml",
            "application/vnd.openxmlformats-package.core-properties+xml",
        ),
        (
            "/docProps/app.xml",
            "application/vnd.openxmlformats-officedocument.extended-properties+xml",
        ),
    ];
    for (part_name, content_type) in overrides {
        xml.start_element("Override")?;
        xml.attribute("PartName", part_name)?;
        xml.attribute("ContentType", content_type)?;
        xml.close_empty_tag()?;
    }

    for sheet in sheets {
        xml.start_element("Override")?;
        xml.attribute("PartName", &format!("/{}", sheet.file_path))?;
        xml.attribute(
            "ContentType",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
        )?;
        xml.close_empty_tag()?;
    }

    xml.end_element("Types")?;
    xml.flush()
}

pub fn write_root_rels<W: Write>(writer: &mut W) -> Result<()> {
    let mut xml = XmlWriter::new(writer);
    xml.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n")?;
    xml.start_element("Relationships")?;
    xml.attribute(
        "xmlns",
        "http://schemas.openxmlformats.org/package/2006/relationships",
    )?;
    xml.close_start_tag()?;

    let rels: &[(&str, &str, &str)] = &[
        (
            "rId1",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
            "xl/workbook.xml",
        ),
        (
            "rId2",
            "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
            "docProps/core.xml",
        ),
        (
            "rId3",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties",
            "docProps/app.xml",
        ),
    ];
    for (id, rel_type, target) in rels {
        xml.start_element("Relationship")?;
        xml.attribute("Id", id)?;
        xml.attribute("Type", rel_type)?;
        xml.attribute("Target", target)?;
        xml.close_empty_tag()?;
    }

    xml.end_element("Relationships")?;
    xml.flush()
}

pub fn write_workbook_xml<W: Write>(writer: &mut W, sheets: &[SheetMeta]) -> Result<()> {
    let mut xml = XmlWriter::new(writer);
    xml.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n")?;
    xml.start_element("workbook")?;
    xml.attribute(
        "xmlns",
        "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
    )?;
    xml.attribute(
        "xmlns:r",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
    )?;
    xml.close_start_tag()?;

    xml.start_element("bookViews")?;
    xml.close_start_tag()?;
    xml.start_element("workbookView")?;
    xml.close_empty_tag()?;
    xml.end_element("bookViews")?;

    xml.start_element("sheets")?;
    xml.close_start_tag()?;
    for sheet in sheets {
        xml.start_element("sheet")?;
        xml.attribute("name", &sheet.name)?;
        xml.attribute_int("sheetId", sheet.sheet_id as i64)?;
        if let Some(rgb) = &sheet.tab_color_rgb {
            xml.attribute("tabColor", rgb)?;
        }
        xml.attribute("r:id", &sheet.relationship_id)?;
        xml.close_empty_tag()?;
    }
    xml.end_element("sheets")?;

    xml.end_element("workbook")?;
    xml.flush()
}

pub fn write_workbook_rels<W: Write>(writer: &mut W, sheets: &[SheetMeta]) -> Result<()> {
    let mut xml = XmlWriter::new(writer);
    xml.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n")?;
    xml.start_element("Relationships")?;
    xml.attribute(
        "xmlns",
        "http://schemas.openxmlformats.org/package/2006/relationships",
    )?;
    xml.close_start_tag()?;

    for sheet in sheets {
        xml.start_element("Relationship")?;
        xml.attribute("Id", &sheet.relationship_id)?;
        xml.attribute(
            "Type",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet",
        )?;
        xml.attribute("Target", &format!("worksheets/sheet{}.xml", sheet.sheet_id))?;
        xml.close_empty_tag()?;
    }

    let styles_rid = sheets.len() as u32 + 1;
    xml.start_element("Relationship")?;
    xml.attribute("Id", &format!("rId{styles_rid}"))?;
    xml.attribute(
        "Type",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles",
    )?;
    xml.attribute("Target", "styles.xml")?;
    xml.close_empty_tag()?;

    let shared_strings_rid = sheets.len() as u32 + 2;
    xml.start_element("Relationship")?;
    xml.attribute("Id", &format!("rId{shared_strings_rid}"))?;
    xml.attribute(
        "Type",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings",
    )?;
    xml.attribute("Target", "sharedStrings.xml")?;
    xml.close_empty_tag()?;

    xml.end_element("Relationships")?;
    xml.flush()
}

pub fn write_core_properties<W: Write>(writer: &mut W, props: &DocumentProperties) -> Result<()> {
    let mut xml = XmlWriter::new(writer);
    xml.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n")?;
    xml.start_element("cp:coreProperties")?;
    xml.attribute("xmlns:cp", "http://schemas.openxmlformats.org/package/2006/metadata/core-properties")?;
    xml.attribute("xmlns:dc", "http://purl.org/dc/elements/1.1/")?;
    xml.attribute("xmlns:dcterms", "http://purl.org/dc/terms/")?;
    xml.attribute("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance")?;
    xml.close_start_tag()?;

    xml.start_element("dc:title")?;
    xml.close_start_tag()?;
    xml.write_escaped(&props.title)?;
    xml.end_element("dc:title")?;

    xml.start_element("dc:subject")?;
    xml.close_start_tag()?;
    xml.write_escaped(&props.subject)?;
    xml.end_element("dc:subject")?;

    xml.start_element("dc:creator")?;
    xml.close_start_tag()?;
    xml.write_escaped(&props.creator)?;
    xml.end_element("dc:creator")?;

    xml.start_element("cp:lastModifiedBy")?;
    xml.close_start_tag()?;
    xml.write_escaped(&props.last_modified_by)?;
    xml.end_element("cp:lastModifiedBy")?;

    xml.start_element("dcterms:created")?;
    xml.attribute("xsi:type", "dcterms:W3CDTF")?;
    xml.close_start_tag()?;
    xml.write_str(&props.created)?;
    xml.end_element("dcterms:created")?;

    xml.start_element("dcterms:modified")?;
    xml.attribute("xsi:type", "dcterms:W3CDTF")?;
    xml.close_start_tag()?;
    xml.write_str(&props.modified)?;
    xml.end_element("dcterms:modified")?;

    xml.end_element("cp:coreProperties")?;
    xml.flush()
}

pub fn write_app_properties<W: Write>(writer: &mut W, props: &DocumentProperties, sheet_count: u32) -> Result<()> {
    let mut xml = XmlWriter::new(writer);
    xml.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n")?;
    xml.start_element("Properties")?;
    xml.attribute(
        "xmlns",
        "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
    )?;
    xml.close_start_tag()?;

    xml.start_element("Application")?;
    xml.close_start_tag()?;
    xml.write_escaped(&props.application)?;
    xml.end_element("Application")?;

    xml.start_element("DocSecurity")?;
    xml.close_start_tag()?;
    xml.write_str("0")?;
    xml.end_element("DocSecurity")?;

    xml.start_element("ScaleCrop")?;
    xml.close_start_tag()?;
    xml.write_str("false")?;
    xml.end_element("ScaleCrop")?;

    xml.start_element("Company")?;
    xml.close_start_tag()?;
    xml.write_escaped(&props.company)?;
    xml.end_element("Company")?;

    xml.start_element("LinksUpToDate")?;
    xml.close_start_tag()?;
    xml.write_str("false")?;
    xml.end_element("LinksUpToDate")?;

    xml.start_element("SharedDoc")?;
    xml.close_start_tag()?;
    xml.write_str("false")?;
    xml.end_element("SharedDoc")?;

    xml.start_element("HyperlinksChanged")?;
    xml.close_start_tag()?;
    xml.write_str("false")?;
    xml.end_element("HyperlinksChanged")?;

    let _ = sheet_count;
    xml.start_element("AppVersion")?;
    xml.close_start_tag()?;
    xml.write_str("1.0")?;
    xml.end_element("AppVersion")?;

    xml.end_element("Properties")?;
    xml.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_meta() -> SheetMeta {
        SheetMeta::new("Data", 1, true)
    }

    #[test]
    fn content_types_includes_one_override_per_sheet() {
        let mut buf = Vec::new();
        write_content_types(&mut buf, &[sheet_meta(), SheetMeta::new("More", 2, true)]).unwrap();
        let xml = String::from_utf8(buf).unwrap();
        assert_eq!(xml.matches("xl/worksheets/sheet").count(), 2);
    }

    #[test]
    fn root_rels_has_three_fixed_relationships() {
        let mut buf = Vec::new();
        write_root_rels(&mut buf).unwrap();
        let xml = String::from_utf8(buf).unwrap();
        assert!(xml.contains("rId1") && xml.contains("rId2") && xml.contains("rId3"));
        assert!(xml.contains("docProps/core.xml"));
    }

    #[test]
    fn workbook_rels_allocates_styles_and_shared_strings_after_sheets() {
        let sheets = vec![sheet_meta(), SheetMeta::new("More", 2, true)];
        let mut buf = Vec::new();
        write_workbook_rels(&mut buf, &sheets).unwrap();
        let xml = String::from_utf8(buf).unwrap();
        assert!(xml.contains("Id=\"rId3\"") && xml.contains("styles.xml"));
        assert!(xml.contains("Id=\"rId4\"") && xml.contains("sharedStrings.xml"));
    }

    #[test]
    fn workbook_xml_escapes_sheet_names() {
        let sheet = SheetMeta::new("A & B", 1, true);
        let mut buf = Vec::new();
        write_workbook_xml(&mut buf, &[sheet]).unwrap();
        let xml = String::from_utf8(buf).unwrap();
        assert!(xml.contains("A &amp; B"));
    }
}
