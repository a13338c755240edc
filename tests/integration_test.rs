//! End-to-end scenarios spanning more than one module: cell/shared-string/
//! style registration together, package relationship wiring, and a full
//! `Workbook::build` producing bytes on disk.

use sheetcraft::column::{Column, ColumnCapability, IntegerOutput, TextOutput};
use sheetcraft::package;
use sheetcraft::progress;
use sheetcraft::sanitize_sheet_name;
use sheetcraft::sheet_name::SanitizeStrategy;
use sheetcraft::{assemble_sheet, Progress, Sheet, SheetMeta, Workbook};

struct Person {
    name: String,
    age: i64,
    email: String,
}

fn people() -> Vec<Person> {
    vec![
        Person { name: "Alice".to_string(), age: 30, email: "a@t".to_string() },
        Person { name: "Bob".to_string(), age: 25, email: "b@t".to_string() },
    ]
}

fn people_sheet() -> Sheet<Person> {
    let mut sheet = Sheet::new("People");
    sheet.columns.push(Box::new(Column::new(
        "Name",
        |p: &Person| p.name.clone(),
        |s| TextOutput(Some(s)),
    )) as Box<dyn ColumnCapability<Person>>);
    sheet.columns.push(Box::new(Column::new(
        "Age",
        |p: &Person| p.age,
        |n| IntegerOutput(Some(n)),
    )) as Box<dyn ColumnCapability<Person>>);
    sheet.columns.push(Box::new(Column::new(
        "Email",
        |p: &Person| p.email.clone(),
        |s| TextOutput(Some(s)),
    )) as Box<dyn ColumnCapability<Person>>);
    sheet.set_data_provider(people);
    sheet
}

/// Spec §8 scenario 1: single sheet, three columns, two records.
#[test]
fn single_sheet_three_columns_two_records() {
    let mut sheet = people_sheet();
    sheet.load_data();

    let mut shared_strings = sheetcraft::shared_strings::SharedStringRegister::new();
    let mut styles = sheetcraft::style::StyleRegister::new();
    let mut xml = Vec::new();
    let meta = assemble_sheet(&mut sheet, 1, &mut shared_strings, &mut styles, &mut xml).unwrap();

    for expected in ["Name", "Age", "Email", "Alice", "Bob", "a@t", "b@t"] {
        assert!(shared_strings.contains(expected), "missing {expected} from shared-string pool");
    }

    let xml = String::from_utf8(xml).unwrap();
    assert!(xml.contains("<c r=\"B2\""));
    let b2_start = xml.find("<c r=\"B2\"").unwrap();
    let b2_cell = &xml[b2_start..xml[b2_start..].find("</c>").map(|i| b2_start + i + 4).unwrap()];
    assert!(!b2_cell.contains("t=\""), "B2 (Integer) must carry no type attribute");
    assert!(b2_cell.contains("<v>30</v>"));

    assert_eq!(meta.data_row_count, 2);
    assert_eq!(meta.active_column_count, 3);

    let dir = tempfile::tempdir().unwrap();
    let (tx, _rx) = progress::channel();
    let final_path = people_sheet_workbook().build(dir.path().join("people.xlsx"), tx).unwrap();
    let bytes = std::fs::read(&final_path).unwrap();
    assert!(bytes.len() > 1024);
    assert_eq!(&bytes[0..4], b"PK\x03\x04");
}

fn people_sheet_workbook() -> Workbook<Person> {
    Workbook::new().with_sheet(people_sheet())
}

/// Spec §8 scenario 2: `ZeroOne` fast path never touches the shared-string
/// pool; `YesAndNo` + `Upper` always does.
#[test]
fn boolean_fast_path_vs_text_path() {
    use sheetcraft::{BoolExpression, CaseStrategy};

    struct Flag(bool);

    let mut zero_one_sheet: Sheet<Flag> = Sheet::new("Flags");
    zero_one_sheet.columns.push(Box::new(Column::new(
        "Active",
        |f: &Flag| f.0,
        |v| sheetcraft::column::BooleanOutput {
            value: Some(v),
            expression: BoolExpression::ZeroOne,
            case_strategy: CaseStrategy::Upper,
        },
    )) as Box<dyn ColumnCapability<Flag>>);
    zero_one_sheet.set_data_provider(|| vec![Flag(true), Flag(false), Flag(true)]);
    zero_one_sheet.load_data();

    let mut shared_strings = sheetcraft::shared_strings::SharedStringRegister::new();
    let mut styles = sheetcraft::style::StyleRegister::new();
    let mut xml = Vec::new();
    assemble_sheet(&mut zero_one_sheet, 1, &mut shared_strings, &mut styles, &mut xml).unwrap();
    assert!(!shared_strings.contains("1"));
    assert!(!shared_strings.contains("0"));
    let xml = String::from_utf8(xml).unwrap();
    assert_eq!(xml.matches("t=\"b\"").count(), 3);
    assert!(xml.contains("<v>1</v>") && xml.contains("<v>0</v>"));

    let mut text_sheet: Sheet<Flag> = Sheet::new("Flags");
    text_sheet.columns.push(Box::new(Column::new(
        "Active",
        |f: &Flag| f.0,
        |v| sheetcraft::column::BooleanOutput {
            value: Some(v),
            expression: BoolExpression::YesNo,
            case_strategy: CaseStrategy::Upper,
        },
    )) as Box<dyn ColumnCapability<Flag>>);
    text_sheet.set_data_provider(|| vec![Flag(true), Flag(false), Flag(true)]);
    text_sheet.load_data();

    let mut shared_strings = sheetcraft::shared_strings::SharedStringRegister::new();
    let mut styles = sheetcraft::style::StyleRegister::new();
    let mut xml = Vec::new();
    assemble_sheet(&mut text_sheet, 1, &mut shared_strings, &mut styles, &mut xml).unwrap();
    assert!(shared_strings.contains("YES"));
    assert!(shared_strings.contains("NO"));
    let xml = String::from_utf8(xml).unwrap();
    assert_eq!(xml.matches("t=\"s\"").count(), 3);
}

/// Spec §8 scenario 3: percentage precision examples.
#[test]
fn percentage_precision_examples() {
    use sheetcraft::numfmt::format_percentage;
    assert_eq!(format_percentage(0.12345, 3), "0.12345");
    assert_eq!(format_percentage(0.12345, 1), "0.123");
    assert_eq!(format_percentage(0.12345, 0), "0.12");
}

/// Spec §8 scenario 4: sheet-name sanitization.
#[test]
fn sheet_name_sanitization_examples() {
    let out = sanitize_sheet_name("'Sales/2024*?'", &SanitizeStrategy::Remove, "Sheet");
    assert_eq!(out, "Sales2024");

    let long = "A".repeat(40);
    let out = sanitize_sheet_name(&long, &SanitizeStrategy::Remove, "Sheet");
    assert_eq!(out.chars().count(), 31);
}

/// Spec §8 scenario 5: two-sheet workbook relationship wiring.
#[test]
fn two_sheet_workbook_relationship_wiring() {
    let sheets = vec![SheetMeta::new("People", 1, true), SheetMeta::new("Products", 2, true)];

    let mut buf = Vec::new();
    package::write_workbook_rels(&mut buf, &sheets).unwrap();
    let xml = String::from_utf8(buf).unwrap();
    for id in ["rId1", "rId2", "rId3", "rId4"] {
        assert!(xml.contains(&format!("Id=\"{id}\"")), "missing {id}");
    }
    assert_eq!(xml.matches("<Relationship").count(), 4);

    let mut buf = Vec::new();
    package::write_content_types(&mut buf, &sheets).unwrap();
    let xml = String::from_utf8(buf).unwrap();
    assert!(xml.contains("xl/worksheets/sheet1.xml"));
    assert!(xml.contains("xl/worksheets/sheet2.xml"));
}

/// Spec §8 scenario 6: progress fractions are non-decreasing across a
/// real two-sheet build and the stream ends with `Completed`.
#[test]
fn progress_monotonicity_across_two_sheet_build() {
    let mut people = people_sheet();
    people.name = "People".to_string();
    let mut products: Sheet<Person> = Sheet::new("Products");
    products.columns.push(Box::new(Column::new(
        "Name",
        |p: &Person| p.name.clone(),
        |s| TextOutput(Some(s)),
    )) as Box<dyn ColumnCapability<Person>>);
    products.set_data_provider(|| vec![Person { name: "Widget".to_string(), age: 0, email: String::new() }]);

    let workbook = Workbook::new().with_sheet(people).with_sheet(products);
    let dir = tempfile::tempdir().unwrap();
    let (tx, mut rx) = progress::channel();
    workbook.build(dir.path().join("catalog.xlsx"), tx).unwrap();

    let mut last_fraction = -1.0;
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        let fraction = event.fraction();
        assert!(fraction >= last_fraction, "fraction regressed: {fraction} < {last_fraction}");
        last_fraction = fraction;
        events.push(event);
    }
    assert!(matches!(events.last(), Some(Progress::Completed)));
    assert_eq!(last_fraction, 1.0);
}
