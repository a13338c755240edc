//! Finite-double and percentage formatting (spec §4.1/§4.11).

/// Shortest round-trippable decimal for a finite `f64`; non-finite
/// values render as empty (spec §4.1 "Number").
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let mut buf = ryu::Buffer::new();
    let formatted = buf.format_finite(value);
    // ryu always emits a decimal point (e.g. "30.0"); Excel/OOXML reads
    // integral values more naturally without a trailing ".0".
    if let Some(stripped) = formatted.strip_suffix(".0") {
        stripped.to_string()
    } else {
        formatted.to_string()
    }
}

/// Formats the underlying ratio `value` (0.25 == 25%) with `precision +
/// 2` fractional digits, round-half-to-even. The `<v>` a spreadsheet
/// cell carries is always the ratio itself — the "%" multiplication and
/// suffix are applied by the number-format code (spec §4.5), not by this
/// function. Non-finite inputs render as empty.
pub fn format_percentage(value: f64, precision: u8) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let digits = precision as usize + 2;
    format!("{:.*}", digits, value)
}

/// The custom number-format code registered for a percentage column at
/// the given precision (spec §4.5): `"0." + "0"×(p+2) + "%"`.
pub fn percentage_format_code(precision: u8) -> String {
    let zeros = "0".repeat(precision as usize + 2);
    format!("0.{zeros}%")
}
