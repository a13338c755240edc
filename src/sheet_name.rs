//! Sheet-name sanitizer (spec §4.7): ≤31 UTF-16 code units, no forbidden
//! characters, no leading/trailing quote.

const FORBIDDEN: &[char] = &['/', '\\', '[', ']', '*', '?', ':'];
const MAX_UTF16_LEN: usize = 31;

/// How forbidden characters are handled before truncation.
pub enum SanitizeStrategy {
    /// Strip forbidden characters outright.
    Remove,
    /// Apply `map` first, then strip anything still forbidden.
    Replace(Vec<(char, char)>),
}

fn strip_forbidden(s: &str) -> String {
    s.chars().filter(|c| !FORBIDDEN.contains(c)).collect()
}

fn strip_quote_pair(s: &str) -> &str {
    let s = s.strip_prefix('\'').unwrap_or(s);
    s.strip_suffix('\'').unwrap_or(s)
}

fn truncate_utf16(s: &str, max_units: usize) -> String {
    let mut units = 0usize;
    let mut out = String::new();
    for c in s.chars() {
        let width = c.len_utf16();
        if units + width > max_units {
            break;
        }
        units += width;
        out.push(c);
    }
    out
}

/// Sanitizes `raw` into a valid Excel sheet name. Pipeline order (spec
/// §4.7): strip a surrounding quote pair, apply the strategy, fall back
/// to `default_name` if empty, then truncate to 31 UTF-16 code units.
///
/// Duplicate names across sheets are not disambiguated here; that is the
/// caller's responsibility (spec §9 open question).
pub fn sanitize_sheet_name(raw: &str, strategy: &SanitizeStrategy, default_name: &str) -> String {
    let quoted_stripped = strip_quote_pair(raw);

    let processed = match strategy {
        SanitizeStrategy::Remove => strip_forbidden(quoted_stripped),
        SanitizeStrategy::Replace(map) => {
            let replaced: String = quoted_stripped
                .chars()
                .map(|c| map.iter().find(|(from, _)| *from == c).map(|(_, to)| *to).unwrap_or(c))
                .collect();
            strip_forbidden(&replaced)
        }
    };

    let with_fallback = if processed.is_empty() {
        default_name.to_string()
    } else {
        processed
    };

    truncate_utf16(&with_fallback, MAX_UTF16_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_strips_forbidden_chars() {
        let out = sanitize_sheet_name("Q1/Q2*Report", &SanitizeStrategy::Remove, "Sheet");
        assert_eq!(out, "Q1Q2Report");
    }

    #[test]
    fn replace_applies_map_then_strips_leftovers() {
        let map = vec![('/', '-')];
        let out = sanitize_sheet_name("Q1/Q2*Report", &SanitizeStrategy::Replace(map), "Sheet");
        assert_eq!(out, "Q1-Q2Report");
    }

    #[test]
    fn strips_surrounding_quote_pair() {
        let out = sanitize_sheet_name("'Named'", &SanitizeStrategy::Remove, "Sheet");
        assert_eq!(out, "Named");
    }

    #[test]
    fn empty_after_processing_falls_back_to_default() {
        let out = sanitize_sheet_name("***", &SanitizeStrategy::Remove, "Sheet");
        assert_eq!(out, "Sheet");
    }

    #[test]
    fn truncates_to_31_utf16_units() {
        let long = "a".repeat(40);
        let out = sanitize_sheet_name(&long, &SanitizeStrategy::Remove, "Sheet");
        assert_eq!(out.len(), 31);
    }
}
