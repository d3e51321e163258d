//! PDF417 grouping: fold a flat list of values into barcode-ready text blocks.

use crate::error::{ToolError, ToolResult};

const PART_NUMBER_PLACEHOLDER: &str = "{Part Number}";
const QTY_INFO_PLACEHOLDER: &str = "{QTY Info}";

/// Replace every `{Part Number}` and `{QTY Info}` in `template`.
///
/// Both placeholders are replaced in one left-to-right scan, so a value that
/// itself contains a placeholder is never substituted again. A blank value
/// leaves its placeholder untouched.
pub fn substitute_template(template: &str, part_number: &str, qty_info: &str) -> String {
    let replacements: Vec<(&str, &str)> = [
        (PART_NUMBER_PLACEHOLDER, part_number),
        (QTY_INFO_PLACEHOLDER, qty_info),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .collect();

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    'scan: while !rest.is_empty() {
        for (placeholder, value) in &replacements {
            if let Some(tail) = rest.strip_prefix(placeholder) {
                out.push_str(value);
                rest = tail;
                continue 'scan;
            }
        }

        // Advance by one char.
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }

    out
}

/// Group `values` into items of at most `group_size` entries, each prefixed with `base`.
///
/// - Values are trimmed; non-empty ones join the pending group.
/// - A group is emitted when it is full or when its last value is the last input.
/// - A blank value while a group is pending emits that group followed by a `""`
///   gap item. A blank value with nothing pending is ignored.
pub fn group_values<S: AsRef<str>>(
    values: &[S],
    group_size: usize,
    base: &str,
) -> ToolResult<Vec<String>> {
    if group_size == 0 {
        return Err(ToolError::invalid_config("Group size must be greater than zero."));
    }

    let last = values.len().saturating_sub(1);
    let mut items = Vec::new();
    let mut group: Vec<&str> = Vec::with_capacity(group_size);

    for (index, value) in values.iter().enumerate() {
        let value = value.as_ref().trim();

        if !value.is_empty() {
            group.push(value);
            if group.len() == group_size || index == last {
                items.push(format!("{}{}", base, group.join(",")));
                group.clear();
            }
        } else if !group.is_empty() {
            items.push(format!("{}{}", base, group.join(",")));
            group.clear();
            items.push(String::new());
        }
    }

    tracing::debug!(
        "Grouped {} values into {} items (group size {})",
        values.len(),
        items.len(),
        group_size
    );

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution_replaces_every_occurrence() {
        let out = substitute_template("{Part Number}/{QTY Info}/{Part Number}", "P1", "10");
        assert_eq!(out, "P1/10/P1");
    }

    #[test]
    fn test_blank_value_keeps_placeholder() {
        assert_eq!(
            substitute_template("{Part Number},{QTY Info},", "", "5"),
            "{Part Number},5,"
        );
        assert_eq!(substitute_template("x{QTY Info}", "A", ""), "x{QTY Info}");
    }

    #[test]
    fn test_substitution_is_single_pass() {
        assert_eq!(
            substitute_template("{Part Number}|{QTY Info}", "{QTY Info}", "7"),
            "{QTY Info}|7"
        );
        assert_eq!(
            substitute_template("{Part Number}|{QTY Info}", "3", "{Part Number}"),
            "3|{Part Number}"
        );
    }

    #[test]
    fn test_substitution_handles_multibyte_text() {
        assert_eq!(substitute_template("é{QTY Info}ü", "", "9"), "é9ü");
    }

    #[test]
    fn test_zero_group_size() {
        let err = group_values(&["a"], 0, "B:").unwrap_err();
        assert!(matches!(err, ToolError::InvalidConfig(_)));
    }

    #[test]
    fn test_trailing_blank_after_flush() {
        let items = group_values(&["a", "b", ""], 2, "").unwrap();
        assert_eq!(items, vec!["a,b"]);
    }

    #[test]
    fn test_zero_is_a_value() {
        let items = group_values(&["0", "1"], 5, "").unwrap();
        assert_eq!(items, vec!["0,1"]);
    }
}
