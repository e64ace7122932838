// Identifier-to-display-name transform for node types that do not declare
// an explicit menu placement. "MyCoolNode" -> "My Cool Node".

/// Turn an identifier-style name into a human readable one.
///
/// Rules (matching common editor conventions):
/// - leading `m_` and `_` prefixes are stripped
/// - a space is inserted before each camel-case word boundary
/// - acronym runs stay together: "USDImport" -> "USD Import"
/// - a space is inserted between letters and digit runs: "Vec3Make" -> "Vec 3 Make"
/// - the first letter is upper-cased
pub fn nicify(ident: &str) -> String {
    let stripped = ident
        .strip_prefix("m_")
        .unwrap_or(ident)
        .trim_start_matches('_');
    if stripped.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = stripped.chars().collect();
    let mut out = String::with_capacity(stripped.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && needs_space(&chars, i) {
            out.push(' ');
        }
        // underscores inside the name act as explicit word breaks
        if c == '_' {
            continue;
        }
        if out.is_empty() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

// Word boundary test at position i (i > 0).
fn needs_space(chars: &[char], i: usize) -> bool {
    let prev = chars[i - 1];
    let c = chars[i];
    if c == '_' || prev == '_' {
        // break handled by skipping the underscore itself
        return c != '_';
    }
    if c.is_uppercase() && prev.is_lowercase() {
        return true; // coolN|ode
    }
    if c.is_uppercase() && prev.is_uppercase() {
        // end of an acronym run: "USDImport" breaks before the 'I' in "Import"
        return chars.get(i + 1).is_some_and(|n| n.is_lowercase());
    }
    if c.is_ascii_digit() && !prev.is_ascii_digit() {
        return true;
    }
    if c.is_alphabetic() && prev.is_ascii_digit() {
        return true;
    }
    false
}

/// Final non-empty `sep`-delimited segment of `path`, if any. The label a
/// path is shown under outside folder navigation.
pub fn last_segment(path: &str, sep: char) -> Option<&str> {
    path.rsplit(sep).find(|s| !s.is_empty())
}

/// Derive a display path from a dot-separated qualified type name:
/// each namespace segment becomes a menu folder, nicified.
pub fn display_path_from_qualified(qualified: &str) -> String {
    qualified
        .split('.')
        .filter(|s| !s.is_empty())
        .map(nicify)
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_camel_case_words() {
        assert_eq!(nicify("MyCoolNode"), "My Cool Node");
        assert_eq!(nicify("addValues"), "Add Values");
    }

    #[test]
    fn keeps_acronym_runs_together() {
        assert_eq!(nicify("USDImport"), "USD Import");
        assert_eq!(nicify("HTTPServerNode"), "HTTP Server Node");
    }

    #[test]
    fn strips_member_prefixes() {
        assert_eq!(nicify("m_value"), "Value");
        assert_eq!(nicify("_hidden"), "Hidden");
    }

    #[test]
    fn breaks_on_digits_and_underscores() {
        assert_eq!(nicify("Vec3Make"), "Vec 3 Make");
        assert_eq!(nicify("snake_case_name"), "Snake case name");
    }

    #[test]
    fn last_segment_skips_trailing_separators() {
        assert_eq!(last_segment("Math/Add", '/'), Some("Add"));
        assert_eq!(last_segment("Math/Add/", '/'), Some("Add"));
        assert_eq!(last_segment("Solo", '/'), Some("Solo"));
        assert_eq!(last_segment("ns.sub.Type", '.'), Some("Type"));
        assert_eq!(last_segment("///", '/'), None);
    }

    #[test]
    fn qualified_name_becomes_slash_path() {
        assert_eq!(
            display_path_from_qualified("weave.math.AddValues"),
            "Weave/Math/Add Values"
        );
        assert_eq!(display_path_from_qualified("Standalone"), "Standalone");
    }
}
