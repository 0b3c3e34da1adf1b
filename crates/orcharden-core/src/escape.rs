/// Escape a string for embedding as a JSON string value.
///
/// Deterministic, in this exact order: backslash, then double-quote, then
/// tab are replaced with their escape sequences; carriage returns and
/// newlines are stripped outright rather than escaped, since artifact
/// reports are meant to read as single-line JSON fields even when the
/// source text (agent stdout, progress notes) spans multiple lines.
pub fn escape_json_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\t' => out.push_str("\\t"),
            '\r' | '\n' => {}
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_backslash_before_quote() {
        // order matters: a literal backslash-quote sequence must not
        // double-escape the quote's own backslash.
        assert_eq!(escape_json_string(r#"\""#), r#"\\\""#);
    }

    #[test]
    fn escapes_tab() {
        assert_eq!(escape_json_string("a\tb"), "a\\tb");
    }

    #[test]
    fn strips_newlines_and_carriage_returns() {
        assert_eq!(escape_json_string("a\nb\r\nc"), "abc");
    }

    #[test]
    fn leaves_plain_text_untouched() {
        assert_eq!(escape_json_string("hello world"), "hello world");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(escape_json_string(""), "");
    }

    #[test]
    fn combined_case_matches_expected_order() {
        let input = "line one\\\nline \"two\"\tend";
        let escaped = escape_json_string(input);
        assert_eq!(escaped, "line one\\line \\\"two\\\"\\tend");
    }
}
