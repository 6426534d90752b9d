//! Lua literal rendering of scalar values.

use crate::models::Value;

/// Render `value` as a Lua literal.
///
/// Non-finite numbers become `nil` with an inline comment naming the original value.
/// Text is trimmed, escaped and double quoted. Line breaks are rewritten to `\n`
/// before backslashes are doubled, so a line break reaches Lua as the literal
/// characters `\\n` rather than a newline escape.
pub fn lua_literal(value: &Value) -> String {
    match value {
        Value::Null => "nil".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) if n.is_nan() => "nil --[[NaN]]".to_string(),
        Value::Number(n) if n.is_infinite() && n.is_sign_positive() => {
            "nil --[[Infinity]]".to_string()
        }
        Value::Number(n) if n.is_infinite() => "nil --[[-Infinity]]".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Text(s) => lua_string(s),
    }
}

/// Quote `s` as a Lua string literal.
pub fn lua_string(s: &str) -> String {
    let escaped = s
        .trim()
        .replace("\r\n", "\\n")
        .replace(['\n', '\r'], "\\n")
        .replace('\\', "\\\\")
        .replace('"', "\\\"");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backslashes_are_escaped_once() {
        assert_eq!(lua_string(r"C:\data"), r#""C:\\data""#);
    }

    #[test]
    fn line_breaks_are_rewritten_before_backslashes() {
        assert_eq!(lua_string("a\r\nb\rc\nd"), r#""a\\nb\\nc\\nd""#);
    }

    #[test]
    fn integral_numbers_have_no_fraction() {
        assert_eq!(lua_literal(&Value::Number(5.0)), "5");
        assert_eq!(lua_literal(&Value::Number(-12.5)), "-12.5");
        assert_eq!(lua_literal(&Value::Number(1e21)), "1000000000000000000000");
    }
}
