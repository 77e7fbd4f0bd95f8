//! Shell-style word splitting
//!
//! Splits a command line into words the way a Bourne shell does: runs of
//! whitespace separate words, single and double quotes group text,
//! backslashes escape the following character, and adjacent fragments with
//! no whitespace between them join into one word.
//!
//! No expansion of any kind is performed (no variables, globs or
//! substitutions); the result is purely lexical.

use crate::error::ParseError;
use regex::Regex;
use std::sync::LazyLock;

/// One scan step: optional leading whitespace, one unit, optional separator.
///
/// Groups: 1 unquoted run, 2 single-quoted body, 3 double-quoted body,
/// 4 bare escape, 5 stray character, 6 separator.
static UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\s*(?:([^\s\\'"]+)|'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)"|(\\.?)|(\S))(\s|$)?"#,
    )
    .expect("shell unit pattern is valid")
});

/// Split `line` into shell words.
///
/// Fails with [`ParseError::MalformedQuoting`] when a quote has no closing
/// partner.
///
/// ```
/// let words = curlkit::shell::split(r#"curl -H 'X-A: b' "c d"e"#).unwrap();
/// assert_eq!(words, ["curl", "-H", "X-A: b", "c de"]);
/// ```
pub fn split(line: &str) -> Result<Vec<String>, ParseError> {
    let mut words = Vec::new();
    let mut field = String::new();
    let mut rest = line;

    while let Some(caps) = UNIT.captures(rest) {
        let Some(unit) = caps.get(0) else { break };

        if caps.get(5).is_some() {
            return Err(ParseError::MalformedQuoting {
                line: line.to_string(),
            });
        }

        if let Some(word) = caps.get(1) {
            field.push_str(word.as_str());
        } else if let Some(quoted) = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4)) {
            push_unescaped(&mut field, quoted.as_str());
        }

        if caps.get(6).is_some() {
            words.push(std::mem::take(&mut field));
        }

        rest = &rest[unit.end()..];
    }

    if !field.is_empty() {
        words.push(field);
    }

    Ok(words)
}

/// Append `text` to `field`, collapsing each `\X` to `X`.
///
/// A backslash with nothing after it is kept.
fn push_unescaped(field: &mut String, text: &str) {
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) => field.push(escaped),
                None => field.push('\\'),
            }
        } else {
            field.push(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<String> {
        split(line).unwrap()
    }

    #[test]
    fn test_plain_words() {
        assert_eq!(words("curl -s https://example.com"), ["curl", "-s", "https://example.com"]);
        assert_eq!(words("  a \t b\n\nc  "), ["a", "b", "c"]);
    }

    #[test]
    fn test_quote_free_lines_split_on_whitespace() {
        let lines = [
            "curl https://example.com/a?b=c&d=e",
            "  curl   -X   POST\thttps://x  ",
            "curl -H X-A:b -d a=1 -d b=2 --compressed",
            "\n\ncurl\r\n-I\nhttps://example.com/path/to/file.pdf\n",
            "curl -u user:pa$$word -A Mozilla/5.0 -b sid=1;theme=dark",
            "single",
            "ünï cödé  ✓",
        ];
        for line in lines {
            let expected: Vec<&str> = line.split_whitespace().collect();
            assert_eq!(words(line), expected, "line: {line:?}");
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(words("").is_empty());
        assert!(words("   \t ").is_empty());
    }

    #[test]
    fn test_single_quotes() {
        assert_eq!(words("a 'b c' d"), ["a", "b c", "d"]);
        assert_eq!(words("'$HOME and \"x\"'"), ["$HOME and \"x\""]);
    }

    #[test]
    fn test_double_quotes_with_escapes() {
        assert_eq!(words("a \"b\\\"c\" d"), ["a", "b\"c", "d"]);
        assert_eq!(words(r#""a\\b""#), [r"a\b"]);
        assert_eq!(words(r#""\n""#), ["n"]);
        assert_eq!(words(r#"'it\'s'"#), ["it's"]);
    }

    #[test]
    fn test_adjacent_fragments_join() {
        assert_eq!(words(r#"a'b'"c""#), ["abc"]);
        assert_eq!(words(r#"--data='{"k": 1}' x"#), [r#"--data={"k": 1}"#, "x"]);
    }

    #[test]
    fn test_bare_escapes() {
        assert_eq!(words(r#"\"hi\""#), ["\"hi\""]);
        assert_eq!(words(r"a\ b c"), ["a b", "c"]);
        assert_eq!(words(r"trailing\"), [r"trailing\"]);
    }

    #[test]
    fn test_empty_quotes_make_empty_word() {
        assert_eq!(words("a '' b"), ["a", "", "b"]);
        assert_eq!(words(r#""""#), [""]);
    }

    #[test]
    fn test_unicode_content() {
        assert_eq!(words("curl -d 'name=Zoë' ü"), ["curl", "-d", "name=Zoë", "ü"]);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = split("'unterminated").unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedQuoting {
                line: "'unterminated".to_string()
            }
        );
        assert!(split("curl -H \"X: y").is_err());
        assert!(split("it's").is_err());
    }

    #[test]
    fn test_escaped_quote_is_not_malformed() {
        assert_eq!(words(r"it\'s"), ["it's"]);
    }
}
