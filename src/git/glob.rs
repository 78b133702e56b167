//! EditorConfig section globs.
//!
//! Patterns are translated to a regular expression:
//!
//! | glob        | meaning                                         |
//! |-------------|-------------------------------------------------|
//! | `*`         | any run of characters except `/`                |
//! | `**`        | any run of characters                           |
//! | `?`         | any single character                            |
//! | `[seq]`     | one character from `seq` (`[!seq]` negates)     |
//! | `{a,b,c}`   | any of the comma-separated alternatives         |
//! | `{m..n}`    | an integer between `m` and `n`                  |
//! | `/**/`      | one or more directory separators                |
//! | `\c`        | the literal character `c`                       |
//!
//! Numeric ranges become capture groups whose values are checked after the
//! regex matches. A number whose first character is `0` never matches, so
//! `0` itself is rejected while a signed `+02` is read as 2.

use regex_lite::Regex;

pub struct Glob {
    regex: Regex,
    ranges: Vec<(i64, i64)>,
}

impl Glob {
    pub fn new(pattern: &str) -> Result<Self, regex_lite::Error> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut ranges = Vec::new();
        let body = translate(&chars, &mut ranges);
        let regex = Regex::new(&format!("(?s)^{}$", body))?;
        Ok(Self { regex, ranges })
    }

    pub fn is_match(&self, name: &str) -> bool {
        let Some(caps) = self.regex.captures(name) else {
            return false;
        };
        self.ranges.iter().enumerate().all(|(idx, &(lo, hi))| match caps.get(idx + 1) {
            Some(m) => number_in_range(m.as_str(), lo, hi),
            // Group sat in an alternative that did not participate.
            None => true,
        })
    }
}

/// Match `name` against `pattern`; an untranslatable pattern matches nothing.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    match Glob::new(pattern) {
        Ok(glob) => glob.is_match(name),
        Err(e) => {
            tracing::debug!(pattern, error = %e, "Ignoring invalid glob");
            false
        }
    }
}

fn number_in_range(text: &str, lo: i64, hi: i64) -> bool {
    if text.starts_with('0') {
        return false;
    }
    match text.parse::<i64>() {
        Ok(n) => lo <= n && n <= hi,
        Err(_) => false,
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// `m..n` with optionally signed integers.
fn parse_range(inner: &str) -> Option<(i64, i64)> {
    let (lo, hi) = inner.split_once("..")?;
    Some((parse_int(lo)?, parse_int(hi)?))
}

fn literal(c: char) -> String {
    regex_lite::escape(c.encode_utf8(&mut [0u8; 4]))
}

/// Count unescaped occurrences of `target`.
fn count_unescaped(chars: &[char], target: char) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for &c in chars {
        if c == target && !escaped {
            count += 1;
        }
        escaped = c == '\\' && !escaped;
    }
    count
}

fn translate(chars: &[char], ranges: &mut Vec<(i64, i64)>) -> String {
    let len = chars.len();
    let braces_balanced = count_unescaped(chars, '{') == count_unescaped(chars, '}');
    let mut out = String::new();
    let mut brace_depth = 0usize;
    let mut in_brackets = false;
    let mut i = 0;

    while i < len {
        let c = chars[i];
        i += 1;

        if in_brackets {
            match c {
                ']' => {
                    out.push(']');
                    in_brackets = false;
                }
                '-' => out.push('-'),
                '\\' if i < len => {
                    out.push_str(&literal(chars[i]));
                    i += 1;
                }
                other => out.push_str(&literal(other)),
            }
            continue;
        }

        match c {
            '\\' => {
                if i < len {
                    out.push_str(&literal(chars[i]));
                    i += 1;
                } else {
                    out.push_str(&literal('\\'));
                }
            }
            '*' => {
                if i < len && chars[i] == '*' {
                    out.push_str(".*");
                    i += 1;
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push('.'),
            '[' => {
                let mut j = i;
                let mut has_slash = false;
                while j < len && chars[j] != ']' {
                    if chars[j] == '/' && chars[j - 1] != '\\' {
                        has_slash = true;
                        break;
                    }
                    j += 1;
                }
                if has_slash || j >= len {
                    // Not a character class: a bracket spanning a separator,
                    // or one that is never closed.
                    out.push_str(&literal('['));
                } else if i < len && (chars[i] == '!' || chars[i] == '^') {
                    out.push_str("[^");
                    i += 1;
                    in_brackets = true;
                } else {
                    out.push('[');
                    in_brackets = true;
                }
            }
            '{' => {
                let mut j = i;
                let mut has_comma = false;
                let mut escaped = false;
                while j < len && (chars[j] != '}' || escaped) {
                    if chars[j] == ',' && !escaped {
                        has_comma = true;
                        break;
                    }
                    escaped = chars[j] == '\\' && !escaped;
                    j += 1;
                }

                if !has_comma && j < len {
                    let inner: String = chars[i..j].iter().collect();
                    if let Some(range) = parse_range(&inner) {
                        ranges.push(range);
                        out.push_str(r"([+-]?\d+)");
                    } else {
                        let nested = translate(&chars[i..j], ranges);
                        out.push_str(&literal('{'));
                        out.push_str(&nested);
                        out.push_str(&literal('}'));
                    }
                    i = j + 1;
                } else if braces_balanced {
                    out.push_str("(?:");
                    brace_depth += 1;
                } else {
                    out.push_str(&literal('{'));
                }
            }
            ',' => {
                if brace_depth > 0 {
                    out.push('|');
                } else {
                    out.push(',');
                }
            }
            '}' => {
                if brace_depth > 0 {
                    out.push(')');
                    brace_depth -= 1;
                } else {
                    out.push_str(&literal('}'));
                }
            }
            '/' => {
                if chars[i..].starts_with(&['*', '*', '/']) {
                    out.push_str("(?:/|/.*/)");
                    i += 3;
                } else {
                    out.push('/');
                }
            }
            other => out.push_str(&literal(other)),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_does_not_cross_directories() {
        assert!(glob_match("*.py", "main.py"));
        assert!(!glob_match("*.py", "main.pyc"));
        assert!(!glob_match("*.py", "src/main.py"));
    }

    #[test]
    fn test_double_star_crosses_directories() {
        assert!(glob_match("**.py", "src/pkg/main.py"));
        assert!(glob_match("a/**/b", "a/b"));
        assert!(glob_match("a/**/b", "a/x/y/b"));
        assert!(!glob_match("a/**/b", "ab"));
    }

    #[test]
    fn test_question_mark() {
        assert!(glob_match("?.c", "a.c"));
        assert!(!glob_match("?.c", "ab.c"));
    }

    #[test]
    fn test_brackets() {
        assert!(glob_match("[abc].txt", "b.txt"));
        assert!(!glob_match("[abc].txt", "d.txt"));
        assert!(glob_match("[!abc].txt", "d.txt"));
        assert!(!glob_match("[!abc].txt", "a.txt"));
        assert!(glob_match("[a-c]x", "bx"));
    }

    #[test]
    fn test_bracket_containing_slash_is_literal() {
        assert!(glob_match("ab[e/]cd.i", "ab[e/]cd.i"));
        assert!(!glob_match("ab[e/]cd.i", "abecd.i"));
    }

    #[test]
    fn test_alternation() {
        assert!(glob_match("*.{py,js}", "app.js"));
        assert!(glob_match("*.{py,js}", "app.py"));
        assert!(!glob_match("*.{py,js}", "app.rs"));
        assert!(glob_match("{Makefile,*.mk}", "Makefile"));
    }

    #[test]
    fn test_single_item_braces_are_literal() {
        assert!(glob_match("{single}.txt", "{single}.txt"));
        assert!(!glob_match("{single}.txt", "single.txt"));
    }

    #[test]
    fn test_unbalanced_braces_are_literal() {
        assert!(glob_match("{a,b", "{a,b"));
        assert!(!glob_match("{a,b", "a"));
    }

    #[test]
    fn test_numeric_range() {
        assert!(glob_match("file{1..3}.txt", "file1.txt"));
        assert!(glob_match("file{1..3}.txt", "file3.txt"));
        assert!(!glob_match("file{1..3}.txt", "file4.txt"));
        assert!(!glob_match("file{1..3}.txt", "file02.txt"));
        assert!(glob_match("n{-3..3}", "n-2"));
        assert!(glob_match("n{-3..3}", "n+2"));
        assert!(!glob_match("n{-3..3}", "n-4"));
        assert!(!glob_match("n{0..3}", "n0"));
        assert!(glob_match("n{0..3}", "n+02"));
        assert!(glob_match("n{-3..3}", "n-0"));
    }

    #[test]
    fn test_escapes() {
        assert!(glob_match(r"\*.txt", "*.txt"));
        assert!(!glob_match(r"\*.txt", "a.txt"));
        assert!(glob_match("a+b(1).md", "a+b(1).md"));
    }
}
