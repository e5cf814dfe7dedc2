//! Identifier extraction from project sources and selectors.

use regex::Regex;
use std::sync::OnceLock;

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"[\p{L}\p{N}_-]+").unwrap_or_else(|err| panic!("{err}")))
}

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<(\w+)\b").unwrap_or_else(|err| panic!("{err}")))
}

/// Every maximal run of letters, digits, `-` and `_`.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    word_regex().find_iter(text).map(|m| m.as_str())
}

/// Tokens inside quoted string literals and after `<` in tag-like constructs.
///
/// Literals joined by `+` or `.` are concatenated first, so `"nav-" + "item"`
/// yields `nav-item`.
pub fn best_effort(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for literal in string_literals(text) {
        tokens.extend(words(&literal).map(str::to_string));
    }
    tokens.extend(
        tag_regex()
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()),
    );
    tokens
}

/// Contents of every quoted literal, with concatenated literals merged.
fn string_literals(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut literals = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if !is_quote(chars[i]) {
            i += 1;
            continue;
        }
        let (mut content, mut end) = read_literal(&chars, i);
        while let Some(next) = concatenated_literal(&chars, end + 1) {
            let (more, more_end) = read_literal(&chars, next);
            content.push_str(&more);
            end = more_end;
        }
        literals.push(content);
        i = end + 1;
    }
    literals
}

fn is_quote(ch: char) -> bool {
    ch == '"' || ch == '\''
}

/// Reads the literal opening at `start`. Returns its unquoted content and the index
/// of the closing quote (or of the last character when unterminated).
fn read_literal(chars: &[char], start: usize) -> (String, usize) {
    let delimiter = chars[start];
    let mut content = String::new();
    let mut prev = delimiter;
    let mut i = start + 1;
    while i < chars.len() {
        let ch = chars[i];
        if ch == delimiter && prev != '\\' {
            return (content, i);
        }
        content.push(ch);
        prev = ch;
        i += 1;
    }
    (content, chars.len().saturating_sub(1))
}

/// Start of a literal that continues the previous one via `+` or `.`.
fn concatenated_literal(chars: &[char], from: usize) -> Option<usize> {
    let skip_ws = |mut i: usize| {
        while chars.get(i).is_some_and(|c| c.is_whitespace()) {
            i += 1;
        }
        i
    };
    let operator = skip_ws(from);
    if !matches!(chars.get(operator), Some('+') | Some('.')) {
        return None;
    }
    let next = skip_ws(operator + 1);
    chars.get(next).copied().filter(|&c| is_quote(c)).map(|_| next)
}
