//! Best-effort CSS tokenizer that builds a [`Stylesheet`] tree.
//!
//! The scanner never fails: unterminated strings and comments run to the end of
//! the input, unbalanced `}` at the top level is kept as text, and stray
//! semicolons are tolerated.

use crate::tree::css_tree::{LeafKind, NodeId, Stylesheet};
use log::debug;

/// Parser settings.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Trim selectors, property names and values.
    pub trim: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions { trim: true }
    }
}

/// Parses CSS text with the default options.
pub fn parse(css: &str) -> Stylesheet {
    CssParser::default().parse(css)
}

#[derive(Debug, Default)]
pub struct CssParser {
    options: ParserOptions,
}

impl CssParser {
    pub fn new(options: ParserOptions) -> Self {
        CssParser { options }
    }

    pub fn parse(&self, css: &str) -> Stylesheet {
        let chars: Vec<char> = css.chars().collect();
        let mut sheet = Stylesheet::new();
        let mut current = sheet.root();
        let mut partial = String::new();

        let mut i = 0;
        while i < chars.len() {
            let ch = chars[i];
            match ch {
                '{' => {
                    let selector = self.process(&partial);
                    let group = sheet.create_group((!selector.is_empty()).then_some(selector));
                    attach(&mut sheet, current, group);
                    current = group;
                    partial.clear();
                }
                ';' | '}' => {
                    if let Some(separator) = partial.find(':') {
                        let name = self.process(&partial[..separator]);
                        let value = self.process(&partial[separator + 1..]);
                        let decl = sheet.create_declaration(name, value);
                        attach(&mut sheet, current, decl);
                        partial.clear();
                    } else if ch == ';' {
                        let trimmed = partial.trim();
                        if trimmed.starts_with("@import") {
                            let import =
                                sheet.create_leaf(LeafKind::Import, format!("{};", self.process(&partial)));
                            attach(&mut sheet, current, import);
                            partial.clear();
                        } else if !trimmed.is_empty() {
                            partial.push(ch);
                        }
                    }

                    if ch == '}' {
                        match sheet.parent(current) {
                            Some(parent) => current = parent,
                            None => partial.push(ch),
                        }
                    }
                }
                '"' | '\'' => {
                    let (string, end) = read_string(&chars, i);
                    partial.push_str(&string);
                    i = end;
                }
                '/' if chars.get(i + 1) == Some(&'*') => {
                    let (comment, end) = read_comment(&chars, i);
                    match comment {
                        Some(text) => {
                            let leaf = sheet.create_leaf(LeafKind::Comment, text);
                            attach(&mut sheet, current, leaf);
                        }
                        None => debug!("Unterminated comment at offset {}", i),
                    }
                    i = end;
                }
                _ => partial.push(ch),
            }
            i += 1;
        }

        // Flush a trailing declaration that was never closed by `;` or `}`.
        if let Some(separator) = partial.find(':') {
            let name = self.process(&partial[..separator]);
            let value = self.process(&partial[separator + 1..]);
            let decl = sheet.create_declaration(name, value);
            attach(&mut sheet, current, decl);
        } else if !partial.trim().is_empty() {
            debug!("Dropping trailing text {:?}", partial.trim());
        }

        sheet
    }

    fn process(&self, text: &str) -> String {
        if self.options.trim {
            text.trim().to_string()
        } else {
            text.to_string()
        }
    }
}

fn attach(sheet: &mut Stylesheet, group: NodeId, child: NodeId) {
    // `group` is always a rule group and `child` freshly created.
    if let Err(err) = sheet.append_child(group, child) {
        debug!("Could not attach parsed node: {}", err);
    }
}

/// Reads a quoted string starting at `start`. Returns the text (quotes included) and
/// the index of the closing quote, or of the last character when unterminated.
fn read_string(chars: &[char], start: usize) -> (String, usize) {
    let delimiter = chars[start];
    let mut string = String::new();
    string.push(delimiter);
    let mut prev = delimiter;
    let mut i = start + 1;
    while i < chars.len() {
        let ch = chars[i];
        string.push(ch);
        if ch == delimiter && prev != '\\' {
            return (string, i);
        }
        prev = ch;
        i += 1;
    }
    (string, chars.len().saturating_sub(1))
}

/// Reads a `/* ... */` comment. Unterminated comments yield `None`.
fn read_comment(chars: &[char], start: usize) -> (Option<String>, usize) {
    let mut text = String::from("/*");
    let mut i = start + 2;
    let mut prev = '\0';
    while i < chars.len() {
        let ch = chars[i];
        text.push(ch);
        if prev == '*' && ch == '/' {
            return (Some(text), i);
        }
        prev = ch;
        i += 1;
    }
    (None, chars.len().saturating_sub(1))
}
