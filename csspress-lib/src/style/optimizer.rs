//! Optimizes, compresses and prefixes a parsed stylesheet.

use crate::error::Error;
use crate::parser::css;
use crate::style::color::{self, NAMED_COLORS};
use crate::style::prefixer::{Prefixer, Vendors};
use crate::tree::css_tree::{LeafKind, NodeId, NodeKind, Stylesheet};
use log::{debug, info};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Toggles for each optimization pass.
#[derive(Debug, Clone)]
pub struct OptimizerOptions {
    /// Render compressed output (text mode only).
    pub compress: bool,
    pub remove_comments: bool,
    /// Lowercase property names and optimize colors, units and shorthands.
    pub optimize: bool,
    /// Merge groups with identical bodies. May change cascade order.
    pub extra_optimize: bool,
    /// Remove IE hacks (`filter`, `expression()`, `_prop`, `*prop`, `\9`).
    pub remove_ie_hacks: bool,
    /// Remove groups left without children.
    pub remove_empty: bool,
    /// `"all"`, a comma-separated vendor list, or empty to skip prefixing.
    pub prefixes: String,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        OptimizerOptions {
            compress: true,
            remove_comments: true,
            optimize: true,
            extra_optimize: false,
            remove_ie_hacks: false,
            remove_empty: true,
            prefixes: "all".to_string(),
        }
    }
}

/// Either CSS text or an already parsed tree. [`Optimizer::process`] returns the same shape it was given.
#[derive(Debug, Clone)]
pub enum Source {
    Text(String),
    Tree(Stylesheet),
}

impl From<&str> for Source {
    fn from(css: &str) -> Self {
        Source::Text(css.to_string())
    }
}

impl From<String> for Source {
    fn from(css: String) -> Self {
        Source::Text(css)
    }
}

impl From<Stylesheet> for Source {
    fn from(sheet: Stylesheet) -> Self {
        Source::Tree(sheet)
    }
}

const SHORTHANDS: &[(&str, &[&str])] = &[
    (
        "background",
        &[
            "background-color",
            "background-image",
            "background-repeat",
            "background-position",
            "background-attachment",
        ],
    ),
    (
        "font",
        &["font-style", "font-variant", "font-weight", "font-size", "line-height", "font-family"],
    ),
    ("margin", &["margin-top", "margin-right", "margin-bottom", "margin-left"]),
    ("padding", &["padding-top", "padding-right", "padding-bottom", "padding-left"]),
    ("list-style", &["list-style-type", "list-style-position", "list-style-image"]),
    (
        "border-width",
        &["border-top-width", "border-right-width", "border-bottom-width", "border-left-width"],
    ),
    (
        "border-radius",
        &[
            "border-top-left-radius",
            "border-top-right-radius",
            "border-bottom-right-radius",
            "border-bottom-left-radius",
        ],
    ),
];

/// Box shorthands whose repeated trailing values can be dropped.
const BOX_SHORTHANDS: &[&str] = &["margin", "padding", "border-width", "border-radius"];

const BACKGROUND_POSITIONS: &[(&str, &str)] = &[
    ("top left", "0 0"),
    ("top center", "50% 0"),
    ("top right", "100% 0"),
    ("center left", "0 50%"),
    ("center center", "50% 50%"),
    ("center right", "100% 50%"),
    ("bottom left", "0 100%"),
    ("bottom center", "50% 100%"),
    ("bottom right", "100% 100%"),
];

const BACKGROUND_KEYWORDS: &[(&str, &str)] = &[
    (" top", " 0"),
    (" left", " 0"),
    (" center", " 50%"),
    (" right", " 100%"),
    (" bottom", " 100%"),
];

const CANONICAL_SELECTOR: &str = "selector";

pub struct Optimizer {
    options: OptimizerOptions,
}

impl Default for Optimizer {
    fn default() -> Self {
        Optimizer::new(OptimizerOptions::default())
    }
}

impl Optimizer {
    pub fn new(options: OptimizerOptions) -> Self {
        Optimizer { options }
    }

    pub fn options(&self) -> &OptimizerOptions {
        &self.options
    }

    /// Optimizes text or a tree. Text is parsed first and rendered with `compress` at the end.
    pub fn process(&self, source: Source) -> Result<Source, Error> {
        match source {
            Source::Text(css) => self.process_text(&css).map(Source::Text),
            Source::Tree(mut sheet) => {
                self.process_tree(&mut sheet)?;
                Ok(Source::Tree(sheet))
            }
        }
    }

    pub fn process_text(&self, css: &str) -> Result<String, Error> {
        let mut sheet = css::parse(css);
        self.process_tree(&mut sheet)?;
        Ok(sheet.to_css(self.options.compress))
    }

    /// Runs every enabled pass over the tree, in place.
    pub fn process_tree(&self, sheet: &mut Stylesheet) -> Result<(), Error> {
        let root = sheet.root();

        if self.options.remove_comments {
            let comments = sheet.leaves(root, LeafKind::Comment);
            debug!("Removing {} comments", comments.len());
            for comment in comments {
                sheet.remove(comment);
            }
        }

        if self.options.optimize {
            for id in sheet.declarations(root) {
                if let Some(decl) = sheet.declaration_mut(id) {
                    decl.name = decl.name.to_lowercase();
                }
            }
        }

        if self.options.remove_ie_hacks {
            remove_ie_hacks(sheet);
        }

        if self.options.optimize {
            self.optimize(sheet);
        }

        if self.options.extra_optimize {
            merge_selectors(sheet);
        }

        if !self.options.prefixes.trim().is_empty() {
            let vendors = Vendors::from_list(&self.options.prefixes);
            if !vendors.is_empty() {
                Prefixer::new(vendors).add_prefixes(sheet, root)?;
            }
        }
        Ok(())
    }

    fn optimize(&self, sheet: &mut Stylesheet) {
        let root = sheet.root();
        for id in sheet.declarations(root) {
            // Earlier shorthand merges may have detached this declaration.
            if !sheet.is_attached(id) {
                continue;
            }
            let Some(decl) = sheet.declaration_mut(id) else {
                continue;
            };
            decl.value = optimize_value(&decl.name, &decl.value);

            if let Some((shorthand, value)) = merge_shorthand(sheet, id) {
                if let Some(decl) = sheet.declaration_mut(id) {
                    decl.value = optimize_value(&shorthand, &value);
                    decl.name = shorthand;
                }
            }

            if let Some(decl) = sheet.declaration_mut(id) {
                decl.value = optimize_units(&decl.name, &decl.value);
            }
        }

        if self.options.remove_empty {
            remove_empty_groups(sheet);
        }
    }
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid optimizer regex {pattern}: {err}"))
}

/// Quoted strings come first so their contents are matched as a whole and kept.
fn color_regex() -> &'static Regex {
    static COLOR: OnceLock<Regex> = OnceLock::new();
    COLOR.get_or_init(|| {
        let names: Vec<String> = NAMED_COLORS.iter().map(|n| regex::escape(n)).collect();
        regex(&format!(
            r#"(?i)"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'|#[0-9a-f]{{3,6}}\b|\b\w+\([^)]*\)|\b(?:{})\b"#,
            names.join("|")
        ))
    })
}

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| regex(r"\S+"))
}

/// `normal`/`bold` as whole words become `400`/`700`.
fn fold_font_weight(value: &str) -> String {
    word_regex()
        .replace_all(value, |caps: &Captures| {
            let word = &caps[0];
            if word.eq_ignore_ascii_case("normal") {
                "400".to_string()
            } else if word.eq_ignore_ascii_case("bold") {
                "700".to_string()
            } else {
                word.to_string()
            }
        })
        .trim()
        .to_string()
}

fn leading_zero_regex() -> &'static Regex {
    static LEADING_ZERO: OnceLock<Regex> = OnceLock::new();
    LEADING_ZERO.get_or_init(|| regex(r"(?i)(^|[^\w.])0+(\.\d+(?:%|(?:px|em|ex|in|cm|mm|pt|pc)\b))"))
}

fn zero_unit_regex() -> &'static Regex {
    static ZERO_UNIT: OnceLock<Regex> = OnceLock::new();
    ZERO_UNIT.get_or_init(|| regex(r"(?i)(^|[^\w.])0+(?:px|em|ex|in|cm|mm|pt|pc)\b"))
}

fn length_regex() -> &'static Regex {
    static LENGTH: OnceLock<Regex> = OnceLock::new();
    LENGTH.get_or_init(|| regex(r"(?i)^(?:0|(?:\d+(?:\.\d+)?|\.\d+)(?:px|em|ex|%|in|cm|mm|pt|pc))$"))
}

/// Font-weight keywords, colors and background positions.
fn optimize_value(name: &str, value: &str) -> String {
    let mut value = value.to_string();

    if name == "font" || name == "font-weight" {
        value = fold_font_weight(&value);
    }

    // Family names such as `Black Ops One` are not colors.
    if !matches!(name, "filter" | "-ms-filter" | "font" | "font-family") {
        value = color_regex()
            .replace_all(&value, |caps: &Captures| compress_color(&caps[0]))
            .into_owned();
    }

    if name == "background-position" {
        for (from, to) in BACKGROUND_POSITIONS.iter().chain(BACKGROUND_KEYWORDS) {
            value = value.replace(from, to);
        }
    }

    value
}

fn compress_color(matched: &str) -> String {
    if matched.starts_with('"') || matched.starts_with('\'') {
        return matched.to_string();
    }
    let encoded = color::encode(matched);
    if encoded.is_opaque() && encoded.shortest_hex.len() < matched.len() {
        encoded.shortest_hex
    } else {
        matched.to_string()
    }
}

/// Leading zeros and zero units, then repeated box values.
fn optimize_units(name: &str, value: &str) -> String {
    let value = leading_zero_regex().replace_all(value, "${1}${2}");
    let value = zero_unit_regex().replace_all(&value, "${1}0").into_owned();

    if BOX_SHORTHANDS.contains(&name) {
        collapse_box_values(&value)
    } else {
        value
    }
}

/// `A B C B` -> `A B C`, `A B A` -> `A B`, `A A` -> `A`.
fn collapse_box_values(value: &str) -> String {
    let mut parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() < 2 || parts.len() > 4 || !parts.iter().all(|p| length_regex().is_match(p)) {
        return value.to_string();
    }
    if parts.len() == 4 && parts[3] == parts[1] {
        parts.pop();
    }
    if parts.len() == 3 && parts[2] == parts[0] {
        parts.pop();
    }
    if parts.len() == 2 && parts[1] == parts[0] {
        parts.pop();
    }
    parts.join(" ")
}

/// Replaces a complete set of longhands with their shorthand. Returns the new name and
/// joined value for `id`; the other longhands are removed.
fn merge_shorthand(sheet: &mut Stylesheet, id: NodeId) -> Option<(String, String)> {
    let name = sheet.declaration(id)?.name.clone();
    let (shorthand, members) = SHORTHANDS
        .iter()
        .find(|(_, members)| members.contains(&name.as_str()))?;

    let siblings = sheet.siblings(id, Some(NodeKind::Declaration), true);
    let mut found = Vec::with_capacity(members.len());
    for member in members.iter() {
        let sibling = siblings
            .iter()
            .copied()
            .find(|&s| sheet.declaration(s).is_some_and(|d| d.name == *member))?;
        found.push(sibling);
    }

    let values: Vec<String> = found
        .iter()
        .filter_map(|&s| sheet.declaration(s).map(|d| d.value.clone()))
        .collect();
    for &sibling in &found {
        if sibling != id {
            sheet.remove(sibling);
        }
    }
    debug!("Merged {} longhands into {}", found.len(), shorthand);
    Some((shorthand.to_string(), values.join(" ")))
}

fn remove_ie_hacks(sheet: &mut Stylesheet) {
    let root = sheet.root();
    for id in sheet.declarations(root) {
        let Some(decl) = sheet.declaration(id) else {
            continue;
        };
        let is_hack = decl.is_named("filter")
            || decl.is_named("-ms-filter")
            || decl.name.starts_with('*')
            || decl.name.starts_with('_')
            || decl.value.to_ascii_lowercase().starts_with("expression")
            || decl.value.ends_with("\\9");
        if is_hack {
            debug!("Removing IE hack {}:{}", decl.name, decl.value);
            sheet.remove(id);
        }
    }
}

fn remove_empty_groups(sheet: &mut Stylesheet) {
    let root = sheet.root();
    let mut removed = 0;
    // Children first, so a parent emptied by this pass goes too.
    for id in sheet.groups(root).into_iter().rev() {
        if sheet.group(id).is_some_and(|g| g.children().is_empty()) {
            sheet.remove(id);
            removed += 1;
        }
    }
    if removed > 0 {
        debug!("Removed {} empty groups", removed);
    }
}

/// Body of a group rendered under a placeholder selector, for comparing groups.
fn canonical_body(sheet: &Stylesheet, group: NodeId) -> String {
    let children = sheet.group(group).map(|g| g.children()).unwrap_or_default();
    let body: Vec<String> = children.iter().map(|&c| sheet.render(c, false)).collect();
    format!("{}{{\n\t{}\n}}\n", CANONICAL_SELECTOR, body.join("\n\t"))
}

/// At-rule headers cannot be joined into a selector list.
fn is_mergeable(sheet: &Stylesheet, group: NodeId) -> bool {
    sheet
        .selector(group)
        .is_some_and(|s| !s.trim_start().starts_with('@'))
}

/// Merges sibling groups whose bodies are textually identical.
fn merge_selectors(sheet: &mut Stylesheet) {
    let root = sheet.root();
    let mut merged = 0;
    for group in sheet.groups(root) {
        if !sheet.is_attached(group) || !is_mergeable(sheet, group) {
            continue;
        }
        let reference = canonical_body(sheet, group);

        let following: Vec<NodeId> = sheet
            .siblings(group, Some(NodeKind::Group), true)
            .into_iter()
            .skip_while(|&s| s != group)
            .skip(1)
            .collect();
        for sibling in following {
            if !is_mergeable(sheet, sibling) {
                continue;
            }
            let Some(sibling_selector) = sheet.selector(sibling).map(str::to_string) else {
                continue;
            };
            if canonical_body(sheet, sibling) != reference {
                continue;
            }
            if let Some(g) = sheet.group_mut(group) {
                if let Some(selector) = g.selector.as_mut() {
                    selector.push(',');
                    selector.push_str(&sibling_selector);
                }
            }
            sheet.remove(sibling);
            merged += 1;
        }
    }
    if merged > 0 {
        info!("Merged {} groups with identical bodies", merged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn optimize(css: &str) -> String {
        let options = OptimizerOptions {
            prefixes: String::new(),
            ..Default::default()
        };
        Optimizer::new(options).process_text(css).unwrap()
    }

    #[test]
    fn test_end_to_end_example() {
        assert_eq!(
            optimize("a { color: #FFFFFF; margin: 10px 10px 10px 10px; }"),
            "a{color:#fff;margin:10px}"
        );
    }

    #[test]
    fn test_comments_removed() {
        assert_eq!(optimize("/* x */a{/* y */color:red}"), "a{color:red}");

        let keep = OptimizerOptions {
            remove_comments: false,
            prefixes: String::new(),
            ..Default::default()
        };
        assert_eq!(
            Optimizer::new(keep).process_text("/* x */a{color:red}").unwrap(),
            "/* x */a{color:red}"
        );
    }

    #[test]
    fn test_names_lowercased() {
        assert_eq!(optimize("a{COLOR:Red;Margin-Top:0}"), "a{color:Red;margin-top:0}");
    }

    #[test]
    fn test_font_weight_folding() {
        assert_eq!(optimize("a{font-weight:bold}"), "a{font-weight:700}");
        assert_eq!(optimize("a{font-weight:Normal}"), "a{font-weight:400}");
        assert_eq!(optimize("a{font:bold 12px serif}"), "a{font:700 12px serif}");
        assert_eq!(optimize("a{font-family:bolder}"), "a{font-family:bolder}");
    }

    #[test]
    fn test_color_compression() {
        assert_eq!(optimize("a{color:#ffffff}"), "a{color:#fff}");
        assert_eq!(optimize("a{color:#fff}"), "a{color:#fff}");
        assert_eq!(optimize("a{color:white}"), "a{color:#fff}");
        assert_eq!(optimize("a{color:red}"), "a{color:red}");
        assert_eq!(optimize("a{border:1px solid rgb(255,0,0)}"), "a{border:1px solid #f00}");
        assert_eq!(optimize("a{color:#123456}"), "a{color:#123456}");
    }

    #[test]
    fn test_translucent_colors_untouched() {
        assert_eq!(optimize("a{color:rgba(0,0,0,0.5)}"), "a{color:rgba(0,0,0,0.5)}");
    }

    #[test]
    fn test_invalid_color_functions_untouched() {
        assert_eq!(optimize("a{background:url(white.png)}"), "a{background:url(white.png)}");
        assert_eq!(optimize("a{filter:progid:x(color=white)}"), "a{filter:progid:x(color=white)}");
    }

    #[test]
    fn test_background_position() {
        assert_eq!(optimize("a{background-position:top left}"), "a{background-position:0 0}");
        assert_eq!(
            optimize("a{background-position:center center}"),
            "a{background-position:50% 50%}"
        );
        assert_eq!(optimize("a{background-position:10px bottom}"), "a{background-position:10px 100%}");
    }

    #[test]
    fn test_margin_shorthand_merge() {
        assert_eq!(
            optimize("a{margin-top:1px;color:red;margin-right:2px;margin-bottom:3px;margin-left:4px}"),
            "a{margin:1px 2px 3px 4px;color:red}"
        );
    }

    #[test]
    fn test_shorthand_needs_every_longhand() {
        assert_eq!(
            optimize("a{margin-top:1px;margin-right:2px;margin-bottom:3px}"),
            "a{margin-top:1px;margin-right:2px;margin-bottom:3px}"
        );
    }

    #[test]
    fn test_merged_shorthand_is_collapsed() {
        assert_eq!(
            optimize("a{padding-left:5px;padding-top:5px;padding-right:5px;padding-bottom:5px}"),
            "a{padding:5px}"
        );
    }

    #[test]
    fn test_unit_optimizations() {
        assert_eq!(optimize("a{width:0.5%}"), "a{width:.5%}");
        assert_eq!(optimize("a{line-height:0.5em}"), "a{line-height:.5em}");
        assert_eq!(optimize("a{margin:0px}"), "a{margin:0}");
        assert_eq!(optimize("a{width:10.5px}"), "a{width:10.5px}");
        assert_eq!(optimize("a{width:1.0px}"), "a{width:1.0px}");
        assert_eq!(optimize("a{margin:1px 2px 3px 2px}"), "a{margin:1px 2px 3px}");
        assert_eq!(optimize("a{margin:1px 2px 1px}"), "a{margin:1px 2px}");
        assert_eq!(optimize("a{padding:0 0 0 0}"), "a{padding:0}");
        assert_eq!(optimize("a{background-position:10px 10px}"), "a{background-position:10px 10px}");
    }

    #[test]
    fn test_zero_units_collapse_in_one_pass() {
        for css in ["a{margin:0 0px}", "a{padding:0px 0 0px 0}", "a{margin:0px 1px 0 1px}"] {
            let once = optimize(css);
            assert_eq!(optimize(&once), once);
        }
        assert_eq!(optimize("a{margin:0 0px}"), "a{margin:0}");
        assert_eq!(optimize("a{padding:0px 0 0px 0}"), "a{padding:0}");
        assert_eq!(optimize("a{margin:0px 1px 0 1px}"), "a{margin:0 1px}");
    }

    #[test]
    fn test_adjacent_font_keywords_fold_together() {
        assert_eq!(optimize("a{font:normal normal 12px serif}"), "a{font:400 400 12px serif}");
        assert_eq!(optimize("a{font:Normal BOLD 1em serif}"), "a{font:400 700 1em serif}");

        let merged = optimize(
            "a{font-style:normal;font-variant:normal;font-weight:bold;font-size:12px;line-height:1;font-family:serif}",
        );
        assert_eq!(merged, "a{font:400 400 700 12px 1 serif}");
        assert_eq!(optimize(&merged), merged);
    }

    #[test]
    fn test_color_names_inside_strings_and_families_kept() {
        assert_eq!(optimize(r#"a{content:"black"}"#), r#"a{content:"black"}"#);
        assert_eq!(optimize("a{content:'white' ' red'}"), "a{content:'white' ' red'}");
        assert_eq!(optimize("a{font-family:Black Ops One}"), "a{font-family:Black Ops One}");
        assert_eq!(optimize(r#"a{background:url("white.png") white}"#), r#"a{background:url("white.png") #fff}"#);
    }

    #[test]
    fn test_empty_groups_pruned() {
        assert_eq!(optimize("a{}b{color:red}@media print{c{}}"), "b{color:red}");
    }

    #[test]
    fn test_ie_hacks_removed() {
        let options = OptimizerOptions {
            remove_ie_hacks: true,
            prefixes: String::new(),
            ..Default::default()
        };
        let css = "a{color:red;*zoom:1;_height:1px;filter:alpha(opacity=50);width:expression(1+1);height:1px\\9}";

        assert_eq!(Optimizer::new(options).process_text(css).unwrap(), "a{color:red}");
    }

    #[test]
    fn test_extra_optimize_merges_identical_bodies() {
        let options = OptimizerOptions {
            extra_optimize: true,
            prefixes: String::new(),
            ..Default::default()
        };
        let optimizer = Optimizer::new(options);

        assert_eq!(
            optimizer.process_text("a{color:red}b{color:blue}c{color:red}").unwrap(),
            "a,c{color:red}b{color:blue}"
        );
        assert_eq!(
            optimizer.process_text("a{color:red;margin:0}b{margin:0;color:red}").unwrap(),
            "a{color:red;margin:0}b{margin:0;color:red}"
        );
    }

    #[test]
    fn test_extra_optimize_leaves_at_rules_apart() {
        let options = OptimizerOptions {
            extra_optimize: true,
            prefixes: String::new(),
            ..Default::default()
        };

        assert_eq!(
            Optimizer::new(options)
                .process_text("@media print{a{color:red}}@media screen{a{color:red}}")
                .unwrap(),
            "@media print{a{color:red}}@media screen{a{color:red}}"
        );
    }

    #[test]
    fn test_prefixes_applied_last() {
        let options = OptimizerOptions {
            prefixes: "webkit".to_string(),
            ..Default::default()
        };

        assert_eq!(
            Optimizer::new(options).process_text("a{Box-Shadow:0px 0px 1px #FFFFFF}").unwrap(),
            "a{box-shadow:0 0 1px #fff;-webkit-box-shadow:0 0 1px #fff}"
        );
    }

    #[test]
    fn test_tree_mode_returns_tree() {
        let sheet = css::parse("a{color:#ffffff}");
        let optimizer = Optimizer::new(OptimizerOptions {
            prefixes: String::new(),
            ..Default::default()
        });

        match optimizer.process(Source::from(sheet)).unwrap() {
            Source::Tree(sheet) => assert_eq!(sheet.to_css(true), "a{color:#fff}"),
            Source::Text(text) => panic!("expected a tree, got {:?}", text),
        }
        match optimizer.process(Source::from("a{color:#ffffff}")).unwrap() {
            Source::Text(text) => assert_eq!(text, "a{color:#fff}"),
            Source::Tree(_) => panic!("expected text"),
        }
    }

    #[test]
    fn test_pretty_output() {
        let options = OptimizerOptions {
            compress: false,
            prefixes: String::new(),
            ..Default::default()
        };

        assert_eq!(
            Optimizer::new(options).process_text("a{color:#ffffff;margin:0px}").unwrap(),
            "a{\n\tcolor:#fff;\n\tmargin:0;\n}\n"
        );
    }
}
