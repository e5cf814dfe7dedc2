//! Adds vendor-prefixed declarations, keyframes and gradients for cross-browser support.

use crate::style::prefix_table::{self, Rule, Slots, GRADIENTS};
use crate::tree::css_tree::{NodeId, NodeKind, Stylesheet, TreeError};
use log::{debug, warn};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// A browser engine with its own prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    Mozilla,
    Webkit,
    Opera,
    Msie,
}

impl Vendor {
    /// Table slot order.
    pub const ALL: [Vendor; 4] = [Vendor::Mozilla, Vendor::Webkit, Vendor::Opera, Vendor::Msie];

    pub fn slot(self) -> usize {
        match self {
            Vendor::Mozilla => 0,
            Vendor::Webkit => 1,
            Vendor::Opera => 2,
            Vendor::Msie => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Vendor::Mozilla => "mozilla",
            Vendor::Webkit => "webkit",
            Vendor::Opera => "opera",
            Vendor::Msie => "msie",
        }
    }

    pub fn keyframes(self) -> &'static str {
        match self {
            Vendor::Mozilla => "@-moz-keyframes",
            Vendor::Webkit => "@-webkit-keyframes",
            Vendor::Opera => "@-o-keyframes",
            Vendor::Msie => "@-ms-keyframes",
        }
    }
}

/// Set of enabled vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vendors {
    pub mozilla: bool,
    pub webkit: bool,
    pub opera: bool,
    pub msie: bool,
}

impl Vendors {
    pub fn all() -> Self {
        Vendors {
            mozilla: true,
            webkit: true,
            opera: true,
            msie: true,
        }
    }

    pub fn none() -> Self {
        Vendors::default()
    }

    pub fn only(vendor: Vendor) -> Self {
        let mut vendors = Vendors::none();
        vendors.set(vendor, true);
        vendors
    }

    /// Parses `"all"`, an empty string, or a comma-separated list such as `"webkit,msie"`.
    pub fn from_list(list: &str) -> Self {
        if list.trim().eq_ignore_ascii_case("all") {
            return Vendors::all();
        }
        let mut vendors = Vendors::none();
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            match Vendor::ALL.iter().find(|v| v.name().eq_ignore_ascii_case(name)) {
                Some(&vendor) => vendors.set(vendor, true),
                None => warn!("Ignoring unknown vendor {:?}", name),
            }
        }
        vendors
    }

    pub fn set(&mut self, vendor: Vendor, enabled: bool) {
        match vendor {
            Vendor::Mozilla => self.mozilla = enabled,
            Vendor::Webkit => self.webkit = enabled,
            Vendor::Opera => self.opera = enabled,
            Vendor::Msie => self.msie = enabled,
        }
    }

    pub fn enabled(&self, vendor: Vendor) -> bool {
        match vendor {
            Vendor::Mozilla => self.mozilla,
            Vendor::Webkit => self.webkit,
            Vendor::Opera => self.opera,
            Vendor::Msie => self.msie,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.mozilla || self.webkit || self.opera || self.msie)
    }
}

/// Settings for one prefixing walk. Recursion into cloned keyframes gets its own value.
#[derive(Debug, Clone, Copy)]
struct PrefixContext {
    vendors: Vendors,
    detect_keyframes: bool,
    remove_original: bool,
}

enum Keyframes {
    Plain(NodeId),
    Prefixed,
}

pub struct Prefixer {
    vendors: Vendors,
}

impl Prefixer {
    pub fn new(vendors: Vendors) -> Self {
        Prefixer { vendors }
    }

    pub fn vendors(&self) -> Vendors {
        self.vendors
    }

    /// Adds vendor prefixes to every declaration below `group`.
    pub fn add_prefixes(&self, sheet: &mut Stylesheet, group: NodeId) -> Result<(), TreeError> {
        let ctx = PrefixContext {
            vendors: self.vendors,
            detect_keyframes: true,
            remove_original: false,
        };
        self.prefix_group(sheet, group, ctx)
    }

    fn prefix_group(
        &self,
        sheet: &mut Stylesheet,
        group: NodeId,
        ctx: PrefixContext,
    ) -> Result<(), TreeError> {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut handled_keyframes: HashSet<NodeId> = HashSet::new();

        // Declarations inserted while prefixing are visited too, so one pass reaches a fixed point.
        loop {
            let pending: Vec<NodeId> = sheet
                .declarations(group)
                .into_iter()
                .filter(|id| !visited.contains(id))
                .collect();
            if pending.is_empty() {
                break;
            }

            for id in pending {
                if !visited.insert(id) || !sheet.is_within(id, group) {
                    continue;
                }

                if ctx.detect_keyframes {
                    match keyframes_ancestor(sheet, id) {
                        Some(Keyframes::Plain(keyframes)) => {
                            if handled_keyframes.insert(keyframes) {
                                self.prefix_keyframes(sheet, keyframes, ctx, &mut visited)?;
                            }
                            continue;
                        }
                        Some(Keyframes::Prefixed) => continue,
                        None => {}
                    }
                }

                self.prefix_declaration(sheet, id, ctx)?;
            }
        }
        Ok(())
    }

    /// Creates one vendor copy of a `@keyframes` group per enabled vendor.
    fn prefix_keyframes(
        &self,
        sheet: &mut Stylesheet,
        keyframes: NodeId,
        ctx: PrefixContext,
        visited: &mut HashSet<NodeId>,
    ) -> Result<(), TreeError> {
        let Some(selector) = sheet.selector(keyframes).map(str::to_string) else {
            return Ok(());
        };
        let rest = &selector["@keyframes".len()..];

        for vendor in [Vendor::Msie, Vendor::Opera, Vendor::Mozilla, Vendor::Webkit] {
            if !ctx.vendors.enabled(vendor) {
                continue;
            }
            let new_name = format!("{}{}", vendor.keyframes(), rest);
            let exists = sheet
                .siblings(keyframes, Some(NodeKind::Group), false)
                .into_iter()
                .any(|s| sheet.selector(s) == Some(new_name.as_str()));
            if exists {
                continue;
            }

            debug!("Creating {}", new_name);
            let copy = sheet.clone_subtree(keyframes);
            if let Some(group) = sheet.group_mut(copy) {
                group.selector = Some(new_name);
            }
            sheet.insert_after(keyframes, copy)?;

            let vendor_ctx = PrefixContext {
                vendors: Vendors::only(vendor),
                detect_keyframes: false,
                remove_original: true,
            };
            self.prefix_group(sheet, copy, vendor_ctx)?;
            visited.extend(sheet.declarations(copy));
        }
        Ok(())
    }

    fn prefix_declaration(
        &self,
        sheet: &mut Stylesheet,
        id: NodeId,
        ctx: PrefixContext,
    ) -> Result<(), TreeError> {
        let Some(decl) = sheet.declaration(id) else {
            return Ok(());
        };
        let name = decl.name.to_ascii_lowercase();
        let value = decl.value.clone();

        match prefix_table::rule_for(&name) {
            Rule::Passthrough(slots) => {
                let applied = apply_passthrough(sheet, id, &value, slots, ctx.vendors)?;
                if applied && ctx.remove_original {
                    sheet.remove(id);
                }
            }
            Rule::FilterHack => {
                if ctx.vendors.msie && !has_sibling_named(sheet, id, "-ms-filter") {
                    let quoted = if value.contains('\'') {
                        format!("\"{}\"", value)
                    } else {
                        format!("'{}'", value)
                    };
                    sheet.insert_declaration_after(id, "-ms-filter", quoted)?;
                }
            }
            Rule::OpacityHack => {
                let opacity = value.trim().parse::<f64>().ok().filter(|v| v.is_finite());
                if let (true, Some(opacity)) = (ctx.vendors.msie, opacity) {
                    let ie_value = (opacity * 100.0) as i64;
                    // IE 8+
                    insert_unless_present(sheet, id, "-ms-filter", &format!("\"alpha(opacity={})\"", ie_value))?;
                    // IE 4 to 7
                    insert_unless_present(sheet, id, "filter", &format!("alpha(opacity={})", ie_value))?;
                    insert_unless_present(sheet, id, "zoom", "1")?;
                }
            }
            Rule::WhiteSpaceHack => {
                if value.trim().eq_ignore_ascii_case("pre-wrap") {
                    if ctx.vendors.mozilla {
                        insert_unless_present(sheet, id, "white-space", "-moz-pre-wrap")?;
                    }
                    if ctx.vendors.webkit {
                        insert_unless_present(sheet, id, "white-space", "-webkit-pre-wrap")?;
                    }
                    if ctx.vendors.opera {
                        insert_unless_present(sheet, id, "white-space", "-pre-wrap")?;
                        insert_unless_present(sheet, id, "white-space", "-o-pre-wrap")?;
                    }
                    if ctx.vendors.msie {
                        insert_unless_present(sheet, id, "word-wrap", "break-word")?;
                    }
                }
            }
            Rule::GradientRewrite => prefix_gradients(sheet, id, &name, &value, ctx.vendors)?,
        }
        Ok(())
    }
}

/// Outermost ancestor group that is a keyframes block.
fn keyframes_ancestor(sheet: &Stylesheet, id: NodeId) -> Option<Keyframes> {
    let mut found = None;
    for ancestor in sheet.ancestors(id) {
        let Some(selector) = sheet.selector(ancestor) else {
            continue;
        };
        let lower = selector.to_ascii_lowercase();
        if lower.starts_with("@keyframes") {
            found = Some(Keyframes::Plain(ancestor));
        } else if lower.starts_with("@-") && lower.contains("-keyframes") {
            found = Some(Keyframes::Prefixed);
        }
    }
    found
}

fn apply_passthrough(
    sheet: &mut Stylesheet,
    id: NodeId,
    value: &str,
    slots: Slots,
    vendors: Vendors,
) -> Result<bool, TreeError> {
    let mut applied = false;
    for vendor in Vendor::ALL {
        let Some(new_name) = slots[vendor.slot()] else {
            continue;
        };
        if vendors.enabled(vendor) && !has_sibling_named(sheet, id, new_name) {
            sheet.insert_declaration_after(id, new_name, value)?;
            applied = true;
        }
    }
    Ok(applied)
}

fn has_sibling_named(sheet: &Stylesheet, id: NodeId, name: &str) -> bool {
    sheet
        .siblings(id, Some(NodeKind::Declaration), false)
        .into_iter()
        .filter_map(|s| sheet.declaration(s))
        .any(|d| d.is_named(name))
}

/// Inserts `name: value` after `id` unless an identical sibling exists.
fn insert_unless_present(
    sheet: &mut Stylesheet,
    id: NodeId,
    name: &str,
    value: &str,
) -> Result<bool, TreeError> {
    let present = sheet
        .siblings(id, Some(NodeKind::Declaration), false)
        .into_iter()
        .filter_map(|s| sheet.declaration(s))
        .any(|d| d.is_named(name) && d.value == value);
    if present {
        return Ok(false);
    }
    sheet.insert_declaration_after(id, name, value)?;
    Ok(true)
}

fn gradient_patterns() -> &'static [(Regex, Slots)] {
    static PATTERNS: OnceLock<Vec<(Regex, Slots)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        GRADIENTS
            .iter()
            .map(|(function, slots)| {
                let pattern = format!(r"(?i)(^|[^\w-]){}\b", regex::escape(function));
                (regex(&pattern), *slots)
            })
            .collect()
    })
}

fn color_stops_regex() -> &'static Regex {
    static STOPS: OnceLock<Regex> = OnceLock::new();
    STOPS.get_or_init(|| {
        regex(r"(?i)(?P<color>(?:rgb|hsl)a?\s*\([^)]+\)|#[0-9a-f]+|\w+)\s+(?P<unit>\d+(?:%|em|px|in|cm|mm|ex|pt|pc)?)")
    })
}

fn horizontal_regex() -> &'static Regex {
    static HORIZONTAL: OnceLock<Regex> = OnceLock::new();
    HORIZONTAL.get_or_init(|| regex(r"(?i)\b(?:left|right)\b"))
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid prefixer regex {pattern}: {err}"))
}

fn prefix_gradients(
    sheet: &mut Stylesheet,
    id: NodeId,
    name: &str,
    value: &str,
    vendors: Vendors,
) -> Result<(), TreeError> {
    for (pattern, slots) in gradient_patterns() {
        if !pattern.is_match(value) {
            continue;
        }
        for vendor in Vendor::ALL {
            let Some(vendor_function) = slots[vendor.slot()] else {
                continue;
            };
            if !vendors.enabled(vendor) {
                continue;
            }
            let new_value = pattern
                .replace_all(value, format!("${{1}}{}", vendor_function).as_str())
                .replace("to bottom", "top")
                .replace("to right", "left");
            let exists = sheet
                .siblings(id, Some(NodeKind::Declaration), false)
                .into_iter()
                .filter_map(|s| sheet.declaration(s))
                .any(|d| d.value == new_value);
            if !exists {
                sheet.insert_declaration_after(id, name, new_value)?;
            }
        }

        if vendors.msie {
            if let Some(filter) = ie_gradient_filter(value) {
                insert_unless_present(sheet, id, "filter", &filter)?;
            }
        }
    }
    Ok(())
}

/// Legacy IE gradient filter, only when the first and last color stops are hex colors.
fn ie_gradient_filter(value: &str) -> Option<String> {
    let stops: Vec<String> = color_stops_regex()
        .captures_iter(value)
        .filter_map(|caps| caps.name("color").map(|m| m.as_str().to_string()))
        .collect();
    let first = stops.first()?;
    let last = stops.last()?;
    if !first.starts_with('#') || !last.starts_with('#') {
        return None;
    }
    let gradient_type = if horizontal_regex().is_match(value) { 1 } else { 0 };
    Some(format!(
        "progid:DXImageTransform.Microsoft.gradient( startColorstr='{}', endColorstr='{}',GradientType={})",
        ie_filter_color(first),
        ie_filter_color(last),
        gradient_type
    ))
}

/// Expands `#abc`/`#aabbcc` to the `#FFAABBCC` form IE filters expect.
fn ie_filter_color(color: &str) -> String {
    let color = color.trim();
    let hex: Vec<char> = color.chars().skip(1).collect();
    let expanded = match hex.len() {
        3 => format!("#FF{0}{0}{1}{1}{2}{2}", hex[0], hex[1], hex[2]),
        6 => format!("#FF{}", hex.iter().collect::<String>()),
        _ => color.to_string(),
    };
    expanded.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::css::parse;
    use pretty_assertions::assert_eq;

    fn prefix(css: &str, vendors: Vendors) -> String {
        let mut sheet = parse(css);
        let root = sheet.root();
        Prefixer::new(vendors).add_prefixes(&mut sheet, root).unwrap();
        sheet.to_css(true)
    }

    #[test]
    fn test_vendor_list_parsing() {
        assert_eq!(Vendors::from_list("all"), Vendors::all());
        assert_eq!(Vendors::from_list(""), Vendors::none());
        assert!(Vendors::from_list("").is_empty());
        let list = Vendors::from_list("webkit, msie,bogus");
        assert!(list.webkit && list.msie && !list.mozilla && !list.opera);
        assert_eq!(Vendors::only(Vendor::Opera), Vendors::from_list("opera"));
    }

    #[test]
    fn test_passthrough_inserts_after_original() {
        assert_eq!(
            prefix("a{transform:rotate(1deg)}", Vendors::from_list("webkit,mozilla")),
            "a{transform:rotate(1deg);-webkit-transform:rotate(1deg);-moz-transform:rotate(1deg)}"
        );
    }

    #[test]
    fn test_passthrough_skips_existing_vendor_declaration() {
        assert_eq!(
            prefix("a{box-shadow:none;-webkit-box-shadow:none}", Vendors::only(Vendor::Webkit)),
            "a{box-shadow:none;-webkit-box-shadow:none}"
        );
    }

    #[test]
    fn test_running_twice_adds_nothing() {
        let mut sheet = parse("a{transition:all 1s;opacity:.5;background:linear-gradient(to bottom, #fff 0%, #000 100%)}");
        let root = sheet.root();
        let prefixer = Prefixer::new(Vendors::all());

        prefixer.add_prefixes(&mut sheet, root).unwrap();
        let once = sheet.to_css(true);
        prefixer.add_prefixes(&mut sheet, root).unwrap();

        assert_eq!(sheet.to_css(true), once);
    }

    #[test]
    fn test_filter_hack_quotes_value() {
        assert_eq!(
            prefix("a{filter:alpha(opacity=50)}", Vendors::only(Vendor::Msie)),
            "a{filter:alpha(opacity=50);-ms-filter:'alpha(opacity=50)'}"
        );
        assert_eq!(
            prefix("a{filter:x(a='b')}", Vendors::only(Vendor::Msie)),
            "a{filter:x(a='b');-ms-filter:\"x(a='b')\"}"
        );
        assert_eq!(
            prefix("a{filter:alpha(opacity=50)}", Vendors::only(Vendor::Webkit)),
            "a{filter:alpha(opacity=50)}"
        );
    }

    #[test]
    fn test_opacity_hack() {
        assert_eq!(
            prefix("a{opacity:0.55}", Vendors::only(Vendor::Msie)),
            "a{opacity:0.55;zoom:1;-ms-zoom:1;filter:alpha(opacity=55);-ms-filter:\"alpha(opacity=55)\"}"
        );
        assert_eq!(prefix("a{opacity:inherit}", Vendors::all()), "a{opacity:inherit}");
    }

    #[test]
    fn test_white_space_hack() {
        assert_eq!(
            prefix("a{white-space:Pre-Wrap}", Vendors::from_list("mozilla,msie")),
            "a{white-space:Pre-Wrap;word-wrap:break-word;-ms-word-wrap:break-word;white-space:-moz-pre-wrap}"
        );
        assert_eq!(prefix("a{white-space:nowrap}", Vendors::all()), "a{white-space:nowrap}");
    }

    #[test]
    fn test_gradient_rewrite() {
        assert_eq!(
            prefix(
                "a{background-image:linear-gradient(to bottom, red 0%, blue 100%)}",
                Vendors::only(Vendor::Webkit)
            ),
            "a{background-image:linear-gradient(to bottom, red 0%, blue 100%);\
             background-image:-webkit-linear-gradient(top, red 0%, blue 100%)}"
        );
    }

    #[test]
    fn test_repeating_gradient_is_not_matched_as_plain() {
        assert_eq!(
            prefix(
                "a{background:repeating-linear-gradient(red 0, blue 10px)}",
                Vendors::only(Vendor::Mozilla)
            ),
            "a{background:repeating-linear-gradient(red 0, blue 10px);\
             background:-moz-repeating-linear-gradient(red 0, blue 10px)}"
        );
    }

    #[test]
    fn test_ie_gradient_filter() {
        assert_eq!(
            ie_gradient_filter("linear-gradient(to bottom, #fff 0%, #1a2b3c 100%)").as_deref(),
            Some("progid:DXImageTransform.Microsoft.gradient( startColorstr='#FFFFFFFF', endColorstr='#FF1A2B3C',GradientType=0)")
        );
        assert_eq!(
            ie_gradient_filter("linear-gradient(to right, #000 0%, #fff 100%)").as_deref(),
            Some("progid:DXImageTransform.Microsoft.gradient( startColorstr='#FF000000', endColorstr='#FFFFFFFF',GradientType=1)")
        );
        assert_eq!(ie_gradient_filter("linear-gradient(red 0%, #fff 100%)"), None);
    }

    #[test]
    fn test_keyframes_single_vendor() {
        assert_eq!(
            prefix("@keyframes x{0%{left:0}}", Vendors::only(Vendor::Webkit)),
            "@keyframes x{0%{left:0}}@-webkit-keyframes x{0%{left:0}}"
        );
    }

    #[test]
    fn test_keyframes_clone_only_keeps_its_vendor() {
        assert_eq!(
            prefix(
                "@keyframes spin{to{transform:rotate(360deg)}}",
                Vendors::from_list("webkit,mozilla")
            ),
            "@keyframes spin{to{transform:rotate(360deg)}}\
             @-webkit-keyframes spin{to{-webkit-transform:rotate(360deg)}}\
             @-moz-keyframes spin{to{-moz-transform:rotate(360deg)}}"
        );
    }

    #[test]
    fn test_existing_vendor_keyframes_not_duplicated() {
        let css = "@keyframes x{0%{left:0}}@-webkit-keyframes x{0%{left:0}}";

        assert_eq!(prefix(css, Vendors::only(Vendor::Webkit)), css);
    }
}
