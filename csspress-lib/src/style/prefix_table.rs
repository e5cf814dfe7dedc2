//! Static vendor-prefix knowledge.
//!
//! Vendor slots are ordered `[mozilla, webkit, opera, msie]`; `None` means the
//! vendor has no prefixed form of the property.

use std::collections::HashMap;
use std::sync::OnceLock;

pub type Slots = [Option<&'static str>; 4];

/// How a declaration is prefixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Insert renamed copies of the declaration, one per vendor slot.
    Passthrough(Slots),
    /// `filter` gains an `-ms-filter` twin with a quoted value.
    FilterHack,
    /// `opacity` gains the IE `alpha(opacity=N)` filters.
    OpacityHack,
    /// `white-space: pre-wrap` gains vendor values.
    WhiteSpaceHack,
    /// Properties without an entry: prefix gradient functions inside the value.
    GradientRewrite,
}

/// Gradient functions and their vendor spellings.
pub const GRADIENTS: &[(&str, Slots)] = &[
    (
        "linear-gradient",
        [Some("-moz-linear-gradient"), Some("-webkit-linear-gradient"), Some("-o-linear-gradient"), None],
    ),
    (
        "repeating-linear-gradient",
        [
            Some("-moz-repeating-linear-gradient"),
            Some("-webkit-repeating-linear-gradient"),
            Some("-o-repeating-linear-gradient"),
            None,
        ],
    ),
    (
        "radial-gradient",
        [Some("-moz-radial-gradient"), Some("-webkit-radial-gradient"), Some("-o-radial-gradient"), None],
    ),
    (
        "repeating-radial-gradient",
        [
            Some("-moz-repeating-radial-gradient"),
            Some("-webkit-repeating-radial-gradient"),
            Some("-o-repeating-radial-gradient"),
            None,
        ],
    ),
];

const fn moz(name: &'static str) -> Rule {
    Rule::Passthrough([Some(name), None, None, None])
}

const fn webkit(name: &'static str) -> Rule {
    Rule::Passthrough([None, Some(name), None, None])
}

const fn opera(name: &'static str) -> Rule {
    Rule::Passthrough([None, None, Some(name), None])
}

const fn msie(name: &'static str) -> Rule {
    Rule::Passthrough([None, None, None, Some(name)])
}

const fn moz_webkit(moz: &'static str, webkit: &'static str) -> Rule {
    Rule::Passthrough([Some(moz), Some(webkit), None, None])
}

const fn slots(slots: Slots) -> Rule {
    Rule::Passthrough(slots)
}

const TABLE: &[(&str, Rule)] = &[
    ("animation", webkit("-webkit-animation")),
    ("animation-delay", webkit("-webkit-animation-delay")),
    ("animation-direction", webkit("-webkit-animation-direction")),
    ("animation-duration", webkit("-webkit-animation-duration")),
    ("animation-fill-mode", webkit("-webkit-animation-fill-mode")),
    ("animation-iteration-count", webkit("-webkit-animation-iteration-count")),
    ("animation-name", webkit("-webkit-animation-name")),
    ("animation-play-state", webkit("-webkit-animation-play-state")),
    ("animation-timing-function", webkit("-webkit-animation-timing-function")),
    ("appearance", moz_webkit("-moz-appearance", "-webkit-appearance")),
    ("backface-visibility", webkit("-webkit-backface-visibility")),
    ("background-clip", webkit("-webkit-background-clip")),
    ("background-composite", webkit("-webkit-background-composite")),
    ("background-inline-policy", moz("-moz-background-inline-policy")),
    ("background-origin", webkit("-webkit-background-origin")),
    ("background-position-x", msie("-ms-background-position-x")),
    ("background-position-y", msie("-ms-background-position-y")),
    ("background-size", webkit("-webkit-background-size")),
    ("behavior", msie("-ms-behavior")),
    ("binding", moz("-moz-binding")),
    ("border-after", webkit("-webkit-border-after")),
    ("border-after-color", webkit("-webkit-border-after-color")),
    ("border-after-style", webkit("-webkit-border-after-style")),
    ("border-after-width", webkit("-webkit-border-after-width")),
    ("border-before", webkit("-webkit-border-before")),
    ("border-before-color", webkit("-webkit-border-before-color")),
    ("border-before-style", webkit("-webkit-border-before-style")),
    ("border-before-width", webkit("-webkit-border-before-width")),
    ("border-bottom-colors", moz("-moz-border-bottom-colors")),
    ("border-bottom-left-radius", moz_webkit("-moz-border-radius-bottomleft", "-webkit-border-bottom-left-radius")),
    ("border-bottom-right-radius", moz_webkit("-moz-border-radius-bottomright", "-webkit-border-bottom-right-radius")),
    ("border-end", moz_webkit("-moz-border-end", "-webkit-border-end")),
    ("border-end-color", moz_webkit("-moz-border-end-color", "-webkit-border-end-color")),
    ("border-end-style", moz_webkit("-moz-border-end-style", "-webkit-border-end-style")),
    ("border-end-width", moz_webkit("-moz-border-end-width", "-webkit-border-end-width")),
    ("border-fit", webkit("-webkit-border-fit")),
    ("border-horizontal-spacing", webkit("-webkit-border-horizontal-spacing")),
    ("border-image", moz_webkit("-moz-border-image", "-webkit-border-image")),
    ("border-left-colors", moz("-moz-border-left-colors")),
    ("border-radius", moz_webkit("-moz-border-radius", "-webkit-border-radius")),
    ("border-right-colors", moz("-moz-border-right-colors")),
    ("border-start", moz_webkit("-moz-border-start", "-webkit-border-start")),
    ("border-start-color", moz_webkit("-moz-border-start-color", "-webkit-border-start-color")),
    ("border-start-style", moz_webkit("-moz-border-start-style", "-webkit-border-start-style")),
    ("border-start-width", moz_webkit("-moz-border-start-width", "-webkit-border-start-width")),
    ("border-top-colors", moz("-moz-border-top-colors")),
    ("border-top-left-radius", moz_webkit("-moz-border-radius-topleft", "-webkit-border-top-left-radius")),
    ("border-top-right-radius", moz_webkit("-moz-border-radius-topright", "-webkit-border-top-right-radius")),
    ("border-vertical-spacing", webkit("-webkit-border-vertical-spacing")),
    ("box-align", moz_webkit("-moz-box-align", "-webkit-box-align")),
    ("box-direction", moz_webkit("-moz-box-direction", "-webkit-box-direction")),
    ("box-flex", moz_webkit("-moz-box-flex", "-webkit-box-flex")),
    ("box-flex-group", webkit("-webkit-box-flex-group")),
    ("box-flex-lines", webkit("-webkit-box-flex-lines")),
    ("box-ordinal-group", moz_webkit("-moz-box-ordinal-group", "-webkit-box-ordinal-group")),
    ("box-orient", moz_webkit("-moz-box-orient", "-webkit-box-orient")),
    ("box-pack", moz_webkit("-moz-box-pack", "-webkit-box-pack")),
    ("box-reflect", webkit("-webkit-box-reflect")),
    ("box-shadow", moz_webkit("-moz-box-shadow", "-webkit-box-shadow")),
    ("box-sizing", moz("-moz-box-sizing")),
    ("color-correction", webkit("-webkit-color-correction")),
    ("column-break-after", webkit("-webkit-column-break-after")),
    ("column-break-before", webkit("-webkit-column-break-before")),
    ("column-break-inside", webkit("-webkit-column-break-inside")),
    ("column-count", moz_webkit("-moz-column-count", "-webkit-column-count")),
    ("column-gap", moz_webkit("-moz-column-gap", "-webkit-column-gap")),
    ("column-rule", moz_webkit("-moz-column-rule", "-webkit-column-rule")),
    ("column-rule-color", moz_webkit("-moz-column-rule-color", "-webkit-column-rule-color")),
    ("column-rule-style", moz_webkit("-moz-column-rule-style", "-webkit-column-rule-style")),
    ("column-rule-width", moz_webkit("-moz-column-rule-width", "-webkit-column-rule-width")),
    ("column-span", webkit("-webkit-column-span")),
    ("column-width", moz_webkit("-moz-column-width", "-webkit-column-width")),
    ("columns", webkit("-webkit-columns")),
    ("filter", Rule::FilterHack),
    ("float-edge", moz("-moz-float-edge")),
    ("font-feature-settings", moz("-moz-font-feature-settings")),
    ("font-language-override", moz("-moz-font-language-override")),
    ("font-size-delta", webkit("-webkit-font-size-delta")),
    ("font-smoothing", webkit("-webkit-font-smoothing")),
    ("force-broken-image-icon", moz("-moz-force-broken-image-icon")),
    ("highlight", webkit("-webkit-highlight")),
    ("hyphenate-character", webkit("-webkit-hyphenate-character")),
    ("hyphenate-locale", webkit("-webkit-hyphenate-locale")),
    ("hyphens", webkit("-webkit-hyphens")),
    ("image-region", moz("-moz-image-region")),
    ("ime-mode", msie("-ms-ime-mode")),
    ("interpolation-mode", msie("-ms-interpolation-mode")),
    ("layout-flow", msie("-ms-layout-flow")),
    ("layout-grid", msie("-ms-layout-grid")),
    ("layout-grid-char", msie("-ms-layout-grid-char")),
    ("layout-grid-line", msie("-ms-layout-grid-line")),
    ("layout-grid-mode", msie("-ms-layout-grid-mode")),
    ("layout-grid-type", msie("-ms-layout-grid-type")),
    ("line-break", slots([None, Some("-webkit-line-break"), None, Some("-ms-line-break")])),
    ("line-clamp", webkit("-webkit-line-clamp")),
    ("line-grid-mode", msie("-ms-line-grid-mode")),
    ("logical-height", webkit("-webkit-logical-height")),
    ("logical-width", webkit("-webkit-logical-width")),
    ("margin-after", webkit("-webkit-margin-after")),
    ("margin-after-collapse", webkit("-webkit-margin-after-collapse")),
    ("margin-before", webkit("-webkit-margin-before")),
    ("margin-before-collapse", webkit("-webkit-margin-before-collapse")),
    ("margin-bottom-collapse", webkit("-webkit-margin-bottom-collapse")),
    ("margin-collapse", webkit("-webkit-margin-collapse")),
    ("margin-end", moz_webkit("-moz-margin-end", "-webkit-margin-end")),
    ("margin-start", moz_webkit("-moz-margin-start", "-webkit-margin-start")),
    ("margin-top-collapse", webkit("-webkit-margin-top-collapse")),
    ("marquee", webkit("-webkit-marquee")),
    ("marquee-direction", webkit("-webkit-marquee-direction")),
    ("marquee-increment", webkit("-webkit-marquee-increment")),
    ("marquee-repetition", webkit("-webkit-marquee-repetition")),
    ("marquee-speed", webkit("-webkit-marquee-speed")),
    ("marquee-style", webkit("-webkit-marquee-style")),
    ("mask", webkit("-webkit-mask")),
    ("mask-attachment", webkit("-webkit-mask-attachment")),
    ("mask-box-image", webkit("-webkit-mask-box-image")),
    ("mask-clip", webkit("-webkit-mask-clip")),
    ("mask-composite", webkit("-webkit-mask-composite")),
    ("mask-image", webkit("-webkit-mask-image")),
    ("mask-origin", webkit("-webkit-mask-origin")),
    ("mask-position", webkit("-webkit-mask-position")),
    ("mask-position-x", webkit("-webkit-mask-position-x")),
    ("mask-position-y", webkit("-webkit-mask-position-y")),
    ("mask-repeat", webkit("-webkit-mask-repeat")),
    ("mask-repeat-x", webkit("-webkit-mask-repeat-x")),
    ("mask-repeat-y", webkit("-webkit-mask-repeat-y")),
    ("mask-size", webkit("-webkit-mask-size")),
    ("match-nearest-mail-blockquote-color", webkit("-webkit-match-nearest-mail-blockquote-color")),
    ("max-logical-height", webkit("-webkit-max-logical-height")),
    ("max-logical-width", webkit("-webkit-max-logical-width")),
    ("min-logical-height", webkit("-webkit-min-logical-height")),
    ("min-logical-width", webkit("-webkit-min-logical-width")),
    ("object-fit", opera("-o-object-fit")),
    ("object-position", opera("-o-object-position")),
    ("opacity", Rule::OpacityHack),
    ("outline-radius", moz("-moz-outline-radius")),
    ("outline-bottom-left-radius", moz("-moz-outline-radius-bottomleft")),
    ("outline-bottom-right-radius", moz("-moz-outline-radius-bottomright")),
    ("outline-top-left-radius", moz("-moz-outline-radius-topleft")),
    ("outline-top-right-radius", moz("-moz-outline-radius-topright")),
    ("padding-after", webkit("-webkit-padding-after")),
    ("padding-before", webkit("-webkit-padding-before")),
    ("padding-end", moz_webkit("-moz-padding-end", "-webkit-padding-end")),
    ("padding-start", moz_webkit("-moz-padding-start", "-webkit-padding-start")),
    ("perspective", webkit("-webkit-perspective")),
    ("perspective-origin", webkit("-webkit-perspective-origin")),
    ("perspective-origin-x", webkit("-webkit-perspective-origin-x")),
    ("perspective-origin-y", webkit("-webkit-perspective-origin-y")),
    ("rtl-ordering", webkit("-webkit-rtl-ordering")),
    ("scrollbar-3dlight-color", msie("-ms-scrollbar-3dlight-color")),
    ("scrollbar-arrow-color", msie("-ms-scrollbar-arrow-color")),
    ("scrollbar-base-color", msie("-ms-scrollbar-base-color")),
    ("scrollbar-darkshadow-color", msie("-ms-scrollbar-darkshadow-color")),
    ("scrollbar-face-color", msie("-ms-scrollbar-face-color")),
    ("scrollbar-highlight-color", msie("-ms-scrollbar-highlight-color")),
    ("scrollbar-shadow-color", msie("-ms-scrollbar-shadow-color")),
    ("scrollbar-track-color", msie("-ms-scrollbar-track-color")),
    ("stack-sizing", moz("-moz-stack-sizing")),
    ("svg-shadow", webkit("-webkit-svg-shadow")),
    ("tab-size", slots([Some("-moz-tab-size"), None, Some("-o-tab-size"), None])),
    ("table-baseline", opera("-o-table-baseline")),
    ("text-align-last", msie("-ms-text-align-last")),
    ("text-autospace", msie("-ms-text-autospace")),
    ("text-combine", webkit("-webkit-text-combine")),
    ("text-decorations-in-effect", webkit("-webkit-text-decorations-in-effect")),
    ("text-emphasis", webkit("-webkit-text-emphasis")),
    ("text-emphasis-color", webkit("-webkit-text-emphasis-color")),
    ("text-emphasis-position", webkit("-webkit-text-emphasis-position")),
    ("text-emphasis-style", webkit("-webkit-text-emphasis-style")),
    ("text-fill-color", webkit("-webkit-text-fill-color")),
    ("text-justify", msie("-ms-text-justify")),
    ("text-kashida-space", msie("-ms-text-kashida-space")),
    ("text-overflow", slots([None, None, Some("-o-text-overflow"), Some("-ms-text-overflow")])),
    ("text-security", webkit("-webkit-text-security")),
    ("text-size-adjust", slots([None, Some("-webkit-text-size-adjust"), None, Some("-ms-text-size-adjust")])),
    ("text-stroke", webkit("-webkit-text-stroke")),
    ("text-stroke-color", webkit("-webkit-text-stroke-color")),
    ("text-stroke-width", webkit("-webkit-text-stroke-width")),
    ("text-underline-position", msie("-ms-text-underline-position")),
    (
        "transform",
        slots([Some("-moz-transform"), Some("-webkit-transform"), Some("-o-transform"), Some("-ms-transform")]),
    ),
    (
        "transform-origin",
        slots([Some("-moz-transform-origin"), Some("-webkit-transform-origin"), Some("-o-transform-origin"), None]),
    ),
    ("transform-origin-x", webkit("-webkit-transform-origin-x")),
    ("transform-origin-y", webkit("-webkit-transform-origin-y")),
    ("transform-origin-z", webkit("-webkit-transform-origin-z")),
    ("transform-style", webkit("-webkit-transform-style")),
    (
        "transition",
        slots([Some("-moz-transition"), Some("-webkit-transition"), Some("-o-transition"), None]),
    ),
    (
        "transition-delay",
        slots([Some("-moz-transition-delay"), Some("-webkit-transition-delay"), Some("-o-transition-delay"), None]),
    ),
    (
        "transition-duration",
        slots([
            Some("-moz-transition-duration"),
            Some("-webkit-transition-duration"),
            Some("-o-transition-duration"),
            None,
        ]),
    ),
    (
        "transition-property",
        slots([
            Some("-moz-transition-property"),
            Some("-webkit-transition-property"),
            Some("-o-transition-property"),
            None,
        ]),
    ),
    (
        "transition-timing-function",
        slots([
            Some("-moz-transition-timing-function"),
            Some("-webkit-transition-timing-function"),
            Some("-o-transition-timing-function"),
            None,
        ]),
    ),
    ("user-drag", webkit("-webkit-user-drag")),
    ("user-focus", moz("-moz-user-focus")),
    ("user-input", moz("-moz-user-input")),
    ("user-modify", moz_webkit("-moz-user-modify", "-webkit-user-modify")),
    ("user-select", moz_webkit("-moz-user-select", "-webkit-user-select")),
    ("white-space", Rule::WhiteSpaceHack),
    ("window-shadow", moz("-moz-window-shadow")),
    ("word-break", msie("-ms-word-break")),
    ("word-wrap", msie("-ms-word-wrap")),
    ("writing-mode", slots([None, Some("-webkit-writing-mode"), None, Some("-ms-writing-mode")])),
    ("zoom", msie("-ms-zoom")),
];

fn table() -> &'static HashMap<&'static str, Rule> {
    static TABLE_MAP: OnceLock<HashMap<&'static str, Rule>> = OnceLock::new();
    TABLE_MAP.get_or_init(|| TABLE.iter().copied().collect())
}

/// Looks up how a (lowercase) property name is prefixed.
pub fn rule_for(name: &str) -> Rule {
    table()
        .get(name)
        .copied()
        .unwrap_or(Rule::GradientRewrite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_passthrough_lookup() {
        assert_eq!(
            rule_for("transform"),
            Rule::Passthrough([
                Some("-moz-transform"),
                Some("-webkit-transform"),
                Some("-o-transform"),
                Some("-ms-transform")
            ])
        );
        assert_eq!(rule_for("zoom"), Rule::Passthrough([None, None, None, Some("-ms-zoom")]));
    }

    #[test]
    fn test_special_cases() {
        assert_eq!(rule_for("filter"), Rule::FilterHack);
        assert_eq!(rule_for("opacity"), Rule::OpacityHack);
        assert_eq!(rule_for("white-space"), Rule::WhiteSpaceHack);
    }

    #[test]
    fn test_unknown_falls_back_to_gradients() {
        assert_eq!(rule_for("background-image"), Rule::GradientRewrite);
        assert_eq!(rule_for("color"), Rule::GradientRewrite);
    }

    #[test]
    fn test_table_has_no_duplicate_names() {
        assert_eq!(table().len(), TABLE.len());
    }
}
