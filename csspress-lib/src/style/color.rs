//! Color encoding helper used by the optimizer.
//!
//! Parsing is delegated to [`csscolorparser`]; this module only decides on the
//! shortest hex spelling of an opaque color.

use csscolorparser::Color;

/// CSS named colors, matched whole-word and case-insensitively by the optimizer.
pub const NAMED_COLORS: &[&str] = &[
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue", "darkcyan",
    "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki", "darkmagenta",
    "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon", "darkseagreen",
    "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise", "darkviolet", "deeppink",
    "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick", "floralwhite", "forestgreen",
    "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod", "gray", "green", "greenyellow",
    "grey", "honeydew", "hotpink", "indianred", "indigo", "ivory", "khaki", "lavender",
    "lavenderblush", "lawngreen", "lemonchiffon", "lightblue", "lightcoral", "lightcyan",
    "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey", "lightpink", "lightsalmon",
    "lightseagreen", "lightskyblue", "lightslategray", "lightslategrey", "lightsteelblue",
    "lightyellow", "lime", "limegreen", "linen", "magenta", "maroon", "mediumaquamarine",
    "mediumblue", "mediumorchid", "mediumpurple", "mediumseagreen", "mediumslateblue",
    "mediumspringgreen", "mediumturquoise", "mediumvioletred", "midnightblue", "mintcream",
    "mistyrose", "moccasin", "navajowhite", "navy", "oldlace", "olive", "olivedrab", "orange",
    "orangered", "orchid", "palegoldenrod", "palegreen", "paleturquoise", "palevioletred",
    "papayawhip", "peachpuff", "peru", "pink", "plum", "powderblue", "purple", "rebeccapurple",
    "red", "rosybrown", "royalblue", "saddlebrown", "salmon", "sandybrown", "seagreen",
    "seashell", "sienna", "silver", "skyblue", "slateblue", "slategray", "slategrey", "snow",
    "springgreen", "steelblue", "tan", "teal", "thistle", "tomato", "turquoise", "violet",
    "wheat", "white", "whitesmoke", "yellow", "yellowgreen",
];

/// Result of encoding a color token.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub valid: bool,
    pub alpha: f64,
    /// Shortest `#rgb`/`#rrggbb` form; empty when `valid` is false.
    pub shortest_hex: String,
}

impl Encoded {
    fn invalid() -> Self {
        Encoded {
            valid: false,
            alpha: 0.0,
            shortest_hex: String::new(),
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.valid && self.alpha >= 1.0
    }
}

/// Parses a hex, named or functional (`rgb()`, `rgba()`, `hsl()`, `hsla()`) color.
pub fn encode(text: &str) -> Encoded {
    let color: Color = match csscolorparser::parse(text.trim()) {
        Ok(color) => color,
        Err(_) => return Encoded::invalid(),
    };
    let [r, g, b, _] = color.to_rgba8();
    Encoded {
        valid: true,
        alpha: f64::from(color.a),
        shortest_hex: shortest_hex(r, g, b),
    }
}

fn shortest_hex(r: u8, g: u8, b: u8) -> String {
    let doubled = |c: u8| c >> 4 == c & 0x0f;
    if doubled(r) && doubled(g) && doubled(b) {
        format!("#{:x}{:x}{:x}", r & 0x0f, g & 0x0f, b & 0x0f)
    } else {
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}
