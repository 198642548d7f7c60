use std::str::FromStr;

use super::errors::SelectError;
use crate::display::WindowHandle;
use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineStyle {
    #[default]
    Solid,
    Dash,
}

/// How the selection outline is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutlineMode {
    /// Shaped override-redirect window hugging the selection
    #[default]
    Edge,
    /// XOR rectangle drawn straight onto the root window
    Classic,
}

/// Appearance of the rubber-band outline.
///
/// Parsed from `style=solid|dash,width=1..8,color=NAME,opacity=0..100,mode=edge|classic`;
/// keys may appear in any order and omitted keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOptions {
    pub style: LineStyle,
    pub width: u8,
    /// X colour name or `#rrggbb`
    pub color: String,
    pub opacity: u8,
    pub mode: OutlineMode,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            style: LineStyle::Solid,
            width: 1,
            color: "grey".to_string(),
            opacity: 100,
            mode: OutlineMode::Edge,
        }
    }
}

impl FromStr for LineOptions {
    type Err = SelectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| SelectError::InvalidLineOption {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let mut options = LineOptions::default();
        for item in s.split(',') {
            let Some((key, value)) = item.split_once('=') else {
                return Err(invalid("expected key=value"));
            };
            if value.is_empty() {
                return Err(invalid("empty value"));
            }
            match key {
                "style" => {
                    options.style = match value {
                        "solid" => LineStyle::Solid,
                        "dash" => LineStyle::Dash,
                        _ => return Err(invalid("style must be solid or dash")),
                    }
                }
                "width" => {
                    options.width = value
                        .parse()
                        .ok()
                        .filter(|w| (1..=8).contains(w))
                        .ok_or_else(|| invalid("width must be between 1 and 8"))?;
                }
                "color" => options.color = value.to_string(),
                "opacity" => {
                    options.opacity = value
                        .parse()
                        .ok()
                        .filter(|o| *o <= 100)
                        .ok_or_else(|| invalid("opacity must be between 0 and 100"))?;
                }
                "mode" => {
                    options.mode = match value {
                        "edge" => OutlineMode::Edge,
                        "classic" => OutlineMode::Classic,
                        _ => return Err(invalid("mode must be edge or classic")),
                    }
                }
                _ => return Err(invalid("unknown key")),
            }
        }
        Ok(options)
    }
}

/// Key that aborts an interactive selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelKey {
    Escape,
    Q,
    Space,
    Return,
    BackSpace,
}

impl CancelKey {
    pub fn keysym(self) -> u32 {
        match self {
            CancelKey::Escape => 0xff1b,
            CancelKey::Q => 0x71,
            CancelKey::Space => 0x20,
            CancelKey::Return => 0xff0d,
            CancelKey::BackSpace => 0xff08,
        }
    }
}

impl FromStr for CancelKey {
    type Err = SelectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "escape" | "esc" => Ok(CancelKey::Escape),
            "q" => Ok(CancelKey::Q),
            "space" => Ok(CancelKey::Space),
            "return" | "enter" => Ok(CancelKey::Return),
            "backspace" => Ok(CancelKey::BackSpace),
            _ => Err(SelectError::InvalidCancelKey {
                input: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickerOptions {
    pub line: LineOptions,
    /// `None` makes every key other than the arrows fatal
    pub cancel_key: Option<CancelKey>,
}

/// What the user picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// A dragged, normalized rectangle; a straight-line drag leaves it degenerate
    Region(Rect),
    /// A click without a drag; the innermost window under the click, if any
    Window(Option<WindowHandle>),
}
