use crate::geometry::Rect;
use crate::select::PickerOptions;

/// Which part of the screen to capture. Exactly one per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    FullScreen,
    FocusedWindow,
    ExplicitRect(Rect),
    InteractiveSelect,
    /// Monitor under the pointer
    Monitor,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Include window-manager decorations and the window border
    pub include_border: bool,
    pub picker: PickerOptions,
}
