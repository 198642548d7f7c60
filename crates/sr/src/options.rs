use clap::ArgMatches;
use sr_core::geometry::Rect;
use sr_core::region::{ResolveOptions, SelectionMode};
use sr_core::screenshot::OutputTarget;
use sr_core::select::{CancelKey, LineOptions, PickerOptions};

/// Everything a single invocation needs, taken from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOptions {
    pub mode: SelectionMode,
    pub resolve: ResolveOptions,
    pub include_cursor: bool,
    pub freeze: bool,
    pub display: Option<String>,
    pub output: OutputTarget,
}

impl CaptureOptions {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let mode = if matches.get_flag("all") {
            SelectionMode::FullScreen
        } else if matches.get_flag("select") {
            SelectionMode::InteractiveSelect
        } else if matches.get_flag("monitor") {
            SelectionMode::Monitor
        } else if let Some(rect) = matches.get_one::<Rect>("rect") {
            SelectionMode::ExplicitRect(*rect)
        } else {
            SelectionMode::FocusedWindow
        };

        let picker = PickerOptions {
            line: matches
                .get_one::<LineOptions>("line")
                .cloned()
                .unwrap_or_default(),
            cancel_key: matches.get_one::<CancelKey>("cancel-key").copied(),
        };

        Self {
            mode,
            resolve: ResolveOptions {
                include_border: matches.get_flag("border"),
                picker,
            },
            include_cursor: matches.get_flag("pointer"),
            freeze: matches.get_flag("freeze"),
            display: matches.get_one::<String>("display").cloned(),
            output: matches
                .get_one::<String>("output")
                .map(|s| OutputTarget::from(s.as_str()))
                .unwrap_or(OutputTarget::Stdout),
        }
    }
}
