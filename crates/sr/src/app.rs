use clap::{Arg, ArgAction, ArgGroup, Command};
use sr_core::region::parse_rect;
use sr_core::select::{CancelKey, LineOptions, SelectError};

pub fn build_cli() -> Command {
    Command::new("sr")
        .about("Take a PNG screenshot of an X11 display")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("all")
                .short('a')
                .long("all")
                .help("Capture the whole screen")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("window")
                .short('w')
                .long("window")
                .help("Capture the focused window (default)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("select")
                .short('s')
                .long("select")
                .help("Drag out a region, or click a window, with the mouse")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("monitor")
                .short('m')
                .long("monitor")
                .help("Capture the monitor under the pointer")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("rect")
                .short('i')
                .long("rect")
                .value_name("X,Y,W,H")
                .help("Capture an explicit rectangle")
                .allow_hyphen_values(true)
                .value_parser(parse_rect),
        )
        .group(
            ArgGroup::new("mode")
                .args(["all", "window", "select", "monitor", "rect"])
                .multiple(false),
        )
        .arg(
            Arg::new("border")
                .short('b')
                .long("border")
                .help("Include window-manager decorations and the window border")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("pointer")
                .short('p')
                .long("pointer")
                .help("Draw the mouse cursor onto the screenshot")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("freeze")
                .short('f')
                .long("freeze")
                .help("Grab the X server while selecting and capturing")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("display")
                .short('d')
                .long("display")
                .value_name("NAME")
                .help("X display to connect to instead of $DISPLAY"),
        )
        .arg(
            Arg::new("line")
                .short('l')
                .long("line")
                .value_name("OPTS")
                .help("Selection outline: style=solid|dash,width=1..8,color=NAME,opacity=0..100,mode=edge|classic")
                .value_parser(parse_line_options),
        )
        .arg(
            Arg::new("cancel-key")
                .short('k')
                .long("cancel-key")
                .value_name("KEY")
                .help("Key that aborts a selection: escape, q, space, return or backspace")
                .value_parser(parse_cancel_key),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .value_name("OUTPUT")
                .help("PNG file to write, or - for standard output")
                .default_value("-"),
        )
}

fn parse_line_options(value: &str) -> Result<LineOptions, SelectError> {
    value.parse()
}

fn parse_cancel_key(value: &str) -> Result<CancelKey, SelectError> {
    value.parse()
}
