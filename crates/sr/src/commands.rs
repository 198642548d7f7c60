use clap::ArgMatches;
use tracing::{error, info};

use sr_core::display::{DisplayConnection, ThreadSleeper};
use sr_core::events;
use sr_core::region::RegionError;
use sr_core::screenshot::{CaptureResult, ScreenshotError, take_screenshot, write_output};

use crate::options::CaptureOptions;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    let options = CaptureOptions::from_matches(matches);
    info!(
        event = "cli.capture_started",
        mode = ?options.mode,
        include_border = options.resolve.include_border,
        include_cursor = options.include_cursor,
        freeze = options.freeze,
        output = %options.output
    );

    let display = match DisplayConnection::open(options.display.as_deref()) {
        Ok(display) => display,
        Err(e) => {
            eprintln!("Failed to open display: {}", e);
            error!(event = "cli.display_open_failed", error = %e);
            events::log_app_error(&e);
            return Err(e.into());
        }
    };

    match capture_to_output(&display, &options) {
        Ok(result) => {
            info!(
                event = "cli.capture_completed",
                width = result.width(),
                height = result.height(),
                output = %options.output
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Failed to capture screenshot: {}", e);
            error!(event = "cli.capture_failed", error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

fn capture_to_output(
    display: &DisplayConnection,
    options: &CaptureOptions,
) -> Result<CaptureResult, ScreenshotError> {
    let result = {
        let _freeze = if options.freeze {
            Some(display.freeze().map_err(RegionError::from)?)
        } else {
            None
        };
        take_screenshot(
            display,
            &options.mode,
            &options.resolve,
            options.include_cursor,
            &ThreadSleeper,
        )?
    };

    write_output(&result, &options.output)?;
    Ok(result)
}
