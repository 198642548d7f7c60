use std::io::{Cursor, Write};

use image::codecs::png::PngEncoder;
use image::{ImageEncoder, Rgba, RgbaImage, imageops};
use tracing::{debug, info, warn};

use super::errors::ScreenshotError;
use super::types::{CaptureRequest, CaptureResult, OutputTarget};
use crate::display::{CursorImage, DisplayBackend, DisplayError, FrameSource, Sleeper};
use crate::geometry::Rect;
use crate::region::{ResolveOptions, SelectionMode, resolve};

/// Resolve `mode` to a region and capture it
pub fn take_screenshot<B: DisplayBackend>(
    backend: &B,
    mode: &SelectionMode,
    options: &ResolveOptions,
    include_cursor: bool,
    sleeper: &dyn Sleeper,
) -> Result<CaptureResult, ScreenshotError> {
    let region = resolve(backend, mode, options, sleeper)?;
    capture(
        backend,
        &CaptureRequest::new(region).with_cursor(include_cursor),
    )
}

/// Capture a screenshot based on the request
pub fn capture<S: FrameSource + ?Sized>(
    source: &S,
    request: &CaptureRequest,
) -> Result<CaptureResult, ScreenshotError> {
    info!(
        event = "core.screenshot.capture_started",
        region = ?request.region,
        include_cursor = request.include_cursor
    );

    let region = request.region;
    if region.is_degenerate() {
        return Err(ScreenshotError::EmptyRegion {
            width: region.w,
            height: region.h,
        });
    }

    let mut image = source
        .capture_rect(region)
        .map_err(|e| ScreenshotError::CaptureFailed(e.to_string()))?;

    if request.include_cursor {
        match source.cursor_image() {
            Ok(cursor) => compose_cursor(&mut image, &cursor, region),
            Err(DisplayError::ExtensionMissing { name }) => {
                warn!(event = "core.screenshot.cursor_skipped", extension = name);
            }
            Err(e) => return Err(ScreenshotError::CaptureFailed(e.to_string())),
        }
    }

    let data = encode_png(&image)?;

    info!(
        event = "core.screenshot.capture_completed",
        width = image.width(),
        height = image.height(),
        bytes = data.len()
    );
    Ok(CaptureResult::new(image.width(), image.height(), data))
}

/// Alpha-blend the cursor onto a capture of `region`.
///
/// Parts of the cursor outside the capture are dropped.
pub fn compose_cursor(image: &mut RgbaImage, cursor: &CursorImage, region: Rect) {
    let expected = cursor.width as usize * cursor.height as usize;
    if cursor.pixels.len() < expected || expected == 0 {
        warn!(
            event = "core.screenshot.cursor_malformed",
            width = cursor.width,
            height = cursor.height,
            pixels = cursor.pixels.len()
        );
        return;
    }

    let overlay = RgbaImage::from_fn(cursor.width, cursor.height, |x, y| {
        unpremultiply(cursor.pixels[(y * cursor.width + x) as usize])
    });

    let x = i64::from(cursor.position.x) - i64::from(cursor.hotspot.x) - i64::from(region.x);
    let y = i64::from(cursor.position.y) - i64::from(cursor.hotspot.y) - i64::from(region.y);
    debug!(event = "core.screenshot.cursor_composed", x = x, y = y);

    imageops::overlay(image, &overlay, x, y);

    // The capture is opaque; blending must not leave translucent pixels
    let left = x.clamp(0, i64::from(image.width())) as u32;
    let top = y.clamp(0, i64::from(image.height())) as u32;
    let right = (x + i64::from(cursor.width)).clamp(0, i64::from(image.width())) as u32;
    let bottom = (y + i64::from(cursor.height)).clamp(0, i64::from(image.height())) as u32;
    for py in top..bottom {
        for px in left..right {
            image.get_pixel_mut(px, py)[3] = 255;
        }
    }
}

/// Premultiplied ARGB to straight RGBA
fn unpremultiply(argb: u32) -> Rgba<u8> {
    let alpha = argb >> 24;
    if alpha == 0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |shift: u32| (((argb >> shift) & 0xff) * 255 / alpha).min(255) as u8;
    Rgba([channel(16), channel(8), channel(0), alpha as u8])
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ScreenshotError> {
    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| ScreenshotError::EncodingError(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// Write the encoded image to a file or standard output
pub fn write_output(result: &CaptureResult, target: &OutputTarget) -> Result<(), ScreenshotError> {
    info!(event = "core.screenshot.save_started", target = %target);

    match target {
        OutputTarget::Stdout => write_to(result, &mut std::io::stdout().lock())?,
        OutputTarget::File(path) => std::fs::write(path, result.data())?,
    }

    info!(
        event = "core.screenshot.save_completed",
        target = %target,
        bytes = result.data().len()
    );
    Ok(())
}

fn write_to(result: &CaptureResult, writer: &mut dyn Write) -> Result<(), ScreenshotError> {
    writer.write_all(result.data())?;
    writer.flush()?;
    Ok(())
}
