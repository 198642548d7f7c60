use tracing::{debug, info, warn};

use super::errors::WindowError;
use super::types::{FrameInfo, WindowRectOptions};
use crate::display::{EVENT_SETTLE_BUDGET, Sleeper, WindowHandle, WindowQueries, wait_for};
use crate::geometry::Rect;

/// Walk up from `target` to its outermost ancestor below the root.
///
/// Fails with `NotFound` when `target` no longer exists.
pub fn find_frame(q: &dyn WindowQueries, target: WindowHandle) -> Result<FrameInfo, WindowError> {
    debug!(event = "core.window.find_frame_started", window = %target);

    if q.border_width(target)?.is_none() {
        return Err(WindowError::NotFound { id: target });
    }

    let mut frame = target;
    let mut frames = 0;
    while let Some(tree) = q.query_tree(frame)? {
        match tree.parent {
            Some(parent) if parent != tree.root => {
                frame = parent;
                frames += 1;
            }
            _ => break,
        }
    }

    debug!(
        event = "core.window.find_frame_completed",
        window = %target,
        frame = %frame,
        frames = frames
    );
    Ok(FrameInfo { frame, frames })
}

/// Locate the application window inside a window-manager frame.
///
/// Returns `frame` itself when it carries `WM_STATE` or when no descendant does.
pub fn get_client_window(
    q: &dyn WindowQueries,
    frame: WindowHandle,
) -> Result<WindowHandle, WindowError> {
    if q.has_wm_state(frame)? {
        return Ok(frame);
    }

    let client = search_client(q, frame)?;
    if client.is_none() {
        debug!(event = "core.window.client_not_found", frame = %frame);
    }
    Ok(client.unwrap_or(frame))
}

// Each level's children are checked before descending into any of them.
fn search_client(
    q: &dyn WindowQueries,
    window: WindowHandle,
) -> Result<Option<WindowHandle>, WindowError> {
    let Some(tree) = q.query_tree(window)? else {
        return Ok(None);
    };

    for &child in &tree.children {
        if q.has_wm_state(child)? {
            return Ok(Some(child));
        }
    }

    for &child in &tree.children {
        if let Some(found) = search_client(q, child)? {
            return Ok(Some(found));
        }
    }

    Ok(None)
}

/// Deepest window containing the pointer, or `None` when it is over the bare root
pub fn innermost_window_at_pointer(
    q: &dyn WindowQueries,
) -> Result<Option<WindowHandle>, WindowError> {
    let mut found = None;
    let mut current = q.root();
    while let Some(child) = q.child_under_pointer(current)? {
        found = Some(child);
        current = child;
    }
    Ok(found)
}

/// Screen rectangle covered by `target`, compensating for window-manager frames.
///
/// The window is raised first and given a bounded amount of time to report a
/// visibility change; running out of time is not an error.
pub fn window_rect(
    q: &dyn WindowQueries,
    target: WindowHandle,
    options: WindowRectOptions,
    sleeper: &dyn Sleeper,
) -> Result<Rect, WindowError> {
    info!(
        event = "core.window.rect_started",
        window = %target,
        include_border = options.include_border
    );

    let mut window = target;
    let mut frames = 0;
    if target != q.root() {
        let info = find_frame(q, target)?;
        frames = info.frames;
        window = if options.include_border {
            info.frame
        } else {
            get_client_window(q, info.frame)?
        };

        q.raise_window(window)?;
        q.watch_visibility(window)?;
        let settled = wait_for(EVENT_SETTLE_BUDGET, sleeper, || q.visibility_changed(window))?;
        if !settled {
            warn!(event = "core.window.visibility_wait_expired", window = %window);
        }
    }

    let attrs = q
        .attributes(window)?
        .ok_or(WindowError::NotFound { id: window })?;
    if !attrs.viewable {
        return Err(WindowError::NotViewable { id: window });
    }

    let origin = q.translate_to_root(window)?;
    let mut rect = Rect::new(origin.x, origin.y, attrs.width, attrs.height);
    if options.include_border && frames < 2 && attrs.border_width > 0 {
        rect = rect.expand(attrs.border_width);
    }

    info!(
        event = "core.window.rect_completed",
        window = %window,
        frames = frames,
        x = rect.x,
        y = rect.y,
        width = rect.w,
        height = rect.h
    );
    Ok(rect)
}
