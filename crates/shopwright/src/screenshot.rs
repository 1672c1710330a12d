//! Screenshot files.
//!
//! Failure screenshots are named `<scenario>_<step>_<yyyy-MM-dd_HH-mm-ss>.png`.
//! Names only have one-second resolution, so two failures of the same
//! step within one second overwrite each other.

use crate::driver::PageDriver;
use crate::result::{ShopError, ShopResult};
use chrono::{DateTime, Local, TimeZone};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Characters that may not appear in a file name on any supported platform
pub const INVALID_FILE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Maximum number of step segments kept in a failure file name
pub const MAX_STEP_SEGMENTS: usize = 5;

/// Timestamp format used in failure file names
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

fn is_invalid(c: char) -> bool {
    c.is_control() || INVALID_FILE_NAME_CHARS.contains(&c)
}

/// Replace every invalid character with `_`
#[must_use]
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if is_invalid(c) { '_' } else { c })
        .collect()
}

/// Split on invalid characters, keep the first `MAX_STEP_SEGMENTS` pieces
/// and join them with `_`
#[must_use]
pub fn sanitize_step(step: &str) -> String {
    step.split(is_invalid)
        .take(MAX_STEP_SEGMENTS)
        .collect::<Vec<_>>()
        .join("_")
}

/// File name for a failure screenshot
#[must_use]
pub fn failure_file_name<Tz: TimeZone>(scenario: &str, step: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}_{}.png",
        sanitize(scenario),
        sanitize_step(step),
        at.format(TIMESTAMP_FORMAT)
    )
}

/// Capture a full-page PNG and write it to `path`, creating parent directories
pub async fn save_screenshot(page: &dyn PageDriver, path: &Path) -> ShopResult<PathBuf> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = page.screenshot(true).await?;
    tokio::fs::write(path, &bytes)
        .await
        .map_err(|e| ShopError::Screenshot {
            message: format!("{}: {e}", path.display()),
        })?;
    Ok(path.to_path_buf())
}

/// Best-effort failure screenshot.
///
/// Never fails: every error is logged and turned into `None`.
pub async fn capture_failure(
    page: &dyn PageDriver,
    dir: &Path,
    scenario: &str,
    step: &str,
) -> Option<PathBuf> {
    let path = dir.join(failure_file_name(scenario, step, &Local::now()));
    match save_screenshot(page, &path).await {
        Ok(path) => {
            info!(scenario, step, path = %path.display(), "failure screenshot captured");
            Some(path)
        }
        Err(e) => {
            warn!(scenario, step, error = %e, "failed to capture failure screenshot");
            None
        }
    }
}
