//! The standalone trim task.

use crate::pipeline::RunLogger;
use dubforge_av::actions::{self, TrimSpec};
use dubforge_av::{Tool, ToolGateway};
use dubforge_common::Result;
use std::path::PathBuf;

/// Trim `spec.input` into `spec.output`, logging progress through `log`.
///
/// `ffmpeg` must resolve before anything else happens.
pub fn run_trim(gateway: &dyn ToolGateway, spec: &TrimSpec, log: &RunLogger) -> Result<PathBuf> {
    let result = gateway.resolve(Tool::Ffmpeg).and_then(|ffmpeg| {
        log.debug(format!("Using ffmpeg: {}", ffmpeg.display()));
        log.info(format!(
            "Trimming {} from {} to {}...",
            spec.input.display(),
            spec.start,
            spec.end
        ));
        actions::trim(gateway, spec)
    });

    match result {
        Ok(()) => {
            log.info(format!("Trimmed file saved: {}", spec.output.display()));
            Ok(spec.output.clone())
        }
        Err(e) => {
            log.error(format!("Trim failed [{}]: {}", e.category(), e));
            Err(e)
        }
    }
}
