use super::{base_name, ensure_dir, target_path};
use crate::pipeline::{Artifact, Step, StepEnv, WorkContext};
use dubforge_av::{ytdlp, Tool};
use dubforge_common::Result;

/// Download the video thumbnail as JPEG.
pub struct DownloadThumbnail;

impl Step for DownloadThumbnail {
    fn execute(&self, ctx: &mut WorkContext, env: &StepEnv<'_>) -> Result<()> {
        let path = target_path(ctx, Artifact::Thumbnail)?;
        if path.exists() {
            env.log
                .warn(format!("Thumbnail already exists: {}", path.display()));
            ctx.mark_produced(Artifact::Thumbnail)?;
            return Ok(());
        }

        if ctx.has_thumbnail == Some(false) {
            env.log.warn("The source offers no thumbnail, skipping.");
            return Ok(());
        }

        ensure_dir(ctx.output_dir())?;
        let base = base_name(ctx)?;
        env.log.info("Downloading thumbnail...");

        let args = ytdlp::thumbnail_args(ctx.url(), ctx.output_dir(), &base);
        match env.gateway.invoke(Tool::YtDlp, &args) {
            Ok(_) => {}
            Err(e) if ytdlp::reports_no_thumbnail(&e) => {
                env.log.warn("No thumbnail is available for this video.");
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        if path.exists() {
            ctx.mark_produced(Artifact::Thumbnail)?;
            env.log.info(format!("Thumbnail saved: {}", path.display()));
        } else {
            env.log
                .warn("Could not find the thumbnail file after download.");
        }
        Ok(())
    }
}
