use super::{base_name, ensure_dir, target_path};
use crate::pipeline::{Artifact, Step, StepEnv, WorkContext};
use dubforge_av::{ytdlp, Tool};
use dubforge_common::{Error, Result};

/// Download the primary media in the configured container.
pub struct DownloadVideo;

impl Step for DownloadVideo {
    fn execute(&self, ctx: &mut WorkContext, env: &StepEnv<'_>) -> Result<()> {
        let path = target_path(ctx, Artifact::Video)?;
        if path.exists() {
            env.log
                .warn(format!("Video already exists: {}", path.display()));
            ctx.mark_produced(Artifact::Video)?;
            return Ok(());
        }

        ensure_dir(ctx.output_dir())?;
        let base = base_name(ctx)?;
        let settings = ctx.settings();
        env.log.info(format!(
            "Downloading video ({}, format '{}')...",
            settings.video_format, settings.download_format
        ));

        let args = ytdlp::video_args(
            ctx.url(),
            ctx.output_dir(),
            &base,
            &settings.download_format,
            &settings.video_format,
        );
        env.gateway.invoke(Tool::YtDlp, &args)?;

        if !path.exists() {
            return Err(Error::artifact_missing(&path));
        }
        ctx.mark_produced(Artifact::Video)?;
        env.log.info(format!("Video saved: {}", path.display()));
        Ok(())
    }
}
