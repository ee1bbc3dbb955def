use super::{ensure_dir, target_path, write_artifact};
use crate::pipeline::{Artifact, Step, StepEnv, WorkContext};
use dubforge_av::ytdlp::{self, VideoInfo};
use dubforge_av::Tool;
use dubforge_common::Result;

/// Identity step: fetch the source metadata and establish the base name.
pub struct DownloadMetadata;

impl Step for DownloadMetadata {
    fn execute(&self, ctx: &mut WorkContext, env: &StepEnv<'_>) -> Result<()> {
        ensure_dir(ctx.output_dir())?;

        env.log.info("Requesting metadata...");
        let args = ytdlp::metadata_args(ctx.url());
        let output = env.gateway.invoke(Tool::YtDlp, &args)?;
        let info = VideoInfo::parse(&output.stdout)?;

        let id = info.id.clone().unwrap_or_default();
        let title = info.title.clone().unwrap_or_else(|| "untitled".to_string());
        let description = info.description.clone().unwrap_or_default();
        let tags = info.tags.clone().unwrap_or_default();

        let raw = if id.is_empty() { &title } else { &id };
        let base = ctx.set_base(raw).to_string();
        env.log.debug(format!("Base name: {}", base));

        ctx.title = Some(title.clone());
        ctx.description = Some(description.clone());
        ctx.tags = tags.clone();
        ctx.subtitle_languages = info.subtitle_languages();
        ctx.has_thumbnail = info.has_thumbnail();

        let path = target_path(ctx, Artifact::Metadata)?;
        if path.exists() {
            env.log
                .info(format!("Metadata file already exists: {}", path.display()));
        } else {
            env.log.info(format!("Saving metadata: {}", path.display()));
            write_artifact(&path, &render(&id, &title, &description, &tags))?;
        }
        ctx.mark_produced(Artifact::Metadata)?;
        env.log.info("Metadata saved.");
        Ok(())
    }
}

fn render(id: &str, title: &str, description: &str, tags: &[String]) -> String {
    format!(
        "ID: {id}\nTitle: {title}\n\nDescription:\n{description}\n\nTags: {}",
        tags.join(", ")
    )
}
