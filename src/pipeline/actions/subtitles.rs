use super::{base_name, ensure_dir, target_path};
use crate::pipeline::{Artifact, Step, StepEnv, WorkContext};
use dubforge_av::{ytdlp, Tool};
use dubforge_common::{Error, Result};
use std::path::{Path, PathBuf};

/// Download uploaded subtitles in the configured language and format.
pub struct DownloadSubtitles;

impl Step for DownloadSubtitles {
    fn execute(&self, ctx: &mut WorkContext, env: &StepEnv<'_>) -> Result<()> {
        let path = target_path(ctx, Artifact::Subtitle)?;
        if path.exists() {
            env.log
                .warn(format!("Subtitles already exist: {}", path.display()));
            ctx.mark_produced(Artifact::Subtitle)?;
            return Ok(());
        }

        let lang = ctx.settings().subtitle_lang.clone();
        let format = ctx.settings().subtitle_format.clone();

        if let Some(ref offered) = ctx.subtitle_languages {
            if !offered.contains(&lang) {
                env.log
                    .warn(format!("The source offers no '{lang}' subtitles, skipping."));
                return Ok(());
            }
        }

        ensure_dir(ctx.output_dir())?;
        let base = base_name(ctx)?;
        env.log
            .info(format!("Downloading subtitles ({lang}, {format})..."));

        let args = ytdlp::subtitle_args(ctx.url(), ctx.output_dir(), &base, &lang, &format);
        match env.gateway.invoke(Tool::YtDlp, &args) {
            Ok(_) => {}
            Err(e) if ytdlp::reports_no_subtitles(&e) => {
                env.log
                    .warn(format!("Subtitles for '{lang}' are not available."));
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        if path.exists() {
            ctx.mark_produced(Artifact::Subtitle)?;
            env.log.info(format!("Subtitles saved: {}", path.display()));
            return Ok(());
        }

        let exclude = ctx.expected_path(Artifact::TranslatedSubtitle);
        match find_candidate(ctx.output_dir(), &base, &format, exclude.as_deref()) {
            Some(found) => {
                std::fs::rename(&found, &path).map_err(|e| Error::artifact_write(&path, e))?;
                ctx.mark_produced(Artifact::Subtitle)?;
                env.log
                    .info(format!("Subtitles renamed to: {}", path.display()));
            }
            None => env.log.warn("Subtitle file not found after download."),
        }
        Ok(())
    }
}

/// First `{base}*.{format}` file in `dir`, in name order.
fn find_candidate(dir: &Path, base: &str, format: &str, exclude: Option<&Path>) -> Option<PathBuf> {
    let suffix = format!(".{format}");
    let mut matches: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && Some(p.as_path()) != exclude)
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(base) && n.ends_with(&suffix))
        })
        .collect();
    matches.sort();
    matches.into_iter().next()
}
