use super::{target_path, write_artifact};
use crate::pipeline::{Artifact, Step, StepEnv, WorkContext};
use crate::subtitles::{self, SubtitleFormat};
use dubforge_common::{Error, Result};

/// Progress is logged every this many translated cues.
const PROGRESS_EVERY: usize = 50;

/// Translate the downloaded subtitles cue by cue.
pub struct TranslateSubtitles;

impl Step for TranslateSubtitles {
    fn execute(&self, ctx: &mut WorkContext, env: &StepEnv<'_>) -> Result<()> {
        let src = ctx.settings().source_lang.clone();
        let tgt = ctx.settings().target_lang.clone();
        if src == tgt {
            env.log.warn(format!(
                "Source and target language are both '{}', skipping subtitle translation.",
                src
            ));
            return Ok(());
        }

        let out_path = target_path(ctx, Artifact::TranslatedSubtitle)?;
        if out_path.exists() {
            env.log.warn(format!(
                "Translated subtitles already exist: {}",
                out_path.display()
            ));
            ctx.mark_produced(Artifact::TranslatedSubtitle)?;
            return Ok(());
        }

        let Some(source_path) = ctx.locate(Artifact::Subtitle) else {
            env.log.warn("No source subtitles to translate.");
            return Ok(());
        };

        let format: SubtitleFormat = ctx.settings().subtitle_format.parse()?;

        env.log.info(format!(
            "Loading subtitles for translation: {}",
            source_path.display()
        ));
        let content = std::fs::read_to_string(&source_path).map_err(|e| {
            Error::unexpected(format!("failed to read {}: {e}", source_path.display()))
        })?;
        let mut cues = subtitles::parse(&content);
        let total = cues.len();
        let mut translated = 0usize;

        for cue in cues.iter_mut() {
            let text = cue.text.trim();
            if text.is_empty() {
                continue;
            }
            match env.translator.translate(&text.replace('\n', " "), &src, &tgt) {
                Ok(t) => {
                    cue.text = t.trim().to_string();
                    translated += 1;
                    if translated % PROGRESS_EVERY == 0 {
                        env.log
                            .debug(format!("Translated {translated}/{total} cues..."));
                    }
                }
                Err(e) => {
                    let preview: String = text.chars().take(30).collect();
                    env.log
                        .error(format!("Failed to translate '{preview}...': {e}"));
                }
            }
        }

        if translated == 0 {
            env.log.warn("No subtitle cues could be translated.");
            return Ok(());
        }

        write_artifact(&out_path, &subtitles::write(&cues, format))?;
        ctx.mark_produced(Artifact::TranslatedSubtitle)?;
        env.log.info(format!(
            "Translated subtitles saved: {} ({}/{} cues)",
            out_path.display(),
            translated,
            total
        ));
        Ok(())
    }
}
