use super::{target_path, write_artifact};
use crate::pipeline::{Artifact, Step, StepEnv, WorkContext};
use dubforge_common::Result;

/// Translate title, description and tags into the target language.
pub struct TranslateMetadata;

impl Step for TranslateMetadata {
    fn execute(&self, ctx: &mut WorkContext, env: &StepEnv<'_>) -> Result<()> {
        let src = ctx.settings().source_lang.clone();
        let tgt = ctx.settings().target_lang.clone();
        if src == tgt {
            env.log.warn(format!(
                "Source and target language are both '{}', skipping metadata translation.",
                src
            ));
            return Ok(());
        }

        let out_path = target_path(ctx, Artifact::TranslatedMetadata)?;
        if out_path.exists() {
            env.log.warn(format!(
                "Translated metadata already exists: {}",
                out_path.display()
            ));
            ctx.mark_produced(Artifact::TranslatedMetadata)?;
            return Ok(());
        }

        let title = ctx.title.clone().unwrap_or_default();
        let description = ctx.description.clone().unwrap_or_default();
        let tags = ctx.tags.clone();

        if title.is_empty() && description.is_empty() && tags.is_empty() {
            env.log.info("No metadata to translate.");
            return Ok(());
        }

        env.log
            .info(format!("Translating metadata from '{src}' to '{tgt}'..."));

        let translate = |what: &str, text: &str| -> Option<String> {
            match env.translator.translate(text, &src, &tgt) {
                Ok(t) if !t.trim().is_empty() => Some(t),
                Ok(_) => None,
                Err(e) => {
                    env.log.error(format!("Failed to translate {what}: {e}"));
                    None
                }
            }
        };

        let t_title = if title.is_empty() {
            None
        } else {
            translate("title", title.as_str())
        };
        let t_description = if description.is_empty() {
            None
        } else {
            translate("description", description.as_str())
        };
        let t_tags: Vec<String> = tags
            .iter()
            .filter(|tag| !tag.trim().is_empty())
            .filter_map(|tag| translate(&format!("tag '{}'", tag), tag.as_str()))
            .collect();

        if t_title.is_none() && t_description.is_none() && t_tags.is_empty() {
            env.log
                .warn("Nothing was translated, metadata file not written.");
            return Ok(());
        }

        let text = format!(
            "Title: {}\n\nDescription:\n{}\n\nTags: {}",
            t_title.unwrap_or_default(),
            t_description.unwrap_or_default(),
            t_tags.join(", ")
        );
        write_artifact(&out_path, &text)?;
        ctx.mark_produced(Artifact::TranslatedMetadata)?;
        env.log.info(format!(
            "Translated metadata saved: {}",
            out_path.display()
        ));
        Ok(())
    }
}
