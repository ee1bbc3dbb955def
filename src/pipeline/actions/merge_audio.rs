use super::target_path;
use crate::pipeline::{Artifact, Step, StepEnv, WorkContext};
use dubforge_av::actions::{mix_audio, MixSpec};
use dubforge_common::{Error, Result};

/// Mix the external audio track over the downloaded video.
pub struct MergeAudio;

impl Step for MergeAudio {
    fn execute(&self, ctx: &mut WorkContext, env: &StepEnv<'_>) -> Result<()> {
        let out_path = target_path(ctx, Artifact::MergedVideo)?;
        if out_path.exists() {
            env.log
                .warn(format!("Merged video already exists: {}", out_path.display()));
            ctx.mark_produced(Artifact::MergedVideo)?;
            return Ok(());
        }

        let video = match ctx.locate(Artifact::Video) {
            Some(p) => p,
            None => {
                let expected = target_path(ctx, Artifact::Video)?;
                return Err(Error::missing_file(expected));
            }
        };

        let audio = match ctx.audio() {
            Some(p) if p.is_file() => p.to_path_buf(),
            Some(p) => return Err(Error::missing_file(p)),
            None => {
                return Err(Error::precondition(
                    "no external audio file was given for merging",
                ))
            }
        };

        let settings = ctx.settings();
        env.log.info(format!(
            "Merging audio (original {}, added {}, codec {})...",
            settings.original_volume, settings.added_volume, settings.merged_audio_codec
        ));

        let spec = MixSpec {
            video: &video,
            audio: &audio,
            output: &out_path,
            original_volume: settings.original_volume,
            added_volume: settings.added_volume,
            codec: &settings.merged_audio_codec,
        };
        mix_audio(env.gateway, &spec)?;

        ctx.mark_produced(Artifact::MergedVideo)?;
        env.log
            .info(format!("Merged video saved: {}", out_path.display()));
        Ok(())
    }
}
