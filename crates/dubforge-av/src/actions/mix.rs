//! Audio mixing.

use std::path::Path;

use crate::{Error, Result, Tool, ToolGateway};

/// Inputs for mixing an external audio track over a video's own audio.
#[derive(Debug, Clone)]
pub struct MixSpec<'a> {
    /// Video whose picture is copied and whose audio is the first mix input.
    pub video: &'a Path,
    /// External audio file, the second mix input.
    pub audio: &'a Path,
    /// Destination file.
    pub output: &'a Path,
    /// Gain applied to the video's own audio (0.0 mutes it).
    pub original_volume: f64,
    /// Gain applied to the external audio.
    pub added_volume: f64,
    /// Audio codec for the mixed track.
    pub codec: &'a str,
}

/// Build the ffmpeg argument vector for `spec`.
///
/// The mix lasts as long as the video's audio (`duration=first`) and the
/// video stream is copied untouched.
pub fn mix_args(spec: &MixSpec<'_>) -> Vec<String> {
    let filter = format!(
        "[0:a]volume={}[a0];[1:a]volume={}[a1];[a0][a1]amix=inputs=2:duration=first[aout]",
        spec.original_volume, spec.added_volume
    );
    vec![
        "-y".into(),
        "-i".into(),
        spec.video.to_string_lossy().into_owned(),
        "-i".into(),
        spec.audio.to_string_lossy().into_owned(),
        "-filter_complex".into(),
        filter,
        "-map".into(),
        "0:v".into(),
        "-map".into(),
        "[aout]".into(),
        "-c:v".into(),
        "copy".into(),
        "-c:a".into(),
        spec.codec.into(),
        spec.output.to_string_lossy().into_owned(),
    ]
}

/// Run the mix. The output file must exist afterwards.
pub fn mix_audio(gateway: &dyn ToolGateway, spec: &MixSpec<'_>) -> Result<()> {
    if !spec.video.exists() {
        return Err(Error::missing_file(spec.video));
    }
    if !spec.audio.exists() {
        return Err(Error::missing_file(spec.audio));
    }

    #[cfg(feature = "tracing")]
    tracing::info!(
        "Mixing {} + {} -> {}",
        spec.video.display(),
        spec.audio.display(),
        spec.output.display()
    );

    gateway.invoke(Tool::Ffmpeg, &mix_args(spec))?;

    if !spec.output.exists() {
        return Err(Error::artifact_missing(spec.output));
    }
    Ok(())
}
