// Pipeline steps, one per action
mod merge_audio;
mod metadata;
mod subtitles;
mod thumbnail;
mod translate_metadata;
mod translate_subtitles;
mod video;

pub use merge_audio::MergeAudio;
pub use metadata::DownloadMetadata;
pub use subtitles::DownloadSubtitles;
pub use thumbnail::DownloadThumbnail;
pub use translate_metadata::TranslateMetadata;
pub use translate_subtitles::TranslateSubtitles;
pub use video::DownloadVideo;

use super::{Artifact, WorkContext};
use dubforge_common::{Error, Result};
use std::path::{Path, PathBuf};

/// Create `dir` if it does not exist.
pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| Error::artifact_write(dir, e))
}

/// Write `contents` to `path`, creating the parent directory first.
pub(crate) fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    std::fs::write(path, contents).map_err(|e| Error::artifact_write(path, e))
}

/// Expected path of `artifact`, or a precondition error while it is not
/// derivable.
pub(crate) fn target_path(ctx: &WorkContext, artifact: Artifact) -> Result<PathBuf> {
    ctx.expected_path(artifact)
        .ok_or_else(|| Error::precondition(format!("no base name to derive the {artifact} path")))
}

/// Base name, or a precondition error when the identity step has not run.
pub(crate) fn base_name(ctx: &WorkContext) -> Result<String> {
    ctx.base()
        .map(str::to_string)
        .ok_or_else(|| Error::precondition("base name is not set"))
}
