//! Per-run work context and artifact path derivation.
//!
//! Artifact paths are never stored. The context only remembers *which*
//! artifacts a step produced; every path is recomputed from the output
//! directory, the base name and the settings snapshot.

use crate::config::Settings;
use dubforge_common::{Error, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

const META_SUFFIX: &str = "meta";
const META_EXT: &str = "txt";
const MIX_SUFFIX: &str = "mixed";
const THUMBNAIL_EXT: &str = "jpg";
const MAX_BASE_LEN: usize = 100;

/// A file a pipeline step can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Artifact {
    Video,
    Subtitle,
    TranslatedSubtitle,
    Metadata,
    TranslatedMetadata,
    MergedVideo,
    Thumbnail,
}

impl Artifact {
    pub const ALL: [Artifact; 7] = [
        Artifact::Metadata,
        Artifact::TranslatedMetadata,
        Artifact::Video,
        Artifact::Subtitle,
        Artifact::TranslatedSubtitle,
        Artifact::Thumbnail,
        Artifact::MergedVideo,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Artifact::Video => "video",
            Artifact::Subtitle => "subtitles",
            Artifact::TranslatedSubtitle => "translated subtitles",
            Artifact::Metadata => "metadata",
            Artifact::TranslatedMetadata => "translated metadata",
            Artifact::MergedVideo => "merged video",
            Artifact::Thumbnail => "thumbnail",
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Turn a video id or title into a file-name-safe base name.
///
/// Alphanumerics, space, `-` and `_` survive; anything else becomes `_`.
/// Whitespace runs collapse to a single `_`, the result is cut to 100
/// characters, and an empty result falls back to `video`.
pub fn sanitize_base(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let joined = replaced.split_whitespace().collect::<Vec<_>>().join("_");
    let truncated: String = joined.chars().take(MAX_BASE_LEN).collect();
    if truncated.is_empty() {
        "video".to_string()
    } else {
        truncated
    }
}

fn dotted(part: &str) -> String {
    let part = part.trim().trim_start_matches('.');
    if part.is_empty() {
        String::new()
    } else {
        format!(".{part}")
    }
}

/// Mutable state for one pipeline run.
#[derive(Debug, Clone)]
pub struct WorkContext {
    url: String,
    output_dir: PathBuf,
    audio: Option<PathBuf>,
    settings: Settings,

    base: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,

    /// Subtitle languages the source offers, when its metadata listed them.
    pub subtitle_languages: Option<BTreeSet<String>>,
    /// Whether the source offers a thumbnail, when its metadata said.
    pub has_thumbnail: Option<bool>,

    produced: BTreeSet<Artifact>,
}

impl WorkContext {
    pub fn new(
        url: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        audio: Option<PathBuf>,
        settings: Settings,
    ) -> Self {
        Self {
            url: url.into(),
            output_dir: output_dir.into(),
            audio,
            settings,
            base: None,
            title: None,
            description: None,
            tags: Vec::new(),
            subtitle_languages: None,
            has_thumbnail: None,
            produced: BTreeSet::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// External audio file for the mix step.
    pub fn audio(&self) -> Option<&Path> {
        self.audio.as_deref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Sanitised base name, `None` until the identity step has run.
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Sanitise `raw` and use it as the base name.
    pub fn set_base(&mut self, raw: &str) -> &str {
        self.base.insert(sanitize_base(raw))
    }

    /// Build `{output_dir}/{base}{.suffix}{.ext}`.
    ///
    /// Leading dots on `suffix` and `extension` are normalised to exactly
    /// one. When the suffix already ends in the extension it is not repeated.
    /// Returns `None` while the base name is unset.
    pub fn derive(&self, suffix: &str, extension: &str) -> Option<PathBuf> {
        let base = self.base.as_deref()?;
        let suffix = dotted(suffix);
        let extension = dotted(extension);
        let name = if !extension.is_empty() && suffix.ends_with(&extension) {
            format!("{base}{suffix}")
        } else {
            format!("{base}{suffix}{extension}")
        };
        Some(self.output_dir.join(name))
    }

    /// `{base}.meta.txt`, or `{base}.meta.{lang}.txt` for a translation.
    pub fn metadata_path(&self, lang: Option<&str>) -> Option<PathBuf> {
        let suffix = match lang {
            Some(lang) if !lang.trim().is_empty() => format!("{META_SUFFIX}.{}", lang.trim()),
            _ => META_SUFFIX.to_string(),
        };
        self.derive(&suffix, META_EXT)
    }

    /// `{base}.{lang}.{subtitle_format}`; `None` for an empty language.
    pub fn subtitle_path(&self, lang: &str) -> Option<PathBuf> {
        let lang = lang.trim();
        if lang.is_empty() {
            return None;
        }
        self.derive(lang, &self.settings.subtitle_format)
    }

    /// `{base}.{video_format}`
    pub fn video_path(&self) -> Option<PathBuf> {
        self.derive("", &self.settings.video_format)
    }

    /// `{base}.mixed.{video_format}`
    pub fn merged_video_path(&self) -> Option<PathBuf> {
        self.derive(MIX_SUFFIX, &self.settings.video_format)
    }

    /// `{base}.jpg`
    pub fn thumbnail_path(&self) -> Option<PathBuf> {
        self.derive("", THUMBNAIL_EXT)
    }

    /// Where `artifact` lives (or will live) under the current settings.
    pub fn expected_path(&self, artifact: Artifact) -> Option<PathBuf> {
        match artifact {
            Artifact::Video => self.video_path(),
            Artifact::Subtitle => self.subtitle_path(&self.settings.subtitle_lang),
            Artifact::TranslatedSubtitle => self.subtitle_path(&self.settings.target_lang),
            Artifact::Metadata => self.metadata_path(None),
            Artifact::TranslatedMetadata => self.metadata_path(Some(&self.settings.target_lang)),
            Artifact::MergedVideo => self.merged_video_path(),
            Artifact::Thumbnail => self.thumbnail_path(),
        }
    }

    /// Path of `artifact` if a step recorded it as produced.
    pub fn artifact_path(&self, artifact: Artifact) -> Option<PathBuf> {
        if self.produced.contains(&artifact) {
            self.expected_path(artifact)
        } else {
            None
        }
    }

    pub fn is_produced(&self, artifact: Artifact) -> bool {
        self.produced.contains(&artifact)
    }

    /// Record `artifact` as produced and return its path.
    pub fn mark_produced(&mut self, artifact: Artifact) -> Result<PathBuf> {
        let path = self
            .expected_path(artifact)
            .ok_or_else(|| {
                Error::precondition(format!("cannot derive a path for {artifact} yet"))
            })?;
        self.produced.insert(artifact);
        Ok(path)
    }

    /// The recorded artifact, or its derived path when the file is already on
    /// disk (for example from an earlier run).
    pub fn locate(&self, artifact: Artifact) -> Option<PathBuf> {
        self.artifact_path(artifact)
            .or_else(|| self.expected_path(artifact).filter(|p| p.exists()))
    }

    /// Derivable artifact paths that exist on disk.
    pub fn existing_artifacts(&self) -> Vec<(Artifact, PathBuf)> {
        let mut seen = BTreeSet::new();
        Artifact::ALL
            .iter()
            .filter_map(|&a| self.expected_path(a).map(|p| (a, p)))
            .filter(|(_, p)| p.exists() && seen.insert(p.clone()))
            .collect()
    }
}
