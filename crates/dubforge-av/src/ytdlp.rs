//! `yt-dlp` invocations and output parsing.
//!
//! Argument vectors are built here so pipeline steps only decide *whether* to
//! call the downloader, never *how*. The output template is always
//! `{dir}/{base}.%(ext)s`, which makes the downloader write files whose names
//! match the pipeline's own path derivation.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

/// Phrases the downloader prints when a video simply has no subtitles.
const NO_SUBTITLE_PHRASES: &[&str] = &[
    "unable to download subtitle",
    "no subtitles found",
    "there are no subtitles",
];

/// Phrases the downloader prints when a video simply has no thumbnail.
const NO_THUMBNAIL_PHRASES: &[&str] = &[
    "no thumbnails found",
    "unable to download thumbnail",
    "there are no thumbnails",
];

/// Subset of the `--dump-single-json` document the pipeline cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInfo {
    /// Extractor-specific video id.
    #[serde(default)]
    pub id: Option<String>,
    /// Video title.
    #[serde(default)]
    pub title: Option<String>,
    /// Video description.
    #[serde(default)]
    pub description: Option<String>,
    /// Tags; the downloader emits `null` when there are none.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Uploaded (non-automatic) subtitles, keyed by language code.
    #[serde(default)]
    pub subtitles: Option<serde_json::Map<String, serde_json::Value>>,
    /// Available thumbnails.
    #[serde(default)]
    pub thumbnails: Option<Vec<serde_json::Value>>,
    /// Single best thumbnail URL (older extractors only set this).
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl VideoInfo {
    /// Parse the downloader's JSON dump.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::unexpected(format!("failed to parse yt-dlp metadata: {e}")))
    }

    /// Languages with uploaded subtitles, if the document lists them at all.
    pub fn subtitle_languages(&self) -> Option<BTreeSet<String>> {
        self.subtitles
            .as_ref()
            .map(|subs| subs.keys().cloned().collect())
    }

    /// Whether the source offers a thumbnail, if the document says.
    pub fn has_thumbnail(&self) -> Option<bool> {
        match (&self.thumbnails, &self.thumbnail) {
            (Some(list), _) if !list.is_empty() => Some(true),
            (_, Some(url)) if !url.is_empty() => Some(true),
            (Some(_), _) => Some(false),
            _ => None,
        }
    }
}

fn output_template(dir: &Path, base: &str) -> String {
    dir.join(format!("{base}.%(ext)s")).to_string_lossy().into_owned()
}

/// Fetch metadata as a single JSON document without downloading media.
pub fn metadata_args(url: &str) -> Vec<String> {
    vec![
        "--no-playlist".into(),
        "--dump-single-json".into(),
        "--skip-download".into(),
        url.into(),
    ]
}

/// Download the primary media, merged and remuxed into `container`.
pub fn video_args(url: &str, dir: &Path, base: &str, format: &str, container: &str) -> Vec<String> {
    vec![
        "--no-playlist".into(),
        "--format".into(),
        format.into(),
        "--merge-output-format".into(),
        container.into(),
        "--remux-video".into(),
        container.into(),
        "-o".into(),
        output_template(dir, base),
        url.into(),
    ]
}

/// Download uploaded subtitles for `lang`, converted to `format`.
pub fn subtitle_args(url: &str, dir: &Path, base: &str, lang: &str, format: &str) -> Vec<String> {
    vec![
        "--no-playlist".into(),
        "--skip-download".into(),
        "--write-sub".into(),
        "--sub-lang".into(),
        lang.into(),
        "--convert-subs".into(),
        format.into(),
        "-o".into(),
        output_template(dir, base),
        url.into(),
    ]
}

/// Download the thumbnail, converted to JPEG.
pub fn thumbnail_args(url: &str, dir: &Path, base: &str) -> Vec<String> {
    vec![
        "--no-playlist".into(),
        "--skip-download".into(),
        "--write-thumbnail".into(),
        "--convert-thumbnails".into(),
        "jpg".into(),
        "-o".into(),
        output_template(dir, base),
        url.into(),
    ]
}

/// Whether a failed invocation only means "this video has no subtitles".
///
/// This matches free text from one downloader version and is a fallback;
/// prefer [`VideoInfo::subtitle_languages`].
pub fn reports_no_subtitles(err: &Error) -> bool {
    stderr_mentions(err, NO_SUBTITLE_PHRASES)
}

/// Whether a failed invocation only means "this video has no thumbnail".
pub fn reports_no_thumbnail(err: &Error) -> bool {
    stderr_mentions(err, NO_THUMBNAIL_PHRASES)
}

fn stderr_mentions(err: &Error, phrases: &[&str]) -> bool {
    match err {
        Error::ToolFailed { stderr, .. } => {
            let stderr = stderr.to_lowercase();
            phrases.iter().any(|p| stderr.contains(p))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document() {
        let info = VideoInfo::parse(
            r#"{
                "id": "dQw4w9WgXcQ",
                "title": "Never Gonna",
                "description": "classic",
                "tags": ["music", "80s"],
                "subtitles": {"en": [], "de": []},
                "thumbnails": [{"url": "https://i.example/1.jpg"}],
                "formats": []
            }"#,
        )
        .unwrap();
        assert_eq!(info.id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(info.tags.clone().unwrap_or_default(), vec!["music", "80s"]);
        let langs = info.subtitle_languages().unwrap();
        assert!(langs.contains("en") && langs.contains("de"));
        assert_eq!(info.has_thumbnail(), Some(true));
    }

    #[test]
    fn null_fields_are_tolerated() {
        let info = VideoInfo::parse(r#"{"id": "x", "tags": null, "description": null}"#).unwrap();
        assert!(info.tags.is_none());
        assert!(info.subtitle_languages().is_none());
        assert_eq!(info.has_thumbnail(), None);
    }

    #[test]
    fn empty_thumbnail_list_means_none_available() {
        let info = VideoInfo::parse(r#"{"thumbnails": []}"#).unwrap();
        assert_eq!(info.has_thumbnail(), Some(false));
    }

    #[test]
    fn invalid_json_is_unexpected() {
        let err = VideoInfo::parse("not json").unwrap_err();
        assert!(err.is_unexpected());
    }

    #[test]
    fn subtitle_args_use_shared_template() {
        let args = subtitle_args("https://v", Path::new("/out"), "abc", "en", "vtt");
        let o = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(args[o + 1], "/out/abc.%(ext)s");
        assert_eq!(args.last().unwrap(), "https://v");
    }

    #[test]
    fn video_args_pin_container() {
        let args = video_args("https://v", Path::new("/out"), "abc", "best", "mkv");
        assert!(args.windows(2).any(|w| w[0] == "--merge-output-format" && w[1] == "mkv"));
        assert!(args.windows(2).any(|w| w[0] == "--remux-video" && w[1] == "mkv"));
    }

    #[test]
    fn stderr_fallback_only_for_tool_failures() {
        let err = Error::tool_failed(
            "yt-dlp",
            Some(1),
            "WARNING: There are no subtitles for the requested languages",
        );
        assert!(reports_no_subtitles(&err));
        assert!(!reports_no_thumbnail(&err));

        let err = Error::tool_failed("yt-dlp", Some(1), "ERROR: Unable to download thumbnail");
        assert!(reports_no_thumbnail(&err));

        assert!(!reports_no_subtitles(&Error::missing_tool("yt-dlp")));
    }
}
