use dubforge_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use dubforge_av::ToolPaths;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub tools: ToolPaths,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub translator: TranslatorConfig,
}

/// Per-run processing settings.
///
/// A run takes one snapshot of this value when it starts and never sees later
/// edits. Build it through [`Settings::validate`] (the config loader does) so
/// formats are normalised and volumes are known to be usable.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Language the source material is in.
    #[serde(default = "default_source_lang")]
    pub source_lang: String,

    /// Language to translate into.
    #[serde(default = "default_target_lang")]
    pub target_lang: String,

    /// Language of the subtitles to download.
    #[serde(default = "default_subtitle_lang")]
    pub subtitle_lang: String,

    /// Subtitle file format (`vtt` or `srt`).
    #[serde(default = "default_subtitle_format")]
    pub subtitle_format: String,

    /// Container extension of the downloaded and merged video.
    #[serde(default = "default_video_format")]
    pub video_format: String,

    /// yt-dlp format selector.
    #[serde(default = "default_download_format")]
    pub download_format: String,

    /// Gain for the video's own audio when mixing.
    #[serde(default = "default_original_volume")]
    pub original_volume: f64,

    /// Gain for the external audio when mixing.
    #[serde(default = "default_added_volume")]
    pub added_volume: f64,

    /// Codec of the mixed audio track.
    #[serde(default = "default_merged_audio_codec")]
    pub merged_audio_codec: String,
}

fn default_source_lang() -> String {
    "en".to_string()
}
fn default_target_lang() -> String {
    "ru".to_string()
}
fn default_subtitle_lang() -> String {
    "en".to_string()
}
fn default_subtitle_format() -> String {
    "vtt".to_string()
}
fn default_video_format() -> String {
    "mp4".to_string()
}
fn default_download_format() -> String {
    "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best".to_string()
}
fn default_original_volume() -> f64 {
    0.0
}
fn default_added_volume() -> f64 {
    1.0
}
fn default_merged_audio_codec() -> String {
    "aac".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            subtitle_lang: default_subtitle_lang(),
            subtitle_format: default_subtitle_format(),
            video_format: default_video_format(),
            download_format: default_download_format(),
            original_volume: default_original_volume(),
            added_volume: default_added_volume(),
            merged_audio_codec: default_merged_audio_codec(),
        }
    }
}

impl Settings {
    /// Normalise and check the settings, consuming them.
    ///
    /// Strings are trimmed, a leading `.` is removed from both formats, and
    /// every field must be non-empty. Volumes must be finite and non-negative.
    pub fn validate(mut self) -> Result<Self> {
        for field in [
            &mut self.source_lang,
            &mut self.target_lang,
            &mut self.subtitle_lang,
            &mut self.download_format,
            &mut self.merged_audio_codec,
        ] {
            *field = field.trim().to_string();
        }
        self.subtitle_format = normalize_format(&self.subtitle_format);
        self.video_format = normalize_format(&self.video_format);

        let required = [
            ("source_lang", &self.source_lang),
            ("target_lang", &self.target_lang),
            ("subtitle_lang", &self.subtitle_lang),
            ("subtitle_format", &self.subtitle_format),
            ("video_format", &self.video_format),
            ("download_format", &self.download_format),
            ("merged_audio_codec", &self.merged_audio_codec),
        ];
        for (name, value) in required {
            if value.is_empty() {
                return Err(Error::config(format!("settings.{name} cannot be empty")));
            }
        }

        for (name, value) in [
            ("original_volume", self.original_volume),
            ("added_volume", self.added_volume),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::config(format!(
                    "settings.{name} must be a non-negative number, got {value}"
                )));
            }
        }

        Ok(self)
    }
}

fn normalize_format(format: &str) -> String {
    format.trim().trim_start_matches('.').to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory all artifacts are written to.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("video_output")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslatorConfig {
    /// Translation endpoint (Google `translate_a/single` compatible).
    #[serde(default = "default_translator_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_translator_timeout")]
    pub timeout_secs: u64,
}

fn default_translator_endpoint() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_translator_timeout() -> u64 {
    30
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_translator_endpoint(),
            timeout_secs: default_translator_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.source_lang, "en");
        assert_eq!(s.target_lang, "ru");
        assert_eq!(s.subtitle_lang, "en");
        assert_eq!(s.subtitle_format, "vtt");
        assert_eq!(s.video_format, "mp4");
        assert_eq!(s.original_volume, 0.0);
        assert_eq!(s.added_volume, 1.0);
        assert_eq!(s.merged_audio_codec, "aac");
        assert!(s.clone().validate().is_ok());
    }

    #[test]
    fn formats_lose_leading_dot() {
        let s = Settings {
            subtitle_format: ".srt".into(),
            video_format: " .mkv ".into(),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(s.subtitle_format, "srt");
        assert_eq!(s.video_format, "mkv");
    }

    #[test]
    fn invalid_volumes_rejected() {
        for bad in [-0.5, f64::NAN, f64::INFINITY] {
            let s = Settings {
                added_volume: bad,
                ..Default::default()
            };
            assert_matches!(s.validate(), Err(Error::Config(_)));
        }
    }

    #[test]
    fn empty_language_rejected() {
        let s = Settings {
            target_lang: "  ".into(),
            ..Default::default()
        };
        assert_matches!(s.validate(), Err(Error::Config(msg)) if msg.contains("target_lang"));
    }

    #[test]
    fn unknown_settings_key_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str(
            r#"
            [settings]
            target_lang = "de"
            colour = "blue"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [settings]
            target_lang = "de"

            [output]
            dir = "/tmp/out"
            "#,
        )
        .unwrap();
        assert_eq!(config.settings.target_lang, "de");
        assert_eq!(config.settings.source_lang, "en");
        assert_eq!(config.output.dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.translator.timeout_secs, 30);
        assert!(config.tools.yt_dlp_path.is_none());
    }
}
