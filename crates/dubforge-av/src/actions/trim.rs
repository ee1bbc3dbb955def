//! Stream-copy trimming.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::{Error, Result, Tool, ToolGateway};

fn timecode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{2}):(\d{2}):(\d{2})(?:\.(\d{1,3}))?$").expect("timecode regex is valid")
    })
}

/// Check `HH:MM:SS` / `HH:MM:SS.mmm` (one to three fraction digits).
pub fn is_valid_timecode(s: &str) -> bool {
    timecode_re().is_match(s)
}

/// Parse a timecode into milliseconds.
pub fn parse_timecode(s: &str) -> Option<u64> {
    let caps = timecode_re().captures(s)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());
    let (h, m, sec) = (field(1)?, field(2)?, field(3)?);
    if m >= 60 || sec >= 60 {
        return None;
    }
    let ms = match caps.get(4) {
        Some(frac) => {
            let digits = frac.as_str();
            let value: u64 = digits.parse().ok()?;
            value * 10u64.pow(3 - digits.len() as u32)
        }
        None => 0,
    };
    Some(((h * 60 + m) * 60 + sec) * 1000 + ms)
}

/// Default output name: `movie.mp4` becomes `movie_trimmed_00-01-00_00-05-30.mp4`.
pub fn trimmed_filename(input: &Path, start: &str, end: &str) -> PathBuf {
    let clean = |t: &str| t.replace([':', '.'], "-");
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!(
            "{stem}_trimmed_{}_{}.{}",
            clean(start),
            clean(end),
            ext.to_string_lossy()
        ),
        None => format!("{stem}_trimmed_{}_{}", clean(start), clean(end)),
    };
    input.with_file_name(name)
}

/// A single trim request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimSpec {
    /// Source media.
    pub input: PathBuf,
    /// Destination file.
    pub output: PathBuf,
    /// Start timecode.
    pub start: String,
    /// End timecode.
    pub end: String,
}

impl TrimSpec {
    /// Check the request without touching any tool.
    ///
    /// Timecodes must be well formed and describe a non-empty range; the input
    /// must exist.
    pub fn validate(&self) -> Result<()> {
        let start = parse_timecode(&self.start)
            .ok_or_else(|| Error::config(format!("invalid start time: {}", self.start)))?;
        let end = parse_timecode(&self.end)
            .ok_or_else(|| Error::config(format!("invalid end time: {}", self.end)))?;
        if end <= start {
            return Err(Error::config(format!(
                "end time {} is not after start time {}",
                self.end, self.start
            )));
        }
        if !self.input.is_file() {
            return Err(Error::missing_file(&self.input));
        }
        Ok(())
    }

    /// ffmpeg argument vector (stream copy, no re-encode).
    pub fn args(&self) -> Vec<String> {
        vec![
            "-y".into(),
            "-i".into(),
            self.input.to_string_lossy().into_owned(),
            "-ss".into(),
            self.start.clone(),
            "-to".into(),
            self.end.clone(),
            "-c".into(),
            "copy".into(),
            self.output.to_string_lossy().into_owned(),
        ]
    }
}

/// Validate `spec`, create the output directory and run ffmpeg.
pub fn trim(gateway: &dyn ToolGateway, spec: &TrimSpec) -> Result<()> {
    spec.validate()?;

    if let Some(dir) = spec.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| Error::artifact_write(dir, e))?;
    }

    gateway.invoke(Tool::Ffmpeg, &spec.args())?;

    if !spec.output.exists() {
        return Err(Error::artifact_missing(&spec.output));
    }
    Ok(())
}
