//! WebVTT and SubRip reading and writing.
//!
//! Cues keep their timing in integer milliseconds. Both formats share the
//! `start --> end` timing line and differ in the fraction separator (`.` for
//! WebVTT, `,` for SubRip), the WebVTT header, and SubRip's cue numbering.

use dubforge_common::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A subtitle file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Vtt,
    Srt,
}

impl SubtitleFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Vtt => "vtt",
            SubtitleFormat::Srt => "srt",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for SubtitleFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "vtt" | "webvtt" => Ok(SubtitleFormat::Vtt),
            "srt" => Ok(SubtitleFormat::Srt),
            other => Err(Error::config(format!("unsupported subtitle format: {other}"))),
        }
    }
}

/// One timed subtitle entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub start_ms: u64,
    pub end_ms: u64,
    /// WebVTT cue settings (`align:start position:10%`), kept verbatim.
    pub settings: Option<String>,
    pub text: String,
}

/// Parse WebVTT or SubRip content.
///
/// The format is not needed up front: blocks without a timing line (the
/// WebVTT header, `NOTE`, `STYLE` and `REGION` blocks, stray numbering) are
/// skipped, and both fraction separators are accepted.
pub fn parse(content: &str) -> Vec<Cue> {
    let content = content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let mut cues = Vec::new();
    for block in content.split("\n\n") {
        let lines: Vec<&str> = block.lines().filter(|l| !l.trim().is_empty()).collect();
        let Some(idx) = lines.iter().position(|l| l.contains("-->")) else {
            continue;
        };
        if lines[0].starts_with("NOTE") || lines[0].starts_with("STYLE") {
            continue;
        }
        let Some((start_ms, end_ms, settings)) = parse_timing(lines[idx]) else {
            continue;
        };
        cues.push(Cue {
            start_ms,
            end_ms,
            settings,
            text: lines[idx + 1..].join("\n"),
        });
    }
    cues
}

fn parse_timing(line: &str) -> Option<(u64, u64, Option<String>)> {
    let (start, rest) = line.split_once("-->")?;
    let rest = rest.trim();
    let (end, settings) = match rest.split_once(char::is_whitespace) {
        Some((end, settings)) => (end, Some(settings.trim().to_string())),
        None => (rest, None),
    };
    Some((
        parse_time(start)?,
        parse_time(end)?,
        settings.filter(|s| !s.is_empty()),
    ))
}

/// Parse `HH:MM:SS,mmm`, `HH:MM:SS.mmm` or the WebVTT short form `MM:SS.mmm`
/// into milliseconds.
pub fn parse_time(s: &str) -> Option<u64> {
    let s = s.trim().replace(',', ".");
    let (clock, frac) = match s.split_once('.') {
        Some((clock, frac)) => (clock, frac),
        None => (s.as_str(), ""),
    };

    let parts: Vec<u64> = clock
        .split(':')
        .map(|p| p.parse().ok())
        .collect::<Option<_>>()?;
    let (h, m, sec) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => (0, *m, *s),
        _ => return None,
    };

    let millis = if frac.is_empty() {
        0
    } else {
        let digits: String = frac.chars().take(3).collect();
        let value: u64 = digits.parse().ok()?;
        value * 10u64.pow(3 - digits.len() as u32)
    };

    Some(((h * 60 + m) * 60 + sec) * 1000 + millis)
}

/// Format milliseconds with the format's fraction separator.
pub fn format_time(ms: u64, format: SubtitleFormat) -> String {
    let millis = ms % 1000;
    let total_secs = ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;
    let sep = match format {
        SubtitleFormat::Vtt => '.',
        SubtitleFormat::Srt => ',',
    };
    format!("{hours:02}:{mins:02}:{secs:02}{sep}{millis:03}")
}

/// Serialise cues. SubRip output drops WebVTT cue settings.
pub fn write(cues: &[Cue], format: SubtitleFormat) -> String {
    let mut output = String::new();
    if format == SubtitleFormat::Vtt {
        output.push_str("WEBVTT\n\n");
    }

    for (i, cue) in cues.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        if format == SubtitleFormat::Srt {
            output.push_str(&format!("{}\n", i + 1));
        }
        output.push_str(&format_time(cue.start_ms, format));
        output.push_str(" --> ");
        output.push_str(&format_time(cue.end_ms, format));
        if let (SubtitleFormat::Vtt, Some(settings)) = (format, &cue.settings) {
            output.push(' ');
            output.push_str(settings);
        }
        output.push('\n');
        output.push_str(&cue.text);
        output.push('\n');
    }

    output
}
