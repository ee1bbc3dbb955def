//! Text translation backends.

use crate::config::TranslatorConfig;
use dubforge_common::{Error, Result};
use std::time::Duration;

/// Longest text sent in a single request; longer input is split on line breaks.
const MAX_CHUNK_CHARS: usize = 4500;

/// Translates text between two languages.
///
/// Failures surface as [`Error::Translation`], which callers treat as
/// recoverable for a single unit of text.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;
}

/// Client for the public Google `translate_a/single` endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("dubforge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    fn request(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let body = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| Error::translation(format!("request failed: {e}")))?;

        parse_response(&body)
    }
}

impl Translator for GoogleTranslator {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        let mut out = String::with_capacity(text.len());
        for chunk in split_chunks(text, MAX_CHUNK_CHARS) {
            out.push_str(&self.request(chunk, source, target)?);
        }
        Ok(out)
    }
}

/// Extract the translated text from the endpoint's nested array response.
///
/// The first element is a list of segments; the first item of each segment
/// is a translated piece. Pieces are concatenated in order.
pub fn parse_response(body: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| Error::translation(format!("malformed response: {e}")))?;

    let segments = value
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| Error::translation("response has no translation segments"))?;

    let text: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() {
        return Err(Error::translation("response contained an empty translation"));
    }
    Ok(text)
}

/// Split `text` into pieces of at most `max` characters, breaking after a
/// newline where possible.
fn split_chunks(text: &str, max: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;
    while rest.chars().count() > max {
        let limit = rest
            .char_indices()
            .nth(max)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let cut = rest[..limit]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(limit);
        let (head, tail) = rest.split_at(cut);
        chunks.push(head);
        rest = tail;
    }
    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_segmented_response() {
        let body = r#"[[["Привет, ","Hello, ",null,null,10],["мир","world",null,null,10]],null,"en"]"#;
        assert_eq!(parse_response(body).unwrap(), "Привет, мир");
    }

    #[test]
    fn malformed_response_is_translation_error() {
        assert_matches!(parse_response("<html>"), Err(Error::Translation(_)));
        assert_matches!(parse_response("{}"), Err(Error::Translation(_)));
        assert_matches!(parse_response("[[]]"), Err(Error::Translation(_)));
    }

    #[test]
    fn chunks_break_on_newlines() {
        let text = "aaaa\nbbbb\ncccc";
        let chunks = split_chunks(text, 6);
        assert_eq!(chunks, vec!["aaaa\n", "bbbb\n", "cccc"]);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn chunks_hard_split_without_newlines() {
        let chunks = split_chunks("abcdefgh", 3);
        assert_eq!(chunks, vec!["abc", "def", "gh"]);
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_chunks("hi", 10), vec!["hi"]);
    }
}
