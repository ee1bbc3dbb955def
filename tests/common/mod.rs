//! Shared fakes for integration tests.
//!
//! [`FakeGateway`] stands in for `yt-dlp` and `ffmpeg`: it records every
//! invocation, answers the metadata query with canned JSON and creates the
//! files a real download would have written. [`FakeTranslator`] tags text
//! with the target language.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use dubforge::translate::Translator;
use dubforge_av::{Error, Result, Tool, ToolGateway, ToolOutput};

pub const SAMPLE_VTT: &str = "WEBVTT\n\n00:00:01.000 --> 00:00:03.000\nHello there\n\n00:00:04.000 --> 00:00:06.500\nGeneral Kenobi\n";

/// Metadata JSON for a video with English subtitles and a thumbnail.
pub fn sample_metadata() -> String {
    serde_json::json!({
        "id": "abc123",
        "title": "A Test Video",
        "description": "Just a test.",
        "tags": ["test", "video"],
        "subtitles": {"en": [{"ext": "vtt"}]},
        "thumbnails": [{"url": "https://img.example/abc123.jpg"}]
    })
    .to_string()
}

/// A latch that blocks callers of [`Gate::wait`] until [`Gate::open`].
#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    cv: Condvar,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn wait(&self) {
        let mut open = self.open.lock();
        while !*open {
            self.cv.wait(&mut open);
        }
    }

    pub fn open(&self) {
        *self.open.lock() = true;
        self.cv.notify_all();
    }
}

/// Recording stand-in for the external tools.
pub struct FakeGateway {
    available: BTreeSet<Tool>,
    metadata: Mutex<String>,
    calls: Mutex<Vec<(Tool, Vec<String>)>>,
    failure: Mutex<Option<(Tool, String)>>,
    produce_files: Mutex<bool>,
    gate: Mutex<Option<Arc<Gate>>>,
}

impl FakeGateway {
    /// Every tool is available.
    pub fn new() -> Self {
        Self::with_tools(Tool::ALL)
    }

    pub fn with_tools(tools: impl IntoIterator<Item = Tool>) -> Self {
        Self {
            available: tools.into_iter().collect(),
            metadata: Mutex::new(sample_metadata()),
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            produce_files: Mutex::new(true),
            gate: Mutex::new(None),
        }
    }

    pub fn set_metadata(&self, json: impl Into<String>) {
        *self.metadata.lock() = json.into();
    }

    /// Make every invocation of `tool` exit with status 1 and `stderr`.
    pub fn fail(&self, tool: Tool, stderr: impl Into<String>) {
        *self.failure.lock() = Some((tool, stderr.into()));
    }

    /// Succeed without writing any output file.
    pub fn produce_nothing(&self) {
        *self.produce_files.lock() = false;
    }

    /// Block every invocation until `gate` opens.
    pub fn block_on(&self, gate: Arc<Gate>) {
        *self.gate.lock() = Some(gate);
    }

    pub fn calls(&self) -> Vec<(Tool, Vec<String>)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls_for(&self, tool: Tool) -> usize {
        self.calls.lock().iter().filter(|(t, _)| *t == tool).count()
    }

    fn create_outputs(&self, tool: Tool, args: &[String]) -> Result<()> {
        if !*self.produce_files.lock() {
            return Ok(());
        }
        match tool {
            Tool::YtDlp => {
                let Some(template) = value_after(args, "-o") else {
                    return Ok(());
                };
                let stem = template.trim_end_matches(".%(ext)s");
                let path = if args.iter().any(|a| a == "--write-sub") {
                    let lang = value_after(args, "--sub-lang").unwrap_or("en");
                    let fmt = value_after(args, "--convert-subs").unwrap_or("vtt");
                    PathBuf::from(format!("{stem}.{lang}.{fmt}"))
                } else if args.iter().any(|a| a == "--write-thumbnail") {
                    PathBuf::from(format!("{stem}.jpg"))
                } else {
                    let ext = value_after(args, "--merge-output-format").unwrap_or("mp4");
                    PathBuf::from(format!("{stem}.{ext}"))
                };
                write_fixture(&path)
            }
            Tool::Ffmpeg => match args.last() {
                Some(out) => write_fixture(Path::new(out)),
                None => Ok(()),
            },
        }
    }
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolGateway for FakeGateway {
    fn resolve(&self, tool: Tool) -> Result<PathBuf> {
        if self.available.contains(&tool) {
            Ok(PathBuf::from(format!("/fake/bin/{}", tool.name())))
        } else {
            Err(Error::missing_tool(tool.name()))
        }
    }

    fn invoke(&self, tool: Tool, args: &[String]) -> Result<ToolOutput> {
        self.resolve(tool)?;
        self.calls.lock().push((tool, args.to_vec()));

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.wait();
        }

        if let Some((failing, stderr)) = self.failure.lock().clone() {
            if failing == tool {
                return Err(Error::tool_failed(tool.name(), Some(1), stderr));
            }
        }

        if args.iter().any(|a| a == "--dump-single-json") {
            return Ok(ToolOutput {
                code: Some(0),
                stdout: self.metadata.lock().clone(),
                stderr: String::new(),
            });
        }

        self.create_outputs(tool, args)?;
        Ok(ToolOutput {
            code: Some(0),
            ..Default::default()
        })
    }
}

fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn write_fixture(path: &Path) -> Result<()> {
    let contents = match path.extension().and_then(|e| e.to_str()) {
        Some("vtt") => SAMPLE_VTT,
        _ => "fake media",
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

/// Translator that prefixes text with `[target]`. Text containing `FAIL`
/// yields a translation error.
#[derive(Default)]
pub struct FakeTranslator {
    calls: Mutex<usize>,
}

impl FakeTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

impl Translator for FakeTranslator {
    fn translate(&self, text: &str, _source: &str, target: &str) -> Result<String> {
        *self.calls.lock() += 1;
        if text.contains("FAIL") {
            return Err(Error::translation("backend rejected the text"));
        }
        Ok(format!("[{target}] {text}"))
    }
}
