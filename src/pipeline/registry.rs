//! The closed set of pipeline actions and execution order resolution.

use super::actions::{
    DownloadMetadata, DownloadSubtitles, DownloadThumbnail, DownloadVideo, MergeAudio,
    TranslateMetadata, TranslateSubtitles,
};
use super::{RunLogger, Step};
use dubforge_av::Tool;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

/// Identifier of a pipeline action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionId {
    Metadata,
    Video,
    Subtitles,
    TranslateSubtitles,
    TranslateMetadata,
    Thumbnail,
    MergeAudio,
}

impl ActionId {
    pub const ALL: [ActionId; 7] = [
        ActionId::Metadata,
        ActionId::Video,
        ActionId::Subtitles,
        ActionId::TranslateSubtitles,
        ActionId::TranslateMetadata,
        ActionId::Thumbnail,
        ActionId::MergeAudio,
    ];

    /// The action that establishes the base name.
    pub const IDENTITY: ActionId = ActionId::Metadata;

    /// Two-letter key used on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            ActionId::Metadata => "md",
            ActionId::Video => "dv",
            ActionId::Subtitles => "ds",
            ActionId::TranslateSubtitles => "dt",
            ActionId::TranslateMetadata => "tm",
            ActionId::Thumbnail => "th",
            ActionId::MergeAudio => "da",
        }
    }

    /// Long name, also accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            ActionId::Metadata => "metadata",
            ActionId::Video => "video",
            ActionId::Subtitles => "subtitles",
            ActionId::TranslateSubtitles => "translate-subtitles",
            ActionId::TranslateMetadata => "translate-metadata",
            ActionId::Thumbnail => "thumbnail",
            ActionId::MergeAudio => "merge-audio",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionId::Metadata => "Download metadata",
            ActionId::Video => "Download video",
            ActionId::Subtitles => "Download subtitles",
            ActionId::TranslateSubtitles => "Translate subtitles",
            ActionId::TranslateMetadata => "Translate metadata",
            ActionId::Thumbnail => "Download thumbnail",
            ActionId::MergeAudio => "Merge audio",
        }
    }

    /// Look up an action by key or long name.
    ///
    /// Matching ignores case, treats `_` like `-`, and accepts a `download-`
    /// prefix on the download actions.
    pub fn parse(s: &str) -> Option<ActionId> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        let bare = normalized.strip_prefix("download-").unwrap_or(&normalized);
        ActionId::ALL.into_iter().find(|id| {
            id.key() == normalized
                || id.name() == normalized
                || (bare != normalized && id.name() == bare)
        })
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ActionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionId::parse(s).ok_or_else(|| format!("unknown action: {s}"))
    }
}

/// Static description of one action.
pub struct ActionDescriptor {
    pub id: ActionId,
    pub tools: &'static [Tool],
    pub requires_identity: bool,
    pub step: Box<dyn Step>,
}

impl ActionDescriptor {
    pub fn new(
        id: ActionId,
        tools: &'static [Tool],
        requires_identity: bool,
        step: impl Step + 'static,
    ) -> Self {
        Self {
            id,
            tools,
            requires_identity,
            step: Box::new(step),
        }
    }
}

impl fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("id", &self.id)
            .field("tools", &self.tools)
            .field("requires_identity", &self.requires_identity)
            .finish_non_exhaustive()
    }
}

/// Fixed table of available actions.
#[derive(Debug)]
pub struct ActionRegistry {
    descriptors: Vec<ActionDescriptor>,
}

impl ActionRegistry {
    /// Build a registry from explicit descriptors. Later duplicates of an id
    /// are ignored.
    pub fn new(descriptors: Vec<ActionDescriptor>) -> Self {
        let mut seen = BTreeSet::new();
        let descriptors = descriptors
            .into_iter()
            .filter(|d| seen.insert(d.id))
            .collect();
        Self { descriptors }
    }

    /// The built-in action table.
    pub fn builtin() -> Arc<ActionRegistry> {
        static REGISTRY: OnceLock<Arc<ActionRegistry>> = OnceLock::new();
        let registry = REGISTRY.get_or_init(|| {
            use Tool::{Ffmpeg, YtDlp};
            Arc::new(ActionRegistry::new(vec![
                ActionDescriptor::new(ActionId::Metadata, &[YtDlp], false, DownloadMetadata),
                ActionDescriptor::new(ActionId::Video, &[YtDlp, Ffmpeg], true, DownloadVideo),
                ActionDescriptor::new(ActionId::Subtitles, &[YtDlp], true, DownloadSubtitles),
                ActionDescriptor::new(ActionId::TranslateSubtitles, &[], true, TranslateSubtitles),
                ActionDescriptor::new(ActionId::TranslateMetadata, &[], true, TranslateMetadata),
                ActionDescriptor::new(
                    ActionId::Thumbnail,
                    &[YtDlp, Ffmpeg],
                    true,
                    DownloadThumbnail,
                ),
                ActionDescriptor::new(ActionId::MergeAudio, &[Ffmpeg], true, MergeAudio),
            ]))
        });
        Arc::clone(registry)
    }

    pub fn get(&self, id: ActionId) -> Option<&ActionDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    pub fn descriptors(&self) -> &[ActionDescriptor] {
        &self.descriptors
    }

    /// Turn requested identifiers into an execution order.
    ///
    /// Unknown identifiers are logged and dropped, and duplicates keep their
    /// first position. The identity action is placed first whenever it was
    /// requested or any requested action depends on it. Everything else keeps
    /// the caller's relative order.
    pub fn resolve_order<S: AsRef<str>>(&self, requested: &[S], log: &RunLogger) -> Vec<ActionId> {
        let mut seen = BTreeSet::new();
        let mut order = Vec::with_capacity(requested.len());

        for raw in requested {
            let raw = raw.as_ref();
            match ActionId::parse(raw).filter(|id| self.get(*id).is_some()) {
                Some(id) => {
                    if seen.insert(id) {
                        order.push(id);
                    }
                }
                None => log.warn(format!("Unknown action '{}' ignored", raw)),
            }
        }

        let needs_identity = order
            .iter()
            .filter_map(|id| self.get(*id))
            .any(|d| d.requires_identity);

        if (needs_identity && self.get(ActionId::IDENTITY).is_some())
            || order.contains(&ActionId::IDENTITY)
        {
            order.retain(|id| *id != ActionId::IDENTITY);
            order.insert(0, ActionId::IDENTITY);
        }

        order
    }

    /// Union of the tools needed by `order`.
    pub fn required_tools(&self, order: &[ActionId]) -> BTreeSet<Tool> {
        order
            .iter()
            .filter_map(|id| self.get(*id))
            .flat_map(|d| d.tools.iter().copied())
            .collect()
    }
}
