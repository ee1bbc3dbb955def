//! Media processing actions.
//!
//! - Mixing an external audio track into a video
//! - Cutting a media file between two timecodes

mod mix;
mod trim;

pub use mix::{mix_args, mix_audio, MixSpec};
pub use trim::{is_valid_timecode, parse_timecode, trim, trimmed_filename, TrimSpec};
