//! Animation tag heuristics
//!
//! Animation tracks are named `<action><nn><model><bone>_TRACK`, e.g.
//! `C01HUMCH_TRACK`: action class `C`, sequence `01`, model `HUM`, bone `CH`.
//! Nothing in the container marks a track as animation, so this is a guess
//! from the tag alone and may fail without affecting the decode.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Tag suffixes that name the record kind rather than the model
const KIND_SUFFIXES: [&str; 4] = ["_DMSPRITEDEF", "_ACTORDEF", "_TRACKDEF", "_TRACK"];

static SEQUENCE_TAG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([CDLOPST](?:0[1-9]|[1-9][0-9]))([A-Z]{3})").ok());

/// An animation recovered from a track tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    /// Action class and number, e.g. `C01`
    pub animation: String,
    /// Three-letter model code, e.g. `HUM`
    pub model: String,
    /// Remainder of the base tag, often a bone name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bone: String,
}

/// Tag with its kind suffix removed
pub fn base_tag(tag: &str) -> &str {
    KIND_SUFFIXES
        .iter()
        .find_map(|suffix| tag.strip_suffix(suffix))
        .unwrap_or(tag)
}

/// Classify a track tag as an animation sequence
pub fn classify(tag: &str) -> Option<Sequence> {
    let base = base_tag(tag);
    let captures = SEQUENCE_TAG.as_ref()?.captures(base)?;
    let animation = captures.get(1)?;
    let model = captures.get(2)?;
    Some(Sequence {
        animation: animation.as_str().to_owned(),
        model: model.as_str().to_owned(),
        bone: base[model.end()..].to_owned(),
    })
}
