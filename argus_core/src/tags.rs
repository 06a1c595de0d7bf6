// argus_core/src/tags.rs

//! Tag classification shared by every sensor.
//!
//! The position of a tag in the detectable list is its "tag index" and ends
//! up verbatim in the observation vector, so the order is part of the
//! observation's meaning and must stay fixed for a sensor's lifetime.

use serde::{Deserialize, Serialize};

/// Result of looking a hit object's tag up in a detectable tag list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagMatch {
    pub matched: bool,
    /// Index into the tag list, or `-1` when nothing matched.
    pub index: i32,
}

impl TagMatch {
    pub const NONE: TagMatch = TagMatch {
        matched: false,
        index: -1,
    };
}

impl Default for TagMatch {
    fn default() -> Self {
        Self::NONE
    }
}

/// Classifies a detected object's tag against an ordered tag list.
///
/// `None` means nothing was hit. An empty list never matches. Otherwise the
/// first position holding `hit_tag` wins.
pub fn classify(hit_tag: Option<&str>, tags: &[String]) -> TagMatch {
    let Some(tag) = hit_tag else {
        return TagMatch::NONE;
    };
    match tags.iter().position(|t| t == tag) {
        Some(index) => TagMatch {
            matched: true,
            index: index as i32,
        },
        None => TagMatch::NONE,
    }
}

/// The ordered list of tags a sensor reports on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectableTags(Vec<String>);

impl DetectableTags {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tags.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn classify(&self, hit_tag: Option<&str>) -> TagMatch {
        classify(hit_tag, &self.0)
    }
}

impl<S: Into<String>> FromIterator<S> for DetectableTags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
