//! Tag set contracts.
//!
//! Both types share one normalization: entries are trimmed, empty entries dropped, and
//! duplicates removed under case-insensitive comparison with the first occurrence (and its
//! case) kept. They differ in what their order means.

use std::collections::HashSet;

use serde::Serialize;

/// Comparison form of a tag: trimmed and Unicode-lowercased.
pub fn fold_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

fn normalize<I, S>(raw: I, cap: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in raw {
        if out.len() >= cap {
            break;
        }
        let trimmed = item.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(fold_tag(trimmed)) {
            out.push(trimmed.to_string());
        }
    }
    out
}

/// Tags whose order is the backend's ranking (image labels, key phrases).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RankedTags(Vec<String>);

impl RankedTags {
    pub fn from_ranked<I, S>(raw: I, cap: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(normalize(raw, cap))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Distinct label names in first-seen order (video frames). Order carries no ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelSet(Vec<String>);

impl LabelSet {
    pub fn from_observations<I, S>(raw: I, cap: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(normalize(raw, cap))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        let needle = fold_tag(name);
        self.0.iter().any(|n| fold_tag(n) == needle)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Output of a tagging run, before it is flattened into `MediaAsset::tags`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSet {
    Ranked(RankedTags),
    Labels(LabelSet),
}

impl TagSet {
    pub fn empty() -> Self {
        TagSet::Ranked(RankedTags::empty())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            TagSet::Ranked(tags) => tags.is_empty(),
            TagSet::Labels(labels) => labels.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TagSet::Ranked(tags) => tags.len(),
            TagSet::Labels(labels) => labels.len(),
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        match self {
            TagSet::Ranked(tags) => tags.into_vec(),
            TagSet::Labels(labels) => labels.into_vec(),
        }
    }
}

impl From<RankedTags> for TagSet {
    fn from(tags: RankedTags) -> Self {
        TagSet::Ranked(tags)
    }
}

impl From<LabelSet> for TagSet {
    fn from(labels: LabelSet) -> Self {
        TagSet::Labels(labels)
    }
}
