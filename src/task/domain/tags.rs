//! Hashtag-style task labels.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of distinct tags on one task.
pub const MAX_TAGS: usize = 10;

const MIN_TAG_CHARS: usize = 2;
const MAX_TAG_CHARS: usize = 50;

/// A normalised tag such as `#work`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    /// Normalises and validates a tag.
    ///
    /// Adds a leading `#` when missing and lowercases the result.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTag`], [`TaskDomainError::TagLength`],
    /// or [`TaskDomainError::InvalidTag`] when the input does not normalise
    /// to `#[a-z0-9_-]+` of 2 to 50 characters.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TaskDomainError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTag);
        }

        let body = trimmed.strip_prefix('#').unwrap_or(trimmed).to_lowercase();
        let tag = format!("#{body}");
        let length = tag.chars().count();
        if !(MIN_TAG_CHARS..=MAX_TAG_CHARS).contains(&length) {
            return Err(TaskDomainError::TagLength(tag));
        }
        if !body
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
        {
            return Err(TaskDomainError::InvalidTag(tag));
        }
        Ok(Self(tag))
    }

    /// Returns the tag including its `#` prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Tag {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Tag> for String {
    fn from(value: Tag) -> Self {
        value.0
    }
}

/// Ordered, de-duplicated set of at most [`MAX_TAGS`] tags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(Vec<Tag>);

impl TagSet {
    /// Creates an empty tag set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Normalises raw tags, dropping duplicates while keeping first-seen order.
    ///
    /// # Errors
    ///
    /// Returns the first invalid tag's error, or
    /// [`TaskDomainError::TooManyTags`] when more than [`MAX_TAGS`] distinct
    /// tags remain.
    pub fn parse<I, S>(raw: I) -> Result<Self, TaskDomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags: Vec<Tag> = Vec::new();
        for value in raw {
            let tag = Tag::new(value)?;
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        if tags.len() > MAX_TAGS {
            return Err(TaskDomainError::TooManyTags {
                max: MAX_TAGS,
                actual: tags.len(),
            });
        }
        Ok(Self(tags))
    }

    /// Returns the tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    /// Returns the number of tags.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no tags are present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the tags as plain strings.
    #[must_use]
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|tag| tag.as_str().to_owned()).collect()
    }
}

impl TryFrom<Vec<String>> for TagSet {
    type Error = TaskDomainError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TagSet> for Vec<String> {
    fn from(value: TagSet) -> Self {
        value.0.into_iter().map(String::from).collect()
    }
}
