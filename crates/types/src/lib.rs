//! Validated text primitives shared by the review crates.
//!
//! Display names, comment bodies, and author names all carry the same rule:
//! whitespace-only strings count as absent. `NonEmptyText` encodes that rule
//! once, at the type level, so callers downstream never re-check it.

/// Rejection reasons for the validated text wrappers.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// Nothing left after trimming
    #[error("Text cannot be empty")]
    Empty,
}

/// A trimmed string with at least one visible character.
///
/// Construction trims both ends, so the inner value carries no surrounding
/// whitespace and is never blank. Deserialisation applies the same check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Validate `input`, trimming surrounding whitespace.
    ///
    /// Fails with [`TextError::Empty`] when nothing visible remains after
    /// the trim.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The validated text as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the owned `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<NonEmptyText> for String {
    fn from(text: NonEmptyText) -> Self {
        text.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let text = NonEmptyText::new("  hello  ").expect("non-empty");
        assert_eq!(text.as_str(), "hello");
    }

    #[test]
    fn rejects_blank_input() {
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
        assert!(matches!(NonEmptyText::new(""), Err(TextError::Empty)));
    }

    #[test]
    fn converts_into_string() {
        let text = NonEmptyText::new("value").expect("non-empty");
        let s: String = text.into();
        assert_eq!(s, "value");
    }
}
