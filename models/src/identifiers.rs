// models/src/identifiers.rs

use core::{hash::Hash, ops::Deref};
use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use internment::ArcIntern;

use crate::errors::{ValidationError, ValidationResult};

/// Delimits the hierarchy levels of a vertex id (`namespace/local-part`).
pub const ID_SEPARATOR: char = '/';

/// Joins the words of a sanitized local part. Decoded back to a space for display.
pub const WORD_SEPARATOR: char = '_';

/// An identifier: a non-empty, reference-counted interned string. Equal
/// identifiers share one allocation, which is released when the last copy drops.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(pub ArcIntern<String>);

impl Identifier {
    /// Creates a new identifier.
    ///
    /// # Errors
    /// Returns `InvalidIdentifierLength` if `value` is empty.
    pub fn new(value: String) -> ValidationResult<Self> {
        if value.is_empty() {
            return Err(ValidationError::InvalidIdentifierLength);
        }

        Ok(Self(ArcIntern::new(value)))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for Identifier {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl FromStr for Identifier {
    type Err = ValidationError;

    fn from_str(s: &str) -> ValidationResult<Self> {
        Self::new(s.to_string())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for Identifier {
    type Error = ValidationError;

    fn try_from(value: String) -> ValidationResult<Self> {
        Self::new(value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.as_str().to_string()
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '.' | '\'')
}

/// Maps free text onto an identifier-safe token.
///
/// Alphanumeric characters and `-`, `.`, `'` are kept with their case
/// unchanged. Any other character (whitespace, `/`, `_`, punctuation) breaks
/// words; each run of breaks becomes a single `_`, and breaks at either end are
/// dropped. The result never contains [`ID_SEPARATOR`], and
/// `sanitize(&sanitize(x)) == sanitize(x)`.
///
/// ```
/// assert_eq!(models::identifiers::sanitize("  Alan   Turing "), "Alan_Turing");
/// assert_eq!(models::identifiers::sanitize("AC/DC"), "AC_DC");
/// assert_eq!(models::identifiers::sanitize(""), "");
/// ```
pub fn sanitize(text: &str) -> String {
    let mut token = String::with_capacity(text.len());
    let mut pending_break = false;
    for c in text.chars() {
        if is_token_char(c) {
            if pending_break && !token.is_empty() {
                token.push(WORD_SEPARATOR);
            }
            pending_break = false;
            token.push(c);
        } else {
            pending_break = true;
        }
    }
    token
}

/// Returns the segment after the final [`ID_SEPARATOR`], or `id` unchanged when
/// it contains no separator.
pub fn last_part(id: &str) -> &str {
    id.rsplit_once(ID_SEPARATOR).map_or(id, |(_, last)| last)
}

/// Returns everything before the final [`ID_SEPARATOR`], if there is one.
pub fn namespace(id: &str) -> Option<&str> {
    id.rsplit_once(ID_SEPARATOR).map(|(ns, _)| ns)
}

/// Splits `id` into its hierarchy segments.
pub fn parts(id: &str) -> impl Iterator<Item = &str> {
    id.split(ID_SEPARATOR)
}

/// Joins a namespace and a local part into an id string.
pub fn build(namespace: &str, local: &str) -> String {
    format!("{namespace}{ID_SEPARATOR}{local}")
}

/// A validated vertex id of the form `namespace/local-part`.
///
/// The namespace may span several segments (`ns/sub/local`); the local part is
/// always the final one. Every segment is non-empty.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VertexId(Identifier);

impl VertexId {
    /// Parses and validates a vertex id.
    ///
    /// # Errors
    /// `InvalidIdentifier` if `value` is empty, has no separator, or has an
    /// empty segment. There is no upper bound on the length.
    pub fn parse(value: impl Into<String>) -> ValidationResult<Self> {
        let value = value.into();
        if !value.contains(ID_SEPARATOR) || parts(&value).any(str::is_empty) {
            return Err(ValidationError::InvalidIdentifier(value));
        }
        Ok(Self(Identifier::new(value)?))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn identifier(&self) -> Identifier {
        self.0.clone()
    }

    pub fn namespace(&self) -> &str {
        namespace(self.as_str()).unwrap_or_default()
    }

    pub fn local_part(&self) -> &str {
        last_part(self.as_str())
    }

    pub fn parts(&self) -> impl Iterator<Item = &str> {
        parts(self.as_str())
    }

    /// Whether the namespace is `prefix` or nested below it. Matching is by
    /// whole segments, so `people` does not match `peoples/ada`.
    pub fn in_namespace(&self, prefix: &str) -> bool {
        let prefix = prefix.trim_end_matches(ID_SEPARATOR);
        match self.namespace().strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with(ID_SEPARATOR),
            None => false,
        }
    }
}

impl AsRef<str> for VertexId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for VertexId {
    type Err = ValidationError;

    fn from_str(s: &str) -> ValidationResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VertexId {
    type Error = ValidationError;

    fn try_from(value: String) -> ValidationResult<Self> {
        Self::parse(value)
    }
}

impl From<VertexId> for String {
    fn from(value: VertexId) -> Self {
        value.as_str().to_string()
    }
}

impl From<VertexId> for Identifier {
    fn from(value: VertexId) -> Self {
        value.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
