//! Structural paths for addressing nodes inside a JSON document.
//!
//! A path is an ordered sequence of string segments. Each segment is either an
//! object key or an array index written in decimal. Whether a segment is used
//! as a key or an index is decided by the container it is applied to, so the
//! same path can address `{"0": x}` and `[x]` alike.

use crate::{FormStateError, FormStateResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Parse a segment as an array index.
///
/// Only plain decimal digits are accepted; `"+1"`, `"-1"` and `""` are keys.
#[inline]
pub fn seg_index(seg: &str) -> Option<usize> {
    if seg.is_empty() || !seg.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    seg.parse().ok()
}

/// A complete path into a JSON document.
///
/// The empty path denotes the document root. Paths compare by their segment
/// sequences and are used directly as keys of the per-field UI state maps.
/// They serialize as their JSON pointer, so a path-keyed map is a JSON object.
///
/// # Examples
///
/// ```
/// use tirea_form_state::Path;
///
/// let path = Path::root().key("users").index(0).key("name");
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.to_string(), "/users/0/name");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(Vec<String>);

impl Path {
    /// Create an empty path (root).
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create a path from its segments.
    #[inline]
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parse a JSON pointer (`""`, `"/a/0"`) into a path.
    pub fn from_pointer(pointer: &str) -> FormStateResult<Self> {
        if pointer.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = pointer.strip_prefix('/') else {
            return Err(FormStateError::invalid_pointer(pointer));
        };
        Ok(Self(
            rest.split('/')
                .map(|seg| seg.replace("~1", "/").replace("~0", "~"))
                .collect(),
        ))
    }

    /// Append a key segment and return self (builder pattern).
    #[inline]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(k.into());
        self
    }

    /// Append an index segment and return self (builder pattern).
    #[inline]
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(i.to_string());
        self
    }

    /// Append a segment and return a new path (non-mutating).
    #[inline]
    pub fn child(&self, seg: impl Into<String>) -> Path {
        let mut result = self.clone();
        result.0.push(seg.into());
        result
    }

    /// Push a segment onto the path (mutating).
    #[inline]
    pub fn push(&mut self, seg: impl Into<String>) {
        self.0.push(seg.into());
    }

    /// Pop the last segment from the path.
    #[inline]
    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    /// Get the segments of this path.
    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Check if this path is the document root.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of segments in this path.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the last segment.
    #[inline]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Join this path with another path.
    #[inline]
    pub fn join(&self, other: &Path) -> Path {
        let mut result = self.clone();
        result.0.extend(other.0.iter().cloned());
        result
    }

    /// Get the parent path (path without the last segment).
    #[inline]
    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            let mut p = self.clone();
            p.pop();
            Some(p)
        }
    }

    /// Check if this path is a prefix of another path.
    ///
    /// A path is a prefix of itself.
    #[inline]
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Derive the widget identifier for this path: `name` followed by every
    /// segment, joined with `_`.
    ///
    /// ```
    /// use tirea_form_state::path;
    ///
    /// assert_eq!(path!("address", "street").field_id("profile"), "profile_address_street");
    /// assert_eq!(path!().field_id("profile"), "profile_");
    /// ```
    pub fn field_id(&self, name: &str) -> String {
        format!("{}_{}", name, self.0.join("_"))
    }

    /// Iterate over the segments.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Renders the canonical JSON pointer form.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in &self.0 {
            write!(f, "/{}", seg.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pointer = String::deserialize(deserializer)?;
        Path::from_pointer(&pointer).map_err(serde::de::Error::custom)
    }
}

impl<S: Into<String>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Path::from_segments(iter)
    }
}

impl IntoIterator for Path {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl std::ops::Index<usize> for Path {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Construct a `Path` from a sequence of segments.
///
/// Any `Display` value is accepted, so integers become index segments.
///
/// ```
/// use tirea_form_state::path;
///
/// let p = path!("items", 0, "name");
/// assert_eq!(p.segments(), ["items", "0", "name"]);
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut p = $crate::Path::root();
        $(
            p.push(($seg).to_string());
        )+
        p
    }};
}
