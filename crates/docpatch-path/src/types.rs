//! Type definitions for path addresses.

use std::fmt;

/// Identity field used by keyed selectors unless configured otherwise.
pub const DEFAULT_IDENTITY_FIELD: &str = "_key";

/// A step in a path address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object property access.
    Key(String),
    /// Array positional access.
    Index(usize),
    /// Array element selected by its identity field, resolved against the
    /// live array rather than by position.
    Keyed(String),
}

impl PathSegment {
    pub fn key(name: impl Into<String>) -> Self {
        PathSegment::Key(name.into())
    }

    pub fn index(i: usize) -> Self {
        PathSegment::Index(i)
    }

    pub fn keyed(id: impl Into<String>) -> Self {
        PathSegment::Keyed(id.into())
    }

    /// True for segments that address into an array.
    pub fn is_array_step(&self) -> bool {
        matches!(self, PathSegment::Index(_) | PathSegment::Keyed(_))
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(k) => Some(k),
            _ => None,
        }
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        PathSegment::Key(s.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        PathSegment::Key(s)
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        PathSegment::Index(i)
    }
}

/// An ordered sequence of segments locating a value inside a document.
///
/// The empty address is the document root. Addresses are plain values:
/// every combinator returns a new address and leaves its inputs alone.
///
/// # Example
///
/// ```
/// use docpatch_path::{PathAddress, PathSegment};
///
/// let path = PathAddress::root().key("tags").keyed("x").key("v");
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.to_string(), r#"tags[_key=="x"].v"#);
/// assert!(path.starts_with(&PathAddress::from_segments(vec![PathSegment::key("tags")])));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathAddress(Vec<PathSegment>);

impl PathAddress {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build an address from segments, stored verbatim.
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    pub fn key(mut self, name: impl Into<String>) -> Self {
        self.0.push(PathSegment::Key(name.into()));
        self
    }

    pub fn index(mut self, i: usize) -> Self {
        self.0.push(PathSegment::Index(i));
        self
    }

    pub fn keyed(mut self, id: impl Into<String>) -> Self {
        self.0.push(PathSegment::Keyed(id.into()));
        self
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn into_segments(self) -> Vec<PathSegment> {
        self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Concatenate `suffix` onto this address.
    pub fn append(&self, suffix: &PathAddress) -> PathAddress {
        let mut segments = Vec::with_capacity(self.0.len() + suffix.0.len());
        segments.extend_from_slice(&self.0);
        segments.extend_from_slice(&suffix.0);
        PathAddress(segments)
    }

    /// Segment-wise prefix test. A keyed selector only matches a keyed
    /// selector carrying the same id, never an index.
    pub fn starts_with(&self, prefix: &PathAddress) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// True if `parent` is a strict prefix of this address.
    pub fn is_child_of(&self, parent: &PathAddress) -> bool {
        self.0.len() > parent.0.len() && self.starts_with(parent)
    }

    /// Remove `prefix` from the front, or `None` if it is not a prefix.
    pub fn strip_prefix(&self, prefix: &PathAddress) -> Option<PathAddress> {
        if !self.starts_with(prefix) {
            return None;
        }
        Some(PathAddress(self.0[prefix.0.len()..].to_vec()))
    }

    /// The address of the containing value; `None` at the root.
    pub fn parent(&self) -> Option<PathAddress> {
        self.split_last().map(|(parent, _)| parent)
    }

    pub fn split_last(&self) -> Option<(PathAddress, &PathSegment)> {
        let (last, rest) = self.0.split_last()?;
        Some((PathAddress(rest.to_vec()), last))
    }
}

impl From<Vec<PathSegment>> for PathAddress {
    fn from(segments: Vec<PathSegment>) -> Self {
        PathAddress(segments)
    }
}

impl FromIterator<PathSegment> for PathAddress {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        PathAddress(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PathAddress {
    type Item = &'a PathSegment;
    type IntoIter = std::slice::Iter<'a, PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for PathAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::util::format_path(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags_x_v() -> PathAddress {
        PathAddress::root().key("tags").keyed("x").key("v")
    }

    #[test]
    fn append_concatenates_without_touching_inputs() {
        let base = PathAddress::root().key("body");
        let suffix = PathAddress::root().index(2).key("text");
        let joined = base.append(&suffix);
        assert_eq!(joined.len(), 3);
        assert_eq!(base.len(), 1);
        assert_eq!(suffix.len(), 2);
        assert_eq!(joined.segments()[1], PathSegment::Index(2));
    }

    #[test]
    fn starts_with_compares_keyed_by_id() {
        let path = tags_x_v();
        assert!(path.starts_with(&PathAddress::root()));
        assert!(path.starts_with(&PathAddress::root().key("tags").keyed("x")));
        assert!(!path.starts_with(&PathAddress::root().key("tags").keyed("y")));
        assert!(!path.starts_with(&PathAddress::root().key("tags").index(0)));
    }

    #[test]
    fn strip_prefix_inverts_append() {
        let prefix = PathAddress::root().key("tags");
        let rest = PathAddress::root().keyed("x").key("v");
        assert_eq!(prefix.append(&rest).strip_prefix(&prefix), Some(rest));
        assert_eq!(tags_x_v().strip_prefix(&PathAddress::root().key("title")), None);
    }

    #[test]
    fn parent_and_child() {
        let path = tags_x_v();
        let parent = path.parent().unwrap();
        assert_eq!(parent, PathAddress::root().key("tags").keyed("x"));
        assert!(path.is_child_of(&parent));
        assert!(!path.is_child_of(&path));
        assert_eq!(PathAddress::root().parent(), None);
    }

    #[test]
    fn segment_conversions() {
        assert_eq!(PathSegment::from("a"), PathSegment::Key("a".into()));
        assert_eq!(PathSegment::from(3usize), PathSegment::Index(3));
        assert!(PathSegment::keyed("k").is_array_step());
        assert!(!PathSegment::key("k").is_array_step());
    }
}
