//! Request target assembly.

use std::fmt;

use serde_json::Value;

use crate::path::query::{query_string, ParameterSet};
use crate::path::segment::{render_segments, PathSegment};

const SINGLE_SLASH: &str = "/";
const QUESTION_MARK: &str = "?";

/// The final request target handed to the client: `/a/b?x=1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestTarget(String);

impl RequestTarget {
    /// Build a target from path segments and query parameters.
    pub fn from_resource(segments: &[PathSegment], params: &ParameterSet) -> Self {
        let joined = format!("{}{}", SINGLE_SLASH, render_segments(segments).join(SINGLE_SLASH));
        let query = query_string(params);
        if query.is_empty() {
            Self(joined)
        } else {
            Self(format!("{}{}{}", joined, QUESTION_MARK, query))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequestTarget {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RequestTarget {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for RequestTarget {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// The "resource path" call form: segments plus parameters, not yet joined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourcePath {
    pub segments: Vec<PathSegment>,
    pub params: ParameterSet,
}

impl ResourcePath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            params: ParameterSet::new(),
        }
    }

    /// Append a path segment.
    pub fn segment(mut self, segment: impl Into<PathSegment>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Add a query parameter. Re-adding a key replaces the value in place.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn to_target(&self) -> RequestTarget {
        RequestTarget::from_resource(&self.segments, &self.params)
    }
}

impl From<ResourcePath> for RequestTarget {
    fn from(path: ResourcePath) -> Self {
        path.to_target()
    }
}

impl From<&ResourcePath> for RequestTarget {
    fn from(path: &ResourcePath) -> Self {
        path.to_target()
    }
}
