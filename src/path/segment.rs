//! Path segment rendering.

use serde_json::Value;

/// A single typed component of a resource path.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Anything else. Nulls are dropped during rendering.
    Value(Value),
}

impl PathSegment {
    /// Render the segment to its canonical text form.
    ///
    /// Returns `None` for null values, which are skipped rather than
    /// rendered as an empty segment.
    pub fn render(&self) -> Option<String> {
        match self {
            PathSegment::Text(s) => Some(s.clone()),
            PathSegment::Int(i) => Some(i.to_string()),
            PathSegment::Float(f) => Some(render_float(*f)),
            PathSegment::Bool(b) => Some(b.to_string()),
            PathSegment::Value(Value::Null) => None,
            PathSegment::Value(Value::String(s)) => Some(s.clone()),
            PathSegment::Value(other) => Some(other.to_string()),
        }
    }
}

/// Decimal form between 10^-3 and 10^7, otherwise `<mantissa>E<exp>`.
/// The mantissa always carries a fractional digit (`1.0`, `1.0E16`).
fn render_float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = f.abs();
    if f == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return format!("{:?}", f);
    }

    let scientific = format!("{:e}", f);
    match scientific.split_once('e') {
        Some((mantissa, exp)) if mantissa.contains('.') => format!("{}E{}", mantissa, exp),
        Some((mantissa, exp)) => format!("{}.0E{}", mantissa, exp),
        None => scientific,
    }
}

/// Render an ordered list of segments, dropping null entries.
pub fn render_segments(segments: &[PathSegment]) -> Vec<String> {
    segments.iter().filter_map(PathSegment::render).collect()
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        PathSegment::Text(s.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        PathSegment::Text(s)
    }
}

impl From<&String> for PathSegment {
    fn from(s: &String) -> Self {
        PathSegment::Text(s.clone())
    }
}

macro_rules! int_segment {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for PathSegment {
                fn from(i: $ty) -> Self {
                    PathSegment::Int(i64::from(i))
                }
            }
        )*
    };
}

int_segment!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for PathSegment {
    fn from(f: f64) -> Self {
        PathSegment::Float(f)
    }
}

impl From<bool> for PathSegment {
    fn from(b: bool) -> Self {
        PathSegment::Bool(b)
    }
}

impl From<Value> for PathSegment {
    fn from(v: Value) -> Self {
        PathSegment::Value(v)
    }
}

impl<T: Into<PathSegment>> From<Option<T>> for PathSegment {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => PathSegment::Value(Value::Null),
        }
    }
}
