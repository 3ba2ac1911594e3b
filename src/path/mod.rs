//! Request target construction.
//!
//! # Data Flow
//! ```text
//! ResourcePath { segments, params }
//!     → segment.rs (type-directed rendering of each segment)
//!     → query.rs (ordered `key=value` pairs joined with `&`)
//!     → target.rs (`/seg1/.../segN[?query]`)
//!     → RequestTarget (immutable, handed to the dispatcher)
//! ```
//!
//! # Design Decisions
//! - Pure functions only: no shared state, no I/O
//! - No percent-encoding; callers pre-encode when they need it
//! - Null segments are skipped, never reported as errors

pub mod query;
pub mod segment;
pub mod target;

pub use query::{query_string, ParameterSet};
pub use segment::{render_segments, PathSegment};
pub use target::{RequestTarget, ResourcePath};
