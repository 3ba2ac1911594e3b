//! Call-scoped context propagation.
//!
//! # Data Flow
//! ```text
//! CallingUnit (caller's task-local values + function names)
//!     → propagation.rs (snapshot of the fixed key set)
//!     → strand.rs (main-strand detection, forces MAIN_STRAND=true)
//!     → PropagationContext (handed to the client alongside the call)
//! ```
//!
//! # Design Decisions
//! - Context is threaded explicitly; nothing is read from ambient state
//! - The snapshot is taken before the call suspends, never at resume time
//! - Absent keys are omitted, never defaulted

pub mod caller;
pub mod keys;
pub mod propagation;
pub mod strand;

pub use caller::{CallerContext, CallingUnit};
pub use keys::{PropagationKey, PropagationValue};
pub use propagation::PropagationContext;
pub use strand::{MainStrandDetector, MainStrandRule};
