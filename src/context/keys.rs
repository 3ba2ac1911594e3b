//! The fixed set of propagated keys.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An opaque propagated value. Only the client knows its concrete type.
pub type PropagationValue = Arc<dyn Any + Send + Sync>;

/// Keys carried from the calling task into the client call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropagationKey {
    TransactionContext,
    ObserverContext,
    SourceHandler,
    MainStrand,
    PooledBufferFactory,
    RemoteAddress,
    OriginHost,
}

impl PropagationKey {
    /// Every key, in capture order.
    pub const ALL: [PropagationKey; 7] = [
        PropagationKey::TransactionContext,
        PropagationKey::ObserverContext,
        PropagationKey::SourceHandler,
        PropagationKey::MainStrand,
        PropagationKey::PooledBufferFactory,
        PropagationKey::RemoteAddress,
        PropagationKey::OriginHost,
    ];

    /// The name the host runtime uses for this key.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropagationKey::TransactionContext => "currentTrxContext",
            PropagationKey::ObserverContext => "__observer_context",
            PropagationKey::SourceHandler => "SRC_HANDLER",
            PropagationKey::MainStrand => "MAIN_STRAND",
            PropagationKey::PooledBufferFactory => "POOLED_BYTE_BUFFER_FACTORY",
            PropagationKey::RemoteAddress => "REMOTE_ADDRESS",
            PropagationKey::OriginHost => "ORIGIN_HOST",
        }
    }

    /// Look up a key by its host name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl fmt::Display for PropagationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
