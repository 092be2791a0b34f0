//! Request context carrier.
//!
//! # Data Flow
//! ```text
//! Server startup
//!     → RequestContext::background().with_package("server")
//!
//! Per request (ingress adapter)
//!     → .with_deadline(now + request timeout)
//!     → AssignRequestId stage: .with_request_id(RequestId::new())
//!     → handed by value (Arc clone) to every inner stage
//! ```
//!
//! # Design Decisions
//! - Frames form a persistent singly linked list; extending is O(1)
//! - Deriving a context never mutates its parent
//! - Lookups walk from the newest frame, so the nearest binding wins
//! - Logger lookup never fails: the root logger is the fallback

pub mod request_id;

pub use request_id::RequestId;

use std::sync::Arc;
use tokio::time::Instant;

use crate::observability::logging::Logger;

#[derive(Debug)]
enum Binding {
    RequestId { id: RequestId, logger: Logger },
    Package { name: String, logger: Logger },
    Deadline(Instant),
}

#[derive(Debug)]
struct Frame {
    binding: Binding,
    parent: Option<Arc<Frame>>,
}

/// Immutable, append-only context attached to one request's lifetime.
///
/// Clones share the same frames, so passing a context down the call chain
/// propagates it by reference.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    head: Option<Arc<Frame>>,
}

impl RequestContext {
    /// The empty root context.
    pub fn background() -> Self {
        Self::default()
    }

    fn extend(&self, binding: Binding) -> Self {
        Self {
            head: Some(Arc::new(Frame {
                binding,
                parent: self.head.clone(),
            })),
        }
    }

    fn bindings(&self) -> impl Iterator<Item = &Binding> {
        std::iter::successors(self.head.as_deref(), |frame| frame.parent.as_deref())
            .map(|frame| &frame.binding)
    }

    /// Derive a context bound to `id`, with a logger scoped to it.
    pub fn with_request_id(&self, id: RequestId) -> Self {
        let logger = self.logger().for_request(&id);
        self.extend(Binding::RequestId { id, logger })
    }

    /// Derive a context whose logger carries a package scope label.
    pub fn with_package(&self, name: impl Into<String>) -> Self {
        let name = name.into();
        let logger = self.logger().for_package(&name);
        self.extend(Binding::Package { name, logger })
    }

    /// Derive a context carrying the host's deadline.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        self.extend(Binding::Deadline(deadline))
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.bindings().find_map(|binding| match binding {
            Binding::RequestId { id, .. } => Some(id),
            _ => None,
        })
    }

    pub fn package(&self) -> Option<&str> {
        self.bindings().find_map(|binding| match binding {
            Binding::Package { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.bindings().find_map(|binding| match binding {
            Binding::Deadline(deadline) => Some(*deadline),
            _ => None,
        })
    }

    /// The most recently bound logger, or the root logger if none was attached.
    pub fn logger(&self) -> Logger {
        self.bindings()
            .find_map(|binding| match binding {
                Binding::RequestId { logger, .. } | Binding::Package { logger, .. } => {
                    Some(logger.clone())
                }
                Binding::Deadline(_) => None,
            })
            .unwrap_or_default()
    }
}

/// Free-function form of [`RequestContext::logger`].
pub fn logger_of(ctx: &RequestContext) -> Logger {
    ctx.logger()
}
