//! Thread-scoped binding of the request currently being served.
//!
//! A binding is visible only on the thread that created it. At most one is
//! active per thread: binding again replaces the previous one. The paired
//! exit must call [`unbind`] on every exit path, otherwise the binding leaks
//! into the next unit of work the thread picks up.

use std::cell::RefCell;
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::host::{ObjectRef, RequestSummary};

/// The request/response pair bound to the current thread.
#[derive(Debug, Clone)]
pub struct BoundContext {
    pub request: ObjectRef,
    pub response: Option<ObjectRef>,
}

impl BoundContext {
    /// Diagnostic summary of the bound request, if it can be read.
    pub fn summary(&self) -> Option<RequestSummary> {
        RequestSummary::extract(self.request.as_ref())
    }
}

thread_local! {
    static CURRENT: RefCell<Option<BoundContext>> = const { RefCell::new(None) };
}

/// Bind `request`/`response` to the calling thread.
///
/// Returns the binding that was replaced, which is either a nested inbound
/// call on the same thread or a leak from a missed unbind.
pub fn bind(request: ObjectRef, response: Option<ObjectRef>) -> Option<BoundContext> {
    let previous = CURRENT.with(|slot| {
        slot.borrow_mut().replace(BoundContext { request, response })
    });
    if let Some(previous) = &previous {
        debug!(
            replaced = previous.request.type_name(),
            "request context replaced an existing binding on this thread"
        );
    } else {
        trace!("request context bound");
    }
    previous
}

/// The binding on the calling thread, if any.
pub fn current() -> Option<BoundContext> {
    CURRENT.with(|slot| slot.borrow().clone())
}

/// Run `f` with a borrow of the current binding, without cloning it.
pub fn with_current<R>(f: impl FnOnce(Option<&BoundContext>) -> R) -> R {
    CURRENT.with(|slot| f(slot.borrow().as_ref()))
}

/// Whether the calling thread currently has a binding.
pub fn is_bound() -> bool {
    CURRENT.with(|slot| slot.borrow().is_some())
}

/// Clear the calling thread's binding and return it.
pub fn unbind() -> Option<BoundContext> {
    // `try_with` so that an unbind during thread teardown is a no-op rather
    // than a panic.
    let removed = CURRENT
        .try_with(|slot| slot.borrow_mut().take())
        .ok()
        .flatten();
    if removed.is_some() {
        trace!("request context unbound");
    }
    removed
}

// ---------------------------------------------------------------------------
// ContextScope
// ---------------------------------------------------------------------------

/// Binds on creation and unbinds on drop, including while unwinding.
///
/// The guard is `!Send`: it must be dropped on the thread it bound.
#[must_use = "the binding is released as soon as the scope is dropped"]
pub struct ContextScope {
    _thread_bound: PhantomData<*const ()>,
}

impl ContextScope {
    pub fn enter(request: ObjectRef, response: Option<ObjectRef>) -> Self {
        bind(request, response);
        Self {
            _thread_bound: PhantomData,
        }
    }
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        unbind();
    }
}

/// Run `f` with `request`/`response` bound, releasing the binding however
/// `f` exits.
pub fn scope<R>(request: ObjectRef, response: Option<ObjectRef>, f: impl FnOnce() -> R) -> R {
    let _scope = ContextScope::enter(request, response);
    f()
}
