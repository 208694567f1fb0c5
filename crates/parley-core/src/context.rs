//! Per-request context for the Parley router.
//!
//! A [`Context`] is created fresh for every dispatch cycle and handed by
//! reference to every interceptor, predicate and action that takes part in
//! that cycle. It carries:
//!
//! - the immutable request being routed,
//! - a unique cycle id used to correlate log lines,
//! - an isolated attribute map that hooks and actions may annotate,
//! - read-only access to the service handles registered on the
//!   [`DispatcherBuilder`](crate::DispatcherBuilder).
//!
//! The context is owned by the dispatcher for the duration of the cycle and is
//! never shared between concurrent cycles.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::HandlerError;
use crate::request::Request;

/// Type alias for the heterogeneous values stored in the service map.
///
/// The inner `dyn Any` is actually an `Arc<T>` (where `T` may be a trait
/// object) upcast to `Any` when the service was registered. Lookups downcast
/// it back to `Arc<T>`.
pub type ServiceArc = Arc<dyn Any + Send + Sync>;

pub(crate) type ServiceMap = HashMap<TypeId, ServiceArc>;

/// The context object passed through one dispatch cycle.
pub struct Context<R> {
    id: Uuid,
    request: R,
    services: Arc<ServiceMap>,
    attributes: Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl<R: Request> Context<R> {
    pub(crate) fn new(request: R, services: Arc<ServiceMap>) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            services,
            attributes: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a context with no registered services.
    ///
    /// Useful for exercising predicates and actions outside a dispatcher.
    pub fn detached(request: R) -> Self {
        Self::new(request, Arc::default())
    }

    /// Returns the unique id of this dispatch cycle.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the request being routed.
    pub fn request(&self) -> &R {
        &self.request
    }

    /// Returns the discriminant of the request being routed.
    pub fn kind(&self) -> &str {
        self.request.kind()
    }

    /// Looks up a service handle by its (possibly unsized) type.
    ///
    /// Returns `None` if no service of type `T` was registered.
    pub fn get_service<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.services
            .get(&TypeId::of::<T>())
            .and_then(|arc| arc.downcast_ref::<Arc<T>>().map(Arc::clone))
    }

    /// Like [`get_service`](Self::get_service) but fails with a
    /// [`HandlerError`], so actions can use `?`.
    pub fn require_service<T: ?Sized + 'static>(&self) -> Result<Arc<T>, HandlerError> {
        self.get_service::<T>().ok_or_else(|| {
            HandlerError::new(format!("service not registered: {}", type_name::<T>()))
        })
    }

    /// Stores a value in this cycle's attribute map.
    ///
    /// Only one value per type is kept; later calls overwrite earlier ones.
    pub fn set_attribute<T: Send + Sync + 'static>(&self, value: T) {
        self.attributes
            .lock()
            .insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a cloned value from the attribute map.
    pub fn get_attribute<T: Clone + 'static>(&self) -> Option<T> {
        self.attributes
            .lock()
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    /// Returns `true` if a value of type `T` is present in the attribute map.
    pub fn has_attribute<T: 'static>(&self) -> bool {
        self.attributes.lock().contains_key(&TypeId::of::<T>())
    }

    /// Removes and returns a value from the attribute map.
    pub fn take_attribute<T: 'static>(&self) -> Option<T> {
        self.attributes
            .lock()
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast::<T>().ok())
            .map(|v| *v)
    }
}

impl<R: Request> fmt::Debug for Context<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("kind", &self.request.kind())
            .field("services", &self.services.len())
            .finish_non_exhaustive()
    }
}
