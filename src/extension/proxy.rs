use std::any::type_name;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use crate::extension::element::Element;
use crate::extension::error::{ObjectCreationError, TunnelingError};
use crate::extension::factory::ObjectFactory;

pub const DEFAULT_ATTRIBUTE: &str = "class";

/// Stand-in for an extension object that is built on first use.
///
/// Creating a proxy is cheap: it only records the element, the context and
/// the factory. [`get_realized`](Self::get_realized) builds the object once,
/// caches it, and hands out the same `Arc` from then on.
///
/// Construction is serialized. Concurrent first callers wait for the one
/// that builds, then share its result. A failed build caches nothing, so the
/// next call tries again.
pub struct ExtensionProxy<T: ?Sized, C> {
    element: RwLock<Element>,
    attribute: String,
    context: C,
    factory: Arc<dyn ObjectFactory<T, C>>,
    realized: OnceLock<Arc<T>>,
    realizing: Mutex<()>,
}

impl<T: ?Sized, C> ExtensionProxy<T, C> {
    pub fn new(factory: Arc<dyn ObjectFactory<T, C>>, context: C, element: Element) -> Self {
        Self::with_attribute(factory, context, element, DEFAULT_ATTRIBUTE)
    }

    /// Like [`new`](Self::new), reading the implementation name from
    /// `attribute` instead of `class`.
    pub fn with_attribute(
        factory: Arc<dyn ObjectFactory<T, C>>,
        context: C,
        element: Element,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            element: RwLock::new(element),
            attribute: attribute.into(),
            context,
            factory,
            realized: OnceLock::new(),
            realizing: Mutex::new(()),
        }
    }

    /// Replaces the element the next realization reads.
    ///
    /// Has no effect on an object that is already realized.
    pub fn configure(&self, element: Element) {
        if self.is_realized() {
            tracing::debug!(
                element = element.name(),
                target = self.target_type(),
                "configured after realization; cached object kept"
            );
        }

        *self.element.write().unwrap_or_else(PoisonError::into_inner) = element;
    }

    pub fn element(&self) -> Element {
        self.element
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn target_type(&self) -> &'static str {
        type_name::<T>()
    }

    pub fn is_realized(&self) -> bool {
        self.realized.get().is_some()
    }

    /// The cached object, without triggering realization.
    pub fn realized(&self) -> Option<Arc<T>> {
        self.realized.get().cloned()
    }

    /// Returns the realized object, building it on first call.
    pub fn get_realized(&self) -> Result<Arc<T>, TunnelingError> {
        if let Some(object) = self.realized.get() {
            return Ok(Arc::clone(object));
        }

        // A factory that panicked poisons the lock but never filled the cache.
        let _guard = self
            .realizing
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(object) = self.realized.get() {
            return Ok(Arc::clone(object));
        }

        let element = self.element();
        let object = self.realize(&element).map_err(|cause| {
            TunnelingError::new(self.target_type(), &self.attribute, element.name(), cause)
        })?;

        Ok(Arc::clone(self.realized.get_or_init(|| object)))
    }

    fn realize(&self, element: &Element) -> Result<Arc<T>, ObjectCreationError> {
        tracing::debug!(
            element = element.name(),
            attribute = %self.attribute,
            target = self.target_type(),
            "realizing extension object"
        );

        let object = self
            .factory
            .create(element, &self.attribute, &self.context)?;

        tracing::debug!(element = element.name(), "extension object realized");
        Ok(object)
    }
}

impl<T: ?Sized, C: fmt::Debug> fmt::Debug for ExtensionProxy<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionProxy")
            .field("element", &self.element())
            .field("attribute", &self.attribute)
            .field("target", &self.target_type())
            .field("context", &self.context)
            .field("realized", &self.is_realized())
            .finish()
    }
}
