use std::any::{Any, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use crate::extension::element::Element;
use crate::extension::error::{ConfigurationError, ObjectCreationError};

/// Builds the object an [`ExtensionProxy`](crate::ExtensionProxy) stands in for.
///
/// `attribute` names the element attribute holding the implementation name.
/// The target type is `T`; implementations must only return objects usable
/// as `T`.
pub trait ObjectFactory<T: ?Sized, C>: Send + Sync {
    fn create(
        &self,
        element: &Element,
        attribute: &str,
        context: &C,
    ) -> Result<Arc<T>, ObjectCreationError>;
}

impl<T, C, F> ObjectFactory<T, C> for F
where
    T: ?Sized,
    F: Fn(&Element, &str, &C) -> Result<Arc<T>, ObjectCreationError> + Send + Sync,
{
    fn create(
        &self,
        element: &Element,
        attribute: &str,
        context: &C,
    ) -> Result<Arc<T>, ObjectCreationError> {
        self(element, attribute, context)
    }
}

type Builder<T, C> = Box<dyn Fn(&Element, &C) -> Result<Arc<T>, ObjectCreationError> + Send + Sync>;

fn implementation_name<'a>(
    element: &'a Element,
    attribute: &str,
) -> Result<&'a str, ObjectCreationError> {
    match element.get(attribute) {
        Some(value) => value.as_str().ok_or_else(|| {
            ConfigurationError::InvalidParameter {
                element: element.name().to_string(),
                key: attribute.to_string(),
                reason: format!("expected an implementation name, got {}", value.type_str()),
            }
            .into()
        }),
        None => Err(ObjectCreationError::MissingAttribute {
            element: element.name().to_string(),
            attribute: attribute.to_string(),
        }),
    }
}

/// Builders for one target type, keyed by implementation name.
pub struct FactoryRegistry<T: ?Sized, C> {
    builders: HashMap<String, Builder<T, C>>,
}

impl<T: ?Sized, C> Default for FactoryRegistry<T, C> {
    fn default() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }
}

impl<T: ?Sized, C> FactoryRegistry<T, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `builder` under `name`, replacing any earlier registration.
    pub fn register<F>(&mut self, name: impl Into<String>, builder: F) -> &mut Self
    where
        F: Fn(&Element, &C) -> Result<Arc<T>, ObjectCreationError> + Send + Sync + 'static,
    {
        self.builders.insert(name.into(), Box::new(builder));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<T: ?Sized, C> ObjectFactory<T, C> for FactoryRegistry<T, C> {
    fn create(
        &self,
        element: &Element,
        attribute: &str,
        context: &C,
    ) -> Result<Arc<T>, ObjectCreationError> {
        let name = implementation_name(element, attribute)?;
        let builder = self
            .builders
            .get(name)
            .ok_or_else(|| ObjectCreationError::UnknownType {
                name: name.to_string(),
            })?;

        builder(element, context)
    }
}

type AnyObject = Arc<dyn Any + Send + Sync>;
type AnyBuilder<C> =
    Box<dyn Fn(&Element, &C) -> Result<AnyObject, ObjectCreationError> + Send + Sync>;

/// Type-erased builders shared by several target types.
///
/// The built object is checked against the requested target at creation
/// time, so a name registered for the wrong type surfaces as
/// [`ObjectCreationError::TypeMismatch`].
pub struct AnyFactory<C> {
    builders: HashMap<String, AnyBuilder<C>>,
}

impl<C> Default for AnyFactory<C> {
    fn default() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }
}

impl<C: 'static> AnyFactory<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<O, F>(&mut self, name: impl Into<String>, builder: F) -> &mut Self
    where
        O: Any + Send + Sync,
        F: Fn(&Element, &C) -> Result<O, ObjectCreationError> + Send + Sync + 'static,
    {
        self.builders.insert(
            name.into(),
            Box::new(move |element: &Element, context: &C| {
                builder(element, context).map(|object| Arc::new(object) as AnyObject)
            }),
        );
        self
    }
}

impl<T, C> ObjectFactory<T, C> for AnyFactory<C>
where
    T: Any + Send + Sync,
{
    fn create(
        &self,
        element: &Element,
        attribute: &str,
        context: &C,
    ) -> Result<Arc<T>, ObjectCreationError> {
        let name = implementation_name(element, attribute)?;
        let builder = self
            .builders
            .get(name)
            .ok_or_else(|| ObjectCreationError::UnknownType {
                name: name.to_string(),
            })?;

        builder(element, context)?
            .downcast::<T>()
            .map_err(|_| ObjectCreationError::TypeMismatch {
                name: name.to_string(),
                target: type_name::<T>(),
            })
    }
}
