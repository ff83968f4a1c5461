//! Deferred extension objects.
//!
//! A registry declares extensions up front and hands out
//! [`ExtensionProxy`] placeholders. Nothing is constructed until a caller asks
//! a proxy for its object; the first successful build is cached for the
//! proxy's lifetime.

pub mod extension;
pub mod model;
pub mod shapes;

pub use extension::{
    AnyFactory, ConfigurationError, DEFAULT_ATTRIBUTE, Element, ExtensionDecl, ExtensionId,
    ExtensionPoint, ExtensionProxy, ExtensionRegistry, FactoryRegistry, ObjectCreationError,
    ObjectFactory, RegistryError, TunnelingError,
};
