pub mod element;
pub mod error;
pub mod factory;
pub mod proxy;
pub mod registry;

pub use element::Element;
pub use error::{ConfigurationError, ObjectCreationError, RegistryError, TunnelingError};
pub use factory::{AnyFactory, FactoryRegistry, ObjectFactory};
pub use proxy::{DEFAULT_ATTRIBUTE, ExtensionProxy};
pub use registry::{ExtensionDecl, ExtensionId, ExtensionPoint, ExtensionRegistry};
