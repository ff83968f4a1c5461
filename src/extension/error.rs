use std::error::Error as StdError;
use std::path::PathBuf;

/// A description that a factory cannot consume.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("element `{element}` is missing parameter `{key}`")]
    MissingParameter { element: String, key: String },
    #[error("element `{element}` has an invalid `{key}`: {reason}")]
    InvalidParameter {
        element: String,
        key: String,
        reason: String,
    },
}

/// A factory could not produce an object conforming to the target type.
#[derive(Debug, thiserror::Error)]
pub enum ObjectCreationError {
    #[error("element `{element}` has no `{attribute}` attribute")]
    MissingAttribute { element: String, attribute: String },
    #[error("no factory registered for `{name}`")]
    UnknownType { name: String },
    #[error("`{name}` does not implement {target}")]
    TypeMismatch { name: String, target: &'static str },
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("constructing `{name}` failed")]
    Construction {
        name: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl ObjectCreationError {
    pub fn construction(
        name: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Construction {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// The single failure surface of
/// [`ExtensionProxy::get_realized`](crate::ExtensionProxy::get_realized).
///
/// Whatever went wrong underneath is kept as the [`source`](StdError::source)
/// so callers handle one kind and still get the full chain.
#[derive(Debug, thiserror::Error)]
#[error("failed to realize {target} from `{attribute}` of `{element}`")]
pub struct TunnelingError {
    target: &'static str,
    attribute: String,
    element: String,
    #[source]
    cause: ObjectCreationError,
}

impl TunnelingError {
    pub(crate) fn new(
        target: &'static str,
        attribute: &str,
        element: &str,
        cause: ObjectCreationError,
    ) -> Self {
        Self {
            target,
            attribute: attribute.to_string(),
            element: element.to_string(),
            cause,
        }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn cause(&self) -> &ObjectCreationError {
        &self.cause
    }

    pub fn into_cause(self) -> ObjectCreationError {
        self.cause
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid extension declarations: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("extension `{0}` is declared more than once")]
    DuplicateExtension(String),
}
