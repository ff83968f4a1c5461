use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::extension::element::Element;
use crate::extension::error::{RegistryError, TunnelingError};
use crate::extension::factory::ObjectFactory;
use crate::extension::proxy::{DEFAULT_ATTRIBUTE, ExtensionProxy};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensionId(pub String);

impl ExtensionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One `[[extension]]` entry of a declaration file.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionDecl {
    pub id: String,
    pub point: String,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub element: toml::Table,
}

#[derive(Debug, Default, Deserialize)]
struct DeclarationFile {
    #[serde(default, rename = "extension")]
    extensions: Vec<ExtensionDecl>,
}

/// Extension declarations, loaded without building anything.
#[derive(Debug, Clone)]
pub struct ExtensionRegistry {
    declarations: Vec<ExtensionDecl>,
    default_attribute: String,
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self {
            declarations: Vec::new(),
            default_attribute: DEFAULT_ATTRIBUTE.to_string(),
        }
    }
}

impl ExtensionRegistry {
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let raw = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let registry = Self::from_toml_str(&raw)?;
        tracing::info!(
            "loaded {} extension declarations from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, RegistryError> {
        let file: DeclarationFile = toml::from_str(raw)?;

        let mut seen = HashSet::new();
        for decl in &file.extensions {
            if !seen.insert(decl.id.as_str()) {
                return Err(RegistryError::DuplicateExtension(decl.id.clone()));
            }
        }

        Ok(Self {
            declarations: file.extensions,
            ..Self::default()
        })
    }

    /// Attribute used by declarations that do not name their own.
    pub fn with_default_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.default_attribute = attribute.into();
        self
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn declarations(&self) -> &[ExtensionDecl] {
        &self.declarations
    }

    pub fn point_names(&self) -> Vec<&str> {
        let mut points: Vec<&str> = self
            .declarations
            .iter()
            .map(|decl| decl.point.as_str())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        points.sort_unstable();
        points
    }

    /// Creates one unrealized proxy per declaration contributing to `point`.
    pub fn point<T, C>(
        &self,
        point: &str,
        factory: Arc<dyn ObjectFactory<T, C>>,
        context: C,
    ) -> ExtensionPoint<T, C>
    where
        T: ?Sized,
        C: Clone,
    {
        let proxies = self
            .declarations
            .iter()
            .filter(|decl| decl.point == point)
            .map(|decl| {
                let attribute = decl
                    .attribute
                    .clone()
                    .unwrap_or_else(|| self.default_attribute.clone());
                let proxy = ExtensionProxy::with_attribute(
                    Arc::clone(&factory),
                    context.clone(),
                    Element::from_table(decl.id.clone(), decl.element.clone()),
                    attribute,
                );
                (ExtensionId::new(decl.id.clone()), Arc::new(proxy))
            })
            .collect();

        ExtensionPoint {
            name: point.to_string(),
            proxies,
        }
    }
}

/// The proxies contributed to one extension point, in declaration order.
pub struct ExtensionPoint<T: ?Sized, C> {
    name: String,
    proxies: Vec<(ExtensionId, Arc<ExtensionProxy<T, C>>)>,
}

impl<T: ?Sized, C> ExtensionPoint<T, C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, id: &str) -> Option<&Arc<ExtensionProxy<T, C>>> {
        self.proxies
            .iter()
            .find(|(candidate, _)| candidate.as_str() == id)
            .map(|(_, proxy)| proxy)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExtensionId, &Arc<ExtensionProxy<T, C>>)> {
        self.proxies.iter().map(|(id, proxy)| (id, proxy))
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn realized_count(&self) -> usize {
        self.proxies
            .iter()
            .filter(|(_, proxy)| proxy.is_realized())
            .count()
    }

    /// Realizes every proxy, keeping going past failures.
    pub fn realize_all(&self) -> Vec<(ExtensionId, Result<Arc<T>, TunnelingError>)> {
        self.proxies
            .iter()
            .map(|(id, proxy)| (id.clone(), proxy.get_realized()))
            .collect()
    }
}
