//! Built-in `shapes` extension point used by the command line tool.

use std::sync::Arc;

use crate::extension::element::Element;
use crate::extension::error::{ConfigurationError, ObjectCreationError};
use crate::extension::factory::FactoryRegistry;

pub const POINT: &str = "shapes";

pub trait Shape: Send + Sync {
    fn kind(&self) -> &'static str;

    fn area(&self) -> f64;

    fn describe(&self) -> String {
        format!("{} (area {:.2})", self.kind(), self.area())
    }
}

/// Passed to every shape builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeContext {
    pub host: String,
    pub scale: f64,
}

impl Default for ShapeContext {
    fn default() -> Self {
        Self {
            host: "extproxy".to_string(),
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub width: f64,
    pub height: f64,
}

impl Shape for Widget {
    fn kind(&self) -> &'static str {
        "widget"
    }

    fn area(&self) -> f64 {
        self.width * self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub radius: f64,
}

impl Shape for Circle {
    fn kind(&self) -> &'static str {
        "circle"
    }

    fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }
}

fn dimension(element: &Element, key: &str, default: f64) -> Result<f64, ConfigurationError> {
    let value = element.param::<f64>(key)?.unwrap_or(default);
    if value.is_finite() && value >= 0.0 {
        return Ok(value);
    }

    Err(ConfigurationError::InvalidParameter {
        element: element.name().to_string(),
        key: key.to_string(),
        reason: format!("expected a non-negative size, got {value}"),
    })
}

fn build_widget(
    element: &Element,
    context: &ShapeContext,
) -> Result<Arc<dyn Shape>, ObjectCreationError> {
    let width = dimension(element, "width", 1.0)?;
    let height = dimension(element, "height", width)?;

    Ok(Arc::new(Widget {
        width: width * context.scale,
        height: height * context.scale,
    }))
}

fn build_circle(
    element: &Element,
    context: &ShapeContext,
) -> Result<Arc<dyn Shape>, ObjectCreationError> {
    let radius = element.require::<f64>("radius")?;
    if !(radius.is_finite() && radius > 0.0) {
        return Err(ObjectCreationError::construction(
            element.name(),
            format!("circle radius must be positive, got {radius}"),
        ));
    }

    Ok(Arc::new(Circle {
        radius: radius * context.scale,
    }))
}

pub fn builtin_factory() -> FactoryRegistry<dyn Shape, ShapeContext> {
    let mut registry = FactoryRegistry::new();
    registry
        .register("Widget", build_widget)
        .register("Circle", build_circle);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::factory::ObjectFactory;

    #[test]
    fn widget_height_defaults_to_width() {
        let element = Element::new("w").with("class", "Widget").with("width", 3.0);

        let shape = builtin_factory()
            .create(&element, "class", &ShapeContext::default())
            .unwrap();

        assert_eq!(shape.kind(), "widget");
        assert_eq!(shape.area(), 9.0);
    }

    #[test]
    fn context_scale_applies() {
        let element = Element::new("w")
            .with("class", "Widget")
            .with("width", 2.0)
            .with("height", 1.0);
        let context = ShapeContext {
            scale: 2.0,
            ..ShapeContext::default()
        };

        let shape = builtin_factory().create(&element, "class", &context).unwrap();

        assert_eq!(shape.area(), 8.0);
        assert_eq!(shape.describe(), "widget (area 8.00)");
    }

    #[test]
    fn negative_dimensions_are_configuration_errors() {
        let element = Element::new("w").with("class", "Widget").with("width", -1.0);

        let err = builtin_factory()
            .create(&element, "class", &ShapeContext::default())
            .err()
            .unwrap();

        assert!(matches!(
            err,
            ObjectCreationError::Configuration(ConfigurationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn circles_need_a_positive_radius() {
        let element = Element::new("c").with("class", "Circle").with("radius", 0.0);

        let err = builtin_factory()
            .create(&element, "class", &ShapeContext::default())
            .err()
            .unwrap();

        assert!(matches!(err, ObjectCreationError::Construction { ref name, .. } if name == "c"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn circles_reject_non_finite_radii() {
        for radius in [f64::NAN, f64::INFINITY, -2.0] {
            let element = Element::new("c").with("class", "Circle").with("radius", radius);

            let result = builtin_factory().create(&element, "class", &ShapeContext::default());

            assert!(
                matches!(result, Err(ObjectCreationError::Construction { .. })),
                "radius {radius} was accepted"
            );
        }
    }
}
