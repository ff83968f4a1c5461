use std::io::Write;
use std::sync::Arc;
use std::thread;

use extproxy::shapes::{self, Shape, ShapeContext};
use extproxy::{Element, ExtensionProxy, ExtensionRegistry, ObjectCreationError, ObjectFactory};

fn shape_factory() -> Arc<dyn ObjectFactory<dyn Shape, ShapeContext>> {
    Arc::new(shapes::builtin_factory())
}

#[test]
fn widget_is_realized_once_and_shared() {
    let proxy = ExtensionProxy::new(
        shape_factory(),
        ShapeContext::default(),
        Element::new("shapes.widget").with("class", "Widget").with("width", 2.0),
    );

    let first = proxy.get_realized().unwrap();
    let second = proxy.get_realized().unwrap();

    assert_eq!(first.kind(), "widget");
    assert_eq!(first.area(), 4.0);
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn missing_type_can_be_fixed_by_reconfiguring() {
    let proxy = ExtensionProxy::new(
        shape_factory(),
        ShapeContext::default(),
        Element::new("shapes.pending").with("class", "Missing"),
    );

    let err = proxy.get_realized().err().unwrap();
    assert!(matches!(
        err.cause(),
        ObjectCreationError::UnknownType { name } if name == "Missing"
    ));
    assert!(!proxy.is_realized());

    proxy.configure(Element::new("shapes.pending").with("class", "Widget"));

    assert_eq!(proxy.get_realized().unwrap().kind(), "widget");
    assert!(proxy.is_realized());
}

#[test]
fn declared_extensions_realize_on_demand() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        br#"
        [[extension]]
        id = "shapes.widget"
        point = "shapes"
        [extension.element]
        class = "Widget"
        width = 3
        height = 2

        [[extension]]
        id = "shapes.circle"
        point = "shapes"
        attribute = "impl"
        [extension.element]
        impl = "Circle"
        radius = 1.0

        [[extension]]
        id = "codecs.gzip"
        point = "codecs"
        [extension.element]
        class = "Gzip"
        "#,
    )
    .unwrap();

    let registry = ExtensionRegistry::load(file.path()).unwrap();
    let point = registry.point(shapes::POINT, shape_factory(), ShapeContext::default());

    assert_eq!(point.len(), 2);
    assert_eq!(point.realized_count(), 0);

    let circle = point.get("shapes.circle").unwrap();
    let readers: Vec<Arc<dyn Shape>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(move || circle.get_realized().unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(readers.iter().all(|shape| Arc::ptr_eq(shape, &readers[0])));
    assert_eq!(readers[0].kind(), "circle");
    assert_eq!(point.realized_count(), 1);
    assert!(point.get("codecs.gzip").is_none());

    let results = point.realize_all();
    assert!(results.iter().all(|(_, result)| result.is_ok()));
    assert_eq!(point.realized_count(), 2);
}

#[test]
fn bundled_demo_declarations_load() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/extensions.toml");

    let registry = ExtensionRegistry::load(&path).unwrap();
    let point = registry.point(shapes::POINT, shape_factory(), ShapeContext::default());

    let outcomes: Vec<bool> = point
        .realize_all()
        .into_iter()
        .map(|(_, result)| result.is_ok())
        .collect();
    assert_eq!(outcomes, vec![true, true, false]);
}
