use sirenia::graphlib::Graph;
use sirenia::{Box2D, CircularLayout, Error, LayoutModel, MapLayoutModel, Point};

fn square() -> Graph {
    let mut g: Graph = Graph::undirected();
    g.set_path(&["a", "b", "c", "d", "a"]);
    g
}

#[test]
fn vertices_are_spaced_evenly_around_the_center() {
    let g = square();
    let mut model = MapLayoutModel::new(Box2D::of_size(2.0, 2.0));
    CircularLayout::new(1.0).unwrap().layout(&g, &mut model).unwrap();

    let expected = [
        ("a", Point::new(2.0, 1.0)),
        ("b", Point::new(1.0, 2.0)),
        ("c", Point::new(0.0, 1.0)),
        ("d", Point::new(1.0, 0.0)),
    ];
    for (v, p) in expected {
        let got = model.get(v).unwrap();
        assert!(got.approx_eq(p, 1e-12), "{v}: {got:?} != {p:?}");
    }
}

#[test]
fn comparator_controls_the_order() {
    let g = square();
    let mut model = MapLayoutModel::new(Box2D::of_size(2.0, 2.0));
    CircularLayout::new(1.0)
        .unwrap()
        .with_order(|a, b| b.cmp(a))
        .layout(&g, &mut model)
        .unwrap();

    assert!(model.get("d").unwrap().approx_eq(Point::new(2.0, 1.0), 1e-12));
    assert!(model.get("a").unwrap().approx_eq(Point::new(1.0, 0.0), 1e-12));
}

#[test]
fn fixed_vertices_keep_their_place() {
    let g = square();
    let mut model = MapLayoutModel::new(Box2D::of_size(2.0, 2.0));
    model.put("b", Point::new(0.5, 0.5));
    model.set_fixed("b", true);
    CircularLayout::new(1.0).unwrap().layout(&g, &mut model).unwrap();
    assert_eq!(model.get("b"), Some(Point::new(0.5, 0.5)));
    assert!(model.get("c").unwrap().approx_eq(Point::new(0.0, 1.0), 1e-12));
}

#[test]
fn radius_must_be_positive() {
    assert!(matches!(
        CircularLayout::new(0.0),
        Err(Error::InvalidOption { name: "radius", .. })
    ));
    assert!(CircularLayout::new(f64::NAN).is_err());
}
