use rand::SeedableRng;
use rand::rngs::StdRng;
use sirenia::graphlib::Graph;
use sirenia::{
    Algorithm, Box2D, CircularOptions, FrOptions, KamadaKawaiOptions, LayoutModel,
    ListenableLayoutModel, MapLayoutModel, Point, layout,
};
use std::sync::{Arc, Mutex};

fn star() -> Graph {
    let mut g: Graph = Graph::default();
    for leaf in ["b", "c", "d", "e"] {
        g.set_edge("hub", leaf);
    }
    g
}

#[test]
fn every_algorithm_places_every_vertex_inside_the_area() {
    let g = star();
    let area = Box2D::new(5.0, 5.0, 30.0, 20.0);
    let algorithms = [
        Algorithm::Random,
        Algorithm::Circular(CircularOptions::default()),
        Algorithm::FruchtermanReingold(FrOptions::default()),
        Algorithm::KamadaKawai(KamadaKawaiOptions::default()),
    ];

    for algorithm in &algorithms {
        let mut model = MapLayoutModel::new(area);
        layout(&g, &mut model, algorithm, &mut StdRng::seed_from_u64(6)).unwrap();
        let positions = model.collect();
        assert_eq!(positions.len(), 5, "{algorithm:?}");
        for p in positions.values() {
            assert!(area.contains(*p), "{algorithm:?} put {p:?} outside");
        }
    }
}

#[test]
fn listeners_hear_each_committed_move() {
    let g = star();
    let events: Arc<Mutex<Vec<(String, Point)>>> = Arc::new(Mutex::new(Vec::new()));
    let mut model = ListenableLayoutModel::new(MapLayoutModel::new(Box2D::of_size(10.0, 10.0)));
    let sink = Arc::clone(&events);
    let id = model.add_listener(move |v, p| sink.lock().unwrap().push((v.to_string(), p)));

    layout(
        &g,
        &mut model,
        &Algorithm::Random,
        &mut StdRng::seed_from_u64(1),
    )
    .unwrap();
    {
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 5);
        for (v, p) in events.iter() {
            assert_eq!(model.get(v), Some(*p));
        }
    }

    assert!(model.remove_listener(id));
    assert!(!model.remove_listener(id));
    layout(
        &g,
        &mut model,
        &Algorithm::Random,
        &mut StdRng::seed_from_u64(2),
    )
    .unwrap();
    assert_eq!(events.lock().unwrap().len(), 5);
}

#[test]
fn puts_to_fixed_vertices_are_silent() {
    let events = Arc::new(Mutex::new(0usize));
    let mut model = ListenableLayoutModel::new(MapLayoutModel::new(Box2D::of_size(10.0, 10.0)));
    let sink = Arc::clone(&events);
    model.add_listener(move |_, _| *sink.lock().unwrap() += 1);

    model.put("a", Point::new(1.0, 1.0));
    model.set_fixed("a", true);
    assert_eq!(model.put("a", Point::new(2.0, 2.0)), Some(Point::new(1.0, 1.0)));
    assert_eq!(*events.lock().unwrap(), 1);
    assert_eq!(model.listener_count(), 1);
}

#[test]
fn algorithm_selection_deserializes_from_json() {
    let algo: Algorithm = serde_json::from_str(
        r#"{ "kind": "fruchterman_reingold", "iterations": 10, "optimal_distance": 2.0 }"#,
    )
    .unwrap();
    let Algorithm::FruchtermanReingold(opts) = algo else {
        panic!("expected fruchterman-reingold, got {algo:?}");
    };
    assert_eq!(opts.iterations, 10);
    assert_eq!(opts.optimal_distance, Some(2.0));

    let circular: Algorithm = serde_json::from_str(r#"{ "kind": "circular" }"#).unwrap();
    assert!(matches!(
        circular,
        Algorithm::Circular(CircularOptions { radius: None })
    ));
}
