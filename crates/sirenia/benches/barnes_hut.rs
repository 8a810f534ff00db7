use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sirenia::algo::fr::{BarnesHut, repulsive_force};
use sirenia::graphlib::Graph;
use sirenia::{Box2D, FrLayout, FrOptions, MapLayoutModel, Point, QuadTree, RepulsionStrategy};
use std::hint::black_box;
use std::time::Duration;

fn uniform_points(n: usize, side: f64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    (0..n)
        .map(|_| Point::new(rng.random::<f64>() * side, rng.random::<f64>() * side))
        .collect()
}

/// Sparse random graph: a spanning path plus `extra` random chords per vertex.
fn random_graph(n: usize, extra: usize) -> Graph {
    let mut rng = StdRng::seed_from_u64(n as u64);
    let mut g: Graph = Graph::undirected();
    for i in 0..n {
        g.ensure_node(format!("n{i}"));
        if i > 0 {
            g.set_edge(format!("n{}", i - 1), format!("n{i}"));
        }
    }
    for i in 0..n {
        for _ in 0..extra {
            let j = rng.random_range(0..n);
            if j != i {
                g.set_edge(format!("n{i}"), format!("n{j}"));
            }
        }
    }
    g
}

fn bench_quadtree_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree");
    let region = Box2D::of_size(1000.0, 1000.0);

    for n in [1_000usize, 10_000, 50_000] {
        let points = uniform_points(n, 1000.0);
        group.bench_with_input(BenchmarkId::new("build", n), &points, |b, points| {
            b.iter(|| {
                let tree = QuadTree::from_points(region, points.iter().copied()).unwrap();
                black_box(tree.depth());
            })
        });
    }

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("barnes_hut");
    let region = Box2D::of_size(1000.0, 1000.0);
    let points = uniform_points(10_000, 1000.0);
    let tree = QuadTree::from_points(region, points.iter().copied()).unwrap();

    for theta in [0.0, 0.5, 1.0] {
        let bh = BarnesHut::new(theta).unwrap();
        group.bench_with_input(
            BenchmarkId::new("evaluate_100_queries", theta),
            &bh,
            |b, bh| {
                b.iter(|| {
                    for &p in points.iter().take(100) {
                        black_box(bh.evaluate(&tree, black_box(p), |d| repulsive_force(d, 5.0)));
                    }
                })
            },
        );
    }

    group.finish();
}

fn bench_fr_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("fr_layout");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    let cases = [
        ("exact", 500usize, RepulsionStrategy::Exact),
        ("barnes_hut", 500, RepulsionStrategy::BarnesHut { theta: 0.5 }),
        ("barnes_hut", 2_000, RepulsionStrategy::BarnesHut { theta: 0.5 }),
    ];

    for (name, n, repulsion) in cases {
        let g = random_graph(n, 1);
        let opts = FrOptions {
            iterations: 20,
            repulsion,
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new(name, n), &g, |b, g| {
            b.iter_batched(
                || MapLayoutModel::new(Box2D::of_size(1000.0, 1000.0)),
                |mut model| {
                    let mut fr = FrLayout::new(opts.clone()).unwrap();
                    let stats = fr
                        .layout(g, &mut model, &mut StdRng::seed_from_u64(1))
                        .unwrap();
                    black_box(stats.saved_comparisons);
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_quadtree_build, bench_evaluate, bench_fr_layout);
criterion_main!(benches);
