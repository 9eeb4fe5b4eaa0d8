// Benchmarks for the routing pipeline: graph construction with both
// strategies, and a full resolve (links, search, smoothing) against a
// prebuilt graph. Run with `cargo bench -p corner_router`.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use corner_router::builder::GraphBuilder;
use corner_router::collision::{ExclusionSet, Probe, QueryCache};
use corner_router::config::{GraphStrategy, RouterConfig};
use corner_router::reuse::PathCache;
use corner_router::router::resolve_route;
use corner_router::scene::BoxScene;
use corner_router::Vec3;

/// A wall across x = 5 with a gap between z = 2 and z = 4, plus a pillar
/// field on the near side to give the builders something to reject.
fn bench_scene() -> BoxScene {
    let mut scene = BoxScene::new(0.25);
    scene.add_box(Vec3::new(4.9, -1000.0, -1000.0), Vec3::new(5.1, 1000.0, 2.0));
    scene.add_box(Vec3::new(4.9, -1000.0, 4.0), Vec3::new(5.1, 1000.0, 1000.0));
    for i in 0..4 {
        let x = -6.0 + i as f32 * 2.5;
        scene.add_box(Vec3::new(x, -6.0, -1.0), Vec3::new(x + 0.5, 6.0, -0.5));
    }
    scene
}

fn config_for(strategy: GraphStrategy) -> RouterConfig {
    let mut config = RouterConfig::default();
    config.graph.strategy = strategy;
    config.graph.scan_cell_size = 1.0;
    config.graph.scan_max_cells = 2000;
    config
}

fn bench_graph_build(c: &mut Criterion) {
    let scene = bench_scene();
    let exclusions = ExclusionSet::new();
    let mut group = c.benchmark_group("graph_build");

    for strategy in [GraphStrategy::RandomSamples, GraphStrategy::ReachableScan] {
        let config = config_for(strategy);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{strategy:?}")),
            &config,
            |b, config| {
                b.iter(|| {
                    let mut cache = QueryCache::new();
                    let mut probe = Probe::new(&scene, &exclusions, &mut cache);
                    let mut builder = GraphBuilder::new();
                    builder.build(black_box(Vec3::ZERO), &config.graph, &mut probe)
                });
            },
        );
    }

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let scene = bench_scene();
    let exclusions = ExclusionSet::new();
    let origin = Vec3::ZERO;
    let target = Vec3::new(10.0, 0.0, 0.0);
    let mut group = c.benchmark_group("resolve_route");

    for strategy in [GraphStrategy::RandomSamples, GraphStrategy::ReachableScan] {
        let config = config_for(strategy);
        let mut cache = QueryCache::new();
        let graph = {
            let mut probe = Probe::new(&scene, &exclusions, &mut cache);
            GraphBuilder::new().build(origin, &config.graph, &mut probe).0
        };
        let path_cache = PathCache::new();

        group.bench_function(format!("{strategy:?}"), |b| {
            b.iter(|| {
                let mut cache = QueryCache::new();
                let mut probe = Probe::new(&scene, &exclusions, &mut cache);
                resolve_route(
                    &graph,
                    black_box(origin),
                    black_box(target),
                    &config,
                    &path_cache,
                    &mut probe,
                )
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_graph_build, bench_resolve);
criterion_main!(benches);
