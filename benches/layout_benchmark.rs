use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::Rng;
use taskmap::config::CanvasConfig;
use taskmap::domain::{Edge, Node, TaskGraph};
use taskmap::services::layout;

fn build_random_tree(node_count: usize) -> TaskGraph {
    let mut rng = rand::thread_rng();
    let mut graph = TaskGraph::new();
    let mut ids = Vec::with_capacity(node_count);
    for i in 0..node_count {
        let mut node = Node::new(format!("Task {i}"), format!("Description for task {i}"));
        node.x = rng.gen_range(-5000.0..5000.0);
        node.y = rng.gen_range(-5000.0..5000.0);
        ids.push(graph.add_node(node));
    }
    // Every node after the first hangs off a random earlier node, so the
    // board is one big tree with realistic fan-out.
    for i in 1..node_count {
        let parent = ids[rng.gen_range(0..i)];
        graph.add_edge(Edge::new(parent, ids[i]));
    }
    graph
}

fn layout_benchmark(c: &mut Criterion) {
    let config = CanvasConfig::default();
    let mut group = c.benchmark_group("auto_layout");
    for size in [100, 1_000, 5_000] {
        let graph = build_random_tree(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, graph| {
            b.iter(|| layout::arrange(black_box(graph), &config));
        });
    }
    group.finish();
}

criterion_group!(benches, layout_benchmark);
criterion_main!(benches);
