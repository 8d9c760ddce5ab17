//! Path Construction Benchmarks
//!
//! Measures graph building and rendering over the example order model:
//!
//! - **Navigation**: memoized `get` chains and dotted expressions
//! - **Joins**: kind-dispatched joins, typed joins and join chains
//! - **Rendering**: alias assignment and from clause rendering
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench
//! cargo bench navigation
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use query_path::{InMemoryAttributeModel, JoinType, QueryAst, Renderer};
use std::sync::Arc;

fn fresh_ast(model: &Arc<InMemoryAttributeModel>) -> QueryAst {
    QueryAst::with_config(model.clone(), Default::default())
}

// ============================================================================
// Navigation Benchmarks
// ============================================================================

fn bench_navigation(c: &mut Criterion) {
    let model = Arc::new(InMemoryAttributeModel::example());
    let mut group = c.benchmark_group("navigation");

    let expressions = [
        ("single", "number"),
        ("embedded", "shippingAddress.city"),
        ("deep", "customer.address.street"),
    ];

    for (name, expression) in expressions {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("navigate", name), expression, |b, expr| {
            b.iter(|| {
                let mut ast = fresh_ast(&model);
                let root = ast.from("Order").expect("Order is an entity");
                black_box(ast.navigate(root, black_box(expr)))
            });
        });
    }

    group.bench_function("memoized_get", |b| {
        let mut ast = fresh_ast(&model);
        let root = ast.from("Order").expect("Order is an entity");
        b.iter(|| black_box(ast.get(root, black_box("customer"))));
    });

    group.finish();
}

// ============================================================================
// Join Benchmarks
// ============================================================================

fn bench_joins(c: &mut Criterion) {
    let model = Arc::new(InMemoryAttributeModel::example());
    let mut group = c.benchmark_group("joins");

    for name in ["customer", "lines", "payments", "linesBySku"] {
        group.bench_with_input(BenchmarkId::new("join", name), name, |b, name| {
            b.iter(|| {
                let mut ast = fresh_ast(&model);
                let root = ast.from("Order").expect("Order is an entity");
                black_box(ast.join(root, black_box(name)))
            });
        });
    }

    group.bench_function("join_path", |b| {
        b.iter(|| {
            let mut ast = fresh_ast(&model);
            let root = ast.from("Order").expect("Order is an entity");
            black_box(ast.join_path(root, "lines.product.supplier", JoinType::Left))
        });
    });

    group.finish();
}

// ============================================================================
// Rendering Benchmarks
// ============================================================================

fn bench_rendering(c: &mut Criterion) {
    let model = Arc::new(InMemoryAttributeModel::example());
    let mut group = c.benchmark_group("rendering");

    for width in [1usize, 8, 32] {
        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::new("from_clause", width), &width, |b, &width| {
            b.iter(|| {
                let mut ast = fresh_ast(&model);
                let root = ast.from("Order").expect("Order is an entity");
                for _ in 0..width {
                    let lines = ast.join(root, "lines").expect("lines joins");
                    ast.fetch(lines, "product").expect("product fetches");
                }
                let mut renderer = Renderer::new(&mut ast);
                black_box(renderer.render_from_clause())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_navigation, bench_joins, bench_rendering);
criterion_main!(benches);
