//! Benchmark: index build and per-frame hit testing on large documents.
//!
//! Run with: `cargo bench -p blocksel --bench hit_test_bench`
//!
//! A frame budget is ~16ms; one hit-test pass should stay far below it even
//! for documents with thousands of blocks.

use std::hint::black_box;

use blocksel::hit_test;
use blocksel::node_index::NodeIndex;
use blocksel::{
    CoordinateSpace, Modifiers, NodeId, Rect, Scope, SelectType, SelectableNode, SelectionSet,
    TreeProvider,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

/// `sections` top-level blocks, each with `per_section` children, stacked
/// 30px apart in document order.
struct Outline {
    sections: usize,
    per_section: usize,
}

impl Outline {
    fn len(&self) -> usize {
        self.sections * (self.per_section + 1)
    }

    fn id(i: usize) -> NodeId {
        NodeId::new(format!("b{i}"))
    }

    fn is_section(&self, i: usize) -> bool {
        i % (self.per_section + 1) == 0
    }
}

impl TreeProvider for Outline {
    fn selectable_nodes(&self, _scope: Scope) -> Vec<SelectableNode> {
        (0..self.len())
            .map(|i| {
                let node = SelectableNode::new(
                    SelectType::Block,
                    Self::id(i),
                    Rect::new(0.0, i as f64 * 30.0, 600.0, 24.0),
                );
                if self.is_section(i) { node.with_children() } else { node }
            })
            .collect()
    }

    fn rect_of(&self, _scope: Scope, id: &NodeId) -> Option<Rect> {
        let i: usize = id.as_str().strip_prefix('b')?.parse().ok()?;
        Some(Rect::new(0.0, i as f64 * 30.0, 600.0, 24.0))
    }

    fn child_ids(&self, id: &NodeId) -> Vec<NodeId> {
        let Some(i) = id.as_str().strip_prefix('b').and_then(|s| s.parse::<usize>().ok()) else {
            return Vec::new();
        };
        if !self.is_section(i) {
            return Vec::new();
        }
        (i + 1..=i + self.per_section).map(Self::id).collect()
    }

    fn is_atomic(&self, _id: &NodeId) -> bool {
        false
    }

    fn document_order(&self) -> Vec<NodeId> {
        (0..self.len()).map(Self::id).collect()
    }
}

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");
    for sections in [10, 100, 250] {
        let doc = Outline {
            sections,
            per_section: 3,
        };
        group.bench_with_input(BenchmarkId::from_parameter(doc.len()), &doc, |b, doc| {
            b.iter(|| NodeIndex::build(black_box(doc), Scope::Page, CoordinateSpace::PAGE));
        });
    }
    group.finish();
}

fn bench_hit_test(c: &mut Criterion) {
    let mut group = c.benchmark_group("hit_test_frame");
    let doc = Outline {
        sections: 250,
        per_section: 3,
    };
    let index = NodeIndex::build(&doc, Scope::Page, CoordinateSpace::PAGE);
    let empty = SelectionSet::new();

    let mut start = SelectionSet::new();
    start.extend(SelectType::Block, (0..doc.len()).step_by(7).map(Outline::id));

    // Small, viewport-sized and whole-document rectangles.
    for (name, rect) in [
        ("small", Rect::new(10.0, 300.0, 50.0, 100.0)),
        ("viewport", Rect::new(10.0, 3000.0, 500.0, 900.0)),
        ("document", Rect::new(0.0, 0.0, 600.0, 30_000.0)),
    ] {
        group.bench_function(BenchmarkId::new("replace", name), |b| {
            b.iter(|| {
                hit_test::evaluate(
                    black_box(&rect),
                    &index,
                    Modifiers::NONE,
                    &empty,
                    &empty,
                )
            });
        });
        group.bench_function(BenchmarkId::new("toggle", name), |b| {
            b.iter(|| hit_test::evaluate(black_box(&rect), &index, Modifiers::CTRL, &start, &start));
        });
    }
    group.finish();
}

fn bench_refresh(c: &mut Criterion) {
    let doc = Outline {
        sections: 250,
        per_section: 3,
    };
    let mut index = NodeIndex::build(&doc, Scope::Page, CoordinateSpace::PAGE);
    c.bench_function("refresh_boxes_1000", |b| {
        b.iter(|| index.refresh_boxes(black_box(&doc), CoordinateSpace::PAGE));
    });
}

criterion_group!(benches, bench_index_build, bench_hit_test, bench_refresh);
criterion_main!(benches);
