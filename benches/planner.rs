use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use planr::canvas::{Canvas, Viewport};
use planr::config::Config;
use planr::diagram::to_diagram;
use planr::layout::{LayoutDirection, layout_nodes};
use planr::model::{ExpertiseArea, ExpertiseAreas, Project, ProjectLink, ProjectNode};
use planr::render::render_svg;
use planr::sync::{Origin, reconcile};
use std::hint::black_box;

/// Chain of `nodes` work items plus `extra_edges` forward skip links.
fn dense_project(nodes: usize, extra_edges: usize) -> Project {
    let mut project = Project::new("Bench", "synthetic dependency graph");
    for i in 0..nodes {
        let area = ExpertiseArea::ALL[i % ExpertiseArea::ALL.len()];
        project.nodes.push(ProjectNode {
            id: format!("n{i}"),
            name: format!("Task {i}"),
            description: format!("work item number {i}"),
            expertise_areas: ExpertiseAreas::with(&[area]),
            x: 0.0,
            y: 0.0,
        });
    }
    for i in 0..nodes.saturating_sub(1) {
        project
            .links
            .push(ProjectLink::new(format!("c{i}"), format!("n{i}"), format!("n{}", i + 1)));
    }
    let mut count = 0usize;
    'outer: for i in 0..nodes {
        for j in (i + 2)..nodes {
            if count >= extra_edges {
                break 'outer;
            }
            project
                .links
                .push(ProjectLink::new(format!("s{count}"), format!("n{i}"), format!("n{j}")));
            count += 1;
        }
    }
    project
}

fn canvas_for(project: &Project) -> Canvas {
    let (nodes, edges) = to_diagram(project);
    Canvas::new(nodes, edges, Viewport::new(1200.0, 800.0))
}

const SIZES: [(&str, usize, usize); 3] = [("small", 8, 4), ("medium", 40, 30), ("large", 150, 120)];

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = Config::default();
    for (name, nodes, extra) in SIZES {
        let canvas = canvas_for(&dense_project(nodes, extra));
        for direction in [LayoutDirection::TopToBottom, LayoutDirection::LeftToRight] {
            group.bench_with_input(
                BenchmarkId::new(format!("{direction:?}"), name),
                &canvas,
                |b, data| {
                    b.iter(|| {
                        let laid_out = layout_nodes(
                            black_box(&data.nodes),
                            black_box(&data.edges),
                            direction,
                            &config.layout,
                            &config.card,
                        );
                        black_box(laid_out.len());
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    for (name, nodes, extra) in SIZES {
        let project = dense_project(nodes, extra);
        group.bench_with_input(BenchmarkId::from_parameter(name), &project, |b, data| {
            b.iter(|| {
                let mut project = data.clone();
                let mut canvas = Canvas::new(Vec::new(), Vec::new(), Viewport::new(1200.0, 800.0));
                black_box(reconcile(&mut project, &mut canvas, Origin::Domain));
            })
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_svg");
    let config = Config::default();
    for (name, nodes, extra) in SIZES {
        let mut canvas = canvas_for(&dense_project(nodes, extra));
        canvas.nodes = layout_nodes(
            &canvas.nodes,
            &canvas.edges,
            LayoutDirection::TopToBottom,
            &config.layout,
            &config.card,
        );
        group.bench_with_input(BenchmarkId::from_parameter(name), &canvas, |b, data| {
            b.iter(|| {
                let svg = render_svg(black_box(data), &config.theme, &config);
                black_box(svg.len());
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layout, bench_reconcile, bench_render);
criterion_main!(benches);
