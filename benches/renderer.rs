use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use route_topo_renderer::config::{BetaPlacement, Config};
use route_topo_renderer::geometry::Point;
use route_topo_renderer::ir::{Hand, HoldMap, Move, Route};
use route_topo_renderer::layout::compute_layout;
use route_topo_renderer::parser::{parse_hold_map, parse_routes};
use route_topo_renderer::render::render_svg;
use route_topo_renderer::text_metrics::FontSet;
use std::hint::black_box;

const CANVAS: (u32, u32) = (2000, 3000);

/// A wall with a 14-column grid of numbered holds plus lettered foot chips.
fn synthetic_wall(holds: usize) -> HoldMap {
    let mut map = HoldMap::new();
    for i in 0..holds {
        let col = (i % 14) as f32;
        let row = (i / 14) as f32;
        map.insert(
            &(i + 1).to_string(),
            Point::new(100.0 + col * 130.0, 2800.0 - row * 250.0),
        );
    }
    for (i, letter) in ('a'..='z').enumerate() {
        map.insert(
            &letter.to_string(),
            Point::new(80.0 + i as f32 * 70.0, 2900.0),
        );
    }
    map
}

fn synthetic_route(moves: usize, holds: usize) -> Route {
    let mut route = Route::new(format!("Route {moves}"), "V5");
    route.author = "bench".to_string();
    route.moves = (0..moves)
        .map(|i| {
            let id = ((i * 7) % holds + 1).to_string();
            match i {
                0 => Move::start(id),
                _ if i + 1 == moves => Move::finish(id),
                _ if i % 3 == 0 => Move::hand(id, Hand::Both),
                _ if i % 2 == 0 => Move::hand(id, Hand::Right),
                _ => Move::hand(id, Hand::Left),
            }
        })
        .collect();
    for letter in ['a', 'd', 'k', 'q'] {
        route.add_foot(letter.to_string());
    }
    route.beta = Some(
        "Start low with both hands on the jug, step high on the left foot chip and \
         lock off to the crimp before moving through the roof to the finish"
            .repeat(moves / 8 + 1),
    );
    route
}

fn routes_json(count: usize) -> String {
    let routes: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"routeName":"R{i}","difficulty":"V{}","moves":[{{"hold_id":{},"type":"start"}},{{"hold_id":{},"hand":"left"}},{{"hold_id":"{}","type":"finish"}}],"holds":{{"foot":["a","b"]}}}}"#,
                i % 10,
                i + 1,
                i + 2,
                i + 3
            )
        })
        .collect();
    format!(r#"{{"routes":[{}]}}"#, routes.join(","))
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    let holds_json = {
        let entries: Vec<String> = (1..=140)
            .map(|i| format!(r#""{i}":{{"x":{},"y":{}}}"#, i * 10, 3000 - i * 20))
            .collect();
        format!("{{{}}}", entries.join(","))
    };
    group.bench_function("hold_map_140", |b| {
        b.iter(|| parse_hold_map(black_box(&holds_json)).expect("parse failed"))
    });
    for count in [10usize, 100] {
        let input = routes_json(count);
        group.bench_with_input(BenchmarkId::new("routes", count), &input, |b, data| {
            b.iter(|| parse_routes(black_box(data)).expect("parse failed"))
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let fonts = FontSet::fallback();
    let holds = synthetic_wall(140);
    for moves in [8usize, 32, 128] {
        let route = synthetic_route(moves, 140);
        for (mode, placement) in [
            ("overlay", BetaPlacement::Overlay),
            ("extend", BetaPlacement::Extend),
        ] {
            let mut config = Config::default();
            config.layout.beta_placement = placement;
            group.bench_with_input(BenchmarkId::new(mode, moves), &route, |b, route| {
                b.iter(|| compute_layout(black_box(route), &holds, &fonts, &config, CANVAS))
            });
        }
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_svg");
    let fonts = FontSet::fallback();
    let holds = synthetic_wall(140);
    let config = Config::default();
    for moves in [8usize, 128] {
        let layout = compute_layout(&synthetic_route(moves, 140), &holds, &fonts, &config, CANVAS);
        group.bench_with_input(BenchmarkId::from_parameter(moves), &layout, |b, layout| {
            b.iter(|| render_svg(black_box(layout), &fonts))
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_parse, bench_layout, bench_render
);
criterion_main!(benches);
