//! Benchmarks for the pagination engine

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use script_pager::{paginate, DualSide, Element, ElementType, Engine, PageConfig, Preset};

/// A feature-length script: `scenes` scenes of heading, action and dialogue
fn screenplay(scenes: usize) -> Vec<Element> {
    let mut elements = Vec::with_capacity(scenes * 8);
    for i in 0..scenes {
        let id = |part: &str| format!("s{}-{}", i, part);
        elements.push(Element::new(
            id("h"),
            ElementType::SceneHeading,
            format!("INT. LOCATION {} - NIGHT", i),
        ));
        elements.push(Element::new(
            id("a"),
            ElementType::Action,
            "The room is dark except for a single lamp. Rain hammers the window \
             and somewhere below a car alarm starts, stops, and starts again.",
        ));
        elements.push(Element::new(id("c1"), ElementType::Character, "MAYA"));
        elements.push(
            Element::new(
                id("d1"),
                ElementType::Dialogue,
                "I told you we should have left before the storm. Nobody listens \
                 to me until the roads are closed and the power is out.",
            )
            .with_character("MAYA"),
        );
        if i % 4 == 0 {
            elements.push(
                Element::new(id("c2"), ElementType::Character, "JO")
                    .with_dual_position(DualSide::Left),
            );
            elements.push(
                Element::new(id("d2"), ElementType::Dialogue, "Don't start.")
                    .with_dual_position(DualSide::Left),
            );
            elements.push(
                Element::new(id("c3"), ElementType::Character, "SAM")
                    .with_dual_position(DualSide::Right),
            );
            elements.push(
                Element::new(id("d3"), ElementType::Dialogue, "Here we go again.")
                    .with_dual_position(DualSide::Right),
            );
        }
        elements.push(Element::new(id("t"), ElementType::Transition, "CUT TO:"));
    }
    elements
}

fn bench_paginate_short(c: &mut Criterion) {
    let elements = screenplay(10);
    let config = PageConfig::feature_film();
    c.bench_function("paginate_short_script", |b| {
        b.iter(|| black_box(paginate(black_box(&elements), &config)));
    });
}

fn bench_paginate_feature(c: &mut Criterion) {
    // roughly 120 pages
    let elements = screenplay(240);
    let config = PageConfig::feature_film();
    c.bench_function("paginate_feature_script", |b| {
        b.iter(|| black_box(paginate(black_box(&elements), &config)));
    });
}

fn bench_paginate_multi_camera(c: &mut Criterion) {
    let elements = screenplay(240);
    let config = Preset::MultiCamera.config();
    c.bench_function("paginate_multi_camera", |b| {
        b.iter(|| black_box(paginate(black_box(&elements), &config)));
    });
}

fn bench_handle_message(c: &mut Criterion) {
    let mut engine = Engine::new();
    let _ = engine.handle_json(r#"{"type":"init"}"#);
    let message = serde_json::json!({
        "type": "paginate",
        "requestId": 1,
        "elements": screenplay(60),
        "config": PageConfig::feature_film(),
    })
    .to_string();
    c.bench_function("handle_message_json", |b| {
        b.iter(|| black_box(engine.handle_json(black_box(&message))));
    });
}

criterion_group!(
    benches,
    bench_paginate_short,
    bench_paginate_feature,
    bench_paginate_multi_camera,
    bench_handle_message,
);
criterion_main!(benches);
