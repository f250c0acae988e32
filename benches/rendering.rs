//! Benchmarks for piece rendering.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use magbind::markdown::{extract_fields, format_poem, render_story};

fn sample_story() -> String {
    let mut story = String::from("# The Long Tide\n\n## by Ada Quill\n\n");
    for scene in 0..20 {
        for para in 0..12 {
            story.push_str(&format!(
                "Scene {scene}, paragraph {para}: \"Wait,\" she said -- it's _late_, \
                 and the **tide** (c) is turning...\n\n"
            ));
        }
        story.push_str("***\n\n");
    }
    story
}

fn sample_poem() -> String {
    let mut poem = String::from("# Salt\n## by Basil Rhyme\n\n");
    for line in 0..400 {
        let indent = "\t".repeat(line % 3);
        poem.push_str(&format!("{indent}line {line} of the _long_ poem\n"));
        if line % 8 == 7 {
            poem.push('\n');
        }
    }
    poem
}

fn bench_rendering(c: &mut Criterion) {
    let story = sample_story();
    let poem = sample_poem();

    let mut group = c.benchmark_group("rendering");
    group.bench_function("story", |b| b.iter(|| render_story(black_box(&story))));
    group.bench_function("poem", |b| b.iter(|| format_poem(black_box(&poem))));
    group.bench_function("extract_fields", |b| {
        b.iter(|| extract_fields(black_box(&story)))
    });
    group.finish();
}

criterion_group!(benches, bench_rendering);
criterion_main!(benches);
