use criterion::{black_box, criterion_group, criterion_main, Criterion};

use motif_core::schema::Document;
use motif_core::{resolve, Interpreter, RecordingHandle, RecordingLog};

fn full_run(c: &mut Criterion) {
    let doc: Document =
        motif_test_fixtures::documents::load("stagger-grid").expect("fixture should load");
    let resolved = resolve(&doc).data;
    let tiles = ["tile-1", "tile-2", "tile-3", "tile-4", "tile-5"];

    c.bench_function("stagger_grid_full_run", |b| {
        b.iter(|| {
            let mut interp = Interpreter::new(resolved.clone());
            let log = RecordingLog::default();
            for id in tiles {
                interp.register_handle(id, Box::new(RecordingHandle::new(id, log.clone())));
            }
            interp.play();
            interp.advance(1.0);
            black_box(interp.take_events());
        })
    });
}

fn resolve_document(c: &mut Criterion) {
    let doc: Document =
        motif_test_fixtures::documents::load("card-intro").expect("fixture should load");
    c.bench_function("resolve_card_intro", |b| {
        b.iter(|| black_box(resolve(&doc)))
    });
}

criterion_group!(benches, full_run, resolve_document);
criterion_main!(benches);
