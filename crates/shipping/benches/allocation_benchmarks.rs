use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use checkout_core::{DestinationId, LineItemId};
use checkout_shipping::{Destination, LineItem, summarize};

/// Cart of `items` line items spread round-robin over `destinations`.
fn fixture(items: usize, destinations: usize) -> (Vec<LineItem>, Vec<Destination>) {
    let line_items: Vec<LineItem> = (0..items)
        .map(|i| LineItem::new(i.to_string(), format!("item {i}"), 3))
        .collect();

    let destinations = (0..destinations)
        .map(|d| {
            Destination::with_items(
                DestinationId::new(),
                (0..items)
                    .filter(|i| i % destinations == d)
                    .map(|i| (LineItemId::from(i.to_string()), 2)),
            )
        })
        .collect();

    (line_items, destinations)
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");

    for (items, destinations) in [(10, 2), (100, 5), (1_000, 20)] {
        let (line_items, dests) = fixture(items, destinations);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{items}x{destinations}")),
            &(line_items, dests),
            |b, (line_items, dests)| {
                b.iter(|| {
                    let summary = summarize(black_box(line_items), black_box(dests));
                    black_box(summary.banner())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_summarize);
criterion_main!(benches);
