use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use metar_weather::{nearest_n, resolve_nearest_with, Airport, LatLon, MetarDecoder, SpatialIndex};
use std::collections::HashMap;

const REPORT: &str =
    "METAR UUEE 151030Z 27005MPS 240V300 9999 -SHRA BKN020CB OVC050 12/08 Q1013 R24L/290050 NOSIG RMK QFE745";

/// A one degree grid of airports over western Russia, every third one reporting.
fn airports_and_observations() -> (Vec<Airport>, HashMap<String, String>) {
    let mut airports = Vec::new();
    let mut observations = HashMap::new();
    for lat in 45..70 {
        for lon in 25..60 {
            let code = format!("X{:03}", airports.len());
            if airports.len() % 3 == 0 {
                observations.insert(
                    code.clone(),
                    format!("{} 151030Z 27005MPS 9999 BKN020 12/08 Q1013", code),
                );
            }
            airports.push(Airport::new(code, "Grid", lat as f64, lon as f64));
        }
    }
    (airports, observations)
}

fn bench_metar_weather(c: &mut Criterion) {
    let decoder = MetarDecoder::builder()
        .reference_date(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap())
        .build();
    let (airports, observations) = airports_and_observations();
    let index = SpatialIndex::new(airports.clone());
    let moscow = LatLon(55.7558, 37.6173);

    c.bench_function("decode", |b| b.iter(|| decoder.decode(black_box(REPORT))));
    c.bench_function("nearest_n", |b| {
        b.iter(|| nearest_n(black_box(moscow), &airports, 10))
    });
    c.bench_function("spatial_index_nearest", |b| {
        b.iter(|| index.nearest(black_box(moscow), 10))
    });
    c.bench_function("resolve_nearest", |b| {
        b.iter(|| resolve_nearest_with(&decoder, black_box(moscow), &airports, &observations, 10))
    });
}

criterion_group!(benches, bench_metar_weather);
criterion_main!(benches);
