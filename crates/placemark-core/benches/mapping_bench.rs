//! Benchmarks for provider parsing and the field-selection heuristic.

#![allow(clippy::unwrap_used)]

use criterion::{Criterion, criterion_group, criterion_main};
use placemark_core::{map_place, parse_json, parse_xml};
use std::hint::black_box;

const MONACO_XML: &str = include_str!("../tests/fixtures/monaco.xml");
const MUNICH_JSON: &str = include_str!("../tests/fixtures/munich.json");

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_xml_monaco", |b| {
        b.iter(|| parse_xml(black_box(MONACO_XML)).unwrap());
    });
    c.bench_function("parse_json_munich", |b| {
        b.iter(|| parse_json(black_box(MUNICH_JSON)).unwrap());
    });
}

fn bench_map(c: &mut Criterion) {
    let place = parse_json(MUNICH_JSON).unwrap();
    c.bench_function("map_place_munich", |b| {
        b.iter(|| map_place(black_box(&place)));
    });
}

criterion_group!(benches, bench_parse, bench_map);
criterion_main!(benches);
