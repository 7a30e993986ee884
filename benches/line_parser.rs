use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use qdas_processor::characteristics::CharacteristicTable;
use qdas_processor::header::parse_header;
use qdas_processor::parser::MeasurementLineParser;
use std::hint::black_box;

fn characteristic_table(count: usize) -> CharacteristicTable {
    let lines: Vec<String> = (1..=count)
        .map(|i| format!("K2002/{} Characteristic {}", i, i))
        .collect();
    parse_header(lines.iter().map(String::as_str)).characteristics
}

fn messdate_lines(events: usize, characteristics: usize) -> Vec<String> {
    (0..events)
        .map(|event| {
            (0..characteristics)
                .map(|c| format!("{}.{:03}\u{14}0\u{14}5.7.2006/10:48:{}", 50 + c, event % 1000, event % 60))
                .collect::<Vec<_>>()
                .join("\u{0F}")
        })
        .collect()
}

fn bosch_lines(events: usize, characteristics: usize) -> Vec<String> {
    (0..events)
        .map(|event| {
            (0..characteristics)
                .map(|c| {
                    format!(
                        "{:.14E} 0 06.09.2002/12:41:{:02} #{:04} 17 OP1",
                        6.0 + c as f64 * 0.001,
                        event % 60,
                        event % 10000
                    )
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn bench_parse_lines(c: &mut Criterion) {
    let parser = MeasurementLineParser::new();
    let table = characteristic_table(8);

    let mut group = c.benchmark_group("parse_lines");

    let messdate = messdate_lines(1000, 8);
    group.throughput(Throughput::Elements(messdate.len() as u64));
    group.bench_function("messdate_1000x8", |b| {
        b.iter(|| parser.parse_lines(black_box(messdate.iter().map(String::as_str)), &table))
    });

    let bosch = bosch_lines(1000, 8);
    group.throughput(Throughput::Elements(bosch.len() as u64));
    group.bench_function("bosch_1000x8", |b| {
        b.iter(|| parser.parse_lines(black_box(bosch.iter().map(String::as_str)), &table))
    });

    group.finish();
}

criterion_group!(benches, bench_parse_lines);
criterion_main!(benches);
