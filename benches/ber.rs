//! BER codec benchmarks.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use usnmp::ber::{Decoder, TlvWriter};
use usnmp::oid::Oid;
use usnmp::{Value, VarBindList, oid};

fn common_oids() -> Vec<(&'static str, Oid)> {
    vec![
        ("sysDescr", oid!(B, 1, 1, 0)),
        ("sysUpTime", oid!(B, 1, 3, 0)),
        ("ifIndex", oid!(B, 2, 2, 1, 1, 1)),
        ("long", oid!(P, 38644, 30, 1, 2, 3, 4, 5, 6, 7, 100_000, 200_000)),
    ]
}

fn bench_oid(c: &mut Criterion) {
    let mut group = c.benchmark_group("oid");
    for (name, oid) in common_oids() {
        group.bench_with_input(BenchmarkId::new("to_ber", name), &oid, |b, oid| {
            b.iter(|| black_box(oid.to_ber()))
        });
        let encoded = oid.to_ber().unwrap();
        group.bench_with_input(BenchmarkId::new("from_ber", name), &encoded, |b, data| {
            b.iter(|| black_box(Oid::from_ber(data)))
        });
        let text = oid.to_string();
        group.bench_with_input(BenchmarkId::new("parse", name), &text, |b, text| {
            b.iter(|| black_box(Oid::parse(text)))
        });
    }
    group.finish();
}

fn bench_integer(c: &mut Criterion) {
    let mut group = c.benchmark_group("integer");
    for value in [0, 127, 128, -1, i32::MAX, i32::MIN] {
        group.bench_with_input(BenchmarkId::new("encode", value), &value, |b, &value| {
            b.iter(|| {
                let mut w = TlvWriter::new(8);
                w.put_integer(black_box(value)).unwrap();
                black_box(w.len())
            })
        });
    }
    group.finish();
}

fn sample_list(count: usize) -> VarBindList {
    let mut list = VarBindList::with_capacity(2048);
    for i in 0..count {
        list.append(&oid!(B, 2, 2, 1, 2, i as u32), &Value::from("GigabitEthernet0/1"))
            .unwrap();
    }
    list
}

fn bench_varbind_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("varbind_list");
    for count in [1, 10, 30] {
        group.bench_with_input(BenchmarkId::new("append", count), &count, |b, &count| {
            b.iter(|| black_box(sample_list(count)))
        });
        let list = sample_list(count);
        group.bench_with_input(BenchmarkId::new("iterate", count), &list, |b, list| {
            b.iter(|| {
                for vb in list.iter() {
                    black_box(vb.unwrap());
                }
            })
        });
        group.bench_with_input(BenchmarkId::new("skip_tlvs", count), &list, |b, list| {
            b.iter(|| {
                let mut dec = Decoder::new(list.as_bytes());
                let mut items = dec.read_sequence().unwrap();
                while !items.is_empty() {
                    black_box(items.read_tlv().unwrap());
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_oid, bench_integer, bench_varbind_list);
criterion_main!(benches);
