//! Benchmarks for activeresource_xml performance.

use activeresource_xml::reader::{XmlEvent, XmlReader};
use activeresource_xml::{parse, Value};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::fmt::Write;
use std::hint::black_box;

fn simple_xml() -> &'static str {
    r#"<product><name>Test Item</name><value type="integer">42</value><active type="boolean">true</active></product>"#
}

fn record_xml(id: usize) -> String {
    format!(
        r#"<person>
    <id type="integer">{id}</id>
    <first-name>First{id}</first-name>
    <last-name>Last{id}</last-name>
    <email>person{id}@example.com</email>
    <salary type="decimal">{id}1234.50</salary>
    <hired-on type="date">2020-01-{day:02}</hired-on>
    <updated-at type="datetime">2024-03-01T08:{min:02}:00Z</updated-at>
    <address>
      <street>{id} Oak Street</street>
      <city>Oakland</city>
      <zip>9460{zip}</zip>
    </address>
    <phone-numbers type="array">
      <phone-number>555-000{zip}</phone-number>
      <phone-number>555-100{zip}</phone-number>
    </phone-numbers>
  </person>"#,
        id = id,
        day = id % 28 + 1,
        min = id % 60,
        zip = id % 10,
    )
}

fn collection_xml(size: usize) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push_str("\n<people type=\"array\">\n");
    for i in 0..size {
        let _ = writeln!(xml, "  {}", record_xml(i));
    }
    xml.push_str("</people>\n");
    xml
}

fn nested_xml(depth: usize) -> String {
    let mut xml = String::new();
    for i in 0..depth {
        let _ = write!(xml, "<level{}><id type=\"integer\">{}</id>", i, i);
    }
    for i in (0..depth).rev() {
        let _ = write!(xml, "</level{}>", i);
    }
    xml
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("Parse");

    let simple = simple_xml();
    let record = format!("<wrapper>{}</wrapper>", record_xml(7));
    let nested = nested_xml(64);

    group.throughput(Throughput::Bytes(simple.len() as u64));
    group.bench_function("simple", |b| b.iter(|| parse(black_box(simple))));

    group.throughput(Throughput::Bytes(record.len() as u64));
    group.bench_function("record", |b| b.iter(|| parse(black_box(&record))));

    group.throughput(Throughput::Bytes(nested.len() as u64));
    group.bench_function("nested", |b| b.iter(|| parse(black_box(&nested))));

    group.finish();
}

fn bench_xml_reader(c: &mut Criterion) {
    let mut group = c.benchmark_group("XmlReader");

    let xml = collection_xml(10);

    group.throughput(Throughput::Bytes(xml.len() as u64));
    group.bench_function("read_events", |b| {
        b.iter(|| {
            let mut reader = XmlReader::from_str(black_box(&xml));
            let mut count = 0;
            loop {
                match reader.next_event() {
                    Ok(XmlEvent::Eof) => break,
                    Ok(_) => count += 1,
                    Err(_) => break,
                }
            }
            count
        })
    });

    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scaling");

    for size in [1, 10, 100, 1000].iter() {
        let xml = collection_xml(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("collection", size), &xml, |b, xml| {
            b.iter(|| {
                let people = parse(black_box(xml)).unwrap();
                match &people["person"] {
                    Value::Array(items) => items.len(),
                    _ => 1,
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_xml_reader, bench_scaling);

criterion_main!(benches);
