use criterion::{Criterion, criterion_group, criterion_main};
use elmah_io::sender::form_body;
use elmah_io::{ErrorCodec, ErrorRecord, XmlErrorCodec};
use std::hint::black_box;

fn sample_record() -> ErrorRecord {
    let mut record = ErrorRecord::new("System.NullReferenceException", "Object reference not set")
        .with_application_name("shop")
        .with_status_code(500)
        .with_user("alice");
    record.detail = "at Shop.Checkout.Pay()\n   at Shop.Controllers.Cart.Post()".repeat(20);
    for i in 0..40 {
        record
            .server_variables
            .push((format!("HTTP_HEADER_{i}"), format!("value <{i}> & more")));
    }
    record
}

fn bench_encode(c: &mut Criterion) {
    let codec = XmlErrorCodec::new();
    let record = sample_record();

    c.bench_function("xml_encode", |b| {
        b.iter(|| codec.encode(black_box(&record)).unwrap());
    });

    c.bench_function("xml_encode_form_body", |b| {
        b.iter(|| form_body(&codec.encode(black_box(&record)).unwrap()));
    });
}

fn bench_decode(c: &mut Criterion) {
    let codec = XmlErrorCodec::new();
    let xml = codec.encode(&sample_record()).unwrap();

    c.bench_function("xml_decode", |b| {
        b.iter(|| codec.decode(black_box(&xml)).unwrap());
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
