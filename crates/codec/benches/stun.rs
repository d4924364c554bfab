use std::net::SocketAddr;

use bytes::BytesMut;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use stun_server_codec::{
    Attributes,
    message::{Message, MessageEncoder, attributes::XorMappedAddress, methods::*},
};

fn criterion_benchmark(c: &mut Criterion) {
    #[rustfmt::skip]
    let request: [u8; 20] = [
        0x00, 0x01, 0x00, 0x00, 0x21, 0x12, 0xa4, 0x42,
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b,
    ];

    let source: SocketAddr = "192.0.2.1:12345".parse().unwrap();

    let mut attributes = Attributes::default();
    let mut buffer = BytesMut::with_capacity(1280);

    let mut stun_criterion = c.benchmark_group("stun");

    stun_criterion.throughput(Throughput::Elements(1));
    stun_criterion.bench_function("decode_binding_request", |bencher| {
        bencher.iter(|| {
            Message::decode(&request[..], &mut attributes).unwrap();
        })
    });

    stun_criterion.bench_function("encode_binding_response", |bencher| {
        bencher.iter(|| {
            let mut attributes = Attributes::default();
            let message = Message::decode(&request[..], &mut attributes).unwrap();

            let mut response = MessageEncoder::extend(BINDING_RESPONSE, &message, &mut buffer);
            response.append::<XorMappedAddress>(source);
            response.flush();
        })
    });

    stun_criterion.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
