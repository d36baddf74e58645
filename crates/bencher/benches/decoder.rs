use std::hint::black_box;

use bencher::{TestCase, TestFile};
use bytes::{Bytes, BytesMut};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sockapi_http::codec::{FrameDecoder, parse_request};
use sockapi_http::protocol::RawFrame;
use tokio_util::codec::Decoder;

static SMALL_HEADER: TestFile = TestFile::new("get_small.txt", include_str!("../resources/request/get_small.txt"));
static LARGE_HEADER: TestFile = TestFile::new("get_large.txt", include_str!("../resources/request/get_large.txt"));
static POST_ACCOUNT: TestFile = TestFile::new("post_account.txt", include_str!("../resources/request/post_account.txt"));

fn create_test_cases() -> Vec<TestCase> {
    vec![
        TestCase::new("small_header", SMALL_HEADER),
        TestCase::new("large_header", LARGE_HEADER),
        TestCase::new("post_with_body", POST_ACCOUNT),
    ]
}

fn benchmark_frame_decoder(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("frame_decoder");

    for case in create_test_cases() {
        group.throughput(Throughput::Bytes(case.wire_len()));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            let mut frame_decoder = FrameDecoder::new();
            b.iter_batched_ref(
                || BytesMut::from(case.file().content()),
                |bytes_mut| {
                    let frame = frame_decoder.decode(bytes_mut).expect("input should be a valid frame").unwrap();
                    black_box(frame);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn benchmark_request_parser(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("request_parser");

    for case in create_test_cases() {
        group.throughput(Throughput::Bytes(case.wire_len()));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            let bytes = Bytes::from_static(case.file().content().as_bytes());
            b.iter(|| {
                let request = parse_request(RawFrame::new(bytes.clone())).expect("input should be a valid request");
                black_box(request);
            });
        });
    }

    group.finish();
}

criterion_group!(decoder, benchmark_frame_decoder, benchmark_request_parser);
criterion_main!(decoder);
