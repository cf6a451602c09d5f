use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use session::{AudioChunk, Dispatcher, SessionConfig};
use wire::{encode_formats, encode_pdu, encode_wave, AudioFormat, MessageType};

/// Null sink so the bench measures dispatch, not collection.
struct Discard;

impl session::AudioSink for Discard {
    fn play(&mut self, _format: &AudioFormat, chunk: AudioChunk) {
        black_box(chunk);
    }
}

impl session::Transport for Discard {
    fn send(&mut self, pdu: Vec<u8>) {
        black_box(pdu);
    }
}

fn wave_stream(blocks: u8, samples_per_block: usize) -> Vec<u8> {
    let samples = vec![0x5Au8; samples_per_block];
    let mut stream = Vec::new();
    for block in 0..blocks {
        stream.extend(encode_wave(0, u32::from(block) * 20, block, &samples).unwrap());
        stream.extend(encode_pdu(MessageType::Training, &[0, 0, 0, 4]).unwrap());
    }
    stream
}

fn bench_dispatch(c: &mut Criterion) {
    let formats = encode_formats(6, 0, &[AudioFormat::pcm(2, 44_100, 16)]).unwrap();
    let stream = wave_stream(64, 3528);

    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Bytes(stream.len() as u64));

    group.bench_function("whole_stream", |b| {
        b.iter(|| {
            let mut dispatcher = Dispatcher::new(SessionConfig::default(), Discard, Discard);
            dispatcher.on_inbound_bytes(&formats);
            black_box(dispatcher.on_inbound_bytes(black_box(&stream)))
        });
    });

    group.bench_function("1k_chunks", |b| {
        b.iter(|| {
            let mut dispatcher = Dispatcher::new(SessionConfig::default(), Discard, Discard);
            dispatcher.on_inbound_bytes(&formats);
            for chunk in stream.chunks(1024) {
                black_box(dispatcher.on_inbound_bytes(black_box(chunk)));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
