use bytes::Bytes;
use criterion::{Criterion, criterion_group, criterion_main};
use gb28181_server_rtp::{FrameKind, MediaFrame, RtpPacket};

fn build_frame(packets: u16) -> MediaFrame {
    let mut frame = MediaFrame::new(900000, FrameKind::H264);
    for seq in 0..packets {
        frame.add_packet(RtpPacket {
            sequence_number: seq,
            timestamp: 900000,
            marker: seq == packets - 1,
            payload: Bytes::from_static(&[0u8; 1400]),
        });
    }

    frame
}

fn criterion_benchmark(c: &mut Criterion) {
    let frame = build_frame(64);

    c.bench_function("is_complete_64", |b| b.iter(|| frame.is_complete()));
    c.bench_function("payload_64", |b| b.iter(|| frame.payload()));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
