use bytes::Bytes;
use gb28181_server_rtp::{FrameKind, FrameReassembler, MediaFrame, RtpPacket};
use rand::RngCore;

fn packet(seq: u16, timestamp: u32, marker: bool, payload: &[u8]) -> RtpPacket {
    RtpPacket {
        sequence_number: seq,
        timestamp,
        marker,
        payload: Bytes::copy_from_slice(payload),
    }
}

#[test]
fn test_two_packet_frame() {
    let mut frame = MediaFrame::new(900000, FrameKind::H264);
    frame.add_packet(packet(100, 900000, false, b"first-"));
    frame.add_packet(packet(101, 900000, true, b"second"));

    assert!(frame.is_complete());
    assert_eq!(frame.payload().as_ref(), b"first-second");
}

#[test]
fn test_gap_blocks_completeness() {
    let mut frame = MediaFrame::new(900000, FrameKind::H264);
    frame.add_packet(packet(100, 900000, false, b"a"));
    frame.add_packet(packet(102, 900000, false, b"b"));
    frame.add_packet(packet(103, 900000, true, b"c"));

    assert!(!frame.is_complete());
}

#[test]
fn test_split_and_reassemble_round_trip() {
    let mut stream = vec![0u8; 16 * 1024];
    rand::rng().fill_bytes(&mut stream);

    // Split the byte stream into packets of known sequence, shuffle the
    // delivery order a little, and reassemble.
    let chunks: Vec<&[u8]> = stream.chunks(1400).collect();
    let last = chunks.len() - 1;

    let mut frame = MediaFrame::new(123456, FrameKind::Other);
    for (index, chunk) in chunks.iter().enumerate().rev() {
        // Sequence numbers start close to the wrap on purpose.
        let seq = 65530u16.wrapping_add(index as u16);
        frame.add_packet(packet(seq, 123456, index == last, chunk));
    }

    assert!(frame.is_complete());
    assert_eq!(frame.count(), chunks.len());
    assert_eq!(frame.payload().as_ref(), stream.as_slice());
}

#[test]
fn test_reassembler_delivers_in_any_arrival_order() {
    let mut reassembler = FrameReassembler::new(FrameKind::H264);

    assert!(reassembler.push(packet(101, 900000, true, b"tail")).is_none());
    let frame = reassembler
        .push(packet(100, 900000, false, b"head-"))
        .expect("frame completes once the run is contiguous");

    assert_eq!(frame.payload().as_ref(), b"head-tail");
}
