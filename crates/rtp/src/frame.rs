use std::cmp::Ordering;

use bytes::{Bytes, BytesMut};

use crate::{Depacketizer, FrameKind, RtpPacket, depacketizer::Raw, seq_before};

/// The set of RTP packets sharing one timestamp.
///
/// A frame is created on the first packet of a new timestamp and grows by
/// appends until it is either delivered complete or evicted. Every packet
/// in the frame carries the frame's timestamp; that is the caller's
/// routing contract, not re-checked per add.
///
/// The frame is not internally synchronized. The packet receiver is the
/// single producer; a consumer on another thread needs external locking.
#[derive(Debug, Clone)]
pub struct MediaFrame {
    timestamp: u32,
    kind: FrameKind,
    has_marker: bool,
    processed: bool,
    packets: Vec<RtpPacket>,
}

impl MediaFrame {
    pub fn new(timestamp: u32, kind: FrameKind) -> Self {
        Self {
            timestamp,
            kind,
            has_marker: false,
            processed: false,
            packets: Vec::new(),
        }
    }

    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn has_marker(&self) -> bool {
        self.has_marker
    }

    /// Whether the payload has already been handed to a consumer.
    pub fn is_processed(&self) -> bool {
        self.processed
    }

    pub fn mark_processed(&mut self) {
        self.processed = true;
    }

    /// Append a packet. Duplicates from retransmission are kept as-is;
    /// they surface later as a failed contiguity check.
    pub fn add_packet(&mut self, packet: RtpPacket) {
        if packet.marker {
            self.has_marker = true;
        }

        self.packets.push(packet);
    }

    pub fn count(&self) -> usize {
        self.packets.len()
    }

    /// The lowest sequence number held, under modular ordering. Zero for
    /// an empty frame.
    pub fn start_sequence(&self) -> u16 {
        self.packets
            .iter()
            .map(|packet| packet.sequence_number)
            .reduce(|a, b| if seq_before(b, a) { b } else { a })
            .unwrap_or(0)
    }

    /// The highest sequence number held, under modular ordering. Zero for
    /// an empty frame.
    pub fn end_sequence(&self) -> u16 {
        self.packets
            .iter()
            .map(|packet| packet.sequence_number)
            .reduce(|a, b| if seq_before(a, b) { b } else { a })
            .unwrap_or(0)
    }

    /// A frame is complete once a marker has been seen and the sequence
    /// numbers form a contiguous run: sorted ascending, every neighbour
    /// pair differs by exactly one. Any gap or duplicate fails the check.
    pub fn is_complete(&self) -> bool {
        if !self.has_marker || self.packets.is_empty() {
            return false;
        }

        let sorted = self.sorted_sequences();
        sorted
            .windows(2)
            .all(|pair| pair[1] == pair[0].wrapping_add(1))
    }

    /// Concatenation of the packet payloads in ascending sequence order,
    /// raw. Payload types with a per-packet descriptor go through
    /// [`MediaFrame::assemble_with`] instead.
    pub fn payload(&self) -> Bytes {
        self.assemble_with(&Raw)
    }

    /// Concatenate in ascending sequence order, stripping each packet's
    /// payload through the given depacketizer.
    pub fn assemble_with(&self, depacketizer: &dyn Depacketizer) -> Bytes {
        let mut ordered: Vec<&RtpPacket> = self.packets.iter().collect();
        ordered.sort_by(|a, b| cmp_seq(a.sequence_number, b.sequence_number));

        let mut buffer = BytesMut::with_capacity(
            ordered.iter().map(|packet| packet.payload.len()).sum(),
        );

        for packet in ordered {
            buffer.extend_from_slice(depacketizer.strip(&packet.payload));
        }

        buffer.freeze()
    }

    fn sorted_sequences(&self) -> Vec<u16> {
        let mut sequences: Vec<u16> = self
            .packets
            .iter()
            .map(|packet| packet.sequence_number)
            .collect();

        sequences.sort_by(|a, b| cmp_seq(*a, *b));
        sequences
    }
}

fn cmp_seq(a: u16, b: u16) -> Ordering {
    if a == b {
        Ordering::Equal
    } else if seq_before(a, b) {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::MediaFrame;
    use crate::{FrameKind, RtpPacket};

    fn packet(seq: u16, marker: bool, payload: &[u8]) -> RtpPacket {
        RtpPacket {
            sequence_number: seq,
            timestamp: 900000,
            marker,
            payload: Bytes::copy_from_slice(payload),
        }
    }

    #[test]
    fn test_empty_frame() {
        let frame = MediaFrame::new(900000, FrameKind::H264);

        assert_eq!(frame.count(), 0);
        assert_eq!(frame.start_sequence(), 0);
        assert_eq!(frame.end_sequence(), 0);
        assert!(!frame.is_complete());
        assert!(frame.payload().is_empty());
    }

    #[test]
    fn test_single_marked_packet_is_complete() {
        let mut frame = MediaFrame::new(900000, FrameKind::H264);
        frame.add_packet(packet(100, true, b"a"));

        assert!(frame.is_complete());
        assert_eq!(frame.start_sequence(), 100);
        assert_eq!(frame.end_sequence(), 100);
    }

    #[test]
    fn test_out_of_order_payload() {
        let mut frame = MediaFrame::new(900000, FrameKind::H264);
        frame.add_packet(packet(101, true, b"bb"));
        frame.add_packet(packet(100, false, b"aa"));

        assert!(frame.is_complete());
        assert_eq!(frame.payload().as_ref(), b"aabb");
    }

    #[test]
    fn test_gap_is_incomplete() {
        let mut frame = MediaFrame::new(900000, FrameKind::H264);
        frame.add_packet(packet(100, false, b"a"));
        frame.add_packet(packet(102, false, b"c"));
        frame.add_packet(packet(103, true, b"d"));

        assert!(frame.has_marker());
        assert!(!frame.is_complete());
    }

    #[test]
    fn test_duplicate_is_incomplete() {
        let mut frame = MediaFrame::new(900000, FrameKind::H264);
        frame.add_packet(packet(100, false, b"a"));
        frame.add_packet(packet(100, false, b"a"));
        frame.add_packet(packet(101, true, b"b"));

        assert!(!frame.is_complete());
    }

    #[test]
    fn test_no_marker_is_incomplete() {
        let mut frame = MediaFrame::new(900000, FrameKind::H264);
        frame.add_packet(packet(100, false, b"a"));
        frame.add_packet(packet(101, false, b"b"));

        assert!(!frame.is_complete());
    }

    #[test]
    fn test_sequence_wrap() {
        let mut frame = MediaFrame::new(900000, FrameKind::H264);
        frame.add_packet(packet(65535, false, b"a"));
        frame.add_packet(packet(0, false, b"b"));
        frame.add_packet(packet(1, true, b"c"));

        assert_eq!(frame.start_sequence(), 65535);
        assert_eq!(frame.end_sequence(), 1);
        assert!(frame.is_complete());
        assert_eq!(frame.payload().as_ref(), b"abc");
    }
}
