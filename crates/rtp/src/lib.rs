//! ## RTP frame reassembly
//!
//! [rfc3550](https://tools.ietf.org/html/rfc3550)
//!
//! RTP does not guarantee delivery or prevent out-of-order delivery; the
//! sequence numbers allow the receiver to reconstruct the sender's packet
//! sequence. All packets of one media sample share a timestamp, and for
//! the payload types a GB28181 media stream carries (PS/H.264, audio) the
//! marker bit flags the last packet of the sample. This crate groups
//! packets by timestamp, detects completeness and reconstitutes the
//! payload; the socket layer feeding it lives elsewhere.

pub mod depacketizer;
pub mod frame;
pub mod reassembler;

pub use self::{
    depacketizer::{Depacketizer, Raw, Vp8Depacketizer},
    frame::MediaFrame,
    reassembler::FrameReassembler,
};

use bytes::Bytes;

/// The media type a frame's payload belongs to.
///
/// Completeness detection is payload-agnostic; the kind selects the
/// depacketizer a consumer applies when extracting the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameKind {
    H264,
    Vp8,
    Audio,
    #[default]
    Other,
}

/// One RTP packet, reduced to the fields reassembly needs.
///
/// Produced by the transport and moved into the frame that owns its
/// timestamp. The payload is the RTP body with the fixed header already
/// removed.
#[derive(Debug, Clone)]
pub struct RtpPacket {
    pub sequence_number: u16,
    pub timestamp: u32,
    pub marker: bool,
    pub payload: Bytes,
}

/// 16-bit modular sequence comparison.
///
/// `b` follows `a` iff the forward distance from `a` to `b` is inside
/// `(0, 2^15)`. Sorting raw values breaks at the 65535 -> 0 wrap; the
/// shortest-forward-distance rule keeps a frame straddling the wrap in
/// send order.
#[inline]
pub(crate) fn seq_before(a: u16, b: u16) -> bool {
    a != b && b.wrapping_sub(a) < 0x8000
}

#[cfg(test)]
mod tests {
    use super::seq_before;

    #[test]
    fn test_seq_order() {
        assert!(seq_before(100, 101));
        assert!(!seq_before(101, 100));
        assert!(!seq_before(100, 100));

        // Across the wrap 65535 precedes 0.
        assert!(seq_before(65535, 0));
        assert!(!seq_before(0, 65535));
    }
}
