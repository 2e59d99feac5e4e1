use std::collections::{HashMap, VecDeque};

use crate::{FrameKind, MediaFrame, RtpPacket};

/// Frames kept buffered before the oldest is dropped. A stream that loses
/// the marker packet of a frame would otherwise pin that frame forever.
const MAX_BUFFERED_FRAMES: usize = 32;

/// Routes incoming packets to the frame owning their timestamp and
/// surfaces frames the moment they become complete.
///
/// Single producer, no internal locking; a receiver thread owns the
/// reassembler and hands completed frames across its own channel.
pub struct FrameReassembler {
    kind: FrameKind,
    frames: HashMap<u32, MediaFrame>,
    arrivals: VecDeque<u32>,
    max_frames: usize,
}

impl FrameReassembler {
    pub fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            frames: HashMap::with_capacity(MAX_BUFFERED_FRAMES),
            arrivals: VecDeque::with_capacity(MAX_BUFFERED_FRAMES),
            max_frames: MAX_BUFFERED_FRAMES,
        }
    }

    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames.max(1);
        self
    }

    /// Number of frames currently buffered.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Feed one packet. Returns the completed frame when this packet
    /// closes the contiguous run, with the frame removed from the buffer
    /// and flagged processed.
    pub fn push(&mut self, packet: RtpPacket) -> Option<MediaFrame> {
        let timestamp = packet.timestamp;
        let frame = self.frames.entry(timestamp).or_insert_with(|| {
            self.arrivals.push_back(timestamp);
            MediaFrame::new(timestamp, self.kind)
        });

        frame.add_packet(packet);
        if frame.is_complete() {
            let mut frame = self.frames.remove(&timestamp)?;
            self.arrivals.retain(|item| *item != timestamp);
            frame.mark_processed();
            return Some(frame);
        }

        self.evict();
        None
    }

    /// Drop incomplete frames oldest-first once the buffer bound is hit.
    fn evict(&mut self) {
        while self.frames.len() > self.max_frames {
            let Some(timestamp) = self.arrivals.pop_front() else {
                break;
            };

            self.frames.remove(&timestamp);
        }
    }
}
