use log::{debug, trace};
use serde::Serialize;
use std::collections::VecDeque;
use witlink_common::{
    decode, DecoderConfig, Frame, FrameType, Sample, FRAME_LEN, HEADER, PAYLOAD_LEN,
};

use crate::store::SampleStore;

/// Counters kept by the pipeline. None of these are errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub bytes_in: u64,
    pub frames: u64,
    /// single bytes dropped while looking for a header
    pub resync_drops: u64,
    pub unrecognized: u64,
    pub implausible: u64,
}

/// Collects notification chunks and slices frames out of them.
///
/// The stream has no length prefix or checksum, so after any loss the only
/// option is to drop one byte at a time until `0x55` followed by a known type
/// byte lines up at the front. A payload that happens to contain such a pair
/// can cause a false lock; that frame decodes to garbage and the stream
/// recovers on its own afterwards.
#[derive(Debug, Default)]
pub struct Reassembler {
    buf: VecDeque<u8>,
    resync_drops: u64,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, chunk: &[u8]) {
        self.buf.extend(chunk);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn resync_drops(&self) -> u64 {
        self.resync_drops
    }

    /// Next complete frame, or `None` once fewer than 20 bytes are left.
    /// Each step either drops exactly one byte or removes exactly one frame.
    pub fn next_frame(&mut self) -> Option<Frame> {
        while self.buf.len() >= FRAME_LEN {
            let frame_type = match FrameType::from_byte(self.buf[1]) {
                Some(t) if self.buf[0] == HEADER => t,
                _ => {
                    self.buf.pop_front();
                    self.resync_drops += 1;
                    continue;
                }
            };

            self.buf.drain(..2);
            let mut payload = [0u8; PAYLOAD_LEN];
            for (dst, src) in payload.iter_mut().zip(self.buf.drain(..PAYLOAD_LEN)) {
                *dst = src;
            }
            return Some(Frame::new(frame_type, &payload));
        }
        None
    }
}

/// Consumer callback, run synchronously once per decoded frame.
pub type Consumer = Box<dyn FnMut(&SampleStore, &Sample) + Send>;

/// Reassembler + decoder + last-value store, driven one chunk at a time.
pub struct Pipeline {
    reassembler: Reassembler,
    store: SampleStore,
    decoder: DecoderConfig,
    plausibility_check: bool,
    stats: PipelineStats,
    consumer: Consumer,
}

impl Pipeline {
    pub fn new(decoder: DecoderConfig, consumer: Consumer) -> Self {
        Self {
            reassembler: Reassembler::new(),
            store: SampleStore::new(),
            decoder,
            plausibility_check: true,
            stats: PipelineStats::default(),
            consumer,
        }
    }

    pub fn with_plausibility_check(mut self, enabled: bool) -> Self {
        self.plausibility_check = enabled;
        self
    }

    /// Append a chunk and drain every complete frame from it. Returns the
    /// number of samples handed to the consumer.
    pub fn feed(&mut self, chunk: &[u8]) -> usize {
        self.stats.bytes_in += chunk.len() as u64;
        self.reassembler.append(chunk);

        let mut emitted = 0;
        while let Some(frame) = self.reassembler.next_frame() {
            self.stats.frames += 1;
            trace!("frame: {}", frame);

            let sample = decode(&frame, &self.decoder);
            if !sample.is_recognized() {
                debug!("dropping frame with unknown register: {}", frame);
                self.stats.unrecognized += 1;
                continue;
            }
            if self.plausibility_check && !sample.is_plausible() {
                debug!("implausible sample, possible false lock: {}", frame);
                self.stats.implausible += 1;
            }

            self.store.record(&sample);
            (self.consumer)(&self.store, &sample);
            emitted += 1;
        }
        self.stats.resync_drops = self.reassembler.resync_drops();
        emitted
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Bytes waiting for the rest of their frame.
    pub fn pending(&self) -> usize {
        self.reassembler.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn quaternion_bytes(q0: u16) -> Vec<u8> {
        let mut payload = [0u8; PAYLOAD_LEN];
        payload[0] = 0x51;
        payload[2..4].copy_from_slice(&q0.to_le_bytes());
        Frame::new(FrameType::Orientation, &payload)
            .to_bytes()
            .to_vec()
    }

    fn collecting() -> (Consumer, Arc<Mutex<Vec<Sample>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let consumer: Consumer = Box::new(move |_store: &SampleStore, sample: &Sample| {
            sink.lock().unwrap().push(*sample);
        });
        (consumer, seen)
    }

    #[test]
    fn partial_frame_waits_for_more() {
        let mut r = Reassembler::new();
        let bytes = quaternion_bytes(0x4000);
        r.append(&bytes[..19]);
        assert!(r.next_frame().is_none());
        assert_eq!(r.len(), 19);
        r.append(&bytes[19..]);
        assert!(r.next_frame().is_some());
        assert!(r.is_empty());
    }

    #[test]
    fn empty_chunk_is_noop() {
        let mut r = Reassembler::new();
        r.append(&[]);
        assert_eq!(r.len(), 0);
        assert!(r.next_frame().is_none());
    }

    #[test]
    fn drops_garbage_one_byte_at_a_time() {
        let mut r = Reassembler::new();
        // 0x55 followed by a bad type byte must also be skipped
        r.append(&[0x00, 0x55, 0x62, 0x13]);
        r.append(&quaternion_bytes(0x4000));
        let frame = r.next_frame().unwrap();
        assert_eq!(frame.payload()[0], 0x51);
        assert_eq!(r.resync_drops(), 4);
    }

    #[test]
    fn garbage_alone_never_yields_frame() {
        let mut r = Reassembler::new();
        r.append(&[0xAA; 45]);
        assert!(r.next_frame().is_none());
        assert_eq!(r.len(), FRAME_LEN - 1);
        assert_eq!(r.resync_drops(), 26);
    }

    #[test]
    fn pipeline_updates_store_before_consumer() {
        let seen_q0 = Arc::new(Mutex::new(None));
        let sink = seen_q0.clone();
        let mut p = Pipeline::new(
            DecoderConfig::default(),
            Box::new(move |store: &SampleStore, _: &Sample| {
                *sink.lock().unwrap() = store.get(witlink_common::Channel::Q0);
            }),
        );
        assert_eq!(p.feed(&quaternion_bytes(0x4000)), 1);
        assert_eq!(*seen_q0.lock().unwrap(), Some(0.5));
    }

    #[test]
    fn unrecognized_frames_are_counted_not_emitted() {
        let (consumer, seen) = collecting();
        let mut p = Pipeline::new(DecoderConfig::default(), consumer);
        let mut payload = [0u8; PAYLOAD_LEN];
        payload[0] = 0x40;
        let frame = Frame::new(FrameType::Orientation, &payload);
        assert_eq!(p.feed(&frame.to_bytes()), 0);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(p.stats().unrecognized, 1);
        assert_eq!(p.stats().frames, 1);
    }

    #[test]
    fn implausible_quaternion_is_counted_but_kept() {
        let (consumer, seen) = collecting();
        let mut p = Pipeline::new(DecoderConfig::default(), consumer);
        // q0 = 0.5, rest zero: norm² = 0.25
        p.feed(&quaternion_bytes(0x4000));
        assert_eq!(p.stats().implausible, 1);
        assert_eq!(seen.lock().unwrap().len(), 1);

        let (consumer, _) = collecting();
        let mut p =
            Pipeline::new(DecoderConfig::default(), consumer).with_plausibility_check(false);
        p.feed(&quaternion_bytes(0x4000));
        assert_eq!(p.stats().implausible, 0);
    }
}
