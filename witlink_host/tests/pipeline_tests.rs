mod common;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use witlink_common::{AccelUnit, Channel, DecoderConfig, Sample};
use witlink_host::{Pipeline, SampleStore};

use common::{motion_frame, orientation_frame};

fn collecting_pipeline(config: DecoderConfig) -> (Pipeline, Arc<Mutex<Vec<Sample>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let pipeline = Pipeline::new(
        config,
        Box::new(move |_: &SampleStore, s: &Sample| sink.lock().unwrap().push(*s)),
    );
    (pipeline, seen)
}

fn stream() -> Vec<u8> {
    let mut bytes = Vec::new();
    for i in 0..6i16 {
        bytes.extend_from_slice(
            &motion_frame([i * 100, -i, 16384, 7, -7, 0, 1000, -1000, i]).to_bytes(),
        );
        bytes.extend_from_slice(&orientation_frame(0x51, &[16384, 16384, 16384, 16384]).to_bytes());
        bytes.extend_from_slice(&orientation_frame(0x3A, &[120 * i, -240, 60]).to_bytes());
    }
    bytes
}

fn decode_all(chunks: &[&[u8]]) -> Vec<Sample> {
    let (mut pipeline, seen) = collecting_pipeline(DecoderConfig::default());
    for chunk in chunks {
        pipeline.feed(chunk);
    }
    let out = seen.lock().unwrap().clone();
    out
}

#[test]
fn fragmentation_invariance_fixed_sizes() {
    let bytes = stream();
    let whole = decode_all(&[&bytes]);
    assert_eq!(whole.len(), 18);

    for size in 1..=45 {
        let chunks: Vec<&[u8]> = bytes.chunks(size).collect();
        assert_eq!(decode_all(&chunks), whole, "chunk size {}", size);
    }
}

#[test]
fn fragmentation_invariance_random_splits() {
    let bytes = stream();
    let whole = decode_all(&[&bytes]);
    let mut rng = StdRng::seed_from_u64(0x55_61);

    for _ in 0..200 {
        let mut chunks: Vec<&[u8]> = Vec::new();
        let mut rest = &bytes[..];
        while !rest.is_empty() {
            // zero length chunks are allowed too
            let n = rng.gen_range(0..=rest.len().min(50));
            let (head, tail) = rest.split_at(n);
            chunks.push(head);
            rest = tail;
        }
        assert_eq!(decode_all(&chunks), whole);
    }
}

#[test]
fn resync_drops_exactly_the_garbage() {
    let frame = motion_frame([16384, 0, 0, 0, 0, 0, 0, 0, 0]);
    let clean = decode_all(&[&frame.to_bytes()]);

    for k in 0..=40usize {
        // never 0x55, so no false lock is possible
        let garbage: Vec<u8> = (0..k).map(|i| (i as u8).wrapping_mul(7) | 0x80).collect();
        let (mut pipeline, seen) = collecting_pipeline(DecoderConfig::default());
        pipeline.feed(&garbage);
        pipeline.feed(&frame.to_bytes());

        assert_eq!(pipeline.stats().resync_drops, k as u64, "k = {}", k);
        assert_eq!(*seen.lock().unwrap(), clean);
        assert_eq!(pipeline.pending(), 0);
    }
}

#[test]
fn header_with_bad_type_is_skipped() {
    let frame = orientation_frame(0x51, &[16384, 0, 0, 0]);
    let mut bytes = vec![0x55, 0x52, 0x55, 0x00];
    bytes.extend_from_slice(&frame.to_bytes());
    let (mut pipeline, seen) = collecting_pipeline(DecoderConfig::default());
    pipeline.feed(&bytes);
    assert_eq!(pipeline.stats().resync_drops, 4);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn motion_example_values() {
    let (mut pipeline, _) = collecting_pipeline(DecoderConfig::default());
    pipeline.feed(&motion_frame([16384, 0, 0, 0, 0, 0, 0, 0, 0]).to_bytes());
    let acc_x = pipeline.store().get(Channel::AccX).unwrap();
    assert!((acc_x - 78.4532).abs() < 1e-9);
    assert_eq!(format!("{:.3}", acc_x), "78.453");
    assert_eq!(pipeline.store().get(Channel::Q0), None);
}

#[test]
fn accel_unit_is_configurable() {
    let config = DecoderConfig {
        accel_unit: AccelUnit::StandardGravity,
    };
    let (mut pipeline, _) = collecting_pipeline(config);
    pipeline.feed(&motion_frame([16384, -16384, 0, 0, 0, 0, 0, 0, 0]).to_bytes());
    assert_eq!(pipeline.store().get(Channel::AccX), Some(8.0));
    assert_eq!(pipeline.store().get(Channel::AccY), Some(-8.0));
}

#[test]
fn quaternion_example_value() {
    let (mut pipeline, seen) = collecting_pipeline(DecoderConfig::default());
    pipeline.feed(&orientation_frame(0x51, &[16384, 16384, 16384, 16384]).to_bytes());
    assert_eq!(pipeline.store().get_by_name("Q0"), Some(0.5));
    assert_eq!(pipeline.stats().implausible, 0);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn store_keeps_last_value_per_channel() {
    let (mut pipeline, _) = collecting_pipeline(DecoderConfig::default());
    pipeline.feed(&orientation_frame(0x3A, &[120, 240, 360]).to_bytes());
    pipeline.feed(&orientation_frame(0x3A, &[-120, 0, 0]).to_bytes());
    let store = pipeline.store();
    assert_eq!(store.get(Channel::Hx), Some(-1.0));
    assert_eq!(store.get(Channel::Hy), Some(0.0));
    assert_eq!(store.get(Channel::AccX), None);
}
