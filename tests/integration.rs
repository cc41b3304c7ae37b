//! Integration tests for the keybridge host-testable pipeline.
//!
//! Bytes go in on the "core0" side, reports come out of the emitter on the
//! "core1" side, with the real `heapless::spsc` channel in between.

use std::collections::HashMap;

use heapless::spsc::Queue;
use keybridge::bridge::InputPipeline;
use keybridge::config::{CHANNEL_SLOTS, REPORT_GAP_US};
use keybridge::emitter::{ReportEmitter, ReportSink};
use keybridge::hid::{HidReport, Interface};
use keybridge::protocol::{PacketKind, WireFormat};
use keybridge::time::{Clock, Micros};

struct FixedClock(Micros);

impl Clock for FixedClock {
    fn now_us(&self) -> Micros {
        self.0
    }
}

#[derive(Default)]
struct HostSink {
    aux_busy: bool,
    reports: Vec<HidReport>,
}

impl ReportSink for HostSink {
    fn ready(&self, interface: Interface) -> bool {
        !(self.aux_busy && interface == Interface::Aux)
    }

    fn send(&mut self, report: &HidReport) -> bool {
        self.reports.push(*report);
        true
    }
}

fn serialize(report: &HidReport) -> Vec<u8> {
    let mut buf = [0u8; 8];
    let n = report.serialize(&mut buf);
    buf[..n].to_vec()
}

/// Feed `input` in `chunk`-sized reads and run both sides until quiet.
fn run_bridge(format: WireFormat, input: &[u8], chunk: usize, sink: &mut HostSink) -> InputPipeline {
    let mut pipeline = InputPipeline::new(format);
    let mut emitter = ReportEmitter::new();
    let mut channel: Queue<u32, CHANNEL_SLOTS> = Queue::new();
    let (mut tx, mut rx) = channel.split();

    let mut now: Micros = 0;
    let mut rest = input;
    for _ in 0..10_000 {
        let take = rest.len().min(chunk).min(pipeline.read_budget());
        pipeline.ingest(&rest[..take], now);
        rest = &rest[take..];

        pipeline.drain(&mut tx, &FixedClock(now));
        emitter.tick(&mut rx, sink, now);

        if rest.is_empty() && pipeline.queued() == 0 && emitter.is_idle() && rx.len() == 0 {
            return pipeline;
        }
        now += REPORT_GAP_US;
    }
    panic!("bridge did not settle");
}

#[test]
fn extended_press_then_explicit_release() {
    let input = [
        0x00, 0x04, 0x00, 0x00, 0x00, // keyboard 'a' press
        0x80, 0x04, 0x00, 0x00, 0x00, // keyboard 'a' release
    ];
    let mut sink = HostSink::default();
    run_bridge(WireFormat::Extended, &input, 64, &mut sink);

    let wire: Vec<Vec<u8>> = sink.reports.iter().map(serialize).collect();
    assert_eq!(
        wire,
        vec![
            vec![0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00],
            vec![0x00; 8],
            // The release packet adds one more zero report, no press.
            vec![0x00; 8],
        ]
    );
}

#[test]
fn compact_stream_produces_balanced_pairs() {
    // 'h', 'i' with shift on the first, then a no-op frame.
    let input = [0x0B, 0x02, 0x0C, 0x00, 0x00, 0x00];
    let mut sink = HostSink::default();
    let pipeline = run_bridge(WireFormat::Compact, &input, 1, &mut sink);

    let wire: Vec<Vec<u8>> = sink.reports.iter().map(serialize).collect();
    assert_eq!(
        wire,
        vec![
            vec![0x02, 0x00, 0x0B, 0x00, 0x00, 0x00, 0x00, 0x00],
            vec![0x00; 8],
            vec![0x00, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x00],
            vec![0x00; 8],
        ]
    );
    assert_eq!(pipeline.stats().decoder.noop_frames, 1);
}

#[test]
fn mixed_kinds_stay_in_decode_order() {
    let input = [
        0x01, 0xE9, 0x00, 0x00, 0x00, // consumer volume up
        0x00, 0x3A, 0x00, 0x00, 0x01, // keyboard F1 with Fn
        0x02, 0x34, 0x12, 0x00, 0x00, // vendor 0x1234
    ];
    let mut sink = HostSink::default();
    run_bridge(WireFormat::Extended, &input, 3, &mut sink);

    let wire: Vec<Vec<u8>> = sink.reports.iter().map(serialize).collect();
    assert_eq!(
        wire,
        vec![
            vec![0x01, 0xE9, 0x00],
            vec![0x01, 0x00, 0x00],
            vec![0x00, 0x01, 0x3A, 0x00, 0x00, 0x00, 0x00, 0x00],
            vec![0x00; 8],
            vec![0x02, 0x34, 0x12],
            vec![0x02, 0x00, 0x00],
        ]
    );
}

#[test]
fn every_emitted_press_is_non_zero() {
    let input = [
        0x01, 0x00, 0x00, 0x00, 0x00, // consumer usage 0
        0x00, 0x00, 0x00, 0x00, 0x00, // keyboard with nothing set
        0x01, 0xE2, 0x00, 0x00, 0x00, // consumer mute
    ];
    let mut sink = HostSink::default();
    let pipeline = run_bridge(WireFormat::Extended, &input, 64, &mut sink);

    let wire: Vec<Vec<u8>> = sink.reports.iter().map(serialize).collect();
    assert_eq!(wire, vec![vec![0x01, 0xE2, 0x00], vec![0x01, 0x00, 0x00]]);
    assert_eq!(pipeline.stats().decoder.noop_frames, 2);
    assert_eq!(pipeline.stats().forwarded, 1);
}

#[test]
fn burst_larger_than_queue_is_fully_delivered_with_admission_control() {
    // 200 key presses, far more than queue + channel can hold at once.
    let input: Vec<u8> = (0..200u32)
        .flat_map(|i| [0x00, (i % 90 + 4) as u8, 0x00, 0x00, 0x00])
        .collect();
    let mut sink = HostSink::default();
    let pipeline = run_bridge(WireFormat::Extended, &input, 64, &mut sink);

    assert_eq!(pipeline.stats().queue_drops, 0);
    assert_eq!(pipeline.stats().forwarded, 200);
    assert_eq!(sink.reports.len(), 400);

    // Every press is immediately followed by its release on the same endpoint.
    let mut per_kind: HashMap<PacketKind, usize> = HashMap::new();
    for pair in sink.reports.chunks(2) {
        assert!(!pair[0].is_release());
        assert!(pair[1].is_release());
        assert_eq!(pair[0].kind(), pair[1].kind());
        *per_kind.entry(pair[0].kind()).or_default() += 1;
    }
    assert_eq!(per_kind.get(&PacketKind::Keyboard), Some(&200));
}

#[test]
fn busy_aux_endpoint_holds_back_later_packets() {
    let input = [
        0x01, 0xCD, 0x00, 0x00, 0x00, // consumer play/pause
        0x00, 0x05, 0x00, 0x00, 0x00, // keyboard 'b'
    ];
    let mut pipeline = InputPipeline::new(WireFormat::Extended);
    let mut emitter = ReportEmitter::new();
    let mut channel: Queue<u32, CHANNEL_SLOTS> = Queue::new();
    let (mut tx, mut rx) = channel.split();
    let mut sink = HostSink {
        aux_busy: true,
        ..Default::default()
    };

    pipeline.ingest(&input, 0);
    pipeline.drain(&mut tx, &FixedClock(0));
    for step in 0..10 {
        emitter.tick(&mut rx, &mut sink, step * REPORT_GAP_US);
    }
    assert!(sink.reports.is_empty());

    sink.aux_busy = false;
    for step in 10..20 {
        emitter.tick(&mut rx, &mut sink, step * REPORT_GAP_US);
    }
    let kinds: Vec<PacketKind> = sink.reports.iter().map(HidReport::kind).collect();
    assert_eq!(
        kinds,
        vec![
            PacketKind::Consumer,
            PacketKind::Consumer,
            PacketKind::Keyboard,
            PacketKind::Keyboard
        ]
    );
}
