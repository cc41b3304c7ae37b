//! Unit tests for packet framing and the cross-core word layout.

use super::*;
use crate::config::FRAME_TIMEOUT_US;

fn decode_all<D: FrameDecoder>(decoder: &mut D, chunks: &[&[u8]], now: Micros) -> Vec<Packet> {
    let mut out = Vec::new();
    for chunk in chunks {
        decoder.feed_slice(chunk, now, |p| out.push(p));
    }
    out
}

const EXTENDED_STREAM: [u8; 20] = [
    0x00, 0x04, 0x00, 0x02, 0x00, // keyboard 'a' + left shift
    0x81, 0xE9, 0x00, 0x00, 0x00, // consumer volume up, release
    0x02, 0x03, 0x00, 0x00, 0x01, // vendor usage 3, Fn flag
    0x80, 0x04, 0x00, 0x00, 0x00, // keyboard release
];

// ═══════════════════════════════════════════════════════════════════════════
// Extended framing
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn extended_press_then_release() {
    let mut decoder = ExtendedDecoder::new();

    let press = decode_all(&mut decoder, &[&[0x00, 0x04, 0x00, 0x00, 0x00]], 0);
    assert_eq!(
        press,
        vec![Packet {
            kind: PacketKind::Keyboard,
            code: 4,
            modifier: 0,
            aux_flags: 0,
            release: false,
        }]
    );

    let release = decode_all(&mut decoder, &[&[0x80, 0x04, 0x00, 0x00, 0x00]], 10);
    assert_eq!(release.len(), 1);
    assert_eq!(release[0].kind, PacketKind::Keyboard);
    assert_eq!(release[0].code, 4);
    assert!(release[0].release);
}

#[test]
fn extended_fields_decode() {
    let mut decoder = ExtendedDecoder::new();
    let packets = decode_all(&mut decoder, &[&EXTENDED_STREAM], 0);

    assert_eq!(packets.len(), 4);
    assert_eq!(packets[0].modifier, 0x02);
    assert_eq!(packets[1].kind, PacketKind::Consumer);
    assert_eq!(packets[1].code, 0x00E9);
    assert!(packets[1].release);
    assert_eq!(packets[2].kind, PacketKind::Vendor);
    assert_eq!(packets[2].aux_flags & FLAG_FN, FLAG_FN);
    assert_eq!(decoder.stats().frames, 4);
}

#[test]
fn extended_code_is_little_endian() {
    let mut decoder = ExtendedDecoder::new();
    let packets = decode_all(&mut decoder, &[&[0x01, 0x23, 0x02, 0x00, 0x00]], 0);
    assert_eq!(packets[0].code, 0x0223);
}

#[test]
fn extended_unknown_type_falls_back_to_keyboard() {
    let mut decoder = ExtendedDecoder::new();
    let packets = decode_all(&mut decoder, &[&[0x07, 0x05, 0x00, 0x00, 0x00]], 0);
    assert_eq!(packets[0].kind, PacketKind::Keyboard);
    assert!(!packets[0].release);
    assert_eq!(decoder.stats().unknown_types, 1);
}

#[test]
fn extended_blank_press_is_noop_but_keeps_alignment() {
    let mut decoder = ExtendedDecoder::new();
    let stream = [
        0x01, 0x00, 0x00, 0x00, 0x00, // consumer usage 0
        0x02, 0x00, 0x00, 0x00, 0x00, // vendor usage 0
        0x00, 0x00, 0x01, 0x00, 0x02, // keyboard, keycode byte 0, non-Fn flag only
        0x00, 0x00, 0x00, 0x02, 0x00, // keyboard shift alone
        0x81, 0x00, 0x00, 0x00, 0x00, // consumer release with usage 0
    ];
    let packets = decode_all(&mut decoder, &[&stream], 0);

    assert_eq!(packets.len(), 2);
    assert_eq!(packets[0], Packet::key(0x00, 0x02));
    assert_eq!(packets[1].kind, PacketKind::Consumer);
    assert!(packets[1].release);
    assert_eq!(decoder.stats().noop_frames, 3);
    assert_eq!(decoder.stats().frames, 2);
}

#[test]
fn extended_pending_len_tracks_fields() {
    let mut decoder = ExtendedDecoder::new();
    for (i, byte) in [0x00u8, 0x04, 0x00, 0x00].iter().enumerate() {
        assert_eq!(decoder.pending_len(), i);
        assert!(decoder.feed(*byte, 0).is_none());
    }
    assert_eq!(decoder.pending_len(), 4);
    assert!(decoder.feed(0x00, 0).is_some());
    assert_eq!(decoder.pending_len(), 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Compact framing
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn compact_key_with_modifier() {
    let mut decoder = CompactDecoder::new();
    let packets = decode_all(&mut decoder, &[&[0x04, 0x02]], 0);
    assert_eq!(packets, vec![Packet::key(0x04, 0x02)]);
}

#[test]
fn compact_zero_keycode_is_noop_but_keeps_alignment() {
    let mut decoder = CompactDecoder::new();
    let packets = decode_all(&mut decoder, &[&[0x00, 0x02, 0x05, 0x00]], 0);
    assert_eq!(packets, vec![Packet::key(0x05, 0x00)]);
    assert_eq!(decoder.stats().noop_frames, 1);
    assert_eq!(decoder.stats().frames, 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Split invariance
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn extended_split_points_do_not_change_output() {
    let mut whole = ExtendedDecoder::new();
    let expected = decode_all(&mut whole, &[&EXTENDED_STREAM], 0);

    for split in 0..=EXTENDED_STREAM.len() {
        let (a, b) = EXTENDED_STREAM.split_at(split);
        let mut decoder = ExtendedDecoder::new();
        assert_eq!(decode_all(&mut decoder, &[a, b], 0), expected, "split at {split}");
    }

    for chunk in [1, 2, 3, 4, 7] {
        let chunks: Vec<&[u8]> = EXTENDED_STREAM.chunks(chunk).collect();
        let mut decoder = ExtendedDecoder::new();
        assert_eq!(decode_all(&mut decoder, &chunks, 0), expected, "chunk {chunk}");
    }
}

#[test]
fn compact_split_points_do_not_change_output() {
    let stream = [0x04, 0x00, 0x00, 0x01, 0x05, 0x02, 0x06, 0x00, 0x07];
    let mut whole = CompactDecoder::new();
    let expected = decode_all(&mut whole, &[&stream], 0);
    assert_eq!(expected.len(), 3);

    for split in 0..=stream.len() {
        let (a, b) = stream.split_at(split);
        let mut decoder = CompactDecoder::new();
        assert_eq!(decode_all(&mut decoder, &[a, b], 0), expected);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Timeout recovery
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn tick_discards_stale_partial_frame() {
    let mut decoder = ExtendedDecoder::new();
    decoder.feed_slice(&[0x01, 0xE9], 1_000, |_| panic!("no packet expected"));

    assert!(!decoder.tick(1_000 + FRAME_TIMEOUT_US));
    assert_eq!(decoder.pending_len(), 2);

    assert!(decoder.tick(1_000 + FRAME_TIMEOUT_US + 1));
    assert_eq!(decoder.pending_len(), 0);
    assert_eq!(decoder.stats().timeouts, 1);

    let later = 1_000 + FRAME_TIMEOUT_US + 10;
    let packets = decode_all(&mut decoder, &[&[0x00, 0x04, 0x00, 0x00, 0x00]], later);
    assert_eq!(packets, vec![Packet::key(0x04, 0x00)]);
}

#[test]
fn feed_after_gap_restarts_framing_without_tick() {
    let mut decoder = ExtendedDecoder::new();
    decoder.feed_slice(&[0x01, 0xE9, 0x00], 0, |_| {});

    let late = FRAME_TIMEOUT_US + 50;
    let packets = decode_all(&mut decoder, &[&[0x00, 0x05, 0x00, 0x01, 0x00]], late);
    assert_eq!(packets, vec![Packet::key(0x05, 0x01)]);
    assert_eq!(decoder.stats().timeouts, 1);
}

#[test]
fn compact_timeout_drops_pending_keycode() {
    let mut decoder = CompactDecoder::new();
    decoder.feed(0x04, 0);
    let packets = decode_all(&mut decoder, &[&[0x06, 0x00]], FRAME_TIMEOUT_US + 1);
    assert_eq!(packets, vec![Packet::key(0x06, 0x00)]);
}

#[test]
fn tick_on_idle_decoder_is_noop() {
    let mut decoder = CompactDecoder::new();
    assert!(!decoder.tick(u32::MAX));
    assert_eq!(decoder.stats().timeouts, 0);
}

#[test]
fn timeout_survives_counter_wrap() {
    let mut decoder = ExtendedDecoder::new();
    let start = u32::MAX - 1_000;
    decoder.feed(0x00, start);
    assert!(!decoder.tick(start.wrapping_add(FRAME_TIMEOUT_US)));
    assert!(decoder.tick(start.wrapping_add(FRAME_TIMEOUT_US + 1)));
}

// ═══════════════════════════════════════════════════════════════════════════
// Runtime decoder selection / packed word
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn decoder_follows_wire_format() {
    let mut compact = Decoder::new(WireFormat::Compact);
    assert_eq!(compact.frame_len(), 2);
    assert_eq!(compact.feed(0x04, 0), None);
    assert_eq!(compact.feed(0x00, 0), Some(Packet::key(0x04, 0)));

    let extended = Decoder::new(WireFormat::Extended);
    assert_eq!(extended.frame_len(), 5);
    assert_eq!(extended.format(), WireFormat::Extended);
}

#[test]
fn packed_word_keeps_every_field() {
    let packet = Packet {
        kind: PacketKind::Vendor,
        code: 0xBEEF,
        modifier: 0xA5,
        aux_flags: FLAG_FN,
        release: true,
    };
    assert_eq!(Packet::from_word(packet.to_word()), packet);
}

#[test]
fn packed_word_layout() {
    let word = Packet::key(0x04, 0x02).to_word();
    assert_eq!(word, 0x0002_0004);

    let consumer = Packet {
        kind: PacketKind::Consumer,
        code: 0x00E9,
        modifier: 0,
        aux_flags: 0,
        release: true,
    };
    assert_eq!(consumer.to_word(), 0x0900_00E9);
}
