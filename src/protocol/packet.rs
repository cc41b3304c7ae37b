//! Decoded key event and its packed cross-core representation.

/// Extended-format flags bit: auxiliary modifier (Fn / alternate layer).
pub const FLAG_FN: u8 = 0x01;

/// Which logical HID report a packet drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PacketKind {
    Keyboard = 0,
    Consumer = 1,
    Vendor = 2,
}

impl PacketKind {
    /// Map an extended-format type nibble. `None` for unassigned values.
    pub const fn from_nibble(nibble: u8) -> Option<Self> {
        match nibble & 0x0F {
            0 => Some(PacketKind::Keyboard),
            1 => Some(PacketKind::Consumer),
            2 => Some(PacketKind::Vendor),
            _ => None,
        }
    }
}

/// One key event, immutable once the decoder has produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    pub kind: PacketKind,
    /// Keyboard keycode (low byte only) or 16-bit consumer/vendor usage.
    pub code: u16,
    /// Keyboard modifier mask; ignored for other kinds.
    pub modifier: u8,
    /// Variant-specific bits, see [`FLAG_FN`].
    pub aux_flags: u8,
    pub release: bool,
}

// Packed word layout (internal contract between the two cores):
//
//   bits  0..16  code
//   bits 16..24  modifier
//   bits 24..26  kind
//   bit  27      release
//   bits 28..32  aux_flags (low nibble)
const WORD_MODIFIER_SHIFT: u32 = 16;
const WORD_KIND_SHIFT: u32 = 24;
const WORD_RELEASE_BIT: u32 = 1 << 27;
const WORD_AUX_SHIFT: u32 = 28;

impl Packet {
    /// Placeholder used to initialise queue storage.
    pub const EMPTY: Packet = Packet::key(0, 0);

    /// Keyboard press as produced by the compact framing.
    pub const fn key(keycode: u8, modifier: u8) -> Self {
        Self {
            kind: PacketKind::Keyboard,
            code: keycode as u16,
            modifier,
            aux_flags: 0,
            release: false,
        }
    }

    /// A press whose HID report would be all zero, so it cannot be told
    /// apart from its own release.
    pub fn is_blank_press(&self) -> bool {
        if self.release {
            return false;
        }
        match self.kind {
            PacketKind::Keyboard => {
                self.code as u8 == 0 && self.modifier == 0 && self.aux_flags & FLAG_FN == 0
            }
            PacketKind::Consumer | PacketKind::Vendor => self.code == 0,
        }
    }

    /// Pack into one channel word.
    pub fn to_word(&self) -> u32 {
        let mut word = self.code as u32;
        word |= (self.modifier as u32) << WORD_MODIFIER_SHIFT;
        word |= (self.kind as u32) << WORD_KIND_SHIFT;
        if self.release {
            word |= WORD_RELEASE_BIT;
        }
        word |= ((self.aux_flags & 0x0F) as u32) << WORD_AUX_SHIFT;
        word
    }

    /// Unpack a channel word produced by [`Packet::to_word`].
    pub fn from_word(word: u32) -> Self {
        let kind = PacketKind::from_nibble(((word >> WORD_KIND_SHIFT) & 0x03) as u8)
            .unwrap_or(PacketKind::Keyboard);
        Self {
            kind,
            code: (word & 0xFFFF) as u16,
            modifier: ((word >> WORD_MODIFIER_SHIFT) & 0xFF) as u8,
            aux_flags: ((word >> WORD_AUX_SHIFT) & 0x0F) as u8,
            release: word & WORD_RELEASE_BIT != 0,
        }
    }
}
