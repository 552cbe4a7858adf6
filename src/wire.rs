//! Command block encoding and time register decoding.
//!
//! Every multi-byte field in a command or reply payload is big-endian on the
//! wire regardless of host byte order; [`byteorder::BigEndian`] is the single
//! codec used throughout. The unpack routines here are pure functions over
//! register words so they can be tested without a card.

use crate::constants::{MAX_BLOCK_LEN, Opcode};
use byteorder::{BigEndian, ByteOrder};

/// Outbound command block: the opcode byte followed by 1–5 payload bytes.
#[derive(Debug, Clone)]
pub(crate) struct CommandBlock {
    op: Opcode,
    buf: [u8; MAX_BLOCK_LEN],
    len: usize,
}

impl CommandBlock {
    pub fn new(op: Opcode) -> Self {
        let mut buf = [0u8; MAX_BLOCK_LEN];
        buf[0] = op.id();
        Self { op, buf, len: 1 }
    }

    pub fn opcode(&self) -> Opcode {
        self.op
    }

    pub fn push_u8(&mut self, value: u8) -> &mut Self {
        debug_assert!(self.len + 1 <= MAX_BLOCK_LEN);
        self.buf[self.len] = value;
        self.len += 1;
        self
    }

    pub fn push_i8(&mut self, value: i8) -> &mut Self {
        self.push_u8(value as u8)
    }

    pub fn push_u16(&mut self, value: u16) -> &mut Self {
        debug_assert!(self.len + 2 <= MAX_BLOCK_LEN);
        BigEndian::write_u16(&mut self.buf[self.len..self.len + 2], value);
        self.len += 2;
        self
    }

    pub fn push_u32(&mut self, value: u32) -> &mut Self {
        debug_assert!(self.len + 4 <= MAX_BLOCK_LEN);
        BigEndian::write_u32(&mut self.buf[self.len..self.len + 4], value);
        self.len += 4;
        self
    }

    pub fn push_i32(&mut self, value: i32) -> &mut Self {
        self.push_u32(value as u32)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// Fields packed into capture word0: `status[27:24] | hundred_ns[23:20] |
/// microseconds[19:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Word0Fields {
    pub status: u8,
    pub hundred_ns: u8,
    pub microseconds: u32,
}

pub(crate) fn unpack_word0(word0: u32) -> Word0Fields {
    Word0Fields {
        status: ((word0 >> 24) & 0x0f) as u8,
        hundred_ns: ((word0 >> 20) & 0x0f) as u8,
        microseconds: word0 & 0x000f_ffff,
    }
}

/// Fields packed into decimal-mode word1: `seconds[4:0] | minutes[12:8] |
/// hours[20:16] | day_of_year[31:24]`. The field widths are the card's
/// contract and are reproduced exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DecimalFields {
    pub day_of_year: u16,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

pub(crate) fn unpack_decimal_word1(word1: u32) -> DecimalFields {
    DecimalFields {
        day_of_year: ((word1 >> 24) & 0xff) as u16,
        hours: ((word1 >> 16) & 0x1f) as u8,
        minutes: ((word1 >> 8) & 0x1f) as u8,
        seconds: (word1 & 0x1f) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_starts_with_opcode_byte() {
        let block = CommandBlock::new(Opcode::JamSync);
        assert_eq!(block.as_bytes(), &[0x15]);
        assert_eq!(block.opcode(), Opcode::JamSync);
    }

    #[test]
    fn u16_payload_is_big_endian() {
        let mut block = CommandBlock::new(Opcode::Year);
        block.push_u16(2024);
        assert_eq!(block.as_bytes(), &[0x16, 0x07, 0xe8]);
    }

    #[test]
    fn u32_payload_is_big_endian() {
        let mut block = CommandBlock::new(Opcode::SynthTuningWord);
        block.push_u32(320_000_000);
        assert_eq!(block.as_bytes(), &[0x25, 0x13, 0x12, 0xd0, 0x00]);
    }

    #[test]
    fn signed_payloads_use_twos_complement() {
        let mut block = CommandBlock::new(Opcode::DisciplineGain);
        block.push_i8(-100);
        assert_eq!(block.as_bytes(), &[0x1b, 0x9c]);

        let mut block = CommandBlock::new(Opcode::PropagationDelay);
        block.push_i32(-1);
        assert_eq!(block.as_bytes(), &[0x1a, 0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn word0_splits_status_ticks_and_micros() {
        let fields = unpack_word0(0x0010_0032);
        assert_eq!(fields.status, 0);
        assert_eq!(fields.hundred_ns, 1);
        assert_eq!(fields.microseconds, 50);
    }

    #[test]
    fn word0_upper_nibbles_do_not_leak_into_micros() {
        let fields = unpack_word0(0x0f3f_ffff);
        assert_eq!(fields.status, 0x0f);
        assert_eq!(fields.hundred_ns, 3);
        assert_eq!(fields.microseconds, 0x000f_ffff);
    }

    #[test]
    fn decimal_word1_decomposes_fixed_fields() {
        // day 200, 13:21:07
        let fields = unpack_decimal_word1(0xc80d_1507);
        assert_eq!(fields.day_of_year, 200);
        assert_eq!(fields.hours, 13);
        assert_eq!(fields.minutes, 21);
        assert_eq!(fields.seconds, 7);
    }
}
