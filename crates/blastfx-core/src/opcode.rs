//! Opcode stream format: encoding and decoding
//!
//! A compiled program is an ordered byte sequence of instructions, each a
//! one-byte opcode tag followed by a fixed-width little-endian operand whose
//! width depends on the opcode. Streams are append-only during compilation
//! and read linearly, front to back, during interpretation; there are no
//! jumps and no self-modification.

use crate::identity::ResourceHandle;

/// Instruction tags
///
/// Operand widths: the arithmetic group carries an f32, the register group
/// an i32 scratch-slot index, the store group a u16 destination offset, and
/// LOADP a raw u64 resource handle. END has no operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// Stop execution
    End = 0,
    /// val += operand
    Add,
    /// val += uniform_random(0,1) * operand
    Rand,
    /// val += damage * operand
    Damage,
    /// val += spawn_index * operand
    Index,
    /// val -= operand * floor(val / operand), i.e. floating modulo
    Sawtooth,
    /// val = operand * floor(val / operand), division-by-zero-safe
    Discrete,
    /// val = operand * sin(val)
    Sine,
    /// val = pow(val, operand)
    Pow,
    /// scratch[operand] = val; val = 0
    Yank,
    /// val *= scratch[operand]
    Multiply,
    /// val += scratch[operand]
    AddBuff,
    /// val = pow(val, scratch[operand])
    PowBuff,
    /// write i32(val) at offset; val = 0
    StoreI,
    /// write f32(val) at offset; val = 0
    StoreF,
    /// write u8(i32(val)) at offset; val = 0
    StoreC,
    /// write the direction vector at offset; val untouched
    Dir,
    /// ptr = operand
    LoadP,
    /// write ptr at offset; ptr = none
    StoreP,
}

impl OpCode {
    /// Decode a tag byte; `None` means the stream is corrupt
    pub fn from_u8(tag: u8) -> Option<OpCode> {
        Some(match tag {
            0 => OpCode::End,
            1 => OpCode::Add,
            2 => OpCode::Rand,
            3 => OpCode::Damage,
            4 => OpCode::Index,
            5 => OpCode::Sawtooth,
            6 => OpCode::Discrete,
            7 => OpCode::Sine,
            8 => OpCode::Pow,
            9 => OpCode::Yank,
            10 => OpCode::Multiply,
            11 => OpCode::AddBuff,
            12 => OpCode::PowBuff,
            13 => OpCode::StoreI,
            14 => OpCode::StoreF,
            15 => OpCode::StoreC,
            16 => OpCode::Dir,
            17 => OpCode::LoadP,
            18 => OpCode::StoreP,
            _ => return None,
        })
    }
}

/// Append-only bytecode emitter
#[derive(Debug, Default)]
pub struct CodeStream {
    bytes: Vec<u8>,
}

impl CodeStream {
    /// Create an empty stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Current length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if nothing has been emitted
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Emit an instruction with an f32 operand
    pub fn op_f32(&mut self, op: OpCode, operand: f32) {
        self.bytes.push(op as u8);
        self.bytes.extend_from_slice(&operand.to_le_bytes());
    }

    /// Emit an instruction with a scratch-register index operand
    pub fn op_reg(&mut self, op: OpCode, slot: i32) {
        self.bytes.push(op as u8);
        self.bytes.extend_from_slice(&slot.to_le_bytes());
    }

    /// Emit a store-family instruction carrying a destination offset
    pub fn op_store(&mut self, op: OpCode, offset: u16) {
        self.bytes.push(op as u8);
        self.bytes.extend_from_slice(&offset.to_le_bytes());
    }

    /// Emit LOADP with a resource handle operand
    pub fn op_loadp(&mut self, handle: ResourceHandle) {
        self.bytes.push(OpCode::LoadP as u8);
        self.bytes.extend_from_slice(&handle.raw().to_le_bytes());
    }

    /// Append another stream's instructions
    pub fn append(&mut self, other: CodeStream) {
        self.bytes.extend_from_slice(&other.bytes);
    }

    /// Terminate with END and yield the immutable program bytes
    pub fn finish(mut self) -> Vec<u8> {
        self.bytes.push(OpCode::End as u8);
        self.bytes
    }
}

/// Linear decoding cursor over a compiled program
///
/// All reads are explicit fixed-width little-endian decodes; the cursor
/// never looks backwards.
pub struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Start decoding at the front of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Decode the next opcode tag
    ///
    /// An unknown tag means the stream was not produced by this compiler
    /// (a compiler/interpreter mismatch); continuing would decode operands
    /// at the wrong alignment and corrupt unrelated fields, so this panics.
    pub fn next_op(&mut self) -> OpCode {
        let tag = self.bytes[self.pos];
        self.pos += 1;
        match OpCode::from_u8(tag) {
            Some(op) => op,
            None => panic!(
                "corrupt explosion code: unknown opcode tag {:#04x} at byte {}",
                tag,
                self.pos - 1
            ),
        }
    }

    /// Decode a 4-byte little-endian float operand
    pub fn read_f32(&mut self) -> f32 {
        f32::from_le_bytes(self.take())
    }

    /// Decode a 4-byte little-endian signed integer operand
    pub fn read_i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take())
    }

    /// Decode a 2-byte little-endian offset operand
    pub fn read_u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    /// Decode an 8-byte little-endian handle operand
    pub fn read_u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take())
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut raw = [0u8; N];
        raw.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let mut code = CodeStream::new();
        code.op_f32(OpCode::Add, 1.5);
        code.op_reg(OpCode::Yank, 3);
        code.op_store(OpCode::StoreF, 20);
        code.op_loadp(ResourceHandle::from_raw(99));
        let bytes = code.finish();

        let mut cur = Cursor::new(&bytes);
        assert_eq!(cur.next_op(), OpCode::Add);
        assert_eq!(cur.read_f32(), 1.5);
        assert_eq!(cur.next_op(), OpCode::Yank);
        assert_eq!(cur.read_i32(), 3);
        assert_eq!(cur.next_op(), OpCode::StoreF);
        assert_eq!(cur.read_u16(), 20);
        assert_eq!(cur.next_op(), OpCode::LoadP);
        assert_eq!(cur.read_u64(), 99);
        assert_eq!(cur.next_op(), OpCode::End);
    }

    #[test]
    #[should_panic(expected = "unknown opcode tag")]
    fn test_unknown_tag_is_fatal() {
        let bytes = [0xfeu8];
        Cursor::new(&bytes).next_op();
    }

    #[test]
    fn test_tag_roundtrip() {
        for tag in 0..=18u8 {
            let op = OpCode::from_u8(tag).unwrap();
            assert_eq!(op as u8, tag);
        }
        assert!(OpCode::from_u8(19).is_none());
    }
}
