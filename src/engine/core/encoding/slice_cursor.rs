use crate::engine::errors::DecodeError;

pub const SIZE_U32: usize = 4;
pub const SIZE_U64: usize = 8;

/// Byte cursor threaded through every decode call. Cloning is cheap and is
/// how callers peek ahead without moving the shared position.
#[derive(Clone, Debug)]
pub struct SliceCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> SliceCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn set_position(&mut self, pos: usize) -> Result<(), DecodeError> {
        if pos > self.buf.len() {
            return Err(DecodeError::UnexpectedEof {
                offset: self.pos,
                needed: pos - self.pos,
            });
        }
        self.pos = pos;
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn has_bytes(&self, n: usize) -> bool {
        self.remaining() >= n
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn ensure(&self, n: usize) -> Result<(), DecodeError> {
        if self.has_bytes(n) {
            Ok(())
        } else {
            Err(DecodeError::UnexpectedEof {
                offset: self.pos,
                needed: n,
            })
        }
    }

    pub fn advance(&mut self, n: usize) -> Result<(), DecodeError> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    pub fn peek_u8(&self) -> Result<u8, DecodeError> {
        self.ensure(1)?;
        Ok(self.buf[self.pos])
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let b = self.peek_u8()?;
        self.pos += 1;
        Ok(b)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        self.ensure(n)?;
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        let mut b = [0u8; SIZE_U32];
        b.copy_from_slice(self.read_bytes(SIZE_U32)?);
        Ok(u32::from_le_bytes(b))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, DecodeError> {
        let mut b = [0u8; SIZE_U64];
        b.copy_from_slice(self.read_bytes(SIZE_U64)?);
        Ok(u64::from_le_bytes(b))
    }

    pub fn read_f32_le(&mut self) -> Result<f32, DecodeError> {
        self.read_u32_le().map(f32::from_bits)
    }

    pub fn read_f64_le(&mut self) -> Result<f64, DecodeError> {
        self.read_u64_le().map(f64::from_bits)
    }
}
