/// The stream ended before a read or skip could complete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Truncated {
    /// Cursor position where the failing access started.
    pub(crate) at: usize,
}

pub(crate) type ReadResult<T> = Result<T, Truncated>;

/// Forward-only little-endian cursor over an immutable byte slice.
pub(crate) struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn has_remaining(&self) -> bool {
        self.pos < self.data.len()
    }

    pub(crate) fn read_u8(&mut self) -> ReadResult<u8> {
        let b = *self.data.get(self.pos).ok_or(Truncated { at: self.pos })?;
        self.pos += 1;
        Ok(b)
    }

    pub(crate) fn read_u16_le(&mut self) -> ReadResult<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub(crate) fn read_bytes(&mut self, n: usize) -> ReadResult<&'a [u8]> {
        let end = self.end_of(n)?;
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    /// Advance by `n` bytes. Landing exactly on the end of the data is allowed.
    pub(crate) fn skip(&mut self, n: usize) -> ReadResult<()> {
        self.pos = self.end_of(n)?;
        Ok(())
    }

    /// Skip a chain of length-prefixed sub-blocks up to and including the zero-length terminator.
    pub(crate) fn skip_sub_blocks(&mut self) -> ReadResult<()> {
        loop {
            let len = self.read_u8()?;
            if len == 0 {
                return Ok(());
            }
            self.skip(usize::from(len))?;
        }
    }

    fn end_of(&self, n: usize) -> ReadResult<usize> {
        match self.pos.checked_add(n) {
            Some(end) if end <= self.data.len() => Ok(end),
            _ => Err(Truncated { at: self.pos }),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/container/reader.rs"]
mod tests;
