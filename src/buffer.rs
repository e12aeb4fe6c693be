use circular::Buffer;

/// FIFO adapting producer-side byte chunks to the decoder's pull side.
///
/// Chunks of any size are appended with [`ChunkBuffer::push`]; the decoder
/// inspects the contiguous unread window with [`ChunkBuffer::data`] and
/// releases fully framed records with [`ChunkBuffer::consume`]. Consumed
/// bytes are unreachable afterwards.
///
/// The buffer is shifted and grown as needed, so a push never fails; memory
/// in flight is bounded by the unconsumed window (at most one block plus
/// whatever lookahead the producer supplied).
pub struct ChunkBuffer {
    buffer: Buffer,
    ended: bool,
}

impl ChunkBuffer {
    pub fn with_capacity(capacity: usize) -> ChunkBuffer {
        ChunkBuffer {
            buffer: Buffer::with_capacity(capacity),
            ended: false,
        }
    }

    /// Append a chunk of input.
    pub fn push(&mut self, chunk: &[u8]) {
        if self.buffer.available_space() < chunk.len() {
            self.buffer.shift();
        }
        if self.buffer.available_space() < chunk.len() {
            let needed = self.buffer.available_data() + chunk.len();
            self.buffer.grow(needed.next_power_of_two());
        }
        let space = self.buffer.space();
        space[..chunk.len()].copy_from_slice(chunk);
        self.buffer.fill(chunk.len());
    }

    /// Declare end of input. Further pushes are not expected.
    pub fn end(&mut self) {
        self.ended = true;
    }

    /// True once the producer declared end of input.
    #[inline]
    pub fn ended(&self) -> bool {
        self.ended
    }

    /// The contiguous window of unread bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.buffer.data()
    }

    /// Number of unread bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.available_data()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.available_data() == 0
    }

    /// Drop `count` bytes from the front of the window.
    pub fn consume(&mut self, count: usize) {
        self.buffer.consume(count);
    }
}
