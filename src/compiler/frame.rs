//! Stack layout bookkeeping for code generation.
//!
//! A [`Frame`] is the stack region of one function activation. It is
//! split into nested [`Block`]s, the first of which holds the formals.
//! The frame's size at the moment a variable is declared is that
//! variable's offset.

use tracing::trace;

#[derive(Debug, Default)]
pub struct Block {
    size: i64,
}

impl Block {
    fn change(&mut self, n: i64) {
        self.size += n;
    }

    pub fn size(&self) -> i64 {
        self.size
    }
}

#[derive(Debug)]
pub struct Frame {
    size: i64,
    blocks: Vec<Block>,
}

impl Default for Frame {
    fn default() -> Self {
        Frame::new()
    }
}

impl Frame {
    pub fn new() -> Self {
        Frame {
            size: 0,
            blocks: vec![Block::default()],
        }
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn open_block(&mut self) {
        self.blocks.push(Block::default());
    }

    /// Drops the innermost block and everything it still holds.
    pub fn close_block(&mut self) -> i64 {
        let size = self.block_size();
        self.size -= size;
        self.blocks.pop();
        size
    }

    pub fn change(&mut self, n: i64) {
        self.size += n;
        match self.blocks.last_mut() {
            Some(block) => block.change(n),
            None => unreachable!("frame has no open block"),
        }
    }

    pub fn block_size(&self) -> i64 {
        self.blocks.last().map(Block::size).unwrap_or(0)
    }

    pub fn depth(&self) -> usize {
        self.blocks.len()
    }
}

/// One [`Frame`] per function currently being compiled.
#[derive(Debug, Default)]
pub struct Frames {
    frames: Vec<Frame>,
}

impl Frames {
    pub fn new() -> Self {
        Frames::default()
    }

    pub fn open_frame(&mut self) {
        self.frames.push(Frame::new());
        trace!(depth = self.frames.len(), "open frame");
    }

    pub fn close_frame(&mut self) {
        self.frames.pop();
        trace!(depth = self.frames.len(), "close frame");
    }

    pub fn open_block(&mut self) {
        self.top_mut().open_block();
    }

    pub fn close_block(&mut self) -> i64 {
        self.top_mut().close_block()
    }

    pub fn change(&mut self, n: i64) {
        self.top_mut().change(n);
    }

    /// Current frame size, which is also the next free offset.
    pub fn size(&self) -> usize {
        let size = self.top().size();
        usize::try_from(size).unwrap_or_else(|_| unreachable!("frame size went negative: {}", size))
    }

    pub fn block_size(&self) -> usize {
        let size = self.top().block_size();
        usize::try_from(size).unwrap_or_else(|_| unreachable!("block size went negative: {}", size))
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn top(&self) -> &Frame {
        match self.frames.last() {
            Some(frame) => frame,
            None => unreachable!("no open frame"),
        }
    }

    fn top_mut(&mut self) -> &mut Frame {
        match self.frames.last_mut() {
            Some(frame) => frame,
            None => unreachable!("no open frame"),
        }
    }
}
