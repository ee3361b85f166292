//! Sliding input window for LZ type match finding
//!
//! The window is a single block of memory holding a stretch of the input stream.
//! Positions are absolute stream positions (u32), the buffer index of a position is
//! `buffer_offset + pos`.  Both are allowed to wrap, only their sum is used as an index.
//! When the cursor gets too close to the end of the block, the live bytes are moved to
//! the start of the block and more bytes are pulled from the stream.

use std::io::Read;
use crate::Error;

pub struct InWindow<R: Read> {
    buffer: Vec<u8>,
    stream: Option<R>,
    /// first position where a new block has to be read
    pos_limit: u32,
    /// if true, `stream_pos` is the real end of the stream
    stream_end_was_reached: bool,
    pointer_to_last_safe_position: u32,
    buffer_offset: u32,
    block_size: u32,
    /// current position
    pos: u32,
    /// bytes that must be kept before `pos`
    keep_size_before: u32,
    /// bytes that must be kept after `pos`
    keep_size_after: u32,
    /// first position not yet read from the stream
    stream_pos: u32
}

impl <R: Read> InWindow<R> {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            stream: None,
            pos_limit: 0,
            stream_end_was_reached: false,
            pointer_to_last_safe_position: 0,
            buffer_offset: 0,
            block_size: 0,
            pos: 0,
            keep_size_before: 0,
            keep_size_after: 0,
            stream_pos: 0
        }
    }
    /// Allocate the block, the buffer is reused if the size did not change.
    pub fn create(&mut self,keep_size_before: u32,keep_size_after: u32,keep_size_reserve: u32) {
        self.keep_size_before = keep_size_before;
        self.keep_size_after = keep_size_after;
        let block_size = keep_size_before + keep_size_after + keep_size_reserve;
        if self.buffer.len() != block_size as usize {
            self.block_size = block_size;
            self.buffer = vec![0;block_size as usize];
        }
        self.pointer_to_last_safe_position = self.block_size - keep_size_after;
    }
    pub fn set_stream(&mut self,stream: R) {
        self.stream = Some(stream);
    }
    pub fn release_stream(&mut self) -> Option<R> {
        self.stream.take()
    }
    /// Reset the cursors and read the first block.
    pub fn init(&mut self) -> Result<(),Error> {
        self.buffer_offset = 0;
        self.pos = 0;
        self.stream_pos = 0;
        self.stream_end_was_reached = false;
        self.read_block()
    }
    #[inline]
    fn index(&self,pos: u32) -> usize {
        self.buffer_offset.wrapping_add(pos) as usize
    }
    /// Slide the bytes we still need to the start of the block.
    pub fn move_block(&mut self) {
        let mut offset = self.buffer_offset.wrapping_add(self.pos).wrapping_sub(self.keep_size_before);
        // one more byte is needed since `move_pos` advances before reading
        if offset > 0 {
            offset -= 1;
        }
        let num_bytes = self.buffer_offset.wrapping_add(self.stream_pos).wrapping_sub(offset);
        log::trace!("move {} bytes from {} to start of block",num_bytes,offset);
        self.buffer.copy_within(offset as usize..(offset + num_bytes) as usize,0);
        self.buffer_offset = self.buffer_offset.wrapping_sub(offset);
    }
    /// Pull bytes from the stream until the block is full or the stream ends.
    pub fn read_block(&mut self) -> Result<(),Error> {
        if self.stream_end_was_reached {
            return Ok(());
        }
        loop {
            let start = self.index(self.stream_pos);
            let size = self.block_size as usize - start;
            if size == 0 {
                return Ok(());
            }
            let stream = self.stream.as_mut().ok_or(Error::NoStream)?;
            let num_read_bytes = stream.read(&mut self.buffer[start..start+size])?;
            if num_read_bytes == 0 {
                self.pos_limit = self.stream_pos;
                let pointer_to_position = self.buffer_offset.wrapping_add(self.pos_limit);
                if pointer_to_position > self.pointer_to_last_safe_position {
                    self.pos_limit = self.pointer_to_last_safe_position.wrapping_sub(self.buffer_offset);
                }
                log::trace!("end of stream at {}",self.stream_pos);
                self.stream_end_was_reached = true;
                return Ok(());
            }
            self.stream_pos += num_read_bytes as u32;
            if self.stream_pos >= self.pos + self.keep_size_after {
                self.pos_limit = self.stream_pos - self.keep_size_after;
            }
        }
    }
    /// Advance the cursor by one, refilling the block as needed.
    /// At the end of the stream the cursor stays put.
    pub fn move_pos(&mut self) -> Result<(),Error> {
        if self.at_end() {
            return Ok(());
        }
        self.pos += 1;
        if self.pos > self.pos_limit {
            let pointer_to_position = self.buffer_offset.wrapping_add(self.pos);
            if pointer_to_position > self.pointer_to_last_safe_position {
                self.move_block();
            }
            self.read_block()?;
        }
        Ok(())
    }
    /// byte at the cursor plus `index`
    pub fn get_index_byte(&self,index: i32) -> u8 {
        self.buffer[self.index(self.pos.wrapping_add_signed(index))]
    }
    /// Length of the match between the bytes at `index` and those `distance+1` bytes
    /// before, up to `limit`.  The sum of `index` and `limit` should not exceed the
    /// lookahead, near the end of the stream the limit is clipped.
    pub fn get_match_len(&self,index: i32,distance: u32,limit: u32) -> u32 {
        let start = self.pos.wrapping_add_signed(index);
        let mut limit = limit;
        if self.stream_end_was_reached && start + limit > self.stream_pos {
            limit = self.stream_pos - start;
        }
        let pby = self.index(start);
        let back = distance as usize + 1;
        let mut i: usize = 0;
        while i < limit as usize && self.buffer[pby + i] == self.buffer[pby + i - back] {
            i += 1;
        }
        i as u32
    }
    /// true if every byte of the stream has been passed
    pub fn at_end(&self) -> bool {
        self.stream_end_was_reached && self.pos == self.stream_pos
    }
    pub fn get_num_available_bytes(&self) -> u32 {
        self.stream_pos - self.pos
    }
    /// Rebase all the cursors, a negative value moves them forward.
    pub fn reduce_offsets(&mut self,sub_value: i32) {
        self.buffer_offset = self.buffer_offset.wrapping_add_signed(sub_value);
        self.pos_limit = self.pos_limit.wrapping_add_signed(sub_value.wrapping_neg());
        self.pos = self.pos.wrapping_add_signed(sub_value.wrapping_neg());
        self.stream_pos = self.stream_pos.wrapping_add_signed(sub_value.wrapping_neg());
    }
    pub fn pos(&self) -> u32 {
        self.pos
    }
    pub fn stream_pos(&self) -> u32 {
        self.stream_pos
    }
    pub fn buffer_offset(&self) -> u32 {
        self.buffer_offset
    }
    /// the whole block, index with `buffer_offset + position`
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }
    pub fn stream_end_was_reached(&self) -> bool {
        self.stream_end_was_reached
    }
}

impl <R: Read> Default for InWindow<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
/// Reader that hands out at most `chunk` bytes per call
struct Trickle {
    data: Vec<u8>,
    ptr: usize,
    chunk: usize
}

#[cfg(test)]
impl Read for Trickle {
    fn read(&mut self,buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf.len().min(self.chunk).min(self.data.len() - self.ptr);
        buf[0..n].copy_from_slice(&self.data[self.ptr..self.ptr+n]);
        self.ptr += n;
        Ok(n)
    }
}

#[test]
fn scan_with_block_moves() {
    let data: Vec<u8> = (0..200).map(|x| (x*7 % 251) as u8).collect();
    let mut win = InWindow::new();
    win.create(16,8,8);
    win.set_stream(Trickle { data: data.clone(), ptr: 0, chunk: 5 });
    win.init().expect("init failed");
    for i in 0..data.len() {
        assert_eq!(win.get_index_byte(0),data[i]);
        // lookahead is limited by the block
        let avail = win.get_num_available_bytes();
        assert!(avail >= 1 && avail <= 32);
        if win.stream_end_was_reached() {
            assert_eq!(avail,(data.len() - i) as u32);
        }
        if i > 0 {
            assert_eq!(win.get_index_byte(-1),data[i-1]);
        }
        if i + 1 < data.len() {
            assert_eq!(win.get_index_byte(1),data[i+1]);
        }
        win.move_pos().expect("move failed");
    }
    assert_eq!(win.get_num_available_bytes(),0);
    assert!(win.stream_end_was_reached());
    assert!(win.at_end());
    // moving past the end does nothing
    for _i in 0..3 {
        win.move_pos().expect("move failed");
    }
    assert_eq!(win.get_num_available_bytes(),0);
    assert_eq!(win.get_index_byte(-1),data[data.len()-1]);
}

#[test]
fn match_lengths() {
    let data = "xyzABCDEFABCDxyz".as_bytes();
    let mut win = InWindow::new();
    win.create(32,16,16);
    win.set_stream(data);
    win.init().expect("init failed");
    for _i in 0..9 {
        win.move_pos().expect("move failed");
    }
    // cursor is on the second "ABCD", which is 6 bytes behind
    assert_eq!(win.get_index_byte(0),b'A');
    assert_eq!(win.get_match_len(0,5,16),4);
    assert_eq!(win.get_match_len(0,5,2),2);
    assert_eq!(win.get_match_len(1,5,16),3);
    assert_eq!(win.get_match_len(0,4,16),0);
    // "xyz" at the end is 13 bytes behind, limit is clipped at end of stream
    for _i in 0..4 {
        win.move_pos().expect("move failed");
    }
    assert_eq!(win.get_match_len(0,12,16),3);
}

#[test]
fn missing_stream() {
    let mut win: InWindow<&[u8]> = InWindow::new();
    win.create(4,4,4);
    assert!(matches!(win.init(),Err(Error::NoStream)));
}
