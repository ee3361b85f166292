//! Circular output window for LZ type decoders
//!
//! Decoded bytes go into a circular buffer the size of the dictionary, so that matches can
//! be copied out of recent history.  The buffer is written to the sink whenever it wraps,
//! and on `flush`.  Memory is claimed as bytes arrive, so a window much larger than
//! the data costs nothing.
//!
//! Unlike a plain ring buffer, reaching behind the bytes that were actually produced
//! (or trained) is an error, since that can only happen with a corrupt stream.

use std::io::{Read,Write,Seek,SeekFrom};
use crate::Error;

pub struct OutWindow<W: Write> {
    buffer: Vec<u8>,
    pos: u32,
    window_size: u32,
    /// start of the bytes not yet written to the stream
    stream_pos: u32,
    stream: Option<W>,
    /// whether the window has wrapped at least once, i.e., all of it is history
    is_full: bool,
    /// number of bytes loaded by `train`
    pub train_size: u32
}

impl <W: Write> OutWindow<W> {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            pos: 0,
            window_size: 0,
            stream_pos: 0,
            stream: None,
            is_full: false,
            train_size: 0
        }
    }
    /// Set up a window of `window_size` bytes, the buffer is reused if the size did not change.
    pub fn create(&mut self,window_size: u32) -> Result<(),Error> {
        if window_size == 0 {
            return Err(Error::InvalidParam);
        }
        if self.window_size != window_size {
            self.buffer = Vec::new();
        }
        self.window_size = window_size;
        self.pos = 0;
        self.stream_pos = 0;
        self.is_full = false;
        Ok(())
    }
    /// Attach a new sink, flushing anything pending to the old one.
    /// Unless `solid`, the history is forgotten.
    pub fn init(&mut self,stream: W,solid: bool) -> Result<Option<W>,Error> {
        let old = self.release_stream()?;
        self.stream = Some(stream);
        if !solid {
            self.stream_pos = 0;
            self.pos = 0;
            self.is_full = false;
            self.train_size = 0;
        }
        Ok(old)
    }
    /// Preload history from the tail of `stream`, nothing is written to the sink.
    /// Returns false if the stream ended early.
    pub fn train<S: Read + Seek>(&mut self,stream: &mut S) -> Result<bool,Error> {
        let len = stream.seek(SeekFrom::End(0))?;
        let mut size = match len < self.window_size as u64 {
            true => len as u32,
            false => self.window_size
        };
        self.train_size = size;
        stream.seek(SeekFrom::Start(len - size as u64))?;
        self.stream_pos = 0;
        self.pos = 0;
        self.is_full = false;
        while size > 0 {
            let cur_size = u32::min(self.window_size - self.pos,size);
            let start = self.pos as usize;
            if self.buffer.len() < start + cur_size as usize {
                self.buffer.resize(start + cur_size as usize,0);
            }
            let num_read_bytes = stream.read(&mut self.buffer[start..start + cur_size as usize])? as u32;
            if num_read_bytes == 0 {
                return Ok(false);
            }
            size -= num_read_bytes;
            self.pos += num_read_bytes;
            self.stream_pos += num_read_bytes;
            if self.pos == self.window_size {
                self.pos = 0;
                self.stream_pos = 0;
                self.is_full = true;
            }
        }
        log::debug!("output window trained with {} bytes",self.train_size);
        Ok(true)
    }
    /// Flush and detach the sink.
    pub fn release_stream(&mut self) -> Result<Option<W>,Error> {
        if self.stream.is_some() {
            self.flush()?;
        }
        Ok(self.stream.take())
    }
    /// Write out the bytes produced since the last flush.
    pub fn flush(&mut self) -> Result<(),Error> {
        let size = self.pos - self.stream_pos;
        if size == 0 {
            return Ok(());
        }
        let stream = self.stream.as_mut().ok_or(Error::NoStream)?;
        stream.write_all(&self.buffer[self.stream_pos as usize..self.pos as usize])?;
        if self.pos >= self.window_size {
            self.pos = 0;
            self.is_full = true;
        }
        self.stream_pos = self.pos;
        Ok(())
    }
    /// Buffer index of the byte `distance+1` back, or an error if there is no such byte.
    fn back_index(&self,distance: u32) -> Result<u32,Error> {
        if distance >= self.window_size || (!self.is_full && distance >= self.pos) {
            log::error!("distance {} reaches outside of window",distance);
            return Err(Error::CorruptStream);
        }
        let mut pos = self.pos.wrapping_sub(distance).wrapping_sub(1);
        if pos >= self.window_size {
            pos = pos.wrapping_add(self.window_size);
        }
        Ok(pos)
    }
    /// Copy `len` bytes starting `distance+1` back, one at a time so that the copy may overlap itself.
    pub fn copy_block(&mut self,distance: u32,len: u32) -> Result<(),Error> {
        let mut pos = self.back_index(distance)?;
        for _i in 0..len {
            if pos >= self.window_size {
                pos = 0;
            }
            let b = self.buffer[pos as usize];
            self.store(b);
            self.pos += 1;
            pos += 1;
            if self.pos >= self.window_size {
                self.flush()?;
            }
        }
        Ok(())
    }
    /// Put `b` at the cursor, growing the buffer up to the window size.
    fn store(&mut self,b: u8) {
        let i = self.pos as usize;
        if i < self.buffer.len() {
            self.buffer[i] = b;
            return;
        }
        if self.buffer.len() == self.buffer.capacity() {
            let room = self.window_size as usize - self.buffer.len();
            self.buffer.reserve_exact(usize::min(usize::max(self.buffer.len(),1 << 12),room));
        }
        self.buffer.push(b);
    }
    pub fn put_byte(&mut self,b: u8) -> Result<(),Error> {
        self.store(b);
        self.pos += 1;
        if self.pos >= self.window_size {
            self.flush()?;
        }
        Ok(())
    }
    /// Byte `distance+1` back from the cursor
    pub fn get_byte(&self,distance: u32) -> Result<u8,Error> {
        Ok(self.buffer[self.back_index(distance)? as usize])
    }
}

impl <W: Write> Default for OutWindow<W> {
    fn default() -> Self {
        Self::new()
    }
}

#[test]
fn overlapping_copy() {
    let mut win = OutWindow::new();
    win.create(16).expect("create failed");
    win.init(Vec::new(),false).expect("init failed");
    win.put_byte(b'a').expect("put failed");
    win.put_byte(b'b').expect("put failed");
    win.copy_block(1,7).expect("copy failed");
    win.copy_block(0,3).expect("copy failed");
    assert_eq!(win.get_byte(0).unwrap(),b'a');
    assert_eq!(win.get_byte(1).unwrap(),b'a');
    let out = win.release_stream().expect("release failed").unwrap();
    assert_eq!(out,"ababababaaaa".as_bytes());
}

#[test]
fn wrap_around() {
    let data: Vec<u8> = (0..100).map(|x| x as u8).collect();
    let mut win = OutWindow::new();
    win.create(8).expect("create failed");
    win.init(Vec::new(),false).expect("init failed");
    for b in &data {
        win.put_byte(*b).expect("put failed");
    }
    for d in 0..8 {
        assert_eq!(win.get_byte(d).unwrap(),data[99-d as usize]);
    }
    // repeat the last 8 bytes across the seam
    win.copy_block(7,8).expect("copy failed");
    let out = win.release_stream().expect("release failed").unwrap();
    assert_eq!(out[0..100],data[..]);
    assert_eq!(out[100..],data[92..]);
}

#[test]
fn reach_outside() {
    let mut win = OutWindow::new();
    win.create(8).expect("create failed");
    win.init(Vec::new(),false).expect("init failed");
    assert!(matches!(win.get_byte(0),Err(Error::CorruptStream)));
    win.put_byte(1).expect("put failed");
    win.put_byte(2).expect("put failed");
    assert!(win.copy_block(1,1).is_ok());
    assert!(matches!(win.copy_block(3,1),Err(Error::CorruptStream)));
    assert!(matches!(win.copy_block(8,1),Err(Error::CorruptStream)));
}

#[test]
fn trained_history() {
    let mut history = std::io::Cursor::new("0123456789hello".as_bytes());
    let mut win = OutWindow::new();
    win.create(8).expect("create failed");
    win.init(Vec::new(),false).expect("init failed");
    assert!(win.train(&mut history).expect("train failed"));
    assert_eq!(win.train_size,8);
    assert_eq!(win.get_byte(0).unwrap(),b'o');
    win.copy_block(4,5).expect("copy failed");
    win.put_byte(b'!').expect("put failed");
    let out = win.release_stream().expect("release failed").unwrap();
    assert_eq!(out,"hello!".as_bytes());
}

#[test]
fn grows_with_data() {
    let mut win = OutWindow::new();
    win.create(1 << 30).expect("create failed");
    win.init(Vec::new(),false).expect("init failed");
    assert!(win.buffer.capacity() == 0);
    for i in 0..10000 {
        win.put_byte((i % 251) as u8).expect("put failed");
    }
    win.copy_block(250,1000).expect("copy failed");
    assert!(win.buffer.capacity() < 1 << 16);
    let out = win.release_stream().expect("release failed").unwrap();
    assert_eq!(out.len(),11000);
    assert_eq!(out[10000..10251],out[9749..10000]);
}
