//! Range encoder and decoder
//!
//! The encoder keeps a 33 bit `low` and a 32 bit `range`.  Whenever the range drops below
//! 2^24 one byte is shifted out.  A byte that could still be changed by a carry is held
//! back in `cache`, along with a count of pending 0xff bytes, until the carry is resolved.
//! The decoder mirrors every step, so it consumes a byte exactly when the encoder emits one.
//!
//! The first byte of every stream is 0, the decoder primes itself with the first 5 bytes.

use std::io::{Read,Write};
use crate::Error;

pub const TOP_VALUE: u32 = 1 << 24;

pub struct Encoder<W: Write> {
    stream: W,
    pub(crate) low: u64,
    pub(crate) range: u32,
    cache_size: u32,
    cache: u8,
    bytes_written: u64
}

pub struct Decoder<R: Read> {
    stream: R,
    pub(crate) range: u32,
    pub(crate) code: u32
}

impl <W: Write> Encoder<W> {
    /// Start encoding into `stream`
    pub fn new(stream: W) -> Self {
        Self {
            stream,
            low: 0,
            range: 0xffffffff,
            cache_size: 1,
            cache: 0,
            bytes_written: 0
        }
    }
    /// Emit the top byte of `low`, or hold it back if a carry could still reach it.
    pub fn shift_low(&mut self) -> Result<(),Error> {
        let carry = (self.low >> 32) as u8;
        if (self.low as u32) < 0xff000000 || carry == 1 {
            let mut temp = self.cache;
            loop {
                self.stream.write_all(&[temp.wrapping_add(carry)])?;
                self.bytes_written += 1;
                temp = 0xff;
                self.cache_size -= 1;
                if self.cache_size == 0 {
                    break;
                }
            }
            self.cache = ((self.low as u32) >> 24) as u8;
        }
        self.cache_size += 1;
        self.low = ((self.low as u32) << 8) as u64;
        Ok(())
    }
    pub(crate) fn normalize(&mut self) -> Result<(),Error> {
        while self.range < TOP_VALUE {
            self.range <<= 8;
            self.shift_low()?;
        }
        Ok(())
    }
    /// Encode the low `num_total_bits` of `v`, most significant first, with probability 1/2 each.
    pub fn encode_direct_bits(&mut self,v: u32,num_total_bits: u32) -> Result<(),Error> {
        for i in (0..num_total_bits).rev() {
            self.range >>= 1;
            if (v >> i) & 1 == 1 {
                self.low += self.range as u64;
            }
            if self.range < TOP_VALUE {
                self.range <<= 8;
                self.shift_low()?;
            }
        }
        Ok(())
    }
    /// Encode a symbol occupying `[start,start+size)` out of `total`.
    pub fn encode(&mut self,start: u32,size: u32,total: u32) -> Result<(),Error> {
        self.range /= total;
        self.low += start as u64 * self.range as u64;
        self.range *= size;
        self.normalize()
    }
    /// Encode a bit whose zero probability is `size0 / 2^num_total_bits`.
    pub fn encode_bit(&mut self,size0: u32,num_total_bits: u32,symbol: u32) -> Result<(),Error> {
        let new_bound = (self.range >> num_total_bits) * size0;
        if symbol == 0 {
            self.range = new_bound;
        } else {
            self.low += new_bound as u64;
            self.range -= new_bound;
        }
        self.normalize()
    }
    /// Drain everything still held in `low` and the cache.
    pub fn flush_data(&mut self) -> Result<(),Error> {
        for _i in 0..5 {
            self.shift_low()?;
        }
        Ok(())
    }
    pub fn flush_stream(&mut self) -> Result<(),Error> {
        Ok(self.stream.flush()?)
    }
    /// Bytes the stream will have when flushed, counting those still pending.
    pub fn processed_size_add(&self) -> u64 {
        self.cache_size as u64 + self.bytes_written + 4
    }
    /// Give back the stream, nothing is flushed.
    pub fn release_stream(self) -> W {
        self.stream
    }
}

impl <R: Read> Decoder<R> {
    /// Prime the decoder with the first 5 bytes of `stream`
    pub fn new(stream: R) -> Result<Self,Error> {
        let mut ans = Self {
            stream,
            range: 0xffffffff,
            code: 0
        };
        let mut seed = [0;5];
        ans.stream.read_exact(&mut seed)?;
        if seed[0] != 0 {
            log::error!("range coder seed begins with {:02x}",seed[0]);
            return Err(Error::CorruptStream);
        }
        for b in seed {
            ans.code = (ans.code << 8) | b as u32;
        }
        Ok(ans)
    }
    pub(crate) fn read_byte(&mut self) -> Result<u8,Error> {
        let mut b = [0;1];
        self.stream.read_exact(&mut b)?;
        Ok(b[0])
    }
    pub fn normalize(&mut self) -> Result<(),Error> {
        while self.range < TOP_VALUE {
            self.code = (self.code << 8) | self.read_byte()? as u32;
            self.range <<= 8;
        }
        Ok(())
    }
    /// Single step version of `normalize`, enough after one binary decision.
    pub fn normalize2(&mut self) -> Result<(),Error> {
        if self.range < TOP_VALUE {
            self.code = (self.code << 8) | self.read_byte()? as u32;
            self.range <<= 8;
        }
        Ok(())
    }
    /// Scale the range by `total` and return where the code falls, to be followed by `decode`.
    pub fn get_threshold(&mut self,total: u32) -> u32 {
        self.range /= total;
        self.code / self.range
    }
    pub fn decode(&mut self,start: u32,size: u32,_total: u32) -> Result<(),Error> {
        self.code = self.code.wrapping_sub(start.wrapping_mul(self.range));
        self.range = self.range.wrapping_mul(size);
        self.normalize()
    }
    pub fn decode_direct_bits(&mut self,num_total_bits: u32) -> Result<u32,Error> {
        let mut range = self.range;
        let mut code = self.code;
        let mut result: u32 = 0;
        for _i in 0..num_total_bits {
            range >>= 1;
            // t is 1 if code < range, done without a branch
            let t = code.wrapping_sub(range) >> 31;
            code = code.wrapping_sub(range & t.wrapping_sub(1));
            result = (result << 1) | (1 - t);
            if range < TOP_VALUE {
                code = (code << 8) | self.read_byte()? as u32;
                range <<= 8;
            }
        }
        self.range = range;
        self.code = code;
        Ok(result)
    }
    pub fn decode_bit(&mut self,size0: u32,num_total_bits: u32) -> Result<u32,Error> {
        let new_bound = (self.range >> num_total_bits) * size0;
        let symbol = match self.code < new_bound {
            true => {
                self.range = new_bound;
                0
            },
            false => {
                self.code -= new_bound;
                self.range -= new_bound;
                1
            }
        };
        self.normalize()?;
        Ok(symbol)
    }
    /// After the last symbol of a well formed stream the code is exhausted.
    pub fn is_finished_ok(&self) -> bool {
        self.code == 0
    }
    pub fn release_stream(self) -> R {
        self.stream
    }
}

#[test]
fn empty_stream() {
    let mut enc = Encoder::new(Vec::new());
    assert_eq!(enc.processed_size_add(),5);
    enc.flush_data().expect("flush failed");
    assert_eq!(enc.release_stream(),hex::decode("0000000000").unwrap());
}

#[test]
fn direct_bits_vector() {
    let mut enc = Encoder::new(Vec::new());
    enc.encode_direct_bits(0xff,8).expect("encode failed");
    enc.flush_data().expect("flush failed");
    let compressed = enc.release_stream();
    assert_eq!(compressed,hex::decode("00FEFFFFF800").unwrap());
    let mut dec = Decoder::new(compressed.as_slice()).expect("init failed");
    assert_eq!(dec.decode_direct_bits(8).expect("decode failed"),0xff);
    assert!(dec.is_finished_ok());
}

#[test]
fn mixed_symbols() {
    let mut x: u32 = 12345;
    let mut next = || {
        x = x.wrapping_mul(1103515245).wrapping_add(12345);
        x >> 8
    };
    let mut ops = Vec::new();
    for _i in 0..5000 {
        let r = next();
        ops.push((r % 3,next()));
    }
    let mut enc = Encoder::new(Vec::new());
    for (kind,v) in &ops {
        match kind {
            0 => enc.encode_direct_bits(*v,13).expect("encode failed"),
            1 => enc.encode(v % 10,1,10).expect("encode failed"),
            _ => enc.encode_bit(300,11,v & 1).expect("encode failed")
        }
    }
    enc.flush_data().expect("flush failed");
    let compressed = enc.release_stream();
    let mut dec = Decoder::new(compressed.as_slice()).expect("init failed");
    for (kind,v) in &ops {
        match kind {
            0 => assert_eq!(dec.decode_direct_bits(13).expect("decode failed"),v & 0x1fff),
            1 => {
                let threshold = dec.get_threshold(10);
                assert_eq!(threshold,v % 10);
                dec.decode(threshold,1,10).expect("decode failed");
            },
            _ => assert_eq!(dec.decode_bit(300,11).expect("decode failed"),v & 1)
        }
    }
    assert!(dec.is_finished_ok());
}

#[test]
fn bad_seed() {
    let bytes = hex::decode("01FEFFFFF800").unwrap();
    assert!(matches!(Decoder::new(bytes.as_slice()),Err(Error::CorruptStream)));
    let bytes = hex::decode("0000").unwrap();
    assert!(matches!(Decoder::new(bytes.as_slice()),Err(Error::Io(_))));
}
