//! Bit trees
//!
//! A symbol of `n` bits is coded one bit at a time, each bit with its own model selected
//! by the bits already coded.  The models form a binary tree stored as an array,
//! node `m` has children `2m` and `2m+1`, the root is 1.  The forward variants go from the
//! most significant bit down, the reverse variants from the least significant bit up.
//!
//! The free functions work on a slice of models shared with other contexts, starting at
//! an offset.  The offset is added to a node index that starts at 1, so an offset of
//! `u32::MAX` (i.e. -1) is allowed and puts the root at index 0.

use std::io::{Read,Write};
use super::bit_model::{BitEncoder,BitDecoder};
use super::range_coder::{Encoder,Decoder};
use crate::Error;

pub struct BitTreeEncoder {
    models: Vec<BitEncoder>,
    num_bit_levels: u32
}

pub struct BitTreeDecoder {
    models: Vec<BitDecoder>,
    num_bit_levels: u32
}

impl BitTreeEncoder {
    pub fn new(num_bit_levels: u32) -> Self {
        Self {
            models: vec![BitEncoder::new();1 << num_bit_levels],
            num_bit_levels
        }
    }
    pub fn init(&mut self) {
        for model in self.models.iter_mut() {
            model.init();
        }
    }
    pub fn encode<W: Write>(&mut self,encoder: &mut Encoder<W>,symbol: u32) -> Result<(),Error> {
        let mut m: usize = 1;
        for bit_index in (0..self.num_bit_levels).rev() {
            let bit = (symbol >> bit_index) & 1;
            self.models[m].encode(encoder,bit)?;
            m = (m << 1) | bit as usize;
        }
        Ok(())
    }
    pub fn reverse_encode<W: Write>(&mut self,encoder: &mut Encoder<W>,symbol: u32) -> Result<(),Error> {
        reverse_encode(&mut self.models,0,encoder,self.num_bit_levels,symbol)
    }
    pub fn get_price(&self,symbol: u32) -> u32 {
        let mut price = 0;
        let mut m: usize = 1;
        for bit_index in (0..self.num_bit_levels).rev() {
            let bit = (symbol >> bit_index) & 1;
            price += self.models[m].get_price(bit);
            m = (m << 1) | bit as usize;
        }
        price
    }
    pub fn reverse_get_price(&self,symbol: u32) -> u32 {
        reverse_get_price(&self.models,0,self.num_bit_levels,symbol)
    }
}

impl BitTreeDecoder {
    pub fn new(num_bit_levels: u32) -> Self {
        Self {
            models: vec![BitDecoder::new();1 << num_bit_levels],
            num_bit_levels
        }
    }
    pub fn init(&mut self) {
        for model in self.models.iter_mut() {
            model.init();
        }
    }
    pub fn decode<R: Read>(&mut self,decoder: &mut Decoder<R>) -> Result<u32,Error> {
        let mut m: u32 = 1;
        for _i in 0..self.num_bit_levels {
            m = (m << 1) + self.models[m as usize].decode(decoder)?;
        }
        Ok(m - (1 << self.num_bit_levels))
    }
    pub fn reverse_decode<R: Read>(&mut self,decoder: &mut Decoder<R>) -> Result<u32,Error> {
        reverse_decode(&mut self.models,0,decoder,self.num_bit_levels)
    }
}

/// Encode `symbol` least significant bit first using `models[start_index+1..]`
pub fn reverse_encode<W: Write>(models: &mut [BitEncoder],start_index: u32,encoder: &mut Encoder<W>,num_bit_levels: u32,symbol: u32) -> Result<(),Error> {
    let mut m: u32 = 1;
    let mut symbol = symbol;
    for _i in 0..num_bit_levels {
        let bit = symbol & 1;
        models[start_index.wrapping_add(m) as usize].encode(encoder,bit)?;
        m = (m << 1) | bit;
        symbol >>= 1;
    }
    Ok(())
}

pub fn reverse_get_price(models: &[BitEncoder],start_index: u32,num_bit_levels: u32,symbol: u32) -> u32 {
    let mut price = 0;
    let mut m: u32 = 1;
    let mut symbol = symbol;
    for _i in 0..num_bit_levels {
        let bit = symbol & 1;
        symbol >>= 1;
        price += models[start_index.wrapping_add(m) as usize].get_price(bit);
        m = (m << 1) | bit;
    }
    price
}

pub fn reverse_decode<R: Read>(models: &mut [BitDecoder],start_index: u32,decoder: &mut Decoder<R>,num_bit_levels: u32) -> Result<u32,Error> {
    let mut m: u32 = 1;
    let mut symbol: u32 = 0;
    for bit_index in 0..num_bit_levels {
        let bit = models[start_index.wrapping_add(m) as usize].decode(decoder)?;
        m = (m << 1) + bit;
        symbol |= bit << bit_index;
    }
    Ok(symbol)
}

#[test]
fn every_symbol_every_width() {
    for levels in 1..=16 {
        let count: u32 = 1 << levels;
        // stride through the wide trees to keep the test quick
        let step = match levels > 10 { true => 97, false => 1 };
        let symbols: Vec<u32> = (0..count).step_by(step).chain([count-1]).collect();
        let mut enc = Encoder::new(Vec::new());
        let mut fwd = BitTreeEncoder::new(levels);
        let mut rev = BitTreeEncoder::new(levels);
        for s in &symbols {
            fwd.encode(&mut enc,*s).expect("encode failed");
            rev.reverse_encode(&mut enc,*s).expect("encode failed");
        }
        enc.flush_data().expect("flush failed");
        let compressed = enc.release_stream();
        let mut dec = Decoder::new(compressed.as_slice()).expect("init failed");
        let mut fwd = BitTreeDecoder::new(levels);
        let mut rev = BitTreeDecoder::new(levels);
        for s in &symbols {
            assert_eq!(fwd.decode(&mut dec).expect("decode failed"),*s);
            assert_eq!(rev.reverse_decode(&mut dec).expect("decode failed"),*s);
        }
        assert!(dec.is_finished_ok());
    }
}

#[test]
fn shared_models() {
    // two 2 bit reverse trees packed behind each other, the first one rooted at index 0
    let mut models = vec![BitEncoder::new();8];
    let symbols = [(0,3),(1,2),(0,1),(1,0),(0,2),(1,3)];
    let mut enc = Encoder::new(Vec::new());
    for (tree,s) in symbols {
        let start = match tree { 0 => u32::MAX, _ => 3 };
        reverse_encode(&mut models,start,&mut enc,2,s).expect("encode failed");
    }
    // model at index 0 has seen bits, the one at index 7 has not
    assert_ne!(models[0].get_price0(),64);
    assert_eq!(models[7].get_price0(),64);
    assert!(reverse_get_price(&models,u32::MAX,2,3) > 0);
    enc.flush_data().expect("flush failed");
    let compressed = enc.release_stream();
    let mut dec = Decoder::new(compressed.as_slice()).expect("init failed");
    let mut models = vec![BitDecoder::new();8];
    for (tree,s) in symbols {
        let start = match tree { 0 => u32::MAX, _ => 3 };
        assert_eq!(reverse_decode(&mut models,start,&mut dec,2).expect("decode failed"),s);
    }
}

#[test]
fn prices_follow_statistics() {
    let mut tree = BitTreeEncoder::new(4);
    let mut enc = Encoder::new(std::io::sink());
    assert_eq!(tree.get_price(5),4*64);
    assert_eq!(tree.reverse_get_price(5),4*64);
    for _i in 0..50 {
        tree.encode(&mut enc,9).expect("encode failed");
    }
    assert!(tree.get_price(9) < tree.get_price(6));
}
