//! Adaptive binary probability models
//!
//! A model holds the probability of a 0 in units of 1/2048.  After every bit it moves
//! 1/32 of the way toward the bit that was seen.  Prices are approximate costs in
//! 1/64 bit units, looked up in a table shared by all models.

use std::io::{Read,Write};
use std::sync::OnceLock;
use super::range_coder::{Encoder,Decoder,TOP_VALUE};
use crate::Error;

pub const NUM_BIT_MODEL_TOTAL_BITS: u32 = 11;
pub const BIT_MODEL_TOTAL: u32 = 1 << NUM_BIT_MODEL_TOTAL_BITS;
const NUM_MOVE_BITS: u32 = 5;
const NUM_MOVE_REDUCING_BITS: u32 = 2;
pub const NUM_BIT_PRICE_SHIFT_BITS: u32 = 6;

static PROB_PRICES: OnceLock<Vec<u32>> = OnceLock::new();

/// Table of -log2(p) scaled by 64, indexed by p >> 2
fn prob_prices() -> &'static [u32] {
    PROB_PRICES.get_or_init(|| {
        let num_bits = NUM_BIT_MODEL_TOTAL_BITS - NUM_MOVE_REDUCING_BITS;
        let mut ans = vec![0;(BIT_MODEL_TOTAL >> NUM_MOVE_REDUCING_BITS) as usize];
        for i in (0..num_bits).rev() {
            let start: u32 = 1 << (num_bits - i - 1);
            let end: u32 = 1 << (num_bits - i);
            for j in start..end {
                ans[j as usize] = (i << NUM_BIT_PRICE_SHIFT_BITS) +
                    (((end - j) << NUM_BIT_PRICE_SHIFT_BITS) >> (num_bits - i - 1));
            }
        }
        ans
    })
}

#[derive(Clone,Copy)]
pub struct BitEncoder {
    prob: u32
}

#[derive(Clone,Copy)]
pub struct BitDecoder {
    prob: u32
}

impl BitEncoder {
    pub fn new() -> Self {
        Self { prob: BIT_MODEL_TOTAL >> 1 }
    }
    pub fn init(&mut self) {
        self.prob = BIT_MODEL_TOTAL >> 1;
    }
    pub fn update_model(&mut self,symbol: u32) {
        if symbol == 0 {
            self.prob += (BIT_MODEL_TOTAL - self.prob) >> NUM_MOVE_BITS;
        } else {
            self.prob -= self.prob >> NUM_MOVE_BITS;
        }
    }
    pub fn encode<W: Write>(&mut self,encoder: &mut Encoder<W>,symbol: u32) -> Result<(),Error> {
        let new_bound = (encoder.range >> NUM_BIT_MODEL_TOTAL_BITS) * self.prob;
        if symbol == 0 {
            encoder.range = new_bound;
        } else {
            encoder.low += new_bound as u64;
            encoder.range -= new_bound;
        }
        self.update_model(symbol);
        if encoder.range < TOP_VALUE {
            encoder.range <<= 8;
            encoder.shift_low()?;
        }
        Ok(())
    }
    pub fn get_price(&self,symbol: u32) -> u32 {
        let idx = (self.prob.wrapping_sub(symbol) ^ symbol.wrapping_neg()) & (BIT_MODEL_TOTAL - 1);
        prob_prices()[(idx >> NUM_MOVE_REDUCING_BITS) as usize]
    }
    pub fn get_price0(&self) -> u32 {
        prob_prices()[(self.prob >> NUM_MOVE_REDUCING_BITS) as usize]
    }
    pub fn get_price1(&self) -> u32 {
        prob_prices()[((BIT_MODEL_TOTAL - self.prob) >> NUM_MOVE_REDUCING_BITS) as usize]
    }
}

impl Default for BitEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BitDecoder {
    pub fn new() -> Self {
        Self { prob: BIT_MODEL_TOTAL >> 1 }
    }
    pub fn init(&mut self) {
        self.prob = BIT_MODEL_TOTAL >> 1;
    }
    pub fn update_model(&mut self,num_move_bits: u32,symbol: u32) {
        if symbol == 0 {
            self.prob += (BIT_MODEL_TOTAL - self.prob) >> num_move_bits;
        } else {
            self.prob -= self.prob >> num_move_bits;
        }
    }
    pub fn decode<R: Read>(&mut self,decoder: &mut Decoder<R>) -> Result<u32,Error> {
        let new_bound = (decoder.range >> NUM_BIT_MODEL_TOTAL_BITS) * self.prob;
        let symbol = match decoder.code < new_bound {
            true => {
                decoder.range = new_bound;
                0
            },
            false => {
                decoder.range -= new_bound;
                decoder.code -= new_bound;
                1
            }
        };
        self.update_model(NUM_MOVE_BITS,symbol);
        decoder.normalize2()?;
        Ok(symbol)
    }
}

impl Default for BitDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[test]
fn price_table() {
    let prices = prob_prices();
    assert_eq!(prices.len(),512);
    // p = 1/2 costs one bit
    assert_eq!(prices[256],64);
    assert_eq!(prices[1],576);
    assert_eq!(prices[511],0);
    for i in 2..512 {
        assert!(prices[i] <= prices[i-1]);
    }
    let mut model = BitEncoder::new();
    assert_eq!(model.get_price0(),64);
    assert_eq!(model.get_price1(),64);
    for _i in 0..20 {
        model.update_model(0);
    }
    assert!(model.get_price0() < 64);
    assert!(model.get_price1() > 64);
    assert_eq!(model.get_price(0),model.get_price0());
    assert_eq!(model.get_price(1),model.get_price1());
}

#[test]
fn skewed_bits() {
    let mut x: u32 = 99;
    let bits: Vec<u32> = (0..20000).map(|i| {
        x = x.wrapping_mul(1664525).wrapping_add(1013904223);
        // mostly zeros at first, mostly ones later
        match i < 10000 {
            true => (x >> 24 < 20) as u32,
            false => (x >> 24 > 30) as u32
        }
    }).collect();
    let mut enc = Encoder::new(Vec::new());
    let mut models = vec![BitEncoder::new();2];
    for (i,b) in bits.iter().enumerate() {
        models[i & 1].encode(&mut enc,*b).expect("encode failed");
    }
    enc.flush_data().expect("flush failed");
    let compressed = enc.release_stream();
    // well under one bit per symbol
    assert!(compressed.len() < 20000 / 8 * 3 / 4);
    let mut dec = Decoder::new(compressed.as_slice()).expect("init failed");
    let mut models = vec![BitDecoder::new();2];
    for (i,b) in bits.iter().enumerate() {
        assert_eq!(models[i & 1].decode(&mut dec).expect("decode failed"),*b);
    }
    assert!(dec.is_finished_ok());
}
