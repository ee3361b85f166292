//! LZ77 with Range Coding
//!
//! A small greedy codec built from the primitives in `tools`.  It uses the same kind of
//! context modeling as LZMA, but much less of it, and it is not compatible with LZMA.
//!
//! * 4 byte magic `LZR1`
//! * 4 byte dictionary size, little endian
//! * 8 byte expanded length, little endian
//! * range coded body
//! * 4 byte CRC-32 of the expanded data, little endian
//!
//! Each step of the body is an `is_match` bit in the context of whether the previous step
//! was a match.  A literal is coded with one of 8 bit trees, selected by the top 3 bits of
//! the previous byte.  A match is coded as its length less 2, followed by its distance.
//! Distances are split into a 6 bit slot and footer bits, low slots code the footer with
//! shared reverse bit trees, high slots use direct bits with a reverse tree for the last 4.

use std::io::{Cursor,Read,Write,Seek,SeekFrom,BufReader,BufWriter,ErrorKind};
use crate::tools::bin_tree::{BinTree,MAX_VAL_FOR_NORMALIZE};
use crate::tools::out_window::OutWindow;
use crate::tools::range_coder;
use crate::tools::bit_model::{BitEncoder,BitDecoder,NUM_BIT_PRICE_SHIFT_BITS};
use crate::tools::bit_tree::{self,BitTreeEncoder,BitTreeDecoder};
use crate::tools::crc::{CrcReader,CrcWriter};
use crate::{MatchFinderKind,DYNERR};

const MAGIC: [u8;4] = *b"LZR1";
const HEADER_SIZE: usize = 16;
pub const MIN_DICTIONARY_SIZE: u32 = 1 << 12;
pub const MATCH_MIN_LEN: u32 = 2;
pub const MATCH_MAX_LEN: u32 = MATCH_MIN_LEN + (1 << NUM_LEN_BITS) - 1;
const MIN_FAST_BYTES: u32 = 5;
const NUM_LEN_BITS: u32 = 8;
const NUM_LIT_STATES: usize = 8;
const NUM_POS_SLOT_BITS: u32 = 6;
const START_POS_MODEL_INDEX: u32 = 4;
const END_POS_MODEL_INDEX: u32 = 14;
const NUM_FULL_DISTANCES: u32 = 1 << (END_POS_MODEL_INDEX >> 1);
const NUM_ALIGN_BITS: u32 = 4;
const ALIGN_MASK: u32 = (1 << NUM_ALIGN_BITS) - 1;

/// Options controlling compression
#[derive(Clone)]
pub struct Options {
    /// size of the sliding dictionary, the encoder may reduce it for short inputs
    pub dictionary_size: u32,
    /// longest match the encoder will look for (fast bytes), 5 to 257
    pub match_max_len: u32,
    /// kind of binary tree match finder
    pub match_finder: MatchFinderKind,
    /// limit on tree nodes visited per position, derived from `match_max_len` if None
    pub cut_value: Option<u32>,
    /// return error if file is larger
    pub max_file_size: u64
}

pub const STD_OPTIONS: Options = Options {
    dictionary_size: 1 << 20,
    match_max_len: 64,
    match_finder: MatchFinderKind::BT4,
    cut_value: None,
    max_file_size: u32::MAX as u64
};

/// Slot of a distance, roughly twice its log2, slots 0-3 are the distance itself
fn get_pos_slot(dist: u32) -> u32 {
    if dist < START_POS_MODEL_INDEX {
        return dist;
    }
    let n = 31 - dist.leading_zeros();
    (n << 1) | ((dist >> (n - 1)) & 1)
}

/// (footer bits, base distance) of a slot that is at least 4
fn slot_footer(pos_slot: u32) -> (u32,u32) {
    let footer_bits = (pos_slot >> 1) - 1;
    (footer_bits,(2 | (pos_slot & 1)) << footer_bits)
}

struct EncoderModels {
    is_match: [BitEncoder;2],
    literals: Vec<BitTreeEncoder>,
    len: BitTreeEncoder,
    pos_slot: BitTreeEncoder,
    pos: Vec<BitEncoder>,
    align: BitTreeEncoder
}

struct DecoderModels {
    is_match: [BitDecoder;2],
    literals: Vec<BitTreeDecoder>,
    len: BitTreeDecoder,
    pos_slot: BitTreeDecoder,
    pos: Vec<BitDecoder>,
    align: BitTreeDecoder
}

impl EncoderModels {
    fn new() -> Self {
        Self {
            is_match: [BitEncoder::new();2],
            literals: (0..NUM_LIT_STATES).map(|_| BitTreeEncoder::new(8)).collect(),
            len: BitTreeEncoder::new(NUM_LEN_BITS),
            pos_slot: BitTreeEncoder::new(NUM_POS_SLOT_BITS),
            pos: vec![BitEncoder::new();(NUM_FULL_DISTANCES - END_POS_MODEL_INDEX) as usize],
            align: BitTreeEncoder::new(NUM_ALIGN_BITS)
        }
    }
    fn encode_literal<W: Write>(&mut self,rc: &mut range_coder::Encoder<W>,state: usize,prev_byte: u8,b: u8) -> Result<(),DYNERR> {
        self.is_match[state].encode(rc,0)?;
        self.literals[prev_byte as usize >> 5].encode(rc,b as u32)?;
        Ok(())
    }
    fn encode_match<W: Write>(&mut self,rc: &mut range_coder::Encoder<W>,state: usize,len: u32,dist: u32) -> Result<(),DYNERR> {
        self.is_match[state].encode(rc,1)?;
        self.len.encode(rc,len - MATCH_MIN_LEN)?;
        let pos_slot = get_pos_slot(dist);
        self.pos_slot.encode(rc,pos_slot)?;
        if pos_slot >= START_POS_MODEL_INDEX {
            let (footer_bits,base) = slot_footer(pos_slot);
            let reduced = dist - base;
            if pos_slot < END_POS_MODEL_INDEX {
                bit_tree::reverse_encode(&mut self.pos,base.wrapping_sub(pos_slot).wrapping_sub(1),rc,footer_bits,reduced)?;
            } else {
                rc.encode_direct_bits(reduced >> NUM_ALIGN_BITS,footer_bits - NUM_ALIGN_BITS)?;
                self.align.reverse_encode(rc,reduced & ALIGN_MASK)?;
            }
        }
        Ok(())
    }
    /// Price of coding the bytes in `bytes` as literals
    fn literals_price(&self,state: usize,prev_byte: u8,bytes: &[u8]) -> u32 {
        let mut price = 0;
        let mut state = state;
        let mut prev = prev_byte;
        for b in bytes {
            price += self.is_match[state].get_price0();
            price += self.literals[prev as usize >> 5].get_price(*b as u32);
            state = 0;
            prev = *b;
        }
        price
    }
    fn match_price(&self,state: usize,len: u32,dist: u32) -> u32 {
        let mut price = self.is_match[state].get_price1() + self.len.get_price(len - MATCH_MIN_LEN);
        let pos_slot = get_pos_slot(dist);
        price += self.pos_slot.get_price(pos_slot);
        if pos_slot >= START_POS_MODEL_INDEX {
            let (footer_bits,base) = slot_footer(pos_slot);
            let reduced = dist - base;
            if pos_slot < END_POS_MODEL_INDEX {
                price += bit_tree::reverse_get_price(&self.pos,base.wrapping_sub(pos_slot).wrapping_sub(1),footer_bits,reduced);
            } else {
                price += (footer_bits - NUM_ALIGN_BITS) << NUM_BIT_PRICE_SHIFT_BITS;
                price += self.align.reverse_get_price(reduced & ALIGN_MASK);
            }
        }
        price
    }
}

impl DecoderModels {
    fn new() -> Self {
        Self {
            is_match: [BitDecoder::new();2],
            literals: (0..NUM_LIT_STATES).map(|_| BitTreeDecoder::new(8)).collect(),
            len: BitTreeDecoder::new(NUM_LEN_BITS),
            pos_slot: BitTreeDecoder::new(NUM_POS_SLOT_BITS),
            pos: vec![BitDecoder::new();(NUM_FULL_DISTANCES - END_POS_MODEL_INDEX) as usize],
            align: BitTreeDecoder::new(NUM_ALIGN_BITS)
        }
    }
    fn decode_distance<R: Read>(&mut self,rc: &mut range_coder::Decoder<R>) -> Result<u32,DYNERR> {
        let pos_slot = self.pos_slot.decode(rc)?;
        if pos_slot < START_POS_MODEL_INDEX {
            return Ok(pos_slot);
        }
        let (footer_bits,base) = slot_footer(pos_slot);
        if pos_slot < END_POS_MODEL_INDEX {
            let reduced = bit_tree::reverse_decode(&mut self.pos,base.wrapping_sub(pos_slot).wrapping_sub(1),rc,footer_bits)?;
            return Ok(base + reduced);
        }
        let high = rc.decode_direct_bits(footer_bits - NUM_ALIGN_BITS)? << NUM_ALIGN_BITS;
        let low = self.align.reverse_decode(rc)?;
        Ok(base.wrapping_add(high).wrapping_add(low))
    }
}

/// Main compression function.
/// `expanded_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `compressed_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.
pub fn compress<R,W>(expanded_in: &mut R, compressed_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    if opt.match_max_len < MIN_FAST_BYTES || opt.match_max_len > MATCH_MAX_LEN || opt.dictionary_size < MIN_DICTIONARY_SIZE {
        return Err(Box::new(crate::Error::InvalidParam));
    }
    let mut reader = BufReader::new(expanded_in);
    let mut writer = BufWriter::new(compressed_out);
    let expanded_length = reader.seek(SeekFrom::End(0))?;
    if expanded_length > opt.max_file_size {
        return Err(Box::new(crate::Error::FileTooLarge));
    }
    reader.seek(SeekFrom::Start(0))?;
    // no need for a dictionary larger than the file
    let dictionary_size = match expanded_length < opt.dictionary_size as u64 {
        true => u32::max(expanded_length as u32,MIN_DICTIONARY_SIZE),
        false => opt.dictionary_size
    };
    writer.write_all(&MAGIC)?;
    writer.write_all(&u32::to_le_bytes(dictionary_size))?;
    writer.write_all(&u64::to_le_bytes(expanded_length))?;

    log::debug!("create match finder");
    let mut mf = BinTree::new(opt.match_finder);
    mf.create(dictionary_size,0,opt.match_max_len,0)?;
    if let Some(cut_value) = opt.cut_value {
        mf.set_cut_value(cut_value);
    }
    mf.set_stream(CrcReader::new(reader));
    mf.init()?;
    let mut rc = range_coder::Encoder::new(writer);
    let mut models = EncoderModels::new();
    let mut distances: Vec<u32> = Vec::new();
    let mut now_pos: u64 = 0;
    let mut state: usize = 0;
    let mut prev_byte: u8 = 0;
    let mut match_count: u64 = 0;

    log::debug!("entering loop over positions");
    while now_pos < expanded_length {
        if mf.get_num_available_bytes() == 0 {
            log::error!("input ended at {} of {} bytes",now_pos,expanded_length);
            return Err(Box::new(std::io::Error::from(ErrorKind::UnexpectedEof)));
        }
        let num_distances = mf.get_matches(&mut distances)? as usize;
        let cur_byte = mf.get_index_byte(-1);
        // longest match is at the end
        let mut best = match num_distances {
            0 => None,
            n => Some((distances[n-2],distances[n-1]))
        };
        if let Some((len,dist)) = best {
            if len <= 3 {
                let bytes: Vec<u8> = (0..len as i32).map(|i| mf.get_index_byte(i-1)).collect();
                if models.match_price(state,len,dist) >= models.literals_price(state,prev_byte,&bytes) {
                    best = None;
                }
            }
        }
        match best {
            Some((len,dist)) => {
                log::trace!("match {} at distance {}",len,dist+1);
                models.encode_match(&mut rc,state,len,dist)?;
                mf.skip(len - 1)?;
                prev_byte = mf.get_index_byte(-1);
                now_pos += len as u64;
                state = 1;
                match_count += 1;
            },
            None => {
                models.encode_literal(&mut rc,state,prev_byte,cur_byte)?;
                prev_byte = cur_byte;
                now_pos += 1;
                state = 0;
            }
        }
    }
    log::debug!("{} matches, closing stream",match_count);
    rc.flush_data()?;
    let crc_reader = mf.release_stream().ok_or(crate::Error::NoStream)?;
    let mut writer = rc.release_stream();
    writer.write_all(&u32::to_le_bytes(crc_reader.digest()))?;
    writer.flush()?;
    Ok((expanded_length,writer.stream_position()?))
}

/// Main decompression function.
/// `compressed_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `expanded_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.
pub fn expand<R,W>(compressed_in: &mut R, expanded_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    let mut reader = BufReader::new(compressed_in);
    let writer = BufWriter::new(expanded_out);
    let mut header: [u8;HEADER_SIZE] = [0;HEADER_SIZE];
    match reader.read_exact(&mut header) {
        Ok(()) => {},
        Err(e) if e.kind()==ErrorKind::UnexpectedEof => return Err(Box::new(crate::Error::FileFormatMismatch)),
        Err(e) => return Err(Box::new(e))
    }
    if header[0..4] != MAGIC {
        log::error!("bad magic {}",hex::encode(&header[0..4]));
        return Err(Box::new(crate::Error::FileFormatMismatch));
    }
    let dictionary_size = u32::from_le_bytes([header[4],header[5],header[6],header[7]]);
    let mut len_bytes = [0;8];
    len_bytes.copy_from_slice(&header[8..16]);
    let expanded_length = u64::from_le_bytes(len_bytes);
    log::debug!("dictionary {}, expanded length {}",dictionary_size,expanded_length);
    if dictionary_size > MAX_VAL_FOR_NORMALIZE - 256 {
        return Err(Box::new(crate::Error::DictionaryTooLarge(dictionary_size)));
    }
    if expanded_length > opt.max_file_size {
        return Err(Box::new(crate::Error::FileTooLarge));
    }
    let window_size = u64::max(1,u64::min(dictionary_size as u64,expanded_length)) as u32;
    let mut out = OutWindow::new();
    out.create(window_size)?;
    out.init(CrcWriter::new(writer),false)?;
    let mut rc = range_coder::Decoder::new(reader)?;
    let mut models = DecoderModels::new();
    let mut now_pos: u64 = 0;
    let mut state: usize = 0;
    let mut prev_byte: u8 = 0;

    log::debug!("entering loop over positions");
    while now_pos < expanded_length {
        if models.is_match[state].decode(&mut rc)? == 0 {
            prev_byte = models.literals[prev_byte as usize >> 5].decode(&mut rc)? as u8;
            out.put_byte(prev_byte)?;
            now_pos += 1;
            state = 0;
        } else {
            let len = models.len.decode(&mut rc)? + MATCH_MIN_LEN;
            let dist = models.decode_distance(&mut rc)?;
            if dist as u64 >= now_pos || len as u64 > expanded_length - now_pos {
                log::error!("match {} at distance {} is impossible at {}",len,dist as u64 + 1,now_pos);
                return Err(Box::new(crate::Error::CorruptStream));
            }
            log::trace!("match {} at distance {}",len,dist+1);
            out.copy_block(dist,len)?;
            prev_byte = out.get_byte(0)?;
            now_pos += len as u64;
            state = 1;
        }
    }
    log::debug!("end of data, checking CRC");
    let crc_writer = out.release_stream()?.ok_or(crate::Error::NoStream)?;
    let mut reader = rc.release_stream();
    let mut trailer = [0;4];
    reader.read_exact(&mut trailer)?;
    if u32::from_le_bytes(trailer) != crc_writer.digest() {
        log::error!("CRC mismatch, stored {}, computed {:08x}",hex::encode(trailer),crc_writer.digest());
        return Err(Box::new(crate::Error::ChecksumMismatch));
    }
    let mut writer = crc_writer.into_inner();
    writer.flush()?;
    Ok((reader.stream_position()?,writer.stream_position()?))
}

/// Convenience function, calls `compress` with a slice returning a Vec
pub fn compress_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    compress(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}

/// Convenience function, calls `expand` with a slice returning a Vec
pub fn expand_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    expand(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}

// *************** TESTS *****************

#[cfg(test)]
fn text_like(len: usize) -> Vec<u8> {
    let words = ["the ","range ","coder ","window ","match ","tree ","of ","and ","byte ","\n"];
    let mut ans = Vec::new();
    let mut x: u32 = 2024;
    while ans.len() < len {
        x = x.wrapping_mul(1664525).wrapping_add(1013904223);
        ans.extend_from_slice(words[(x >> 20) as usize % words.len()].as_bytes());
        if x & 0xff == 0 {
            ans.push((x >> 8) as u8);
        }
    }
    ans.truncate(len);
    ans
}

#[test]
fn pos_slots() {
    let expected = [(0,0),(1,1),(2,2),(3,3),(4,4),(5,4),(6,5),(7,5),(8,6),(11,6),(12,7),(127,13),(128,14),(0xffffffff,63)];
    for (dist,slot) in expected {
        assert_eq!(get_pos_slot(dist),slot);
        if slot >= START_POS_MODEL_INDEX {
            let (footer_bits,base) = slot_footer(slot);
            assert!(dist >= base);
            assert!(dist - base < 1 << footer_bits);
        }
    }
}

#[test]
fn empty_stream() {
    let compressed = compress_slice(&[],&STD_OPTIONS).expect("compression failed");
    let expected = "4C5A5231 00100000 0000000000000000 0000000000 00000000";
    assert_eq!(compressed,hex::decode(expected.replace(" ","")).unwrap());
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert!(expanded.is_empty());
}

#[test]
fn single_byte() {
    let compressed = compress_slice(&[0x41],&STD_OPTIONS).expect("compression failed");
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(expanded,vec![0x41]);
}

#[test]
fn repeated_pair() {
    let test_data = "ABABABAB".as_bytes();
    for mf in [MatchFinderKind::BT2,MatchFinderKind::BT4] {
        let mut opt = STD_OPTIONS;
        opt.match_finder = mf;
        let compressed = compress_slice(test_data,&opt).expect("compression failed");
        let expanded = expand_slice(&compressed,&opt).expect("expansion failed");
        assert_eq!(test_data.to_vec(),expanded);
    }
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);
}

#[test]
fn invertibility_with_options() {
    let test_data = text_like(100000);
    let mut opt = STD_OPTIONS;
    opt.dictionary_size = MIN_DICTIONARY_SIZE;
    opt.match_finder = MatchFinderKind::BT2;
    opt.match_max_len = MATCH_MAX_LEN;
    opt.cut_value = Some(8);
    let compressed = compress_slice(&test_data,&opt).expect("compression failed");
    let expanded = expand_slice(&compressed,&opt).expect("expansion failed");
    assert_eq!(test_data,expanded);
    let mut opt = STD_OPTIONS;
    opt.match_max_len = MIN_FAST_BYTES;
    let compressed = compress_slice(&test_data,&opt).expect("compression failed");
    let expanded = expand_slice(&compressed,&opt).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn compression_ratio() {
    let test_data = text_like(1 << 18);
    let compressed = compress_slice(&test_data,&STD_OPTIONS).expect("compression failed");
    assert!(compressed.len() < test_data.len() / 3);
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
#[ignore]
fn invertibility_large() {
    // more than 2^24 bytes, slow in debug builds
    let test_data = text_like((1 << 24) + 12345);
    let mut opt = STD_OPTIONS;
    opt.dictionary_size = 1 << 22;
    let compressed = compress_slice(&test_data,&opt).expect("compression failed");
    let expanded = expand_slice(&compressed,&opt).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn bad_options() {
    let mut opt = STD_OPTIONS;
    opt.match_max_len = MATCH_MAX_LEN + 1;
    let err = compress_slice(b"abc",&opt).expect_err("options should be rejected");
    assert!(matches!(err.downcast_ref::<crate::Error>(),Some(crate::Error::InvalidParam)));
    let mut opt = STD_OPTIONS;
    opt.max_file_size = 2;
    let err = compress_slice(b"abc",&opt).expect_err("file should be too large");
    assert!(matches!(err.downcast_ref::<crate::Error>(),Some(crate::Error::FileTooLarge)));
}

#[test]
fn bad_magic() {
    let mut compressed = compress_slice(b"abcabcabc",&STD_OPTIONS).expect("compression failed");
    compressed[3] = b'2';
    let err = expand_slice(&compressed,&STD_OPTIONS).expect_err("magic should be rejected");
    assert!(matches!(err.downcast_ref::<crate::Error>(),Some(crate::Error::FileFormatMismatch)));
    let err = expand_slice(&compressed[0..10],&STD_OPTIONS).expect_err("header should be rejected");
    assert!(matches!(err.downcast_ref::<crate::Error>(),Some(crate::Error::FileFormatMismatch)));
}

#[test]
fn bad_checksum() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let mut compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    let n = compressed.len();
    compressed[n-1] ^= 0x80;
    let err = expand_slice(&compressed,&STD_OPTIONS).expect_err("checksum should be rejected");
    assert!(matches!(err.downcast_ref::<crate::Error>(),Some(crate::Error::ChecksumMismatch)));
}

#[test]
fn oversized_header() {
    // claims a 2 GiB window and 4 GiB of data, but the body is just the seed
    let mut compressed = Vec::new();
    compressed.extend_from_slice(&MAGIC);
    compressed.extend_from_slice(&u32::to_le_bytes(MAX_VAL_FOR_NORMALIZE - 256));
    compressed.extend_from_slice(&u64::to_le_bytes(u32::MAX as u64));
    compressed.extend_from_slice(&[0;5]);
    let err = expand_slice(&compressed,&STD_OPTIONS).expect_err("truncated body should be rejected");
    assert!(err.downcast_ref::<std::io::Error>().is_some() || err.downcast_ref::<crate::Error>().is_some());
    compressed[4..8].copy_from_slice(&u32::to_le_bytes(MAX_VAL_FOR_NORMALIZE));
    let err = expand_slice(&compressed,&STD_OPTIONS).expect_err("dictionary should be rejected");
    assert!(matches!(err.downcast_ref::<crate::Error>(),Some(crate::Error::DictionaryTooLarge(_))));
}

#[test]
fn damaged_body() {
    let test_data = text_like(5000);
    let compressed = compress_slice(&test_data,&STD_OPTIONS).expect("compression failed");
    for i in [HEADER_SIZE+3,HEADER_SIZE+40,compressed.len()/2] {
        let mut damaged = compressed.clone();
        damaged[i] ^= 0x55;
        assert!(expand_slice(&damaged,&STD_OPTIONS).is_err());
    }
}
