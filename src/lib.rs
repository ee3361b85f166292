//! # LZ and range coding primitives
//!
//! The mechanical parts an LZMA-class codec is built from:
//!
//! * `tools::in_window` - sliding input window with lookahead
//! * `tools::bin_tree` - binary-tree match finder built on the input window
//! * `tools::out_window` - circular output window for the decoder
//! * `tools::range_coder` - range encoder and decoder
//! * `tools::bit_model` - adaptive bit probabilities and their prices
//! * `tools::bit_tree` - bit-tree coding of fixed-width symbols
//! * `tools::crc` - CRC-32, also used to scramble match finder hashes
//!
//! The `lzr` module wires these together into a small greedy codec, which also
//! backs the command line program.

pub mod tools;
pub mod lzr;

type DYNERR = Box<dyn std::error::Error>;

/// Codec Errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("file format mismatch")]
    FileFormatMismatch,
    #[error("file too large")]
    FileTooLarge,
    #[error("dictionary size {0} is too large")]
    DictionaryTooLarge(u32),
    #[error("unsupported number of hash bytes: {0}")]
    UnsupportedHashBytes(u32),
    #[error("invalid parameter")]
    InvalidParam,
    #[error("corrupt stream")]
    CorruptStream,
    #[error("no stream is attached")]
    NoStream,
    #[error("checksum mismatch")]
    ChecksumMismatch,
    #[error(transparent)]
    Io(#[from] std::io::Error)
}

/// Kind of binary-tree match finder, the discriminant is the number of hash bytes.
#[derive(num_derive::FromPrimitive,Clone,Copy,PartialEq,Eq,Debug)]
pub enum MatchFinderKind {
    /// hash the first 2 bytes directly, faster but finds fewer matches
    BT2 = 2,
    /// hash 2, 3, and 4 byte prefixes
    BT4 = 4
}

impl MatchFinderKind {
    /// Kind from a count of hash bytes, 3 is accepted as an alias of 4.
    pub fn from_hash_bytes(num_hash_bytes: u32) -> Result<Self,Error> {
        use num_traits::FromPrimitive;
        let n = match num_hash_bytes {
            3 => 4,
            n => n
        };
        Self::from_u32(n).ok_or(Error::UnsupportedHashBytes(num_hash_bytes))
    }
}

#[test]
fn match_finder_kinds() {
    assert_eq!(MatchFinderKind::from_hash_bytes(2).unwrap(),MatchFinderKind::BT2);
    assert_eq!(MatchFinderKind::from_hash_bytes(3).unwrap(),MatchFinderKind::BT4);
    assert_eq!(MatchFinderKind::from_hash_bytes(4).unwrap(),MatchFinderKind::BT4);
    assert!(matches!(MatchFinderKind::from_hash_bytes(5),Err(Error::UnsupportedHashBytes(5))));
    assert!(matches!(MatchFinderKind::from_hash_bytes(0),Err(Error::UnsupportedHashBytes(0))));
}
