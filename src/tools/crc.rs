//! CRC-32 (IEEE, reflected polynomial 0xEDB88320)
//!
//! The table is kept here because it doubles as the byte scrambler for the match finder
//! hashes.  Digests are computed with `crc32fast`, the stream adapters compute the digest
//! of whatever flows through them.

use std::io::{Read,Write};

const POLY: u32 = 0xEDB88320;

const fn make_table() -> [u32;256] {
    let mut table = [0;256];
    let mut i = 0;
    while i < 256 {
        let mut r = i as u32;
        let mut j = 0;
        while j < 8 {
            r = match r & 1 {
                0 => r >> 1,
                _ => (r >> 1) ^ POLY
            };
            j += 1;
        }
        table[i] = r;
        i += 1;
    }
    table
}

pub static TABLE: [u32;256] = make_table();

/// Incremental CRC-32
#[derive(Clone)]
pub struct Crc {
    hasher: crc32fast::Hasher
}

impl Crc {
    pub fn new() -> Self {
        Self {
            hasher: crc32fast::Hasher::new()
        }
    }
    pub fn init(&mut self) {
        self.hasher.reset();
    }
    pub fn update_byte(&mut self,b: u8) {
        self.hasher.update(&[b]);
    }
    pub fn update(&mut self,data: &[u8]) {
        self.hasher.update(data);
    }
    /// digest of everything so far, updating can continue afterwards
    pub fn digest(&self) -> u32 {
        self.hasher.clone().finalize()
    }
}

impl Default for Crc {
    fn default() -> Self {
        Self::new()
    }
}

pub fn calculate_digest(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

pub fn verify_digest(digest: u32,data: &[u8]) -> bool {
    calculate_digest(data) == digest
}

/// Reader that accumulates the CRC of every byte read through it
pub struct CrcReader<R: Read> {
    inner: R,
    crc: Crc,
    count: u64
}

impl <R: Read> CrcReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            crc: Crc::new(),
            count: 0
        }
    }
    pub fn digest(&self) -> u32 {
        self.crc.digest()
    }
    /// number of bytes that have passed through
    pub fn count(&self) -> u64 {
        self.count
    }
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl <R: Read> Read for CrcReader<R> {
    fn read(&mut self,buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.crc.update(&buf[0..n]);
        self.count += n as u64;
        Ok(n)
    }
}

/// Writer that accumulates the CRC of every byte written through it
pub struct CrcWriter<W: Write> {
    inner: W,
    crc: Crc,
    count: u64
}

impl <W: Write> CrcWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            crc: Crc::new(),
            count: 0
        }
    }
    pub fn digest(&self) -> u32 {
        self.crc.digest()
    }
    /// number of bytes that have passed through
    pub fn count(&self) -> u64 {
        self.count
    }
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl <W: Write> Write for CrcWriter<W> {
    fn write(&mut self,buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.crc.update(&buf[0..n]);
        self.count += n as u64;
        Ok(n)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[test]
fn check_value() {
    // standard CRC-32 check value
    assert_eq!(calculate_digest(b"123456789"),0xCBF43926);
    assert_eq!(calculate_digest(b""),0);
    assert!(verify_digest(0xCBF43926,b"123456789"));
    assert_eq!(TABLE[1],0x77073096);
    assert_eq!(TABLE[255],0x2D02EF8D);
}

#[test]
fn incremental_digest() {
    let mut crc = Crc::new();
    for b in b"12345" {
        crc.update_byte(*b);
    }
    // taking a digest does not end the computation
    assert_eq!(crc.digest(),calculate_digest(b"12345"));
    crc.update(b"6789");
    assert_eq!(crc.digest(),0xCBF43926);
    crc.init();
    assert_eq!(crc.digest(),0);
    // table driven update agrees with the digest
    let mut value: u32 = 0xFFFFFFFF;
    for b in b"123456789" {
        value = TABLE[(value as u8 ^ *b) as usize] ^ (value >> 8);
    }
    assert_eq!(value ^ 0xFFFFFFFF,0xCBF43926);
}

#[test]
fn adapters() {
    let data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let mut reader = CrcReader::new(data);
    let mut copy = Vec::new();
    reader.read_to_end(&mut copy).expect("read failed");
    assert_eq!(reader.count(),data.len() as u64);
    assert_eq!(reader.digest(),calculate_digest(data));
    let mut writer = CrcWriter::new(Vec::new());
    writer.write_all(&copy).expect("write failed");
    assert_eq!(writer.digest(),reader.digest());
    assert_eq!(writer.into_inner(),data.to_vec());
}
