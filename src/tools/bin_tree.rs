//! Binary-tree match finder
//!
//! Every position in the dictionary is a node in a binary search tree keyed on the bytes
//! that follow it.  The trees are stored in a cyclic array of child links (`son`), and
//! a hash of the leading bytes selects the root.  Inserting the current position walks
//! from the root down, re-hanging the nodes so the new position becomes the root, and
//! reports each strictly longer match seen along the way.
//!
//! With `MatchFinderKind::BT4` there are additional direct tables for 2 and 3 byte prefixes,
//! so that short matches are found even if the main tree walk does not visit them.
//!
//! Positions are u32 counting from 1, the value 0 means an empty link.  As the position
//! approaches 2^31 all links are rebased so that the position becomes the cyclic buffer size.

use std::io::Read;
use super::in_window::InWindow;
use super::crc;
use crate::{Error,MatchFinderKind};

const HASH2_SIZE: u32 = 1 << 10;
const HASH3_SIZE: u32 = 1 << 16;
const BT2_HASH_SIZE: u32 = 1 << 16;
const START_MAX_LEN: u32 = 1;
const HASH3_OFFSET: u32 = HASH2_SIZE;
const EMPTY_HASH_VALUE: u32 = 0;
/// largest position before links are rebased
pub const MAX_VAL_FOR_NORMALIZE: u32 = (1 << 31) - 1;

pub struct BinTree<R: Read> {
    window: InWindow<R>,
    cyclic_buffer_pos: u32,
    cyclic_buffer_size: u32,
    match_max_len: u32,
    son: Vec<u32>,
    hash: Vec<u32>,
    cut_value: u32,
    hash_mask: u32,
    hash_size_sum: u32,
    hash_array: bool,
    num_hash_direct_bytes: u32,
    min_match_check: u32,
    fix_hash_size: u32
}

impl <R: Read> BinTree<R> {
    pub fn new(kind: MatchFinderKind) -> Self {
        let mut ans = Self {
            window: InWindow::new(),
            cyclic_buffer_pos: 0,
            cyclic_buffer_size: 0,
            match_max_len: 0,
            son: Vec::new(),
            hash: Vec::new(),
            cut_value: 0xff,
            hash_mask: 0,
            hash_size_sum: 0,
            hash_array: true,
            num_hash_direct_bytes: 0,
            min_match_check: 4,
            fix_hash_size: HASH2_SIZE + HASH3_SIZE
        };
        ans.set_type(kind);
        ans
    }
    /// Select the hashing scheme, must be called before `create`.
    pub fn set_type(&mut self,kind: MatchFinderKind) {
        self.hash_array = kind == MatchFinderKind::BT4;
        if self.hash_array {
            self.num_hash_direct_bytes = 0;
            self.min_match_check = 4;
            self.fix_hash_size = HASH2_SIZE + HASH3_SIZE;
        } else {
            self.num_hash_direct_bytes = 2;
            self.min_match_check = 3;
            self.fix_hash_size = 0;
        }
    }
    /// Select the hashing scheme from the number of hash bytes, 2 or 4 (3 means 4).
    pub fn set_num_hash_bytes(&mut self,num_hash_bytes: u32) -> Result<(),Error> {
        self.set_type(MatchFinderKind::from_hash_bytes(num_hash_bytes)?);
        Ok(())
    }
    pub fn kind(&self) -> MatchFinderKind {
        match self.hash_array {
            true => MatchFinderKind::BT4,
            false => MatchFinderKind::BT2
        }
    }
    /// Size the window, the cyclic buffer, and the hash tables.
    /// `history_size` is the largest distance that can be reported plus one.
    pub fn create(&mut self,history_size: u32,keep_add_buffer_before: u32,match_max_len: u32,keep_add_buffer_after: u32) -> Result<(),Error> {
        if history_size > MAX_VAL_FOR_NORMALIZE - 256 {
            return Err(Error::DictionaryTooLarge(history_size));
        }
        if history_size == 0 || match_max_len == 0 {
            return Err(Error::InvalidParam);
        }
        self.cut_value = 16 + (match_max_len >> 1);
        let window_reserve_size = (history_size + keep_add_buffer_before + match_max_len + keep_add_buffer_after) / 2 + 256;
        self.window.create(history_size + keep_add_buffer_before,match_max_len + keep_add_buffer_after,window_reserve_size);
        self.match_max_len = match_max_len;
        let cyclic_buffer_size = history_size + 1;
        if self.cyclic_buffer_size != cyclic_buffer_size {
            self.cyclic_buffer_size = cyclic_buffer_size;
            self.son = vec![0;cyclic_buffer_size as usize * 2];
        }
        let mut hs = BT2_HASH_SIZE;
        if self.hash_array {
            hs = history_size.saturating_sub(1);
            hs |= hs >> 1;
            hs |= hs >> 2;
            hs |= hs >> 4;
            hs |= hs >> 8;
            hs >>= 1;
            hs |= 0xffff;
            if hs > 1 << 24 {
                hs >>= 1;
            }
            self.hash_mask = hs;
            hs += 1;
            hs += self.fix_hash_size;
        }
        if hs != self.hash_size_sum {
            self.hash_size_sum = hs;
            self.hash = vec![0;hs as usize];
        }
        log::debug!("match finder {:?}: history {}, hash entries {}, cut value {}",self.kind(),history_size,self.hash_size_sum,self.cut_value);
        Ok(())
    }
    pub fn set_stream(&mut self,stream: R) {
        self.window.set_stream(stream);
    }
    pub fn release_stream(&mut self) -> Option<R> {
        self.window.release_stream()
    }
    /// Clear the hash tables and read the first block, the first position is 1.
    pub fn init(&mut self) -> Result<(),Error> {
        self.window.init()?;
        self.hash.fill(EMPTY_HASH_VALUE);
        self.cyclic_buffer_pos = 0;
        self.window.reduce_offsets(-1);
        Ok(())
    }
    pub fn set_cut_value(&mut self,cut_value: u32) {
        self.cut_value = cut_value;
    }
    pub fn get_index_byte(&self,index: i32) -> u8 {
        self.window.get_index_byte(index)
    }
    pub fn get_match_len(&self,index: i32,distance: u32,limit: u32) -> u32 {
        self.window.get_match_len(index,distance,limit)
    }
    pub fn get_num_available_bytes(&self) -> u32 {
        self.window.get_num_available_bytes()
    }
    fn move_pos(&mut self) -> Result<(),Error> {
        if self.window.at_end() {
            return Ok(());
        }
        self.cyclic_buffer_pos += 1;
        if self.cyclic_buffer_pos >= self.cyclic_buffer_size {
            self.cyclic_buffer_pos = 0;
        }
        self.window.move_pos()?;
        if self.window.pos() == MAX_VAL_FOR_NORMALIZE {
            self.normalize();
        }
        Ok(())
    }
    /// match length limit at the current position, or None if too close to the end
    fn len_limit(&self) -> Option<u32> {
        let pos = self.window.pos();
        let stream_pos = self.window.stream_pos();
        if pos + self.match_max_len <= stream_pos {
            return Some(self.match_max_len);
        }
        match stream_pos - pos {
            x if x < self.min_match_check => None,
            x => Some(x)
        }
    }
    /// Main hash value at buffer index `cur`, also returns the 2 and 3 byte hashes (zero for BT2).
    fn hash_values(&self,cur: usize) -> (u32,u32,u32) {
        let buf = self.window.buffer();
        if self.hash_array {
            let mut temp = crc::TABLE[buf[cur] as usize] ^ buf[cur+1] as u32;
            let hash2_value = temp & (HASH2_SIZE - 1);
            temp ^= (buf[cur+2] as u32) << 8;
            let hash3_value = temp & (HASH3_SIZE - 1);
            let hash_value = (temp ^ (crc::TABLE[buf[cur+3] as usize] << 5)) & self.hash_mask;
            (hash_value,hash2_value,hash3_value)
        } else {
            (buf[cur] as u32 ^ ((buf[cur+1] as u32) << 8),0,0)
        }
    }
    /// Insert the current position into the tree rooted at `cur_match`.
    /// If `distances` is given, each match longer than `max_len` is appended as a (length,distance) pair.
    fn insert(&mut self,mut cur_match: u32,len_limit: u32,mut max_len: u32,mut distances: Option<&mut Vec<u32>>) {
        let pos = self.window.pos();
        let offset = self.window.buffer_offset();
        let buf = self.window.buffer();
        let son = &mut self.son;
        let cur = offset.wrapping_add(pos) as usize;
        let match_min_pos = match pos > self.cyclic_buffer_size {
            true => pos - self.cyclic_buffer_size,
            false => 0
        };
        let mut ptr0 = ((self.cyclic_buffer_pos << 1) + 1) as usize;
        let mut ptr1 = (self.cyclic_buffer_pos << 1) as usize;
        let mut len0 = self.num_hash_direct_bytes;
        let mut len1 = self.num_hash_direct_bytes;
        let mut count = self.cut_value;
        loop {
            if cur_match <= match_min_pos || count == 0 {
                son[ptr0] = EMPTY_HASH_VALUE;
                son[ptr1] = EMPTY_HASH_VALUE;
                break;
            }
            count -= 1;
            let delta = pos - cur_match;
            let cyclic_pos: usize = match delta <= self.cyclic_buffer_pos {
                true => ((self.cyclic_buffer_pos - delta) << 1) as usize,
                false => ((self.cyclic_buffer_pos + self.cyclic_buffer_size - delta) << 1) as usize
            };
            let pby1 = offset.wrapping_add(cur_match) as usize;
            let mut len = u32::min(len0,len1);
            if buf[pby1 + len as usize] == buf[cur + len as usize] {
                len += 1;
                while len != len_limit && buf[pby1 + len as usize] == buf[cur + len as usize] {
                    len += 1;
                }
                let longer = max_len < len;
                if longer {
                    max_len = len;
                    if let Some(d) = distances.as_deref_mut() {
                        d.push(len);
                        d.push(delta - 1);
                    }
                }
                if len == len_limit && (longer || distances.is_none()) {
                    // the new node takes over both subtrees of the old one
                    son[ptr1] = son[cyclic_pos];
                    son[ptr0] = son[cyclic_pos + 1];
                    break;
                }
            }
            if buf[pby1 + len as usize] < buf[cur + len as usize] {
                son[ptr1] = cur_match;
                ptr1 = cyclic_pos + 1;
                cur_match = son[ptr1];
                len1 = len;
            } else {
                son[ptr0] = cur_match;
                ptr0 = cyclic_pos;
                cur_match = son[ptr0];
                len0 = len;
            }
        }
    }
    /// Find the matches at the current position and advance by one.
    /// On return `distances` holds (length,distance) pairs with strictly increasing lengths,
    /// where a distance of 0 means the previous byte.  The return value is the number of
    /// entries, i.e., twice the number of pairs.
    pub fn get_matches(&mut self,distances: &mut Vec<u32>) -> Result<u32,Error> {
        distances.clear();
        let len_limit = match self.len_limit() {
            Some(l) => l,
            None => {
                self.move_pos()?;
                return Ok(0);
            }
        };
        let pos = self.window.pos();
        let cur = self.window.buffer_offset().wrapping_add(pos) as usize;
        let match_min_pos = match pos > self.cyclic_buffer_size {
            true => pos - self.cyclic_buffer_size,
            false => 0
        };
        let mut max_len = START_MAX_LEN;
        let (hash_value,hash2_value,hash3_value) = self.hash_values(cur);
        let fix = self.fix_hash_size as usize;
        let cur_match = self.hash[fix + hash_value as usize];
        if self.hash_array {
            let buf = self.window.buffer();
            let offset = self.window.buffer_offset();
            let byte_at = |p: u32| buf[offset.wrapping_add(p) as usize];
            let mut cur_match2 = self.hash[hash2_value as usize];
            let cur_match3 = self.hash[(HASH3_OFFSET + hash3_value) as usize];
            self.hash[hash2_value as usize] = pos;
            self.hash[(HASH3_OFFSET + hash3_value) as usize] = pos;
            if cur_match2 > match_min_pos && byte_at(cur_match2) == buf[cur] {
                max_len = 2;
                distances.push(2);
                distances.push(pos - cur_match2 - 1);
            }
            if cur_match3 > match_min_pos && byte_at(cur_match3) == buf[cur] {
                if cur_match3 == cur_match2 {
                    distances.truncate(distances.len() - 2);
                }
                max_len = 3;
                distances.push(3);
                distances.push(pos - cur_match3 - 1);
                cur_match2 = cur_match3;
            }
            if !distances.is_empty() && cur_match2 == cur_match {
                // the tree walk will report this one
                distances.truncate(distances.len() - 2);
                max_len = START_MAX_LEN;
            }
        }
        self.hash[fix + hash_value as usize] = pos;
        if self.num_hash_direct_bytes != 0 && cur_match > match_min_pos {
            let buf = self.window.buffer();
            let n = self.num_hash_direct_bytes as usize;
            let pby1 = self.window.buffer_offset().wrapping_add(cur_match) as usize;
            if buf[pby1 + n] != buf[cur + n] {
                max_len = self.num_hash_direct_bytes;
                distances.push(max_len);
                distances.push(pos - cur_match - 1);
            }
        }
        self.insert(cur_match,len_limit,max_len,Some(&mut *distances));
        self.move_pos()?;
        Ok(distances.len() as u32)
    }
    /// Advance `num` positions, keeping the trees up to date without reporting matches.
    pub fn skip(&mut self,num: u32) -> Result<(),Error> {
        for _i in 0..num {
            let len_limit = match self.len_limit() {
                Some(l) => l,
                None => {
                    self.move_pos()?;
                    continue;
                }
            };
            let pos = self.window.pos();
            let cur = self.window.buffer_offset().wrapping_add(pos) as usize;
            let (hash_value,hash2_value,hash3_value) = self.hash_values(cur);
            if self.hash_array {
                self.hash[hash2_value as usize] = pos;
                self.hash[(HASH3_OFFSET + hash3_value) as usize] = pos;
            }
            let fix = self.fix_hash_size as usize;
            let cur_match = self.hash[fix + hash_value as usize];
            self.hash[fix + hash_value as usize] = pos;
            self.insert(cur_match,len_limit,START_MAX_LEN,None);
            self.move_pos()?;
        }
        Ok(())
    }
    /// Rebase every link so the current position becomes the cyclic buffer size.
    /// Links that fall outside the dictionary become empty.
    pub(crate) fn normalize(&mut self) {
        let sub_value = self.window.pos() - self.cyclic_buffer_size;
        log::debug!("normalize match finder links by {}",sub_value);
        let normalize_links = |items: &mut [u32]| {
            for item in items.iter_mut() {
                *item = match *item <= sub_value {
                    true => EMPTY_HASH_VALUE,
                    false => *item - sub_value
                };
            }
        };
        normalize_links(&mut self.son);
        normalize_links(&mut self.hash);
        self.window.reduce_offsets(sub_value as i32);
    }
}

#[cfg(test)]
impl <R: Read> BinTree<R> {
    /// Count positions from `origin` rather than 1, only valid right after `init`.
    fn set_origin(&mut self,origin: u32) {
        self.window.reduce_offsets(1i32.wrapping_sub(origin as i32));
    }
}

#[cfg(test)]
fn lcg_text(len: usize,seed: u32) -> Vec<u8> {
    // small alphabet with copied runs so there is plenty to find
    let mut ans = Vec::new();
    let mut x = seed;
    while ans.len() < len {
        x = x.wrapping_mul(1664525).wrapping_add(1013904223);
        if (x >> 28) < 5 && ans.len() > 40 {
            let back = 1 + (x >> 8) as usize % 40;
            let run = 2 + (x >> 16) as usize % 12;
            for _i in 0..run {
                ans.push(ans[ans.len()-back]);
            }
        } else {
            ans.push(b'a' + (x >> 24) as u8 % 6);
        }
    }
    ans.truncate(len);
    ans
}

#[cfg(test)]
fn all_matches(data: &[u8],kind: MatchFinderKind,history: u32,max_len: u32,normalize_at: Option<usize>) -> Vec<Vec<u32>> {
    let mut bt = BinTree::new(kind);
    bt.create(history,0,max_len,0).expect("create failed");
    bt.set_stream(data);
    bt.init().expect("init failed");
    let mut ans = Vec::new();
    let mut distances = Vec::new();
    for i in 0..data.len() {
        if Some(i) == normalize_at {
            bt.normalize();
        }
        let n = bt.get_matches(&mut distances).expect("get matches failed");
        assert_eq!(n as usize,distances.len());
        ans.push(distances.clone());
    }
    ans
}

#[test]
fn repeated_pair() {
    for kind in [MatchFinderKind::BT2,MatchFinderKind::BT4] {
        let matches = all_matches("ABABABAB".as_bytes(),kind,64,16,None);
        assert!(matches[0].is_empty());
        assert!(matches[1].is_empty());
        assert_eq!(matches[2],vec![6,1]);
        assert_eq!(matches[3],vec![5,1]);
    }
}

#[test]
fn matches_are_real() {
    let data = lcg_text(5000,7);
    for kind in [MatchFinderKind::BT2,MatchFinderKind::BT4] {
        let matches = all_matches(&data,kind,256,32,None);
        let mut found = 0;
        for (i,m) in matches.iter().enumerate() {
            let mut prev_len = 0;
            for pair in m.chunks(2) {
                let (len,dist) = (pair[0] as usize,pair[1] as usize);
                assert!(len > prev_len);
                assert!(len <= 32);
                assert!(dist < 256);
                assert!(i + len <= data.len());
                assert_eq!(data[i..i+len],data[i-dist-1..i-dist-1+len]);
                prev_len = len;
                found += 1;
            }
        }
        assert!(found > 1000);
    }
}

#[test]
fn skip_keeps_trees() {
    let data = lcg_text(3000,11);
    let expected = all_matches(&data,MatchFinderKind::BT4,512,64,None);
    let mut bt = BinTree::new(MatchFinderKind::BT4);
    bt.create(512,0,64,0).expect("create failed");
    bt.set_stream(data.as_slice());
    bt.init().expect("init failed");
    let mut distances = Vec::new();
    bt.skip(2000).expect("skip failed");
    for i in 2000..data.len() {
        bt.get_matches(&mut distances).expect("get matches failed");
        assert_eq!(distances,expected[i]);
    }
}

#[test]
fn normalize_is_transparent() {
    let data = lcg_text(4000,3);
    let plain = all_matches(&data,MatchFinderKind::BT4,64,16,None);
    let rebased = all_matches(&data,MatchFinderKind::BT4,64,16,Some(1500));
    assert_eq!(plain,rebased);
}

#[test]
fn normalize_at_position_limit() {
    let data = lcg_text(4000,5);
    let plain = all_matches(&data,MatchFinderKind::BT4,64,16,None);
    let mut bt = BinTree::new(MatchFinderKind::BT4);
    bt.create(64,0,16,0).expect("create failed");
    bt.set_stream(data.as_slice());
    bt.init().expect("init failed");
    bt.set_origin(MAX_VAL_FOR_NORMALIZE - 2000);
    let mut distances = Vec::new();
    for i in 0..data.len() {
        bt.get_matches(&mut distances).expect("get matches failed");
        assert_eq!(distances,plain[i]);
    }
    // the limit was crossed half way, after that counting restarts at the cyclic buffer size
    assert_eq!(bt.window.pos(),65 + 2000);
}

#[test]
fn end_of_input() {
    for kind in [MatchFinderKind::BT2,MatchFinderKind::BT4] {
        let mut bt = BinTree::new(kind);
        bt.create(64,0,16,0).expect("create failed");
        bt.set_stream("abcdef".as_bytes());
        bt.init().expect("init failed");
        let mut distances = Vec::new();
        for _i in 0..6 {
            bt.get_matches(&mut distances).expect("get matches failed");
        }
        assert_eq!(bt.get_num_available_bytes(),0);
        // running past the end finds nothing and stays put
        assert_eq!(bt.get_matches(&mut distances).expect("get matches failed"),0);
        bt.skip(3).expect("skip failed");
        assert_eq!(bt.get_num_available_bytes(),0);
        assert_eq!(bt.get_index_byte(-1),b'f');
    }
}

#[test]
fn bad_parameters() {
    let mut bt: BinTree<&[u8]> = BinTree::new(MatchFinderKind::BT4);
    assert!(matches!(bt.create(MAX_VAL_FOR_NORMALIZE,0,273,0),Err(Error::DictionaryTooLarge(_))));
    assert!(matches!(bt.set_num_hash_bytes(5),Err(Error::UnsupportedHashBytes(5))));
    bt.set_num_hash_bytes(2).expect("2 hash bytes should be accepted");
    assert_eq!(bt.kind(),MatchFinderKind::BT2);
}
