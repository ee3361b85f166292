//! Building blocks shared by the encoder and decoder sides.

pub mod crc;
pub mod in_window;
pub mod bin_tree;
pub mod out_window;
pub mod range_coder;
pub mod bit_model;
pub mod bit_tree;
