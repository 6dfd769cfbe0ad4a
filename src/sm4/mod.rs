//! Core SM4 reader module

pub mod codec;
pub mod format;
pub mod image;
pub mod reader;
pub mod tree;
pub mod types;
mod utils;

pub use reader::{PageView, Sm4File};
pub use types::error::{Result, Sm4Error};
