//! Buffer abstractions for host server message encoding/decoding
//!
//! This module provides the big-endian buffer types the request encoder
//! and reply decoder are built on.

mod read;
mod write;

pub use read::ReadBuffer;
pub use write::WriteBuffer;
