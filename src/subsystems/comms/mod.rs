//! Comms: the user-facing side of the memory chat.
//!
//! - **pty**: line-oriented console over any async reader/writer.

pub mod pty;
