//! Board descriptors for the SoC planner.
//!
//! A board supplies everything the composition core treats as opaque input:
//! - **Reference clock:** the oscillator frequency and default system clock
//! - **Capabilities:** integrated memory, wired Ethernet PHY
//! - **Primitive constants:** clock topology, address space, resource limits
//!
//! Custom boards are stored as `.board.toml` files under `boards/`.

pub mod board;
pub mod error;
pub mod parse;

pub use board::{builtin_board, builtin_boards, BoardCapabilities, BoardDescriptor};
pub use error::{BoardError, Result};
