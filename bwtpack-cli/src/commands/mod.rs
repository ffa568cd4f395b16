//! Command implementations for the bwtpack CLI.

pub mod compress;
pub mod decompress;
pub mod info;

pub use compress::cmd_compress;
pub use decompress::cmd_decompress;
pub use info::cmd_info;
pub use test::cmd_test;
