//! External build tool invocation.
//!
//! Every platform is built by a single blocking `<tool> build <mode> <args>`
//! subprocess run in the project root. Extra arguments are given as one shell
//! string and split with POSIX rules before anything is spawned.

pub mod command;
pub mod error;
pub mod toolchain;

pub use command::{split_args, BuildCommand, BuildOutput};
pub use error::{InvokeError, Result};
pub use toolchain::{FlutterToolchain, Toolchain};
