//! Library side of the `dupcheck` binary: the analyze operation and
//! manifest collection shared by every subcommand.

pub mod analyze;
pub mod inputs;
