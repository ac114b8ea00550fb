//! Miscellaneous common structs used throughout the library.

mod contact;
mod id;

pub use contact::*;
pub use id::*;
