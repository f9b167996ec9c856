//! Miscellaneous tools for used for interacting with the library.

pub mod prng;
