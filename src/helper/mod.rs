//! Statically initialized lookup tables.
//!
//! Contains the attack tables for the leaping pieces, the magic-bitboard
//! tables for the sliding pieces, and the copy-cone masks consumed by the
//! super-physical compound move generator. Everything here is created on
//! first use behind `lazy_static` and is immutable afterwards, so the
//! functions of [`prelude`] are safe to call from any thread.
//!
//! [`prelude`]: prelude/index.html

pub mod boards;
pub mod magic;
pub mod prelude;
