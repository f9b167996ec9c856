//! A move generation and legality library for 5D Chess with Multiverse Time Travel.
//!
//! This crate is the legality oracle for a full 5D-chess turn. It contains the
//! board representation and associated move generation ([`Board`], [`Multiverse`]),
//! the game state with its transition operations ([`State`]), and the action
//! enumerator that yields every legal ordered move-tuple ending a turn
//! ([`ActionSearch`]).
//!
//! # Usage
//!
//! A [`State`] can be created from one of the named starting positions:
//!
//! ```ignore
//! use fived::State;
//! let state = State::from_variant("Standard").unwrap();
//! ```
//!
//! Moves are applied one at a time; a turn ends with a submit:
//!
//! ```ignore
//! let (mv, _promo, _candidates) = state.parse_move("e3");
//! state.apply_move(mv.unwrap());
//! state.submit();
//! ```
//!
//! Enumerating the legal actions of the side to move is lazy; callers commonly
//! take only the first result:
//!
//! ```ignore
//! if let Some(action) = state.legal_actions().next() {
//!     for mv in action {
//!         state.apply_move(mv);
//!     }
//!     state.submit();
//! }
//! ```
//!
//! Custom positions can be loaded from a 5D-FEN board block list:
//!
//! ```ignore
//! let state = State::from_5dfen("[1u1uk*/5/5/5/K*U1U1:0:1:w]", 5, 5).unwrap();
//! ```
//!
//! # Safety
//!
//! The pseudo-legality entry points (`apply_move`, `submit`, `parse_move`)
//! never panic on bad input; they return `false`, `None` or an empty candidate
//! list. Querying a board coordinate outside the stored ranges is a
//! programming fault and panics.
//!
//! [`Board`]: board/struct.Board.html
//! [`Multiverse`]: multiverse/struct.Multiverse.html
//! [`State`]: state/struct.State.html
//! [`ActionSearch`]: action/struct.ActionSearch.html

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;
extern crate failure;
#[macro_use]
extern crate failure_derive;
extern crate rand;

pub mod core;
pub mod tools;
pub mod helper;
pub mod board;
pub mod multiverse;
pub mod state;
pub mod action;

#[doc(no_inline)]
pub use crate::action::ActionSearch;
#[doc(no_inline)]
pub use crate::board::Board;
#[doc(no_inline)]
pub use crate::core::bitboard::BitBoard;
#[doc(no_inline)]
pub use crate::core::piece_move::{Action, ExtMove, FullMove};
#[doc(no_inline)]
pub use crate::core::sq::SQ;
#[doc(no_inline)]
pub use crate::core::vec4::Vec4;
#[doc(no_inline)]
pub use crate::core::{Piece, PieceType, Player};
#[doc(no_inline)]
pub use crate::multiverse::Multiverse;
#[doc(no_inline)]
pub use crate::state::State;
