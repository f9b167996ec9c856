//! Module for the implementation and definition of moves and actions.
//!
//! A [`FullMove`] is a pair of [`Vec4`] coordinates; unlike in a plain chess
//! library there is no room for a compact bit encoding, as both endpoints
//! carry a timeline and a time component. An [`ExtMove`] adds the promotion
//! piece (defaulted to a queen). An [`Action`] is the ordered sequence of
//! extended moves that together end a turn.
//!
//! [`FullMove`]: struct.FullMove.html
//! [`ExtMove`]: struct.ExtMove.html
//! [`Action`]: struct.Action.html

use super::vec4::Vec4;
use super::{PieceType, Player};
use crate::state::State;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A move of a single piece, possibly across boards.
#[derive(Copy, Clone, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FullMove {
    /// The coordinate the piece departs from.
    pub from: Vec4,
    /// The coordinate the piece arrives at.
    pub to: Vec4,
}

impl FullMove {
    /// Creates a move from its two endpoints.
    #[inline(always)]
    pub fn new(from: Vec4, to: Vec4) -> FullMove {
        FullMove { from, to }
    }

    /// Returns whether source and destination share the same board.
    #[inline(always)]
    pub fn is_physical(self) -> bool {
        self.from.tl() == self.to.tl()
    }
}

impl fmt::Display for FullMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let p = self.from;
        let q = self.to;
        write!(
            f,
            "({}T{}){}{}",
            p.l(),
            p.t(),
            (b'a' + p.x() as u8) as char,
            (b'1' + p.y() as u8) as char
        )?;
        if !self.is_physical() {
            write!(f, "({}T{})", q.l(), q.t())?;
        }
        write!(
            f,
            "{}{}",
            (b'a' + q.x() as u8) as char,
            (b'1' + q.y() as u8) as char
        )
    }
}

impl fmt::Debug for FullMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Error raised when a move string does not match any known pattern.
#[derive(Fail, Debug)]
#[fail(display = "cannot match this move in any known pattern: {}", input)]
pub struct MoveStringError {
    /// The offending input.
    pub input: String,
}

impl FromStr for FullMove {
    type Err = MoveStringError;

    /// Parses the unambiguous long forms `(lTt)a1b2` and
    /// `(lTt)a1>>(l'Tt')b2`, with an optional piece letter after the board
    /// and an optional `>`/`>>` before the destination board.
    fn from_str(s: &str) -> Result<FullMove, MoveStringError> {
        let err = || MoveStringError {
            input: s.to_string(),
        };
        let bytes = s.as_bytes();
        let mut pos = 0_usize;

        let board = |pos: &mut usize| -> Result<(i32, i32), MoveStringError> {
            if bytes.get(*pos) != Some(&b'(') {
                return Err(err());
            }
            *pos += 1;
            let read_int = |pos: &mut usize| -> Result<i32, MoveStringError> {
                let start = *pos;
                if bytes.get(*pos) == Some(&b'-') {
                    *pos += 1;
                }
                while bytes.get(*pos).map_or(false, u8::is_ascii_digit) {
                    *pos += 1;
                }
                s[start..*pos].parse::<i32>().map_err(|_| err())
            };
            let l = read_int(pos)?;
            if bytes.get(*pos) != Some(&b'T') {
                return Err(err());
            }
            *pos += 1;
            let t = read_int(pos)?;
            if bytes.get(*pos) != Some(&b')') {
                return Err(err());
            }
            *pos += 1;
            Ok((l, t))
        };

        let square = |pos: &mut usize| -> Result<(i32, i32), MoveStringError> {
            let f = *bytes.get(*pos).ok_or_else(err)?;
            let r = *bytes.get(*pos + 1).ok_or_else(err)?;
            if !(b'a'..=b'h').contains(&f) || !(b'1'..=b'8').contains(&r) {
                return Err(err());
            }
            *pos += 2;
            Ok(((f - b'a') as i32, (r - b'1') as i32))
        };

        let (l1, t1) = board(&mut pos)?;
        if bytes
            .get(pos)
            .map_or(false, |c| c.is_ascii_uppercase())
        {
            pos += 1;
        }
        let (x1, y1) = square(&mut pos)?;
        while bytes.get(pos) == Some(&b'>') {
            pos += 1;
        }
        let (l2, t2, x2, y2) = if bytes.get(pos) == Some(&b'(') {
            let (l2, t2) = board(&mut pos)?;
            let (x2, y2) = square(&mut pos)?;
            (l2, t2, x2, y2)
        } else {
            let (x2, y2) = square(&mut pos)?;
            (l1, t1, x2, y2)
        };
        if pos != bytes.len() {
            return Err(err());
        }
        Ok(FullMove {
            from: Vec4::new(x1, y1, t1, l1),
            to: Vec4::new(x2, y2, t2, l2),
        })
    }
}

/// A full move extended with the piece a pawn-class piece promotes to.
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct ExtMove {
    /// The underlying move.
    pub fm: FullMove,
    /// The promotion piece; ignored unless the move promotes.
    pub promote_to: PieceType,
}

impl ExtMove {
    /// Wraps a full move with the default queen promotion.
    #[inline(always)]
    pub fn new(fm: FullMove) -> ExtMove {
        ExtMove {
            fm,
            promote_to: PieceType::Queen,
        }
    }

    /// Wraps a full move with an explicit promotion piece.
    #[inline(always)]
    pub fn with_promotion(fm: FullMove, promote_to: PieceType) -> ExtMove {
        ExtMove { fm, promote_to }
    }
}

impl fmt::Display for ExtMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.fm, f)
    }
}

/// An ordered sequence of extended moves constituting one turn.
///
/// The canonical order places the non-branching moves first, sorted by their
/// destination timeline from the mover's side outward, followed by the
/// branching jumps in application order. Replaying the moves of a canonical
/// action through [`State::apply_move`] reconstructs the same position: a
/// jump onto the tail of a line that already moved must come after that
/// line's own move, or it would be misread as a non-branching jump.
///
/// [`State::apply_move`]: ../../state/struct.State.html#method.apply_move
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Action {
    mvs: Vec<ExtMove>,
}

impl Action {
    /// Builds a canonical action from an arbitrary ordering of the moves of
    /// one turn, relative to the state the turn starts in.
    pub fn from_moves(mut mvs: Vec<ExtMove>, s: &State) -> Action {
        Action::sort(&mut mvs, s);
        Action { mvs }
    }

    /// The moves of the action in canonical order.
    #[inline]
    pub fn moves(&self) -> &[ExtMove] {
        &self.mvs
    }

    /// Consumes the action, returning its moves.
    #[inline]
    pub fn into_moves(self) -> Vec<ExtMove> {
        self.mvs
    }

    fn sort(mvs: &mut Vec<ExtMove>, s: &State) {
        let (_present, player) = s.get_present();
        let mut branching_index = 0_usize;
        let mut moved_lines: BTreeSet<i32> = BTreeSet::new();
        for i in 0..mvs.len() {
            let p = mvs[i].fm.from;
            let q = mvs[i].fm.to;
            let tc1 = (q.t(), player);
            let tc2 = s.get_timeline_end(q.l());
            let branching = tc1 < tc2 || (tc1 == tc2 && moved_lines.contains(&q.l()));
            moved_lines.insert(p.l());
            if branching {
                mvs.swap(i, branching_index);
                branching_index += 1;
            } else {
                moved_lines.insert(q.l());
            }
        }
        if branching_index < mvs.len() {
            let sign = if player == Player::Black { -1 } else { 1 };
            mvs[branching_index..].sort_by_key(|m| sign * m.fm.to.l());
            mvs.rotate_left(branching_index);
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for mv in &self.mvs {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}", mv)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_string_roundtrip() {
        let physical: FullMove = "(0T1)e2e3".parse().unwrap();
        assert_eq!(physical.from, Vec4::new(4, 1, 1, 0));
        assert_eq!(physical.to, Vec4::new(4, 2, 1, 0));
        assert!(physical.is_physical());
        assert_eq!(physical.to_string(), "(0T1)e2e3");

        let jump: FullMove = "(0T5)b3(-1T1)f7".parse().unwrap();
        assert_eq!(jump.from, Vec4::new(1, 2, 5, 0));
        assert_eq!(jump.to, Vec4::new(5, 6, 1, -1));
        assert!(!jump.is_physical());
        assert_eq!(jump.to_string(), "(0T5)b3(-1T1)f7");

        let arrows: FullMove = "(0T5)Qb3>>(0T1)f7".parse().unwrap();
        assert_eq!(arrows.to, Vec4::new(5, 6, 1, 0));
        assert!("(0T1)i9i9".parse::<FullMove>().is_err());
        assert!("e2e4".parse::<FullMove>().is_err());
    }
}
