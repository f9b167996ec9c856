//! This module contains [`State`], a multiverse paired with the present.
//!
//! A `State` is a value: [`apply_move`] and [`submit`] mutate in place, the
//! `can_*` variants clone first and return the successor. Cloning deep-copies
//! the multiverse's per-line vectors but shares the individual boards.
//!
//! [`State`]: struct.State.html
//! [`apply_move`]: struct.State.html#method.apply_move
//! [`submit`]: struct.State.html#method.submit

pub mod notation;

use crate::action::search::HcInfo;
use crate::action::ActionSearch;
use crate::board::Board;
use crate::core::piece_move::{Action, FullMove};
use crate::core::sq::SQ;
use crate::core::vec4::Vec4;
use crate::core::{next_turn, Piece, PieceType, Player, Turn};
use crate::multiverse::{BoardInfo, Multiverse, MultiverseBuildError, Variant};

use std::fmt;
use std::sync::Arc;

static STANDARD_FEN: &str = "r*nbqk*bnr*/p*p*p*p*p*p*p*p*/8/8/8/8/P*P*P*P*P*P*P*P*/R*NBQK*BNR*";
static VERY_SMALL_OPEN_FEN: &str = "nbrk/3p*/P*3/KRBN";

/// Represents possible errors encountered while building a `State`.
#[derive(Fail, Debug)]
pub enum StateBuildError {
    #[fail(display = "unknown variant: {}", name)]
    UnknownVariant { name: String },
    #[fail(display = "{}", err)]
    Multiverse { err: MultiverseBuildError },
}

impl From<MultiverseBuildError> for StateBuildError {
    fn from(err: MultiverseBuildError) -> StateBuildError {
        StateBuildError::Multiverse { err }
    }
}

/// The verdict of [`State::get_mate_type`] on a position.
///
/// [`State::get_mate_type`]: struct.State.html#method.get_mate_type
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MateType {
    /// At least one legal action exists that does not concede.
    None,
    /// Legal actions exist, but every one of them travels with the flow of
    /// time; the opponent keeps the initiative.
    Softmate,
    /// No legal action exists and a royal piece is en prise.
    Checkmate,
    /// No legal action exists and no royal piece is attacked.
    Stalemate,
}

/// Undo record of one in-place move application.
#[derive(Copy, Clone, Debug)]
pub(crate) enum MoveLog {
    /// A physical move appended one board.
    Physical { l: i32 },
    /// A non-branching jump appended a board on both lines.
    Jump { from_l: i32, to_l: i32 },
    /// A branching jump appended the source board and created a line.
    Branch {
        from_l: i32,
        new_l: i32,
        old_present: i32,
    },
}

/// A multiverse together with the present `(t, color)` pair identifying
/// whose turn it is globally.
///
/// The present is carried separately from the multiverse's own computed
/// present: applying moves advances boards immediately, but the turn only
/// passes on [`submit`].
///
/// [`submit`]: #method.submit
#[derive(Clone)]
pub struct State {
    pub(crate) m: Multiverse,
    present: i32,
    player: Player,
}

impl State {
    /// Wraps a multiverse, taking the present from it.
    pub fn new(m: Multiverse) -> State {
        let (present, player) = m.get_present();
        State { m, present, player }
    }

    /// Builds the starting state of a named variant: `Standard`,
    /// `Standard - Turn Zero` or `Very Small - Open`.
    pub fn from_variant(name: &str) -> Result<State, StateBuildError> {
        let (variant, (size_x, size_y), boards): (Variant, (u8, u8), Vec<BoardInfo>) = match name {
            "Standard" => (
                Variant::Odd,
                (8, 8),
                vec![(0, 1, Player::White, STANDARD_FEN.to_string())],
            ),
            "Standard - Turn Zero" => (
                Variant::Odd,
                (8, 8),
                vec![
                    (0, 0, Player::Black, STANDARD_FEN.to_string()),
                    (0, 1, Player::White, STANDARD_FEN.to_string()),
                ],
            ),
            "Very Small - Open" => (
                Variant::Odd,
                (4, 4),
                vec![(0, 1, Player::White, VERY_SMALL_OPEN_FEN.to_string())],
            ),
            _ => {
                return Err(StateBuildError::UnknownVariant {
                    name: name.to_string(),
                })
            }
        };
        let m = Multiverse::new(&boards, variant, size_x, size_y)?;
        Ok(State::new(m))
    }

    /// Builds a state from a sequence of 5D-FEN board blocks, auto-detecting
    /// the timeline variant.
    pub fn from_5dfen(input: &str, size_x: u8, size_y: u8) -> Result<State, StateBuildError> {
        let m = Multiverse::from_5dfen(input, size_x, size_y)?;
        Ok(State::new(m))
    }

    /// The global present: whose turn it is and at what time.
    #[inline(always)]
    pub fn get_present(&self) -> Turn {
        (self.present, self.player)
    }

    /// The present the multiverse would compute from its active tails. May
    /// run ahead of [`get_present`] while a turn is being assembled.
    ///
    /// [`get_present`]: #method.get_present
    #[inline]
    pub fn apparent_present(&self) -> Turn {
        self.m.get_present()
    }

    /// The player to move.
    #[inline(always)]
    pub fn player(&self) -> Player {
        self.player
    }

    /// The timeline a branching jump of the player to move would create.
    pub fn new_line(&self) -> i32 {
        let (l_min, l_max) = self.m.get_lines_range();
        if self.player == Player::White {
            l_max + 1
        } else {
            l_min - 1
        }
    }

    /// Returns the board size as `(size_x, size_y)`.
    #[inline]
    pub fn get_board_size(&self) -> (i32, i32) {
        self.m.get_board_size()
    }

    /// The timeline range the game started with.
    #[inline]
    pub fn get_initial_lines_range(&self) -> (i32, i32) {
        self.m.get_initial_lines_range()
    }

    /// The timeline range currently stored.
    #[inline]
    pub fn get_lines_range(&self) -> (i32, i32) {
        self.m.get_lines_range()
    }

    /// The range of timelines whose tails constrain the present.
    #[inline]
    pub fn get_active_range(&self) -> (i32, i32) {
        self.m.get_active_range()
    }

    /// The half-turn of the first board of timeline `l`.
    #[inline]
    pub fn get_timeline_start(&self, l: i32) -> Turn {
        self.m.get_timeline_start(l)
    }

    /// The half-turn of the last board of timeline `l`.
    #[inline]
    pub fn get_timeline_end(&self, l: i32) -> Turn {
        self.m.get_timeline_end(l)
    }

    /// Returns the board at `(l, t, c)`.
    #[inline]
    pub fn get_board(&self, l: i32, t: i32, c: Player) -> Arc<Board> {
        self.m.get_board(l, t, c)
    }

    /// Returns the piece at a coordinate of the board with color `c`.
    #[inline]
    pub fn get_piece(&self, p: Vec4, c: Player) -> Piece {
        self.m.get_piece(p, c)
    }

    /// Lists every stored board as a 5D-FEN block tuple.
    #[inline]
    pub fn get_boards(&self) -> Vec<BoardInfo> {
        self.m.get_boards(false)
    }

    /// Serializes the whole position as 5D-FEN board blocks, unmoved markers
    /// included.
    pub fn show_fen(&self) -> String {
        let mut out = String::new();
        for (l, t, c, fen) in self.m.get_boards(true) {
            out.push_str(&format!(
                "[{}:{}:{}:{}]\n",
                fen,
                self.m.pretty_l(l),
                t,
                if c == Player::Black { 'b' } else { 'w' }
            ));
        }
        out
    }

    /// Generates all destinations of the piece at `p` for the player to
    /// move.
    #[inline]
    pub fn gen_piece_move(&self, p: Vec4) -> Vec<Vec4> {
        self.m.gen_piece_move(p, self.player)
    }

    /// Generates all destinations of the piece at `p` on the board of color
    /// `c`.
    #[inline]
    pub fn gen_piece_move_for(&self, p: Vec4, c: Player) -> Vec<Vec4> {
        self.m.gen_piece_move(p, c)
    }

    fn is_pseudo_legal(&self, fm: FullMove) -> bool {
        let p = fm.from;
        let q = fm.to;
        if p.outbound() || q.outbound() || !self.m.line_exists(p.l()) {
            return false;
        }
        // moves must be made from the tail board of an own-colored line
        if self.m.get_timeline_end(p.l()) != (p.t(), self.player) {
            return false;
        }
        let b = self.m.get_board(p.l(), p.t(), self.player);
        let piece = b.piece_at(p.xy());
        if piece.is_none()
            || piece.type_of() == PieceType::Wall
            || piece.player_lossy() != self.player
        {
            return false;
        }
        self.m
            .gen_moves(p, self.player)
            .iter()
            .any(|&(tl, bb)| tl == q.tl() && (bb & q.xy().to_bb()).is_not_empty())
    }

    /// Applies a move for the player to move, promoting to a queen when the
    /// move promotes. Returns `false` (and leaves the state untouched) when
    /// the move is not pseudo-legal.
    pub fn apply_move(&mut self, fm: FullMove) -> bool {
        self.apply_move_promote(fm, PieceType::Queen)
    }

    /// Applies a move with an explicit promotion piece.
    pub fn apply_move_promote(&mut self, fm: FullMove, promote_to: PieceType) -> bool {
        if !self.is_pseudo_legal(fm) {
            return false;
        }
        self.apply_move_logged(fm, promote_to);
        true
    }

    /// Applies a move without the pseudo-legality check.
    pub fn apply_move_unchecked(&mut self, fm: FullMove, promote_to: PieceType) {
        self.apply_move_logged(fm, promote_to);
    }

    /// The board a physical move would produce, promotion, castling and en
    /// passant resolved. Also the board builder of the action search.
    pub(crate) fn result_board_physical(&self, fm: FullMove, promote_to: PieceType) -> Board {
        let p = fm.from;
        let q = fm.to;
        let d = q - p;
        debug_assert!(d.l() == 0 && d.t() == 0);
        let b = self.m.get_board(p.l(), p.t(), self.player);
        let z = p.xy().to_bb();
        let (size_x, size_y) = self.m.get_board_size();
        if (b.lpawn() & z).is_not_empty() && d.x() != 0 && b.piece_at(q.xy()).is_none() {
            // en passant: the captured pawn sits beside the source
            b.replace_piece(SQ::make(q.x() as u8, p.y() as u8), Piece::None)
                .move_piece(p.xy(), q.xy())
        } else if (b.lpawn() & z).is_not_empty() && (q.y() == 0 || q.y() == size_y - 1) {
            let promoted = Piece::make(self.player, promote_to);
            b.replace_piece(p.xy(), Piece::None)
                .replace_piece(q.xy(), promoted)
        } else if (b.king() & z).is_not_empty() && d.x().abs() > 1 {
            // castling relocates the edge rook beside the king
            let rook_x1 = if d.x() < 0 { 0 } else { size_x as u8 - 1 };
            let rook_x2 = (q.x() + if d.x() < 0 { 1 } else { -1 }) as u8;
            b.move_piece(SQ::make(rook_x1, p.y() as u8), SQ::make(rook_x2, q.y() as u8))
                .move_piece(p.xy(), q.xy())
        } else {
            b.move_piece(p.xy(), q.xy())
        }
    }

    /// Applies a move in place, returning the log entry that undoes it.
    pub(crate) fn apply_move_logged(&mut self, fm: FullMove, promote_to: PieceType) -> MoveLog {
        let p = fm.from;
        let q = fm.to;
        let d = q - p;
        let (_size_x, size_y) = self.m.get_board_size();
        if d.l() == 0 && d.t() == 0 {
            let nb = self.result_board_physical(fm, promote_to);
            self.m.append_board(p.l(), Arc::new(nb));
            MoveLog::Physical { l: p.l() }
        } else if (q.t(), self.player) == self.m.get_timeline_end(q.l()) {
            // non-branching jump: the destination is the tail of its line
            let b = self.m.get_board(p.l(), p.t(), self.player);
            let pic = b.piece_at(p.xy());
            let z = p.xy().to_bb();
            self.m
                .append_board(p.l(), Arc::new(b.replace_piece(p.xy(), Piece::None)));
            let cb = self.m.get_board(q.l(), q.t(), self.player);
            let nb = if (b.lrawn() & z).is_not_empty() && (q.y() == 0 || q.y() == size_y - 1) {
                let promoted = Piece::make(self.player, promote_to);
                cb.replace_piece(q.xy(), promoted)
            } else {
                cb.replace_piece(q.xy(), pic)
            };
            self.m.append_board(q.l(), Arc::new(nb));
            MoveLog::Jump {
                from_l: p.l(),
                to_l: q.l(),
            }
        } else {
            // branching jump: the destination lies in the past of its line
            let b = self.m.get_board(p.l(), p.t(), self.player);
            let pic = b.piece_at(p.xy());
            let z = p.xy().to_bb();
            self.m
                .append_board(p.l(), Arc::new(b.replace_piece(p.xy(), Piece::None)));
            let xb = self.m.get_board(q.l(), q.t(), self.player);
            let (t, c) = next_turn((q.t(), self.player));
            let new_l = self.new_line();
            let nb = if (b.lrawn() & z).is_not_empty() && (q.y() == 0 || q.y() == size_y - 1) {
                let promoted = Piece::make(self.player, promote_to);
                xb.replace_piece(q.xy(), promoted)
            } else {
                xb.replace_piece(q.xy(), pic)
            };
            self.m.insert_board(new_l, t, c, Arc::new(nb));
            let old_present = self.present;
            let (new_present, _) = self.m.get_present();
            if new_present < self.present {
                // a historical board became active: the present rolls back
                self.present = new_present;
            }
            MoveLog::Branch {
                from_l: p.l(),
                new_l,
                old_present,
            }
        }
    }

    /// Undoes the in-place application recorded by `log`.
    pub(crate) fn undo_move_log(&mut self, log: MoveLog) {
        match log {
            MoveLog::Physical { l } => self.m.pop_board(l),
            MoveLog::Jump { from_l, to_l } => {
                self.m.pop_board(to_l);
                self.m.pop_board(from_l);
            }
            MoveLog::Branch {
                from_l,
                new_l,
                old_present,
            } => {
                self.m.remove_line(new_l);
                self.m.pop_board(from_l);
                self.present = old_present;
            }
        }
    }

    /// Advances the present to the multiverse's computed present, passing the
    /// turn. Fails (returning `false`) unless that represents a color swap,
    /// i.e. every mandatory timeline has been played.
    pub fn submit(&mut self) -> bool {
        let (t, c) = self.m.get_present();
        if self.player == c {
            return false;
        }
        self.present = t;
        self.player = c;
        true
    }

    /// Advances the present without the color-swap check.
    pub fn submit_unchecked(&mut self) {
        let (t, c) = self.m.get_present();
        self.present = t;
        self.player = c;
    }

    /// Submits unconditionally, returning the record that undoes it.
    pub(crate) fn submit_with_record(&mut self) -> Turn {
        let record = (self.present, self.player);
        self.submit_unchecked();
        record
    }

    /// Undoes a [`submit_with_record`].
    ///
    /// [`submit_with_record`]: #method.submit_with_record
    pub(crate) fn undo_submit(&mut self, record: Turn) {
        self.present = record.0;
        self.player = record.1;
    }

    /// Side-effect-free [`submit`]: returns the successor state, or `None`.
    ///
    /// [`submit`]: #method.submit
    pub fn can_submit(&self) -> Option<State> {
        let mut next = self.clone();
        if next.submit() {
            Some(next)
        } else {
            None
        }
    }

    /// Side-effect-free [`apply_move_promote`]: returns the successor state,
    /// or `None`.
    ///
    /// [`apply_move_promote`]: #method.apply_move_promote
    pub fn can_apply(&self, fm: FullMove, promote_to: PieceType) -> Option<State> {
        let mut next = self.clone();
        if next.apply_move_promote(fm, promote_to) {
            Some(next)
        } else {
            None
        }
    }

    /// Applies a whole action followed by a submit, without touching `self`.
    pub fn can_apply_action(&self, act: &Action) -> Option<State> {
        let mut next = self.clone();
        for em in act.moves() {
            if !next.apply_move_promote(em.fm, em.promote_to) {
                return None;
            }
        }
        if !next.submit() {
            return None;
        }
        Some(next)
    }

    /// Clones the state and, for each timeline whose tail color equals the
    /// player to move, appends a copy of its tail board. The phantom exposes
    /// the opponent's would-be replies on lines the player has not played,
    /// which distinguishes mate from stalemate.
    pub fn phantom(&self) -> State {
        let (l_min, l_max) = self.m.get_lines_range();
        let mut s = self.clone();
        for l in l_min..=l_max {
            let (t, c) = self.m.get_timeline_end(l);
            if c == self.player {
                let b = self.m.get_board(l, t, c);
                s.m.append_board(l, b);
            }
        }
        s
    }

    fn check_lines(&self, c: Player) -> Vec<i32> {
        let (l_min, l_max) = self.m.get_lines_range();
        let (active_min, active_max) = self.m.get_active_range();
        let (p_min, p_max) = if c == Player::Black {
            (active_min, l_max)
        } else {
            (l_min, active_max)
        };
        (p_min..=p_max)
            .filter(|&l| self.m.get_timeline_end(l).1 == c)
            .collect()
    }

    fn find_checks_impl(&self, c: Player, first_only: bool) -> Vec<FullMove> {
        let mut out = Vec::new();
        for l in self.check_lines(c) {
            let (t, _) = self.m.get_timeline_end(l);
            let tl = Vec4::new(0, 0, t, l);
            let b = self.m.get_board(l, t, c);
            for src in b.pieces_of(c) {
                let p = Vec4::from_sq(src, tl);
                for (q0, bb) in self.m.gen_moves(p, c) {
                    let b1 = self.m.get_board(q0.l(), q0.t(), c);
                    let royal_hits = bb & b1.royal();
                    for dst in royal_hits {
                        out.push(FullMove::new(p, Vec4::from_sq(dst, q0)));
                        if first_only {
                            return out;
                        }
                    }
                }
            }
        }
        out
    }

    /// Lists the moves in which a piece of `color` captures a hostile royal,
    /// bounded to tail boards whose color is `color`.
    pub fn find_checks(&self, c: Player) -> Vec<FullMove> {
        self.find_checks_impl(c, false)
    }

    /// Short-circuiting [`find_checks`].
    ///
    /// [`find_checks`]: #method.find_checks
    pub fn find_check_first(&self, c: Player) -> Option<FullMove> {
        self.find_checks_impl(c, true).into_iter().next()
    }

    /// Classifies the timelines relative to the player to move:
    /// `(mandatory, optional, unplayable)`.
    pub fn get_timeline_status(&self) -> (Vec<i32>, Vec<i32>, Vec<i32>) {
        let (l_min, l_max) = self.m.get_lines_range();
        let (active_min, active_max) = self.m.get_active_range();
        let present_tc = (self.present, self.player);
        let mut mandatory = Vec::new();
        let mut optional = Vec::new();
        let mut unplayable = Vec::new();
        for l in l_min..=l_max {
            let tc = self.m.get_timeline_end(l);
            if active_min <= l && l <= active_max && tc == present_tc {
                mandatory.push(l);
            } else if tc.1 == self.player {
                optional.push(l);
            } else {
                unplayable.push(l);
            }
        }
        (mandatory, optional, unplayable)
    }

    /// The positions of every friendly piece on a mandatory or optional
    /// timeline from which at least one pseudo-legal move exists.
    pub fn gen_movable_pieces(&self) -> Vec<Vec4> {
        let (mandatory, optional, _) = self.get_timeline_status();
        let mut result = Vec::new();
        for l in mandatory.into_iter().chain(optional) {
            let (t, c) = self.m.get_timeline_end(l);
            debug_assert_eq!(c, self.player);
            let tl = Vec4::new(0, 0, t, l);
            let b = self.m.get_board(l, t, c);
            for src in b.pieces_of(c) {
                let p = Vec4::from_sq(src, tl);
                if !self.m.gen_moves(p, c).is_empty() {
                    result.push(p);
                }
            }
        }
        result
    }

    /// Enumerates every legal action of the player to move. Lazy; dropping
    /// the iterator cancels the search.
    pub fn legal_actions(&self) -> ActionSearch {
        let (info, space) = HcInfo::build(self.clone());
        ActionSearch::new(info, space)
    }

    /// Decides how the position ends, if it does.
    ///
    /// The non-branching slice of the action space is searched first; any
    /// action there means the game goes on. Otherwise, actions that must
    /// branch make it a softmate, unless one of them travels backward in
    /// time (the opponent must answer in the past, so nothing is decided
    /// yet). With no action at all, a royal en prise on the phantom makes it
    /// checkmate, otherwise stalemate.
    pub fn get_mate_type(&self) -> MateType {
        if self.can_submit().is_some() {
            return MateType::None;
        }
        let (info, mut space) = HcInfo::build(self.clone());
        let nonbranching = space.pop().expect("action search space is never empty");
        let mut search = ActionSearch::new(info, vec![nonbranching]);
        if search.next().is_some() {
            return MateType::None;
        }
        let mut search = ActionSearch::new(search.into_info(), space);
        let mut soft = false;
        while let Some(mvs) = search.next() {
            soft = true;
            for fm in &mvs {
                if (fm.to - fm.from).t() < 0 {
                    return MateType::None;
                }
            }
        }
        if soft {
            return MateType::Softmate;
        }
        if self.phantom().find_check_first(!self.player).is_some() {
            MateType::Checkmate
        } else {
            MateType::Stalemate
        }
    }

    /// Applies the first enumerated legal action and submits. Returns whether
    /// an action was found and played.
    pub fn suggest_action(&mut self) -> bool {
        let mvs = match self.legal_actions().next() {
            Some(mvs) => mvs,
            None => return false,
        };
        for fm in mvs {
            let ok = self.apply_move(fm);
            debug_assert!(ok, "enumerated action contains an unplayable move");
        }
        self.submit()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "State(present={}, player={}):",
            self.present, self.player
        )?;
        write!(f, "{}", self.m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_flips_player_once() {
        let mut s = State::from_variant("Standard").unwrap();
        assert_eq!(s.get_present(), (1, Player::White));
        assert!(!s.submit());
        let e3: FullMove = "(0T1)e2e3".parse().unwrap();
        assert!(s.apply_move(e3));
        assert!(s.submit());
        assert_eq!(s.get_present(), (1, Player::Black));
        // idempotence: nothing more to submit
        assert!(!s.submit());
    }

    #[test]
    fn apply_rejects_pseudo_illegal() {
        let mut s = State::from_variant("Standard").unwrap();
        // moving a black piece on white's turn
        assert!(!s.apply_move("(0T1)e7e6".parse().unwrap()));
        // a pawn cannot move three squares
        assert!(!s.apply_move("(0T1)e2e5".parse().unwrap()));
        // not from a tail board
        assert!(!s.apply_move("(0T2)e2e3".parse().unwrap()));
        // out of range timeline
        assert!(!s.apply_move("(4T1)e2e3".parse().unwrap()));
    }

    #[test]
    fn castling_applies_rook_move() {
        let fen = "r*3k*2r*/8/8/8/8/8/8/R*3K*2R*";
        let mut s = State::from_5dfen(&format!("[{}:0:1:w]", fen), 8, 8).unwrap();
        assert!(s.apply_move("(0T1)e1g1".parse().unwrap()));
        let b = s.get_board(0, 1, Player::Black);
        assert_eq!(b.piece_at(SQ::make(6, 0)), Piece::WhiteKing);
        assert_eq!(b.piece_at(SQ::make(5, 0)), Piece::WhiteRook);
        assert!(b.piece_at(SQ::make(7, 0)).is_none());
        assert!(b.piece_at(SQ::make(4, 0)).is_none());
    }

    #[test]
    fn phantom_duplicates_own_tails() {
        let s = State::from_variant("Standard").unwrap();
        let ph = s.phantom();
        assert_eq!(ph.get_timeline_end(0), (1, Player::Black));
        // the phantom shares the tail board by reference
        assert!(Arc::ptr_eq(
            &ph.get_board(0, 1, Player::Black),
            &s.get_board(0, 1, Player::White)
        ));
    }

    #[test]
    fn timeline_status_fresh_game() {
        let s = State::from_variant("Standard").unwrap();
        let (mandatory, optional, unplayable) = s.get_timeline_status();
        assert_eq!(mandatory, vec![0]);
        assert!(optional.is_empty());
        assert!(unplayable.is_empty());
        assert_eq!(s.gen_movable_pieces().len(), 10);
    }
}
