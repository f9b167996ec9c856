//! This module contains [`Multiverse`], the store of every board of a game
//! across timelines and half-turns, together with timeline-activation
//! bookkeeping and the computation of the present.
//!
//! Copying a multiverse copies the vectors of pointers to the boards; it does
//! not deep-copy a board (which is expected, boards are immutable).
//!
//! [`Multiverse`]: struct.Multiverse.html

pub mod movegen;

use crate::board::{Board, FenBuildError};
use crate::core::vec4::Vec4;
use crate::core::{Piece, Player, Turn};

use std::fmt;
use std::sync::Arc;

/// A board block of a 5D-FEN: `(l, t, color, board string)`.
pub type BoardInfo = (i32, i32, Player, String);

/// Represents possible errors encountered while building a `Multiverse`.
#[derive(Fail, Debug)]
pub enum MultiverseBuildError {
    #[fail(display = "empty input: a multiverse needs at least one board")]
    Empty,
    #[fail(display = "there is a gap between timelines at L{}", l)]
    TimelineGap { l: i32 },
    #[fail(display = "there is a gap between boards on timeline L{}", l)]
    BoardGap { l: i32 },
    #[fail(display = "duplicate definition of the board on L{} T{}{}", l, t, c)]
    DuplicateBoard { l: i32, t: i32, c: char },
    #[fail(display = "negative time is not supported: T{}", t)]
    NegativeTime { t: i32 },
    #[fail(display = "unknown color: {}", c)]
    UnknownColor { c: String },
    #[fail(display = "malformed 5D-FEN board block: {}", block)]
    MalformedBlock { block: String },
    #[fail(display = "{}", err)]
    Fen { err: FenBuildError },
}

impl From<FenBuildError> for MultiverseBuildError {
    fn from(err: FenBuildError) -> MultiverseBuildError {
        MultiverseBuildError::Fen { err }
    }
}

/// The two ways the initial timelines of a game can be laid out.
///
/// In the odd variant, timelines are plain integers around a single line 0.
/// In the even variant, the split is at ½: there are two zero lines of
/// opposite sign, and "black-side zero" (`-0` in notations) is stored
/// internally as `l = -1`, shifting every negative timeline by one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Variant {
    Odd,
    Even,
}

impl Variant {
    /// The timeline range the game starts with.
    #[inline]
    pub fn initial_lines_range(self) -> (i32, i32) {
        match self {
            Variant::Odd => (0, 0),
            Variant::Even => (-1, 0),
        }
    }

    /// Formats a timeline index the way notations print it.
    pub fn pretty_l(self, l: i32) -> String {
        match self {
            Variant::Odd => format!("{}", l),
            Variant::Even => {
                if l >= 0 {
                    format!("+{}", l)
                } else {
                    format!("-{}", !l)
                }
            }
        }
    }
}

/// Maps a signed timeline index onto the unsigned storage row.
///
/// Uses the bijection from integers to non-negative integers
/// `x -> x ≥ 0 ? 2x : !(2x)`.
#[inline(always)]
pub const fn l_to_u(l: i32) -> usize {
    if l >= 0 {
        (l << 1) as usize
    } else {
        !(l << 1) as usize
    }
}

/// Inverse of [`l_to_u`].
///
/// [`l_to_u`]: fn.l_to_u.html
#[inline(always)]
pub const fn u_to_l(u: usize) -> i32 {
    if u & 1 == 1 {
        !((u >> 1) as i32)
    } else {
        (u >> 1) as i32
    }
}

/// Flattens a half-turn into the storage column `v = 2t + color`.
#[inline(always)]
pub const fn tc_to_v(t: i32, c: Player) -> i32 {
    t << 1 | c as i32
}

/// Inverse of [`tc_to_v`].
///
/// [`tc_to_v`]: fn.tc_to_v.html
#[inline(always)]
pub fn v_to_tc(v: i32) -> Turn {
    (
        v >> 1,
        if v & 1 == 0 {
            Player::White
        } else {
            Player::Black
        },
    )
}

/// The growing two-dimensional store of boards, indexed by
/// `(timeline, time, color)`.
#[derive(Clone)]
pub struct Multiverse {
    variant: Variant,
    size_x: u8,
    size_y: u8,
    boards: Vec<Vec<Option<Arc<Board>>>>,
    // the following data are derived from boards:
    l_min: i32,
    l_max: i32,
    active_min: i32,
    active_max: i32,
    timeline_start: Vec<i32>,
    timeline_end: Vec<i32>,
}

impl Multiverse {
    /// Builds a multiverse from a list of board blocks.
    pub fn new(
        infos: &[BoardInfo],
        variant: Variant,
        size_x: u8,
        size_y: u8,
    ) -> Result<Multiverse, MultiverseBuildError> {
        if infos.is_empty() {
            return Err(MultiverseBuildError::Empty);
        }
        let mut m = Multiverse {
            variant,
            size_x,
            size_y,
            boards: Vec::new(),
            l_min: 0,
            l_max: 0,
            active_min: 0,
            active_max: 0,
            timeline_start: Vec::new(),
            timeline_end: Vec::new(),
        };
        for (l, t, c, fen) in infos {
            let board = Arc::new(Board::from_fen(fen, size_x, size_y)?);
            m.insert_board_impl(*l, *t, *c, board)?;
        }
        for l in m.l_min..=m.l_max {
            let u = l_to_u(l);
            if u >= m.boards.len() || m.boards[u].is_empty() {
                return Err(MultiverseBuildError::TimelineGap { l });
            }
            for v in m.timeline_start[u]..=m.timeline_end[u] {
                if m.boards[u][v as usize].is_none() {
                    return Err(MultiverseBuildError::BoardGap { l });
                }
            }
        }
        m.update_active_range();
        Ok(m)
    }

    /// Parses a sequence of 5D-FEN board blocks, e.g.
    /// `[r*nbqk*bnr*/…/R*NBQK*BNR*:0:1:w]`, auto-detecting the timeline
    /// variant: an explicitly signed zero line (`+0` / `-0`) selects the even
    /// variant.
    ///
    /// Comments in braces are ignored.
    pub fn from_5dfen(
        input: &str,
        size_x: u8,
        size_y: u8,
    ) -> Result<Multiverse, MultiverseBuildError> {
        let mut blocks: Vec<(String, bool, i32, i32, Player)> = Vec::new();
        let mut even = false;
        let mut rest = input;
        while let Some(open) = rest.find('[') {
            let close = rest[open..]
                .find(']')
                .ok_or_else(|| MultiverseBuildError::MalformedBlock {
                    block: rest[open..].to_string(),
                })?;
            let body = &rest[open + 1..open + close];
            rest = &rest[open + close + 1..];
            let parts: Vec<&str> = body.split(':').collect();
            if parts.len() != 4 {
                return Err(MultiverseBuildError::MalformedBlock {
                    block: body.to_string(),
                });
            }
            let strip_comments = |s: &str| -> String {
                let mut out = String::new();
                let mut depth = 0;
                for ch in s.chars() {
                    match ch {
                        '{' => depth += 1,
                        '}' => depth -= 1,
                        _ if depth == 0 && !ch.is_whitespace() => out.push(ch),
                        _ => {}
                    }
                }
                out
            };
            let fen = strip_comments(parts[0]);
            let l_str = parts[1].trim();
            let (negative, digits, signed) = match l_str.chars().next() {
                Some('+') => (false, &l_str[1..], true),
                Some('-') => (true, &l_str[1..], true),
                _ => (false, l_str, false),
            };
            let l_abs: i32 =
                digits
                    .parse()
                    .map_err(|_| MultiverseBuildError::MalformedBlock {
                        block: body.to_string(),
                    })?;
            let t: i32 = parts[2]
                .trim()
                .parse()
                .map_err(|_| MultiverseBuildError::MalformedBlock {
                    block: body.to_string(),
                })?;
            let c = match parts[3].trim() {
                "w" | "W" => Player::White,
                "b" | "B" => Player::Black,
                other => {
                    return Err(MultiverseBuildError::UnknownColor {
                        c: other.to_string(),
                    })
                }
            };
            even |= signed && l_abs == 0;
            blocks.push((fen, negative, l_abs, t, c));
        }
        let variant = if even { Variant::Even } else { Variant::Odd };
        let infos: Vec<BoardInfo> = blocks
            .into_iter()
            .map(|(fen, negative, l_abs, t, c)| {
                let l = match (variant, negative) {
                    (Variant::Even, true) => !l_abs,
                    (_, true) => -l_abs,
                    (_, false) => l_abs,
                };
                (l, t, c, fen)
            })
            .collect();
        Multiverse::new(&infos, variant, size_x, size_y)
    }

    /// The timeline variant of this multiverse.
    #[inline(always)]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Returns the board size as `(size_x, size_y)`.
    #[inline(always)]
    pub fn get_board_size(&self) -> (i32, i32) {
        (self.size_x as i32, self.size_y as i32)
    }

    /// The timeline range the game started with.
    #[inline(always)]
    pub fn get_initial_lines_range(&self) -> (i32, i32) {
        self.variant.initial_lines_range()
    }

    /// The timeline range currently stored.
    #[inline(always)]
    pub fn get_lines_range(&self) -> (i32, i32) {
        (self.l_min, self.l_max)
    }

    /// The range of timelines whose tails constrain the present.
    #[inline(always)]
    pub fn get_active_range(&self) -> (i32, i32) {
        (self.active_min, self.active_max)
    }

    /// Returns whether timeline `l` exists.
    #[inline(always)]
    pub fn line_exists(&self, l: i32) -> bool {
        l >= self.l_min && l <= self.l_max
    }

    /// Returns whether timeline `l` is active.
    #[inline(always)]
    pub fn is_active(&self, l: i32) -> bool {
        l >= self.active_min && l <= self.active_max
    }

    /// The half-turn of the first board of timeline `l`.
    #[inline]
    pub fn get_timeline_start(&self, l: i32) -> Turn {
        v_to_tc(self.timeline_start[l_to_u(l)])
    }

    /// The half-turn of the last board of timeline `l`.
    #[inline]
    pub fn get_timeline_end(&self, l: i32) -> Turn {
        v_to_tc(self.timeline_end[l_to_u(l)])
    }

    /// Returns `(present_t, present_c)`: the earliest half-turn held as the
    /// tail of any active timeline.
    pub fn get_present(&self) -> Turn {
        let mut present_v = i32::max_value();
        for l in self.active_min..=self.active_max {
            present_v = present_v.min(self.timeline_end[l_to_u(l)]);
        }
        v_to_tc(present_v)
    }

    /// Returns the board at `(l, t, c)`.
    ///
    /// # Panics
    ///
    /// Querying a coordinate outside the stored ranges is a programming
    /// fault and panics.
    pub fn get_board(&self, l: i32, t: i32, c: Player) -> Arc<Board> {
        self.try_board(l, t, c).unwrap_or_else(|| {
            panic!("out of range in Multiverse::get_board({}, {}, {})", l, t, c as u8)
        })
    }

    /// Returns the board at `(l, t, c)`, or `None` when out of range.
    pub fn try_board(&self, l: i32, t: i32, c: Player) -> Option<Arc<Board>> {
        let u = l_to_u(l);
        let v = tc_to_v(t, c);
        if v < 0 {
            return None;
        }
        self.boards
            .get(u)?
            .get(v as usize)
            .and_then(|b| b.clone())
    }

    /// Returns the piece at a coordinate of the board with color `c`.
    #[inline]
    pub fn get_piece(&self, a: Vec4, c: Player) -> Piece {
        self.get_board(a.l(), a.t(), c).piece_at(a.xy())
    }

    /// Returns the unmoved flag of a coordinate of the board with color `c`.
    #[inline]
    pub fn get_umove_flag(&self, a: Vec4, c: Player) -> bool {
        let b = self.get_board(a.l(), a.t(), c);
        (b.umove() & a.xy().to_bb()).is_not_empty()
    }

    /// Returns whether the coordinate addresses a stored board (on the color
    /// `c` side) and an in-bounds square.
    pub fn inbound(&self, a: Vec4, c: Player) -> bool {
        let l = a.l();
        if a.outbound() || l < self.l_min || l > self.l_max {
            return false;
        }
        let u = l_to_u(l);
        let v = tc_to_v(a.t(), c);
        self.timeline_start[u] <= v && v <= self.timeline_end[u]
    }

    /// Extends the tail of timeline `l` with a new board.
    pub fn append_board(&mut self, l: i32, b: Arc<Board>) {
        let u = l_to_u(l);
        self.boards[u].push(Some(b));
        self.timeline_end[u] += 1;
    }

    /// Removes the tail board of timeline `l`. Inverse of [`append_board`].
    ///
    /// [`append_board`]: #method.append_board
    pub fn pop_board(&mut self, l: i32) {
        let u = l_to_u(l);
        self.boards[u].pop();
        self.timeline_end[u] -= 1;
    }

    /// Creates a new timeline whose first board is at `(t, c)`, then
    /// recomputes the active range.
    pub fn insert_board(&mut self, l: i32, t: i32, c: Player, b: Arc<Board>) {
        self.insert_board_impl(l, t, c, b)
            .expect("Multiverse::insert_board: invalid insertion");
        self.update_active_range();
    }

    /// Removes timeline `l`, which must be the most recently created one.
    /// Inverse of [`insert_board`].
    ///
    /// [`insert_board`]: #method.insert_board
    pub fn remove_line(&mut self, l: i32) {
        let u = l_to_u(l);
        debug_assert_eq!(u, self.boards.len() - 1);
        self.boards.pop();
        self.timeline_start.pop();
        self.timeline_end.pop();
        if l > 0 {
            self.l_max = l - 1;
        } else {
            self.l_min = l + 1;
        }
        self.update_active_range();
    }

    fn insert_board_impl(
        &mut self,
        l: i32,
        t: i32,
        c: Player,
        b: Arc<Board>,
    ) -> Result<(), MultiverseBuildError> {
        let u = l_to_u(l);
        let v = tc_to_v(t, c);
        if v < 0 {
            return Err(MultiverseBuildError::NegativeTime { t });
        }
        if u >= self.boards.len() {
            self.boards.resize(u + 1, Vec::new());
            self.timeline_start.resize(u + 1, i32::max_value());
            self.timeline_end.resize(u + 1, i32::min_value());
        }
        self.l_min = self.l_min.min(l);
        self.l_max = self.l_max.max(l);
        let timeline = &mut self.boards[u];
        if (v as usize) >= timeline.len() {
            timeline.resize(v as usize + 1, None);
        }
        if timeline[v as usize].is_some() {
            return Err(MultiverseBuildError::DuplicateBoard {
                l,
                t,
                c: if c == Player::Black { 'b' } else { 'w' },
            });
        }
        timeline[v as usize] = Some(b);
        self.timeline_start[u] = self.timeline_start[u].min(v);
        self.timeline_end[u] = self.timeline_end[u].max(v);
        Ok(())
    }

    /// The closed form of the activation rule: each side's created timelines
    /// activate up to one more than the opponent has created.
    fn calculate_active_range(&self) -> (i32, i32) {
        let (l0_min, l0_max) = self.get_initial_lines_range();
        let whites_lines = self.l_max - l0_max;
        let blacks_lines = l0_min - self.l_min;
        (
            l0_min - blacks_lines.min(whites_lines + 1),
            l0_max + whites_lines.min(blacks_lines + 1),
        )
    }

    fn update_active_range(&mut self) {
        let (amin, amax) = self.calculate_active_range();
        self.active_min = amin;
        self.active_max = amax;
    }

    /// Formats a timeline index the way notations print it.
    #[inline]
    pub fn pretty_l(&self, l: i32) -> String {
        self.variant.pretty_l(l)
    }

    /// Formats the super-physical part of a coordinate, e.g. `(0T5)`.
    #[inline]
    pub fn pretty_lt(&self, p: Vec4) -> String {
        format!("({}T{})", self.pretty_l(p.l()), p.t())
    }

    /// Lists every stored board as a 5D-FEN block tuple. With `show_umove`,
    /// board strings carry the `*` unmoved markers.
    pub fn get_boards(&self, show_umove: bool) -> Vec<BoardInfo> {
        let mut result = Vec::new();
        for (u, timeline) in self.boards.iter().enumerate() {
            let l = u_to_l(u);
            for (v, slot) in timeline.iter().enumerate() {
                if let Some(b) = slot {
                    let (t, c) = v_to_tc(v as i32);
                    let fen = if show_umove {
                        b.get_fen_umove()
                    } else {
                        b.get_fen()
                    };
                    result.push((l, t, c, fen));
                }
            }
        }
        result
    }
}

impl fmt::Display for Multiverse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (present, player) = self.get_present();
        writeln!(
            f,
            "Multiverse present: T{}{}",
            present,
            if player == Player::Black { 'b' } else { 'w' }
        )?;
        writeln!(
            f,
            "lines range: ({}, {})\tactive range: ({}, {})",
            self.l_min, self.l_max, self.active_min, self.active_max
        )?;
        for (u, timeline) in self.boards.iter().enumerate() {
            let l = u_to_l(u);
            for (v, slot) in timeline.iter().enumerate() {
                if let Some(b) = slot {
                    let (t, c) = v_to_tc(v as i32);
                    writeln!(
                        f,
                        "L{}T{}{}",
                        l,
                        t,
                        if c == Player::Black { 'b' } else { 'w' }
                    )?;
                    write!(f, "{}", b)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lu_bijection() {
        for l in -8..=8 {
            assert_eq!(u_to_l(l_to_u(l)), l);
        }
        assert_eq!(l_to_u(0), 0);
        assert_eq!(l_to_u(-1), 1);
        assert_eq!(l_to_u(1), 2);
        assert_eq!(l_to_u(-2), 3);
    }

    #[test]
    fn tc_bijection() {
        for t in 0..8 {
            for &c in &crate::core::ALL_PLAYERS {
                assert_eq!(v_to_tc(tc_to_v(t, c)), (t, c));
            }
        }
    }

    #[test]
    fn active_range_clamps_to_advantage() {
        let fen = "[k3/4/4/K3:0:1:w]\
                   [k3/4/4/K3:1:1:b]\
                   [k3/4/4/K3:2:1:b]";
        let m = Multiverse::from_5dfen(fen, 4, 4).unwrap();
        assert_eq!(m.get_lines_range(), (0, 2));
        // white created two lines, black none: only one activates
        assert_eq!(m.get_active_range(), (0, 1));
        // the earliest active tail is line 0's white board
        assert_eq!(m.get_present(), (1, Player::White));
    }

    #[test]
    fn even_variant_detection() {
        let fen = "[k3/4/4/K3:+0:1:w][k3/4/4/K3:-0:1:w]";
        let m = Multiverse::from_5dfen(fen, 4, 4).unwrap();
        assert_eq!(m.variant(), Variant::Even);
        assert_eq!(m.get_lines_range(), (-1, 0));
        assert_eq!(m.get_active_range(), (-1, 0));
        assert_eq!(m.pretty_l(-1), "-0");
        assert_eq!(m.pretty_l(0), "+0");
    }
}
