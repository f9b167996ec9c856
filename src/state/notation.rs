//! Move notation: the move AST, a parser for exactly the move productions,
//! the field-wise matcher, and long-form rendering.
//!
//! Disambiguation works by round-trip: every generated candidate is rendered
//! in long form, re-parsed, and matched field by field against the user's
//! AST. An optional field in the user notation matches when absent or equal
//! to the candidate's field.

use super::State;
use crate::core::piece_move::FullMove;
use crate::core::vec4::Vec4;
use crate::core::PieceType;

bitflags! {
    /// Controls which optional elements `pretty_move` renders.
    pub struct ShowFlags: u8 {
        /// Print the `P` of pawn moves.
        const PAWN = 0b0001;
        /// Print the `x` of captures.
        const CAPTURE = 0b0010;
        /// Print the `=Q` promotion suffix.
        const PROMOTION = 0b0100;
        /// Print super-physical destinations relatively, `$(L+1T-2)`.
        const RELATIVE = 0b1000;
    }
}

impl ShowFlags {
    /// The long form the matcher compares against.
    pub fn long_form() -> ShowFlags {
        ShowFlags::PAWN | ShowFlags::CAPTURE | ShowFlags::PROMOTION
    }
}

/// The sign token in front of a timeline number.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sign {
    None,
    Positive,
    Negative,
}

/// An absolute board reference, `(L+0T5)` and friends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AbsoluteBoard {
    pub sign: Sign,
    pub line: Option<i32>,
    pub time: Option<i32>,
}

/// A relative board reference, `$(L+1T-2)`; `=` reads as zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RelativeBoard {
    pub line_diff: Option<i32>,
    pub time_diff: Option<i32>,
}

/// The castling notations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Castle {
    None,
    KingSide,
    QueenSide,
}

/// A parsed physical move, every field optional except the destination.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhysicalMove {
    pub board: Option<AbsoluteBoard>,
    pub castle: Castle,
    pub piece: Option<char>,
    pub from_file: Option<char>,
    pub from_rank: Option<u8>,
    pub capture: bool,
    pub to_file: char,
    pub to_rank: u8,
    pub promote_to: Option<char>,
}

/// The jump indicator of a super-physical move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JumpKind {
    None,
    NonBranching,
    Branching,
}

/// The destination board of a super-physical move.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ToBoard {
    Unspecified,
    Absolute(AbsoluteBoard),
    Relative(RelativeBoard),
}

/// A parsed super-physical move.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SuperphysicalMove {
    pub from_board: Option<AbsoluteBoard>,
    pub piece: Option<char>,
    pub from_file: Option<char>,
    pub from_rank: Option<u8>,
    pub jump: JumpKind,
    pub capture: bool,
    pub to_board: ToBoard,
    pub to_file: char,
    pub to_rank: u8,
    pub promote_to: Option<char>,
}

/// A parsed move of either kind.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MoveAst {
    Physical(PhysicalMove),
    Superphysical(SuperphysicalMove),
}

/// Parses a single move notation; the whole input must be consumed.
pub fn parse_move_ast(input: &str) -> Option<MoveAst> {
    let mut parser = Parser::new(input);
    let ast = parser.parse_move()?;
    if parser.at_end() {
        Some(ast)
    } else {
        None
    }
}

const PIECE_LETTERS: &[u8] = b"KQRBNPUDSYCZW";

struct Parser<'a> {
    s: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(s: &'a str) -> Parser<'a> {
        Parser {
            s: s.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.s.get(self.pos).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, t: &str) -> bool {
        if self.s[self.pos..].starts_with(t.as_bytes()) {
            self.pos += t.len();
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos == self.s.len()
    }

    fn number(&mut self) -> Option<i32> {
        let start = self.pos;
        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        std::str::from_utf8(&self.s[start..self.pos])
            .ok()?
            .parse()
            .ok()
    }

    fn piece_letter(&mut self) -> Option<char> {
        match self.peek() {
            Some(c) if PIECE_LETTERS.contains(&c) => {
                self.pos += 1;
                Some(c as char)
            }
            _ => None,
        }
    }

    fn file_char(&mut self) -> Option<char> {
        match self.peek() {
            Some(c) if (b'a'..=b'h').contains(&c) => {
                self.pos += 1;
                Some(c as char)
            }
            _ => None,
        }
    }

    fn rank_digit(&mut self) -> Option<u8> {
        match self.peek() {
            Some(c) if (b'1'..=b'8').contains(&c) => {
                self.pos += 1;
                Some(c - b'0')
            }
            _ => None,
        }
    }

    /// Consumes trailing check and evaluation symbols.
    fn suffix(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                b'+' | b'#' | b'*' | b'!' | b'?' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn absolute_board(&mut self) -> Option<AbsoluteBoard> {
        let save = self.pos;
        if !self.eat(b'(') {
            return None;
        }
        self.eat(b'L');
        let sign = if self.eat(b'+') {
            Sign::Positive
        } else if self.eat(b'-') {
            Sign::Negative
        } else {
            Sign::None
        };
        let line = self.number();
        if line.is_none() && sign != Sign::None {
            self.pos = save;
            return None;
        }
        let mut time = None;
        if self.eat(b'T') {
            time = self.number();
            if time.is_none() {
                self.pos = save;
                return None;
            }
        }
        if (line.is_none() && time.is_none()) || !self.eat(b')') {
            self.pos = save;
            return None;
        }
        Some(AbsoluteBoard { sign, line, time })
    }

    fn relative_diff(&mut self) -> Option<i32> {
        if self.eat(b'=') {
            return Some(0);
        }
        let negative = if self.eat(b'+') {
            false
        } else if self.eat(b'-') {
            true
        } else {
            return None;
        };
        let n = self.number()?;
        Some(if negative { -n } else { n })
    }

    fn relative_board(&mut self) -> Option<RelativeBoard> {
        let save = self.pos;
        if !self.eat_str("$(") {
            return None;
        }
        let mut line_diff = None;
        let mut time_diff = None;
        if self.eat(b'L') {
            line_diff = self.relative_diff();
            if line_diff.is_none() {
                self.pos = save;
                return None;
            }
        }
        if self.eat(b'T') {
            time_diff = self.relative_diff();
            if time_diff.is_none() {
                self.pos = save;
                return None;
            }
        }
        if (line_diff.is_none() && time_diff.is_none()) || !self.eat(b')') {
            self.pos = save;
            return None;
        }
        Some(RelativeBoard {
            line_diff,
            time_diff,
        })
    }

    fn physical(&mut self) -> Option<PhysicalMove> {
        let save = self.pos;
        let board = self.absolute_board();
        if self.eat_str("O-O-O") {
            self.suffix();
            return Some(PhysicalMove {
                board,
                castle: Castle::QueenSide,
                piece: None,
                from_file: None,
                from_rank: None,
                capture: false,
                to_file: 'a',
                to_rank: 0,
                promote_to: None,
            });
        }
        if self.eat_str("O-O") {
            self.suffix();
            return Some(PhysicalMove {
                board,
                castle: Castle::KingSide,
                piece: None,
                from_file: None,
                from_rank: None,
                capture: false,
                to_file: 'a',
                to_rank: 0,
                promote_to: None,
            });
        }
        let piece = self.piece_letter();
        let mut from_file = self.file_char();
        let mut from_rank = self.rank_digit();
        let mut capture = false;
        let to_file;
        let to_rank;
        let next_is_capture = self.peek() == Some(b'x');
        let next_is_file = self.peek().map_or(false, |c| (b'a'..=b'h').contains(&c));
        if from_file.is_some() && from_rank.is_some() && !next_is_capture && !next_is_file {
            // the square read was actually the destination, unless the rest
            // reveals a super-physical move
            if self.peek() == Some(b'>') {
                self.pos = save;
                return None;
            }
            let probe = self.pos;
            if self.absolute_board().is_some() || self.relative_board().is_some() {
                self.pos = save;
                return None;
            }
            self.pos = probe;
            to_file = from_file.take().unwrap();
            to_rank = from_rank.take().unwrap();
        } else {
            if self.eat(b'x') {
                capture = true;
            }
            to_file = match self.file_char() {
                Some(f) => f,
                None => {
                    self.pos = save;
                    return None;
                }
            };
            to_rank = match self.rank_digit() {
                Some(r) => r,
                None => {
                    self.pos = save;
                    return None;
                }
            };
        }
        let promote_to = if self.eat(b'=') {
            match self.piece_letter() {
                Some(p) => Some(p),
                None => {
                    self.pos = save;
                    return None;
                }
            }
        } else {
            None
        };
        self.suffix();
        Some(PhysicalMove {
            board,
            castle: Castle::None,
            piece,
            from_file,
            from_rank,
            capture,
            to_file,
            to_rank,
            promote_to,
        })
    }

    fn superphysical(&mut self) -> Option<SuperphysicalMove> {
        let save = self.pos;
        let from_board = self.absolute_board();
        let piece = self.piece_letter();
        let from_file = self.file_char();
        let from_rank = self.rank_digit();
        let jump = if self.eat_str(">>") {
            JumpKind::Branching
        } else if self.eat(b'>') {
            JumpKind::NonBranching
        } else {
            JumpKind::None
        };
        let capture = self.eat(b'x');
        let to_board = if jump != JumpKind::None
            && self.peek().map_or(false, |c| (b'a'..=b'h').contains(&c))
        {
            ToBoard::Unspecified
        } else if let Some(ab) = self.absolute_board() {
            ToBoard::Absolute(ab)
        } else if let Some(rb) = self.relative_board() {
            ToBoard::Relative(rb)
        } else {
            self.pos = save;
            return None;
        };
        let to_file = match self.file_char() {
            Some(f) => f,
            None => {
                self.pos = save;
                return None;
            }
        };
        let to_rank = match self.rank_digit() {
            Some(r) => r,
            None => {
                self.pos = save;
                return None;
            }
        };
        let promote_to = if self.eat(b'=') {
            match self.piece_letter() {
                Some(p) => Some(p),
                None => {
                    self.pos = save;
                    return None;
                }
            }
        } else {
            None
        };
        self.suffix();
        Some(SuperphysicalMove {
            from_board,
            piece,
            from_file,
            from_rank,
            jump,
            capture,
            to_board,
            to_file,
            to_rank,
            promote_to,
        })
    }

    fn parse_move(&mut self) -> Option<MoveAst> {
        let save = self.pos;
        if let Some(pm) = self.physical() {
            if self.at_end() {
                return Some(MoveAst::Physical(pm));
            }
            self.pos = save;
        }
        self.superphysical().map(MoveAst::Superphysical)
    }
}

fn match_opt<T: PartialEq>(simple: Option<T>, full: Option<T>) -> bool {
    simple.is_none() || simple == full
}

fn match_absolute_board(simple: &AbsoluteBoard, full: &AbsoluteBoard) -> bool {
    (simple.line.is_none() || (simple.sign, simple.line) == (full.sign, full.line))
        && match_opt(simple.time, full.time)
}

fn match_opt_board(simple: &Option<AbsoluteBoard>, full: &Option<AbsoluteBoard>) -> bool {
    match (simple, full) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(a), Some(b)) => match_absolute_board(a, b),
    }
}

fn match_relative_board(simple: &RelativeBoard, full: &RelativeBoard) -> bool {
    match_opt(simple.line_diff, full.line_diff) && match_opt(simple.time_diff, full.time_diff)
}

/// A user physical notation matches a candidate's long form iff every
/// optional field is absent or equal; `O-O`/`O-O-O` match the equivalent
/// king two-square move from the standard start squares.
pub(crate) fn match_physical_move(a: &PhysicalMove, b: &PhysicalMove) -> bool {
    if !match_opt_board(&a.board, &b.board) {
        return false;
    }
    if a.castle == Castle::KingSide {
        return b.castle == Castle::KingSide
            || (b.piece == Some('K')
                && b.from_file == Some('e')
                && b.from_rank == Some(1)
                && b.to_file == 'g'
                && b.to_rank == 1)
            || (b.piece == Some('K')
                && b.from_file == Some('e')
                && b.from_rank == Some(8)
                && b.to_file == 'g'
                && b.to_rank == 8);
    } else if a.castle == Castle::QueenSide {
        return b.castle == Castle::QueenSide
            || (b.piece == Some('K')
                && b.from_file == Some('e')
                && b.from_rank == Some(1)
                && b.to_file == 'c'
                && b.to_rank == 1)
            || (b.piece == Some('K')
                && b.from_file == Some('e')
                && b.from_rank == Some(8)
                && b.to_file == 'c'
                && b.to_rank == 8);
    }
    match_opt(a.piece, b.piece)
        && match_opt(a.from_file, b.from_file)
        && match_opt(a.from_rank, b.from_rank)
        && (!a.capture || b.capture)
        && a.to_file == b.to_file
        && a.to_rank == b.to_rank
        && match_opt(a.promote_to, b.promote_to)
}

/// The super-physical analogue of [`match_physical_move`].
///
/// [`match_physical_move`]: fn.match_physical_move.html
pub(crate) fn match_superphysical_move(a: &SuperphysicalMove, b: &SuperphysicalMove) -> bool {
    let tb_match = match (&a.to_board, &b.to_board) {
        (ToBoard::Unspecified, _) => true,
        (ToBoard::Absolute(x), ToBoard::Absolute(y)) => match_absolute_board(x, y),
        (ToBoard::Relative(x), ToBoard::Relative(y)) => match_relative_board(x, y),
        _ => false,
    };
    match_opt_board(&a.from_board, &b.from_board)
        && match_opt(a.piece, b.piece)
        && match_opt(a.from_file, b.from_file)
        && match_opt(a.from_rank, b.from_rank)
        && (a.jump == JumpKind::None || a.jump == b.jump)
        && tb_match
        && (!a.capture || b.capture)
        && a.to_file == b.to_file
        && a.to_rank == b.to_rank
        && match_opt(a.promote_to, b.promote_to)
}

/// Result of parsing a move against a state: the unique match if any, the
/// requested promotion, and the full candidate list (for error reporting on
/// ambiguity).
pub type ParseMoveResult = (Option<FullMove>, Option<PieceType>, Vec<FullMove>);

impl State {
    /// Renders a move of the player to move in notation, long or short
    /// depending on `flags`.
    pub fn pretty_move(&self, fm: FullMove, promote_to: PieceType, flags: ShowFlags) -> String {
        let p = fm.from;
        let q = fm.to;
        let mut out = String::new();
        out.push_str(&self.m.pretty_lt(p.tl()));
        let pt = self.get_piece(p, self.player).type_of();
        if flags.contains(ShowFlags::PAWN) || pt != PieceType::Pawn {
            out.push(pt.char_upper());
        }
        out.push((b'a' + p.x() as u8) as char);
        out.push((b'1' + p.y() as u8) as char);
        if p.tl() != q.tl() {
            if (q.t(), self.player) < self.get_timeline_end(q.l()) {
                out.push_str(">>");
            } else {
                out.push('>');
            }
            if flags.contains(ShowFlags::CAPTURE) && self.get_piece(q, self.player).is_some() {
                out.push('x');
            }
            if flags.contains(ShowFlags::RELATIVE) {
                let d = q - p;
                let show_diff = |out: &mut String, w: i32| {
                    if w > 0 {
                        out.push_str(&format!("+{}", w));
                    } else if w < 0 {
                        out.push_str(&format!("-{}", -w));
                    } else {
                        out.push('=');
                    }
                };
                out.push_str("$(L");
                show_diff(&mut out, d.l());
                out.push('T');
                show_diff(&mut out, d.t());
                out.push(')');
            } else {
                out.push_str(&self.m.pretty_lt(q.tl()));
            }
        } else if flags.contains(ShowFlags::CAPTURE) && self.get_piece(q, self.player).is_some() {
            out.push('x');
        }
        out.push((b'a' + q.x() as u8) as char);
        out.push((b'1' + q.y() as u8) as char);
        if flags.contains(ShowFlags::PROMOTION) {
            let (_, size_y) = self.get_board_size();
            if (pt == PieceType::Pawn || pt == PieceType::Brawn)
                && (q.y() == 0 || q.y() == size_y - 1)
            {
                out.push('=');
                out.push(promote_to.char_upper());
            }
        }
        out
    }

    /// Parses a possibly short-form notation and disambiguates it against the
    /// generated candidates. Returns the unique match (more than one match
    /// resolves only through the unique-pawn-move rule), the requested
    /// promotion piece, and all candidates.
    pub fn parse_move(&self, input: &str) -> ParseMoveResult {
        match parse_move_ast(input) {
            Some(ast) => self.match_move_ast(&ast),
            None => (None, None, Vec::new()),
        }
    }

    /// [`parse_move`] for an already-parsed AST.
    ///
    /// [`parse_move`]: #method.parse_move
    pub fn match_move_ast(&self, ast: &MoveAst) -> ParseMoveResult {
        let flags = ShowFlags::long_form();
        let user_promo = match ast {
            MoveAst::Physical(m) => m.promote_to,
            MoveAst::Superphysical(m) => m.promote_to,
        }
        .and_then(PieceType::from_letter);
        let cand_promo = user_promo.unwrap_or(PieceType::Queen);
        let mut matched: Vec<FullMove> = Vec::new();
        let mut pawn_matched: Vec<FullMove> = Vec::new();
        match ast {
            MoveAst::Physical(mv) => {
                for p in self.gen_movable_pieces() {
                    let pt = self.get_piece(p, self.player).type_of();
                    for sq in self.m.gen_physical_moves(p, self.player) {
                        let fm = FullMove::new(p, Vec4::from_sq(sq, p.tl()));
                        let long = self.pretty_move(fm, cand_promo, flags);
                        let full = Parser::new(&long).physical();
                        debug_assert!(full.is_some(), "unparsable long form: {}", long);
                        if let Some(full) = full {
                            if match_physical_move(mv, &full) {
                                matched.push(fm);
                                if pt == PieceType::Pawn {
                                    pawn_matched.push(fm);
                                }
                            }
                        }
                    }
                }
            }
            MoveAst::Superphysical(mv) => {
                for p in self.gen_movable_pieces() {
                    let pt = self.get_piece(p, self.player).type_of();
                    for (tl, bb) in self.m.gen_superphysical_moves(p, self.player) {
                        for sq in bb {
                            let fm = FullMove::new(p, Vec4::from_sq(sq, tl));
                            let long = self.pretty_move(fm, cand_promo, flags);
                            let full = Parser::new(&long).superphysical();
                            debug_assert!(full.is_some(), "unparsable long form: {}", long);
                            if let Some(full) = full {
                                if match_superphysical_move(mv, &full) {
                                    matched.push(fm);
                                    if pt == PieceType::Pawn {
                                        pawn_matched.push(fm);
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
        let fm = if matched.len() == 1 {
            Some(matched[0])
        } else if pawn_matched.len() == 1 {
            Some(pawn_matched[0])
        } else {
            None
        };
        let promo = if fm.is_some() { user_promo } else { None };
        (fm, promo, matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_short_physical() {
        let ast = parse_move_ast("e3").unwrap();
        match ast {
            MoveAst::Physical(m) => {
                assert_eq!(m.to_file, 'e');
                assert_eq!(m.to_rank, 3);
                assert!(m.piece.is_none() && m.from_file.is_none() && m.from_rank.is_none());
            }
            _ => panic!("expected a physical move"),
        }
    }

    #[test]
    fn parse_capture_with_board() {
        let ast = parse_move_ast("(1T1)Kxf7").unwrap();
        match ast {
            MoveAst::Physical(m) => {
                assert_eq!(m.piece, Some('K'));
                assert!(m.capture);
                assert_eq!(m.to_file, 'f');
                assert_eq!(m.to_rank, 7);
                let board = m.board.unwrap();
                assert_eq!(board.line, Some(1));
                assert_eq!(board.time, Some(1));
            }
            _ => panic!("expected a physical move"),
        }
    }

    #[test]
    fn parse_superphysical_jump() {
        let ast = parse_move_ast("Q>>xf7+").unwrap();
        match ast {
            MoveAst::Superphysical(m) => {
                assert_eq!(m.piece, Some('Q'));
                assert_eq!(m.jump, JumpKind::Branching);
                assert!(m.capture);
                assert_eq!(m.to_board, ToBoard::Unspecified);
                assert_eq!((m.to_file, m.to_rank), ('f', 7));
            }
            _ => panic!("expected a superphysical move"),
        }
    }

    #[test]
    fn parse_superphysical_with_boards() {
        let ast = parse_move_ast("(0T5)Qb3>(0T1)f7").unwrap();
        match ast {
            MoveAst::Superphysical(m) => {
                assert_eq!(m.jump, JumpKind::NonBranching);
                assert_eq!(m.from_file, Some('b'));
                assert_eq!(m.from_rank, Some(3));
                match m.to_board {
                    ToBoard::Absolute(ab) => {
                        assert_eq!(ab.line, Some(0));
                        assert_eq!(ab.time, Some(1));
                    }
                    _ => panic!("expected an absolute destination"),
                }
            }
            _ => panic!("expected a superphysical move"),
        }
    }

    #[test]
    fn parse_relative_destination() {
        let ast = parse_move_ast("Nf6>$(L+1T=)f4").unwrap();
        match ast {
            MoveAst::Superphysical(m) => match m.to_board {
                ToBoard::Relative(rb) => {
                    assert_eq!(rb.line_diff, Some(1));
                    assert_eq!(rb.time_diff, Some(0));
                }
                _ => panic!("expected a relative destination"),
            },
            _ => panic!("expected a superphysical move"),
        }
    }

    #[test]
    fn parse_castles() {
        match parse_move_ast("O-O").unwrap() {
            MoveAst::Physical(m) => assert_eq!(m.castle, Castle::KingSide),
            _ => panic!(),
        }
        match parse_move_ast("(0T4)O-O-O").unwrap() {
            MoveAst::Physical(m) => {
                assert_eq!(m.castle, Castle::QueenSide);
                assert!(m.board.is_some());
            }
            _ => panic!(),
        }
    }

    #[test]
    fn reject_garbage() {
        assert!(parse_move_ast("").is_none());
        assert!(parse_move_ast("hello world").is_none());
        assert!(parse_move_ast("e9").is_none());
        assert!(parse_move_ast("e3junk").is_none());
    }
}
