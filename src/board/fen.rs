//! FEN parsing and serialization for a single board.
//!
//! The board string is a `/`-separated rank-major description, ranks from the
//! top down. Digit runs compress empty squares; a `*` suffix marks a piece
//! that has not moved yet.

use super::Board;
use crate::core::masks::*;
use crate::core::sq::SQ;
use crate::core::Piece;

/// Represents possible errors encountered while building a `Board` from a
/// board string.
#[derive(Fail, Debug)]
pub enum FenBuildError {
    #[fail(display = "invalid board size: {}x{}, expected between 1x1 and 8x8", x, y)]
    BadSize { x: u8, y: u8 },
    #[fail(display = "invalid number of ranks: {}, expected {}", ranks, expected)]
    WrongRankCount { ranks: usize, expected: usize },
    #[fail(display = "rank holds more than {} squares: {}", width, rank)]
    RankOverflow { width: u8, rank: String },
    #[fail(display = "rank holds fewer than {} squares: {}", width, rank)]
    RankUnderflow { width: u8, rank: String },
    #[fail(display = "unrecognized piece: {}", piece)]
    UnrecognizedPiece { piece: char },
    #[fail(display = "'*' without a piece to mark in rank: {}", rank)]
    StrayUnmovedMark { rank: String },
}

impl Board {
    /// Parses a `/`-separated rank-major board string, `*` suffix marking an
    /// unmoved piece. Squares outside the `size_x` × `size_y` playing area
    /// become padding.
    ///
    /// # Examples
    ///
    /// ```
    /// use fived::Board;
    ///
    /// let b = Board::from_fen("nbrk/3p*/P*3/KRBN", 4, 4).unwrap();
    /// assert_eq!(b.get_fen_umove(), "nbrk/3p*/P*3/KRBN");
    /// ```
    pub fn from_fen(fen: &str, size_x: u8, size_y: u8) -> Result<Board, FenBuildError> {
        if size_x < 1 || size_x > 8 || size_y < 1 || size_y > 8 {
            return Err(FenBuildError::BadSize {
                x: size_x,
                y: size_y,
            });
        }
        let ranks: Vec<&str> = fen.split('/').collect();
        if ranks.len() != size_y as usize {
            return Err(FenBuildError::WrongRankCount {
                ranks: ranks.len(),
                expected: size_y as usize,
            });
        }
        let mut board = Board::empty(size_x, size_y);
        for (i, rank) in ranks.iter().enumerate() {
            let y = size_y - 1 - i as u8;
            let mut x: u32 = 0;
            let mut chars = rank.chars().peekable();
            while let Some(c) = chars.next() {
                if let Some(d) = c.to_digit(10) {
                    let mut run = d;
                    while let Some(d2) = chars.peek().and_then(|c2| c2.to_digit(10)) {
                        run = run * 10 + d2;
                        chars.next();
                    }
                    x += run;
                } else if c == '*' {
                    return Err(FenBuildError::StrayUnmovedMark {
                        rank: (*rank).to_string(),
                    });
                } else {
                    let piece = Piece::from_character(c)
                        .ok_or(FenBuildError::UnrecognizedPiece { piece: c })?;
                    if x >= size_x as u32 {
                        return Err(FenBuildError::RankOverflow {
                            width: size_x,
                            rank: (*rank).to_string(),
                        });
                    }
                    let sq = SQ::make(x as u8, y);
                    board.set(sq, piece);
                    if chars.peek() == Some(&'*') {
                        chars.next();
                        board.umove |= sq.to_bb();
                    }
                    x += 1;
                }
            }
            if x != size_x as u32 {
                if x > size_x as u32 {
                    return Err(FenBuildError::RankOverflow {
                        width: size_x,
                        rank: (*rank).to_string(),
                    });
                }
                return Err(FenBuildError::RankUnderflow {
                    width: size_x,
                    rank: (*rank).to_string(),
                });
            }
        }
        Ok(board)
    }

    /// Serializes the board, ranks from the top down, without unmoved marks.
    pub fn get_fen(&self) -> String {
        self.fen_impl(false)
    }

    /// Serializes the board with `*` marking the unmoved pieces, such that
    /// `from_fen` reconstructs this board exactly.
    pub fn get_fen_umove(&self) -> String {
        self.fen_impl(true)
    }

    fn fen_impl(&self, show_umove: bool) -> String {
        let mut out = String::with_capacity(SQ_CNT);
        for y in (0..self.size_y).rev() {
            if y != self.size_y - 1 {
                out.push('/');
            }
            let mut empties: u32 = 0;
            for x in 0..self.size_x {
                let sq = SQ::make(x, y);
                match self.piece_at(sq).character() {
                    None => empties += 1,
                    Some(c) => {
                        if empties > 0 {
                            out.push_str(&empties.to_string());
                            empties = 0;
                        }
                        out.push(c);
                        if show_umove && (self.umove & sq.to_bb()).is_not_empty() {
                            out.push('*');
                        }
                    }
                }
            }
            if empties > 0 {
                out.push_str(&empties.to_string());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static STANDARD: &str = "r*nbqk*bnr*/p*p*p*p*p*p*p*p*/8/8/8/8/P*P*P*P*P*P*P*P*/R*NBQK*BNR*";

    #[test]
    fn fen_roundtrip_standard() {
        let b = Board::from_fen(STANDARD, 8, 8).unwrap();
        assert_eq!(b.get_fen_umove(), STANDARD);
        assert_eq!(
            b.get_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
        let again = Board::from_fen(&b.get_fen_umove(), 8, 8).unwrap();
        assert!(again == b);
    }

    #[test]
    fn fen_roundtrip_loses_umove_when_hidden() {
        let b = Board::from_fen(STANDARD, 8, 8).unwrap();
        let hidden = Board::from_fen(&b.get_fen(), 8, 8).unwrap();
        assert!(hidden != b);
        assert!(hidden.umove().is_empty());
    }

    #[test]
    fn fen_rejects_malformed() {
        assert!(Board::from_fen("9/8/8/8/8/8/8/8", 8, 8).is_err());
        assert!(Board::from_fen("8/8/8", 8, 8).is_err());
        assert!(Board::from_fen("x7/8/8/8/8/8/8/8", 8, 8).is_err());
        assert!(Board::from_fen("*7/8/8/8/8/8/8/8", 8, 8).is_err());
        assert!(Board::from_fen("7/8/8/8/8/8/8/8", 8, 8).is_err());
        assert!(Board::from_fen("8/8/8/8", 9, 4).is_err());
    }

    #[test]
    fn fen_small_board() {
        let b = Board::from_fen("1u1uk*/5/5/5/K*U1U1", 5, 5).unwrap();
        assert_eq!(b.get_fen_umove(), "1u1uk*/5/5/5/K*U1U1");
        assert_eq!(b.piece_at(SQ::make(4, 4)), Piece::BlackKing);
        assert_eq!(b.piece_at(SQ::make(0, 0)), Piece::WhiteKing);
        assert_eq!(
            b.umove(),
            SQ::make(4, 4).to_bb() | SQ::make(0, 0).to_bb()
        );
    }
}
