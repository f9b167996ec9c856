//! Move generation across the multiverse.
//!
//! Physical moves (source and destination on the same board) are plain
//! bitboard lookups. Super-physical moves walk the (t,l) plane: the
//! orthogonal direction class never steps toward +t on the same line, because
//! that board does not exist yet; the diagonal class may, because changing
//! timeline can land on a board that does.
//!
//! The compound generator handles pieces whose move mixes a physical and a
//! super-physical component. It aggregates, for each (t,l) ray, the occupancy
//! of the boards crossed — each board contributes exactly its distance-n
//! copy-cone ring — runs a single 2-D sliding attack through the aggregate,
//! and distributes the resulting bits back to the boards they came from. A
//! missing board contributes its ring as a friendly blocker, so no slider
//! traverses a coordinate with no board.

use super::Multiverse;
use crate::board::Board;
use crate::core::bitboard::BitBoard;
use crate::core::sq::SQ;
use crate::core::vec4::Vec4;
use crate::core::{PieceType, Player};
use crate::helper::prelude::*;

use std::collections::BTreeMap;

/// One (t,l) step along a timeline or backward in time. The +t step is
/// absent: a future board of the same line is never a destination.
const ORTHOGONAL_DTLS: [Vec4; 3] = [
    Vec4::new(0, 0, 0, 1),
    Vec4::new(0, 0, 0, -1),
    Vec4::new(0, 0, -1, 0),
];

/// One diagonal (t,l) step.
const DIAGONAL_DTLS: [Vec4; 4] = [
    Vec4::new(0, 0, 1, 1),
    Vec4::new(0, 0, 1, -1),
    Vec4::new(0, 0, -1, 1),
    Vec4::new(0, 0, -1, -1),
];

/// The union of the orthogonal and diagonal (t,l) steps.
const BOTH_DTLS: [Vec4; 7] = [
    Vec4::new(0, 0, 0, 1),
    Vec4::new(0, 0, 0, -1),
    Vec4::new(0, 0, -1, 0),
    Vec4::new(0, 0, 1, 1),
    Vec4::new(0, 0, 1, -1),
    Vec4::new(0, 0, -1, 1),
    Vec4::new(0, 0, -1, -1),
];

/// Two (t,l) steps in one direction, for the knight.
const DOUBLE_DTLS: [Vec4; 3] = [
    Vec4::new(0, 0, 0, 2),
    Vec4::new(0, 0, 0, -2),
    Vec4::new(0, 0, -2, 0),
];

/// Direction classes of the compound generator.
#[derive(Copy, Clone, PartialEq, Eq)]
enum Axes {
    Orthogonal,
    Diagonal,
    Both,
}

#[inline]
fn copy_mask(xy: Axes, pos: SQ, n: usize) -> BitBoard {
    match xy {
        Axes::Orthogonal => rook_copy_mask(pos, n),
        Axes::Diagonal => bishop_copy_mask(pos, n),
        Axes::Both => queen_copy_mask(pos, n),
    }
}

impl Multiverse {
    /// Generates the physical move bitboard of the piece at `p` on the board
    /// of color `c`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the square holds no movable piece.
    pub fn gen_physical_moves(&self, p: Vec4, c: Player) -> BitBoard {
        let b = self.get_board(p.l(), p.t(), c);
        let piece = b.piece_at(p.xy());
        let unmoved = (b.umove() & p.xy().to_bb()).is_not_empty();
        self.gen_physical_moves_impl(&b, p, c, piece.type_of(), unmoved)
    }

    fn gen_physical_moves_impl(
        &self,
        b: &Board,
        p: Vec4,
        c: Player,
        pt: PieceType,
        unmoved: bool,
    ) -> BitBoard {
        let friendly = b.friendly(c);
        match pt {
            PieceType::King | PieceType::CommonKing => {
                let mut a = king_moves(p.xy()) & !friendly;
                if pt == PieceType::King && unmoved {
                    a |= self.castle_targets(b, p, c);
                }
                a
            }
            PieceType::Rook => rook_moves(b.occupied(), p.xy()) & !friendly,
            PieceType::Bishop => bishop_moves(b.occupied(), p.xy()) & !friendly,
            PieceType::Queen | PieceType::Princess | PieceType::RoyalQueen => {
                queen_moves(b.occupied(), p.xy()) & !friendly
            }
            PieceType::Knight => knight_moves(p.xy()) & !friendly,
            PieceType::Pawn | PieceType::Brawn => self.pawn_physical(b, p, c, unmoved),
            PieceType::Unicorn | PieceType::Dragon => BitBoard(0),
            PieceType::None | PieceType::Wall => {
                debug_assert!(false, "gen_physical_moves on an immovable square");
                BitBoard(0)
            }
        }
    }

    /// Castling targets of an unmoved king: scan both x-directions; the king
    /// and the two squares it crosses must be unattacked, every traversed
    /// square empty, and the scan must end on an unmoved rook at the board
    /// edge (padding counts as edge).
    fn castle_targets(&self, b: &Board, p: Vec4, c: Player) -> BitBoard {
        let mut a = BitBoard(0);
        if b.is_under_attack(p.xy(), c).is_not_empty() {
            return a;
        }
        let urook = b.umove() & b.rooks() & b.friendly(c);
        for d in &[Vec4::new(1, 0, 0, 0), Vec4::new(-1, 0, 0, 0)] {
            let mut i = 0;
            let mut q = p + *d;
            while !q.outbound() {
                let w = q.xy().to_bb();
                if i < 2 && b.is_under_attack(q.xy(), c).is_not_empty() {
                    break;
                } else if (w & urook).is_not_empty() {
                    let next = q + *d;
                    if next.outbound() || (b.wall() & next.xy().to_bb()).is_not_empty() {
                        a |= (p + *d * 2).xy().to_bb();
                    }
                    break;
                } else if (w & b.occupied()).is_not_empty() {
                    break;
                }
                q = q + *d;
                i += 1;
            }
        }
        a
    }

    fn pawn_physical(&self, b: &Board, p: Vec4, c: Player, unmoved: bool) -> BitBoard {
        let z = p.xy().to_bb();
        let friendly = b.friendly(c);
        let hostile = b.hostile(c);
        let empty = !(friendly | hostile);
        if c == Player::White {
            let patt = pawn_attacks_from(p.xy(), Player::White);
            let mut a = (patt & hostile) | (z.shift_north() & empty);
            // en passant: a neighboring hostile pawn whose double-step origin
            // was still unmoved one time-step ago
            let r = (z.shift_west() | z.shift_east()) & hostile & b.lpawn();
            let s = r.shift_north().shift_north() & empty;
            if s.is_not_empty() {
                let back = Vec4::new(p.x(), p.y(), p.t() - 1, p.l());
                if self.inbound(back, c) {
                    let b1 = self.get_board(p.l(), p.t() - 1, c);
                    let j = s & b1.umove() & !friendly & b1.lpawn();
                    a |= j.shift_south();
                }
            }
            if unmoved {
                a |= (z.shift_north() & empty).shift_north() & empty;
            }
            a
        } else {
            let patt = pawn_attacks_from(p.xy(), Player::Black);
            let mut a = (patt & hostile) | (z.shift_south() & empty);
            let r = (z.shift_west() | z.shift_east()) & hostile & b.lpawn();
            let s = r.shift_south().shift_south() & empty;
            if s.is_not_empty() {
                let back = Vec4::new(p.x(), p.y(), p.t() - 1, p.l());
                if self.inbound(back, c) {
                    let b1 = self.get_board(p.l(), p.t() - 1, c);
                    let j = s & b1.umove() & !friendly & b1.lpawn();
                    a |= j.shift_north();
                }
            }
            if unmoved {
                a |= (z.shift_south() & empty).shift_south() & empty;
            }
            a
        }
    }

    /// Generates the super-physical moves of the piece at `p` on the board
    /// of color `c`, as `(destination board coordinate, target bitboard)`
    /// pairs. Entries with an empty bitboard are never produced.
    pub fn gen_superphysical_moves(&self, p: Vec4, c: Player) -> Vec<(Vec4, BitBoard)> {
        let b = self.get_board(p.l(), p.t(), c);
        let piece = b.piece_at(p.xy());
        let unmoved = (b.umove() & p.xy().to_bb()).is_not_empty();
        let z = p.xy().to_bb();
        let mut out: Vec<(Vec4, BitBoard)> = Vec::new();
        match piece.type_of() {
            PieceType::King | PieceType::CommonKing => {
                for d in BOTH_DTLS.iter() {
                    let q = p + *d;
                    if self.inbound(q, c) {
                        let b1 = self.get_board(q.l(), q.t(), c);
                        let bb = king_jump_moves(p.xy()) & !b1.friendly(c);
                        if bb.is_not_empty() {
                            out.push((q.tl(), bb));
                        }
                    }
                }
            }
            PieceType::Rook => {
                for (tl, bb) in self.gen_purely_sp_rook_moves(p, c) {
                    let bb1 = bb & z;
                    if bb1.is_not_empty() {
                        out.push((tl, bb1));
                    }
                }
            }
            PieceType::Bishop => {
                for (tl, bb) in self.gen_purely_sp_bishop_moves(p, c) {
                    let bb1 = bb & z;
                    if bb1.is_not_empty() {
                        out.push((tl, bb1));
                    }
                }
                let mut result = BTreeMap::new();
                self.gen_compound_moves(p, c, Axes::Orthogonal, Axes::Orthogonal, &mut result);
                out.extend(result);
            }
            PieceType::Princess => {
                let mut result = BTreeMap::new();
                for (tl, bb) in self.gen_purely_sp_rook_moves(p, c) {
                    let bb1 = bb & z;
                    if bb1.is_not_empty() {
                        *result.entry(tl).or_insert_with(BitBoard::default) |= bb1;
                    }
                }
                for (tl, bb) in self.gen_purely_sp_bishop_moves(p, c) {
                    let bb1 = bb & z;
                    if bb1.is_not_empty() {
                        *result.entry(tl).or_insert_with(BitBoard::default) |= bb1;
                    }
                }
                self.gen_compound_moves(p, c, Axes::Orthogonal, Axes::Orthogonal, &mut result);
                out.extend(result);
            }
            PieceType::Queen | PieceType::RoyalQueen => {
                let mut result = BTreeMap::new();
                for (tl, bb) in self.gen_purely_sp_rook_moves(p, c) {
                    let bb1 = bb & z;
                    if bb1.is_not_empty() {
                        *result.entry(tl).or_insert_with(BitBoard::default) |= bb1;
                    }
                }
                for (tl, bb) in self.gen_purely_sp_bishop_moves(p, c) {
                    let bb1 = bb & z;
                    if bb1.is_not_empty() {
                        *result.entry(tl).or_insert_with(BitBoard::default) |= bb1;
                    }
                }
                self.gen_compound_moves(p, c, Axes::Both, Axes::Both, &mut result);
                out.extend(result);
            }
            PieceType::Unicorn => {
                let mut r1 = BTreeMap::new();
                self.gen_compound_moves(p, c, Axes::Orthogonal, Axes::Diagonal, &mut r1);
                out.extend(r1);
                let mut r2 = BTreeMap::new();
                self.gen_compound_moves(p, c, Axes::Diagonal, Axes::Orthogonal, &mut r2);
                out.extend(r2);
            }
            PieceType::Dragon => {
                let mut result = BTreeMap::new();
                self.gen_compound_moves(p, c, Axes::Diagonal, Axes::Diagonal, &mut result);
                out.extend(result);
            }
            PieceType::Knight => {
                for (tl, bb) in self.gen_purely_sp_knight_moves(p, c) {
                    let bb1 = bb & z;
                    if bb1.is_not_empty() {
                        out.push((tl, bb1));
                    }
                }
                for d in ORTHOGONAL_DTLS.iter() {
                    let q = p + *d;
                    if self.inbound(q, c) {
                        let b1 = self.get_board(q.l(), q.t(), c);
                        let bb = knight_jump1_moves(p.xy()) & !b1.friendly(c);
                        if bb.is_not_empty() {
                            out.push((q.tl(), bb));
                        }
                    }
                }
                for d in DOUBLE_DTLS.iter() {
                    let q = p + *d;
                    if self.inbound(q, c) {
                        let b1 = self.get_board(q.l(), q.t(), c);
                        let bb = knight_jump2_moves(p.xy()) & !b1.friendly(c);
                        if bb.is_not_empty() {
                            out.push((q.tl(), bb));
                        }
                    }
                }
            }
            PieceType::Pawn | PieceType::Brawn => {
                let brawn = piece.type_of() == PieceType::Brawn;
                self.pawn_superphysical(p, c, brawn, unmoved, &mut out);
            }
            PieceType::None | PieceType::Wall => {
                debug_assert!(false, "gen_superphysical_moves on an immovable square");
            }
        }
        out
    }

    fn pawn_superphysical(
        &self,
        p: Vec4,
        c: Player,
        brawn: bool,
        unmoved: bool,
        out: &mut Vec<(Vec4, BitBoard)>,
    ) {
        let z = p.xy().to_bb();
        let white = c == Player::White;
        let dl = if white { -1 } else { 1 };
        let fwd_shift = |bb: BitBoard| {
            if white {
                bb.shift_north()
            } else {
                bb.shift_south()
            }
        };
        // captures onto the diagonal (t, l) boards, same square
        for dt in &[1, -1] {
            let q = p + Vec4::new(0, 0, *dt, dl);
            if self.inbound(q, c) {
                let b1 = self.get_board(q.l(), q.t(), c);
                let bb = z & b1.hostile(c);
                if bb.is_not_empty() {
                    out.push((q.tl(), bb));
                }
            }
        }
        // forward step one line over, double for the unmoved variant
        let q = p + Vec4::new(0, 0, 0, dl);
        if self.inbound(q, c) {
            let b1 = self.get_board(q.l(), q.t(), c);
            let mut bb = z & !b1.occupied();
            if bb.is_not_empty() && unmoved {
                let r = p + Vec4::new(0, 0, 0, 2 * dl);
                if self.inbound(r, c) {
                    let b2 = self.get_board(r.l(), r.t(), c);
                    let bc = z & !b2.occupied();
                    if bc.is_not_empty() {
                        out.push((r.tl(), bc));
                    }
                }
            }
            if brawn {
                // a brawn also captures on the forward-line board, at the
                // forward- and side-shifted squares
                bb |= (fwd_shift(z) | z.shift_west() | z.shift_east()) & b1.hostile(c);
            }
            if bb.is_not_empty() {
                out.push((q.tl(), bb));
            }
        }
        if brawn {
            // and on the board one time-step back, at the forward square
            let q = p + Vec4::new(0, 0, -1, 0);
            if self.inbound(q, c) {
                let b1 = self.get_board(q.l(), q.t(), c);
                let bd = fwd_shift(z) & b1.hostile(c);
                if bd.is_not_empty() {
                    out.push((q.tl(), bd));
                }
            }
        }
    }

    /// Walks the orthogonal (t,l) rays for the whole rook slider class of the
    /// source board at once; callers intersect with the square of the piece
    /// they care about.
    fn gen_purely_sp_rook_moves(&self, p0: Vec4, c: Player) -> Vec<(Vec4, BitBoard)> {
        let b0 = self.get_board(p0.l(), p0.t(), c);
        let lrook = b0.lrook() & b0.friendly(c);
        let mut result = Vec::new();
        for d in ORTHOGONAL_DTLS.iter() {
            let mut remaining = lrook;
            let mut p1 = p0 + *d;
            while remaining.is_not_empty() && self.inbound(p1, c) {
                let b1 = self.get_board(p1.l(), p1.t(), c);
                remaining &= !b1.friendly(c);
                if remaining.is_not_empty() {
                    result.push((p1.tl(), remaining));
                    remaining &= !b1.hostile(c);
                }
                p1 = p1 + *d;
            }
        }
        result
    }

    fn gen_purely_sp_bishop_moves(&self, p0: Vec4, c: Player) -> Vec<(Vec4, BitBoard)> {
        let b0 = self.get_board(p0.l(), p0.t(), c);
        let lbishop = b0.lbishop() & b0.friendly(c);
        let mut result = Vec::new();
        for d in DIAGONAL_DTLS.iter() {
            let mut remaining = lbishop;
            let mut p1 = p0 + *d;
            while remaining.is_not_empty() && self.inbound(p1, c) {
                let b1 = self.get_board(p1.l(), p1.t(), c);
                remaining &= !b1.friendly(c);
                if remaining.is_not_empty() {
                    result.push((p1.tl(), remaining));
                    remaining &= !b1.hostile(c);
                }
                p1 = p1 + *d;
            }
        }
        result
    }

    fn gen_purely_sp_knight_moves(&self, p0: Vec4, c: Player) -> Vec<(Vec4, BitBoard)> {
        const KNIGHT_SP_DELTAS: [Vec4; 8] = [
            Vec4::new(0, 0, 2, 1),
            Vec4::new(0, 0, 1, 2),
            Vec4::new(0, 0, -2, 1),
            Vec4::new(0, 0, 1, -2),
            Vec4::new(0, 0, 2, -1),
            Vec4::new(0, 0, -1, 2),
            Vec4::new(0, 0, -2, -1),
            Vec4::new(0, 0, -1, -2),
        ];
        let b0 = self.get_board(p0.l(), p0.t(), c);
        let lknight = b0.lknight() & b0.friendly(c);
        let mut result = Vec::new();
        for d in KNIGHT_SP_DELTAS.iter() {
            let p1 = p0 + *d;
            if self.inbound(p1, c) {
                let b1 = self.get_board(p1.l(), p1.t(), c);
                let remaining = lknight & !b1.friendly(c);
                if remaining.is_not_empty() {
                    result.push((p1.tl(), remaining));
                }
            }
        }
        result
    }

    fn gen_compound_moves(
        &self,
        p: Vec4,
        c: Player,
        tl: Axes,
        xy: Axes,
        result: &mut BTreeMap<Vec4, BitBoard>,
    ) {
        let pos = p.xy();
        let deltas: &[Vec4] = match tl {
            Axes::Orthogonal => &ORTHOGONAL_DTLS,
            Axes::Diagonal => &DIAGONAL_DTLS,
            Axes::Both => &BOTH_DTLS,
        };
        for d in deltas {
            let mut q = p;
            let mut occ = BitBoard(0);
            let mut fri = BitBoard(0);
            for n in 1..8 {
                let mask = copy_mask(xy, pos, n);
                q = q + *d;
                if self.inbound(q, c) {
                    let b = self.get_board(q.l(), q.t(), c);
                    occ |= mask & b.occupied();
                    fri |= mask & b.friendly(c);
                } else {
                    // a missing board reads as a wall of friendly pieces
                    occ |= mask;
                    fri |= mask;
                    break;
                }
            }
            let mut loc = !fri;
            loc &= match xy {
                Axes::Orthogonal => rook_moves(occ, pos),
                Axes::Diagonal => bishop_moves(occ, pos),
                Axes::Both => queen_moves(occ, pos),
            };
            let mut q = p;
            for n in 1..8 {
                let mask = copy_mask(xy, pos, n);
                q = q + *d;
                let bits = loc & mask;
                if bits.is_not_empty() {
                    *result.entry(q.tl()).or_insert_with(BitBoard::default) |= bits;
                } else {
                    break;
                }
            }
        }
    }

    /// Generates all moves of the piece at `p`: the physical entry first when
    /// non-empty, then the super-physical entries.
    pub fn gen_moves(&self, p: Vec4, c: Player) -> Vec<(Vec4, BitBoard)> {
        let mut out = Vec::new();
        let bb = self.gen_physical_moves(p, c);
        if bb.is_not_empty() {
            out.push((p.tl(), bb));
        }
        out.extend(self.gen_superphysical_moves(p, c));
        out
    }

    /// Flattens [`gen_moves`] into destination coordinates.
    ///
    /// [`gen_moves`]: #method.gen_moves
    pub fn gen_piece_move(&self, p: Vec4, board_color: Player) -> Vec<Vec4> {
        let mut out = Vec::new();
        for (tl, bb) in self.gen_moves(p, board_color) {
            for sq in bb {
                out.push(Vec4::from_sq(sq, tl));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multiverse::Variant;

    fn single(fen: &str, size: u8) -> Multiverse {
        Multiverse::new(
            &[(0, 1, Player::White, fen.to_string())],
            Variant::Odd,
            size,
            size,
        )
        .unwrap()
    }

    #[test]
    fn standard_opening_counts() {
        let m = single(
            "r*nbqk*bnr*/p*p*p*p*p*p*p*p*/8/8/8/8/P*P*P*P*P*P*P*P*/R*NBQK*BNR*",
            8,
        );
        let mut total = 0;
        for x in 0..8 {
            for y in 0..2 {
                let p = Vec4::new(x, y, 1, 0);
                total += m.gen_piece_move(p, Player::White).len();
            }
        }
        // 16 pawn moves + 4 knight moves, no super-physical moves at T1
        assert_eq!(total, 20);
    }

    #[test]
    fn unicorn_is_purely_superphysical() {
        let m = single("1u1uk*/5/5/5/K*U1U1", 5);
        let u = Vec4::new(1, 0, 1, 0);
        assert!(m.gen_physical_moves(u, Player::White).is_empty());
        // only one board exists, so there is nowhere to jump either
        assert!(m.gen_moves(u, Player::White).is_empty());
    }

    #[test]
    fn king_jump_targets_previous_board() {
        let fen = "k3/4/4/K3";
        let m = Multiverse::new(
            &[
                (0, 1, Player::White, fen.to_string()),
                (0, 1, Player::Black, fen.to_string()),
                (0, 2, Player::White, fen.to_string()),
            ],
            Variant::Odd,
            4,
            4,
        )
        .unwrap();
        let k = Vec4::new(0, 0, 2, 0);
        let sp = m.gen_superphysical_moves(k, Player::White);
        // the only reachable board is (t-1, l)
        assert_eq!(sp.len(), 1);
        assert_eq!(sp[0].0, Vec4::new(0, 0, 1, 0));
        let targets = sp[0].1;
        // the king's own past self blocks the pure time step
        assert!((targets & SQ::make(0, 0).to_bb()).is_empty());
        assert!((targets & SQ::make(1, 1).to_bb()).is_not_empty());
        assert!((targets & SQ::make(1, 0).to_bb()).is_not_empty());
    }

    #[test]
    fn compound_rejects_missing_boards() {
        // a lone queen with a single board cannot move super-physically
        let m = single("4/4/1Q2/K2k", 4);
        let q = Vec4::new(1, 1, 1, 0);
        assert!(m.gen_superphysical_moves(q, Player::White).is_empty());
    }
}
