extern crate fived;

use fived::{Player, State, Vec4};

#[test]
fn standard_opening_movable_pieces() {
    let s = State::from_variant("Standard").unwrap();
    let movable = s.gen_movable_pieces();
    // eight pawns and two knights
    assert_eq!(movable.len(), 10);
    let total: usize = movable.iter().map(|&p| s.gen_piece_move(p).len()).sum();
    assert_eq!(total, 20);
}

#[test]
fn castling_blocked_through_check() {
    // a black knight on h3 covers g1: no O-O, but O-O-O stays legal
    let fen = "[r*3k*2r*/8/8/8/8/7n/8/R*3K*2R*:0:1:w]";
    let s = State::from_5dfen(fen, 8, 8).unwrap();
    let king = Vec4::new(4, 0, 1, 0);
    let targets = s.gen_piece_move(king);
    assert!(!targets.contains(&Vec4::new(6, 0, 1, 0)));
    assert!(targets.contains(&Vec4::new(2, 0, 1, 0)));

    let (kingside, _, candidates) = s.parse_move("O-O");
    assert!(kingside.is_none());
    assert!(candidates.is_empty());
    let (queenside, _, _) = s.parse_move("O-O-O");
    let fm = queenside.unwrap();
    assert_eq!(fm.from, Vec4::new(4, 0, 1, 0));
    assert_eq!(fm.to, Vec4::new(2, 0, 1, 0));
}

#[test]
fn castling_needs_the_edge_rook_unmoved() {
    // same position but the a-rook has moved: no queenside castle either
    let fen = "[r*3k*2r*/8/8/8/8/7n/8/R3K*2R*:0:1:w]";
    let s = State::from_5dfen(fen, 8, 8).unwrap();
    let targets = s.gen_piece_move(Vec4::new(4, 0, 1, 0));
    assert!(!targets.contains(&Vec4::new(2, 0, 1, 0)));
    assert!(!targets.contains(&Vec4::new(6, 0, 1, 0)));
}

#[test]
fn en_passant_across_time() {
    let fen = "[4k3/3p*4/8/4P3/8/8/8/4K3:0:1:w]";
    let mut s = State::from_5dfen(fen, 8, 8).unwrap();
    assert!(s.apply_move("(0T1)e1d1".parse().unwrap()));
    assert!(s.submit());
    assert!(s.apply_move("(0T1)d7d5".parse().unwrap()));
    assert!(s.submit());

    // the capture consults the T1 board, where d7 still holds the unmoved pawn
    let pawn = Vec4::new(4, 4, 2, 0);
    let targets = s.gen_piece_move(pawn);
    assert!(targets.contains(&Vec4::new(3, 5, 2, 0)));

    let mut taken = s.clone();
    assert!(taken.apply_move("(0T2)e5d6".parse().unwrap()));
    let b = taken.get_board(0, 2, Player::Black);
    assert!(b.piece_at(fived::SQ::make(3, 4)).is_none());
    assert_eq!(
        b.piece_at(fived::SQ::make(3, 5)),
        fived::Piece::WhitePawn
    );

    // one full turn later the window is gone
    assert!(s.apply_move("(0T2)d1e1".parse().unwrap()));
    assert!(s.submit());
    assert!(s.apply_move("(0T2)e8d8".parse().unwrap()));
    assert!(s.submit());
    assert!(!s.apply_move("(0T3)e5d6".parse().unwrap()));
}

#[test]
fn superphysical_moves_need_existing_boards() {
    let s = State::from_variant("Standard").unwrap();
    // at the first half-turn nothing can jump anywhere
    for p in s.gen_movable_pieces() {
        for q in s.gen_piece_move(p) {
            assert_eq!(q.tl(), p.tl());
        }
    }
}

#[test]
fn knight_gains_time_jumps_with_history() {
    let mut s = State::from_variant("Standard").unwrap();
    for (white, black) in &[("Nf3", "Nf6"), ("Ng5", "Ng4")] {
        let (fm, _, _) = s.parse_move(white);
        assert!(s.apply_move(fm.unwrap()));
        assert!(s.submit());
        let (fm, _, _) = s.parse_move(black);
        assert!(s.apply_move(fm.unwrap()));
        assert!(s.submit());
    }
    // the g5 knight may now jump two boards back in time (onto T1)
    let knight = Vec4::new(6, 4, 3, 0);
    let jumps: Vec<Vec4> = s
        .gen_piece_move(knight)
        .into_iter()
        .filter(|q| q.tl() != knight.tl())
        .collect();
    assert!(jumps.iter().any(|q| q.t() == 1));
    // and one board back with a single physical step
    assert!(jumps.iter().any(|q| q.t() == 2));
}
