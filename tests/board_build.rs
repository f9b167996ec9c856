extern crate fived;

use fived::{Board, Piece, Player, State, SQ};

static STANDARD: &str = "r*nbqk*bnr*/p*p*p*p*p*p*p*p*/8/8/8/8/P*P*P*P*P*P*P*P*/R*NBQK*BNR*";

#[test]
fn standard_piece_counts() {
    let b = Board::from_fen(STANDARD, 8, 8).unwrap();
    for &player in &[Player::White, Player::Black] {
        assert_eq!(
            b.piece_bb(player, fived::PieceType::Pawn).count_bits(),
            8
        );
        assert_eq!(
            b.piece_bb(player, fived::PieceType::Knight).count_bits(),
            2
        );
        assert_eq!(
            b.piece_bb(player, fived::PieceType::Rook).count_bits(),
            2
        );
        assert_eq!(
            b.piece_bb(player, fived::PieceType::King).count_bits(),
            1
        );
    }
    assert_eq!(b.occupied().0, 0xFFFF_0000_0000_FFFF);
    assert_eq!(b.umove().count_bits(), 6 + 16);
}

#[test]
fn board_ops_return_new_values() {
    let b = Board::from_fen(STANDARD, 8, 8).unwrap();
    let snapshot = b.clone();
    let after = b
        .move_piece(SQ::make(4, 1), SQ::make(4, 3))
        .replace_piece(SQ::make(0, 3), Piece::BlackQueen);
    assert_eq!(b, snapshot);
    assert_eq!(after.piece_at(SQ::make(4, 3)), Piece::WhitePawn);
    assert_eq!(after.piece_at(SQ::make(0, 3)), Piece::BlackQueen);
    assert!(after.piece_at(SQ::make(4, 1)).is_none());
}

#[test]
fn fen_roundtrip_with_and_without_umove() {
    for fen in &[
        STANDARD,
        "nbrk/3p*/P*3/KRBN",
        "1u1uk*/5/5/5/K*U1U1",
        "4/1w2/2W1/4",
        "8/8/2z5/8/8/5Z2/8/8",
    ] {
        let size = match fen.split('/').count() {
            4 => 4,
            5 => 5,
            _ => 8,
        };
        let b = Board::from_fen(fen, size, size).unwrap();
        assert_eq!(b.get_fen_umove(), *fen);
        let again = Board::from_fen(&b.get_fen_umove(), size, size).unwrap();
        assert!(again == b);
    }
}

#[test]
fn state_5dfen_roundtrip() {
    let s = State::from_variant("Standard").unwrap();
    let fen = s.show_fen();
    assert!(fen.contains(":0:1:w]"));
    let rebuilt = State::from_5dfen(&fen, 8, 8).unwrap();
    assert_eq!(rebuilt.get_present(), s.get_present());
    assert_eq!(rebuilt.get_boards(), s.get_boards());
}

#[test]
fn bad_5dfen_is_an_error() {
    assert!(State::from_5dfen("", 8, 8).is_err());
    assert!(State::from_5dfen("[8/8/8/8/8/8/8/8:0:1]", 8, 8).is_err());
    assert!(State::from_5dfen("[8/8/8/8/8/8/8/8:0:1:x]", 8, 8).is_err());
    assert!(State::from_5dfen("[9/8/8/8/8/8/8/8:0:1:w]", 8, 8).is_err());
    // a timeline gap between 0 and 2
    let gap = "[k7/8/8/8/8/8/8/K7:0:1:w][k7/8/8/8/8/8/8/K7:2:1:w]";
    assert!(State::from_5dfen(gap, 8, 8).is_err());
}

#[test]
fn unknown_variant_is_an_error() {
    assert!(State::from_variant("Standard").is_ok());
    assert!(State::from_variant("Standard - Turn Zero").is_ok());
    assert!(State::from_variant("Very Small - Open").is_ok());
    assert!(State::from_variant("Gothic").is_err());
}
