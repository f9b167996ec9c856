extern crate fived;

use fived::state::notation::ShowFlags;
use fived::{FullMove, PieceType, State, Vec4};

#[test]
fn generated_moves_roundtrip_uniquely() {
    let s = State::from_variant("Standard").unwrap();
    for p in s.gen_movable_pieces() {
        for q in s.gen_piece_move(p) {
            let fm = FullMove::new(p, q);
            let long = s.pretty_move(fm, PieceType::Queen, ShowFlags::long_form());
            let (parsed, _, candidates) = s.parse_move(&long);
            assert_eq!(parsed, Some(fm), "long form {:?} did not round-trip", long);
            assert_eq!(candidates.len(), 1);
        }
    }
}

#[test]
fn short_forms_resolve() {
    let s = State::from_variant("Standard").unwrap();
    let (fm, _, _) = s.parse_move("e4");
    assert_eq!(
        fm,
        Some(FullMove::new(Vec4::new(4, 1, 1, 0), Vec4::new(4, 3, 1, 0)))
    );
    let (fm, _, _) = s.parse_move("Nf3");
    assert_eq!(
        fm,
        Some(FullMove::new(Vec4::new(6, 0, 1, 0), Vec4::new(5, 2, 1, 0)))
    );
    // "c3" is ambiguous between the pawn and the knight; the unique pawn
    // move wins
    let (fm, _, candidates) = s.parse_move("c3");
    assert_eq!(candidates.len(), 2);
    assert_eq!(
        fm,
        Some(FullMove::new(Vec4::new(2, 1, 1, 0), Vec4::new(2, 2, 1, 0)))
    );
}

#[test]
fn ambiguous_piece_moves_return_candidates() {
    // two rooks on the first rank both reach e1
    let fen = "[4k3/8/8/8/8/8/K7/R6R:0:1:w]";
    let s = State::from_5dfen(fen, 8, 8).unwrap();
    let (fm, _, candidates) = s.parse_move("Re1");
    assert!(fm.is_none());
    assert_eq!(candidates.len(), 2);
    // file disambiguation picks one
    let (fm, _, _) = s.parse_move("Rae1");
    assert_eq!(
        fm,
        Some(FullMove::new(Vec4::new(0, 0, 1, 0), Vec4::new(4, 0, 1, 0)))
    );
    let (fm, _, _) = s.parse_move("Rhe1");
    assert_eq!(
        fm,
        Some(FullMove::new(Vec4::new(7, 0, 1, 0), Vec4::new(4, 0, 1, 0)))
    );
}

#[test]
fn jump_indicator_renders_by_tail() {
    let mut s = State::from_variant("Standard").unwrap();
    for mv in &["Nf3", "Nf6", "Ng5", "Ng4"] {
        let (fm, _, _) = s.parse_move(mv);
        assert!(s.apply_move(fm.unwrap()));
        assert!(s.submit());
    }
    // a knight jump into the past is branching and renders with ">>"
    let fm = FullMove::new(Vec4::new(6, 4, 3, 0), Vec4::new(6, 2, 2, 0));
    let long = s.pretty_move(fm, PieceType::Queen, ShowFlags::long_form());
    assert_eq!(long, "(0T3)Ng5>>(0T2)g3");
    let (parsed, _, _) = s.parse_move(&long);
    assert_eq!(parsed, Some(fm));
    // the short spelling without the source square also resolves
    let (parsed, _, _) = s.parse_move("N>>(0T2)g3");
    assert_eq!(parsed, Some(fm));
}

#[test]
fn relative_destination_renders() {
    let mut s = State::from_variant("Standard").unwrap();
    for mv in &["Nf3", "Nf6", "Ng5", "Ng4"] {
        let (fm, _, _) = s.parse_move(mv);
        assert!(s.apply_move(fm.unwrap()));
        assert!(s.submit());
    }
    let fm = FullMove::new(Vec4::new(6, 4, 3, 0), Vec4::new(6, 2, 2, 0));
    let rel = s.pretty_move(
        fm,
        PieceType::Queen,
        ShowFlags::long_form() | ShowFlags::RELATIVE,
    );
    assert_eq!(rel, "(0T3)Ng5>>$(L=T-1)g3");
}
