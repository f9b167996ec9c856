extern crate fived;

use fived::state::MateType;
use fived::{Player, State, Vec4};

fn play(s: &mut State, notation: &str) {
    let (fm, promo, candidates) = s.parse_move(notation);
    let fm = fm.unwrap_or_else(|| {
        panic!(
            "move {:?} did not resolve uniquely; candidates: {:?}",
            notation, candidates
        )
    });
    let promote_to = promo.unwrap_or(fived::PieceType::Queen);
    assert!(
        s.apply_move_promote(fm, promote_to),
        "move {:?} was rejected",
        notation
    );
}

fn turn(s: &mut State, moves: &[&str]) {
    for mv in moves {
        play(s, mv);
    }
    assert!(s.submit(), "cannot submit after {:?}", moves);
}

#[test]
fn submit_advances_and_flips() {
    let mut s = State::from_variant("Standard").unwrap();
    turn(&mut s, &["e3"]);
    assert_eq!(s.get_present(), (1, Player::Black));
    turn(&mut s, &["e6"]);
    assert_eq!(s.get_present(), (2, Player::White));
}

#[test]
fn scholars_mate_analog_branches_and_rolls_back() {
    let mut s = State::from_variant("Standard").unwrap();
    turn(&mut s, &["e3"]);
    turn(&mut s, &["Nf6"]);
    turn(&mut s, &["Bb5"]);
    turn(&mut s, &["c6"]);
    turn(&mut s, &["c3"]);
    turn(&mut s, &["cxb5"]);
    turn(&mut s, &["Qb3"]);
    turn(&mut s, &["Qa5"]);
    assert_eq!(s.get_present(), (5, Player::White));

    // the queen travels back four boards and captures f7 on T1
    let (fm, _, _) = s.parse_move("Q>>xf7+");
    let fm = fm.expect("the time-travel capture should resolve uniquely");
    assert_eq!(fm.from, Vec4::new(1, 2, 5, 0));
    assert_eq!(fm.to, Vec4::new(5, 6, 1, 0));
    assert!(s.apply_move(fm));

    // the jump created a timeline and activated a historical board
    assert_eq!(s.get_lines_range(), (0, 1));
    assert_eq!(s.get_active_range(), (0, 1));
    assert!(s.submit());
    assert_eq!(s.get_present(), (1, Player::Black));

    // black recaptures on the new timeline
    turn(&mut s, &["(1T1)Kxf7"]);
    assert_eq!(s.get_present(), (2, Player::White));
    assert_eq!(s.get_mate_type(), MateType::None);
}

#[test]
fn branching_jump_creates_a_timeline() {
    let mut s = State::from_variant("Standard").unwrap();
    turn(&mut s, &["Nf3"]);
    turn(&mut s, &["Nf6"]);
    // the source square of the jump must hold the piece now, not then
    assert!(!s.apply_move("(0T2)g1(0T1)g3".parse().unwrap()));
    // a knight's physical component one board back is two straight squares
    assert!(!s.apply_move("(0T2)f3(0T1)f4".parse().unwrap()));
    assert!(s.apply_move("(0T2)f3(0T1)f5".parse().unwrap()));
    assert_eq!(s.get_lines_range(), (0, 1));
    assert!(s.submit());
    assert_eq!(s.get_present(), (1, Player::Black));
}

#[test]
fn can_apply_leaves_the_state_alone() {
    let s = State::from_variant("Standard").unwrap();
    let e3 = "(0T1)e2e3".parse().unwrap();
    let next = s.can_apply(e3, fived::PieceType::Queen).unwrap();
    assert_eq!(s.get_present(), (1, Player::White));
    assert!(next.can_submit().is_some());
    assert!(s.can_submit().is_none());
    assert!(s
        .can_apply("(0T1)e2e5".parse().unwrap(), fived::PieceType::Queen)
        .is_none());
}

#[test]
fn promotion_defaults_to_queen() {
    let fen = "[k7/4P3/8/8/8/8/8/K7:0:1:w]";
    let mut s = State::from_5dfen(fen, 8, 8).unwrap();
    assert!(s.apply_move("(0T1)e7e8".parse().unwrap()));
    let b = s.get_board(0, 1, Player::Black);
    assert_eq!(
        b.piece_at(fived::SQ::make(4, 7)),
        fived::Piece::WhiteQueen
    );
}

#[test]
fn promotion_piece_is_honored() {
    let fen = "[k7/4P3/8/8/8/8/8/K7:0:1:w]";
    let mut s = State::from_5dfen(fen, 8, 8).unwrap();
    let (fm, promo, _) = s.parse_move("e8=N");
    assert_eq!(promo, Some(fived::PieceType::Knight));
    assert!(s.apply_move_promote(fm.unwrap(), promo.unwrap()));
    let b = s.get_board(0, 1, Player::Black);
    assert_eq!(
        b.piece_at(fived::SQ::make(4, 7)),
        fived::Piece::WhiteKnight
    );
}
