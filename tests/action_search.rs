extern crate fived;

use fived::state::MateType;
use fived::{Action, ExtMove, FullMove, Player, State};

use std::collections::BTreeSet;

/// The number of new timelines an action of `s` would create.
fn branch_count(s: &State, mvs: &[FullMove]) -> usize {
    let player = s.player();
    mvs.iter()
        .filter(|fm| {
            fm.from.tl() != fm.to.tl() && (fm.to.t(), player) < s.get_timeline_end(fm.to.l())
        })
        .count()
}

#[test]
fn very_small_open_first_turn() {
    let s = State::from_variant("Very Small - Open").unwrap();
    let actions: Vec<Vec<FullMove>> = s.legal_actions().collect();
    // one mandatory line, no history to jump through: every action is a
    // single physical move, and the king's only step walks into the knight
    assert_eq!(actions.len(), 10);
    for action in &actions {
        assert_eq!(action.len(), 1);
        assert!(action[0].is_physical());
        let ext: Vec<ExtMove> = action.iter().map(|&fm| ExtMove::new(fm)).collect();
        let act = Action::from_moves(ext, &s);
        assert!(s.can_apply_action(&act).is_some());
    }
}

#[test]
fn enumeration_is_deterministic_and_exclusive() {
    let s = State::from_variant("Very Small - Open").unwrap();
    let first: Vec<Vec<FullMove>> = s.legal_actions().collect();
    let second: Vec<Vec<FullMove>> = s.legal_actions().collect();
    assert_eq!(first, second);
    let distinct: BTreeSet<Vec<FullMove>> = first.iter().cloned().collect();
    assert_eq!(distinct.len(), first.len());
}

#[test]
fn nonbranching_actions_come_first() {
    // three boards of history let the king jump back in time
    let fen = "[k3/4/4/K3:0:1:w][k3/4/4/K3:0:1:b][k3/4/4/K3:0:2:w]";
    let s = State::from_5dfen(fen, 4, 4).unwrap();
    let actions: Vec<Vec<FullMove>> = s.legal_actions().collect();
    assert_eq!(actions.len(), 6);
    let counts: Vec<usize> = actions.iter().map(|a| branch_count(&s, a)).collect();
    let mut sorted = counts.clone();
    sorted.sort_unstable();
    assert_eq!(counts, sorted, "branching actions surfaced too early");
    assert_eq!(counts.iter().filter(|&&c| c == 0).count(), 3);
    assert_eq!(counts.iter().filter(|&&c| c == 1).count(), 3);
}

#[test]
fn branching_action_is_replayable() {
    let fen = "[k3/4/4/K3:0:1:w][k3/4/4/K3:0:1:b][k3/4/4/K3:0:2:w]";
    let s = State::from_5dfen(fen, 4, 4).unwrap();
    for action in s.legal_actions() {
        let ext: Vec<ExtMove> = action.iter().map(|&fm| ExtMove::new(fm)).collect();
        let act = Action::from_moves(ext, &s);
        let next = s.can_apply_action(&act).expect("yielded action must replay");
        if branch_count(&s, &action) > 0 {
            assert_eq!(next.get_lines_range(), (0, 1));
            assert_eq!(next.get_present(), (1, Player::Black));
        }
    }
}

#[test]
fn just_unicorns_keeps_playing() {
    let mut s = State::from_5dfen("[1u1uk*/5/5/5/K*U1U1:0:1:w]", 5, 5).unwrap();
    assert_eq!(s.get_mate_type(), MateType::None);
    for ply in 0..10 {
        assert!(s.suggest_action(), "no legal action at ply {}", ply);
    }
}

#[test]
fn suggest_action_plays_a_full_turn() {
    let mut s = State::from_variant("Very Small - Open").unwrap();
    assert!(s.suggest_action());
    assert_eq!(s.player(), Player::Black);
    assert!(s.suggest_action());
    assert_eq!(s.player(), Player::White);
    assert_eq!(s.get_present().0, 2);
}

#[test]
fn fresh_standard_position_is_not_mate() {
    let s = State::from_variant("Standard").unwrap();
    assert_eq!(s.get_mate_type(), MateType::None);
}

#[test]
fn cornered_king_stalemates() {
    // a2, b1 and b2 are all covered by the queen on b3, and the king on a1
    // is not attacked
    let fen = "[7k/8/8/8/8/1q6/8/K7:0:1:w]";
    let s = State::from_5dfen(fen, 8, 8).unwrap();
    assert_eq!(s.get_mate_type(), MateType::Stalemate);
}

#[test]
fn back_rank_mate_is_checkmate() {
    // the rook delivers mate along the back rank, the king boxed in by its
    // own pawns
    let fen = "[7k/8/8/8/8/8/5PPP/r5K1:0:1:w]";
    let s = State::from_5dfen(fen, 8, 8).unwrap();
    assert_eq!(s.get_mate_type(), MateType::Checkmate);
}
