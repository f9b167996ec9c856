//! Axis construction and the search loop of the action enumerator.
//!
//! A turn is a choice of one semimove per axis. Axes `[0, new_axis)` are the
//! playable timelines; axes `[new_axis, dimension)` are the candidate new
//! timelines a branching jump may create. The search pops a hypercuboid off
//! the space, secures a point in it, and either yields the point as a legal
//! action or carves out the slice of combinations sharing its problem.

use super::geometry::{Hypercuboid, IndexSet, Point, SearchSpace, Slice};
use super::graph::Graph;
use crate::board::Board;
use crate::core::piece_move::FullMove;
use crate::core::vec4::Vec4;
use crate::core::{PieceType, Player};
use crate::state::State;

use std::collections::BTreeMap;
use std::sync::Arc;

/// Sentinel for an arriving semimove whose departing partner has not been
/// resolved (or was pruned).
const NO_PARTNER: usize = usize::max_value();

/// One atomic choice on an axis. Boards carried here are the boards that
/// result from performing the half of the move this semimove stands for.
#[derive(Clone)]
pub(crate) enum SemiMove {
    /// An intra-board move, with the resulting board.
    Physical { m: FullMove, b: Arc<Board> },
    /// The destination half of a jump; `idx` points at the matching
    /// departing semimove on the source axis.
    Arriving {
        m: FullMove,
        b: Arc<Board>,
        idx: usize,
    },
    /// The source half of a jump, with the source-emptied board.
    Departing { from: Vec4, b: Arc<Board> },
    /// No move played on this axis.
    Null { tl: Vec4 },
}

impl SemiMove {
    /// The `(t, l)` tag of the semimove: its source coordinates, or the
    /// arrival coordinates for an arriving semimove.
    fn tl(&self) -> (i32, i32) {
        let p = match self {
            SemiMove::Physical { m, .. } => m.from,
            SemiMove::Arriving { m, .. } => m.to,
            SemiMove::Departing { from, .. } => *from,
            SemiMove::Null { tl } => *tl,
        };
        (p.t(), p.l())
    }

    fn is_null(&self) -> bool {
        matches!(self, SemiMove::Null { .. })
    }

    /// The resulting board.
    ///
    /// # Panics
    ///
    /// Panics if the semimove is a null.
    fn board(&self) -> &Arc<Board> {
        match self {
            SemiMove::Physical { b, .. }
            | SemiMove::Arriving { b, .. }
            | SemiMove::Departing { b, .. } => b,
            SemiMove::Null { .. } => panic!("a null semimove carries no board"),
        }
    }
}

/// Tests whether a royal piece of color `c` is under attack on this single
/// board.
fn has_physical_check(b: &Board, c: Player) -> bool {
    let friendly = if c == Player::Black {
        b.black()
    } else {
        b.white()
    };
    for sq in b.royal() & friendly {
        if b.is_under_attack(sq, c).is_not_empty() {
            return true;
        }
    }
    false
}

/// In state `s`, finds the path a sliding check travels through and its
/// sliding class: 0 non-sliding, 1 rook, 2 bishop, 3 unicorn, 4 dragon.
/// The endpoints are excluded from the path.
fn get_move_path(s: &State, fm: FullMove, c: Player) -> (Vec<Vec4>, i32) {
    let p = fm.from;
    let q = fm.to;
    let b = s.get_board(p.l(), p.t(), c);
    if (b.sliding() & p.xy().to_bb()).is_not_empty() {
        let step = (q - p).signum();
        let sliding_type = step.dot(step);
        debug_assert!(p != q && sliding_type > 0 && sliding_type <= 4);
        let mut path = Vec::new();
        let mut r = p + step;
        while r != q {
            path.push(r);
            r = r + step;
        }
        (path, sliding_type)
    } else {
        (Vec::new(), 0)
    }
}

/// The immutable description of a turn's choice space, plus the state the
/// turn starts in (mutated in place, and restored, by the check analysis).
pub struct HcInfo {
    s: State,
    /// Timeline index → axis index, for playable and candidate new lines.
    line_to_axis: BTreeMap<i32, usize>,
    /// `axis_coords[n]` is the set of all semimoves on the n-th axis.
    axis_coords: Vec<Vec<SemiMove>>,
    new_axis: usize,
    dimension: usize,
    mandatory_lines: Vec<i32>,
}

impl HcInfo {
    /// Enumerates the pseudo-legal semimoves of every playable line, prunes
    /// the single-board check losers, allocates the axes and stratifies the
    /// initial search space by the number of branching axes in play.
    pub(crate) fn build(s: State) -> (HcInfo, SearchSpace) {
        debug_assert!(s.can_submit().is_none());
        let (mandatory_lines, optional_lines, _) = s.get_timeline_status();
        let playable: Vec<i32> = mandatory_lines
            .iter()
            .chain(optional_lines.iter())
            .copied()
            .collect();
        let (present_t, player) = s.get_present();

        // generate all moves, then split them into cases; departing moves
        // merge by source coordinate
        let mut arrives_to: BTreeMap<i32, Vec<FullMove>> = BTreeMap::new();
        let mut stays_on: BTreeMap<i32, Vec<FullMove>> = BTreeMap::new();
        let mut departs_from: BTreeMap<i32, Vec<Vec4>> = BTreeMap::new();
        let mut jump_indices: BTreeMap<Vec4, usize> = BTreeMap::new();

        for from in s.gen_movable_pieces() {
            let mut has_depart = false;
            for to in s.gen_piece_move(from) {
                let m = FullMove::new(from, to);
                if from.tl() != to.tl() {
                    if !has_depart {
                        departs_from.entry(from.l()).or_default().push(from);
                        has_depart = true;
                    }
                    arrives_to.entry(to.l()).or_default().push(m);
                } else {
                    stays_on.entry(from.l()).or_default().push(m);
                }
            }
        }

        let mut line_to_axis: BTreeMap<i32, usize> = BTreeMap::new();
        let mut axis_coords: Vec<Vec<SemiMove>> = Vec::new();

        for &l in &playable {
            let mut locs = vec![SemiMove::Null {
                tl: Vec4::new(0, 0, present_t, l),
            }];
            if let Some(moves) = stays_on.get(&l) {
                for &m in moves {
                    let nb = s.result_board_physical(m, PieceType::Queen);
                    if !has_physical_check(&nb, player) {
                        locs.push(SemiMove::Physical {
                            m,
                            b: Arc::new(nb),
                        });
                    }
                }
            }
            if let Some(froms) = departs_from.get(&l) {
                for &p in froms {
                    debug_assert!(!jump_indices.contains_key(&p));
                    let nb = s
                        .get_board(p.l(), p.t(), player)
                        .replace_piece(p.xy(), crate::core::Piece::None);
                    if !has_physical_check(&nb, player) {
                        jump_indices.insert(p, locs.len());
                        locs.push(SemiMove::Departing {
                            from: p,
                            b: Arc::new(nb),
                        });
                    }
                }
            }
            if let Some(arrives) = arrives_to.get(&l) {
                for &m in arrives {
                    // only the arrivals landing on the tail of their line can
                    // avoid branching
                    let (last_t, last_c) = s.get_timeline_end(m.to.l());
                    if m.to.t() == last_t && player == last_c {
                        let pic = s.get_piece(m.from, player);
                        let cb = s.get_board(m.to.l(), m.to.t(), player);
                        let nb = cb.replace_piece(m.to.xy(), pic);
                        if !has_physical_check(&nb, player) {
                            locs.push(SemiMove::Arriving {
                                m,
                                b: Arc::new(nb),
                                idx: NO_PARTNER,
                            });
                        }
                    }
                }
            }
            line_to_axis.insert(l, axis_coords.len());
            axis_coords.push(locs);
        }
        let new_axis = axis_coords.len();

        // one branching axis per line that can lose a piece
        let max_branch = departs_from.values().filter(|v| !v.is_empty()).count();
        let new_l = s.new_line();
        let mut branch_locs = vec![SemiMove::Null {
            tl: Vec4::new(0, 0, present_t, new_l),
        }];
        for arrives in arrives_to.values() {
            for &m in arrives {
                if let Some(&idx) = jump_indices.get(&m.from) {
                    let pic = s.get_piece(m.from, player);
                    let cb = s.get_board(m.to.l(), m.to.t(), player);
                    let nb = cb.replace_piece(m.to.xy(), pic);
                    if !has_physical_check(&nb, player) {
                        branch_locs.push(SemiMove::Arriving {
                            m,
                            b: Arc::new(nb),
                            idx,
                        });
                    }
                }
            }
        }
        let sign = if player == Player::Black { -1 } else { 1 };
        for i in 0..max_branch {
            debug_assert!(!line_to_axis.contains_key(&(new_l + sign * i as i32)));
            line_to_axis.insert(new_l + sign * i as i32, new_axis + i);
            axis_coords.push(branch_locs.clone());
        }
        let dimension = axis_coords.len();

        let mut universe = Hypercuboid {
            axes: axis_coords.iter().map(|a| IndexSet::full(a.len())).collect(),
        };

        // resolve the departing partner of every arriving semimove; arrivals
        // whose partner was pruned are ghosts and leave the universe
        for n in 0..dimension {
            for i in 0..axis_coords[n].len() {
                let from = match &axis_coords[n][i] {
                    SemiMove::Arriving { m, .. } => Some(m.from),
                    _ => None,
                };
                if let Some(from) = from {
                    match jump_indices.get(&from) {
                        Some(&j) => {
                            if let SemiMove::Arriving { idx, .. } = &mut axis_coords[n][i] {
                                *idx = j;
                            }
                        }
                        None => {
                            universe.axes[n].remove(i);
                        }
                    }
                }
            }
        }

        let branch_len = axis_coords.get(new_axis).map_or(0, Vec::len);
        let info = HcInfo {
            s,
            line_to_axis,
            axis_coords,
            new_axis,
            dimension,
            mandatory_lines,
        };

        // stratify by the number of branches so that solutions with fewer
        // branches are discovered first (the space pops from the back)
        let mut hc = universe;
        let singleton = IndexSet::singleton(0);
        let mut non_null = IndexSet::new();
        if info.new_axis < info.dimension {
            for i in 1..branch_len {
                non_null.insert(i);
            }
            for n in info.new_axis..info.dimension {
                hc.axes[n] = singleton.clone();
            }
        }
        let mut space: SearchSpace = vec![hc.clone()];
        for n in info.new_axis..info.dimension {
            hc.axes[n] = non_null.clone();
            space.insert(0, hc.clone());
        }
        (info, space)
    }

    /// Secures a point of `hc`: defaults to non-jump semimoves, matches the
    /// axes that have none through the jump graph. Arriving semimoves whose
    /// departing partner left the hypercuboid are pruned in place (the only
    /// mutation of `hc`).
    fn take_point(&self, hc: &mut Hypercuboid) -> Option<Point> {
        let mut g = Graph::new(self.dimension);
        let mut must_include: Vec<usize> = Vec::new();
        let mut edge_refs: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        let mut result: Point = vec![usize::max_value(); self.dimension];
        for n in 0..self.dimension {
            let mut has_nonjump = false;
            let mut ghosts: Vec<usize> = Vec::new();
            for i in hc.axes[n].iter() {
                match &self.axis_coords[n][i] {
                    SemiMove::Physical { .. } | SemiMove::Null { .. } => {
                        if !has_nonjump {
                            has_nonjump = true;
                            result[n] = i;
                        }
                    }
                    SemiMove::Arriving { m, idx, .. } => {
                        let from_axis = self.line_to_axis[&m.from.l()];
                        if *idx == NO_PARTNER || !hc.axes[from_axis].contains(*idx) {
                            ghosts.push(i);
                            continue;
                        }
                        if !edge_refs.contains_key(&(from_axis, n)) {
                            g.add_edge(from_axis, n);
                            edge_refs.insert((from_axis, n), *idx);
                            edge_refs.insert((n, from_axis), i);
                        }
                    }
                    SemiMove::Departing { .. } => {}
                }
            }
            for i in ghosts {
                hc.axes[n].remove(i);
            }
            if hc.axes[n].is_empty() {
                // nothing left on this axis after the prune
                return None;
            }
            if !has_nonjump {
                must_include.push(n);
            }
        }
        let matching = g.find_matching(&must_include)?;
        for (u, v) in matching {
            result[u] = edge_refs[&(u, v)];
            result[v] = edge_refs[&(v, u)];
        }
        debug_assert!(result.iter().all(|&i| i != usize::max_value()));
        debug_assert!(hc.contains(&result));
        Some(result)
    }

    fn find_problem(&mut self, p: &Point, hc: &Hypercuboid) -> Option<Slice> {
        if let Some(slice) = self.jump_order_consistent(p, hc) {
            return Some(slice);
        }
        if let Some(slice) = self.test_present(p, hc) {
            return Some(slice);
        }
        self.find_checks_slice(p, hc)
    }

    /// Rejects points whose branching jumps are redundant or ambiguous.
    fn jump_order_consistent(&self, p: &Point, hc: &Hypercuboid) -> Option<Slice> {
        // jump_map: destination (t,l) of each branch played so far → its axis
        let mut jump_map: BTreeMap<Vec4, usize> = BTreeMap::new();
        let (_t, c) = self.s.get_present();
        for n in self.new_axis..self.dimension {
            let loc = &self.axis_coords[n][p[n]];
            let (m_from, m_to) = match loc {
                SemiMove::Null { .. } => break,
                SemiMove::Arriving { m, .. } => (m.from, m.to),
                _ => unreachable!("branching axes hold only arrivals and nulls"),
            };
            /* case one: this branch jumps onto the tail of a playable line
            that itself plays a pass; the jump should have been played as the
            non-branching arrival instead */
            if let Some(&maxis) = self.line_to_axis.get(&m_to.l()) {
                if maxis < self.new_axis {
                    let im = p[maxis];
                    if self.axis_coords[maxis][im].is_null()
                        && self.s.get_timeline_end(m_to.l()) == (m_to.t(), c)
                    {
                        let mut set = IndexSet::new();
                        for i in hc.axes[n].iter() {
                            if let SemiMove::Arriving { m: m3, .. } = &self.axis_coords[n][i] {
                                if m3.to.tl() == m_to.tl() {
                                    set.insert(i);
                                }
                            }
                        }
                        let mut problem = Slice::default();
                        problem.insert_constraint(n, set);
                        problem.insert_constraint(maxis, IndexSet::singleton(im));
                        debug_assert!(problem.contains(p));
                        return Some(problem);
                    }
                }
            }
            /* case two: this branch departs from a board another branch of
            this same point arrived at; the two orderings describe the same
            position */
            let critical = m_from.tl();
            if let Some(&axis_branch) = jump_map.get(&critical) {
                let mut s1 = IndexSet::new();
                for i in hc.axes[n].iter() {
                    if let SemiMove::Arriving { m: m1, .. } = &self.axis_coords[n][i] {
                        if m1.from.tl() == critical {
                            s1.insert(i);
                        }
                    }
                }
                let mut s2 = IndexSet::new();
                for i in hc.axes[axis_branch].iter() {
                    if let SemiMove::Arriving { m: m2, .. } = &self.axis_coords[axis_branch][i] {
                        if m2.to.tl() == critical {
                            s2.insert(i);
                        }
                    }
                }
                let mut problem = Slice::default();
                problem.insert_constraint(n, s1);
                problem.insert_constraint(axis_branch, s2);
                debug_assert!(problem.contains(p));
                return Some(problem);
            }
            jump_map.insert(m_to.tl(), n);
        }
        None
    }

    /// Simulates the present advancement of the point and rejects it when an
    /// active mandatory line is left unplayed.
    fn test_present(&self, p: &Point, hc: &Hypercuboid) -> Option<Slice> {
        let (old_present, c) = self.s.get_present();
        let (l0_min, l0_max) = self.s.get_initial_lines_range();
        let (l_min, l_max) = self.s.get_lines_range();
        let (mut l1_min, mut l1_max) = (l_min, l_max);
        let (mut active_min, mut active_max) = self.s.get_active_range();
        // mint is the present the point would produce
        let mut mint = old_present;
        let mut pass_coord: Option<(usize, usize)> = None;
        let mut reactivate_move_axis: Option<usize> = None;
        for &l in &self.mandatory_lines {
            let n = self.line_to_axis[&l];
            if self.axis_coords[n][p[n]].is_null() {
                pass_coord = Some((n, p[n]));
            }
        }
        for n in self.new_axis..self.dimension {
            let loc = &self.axis_coords[n][p[n]];
            if loc.is_null() {
                // the space is stratified: nulls only trail
                break;
            }
            let mut reactivated: Option<i32> = None;
            let l_new = if c == Player::White {
                l1_max += 1;
                l1_max
            } else {
                l1_min -= 1;
                l1_min
            };
            let whites_lines = l1_max - l0_max;
            let blacks_lines = l0_min - l1_min;
            if l_new > l0_max && whites_lines <= blacks_lines + 1 && l_new > active_max {
                active_max += 1;
                if l1_min < active_min {
                    active_min -= 1;
                    reactivated = Some(active_min);
                }
            } else if l_new < l0_min && blacks_lines <= whites_lines + 1 && l_new < active_min {
                active_min -= 1;
                if l1_max > active_max {
                    active_max += 1;
                    reactivated = Some(active_max);
                }
            }
            let (t, _l) = loc.tl();
            if t < mint && active_min <= l_new && l_new <= active_max {
                // jumping backward moves the present before the passes
                mint = t;
                pass_coord = None;
                reactivate_move_axis = None;
            }
            if let Some(r) = reactivated {
                let (newline_t, newline_c) = self.s.get_timeline_end(r);
                if newline_t < mint && newline_c == c {
                    mint = newline_t;
                    let n1 = self.line_to_axis[&r];
                    if self.axis_coords[n1][p[n1]].is_null() {
                        pass_coord = Some((n1, p[n1]));
                        reactivate_move_axis = Some(n);
                    }
                }
            }
        }
        let (pass_n, pass_i) = pass_coord?;
        let mut problem = Slice::default();
        problem.insert_constraint(pass_n, IndexSet::singleton(pass_i));
        /* on the branching axes inside the timeline-advantage window, ban
        every semimove that is a pass or arrives no earlier than the present
        the point produced */
        let whites_lines = l_max - l0_max;
        let blacks_lines = l0_min - l_min;
        let advantage = if c == Player::Black {
            whites_lines - blacks_lines
        } else {
            blacks_lines - whites_lines
        };
        let hi = (advantage + self.new_axis as i32).min(self.dimension as i32 - 1);
        let mut n = self.new_axis as i32;
        while n <= hi {
            let axis = n as usize;
            if reactivate_move_axis == Some(axis) {
                n += 1;
                continue;
            }
            let mut set = IndexSet::new();
            for i in hc.axes[axis].iter() {
                match &self.axis_coords[axis][i] {
                    SemiMove::Null { .. } => {
                        set.insert(i);
                    }
                    SemiMove::Arriving { m, .. } => {
                        if m.to.t() >= mint {
                            set.insert(i);
                        }
                    }
                    _ => {}
                }
            }
            problem.insert_constraint(axis, set);
            n += 1;
        }
        debug_assert!(problem.contains(p));
        Some(problem)
    }

    /// Applies the point in place, submits, and asks whether the opponent can
    /// capture a royal piece. If so, builds the slice of combinations that
    /// keep that check alive, then undoes everything in reverse.
    fn find_checks_slice(&mut self, p: &Point, hc: &Hypercuboid) -> Option<Slice> {
        let (_t, c) = self.s.get_present();
        let mvs = self.to_action(p);
        let mut logs = Vec::with_capacity(mvs.len());
        for &mv in &mvs {
            logs.push(self.s.apply_move_logged(mv, PieceType::Queen));
        }
        let record = self.s.submit_with_record();
        let check = self.s.find_check_first(!c);
        let result = check.map(|check| self.build_check_slice(p, hc, check, c));
        self.s.undo_submit(record);
        for log in logs.into_iter().rev() {
            self.s.undo_move_log(log);
        }
        result
    }

    fn build_check_slice(
        &self,
        p: &Point,
        hc: &Hypercuboid,
        check: FullMove,
        c: Player,
    ) -> Slice {
        debug_assert!(
            check.from.tl() != check.to.tl(),
            "physical checks were pruned at axis construction"
        );
        // after our submit, the boards this turn created sit one half-turn
        // after the semimoves' source tags
        let is_next = |t1: i32, t2: i32| {
            if c == Player::Black {
                t1 + 1 == t2
            } else {
                t1 == t2
            }
        };
        let checker_side = |b: &Board| {
            if c == Player::Black {
                b.white()
            } else {
                b.black()
            }
        };
        let mover_side = |b: &Board| {
            if c == Player::Black {
                b.black()
            } else {
                b.white()
            }
        };
        let slider_class = |b: &Board, sliding_type: i32| match sliding_type {
            1 => b.lrook(),
            2 => b.lbishop(),
            3 => b.lunicorn(),
            4 => b.ldragon(),
            _ => unreachable!("wrong sliding type inferred"),
        };
        let (path, sliding_type) = get_move_path(&self.s, check, !c);
        let mut problem = Slice::default();
        /* family one, the checker's source axis: ban every semimove that
        leaves the checking piece (or a hostile slider of its class) standing
        on its source square */
        if let Some(&n1) = self.line_to_axis.get(&check.from.l()) {
            let mut not_taking = IndexSet::new();
            for i in hc.axes[n1].iter() {
                let loc = &self.axis_coords[n1][i];
                if loc.is_null() || !is_next(loc.tl().0, check.from.t()) {
                    continue;
                }
                let nb = loc.board();
                if sliding_type != 0 {
                    let bb = checker_side(nb) & slider_class(nb, sliding_type);
                    if (check.from.xy().to_bb() & bb).is_not_empty() {
                        not_taking.insert(i);
                    }
                } else if nb.piece_at(check.from.xy()) == self.s.get_piece(check.from, !c) {
                    not_taking.insert(i);
                }
            }
            problem.insert_constraint(n1, not_taking);
        }
        /* family two, the checker's target axis: if the point placed a board
        at the target time, ban every semimove that leaves a friendly royal on
        the target square; otherwise the target board is history and every
        semimove of the axis keeps the check */
        if let Some(&n2) = self.line_to_axis.get(&check.to.l()) {
            let loc0 = &self.axis_coords[n2][p[n2]];
            if !loc0.is_null() && is_next(loc0.tl().0, check.to.t()) {
                let mut expose_royal = IndexSet::new();
                for i in hc.axes[n2].iter() {
                    let loc = &self.axis_coords[n2][i];
                    if loc.is_null() || !is_next(loc.tl().0, check.to.t()) {
                        continue;
                    }
                    let nb = loc.board();
                    if (check.to.xy().to_bb() & nb.royal() & mover_side(nb)).is_not_empty() {
                        expose_royal.insert(i);
                    }
                }
                problem.insert_constraint(n2, expose_royal);
            }
        }
        /* family three, the crossed squares of a sliding check: on each axis
        whose selected semimove placed a board on the path, ban the semimoves
        that fail to block the crossed square */
        for crossed in path {
            if let Some(&n) = self.line_to_axis.get(&crossed.l()) {
                let loc0 = &self.axis_coords[n][p[n]];
                if loc0.is_null() || !is_next(loc0.tl().0, crossed.t()) {
                    continue;
                }
                let z = crossed.xy().to_bb();
                let mut not_blocking = IndexSet::new();
                for i in hc.axes[n].iter() {
                    let loc = &self.axis_coords[n][i];
                    if loc.is_null() || !is_next(loc.tl().0, crossed.t()) {
                        continue;
                    }
                    let nb = loc.board();
                    if (z & nb.occupied()).is_empty() {
                        not_blocking.insert(i);
                        continue;
                    }
                    if sliding_type != 0 {
                        let bb = checker_side(nb) & slider_class(nb, sliding_type);
                        if (z & bb).is_not_empty() {
                            // a same-class hostile slider continues the ray
                            not_blocking.insert(i);
                            continue;
                        }
                    }
                    if (z & nb.royal() & mover_side(nb)).is_not_empty() {
                        // a friendly royal cannot block
                        not_blocking.insert(i);
                    }
                }
                problem.insert_constraint(n, not_blocking);
            }
        }
        debug_assert!(problem.contains(p));
        problem
    }

    /// Collects the point's moves in application order: ascending timeline,
    /// reversed for Black so branching jumps land on consecutive new lines.
    fn to_action(&self, p: &Point) -> Vec<FullMove> {
        let mut mvs = Vec::new();
        for &n in self.line_to_axis.values() {
            match &self.axis_coords[n][p[n]] {
                SemiMove::Physical { m, .. } | SemiMove::Arriving { m, .. } => mvs.push(*m),
                _ => {}
            }
        }
        if self.s.player() == Player::Black {
            mvs.reverse();
        }
        mvs
    }
}

/// The lazy enumerator of legal actions.
///
/// Each call to [`next`] resumes the search loop until another legal action
/// is secured or the space runs dry. Every legal action is yielded exactly
/// once; within one enumeration, actions introducing fewer new timelines
/// come first. Dropping the iterator abandons the search.
///
/// [`next`]: #method.next
pub struct ActionSearch {
    info: HcInfo,
    space: SearchSpace,
}

impl ActionSearch {
    pub(crate) fn new(info: HcInfo, space: SearchSpace) -> ActionSearch {
        ActionSearch { info, space }
    }

    pub(crate) fn into_info(self) -> HcInfo {
        self.info
    }
}

impl Iterator for ActionSearch {
    type Item = Vec<FullMove>;

    fn next(&mut self) -> Option<Vec<FullMove>> {
        while let Some(mut hc) = self.space.pop() {
            let point = match self.info.take_point(&mut hc) {
                Some(point) => point,
                None => continue,
            };
            match self.info.find_problem(&point, &hc) {
                Some(problem) => {
                    self.space.extend(hc.remove_slice(&problem));
                }
                None => {
                    let action = self.info.to_action(&point);
                    self.space.extend(hc.remove_point(&point));
                    return Some(action);
                }
            }
        }
        None
    }
}
