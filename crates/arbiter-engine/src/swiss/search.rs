//! Bracket search for the Dutch system.
//!
//! Players are addressed by their index in the pairing pool, which is sorted
//! by score (descending) and initial rank, so a smaller index always means a
//! higher standing. Score groups are contiguous index ranges.
//!
//! Each bracket (incoming floaters plus one score group) lazily enumerates
//! its candidates: fewest floaters first, lowest-ranked players floating
//! first; then exchanges between S1 and S2; then transpositions of S2 in
//! lexicographic order. The cascade over brackets runs on an explicit stack
//! and remembers every bracket state that could not be completed.

use std::collections::BTreeSet;

/// Whether two players may meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fit {
    Legal,
    /// Legal only by spending the repeat budget.
    Repeat,
    Illegal,
}

/// Pairwise fitness of every pool member.
pub(crate) struct PairTable {
    fit: Vec<Vec<Fit>>,
}

impl PairTable {
    pub(crate) fn new(n: usize, fit: impl Fn(usize, usize) -> Fit) -> Self {
        let fit = (0..n)
            .map(|a| (0..n).map(|b| if a == b { Fit::Illegal } else { fit(a, b) }).collect())
            .collect();
        PairTable { fit }
    }

    fn get(&self, a: usize, b: usize) -> Fit {
        self.fit[a][b]
    }
}

/// k-element subsets of `0..n` in lexicographic order.
pub(crate) struct Combinations {
    n: usize,
    idx: Vec<usize>,
    started: bool,
    done: bool,
}

impl Combinations {
    pub(crate) fn new(n: usize, k: usize) -> Self {
        Combinations {
            n,
            idx: (0..k).collect(),
            started: false,
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.idx.clone());
        }

        let k = self.idx.len();
        let mut i = k;
        loop {
            if i == 0 {
                self.done = true;
                return None;
            }
            i -= 1;
            if self.idx[i] < self.n - k + i {
                break;
            }
        }
        self.idx[i] += 1;
        for j in i + 1..k {
            self.idx[j] = self.idx[j - 1] + 1;
        }
        Some(self.idx.clone())
    }
}

/// Perfect matchings of S1 onto S2, transpositions of S2 in lexicographic
/// order. The untransposed matching S1[i] - S2[i] comes first.
pub(crate) struct MatchingIter<'t> {
    s1: Vec<usize>,
    s2: Vec<usize>,
    table: &'t PairTable,
    budget: u32,
    /// Position in `s2` chosen at each depth, and whether it was a repeat.
    chosen: Vec<(usize, bool)>,
    used: Vec<bool>,
    repeats: u32,
    next_from: usize,
    started: bool,
    exhausted: bool,
}

impl<'t> MatchingIter<'t> {
    pub(crate) fn new(s1: Vec<usize>, s2: Vec<usize>, table: &'t PairTable, budget: u32) -> Self {
        let used = vec![false; s2.len()];
        MatchingIter {
            exhausted: s1.len() != s2.len(),
            s1,
            s2,
            table,
            budget,
            chosen: Vec::new(),
            used,
            repeats: 0,
            next_from: 0,
            started: false,
        }
    }

    /// Undoes the deepest choice so the search resumes after it.
    fn backtrack(&mut self) -> bool {
        match self.chosen.pop() {
            None => false,
            Some((j, repeat)) => {
                self.used[j] = false;
                if repeat {
                    self.repeats -= 1;
                }
                self.next_from = j + 1;
                true
            }
        }
    }
}

impl Iterator for MatchingIter<'_> {
    /// The pairs and the number of repeats they spend.
    type Item = (Vec<(usize, usize)>, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        if self.started && !self.backtrack() {
            self.exhausted = true;
            return None;
        }
        self.started = true;

        loop {
            let depth = self.chosen.len();
            if depth == self.s1.len() {
                let pairs = self
                    .chosen
                    .iter()
                    .zip(&self.s1)
                    .map(|(&(j, _), &a)| (a, self.s2[j]))
                    .collect();
                return Some((pairs, self.repeats));
            }

            let a = self.s1[depth];
            let found = (self.next_from..self.s2.len())
                .filter(|&j| !self.used[j])
                .find_map(|j| match self.table.get(a, self.s2[j]) {
                    Fit::Legal => Some((j, false)),
                    Fit::Repeat if self.repeats < self.budget => Some((j, true)),
                    _ => None,
                });

            match found {
                Some((j, repeat)) => {
                    self.used[j] = true;
                    if repeat {
                        self.repeats += 1;
                    }
                    self.chosen.push((j, repeat));
                    self.next_from = 0;
                }
                None => {
                    if !self.backtrack() {
                        self.exhausted = true;
                        return None;
                    }
                }
            }
        }
    }
}

/// S1/S2 splits of one bracket, the plain split first, then single
/// exchanges by increasing rank distance, then larger exchanges.
pub(crate) struct Exchanges {
    s1: Vec<usize>,
    s2: Vec<usize>,
    k: usize,
    singles: Vec<(usize, usize)>,
    single_pos: usize,
    outer: Option<Combinations>,
    c1: Vec<usize>,
    inner: Option<Combinations>,
}

impl Exchanges {
    /// Splits `members` (sorted, even length) into halves.
    pub(crate) fn new(members: &[usize]) -> Self {
        let m = members.len() / 2;
        let mut singles: Vec<(usize, usize)> =
            (0..m).flat_map(|i| (0..m).map(move |j| (i, j))).collect();
        // Ties go to the lowest S1 player.
        singles.sort_by_key(|&(i, j)| ((m - 1 - i) + j, m - 1 - i));
        Exchanges {
            s1: members[..m].to_vec(),
            s2: members[m..].to_vec(),
            k: 0,
            singles,
            single_pos: 0,
            outer: None,
            c1: Vec::new(),
            inner: None,
        }
    }

    /// Swaps S1 positions `from_s1` with S2 positions `from_s2`.
    fn swap(&self, from_s1: &[usize], from_s2: &[usize]) -> (Vec<usize>, Vec<usize>) {
        let mut s1: Vec<usize> = Vec::with_capacity(self.s1.len());
        let mut s2: Vec<usize> = Vec::with_capacity(self.s2.len());
        for (i, &p) in self.s1.iter().enumerate() {
            if from_s1.contains(&i) {
                s2.push(p);
            } else {
                s1.push(p);
            }
        }
        for (j, &p) in self.s2.iter().enumerate() {
            if from_s2.contains(&j) {
                s1.push(p);
            } else {
                s2.push(p);
            }
        }
        s1.sort_unstable();
        s2.sort_unstable();
        (s1, s2)
    }
}

impl Iterator for Exchanges {
    type Item = (Vec<usize>, Vec<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        let m = self.s1.len();
        loop {
            if self.k == 0 {
                self.k = 1;
                return Some((self.s1.clone(), self.s2.clone()));
            }
            // Exchanging more than half of S1 only repeats smaller exchanges.
            if self.k > m / 2 {
                return None;
            }
            if self.k == 1 {
                if let Some(&(i, j)) = self.singles.get(self.single_pos) {
                    self.single_pos += 1;
                    return Some(self.swap(&[i], &[j]));
                }
                self.k = 2;
                continue;
            }

            if let Some(inner) = self.inner.as_mut() {
                if let Some(c2) = inner.next() {
                    let c1: Vec<usize> = self.c1.iter().map(|&x| m - 1 - x).collect();
                    return Some(self.swap(&c1, &c2));
                }
            }
            let outer = self
                .outer
                .get_or_insert_with(|| Combinations::new(m, self.k));
            match outer.next() {
                Some(c1) => {
                    self.c1 = c1;
                    self.inner = Some(Combinations::new(m, self.k));
                }
                None => {
                    self.k += 1;
                    self.outer = None;
                    self.inner = None;
                }
            }
        }
    }
}

/// One way to resolve a bracket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub pairs: Vec<(usize, usize)>,
    /// Players moving down to the next bracket, sorted.
    pub floaters: Vec<usize>,
    pub repeats: u32,
}

/// Lazily enumerates the candidates of one bracket.
pub(crate) struct BracketCandidates<'t> {
    members: Vec<usize>,
    table: &'t PairTable,
    budget: u32,
    floats: usize,
    max_floats: usize,
    subsets: Combinations,
    floaters: Vec<usize>,
    exchanges: Option<Exchanges>,
    matchings: Option<MatchingIter<'t>>,
}

impl<'t> BracketCandidates<'t> {
    /// `last` brackets must pair everyone.
    pub(crate) fn new(members: Vec<usize>, table: &'t PairTable, budget: u32, last: bool) -> Self {
        let n = members.len();
        let floats = n % 2;
        BracketCandidates {
            members,
            table,
            budget,
            floats,
            max_floats: if last { 0 } else { n },
            subsets: Combinations::new(n, floats),
            floaters: Vec::new(),
            exchanges: None,
            matchings: None,
        }
    }
}

impl Iterator for BracketCandidates<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        let n = self.members.len();
        loop {
            if let Some(matchings) = self.matchings.as_mut() {
                if let Some((pairs, repeats)) = matchings.next() {
                    return Some(Candidate {
                        pairs,
                        floaters: self.floaters.clone(),
                        repeats,
                    });
                }
                self.matchings = None;
            }

            if let Some(exchanges) = self.exchanges.as_mut() {
                if let Some((s1, s2)) = exchanges.next() {
                    self.matchings = Some(MatchingIter::new(s1, s2, self.table, self.budget));
                    continue;
                }
                self.exchanges = None;
            }

            if self.floats > self.max_floats {
                return None;
            }
            match self.subsets.next() {
                Some(positions) => {
                    // Position 0 is the lowest-ranked member.
                    let mut floaters: Vec<usize> =
                        positions.iter().map(|&p| self.members[n - 1 - p]).collect();
                    floaters.sort_unstable();
                    let rest: Vec<usize> = self
                        .members
                        .iter()
                        .copied()
                        .filter(|p| !floaters.contains(p))
                        .collect();
                    self.exchanges = Some(Exchanges::new(&rest));
                    self.floaters = floaters;
                }
                None => {
                    self.floats += 2;
                    self.subsets = Combinations::new(n, self.floats);
                }
            }
        }
    }
}

/// The bracket where the search ran out of options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Stuck {
    pub bracket: usize,
    pub members: Vec<usize>,
}

struct Frame<'t> {
    bracket: usize,
    members: Vec<usize>,
    budget: u32,
    candidates: BracketCandidates<'t>,
    chosen: Option<Candidate>,
}

impl<'t> Frame<'t> {
    fn new(bracket: usize, members: Vec<usize>, budget: u32, last: bool, table: &'t PairTable) -> Self {
        Frame {
            bracket,
            candidates: BracketCandidates::new(members.clone(), table, budget, last),
            members,
            budget,
            chosen: None,
        }
    }
}

/// Pairs every pool member, bracket by bracket.
///
/// `groups` are the score groups as index lists, highest first. At most
/// `budget` repeat pairings are spent over the whole round.
pub(crate) fn pair_brackets(
    groups: &[Vec<usize>],
    table: &PairTable,
    budget: u32,
) -> Result<Vec<(usize, usize)>, Stuck> {
    let Some(first) = groups.first() else {
        return Ok(Vec::new());
    };

    let mut failed: BTreeSet<(usize, Vec<usize>, u32)> = BTreeSet::new();
    let mut deepest = Stuck {
        bracket: 0,
        members: first.clone(),
    };
    let mut stack = vec![Frame::new(0, first.clone(), budget, groups.len() == 1, table)];

    while let Some(frame) = stack.last_mut() {
        let Some(candidate) = frame.candidates.next() else {
            if let Some(done) = stack.pop() {
                failed.insert((done.bracket, done.members, done.budget));
            }
            continue;
        };

        let next = frame.bracket + 1;
        let remaining = frame.budget - candidate.repeats;
        let mut members = candidate.floaters.clone();
        frame.chosen = Some(candidate);

        if next == groups.len() {
            return Ok(stack
                .into_iter()
                .filter_map(|f| f.chosen)
                .flat_map(|c| c.pairs)
                .collect());
        }

        members.extend(&groups[next]);
        members.sort_unstable();
        if failed.contains(&(next, members.clone(), remaining)) {
            continue;
        }
        if next >= deepest.bracket {
            deepest = Stuck {
                bracket: next,
                members: members.clone(),
            };
        }
        stack.push(Frame::new(next, members, remaining, next + 1 == groups.len(), table));
    }

    Err(deepest)
}
