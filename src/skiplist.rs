//! Interval skip list - a dynamic interval index answering stabbing
//! queries in expected O(log n + k).
//!
//! # Design
//!
//! Endpoints of stored intervals become keys in a randomized skip list.
//! Every interval additionally leaves *markers* along the staircase of
//! edges from its left endpoint node up and back down to its right
//! endpoint node, always riding the highest edge it still fully covers:
//!
//! ```text
//! level 2:  HDR ──────────────► 10 ══════════════► 90 ──────► NIL
//! level 1:  HDR ──► 5 ════════► 10 ──► 30 ───────► 90 ──────► NIL
//! level 0:  HDR ──► 5 ──► 7 ──► 10 ──► 30 ──► 41 ─► 90 ─► 95 ► NIL
//!                    ═══ staircase of [5, 90] ═══
//! ```
//!
//! A stabbing query `find_intervals(q)` descends exactly like a key
//! search and collects the markers of each edge it drops through; by the
//! marker invariant those are precisely the stored intervals covering the
//! span around `q`, each contributing one marker on the descent path.
//!
//! Inserting or deleting an endpoint node splits or fuses edges, so
//! markers must be *promoted* and *demoted* between levels to restore the
//! invariant; that repair work is the bulk of this module.
//!
//! Nodes, interval cells, and marker cells live in three [`Slab`] arenas
//! owned by the index, linked by sentinel indices (see [`Index`]). One
//! interval cell is the canonical storage for a stored interval; marker
//! cells hold non-owning handles to it.
//!
//! # Example
//!
//! ```
//! use interval_skiplist::{ClosedInterval, IntervalSkipList};
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//!
//! let mut index = IntervalSkipList::new(SmallRng::seed_from_u64(7));
//! index.insert(ClosedInterval::new(1, 5));
//! index.insert(ClosedInterval::new(3, 7));
//!
//! let mut hits = index.stab(&4);
//! hits.sort();
//! assert_eq!(hits.len(), 2);
//! ```

use core::fmt;
use core::mem;

use rand_core::RngCore;
use slab::Slab;

use crate::index::Index;
use crate::interval::Interval;
use crate::marker::{MarkerCell, MarkerList};

/// Maximum number of levels in the list (levels are `0..MAX_LEVEL`).
pub const MAX_LEVEL: usize = 48;

// ============================================================================
// Node
// ============================================================================

/// A node of the interval skip list.
///
/// A key node exists while some stored interval has an endpoint equal to
/// its key (`owner_count > 0`). The header is a key-less node of maximum
/// height. Each node carries, per level, a forward link and the marker
/// list of its outgoing edge at that level, plus the `eq_markers` list of
/// intervals whose staircase passes through the node and contains its key.
#[derive(Debug)]
pub struct Node<V> {
    key: Option<V>,
    forward: Vec<usize>,
    markers: Vec<MarkerList>,
    eq_markers: MarkerList,
    owner_count: usize,
}

impl<V> Node<V> {
    fn new(key: V, top_level: usize) -> Self {
        Self {
            key: Some(key),
            forward: vec![usize::NONE; top_level + 1],
            markers: vec![MarkerList::new(); top_level + 1],
            eq_markers: MarkerList::new(),
            owner_count: 0,
        }
    }

    fn header() -> Self {
        Self {
            key: None,
            forward: vec![usize::NONE; MAX_LEVEL],
            markers: vec![MarkerList::new(); MAX_LEVEL],
            eq_markers: MarkerList::new(),
            owner_count: 0,
        }
    }

    #[inline]
    fn is_header(&self) -> bool {
        self.key.is_none()
    }

    /// The key; only the header has none.
    #[inline]
    fn key(&self) -> &V {
        self.key.as_ref().expect("header node has no key")
    }

    /// Index of the highest level this node participates in.
    #[inline]
    fn top_level(&self) -> usize {
        self.forward.len() - 1
    }

    /// Returns the node's key, or `None` for the internal header (which
    /// is never returned by the public API).
    #[inline]
    pub fn value(&self) -> Option<&V> {
        self.key.as_ref()
    }

    /// Number of levels this node participates in.
    #[inline]
    pub fn level(&self) -> usize {
        self.forward.len()
    }

    /// Number of stored interval endpoints equal to this node's key.
    ///
    /// Each stored interval contributes one per endpoint; a zero-length
    /// interval contributes two to the same node.
    #[inline]
    pub fn owner_count(&self) -> usize {
        self.owner_count
    }
}

// ============================================================================
// IntervalSkipList
// ============================================================================

/// A dynamic interval index over an ordered value domain.
///
/// Stores a multiset of [`Interval`]s and answers, for a query point `q`,
/// which stored intervals contain `q`, in expected O(log n + k).
/// Intervals compare by value; storing value-equal duplicates is
/// supported, and `remove` drops one occurrence.
///
/// The random source drives only the level choice for new endpoint nodes;
/// inject a seeded RNG for reproducible structure.
///
/// Single-writer: wrap the index in a reader-writer lock for shared use.
pub struct IntervalSkipList<I: Interval, R> {
    rng: R,
    max_level: usize,
    header: usize,
    nodes: Slab<Node<I::Value>>,
    intervals: Slab<I>,
    cells: Slab<MarkerCell>,
}

impl<I, R> IntervalSkipList<I, R>
where
    I: Interval + Clone,
    R: RngCore,
{
    /// Creates an empty index.
    pub fn new(rng: R) -> Self {
        let mut nodes = Slab::new();
        let header = nodes.insert(Node::header());
        Self {
            rng,
            max_level: 0,
            header,
            nodes,
            intervals: Slab::new(),
            cells: Slab::new(),
        }
    }

    /// Creates an index holding every interval of `intervals`.
    pub fn from_intervals<T>(rng: R, intervals: T) -> Self
    where
        T: IntoIterator<Item = I>,
    {
        let mut list = Self::new(rng);
        list.insert_all(intervals);
        list
    }

    /// Number of stored intervals.
    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Returns `true` if no interval is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Iterates the stored intervals in element-store order (insertion
    /// order as long as nothing has been removed).
    #[inline]
    pub fn iter(&self) -> Iter<'_, I> {
        Iter {
            inner: self.intervals.iter(),
        }
    }

    /// Stores `interval`.
    ///
    /// Endpoint nodes are created as needed, and markers are placed along
    /// the interval's staircase. Expected O(log n) plus marker fan-out.
    pub fn insert(&mut self, interval: I) {
        let inf = interval.inf();
        let sup = interval.sup();
        debug_assert!(inf <= sup, "interval endpoints out of order");
        let ih = self.intervals.insert(interval);
        let left = self.insert_endpoint(&inf);
        let right = self.insert_endpoint(&sup);
        self.nodes[left].owner_count += 1;
        self.nodes[right].owner_count += 1;
        self.place_markers(left, right, ih);
    }

    /// Stores every interval of `intervals`, returning how many.
    pub fn insert_all<T>(&mut self, intervals: T) -> usize
    where
        T: IntoIterator<Item = I>,
    {
        let mut count = 0;
        for interval in intervals {
            self.insert(interval);
            count += 1;
        }
        count
    }

    /// Removes one stored occurrence equal to `interval`.
    ///
    /// Returns `true` iff a matching interval was present; an absent
    /// interval leaves the index untouched. Endpoint nodes whose owner
    /// count drops to zero are spliced out.
    pub fn remove(&mut self, interval: &I) -> bool {
        let mut update = [usize::NONE; MAX_LEVEL];
        let inf = interval.inf();
        let left = match self.search_update(&inf, &mut update) {
            Some(node) => node,
            None => return false,
        };
        if self.nodes[left].owner_count == 0 {
            return false;
        }
        // A stored interval always leaves a marker or eq-marker on its
        // left endpoint node; without one the staircase sweep below would
        // walk a path that was never marked.
        if !self.marked_at(left, interval) {
            return false;
        }

        let ih = self
            .remove_markers(left, interval)
            .expect("staircase sweep lost the interval handle");
        debug_assert!(self.intervals[ih] == *interval);
        self.intervals.remove(ih);

        self.nodes[left].owner_count -= 1;
        if self.nodes[left].owner_count == 0 {
            self.remove_node(left, &update);
        }

        // Re-search for the right endpoint: the splice above may have
        // freed nodes the update vector still points into.
        let sup = interval.sup();
        let right = match self.search_update(&sup, &mut update) {
            Some(node) => node,
            None => return false,
        };
        if self.nodes[right].owner_count == 0 {
            return false;
        }
        self.nodes[right].owner_count -= 1;
        if self.nodes[right].owner_count == 0 {
            self.remove_node(right, &update);
        }
        true
    }

    /// Appends to `out` every stored interval containing `q`.
    ///
    /// Result order is unspecified; no duplicates occur (each interval
    /// contributes exactly one marker on the descent path).
    pub fn find_intervals(&self, q: &I::Value, out: &mut Vec<I>) {
        let mut x = self.header;
        for i in (0..=self.max_level).rev() {
            loop {
                let next = self.fwd(x, i);
                if next.is_some() && *self.nodes[next].key() <= *q {
                    x = next;
                } else {
                    break;
                }
            }
            // Harvest the edge markers while dropping a level, unless we
            // sit exactly on q, whose eq-markers are the whole answer.
            let node = &self.nodes[x];
            if !node.is_header() {
                if *node.key() != *q {
                    node.markers[i].collect_into(&self.cells, &self.intervals, out);
                } else {
                    node.eq_markers.collect_into(&self.cells, &self.intervals, out);
                    return;
                }
            }
        }
    }

    /// Returns the stored intervals containing `q`.
    pub fn stab(&self, q: &I::Value) -> Vec<I> {
        let mut out = Vec::new();
        self.find_intervals(q, &mut out);
        out
    }

    /// Returns `true` iff some stored interval contains `q`.
    pub fn is_stabbed(&self, q: &I::Value) -> bool {
        let mut x = self.header;
        for i in (0..=self.max_level).rev() {
            loop {
                let next = self.fwd(x, i);
                if next.is_some() && *self.nodes[next].key() <= *q {
                    x = next;
                } else {
                    break;
                }
            }
            let node = &self.nodes[x];
            if !node.is_header() {
                if *node.key() != *q {
                    if !node.markers[i].is_empty() {
                        return true;
                    }
                } else {
                    return !node.eq_markers.is_empty();
                }
            }
        }
        false
    }

    /// Returns `true` iff a key node with key `q` exists, i.e. iff `q`
    /// is an endpoint of some stored interval.
    ///
    /// This is *endpoint existence*, not a stabbing predicate: a point
    /// strictly inside a stored interval but not equal to any endpoint
    /// yields `false`. Use [`is_stabbed`](Self::is_stabbed) or
    /// [`find_intervals`](Self::find_intervals) to ask about coverage.
    pub fn is_contained(&self, q: &I::Value) -> bool {
        self.find_node(q).is_some()
    }

    /// Returns the key node for `q`, if `q` is an endpoint of some stored
    /// interval.
    pub fn search(&self, q: &I::Value) -> Option<&Node<I::Value>> {
        self.find_node(q).map(|n| &self.nodes[n])
    }

    /// Releases every node, interval, and marker, leaving a fresh index.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.cells.clear();
        self.intervals.clear();
        self.header = self.nodes.insert(Node::header());
        self.max_level = 0;
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    #[inline]
    fn fwd(&self, n: usize, i: usize) -> usize {
        self.nodes[n].forward[i]
    }

    /// Snapshot of the handles marking the level-`i` edge out of `n`.
    ///
    /// The repair loops mutate marker lists and the cell arena while
    /// logically iterating one list, so they always scan a snapshot.
    fn edge_markers(&self, n: usize, i: usize) -> Vec<usize> {
        self.nodes[n].markers[i].to_vec(&self.cells)
    }

    fn mark(&mut self, n: usize, i: usize, ih: usize) {
        let Self { nodes, cells, .. } = self;
        nodes[n].markers[i].push(cells, ih);
    }

    fn mark_eq(&mut self, n: usize, ih: usize) {
        let Self { nodes, cells, .. } = self;
        nodes[n].eq_markers.push(cells, ih);
    }

    fn unmark(&mut self, n: usize, i: usize, target: &I) -> Option<usize> {
        let Self {
            nodes,
            cells,
            intervals,
            ..
        } = self;
        nodes[n].markers[i].remove_one(cells, intervals, target)
    }

    fn unmark_eq(&mut self, n: usize, target: &I) -> Option<usize> {
        let Self {
            nodes,
            cells,
            intervals,
            ..
        } = self;
        nodes[n].eq_markers.remove_one(cells, intervals, target)
    }

    /// Whether any marker or eq-marker on `n` equals `target` by value.
    fn marked_at(&self, n: usize, target: &I) -> bool {
        let node = &self.nodes[n];
        node.eq_markers
            .contains_value(&self.cells, &self.intervals, target)
            || node
                .markers
                .iter()
                .any(|list| list.contains_value(&self.cells, &self.intervals, target))
    }

    /// Level for a new node: count of successful p = 1/2 coin flips,
    /// capped at one above the current maximum so the level ladder stays
    /// contiguous.
    fn random_level(&mut self) -> usize {
        let flips = self.rng.next_u64().trailing_ones() as usize;
        flips.min(self.max_level + 1).min(MAX_LEVEL - 1)
    }

    /// Descends for `key`, recording in `update` the rightmost node with
    /// a smaller key at every level. Returns the node with key `key` if
    /// it exists.
    fn search_update(
        &self,
        key: &I::Value,
        update: &mut [usize; MAX_LEVEL],
    ) -> Option<usize> {
        let mut x = self.header;
        for i in (0..=self.max_level).rev() {
            loop {
                let next = self.fwd(x, i);
                if next.is_some() && *self.nodes[next].key() < *key {
                    x = next;
                } else {
                    break;
                }
            }
            update[i] = x;
        }
        let next = self.fwd(x, 0);
        if next.is_some() && *self.nodes[next].key() == *key {
            Some(next)
        } else {
            None
        }
    }

    fn find_node(&self, key: &I::Value) -> Option<usize> {
        let mut x = self.header;
        for i in (0..=self.max_level).rev() {
            loop {
                let next = self.fwd(x, i);
                if next.is_some() && *self.nodes[next].key() < *key {
                    x = next;
                } else {
                    break;
                }
            }
        }
        let next = self.fwd(x, 0);
        if next.is_some() && *self.nodes[next].key() == *key {
            Some(next)
        } else {
            None
        }
    }

    /// Ensures a key node for `key` exists and returns it, splicing in a
    /// freshly leveled node and repairing the marker invariant if it was
    /// missing.
    fn insert_endpoint(&mut self, key: &I::Value) -> usize {
        let mut update = [usize::NONE; MAX_LEVEL];
        if let Some(existing) = self.search_update(key, &mut update) {
            return existing;
        }

        let new_level = self.random_level();
        if new_level > self.max_level {
            // The cap in random_level() extends the ladder by at most one
            // level; expose it and make sure the header edge is clean.
            let header = self.header;
            let first_new = self.max_level + 1;
            {
                let Self { nodes, cells, .. } = self;
                for i in first_new..=new_level {
                    update[i] = header;
                    nodes[header].markers[i].clear(cells);
                }
            }
            self.max_level = new_level;
        }

        let x = self.nodes.insert(Node::new(key.clone(), new_level));
        for i in 0..=new_level {
            let prev = update[i];
            let next = self.nodes[prev].forward[i];
            self.nodes[x].forward[i] = next;
            self.nodes[prev].forward[i] = x;
        }

        self.adjust_markers_on_insert(x, &update);
        x
    }

    /// Restores the marker invariant after `x` was spliced in with
    /// predecessor vector `update`.
    ///
    /// Phase 1 sweeps the edges leading out of `x`: markers arriving on
    /// the bottom edge may now ride higher edges through `x` and are
    /// promoted level by level, shedding their old low-level marks. Phase
    /// 2 does the symmetric sweep for the edges leading into `x`. Finally
    /// `x`, being brand new, eq-marks every interval that leaves it,
    /// since every marker coming into `x` must also leave it.
    fn adjust_markers_on_insert(&mut self, x: usize, update: &[usize; MAX_LEVEL]) {
        let x_top = self.nodes[x].top_level();
        let mut promoted: Vec<usize> = Vec::new();
        let mut new_promoted: Vec<usize> = Vec::new();

        // Phase 1: edges leading out of x.
        let mut i = 0;
        while i + 1 <= x_top && self.fwd(x, i + 1).is_some() {
            let fwd_i = self.fwd(x, i);
            let fwd_up = self.fwd(x, i + 1);

            for ih in self.edge_markers(update[i], i) {
                let m = self.intervals[ih].clone();
                if m.contains_interval(self.nodes[x].key(), self.nodes[fwd_up].key()) {
                    // Promotable: strip it from the level-i path beyond x;
                    // its mark on the edge into x stays where it is.
                    self.remove_mark_from_level(&m, i, fwd_i, fwd_up);
                    new_promoted.push(ih);
                } else {
                    // The edge out of x at this level is the highest it
                    // covers. The incoming edge keeps its existing cell.
                    self.mark(x, i, ih);
                }
            }

            let carried = mem::take(&mut promoted);
            for ih in carried {
                let m = self.intervals[ih].clone();
                if !m.contains_interval(self.nodes[x].key(), self.nodes[fwd_up].key()) {
                    // Ceiling reached: deposit on the level-i edge out of x.
                    self.mark(x, i, ih);
                    if m.contains(self.nodes[fwd_i].key()) {
                        self.mark_eq(fwd_i, ih);
                    }
                } else {
                    self.remove_mark_from_level(&m, i, fwd_i, fwd_up);
                    promoted.push(ih);
                }
            }
            promoted.append(&mut new_promoted);
            i += 1;
        }

        // Deposit the survivors and the incoming edge's markers on the
        // highest usable edge out of x. An edge out of the header is
        // never marked, and the promoted set is empty whenever the edge
        // here is null.
        let incoming = self.edge_markers(update[i], i);
        {
            let Self { nodes, cells, .. } = self;
            let list = &mut nodes[x].markers[i];
            list.push_all(cells, &promoted);
            list.push_all(cells, &incoming);
        }
        let fwd_i = self.fwd(x, i);
        if fwd_i.is_some() {
            for &ih in &promoted {
                let m = self.intervals[ih].clone();
                if m.contains(self.nodes[fwd_i].key()) {
                    self.mark_eq(fwd_i, ih);
                }
            }
        }

        // Phase 2: edges leading into x. Markers may be promoted as high
        // as the top edge coming into x, but never onto a header edge.
        promoted.clear();

        let mut i = 0;
        while i + 1 <= x_top && !self.nodes[update[i + 1]].is_header() {
            // The path sweep below can strip cells from update[i]'s own
            // list, hence the snapshot.
            for ih in self.edge_markers(update[i], i) {
                let m = self.intervals[ih].clone();
                if m.contains_interval(self.nodes[update[i + 1]].key(), self.nodes[x].key()) {
                    new_promoted.push(ih);
                    self.remove_mark_from_level(&m, i, update[i + 1], x);
                }
            }

            let carried = mem::take(&mut promoted);
            for ih in carried {
                let m = self.intervals[ih].clone();
                let rests_here = !self.nodes[update[i]].is_header()
                    && m.contains_interval(self.nodes[update[i]].key(), self.nodes[x].key())
                    && !self.nodes[update[i + 1]].is_header()
                    && !m.contains_interval(self.nodes[update[i + 1]].key(), self.nodes[x].key());
                if rests_here {
                    self.mark(update[i], i, ih);
                    if m.contains(self.nodes[update[i]].key()) {
                        self.mark_eq(update[i], ih);
                    }
                } else {
                    self.remove_mark_from_level(&m, i, update[i + 1], x);
                    promoted.push(ih);
                }
            }
            promoted.append(&mut new_promoted);
            i += 1;
        }

        // Either i is x's top level or the next edge into x comes from
        // the header; in both cases everything still promoted belongs on
        // the current edge into x.
        {
            let Self { nodes, cells, .. } = self;
            nodes[update[i]].markers[i].push_all(cells, &promoted);
        }
        if !self.nodes[update[i]].is_header() {
            for &ih in &promoted {
                let m = self.intervals[ih].clone();
                if m.contains(self.nodes[update[i]].key()) {
                    self.mark_eq(update[i], ih);
                }
            }
        }

        // x is brand new, so every marker coming into it also leaves it:
        // its eq set is the union of its outgoing marker sets.
        for lvl in 0..=x_top {
            let handles = self.edge_markers(x, lvl);
            if handles.is_empty() {
                continue;
            }
            let Self { nodes, cells, .. } = self;
            nodes[x].eq_markers.push_all(cells, &handles);
        }
    }

    /// Demotes markers in preparation for deleting `x`, which is still
    /// linked and has predecessor vector `update`.
    ///
    /// Top-down on each side of `x`: a marker that will not cover the
    /// spliced edge `update[i] -> x.forward[i]` is taken off it and
    /// spread over the level-(i-1) chain below, until it reaches edges it
    /// covers again.
    fn adjust_markers_on_delete(&mut self, x: usize, update: &[usize; MAX_LEVEL]) {
        let x_top = self.nodes[x].top_level();
        let mut demoted: Vec<usize> = Vec::new();
        let mut new_demoted: Vec<usize> = Vec::new();

        // Phase 1: edges to the left of x.
        for i in (0..=x_top).rev() {
            for ih in self.edge_markers(update[i], i) {
                let m = self.intervals[ih].clone();
                let fwd_i = self.fwd(x, i);
                if fwd_i.is_none()
                    || !m.contains_interval(self.nodes[update[i]].key(), self.nodes[fwd_i].key())
                {
                    new_demoted.push(ih);
                }
            }
            {
                let Self {
                    nodes,
                    cells,
                    intervals,
                    ..
                } = self;
                nodes[update[i]].markers[i].remove_all(cells, intervals, &new_demoted);
            }
            // update[i]'s eq-markers stay: whatever was there before the
            // demotion still belongs there afterwards.

            let mut rested: Vec<usize> = Vec::new();
            for &ih in &demoted {
                let m = self.intervals[ih].clone();
                // Spread over level i from update[i+1] to update[i];
                // update[i+1] already carries its own marks.
                let stop = update[i];
                let mut y = update[i + 1];
                while y.is_some() && y != stop {
                    if y != update[i + 1] && m.contains(self.nodes[y].key()) {
                        self.mark_eq(y, ih);
                    }
                    self.mark(y, i, ih);
                    y = self.fwd(y, i);
                }
                if y.is_some() && y != update[i + 1] && m.contains(self.nodes[y].key()) {
                    self.mark_eq(y, ih);
                }

                // If this is the lowest level the marker needs, it rests
                // on the spliced edge out of update[i].
                let fwd_i = self.fwd(x, i);
                if fwd_i.is_some()
                    && !self.nodes[update[i]].is_header()
                    && m.contains_interval(self.nodes[update[i]].key(), self.nodes[fwd_i].key())
                {
                    self.mark(update[i], i, ih);
                    rested.push(ih);
                }
            }
            demoted.retain(|h| !rested.contains(h));
            demoted.append(&mut new_demoted);
        }

        // Phase 2: edges to the right of x.
        demoted.clear();
        debug_assert!(new_demoted.is_empty());

        for i in (0..=x_top).rev() {
            for ih in self.edge_markers(x, i) {
                let m = self.intervals[ih].clone();
                let fwd_i = self.fwd(x, i);
                if fwd_i.is_some()
                    && (self.nodes[update[i]].is_header()
                        || !m.contains_interval(
                            self.nodes[update[i]].key(),
                            self.nodes[fwd_i].key(),
                        ))
                {
                    new_demoted.push(ih);
                }
            }

            let mut rested: Vec<usize> = Vec::new();
            for &ih in &demoted {
                let m = self.intervals[ih].clone();
                // Spread over level i from x.forward[i] up to (and not
                // including) x.forward[i+1], which is already marked.
                // Every node strictly inside that span lies inside m.
                let stop = if i + 1 <= x_top {
                    self.fwd(x, i + 1)
                } else {
                    usize::NONE
                };
                let mut y = self.fwd(x, i);
                while y != stop {
                    self.mark_eq(y, ih);
                    self.mark(y, i, ih);
                    y = self.fwd(y, i);
                }

                let fwd_i = self.fwd(x, i);
                if fwd_i.is_some()
                    && !self.nodes[update[i]].is_header()
                    && m.contains_interval(self.nodes[update[i]].key(), self.nodes[fwd_i].key())
                {
                    rested.push(ih);
                }
            }
            demoted.retain(|h| !rested.contains(h));
            demoted.append(&mut new_demoted);
        }
    }

    /// Splices `x` out and releases it. The markers of the interval that
    /// owned `x` must already be gone.
    fn remove_node(&mut self, x: usize, update: &[usize; MAX_LEVEL]) {
        self.adjust_markers_on_delete(x, update);

        let top = self.nodes[x].top_level();
        for i in 0..=top {
            let next = self.nodes[x].forward[i];
            self.nodes[update[i]].forward[i] = next;
        }

        let mut node = self.nodes.remove(x);
        let Self { cells, .. } = self;
        node.eq_markers.clear(cells);
        for list in &mut node.markers {
            list.clear(cells);
        }
    }

    /// Walks the staircase of the interval behind `ih` from `left` to its
    /// right endpoint, marking every edge ridden and eq-marking every
    /// node visited whose key the interval contains.
    fn place_markers(&mut self, left: usize, right: usize, ih: usize) {
        let m = self.intervals[ih].clone();
        let mut x = left;
        if m.contains(self.nodes[x].key()) {
            self.mark_eq(x, ih);
        }

        // Ascending sweep: greedily ride the highest covered edge.
        let mut i = 0;
        while self.fwd(x, i).is_some()
            && m.contains_interval(self.nodes[x].key(), self.nodes[self.fwd(x, i)].key())
        {
            while i != self.nodes[x].top_level()
                && self.fwd(x, i + 1).is_some()
                && m.contains_interval(self.nodes[x].key(), self.nodes[self.fwd(x, i + 1)].key())
            {
                i += 1;
            }
            if self.fwd(x, i).is_some() {
                self.mark(x, i, ih);
                x = self.fwd(x, i);
                if m.contains(self.nodes[x].key()) {
                    self.mark_eq(x, ih);
                }
            }
        }

        // Descending sweep down to the right endpoint. Between the
        // endpoints there is always a covered edge to ride, so this
        // terminates at `right`.
        while *self.nodes[x].key() != *self.nodes[right].key() {
            while i != 0
                && (self.fwd(x, i).is_none()
                    || !m.contains_interval(self.nodes[x].key(), self.nodes[self.fwd(x, i)].key()))
            {
                i -= 1;
            }
            self.mark(x, i, ih);
            x = self.fwd(x, i);
            if m.contains(self.nodes[x].key()) {
                self.mark_eq(x, ih);
            }
        }
    }

    /// Walks the identical staircase `place_markers` walked for `target`
    /// and removes one matching marker from every list touched. Returns
    /// the interval handle common to the removed cells.
    fn remove_markers(&mut self, left: usize, target: &I) -> Option<usize> {
        let mut res = None;
        let mut x = left;
        if target.contains(self.nodes[x].key()) {
            if let Some(h) = self.unmark_eq(x, target) {
                res = Some(h);
            }
        }

        let mut i = 0;
        while self.fwd(x, i).is_some()
            && target.contains_interval(self.nodes[x].key(), self.nodes[self.fwd(x, i)].key())
        {
            while i != self.nodes[x].top_level()
                && self.fwd(x, i + 1).is_some()
                && target
                    .contains_interval(self.nodes[x].key(), self.nodes[self.fwd(x, i + 1)].key())
            {
                i += 1;
            }
            if self.fwd(x, i).is_some() {
                if let Some(h) = self.unmark(x, i, target) {
                    res = Some(h);
                }
                x = self.fwd(x, i);
                if target.contains(self.nodes[x].key()) {
                    if let Some(h) = self.unmark_eq(x, target) {
                        res = Some(h);
                    }
                }
            }
        }

        let sup = target.sup();
        while *self.nodes[x].key() != sup {
            while i != 0
                && (self.fwd(x, i).is_none()
                    || !target
                        .contains_interval(self.nodes[x].key(), self.nodes[self.fwd(x, i)].key()))
            {
                i -= 1;
            }
            if let Some(h) = self.unmark(x, i, target) {
                res = Some(h);
            }
            x = self.fwd(x, i);
            if target.contains(self.nodes[x].key()) {
                if let Some(h) = self.unmark_eq(x, target) {
                    res = Some(h);
                }
            }
        }
        res
    }

    /// Strips one `m`-valued marker from every level-`i` edge and node on
    /// the chain from `l` up to but not including `r`, then from `r`'s
    /// eq-markers only: `r`'s outgoing edge belongs to the next staircase
    /// segment.
    fn remove_mark_from_level(&mut self, m: &I, i: usize, l: usize, r: usize) {
        let mut x = l;
        while x.is_some() && x != r {
            self.unmark(x, i, m);
            self.unmark_eq(x, m);
            x = self.fwd(x, i);
        }
        if x.is_some() {
            self.unmark_eq(x, m);
        }
    }
}

// ============================================================================
// Iteration and diagnostics
// ============================================================================

/// Iterator over the stored intervals, in element-store order.
pub struct Iter<'a, I> {
    inner: slab::Iter<'a, I>,
}

impl<'a, I> Iterator for Iter<'a, I> {
    type Item = &'a I;

    #[inline]
    fn next(&mut self) -> Option<&'a I> {
        self.inner.next().map(|(_, interval)| interval)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<I, R> fmt::Debug for IntervalSkipList<I, R>
where
    I: Interval + fmt::Debug,
    I::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "IntervalSkipList {{ len: {}, max_level: {} }}",
            self.intervals.len(),
            self.max_level
        )?;
        let mut x = self.nodes[self.header].forward[0];
        while x.is_some() {
            let node = &self.nodes[x];
            writeln!(
                f,
                "  {:?} (level {}, owners {})",
                node.key(),
                node.level(),
                node.owner_count
            )?;
            for i in 0..=node.top_level() {
                let marks: Vec<&I> = node.markers[i]
                    .handles(&self.cells)
                    .map(|h| &self.intervals[h])
                    .collect();
                writeln!(f, "    markers[{i}]: {marks:?}")?;
            }
            let eq: Vec<&I> = node
                .eq_markers
                .handles(&self.cells)
                .map(|h| &self.intervals[h])
                .collect();
            writeln!(f, "    eq: {eq:?}")?;
            x = node.forward[0];
        }
        Ok(())
    }
}

// ============================================================================
// Test support: structural invariant checking
// ============================================================================

#[cfg(test)]
impl<I, R> IntervalSkipList<I, R>
where
    I: Interval + Clone,
    R: RngCore,
{
    /// Walks the staircase `place_markers` would walk for `m` on the
    /// current structure, returning the (node, level) edges it marks and
    /// the nodes it eq-marks.
    fn staircase(&self, left: usize, right: usize, m: &I) -> (Vec<(usize, usize)>, Vec<usize>) {
        let mut edges = Vec::new();
        let mut eqs = Vec::new();
        let mut x = left;
        if m.contains(self.nodes[x].key()) {
            eqs.push(x);
        }
        let mut i = 0;
        while self.fwd(x, i).is_some()
            && m.contains_interval(self.nodes[x].key(), self.nodes[self.fwd(x, i)].key())
        {
            while i != self.nodes[x].top_level()
                && self.fwd(x, i + 1).is_some()
                && m.contains_interval(self.nodes[x].key(), self.nodes[self.fwd(x, i + 1)].key())
            {
                i += 1;
            }
            if self.fwd(x, i).is_some() {
                edges.push((x, i));
                x = self.fwd(x, i);
                if m.contains(self.nodes[x].key()) {
                    eqs.push(x);
                }
            }
        }
        while *self.nodes[x].key() != *self.nodes[right].key() {
            while i != 0
                && (self.fwd(x, i).is_none()
                    || !m.contains_interval(self.nodes[x].key(), self.nodes[self.fwd(x, i)].key()))
            {
                i -= 1;
            }
            edges.push((x, i));
            x = self.fwd(x, i);
            if m.contains(self.nodes[x].key()) {
                eqs.push(x);
            }
        }
        (edges, eqs)
    }

    /// Asserts every structural invariant: key order, tower shape, owner
    /// accounting, a clean header, and marker placement identical to a
    /// fresh staircase placement of every stored interval on the current
    /// node arrangement.
    pub(crate) fn check_invariants(&self) {
        use std::collections::HashMap;

        // Level-0 chain: strictly ascending keys, every node reachable.
        let mut level0 = Vec::new();
        let mut x = self.fwd(self.header, 0);
        while x.is_some() {
            let node = &self.nodes[x];
            assert!(!node.is_header(), "header linked as a key node");
            if let Some(&prev) = level0.last() {
                assert!(
                    self.nodes[prev].key() < node.key(),
                    "level-0 keys out of order"
                );
            }
            level0.push(x);
            x = self.fwd(x, 0);
        }
        assert_eq!(level0.len() + 1, self.nodes.len(), "unreachable nodes");

        // Tower shape: the level-i chain is exactly the subsequence of
        // level-0 nodes reaching level i.
        for i in 0..=self.max_level {
            let expected: Vec<usize> = level0
                .iter()
                .copied()
                .filter(|&n| self.nodes[n].top_level() >= i)
                .collect();
            let mut chain = Vec::new();
            let mut y = self.fwd(self.header, i);
            while y.is_some() {
                chain.push(y);
                y = self.fwd(y, i);
            }
            assert_eq!(chain, expected, "level-{i} chain mismatch");
        }
        for i in self.max_level + 1..MAX_LEVEL {
            assert!(self.fwd(self.header, i).is_none(), "link above max_level");
        }

        // Ownership accounting.
        for &n in &level0 {
            let key = self.nodes[n].key();
            let owners = self
                .intervals
                .iter()
                .filter(|(_, iv)| iv.inf() == *key)
                .count()
                + self
                    .intervals
                    .iter()
                    .filter(|(_, iv)| iv.sup() == *key)
                    .count();
            assert!(self.nodes[n].owner_count > 0, "unowned node");
            assert_eq!(self.nodes[n].owner_count, owners, "owner count mismatch");
        }
        for (_, iv) in self.intervals.iter() {
            assert!(self.find_node(&iv.inf()).is_some(), "missing left endpoint");
            assert!(self.find_node(&iv.sup()).is_some(), "missing right endpoint");
        }

        // Header carries no markers.
        for i in 0..MAX_LEVEL {
            assert!(
                self.nodes[self.header].markers[i].is_empty(),
                "marked header edge"
            );
        }
        assert!(self.nodes[self.header].eq_markers.is_empty());

        // Marker placement: the structure must look exactly as if every
        // stored interval had its staircase placed fresh.
        let mut want_edges: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        let mut want_eq: HashMap<usize, Vec<usize>> = HashMap::new();
        for (ih, iv) in self.intervals.iter() {
            let left = self.find_node(&iv.inf()).expect("left endpoint");
            let right = self.find_node(&iv.sup()).expect("right endpoint");
            let (edges, eqs) = self.staircase(left, right, iv);
            for edge in edges {
                want_edges.entry(edge).or_default().push(ih);
            }
            for n in eqs {
                want_eq.entry(n).or_default().push(ih);
            }
        }
        for &n in &level0 {
            for i in 0..=self.nodes[n].top_level() {
                let got = self.nodes[n].markers[i].to_vec(&self.cells);
                let want = want_edges.remove(&(n, i)).unwrap_or_default();
                self.assert_same_markers(&got, &want, &format!("node {n} markers[{i}]"));
            }
            let got = self.nodes[n].eq_markers.to_vec(&self.cells);
            let want = want_eq.remove(&n).unwrap_or_default();
            self.assert_same_markers(&got, &want, &format!("node {n} eq"));
        }
        assert!(want_edges.is_empty(), "expected marks on missing edges");
        assert!(want_eq.is_empty(), "expected eq marks on missing nodes");
    }

    /// Marker lists are multisets of interval values; handles may differ
    /// between value-equal duplicates, so compare by value.
    fn assert_same_markers(&self, got: &[usize], want: &[usize], what: &str) {
        assert_eq!(got.len(), want.len(), "marker count mismatch at {what}");
        for &w in want {
            let value = &self.intervals[w];
            let in_got = got.iter().filter(|&&g| self.intervals[g] == *value).count();
            let in_want = want
                .iter()
                .filter(|&&g| self.intervals[g] == *value)
                .count();
            assert_eq!(in_got, in_want, "marker multiset mismatch at {what}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::ClosedInterval;
    use core::ops::Range;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    type Iv = ClosedInterval<i32>;
    type TestList = IntervalSkipList<Iv, SmallRng>;

    fn make_list() -> TestList {
        IntervalSkipList::new(SmallRng::seed_from_u64(0x5eed))
    }

    fn iv(a: i32, b: i32) -> Iv {
        ClosedInterval::new(a, b)
    }

    fn sorted_stab(list: &TestList, q: i32) -> Vec<Iv> {
        let mut out = list.stab(&q);
        out.sort();
        out
    }

    fn oracle(stored: &[Iv], q: i32) -> Vec<Iv> {
        let mut out: Vec<Iv> = stored.iter().filter(|m| m.contains(&q)).cloned().collect();
        out.sort();
        out
    }

    // ========================================================================
    // Basic operations
    // ========================================================================

    #[test]
    fn new_is_empty() {
        let list = make_list();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.stab(&3).is_empty());
        assert!(!list.is_contained(&3));
        assert!(!list.is_stabbed(&3));
        assert!(list.search(&3).is_none());
    }

    #[test]
    fn stabbing_basics() {
        let mut list = make_list();
        list.insert(iv(1, 5));
        list.insert(iv(3, 7));
        list.insert(iv(10, 12));
        list.check_invariants();

        assert_eq!(sorted_stab(&list, 4), vec![iv(1, 5), iv(3, 7)]);
        assert_eq!(sorted_stab(&list, 8), vec![]);
        assert_eq!(sorted_stab(&list, 3), vec![iv(1, 5), iv(3, 7)]);
        assert_eq!(sorted_stab(&list, 1), vec![iv(1, 5)]);
        assert_eq!(sorted_stab(&list, 7), vec![iv(3, 7)]);
        assert_eq!(sorted_stab(&list, 10), vec![iv(10, 12)]);
        assert_eq!(sorted_stab(&list, 12), vec![iv(10, 12)]);
        assert_eq!(sorted_stab(&list, 13), vec![]);
    }

    #[test]
    fn remove_then_query() {
        let mut list = make_list();
        list.insert(iv(1, 5));
        list.insert(iv(3, 7));

        assert!(list.remove(&iv(1, 5)));
        list.check_invariants();
        assert_eq!(list.len(), 1);
        assert_eq!(sorted_stab(&list, 2), vec![]);
        assert_eq!(sorted_stab(&list, 4), vec![iv(3, 7)]);
    }

    #[test]
    fn duplicates_are_removed_one_at_a_time() {
        let mut list = make_list();
        list.insert(iv(2, 6));
        list.insert(iv(2, 6));
        assert_eq!(list.len(), 2);
        list.check_invariants();

        assert!(list.remove(&iv(2, 6)));
        list.check_invariants();
        assert_eq!(sorted_stab(&list, 4), vec![iv(2, 6)]);

        assert!(list.remove(&iv(2, 6)));
        assert!(list.is_empty());
        assert!(list.stab(&4).is_empty());

        // Idempotent re-removal.
        assert!(!list.remove(&iv(2, 6)));
        list.check_invariants();
    }

    #[test]
    fn remove_absent_leaves_index_untouched() {
        let mut list = make_list();
        assert!(!list.remove(&iv(1, 5)));

        list.insert(iv(1, 5));
        list.insert(iv(1, 9));
        // Shares the left endpoint with stored intervals but was never
        // stored itself.
        assert!(!list.remove(&iv(1, 7)));
        // No node for the left endpoint at all.
        assert!(!list.remove(&iv(0, 4)));
        assert!(!list.remove(&iv(2, 5)));

        list.check_invariants();
        assert_eq!(list.len(), 2);
        assert_eq!(sorted_stab(&list, 3), vec![iv(1, 5), iv(1, 9)]);

        assert!(list.remove(&iv(1, 9)));
        assert_eq!(sorted_stab(&list, 3), vec![iv(1, 5)]);
        list.check_invariants();
    }

    #[test]
    fn zero_length_interval() {
        let mut list = make_list();
        list.insert(iv(4, 4));
        list.check_invariants();

        assert_eq!(sorted_stab(&list, 4), vec![iv(4, 4)]);
        assert!(list.stab(&3).is_empty());
        assert!(list.stab(&5).is_empty());
        assert!(list.is_contained(&4));
        // Both endpoint incidences land on the same node.
        assert_eq!(list.search(&4).map(Node::owner_count), Some(2));

        assert!(list.remove(&iv(4, 4)));
        assert!(list.is_empty());
        assert!(!list.is_contained(&4));
        list.check_invariants();
    }

    #[test]
    fn shared_endpoints_accumulate_owners() {
        let mut list = make_list();
        list.insert(iv(1, 5));
        list.insert(iv(5, 9));
        list.check_invariants();

        assert_eq!(sorted_stab(&list, 5), vec![iv(1, 5), iv(5, 9)]);
        assert_eq!(list.search(&5).map(Node::owner_count), Some(2));

        assert!(list.remove(&iv(1, 5)));
        list.check_invariants();
        assert_eq!(sorted_stab(&list, 5), vec![iv(5, 9)]);
        assert!(!list.is_contained(&1));
        assert_eq!(list.search(&5).map(Node::owner_count), Some(1));
    }

    #[test]
    fn endpoint_existence_is_not_stabbing() {
        let mut list = make_list();
        list.insert(iv(1, 5));
        list.insert(iv(3, 7));

        for endpoint in [1, 3, 5, 7] {
            assert!(list.is_contained(&endpoint), "endpoint {endpoint}");
        }
        // Interior points of stored intervals are not endpoints.
        for interior in [2, 4, 6] {
            assert!(!list.is_contained(&interior), "interior {interior}");
            assert!(list.is_stabbed(&interior), "interior {interior}");
        }
        assert!(!list.is_contained(&0));
        assert!(!list.is_contained(&8));
        assert!(!list.is_stabbed(&8));

        assert!(list.remove(&iv(1, 5)));
        assert!(!list.is_contained(&1));
        assert!(!list.is_contained(&5));
        assert!(list.is_contained(&3));
        assert!(list.is_contained(&7));
    }

    // ========================================================================
    // Construction, iteration, teardown
    // ========================================================================

    #[test]
    fn iteration_follows_insertion_order() {
        let mut list = make_list();
        let inserted = [iv(5, 9), iv(1, 2), iv(3, 11), iv(0, 0)];
        for m in inserted {
            list.insert(m);
        }
        let got: Vec<Iv> = list.iter().cloned().collect();
        assert_eq!(got, inserted.to_vec());
    }

    #[test]
    fn from_intervals_and_insert_all() {
        let seeds = vec![iv(1, 4), iv(2, 8), iv(6, 6)];
        let mut list =
            TestList::from_intervals(SmallRng::seed_from_u64(9), seeds.clone());
        assert_eq!(list.len(), 3);
        list.check_invariants();

        let added = list.insert_all(vec![iv(0, 3), iv(5, 7)]);
        assert_eq!(added, 2);
        assert_eq!(list.len(), 5);
        list.check_invariants();
        assert_eq!(
            sorted_stab(&list, 6),
            vec![iv(2, 8), iv(5, 7), iv(6, 6)]
        );
    }

    #[test]
    fn clear_resets_for_reuse() {
        let mut list = make_list();
        list.insert(iv(1, 5));
        list.insert(iv(2, 9));
        list.clear();

        assert!(list.is_empty());
        assert!(list.stab(&3).is_empty());
        assert!(!list.is_contained(&1));
        list.check_invariants();

        list.insert(iv(4, 6));
        assert_eq!(sorted_stab(&list, 5), vec![iv(4, 6)]);
        list.check_invariants();
    }

    #[test]
    fn search_exposes_node_accessors() {
        let mut list = make_list();
        list.insert(iv(3, 10));
        list.insert(iv(3, 5));

        let node = list.search(&3).expect("node for key 3");
        assert_eq!(node.value(), Some(&3));
        assert_eq!(node.owner_count(), 2);
        assert!(node.level() >= 1);
        assert!(list.search(&4).is_none());
    }

    #[test]
    fn debug_output_mentions_structure() {
        let mut list = make_list();
        list.insert(iv(1, 5));
        let dump = format!("{list:?}");
        assert!(dump.contains("IntervalSkipList"));
        assert!(dump.contains("markers[0]"));
    }

    // ========================================================================
    // Alternative interval flavors
    // ========================================================================

    #[test]
    fn half_open_ranges_exclude_their_sup() {
        let mut list: IntervalSkipList<Range<i32>, SmallRng> =
            IntervalSkipList::new(SmallRng::seed_from_u64(5));
        list.insert(1..5);
        list.insert(3..8);
        list.check_invariants();

        let mut got = list.stab(&4);
        got.sort_by_key(|r| (r.start, r.end));
        assert_eq!(got, vec![1..5, 3..8]);
        assert_eq!(list.stab(&5), vec![3..8]);
        assert!(list.stab(&8).is_empty());
        assert!(list.stab(&0).is_empty());

        assert!(list.remove(&(1..5)));
        list.check_invariants();
        assert_eq!(list.stab(&4), vec![3..8]);
        assert!(list.stab(&1).is_empty());
    }

    #[test]
    fn inclusive_ranges_are_closed() {
        let mut list: IntervalSkipList<core::ops::RangeInclusive<i32>, SmallRng> =
            IntervalSkipList::new(SmallRng::seed_from_u64(6));
        list.insert(2..=6);
        list.insert(6..=9);
        list.check_invariants();

        let mut got = list.stab(&6);
        got.sort_by_key(|r| (*r.start(), *r.end()));
        assert_eq!(got, vec![2..=6, 6..=9]);
        assert!(list.remove(&(2..=6)));
        assert_eq!(list.stab(&6), vec![6..=9]);
        list.check_invariants();
    }

    // ========================================================================
    // Randomized soaks against a brute-force oracle
    // ========================================================================

    #[test]
    fn random_soak_maintains_invariants() {
        let mut driver = SmallRng::seed_from_u64(0xDEC0DE);
        let mut list = make_list();
        let mut stored: Vec<Iv> = Vec::new();

        for step in 0..300 {
            if stored.is_empty() || driver.gen_range(0..100) < 60 {
                let a = driver.gen_range(0..40);
                let b = (a + driver.gen_range(0..=12)).min(40);
                let interval = iv(a, b);
                list.insert(interval);
                stored.push(interval);
            } else {
                let k = driver.gen_range(0..stored.len());
                let interval = stored.swap_remove(k);
                assert!(list.remove(&interval), "step {step}");
            }
            assert_eq!(list.len(), stored.len());
            if step % 3 == 0 {
                list.check_invariants();
            }
            if step % 5 == 0 {
                for q in -1..=41 {
                    assert_eq!(
                        sorted_stab(&list, q),
                        oracle(&stored, q),
                        "query {q} at step {step}"
                    );
                }
            }
        }

        while let Some(interval) = stored.pop() {
            assert!(list.remove(&interval));
        }
        list.check_invariants();
        assert!(list.is_empty());
    }

    #[test]
    fn bulk_random_matches_linear_scan() {
        let mut driver = SmallRng::seed_from_u64(31337);
        let mut list: TestList = IntervalSkipList::new(SmallRng::seed_from_u64(777));
        let mut stored: Vec<Iv> = Vec::new();

        for _ in 0..1000 {
            let a = driver.gen_range(0..2000);
            let b = a + driver.gen_range(0..=80);
            let interval = iv(a, b);
            list.insert(interval);
            stored.push(interval);
        }
        assert_eq!(list.len(), 1000);
        list.check_invariants();

        for _ in 0..1000 {
            let q = driver.gen_range(-10..2100);
            assert_eq!(sorted_stab(&list, q), oracle(&stored, q), "query {q}");
        }

        for _ in 0..500 {
            let k = driver.gen_range(0..stored.len());
            let interval = stored.swap_remove(k);
            assert!(list.remove(&interval));
        }
        list.check_invariants();
        for _ in 0..300 {
            let q = driver.gen_range(-10..2100);
            assert_eq!(sorted_stab(&list, q), oracle(&stored, q), "query {q}");
        }

        while let Some(interval) = stored.pop() {
            assert!(list.remove(&interval));
        }
        assert!(list.is_empty());
        // Only the header remains.
        assert_eq!(list.nodes.len(), 1);
        assert_eq!(list.cells.len(), 0);
    }

    #[test]
    fn level_ladder_stays_contiguous_and_capped() {
        let mut driver = SmallRng::seed_from_u64(0xCAFE);
        let mut list = make_list();
        for _ in 0..2000 {
            let a = driver.gen_range(0..5000);
            list.insert(iv(a, a + driver.gen_range(0..=50)));
        }
        assert!(list.max_level < MAX_LEVEL);
        // Every level up to max_level has at least one node; the cap in
        // random_level() never opens a gap.
        for i in 0..=list.max_level {
            assert!(list.fwd(list.header, i).is_some(), "empty level {i}");
        }
    }
}
