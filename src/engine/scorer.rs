//! Recursive structural-complexity scorer
//!
//! Walks a type-expression tree depth-first, producing a non-negative
//! score per node. Scores are memoized per node identity for the pass,
//! attenuated by a depth-decay multiplier, and (under performance mode)
//! accumulated under a hard ceiling so one pathological type cannot
//! dominate a run.
//!
//! Self-referential structures are handled structurally: a node already
//! on the recursion stack scores as a fixed sentinel instead of
//! recursing, so the walk is bounded by type-nesting depth on any input.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::{NodeId, TypeExprArena, TypeExprKind};
use crate::config::RuleConfig;

/// Score returned for a reentrant visit of a node already on the stack.
///
/// A genuine score of 50 is indistinguishable from a detected cycle;
/// callers that need to tell them apart do not exist today.
pub const CYCLE_SENTINEL: f64 = 50.0;

/// Depth-decay multiplier signature. Injectable so tests can exercise
/// the scorer without the zeroing behavior of the default at depth 0.
pub type DecayFn = fn(u32) -> f64;

/// Default decay: `log2(depth + 1)`.
///
/// At depth 0 this is `log2(1) = 0`, which zeroes any score computed at
/// the root. Callers that want undamped totals enter at depth 1; see
/// [`super::DECLARATION_DEPTH`].
pub fn log2_decay(depth: u32) -> f64 {
    ((depth + 1) as f64).log2()
}

/// Identity-keyed memo table plus the active-visit set (cycle guard).
///
/// Keyed on [`NodeId`], never on structure: two structurally identical
/// but distinct nodes must not collide. One instance per analysis pass,
/// freshly constructed for each file.
#[derive(Debug, Default)]
pub struct ScoreCache {
    scores: FxHashMap<NodeId, f64>,
    active: FxHashSet<NodeId>,
}

impl ScoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, id: NodeId) -> bool {
        self.scores.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<f64> {
        self.scores.get(&id).copied()
    }

    pub fn put(&mut self, id: NodeId, score: f64) {
        self.scores.insert(id, score);
    }

    pub fn mark(&mut self, id: NodeId) {
        self.active.insert(id);
    }

    pub fn unmark(&mut self, id: NodeId) {
        self.active.remove(&id);
    }

    pub fn is_active(&self, id: NodeId) -> bool {
        self.active.contains(&id)
    }
}

/// The recursive scoring engine. Deterministic and pure with respect to
/// the pass-scoped cache: the same node always yields the same result
/// within a pass. Never panics on well-formed or cyclic input.
pub struct ComplexityScorer<'a> {
    config: &'a RuleConfig,
    cache: ScoreCache,
    decay: DecayFn,
    decay_memo: FxHashMap<u32, f64>,
}

impl<'a> ComplexityScorer<'a> {
    pub fn new(config: &'a RuleConfig) -> Self {
        Self::with_decay(config, log2_decay)
    }

    /// Construct with a custom decay function. Test seam: the default
    /// decay zeroes depth-0 scores, which hides every other term.
    pub fn with_decay(config: &'a RuleConfig, decay: DecayFn) -> Self {
        Self {
            config,
            cache: ScoreCache::new(),
            decay,
            decay_memo: FxHashMap::default(),
        }
    }

    /// Score a node at the given depth. Children are scored at
    /// `depth + 1`; the accumulated total is multiplied once by the
    /// decay for `depth`.
    pub fn score(&mut self, arena: &TypeExprArena, node: NodeId, depth: u32) -> f64 {
        if let Some(cached) = self.cache.get(node) {
            return cached;
        }
        if self.cache.is_active(node) {
            return CYCLE_SENTINEL;
        }
        self.cache.mark(node);
        let raw = self.accumulate(arena, node, depth);
        let result = raw * self.depth_multiplier(depth);
        self.cache.unmark(node);
        self.cache.put(node, result);
        result
    }

    /// One additive step. Under performance mode the running total is
    /// clamped so it never exceeds `error_threshold * 2`.
    fn add(&self, current: f64, addition: f64) -> f64 {
        if self.config.performance_mode {
            (current + addition).min(self.config.ceiling())
        } else {
            current + addition
        }
    }

    fn depth_multiplier(&mut self, depth: u32) -> f64 {
        if let Some(&m) = self.decay_memo.get(&depth) {
            return m;
        }
        let m = (self.decay)(depth);
        self.decay_memo.insert(depth, m);
        m
    }

    /// Kind-specific base plus child contributions, before decay.
    fn accumulate(&mut self, arena: &TypeExprArena, node: NodeId, depth: u32) -> f64 {
        let child_depth = depth + 1;
        match &arena.get(node).kind {
            TypeExprKind::Primitive => self.add(0.0, 1.0),
            TypeExprKind::ShortCircuit => 0.0,
            TypeExprKind::Interface {
                extends_count,
                members,
            } => {
                let base = self.config.interface_penalty
                    + 5.0 * *extends_count as f64
                    + 2.0 * members.len() as f64;
                let mut total = self.add(0.0, base);
                for member in members {
                    if let Some(ty) = member.ty {
                        let s = self.score(arena, ty, child_depth);
                        total = self.add(total, s);
                    }
                }
                total
            }
            TypeExprKind::TypeLiteral { members } => {
                let mut total = self.add(0.0, 2.0 + 0.5 * members.len() as f64);
                for member in members {
                    if let Some(ty) = member.ty {
                        let s = self.score(arena, ty, child_depth);
                        total = self.add(total, s);
                    }
                }
                total
            }
            TypeExprKind::Union { branches } => {
                let mut total = 0.0;
                for &branch in branches {
                    let s = self.score(arena, branch, child_depth);
                    total = self.add(total, s);
                }
                total = self.add(total, 2.0 * branches.len().saturating_sub(1) as f64);
                total
            }
            TypeExprKind::Intersection { branches } => {
                let mut total = 0.0;
                for &branch in branches {
                    let s = self.score(arena, branch, child_depth);
                    total = self.add(total, s);
                }
                total = self.add(total, 3.0 * branches.len() as f64);
                total
            }
            TypeExprKind::Array { element } => {
                let s = self.score(arena, *element, child_depth);
                let total = self.add(0.0, s);
                self.add(total, 1.0)
            }
            TypeExprKind::Tuple { elements } => {
                let mut total = self.add(0.0, 1.0);
                for element in elements {
                    if element.rest || element.optional {
                        continue;
                    }
                    let s = self.score(arena, element.ty, child_depth);
                    total = self.add(total, s);
                }
                total = self.add(total, 1.5 * elements.len() as f64);
                total
            }
            TypeExprKind::Reference { args } => {
                let mut total = self.add(0.0, 2.0);
                for &arg in args {
                    let s = self.score(arena, arg, child_depth);
                    total = self.add(total, s);
                    total = self.add(total, 2.0);
                }
                total
            }
            TypeExprKind::Conditional {
                check,
                extends,
                true_branch,
                false_branch,
            } => {
                let limbs = [*check, *extends, *true_branch, *false_branch];
                let mut total = self.add(0.0, 3.0);
                for limb in limbs {
                    let s = self.score(arena, limb, child_depth);
                    total = self.add(total, s);
                }
                total
            }
            TypeExprKind::Mapped { constraint, value } => {
                let mut total = self.add(0.0, 5.0);
                if let Some(constraint) = *constraint {
                    let s = self.score(arena, constraint, child_depth);
                    total = self.add(total, s);
                }
                if let Some(value) = *value {
                    let s = self.score(arena, value, child_depth);
                    total = self.add(total, s);
                }
                total
            }
            TypeExprKind::Function { params, ret } => {
                let mut total = self.add(0.0, 2.0);
                for &param in params {
                    let s = self.score(arena, param, child_depth);
                    total = self.add(total, s);
                }
                if let Some(ret) = *ret {
                    let s = self.score(arena, ret, child_depth);
                    total = self.add(total, s);
                }
                total
            }
            // Unsupported kinds fall back to a flat base instead of failing
            TypeExprKind::Other => self.add(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Member, Span, TupleElement};

    fn arena() -> TypeExprArena {
        TypeExprArena::new()
    }

    fn prim(a: &mut TypeExprArena) -> NodeId {
        a.alloc(TypeExprKind::Primitive, Span::default())
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_primitive_collapses_at_depth_zero() {
        let mut a = arena();
        let node = prim(&mut a);
        let config = RuleConfig::default();
        let mut scorer = ComplexityScorer::new(&config);
        // log2(0 + 1) = 0 wipes the base score of 1
        assert_close(scorer.score(&a, node, 0), 0.0);
    }

    #[test]
    fn test_primitive_at_depth_one() {
        let mut a = arena();
        let node = prim(&mut a);
        let config = RuleConfig::default();
        let mut scorer = ComplexityScorer::new(&config);
        assert_close(scorer.score(&a, node, 1), 1.0);
    }

    #[test]
    fn test_short_circuit_scores_zero_at_any_depth() {
        let mut a = arena();
        let node = a.alloc(TypeExprKind::ShortCircuit, Span::default());
        let config = RuleConfig::default();
        let mut scorer = ComplexityScorer::new(&config);
        assert_close(scorer.score(&a, node, 3), 0.0);
    }

    #[test]
    fn test_union_of_three_primitives() {
        let mut a = arena();
        let branches = vec![prim(&mut a), prim(&mut a), prim(&mut a)];
        let union = a.alloc(TypeExprKind::Union { branches }, Span::default());
        let config = RuleConfig::default();
        let mut scorer = ComplexityScorer::new(&config);
        // children at depth 2: 1 * log2(3) each; + 2 * (3 - 1); * log2(2)
        let child = 3.0_f64.log2();
        assert_close(scorer.score(&a, union, 1), 3.0 * child + 4.0);
    }

    #[test]
    fn test_interface_collapses_at_depth_zero() {
        let mut a = arena();
        let m1 = prim(&mut a);
        let m2 = prim(&mut a);
        let iface = a.alloc(
            TypeExprKind::Interface {
                extends_count: 0,
                members: vec![
                    Member {
                        name: "a".into(),
                        ty: Some(m1),
                    },
                    Member {
                        name: "b".into(),
                        ty: Some(m2),
                    },
                ],
            },
            Span::default(),
        );
        let config = RuleConfig::default();
        let mut scorer = ComplexityScorer::new(&config);
        assert_close(scorer.score(&a, iface, 0), 0.0);
    }

    #[test]
    fn test_interface_with_patched_decay() {
        let mut a = arena();
        let m1 = prim(&mut a);
        let m2 = prim(&mut a);
        let iface = a.alloc(
            TypeExprKind::Interface {
                extends_count: 0,
                members: vec![
                    Member {
                        name: "a".into(),
                        ty: Some(m1),
                    },
                    Member {
                        name: "b".into(),
                        ty: Some(m2),
                    },
                ],
            },
            Span::default(),
        );
        let config = RuleConfig::default();
        let mut scorer = ComplexityScorer::with_decay(&config, |_| 1.0);
        // base 20 + 2*2, plus two members at 1 each
        assert_close(scorer.score(&a, iface, 0), 26.0);
    }

    #[test]
    fn test_extends_clauses_raise_interface_base() {
        let mut a = arena();
        let iface = a.alloc(
            TypeExprKind::Interface {
                extends_count: 2,
                members: vec![],
            },
            Span::default(),
        );
        let config = RuleConfig::default();
        let mut scorer = ComplexityScorer::with_decay(&config, |_| 1.0);
        assert_close(scorer.score(&a, iface, 0), 30.0);
    }

    #[test]
    fn test_tuple_skips_rest_and_optional_elements() {
        let mut a = arena();
        let e1 = prim(&mut a);
        let e2 = prim(&mut a);
        let e3 = prim(&mut a);
        let tuple = a.alloc(
            TypeExprKind::Tuple {
                elements: vec![
                    TupleElement {
                        ty: e1,
                        optional: false,
                        rest: false,
                    },
                    TupleElement {
                        ty: e2,
                        optional: true,
                        rest: false,
                    },
                    TupleElement {
                        ty: e3,
                        optional: false,
                        rest: true,
                    },
                ],
            },
            Span::default(),
        );
        let config = RuleConfig::default();
        let mut scorer = ComplexityScorer::new(&config);
        // base 1 + one scored element (1 * log2(3)) + 1.5 * 3, * log2(2)
        assert_close(scorer.score(&a, tuple, 1), 1.0 + 3.0_f64.log2() + 4.5);
    }

    #[test]
    fn test_reference_charges_per_argument() {
        let mut a = arena();
        let k = prim(&mut a);
        let v = prim(&mut a);
        let reference = a.alloc(TypeExprKind::Reference { args: vec![k, v] }, Span::default());
        let config = RuleConfig::default();
        let mut scorer = ComplexityScorer::new(&config);
        // base 2 + (arg + 2) twice, args at 1 * log2(3) each, * log2(2)
        assert_close(
            scorer.score(&a, reference, 1),
            2.0 + 2.0 * (3.0_f64.log2() + 2.0),
        );
    }

    #[test]
    fn test_score_is_cached_per_node_identity() {
        let mut a = arena();
        let node = prim(&mut a);
        let config = RuleConfig::default();
        let mut scorer = ComplexityScorer::new(&config);
        let first = scorer.score(&a, node, 1);
        // cache is identity-keyed: a later call at a different depth
        // returns the finalized value unchanged
        assert_close(scorer.score(&a, node, 5), first);
        assert_close(scorer.score(&a, node, 1), first);
    }

    #[test]
    fn test_distinct_identical_nodes_do_not_collide() {
        let mut a = arena();
        let n1 = prim(&mut a);
        let n2 = prim(&mut a);
        let config = RuleConfig::default();
        let mut scorer = ComplexityScorer::new(&config);
        let s1 = scorer.score(&a, n1, 1);
        // structurally identical node scored at a different depth gets
        // its own entry
        let s2 = scorer.score(&a, n2, 3);
        assert_close(s1, 1.0);
        assert_close(s2, 2.0);
    }

    #[test]
    fn test_cycle_terminates_with_sentinel() {
        let mut a = arena();
        let outer = a.alloc(TypeExprKind::Other, Span::default());
        let inner = a.alloc(TypeExprKind::Array { element: outer }, Span::default());
        a.fill(
            outer,
            TypeExprKind::Union {
                branches: vec![inner],
            },
        );
        let config = RuleConfig {
            performance_mode: false,
            ..RuleConfig::default()
        };
        let mut scorer = ComplexityScorer::new(&config);
        // reentrant edge scores CYCLE_SENTINEL: inner raw = 50 + 1,
        // decayed by log2(3); outer adds 2 * (1 - 1) = 0
        let expected = 51.0 * 3.0_f64.log2();
        assert_close(scorer.score(&a, outer, 1), expected);
    }

    #[test]
    fn test_cycle_is_clamped_under_performance_mode() {
        let mut a = arena();
        let outer = a.alloc(TypeExprKind::Other, Span::default());
        let inner = a.alloc(TypeExprKind::Array { element: outer }, Span::default());
        a.fill(
            outer,
            TypeExprKind::Union {
                branches: vec![inner],
            },
        );
        let config = RuleConfig::default();
        let mut scorer = ComplexityScorer::new(&config);
        // ceiling = 25 * 2 = 50 caps the accumulated branch score
        assert_close(scorer.score(&a, outer, 1), 50.0);
    }

    #[test]
    fn test_ceiling_bounds_accumulation() {
        let mut a = arena();
        let mut branches = Vec::new();
        for _ in 0..40 {
            let members = (0..10)
                .map(|i| {
                    let ty = prim(&mut a);
                    Member {
                        name: format!("m{i}"),
                        ty: Some(ty),
                    }
                })
                .collect();
            branches.push(a.alloc(TypeExprKind::TypeLiteral { members }, Span::default()));
        }
        let union = a.alloc(TypeExprKind::Union { branches }, Span::default());
        let config = RuleConfig::default();
        let mut scorer = ComplexityScorer::new(&config);
        let score = scorer.score(&a, union, 1);
        // raw accumulation never exceeds the ceiling; final value is the
        // clamped total times the depth multiplier
        assert!(score <= config.ceiling() * log2_decay(1));
    }

    #[test]
    fn test_monotonic_in_member_count() {
        let config = RuleConfig::default();

        let score_with = |count: usize| {
            let mut a = arena();
            let members = (0..count)
                .map(|i| {
                    let ty = prim(&mut a);
                    Member {
                        name: format!("m{i}"),
                        ty: Some(ty),
                    }
                })
                .collect();
            let literal = a.alloc(TypeExprKind::TypeLiteral { members }, Span::default());
            let mut scorer = ComplexityScorer::new(&config);
            scorer.score(&a, literal, 1)
        };

        let mut prev = score_with(0);
        for count in 1..8 {
            let next = score_with(count);
            assert!(next >= prev, "adding a member decreased the score");
            prev = next;
        }
    }

    #[test]
    fn test_monotonic_in_union_branches() {
        let config = RuleConfig::default();

        let score_with = |count: usize| {
            let mut a = arena();
            let branches = (0..count).map(|_| prim(&mut a)).collect();
            let union = a.alloc(TypeExprKind::Union { branches }, Span::default());
            let mut scorer = ComplexityScorer::new(&config);
            scorer.score(&a, union, 1)
        };

        let mut prev = score_with(1);
        for count in 2..8 {
            let next = score_with(count);
            assert!(next >= prev, "adding a branch decreased the score");
            prev = next;
        }
    }

    #[test]
    fn test_unrecognized_kind_scores_flat_base() {
        let mut a = arena();
        let node = a.alloc(TypeExprKind::Other, Span::default());
        let config = RuleConfig::default();
        let mut scorer = ComplexityScorer::new(&config);
        assert_close(scorer.score(&a, node, 1), 1.0);
    }

    #[test]
    fn test_conditional_scores_all_four_limbs() {
        let mut a = arena();
        let check = prim(&mut a);
        let extends = prim(&mut a);
        let true_branch = prim(&mut a);
        let false_branch = prim(&mut a);
        let conditional = a.alloc(
            TypeExprKind::Conditional {
                check,
                extends,
                true_branch,
                false_branch,
            },
            Span::default(),
        );
        let config = RuleConfig::default();
        let mut scorer = ComplexityScorer::new(&config);
        // base 3 + four limbs at 1 * log2(3) each, * log2(2)
        assert_close(
            scorer.score(&a, conditional, 1),
            3.0 + 4.0 * 3.0_f64.log2(),
        );
    }

    #[test]
    fn test_mapped_type_with_constraint_and_value() {
        let mut a = arena();
        let constraint = prim(&mut a);
        let value = prim(&mut a);
        let mapped = a.alloc(
            TypeExprKind::Mapped {
                constraint: Some(constraint),
                value: Some(value),
            },
            Span::default(),
        );
        let config = RuleConfig::default();
        let mut scorer = ComplexityScorer::new(&config);
        assert_close(scorer.score(&a, mapped, 1), 5.0 + 2.0 * 3.0_f64.log2());
    }
}
