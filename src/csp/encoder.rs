//! Order encoding of finite-domain integer constraints into CNF.
//!
//! An integer `x` with domain `[lb, ub]` gets `ub - lb` Boolean variables
//! `p(x, v)` meaning `x <= v` for `v` in `lb..ub`, chained by the axioms
//! `p(x, v) -> p(x, v + 1)`. `x <= v` is constant false below `lb` and
//! constant true from `ub` upwards.
//!
//! A linear constraint `sum(a_i * x_i) <= c` is encoded recursively: the
//! first variable is enumerated over its feasible values and the remaining
//! sum is bounded accordingly. Branches whose remaining sum can never
//! exceed its bound are pruned. Sums with more than three terms are first
//! folded into a chain of auxiliary partial sums, so no single constraint
//! enumerates more than two variables.

use crate::csp::domain::Domain;
use crate::csp::expr::{Cmp, Constraint, IntVar, LinExpr};
use crate::csp::session::MAX_DOMAIN_SIZE;
use crate::error::EngineError;
use crate::sat::assignment::Solutions;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Variable;
use itertools::Itertools;
use num_integer::Integer;
use num_rational::Rational64;
use num_traits::CheckedMul;
use rustc_hash::FxHashMap;
use std::ops::Not;

/// Largest `sum(|a_i| * max|x_i|) + |c|` accepted, leaving headroom for the
/// intermediate sums of the recursion.
const MAGNITUDE_LIMIT: i128 = (i64::MAX / 4) as i128;

/// Longest sum encoded directly. Longer ones go through partial sums.
const MAX_DIRECT_TERMS: usize = 3;

/// Literal of the encoding, with constant truth values folded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolLit {
    /// Constant truth.
    True,
    /// Constant falsity.
    False,
    /// A DIMACS literal.
    Lit(i32),
}

impl Not for BoolLit {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Lit(l) => Self::Lit(-l),
        }
    }
}

fn negated(axs: &[(i64, IntVar)]) -> Vec<(i64, IntVar)> {
    axs.iter().map(|&(a, x)| (-a, x)).collect()
}

fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

fn ceil_div(a: i64, b: i64) -> i64 {
    -floor_div(-a, b)
}

/// Maps each integer variable to its block of order literals. Produced by
/// [`OrderEncoder::finish`] and used to decode Boolean models.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderLayout {
    domains: Vec<Domain>,
    codes: Vec<i32>,
    declared: usize,
}

impl OrderLayout {
    /// Integer value of every declared variable under `solutions`: the
    /// smallest `v` with `x <= v` true, or the upper bound if none is.
    /// Auxiliary partial sums are not reported.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn decode(&self, solutions: &Solutions) -> Vec<i64> {
        self.domains
            .iter()
            .zip(&self.codes)
            .take(self.declared)
            .map(|(d, &code)| {
                (0..d.ub() - d.lb())
                    .find(|&i| solutions.is_true((i64::from(code) + i) as Variable))
                    .map_or(d.ub(), |i| d.lb() + i)
            })
            .collect()
    }
}

/// Compiles the constraints of one session into a single CNF.
#[derive(Debug)]
pub struct OrderEncoder {
    layout: OrderLayout,
    next_var: i32,
    value_lits: FxHashMap<(IntVar, i64), i32>,
    cnf: Cnf,
}

impl OrderEncoder {
    /// Allocates order literals for every domain and emits the order axioms.
    ///
    /// # Errors
    ///
    /// `EngineError::Overflow` if the Boolean variables do not fit in a
    /// DIMACS literal.
    pub fn new(domains: &[Domain]) -> Result<Self, EngineError> {
        let mut encoder = Self {
            layout: OrderLayout {
                domains: Vec::with_capacity(domains.len()),
                codes: Vec::with_capacity(domains.len()),
                declared: domains.len(),
            },
            next_var: 1,
            value_lits: FxHashMap::default(),
            cnf: Cnf::default(),
        };

        for &d in domains {
            encoder.fresh_integer(d)?;
        }

        Ok(encoder)
    }

    /// Allocates the order literals of a new integer and chains them.
    fn fresh_integer(&mut self, domain: Domain) -> Result<IntVar, EngineError> {
        let n = i32::try_from(domain.ub() - domain.lb())
            .map_err(|_| EngineError::Overflow("order literal count".to_string()))?;
        let code = self.fresh_block(n)?;
        for i in 0..n.saturating_sub(1) {
            self.push_clause(vec![-(code + i), code + i + 1]);
        }
        self.layout.domains.push(domain);
        self.layout.codes.push(code);
        Ok(IntVar(self.layout.domains.len() - 1))
    }

    fn fresh_block(&mut self, n: i32) -> Result<i32, EngineError> {
        let code = self.next_var;
        self.next_var = self
            .next_var
            .checked_add(n)
            .ok_or_else(|| EngineError::Overflow("Boolean variable count".to_string()))?;
        Ok(code)
    }

    fn domain(&self, x: IntVar) -> Domain {
        self.layout.domains[x.index()]
    }

    /// The literal for `x <= v`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn le(&self, x: IntVar, v: i64) -> BoolLit {
        let d = self.domain(x);
        if v < d.lb() {
            BoolLit::False
        } else if v >= d.ub() {
            BoolLit::True
        } else {
            BoolLit::Lit(self.layout.codes[x.index()] + (v - d.lb()) as i32)
        }
    }

    /// The literal for `a * x <= c`.
    fn le_ax(&self, a: i64, x: IntVar, c: i64) -> BoolLit {
        if a > 0 {
            self.le(x, floor_div(c, a))
        } else {
            !self.le(x, ceil_div(c, a) - 1)
        }
    }

    fn lb_ax(&self, a: i64, x: IntVar) -> i64 {
        let d = self.domain(x);
        if a > 0 { a * d.lb() } else { a * d.ub() }
    }

    fn ub_ax(&self, a: i64, x: IntVar) -> i64 {
        let d = self.domain(x);
        if a > 0 { a * d.ub() } else { a * d.lb() }
    }

    fn lb_sum(&self, axs: &[(i64, IntVar)]) -> i64 {
        axs.iter().map(|&(a, x)| self.lb_ax(a, x)).sum()
    }

    fn ub_sum(&self, axs: &[(i64, IntVar)]) -> i64 {
        axs.iter().map(|&(a, x)| self.ub_ax(a, x)).sum()
    }

    fn push_clause(&mut self, lits: Vec<i32>) {
        self.cnf.add_clause(Clause::new(&lits));
    }

    /// Adds a clause, dropping false literals and skipping it entirely if a
    /// literal is true.
    fn add_clause(&mut self, lits: &[BoolLit]) {
        let mut clause = Vec::with_capacity(lits.len());
        for lit in lits {
            match *lit {
                BoolLit::True => return,
                BoolLit::False => {}
                BoolLit::Lit(l) => clause.push(l),
            }
        }
        self.push_clause(clause);
    }

    /// Encodes one asserted constraint.
    ///
    /// # Errors
    ///
    /// `EngineError::Overflow` if the scaled coefficients or the bounds of a
    /// linear constraint leave the safe `i64` range.
    pub fn encode(&mut self, constraint: &Constraint) -> Result<(), EngineError> {
        match constraint {
            Constraint::Linear { expr, cmp } => self.encode_linear(expr, *cmp),
            Constraint::AllDifferent(vars) => self.encode_all_different(vars),
            Constraint::And(cs) => cs.iter().try_for_each(|c| self.encode(c)),
        }
    }

    /// Scales `expr` by the LCM of its denominators, giving integer terms
    /// and an integer constant with the same sign behaviour.
    fn integer_terms(&self, expr: &LinExpr) -> Result<(Vec<(i64, IntVar)>, i64), EngineError> {
        let overflow = || EngineError::Overflow(expr.to_string());

        let lcm = expr
            .terms()
            .map(|(_, c)| *c.denom())
            .try_fold(*expr.constant_term().denom(), |acc, d| {
                acc.checked_mul(d / acc.gcd(&d))
            })
            .ok_or_else(overflow)?;
        let scale = Rational64::from_integer(lcm);

        let to_int = |r: Rational64| -> Result<i64, EngineError> {
            let scaled = r.checked_mul(&scale).ok_or_else(overflow)?;
            debug_assert!(scaled.is_integer());
            Ok(scaled.to_integer())
        };

        let axs = expr
            .terms()
            .map(|(x, c)| to_int(c).map(|a| (a, x)))
            .collect::<Result<Vec<_>, _>>()?;
        let k = to_int(expr.constant_term())?;

        let magnitude = axs.iter().fold(i128::from(k).abs(), |acc, &(a, x)| {
            let d = self.domain(x);
            acc.saturating_add(
                i128::from(a).abs() * i128::from(d.lb().unsigned_abs().max(d.ub().unsigned_abs())),
            )
        });
        if magnitude > MAGNITUDE_LIMIT {
            return Err(overflow());
        }

        Ok((axs, k))
    }

    fn encode_linear(&mut self, expr: &LinExpr, cmp: Cmp) -> Result<(), EngineError> {
        let (axs, k) = self.integer_terms(expr)?;
        let (lo, hi) = match cmp {
            Cmp::Le => (None, Some(-k)),
            Cmp::Ge => (Some(-k), None),
            Cmp::Eq => (Some(-k), Some(-k)),
        };

        let Some(axs) = self.split_sum(axs, lo, hi)? else {
            self.push_clause(Vec::new());
            return Ok(());
        };
        if let Some(hi) = hi {
            self.encode_sum_le(axs.clone(), hi);
        }
        if let Some(lo) = lo {
            self.encode_sum_le(negated(&axs), -lo);
        }
        Ok(())
    }

    /// Rewrites `lo <= sum(axs) <= hi` over at most `MAX_DIRECT_TERMS` terms
    /// by folding terms into partial sums `s_i = s_(i-1) + a_i * x_i`.
    ///
    /// Each partial sum is divided by the gcd of its coefficients, and its
    /// domain is cut to what the remaining terms still allow. `None` means
    /// such a domain came out empty, so the constraint cannot hold.
    fn split_sum(
        &mut self,
        mut axs: Vec<(i64, IntVar)>,
        lo: Option<i64>,
        hi: Option<i64>,
    ) -> Result<Option<Vec<(i64, IntVar)>>, EngineError> {
        if axs.len() <= MAX_DIRECT_TERMS {
            return Ok(Some(axs));
        }
        axs.sort_by_key(|&(_, x)| self.domain(x).size());

        let last = axs.len() - 1;
        let mut acc = axs[0];
        for (i, &(a, x)) in axs.iter().enumerate().take(last).skip(1) {
            let rest = &axs[i + 1..];
            let g = acc.0.gcd(&a);
            let parts = [(acc.0 / g, acc.1), (a / g, x)];

            let mut lb = self.lb_sum(&parts);
            let mut ub = self.ub_sum(&parts);
            if let Some(hi) = hi {
                ub = ub.min(floor_div(hi - self.lb_sum(rest), g));
            }
            if let Some(lo) = lo {
                lb = lb.max(ceil_div(lo - self.ub_sum(rest), g));
            }
            let Some(domain) = Domain::new(lb, ub) else {
                return Ok(None);
            };
            if domain.size() > MAX_DOMAIN_SIZE {
                return Err(EngineError::Overflow(format!(
                    "partial sum over [{lb}, {ub}]"
                )));
            }

            let s = self.fresh_integer(domain)?;
            let definition = vec![parts[0], parts[1], (-1, s)];
            self.encode_sum_le(negated(&definition), 0);
            self.encode_sum_le(definition, 0);
            acc = (g, s);
        }
        log::trace!("split a sum of {} terms into {} partial sums", axs.len(), last - 1);

        Ok(Some(vec![acc, axs[last]]))
    }

    /// `sum(a_i * x_i) <= c`
    fn encode_sum_le(&mut self, mut axs: Vec<(i64, IntVar)>, c: i64) {
        axs.sort_by_key(|&(_, x)| self.domain(x).size());
        let mut clause0 = Vec::new();
        self.encode_le(&axs, c, &mut clause0);
    }

    fn encode_le(&mut self, axs: &[(i64, IntVar)], c: i64, clause0: &mut Vec<BoolLit>) {
        if self.ub_sum(axs) <= c {
            return;
        }

        match axs {
            [] => self.add_clause(clause0),
            &[(a, x)] => {
                clause0.push(self.le_ax(a, x, c));
                self.add_clause(clause0);
                clause0.pop();
            }
            &[(a, x), ref rest @ ..] => {
                let d = self.domain(x);
                let slack = c - self.lb_sum(rest);
                if a > 0 {
                    let ub0 = floor_div(slack, a);
                    for b in d.lb()..=d.ub().min(ub0) {
                        self.branch(self.le(x, b - 1), rest, c - a * b, clause0);
                    }
                    if d.ub() > ub0 {
                        clause0.push(self.le(x, ub0));
                        self.add_clause(clause0);
                        clause0.pop();
                    }
                } else {
                    let lb0 = ceil_div(slack, a);
                    for b in d.lb().max(lb0)..=d.ub() {
                        self.branch(!self.le(x, b), rest, c - a * b, clause0);
                    }
                    if d.lb() < lb0 {
                        clause0.push(!self.le(x, lb0 - 1));
                        self.add_clause(clause0);
                        clause0.pop();
                    }
                }
            }
        }
    }

    /// Recurses on `rest <= c` under the escape literal `lit`.
    fn branch(
        &mut self,
        lit: BoolLit,
        rest: &[(i64, IntVar)],
        c: i64,
        clause0: &mut Vec<BoolLit>,
    ) {
        match lit {
            BoolLit::True => {}
            BoolLit::False => self.encode_le(rest, c, clause0),
            BoolLit::Lit(_) => {
                clause0.push(lit);
                self.encode_le(rest, c, clause0);
                clause0.pop();
            }
        }
    }

    /// Literal for `x = v`, defined as `x <= v` and not `x <= v - 1`.
    fn value_lit(&mut self, x: IntVar, v: i64) -> Result<i32, EngineError> {
        if let Some(&lit) = self.value_lits.get(&(x, v)) {
            return Ok(lit);
        }
        let e = self.fresh_block(1)?;
        let le_v = self.le(x, v);
        let le_prev = self.le(x, v - 1);
        let lit = BoolLit::Lit(e);
        self.add_clause(&[!lit, le_v]);
        self.add_clause(&[!lit, !le_prev]);
        self.add_clause(&[lit, !le_v, le_prev]);
        self.value_lits.insert((x, v), e);
        Ok(e)
    }

    /// Pairwise exclusion on value literals. When there are exactly as many
    /// values as variables, every value must also be taken by someone.
    fn encode_all_different(&mut self, vars: &[IntVar]) -> Result<(), EngineError> {
        for (&x, &y) in vars.iter().tuple_combinations() {
            let (dx, dy) = (self.domain(x), self.domain(y));
            for v in dx.lb().max(dy.lb())..=dx.ub().min(dy.ub()) {
                let ex = self.value_lit(x, v)?;
                let ey = self.value_lit(y, v)?;
                self.push_clause(vec![-ex, -ey]);
            }
        }

        let distinct = vars.iter().unique().count();
        let values = vars
            .iter()
            .flat_map(|&x| self.domain(x).values())
            .unique()
            .collect_vec();
        if distinct == values.len() {
            for v in values {
                let holders = vars
                    .iter()
                    .unique()
                    .filter(|&&x| self.domain(x).contains(v))
                    .copied()
                    .collect_vec();
                let clause = holders
                    .into_iter()
                    .map(|x| self.value_lit(x, v))
                    .collect::<Result<Vec<_>, _>>()?;
                self.push_clause(clause);
            }
        }
        Ok(())
    }

    /// Number of Boolean variables allocated so far.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn num_bool_vars(&self) -> usize {
        (self.next_var - 1) as usize
    }

    /// Closes the encoding, returning the formula and the layout needed to
    /// decode its models.
    #[must_use]
    pub fn finish(mut self) -> (Cnf, OrderLayout) {
        self.cnf.ensure_vars(self.num_bool_vars());
        (self.cnf, self.layout)
    }
}
