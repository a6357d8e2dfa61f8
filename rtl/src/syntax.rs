// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The AST for properties and transition-system descriptions.

use serde::Serialize;
use std::fmt;

/// Unary operators
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, PartialOrd, Ord)]
pub enum UOp {
    /// Boolean negation
    Not,
    /// Gives the value of the argument one cycle in the future; only
    /// meaningful inside a transition relation
    Prime,
    /// Gives the value of the argument one cycle in the past; must be
    /// eliminated before any checking starts
    Past,
    /// LTL next
    Next,
    /// LTL eventually
    Eventually,
    /// LTL always
    Always,
    /// CTL next on all paths
    AX,
    /// CTL eventually on all paths
    AF,
    /// CTL always on all paths
    AG,
    /// CTL next on some path
    EX,
    /// CTL eventually on some path
    EF,
    /// CTL always on some path
    EG,
    /// SVA weak always
    SvaAlways,
    /// SVA strong eventually
    SvaSEventually,
    /// SVA weak nexttime
    SvaNexttime,
    /// SVA strong nexttime
    SvaSNexttime,
}

/// Binary operators
#[allow(missing_docs)]
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, PartialOrd, Ord)]
pub enum BinOp {
    Equals,
    NotEquals,
    Implies,
    Iff,
    /// LTL strong until
    Until,
    /// LTL weak until
    WeakUntil,
    /// LTL weak release
    Release,
    /// LTL strong release
    StrongRelease,
    /// CTL until on some path, written `E[p U q]`
    EUntil,
    /// SVA weak until
    SvaUntil,
    /// SVA strong until
    SvaSUntil,
    /// SVA weak until, including the cycle where the right-hand side holds
    SvaUntilWith,
    /// SVA strong until, including the cycle where the right-hand side holds
    SvaSUntilWith,
    /// SVA property implication (not a sequence operator)
    SvaImplies,
    /// SVA property equivalence (not a sequence operator)
    SvaIff,
}

/// N-ary logical operators
#[allow(missing_docs)]
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, PartialOrd, Ord)]
pub enum NOp {
    And,
    Or,
}

/// The upper end of a cycle range: a constant or `$`.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, PartialOrd, Ord)]
pub enum Bound {
    /// A constant number of cycles
    Finite(i64),
    /// `$`, i.e. the end of time
    Unbounded,
}

/// A range of cycles `[from:to]`, as used by ranged SVA operators,
/// cycle delays, and repetitions.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, PartialOrd, Ord)]
pub struct CycleRange {
    /// First cycle of the range
    pub from: i64,
    /// Last cycle of the range, possibly `$`
    pub to: Bound,
}

impl CycleRange {
    /// A singleton range `[n:n]`.
    pub fn singleton(n: i64) -> Self {
        CycleRange {
            from: n,
            to: Bound::Finite(n),
        }
    }

    /// Whether the range ends in `$`.
    pub fn is_unbounded(&self) -> bool {
        self.to == Bound::Unbounded
    }
}

/// How often a sequence repetition `[*...]` repeats its operand.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, PartialOrd, Ord)]
pub enum Repetition {
    /// `[*]`
    Any,
    /// `[*n]`
    Count(i64),
    /// `[*n:m]` or `[*n:$]`
    Range(i64, Bound),
}

/// A cycle delay `##...` in front of a sequence.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, PartialOrd, Ord)]
pub enum Delay {
    /// `##n`
    Exact(i64),
    /// `##[n:m]` or `##[n:$]`
    Range(i64, Bound),
}

/// The match semantics of a sequence used as a property. Strong flavours
/// require a completed match within the unwinding; weak flavours accept
/// matches cut off at the boundary. The implicit flavours are inserted
/// where a bare sequence appears in property position.
#[allow(missing_docs)]
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, PartialOrd, Ord)]
pub enum Strength {
    Strong,
    Weak,
    ImplicitStrong,
    ImplicitWeak,
}

impl Strength {
    /// Whether this flavour demands a completed match.
    pub fn is_strong(&self) -> bool {
        matches!(self, Strength::Strong | Strength::ImplicitStrong)
    }
}

/// An Expr is a boolean formula over the symbols of a transition system,
/// a temporal property over such formulas (in LTL, a CTL subset, or the
/// SVA property language), or an SVA sequence expression. The three
/// layers share one type; extraction and compilation enforce which layer
/// is allowed where.
#[derive(PartialEq, Eq, Clone, Debug, Hash, PartialOrd, Ord)]
pub enum Expr {
    /// A constant true or false
    Literal(bool),
    /// A reference to a declared symbol
    Id(String),
    /// An applied unary operation
    UnaryOp(UOp, Box<Expr>),
    /// An applied binary operation
    BinOp(BinOp, Box<Expr>, Box<Expr>),
    /// An applied n-ary operation
    NAryOp(NOp, Vec<Expr>),
    /// If-then-else
    Ite {
        /// A boolean conditional
        cond: Box<Expr>,
        /// Value of the Ite when `cond` is true
        then: Box<Expr>,
        /// Value of the Ite when `cond` is false
        else_: Box<Expr>,
    },

    /// SVA weak eventually with a bounded window, `eventually [m:n] φ`
    SvaEventually {
        /// The cycle window, relative to the current cycle
        range: CycleRange,
        /// The property that must hold somewhere in the window
        op: Box<Expr>,
    },
    /// SVA strong eventually with a window, `s_eventually [m:n] φ`
    SvaRangedSEventually {
        /// The cycle window, relative to the current cycle
        range: CycleRange,
        /// The property that must hold somewhere in the window
        op: Box<Expr>,
    },
    /// SVA always with a window: `always [m:n] φ` (weak) or
    /// `s_always [m:n] φ` (strong)
    SvaRangedAlways {
        /// Strong flavour requires the window to be reachable
        strong: bool,
        /// The cycle window, relative to the current cycle
        range: CycleRange,
        /// The property that must hold throughout the window
        op: Box<Expr>,
    },

    /// A sequence used as a property, with explicit or implicit strength
    SvaSequence {
        /// Match semantics
        strength: Strength,
        /// The underlying sequence expression
        sequence: Box<Expr>,
    },
    /// Sequence implication `seq |-> prop` / `seq |=> prop`: every match
    /// of the antecedent sequence triggers the consequent property
    SvaImplication {
        /// `|->` when true, `|=>` when false
        overlapped: bool,
        /// Antecedent sequence
        sequence: Box<Expr>,
        /// Consequent property
        property: Box<Expr>,
    },
    /// Followed-by `seq #-# prop` / `seq #=# prop`: some match of the
    /// sequence is followed by the property
    SvaFollowedBy {
        /// `#-#` when true, `#=#` when false
        overlapped: bool,
        /// Antecedent sequence
        sequence: Box<Expr>,
        /// Consequent property
        property: Box<Expr>,
    },

    /// A state predicate used as a one-cycle sequence
    SvaBoolean(Box<Expr>),
    /// Sequence fusion `a ##0 b`: `b` starts in the cycle `a` ends in
    SeqConcat(Box<Expr>, Box<Expr>),
    /// Sequence repetition `a [*...]`
    SeqRepeat {
        /// The repeated sequence
        op: Box<Expr>,
        /// How often it repeats
        repetition: Repetition,
    },
    /// A delayed sequence `##d a`
    SeqDelay {
        /// The delay in cycles
        delay: Delay,
        /// The delayed sequence
        op: Box<Expr>,
    },
    /// Sequence intersection: both operands match, starting together,
    /// ending with whichever finishes last
    SeqAnd(Box<Expr>, Box<Expr>),
    /// Sequence union: any operand matches
    SeqOr(Vec<Expr>),
}

impl Expr {
    /// The constant `true`.
    pub fn true_() -> Self {
        Self::Literal(true)
    }

    /// The constant `false`.
    pub fn false_() -> Self {
        Self::Literal(false)
    }

    /// Smart constructor for a symbol reference
    pub fn id<S: AsRef<str>>(s: S) -> Self {
        Self::Id(s.as_ref().to_string())
    }

    /// Smart constructor equivalent to the conjunction of an iterator of
    /// exprs; the empty conjunction is `true`
    pub fn and<I>(es: I) -> Self
    where
        I: IntoIterator<Item = Expr>,
    {
        let mut es: Vec<Expr> = es.into_iter().collect();
        if es.is_empty() {
            return Expr::Literal(true);
        } else if es.len() == 1 {
            return es.pop().unwrap();
        }
        Self::NAryOp(NOp::And, es)
    }

    /// Smart constructor equivalent to the disjunction of an iterator of
    /// exprs; the empty disjunction is `false`
    pub fn or<I>(es: I) -> Self
    where
        I: IntoIterator<Item = Expr>,
    {
        let mut es: Vec<Expr> = es.into_iter().collect();
        if es.is_empty() {
            return Expr::Literal(false);
        } else if es.len() == 1 {
            return es.pop().unwrap();
        }
        Self::NAryOp(NOp::Or, es)
    }

    /// Convenience function to create `!e`
    pub fn negate(e: Expr) -> Self {
        Self::UnaryOp(UOp::Not, Box::new(e))
    }

    /// Convenience function to create `lhs -> rhs`
    pub fn implies(lhs: Expr, rhs: Expr) -> Self {
        Self::BinOp(BinOp::Implies, Box::new(lhs), Box::new(rhs))
    }

    /// Convenience function to create `lhs <-> rhs`
    pub fn iff(lhs: Expr, rhs: Expr) -> Self {
        Self::BinOp(BinOp::Iff, Box::new(lhs), Box::new(rhs))
    }

    /// Convenience function to create `lhs = rhs`
    pub fn equals(lhs: Expr, rhs: Expr) -> Self {
        Self::BinOp(BinOp::Equals, Box::new(lhs), Box::new(rhs))
    }

    /// Convenience function to create an if-then-else
    pub fn ite(cond: Expr, then: Expr, else_: Expr) -> Self {
        Self::Ite {
            cond: Box::new(cond),
            then: Box::new(then),
            else_: Box::new(else_),
        }
    }

    /// Convenience function to create LTL `X e`
    pub fn next(e: Expr) -> Self {
        Self::UnaryOp(UOp::Next, Box::new(e))
    }

    /// Convenience function to create LTL `F e`
    pub fn eventually(e: Expr) -> Self {
        Self::UnaryOp(UOp::Eventually, Box::new(e))
    }

    /// Convenience function to create LTL `G e`
    pub fn always(e: Expr) -> Self {
        Self::UnaryOp(UOp::Always, Box::new(e))
    }

    /// The immediate subexpressions of this node.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Literal(_) | Expr::Id(_) => vec![],
            Expr::UnaryOp(_, e) => vec![e.as_ref()],
            Expr::BinOp(_, lhs, rhs) => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::NAryOp(_, es) => es.iter().collect(),
            Expr::Ite { cond, then, else_ } => {
                vec![cond.as_ref(), then.as_ref(), else_.as_ref()]
            }
            Expr::SvaEventually { op, .. }
            | Expr::SvaRangedSEventually { op, .. }
            | Expr::SvaRangedAlways { op, .. } => vec![op.as_ref()],
            Expr::SvaSequence { sequence, .. } => vec![sequence.as_ref()],
            Expr::SvaImplication {
                sequence, property, ..
            }
            | Expr::SvaFollowedBy {
                sequence, property, ..
            } => vec![sequence.as_ref(), property.as_ref()],
            Expr::SvaBoolean(e) => vec![e.as_ref()],
            Expr::SeqConcat(lhs, rhs) => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::SeqRepeat { op, .. } => vec![op.as_ref()],
            Expr::SeqDelay { op, .. } => vec![op.as_ref()],
            Expr::SeqAnd(lhs, rhs) => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::SeqOr(es) => es.iter().collect(),
        }
    }

    /// Whether `pred` holds for this node or any node below it.
    pub fn contains(&self, pred: &impl Fn(&Expr) -> bool) -> bool {
        pred(self) || self.children().into_iter().any(|e| e.contains(pred))
    }
}

/// What kind of value a declared symbol is.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize)]
pub enum SymbolKind {
    /// A state-holding element; part of the lasso state
    Register,
    /// A free input, unconstrained in every cycle
    Input,
}

/// The declaration of a single symbol as part of a Signature
#[derive(PartialEq, Eq, Clone, Debug, Serialize)]
pub struct SymbolDecl {
    /// The name of the symbol
    pub name: String,
    /// Register or input
    pub kind: SymbolKind,
}

/// A Signature defines the state space of a transition system: its
/// registers and inputs, all boolean.
#[derive(PartialEq, Eq, Clone, Debug, Serialize, Default)]
pub struct Signature {
    /// Declarations, in source order
    pub symbols: Vec<SymbolDecl>,
}

impl Signature {
    /// Check if `name` is declared.
    pub fn contains_name(&self, name: &str) -> bool {
        self.symbols.iter().any(|s| s.name == name)
    }

    /// The registers of the signature, in declaration order.
    pub fn registers(&self) -> impl Iterator<Item = &SymbolDecl> {
        self.symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Register)
    }
}

/// A statement in a transition-system description.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Stmt {
    /// A conjunct of the initial-state predicate
    Init(Expr),
    /// A conjunct of the transition relation
    Trans(Expr),
    /// A property that is assumed to hold
    Assume {
        /// Optional label
        name: Option<String>,
        /// The assumed property
        property: Expr,
    },
    /// A property to check
    Assert {
        /// Optional label
        name: Option<String>,
        /// The property
        property: Expr,
    },
}

/// A parsed input file: a signature followed by statements.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Module {
    /// The declared symbols
    pub signature: Signature,
    /// The statements, in source order
    pub statements: Vec<Stmt>,
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::printer::expr(self))
    }
}
