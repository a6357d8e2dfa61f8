// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! A pretty printer for exprs, producing the same syntax the parser reads.

use crate::syntax::*;

fn precedence(e: &Expr) -> usize {
    use self::BinOp::*;
    use Expr::*;
    use UOp::*;

    match e {
        SvaImplication { .. } | SvaFollowedBy { .. } => 5,
        Expr::BinOp(Implies | Iff | SvaImplies | SvaIff, _, _) => 10,
        UnaryOp(SvaAlways | SvaSEventually, _) => 20,
        SvaEventually { .. } | SvaRangedSEventually { .. } | SvaRangedAlways { .. } => 20,
        Expr::BinOp(
            Until | WeakUntil | Release | StrongRelease | SvaUntil | SvaSUntil | SvaUntilWith
            | SvaSUntilWith,
            _,
            _,
        ) => 25,
        Ite { .. } => 22,
        SeqOr(_) => 32,
        SeqAnd(_, _) => 35,
        NAryOp(NOp::Or, _) => 40,
        NAryOp(NOp::And, _) => 50,
        SeqConcat(_, _) | SeqDelay { .. } => 55,
        Expr::BinOp(Equals | NotEquals, _, _) => 60,
        UnaryOp(Next | Eventually | Always | AX | AF | AG | EX | EF | EG, _) => 65,
        UnaryOp(SvaNexttime | SvaSNexttime, _) => 65,
        UnaryOp(Not, _) => 70,
        UnaryOp(Prime, _) | SeqRepeat { .. } => 80,
        SvaSequence {
            strength: Strength::ImplicitStrong | Strength::ImplicitWeak,
            sequence,
        } => precedence(sequence),
        SvaBoolean(op) => precedence(op),
        UnaryOp(Past, _) => 1000,
        Expr::BinOp(EUntil, _, _) => 1000,
        SvaSequence { .. } => 1000,
        Literal(_) | Id(_) => 1000,
    }
}

fn parens(add_parens: bool, s: String) -> String {
    if add_parens {
        format!("({s})")
    } else {
        s
    }
}

fn right_associative(op: &BinOp) -> bool {
    matches!(
        op,
        BinOp::Implies
            | BinOp::Until
            | BinOp::WeakUntil
            | BinOp::Release
            | BinOp::StrongRelease
            | BinOp::SvaUntil
            | BinOp::SvaSUntil
            | BinOp::SvaUntilWith
            | BinOp::SvaSUntilWith
            | BinOp::SvaImplies
    )
}

fn bound(b: &Bound) -> String {
    match b {
        Bound::Finite(n) => format!("{n}"),
        Bound::Unbounded => "$".to_string(),
    }
}

fn range(r: &CycleRange) -> String {
    format!("[{}:{}]", r.from, bound(&r.to))
}

fn delay(d: &Delay) -> String {
    match d {
        Delay::Exact(n) => format!("##{n}"),
        Delay::Range(from, to) => format!("##[{from}:{}]", bound(to)),
    }
}

fn repetition(r: &Repetition) -> String {
    match r {
        Repetition::Any => "[*]".to_string(),
        Repetition::Count(n) => format!("[*{n}]"),
        Repetition::Range(from, to) => format!("[*{from}:{}]", bound(to)),
    }
}

/// Print an expr in parseable syntax, with as few parentheses as possible.
pub fn expr(e: &Expr) -> String {
    // handling of precedence is based on
    // https://stackoverflow.com/questions/6277747/pretty-print-expression-with-as-few-parentheses-as-possible
    match e {
        Expr::Literal(false) => "false".to_string(),
        Expr::Literal(true) => "true".to_string(),
        Expr::Id(i) => i.to_string(),
        Expr::UnaryOp(op, arg) => {
            let arg_str = parens(precedence(e) > precedence(arg), expr(arg));
            match op {
                UOp::Not => format!("!{arg_str}"),
                UOp::Prime => format!("{arg_str}'"),
                UOp::Past => format!("$past({})", expr(arg)),
                UOp::Next => format!("X {arg_str}"),
                UOp::Eventually => format!("F {arg_str}"),
                UOp::Always => format!("G {arg_str}"),
                UOp::AX => format!("AX {arg_str}"),
                UOp::AF => format!("AF {arg_str}"),
                UOp::AG => format!("AG {arg_str}"),
                UOp::EX => format!("EX {arg_str}"),
                UOp::EF => format!("EF {arg_str}"),
                UOp::EG => format!("EG {arg_str}"),
                UOp::SvaAlways => format!("always {arg_str}"),
                UOp::SvaSEventually => format!("s_eventually {arg_str}"),
                UOp::SvaNexttime => format!("nexttime {arg_str}"),
                UOp::SvaSNexttime => format!("s_nexttime {arg_str}"),
            }
        }
        Expr::BinOp(BinOp::EUntil, lhs, rhs) => {
            format!("E[{} U {}]", expr(lhs), expr(rhs))
        }
        Expr::BinOp(op, arg1, arg2) => {
            let use_left_paren = precedence(e) > precedence(arg1)
                || (precedence(e) == precedence(arg1) && right_associative(op));
            let use_right_paren = precedence(e) > precedence(arg2);
            let left = parens(use_left_paren, expr(arg1));
            let right = parens(use_right_paren, expr(arg2));
            let op = match op {
                BinOp::Equals => "=",
                BinOp::NotEquals => "!=",
                BinOp::Implies => "->",
                BinOp::Iff => "<->",
                BinOp::Until => "U",
                BinOp::WeakUntil => "W",
                BinOp::Release => "R",
                BinOp::StrongRelease => "M",
                BinOp::SvaUntil => "until",
                BinOp::SvaSUntil => "s_until",
                BinOp::SvaUntilWith => "until_with",
                BinOp::SvaSUntilWith => "s_until_with",
                BinOp::SvaImplies => "implies",
                BinOp::SvaIff => "iff",
                BinOp::EUntil => unreachable!(),
            };
            format!("{left} {op} {right}")
        }
        Expr::NAryOp(op, args) => {
            let args = args
                .iter()
                .map(|arg| parens(precedence(e) > precedence(arg), expr(arg)))
                .collect::<Vec<_>>();
            let op = match op {
                NOp::And => "&",
                NOp::Or => "|",
            };
            args.join(&format!(" {op} "))
        }
        Expr::Ite { cond, then, else_ } => {
            // the else branch continues at this precedence level; the
            // first two positions accept any term
            let else_s = parens(precedence(e) > precedence(else_), expr(else_));
            format!("if {} then {} else {else_s}", expr(cond), expr(then))
        }
        Expr::SvaEventually { range: r, op } => {
            let op = parens(precedence(e) > precedence(op), expr(op));
            format!("eventually {} {op}", range(r))
        }
        Expr::SvaRangedSEventually { range: r, op } => {
            let op = parens(precedence(e) > precedence(op), expr(op));
            format!("s_eventually {} {op}", range(r))
        }
        Expr::SvaRangedAlways {
            strong,
            range: r,
            op,
        } => {
            let op = parens(precedence(e) > precedence(op), expr(op));
            let kw = if *strong { "s_always" } else { "always" };
            format!("{kw} {} {op}", range(r))
        }
        Expr::SvaSequence { strength, sequence } => match strength {
            Strength::Strong => format!("strong({})", expr(sequence)),
            Strength::Weak => format!("weak({})", expr(sequence)),
            Strength::ImplicitStrong | Strength::ImplicitWeak => expr(sequence),
        },
        Expr::SvaImplication {
            overlapped,
            sequence,
            property,
        } => {
            let lhs = parens(precedence(e) >= precedence(sequence), expr(sequence));
            let rhs = parens(precedence(e) > precedence(property), expr(property));
            format!("{lhs} {} {rhs}", if *overlapped { "|->" } else { "|=>" })
        }
        Expr::SvaFollowedBy {
            overlapped,
            sequence,
            property,
        } => {
            let lhs = parens(precedence(e) >= precedence(sequence), expr(sequence));
            let rhs = parens(precedence(e) > precedence(property), expr(property));
            format!("{lhs} {} {rhs}", if *overlapped { "#-#" } else { "#=#" })
        }
        Expr::SvaBoolean(op) => expr(op),
        Expr::SeqConcat(lhs, rhs) => {
            let left = parens(precedence(e) > precedence(lhs), expr(lhs));
            // a fused `a ##0 b` and a delayed `a ##n b` print the same way
            match rhs.as_ref() {
                Expr::SeqDelay { delay: d, op } => {
                    let right = parens(precedence(e) > precedence(op), expr(op));
                    format!("{left} {} {right}", delay(d))
                }
                _ => {
                    let right = parens(precedence(e) > precedence(rhs), expr(rhs));
                    format!("{left} ##0 {right}")
                }
            }
        }
        Expr::SeqDelay { delay: d, op } => {
            let op = parens(precedence(e) > precedence(op), expr(op));
            format!("{} {op}", delay(d))
        }
        Expr::SeqRepeat { op, repetition: r } => {
            let op = parens(precedence(e) > precedence(op), expr(op));
            format!("{op}{}", repetition(r))
        }
        Expr::SeqAnd(lhs, rhs) => {
            let left = parens(precedence(e) > precedence(lhs), expr(lhs));
            let right = parens(precedence(e) > precedence(rhs), expr(rhs));
            format!("{left} and {right}")
        }
        Expr::SeqOr(args) => {
            let args = args
                .iter()
                .map(|arg| parens(precedence(e) > precedence(arg), expr(arg)))
                .collect::<Vec<_>>();
            args.join(" or ")
        }
    }
}
