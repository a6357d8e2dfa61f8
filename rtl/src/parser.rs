// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Parser for transition-system descriptions and property exprs.

use crate::syntax::*;
use crate::temporal::is_sequence_expr;
use codespan_reporting::diagnostic::{Diagnostic, Label};
use peg::{error::ParseError, str::LineCol};

/// Wrap a sequence expression appearing in property position; bare
/// sequences act as weak sequence properties.
fn prop(e: Expr) -> Expr {
    if is_sequence_expr(&e) {
        Expr::SvaSequence {
            strength: Strength::ImplicitWeak,
            sequence: Box::new(e),
        }
    } else {
        e
    }
}

/// Coerce an operand of a sequence operator to a sequence; a state
/// predicate is a one-cycle sequence.
fn seq(e: Expr) -> Expr {
    if is_sequence_expr(&e) {
        e
    } else {
        Expr::SvaBoolean(Box::new(e))
    }
}

fn is_keyword(s: &str) -> bool {
    matches!(
        s,
        "true"
            | "false"
            | "if"
            | "then"
            | "else"
            | "always"
            | "s_always"
            | "eventually"
            | "s_eventually"
            | "nexttime"
            | "s_nexttime"
            | "until"
            | "s_until"
            | "until_with"
            | "s_until_with"
            | "and"
            | "or"
            | "strong"
            | "weak"
            | "init"
            | "trans"
            | "assert"
            | "assume"
            | "register"
            | "input"
            | "X"
            | "F"
            | "G"
            | "U"
            | "W"
            | "R"
            | "M"
            | "E"
            | "AX"
            | "AF"
            | "AG"
            | "EX"
            | "EF"
            | "EG"
    )
}

peg::parser! {

grammar parser() for str {
    rule ident_start() = ['a'..='z' | 'A'..='Z' | '_']
    rule ident_char() = ident_start() / ['0'..='9']
    pub(super) rule ident() -> String
    = s:$(quiet!{ident_start() ident_char()*} / expected!("identifier"))
    {? if is_keyword(s) { Err("identifier") } else { Ok(s.to_string()) } }

    rule nl() = quiet!{ ['\n' | '\r'] } / expected!("newline")
    rule comment() = "//" [^'\n' | '\r']* nl()
    rule ws_no_nl() = quiet!{ [' ' | '\t' ] / comment() }
    rule whitespace() = quiet! { ws_no_nl() / nl() }
    rule word_boundary() = !ident_char()
    rule _ = whitespace()*
    rule __ = word_boundary() _

    rule int() -> i64
    = s:$(quiet!{"-"? ['0'..='9']+} / expected!("number"))
    {? s.parse().or(Err("number")) }

    rule bnd() -> Bound
    = "$" { Bound::Unbounded }
    / n:int() { Bound::Finite(n) }

    rule cycle_range() -> CycleRange
    = "[" _ from:int() _ ":" _ to:bnd() _ "]" { CycleRange { from, to } }

    rule delay_spec() -> Delay
    = "##" "[" _ from:int() _ ":" _ to:bnd() _ "]" { Delay::Range(from, to) }
    / "##" n:int() { Delay::Exact(n) }

    rule repetition_spec() -> Repetition
    = "[*" _ "]" { Repetition::Any }
    / "[*" _ from:int() _ ":" _ to:bnd() _ "]" { Repetition::Range(from, to) }
    / "[*" _ n:int() _ "]" { Repetition::Count(n) }

    pub(super) rule term() -> Expr = precedence!{
        x:@ _ "|->" _ y:(@) { Expr::SvaImplication {
            overlapped: true, sequence: Box::new(seq(x)), property: Box::new(prop(y)) } }
        x:@ _ "|=>" _ y:(@) { Expr::SvaImplication {
            overlapped: false, sequence: Box::new(seq(x)), property: Box::new(prop(y)) } }
        x:@ _ "#-#" _ y:(@) { Expr::SvaFollowedBy {
            overlapped: true, sequence: Box::new(seq(x)), property: Box::new(prop(y)) } }
        x:@ _ "#=#" _ y:(@) { Expr::SvaFollowedBy {
            overlapped: false, sequence: Box::new(seq(x)), property: Box::new(prop(y)) } }
        --
        x:@ _ "->" _ y:(@) { Expr::implies(prop(x), prop(y)) }
        x:(@) _ "<->" _ y:@ { Expr::iff(prop(x), prop(y)) }
        --
        "always" __ r:cycle_range() _ x:@ { Expr::SvaRangedAlways {
            strong: false, range: r, op: Box::new(prop(x)) } }
        "always" __ x:@ { Expr::UnaryOp(UOp::SvaAlways, Box::new(prop(x))) }
        "s_always" __ r:cycle_range() _ x:@ { Expr::SvaRangedAlways {
            strong: true, range: r, op: Box::new(prop(x)) } }
        "eventually" __ r:cycle_range() _ x:@ { Expr::SvaEventually {
            range: r, op: Box::new(prop(x)) } }
        "s_eventually" __ r:cycle_range() _ x:@ { Expr::SvaRangedSEventually {
            range: r, op: Box::new(prop(x)) } }
        "s_eventually" __ x:@ { Expr::UnaryOp(UOp::SvaSEventually, Box::new(prop(x))) }
        --
        "if" __ cond:term() _ "then" __ then:term() _ "else" __ else_:(@) {
            Expr::ite(cond, then, else_)
        }
        --
        x:@ _ "s_until_with" __ y:(@) { Expr::BinOp(BinOp::SvaSUntilWith, Box::new(prop(x)), Box::new(prop(y))) }
        x:@ _ "s_until" __ y:(@) { Expr::BinOp(BinOp::SvaSUntil, Box::new(prop(x)), Box::new(prop(y))) }
        x:@ _ "until_with" __ y:(@) { Expr::BinOp(BinOp::SvaUntilWith, Box::new(prop(x)), Box::new(prop(y))) }
        x:@ _ "until" __ y:(@) { Expr::BinOp(BinOp::SvaUntil, Box::new(prop(x)), Box::new(prop(y))) }
        x:@ _ "U" __ y:(@) { Expr::BinOp(BinOp::Until, Box::new(prop(x)), Box::new(prop(y))) }
        x:@ _ "W" __ y:(@) { Expr::BinOp(BinOp::WeakUntil, Box::new(prop(x)), Box::new(prop(y))) }
        x:@ _ "R" __ y:(@) { Expr::BinOp(BinOp::Release, Box::new(prop(x)), Box::new(prop(y))) }
        x:@ _ "M" __ y:(@) { Expr::BinOp(BinOp::StrongRelease, Box::new(prop(x)), Box::new(prop(y))) }
        --
        x:(@) _ "or" __ y:@ { match x {
            Expr::SeqOr(mut es) => { es.push(seq(y)); Expr::SeqOr(es) }
            x => Expr::SeqOr(vec![seq(x), seq(y)]),
        } }
        --
        x:(@) _ "and" __ y:@ { Expr::SeqAnd(Box::new(seq(x)), Box::new(seq(y))) }
        --
        x:(@) _ "|" !("-" / "=") _ y:@ { Expr::or([x, y]) }
        --
        x:(@) _ "&" _ y:@ { Expr::and([x, y]) }
        --
        x:(@) _ d:delay_spec() _ y:@ { match d {
            Delay::Exact(0) => Expr::SeqConcat(Box::new(seq(x)), Box::new(seq(y))),
            d => Expr::SeqConcat(
                Box::new(seq(x)),
                Box::new(Expr::SeqDelay { delay: d, op: Box::new(seq(y)) }),
            ),
        } }
        d:delay_spec() _ x:@ { Expr::SeqDelay { delay: d, op: Box::new(seq(x)) } }
        --
        x:(@) _ "=" !"=" _ y:@ { Expr::BinOp(BinOp::Equals, Box::new(x), Box::new(y)) }
        x:(@) _ "!=" _ y:@ { Expr::BinOp(BinOp::NotEquals, Box::new(x), Box::new(y)) }
        --
        "X" __ x:@ { Expr::UnaryOp(UOp::Next, Box::new(prop(x))) }
        "F" __ x:@ { Expr::UnaryOp(UOp::Eventually, Box::new(prop(x))) }
        "G" __ x:@ { Expr::UnaryOp(UOp::Always, Box::new(prop(x))) }
        "AX" __ x:@ { Expr::UnaryOp(UOp::AX, Box::new(prop(x))) }
        "AF" __ x:@ { Expr::UnaryOp(UOp::AF, Box::new(prop(x))) }
        "AG" __ x:@ { Expr::UnaryOp(UOp::AG, Box::new(prop(x))) }
        "EX" __ x:@ { Expr::UnaryOp(UOp::EX, Box::new(prop(x))) }
        "EF" __ x:@ { Expr::UnaryOp(UOp::EF, Box::new(prop(x))) }
        "EG" __ x:@ { Expr::UnaryOp(UOp::EG, Box::new(prop(x))) }
        "nexttime" __ x:@ { Expr::UnaryOp(UOp::SvaNexttime, Box::new(prop(x))) }
        "s_nexttime" __ x:@ { Expr::UnaryOp(UOp::SvaSNexttime, Box::new(prop(x))) }
        --
        "!" _ x:@ { Expr::negate(prop(x)) }
        --
        x:(@) "'" { Expr::UnaryOp(UOp::Prime, Box::new(x)) }
        x:(@) _ r:repetition_spec() { Expr::SeqRepeat { op: Box::new(seq(x)), repetition: r } }
        --
        "true" word_boundary() { Expr::Literal(true) }
        "false" word_boundary() { Expr::Literal(false) }
        "strong" _ "(" _ s:term() _ ")" { Expr::SvaSequence {
            strength: Strength::Strong, sequence: Box::new(seq(s)) } }
        "weak" _ "(" _ s:term() _ ")" { Expr::SvaSequence {
            strength: Strength::Weak, sequence: Box::new(seq(s)) } }
        t:e_until_bracket() { t }
        "$past" _ "(" _ x:term() _ ")" { Expr::UnaryOp(UOp::Past, Box::new(x)) }
        i:ident() { Expr::Id(i) }
        "(" _ t:term() _ ")" { t }
    }

    rule e_until_bracket() -> Expr
    = "E" _ "[" _ t:term() _ "]" {? match t {
        Expr::BinOp(BinOp::Until, p, q) => Ok(Expr::BinOp(BinOp::EUntil, p, q)),
        _ => Err("E[p U q]"),
    } }

    rule symbol_kind() -> SymbolKind
    = "register" word_boundary() { SymbolKind::Register }
    / "input" word_boundary() { SymbolKind::Input }

    rule symbol_decl() -> SymbolDecl
    = kind:symbol_kind() _ name:ident() { SymbolDecl { name, kind } }

    // matches whitespace with at least one newline
    rule newline_separator()
    = quiet!{ ws_no_nl()* (comment() / nl()) _ } / expected!("newline separator")

    rule label() -> String
    = n:ident() _ ":" _ { n }

    rule stmt() -> Stmt
    = "init" __ e:term() { Stmt::Init(e) }
    / "trans" __ e:term() { Stmt::Trans(e) }
    / "assume" __ name:label()? property:term() { Stmt::Assume { name, property: prop(property) } }
    / "assert" __ name:label()? property:term() { Stmt::Assert { name, property: prop(property) } }

    pub(super) rule module() -> Module
    = _ symbols:(symbol_decl() ** newline_separator()) _
      statements:(stmt() ** newline_separator()) _
    { Module { signature: Signature { symbols }, statements } }

    pub(super) rule term_eof() -> Expr = _ t:term() _ ![_] { t }
}

}

/// Parse a module in the concrete syntax.
pub fn parse(s: &str) -> Result<Module, ParseError<LineCol>> {
    parser::module(s)
}

/// Parse a single term; panics on parse errors, intended for tests.
pub fn term(s: &str) -> Expr {
    parser::term_eof(s).expect("could not parse term")
}

/// Build a diagnostic for a parse error, for reporting with
/// codespan-reporting.
pub fn parse_error_diagnostic<FileId>(file_id: FileId, e: &ParseError<LineCol>) -> Diagnostic<FileId> {
    Diagnostic::error()
        .with_message("could not parse file")
        .with_labels(vec![Label::primary(
            file_id,
            e.location.offset..e.location.offset + 1,
        )
        .with_message(format!("expected {}", e.expected))])
}

#[cfg(test)]
mod tests {
    use super::{parse, term};
    use crate::printer;
    use crate::syntax::*;

    #[test]
    fn test_term_basic() {
        assert_eq!(term("r"), Expr::id("r"));
        assert_eq!(term("!r"), Expr::negate(Expr::id("r")));
        assert_eq!(
            term("r & q | p"),
            Expr::or([Expr::and([Expr::id("r"), Expr::id("q")]), Expr::id("p")]),
        );
        assert_eq!(
            term("r' <-> r"),
            Expr::iff(
                Expr::UnaryOp(UOp::Prime, Box::new(Expr::id("r"))),
                Expr::id("r"),
            ),
        );
    }

    #[test]
    fn test_term_temporal() {
        assert_eq!(term("G r"), Expr::always(Expr::id("r")));
        assert_eq!(
            term("G (r -> X q)"),
            Expr::always(Expr::implies(Expr::id("r"), Expr::next(Expr::id("q")))),
        );
        assert_eq!(
            term("AG r"),
            Expr::UnaryOp(UOp::AG, Box::new(Expr::id("r"))),
        );
        assert_eq!(
            term("r U q"),
            Expr::BinOp(BinOp::Until, Box::new(Expr::id("r")), Box::new(Expr::id("q"))),
        );
    }

    #[test]
    fn test_term_sva_ranges() {
        assert_eq!(
            term("always [2:$] r"),
            Expr::SvaRangedAlways {
                strong: false,
                range: CycleRange { from: 2, to: Bound::Unbounded },
                op: Box::new(Expr::id("r")),
            },
        );
        assert_eq!(
            term("eventually [0:3] r"),
            Expr::SvaEventually {
                range: CycleRange { from: 0, to: Bound::Finite(3) },
                op: Box::new(Expr::id("r")),
            },
        );
    }

    #[test]
    fn test_term_sequences() {
        // `a ##1 b` is fusion with a one-cycle delay on the right
        assert_eq!(
            term("r ##1 q"),
            Expr::SeqConcat(
                Box::new(Expr::SvaBoolean(Box::new(Expr::id("r")))),
                Box::new(Expr::SeqDelay {
                    delay: Delay::Exact(1),
                    op: Box::new(Expr::SvaBoolean(Box::new(Expr::id("q")))),
                }),
            ),
        );
        // `a ##0 b` is plain fusion
        assert_eq!(
            term("r ##0 q"),
            Expr::SeqConcat(
                Box::new(Expr::SvaBoolean(Box::new(Expr::id("r")))),
                Box::new(Expr::SvaBoolean(Box::new(Expr::id("q")))),
            ),
        );
        assert_eq!(
            term("r[*2]"),
            Expr::SeqRepeat {
                op: Box::new(Expr::SvaBoolean(Box::new(Expr::id("r")))),
                repetition: Repetition::Count(2),
            },
        );
    }

    #[test]
    fn test_term_implication_wraps_operands() {
        let e = term("r ##1 q |-> p");
        match e {
            Expr::SvaImplication {
                overlapped: true,
                sequence,
                property,
            } => {
                assert!(matches!(*sequence, Expr::SeqConcat(_, _)));
                assert_eq!(*property, Expr::id("p"));
            }
            e => panic!("unexpected parse: {e:?}"),
        }
    }

    #[test]
    fn test_bare_sequence_becomes_weak_property() {
        let module = parse("register r\n\nassert r ##1 r\n").unwrap();
        match &module.statements[0] {
            Stmt::Assert { property, .. } => assert!(matches!(
                property,
                Expr::SvaSequence { strength: Strength::ImplicitWeak, .. },
            )),
            s => panic!("unexpected statement: {s:?}"),
        }
    }

    #[test]
    fn test_parse_module() {
        let module = parse(
            "
// a toggling register
register r
input enable

init !r
trans r' <-> (r | enable)

assert safe: G !r
assume always !enable
",
        )
        .unwrap();
        assert_eq!(module.signature.symbols.len(), 2);
        assert_eq!(module.statements.len(), 4);
    }

    #[test]
    fn test_printer_round_trip() {
        for src in [
            "G (r -> X !q)",
            "AG (r & AX q)",
            "always (r |-> ##1 q)",
            "always (r ##1 q[*2] |=> p)",
            "s_eventually [0:3] !r",
            "strong(r ##1 q or q ##2 r)",
            "r U (q & !p)",
            "eventually [1:2] (r | q)",
            "if r then q else !q",
            "E[r U q]",
        ] {
            let parsed = term(src);
            assert_eq!(term(&printer::expr(&parsed)), parsed, "{src}");
        }
    }
}
