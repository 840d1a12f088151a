use indoc::indoc;

use super::{Assoc, FlatGrammar, PrecLevel, Sym, flatten, prepare};
use crate::dsl::parse_grammar;

fn flat(source: &str) -> FlatGrammar {
    let grammar = parse_grammar(source).expect("grammar source parses");
    let (extracted, order) = prepare(&grammar).unwrap();
    flatten(extracted, &order)
}

/// Productions as `lhs -> a b c`, terminals by name.
fn dump(grammar: &FlatGrammar) -> String {
    let name = |sym: Sym| match sym {
        Sym::Lexical(i) => format!("'{}'", grammar.lexical[i].name),
        Sym::External(i) => format!("${}", grammar.externals[i].name),
        Sym::Rule(v) => grammar.variables[v].name.clone(),
    };
    let mut out = String::new();
    for variable in &grammar.variables {
        for production in &variable.productions {
            out.push_str(&variable.name);
            out.push_str(" ->");
            for step in &production.steps {
                out.push(' ');
                if let Some(field) = &step.field {
                    out.push_str(field);
                    out.push(':');
                }
                out.push_str(&name(step.symbol));
            }
            out.push('\n');
        }
    }
    out
}

#[test]
fn choices_and_optionals_expand() {
    let grammar = flat(r#"call = name "(" args? ")"; args = name ("," name)*; name = /[a-z]+/;"#);

    insta::assert_snapshot!(dump(&grammar), @r"
    call -> 'name' '(' args ')'
    call -> 'name' '(' ')'
    args -> 'name' args_repeat1
    args -> 'name'
    args_repeat1 -> args_repeat1 ',' 'name'
    args_repeat1 -> ',' 'name'
    ");
}

#[test]
fn repeat_helpers_are_hidden_and_numbered_per_rule() {
    let grammar = flat(r#"start = "a"* "b"+;"#);

    let names: Vec<_> = grammar.variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["start", "start_repeat1", "start_repeat2"]);
    let helper = &grammar.variables[1];
    assert!(helper.aux && !helper.visible);
    assert_eq!(helper.origin, "start");
}

#[test]
fn fields_apply_to_every_step_of_the_content() {
    let grammar = flat(r#"pair = key: (x y) "=" value: x*; x = "x"; y = "y";"#);

    insta::assert_snapshot!(dump(&grammar), @r"
    pair -> key:'x' key:'y' '=' pair_repeat1
    pair -> key:'x' key:'y' '='
    pair_repeat1 -> pair_repeat1 value:'x'
    pair_repeat1 -> value:'x'
    ");
}

#[test]
fn inline_rules_are_substituted() {
    let grammar = flat(indoc! {r#"
        @inline = _value;
        start = "[" _value "]";
        _value = "a" | "b";
    "#});

    insta::assert_snapshot!(dump(&grammar), @r"
    start -> '[' 'a' ']'
    start -> '[' 'b' ']'
    ");
}

#[test]
fn precedence_and_assoc_reach_steps() {
    let grammar = flat(r#"expr = prec.right(3, expr "^" expr) | "n";"#);

    let power = &grammar.variables[0].productions[0];
    assert!(
        power
            .steps
            .iter()
            .all(|s| s.precedence == PrecLevel::Int(3) && s.assoc == Some(Assoc::Right))
    );
    let atom = &grammar.variables[0].productions[1];
    assert_eq!(atom.steps[0].precedence, PrecLevel::Int(0));
    assert_eq!(atom.steps[0].assoc, None);
}

#[test]
fn rule_entries_in_precedences_set_default_level() {
    let grammar = flat(indoc! {r#"
        @precedences = [member "call"];
        start = member | prec("call", "x");
        member = "a" "." "b";
    "#});

    let member = &grammar.variables[1].productions[0];
    assert!(member.steps.iter().all(|s| s.precedence == PrecLevel::Named(0)));
    let call = &grammar.variables[0].productions[1];
    assert_eq!(call.steps[0].precedence, PrecLevel::Named(1));
}

#[test]
fn dynamic_precedence_keeps_larger_magnitude() {
    let grammar = flat(r#"start = prec.dynamic(-5, prec.dynamic(2, "a") "b") | "c";"#);

    let productions = &grammar.variables[0].productions;
    assert_eq!(productions[0].dynamic_precedence, -5);
    assert_eq!(productions[1].dynamic_precedence, 0);
}

#[test]
fn duplicate_alternatives_collapse() {
    let grammar = flat(r#"start = "a" | "a" | ("a");"#);

    assert_eq!(grammar.variables[0].productions.len(), 1);
    assert_eq!(grammar.production_count(), 1);
}
