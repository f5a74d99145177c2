//! Evaluates a parsed [`Program`] against [`ElementBuilder`] scopes.

use std::rc::Rc;

use serde_json::{Map, Number, Value};
use sluice_dsl::{parse_str, Call, Literal, Program};

use crate::builder::ElementBuilder;
use crate::error::{ConfigError, ConfigResult};
use crate::events::{callback, EventName};
use crate::root::RootConfig;

/// Parse DSL source and evaluate it into a [`RootConfig`].
///
/// Fails on the first syntax or call error; nothing built before the
/// failure is returned.
pub fn parse(src: &str) -> ConfigResult<RootConfig> {
    let program = parse_str(src)?;
    build(&program)
}

/// Evaluate an already parsed program against a fresh top-level scope.
pub fn build(program: &Program) -> ConfigResult<RootConfig> {
    let mut root = ElementBuilder::new();
    eval_calls(&mut root, &program.calls)?;
    let config = root.into_root();
    log::debug!("config built with {} top-level entries", config.root_element().len());
    Ok(config)
}

/// Evaluate `calls` in order against `scope`.
pub fn eval_calls(scope: &mut ElementBuilder, calls: &[Call]) -> ConfigResult<()> {
    for call in calls {
        eval_call(scope, call)?;
    }
    Ok(())
}

fn eval_call(scope: &mut ElementBuilder, call: &Call) -> ConfigResult<()> {
    log::trace!("{}:{}: `{}` with {} argument(s)", call.line, call.col, call.name, call.args.len());

    let args: Vec<Value> = call.args.iter().map(literal_to_json).collect();
    let body = call
        .block
        .as_deref()
        .map(|calls| move |child: &mut ElementBuilder| eval_calls(child, calls));

    match call.name.as_str() {
        "input"       => { scope.define_input(args, body)?; }
        "output"      => { scope.define_output(args, body)?; }
        "on_start"    => register_block_callback(scope, EventName::Start, call)?,
        "on_complete" => register_block_callback(scope, EventName::Complete, call)?,
        name          => { scope.dispatch_generic_call(name, args, body)?; }
    }
    Ok(())
}

/// `on_start { ... }`: keep the body and evaluate it only when the event fires.
/// The callback hands back the node the body builds.
fn register_block_callback(
    scope: &mut ElementBuilder,
    event: EventName,
    call: &Call,
) -> ConfigResult<()> {
    if !call.args.is_empty() {
        return Err(ConfigError::arity(event.slot(), "no positional arguments allowed"));
    }
    let Some(block) = &call.block else {
        return Err(ConfigError::missing_block(event.slot()));
    };

    let body: Rc<[Call]> = Rc::from(block.as_slice());
    scope.register(
        event,
        callback(move |_args| {
            let mut scope = ElementBuilder::new();
            eval_calls(&mut scope, &body)?;
            Ok(Some(Value::Object(scope.finalize().to_json())))
        }),
    );
    Ok(())
}

/// Convert a literal argument to the JSON form the builder works with.
pub fn literal_to_json(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Integer(n) => Value::from(*n),
        // the lexer only produces finite floats
        Literal::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Literal::Str(s) => Value::String(s.clone()),
        Literal::Seq(items) => Value::Array(items.iter().map(literal_to_json).collect()),
        Literal::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), literal_to_json(v)))
                .collect::<Map<String, Value>>(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tree(src: &str) -> Value {
        Value::Object(parse(src).unwrap().root_element().to_json())
    }

    // ── generic rule ──────────────────────────────────────────────────────

    #[test]
    fn generic_scalar() {
        assert_eq!(tree(r#"foo("bar")"#), json!({"foo": "bar"}));
    }

    #[test]
    fn generic_sequence_is_not_stringified() {
        assert_eq!(tree("foo([1,2])"), json!({"foo": [1, 2]}));
    }

    #[test]
    fn numbers_and_booleans_are_stringified() {
        assert_eq!(
            tree("skip_header_lines 1\nratio 0.5\nstrict true\nnothing nil\nbare"),
            json!({
                "skip_header_lines": "1",
                "ratio": "0.5",
                "strict": "true",
                "nothing": "",
                "bare": ""
            })
        );
    }

    #[test]
    fn last_write_wins() {
        assert_eq!(tree("x \"a\"\nx \"b\""), json!({"x": "b"}));
    }

    #[test]
    fn nested_mapping_is_not_interpreted() {
        assert_eq!(
            tree(r#"filter({type: "rename", columns: {a: "b"}})"#),
            json!({"filter": {"type": "rename", "columns": {"a": "b"}}})
        );
    }

    // ── blocks ────────────────────────────────────────────────────────────

    #[test]
    fn input_gets_type() {
        let config = parse(r#"input("file") { }"#).unwrap();
        let input = config.root_element().get_node("in").unwrap();
        assert_eq!(input.get_str("type"), Some("file"));
        assert_eq!(config.root_element().len(), 1);
    }

    #[test]
    fn nested_parser_merges_type() {
        let value = tree(r#"input("file") { parser("csv") { charset "UTF-8" } }"#);
        assert_eq!(value["in"]["parser"], json!({"type": "csv", "charset": "UTF-8"}));
    }

    #[test]
    fn end_to_end_pipeline() {
        let value = tree(
            r#"
            input("file") { path_prefix "data_" decoders [{type: "gzip"}] }
            output("stdout") {}
            "#,
        );
        assert_eq!(
            value,
            json!({
                "in": {"type": "file", "path_prefix": "data_", "decoders": [{"type": "gzip"}]},
                "out": {"type": "stdout"}
            })
        );
    }

    #[test]
    fn reserved_names_are_only_special_at_call_position() {
        // `in` / `out` are ordinary generic keys
        assert_eq!(tree(r#"in "x"; out "y""#), json!({"in": "x", "out": "y"}));
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn two_arguments_is_an_arity_error() {
        let err = parse("foo(1, 2)").unwrap_err();
        assert!(matches!(err, ConfigError::Arity { ref name, .. } if name == "foo"));
    }

    #[test]
    fn input_without_body() {
        let err = parse(r#"input("file")"#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBlock { .. }));
    }

    #[test]
    fn input_without_type() {
        let err = parse("input { }").unwrap_err();
        assert!(matches!(err, ConfigError::Arity { ref name, .. } if name == "input"));
    }

    #[test]
    fn nested_error_aborts_everything() {
        let err = parse(r#"ok "1"
            input("file") { parser("csv") { columns(1, 2) } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Arity { ref name, .. } if name == "columns"));
    }

    #[test]
    fn syntax_error_surfaces() {
        let err = parse("foo(").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax(_)));
    }

    #[test]
    fn overflowing_float_is_a_syntax_error() {
        for src in ["x 1e999", "x [1e999]", "x({r: -1e999})"] {
            let err = parse(src).unwrap_err();
            assert!(matches!(err, ConfigError::Syntax(ref e) if e.message.contains("out of range")), "{}", src);
        }
    }

    // ── events ────────────────────────────────────────────────────────────

    #[test]
    fn on_start_runs_only_when_dispatched() {
        let config = parse(r#"on_start { notify "ops" } name "nightly""#).unwrap();
        // the body is not part of the tree
        assert_eq!(Value::Object(config.root_element().to_json()), json!({"name": "nightly"}));
        assert_eq!(
            config.dispatch_event("start", &[]).unwrap(),
            Some(json!({"notify": "ops"}))
        );
    }

    #[test]
    fn on_complete_accepts_the_diff() {
        let config = parse(r#"on_complete { status "done" }"#).unwrap();
        assert_eq!(
            config.dispatch_event("complete", &[json!({"in": {"last_path": "x"}})]).unwrap(),
            Some(json!({"status": "done"}))
        );
        assert_eq!(config.dispatch_event("start", &[]).unwrap(), None);
    }

    #[test]
    fn later_on_start_overwrites() {
        let config = parse("on_start { n 1 }\non_start { n 2 }").unwrap();
        assert_eq!(config.dispatch_event("start", &[]).unwrap(), Some(json!({"n": "2"})));
    }

    #[test]
    fn on_start_inside_a_block_registers_globally() {
        let config = parse(r#"output("stdout") { on_start { hello "world" } }"#).unwrap();
        assert_eq!(
            Value::Object(config.root_element().to_json()),
            json!({"out": {"type": "stdout"}})
        );
        assert!(config.events().is_registered(EventName::Start));
    }

    #[test]
    fn callback_errors_surface_on_dispatch() {
        let config = parse("on_complete { bad(1, 2) }").unwrap();
        let err = config.dispatch_event("complete", &[json!(null)]).unwrap_err();
        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::Arity { .. })));
    }

    #[test]
    fn event_registration_rules() {
        assert!(matches!(parse("on_start").unwrap_err(), ConfigError::MissingBlock { .. }));
        assert!(matches!(parse("on_start(1) { }").unwrap_err(), ConfigError::Arity { .. }));
    }

    // ── literal_to_json ───────────────────────────────────────────────────

    #[test]
    fn literal_conversion() {
        let lit = Literal::Map(vec![
            ("id".into(), Literal::Integer(7)),
            ("tags".into(), Literal::Seq(vec![Literal::Str("a".into()), Literal::Bool(false)])),
            ("ratio".into(), Literal::Float(0.25)),
            ("none".into(), Literal::Null),
        ]);
        assert_eq!(
            literal_to_json(&lit),
            json!({"id": 7, "tags": ["a", false], "ratio": 0.25, "none": null})
        );
    }
}
