use kwb_wiki::Value;
use kwb_wiki::format::lua_literal;

#[test]
fn scalars() {
    assert_eq!(lua_literal(&Value::Null), "nil");
    assert_eq!(lua_literal(&Value::Bool(true)), "true");
    assert_eq!(lua_literal(&Value::Bool(false)), "false");
    assert_eq!(lua_literal(&Value::Number(3.14)), "3.14");
    assert_eq!(lua_literal(&Value::Number(17811291.0)), "17811291");
    assert_eq!(lua_literal(&Value::Number(-0.5)), "-0.5");
}

#[test]
fn non_finite_numbers_become_annotated_nil() {
    let nan = lua_literal(&Value::Number(f64::NAN));
    assert!(nan.contains("nil") && nan.contains("NaN"), "{nan}");
    assert_eq!(lua_literal(&Value::Number(f64::INFINITY)), "nil --[[Infinity]]");
    assert_eq!(lua_literal(&Value::Number(f64::NEG_INFINITY)), "nil --[[-Infinity]]");
}

#[test]
fn strings_are_trimmed_escaped_and_quoted() {
    let s = lua_literal(&Value::Text("a\"b\nc".into()));
    assert_eq!(s, r#""a\"b\\nc""#);
    assert!(!s.contains('\n'));

    assert_eq!(lua_literal(&Value::Text("  Gemeente  ".into())), "\"Gemeente\"");
    assert_eq!(lua_literal(&Value::Text("".into())), "\"\"");
    assert_eq!(
        lua_literal(&Value::Text("regel 1\r\nregel 2\rregel 3".into())),
        r#""regel 1\\nregel 2\\nregel 3""#
    );
    assert_eq!(lua_literal(&Value::Text(r#"pad\naar "x""#.into())), r#""pad\\naar \"x\"""#);
}

#[test]
fn formatting_is_deterministic() {
    let v = Value::Text("Oppervlakte\n(km²)".into());
    assert_eq!(lua_literal(&v), lua_literal(&v.clone()));
}
