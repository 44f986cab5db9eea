// tests/translate_tests.rs

use abap_js::codegen::Construct;
use abap_js::signatures::SignatureTable;
use abap_js::unique::UniqueIdentifier;
use abap_js::{TranslateError, Translator};

fn run(abap: &str) -> Result<String, TranslateError> {
    let ids = UniqueIdentifier::new();
    Translator::new().with_identifiers(&ids).run(abap)
}

fn unsupported(abap: &str) -> Construct {
    match run(abap) {
        Err(TranslateError::Unsupported(e)) => e.construct,
        other => panic!("expected unsupported construct for {}, got {:?}", abap, other),
    }
}

// ============================================================================
// Single statements
// ============================================================================

#[test]
fn test_single_statements() {
    let tests = vec![
        ("DATA foo TYPE i.", "let foo = new abap.types.Integer();"),
        ("foo = 2.", "foo.set(2);"),
        ("foo = bar + 2.", "foo.set(bar.add(2));"),
        ("ADD 2 to foo.", "foo.set(foo.add(2));"),
        ("foo = bar + moo.", "foo.set(bar.add(moo));"),
        ("DATA foo TYPE i VALUE 2.", "let foo = new abap.types.Integer({value: 2});"),
        ("IF foo = bar. ENDIF.", "if (foo.eq(bar)) {\n}"),
        ("IF foo EQ bar. ENDIF.", "if (foo.eq(bar)) {\n}"),
        ("EXIT.", "break;"),
        ("CONTINUE.", "continue;"),
        ("CASE bar. ENDCASE.", "switch (bar.get()) {\n}"),
        ("DATA foo TYPE c.", "let foo = new abap.types.Character();"),
        ("DATA foo TYPE string.", "let foo = new abap.types.String();"),
        ("DATA foo TYPE c LENGTH 2.", "let foo = new abap.types.Character({length: 2});"),
        (
            "DATA foo TYPE c LENGTH 2 VALUE 'fo'.",
            "let foo = new abap.types.Character({length: 2, value: 'fo'});",
        ),
        ("foo = 'fo'.", "foo.set('fo');"),
        ("foo = |fo|.", "foo.set(`fo`);"),
        ("foo = |fo{ 2 }|.", "foo.set(`fo${2}`);"),
        ("foo = `fo`.", "foo.set(`fo`);"),
        ("IF foo IS INITIAL. ENDIF.", "if (foo.initial()) {\n}"),
        ("IF foo IS NOT INITIAL. ENDIF.", "if (!foo.initial()) {\n}"),
        ("IF NOT foo IS INITIAL. ENDIF.", "if (!foo.initial()) {\n}"),
        ("DO. ENDDO.", "for (;;) {\n}"),
        ("DO 5 TIMES. ENDDO.", "for (let unique1 = 0; unique1 < 5; unique1++) {\n}"),
        (
            "DO foo TIMES.  ENDDO.",
            "for (let unique1 = 0; unique1 < foo.get(); unique1++) {\n}",
        ),
        ("LOOP AT table INTO line. ENDLOOP.", "for (line of table.array()) {\n}"),
        ("WHILE foo = bar. ENDWHILE.", "while (foo.eq(bar)) {\n}"),
        ("foo-bar = 2.", "foo.bar.set(2);"),
        ("foo(1) = 'a'.", "foo.set('a', {length: 1});"),
        ("foo+1 = 'a'.", "foo.set('a', {offset: 1});"),
        ("foo+1(1) = 'a'.", "foo.set('a', {offset: 1, length: 1});"),
        ("foo(bar) = 'a'.", "foo.set('a', {length: bar});"),
        ("CLEAR foo.", "abap.statements.clear(foo);"),
        ("SORT foo.", "abap.statements.sort(foo);"),
        ("WRITE foo.", "abap.statements.write(foo);"),
        ("ASSERT foo = bar.", "abap.statements.assert(foo.eq(bar));"),
        ("CLASS lcl_foo IMPLEMENTATION. ENDCLASS.", "class lcl_foo {\n}"),
        ("RETURN.", "break;"),
        ("foo->method( ).", "foo.method();"),
        ("foo->method( 1 ).", "foo.method(1);"),
        ("moo = foo->method().", "moo.set(foo.method());"),
        ("FORM foo. ENDFORM.", "function foo() {\n}"),
        ("DATA foo TYPE STANDARD TABLE OF string.", "let foo = new abap.types.Table();"),
        ("lv_char = lines( lt_words ).", "lv_char.set(abap.builtin.lines(lt_words));"),
        (
            "SPLIT foo AT bar INTO TABLE moo.",
            "abap.statements.split({source: foo, at: bar, target: moo});",
        ),
        ("WRITE |moo|.", "abap.statements.write(`moo`);"),
        (
            "DELETE foo WHERE bar = 2.",
            "abap.statements.deleteInternal(foo,() => {return bar.eq(2);});",
        ),
        ("ASSERT sy-subrc = 0.", "abap.statements.assert(sy.subrc.eq(0));"),
        ("* comment", "// * comment"),
    ];

    for (abap, js) in tests {
        assert_eq!(run(abap).unwrap(), js, "Failed for input: {}", abap);
    }
}

// ============================================================================
// Supplementary statements
// ============================================================================

#[test]
fn test_arithmetic_statements() {
    let tests = vec![
        ("SUBTRACT 1 FROM foo.", "foo.set(foo.minus(1));"),
        ("MULTIPLY foo BY bar.", "foo.set(foo.multiply(bar));"),
        ("DIVIDE foo BY 2.", "foo.set(foo.divide(2));"),
        ("MOVE 'a' TO foo.", "foo.set('a');"),
    ];
    for (abap, js) in tests {
        assert_eq!(run(abap).unwrap(), js, "Failed for input: {}", abap);
    }
}

#[test]
fn test_operators() {
    let tests = vec![
        ("foo = a - b.", "foo.set(a.minus(b));"),
        ("foo = a * b / c.", "foo.set(a.multiply(b).divide(c));"),
        ("foo = a MOD 2.", "foo.set(a.mod(2));"),
        ("foo = a DIV 2.", "foo.set(a.div(2));"),
        ("foo = a ** 2.", "foo.set(a.power(2));"),
        ("foo = a + b * c.", "foo.set(a.add(b.multiply(c)));"),
        ("foo = ( a + b ) * c.", "foo.set(a.add(b).multiply(c));"),
        ("foo = -1.", "foo.set(-1);"),
        ("foo = '1.5'.", "foo.set('1.5');"),
        ("foo = 1.5.", "foo.set(1.5);"),
        ("IF a <> b. ENDIF.", "if (!a.eq(b)) {\n}"),
        ("IF a NE b. ENDIF.", "if (!a.eq(b)) {\n}"),
        ("IF a < b. ENDIF.", "if (a.lt(b)) {\n}"),
        ("IF a GT b. ENDIF.", "if (a.gt(b)) {\n}"),
        ("IF a <= b. ENDIF.", "if (a.le(b)) {\n}"),
        ("IF a >= b. ENDIF.", "if (a.ge(b)) {\n}"),
        ("IF a = 1 AND b = 2. ENDIF.", "if (a.eq(1) && b.eq(2)) {\n}"),
        ("IF a = 1 OR b = 2 AND c = 3. ENDIF.", "if (a.eq(1) || b.eq(2) && c.eq(3)) {\n}"),
        ("IF NOT a = 1. ENDIF.", "if (!a.eq(1)) {\n}"),
    ];
    for (abap, js) in tests {
        assert_eq!(run(abap).unwrap(), js, "Failed for input: {}", abap);
    }
}

#[test]
fn test_textual_and_symbolic_operators_agree() {
    let pairs = vec![
        ("IF a = b. ENDIF.", "IF a EQ b. ENDIF."),
        ("IF a <> b. ENDIF.", "IF a NE b. ENDIF."),
        ("IF a < b. ENDIF.", "IF a LT b. ENDIF."),
        ("IF a > b. ENDIF.", "IF a GT b. ENDIF."),
        ("IF a <= b. ENDIF.", "IF a LE b. ENDIF."),
        ("IF a >= b. ENDIF.", "IF a GE b. ENDIF."),
        ("IF a < b AND c >= 1. ENDIF.", "IF a lt b and c ge 1. ENDIF."),
    ];
    for (symbolic, textual) in pairs {
        assert_eq!(
            run(symbolic).unwrap(),
            run(textual).unwrap(),
            "Failed for input: {}",
            textual
        );
    }
}

#[test]
fn test_literal_left_operand_is_moved_right() {
    let tests = vec![
        ("foo = 2 + bar.", "foo.set(bar.add(2));"),
        ("foo = 2 * bar.", "foo.set(bar.multiply(2));"),
        ("IF 0 = foo. ENDIF.", "if (foo.eq(0)) {\n}"),
        ("IF 0 <> foo. ENDIF.", "if (!foo.eq(0)) {\n}"),
        ("IF 0 < foo. ENDIF.", "if (foo.gt(0)) {\n}"),
        ("IF 0 >= foo. ENDIF.", "if (foo.le(0)) {\n}"),
        ("ASSERT 'x' = lv_flag.", "abap.statements.assert(lv_flag.eq('x'));"),
    ];
    for (abap, js) in tests {
        assert_eq!(run(abap).unwrap(), js, "Failed for input: {}", abap);
    }
}

#[test]
fn test_literal_left_operand_of_ordered_operator() {
    assert_eq!(unsupported("foo = 2 - bar."), Construct::LiteralReceiver);
    assert_eq!(unsupported("foo = 2 ** 3."), Construct::LiteralReceiver);
}

#[test]
fn test_literal_escaping() {
    assert_eq!(run("foo = 'it''s'.").unwrap(), r"foo.set('it\'s');");
    assert_eq!(run(r"foo = |a\nb|.").unwrap(), r"foo.set(`a\nb`);");
    assert_eq!(run("foo = |${ bar }|.").unwrap(), r"foo.set(`\$${bar.get()}`);");
}

#[test]
fn test_runtime_helpers() {
    assert_eq!(
        run("APPEND foo TO lt.").unwrap(),
        "abap.statements.append({source: foo, target: lt});"
    );
    assert_eq!(
        run("CONCATENATE a 'b' INTO c.").unwrap(),
        "abap.statements.concatenate({source: [a, 'b'], target: c});"
    );
    assert_eq!(
        run("CONCATENATE a b INTO c SEPARATED BY sep.").unwrap(),
        "abap.statements.concatenate({source: [a, b], target: c, separatedBy: sep});"
    );
}

#[test]
fn test_calls() {
    let tests = vec![
        ("lcl_util=>run( ).", "lcl_util.run();"),
        ("me->run( 1 ).", "this.run(1);"),
        ("foo->run( EXPORTING 1 ).", "foo.run(1);"),
        ("foo = condense( val = bar ).", "foo.set(abap.builtin.condense({val: bar}));"),
        ("foo = strlen( bar ).", "foo.set(abap.builtin.strlen(bar));"),
        ("foo = lo->get( )->mv_value.", "foo.set(lo.get().mv_value);"),
        ("PERFORM run.", "run();"),
    ];
    for (abap, js) in tests {
        assert_eq!(run(abap).unwrap(), js, "Failed for input: {}", abap);
    }
}

#[test]
fn test_class_definition_produces_nothing() {
    assert_eq!(
        run("CLASS lcl DEFINITION.\nPUBLIC SECTION.\nENDCLASS.").unwrap(),
        ""
    );
    assert_eq!(run("CLASS lcl DEFINITION DEFERRED.").unwrap(), "");
}

// ============================================================================
// Named arguments
// ============================================================================

#[test]
fn test_named_arguments_reordered() {
    let ids = UniqueIdentifier::new();
    let signatures = SignatureTable::from_json(r#"{"method": ["moo", "bar"]}"#).unwrap();
    let js = Translator::new()
        .with_identifiers(&ids)
        .with_signatures(&signatures)
        .run("foo->method( bar = 2 moo = 1 ).")
        .unwrap();
    assert_eq!(js, "foo.method(1, 2);");
}

#[test]
fn test_named_arguments_without_signature() {
    let err = run("foo->method( bar = 2 moo = 1 ).").unwrap_err();
    let TranslateError::SignatureResolution(e) = err else {
        panic!("expected signature error, got {:?}", err);
    };
    assert_eq!(e.method, "method");
}

#[test]
fn test_named_argument_not_in_signature() {
    let ids = UniqueIdentifier::new();
    let signatures = SignatureTable::from_json(r#"{"method": ["moo"]}"#).unwrap();
    let result = Translator::new()
        .with_identifiers(&ids)
        .with_signatures(&signatures)
        .run("foo->method( bar = 2 ).");
    assert!(matches!(result, Err(TranslateError::SignatureResolution(_))));
}

// ============================================================================
// Unsupported constructs
// ============================================================================

#[test]
fn test_literal_receiver() {
    assert_eq!(unsupported("ASSERT 0 = 1."), Construct::LiteralReceiver);
}

#[test]
fn test_offset_length_read() {
    assert_eq!(unsupported("foo = bar+1(2)."), Construct::OffsetLengthRead);
}

#[test]
fn test_offset_length_on_member() {
    assert_eq!(unsupported("foo-bar(2) = 'a'."), Construct::OffsetLengthOnMember);
}

#[test]
fn test_negation_of_variable() {
    assert_eq!(unsupported("foo = - bar."), Construct::Negation);
}

#[test]
fn test_split_into_fields() {
    assert_eq!(unsupported("SPLIT foo AT ',' INTO a b."), Construct::SplitIntoFields);
}

#[test]
fn test_unsupported_statement_kinds() {
    use abap_js::ast::StatementKind;
    assert_eq!(
        unsupported("DELETE foo INDEX 1."),
        Construct::Statement(StatementKind::Delete)
    );
    assert_eq!(
        unsupported("CALL FUNCTION 'Z_FOO'."),
        Construct::Statement(StatementKind::Other("CALL".to_string()))
    );
}

#[test]
fn test_error_carries_position_and_kind() {
    let err = run("foo = 1.\nASSERT 0 = 1.").unwrap_err();
    let TranslateError::Unsupported(e) = &err else {
        panic!("expected unsupported construct");
    };
    assert_eq!(e.position, abap_js::Position::new(2, 1));
    assert_eq!(e.statement, abap_js::ast::StatementKind::Assert);
    assert_eq!(err.category(), "unsupported");
}

// ============================================================================
// Errors from earlier stages
// ============================================================================

#[test]
fn test_stage_errors() {
    assert!(matches!(run("foo = 'abc"), Err(TranslateError::Lex(_))));
    assert!(matches!(run("IF foo = bar."), Err(TranslateError::Parse(_))));
    assert!(matches!(run("DATA foo TYPE p."), Err(TranslateError::Declaration(_))));
}

#[test]
fn test_no_partial_output() {
    // generation fails on the second statement; nothing is returned
    assert!(run("foo = 1.\nREAD TABLE lt INDEX 1 INTO ls.").is_err());
}
