// tests/parser_tests.rs

use abap_js::TranslateError;
use abap_js::ast::{
    BinOp, CallArgs, DataDeclaration, DataOptions, Expr, Literal, RuntimeCall, SplitTarget,
    Statement, StatementKind, TypeRef, UnaryOp,
};
use abap_js::lexer::{Position, tokenize};
use abap_js::parser::{ParseError, Program, parse};

fn parse_src(source: &str) -> Result<Program, TranslateError> {
    parse(tokenize(source)?)
}

fn statements(source: &str) -> Vec<Statement> {
    parse_src(source)
        .unwrap()
        .statements
        .into_iter()
        .map(|s| s.node)
        .collect()
}

fn single(source: &str) -> Statement {
    let mut all = statements(source);
    assert_eq!(all.len(), 1, "expected one statement for {}", source);
    all.remove(0)
}

fn parse_error(source: &str) -> ParseError {
    match parse_src(source) {
        Err(TranslateError::Parse(e)) => e,
        other => panic!("expected parse error for {}, got {:?}", source, other),
    }
}

/// Right-hand side of `x = <expr>.`
fn value_of(expr: &str) -> Expr {
    match single(&format!("x = {}.", expr)) {
        Statement::Assignment { value, .. } => value,
        other => panic!("expected assignment, got {:?}", other),
    }
}

fn id(name: &str) -> Expr {
    Expr::identifier(name)
}

fn text(s: &str) -> Expr {
    Expr::Literal(Literal::Text(s.to_string()))
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_data_with_length_and_value() {
    assert_eq!(
        single("DATA foo TYPE c LENGTH 2 VALUE 'fo'."),
        Statement::DataDeclaration(DataDeclaration {
            name: "foo".to_string(),
            type_ref: TypeRef::Named("c".to_string()),
            options: DataOptions {
                length: Some(Expr::number(2)),
                value: Some(text("fo")),
            },
        })
    );
}

#[test]
fn test_data_legacy_length() {
    let Statement::DataDeclaration(decl) = single("DATA foo(2) TYPE c.") else {
        panic!("expected declaration");
    };
    assert_eq!(decl.options.length, Some(Expr::number(2)));
}

#[test]
fn test_value_is_initial_has_no_value() {
    let Statement::DataDeclaration(decl) = single("DATA foo TYPE i VALUE IS INITIAL.") else {
        panic!("expected declaration");
    };
    assert!(decl.options.is_empty());
}

#[test]
fn test_negative_value() {
    let Statement::DataDeclaration(decl) = single("DATA foo TYPE i VALUE -1.") else {
        panic!("expected declaration");
    };
    assert_eq!(decl.options.value, Some(Expr::number(-1)));
}

#[test]
fn test_table_types() {
    for source in [
        "DATA lt TYPE STANDARD TABLE OF string.",
        "DATA lt TYPE TABLE OF string.",
        "DATA lt TYPE SORTED TABLE OF string WITH UNIQUE KEY table_line.",
        "DATA lt TYPE HASHED TABLE OF string WITH UNIQUE KEY table_line.",
    ] {
        let Statement::DataDeclaration(decl) = single(source) else {
            panic!("expected declaration for {}", source);
        };
        assert_eq!(decl.type_ref, TypeRef::TableOf("string".to_string()), "{}", source);
    }
}

#[test]
fn test_declarations_fill_symbol_table() {
    let program = parse_src("DATA foo TYPE i. DATA bar TYPE STANDARD TABLE OF string.").unwrap();
    assert_eq!(program.symbols.len(), 2);
    assert_eq!(
        program.symbols.get("FOO").map(|s| s.position),
        Some(Position::new(1, 1))
    );
}

#[test]
fn test_unknown_type_is_a_declaration_error() {
    assert!(matches!(
        parse_src("DATA foo TYPE zz_unknown."),
        Err(TranslateError::Declaration(_))
    ));
    assert!(matches!(
        parse_src("DATA lo TYPE REF TO lcl_foo."),
        Err(TranslateError::Declaration(_))
    ));
}

// ============================================================================
// Chains and comments
// ============================================================================

#[test]
fn test_chain_expands_prefix() {
    let all = statements("DATA: a TYPE i, b TYPE string.");
    assert_eq!(all.len(), 2);
    assert!(matches!(&all[0], Statement::DataDeclaration(d) if d.name == "a"));
    assert!(matches!(&all[1], Statement::DataDeclaration(d) if d.name == "b"));
}

#[test]
fn test_chain_of_runtime_calls() {
    assert_eq!(
        statements("CLEAR: foo, bar."),
        vec![
            Statement::RuntimeCall(RuntimeCall::Clear(id("foo"))),
            Statement::RuntimeCall(RuntimeCall::Clear(id("bar"))),
        ]
    );
}

#[test]
fn test_comma_without_chain() {
    let err = parse_error("WRITE foo, bar.");
    assert_eq!(err.found, "','");
}

#[test]
fn test_empty_chain_element() {
    let err = parse_error("DATA: a TYPE i, .");
    assert_eq!(err.expected, "chain element");
}

#[test]
fn test_comment_statement() {
    assert_eq!(single("* comment"), Statement::Comment("* comment".to_string()));
}

#[test]
fn test_comment_inside_statement_is_hoisted() {
    let all = statements("foo =\n* note\n  1.");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], Statement::Comment("* note".to_string()));
    assert!(matches!(all[1], Statement::Assignment { .. }));
}

#[test]
fn test_missing_terminator() {
    let err = parse_error("foo = 1");
    assert_eq!(err.expected, "'.'");
    assert_eq!(err.found, "end of input");
}

// ============================================================================
// Blocks
// ============================================================================

#[test]
fn test_if_elseif_else() {
    let Statement::If {
        branches,
        else_block,
    } = single("IF a = 1. WRITE a. ELSEIF a = 2. ELSE. WRITE b. ENDIF.")
    else {
        panic!("expected IF");
    };
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0].body.len(), 1);
    assert!(branches[1].body.is_empty());
    assert_eq!(else_block.map(|b| b.len()), Some(1));
}

#[test]
fn test_else_twice() {
    let err = parse_error("IF a = 1. ELSE. ELSE. ENDIF.");
    assert_eq!(err.expected, "ENDIF");
    assert_eq!(err.found, "ELSE");
}

#[test]
fn test_case_arms() {
    let Statement::Case {
        selector,
        arms,
        default,
    } = single("CASE foo. WHEN 1 OR 2. WRITE foo. WHEN 'a'. WHEN OTHERS. CLEAR foo. ENDCASE.")
    else {
        panic!("expected CASE");
    };
    assert_eq!(selector, id("foo"));
    assert_eq!(arms.len(), 2);
    assert_eq!(arms[0].values, vec![Expr::number(1), Expr::number(2)]);
    assert_eq!(arms[0].body.len(), 1);
    assert_eq!(arms[1].values, vec![text("a")]);
    assert_eq!(default.map(|b| b.len()), Some(1));
}

#[test]
fn test_case_comment_before_first_when() {
    let Statement::Case { arms, .. } = single("CASE foo.\n* first\nWHEN 1. ENDCASE.") else {
        panic!("expected CASE");
    };
    assert_eq!(arms[0].body.len(), 1);
}

#[test]
fn test_case_statement_before_when() {
    let err = parse_error("CASE foo. WRITE foo. WHEN 1. ENDCASE.");
    assert_eq!(err.expected, "WHEN");
}

#[test]
fn test_when_after_others() {
    let err = parse_error("CASE foo. WHEN OTHERS. WHEN 1. ENDCASE.");
    assert_eq!(err.expected, "ENDCASE");
}

#[test]
fn test_do_forms() {
    assert_eq!(
        single("DO. ENDDO."),
        Statement::Do {
            count: None,
            body: vec![],
        }
    );
    assert_eq!(
        single("DO foo TIMES. ENDDO."),
        Statement::Do {
            count: Some(id("foo")),
            body: vec![],
        }
    );
}

#[test]
fn test_loop_at() {
    assert_eq!(
        single("LOOP AT table INTO line. ENDLOOP."),
        Statement::LoopAt {
            table: id("table"),
            binding: "line".to_string(),
            body: vec![],
        }
    );
}

#[test]
fn test_nested_blocks() {
    let Statement::Form { name, body } =
        single("FORM run. WHILE a = b. IF c = d. EXIT. ENDIF. ENDWHILE. ENDFORM.")
    else {
        panic!("expected FORM");
    };
    assert_eq!(name, "run");
    let Statement::While { body, .. } = &body[0].node else {
        panic!("expected WHILE");
    };
    assert!(matches!(body[0].node, Statement::If { .. }));
}

#[test]
fn test_block_positions() {
    let program = parse_src("foo = 1.\nDO.\n  EXIT.\nENDDO.").unwrap();
    assert_eq!(program.statements[1].position, Position::new(2, 1));
    let Statement::Do { body, .. } = &program.statements[1].node else {
        panic!("expected DO");
    };
    assert_eq!(body[0].position, Position::new(3, 3));
}

#[test]
fn test_mismatched_closer() {
    let err = parse_error("IF a = b. ENDDO.");
    assert_eq!(err.expected, "ENDIF");
    assert_eq!(err.found, "ENDDO");
}

#[test]
fn test_closer_without_opener() {
    let err = parse_error("ENDLOOP.");
    assert_eq!(err.found, "ENDLOOP");
}

#[test]
fn test_unclosed_block() {
    let err = parse_error("foo = 1.\nDO.");
    assert_eq!(err.expected, "ENDDO");
    assert_eq!(err.found, "end of input");
    assert_eq!(err.position, Position::new(2, 1));
}

#[test]
fn test_form_only_at_top_level() {
    let err = parse_error("IF a = b. FORM foo. ENDFORM. ENDIF.");
    assert_eq!(err.found, "FORM");
}

#[test]
fn test_method_outside_class() {
    let err = parse_error("METHOD run. ENDMETHOD.");
    assert_eq!(err.found, "METHOD");
}

#[test]
fn test_class_implementation() {
    let Statement::ClassImplementation { name, methods } =
        single("CLASS lcl_foo IMPLEMENTATION. METHOD run. RETURN. ENDMETHOD. ENDCLASS.")
    else {
        panic!("expected class");
    };
    assert_eq!(name, "lcl_foo");
    assert_eq!(methods.len(), 1);
    assert!(matches!(
        &methods[0].node,
        Statement::MethodDefinition { name, .. } if name == "run"
    ));
}

#[test]
fn test_class_body_allows_only_methods() {
    let err = parse_error("CLASS lcl_foo IMPLEMENTATION. foo = 1. ENDCLASS.");
    assert_eq!(err.expected, "METHOD");
}

#[test]
fn test_class_definition_is_skipped() {
    let source = "CLASS lcl_foo DEFINITION.\n  PUBLIC SECTION.\n    METHODS run IMPORTING iv TYPE i.\nENDCLASS.";
    assert_eq!(
        statements(source),
        vec![Statement::ClassDefinition {
            name: "lcl_foo".to_string()
        }]
    );
}

#[test]
fn test_class_definition_deferred() {
    assert_eq!(
        single("CLASS lcl_foo DEFINITION DEFERRED."),
        Statement::ClassDefinition {
            name: "lcl_foo".to_string()
        }
    );
}

// ============================================================================
// Simple statements
// ============================================================================

#[test]
fn test_split_into_table_and_fields() {
    assert_eq!(
        single("SPLIT foo AT bar INTO TABLE moo."),
        Statement::RuntimeCall(RuntimeCall::Split {
            source: id("foo"),
            at: id("bar"),
            into: SplitTarget::Table(id("moo")),
        })
    );
    assert!(matches!(
        single("SPLIT foo AT ',' INTO a b."),
        Statement::RuntimeCall(RuntimeCall::Split {
            into: SplitTarget::Fields(fields),
            ..
        }) if fields.len() == 2
    ));
}

#[test]
fn test_delete_where_and_unsupported_delete() {
    assert!(matches!(
        single("DELETE foo WHERE bar = 2."),
        Statement::RuntimeCall(RuntimeCall::DeleteWhere { .. })
    ));
    assert_eq!(
        single("DELETE foo INDEX 1."),
        Statement::Unsupported(StatementKind::Delete)
    );
}

#[test]
fn test_unsupported_statements() {
    assert_eq!(
        single("SELECT * FROM ztab INTO TABLE lt."),
        Statement::Unsupported(StatementKind::Other("SELECT".to_string()))
    );
    assert_eq!(
        single("read table lt index 1 into ls."),
        Statement::Unsupported(StatementKind::Other("READ".to_string()))
    );
}

#[test]
fn test_arithmetic_statements_desugar() {
    assert_eq!(
        single("ADD 2 TO foo."),
        Statement::Assignment {
            target: id("foo"),
            value: Expr::binary(BinOp::Add, id("foo"), Expr::number(2)),
        }
    );
    assert_eq!(
        single("SUBTRACT 1 FROM foo."),
        Statement::Assignment {
            target: id("foo"),
            value: Expr::binary(BinOp::Subtract, id("foo"), Expr::number(1)),
        }
    );
    assert_eq!(
        single("MULTIPLY foo BY 3."),
        Statement::Assignment {
            target: id("foo"),
            value: Expr::binary(BinOp::Multiply, id("foo"), Expr::number(3)),
        }
    );
    assert_eq!(
        single("MOVE bar TO foo."),
        Statement::Assignment {
            target: id("foo"),
            value: id("bar"),
        }
    );
}

#[test]
fn test_concatenate() {
    assert_eq!(
        single("CONCATENATE a b INTO c SEPARATED BY space."),
        Statement::RuntimeCall(RuntimeCall::Concatenate {
            sources: vec![id("a"), id("b")],
            target: id("c"),
            separated_by: Some(id("space")),
        })
    );
}

#[test]
fn test_perform_and_early_exits() {
    assert_eq!(
        statements("PERFORM run. EXIT. CONTINUE. RETURN."),
        vec![
            Statement::Perform {
                name: "run".to_string()
            },
            Statement::Exit,
            Statement::Continue,
            Statement::Return,
        ]
    );
}

#[test]
fn test_keyword_used_as_variable() {
    assert_eq!(
        single("data = 1."),
        Statement::Assignment {
            target: id("data"),
            value: Expr::number(1),
        }
    );
}

#[test]
fn test_literal_target_is_rejected() {
    let err = parse_error("'a' = 1.");
    assert!(err.expected.starts_with("assignment target"));
}

#[test]
fn test_trailing_tokens() {
    let err = parse_error("CLEAR foo bar.");
    assert_eq!(err.expected, "'.'");
    assert_eq!(err.found, "identifier 'bar'");
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(
        value_of("a + b * c"),
        Expr::binary(
            BinOp::Add,
            id("a"),
            Expr::binary(BinOp::Multiply, id("b"), id("c"))
        )
    );
    assert_eq!(
        value_of("( a + b ) * c"),
        Expr::binary(
            BinOp::Multiply,
            Expr::binary(BinOp::Add, id("a"), id("b")),
            id("c")
        )
    );
}

#[test]
fn test_power_is_right_associative() {
    assert_eq!(
        value_of("a ** b ** c"),
        Expr::binary(
            BinOp::Power,
            id("a"),
            Expr::binary(BinOp::Power, id("b"), id("c"))
        )
    );
}

#[test]
fn test_mod_and_div() {
    assert_eq!(
        value_of("a MOD 2"),
        Expr::binary(BinOp::Modulo, id("a"), Expr::number(2))
    );
    assert_eq!(
        value_of("a DIV 2"),
        Expr::binary(BinOp::IntDivide, id("a"), Expr::number(2))
    );
}

#[test]
fn test_logical_precedence() {
    let Statement::If { branches, .. } = single("IF a = 1 OR b = 2 AND NOT c = 3. ENDIF.") else {
        panic!("expected IF");
    };
    let eq = |name: &str, n: i64| Expr::binary(BinOp::Equal, id(name), Expr::number(n));
    assert_eq!(
        branches[0].condition,
        Expr::binary(
            BinOp::Or,
            eq("a", 1),
            Expr::binary(BinOp::And, eq("b", 2), Expr::unary(UnaryOp::Not, eq("c", 3)))
        )
    );
}

#[test]
fn test_is_initial_forms() {
    let initial = Expr::unary(UnaryOp::IsInitial, id("foo"));
    let negated = Expr::unary(UnaryOp::Not, initial.clone());

    for (source, expected) in [
        ("IF foo IS INITIAL. ENDIF.", initial.clone()),
        ("IF foo IS NOT INITIAL. ENDIF.", negated.clone()),
        ("IF NOT foo IS INITIAL. ENDIF.", negated.clone()),
    ] {
        let Statement::If { branches, .. } = single(source) else {
            panic!("expected IF");
        };
        assert_eq!(branches[0].condition, expected, "{}", source);
    }
}

#[test]
fn test_hyphen_spacing() {
    assert_eq!(
        value_of("a-b"),
        Expr::MemberAccess {
            base: Box::new(id("a")),
            field: "b".to_string(),
        }
    );
    assert_eq!(
        value_of("a - b"),
        Expr::binary(BinOp::Subtract, id("a"), id("b"))
    );
}

#[test]
fn test_negative_literal_folds() {
    assert_eq!(value_of("-1"), Expr::number(-1));
    assert_eq!(value_of("- a"), Expr::unary(UnaryOp::Negate, id("a")));
}

#[test]
fn test_offset_length_targets() {
    let target = |source: &str| match single(source) {
        Statement::Assignment { target, .. } => target,
        other => panic!("expected assignment, got {:?}", other),
    };

    assert_eq!(
        target("foo+1(2) = 'a'."),
        Expr::OffsetLengthAccess {
            base: Box::new(id("foo")),
            offset: Some(Box::new(Expr::number(1))),
            length: Some(Box::new(Expr::number(2))),
        }
    );
    assert_eq!(
        target("foo(bar) = 'a'."),
        Expr::OffsetLengthAccess {
            base: Box::new(id("foo")),
            offset: None,
            length: Some(Box::new(id("bar"))),
        }
    );
    assert_eq!(
        target("foo+1 = 'a'."),
        Expr::OffsetLengthAccess {
            base: Box::new(id("foo")),
            offset: Some(Box::new(Expr::number(1))),
            length: None,
        }
    );
}

#[test]
fn test_builtin_call() {
    assert_eq!(
        value_of("lines( lt_words )"),
        Expr::BuiltinCall {
            name: "lines".to_string(),
            args: CallArgs::Positional(vec![id("lt_words")]),
        }
    );
}

#[test]
fn test_method_calls() {
    assert_eq!(
        single("foo->method( )."),
        Statement::MethodCall(Expr::MethodCall {
            receiver: Box::new(id("foo")),
            method: "method".to_string(),
            args: CallArgs::Positional(vec![]),
        })
    );
    assert_eq!(
        value_of("foo->method()"),
        Expr::MethodCall {
            receiver: Box::new(id("foo")),
            method: "method".to_string(),
            args: CallArgs::Positional(vec![]),
        }
    );
    assert_eq!(
        single("lcl_util=>run( EXPORTING a = 1 b = 2 )."),
        Statement::MethodCall(Expr::MethodCall {
            receiver: Box::new(id("lcl_util")),
            method: "run".to_string(),
            args: CallArgs::Named(vec![
                ("a".to_string(), Expr::number(1)),
                ("b".to_string(), Expr::number(2)),
            ]),
        })
    );
}

#[test]
fn test_attribute_after_call() {
    assert_eq!(
        value_of("lo->get( )->mv_value"),
        Expr::MemberAccess {
            base: Box::new(Expr::MethodCall {
                receiver: Box::new(id("lo")),
                method: "get".to_string(),
                args: CallArgs::Positional(vec![]),
            }),
            field: "mv_value".to_string(),
        }
    );
}

#[test]
fn test_malformed_argument_list() {
    let err = parse_error("foo->m( a = 1 2 ).");
    assert_eq!(err.expected, "parameter name or ')'");
}

#[test]
fn test_template_segments() {
    use abap_js::ast::TemplateSegment;
    assert_eq!(
        value_of("|n={ a + 1 }|"),
        Expr::StringTemplate(vec![
            TemplateSegment::Literal("n=".to_string()),
            TemplateSegment::Embedded(Expr::binary(BinOp::Add, id("a"), Expr::number(1))),
        ])
    );
}

#[test]
fn test_error_display() {
    let err = parse_error("IF a = b. ENDDO.");
    assert_eq!(err.to_string(), "Expected ENDIF, found ENDDO at line 1, column 11");
}
