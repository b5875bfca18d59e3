/// End-to-end tests for the statement compiler
/// Demonstrates: Lexer → Parser → Semantic → IR → Optimizer → Assembly
use arithc::compiler::{format_tree, CompileOptions, Compiler, TypePolicy};
use arithc::{lex, parse, CompileResult, Error, Expr, ScalarType, TypeMap};

fn compile(source: &str, types: &TypeMap) -> CompileResult {
    Compiler::default().compile(source, types).unwrap()
}

fn lines<T: ToString>(items: &[T]) -> Vec<String> {
    items.iter().map(|i| i.to_string()).collect()
}

fn types(decls: &[(&str, ScalarType)]) -> TypeMap {
    decls.iter().copied().collect()
}

#[test]
fn test_scenario_a_integer_literals() {
    let result = compile("x = 3 + 4", &TypeMap::new());

    assert_eq!(result.syntax_tree.to_string(), "x = (3 + 4)");
    assert_eq!(result.semantic_tree, result.syntax_tree);
    assert_eq!(lines(&result.ir), vec!["temp1 = 3 + 4", "x = temp1"]);
    assert_eq!(lines(&result.optimized_ir), vec!["x = 3 + 4"]);
    assert_eq!(
        lines(&result.assembly),
        vec!["LOAD R1, #3", "ADD R1, R1, #4", "STR x, R1"]
    );
}

#[test]
fn test_scenario_b_promoted_identifier() {
    let result = compile("x = y + 1.5", &types(&[("y", ScalarType::Int)]));

    assert_eq!(result.semantic_tree.promotion_count(), 1);
    assert_eq!(
        lines(&result.ir),
        vec!["temp1 = int_to_float(y)", "temp2 = temp1 + 1.5", "x = temp2"]
    );
    assert_eq!(lines(&result.optimized_ir), vec!["x = int_to_float(y) + 1.5"]);
    assert_eq!(
        lines(&result.assembly),
        vec!["LOADF R1, y", "ADDF R1, R1, #1.5", "STRF x, R1"]
    );
}

#[test]
fn test_scenario_c_two_subexpressions() {
    let result = compile("x = (1+2)*(3+4)", &TypeMap::new());

    assert_eq!(
        lines(&result.optimized_ir),
        vec!["temp1 = 1 + 2", "temp2 = 3 + 4", "x = temp1 * temp2"]
    );
    assert_eq!(
        lines(&result.assembly),
        vec![
            "LOAD R1, #1",
            "ADD R1, R1, #2",
            "LOAD R2, #3",
            "ADD R2, R2, #4",
            "MUL R1, R1, R2",
            "STR x, R1",
        ]
    );
}

#[test]
fn test_scenario_d_leading_operator() {
    let err = Compiler::default()
        .compile("x = + 1", &TypeMap::new())
        .unwrap_err();
    assert_eq!(
        err,
        Error::SyntaxError {
            position: 0,
            message: "Invalid expression: operator at position 0".to_string(),
        }
    );
}

#[test]
fn test_float_identifier_promotes_integer_literals() {
    let result = compile("area = r * r * 3", &types(&[("r", ScalarType::Float)]));

    assert_eq!(result.semantic_tree.to_string(), "area = ((r * r) * int_to_float(3))");
    assert_eq!(
        lines(&result.optimized_ir),
        vec!["temp1 = r * r", "area = temp1 * int_to_float(3)"]
    );
    assert_eq!(
        lines(&result.assembly),
        vec![
            "LOADF R1, r",
            "LOADF R2, r",
            "MULF R1, R1, R2",
            "MULF R1, R1, #3",
            "STRF area, R1",
        ]
    );
}

#[test]
fn test_precedence_and_non_commutative_order() {
    let result = compile(
        "x = a - b * c",
        &types(&[("a", ScalarType::Int), ("b", ScalarType::Int), ("c", ScalarType::Int)]),
    );

    assert_eq!(
        lines(&result.optimized_ir),
        vec!["temp1 = b * c", "x = a - temp1"]
    );
    assert_eq!(
        lines(&result.assembly),
        vec![
            "LOAD R1, b",
            "LOAD R2, c",
            "MUL R1, R1, R2",
            "LOAD R2, a",
            "SUB R1, R2, R1",
            "STR x, R1",
        ]
    );
}

#[test]
fn test_literal_on_left_of_subtraction() {
    let result = compile("x = 10 - y", &TypeMap::new());
    assert_eq!(
        lines(&result.assembly),
        vec!["LOAD R1, y", "SUB R1, #10, R1", "STR x, R1"]
    );
}

#[test]
fn test_pi_and_normalized_literals() {
    let result = compile("c = pi * .5", &TypeMap::new());
    assert_eq!(lines(&result.optimized_ir), vec!["c = 3.14 * 0.5"]);
    assert_eq!(result.display_names.len(), 1);
    assert_eq!(result.display_names.get("pi"), None);
}

#[test]
fn test_disabled_optimizer_keeps_every_temp() {
    let compiler = Compiler::new(CompileOptions {
        optimize: false,
        ..CompileOptions::default()
    });
    let result = compiler
        .compile("x = y + 1.5", &types(&[("y", ScalarType::Int)]))
        .unwrap();

    assert_eq!(result.optimized_ir, result.ir);
    assert_eq!(
        lines(&result.assembly),
        vec![
            "LOADF R1, y",
            "ADDF R1, R1, #1.5",
            "STRF x, R1",
        ]
    );
}

#[test]
fn test_strict_policy() {
    let strict = Compiler::new(CompileOptions {
        type_policy: TypePolicy::Strict,
        ..CompileOptions::default()
    });

    let err = strict.compile("total = price * qty", &types(&[("price", ScalarType::Float)]));
    assert_eq!(err.unwrap_err(), Error::UndeclaredType { name: "qty".to_string() });

    // Write-only targets need no declaration.
    assert!(strict.compile("total = 3 * 4", &TypeMap::new()).is_ok());
}

#[test]
fn test_syntax_errors() {
    let cases = [
        ("x", "Expected '=' as the second token"),
        ("x =", "Invalid assignment expression"),
        ("3 = x", "Assignment target must be an identifier"),
        ("x = (1 + 2", "Unmatched parentheses"),
        ("x = 1 +", "Invalid expression: operator at position 1"),
        ("x = 1 2", "Invalid expression structure"),
    ];
    for (source, expected) in cases {
        match Compiler::default().compile(source, &TypeMap::new()) {
            Err(Error::SyntaxError { message, .. }) => assert_eq!(message, expected, "{}", source),
            other => panic!("{}: expected syntax error, got {:?}", source, other),
        }
    }
}

#[test]
fn test_lexer_errors_abort() {
    let err = Compiler::default()
        .compile("x = 3 % 4", &TypeMap::new())
        .unwrap_err();
    assert!(matches!(err, Error::LexError { .. }));
}

#[test]
fn test_tree_dump_with_display_names() {
    let (tokens, names) = lex("x = y + 1").unwrap();
    let tree: Expr = parse(tokens).unwrap();
    assert_eq!(
        format_tree(&tree, Some(&names)),
        "=\n├── ID1\n└── +\n    ├── ID2\n    └── 1\n"
    );
}

#[test]
fn test_result_serializes() {
    let result = compile("x = 3 + 4", &TypeMap::new());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["tokens"].as_array().map(Vec::len), Some(5));
    assert!(json["assembly"].is_array());
}
