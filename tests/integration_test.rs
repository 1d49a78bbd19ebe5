// Integration tests for the GLSL parser

use glsl_syntax::ast::*;
use glsl_syntax::parse;

#[test]
fn test_vertex_shader() {
    let source = r#"
        layout(location = 0) in vec3 position;
        layout(location = 1) in vec2 uv;

        uniform Matrices {
            mat4 model;
            mat4 view;
            mat4 projection;
        } mats;

        out vec2 frag_uv;

        void main() {
            frag_uv = uv;
            gl_Position = mats.projection * mats.view * mats.model * vec4(position, 1.0);
        }
    "#;

    let result = parse(source);
    assert!(result.is_ok(), "errors: {:?}", result.errors);
    assert_eq!(result.root.declarations.len(), 5);

    assert!(matches!(
        result.root.declarations[2],
        ExternalDeclaration::Declaration(Declaration::Block { .. })
    ));
    let ExternalDeclaration::Function(main) = &result.root.declarations[4] else {
        panic!("expected main last");
    };
    assert_eq!(main.prototype.name.name, "main");
    assert_eq!(main.body.statements.len(), 2);
}

#[test]
fn test_fragment_shader_control_flow() {
    let source = r#"
        precision highp float;

        uniform int mode;
        in vec4 color;
        out vec4 frag_color;

        void main() {
            vec4 result = vec4(0.0);
            switch (mode) {
                case 0:
                    result = color;
                    break;
                default:
                    for (int i = 0; i < 4; ++i) {
                        result[i] = color[i] > 0.5 ? 1.0 : 0.0;
                    }
            }
            frag_color = result;
        }
    "#;

    let result = parse(source);
    assert!(result.is_ok(), "errors: {:?}", result.errors);
    assert!(matches!(
        result.root.declarations[0],
        ExternalDeclaration::Declaration(Declaration::Precision { .. })
    ));
}

#[test]
fn test_prototype_then_definition() {
    let source = r#"
        float attenuate(float dist, float radius);

        float attenuate(float dist, float radius) {
            float x = dist / radius;
            return 1.0 / (1.0 + x * x);
        }
    "#;

    let result = parse(source);
    assert!(result.is_ok(), "errors: {:?}", result.errors);
    assert!(matches!(
        result.root.declarations[0],
        ExternalDeclaration::Declaration(Declaration::FunctionPrototype(_))
    ));
    assert!(matches!(
        result.root.declarations[1],
        ExternalDeclaration::Function(_)
    ));
}

#[test]
fn test_float_literal_classification() {
    let source = "float f = 1.5e-3f;";
    let result = parse(source);
    assert!(result.is_ok(), "errors: {:?}", result.errors);

    let ExternalDeclaration::Declaration(Declaration::InitDeclaratorList { declarators, .. }) =
        &result.root.declarations[0]
    else {
        panic!("expected declaration");
    };
    let Some(Initializer::Expression(Expression::Number(lit))) = &declarators[0].initializer
    else {
        panic!("expected number initializer");
    };
    assert_eq!(lit.raw, "1.5e-3f");
    assert_eq!(
        lit.kind,
        NumberKind::Float {
            exponent: true,
            suffix: Some(FloatSuffix::F),
        }
    );
}

#[test]
fn test_if_else_with_negated_assignment() {
    let source = "void main(){ if(x>0) y=1; else y=-1; }";
    let result = parse(source);
    assert!(result.is_ok(), "errors: {:?}", result.errors);

    let ExternalDeclaration::Function(main) = &result.root.declarations[0] else {
        panic!("expected main");
    };
    let Statement::If { alternative, .. } = &main.body.statements[0] else {
        panic!("expected if statement");
    };
    let Some(alt) = alternative else {
        panic!("expected else branch");
    };
    let Statement::Expression {
        expression: Some(Expression::Assignment { right, .. }),
        ..
    } = alt.as_ref()
    else {
        panic!("expected assignment in else branch");
    };
    assert!(matches!(
        right.as_ref(),
        Expression::Unary {
            op: UnaryOp::Minus,
            ..
        }
    ));
}

#[test]
fn test_trivia_is_retained_out_of_band() {
    let source = "#version 450\n// main entry\nvoid main() { /* nothing */ }\n";
    let result = parse(source);
    assert!(result.is_ok(), "errors: {:?}", result.errors);

    let kinds: Vec<_> = result
        .trivia
        .iter()
        .map(|t| t.kind)
        .filter(|k| *k != TriviaKind::Whitespace)
        .collect();
    assert_eq!(
        kinds,
        [
            TriviaKind::Preprocessor,
            TriviaKind::LineComment,
            TriviaKind::BlockComment,
        ]
    );

    // the preprocessor line never reaches the token stream
    assert_eq!(result.root.declarations.len(), 1);
    assert!(matches!(
        result.root.declarations[0],
        ExternalDeclaration::Function(_)
    ));
}

#[test]
fn test_root_span_covers_the_whole_input() {
    let source = "void main() {}\n";
    let result = parse(source);
    assert_eq!(result.root.span, Span::new(0, source.len()));
}

#[test]
fn test_error_recovery_keeps_later_declarations() {
    let source = r#"
        float broken = ;
        float fine = 1.0;
        void also_fine() { return; }
    "#;

    let result = parse(source);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.root.declarations.len(), 3);
    assert!(matches!(
        result.root.declarations[0],
        ExternalDeclaration::Error { .. }
    ));
    assert!(matches!(
        result.root.declarations[1],
        ExternalDeclaration::Declaration(_)
    ));
    assert!(matches!(
        result.root.declarations[2],
        ExternalDeclaration::Function(_)
    ));
}

#[test]
fn test_multiple_errors_are_all_reported() {
    let source = "int a = ;\nint b = $;\nint c = 3;";
    let result = parse(source);
    // one parse error per bad declaration plus the lexical error for '$'
    assert!(result.errors.len() >= 2);
    let ok_count = result
        .root
        .declarations
        .iter()
        .filter(|d| !matches!(d, ExternalDeclaration::Error { .. }))
        .count();
    assert_eq!(ok_count, 1);
}

#[test]
fn test_unterminated_block_is_reported() {
    let source = "void main() { x = 1;";
    let result = parse(source);
    assert!(!result.is_ok());
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e, glsl_syntax::SyntaxError::Unterminated { .. })));
}

#[test]
fn test_error_messages_carry_line_and_column() {
    let source = "void main() {\n    x = ;\n}";
    let result = parse(source);
    assert_eq!(result.errors.len(), 1);
    let location = result.errors[0].location();
    assert_eq!(location.line, 2);
    assert!(location.column > 1);
}
