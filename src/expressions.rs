//! Expression grammar.
//!
//! Precedence climbing over a single numeric table: each binary operator
//! carries a binding level, left-associative operators recurse one level
//! tighter on the right, right-associative operators (assignment, the
//! conditional) recurse at their own level. Comma sits below assignment and
//! flattens into a single [`Expression::Comma`] node with all operands.
//!
//! Constructor calls like `vec3(1.0)` or `float[3](a, b, c)` are recognized
//! in the primary layer: a builtin type name in expression position parses
//! as a type specifier and becomes a [`Callee::Type`]. User-defined
//! constructors are indistinguishable from function calls here and come out
//! as ordinary identifier callees.

use crate::ast::*;
use crate::errors::SyntaxError;
use crate::lexer::TokenKind;
use crate::parse::Parser;
use crate::types::primitive_type_name;

// Binding levels, loosest to tightest.
const PREC_COMMA: i8 = -10;
const PREC_ASSIGNMENT: i8 = -2;
const PREC_CONDITIONAL: i8 = -1;

fn binary_op(kind: &TokenKind) -> Option<(BinaryOp, i8)> {
    let entry = match kind {
        TokenKind::OrOr => (BinaryOp::Or, 1),
        TokenKind::AndAnd => (BinaryOp::And, 2),
        TokenKind::Pipe => (BinaryOp::BitOr, 3),
        TokenKind::Caret => (BinaryOp::BitXor, 4),
        TokenKind::Amp => (BinaryOp::BitAnd, 5),
        TokenKind::EqEq => (BinaryOp::Eq, 6),
        TokenKind::NotEq => (BinaryOp::Ne, 6),
        TokenKind::Lt => (BinaryOp::Lt, 7),
        TokenKind::Gt => (BinaryOp::Gt, 7),
        TokenKind::Le => (BinaryOp::Le, 7),
        TokenKind::Ge => (BinaryOp::Ge, 7),
        TokenKind::Shl => (BinaryOp::Shl, 9),
        TokenKind::Shr => (BinaryOp::Shr, 9),
        TokenKind::Plus => (BinaryOp::Add, 10),
        TokenKind::Minus => (BinaryOp::Sub, 10),
        TokenKind::Star => (BinaryOp::Mul, 11),
        TokenKind::Slash => (BinaryOp::Div, 11),
        TokenKind::Percent => (BinaryOp::Mod, 11),
        _ => return None,
    };
    Some(entry)
}

fn assignment_op(kind: &TokenKind) -> Option<AssignmentOp> {
    let op = match kind {
        TokenKind::Eq => AssignmentOp::Assign,
        TokenKind::PlusEq => AssignmentOp::AddAssign,
        TokenKind::MinusEq => AssignmentOp::SubAssign,
        TokenKind::StarEq => AssignmentOp::MulAssign,
        TokenKind::SlashEq => AssignmentOp::DivAssign,
        TokenKind::PercentEq => AssignmentOp::ModAssign,
        TokenKind::ShlEq => AssignmentOp::ShlAssign,
        TokenKind::ShrEq => AssignmentOp::ShrAssign,
        TokenKind::AmpEq => AssignmentOp::AndAssign,
        TokenKind::CaretEq => AssignmentOp::XorAssign,
        TokenKind::PipeEq => AssignmentOp::OrAssign,
        _ => return None,
    };
    Some(op)
}

impl Parser {
    /// A full expression, comma operator included. Used where the grammar
    /// means "any expression": statement expressions, parentheses, array
    /// subscripts, the consequence arm of a conditional.
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_expr_prec(PREC_COMMA)
    }

    /// An expression that stops before a top-level comma. Used for call
    /// arguments, initializers, and the update clause of a `for` loop.
    pub(crate) fn parse_assignment_expression(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_expr_prec(PREC_ASSIGNMENT)
    }

    /// Constant-expression positions: array sizes, case labels, layout
    /// qualifier values. Stops before assignment and comma.
    pub(crate) fn parse_constant_expression(&mut self) -> Result<Expression, SyntaxError> {
        self.parse_expr_prec(PREC_CONDITIONAL)
    }

    fn parse_expr_prec(&mut self, min_prec: i8) -> Result<Expression, SyntaxError> {
        let start = self.current_span().start;
        let mut lhs = self.parse_unary_expression()?;

        loop {
            if let Some((op, prec)) = binary_op(self.peek_kind()) {
                if prec < min_prec {
                    break;
                }
                self.advance();
                let rhs = self.parse_expr_prec(prec + 1)?;
                lhs = Expression::Binary {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                    span: self.span_from(start),
                };
                continue;
            }

            if self.check(&TokenKind::Question) && PREC_CONDITIONAL >= min_prec {
                self.advance();
                let consequence = self.parse_expression()?;
                self.expect(&TokenKind::Colon, "':' in conditional expression")?;
                let alternative = self.parse_expr_prec(PREC_CONDITIONAL)?;
                lhs = Expression::Conditional {
                    condition: Box::new(lhs),
                    consequence: Box::new(consequence),
                    alternative: Box::new(alternative),
                    span: self.span_from(start),
                };
                continue;
            }

            if let Some(op) = assignment_op(self.peek_kind()) {
                if PREC_ASSIGNMENT < min_prec {
                    break;
                }
                self.advance();
                let rhs = self.parse_expr_prec(PREC_ASSIGNMENT)?;
                lhs = Expression::Assignment {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                    span: self.span_from(start),
                };
                continue;
            }

            if self.check(&TokenKind::Comma) && PREC_COMMA >= min_prec {
                let mut operands = vec![lhs];
                while self.match_kind(&TokenKind::Comma) {
                    operands.push(self.parse_expr_prec(PREC_COMMA + 1)?);
                }
                lhs = Expression::Comma {
                    operands,
                    span: self.span_from(start),
                };
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    fn parse_unary_expression(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.current_span().start;

        let prefix_op = match self.peek_kind() {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            _ => None,
        };
        if let Some(op) = prefix_op {
            self.advance();
            let operand = self.parse_unary_expression()?;
            return Ok(Expression::Unary {
                op,
                operand: Box::new(operand),
                span: self.span_from(start),
            });
        }

        let update_op = match self.peek_kind() {
            TokenKind::PlusPlus => Some(UpdateOp::Increment),
            TokenKind::MinusMinus => Some(UpdateOp::Decrement),
            _ => None,
        };
        if let Some(op) = update_op {
            self.advance();
            let operand = self.parse_unary_expression()?;
            return Ok(Expression::Update {
                op,
                fixity: Fixity::Prefix,
                operand: Box::new(operand),
                span: self.span_from(start),
            });
        }

        self.parse_postfix_expression()
    }

    fn parse_postfix_expression(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.current_span().start;
        let mut expr = self.parse_primary_expression()?;

        loop {
            match self.peek_kind() {
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = if self.check(&TokenKind::PlusPlus) {
                        UpdateOp::Increment
                    } else {
                        UpdateOp::Decrement
                    };
                    self.advance();
                    expr = Expression::Update {
                        op,
                        fixity: Fixity::Postfix,
                        operand: Box::new(expr),
                        span: self.span_from(start),
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(&TokenKind::RBracket, "']' after subscript index")?;
                    expr = Expression::Subscript {
                        array: Box::new(expr),
                        index: Box::new(index),
                        span: self.span_from(start),
                    };
                }
                TokenKind::Dot => {
                    self.advance();
                    let field = self.expect_identifier("a field name after '.'")?;
                    expr = Expression::Field {
                        argument: Box::new(expr),
                        field,
                        span: self.span_from(start),
                    };
                }
                TokenKind::LParen => {
                    expr = self.parse_call(Callee::Expression(Box::new(expr)), start)?;
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Expression and closing `)` after an already-consumed `(`.
    fn parse_parenthesized_rest(&mut self) -> Result<Expression, SyntaxError> {
        let inner = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "')' to close the parenthesized expression")?;
        Ok(inner)
    }

    fn parse_primary_expression(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.current_span().start;

        match self.peek_kind().clone() {
            TokenKind::Number { raw, kind } => {
                let span = self.current_span();
                self.advance();
                Ok(Expression::Number(NumberLiteral { raw, kind, span }))
            }
            TokenKind::Ident(text) => {
                if text == "true" || text == "false" {
                    let span = self.current_span();
                    self.advance();
                    return Ok(Expression::Boolean {
                        value: text == "true",
                        span,
                    });
                }
                // builtin type names in expression position are constructors
                if primitive_type_name(&text).is_some() {
                    let ty = self.parse_type_specifier()?;
                    return self.parse_call(Callee::Type(ty), start);
                }
                Ok(Expression::Identifier(
                    self.expect_identifier("an expression")?,
                ))
            }
            TokenKind::LParen => {
                let open_location = self.current_location();
                self.advance();
                let inner = self
                    .parse_parenthesized_rest()
                    .map_err(|err| self.unterminated_if_eof(err, "parenthesis", open_location))?;
                Ok(Expression::Parenthesized {
                    inner: Box::new(inner),
                    span: self.span_from(start),
                })
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    /// Argument list starting at the `(`. A lone `void` argument is recorded
    /// as a flag with an empty argument vector.
    fn parse_call(&mut self, function: Callee, start: usize) -> Result<Expression, SyntaxError> {
        let open_location = self.current_location();
        self.expect(&TokenKind::LParen, "'(' to open the argument list")?;

        let (arguments, void_arguments) = self
            .parse_call_arguments()
            .map_err(|err| self.unterminated_if_eof(err, "parenthesis", open_location))?;

        Ok(Expression::Call {
            function,
            arguments,
            void_arguments,
            span: self.span_from(start),
        })
    }

    /// Arguments through the closing `)`.
    fn parse_call_arguments(&mut self) -> Result<(Vec<Expression>, bool), SyntaxError> {
        let mut arguments = Vec::new();
        let mut void_arguments = false;

        if self.at_keyword("void") && matches!(self.peek_ahead(1), Some(TokenKind::RParen)) {
            self.advance();
            void_arguments = true;
        } else if !self.check(&TokenKind::RParen) {
            arguments.push(self.parse_assignment_expression()?);
            while self.match_kind(&TokenKind::Comma) {
                arguments.push(self.parse_assignment_expression()?);
            }
        }

        self.expect(&TokenKind::RParen, "')' to close the argument list")?;
        Ok((arguments, void_arguments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    /// Parses `source` as a lone expression statement and returns it.
    fn expr(source: &str) -> Expression {
        let wrapped = format!("void main() {{ {}; }}", source);
        let result = parse(&wrapped);
        assert!(result.is_ok(), "errors: {:?}", result.errors);
        let ExternalDeclaration::Function(f) = &result.root.declarations[0] else {
            panic!("expected a function definition");
        };
        let Statement::Expression { expression, .. } = &f.body.statements[0] else {
            panic!("expected an expression statement");
        };
        expression.clone().expect("expected a non-empty expression")
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        let Expression::Binary { op, right, .. } = expr("a + b * c") else {
            panic!("expected binary expression");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(
            *right,
            Expression::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_shift_binds_tighter_than_bitor() {
        let Expression::Binary { op, left, .. } = expr("a << b | c") else {
            panic!("expected binary expression");
        };
        assert_eq!(op, BinaryOp::BitOr);
        assert!(matches!(
            *left,
            Expression::Binary {
                op: BinaryOp::Shl,
                ..
            }
        ));
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        // (a - b) - c
        let Expression::Binary { left, right, .. } = expr("a - b - c") else {
            panic!("expected binary expression");
        };
        assert!(matches!(
            *left,
            Expression::Binary {
                op: BinaryOp::Sub,
                ..
            }
        ));
        assert!(matches!(*right, Expression::Identifier(_)));
    }

    #[test]
    fn test_assignment_is_right_associative() {
        // a = (b = c)
        let Expression::Assignment { left, right, .. } = expr("a = b = c") else {
            panic!("expected assignment");
        };
        assert!(matches!(*left, Expression::Identifier(_)));
        assert!(matches!(*right, Expression::Assignment { .. }));
    }

    #[test]
    fn test_conditional_is_right_associative() {
        // a ? b : (c ? d : e)
        let Expression::Conditional { alternative, .. } = expr("a ? b : c ? d : e") else {
            panic!("expected conditional");
        };
        assert!(matches!(*alternative, Expression::Conditional { .. }));
    }

    #[test]
    fn test_assignment_below_conditional() {
        // x = (a ? b : c)
        let Expression::Assignment { right, .. } = expr("x = a ? b : c") else {
            panic!("expected assignment");
        };
        assert!(matches!(*right, Expression::Conditional { .. }));
    }

    #[test]
    fn test_update_fixity() {
        // (a++) + (++b)
        let Expression::Binary { left, right, .. } = expr("a++ + ++b") else {
            panic!("expected binary expression");
        };
        assert!(matches!(
            *left,
            Expression::Update {
                fixity: Fixity::Postfix,
                ..
            }
        ));
        assert!(matches!(
            *right,
            Expression::Update {
                fixity: Fixity::Prefix,
                ..
            }
        ));
    }

    #[test]
    fn test_comma_expression_flattens() {
        let Expression::Comma { operands, .. } = expr("a = 1, b = 2, c") else {
            panic!("expected comma expression");
        };
        assert_eq!(operands.len(), 3);
        assert!(matches!(operands[0], Expression::Assignment { .. }));
    }

    #[test]
    fn test_call_arguments_are_not_comma_expressions() {
        let Expression::Call { arguments, .. } = expr("f(a, b)") else {
            panic!("expected call");
        };
        assert_eq!(arguments.len(), 2);
    }

    #[test]
    fn test_parenthesized_comma_is_one_argument() {
        let Expression::Call { arguments, .. } = expr("f((a, b))") else {
            panic!("expected call");
        };
        assert_eq!(arguments.len(), 1);
        assert!(matches!(arguments[0], Expression::Parenthesized { .. }));
    }

    #[test]
    fn test_void_argument_list() {
        let Expression::Call {
            arguments,
            void_arguments,
            ..
        } = expr("f(void)")
        else {
            panic!("expected call");
        };
        assert!(arguments.is_empty());
        assert!(void_arguments);
    }

    #[test]
    fn test_constructor_call_has_type_callee() {
        let Expression::Call { function, .. } = expr("vec3(1.0, 0.0, 0.0)") else {
            panic!("expected call");
        };
        assert!(matches!(function, Callee::Type(_)));
    }

    #[test]
    fn test_array_constructor() {
        let Expression::Call { function, .. } = expr("float[3](1.0, 2.0, 3.0)") else {
            panic!("expected call");
        };
        let Callee::Type(ty) = function else {
            panic!("expected type callee");
        };
        assert_eq!(ty.arrays.len(), 1);
    }

    #[test]
    fn test_swizzle_chain() {
        // ((v.xyz)[0])++
        let e = expr("v.xyz[0]++");
        let Expression::Update { operand, .. } = e else {
            panic!("expected postfix update");
        };
        let Expression::Subscript { array, .. } = *operand else {
            panic!("expected subscript");
        };
        assert!(matches!(*array, Expression::Field { .. }));
    }

    #[test]
    fn test_unary_chain() {
        let Expression::Unary { op, operand, .. } = expr("-!x") else {
            panic!("expected unary");
        };
        assert_eq!(op, UnaryOp::Minus);
        assert!(matches!(
            *operand,
            Expression::Unary {
                op: UnaryOp::Not,
                ..
            }
        ));
    }

    #[test]
    fn test_unterminated_parenthesized_expression() {
        let result = parse("int x = (1 + ");
        assert!(result.errors.iter().any(|e| matches!(
            e,
            SyntaxError::Unterminated {
                construct: "parenthesis",
                ..
            }
        )));
    }

    #[test]
    fn test_unterminated_argument_list() {
        let result = parse("int x = f(1, ");
        assert!(result.errors.iter().any(|e| matches!(
            e,
            SyntaxError::Unterminated {
                construct: "parenthesis",
                ..
            }
        )));
    }
}
