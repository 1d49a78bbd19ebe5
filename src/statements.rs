//! Statement grammar.
//!
//! Statements dispatch on the text of a leading identifier (`if`, `for`,
//! `return`, ...) since the lexer has no keyword tokens. The statement-vs-
//! expression ambiguity (`vec2(x)` is a constructor call, `vec2 v` a
//! declaration, `MyType[2] arr` a declaration again) is settled by a small
//! bounded lookahead over the token stream.
//!
//! Compound statements recover from errors locally: a failed statement is
//! reported, the cursor resynchronizes at the next `;` or the balancing `}`,
//! and an explicit [`Statement::Error`] node marks the skipped region.

use crate::ast::*;
use crate::errors::SyntaxError;
use crate::lexer::TokenKind;
use crate::parse::Parser;
use crate::types::primitive_type_name;

impl Parser {
    /// `{ statement* }` with per-statement error recovery.
    pub(crate) fn parse_compound_statement(&mut self) -> Result<CompoundStatement, SyntaxError> {
        let start = self.current_span().start;
        let open_location = self.current_location();
        self.expect(&TokenKind::LBrace, "'{' to open a block")?;

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.is_at_end() {
                return Err(SyntaxError::Unterminated {
                    construct: "block",
                    location: open_location,
                });
            }
            if let TokenKind::Error(_) = self.peek().kind {
                // already reported by the lexer
                self.advance();
                continue;
            }

            let stmt_start = self.peek().span.start;
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    let end = self.resynchronize(true);
                    statements.push(Statement::Error {
                        span: Span::new(stmt_start, end.max(stmt_start)),
                    });
                }
            }
        }

        self.expect(&TokenKind::RBrace, "'}' to close the block")?;
        Ok(CompoundStatement {
            statements,
            span: self.span_from(start),
        })
    }

    pub(crate) fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        if self.check(&TokenKind::LBrace) {
            return Ok(Statement::Compound(self.parse_compound_statement()?));
        }

        match self.ident_text() {
            Some("if") => return self.parse_if_statement(),
            Some("switch") => return self.parse_switch_statement(),
            Some("case") | Some("default") => return self.parse_case_label(),
            Some("while") => return self.parse_while_statement(),
            Some("do") => return self.parse_do_statement(),
            Some("for") => return self.parse_for_statement(),
            Some("return") => return self.parse_return_statement(),
            Some(kw @ ("continue" | "break" | "discard")) => {
                let kw = kw.to_string();
                return self.parse_jump(&kw);
            }
            _ => {}
        }

        if self.at_declaration_start() {
            return Ok(Statement::Declaration(self.parse_declaration_statement()?));
        }

        self.parse_expression_statement()
    }

    /// Does the current token open a local declaration rather than an
    /// expression? Constructor calls are the tricky case: a type name
    /// followed by `(` — directly or across an array specifier — is an
    /// expression.
    fn at_declaration_start(&self) -> bool {
        if self.at_keyword("precision") || self.at_keyword("struct") || self.at_type_qualifier() {
            return true;
        }

        let Some(text) = self.ident_text() else {
            return false;
        };

        if primitive_type_name(text).is_some() {
            return match self.peek_ahead(1) {
                Some(TokenKind::LParen) => false,
                Some(TokenKind::LBracket) => !self.brackets_lead_to_call(1),
                _ => true,
            };
        }

        // a user-defined type name only reveals itself by what follows it
        match self.peek_ahead(1) {
            Some(TokenKind::Ident(_)) => true,
            Some(TokenKind::LBracket) => self.brackets_lead_to_ident(1),
            _ => false,
        }
    }

    /// From a `[` at lookahead offset `from`, skip balanced brackets and
    /// report whether a `(` follows (an array constructor).
    fn brackets_lead_to_call(&self, from: usize) -> bool {
        matches!(self.after_balanced_brackets(from), Some(TokenKind::LParen))
    }

    /// As above, but checks for a declarator name (`MyType[2] arr;`).
    fn brackets_lead_to_ident(&self, from: usize) -> bool {
        matches!(self.after_balanced_brackets(from), Some(TokenKind::Ident(_)))
    }

    fn after_balanced_brackets(&self, mut offset: usize) -> Option<&TokenKind> {
        let mut depth = 0usize;
        loop {
            match self.peek_ahead(offset)? {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return self.peek_ahead(offset + 1);
                    }
                }
                TokenKind::Eof => return None,
                _ => {}
            }
            offset += 1;
        }
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.current_span().start;
        let expression = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::Semicolon, "';' after expression")?;
        Ok(Statement::Expression {
            expression,
            span: self.span_from(start),
        })
    }

    /// Dangling `else` binds to the nearest `if`.
    fn parse_if_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.current_span().start;
        self.expect_keyword("if")?;
        self.expect(&TokenKind::LParen, "'(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "')' after condition")?;

        let consequence = Box::new(self.parse_statement()?);
        let alternative = if self.eat_keyword("else") {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            consequence,
            alternative,
            span: self.span_from(start),
        })
    }

    /// The switch body is a flat statement list; `case`/`default` labels are
    /// statements of their own and fallthrough is lexical.
    fn parse_switch_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.current_span().start;
        self.expect_keyword("switch")?;
        self.expect(&TokenKind::LParen, "'(' after 'switch'")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "')' after switch condition")?;

        let body = self.parse_compound_statement()?.statements;
        Ok(Statement::Switch {
            condition,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_case_label(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.current_span().start;
        let value = if self.eat_keyword("case") {
            Some(self.parse_constant_expression()?)
        } else {
            self.expect_keyword("default")?;
            None
        };
        self.expect(&TokenKind::Colon, "':' after case label")?;
        Ok(Statement::CaseLabel {
            value,
            span: self.span_from(start),
        })
    }

    fn parse_while_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.current_span().start;
        self.expect_keyword("while")?;
        self.expect(&TokenKind::LParen, "'(' after 'while'")?;
        let condition = self.parse_condition()?;
        self.expect(&TokenKind::RParen, "')' after condition")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::While {
            condition,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_do_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.current_span().start;
        self.expect_keyword("do")?;
        let body = Box::new(self.parse_statement()?);
        self.expect_keyword("while")?;
        self.expect(&TokenKind::LParen, "'(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "')' after condition")?;
        self.expect(&TokenKind::Semicolon, "';' after do-while")?;
        Ok(Statement::DoWhile {
            body,
            condition,
            span: self.span_from(start),
        })
    }

    fn parse_for_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.current_span().start;
        self.expect_keyword("for")?;
        self.expect(&TokenKind::LParen, "'(' after 'for'")?;

        // the initializer is a full statement and consumes its own ';'
        let initializer = if self.at_declaration_start() {
            Statement::Declaration(self.parse_declaration_statement()?)
        } else {
            self.parse_expression_statement()?
        };

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_condition()?)
        };
        self.expect(&TokenKind::Semicolon, "';' after loop condition")?;

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::RParen, "')' after for clauses")?;

        let body = Box::new(self.parse_statement()?);
        Ok(Statement::For {
            initializer: Box::new(initializer),
            condition,
            update,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_return_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.current_span().start;
        self.expect_keyword("return")?;
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::Semicolon, "';' after return")?;
        Ok(Statement::Return {
            value,
            span: self.span_from(start),
        })
    }

    /// `continue;` / `break;` / `discard;`; the keyword is still at the
    /// cursor when this is called.
    fn parse_jump(&mut self, keyword: &str) -> Result<Statement, SyntaxError> {
        let start = self.current_span().start;
        self.advance();
        self.expect(&TokenKind::Semicolon, "';' after jump statement")?;
        let span = self.span_from(start);
        Ok(match keyword {
            "continue" => Statement::Continue { span },
            "break" => Statement::Break { span },
            _ => Statement::Discard { span },
        })
    }

    /// Loop condition: a plain expression, or a single-declarator
    /// declaration with a mandatory initializer.
    fn parse_condition(&mut self) -> Result<Condition, SyntaxError> {
        if !self.at_condition_declaration() {
            return Ok(Condition::Expression(self.parse_expression()?));
        }

        let start = self.current_span().start;
        let ty = self.parse_fully_specified_type()?;
        let name = self.expect_identifier("a condition variable name")?;
        self.expect(&TokenKind::Eq, "'=' in condition declaration")?;
        let initializer = self.parse_initializer()?;
        Ok(Condition::Declaration {
            ty,
            name,
            initializer,
            span: self.span_from(start),
        })
    }

    fn at_condition_declaration(&self) -> bool {
        if self.at_type_qualifier() {
            return true;
        }
        match self.ident_text() {
            Some(text) if primitive_type_name(text).is_some() => {
                !matches!(self.peek_ahead(1), Some(TokenKind::LParen))
            }
            Some(_) => matches!(self.peek_ahead(1), Some(TokenKind::Ident(_))),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn body(source: &str) -> Vec<Statement> {
        let wrapped = format!("void main() {{ {} }}", source);
        let result = parse(&wrapped);
        assert!(result.is_ok(), "errors: {:?}", result.errors);
        let ExternalDeclaration::Function(f) = &result.root.declarations[0] else {
            panic!("expected a function definition");
        };
        f.body.statements.clone()
    }

    #[test]
    fn test_dangling_else_binds_to_nearest_if() {
        let stmts = body("if (a) if (b) x = 1; else x = 2;");
        assert_eq!(stmts.len(), 1);
        let Statement::If {
            consequence,
            alternative,
            ..
        } = &stmts[0]
        else {
            panic!("expected if");
        };
        assert!(alternative.is_none());
        let Statement::If { alternative, .. } = consequence.as_ref() else {
            panic!("expected nested if");
        };
        assert!(alternative.is_some());
    }

    #[test]
    fn test_constructor_call_is_not_a_declaration() {
        let stmts = body("vec2(1.0, 2.0); vec2 v;");
        assert!(matches!(stmts[0], Statement::Expression { .. }));
        assert!(matches!(stmts[1], Statement::Declaration(_)));
    }

    #[test]
    fn test_array_constructor_vs_array_declaration() {
        let stmts = body("float[2](1.0, 2.0); float[2] arr;");
        assert!(matches!(stmts[0], Statement::Expression { .. }));
        assert!(matches!(stmts[1], Statement::Declaration(_)));
    }

    #[test]
    fn test_user_type_declaration_needs_trailing_identifier() {
        let stmts = body("MyType m; m[0] = 1;");
        assert!(matches!(stmts[0], Statement::Declaration(_)));
        assert!(matches!(stmts[1], Statement::Expression { .. }));
    }

    #[test]
    fn test_switch_body_is_flat() {
        let stmts = body("switch (x) { case 0: y = 1; break; default: y = 2; }");
        let Statement::Switch { body, .. } = &stmts[0] else {
            panic!("expected switch");
        };
        assert_eq!(body.len(), 5);
        assert!(matches!(
            body[0],
            Statement::CaseLabel { value: Some(_), .. }
        ));
        assert!(matches!(body[2], Statement::Break { .. }));
        assert!(matches!(body[3], Statement::CaseLabel { value: None, .. }));
    }

    #[test]
    fn test_while_condition_declaration() {
        let stmts = body("while (bool done = step()) iterate();");
        let Statement::While { condition, .. } = &stmts[0] else {
            panic!("expected while");
        };
        let Condition::Declaration { name, .. } = condition else {
            panic!("expected condition declaration");
        };
        assert_eq!(name.name, "done");
    }

    #[test]
    fn test_for_condition_declaration() {
        let stmts = body("for (int i = 0; bool more = step(); ++i) advance();");
        let Statement::For { condition, .. } = &stmts[0] else {
            panic!("expected for");
        };
        let Some(Condition::Declaration { name, .. }) = condition else {
            panic!("expected condition declaration");
        };
        assert_eq!(name.name, "more");
    }

    #[test]
    fn test_for_loop_clauses() {
        let stmts = body("for (int i = 0; i < 10; ++i) total += i;");
        let Statement::For {
            initializer,
            condition,
            update,
            ..
        } = &stmts[0]
        else {
            panic!("expected for");
        };
        assert!(matches!(initializer.as_ref(), Statement::Declaration(_)));
        assert!(matches!(condition, Some(Condition::Expression(_))));
        assert!(matches!(update, Some(Expression::Update { .. })));
    }

    #[test]
    fn test_for_loop_empty_clauses() {
        let stmts = body("for (;;) break;");
        let Statement::For {
            initializer,
            condition,
            update,
            ..
        } = &stmts[0]
        else {
            panic!("expected for");
        };
        assert!(matches!(
            initializer.as_ref(),
            Statement::Expression {
                expression: None,
                ..
            }
        ));
        assert!(condition.is_none());
        assert!(update.is_none());
    }

    #[test]
    fn test_do_while() {
        let stmts = body("do { x--; } while (x > 0);");
        let Statement::DoWhile { body, .. } = &stmts[0] else {
            panic!("expected do-while");
        };
        assert!(matches!(body.as_ref(), Statement::Compound(_)));
    }

    #[test]
    fn test_jump_statements() {
        let stmts = body("continue; break; discard; return; return x;");
        assert!(matches!(stmts[0], Statement::Continue { .. }));
        assert!(matches!(stmts[1], Statement::Break { .. }));
        assert!(matches!(stmts[2], Statement::Discard { .. }));
        assert!(matches!(stmts[3], Statement::Return { value: None, .. }));
        assert!(matches!(stmts[4], Statement::Return { value: Some(_), .. }));
    }

    #[test]
    fn test_empty_statement() {
        let stmts = body(";");
        assert!(matches!(
            stmts[0],
            Statement::Expression {
                expression: None,
                ..
            }
        ));
    }

    #[test]
    fn test_statement_recovery_inside_block() {
        let source = "void main() { x = ; y = 2; }";
        let result = parse(source);
        assert_eq!(result.errors.len(), 1);
        let ExternalDeclaration::Function(f) = &result.root.declarations[0] else {
            panic!("expected a function definition");
        };
        assert!(matches!(f.body.statements[0], Statement::Error { .. }));
        assert!(matches!(f.body.statements[1], Statement::Expression { .. }));
    }

    #[test]
    fn test_local_struct_declaration() {
        let stmts = body("struct P { float x; } p; p.x = 1.0;");
        assert!(matches!(stmts[0], Statement::Declaration(_)));
        assert!(matches!(stmts[1], Statement::Expression { .. }));
    }
}
