//! Declaration grammar.
//!
//! External declarations cover the five top-level forms: function
//! definitions and prototypes, init-declarator lists, precision statements,
//! interface blocks, and bare qualifier declarations such as
//! `invariant gl_Position;`.
//!
//! The qualifier-prefix ambiguity is resolved with bounded lookahead, never
//! backtracking: after the qualifier list, a `;` means a bare qualifier
//! declaration, an identifier followed by `{` means an interface block, an
//! identifier followed by `,` means a qualified name list, and anything else
//! continues down the fully-specified-type path.

use crate::ast::*;
use crate::errors::SyntaxError;
use crate::lexer::TokenKind;
use crate::parse::Parser;
use crate::types::precision_qualifier_kind;

impl Parser {
    pub(crate) fn parse_external_declaration(
        &mut self,
    ) -> Result<ExternalDeclaration, SyntaxError> {
        self.parse_declaration_inner(true)
    }

    /// Declaration in statement position. Function bodies are rejected here;
    /// prototypes still parse.
    pub(crate) fn parse_declaration_statement(&mut self) -> Result<Declaration, SyntaxError> {
        match self.parse_declaration_inner(false)? {
            ExternalDeclaration::Declaration(decl) => Ok(decl),
            _ => Err(self.unexpected("a declaration")),
        }
    }

    fn parse_declaration_inner(
        &mut self,
        allow_body: bool,
    ) -> Result<ExternalDeclaration, SyntaxError> {
        let start = self.current_span().start;

        if self.at_keyword("precision") {
            return Ok(ExternalDeclaration::Declaration(
                self.parse_precision_declaration()?,
            ));
        }

        let qualifiers = self.parse_type_qualifier_list()?;

        if let Some(quals) = qualifiers {
            // `invariant;`
            if self.match_kind(&TokenKind::Semicolon) {
                return Ok(ExternalDeclaration::Declaration(Declaration::QualifierList {
                    qualifiers: quals,
                    names: Vec::new(),
                    span: self.span_from(start),
                }));
            }

            // a plain identifier after the qualifiers can still open an
            // interface block or a qualified name list
            if matches!(self.peek_kind(), TokenKind::Ident(_)) && !self.at_builtin_type() {
                match self.peek_ahead(1) {
                    Some(TokenKind::LBrace) => {
                        return Ok(ExternalDeclaration::Declaration(
                            self.parse_block_declaration(quals, start)?,
                        ));
                    }
                    Some(TokenKind::Comma) => {
                        return Ok(ExternalDeclaration::Declaration(
                            self.parse_qualified_names(quals, start)?,
                        ));
                    }
                    _ => {}
                }
            }

            return self.parse_typed_declaration(Some(quals), start, allow_body);
        }

        self.parse_typed_declaration(None, start, allow_body)
    }

    /// Everything after the (possibly absent) qualifier list: a type
    /// specifier, then either declarators or a function signature.
    fn parse_typed_declaration(
        &mut self,
        qualifiers: Option<TypeQualifierList>,
        start: usize,
        allow_body: bool,
    ) -> Result<ExternalDeclaration, SyntaxError> {
        let ty = self.parse_type_specifier()?;
        let full = FullySpecifiedType {
            qualifiers,
            ty,
            span: self.span_from(start),
        };

        // declarator-less form, e.g. `struct Light { vec3 dir; };`
        if self.match_kind(&TokenKind::Semicolon) {
            return Ok(ExternalDeclaration::Declaration(
                Declaration::InitDeclaratorList {
                    ty: full,
                    declarators: Vec::new(),
                    span: self.span_from(start),
                },
            ));
        }

        if matches!(self.peek_kind(), TokenKind::Ident(_))
            && matches!(self.peek_ahead(1), Some(TokenKind::LParen))
        {
            return self.parse_function(full, start, allow_body);
        }

        let declarators = self.parse_init_declarator_list()?;
        self.expect(&TokenKind::Semicolon, "';' after declaration")?;
        Ok(ExternalDeclaration::Declaration(
            Declaration::InitDeclaratorList {
                ty: full,
                declarators,
                span: self.span_from(start),
            },
        ))
    }

    fn parse_function(
        &mut self,
        return_type: FullySpecifiedType,
        start: usize,
        allow_body: bool,
    ) -> Result<ExternalDeclaration, SyntaxError> {
        let name = self.expect_identifier("a function name")?;
        let open_location = self.current_location();
        self.expect(&TokenKind::LParen, "'(' after function name")?;
        let parameters = self
            .parse_parameter_clause()
            .map_err(|err| self.unterminated_if_eof(err, "parenthesis", open_location))?;

        let prototype = FunctionPrototype {
            return_type,
            name,
            parameters,
            span: self.span_from(start),
        };

        if self.check(&TokenKind::LBrace) {
            if !allow_body {
                return Err(self.unexpected("';' after function prototype"));
            }
            let body = self.parse_compound_statement()?;
            return Ok(ExternalDeclaration::Function(FunctionDefinition {
                prototype,
                body,
                span: self.span_from(start),
            }));
        }

        self.expect(&TokenKind::Semicolon, "';' after function prototype")?;
        Ok(ExternalDeclaration::Declaration(
            Declaration::FunctionPrototype(prototype),
        ))
    }

    /// Parameters between the parentheses, through the closing `)`. `()`
    /// and `(void)` both produce an empty list.
    fn parse_parameter_clause(&mut self) -> Result<Vec<ParameterDeclaration>, SyntaxError> {
        let mut parameters = Vec::new();

        if self.at_keyword("void") && matches!(self.peek_ahead(1), Some(TokenKind::RParen)) {
            self.advance();
        } else if !self.check(&TokenKind::RParen) {
            parameters.push(self.parse_parameter()?);
            while self.match_kind(&TokenKind::Comma) {
                parameters.push(self.parse_parameter()?);
            }
        }

        self.expect(&TokenKind::RParen, "')' after parameter list")?;
        Ok(parameters)
    }

    fn parse_parameter(&mut self) -> Result<ParameterDeclaration, SyntaxError> {
        let start = self.current_span().start;
        let qualifiers = self.parse_type_qualifier_list()?;
        let ty = self.parse_type_specifier()?;
        let declarator = if matches!(self.peek_kind(), TokenKind::Ident(_)) {
            Some(self.parse_declarator()?)
        } else {
            None
        };
        Ok(ParameterDeclaration {
            qualifiers,
            ty,
            declarator,
            span: self.span_from(start),
        })
    }

    fn parse_init_declarator_list(&mut self) -> Result<Vec<InitDeclarator>, SyntaxError> {
        let mut declarators = vec![self.parse_init_declarator()?];
        while self.match_kind(&TokenKind::Comma) {
            declarators.push(self.parse_init_declarator()?);
        }
        Ok(declarators)
    }

    fn parse_init_declarator(&mut self) -> Result<InitDeclarator, SyntaxError> {
        let start = self.current_span().start;
        let declarator = self.parse_declarator()?;
        let initializer = if self.match_kind(&TokenKind::Eq) {
            Some(self.parse_initializer()?)
        } else {
            None
        };
        Ok(InitDeclarator {
            declarator,
            initializer,
            span: self.span_from(start),
        })
    }

    /// An assignment expression or a braced aggregate, recursively. The
    /// aggregate form allows a trailing comma.
    pub(crate) fn parse_initializer(&mut self) -> Result<Initializer, SyntaxError> {
        if !self.check(&TokenKind::LBrace) {
            return Ok(Initializer::Expression(self.parse_assignment_expression()?));
        }

        let start = self.current_span().start;
        let open_location = self.current_location();
        self.advance();

        let mut items = Vec::new();
        if !self.check(&TokenKind::RBrace) {
            loop {
                items.push(self.parse_initializer()?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
                if self.check(&TokenKind::RBrace) {
                    break;
                }
            }
        }

        if self.is_at_end() {
            return Err(SyntaxError::Unterminated {
                construct: "block",
                location: open_location,
            });
        }
        self.expect(&TokenKind::RBrace, "'}' to close the initializer list")?;
        Ok(Initializer::List {
            items,
            span: self.span_from(start),
        })
    }

    /// `precision highp float;`
    fn parse_precision_declaration(&mut self) -> Result<Declaration, SyntaxError> {
        let start = self.current_span().start;
        self.expect_keyword("precision")?;

        let precision = match self.ident_text().and_then(precision_qualifier_kind) {
            Some(kind) => {
                self.advance();
                kind
            }
            None => return Err(self.unexpected("a precision qualifier")),
        };

        let ty = self.parse_type_specifier()?;
        self.expect(&TokenKind::Semicolon, "';' after precision declaration")?;
        Ok(Declaration::Precision {
            precision,
            ty,
            span: self.span_from(start),
        })
    }

    /// `uniform Block { members } [instance[N]];`
    fn parse_block_declaration(
        &mut self,
        qualifiers: TypeQualifierList,
        start: usize,
    ) -> Result<Declaration, SyntaxError> {
        let name = self.expect_identifier("an interface block name")?;

        let open_location = self.current_location();
        self.expect(&TokenKind::LBrace, "'{' to open the interface block")?;
        let members = self.parse_struct_member_list(open_location)?;
        self.expect(&TokenKind::RBrace, "'}' to close the interface block")?;

        let instance = if matches!(self.peek_kind(), TokenKind::Ident(_)) {
            Some(self.parse_declarator()?)
        } else {
            None
        };
        self.expect(&TokenKind::Semicolon, "';' after interface block")?;

        Ok(Declaration::Block {
            qualifiers,
            name,
            members,
            instance,
            span: self.span_from(start),
        })
    }

    /// `flat in a, b;` — qualifiers applied to existing names.
    fn parse_qualified_names(
        &mut self,
        qualifiers: TypeQualifierList,
        start: usize,
    ) -> Result<Declaration, SyntaxError> {
        let mut names = vec![self.expect_identifier("an identifier")?];
        while self.match_kind(&TokenKind::Comma) {
            names.push(self.expect_identifier("an identifier")?);
        }
        self.expect(&TokenKind::Semicolon, "';' after qualifier declaration")?;
        Ok(Declaration::QualifierList {
            qualifiers,
            names,
            span: self.span_from(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn declarations(source: &str) -> Vec<ExternalDeclaration> {
        let result = parse(source);
        assert!(result.is_ok(), "errors: {:?}", result.errors);
        result.root.declarations
    }

    #[test]
    fn test_function_definition_and_prototype() {
        let decls = declarations("float square(float x);\nfloat square(float x) { return x * x; }");
        assert_eq!(decls.len(), 2);
        let ExternalDeclaration::Declaration(Declaration::FunctionPrototype(proto)) = &decls[0]
        else {
            panic!("expected prototype first");
        };
        assert_eq!(proto.name.name, "square");
        assert_eq!(proto.parameters.len(), 1);
        let ExternalDeclaration::Function(def) = &decls[1] else {
            panic!("expected function definition second");
        };
        assert_eq!(def.prototype.name.name, "square");
        assert_eq!(def.body.statements.len(), 1);
    }

    #[test]
    fn test_void_parameter_list_is_empty() {
        let decls = declarations("void main(void) {}\nvoid other() {}");
        for decl in &decls {
            let ExternalDeclaration::Function(def) = decl else {
                panic!("expected function definitions");
            };
            assert!(def.prototype.parameters.is_empty());
        }
    }

    #[test]
    fn test_parameter_qualifiers_and_unnamed_parameters() {
        let decls = declarations("void blend(in vec4 src, inout vec4 dst, float);");
        let ExternalDeclaration::Declaration(Declaration::FunctionPrototype(proto)) = &decls[0]
        else {
            panic!("expected prototype");
        };
        assert_eq!(proto.parameters.len(), 3);
        assert!(proto.parameters[0].qualifiers.is_some());
        assert!(proto.parameters[2].qualifiers.is_none());
        assert!(proto.parameters[2].declarator.is_none());
    }

    #[test]
    fn test_init_declarator_list_with_arrays() {
        let decls = declarations("int a[3], b = 1;");
        let ExternalDeclaration::Declaration(Declaration::InitDeclaratorList {
            declarators, ..
        }) = &decls[0]
        else {
            panic!("expected init declarator list");
        };
        assert_eq!(declarators.len(), 2);
        // the array suffix attaches to `a` only
        assert_eq!(declarators[0].declarator.arrays.len(), 1);
        assert!(declarators[0].initializer.is_none());
        assert!(declarators[1].declarator.arrays.is_empty());
        assert!(declarators[1].initializer.is_some());
    }

    #[test]
    fn test_aggregate_initializer_with_trailing_comma() {
        let decls = declarations("float weights[3] = { 0.2, 0.3, 0.5, };");
        let ExternalDeclaration::Declaration(Declaration::InitDeclaratorList {
            declarators, ..
        }) = &decls[0]
        else {
            panic!("expected init declarator list");
        };
        let Some(Initializer::List { items, .. }) = &declarators[0].initializer else {
            panic!("expected aggregate initializer");
        };
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_nested_aggregate_initializer() {
        let decls = declarations("mat2 m = { { 1.0, 0.0 }, { 0.0, 1.0 } };");
        let ExternalDeclaration::Declaration(Declaration::InitDeclaratorList {
            declarators, ..
        }) = &decls[0]
        else {
            panic!("expected init declarator list");
        };
        let Some(Initializer::List { items, .. }) = &declarators[0].initializer else {
            panic!("expected aggregate initializer");
        };
        assert_eq!(items.len(), 2);
        assert!(matches!(items[0], Initializer::List { .. }));
    }

    #[test]
    fn test_precision_declaration() {
        let decls = declarations("precision mediump float;");
        let ExternalDeclaration::Declaration(Declaration::Precision { precision, ty, .. }) =
            &decls[0]
        else {
            panic!("expected precision declaration");
        };
        assert_eq!(*precision, PrecisionQualifier::Medium);
        assert!(matches!(
            ty.base,
            TypeSpecifierNonArray::Primitive { name: "float", .. }
        ));
    }

    #[test]
    fn test_interface_block_with_instance() {
        let decls = declarations("uniform Matrices { mat4 mvp; mat4 model; } mats;");
        let ExternalDeclaration::Declaration(Declaration::Block {
            name,
            members,
            instance,
            ..
        }) = &decls[0]
        else {
            panic!("expected interface block");
        };
        assert_eq!(name.name, "Matrices");
        assert_eq!(members.len(), 2);
        assert_eq!(instance.as_ref().map(|d| d.name.name.as_str()), Some("mats"));
    }

    #[test]
    fn test_interface_block_without_instance() {
        let decls = declarations("buffer Data { float values[]; };");
        let ExternalDeclaration::Declaration(Declaration::Block { instance, .. }) = &decls[0]
        else {
            panic!("expected interface block");
        };
        assert!(instance.is_none());
    }

    #[test]
    fn test_bare_qualifier_declarations() {
        let decls = declarations("invariant;\nflat in a, b;");
        let ExternalDeclaration::Declaration(Declaration::QualifierList { names, .. }) = &decls[0]
        else {
            panic!("expected bare qualifier declaration");
        };
        assert!(names.is_empty());
        let ExternalDeclaration::Declaration(Declaration::QualifierList { names, .. }) = &decls[1]
        else {
            panic!("expected qualified name list");
        };
        let got: Vec<_> = names.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(got, ["a", "b"]);
    }

    #[test]
    fn test_unterminated_parameter_list() {
        let result = parse("void f(");
        assert_eq!(result.errors.len(), 1);
        let SyntaxError::Unterminated { construct, location } = &result.errors[0] else {
            panic!("expected an unterminated error, got {:?}", result.errors[0]);
        };
        assert_eq!(*construct, "parenthesis");
        assert_eq!(location.column, 7);
    }

    #[test]
    fn test_struct_declaration_without_declarators() {
        let decls = declarations("struct Light { vec3 dir; float power; };");
        let ExternalDeclaration::Declaration(Declaration::InitDeclaratorList {
            ty,
            declarators,
            ..
        }) = &decls[0]
        else {
            panic!("expected init declarator list");
        };
        assert!(declarators.is_empty());
        assert!(matches!(ty.ty.base, TypeSpecifierNonArray::Struct(_)));
    }
}
