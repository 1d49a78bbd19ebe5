//! Type and qualifier grammar.
//!
//! Parses type-qualifier lists (storage, layout, precision, interpolation,
//! `invariant`, `precise`), type specifiers with their array suffixes,
//! struct bodies, and fully specified types.
//!
//! The builtin type vocabulary is a static set consulted only here, never a
//! reserved-word list: an identifier that is not in the set simply parses as
//! a user-defined type name.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::ast::*;
use crate::errors::SyntaxError;
use crate::lexer::TokenKind;
use crate::parse::Parser;
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

/// The builtin type names: scalars, vectors, matrices (all NxM shapes),
/// the sampler/image vocabulary, and `atomic_uint`. One superset across
/// GLSL versions; no version gating.
static PRIMITIVE_TYPES: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "void", "float", "double", "int", "uint", "bool",
        "vec2", "vec3", "vec4",
        "dvec2", "dvec3", "dvec4",
        "bvec2", "bvec3", "bvec4",
        "ivec2", "ivec3", "ivec4",
        "uvec2", "uvec3", "uvec4",
        "mat2", "mat3", "mat4",
        "mat2x2", "mat2x3", "mat2x4",
        "mat3x2", "mat3x3", "mat3x4",
        "mat4x2", "mat4x3", "mat4x4",
        "dmat2", "dmat3", "dmat4",
        "dmat2x2", "dmat2x3", "dmat2x4",
        "dmat3x2", "dmat3x3", "dmat3x4",
        "dmat4x2", "dmat4x3", "dmat4x4",
        "atomic_uint",
        "sampler1D", "sampler2D", "sampler3D", "samplerCube",
        "sampler1DShadow", "sampler2DShadow", "samplerCubeShadow",
        "sampler1DArray", "sampler2DArray",
        "sampler1DArrayShadow", "sampler2DArrayShadow",
        "samplerCubeArray", "samplerCubeArrayShadow",
        "isampler1D", "isampler2D", "isampler3D", "isamplerCube",
        "isampler1DArray", "isampler2DArray", "isamplerCubeArray",
        "usampler1D", "usampler2D", "usampler3D", "usamplerCube",
        "usampler1DArray", "usampler2DArray", "usamplerCubeArray",
        "sampler2DRect", "sampler2DRectShadow", "isampler2DRect", "usampler2DRect",
        "samplerBuffer", "isamplerBuffer", "usamplerBuffer",
        "sampler2DMS", "isampler2DMS", "usampler2DMS",
        "sampler2DMSArray", "isampler2DMSArray", "usampler2DMSArray",
        "image1D", "iimage1D", "uimage1D",
        "image2D", "iimage2D", "uimage2D",
        "image3D", "iimage3D", "uimage3D",
        "image2DRect", "iimage2DRect", "uimage2DRect",
        "imageCube", "iimageCube", "uimageCube",
        "imageBuffer", "iimageBuffer", "uimageBuffer",
        "image1DArray", "iimage1DArray", "uimage1DArray",
        "image2DArray", "iimage2DArray", "uimage2DArray",
        "imageCubeArray", "iimageCubeArray", "uimageCubeArray",
        "image2DMS", "iimage2DMS", "uimage2DMS",
        "image2DMSArray", "iimage2DMSArray", "uimage2DMSArray",
    ]
    .into_iter()
    .collect()
});

/// Every identifier that can begin a type qualifier.
static QUALIFIER_STARTS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "const", "in", "out", "inout", "centroid", "patch", "sample", "uniform", "buffer",
        "shared", "coherent", "volatile", "restrict", "readonly", "writeonly", "subroutine",
        "varying", "attribute", "layout", "highp", "mediump", "lowp", "smooth", "flat",
        "noperspective", "invariant", "precise",
    ]
    .into_iter()
    .collect()
});

/// Canonical tag for a builtin type name, or `None` for user identifiers.
pub(crate) fn primitive_type_name(text: &str) -> Option<&'static str> {
    PRIMITIVE_TYPES.get(text).copied()
}

/// Can `text` begin a type qualifier?
pub(crate) fn qualifier_start_text(text: &str) -> bool {
    QUALIFIER_STARTS.contains(text)
}

fn storage_qualifier_kind(text: &str) -> Option<StorageQualifier> {
    let kind = match text {
        "const" => StorageQualifier::Const,
        "in" => StorageQualifier::In,
        "out" => StorageQualifier::Out,
        "inout" => StorageQualifier::InOut,
        "centroid" => StorageQualifier::Centroid,
        "patch" => StorageQualifier::Patch,
        "sample" => StorageQualifier::Sample,
        "uniform" => StorageQualifier::Uniform,
        "buffer" => StorageQualifier::Buffer,
        "shared" => StorageQualifier::Shared,
        "coherent" => StorageQualifier::Coherent,
        "volatile" => StorageQualifier::Volatile,
        "restrict" => StorageQualifier::Restrict,
        "readonly" => StorageQualifier::ReadOnly,
        "writeonly" => StorageQualifier::WriteOnly,
        "subroutine" => StorageQualifier::Subroutine,
        "varying" => StorageQualifier::Varying,
        "attribute" => StorageQualifier::Attribute,
        _ => return None,
    };
    Some(kind)
}

pub(crate) fn precision_qualifier_kind(text: &str) -> Option<PrecisionQualifier> {
    match text {
        "highp" => Some(PrecisionQualifier::High),
        "mediump" => Some(PrecisionQualifier::Medium),
        "lowp" => Some(PrecisionQualifier::Low),
        _ => None,
    }
}

fn interpolation_qualifier_kind(text: &str) -> Option<InterpolationQualifier> {
    match text {
        "smooth" => Some(InterpolationQualifier::Smooth),
        "flat" => Some(InterpolationQualifier::Flat),
        "noperspective" => Some(InterpolationQualifier::NoPerspective),
        _ => None,
    }
}

impl Parser {
    /// Does the current token begin a type qualifier?
    pub(crate) fn at_type_qualifier(&self) -> bool {
        matches!(self.ident_text(), Some(text) if QUALIFIER_STARTS.contains(text))
    }

    /// Does the current token begin a type specifier, ignoring user-defined
    /// type names (those are contextual and resolved by the caller)?
    pub(crate) fn at_builtin_type(&self) -> bool {
        match self.ident_text() {
            Some("struct") => true,
            Some(text) => primitive_type_name(text).is_some(),
            None => false,
        }
    }

    /// Flat ordered qualifier list; `None` when no qualifier is present.
    pub(crate) fn parse_type_qualifier_list(
        &mut self,
    ) -> Result<Option<TypeQualifierList>, SyntaxError> {
        if !self.at_type_qualifier() {
            return Ok(None);
        }

        let start = self.current_span().start;
        let mut qualifiers = Vec::new();
        while self.at_type_qualifier() {
            qualifiers.push(self.parse_type_qualifier()?);
        }

        Ok(Some(TypeQualifierList {
            qualifiers,
            span: self.span_from(start),
        }))
    }

    fn parse_type_qualifier(&mut self) -> Result<TypeQualifier, SyntaxError> {
        let start = self.current_span().start;
        let text = match self.ident_text() {
            Some(t) => t.to_string(),
            None => return Err(self.unexpected("a type qualifier")),
        };

        if text == "layout" {
            return self.parse_layout_qualifier();
        }

        self.advance();

        if let Some(kind) = precision_qualifier_kind(&text) {
            return Ok(TypeQualifier::Precision {
                kind,
                span: self.span_from(start),
            });
        }
        if let Some(kind) = interpolation_qualifier_kind(&text) {
            return Ok(TypeQualifier::Interpolation {
                kind,
                span: self.span_from(start),
            });
        }
        if text == "invariant" {
            return Ok(TypeQualifier::Invariant {
                span: self.span_from(start),
            });
        }
        if text == "precise" {
            return Ok(TypeQualifier::Precise {
                span: self.span_from(start),
            });
        }

        let kind = storage_qualifier_kind(&text)
            .ok_or_else(|| self.unexpected("a type qualifier"))?;

        // subroutine(TypeA, TypeB) names the subroutine types
        let mut subroutine_types = Vec::new();
        if kind == StorageQualifier::Subroutine && self.match_kind(&TokenKind::LParen) {
            loop {
                subroutine_types.push(self.expect_identifier("a subroutine type name")?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen, "')' after subroutine type list")?;
        }

        Ok(TypeQualifier::Storage {
            kind,
            subroutine_types,
            span: self.span_from(start),
        })
    }

    /// `layout(id [= const-expr], ...)`; bare `shared` is a valid layout id.
    fn parse_layout_qualifier(&mut self) -> Result<TypeQualifier, SyntaxError> {
        let start = self.current_span().start;
        self.expect_keyword("layout")?;
        self.expect(&TokenKind::LParen, "'(' after 'layout'")?;

        let mut ids = Vec::new();
        loop {
            let id_start = self.current_span().start;
            if self.at_keyword("shared") && !matches!(self.peek_ahead(1), Some(TokenKind::Eq)) {
                self.advance();
                ids.push(LayoutQualifierId::Shared {
                    span: self.span_from(id_start),
                });
            } else {
                let name = self.expect_identifier("a layout qualifier id")?;
                let value = if self.match_kind(&TokenKind::Eq) {
                    Some(self.parse_constant_expression()?)
                } else {
                    None
                };
                ids.push(LayoutQualifierId::Id {
                    name,
                    value,
                    span: self.span_from(id_start),
                });
            }

            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(&TokenKind::RParen, "')' after layout qualifier list")?;
        Ok(TypeQualifier::Layout {
            ids,
            span: self.span_from(start),
        })
    }

    /// Optional qualifier list followed by a mandatory type specifier.
    pub(crate) fn parse_fully_specified_type(&mut self) -> Result<FullySpecifiedType, SyntaxError> {
        let start = self.current_span().start;
        let qualifiers = self.parse_type_qualifier_list()?;
        let ty = self.parse_type_specifier()?;
        Ok(FullySpecifiedType {
            qualifiers,
            ty,
            span: self.span_from(start),
        })
    }

    /// Non-array base type plus zero or more array-specifier suffixes.
    pub(crate) fn parse_type_specifier(&mut self) -> Result<TypeSpecifier, SyntaxError> {
        let start = self.current_span().start;

        let base = if self.at_keyword("struct") {
            TypeSpecifierNonArray::Struct(self.parse_struct_specifier()?)
        } else {
            match self.ident_text() {
                Some(text) => {
                    if let Some(name) = primitive_type_name(text) {
                        let span = self.current_span();
                        self.advance();
                        TypeSpecifierNonArray::Primitive { name, span }
                    } else {
                        TypeSpecifierNonArray::Named(self.expect_identifier("a type name")?)
                    }
                }
                None => return Err(self.unexpected("a type specifier")),
            }
        };

        let arrays = self.parse_array_specifiers()?;
        Ok(TypeSpecifier {
            base,
            arrays,
            span: self.span_from(start),
        })
    }

    /// `struct [Name] { member-list }`.
    fn parse_struct_specifier(&mut self) -> Result<StructSpecifier, SyntaxError> {
        let start = self.current_span().start;
        self.expect_keyword("struct")?;

        let name = match self.peek_kind() {
            TokenKind::Ident(_) => Some(self.expect_identifier("a struct name")?),
            _ => None,
        };

        let open_location = self.current_location();
        self.expect(&TokenKind::LBrace, "'{' to open the struct body")?;
        let members = self.parse_struct_member_list(open_location)?;
        self.expect(&TokenKind::RBrace, "'}' to close the struct body")?;

        Ok(StructSpecifier {
            name,
            members,
            span: self.span_from(start),
        })
    }

    /// Member declarations up to (not including) the closing `}`. Shared by
    /// struct specifiers and interface blocks. `open_location` is where the
    /// `{` was, for unterminated-construct reporting.
    pub(crate) fn parse_struct_member_list(
        &mut self,
        open_location: SourceLocation,
    ) -> Result<Vec<StructMember>, SyntaxError> {
        let mut members = Vec::new();

        while !self.check(&TokenKind::RBrace) {
            if self.is_at_end() {
                return Err(SyntaxError::Unterminated {
                    construct: "block",
                    location: open_location,
                });
            }

            let start = self.current_span().start;
            let qualifiers = self.parse_type_qualifier_list()?;
            let ty = self.parse_type_specifier()?;

            let mut declarators = vec![self.parse_declarator()?];
            while self.match_kind(&TokenKind::Comma) {
                declarators.push(self.parse_declarator()?);
            }
            self.expect(&TokenKind::Semicolon, "';' after struct member")?;

            members.push(StructMember {
                qualifiers,
                ty,
                declarators,
                span: self.span_from(start),
            });
        }

        Ok(members)
    }

    /// A declared name plus optional array suffixes (`data[4][2]`).
    pub(crate) fn parse_declarator(&mut self) -> Result<Declarator, SyntaxError> {
        let start = self.current_span().start;
        let name = self.expect_identifier("a declarator name")?;
        let arrays = self.parse_array_specifiers()?;
        Ok(Declarator {
            name,
            arrays,
            span: self.span_from(start),
        })
    }

    /// Zero or more `[]` / `[constant-expr]` suffixes.
    pub(crate) fn parse_array_specifiers(&mut self) -> Result<Vec<ArraySpecifier>, SyntaxError> {
        let mut arrays = Vec::new();

        while self.check(&TokenKind::LBracket) {
            let start = self.current_span().start;
            self.advance();

            if self.match_kind(&TokenKind::RBracket) {
                arrays.push(ArraySpecifier::Unsized {
                    span: self.span_from(start),
                });
            } else {
                let size = self.parse_constant_expression()?;
                self.expect(&TokenKind::RBracket, "']' after array size")?;
                arrays.push(ArraySpecifier::Sized {
                    size,
                    span: self.span_from(start),
                });
            }
        }

        Ok(arrays)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn first_declaration(source: &str) -> Declaration {
        let result = parse(source);
        assert!(result.is_ok(), "errors: {:?}", result.errors);
        match &result.root.declarations[0] {
            ExternalDeclaration::Declaration(d) => d.clone(),
            other => panic!("expected a declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_layout_qualifier() {
        let decl = first_declaration("layout(location = 0, std140) uniform vec4 u;");
        let Declaration::InitDeclaratorList { ty, .. } = decl else {
            panic!("expected init declarator list");
        };
        let qualifiers = ty.qualifiers.expect("expected qualifiers").qualifiers;
        assert_eq!(qualifiers.len(), 2);
        let TypeQualifier::Layout { ids, .. } = &qualifiers[0] else {
            panic!("expected layout qualifier first");
        };
        assert_eq!(ids.len(), 2);
        match &ids[0] {
            LayoutQualifierId::Id { name, value, .. } => {
                assert_eq!(name.name, "location");
                assert!(value.is_some());
            }
            other => panic!("expected id=value, got {:?}", other),
        }
        match &ids[1] {
            LayoutQualifierId::Id { name, value, .. } => {
                assert_eq!(name.name, "std140");
                assert!(value.is_none());
            }
            other => panic!("expected bare id, got {:?}", other),
        }
        assert!(matches!(
            qualifiers[1],
            TypeQualifier::Storage {
                kind: StorageQualifier::Uniform,
                ..
            }
        ));
    }

    #[test]
    fn test_layout_shared_id() {
        let decl = first_declaration("layout(shared) buffer B { float data[]; };");
        let Declaration::Block { qualifiers, .. } = decl else {
            panic!("expected block declaration");
        };
        let TypeQualifier::Layout { ids, .. } = &qualifiers.qualifiers[0] else {
            panic!("expected layout qualifier");
        };
        assert!(matches!(ids[0], LayoutQualifierId::Shared { .. }));
    }

    #[test]
    fn test_subroutine_type_list() {
        let decl = first_declaration("subroutine(Shade, Light) uniform shadeFn fn;");
        let Declaration::InitDeclaratorList { ty, .. } = decl else {
            panic!("expected init declarator list");
        };
        let qualifiers = ty.qualifiers.expect("expected qualifiers").qualifiers;
        let TypeQualifier::Storage {
            kind,
            subroutine_types,
            ..
        } = &qualifiers[0]
        else {
            panic!("expected storage qualifier");
        };
        assert_eq!(*kind, StorageQualifier::Subroutine);
        let names: Vec<_> = subroutine_types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Shade", "Light"]);
    }

    #[test]
    fn test_primitive_vocabulary_is_not_reserved() {
        // a name outside the vocabulary parses as a user-defined type
        let decl = first_declaration("MyMaterial m;");
        let Declaration::InitDeclaratorList { ty, .. } = decl else {
            panic!("expected init declarator list");
        };
        assert!(matches!(
            ty.ty.base,
            TypeSpecifierNonArray::Named(ref id) if id.name == "MyMaterial"
        ));
    }

    #[test]
    fn test_nested_anonymous_struct() {
        let decl = first_declaration("struct Outer { struct { float x; } inner; } o;");
        let Declaration::InitDeclaratorList { ty, .. } = decl else {
            panic!("expected init declarator list");
        };
        let TypeSpecifierNonArray::Struct(outer) = &ty.ty.base else {
            panic!("expected struct specifier");
        };
        assert_eq!(outer.name.as_ref().map(|n| n.name.as_str()), Some("Outer"));
        assert_eq!(outer.members.len(), 1);
        let TypeSpecifierNonArray::Struct(inner) = &outer.members[0].ty.base else {
            panic!("expected nested struct member type");
        };
        assert!(inner.name.is_none());
        assert_eq!(inner.members.len(), 1);
    }

    #[test]
    fn test_array_specifier_on_type_and_declarator() {
        let decl = first_declaration("float[2] grid[3];");
        let Declaration::InitDeclaratorList {
            ty, declarators, ..
        } = decl
        else {
            panic!("expected init declarator list");
        };
        assert_eq!(ty.ty.arrays.len(), 1);
        assert_eq!(declarators.len(), 1);
        assert_eq!(declarators[0].declarator.arrays.len(), 1);
        assert!(matches!(
            declarators[0].declarator.arrays[0],
            ArraySpecifier::Sized { .. }
        ));
    }
}
