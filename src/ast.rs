// Syntax tree definitions for the GLSL parser

use serde::Serialize;
use std::fmt;

/// Half-open byte range into the original source buffer.
///
/// Every node and token carries one; a parent's span always contains the
/// spans of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// 1-based line/column position, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Source text that does not participate in the grammar: comments,
/// preprocessor lines, and whitespace. Retained out-of-band so that
/// formatting-preserving tools can reconstruct the input byte-for-byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TriviaKind {
    LineComment,
    BlockComment,
    Preprocessor,
    Whitespace,
}

/// An identifier with its span. Also used for field names, user type names,
/// layout ids, and interface block names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

/// A numeric literal. The raw lexeme is preserved verbatim (no eager value
/// conversion) so the source round-trips exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberLiteral {
    pub raw: String,
    pub kind: NumberKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NumberKind {
    /// Leading nonzero digit, e.g. `42` or `42u`.
    Decimal { unsigned: bool },
    /// Leading zero, e.g. `0755` (also plain `0`).
    Octal { unsigned: bool },
    /// `0x`/`0X` prefix, e.g. `0xFF`.
    Hex { unsigned: bool },
    /// Digit-dot forms (`1.5`, `5.`, `.5`) with optional exponent and suffix.
    Float {
        exponent: bool,
        suffix: Option<FloatSuffix>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FloatSuffix {
    F,
    Lf,
}

// ===== Expressions =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        };
        write!(f, "{}", text)
    }
}

/// `++` or `--`, prefix or postfix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Fixity {
    Prefix,
    Postfix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignmentOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    ShlAssign,
    ShrAssign,
    AndAssign,
    XorAssign,
    OrAssign,
}

impl fmt::Display for AssignmentOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AssignmentOp::Assign => "=",
            AssignmentOp::AddAssign => "+=",
            AssignmentOp::SubAssign => "-=",
            AssignmentOp::MulAssign => "*=",
            AssignmentOp::DivAssign => "/=",
            AssignmentOp::ModAssign => "%=",
            AssignmentOp::ShlAssign => "<<=",
            AssignmentOp::ShrAssign => ">>=",
            AssignmentOp::AndAssign => "&=",
            AssignmentOp::XorAssign => "^=",
            AssignmentOp::OrAssign => "|=",
        };
        write!(f, "{}", text)
    }
}

/// The callee of a call expression: either a type specifier (constructor
/// style, `vec3(...)` / `float[3](...)`) or an arbitrary expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Callee {
    Type(TypeSpecifier),
    Expression(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expression {
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        span: Span,
    },
    Update {
        op: UpdateOp,
        fixity: Fixity,
        operand: Box<Expression>,
        span: Span,
    },
    Parenthesized {
        inner: Box<Expression>,
        span: Span,
    },
    Subscript {
        array: Box<Expression>,
        index: Box<Expression>,
        span: Span,
    },
    Field {
        argument: Box<Expression>,
        field: Identifier,
        span: Span,
    },
    Call {
        function: Callee,
        /// The parsed argument expressions. Empty when the argument list is
        /// the literal keyword `void` (see `void_arguments`).
        arguments: Vec<Expression>,
        void_arguments: bool,
        span: Span,
    },
    /// At least two operands, by construction.
    Comma {
        operands: Vec<Expression>,
        span: Span,
    },
    Assignment {
        op: AssignmentOp,
        left: Box<Expression>,
        right: Box<Expression>,
        span: Span,
    },
    Conditional {
        condition: Box<Expression>,
        consequence: Box<Expression>,
        alternative: Box<Expression>,
        span: Span,
    },
    Identifier(Identifier),
    Number(NumberLiteral),
    Boolean {
        value: bool,
        span: Span,
    },
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Binary { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Update { span, .. }
            | Expression::Parenthesized { span, .. }
            | Expression::Subscript { span, .. }
            | Expression::Field { span, .. }
            | Expression::Call { span, .. }
            | Expression::Comma { span, .. }
            | Expression::Assignment { span, .. }
            | Expression::Conditional { span, .. }
            | Expression::Boolean { span, .. } => *span,
            Expression::Identifier(id) => id.span,
            Expression::Number(n) => n.span,
        }
    }
}

// ===== Types and qualifiers =====

/// Optional qualifier list followed by a mandatory base type specifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullySpecifiedType {
    pub qualifiers: Option<TypeQualifierList>,
    pub ty: TypeSpecifier,
    pub span: Span,
}

/// Non-array base type plus zero or more array-specifier suffixes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSpecifier {
    pub base: TypeSpecifierNonArray,
    pub arrays: Vec<ArraySpecifier>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeSpecifierNonArray {
    /// One of the builtin type names (`float`, `vec3`, `sampler2D`, ...).
    /// The tag is the canonical spelling from the static vocabulary.
    Primitive { name: &'static str, span: Span },
    /// An inline or forward struct.
    Struct(StructSpecifier),
    /// An identifier referring to a user-defined type.
    Named(Identifier),
}

impl TypeSpecifierNonArray {
    pub fn span(&self) -> Span {
        match self {
            TypeSpecifierNonArray::Primitive { span, .. } => *span,
            TypeSpecifierNonArray::Struct(s) => s.span,
            TypeSpecifierNonArray::Named(id) => id.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructSpecifier {
    pub name: Option<Identifier>,
    pub members: Vec<StructMember>,
    pub span: Span,
}

/// One member declaration inside a struct or interface block body:
/// optional qualifiers, a type, and one or more declarators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructMember {
    pub qualifiers: Option<TypeQualifierList>,
    pub ty: TypeSpecifier,
    pub declarators: Vec<Declarator>,
    pub span: Span,
}

/// `[]` or `[constant-expr]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ArraySpecifier {
    Unsized { span: Span },
    Sized { size: Expression, span: Span },
}

impl ArraySpecifier {
    pub fn span(&self) -> Span {
        match self {
            ArraySpecifier::Unsized { span } | ArraySpecifier::Sized { span, .. } => *span,
        }
    }
}

/// Ordered qualifier sequence; source order is preserved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeQualifierList {
    pub qualifiers: Vec<TypeQualifier>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeQualifier {
    Storage {
        kind: StorageQualifier,
        /// Type names of the `subroutine(A, B)` form; empty otherwise.
        subroutine_types: Vec<Identifier>,
        span: Span,
    },
    Layout {
        ids: Vec<LayoutQualifierId>,
        span: Span,
    },
    Precision {
        kind: PrecisionQualifier,
        span: Span,
    },
    Interpolation {
        kind: InterpolationQualifier,
        span: Span,
    },
    Invariant {
        span: Span,
    },
    Precise {
        span: Span,
    },
}

impl TypeQualifier {
    pub fn span(&self) -> Span {
        match self {
            TypeQualifier::Storage { span, .. }
            | TypeQualifier::Layout { span, .. }
            | TypeQualifier::Precision { span, .. }
            | TypeQualifier::Interpolation { span, .. }
            | TypeQualifier::Invariant { span }
            | TypeQualifier::Precise { span } => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StorageQualifier {
    Const,
    In,
    Out,
    InOut,
    Centroid,
    Patch,
    Sample,
    Uniform,
    Buffer,
    Shared,
    Coherent,
    Volatile,
    Restrict,
    ReadOnly,
    WriteOnly,
    Subroutine,
    Varying,
    Attribute,
}

/// One entry of a `layout(...)` list: `ident`, `ident = constant-expr`, or
/// the bare keyword `shared`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LayoutQualifierId {
    Id {
        name: Identifier,
        value: Option<Expression>,
        span: Span,
    },
    Shared {
        span: Span,
    },
}

impl LayoutQualifierId {
    pub fn span(&self) -> Span {
        match self {
            LayoutQualifierId::Id { span, .. } | LayoutQualifierId::Shared { span } => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrecisionQualifier {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InterpolationQualifier {
    Smooth,
    Flat,
    NoPerspective,
}

// ===== Declarations =====

/// The root node: ordered external declarations covering the whole buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationUnit {
    pub declarations: Vec<ExternalDeclaration>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExternalDeclaration {
    Function(FunctionDefinition),
    Declaration(Declaration),
    /// An unparsable region, recorded during recovery. Never produced by a
    /// zero-error parse.
    Error { span: Span },
}

impl ExternalDeclaration {
    pub fn span(&self) -> Span {
        match self {
            ExternalDeclaration::Function(f) => f.span,
            ExternalDeclaration::Declaration(d) => d.span(),
            ExternalDeclaration::Error { span } => *span,
        }
    }
}

/// A function prototype plus a compound-statement body. A prototype without
/// a body is a [`Declaration::FunctionPrototype`] instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDefinition {
    pub prototype: FunctionPrototype,
    pub body: CompoundStatement,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionPrototype {
    pub return_type: FullySpecifiedType,
    pub name: Identifier,
    pub parameters: Vec<ParameterDeclaration>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDeclaration {
    pub qualifiers: Option<TypeQualifierList>,
    pub ty: TypeSpecifier,
    pub declarator: Option<Declarator>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Declaration {
    /// `float f(float x);`
    FunctionPrototype(FunctionPrototype),
    /// `const int a = 1, b[2];` — also a bare `vec3;` with no declarators.
    InitDeclaratorList {
        ty: FullySpecifiedType,
        declarators: Vec<InitDeclarator>,
        span: Span,
    },
    /// `precision highp float;`
    Precision {
        precision: PrecisionQualifier,
        ty: TypeSpecifier,
        span: Span,
    },
    /// `uniform Block { ... } instance;`
    Block {
        qualifiers: TypeQualifierList,
        name: Identifier,
        members: Vec<StructMember>,
        instance: Option<Declarator>,
        span: Span,
    },
    /// `invariant;` or qualifier-list-plus-identifiers forms like
    /// `flat in a, b;` — no type specifier involved.
    QualifierList {
        qualifiers: TypeQualifierList,
        names: Vec<Identifier>,
        span: Span,
    },
}

impl Declaration {
    pub fn span(&self) -> Span {
        match self {
            Declaration::FunctionPrototype(p) => p.span,
            Declaration::InitDeclaratorList { span, .. }
            | Declaration::Precision { span, .. }
            | Declaration::Block { span, .. }
            | Declaration::QualifierList { span, .. } => *span,
        }
    }
}

/// One name in an init-declarator list, with its per-declarator array
/// suffixes and optional initializer. In `int a[3], b;` only `a` carries the
/// array specifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitDeclarator {
    pub declarator: Declarator,
    pub initializer: Option<Initializer>,
    pub span: Span,
}

/// A declared name plus optional array suffixes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declarator {
    pub name: Identifier,
    pub arrays: Vec<ArraySpecifier>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Initializer {
    Expression(Expression),
    /// `{ init, init [,] }` aggregate form.
    List { items: Vec<Initializer>, span: Span },
}

impl Initializer {
    pub fn span(&self) -> Span {
        match self {
            Initializer::Expression(e) => e.span(),
            Initializer::List { span, .. } => *span,
        }
    }
}

// ===== Statements =====

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompoundStatement {
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// `while`/`for` condition: a plain expression or a local declaration with
/// a mandatory initializer (`while (bool done = step()) ...`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Condition {
    Expression(Expression),
    Declaration {
        ty: FullySpecifiedType,
        name: Identifier,
        initializer: Initializer,
        span: Span,
    },
}

impl Condition {
    pub fn span(&self) -> Span {
        match self {
            Condition::Expression(e) => e.span(),
            Condition::Declaration { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Compound(CompoundStatement),
    Declaration(Declaration),
    Expression {
        expression: Option<Expression>,
        span: Span,
    },
    If {
        condition: Expression,
        consequence: Box<Statement>,
        alternative: Option<Box<Statement>>,
        span: Span,
    },
    Switch {
        condition: Expression,
        body: Vec<Statement>,
        span: Span,
    },
    /// `case expr:` or `default:`; a label statement inside a switch body,
    /// not a scope of its own (fallthrough is lexical).
    CaseLabel {
        value: Option<Expression>,
        span: Span,
    },
    While {
        condition: Condition,
        body: Box<Statement>,
        span: Span,
    },
    DoWhile {
        body: Box<Statement>,
        condition: Expression,
        span: Span,
    },
    For {
        initializer: Box<Statement>,
        condition: Option<Condition>,
        update: Option<Expression>,
        body: Box<Statement>,
        span: Span,
    },
    Continue {
        span: Span,
    },
    Break {
        span: Span,
    },
    Return {
        value: Option<Expression>,
        span: Span,
    },
    Discard {
        span: Span,
    },
    /// An unparsable region, recorded during recovery.
    Error {
        span: Span,
    },
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Compound(c) => c.span,
            Statement::Declaration(d) => d.span(),
            Statement::Expression { span, .. }
            | Statement::If { span, .. }
            | Statement::Switch { span, .. }
            | Statement::CaseLabel { span, .. }
            | Statement::While { span, .. }
            | Statement::DoWhile { span, .. }
            | Statement::For { span, .. }
            | Statement::Continue { span }
            | Statement::Break { span }
            | Statement::Return { span, .. }
            | Statement::Discard { span }
            | Statement::Error { span } => *span,
        }
    }
}

// ===== Reflection surface =====

/// Discriminant for every node shape in the tree, used by generic tooling
/// that walks trees without matching on the typed enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    TranslationUnit,
    FunctionDefinition,
    FunctionPrototype,
    ParameterDeclaration,
    PrototypeDeclaration,
    InitDeclaratorList,
    PrecisionDeclaration,
    BlockDeclaration,
    QualifierDeclaration,
    InitDeclarator,
    Declarator,
    ArraySpecifier,
    InitializerList,
    FullySpecifiedType,
    TypeSpecifier,
    StructSpecifier,
    StructMember,
    TypeQualifierList,
    StorageQualifier,
    LayoutQualifier,
    PrecisionQualifier,
    InterpolationQualifier,
    InvariantQualifier,
    PreciseQualifier,
    LayoutQualifierId,
    CompoundStatement,
    DeclarationStatement,
    ExpressionStatement,
    IfStatement,
    SwitchStatement,
    CaseLabel,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    ContinueStatement,
    BreakStatement,
    ReturnStatement,
    DiscardStatement,
    Condition,
    BinaryExpression,
    UnaryExpression,
    UpdateExpression,
    ParenthesizedExpression,
    SubscriptExpression,
    FieldExpression,
    CallExpression,
    CommaExpression,
    AssignmentExpression,
    ConditionalExpression,
    Identifier,
    NumberLiteral,
    BooleanLiteral,
    Error,
}

/// Borrowed view over any tree node: uniform access to kind, span, and
/// named children in source order.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    TranslationUnit(&'a TranslationUnit),
    FunctionDefinition(&'a FunctionDefinition),
    FunctionPrototype(&'a FunctionPrototype),
    ParameterDeclaration(&'a ParameterDeclaration),
    Declaration(&'a Declaration),
    InitDeclarator(&'a InitDeclarator),
    Declarator(&'a Declarator),
    ArraySpecifier(&'a ArraySpecifier),
    Initializer(&'a Initializer),
    FullySpecifiedType(&'a FullySpecifiedType),
    TypeSpecifier(&'a TypeSpecifier),
    StructSpecifier(&'a StructSpecifier),
    StructMember(&'a StructMember),
    TypeQualifierList(&'a TypeQualifierList),
    TypeQualifier(&'a TypeQualifier),
    LayoutQualifierId(&'a LayoutQualifierId),
    CompoundStatement(&'a CompoundStatement),
    Statement(&'a Statement),
    Condition(&'a Condition),
    Expression(&'a Expression),
    Identifier(&'a Identifier),
    NumberLiteral(&'a NumberLiteral),
    /// A recovered-over region; carries only its span.
    Error(Span),
}

impl<'a> NodeRef<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::TranslationUnit(_) => NodeKind::TranslationUnit,
            NodeRef::FunctionDefinition(_) => NodeKind::FunctionDefinition,
            NodeRef::FunctionPrototype(_) => NodeKind::FunctionPrototype,
            NodeRef::ParameterDeclaration(_) => NodeKind::ParameterDeclaration,
            NodeRef::Declaration(d) => match d {
                Declaration::FunctionPrototype(_) => NodeKind::PrototypeDeclaration,
                Declaration::InitDeclaratorList { .. } => NodeKind::InitDeclaratorList,
                Declaration::Precision { .. } => NodeKind::PrecisionDeclaration,
                Declaration::Block { .. } => NodeKind::BlockDeclaration,
                Declaration::QualifierList { .. } => NodeKind::QualifierDeclaration,
            },
            NodeRef::InitDeclarator(_) => NodeKind::InitDeclarator,
            NodeRef::Declarator(_) => NodeKind::Declarator,
            NodeRef::ArraySpecifier(_) => NodeKind::ArraySpecifier,
            NodeRef::Initializer(i) => match i {
                Initializer::Expression(e) => NodeRef::Expression(e).kind(),
                Initializer::List { .. } => NodeKind::InitializerList,
            },
            NodeRef::FullySpecifiedType(_) => NodeKind::FullySpecifiedType,
            NodeRef::TypeSpecifier(_) => NodeKind::TypeSpecifier,
            NodeRef::StructSpecifier(_) => NodeKind::StructSpecifier,
            NodeRef::StructMember(_) => NodeKind::StructMember,
            NodeRef::TypeQualifierList(_) => NodeKind::TypeQualifierList,
            NodeRef::TypeQualifier(q) => match q {
                TypeQualifier::Storage { .. } => NodeKind::StorageQualifier,
                TypeQualifier::Layout { .. } => NodeKind::LayoutQualifier,
                TypeQualifier::Precision { .. } => NodeKind::PrecisionQualifier,
                TypeQualifier::Interpolation { .. } => NodeKind::InterpolationQualifier,
                TypeQualifier::Invariant { .. } => NodeKind::InvariantQualifier,
                TypeQualifier::Precise { .. } => NodeKind::PreciseQualifier,
            },
            NodeRef::LayoutQualifierId(_) => NodeKind::LayoutQualifierId,
            NodeRef::CompoundStatement(_) => NodeKind::CompoundStatement,
            NodeRef::Statement(s) => match s {
                Statement::Compound(_) => NodeKind::CompoundStatement,
                Statement::Declaration(_) => NodeKind::DeclarationStatement,
                Statement::Expression { .. } => NodeKind::ExpressionStatement,
                Statement::If { .. } => NodeKind::IfStatement,
                Statement::Switch { .. } => NodeKind::SwitchStatement,
                Statement::CaseLabel { .. } => NodeKind::CaseLabel,
                Statement::While { .. } => NodeKind::WhileStatement,
                Statement::DoWhile { .. } => NodeKind::DoWhileStatement,
                Statement::For { .. } => NodeKind::ForStatement,
                Statement::Continue { .. } => NodeKind::ContinueStatement,
                Statement::Break { .. } => NodeKind::BreakStatement,
                Statement::Return { .. } => NodeKind::ReturnStatement,
                Statement::Discard { .. } => NodeKind::DiscardStatement,
                Statement::Error { .. } => NodeKind::Error,
            },
            NodeRef::Condition(_) => NodeKind::Condition,
            NodeRef::Expression(e) => match e {
                Expression::Binary { .. } => NodeKind::BinaryExpression,
                Expression::Unary { .. } => NodeKind::UnaryExpression,
                Expression::Update { .. } => NodeKind::UpdateExpression,
                Expression::Parenthesized { .. } => NodeKind::ParenthesizedExpression,
                Expression::Subscript { .. } => NodeKind::SubscriptExpression,
                Expression::Field { .. } => NodeKind::FieldExpression,
                Expression::Call { .. } => NodeKind::CallExpression,
                Expression::Comma { .. } => NodeKind::CommaExpression,
                Expression::Assignment { .. } => NodeKind::AssignmentExpression,
                Expression::Conditional { .. } => NodeKind::ConditionalExpression,
                Expression::Identifier(_) => NodeKind::Identifier,
                Expression::Number(_) => NodeKind::NumberLiteral,
                Expression::Boolean { .. } => NodeKind::BooleanLiteral,
            },
            NodeRef::Identifier(_) => NodeKind::Identifier,
            NodeRef::NumberLiteral(_) => NodeKind::NumberLiteral,
            NodeRef::Error(_) => NodeKind::Error,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            NodeRef::TranslationUnit(n) => n.span,
            NodeRef::FunctionDefinition(n) => n.span,
            NodeRef::FunctionPrototype(n) => n.span,
            NodeRef::ParameterDeclaration(n) => n.span,
            NodeRef::Declaration(n) => n.span(),
            NodeRef::InitDeclarator(n) => n.span,
            NodeRef::Declarator(n) => n.span,
            NodeRef::ArraySpecifier(n) => n.span(),
            NodeRef::Initializer(n) => n.span(),
            NodeRef::FullySpecifiedType(n) => n.span,
            NodeRef::TypeSpecifier(n) => n.span,
            NodeRef::StructSpecifier(n) => n.span,
            NodeRef::StructMember(n) => n.span,
            NodeRef::TypeQualifierList(n) => n.span,
            NodeRef::TypeQualifier(n) => n.span(),
            NodeRef::LayoutQualifierId(n) => n.span(),
            NodeRef::CompoundStatement(n) => n.span,
            NodeRef::Statement(n) => n.span(),
            NodeRef::Condition(n) => n.span(),
            NodeRef::Expression(n) => n.span(),
            NodeRef::Identifier(n) => n.span,
            NodeRef::NumberLiteral(n) => n.span,
            NodeRef::Error(span) => *span,
        }
    }

    /// Named children in source order. Repeated grammar positions repeat
    /// the same field name.
    pub fn fields(&self) -> Vec<(&'static str, NodeRef<'a>)> {
        let mut out: Vec<(&'static str, NodeRef<'a>)> = Vec::new();
        match self {
            NodeRef::TranslationUnit(n) => {
                for decl in &n.declarations {
                    match decl {
                        ExternalDeclaration::Function(f) => {
                            out.push(("declaration", NodeRef::FunctionDefinition(f)))
                        }
                        ExternalDeclaration::Declaration(d) => {
                            out.push(("declaration", NodeRef::Declaration(d)))
                        }
                        ExternalDeclaration::Error { span } => {
                            out.push(("declaration", NodeRef::Error(*span)))
                        }
                    }
                }
            }
            NodeRef::FunctionDefinition(n) => {
                out.push(("declarator", NodeRef::FunctionPrototype(&n.prototype)));
                out.push(("body", NodeRef::CompoundStatement(&n.body)));
            }
            NodeRef::FunctionPrototype(n) => {
                out.push(("type", NodeRef::FullySpecifiedType(&n.return_type)));
                out.push(("name", NodeRef::Identifier(&n.name)));
                for p in &n.parameters {
                    out.push(("parameter", NodeRef::ParameterDeclaration(p)));
                }
            }
            NodeRef::ParameterDeclaration(n) => {
                if let Some(q) = &n.qualifiers {
                    out.push(("qualifiers", NodeRef::TypeQualifierList(q)));
                }
                out.push(("type", NodeRef::TypeSpecifier(&n.ty)));
                if let Some(d) = &n.declarator {
                    out.push(("declarator", NodeRef::Declarator(d)));
                }
            }
            NodeRef::Declaration(n) => match n {
                Declaration::FunctionPrototype(p) => {
                    out.push(("declarator", NodeRef::FunctionPrototype(p)));
                }
                Declaration::InitDeclaratorList {
                    ty, declarators, ..
                } => {
                    out.push(("type", NodeRef::FullySpecifiedType(ty)));
                    for d in declarators {
                        out.push(("declarator", NodeRef::InitDeclarator(d)));
                    }
                }
                Declaration::Precision { ty, .. } => {
                    out.push(("type", NodeRef::TypeSpecifier(ty)));
                }
                Declaration::Block {
                    qualifiers,
                    name,
                    members,
                    instance,
                    ..
                } => {
                    out.push(("qualifiers", NodeRef::TypeQualifierList(qualifiers)));
                    out.push(("declarator", NodeRef::Identifier(name)));
                    for m in members {
                        out.push(("body", NodeRef::StructMember(m)));
                    }
                    if let Some(inst) = instance {
                        out.push(("declarator", NodeRef::Declarator(inst)));
                    }
                }
                Declaration::QualifierList {
                    qualifiers, names, ..
                } => {
                    out.push(("qualifiers", NodeRef::TypeQualifierList(qualifiers)));
                    for id in names {
                        out.push(("declarator", NodeRef::Identifier(id)));
                    }
                }
            },
            NodeRef::InitDeclarator(n) => {
                out.push(("declarator", NodeRef::Declarator(&n.declarator)));
                if let Some(init) = &n.initializer {
                    out.push(("value", NodeRef::Initializer(init)));
                }
            }
            NodeRef::Declarator(n) => {
                out.push(("name", NodeRef::Identifier(&n.name)));
                for a in &n.arrays {
                    out.push(("array", NodeRef::ArraySpecifier(a)));
                }
            }
            NodeRef::ArraySpecifier(n) => {
                if let ArraySpecifier::Sized { size, .. } = n {
                    out.push(("size", NodeRef::Expression(size)));
                }
            }
            NodeRef::Initializer(n) => match n {
                Initializer::Expression(e) => return NodeRef::Expression(e).fields(),
                Initializer::List { items, .. } => {
                    for item in items {
                        out.push(("item", NodeRef::Initializer(item)));
                    }
                }
            },
            NodeRef::FullySpecifiedType(n) => {
                if let Some(q) = &n.qualifiers {
                    out.push(("qualifiers", NodeRef::TypeQualifierList(q)));
                }
                out.push(("type", NodeRef::TypeSpecifier(&n.ty)));
            }
            NodeRef::TypeSpecifier(n) => {
                match &n.base {
                    TypeSpecifierNonArray::Primitive { .. } => {}
                    TypeSpecifierNonArray::Struct(s) => {
                        out.push(("type", NodeRef::StructSpecifier(s)))
                    }
                    TypeSpecifierNonArray::Named(id) => out.push(("type", NodeRef::Identifier(id))),
                }
                for a in &n.arrays {
                    out.push(("array", NodeRef::ArraySpecifier(a)));
                }
            }
            NodeRef::StructSpecifier(n) => {
                if let Some(name) = &n.name {
                    out.push(("declarator", NodeRef::Identifier(name)));
                }
                for m in &n.members {
                    out.push(("body", NodeRef::StructMember(m)));
                }
            }
            NodeRef::StructMember(n) => {
                if let Some(q) = &n.qualifiers {
                    out.push(("qualifiers", NodeRef::TypeQualifierList(q)));
                }
                out.push(("type", NodeRef::TypeSpecifier(&n.ty)));
                for d in &n.declarators {
                    out.push(("declarator", NodeRef::Declarator(d)));
                }
            }
            NodeRef::TypeQualifierList(n) => {
                for q in &n.qualifiers {
                    out.push(("qualifier", NodeRef::TypeQualifier(q)));
                }
            }
            NodeRef::TypeQualifier(n) => match n {
                TypeQualifier::Storage {
                    subroutine_types, ..
                } => {
                    for id in subroutine_types {
                        out.push(("type", NodeRef::Identifier(id)));
                    }
                }
                TypeQualifier::Layout { ids, .. } => {
                    for id in ids {
                        out.push(("id", NodeRef::LayoutQualifierId(id)));
                    }
                }
                _ => {}
            },
            NodeRef::LayoutQualifierId(n) => {
                if let LayoutQualifierId::Id { name, value, .. } = n {
                    out.push(("declarator", NodeRef::Identifier(name)));
                    if let Some(v) = value {
                        out.push(("value", NodeRef::Expression(v)));
                    }
                }
            }
            NodeRef::CompoundStatement(n) => {
                for s in &n.statements {
                    out.push(("statement", NodeRef::Statement(s)));
                }
            }
            NodeRef::Statement(n) => match n {
                Statement::Compound(c) => return NodeRef::CompoundStatement(c).fields(),
                Statement::Declaration(d) => {
                    out.push(("declaration", NodeRef::Declaration(d)));
                }
                Statement::Expression { expression, .. } => {
                    if let Some(e) = expression {
                        out.push(("expression", NodeRef::Expression(e)));
                    }
                }
                Statement::If {
                    condition,
                    consequence,
                    alternative,
                    ..
                } => {
                    out.push(("condition", NodeRef::Expression(condition)));
                    out.push(("consequence", NodeRef::Statement(consequence)));
                    if let Some(alt) = alternative {
                        out.push(("alternative", NodeRef::Statement(alt)));
                    }
                }
                Statement::Switch {
                    condition, body, ..
                } => {
                    out.push(("condition", NodeRef::Expression(condition)));
                    for s in body {
                        out.push(("body", NodeRef::Statement(s)));
                    }
                }
                Statement::CaseLabel { value, .. } => {
                    if let Some(v) = value {
                        out.push(("value", NodeRef::Expression(v)));
                    }
                }
                Statement::While {
                    condition, body, ..
                } => {
                    out.push(("condition", NodeRef::Condition(condition)));
                    out.push(("body", NodeRef::Statement(body)));
                }
                Statement::DoWhile {
                    body, condition, ..
                } => {
                    out.push(("body", NodeRef::Statement(body)));
                    out.push(("condition", NodeRef::Expression(condition)));
                }
                Statement::For {
                    initializer,
                    condition,
                    update,
                    body,
                    ..
                } => {
                    out.push(("initializer", NodeRef::Statement(initializer)));
                    if let Some(c) = condition {
                        out.push(("condition", NodeRef::Condition(c)));
                    }
                    if let Some(u) = update {
                        out.push(("update", NodeRef::Expression(u)));
                    }
                    out.push(("body", NodeRef::Statement(body)));
                }
                Statement::Return { value, .. } => {
                    if let Some(v) = value {
                        out.push(("value", NodeRef::Expression(v)));
                    }
                }
                Statement::Continue { .. }
                | Statement::Break { .. }
                | Statement::Discard { .. }
                | Statement::Error { .. } => {}
            },
            NodeRef::Condition(n) => match n {
                Condition::Expression(e) => {
                    out.push(("condition", NodeRef::Expression(e)));
                }
                Condition::Declaration {
                    ty,
                    name,
                    initializer,
                    ..
                } => {
                    out.push(("type", NodeRef::FullySpecifiedType(ty)));
                    out.push(("declarator", NodeRef::Identifier(name)));
                    out.push(("value", NodeRef::Initializer(initializer)));
                }
            },
            NodeRef::Expression(n) => match n {
                Expression::Binary { left, right, .. } => {
                    out.push(("left", NodeRef::Expression(left)));
                    out.push(("right", NodeRef::Expression(right)));
                }
                Expression::Unary { operand, .. } | Expression::Update { operand, .. } => {
                    out.push(("operand", NodeRef::Expression(operand)));
                }
                Expression::Parenthesized { inner, .. } => {
                    out.push(("expression", NodeRef::Expression(inner)));
                }
                Expression::Subscript { array, index, .. } => {
                    out.push(("array", NodeRef::Expression(array)));
                    out.push(("index", NodeRef::Expression(index)));
                }
                Expression::Field {
                    argument, field, ..
                } => {
                    out.push(("argument", NodeRef::Expression(argument)));
                    out.push(("field", NodeRef::Identifier(field)));
                }
                Expression::Call {
                    function,
                    arguments,
                    ..
                } => {
                    match function {
                        Callee::Type(t) => out.push(("function", NodeRef::TypeSpecifier(t))),
                        Callee::Expression(e) => out.push(("function", NodeRef::Expression(e))),
                    }
                    for a in arguments {
                        out.push(("argument", NodeRef::Expression(a)));
                    }
                }
                Expression::Comma { operands, .. } => {
                    for op in operands {
                        out.push(("operand", NodeRef::Expression(op)));
                    }
                }
                Expression::Assignment { left, right, .. } => {
                    out.push(("left", NodeRef::Expression(left)));
                    out.push(("right", NodeRef::Expression(right)));
                }
                Expression::Conditional {
                    condition,
                    consequence,
                    alternative,
                    ..
                } => {
                    out.push(("condition", NodeRef::Expression(condition)));
                    out.push(("consequence", NodeRef::Expression(consequence)));
                    out.push(("alternative", NodeRef::Expression(alternative)));
                }
                Expression::Identifier(_)
                | Expression::Number(_)
                | Expression::Boolean { .. } => {}
            },
            NodeRef::Identifier(_) | NodeRef::NumberLiteral(_) | NodeRef::Error(_) => {}
        }
        out
    }

    /// Children in source order, without field names.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        self.fields().into_iter().map(|(_, n)| n).collect()
    }
}

impl TranslationUnit {
    /// Uniform view over the root, for generic traversal.
    pub fn as_node(&self) -> NodeRef<'_> {
        NodeRef::TranslationUnit(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_containment() {
        let outer = Span::new(0, 10);
        let inner = Span::new(3, 7);
        assert!(outer.contains(inner));
        assert!(!inner.contains(outer));
        assert_eq!(outer.to(inner), outer);
    }

    #[test]
    fn node_ref_fields_in_source_order() {
        let cond = Expression::Identifier(Identifier {
            name: "x".to_string(),
            span: Span::new(4, 5),
        });
        let stmt = Statement::If {
            condition: cond,
            consequence: Box::new(Statement::Discard {
                span: Span::new(7, 15),
            }),
            alternative: None,
            span: Span::new(0, 15),
        };
        let node = NodeRef::Statement(&stmt);
        assert_eq!(node.kind(), NodeKind::IfStatement);
        let fields = node.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].0, "condition");
        assert_eq!(fields[1].0, "consequence");
        let spans: Vec<usize> = node.children().iter().map(|c| c.span().start).collect();
        let mut sorted = spans.clone();
        sorted.sort_unstable();
        assert_eq!(spans, sorted);
    }
}
