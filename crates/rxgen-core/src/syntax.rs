//! A small C# syntax tree.
//!
//! Covers exactly the declarations the generator emits. Type syntax is
//! carried as already-formatted strings (see [`crate::naming`]); structure
//! above the type level is kept as nodes so generated code can be
//! inspected before it is rendered.

/// A generated source file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompilationUnit {
    /// Leading single-line comments, without the `//` prefix.
    pub leading_comments: Vec<String>,
    /// Emit `#nullable enable` after the comments.
    pub nullable_enable: bool,
    /// Namespace declarations, in order.
    pub namespaces: Vec<NamespaceDecl>,
    /// Types in the global namespace, rendered after the namespaces.
    pub global_types: Vec<ClassDecl>,
}

impl CompilationUnit {
    /// Create an empty unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leading comment line.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.leading_comments.push(comment.into());
        self
    }

    /// Set the nullable directive.
    pub fn with_nullable_enable(mut self, enabled: bool) -> Self {
        self.nullable_enable = enabled;
        self
    }

    /// Add a class to `namespace`, or to the global namespace when empty.
    /// Classes for the same namespace are grouped into one declaration.
    pub fn add_class(&mut self, namespace: &str, class: ClassDecl) {
        if namespace.is_empty() {
            self.global_types.push(class);
            return;
        }
        match self.namespaces.iter_mut().find(|n| n.name == namespace) {
            Some(existing) => existing.types.push(class),
            None => self.namespaces.push(NamespaceDecl {
                name: namespace.to_string(),
                types: vec![class],
            }),
        }
    }

    /// Every class in the unit, in render order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.namespaces
            .iter()
            .flat_map(|n| n.types.iter())
            .chain(self.global_types.iter())
    }
}

/// `namespace Name { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// Dotted namespace name.
    pub name: String,
    /// Declared types.
    pub types: Vec<ClassDecl>,
}

/// Declaration modifiers, rendered in the order given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Public,
    Internal,
    Private,
    New,
    Static,
    Sealed,
    Readonly,
    Partial,
}

impl Modifier {
    /// C# keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Internal => "internal",
            Modifier::Private => "private",
            Modifier::New => "new",
            Modifier::Static => "static",
            Modifier::Sealed => "sealed",
            Modifier::Readonly => "readonly",
            Modifier::Partial => "partial",
        }
    }
}

/// An XML documentation comment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocComment {
    /// `<summary>` content. May contain XML such as `<see cref="..."/>`.
    pub summary: String,
    /// `<param>` entries as (name, text).
    pub params: Vec<(String, String)>,
}

impl DocComment {
    /// A summary-only comment.
    pub fn summary(text: impl Into<String>) -> Self {
        Self {
            summary: text.into(),
            params: Vec::new(),
        }
    }

    /// Document a parameter.
    pub fn with_param(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.params.push((name.into(), text.into()));
        self
    }
}

/// An attribute application, `[Name(args)]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSyntax {
    /// Attribute type name as written.
    pub name: String,
    /// Arguments. Named arguments are [`Expr::Assign`].
    pub arguments: Vec<Expr>,
}

impl AttributeSyntax {
    /// Create an attribute without arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    /// Append an argument.
    pub fn with_argument(mut self, argument: Expr) -> Self {
        self.arguments.push(argument);
        self
    }
}

/// `where T : class, new()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintClause {
    /// Constrained parameter name.
    pub parameter: String,
    /// Constraints as written, in order.
    pub constraints: Vec<String>,
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub doc: Option<DocComment>,
    pub attributes: Vec<AttributeSyntax>,
    pub modifiers: Vec<Modifier>,
    pub name: String,
    pub type_parameters: Vec<String>,
    /// Base class as written.
    pub base: Option<String>,
    pub constraints: Vec<ConstraintClause>,
    pub members: Vec<MemberDecl>,
}

impl ClassDecl {
    /// Create an empty class.
    pub fn new(name: impl Into<String>, modifiers: Vec<Modifier>) -> Self {
        Self {
            doc: None,
            attributes: Vec::new(),
            modifiers,
            name: name.into(),
            type_parameters: Vec::new(),
            base: None,
            constraints: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Whether the class carries a modifier.
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Properties declared on the class.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyDecl> {
        self.members.iter().filter_map(|m| match m {
            MemberDecl::Property(p) => Some(p),
            _ => None,
        })
    }

    /// Fields declared on the class.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter_map(|m| match m {
            MemberDecl::Field(f) => Some(f),
            _ => None,
        })
    }

    /// Constructors declared on the class.
    pub fn constructors(&self) -> impl Iterator<Item = &ConstructorDecl> {
        self.members.iter().filter_map(|m| match m {
            MemberDecl::Constructor(c) => Some(c),
            _ => None,
        })
    }

    /// Methods declared on the class.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            MemberDecl::Method(m) => Some(m),
            _ => None,
        })
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyDecl> {
        self.properties().find(|p| p.name == name)
    }
}

/// A class member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberDecl {
    Field(FieldDecl),
    Constructor(ConstructorDecl),
    Property(PropertyDecl),
    Method(MethodDecl),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub modifiers: Vec<Modifier>,
    pub ty: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDecl {
    pub doc: Option<DocComment>,
    pub modifiers: Vec<Modifier>,
    pub name: String,
    pub parameters: Vec<ParameterSyntax>,
    /// `: base(args)` initializer.
    pub base_arguments: Option<Vec<Expr>>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub doc: Option<DocComment>,
    pub attributes: Vec<AttributeSyntax>,
    pub modifiers: Vec<Modifier>,
    pub ty: String,
    pub name: String,
    pub body: PropertyBody,
}

impl PropertyDecl {
    /// Whether the property carries a modifier.
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// Property accessor shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyBody {
    /// `=> expr;`
    Expression(Expr),
    /// `{ get; }`
    GetOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub doc: Option<DocComment>,
    pub attributes: Vec<AttributeSyntax>,
    pub modifiers: Vec<Modifier>,
    pub return_type: String,
    pub name: String,
    pub type_parameters: Vec<String>,
    pub parameters: Vec<ParameterSyntax>,
    pub constraints: Vec<ConstraintClause>,
    pub body: MethodBody,
}

/// Method body shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodBody {
    /// `=> expr;`
    Expression(Expr),
    /// `{ statements }`
    Block(Vec<Statement>),
}

/// A formal parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSyntax {
    /// Extension-method receiver.
    pub is_this: bool,
    pub ty: String,
    pub name: String,
}

impl ParameterSyntax {
    /// A plain parameter.
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            is_this: false,
            ty: ty.into(),
            name: name.into(),
        }
    }

    /// An extension receiver, `this T name`.
    pub fn this(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            is_this: true,
            ..Self::new(ty, name)
        }
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `expr;`
    Expression(Expr),
    /// `return expr;`
    Return(Expr),
    /// A local function declaration.
    LocalFunction {
        return_type: String,
        name: String,
        parameters: Vec<ParameterSyntax>,
        body: MethodBody,
    },
}

impl Statement {
    /// Visit every expression in the statement, outermost first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        match self {
            Statement::Expression(e) | Statement::Return(e) => e.walk(f),
            Statement::LocalFunction { body, .. } => body.walk(f),
        }
    }
}

impl MethodBody {
    /// Visit every expression in the body, outermost first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        match self {
            MethodBody::Expression(e) => e.walk(f),
            MethodBody::Block(statements) => statements.iter().for_each(|s| s.walk(f)),
        }
    }
}

/// Compound assignment operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `+=`
    Add,
    /// `-=`
    Subtract,
}

impl AssignOp {
    /// Operator token.
    pub fn token(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Subtract => "-=",
        }
    }
}

/// Lambda body shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LambdaBody {
    Expression(Box<Expr>),
    Block(Vec<Statement>),
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// An identifier or qualified name, as written.
    Name(String),
    StringLiteral(String),
    BoolLiteral(bool),
    MemberAccess {
        target: Box<Expr>,
        name: String,
    },
    Invocation {
        target: Box<Expr>,
        type_arguments: Vec<String>,
        arguments: Vec<Expr>,
    },
    /// `new T(args)`
    ObjectCreation {
        ty: String,
        arguments: Vec<Expr>,
    },
    Lambda {
        parameters: Vec<String>,
        body: LambdaBody,
    },
    Tuple(Vec<Expr>),
    Assign {
        target: Box<Expr>,
        op: AssignOp,
        value: Box<Expr>,
    },
    /// `throw expr`
    Throw(Box<Expr>),
}

impl Expr {
    /// A name expression.
    pub fn name(name: impl Into<String>) -> Self {
        Expr::Name(name.into())
    }

    /// `self.name`
    pub fn member(self, name: impl Into<String>) -> Self {
        Expr::MemberAccess {
            target: Box::new(self),
            name: name.into(),
        }
    }

    /// `self(args)`
    pub fn call(self, arguments: Vec<Expr>) -> Self {
        Expr::Invocation {
            target: Box::new(self),
            type_arguments: Vec::new(),
            arguments,
        }
    }

    /// `self<types>(args)`
    pub fn call_generic(self, type_arguments: Vec<String>, arguments: Vec<Expr>) -> Self {
        Expr::Invocation {
            target: Box::new(self),
            type_arguments,
            arguments,
        }
    }

    /// `self op value`
    pub fn assign(self, op: AssignOp, value: Expr) -> Self {
        Expr::Assign {
            target: Box::new(self),
            op,
            value: Box::new(value),
        }
    }

    /// Visit this expression and every nested expression, outermost first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        f(self);
        match self {
            Expr::Name(_) | Expr::StringLiteral(_) | Expr::BoolLiteral(_) => {}
            Expr::MemberAccess { target, .. } => target.walk(f),
            Expr::Invocation {
                target, arguments, ..
            } => {
                target.walk(f);
                arguments.iter().for_each(|a| a.walk(f));
            }
            Expr::ObjectCreation { arguments, .. } | Expr::Tuple(arguments) => {
                arguments.iter().for_each(|a| a.walk(f));
            }
            Expr::Lambda { body, .. } => match body {
                LambdaBody::Expression(e) => e.walk(f),
                LambdaBody::Block(statements) => statements.iter().for_each(|s| s.walk(f)),
            },
            Expr::Assign { target, value, .. } => {
                target.walk(f);
                value.walk(f);
            }
            Expr::Throw(e) => e.walk(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_class_groups_by_namespace() {
        let mut unit = CompilationUnit::new();
        unit.add_class("Sample", ClassDecl::new("A", vec![]));
        unit.add_class("Other", ClassDecl::new("B", vec![]));
        unit.add_class("Sample", ClassDecl::new("C", vec![]));
        unit.add_class("", ClassDecl::new("D", vec![]));

        assert_eq!(unit.namespaces.len(), 2);
        assert_eq!(unit.namespaces[0].types.len(), 2);
        let names: Vec<_> = unit.classes().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["A", "C", "B", "D"]);
    }

    #[test]
    fn test_walk_visits_nested_lambda() {
        let expr = Expr::name("Create").call(vec![Expr::Lambda {
            parameters: vec!["obs".to_string()],
            body: LambdaBody::Block(vec![
                Statement::Expression(
                    Expr::name("_data")
                        .member("Changed")
                        .assign(AssignOp::Add, Expr::name("Handler")),
                ),
                Statement::Return(Expr::name("Dispose").call(vec![])),
            ]),
        }]);

        let mut adds = 0;
        let mut names = 0;
        expr.walk(&mut |e| match e {
            Expr::Assign { op: AssignOp::Add, .. } => adds += 1,
            Expr::Name(_) => names += 1,
            _ => {}
        });
        assert_eq!(adds, 1);
        assert_eq!(names, 4);
    }
}
