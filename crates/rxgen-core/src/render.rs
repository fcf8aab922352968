//! Renders [`syntax`](crate::syntax) trees to C# source text.
//!
//! Output uses four-space indentation, braces on their own lines, and one
//! blank line between members. Rendering is a pure function of the tree.

use crate::syntax::{
    AttributeSyntax, ClassDecl, CompilationUnit, ConstraintClause, ConstructorDecl, DocComment,
    Expr, FieldDecl, LambdaBody, MemberDecl, MethodBody, MethodDecl, Modifier, ParameterSyntax,
    PropertyBody, PropertyDecl, Statement,
};

const INDENT: &str = "    ";

/// Render a compilation unit.
pub fn render(unit: &CompilationUnit) -> String {
    let mut writer = CodeWriter::new();

    for comment in &unit.leading_comments {
        writer.line(&format!("// {}", comment));
    }
    if unit.nullable_enable {
        writer.line("#nullable enable");
    }

    let mut first = unit.leading_comments.is_empty() && !unit.nullable_enable;
    for namespace in &unit.namespaces {
        if !first {
            writer.blank();
        }
        first = false;
        writer.line(&format!("namespace {}", namespace.name));
        writer.indented_block(|w| {
            for (i, class) in namespace.types.iter().enumerate() {
                if i > 0 {
                    w.blank();
                }
                w.class(class);
            }
        });
    }
    for class in &unit.global_types {
        if !first {
            writer.blank();
        }
        first = false;
        writer.class(class);
    }

    writer.finish()
}

/// Render a single class, without a surrounding unit.
pub fn render_class(class: &ClassDecl) -> String {
    let mut writer = CodeWriter::new();
    writer.class(class);
    writer.finish()
}

/// Render an expression at indentation level zero.
pub fn render_expr(expr: &Expr) -> String {
    expression(expr, 0)
}

/// Line-oriented writer that tracks the current indentation level.
///
/// Text passed to [`CodeWriter::line`] is indented on its first line only;
/// multi-line fragments carry their own absolute indentation.
#[derive(Debug, Default)]
struct CodeWriter {
    out: String,
    indent: usize,
}

impl CodeWriter {
    fn new() -> Self {
        Self::default()
    }

    fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn indented_block(&mut self, f: impl FnOnce(&mut Self)) {
        self.line("{");
        self.indent += 1;
        f(self);
        self.indent -= 1;
        self.line("}");
    }

    fn doc(&mut self, doc: &Option<DocComment>) {
        let Some(doc) = doc else {
            return;
        };
        self.line("/// <summary>");
        for text in doc.summary.lines() {
            self.line(&format!("/// {}", text));
        }
        self.line("/// </summary>");
        for (name, text) in &doc.params {
            self.line(&format!("/// <param name=\"{}\">{}</param>", name, text));
        }
    }

    fn attributes(&mut self, attributes: &[AttributeSyntax]) {
        for attribute in attributes {
            let text = attribute_text(attribute, self.indent);
            self.line(&format!("[{}]", text));
        }
    }

    fn class(&mut self, class: &ClassDecl) {
        self.doc(&class.doc);
        self.attributes(&class.attributes);

        let mut header = modifiers(&class.modifiers);
        header.push_str("class ");
        header.push_str(&class.name);
        header.push_str(&type_parameter_list(&class.type_parameters));
        if let Some(base) = &class.base {
            header.push_str(" : ");
            header.push_str(base);
        }
        self.line(&header);

        self.indent += 1;
        for clause in &class.constraints {
            self.line(&constraint_text(clause));
        }
        self.indent -= 1;

        self.indented_block(|w| {
            for (i, member) in class.members.iter().enumerate() {
                if i > 0 {
                    w.blank();
                }
                w.member(member);
            }
        });
    }

    fn member(&mut self, member: &MemberDecl) {
        match member {
            MemberDecl::Field(field) => self.field(field),
            MemberDecl::Constructor(ctor) => self.constructor(ctor),
            MemberDecl::Property(property) => self.property(property),
            MemberDecl::Method(method) => self.method(method),
        }
    }

    fn field(&mut self, field: &FieldDecl) {
        self.line(&format!(
            "{}{} {};",
            modifiers(&field.modifiers),
            field.ty,
            field.name
        ));
    }

    fn constructor(&mut self, ctor: &ConstructorDecl) {
        self.doc(&ctor.doc);
        let mut header = format!(
            "{}{}({})",
            modifiers(&ctor.modifiers),
            ctor.name,
            parameter_list(&ctor.parameters)
        );
        if let Some(arguments) = &ctor.base_arguments {
            header.push_str(" : base(");
            header.push_str(&argument_list(arguments, self.indent));
            header.push(')');
        }
        self.line(&header);
        self.indented_block(|w| {
            for statement in &ctor.body {
                let text = statement_text(statement, w.indent);
                w.line(&text);
            }
        });
    }

    fn property(&mut self, property: &PropertyDecl) {
        self.doc(&property.doc);
        self.attributes(&property.attributes);
        let head = format!(
            "{}{} {}",
            modifiers(&property.modifiers),
            property.ty,
            property.name
        );
        match &property.body {
            PropertyBody::Expression(expr) => {
                let body = expression(expr, self.indent);
                self.line(&format!("{} => {};", head, body));
            }
            PropertyBody::GetOnly => self.line(&format!("{} {{ get; }}", head)),
        }
    }

    fn method(&mut self, method: &MethodDecl) {
        self.doc(&method.doc);
        self.attributes(&method.attributes);
        let mut head = format!(
            "{}{} {}{}({})",
            modifiers(&method.modifiers),
            method.return_type,
            method.name,
            type_parameter_list(&method.type_parameters),
            parameter_list(&method.parameters)
        );
        for clause in &method.constraints {
            head.push(' ');
            head.push_str(&constraint_text(clause));
        }
        match &method.body {
            MethodBody::Expression(expr) => {
                let body = expression(expr, self.indent);
                self.line(&format!("{} => {};", head, body));
            }
            MethodBody::Block(statements) => {
                self.line(&head);
                self.indented_block(|w| {
                    for statement in statements {
                        let text = statement_text(statement, w.indent);
                        w.line(&text);
                    }
                });
            }
        }
    }
}

fn modifiers(modifiers: &[Modifier]) -> String {
    let mut text = String::new();
    for modifier in modifiers {
        text.push_str(modifier.keyword());
        text.push(' ');
    }
    text
}

fn type_parameter_list(parameters: &[String]) -> String {
    if parameters.is_empty() {
        String::new()
    } else {
        format!("<{}>", parameters.join(", "))
    }
}

fn parameter_list(parameters: &[ParameterSyntax]) -> String {
    parameters
        .iter()
        .map(|p| {
            if p.is_this {
                format!("this {} {}", p.ty, p.name)
            } else {
                format!("{} {}", p.ty, p.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn constraint_text(clause: &ConstraintClause) -> String {
    format!("where {} : {}", clause.parameter, clause.constraints.join(", "))
}

fn attribute_text(attribute: &AttributeSyntax, indent: usize) -> String {
    if attribute.arguments.is_empty() {
        attribute.name.clone()
    } else {
        format!(
            "{}({})",
            attribute.name,
            argument_list(&attribute.arguments, indent)
        )
    }
}

fn argument_list(arguments: &[Expr], indent: usize) -> String {
    arguments
        .iter()
        .map(|a| expression(a, indent))
        .collect::<Vec<_>>()
        .join(", ")
}

fn statement_text(statement: &Statement, indent: usize) -> String {
    match statement {
        Statement::Expression(expr) => format!("{};", expression(expr, indent)),
        Statement::Return(expr) => format!("return {};", expression(expr, indent)),
        Statement::LocalFunction {
            return_type,
            name,
            parameters,
            body,
        } => {
            let head = format!("{} {}({})", return_type, name, parameter_list(parameters));
            match body {
                MethodBody::Expression(expr) => format!("{} => {};", head, expression(expr, indent)),
                MethodBody::Block(statements) => format!("{}\n{}", head, block_text(statements, indent)),
            }
        }
    }
}

/// `{ statements }` with the opening brace at `indent`, without a leading
/// pad on the first line.
fn block_text(statements: &[Statement], indent: usize) -> String {
    let pad = INDENT.repeat(indent);
    let mut text = format!("{}{{\n", pad);
    for statement in statements {
        text.push_str(&pad);
        text.push_str(INDENT);
        text.push_str(&statement_text(statement, indent + 1));
        text.push('\n');
    }
    text.push_str(&pad);
    text.push('}');
    text
}

fn expression(expr: &Expr, indent: usize) -> String {
    match expr {
        Expr::Name(name) => name.clone(),
        Expr::StringLiteral(value) => string_literal(value),
        Expr::BoolLiteral(value) => value.to_string(),
        Expr::MemberAccess { target, name } => format!("{}.{}", expression(target, indent), name),
        Expr::Invocation {
            target,
            type_arguments,
            arguments,
        } => format!(
            "{}{}({})",
            expression(target, indent),
            type_parameter_list(type_arguments),
            argument_list(arguments, indent)
        ),
        Expr::ObjectCreation { ty, arguments } => {
            format!("new {}({})", ty, argument_list(arguments, indent))
        }
        Expr::Lambda { parameters, body } => {
            let params = match parameters.as_slice() {
                [single] => single.clone(),
                _ => format!("({})", parameters.join(", ")),
            };
            match body {
                LambdaBody::Expression(body) => format!("{} => {}", params, expression(body, indent)),
                LambdaBody::Block(statements) => {
                    format!("{} =>\n{}", params, block_text(statements, indent))
                }
            }
        }
        Expr::Tuple(elements) => format!("({})", argument_list(elements, indent)),
        Expr::Assign { target, op, value } => format!(
            "{} {} {}",
            expression(target, indent),
            op.token(),
            expression(value, indent)
        ),
        Expr::Throw(inner) => format!("throw {}", expression(inner, indent)),
    }
}

fn string_literal(value: &str) -> String {
    let mut text = String::with_capacity(value.len() + 2);
    text.push('"');
    for c in value.chars() {
        match c {
            '"' => text.push_str("\\\""),
            '\\' => text.push_str("\\\\"),
            '\n' => text.push_str("\\n"),
            '\r' => text.push_str("\\r"),
            '\t' => text.push_str("\\t"),
            '\0' => text.push_str("\\0"),
            c => text.push(c),
        }
    }
    text.push('"');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{AssignOp, NamespaceDecl};

    #[test]
    fn test_render_string_literal_escapes() {
        assert_eq!(
            render_expr(&Expr::StringLiteral("say \"hi\"\\\n".to_string())),
            "\"say \\\"hi\\\"\\\\\\n\""
        );
    }

    #[test]
    fn test_render_block_lambda_indentation() {
        let expr = Expr::name("Create").call(vec![Expr::Lambda {
            parameters: vec!["obs".to_string()],
            body: LambdaBody::Block(vec![
                Statement::Expression(
                    Expr::name("x").assign(AssignOp::Add, Expr::name("Handler")),
                ),
                Statement::Return(Expr::name("d")),
            ]),
        }]);

        let mut class = ClassDecl::new("C", vec![Modifier::Internal]);
        class.members.push(MemberDecl::Property(PropertyDecl {
            doc: None,
            attributes: vec![],
            modifiers: vec![Modifier::Public],
            ty: "int".to_string(),
            name: "P".to_string(),
            body: PropertyBody::Expression(expr),
        }));

        let expected = "\
internal class C
{
    public int P => Create(obs =>
    {
        x += Handler;
        return d;
    });
}
";
        assert_eq!(render_class(&class), expected);
    }

    #[test]
    fn test_render_unit_layout() {
        let mut class = ClassDecl::new("RxFooEvents", vec![Modifier::Internal, Modifier::Partial]);
        class.type_parameters.push("T".to_string());
        class.base = Some("global::Sample.RxBaseEvents<T>".to_string());
        class.constraints.push(ConstraintClause {
            parameter: "T".to_string(),
            constraints: vec!["class".to_string(), "new()".to_string()],
        });
        class.doc = Some(DocComment::summary("Wraps Foo."));
        class.attributes.push(
            AttributeSyntax::new("global::System.ObsoleteAttribute")
                .with_argument(Expr::StringLiteral("old".to_string()))
                .with_argument(Expr::BoolLiteral(false)),
        );
        class.members.push(MemberDecl::Field(FieldDecl {
            modifiers: vec![Modifier::Private, Modifier::Readonly],
            ty: "global::Sample.Foo<T>".to_string(),
            name: "_data".to_string(),
        }));
        class.members.push(MemberDecl::Constructor(ConstructorDecl {
            doc: Some(DocComment::summary("Init.").with_param("data", "The wrapped.")),
            modifiers: vec![Modifier::Public],
            name: "RxFooEvents".to_string(),
            parameters: vec![ParameterSyntax::new("global::Sample.Foo<T>", "data")],
            base_arguments: Some(vec![Expr::name("data")]),
            body: vec![Statement::Expression(
                Expr::name("_data").assign(AssignOp::Assign, Expr::name("data")),
            )],
        }));

        let unit = CompilationUnit {
            leading_comments: vec!["<auto-generated />".to_string()],
            nullable_enable: true,
            namespaces: vec![NamespaceDecl {
                name: "Sample".to_string(),
                types: vec![class],
            }],
            global_types: vec![],
        };

        let expected = "\
// <auto-generated />
#nullable enable

namespace Sample
{
    /// <summary>
    /// Wraps Foo.
    /// </summary>
    [global::System.ObsoleteAttribute(\"old\", false)]
    internal partial class RxFooEvents<T> : global::Sample.RxBaseEvents<T>
        where T : class, new()
    {
        private readonly global::Sample.Foo<T> _data;

        /// <summary>
        /// Init.
        /// </summary>
        /// <param name=\"data\">The wrapped.</param>
        public RxFooEvents(global::Sample.Foo<T> data) : base(data)
        {
            _data = data;
        }
    }
}
";
        assert_eq!(render(&unit), expected);
    }

    #[test]
    fn test_render_extension_method_with_constraint() {
        let method = MethodDecl {
            doc: None,
            attributes: vec![],
            modifiers: vec![Modifier::Public, Modifier::Static],
            return_type: "global::Sample.RxFooEvents<T>".to_string(),
            name: "Events".to_string(),
            type_parameters: vec!["T".to_string()],
            parameters: vec![ParameterSyntax::this("global::Sample.Foo<T>", "item")],
            constraints: vec![ConstraintClause {
                parameter: "T".to_string(),
                constraints: vec!["struct".to_string()],
            }],
            body: MethodBody::Expression(Expr::ObjectCreation {
                ty: "global::Sample.RxFooEvents<T>".to_string(),
                arguments: vec![Expr::name("item")],
            }),
        };
        let mut class = ClassDecl::new("Ext", vec![Modifier::Internal, Modifier::Static]);
        class.members.push(MemberDecl::Method(method));

        let rendered = render_class(&class);
        assert!(rendered.contains(
            "    public static global::Sample.RxFooEvents<T> Events<T>(this global::Sample.Foo<T> item) where T : struct => new global::Sample.RxFooEvents<T>(item);\n"
        ));
    }
}
