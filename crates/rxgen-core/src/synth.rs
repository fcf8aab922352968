//! Wrapper synthesis.
//!
//! Builds the syntax tree of a wrapper class for one type. Instance and
//! static wrappers go through the same function; [`WrapperMode`] selects
//! the receiver and whether a field and constructor are emitted.

use std::collections::BTreeSet;

use rxgen_model::{ObsoleteInfo, SymbolQuery, TypeId, TypeParameter, TypeRef};
use serde::Serialize;
use tracing::{debug, trace};

use crate::classify::{classify, ElementType, Forwarding};
use crate::collector::{EventDescriptor, ReturnKind, TypeEvents};
use crate::config::{GeneratorConfig, ReactiveNames};
use crate::naming::{
    cref, definition_display, escape_identifier, file_name_hint, type_display, wrapper_display,
    wrapper_name, wrapper_namespace,
};
use crate::render;
use crate::syntax::{
    AssignOp, AttributeSyntax, ClassDecl, CompilationUnit, ConstraintClause, ConstructorDecl,
    DocComment, Expr, FieldDecl, LambdaBody, MemberDecl, MethodBody, Modifier, ParameterSyntax,
    PropertyBody, PropertyDecl, Statement,
};

/// Leading comment of every generated unit.
pub const AUTO_GENERATED: &str = "<auto-generated />";

const DATA_FIELD: &str = "_data";
const DATA_PARAMETER: &str = "data";
const OBSERVER: &str = "obs";
const HANDLER: &str = "Handler";

/// Which events a wrapper exposes and how it reaches them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapperMode {
    /// Wraps an instance held in a field.
    Instance,
    /// Exposes static events through static properties.
    Static,
}

impl WrapperMode {
    /// Whether this is the static mode.
    pub fn is_static(self) -> bool {
        matches!(self, WrapperMode::Static)
    }

    /// File name component for this mode.
    pub fn file_suffix(self) -> &'static str {
        match self {
            WrapperMode::Instance => "Instance",
            WrapperMode::Static => "Static",
        }
    }
}

impl std::fmt::Display for WrapperMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WrapperMode::Instance => write!(f, "instance"),
            WrapperMode::Static => write!(f, "static"),
        }
    }
}

/// The wrapper an instance wrapper derives from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentWrapper {
    /// Source type of the parent wrapper.
    pub type_id: TypeId,
    /// Arguments for the parent's type parameters, in terms of the child's.
    pub type_arguments: Vec<TypeRef>,
    /// Event names exposed anywhere in the parent wrapper chain.
    pub inherited_events: BTreeSet<String>,
}

/// Input to [`synthesize`].
#[derive(Debug, Clone)]
pub struct WrapperRequest<'a> {
    /// Events to expose, collected for `mode`.
    pub events: &'a TypeEvents,
    /// Instance or static.
    pub mode: WrapperMode,
    /// Parent wrapper, instance mode only.
    pub parent: Option<ParentWrapper>,
    /// Emit a wrapper even without events of its own.
    pub generate_empty: bool,
}

impl<'a> WrapperRequest<'a> {
    /// A request without a parent that skips empty types.
    pub fn new(events: &'a TypeEvents, mode: WrapperMode) -> Self {
        Self {
            events,
            mode,
            parent: None,
            generate_empty: false,
        }
    }

    /// Derive from a parent wrapper.
    pub fn with_parent(mut self, parent: ParentWrapper) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Emit the wrapper even when it declares no events.
    pub fn with_generate_empty(mut self, generate_empty: bool) -> Self {
        self.generate_empty = generate_empty;
        self
    }
}

/// A fully built wrapper class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperType {
    /// The wrapped type.
    pub source_type: TypeId,
    /// Instance or static.
    pub mode: WrapperMode,
    /// Wrapper class name.
    pub name: String,
    /// Namespace the wrapper is declared in.
    pub namespace: String,
    /// Deterministic file name for the generated unit.
    pub file_name: String,
    /// Parent wrapper, if any.
    pub parent: Option<ParentWrapper>,
    /// Events declared on this wrapper, sorted.
    pub events: Vec<String>,
    /// The class declaration.
    pub declaration: ClassDecl,
}

impl WrapperType {
    /// Every event reachable through this wrapper, including inherited ones.
    pub fn exposed_events(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self.events.iter().cloned().collect();
        if let Some(parent) = &self.parent {
            names.extend(parent.inherited_events.iter().cloned());
        }
        names
    }

    /// The generated unit holding this wrapper.
    pub fn compilation_unit(&self, config: &GeneratorConfig) -> CompilationUnit {
        let mut unit = CompilationUnit::new()
            .with_comment(AUTO_GENERATED)
            .with_nullable_enable(config.emit_nullable_directive);
        unit.add_class(&self.namespace, self.declaration.clone());
        unit
    }

    /// Render the generated unit.
    pub fn render(&self, config: &GeneratorConfig) -> String {
        render::render(&self.compilation_unit(config))
    }
}

/// Build the wrapper for `request.events`.
///
/// Returns `None` when there are no events and empty wrappers were not
/// requested.
pub fn synthesize<Q: SymbolQuery + ?Sized>(
    query: &Q,
    config: &GeneratorConfig,
    request: WrapperRequest<'_>,
) -> Option<WrapperType> {
    let type_id = request.events.type_id();
    if request.events.is_empty() && !request.generate_empty {
        trace!(type_name = %query.metadata_name(type_id), "No events to wrap");
        return None;
    }

    let symbol = query.type_symbol(type_id);
    let mode = request.mode;
    let name = wrapper_name(query, type_id);
    let parent = if mode.is_static() { None } else { request.parent };
    let inherited = parent
        .as_ref()
        .map(|p| p.inherited_events.clone())
        .unwrap_or_default();

    let mut modifiers = vec![Modifier::Internal];
    if mode.is_static() {
        modifiers.push(Modifier::Static);
    }
    modifiers.push(Modifier::Partial);

    let mut class = ClassDecl::new(name.clone(), modifiers);
    class.attributes = obsolete_attributes(symbol.obsolete().as_ref());
    if config.emit_documentation {
        let text = if mode.is_static() {
            "Observable wrappers for the static events of the {0} class."
        } else {
            "Observable wrappers for the events of the {0} class."
        };
        class.doc = Some(DocComment::summary(see_cref(text, &cref(query, type_id))));
    }

    let type_parameters = query.type_parameters_in_scope(type_id);
    class.type_parameters = type_parameters
        .iter()
        .map(|p| escape_identifier(&p.name))
        .collect();
    class.constraints = constraint_clauses(query, &type_parameters);

    let target = match mode {
        WrapperMode::Instance => {
            class.base = parent
                .as_ref()
                .map(|p| wrapper_display(query, p.type_id, &p.type_arguments));

            let source = definition_display(query, type_id);
            class.members.push(MemberDecl::Field(FieldDecl {
                modifiers: vec![Modifier::Private, Modifier::Readonly],
                ty: source.clone(),
                name: DATA_FIELD.to_string(),
            }));
            class.members.push(MemberDecl::Constructor(constructor(
                config,
                &name,
                source,
                parent.is_some(),
            )));
            Expr::name(DATA_FIELD)
        }
        WrapperMode::Static => Expr::name(definition_display(query, type_id)),
    };

    for event in request.events.events() {
        let hides = inherited.contains(&event.name);
        class.members.push(MemberDecl::Property(event_property(
            query, config, event, &target, mode, hides,
        )));
    }

    debug!(
        type_name = %query.metadata_name(type_id),
        wrapper = %name,
        mode = %mode,
        events = request.events.len(),
        "Synthesized wrapper"
    );

    Some(WrapperType {
        source_type: type_id,
        mode,
        namespace: wrapper_namespace(query, type_id),
        file_name: file_name_hint(query, type_id, mode),
        name,
        parent,
        events: request.events.names().map(str::to_string).collect(),
        declaration: class,
    })
}

/// `where` clauses for a list of type parameters, in declaration order.
pub fn constraint_clauses<Q: SymbolQuery + ?Sized>(
    query: &Q,
    parameters: &[TypeParameter],
) -> Vec<ConstraintClause> {
    parameters
        .iter()
        .filter(|p| p.has_constraints())
        .map(|p| {
            let mut constraints = Vec::new();
            if p.reference_type {
                constraints.push("class".to_string());
            } else if p.value_type {
                constraints.push("struct".to_string());
            }
            constraints.extend(p.constraint_types.iter().map(|t| type_display(query, t)));
            if p.constructor && !p.value_type {
                constraints.push("new()".to_string());
            }
            ConstraintClause {
                parameter: escape_identifier(&p.name),
                constraints,
            }
        })
        .collect()
}

/// `[global::System.ObsoleteAttribute("msg", isError)]` when the message is
/// not blank.
pub fn obsolete_attributes(obsolete: Option<&ObsoleteInfo>) -> Vec<AttributeSyntax> {
    match obsolete {
        Some(info) if !info.message.trim().is_empty() => vec![
            AttributeSyntax::new("global::System.ObsoleteAttribute")
                .with_argument(Expr::StringLiteral(info.message.clone()))
                .with_argument(Expr::BoolLiteral(info.is_error)),
        ],
        _ => Vec::new(),
    }
}

/// Substitute `<see cref="..." />` for `{0}` in a documentation template.
pub(crate) fn see_cref(template: &str, cref: &str) -> String {
    template.replace("{0}", &format!("<see cref=\"{}\" />", cref))
}

fn constructor(
    config: &GeneratorConfig,
    name: &str,
    source: String,
    has_parent: bool,
) -> ConstructorDecl {
    let doc = config.emit_documentation.then(|| {
        DocComment::summary(see_cref(
            "Initializes a new instance of the {0} class.",
            name,
        ))
        .with_param(DATA_PARAMETER, "The class that is being wrapped.")
    });

    ConstructorDecl {
        doc,
        modifiers: vec![Modifier::Public],
        name: name.to_string(),
        parameters: vec![ParameterSyntax::new(source, DATA_PARAMETER)],
        base_arguments: has_parent.then(|| vec![Expr::name(DATA_PARAMETER)]),
        body: vec![Statement::Expression(
            Expr::name(DATA_FIELD).assign(AssignOp::Assign, Expr::name(DATA_PARAMETER)),
        )],
    }
}

/// The observable element type as written in generated code.
pub fn element_display<Q: SymbolQuery + ?Sized>(
    query: &Q,
    element: &ElementType,
    reactive: &ReactiveNames,
) -> String {
    match element {
        ElementType::Unit => reactive.unit.clone(),
        ElementType::Type(ty) => type_display(query, ty),
        ElementType::Tuple(items) => {
            let items: Vec<String> = items
                .iter()
                .map(|(ty, name)| format!("{} {}", type_display(query, ty), escape_identifier(name)))
                .collect();
            format!("({})", items.join(", "))
        }
    }
}

fn event_property<Q: SymbolQuery + ?Sized>(
    query: &Q,
    config: &GeneratorConfig,
    event: &EventDescriptor,
    target: &Expr,
    mode: WrapperMode,
    hides_inherited: bool,
) -> PropertyDecl {
    let reactive = &config.reactive;
    let classification = classify(query, event, config.collapse_plain_event_args);

    let element = element_display(query, &classification.element, reactive);

    let parameters: Vec<ParameterSyntax> = event
        .invoke
        .parameters
        .iter()
        .map(|p| ParameterSyntax::new(type_display(query, &p.ty), escape_identifier(&p.name)))
        .collect();
    let taken: BTreeSet<&str> = parameters.iter().map(|p| p.name.as_str()).collect();
    let observer = unique_name(OBSERVER, &taken);
    let handler = unique_name(HANDLER, &taken);

    let forward = match &classification.forward {
        Forwarding::Unit => Expr::name(&reactive.unit_default),
        Forwarding::Parameter(name) => Expr::name(escape_identifier(name)),
        Forwarding::Tuple(names) => {
            Expr::Tuple(names.iter().map(|n| Expr::name(escape_identifier(n))).collect())
        }
    };
    let on_next = Expr::name(&observer).member("OnNext").call(vec![forward]);

    let (return_type, handler_body) = match event.return_kind {
        ReturnKind::Void => ("void".to_string(), MethodBody::Expression(on_next)),
        ReturnKind::Task => (
            type_display(query, &event.invoke.return_type),
            MethodBody::Block(vec![
                Statement::Expression(on_next),
                Statement::Return(Expr::name("global::System.Threading.Tasks.Task.CompletedTask")),
            ]),
        ),
        ReturnKind::ValueTask => (
            type_display(query, &event.invoke.return_type),
            MethodBody::Block(vec![
                Statement::Expression(on_next),
                Statement::Return(Expr::name("default")),
            ]),
        ),
    };

    let event_name = escape_identifier(&event.name);
    let event_access = target.clone().member(&event_name);

    let body = Expr::name(&reactive.create).call_generic(
        vec![element.clone()],
        vec![Expr::Lambda {
            parameters: vec![observer],
            body: LambdaBody::Block(vec![
                Statement::LocalFunction {
                    return_type,
                    name: handler.clone(),
                    parameters,
                    body: handler_body,
                },
                Statement::Expression(
                    event_access
                        .clone()
                        .assign(AssignOp::Add, Expr::name(&handler)),
                ),
                Statement::Return(Expr::name(&reactive.disposable_create).call(vec![
                    Expr::Lambda {
                        parameters: Vec::new(),
                        body: LambdaBody::Expression(Box::new(
                            event_access.assign(AssignOp::Subtract, Expr::name(&handler)),
                        )),
                    },
                ])),
            ]),
        }],
    );

    let mut modifiers = vec![Modifier::Public];
    if mode.is_static() {
        modifiers.push(Modifier::Static);
    }
    if hides_inherited {
        modifiers.push(Modifier::New);
    }

    let doc = config.emit_documentation.then(|| {
        DocComment::summary(see_cref(
            "Gets an observable which signals when the {0} event triggers.",
            &format!("{}.{}", cref(query, event.declaring_type), event.name),
        ))
    });

    PropertyDecl {
        doc,
        attributes: obsolete_attributes(event.obsolete.as_ref()),
        modifiers,
        ty: format!("{}<{}>", reactive.observable, element),
        name: event_name,
        body: PropertyBody::Expression(body),
    }
}

fn unique_name(base: &str, taken: &BTreeSet<&str>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{}{}", base, n))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}
