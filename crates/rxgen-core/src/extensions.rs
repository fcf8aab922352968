//! Factory extension methods.
//!
//! Every instance wrapper gets one `Events()` overload taking the wrapped
//! type as its receiver. All overloads of a pass land in one partial
//! static class so call sites resolve through a single entry point.

use rxgen_model::{SymbolQuery, TypeId, TypeRef};

use crate::config::GeneratorConfig;
use crate::naming::{cref, definition_display, definition_key, escape_identifier, wrapper_display};
use crate::render;
use crate::synth::{constraint_clauses, obsolete_attributes, see_cref, WrapperType, AUTO_GENERATED};
use crate::syntax::{
    ClassDecl, CompilationUnit, DocComment, Expr, MemberDecl, MethodBody, MethodDecl, Modifier,
    ParameterSyntax,
};

/// File name of the unit holding every factory method of a pass.
pub const EXTENSIONS_FILE_NAME: &str = "ObservableGeneratorExtensions.FoundEvents.SourceGenerated.cs";

const RECEIVER: &str = "item";

/// One `Events()` extension method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryMethod {
    /// The receiver's type.
    pub source_type: TypeId,
    /// Ordering key, the receiver's metadata name.
    pub sort_key: String,
    /// The method declaration.
    pub declaration: MethodDecl,
}

/// Build the factory method for a wrapper.
///
/// Static wrappers are reached through their class name and get none.
pub fn emit_factory<Q: SymbolQuery + ?Sized>(
    query: &Q,
    config: &GeneratorConfig,
    wrapper: &WrapperType,
) -> Option<FactoryMethod> {
    if wrapper.mode.is_static() {
        return None;
    }

    let type_id = wrapper.source_type;
    let symbol = query.type_symbol(type_id);
    let own_parameters: Vec<TypeRef> = symbol.type_parameter_refs();
    let type_parameters = query.type_parameters_in_scope(type_id);
    let wrapper_type = wrapper_display(query, type_id, &own_parameters);

    let doc = config.emit_documentation.then(|| {
        DocComment::summary(see_cref(
            "A wrapper class which wraps all the events contained within the {0} class.",
            &cref(query, type_id),
        ))
        .with_param(RECEIVER, "The instance to wrap.")
    });

    let declaration = MethodDecl {
        doc,
        attributes: obsolete_attributes(symbol.obsolete().as_ref()),
        modifiers: vec![Modifier::Public, Modifier::Static],
        return_type: wrapper_type.clone(),
        name: config.factory_method.clone(),
        type_parameters: type_parameters
            .iter()
            .map(|p| escape_identifier(&p.name))
            .collect(),
        parameters: vec![ParameterSyntax::this(definition_display(query, type_id), RECEIVER)],
        constraints: constraint_clauses(query, &type_parameters),
        body: MethodBody::Expression(Expr::ObjectCreation {
            ty: wrapper_type,
            arguments: vec![Expr::name(RECEIVER)],
        }),
    };

    Some(FactoryMethod {
        source_type: type_id,
        sort_key: definition_key(query, type_id),
        declaration,
    })
}

/// Assemble the extensions unit. Returns `None` without factories.
///
/// Factories are ordered by their sort key so the unit is stable however
/// the wrappers were produced.
pub fn extensions_unit(config: &GeneratorConfig, factories: &[FactoryMethod]) -> Option<CompilationUnit> {
    if factories.is_empty() {
        return None;
    }

    let mut ordered: Vec<&FactoryMethod> = factories.iter().collect();
    ordered.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));

    let mut class = ClassDecl::new(
        config.extensions_class.clone(),
        vec![Modifier::Internal, Modifier::Static, Modifier::Partial],
    );
    if config.emit_documentation {
        class.doc = Some(DocComment::summary(
            "Extension methods exposing the events of wrapped types as observables.",
        ));
    }
    class.members = ordered
        .into_iter()
        .map(|f| MemberDecl::Method(f.declaration.clone()))
        .collect();

    let mut unit = CompilationUnit::new()
        .with_comment(AUTO_GENERATED)
        .with_nullable_enable(config.emit_nullable_directive);
    unit.add_class(&config.extensions_namespace, class);
    Some(unit)
}

/// Render the extensions unit, if there is one.
pub fn render_extensions(config: &GeneratorConfig, factories: &[FactoryMethod]) -> Option<String> {
    extensions_unit(config, factories).map(|unit| render::render(&unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::collect;
    use crate::synth::{synthesize, WrapperMode, WrapperRequest};
    use rxgen_model::{
        AttributeData, EventSymbol, ProgramBuilder, TypeParameter, TypeSymbol,
    };

    #[test]
    fn test_emit_factory_generic() {
        let mut builder = ProgramBuilder::with_core_library();
        let core = *builder.core().unwrap();
        let id = builder
            .add(
                TypeSymbol::class("Sample", "Repo")
                    .with_type_parameter(TypeParameter::new("T").with_struct_constraint())
                    .with_attribute(AttributeData::obsolete("Gone soon", false))
                    .with_event(EventSymbol::new(
                        "Added",
                        TypeRef::generic(core.event_handler_t, vec![TypeRef::parameter("T")]),
                    )),
            )
            .unwrap();
        let model = builder.build();
        let config = GeneratorConfig::default();

        let events = collect(&model, id, false, false);
        let wrapper =
            synthesize(&model, &config, WrapperRequest::new(&events, WrapperMode::Instance)).unwrap();
        let factory = emit_factory(&model, &config, &wrapper).unwrap();

        assert_eq!(factory.sort_key, "Sample.Repo`1");
        assert_eq!(factory.declaration.return_type, "global::Sample.RxRepoEvents<T>");
        assert_eq!(factory.declaration.attributes.len(), 1);

        let text = render_extensions(&config, &[factory]).unwrap();
        assert!(text.contains("namespace ObservableEvents\n"));
        assert!(text.contains("internal static partial class ObservableGeneratorExtensions\n"));
        assert!(text.contains(
            "public static global::Sample.RxRepoEvents<T> Events<T>(this global::Sample.Repo<T> item) where T : struct => new global::Sample.RxRepoEvents<T>(item);"
        ));
    }

    #[test]
    fn test_emit_factory_nested_in_generic_type() {
        let mut builder = ProgramBuilder::with_core_library();
        let core = *builder.core().unwrap();
        let outer = builder
            .add(TypeSymbol::class("Sample", "Outer").with_type_parameter(TypeParameter::new("T")))
            .unwrap();
        let inner = builder
            .add(
                TypeSymbol::class("Sample", "Inner")
                    .nested_in(outer)
                    .with_event(EventSymbol::new("Changed", TypeRef::named(core.event_handler))),
            )
            .unwrap();
        let model = builder.build();
        let config = GeneratorConfig::default();

        let events = collect(&model, inner, false, false);
        let wrapper =
            synthesize(&model, &config, WrapperRequest::new(&events, WrapperMode::Instance)).unwrap();
        let factory = emit_factory(&model, &config, &wrapper).unwrap();

        let text = render_extensions(&config, &[factory]).unwrap();
        assert!(text.contains(
            "public static global::Sample.RxOuter_1InnerEvents<T> Events<T>(this global::Sample.Outer<T>.Inner item) => new global::Sample.RxOuter_1InnerEvents<T>(item);"
        ));
    }

    #[test]
    fn test_static_wrapper_has_no_factory() {
        let mut builder = ProgramBuilder::with_core_library();
        let core = *builder.core().unwrap();
        let id = builder
            .add(
                TypeSymbol::class("Sample", "Clock").with_static(true).with_event(
                    EventSymbol::new("Tick", TypeRef::named(core.event_handler)).with_static(true),
                ),
            )
            .unwrap();
        let model = builder.build();
        let config = GeneratorConfig::default();

        let events = collect(&model, id, false, true);
        let wrapper =
            synthesize(&model, &config, WrapperRequest::new(&events, WrapperMode::Static)).unwrap();
        assert!(emit_factory(&model, &config, &wrapper).is_none());
    }

    #[test]
    fn test_extensions_unit_orders_factories() {
        let mut builder = ProgramBuilder::with_core_library();
        let core = *builder.core().unwrap();
        let mut ids = Vec::new();
        for name in ["Zulu", "Alpha"] {
            ids.push(
                builder
                    .add(
                        TypeSymbol::class("Sample", name)
                            .with_event(EventSymbol::new("Changed", TypeRef::named(core.event_handler))),
                    )
                    .unwrap(),
            );
        }
        let model = builder.build();
        let config = GeneratorConfig::default().with_extensions_namespace("");

        let factories: Vec<FactoryMethod> = ids
            .iter()
            .map(|id| {
                let events = collect(&model, *id, false, false);
                let wrapper =
                    synthesize(&model, &config, WrapperRequest::new(&events, WrapperMode::Instance))
                        .unwrap();
                emit_factory(&model, &config, &wrapper).unwrap()
            })
            .collect();

        let unit = extensions_unit(&config, &factories).unwrap();
        assert!(unit.namespaces.is_empty());
        let class = unit.classes().next().unwrap();
        let receivers: Vec<_> = class
            .methods()
            .map(|m| m.parameters[0].ty.as_str())
            .collect();
        assert_eq!(receivers, ["global::Sample.Alpha", "global::Sample.Zulu"]);
    }

    #[test]
    fn test_extensions_unit_empty() {
        assert!(extensions_unit(&GeneratorConfig::default(), &[]).is_none());
    }
}
