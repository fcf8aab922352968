//! Declarations the triggers depend on.
//!
//! The sentinel `Events<T>()` extension method and the static marker
//! attribute must exist in the compilation before user code can reference
//! them. The generator emits them once per pass and can also declare them
//! in a [`ProgramBuilder`] so the model sees what the host will compile.

use rxgen_model::{Accessibility, ModelResult, ProgramBuilder, TypeId, TypeSymbol};
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::render;
use crate::synth::AUTO_GENERATED;
use crate::syntax::{
    AssignOp, AttributeSyntax, ClassDecl, CompilationUnit, ConstructorDecl, DocComment, Expr,
    MemberDecl, MethodBody, MethodDecl, Modifier, ParameterSyntax, PropertyBody, PropertyDecl,
    Statement,
};

/// File name of the bootstrap unit.
pub const BOOTSTRAP_FILE_NAME: &str = "ObservableGeneratorExtensions.SourceGenerated.cs";

const SENTINEL_MESSAGE: &str =
    "The observable events generator did not produce a wrapper for this type.";

/// Ids of the bootstrap declarations inside a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapTypes {
    /// The extension-method holder class.
    pub holder: TypeId,
    /// The static marker attribute class.
    pub attribute: TypeId,
}

/// Declare the holder and marker attribute in `builder`.
///
/// Existing declarations with the same metadata names are reused, so
/// calling this more than once is harmless.
pub fn install(builder: &mut ProgramBuilder, config: &GeneratorConfig) -> ModelResult<BootstrapTypes> {
    let holder = match builder.resolve(&config.holder_metadata_name()) {
        Some(id) => id,
        None => builder.add(
            TypeSymbol::class(config.extensions_namespace.clone(), config.extensions_class.clone())
                .with_accessibility(Accessibility::Internal)
                .with_static(true),
        )?,
    };

    let attribute = match builder.resolve(&config.static_attribute_metadata_name()) {
        Some(id) => id,
        None => builder.add(
            TypeSymbol::class(config.extensions_namespace.clone(), config.static_attribute.clone())
                .with_accessibility(Accessibility::Internal)
                .with_sealed(true),
        )?,
    };

    debug!(
        holder = %config.holder_metadata_name(),
        attribute = %config.static_attribute_metadata_name(),
        "Installed bootstrap declarations"
    );

    Ok(BootstrapTypes { holder, attribute })
}

/// The bootstrap compilation unit.
pub fn bootstrap_unit(config: &GeneratorConfig) -> CompilationUnit {
    let mut unit = CompilationUnit::new()
        .with_comment(AUTO_GENERATED)
        .with_nullable_enable(config.emit_nullable_directive);
    unit.add_class(&config.extensions_namespace, holder_class(config));
    unit.add_class(&config.extensions_namespace, attribute_class(config));
    unit
}

/// Render the bootstrap unit.
pub fn bootstrap_source(config: &GeneratorConfig) -> String {
    render::render(&bootstrap_unit(config))
}

fn holder_class(config: &GeneratorConfig) -> ClassDecl {
    let sentinel = MethodDecl {
        doc: config.emit_documentation.then(|| {
            DocComment::summary("Gets observable wrappers for the events of the item.")
                .with_param("item", "The instance whose events are wrapped.")
        }),
        attributes: Vec::new(),
        modifiers: vec![Modifier::Public, Modifier::Static],
        return_type: "object".to_string(),
        name: config.factory_method.clone(),
        type_parameters: vec!["T".to_string()],
        parameters: vec![ParameterSyntax::this("T", "item")],
        constraints: Vec::new(),
        body: MethodBody::Expression(Expr::Throw(Box::new(Expr::ObjectCreation {
            ty: "global::System.InvalidOperationException".to_string(),
            arguments: vec![Expr::StringLiteral(SENTINEL_MESSAGE.to_string())],
        }))),
    };

    let mut class = ClassDecl::new(
        config.extensions_class.clone(),
        vec![Modifier::Internal, Modifier::Static, Modifier::Partial],
    );
    if config.emit_documentation {
        class.doc = Some(DocComment::summary(
            "Extension methods to generate observables for the events of a type.",
        ));
    }
    class.members.push(MemberDecl::Method(sentinel));
    class
}

fn attribute_class(config: &GeneratorConfig) -> ClassDecl {
    let name = config.static_attribute.clone();
    let type_name = "global::System.Type".to_string();

    let mut class = ClassDecl::new(name.clone(), vec![Modifier::Internal, Modifier::Sealed]);
    class.base = Some("global::System.Attribute".to_string());
    class.attributes.push(
        AttributeSyntax::new("global::System.AttributeUsage")
            .with_argument(Expr::name("global::System.AttributeTargets.Assembly"))
            .with_argument(Expr::name("AllowMultiple").assign(AssignOp::Assign, Expr::BoolLiteral(true))),
    );
    if config.emit_documentation {
        class.doc = Some(DocComment::summary(
            "Requests observable wrappers for the static events of a type.",
        ));
    }

    class.members.push(MemberDecl::Constructor(ConstructorDecl {
        doc: config.emit_documentation.then(|| {
            DocComment::summary(format!(
                "Initializes a new instance of the <see cref=\"{}\" /> class.",
                name
            ))
            .with_param("type", "The static type to wrap.")
        }),
        modifiers: vec![Modifier::Public],
        name: name.clone(),
        parameters: vec![ParameterSyntax::new(type_name.clone(), "type")],
        base_arguments: None,
        body: vec![Statement::Expression(
            Expr::name("Type").assign(AssignOp::Assign, Expr::name("type")),
        )],
    }));

    class.members.push(MemberDecl::Property(PropertyDecl {
        doc: config
            .emit_documentation
            .then(|| DocComment::summary("Gets the static type to wrap.")),
        attributes: Vec::new(),
        modifiers: vec![Modifier::Public],
        ty: type_name,
        name: "Type".to_string(),
        body: PropertyBody::GetOnly,
    }));

    class
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxgen_model::SymbolQuery;

    #[test]
    fn test_bootstrap_source() {
        let config = GeneratorConfig::default();
        let text = bootstrap_source(&config);

        assert!(text.starts_with("// <auto-generated />\n"));
        assert!(text.contains("namespace ObservableEvents\n"));
        assert!(text.contains("internal static partial class ObservableGeneratorExtensions\n"));
        assert!(text.contains(
            "public static object Events<T>(this T item) => throw new global::System.InvalidOperationException("
        ));
        assert!(text.contains(
            "[global::System.AttributeUsage(global::System.AttributeTargets.Assembly, AllowMultiple = true)]"
        ));
        assert!(text.contains(
            "internal sealed class GenerateStaticEventObservablesAttribute : global::System.Attribute\n"
        ));
        assert!(text.contains("public global::System.Type Type { get; }"));
    }

    #[test]
    fn test_bootstrap_follows_config() {
        let config = GeneratorConfig::minimal()
            .with_extensions_namespace("")
            .with_factory_method("Observe");
        let text = bootstrap_source(&config);

        assert!(!text.contains("namespace"));
        assert!(text.contains("Observe<T>(this T item)"));
        assert!(!text.contains("///"));
    }

    #[test]
    fn test_install_is_idempotent() {
        let config = GeneratorConfig::default();
        let mut builder = ProgramBuilder::with_core_library();

        let first = install(&mut builder, &config).unwrap();
        let second = install(&mut builder, &config).unwrap();
        assert_eq!(first, second);

        let model = builder.build();
        assert_eq!(
            model.resolve_metadata_name("ObservableEvents.ObservableGeneratorExtensions"),
            Some(first.holder)
        );
        assert!(model.type_symbol(first.holder).is_static);
    }
}
