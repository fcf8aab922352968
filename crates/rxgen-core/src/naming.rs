//! Name formatting for generated C# code.

use std::cmp::Ordering;

use rxgen_model::{SymbolQuery, TypeId, TypeRef, TypeSymbol};

use crate::synth::WrapperMode;

/// Reserved C# keywords. Contextual keywords are valid identifiers and
/// are not listed.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked", "class",
    "const", "continue", "decimal", "default", "delegate", "do", "double", "else", "enum", "event",
    "explicit", "extern", "false", "finally", "fixed", "float", "for", "foreach", "goto", "if",
    "implicit", "in", "int", "interface", "internal", "is", "lock", "long", "namespace", "new",
    "null", "object", "operator", "out", "override", "params", "private", "protected", "public",
    "readonly", "ref", "return", "sbyte", "sealed", "short", "sizeof", "stackalloc", "static",
    "string", "struct", "switch", "this", "throw", "true", "try", "typeof", "uint", "ulong",
    "unchecked", "unsafe", "ushort", "using", "virtual", "void", "volatile", "while",
];

/// Whether `name` is a reserved C# keyword.
pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.binary_search(&name).is_ok()
}

/// Prefix reserved keywords with `@` so they can be used as identifiers.
pub fn escape_identifier(name: &str) -> String {
    if is_keyword(name) {
        format!("@{}", name)
    } else {
        name.to_string()
    }
}

/// Render a type reference as fully qualified C# syntax.
///
/// Built-in types use their keyword; every other named type is prefixed
/// with `global::`. A reference carries only the type's own arguments, so
/// generic containing types are rendered open over their parameters.
pub fn type_display<Q: SymbolQuery + ?Sized>(query: &Q, ty: &TypeRef) -> String {
    match ty {
        TypeRef::Named { id, type_arguments } => {
            if let Some(special) = query.type_symbol(*id).special {
                return special.keyword().to_string();
            }
            format!("global::{}", nested_display(query, *id, type_arguments))
        }
        TypeRef::Parameter(name) => escape_identifier(name),
        TypeRef::Array { element, rank } => {
            let commas = ",".repeat(rank.saturating_sub(1) as usize);
            format!("{}[{}]", type_display(query, element), commas)
        }
        TypeRef::Nullable(inner) => format!("{}?", type_display(query, inner)),
    }
}

/// The open generic form of a declared type, e.g. `global::Sample.Foo<T>`.
pub fn definition_display<Q: SymbolQuery + ?Sized>(query: &Q, id: TypeId) -> String {
    let symbol = query.type_symbol(id);
    type_display(query, &TypeRef::generic(id, symbol.type_parameter_refs()))
}

/// A documentation `cref` for a declared type, e.g. `global::Sample.Foo{T}`.
pub fn cref<Q: SymbolQuery + ?Sized>(query: &Q, id: TypeId) -> String {
    format!("global::{}", cref_path(query, id))
}

fn cref_path<Q: SymbolQuery + ?Sized>(query: &Q, id: TypeId) -> String {
    let symbol = query.type_symbol(id);
    let mut name = scope_prefix(symbol, |outer| cref_path(query, outer));
    name.push_str(&symbol.name);
    if symbol.is_generic() {
        let params: Vec<&str> = symbol.type_parameters.iter().map(|p| p.name.as_str()).collect();
        name.push('{');
        name.push_str(&params.join(", "));
        name.push('}');
    }
    name
}

fn nested_display<Q: SymbolQuery + ?Sized>(query: &Q, id: TypeId, type_arguments: &[TypeRef]) -> String {
    let symbol = query.type_symbol(id);
    let mut name = scope_prefix(symbol, |outer| {
        nested_display(query, outer, &query.type_symbol(outer).type_parameter_refs())
    });
    name.push_str(&symbol.name);
    name.push_str(&argument_list(query, type_arguments));
    name
}

/// `Namespace.` or `Containing.` ahead of a type's simple name.
fn scope_prefix(symbol: &TypeSymbol, containing: impl FnOnce(TypeId) -> String) -> String {
    match symbol.containing_type {
        Some(outer) => format!("{}.", containing(outer)),
        None if symbol.namespace.is_empty() => String::new(),
        None => format!("{}.", symbol.namespace),
    }
}

fn argument_list<Q: SymbolQuery + ?Sized>(query: &Q, type_arguments: &[TypeRef]) -> String {
    if type_arguments.is_empty() {
        return String::new();
    }
    let args: Vec<String> = type_arguments.iter().map(|a| type_display(query, a)).collect();
    format!("<{}>", args.join(", "))
}

/// Generated wrapper class name for a type.
///
/// Nested types include their enclosing type names so wrappers for
/// `Outer.Inner` and `Inner` do not collide. Generic enclosing types add
/// their arity, keeping `Outer<T>.Inner` apart from `Outer.Inner`.
pub fn wrapper_name<Q: SymbolQuery + ?Sized>(query: &Q, id: TypeId) -> String {
    let mut parts = vec![query.type_symbol(id).name.clone()];
    let mut current = query.type_symbol(id).containing_type;
    while let Some(outer) = current {
        let symbol = query.type_symbol(outer);
        if symbol.is_generic() {
            parts.push(format!("{}_{}", symbol.name, symbol.arity()));
        } else {
            parts.push(symbol.name.clone());
        }
        current = symbol.containing_type;
    }
    parts.reverse();
    format!("Rx{}Events", parts.concat())
}

/// Namespace a type's wrapper is emitted into: the type's own namespace,
/// or its outermost containing type's namespace for nested types.
pub fn wrapper_namespace<Q: SymbolQuery + ?Sized>(query: &Q, id: TypeId) -> String {
    outermost(query, id).namespace.clone()
}

/// Fully qualified reference to a type's wrapper given the type's own
/// type arguments, e.g. `global::Sample.RxFooEvents<int>`. Parameters of
/// generic containing types come first, open.
pub fn wrapper_display<Q: SymbolQuery + ?Sized>(
    query: &Q,
    id: TypeId,
    type_arguments: &[TypeRef],
) -> String {
    let mut arguments: Vec<TypeRef> = match query.type_symbol(id).containing_type {
        Some(outer) => query
            .type_parameters_in_scope(outer)
            .iter()
            .map(|p| TypeRef::parameter(p.name.clone()))
            .collect(),
        None => Vec::new(),
    };
    arguments.extend(type_arguments.iter().cloned());

    let namespace = wrapper_namespace(query, id);
    let name = if namespace.is_empty() {
        format!("global::{}", wrapper_name(query, id))
    } else {
        format!("global::{}.{}", namespace, wrapper_name(query, id))
    };
    format!("{}{}", name, argument_list(query, &arguments))
}

/// Deterministic source file name for a type's generated wrapper.
///
/// `SourceClass<Namespace.Type>[-<T1>-<T2>]-<Static|Instance>Events.SourceGenerated.cs`
///
/// Each nesting level is followed by its own parameters, as in
/// `SourceClassSample.Outer-T.Inner-InstanceEvents.SourceGenerated.cs`.
pub fn file_name_hint<Q: SymbolQuery + ?Sized>(query: &Q, id: TypeId, mode: WrapperMode) -> String {
    let mut name = format!("SourceClass{}", hint_path(query, id));
    name.push('-');
    name.push_str(mode.file_suffix());
    name.push_str("Events.SourceGenerated.cs");
    name
}

fn hint_path<Q: SymbolQuery + ?Sized>(query: &Q, id: TypeId) -> String {
    let symbol = query.type_symbol(id);
    let mut name = scope_prefix(symbol, |outer| hint_path(query, outer));
    name.push_str(&symbol.name);
    for param in &symbol.type_parameters {
        name.push('-');
        name.push_str(&param.name);
    }
    name
}

/// Identity key for a type definition: its generic-erased metadata name.
pub fn definition_key<Q: SymbolQuery + ?Sized>(query: &Q, id: TypeId) -> String {
    query.metadata_name(id)
}

/// Ordinal ordering of type definitions by [`definition_key`].
pub fn compare_definitions<Q: SymbolQuery + ?Sized>(query: &Q, a: TypeId, b: TypeId) -> Ordering {
    definition_key(query, a).cmp(&definition_key(query, b))
}

fn outermost<'a, Q: SymbolQuery + ?Sized>(query: &'a Q, id: TypeId) -> &'a TypeSymbol {
    let mut symbol = query.type_symbol(id);
    while let Some(outer) = symbol.containing_type {
        symbol = query.type_symbol(outer);
    }
    symbol
}
