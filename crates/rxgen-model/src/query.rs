//! The read-only symbol query surface consumed by the generator.

use crate::symbol::{
    AttributeData, EventSymbol, InvocationSite, MethodSignature, SpecialType, TypeId,
    TypeParameter, TypeRef, TypeSymbol,
};

/// Read-only access to an analyzed program.
///
/// Implementations hand out [`TypeId`]s that are only meaningful to the
/// implementation that produced them. All queries are synchronous and
/// side-effect free.
pub trait SymbolQuery: Send + Sync {
    /// Look up a type by id.
    fn type_symbol(&self, id: TypeId) -> &TypeSymbol;

    /// Resolve a metadata name such as ``Sample.Outer+Inner`1``.
    fn resolve_metadata_name(&self, metadata_name: &str) -> Option<TypeId>;

    /// Resolve a built-in type.
    fn special_type(&self, special: SpecialType) -> Option<TypeId>;

    /// Attributes applied at assembly level.
    fn assembly_attributes(&self) -> &[AttributeData];

    /// Every resolved invocation in user code.
    fn invocation_sites(&self) -> &[InvocationSite];

    /// Base class reference of a type.
    fn base_type(&self, id: TypeId) -> Option<&TypeRef> {
        self.type_symbol(id).base_type.as_ref()
    }

    /// Base class definition of a type.
    fn base_type_id(&self, id: TypeId) -> Option<TypeId> {
        self.base_type(id).and_then(TypeRef::named_id)
    }

    /// Events declared directly on a type.
    fn events(&self, id: TypeId) -> &[EventSymbol] {
        &self.type_symbol(id).events
    }

    /// Attributes applied to a type.
    fn attributes(&self, id: TypeId) -> &[AttributeData] {
        &self.type_symbol(id).attributes
    }

    /// Resolve the invoke signature of a delegate type reference, with
    /// the delegate's type parameters replaced by the reference's type
    /// arguments. Returns `None` when the reference is not a delegate.
    fn delegate_invoke(&self, delegate: &TypeRef) -> Option<MethodSignature> {
        let delegate = delegate.without_nullable();
        let id = delegate.named_id()?;
        let symbol = self.type_symbol(id);
        let invoke = symbol.invoke.as_ref()?;
        Some(invoke.substitute(&symbol.type_parameters, delegate.type_arguments()))
    }

    /// Whether a reference names the given built-in type.
    fn is_special(&self, ty: &TypeRef, special: SpecialType) -> bool {
        ty.named_id()
            .map(|id| self.type_symbol(id).special == Some(special))
            .unwrap_or(false)
    }

    /// Type parameters visible inside a type: those of its containing
    /// types, outermost first, then its own.
    fn type_parameters_in_scope(&self, id: TypeId) -> Vec<TypeParameter> {
        let symbol = self.type_symbol(id);
        let mut parameters = match symbol.containing_type {
            Some(outer) => self.type_parameters_in_scope(outer),
            None => Vec::new(),
        };
        parameters.extend(symbol.type_parameters.iter().cloned());
        parameters
    }

    /// Metadata name: namespace, `+` between nesting levels, arity suffix.
    fn metadata_name(&self, id: TypeId) -> String {
        let symbol = self.type_symbol(id);
        match symbol.containing_type {
            Some(outer) => format!("{}+{}", self.metadata_name(outer), symbol.metadata_simple_name()),
            None if symbol.namespace.is_empty() => symbol.metadata_simple_name(),
            None => format!("{}.{}", symbol.namespace, symbol.metadata_simple_name()),
        }
    }

    /// Dotted source name without type arguments, e.g. `Sample.Outer.Inner`.
    fn qualified_name(&self, id: TypeId) -> String {
        let symbol = self.type_symbol(id);
        match symbol.containing_type {
            Some(outer) => format!("{}.{}", self.qualified_name(outer), symbol.name),
            None if symbol.namespace.is_empty() => symbol.name.clone(),
            None => format!("{}.{}", symbol.namespace, symbol.name),
        }
    }
}
