//! Arena-backed program model.

use std::collections::HashMap;

use dashmap::DashMap;
use tracing::debug;

use crate::corlib::{self, CoreTypes};
use crate::error::{ModelError, ModelResult};
use crate::query::SymbolQuery;
use crate::symbol::{AttributeData, InvocationSite, SpecialType, TypeId, TypeSymbol};

/// An immutable, analyzed program.
///
/// Types live in an arena indexed by [`TypeId`]. The model is `Send + Sync`
/// and may be shared between independent generation passes.
pub struct ProgramModel {
    types: Vec<TypeSymbol>,
    by_metadata_name: HashMap<String, TypeId>,
    special: HashMap<SpecialType, TypeId>,
    assembly_attributes: Vec<AttributeData>,
    invocations: Vec<InvocationSite>,
    core: Option<CoreTypes>,
    /// Memoized dotted names.
    qualified_names: DashMap<TypeId, String>,
}

impl ProgramModel {
    /// Start an empty model.
    pub fn builder() -> ProgramBuilder {
        ProgramBuilder::new()
    }

    /// Number of types in the model.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the model holds no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// All type ids, in insertion order.
    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        (0..self.types.len()).map(TypeId)
    }

    /// Well-known `System` types, when the model was built with them.
    pub fn core(&self) -> Option<&CoreTypes> {
        self.core.as_ref()
    }
}

impl SymbolQuery for ProgramModel {
    fn type_symbol(&self, id: TypeId) -> &TypeSymbol {
        &self.types[id.0]
    }

    fn resolve_metadata_name(&self, metadata_name: &str) -> Option<TypeId> {
        self.by_metadata_name.get(metadata_name).copied()
    }

    fn special_type(&self, special: SpecialType) -> Option<TypeId> {
        self.special.get(&special).copied()
    }

    fn assembly_attributes(&self) -> &[AttributeData] {
        &self.assembly_attributes
    }

    fn invocation_sites(&self) -> &[InvocationSite] {
        &self.invocations
    }

    fn qualified_name(&self, id: TypeId) -> String {
        if let Some(name) = self.qualified_names.get(&id) {
            return name.value().clone();
        }

        let symbol = self.type_symbol(id);
        let name = match symbol.containing_type {
            Some(outer) => format!("{}.{}", self.qualified_name(outer), symbol.name),
            None if symbol.namespace.is_empty() => symbol.name.clone(),
            None => format!("{}.{}", symbol.namespace, symbol.name),
        };
        self.qualified_names.insert(id, name.clone());
        name
    }
}

impl std::fmt::Debug for ProgramModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramModel")
            .field("types", &self.types.len())
            .field("assembly_attributes", &self.assembly_attributes.len())
            .field("invocations", &self.invocations.len())
            .finish()
    }
}

/// Builder for [`ProgramModel`].
///
/// # Example
///
/// ```ignore
/// let mut builder = ProgramBuilder::with_core_library();
/// let core = *builder.core().unwrap();
///
/// let foo = builder.add(
///     TypeSymbol::class("Sample", "Foo")
///         .with_event(EventSymbol::new("Changed", TypeRef::named(core.event_handler))),
/// )?;
///
/// let model = builder.build();
/// ```
#[derive(Default)]
pub struct ProgramBuilder {
    types: Vec<TypeSymbol>,
    by_metadata_name: HashMap<String, TypeId>,
    special: HashMap<SpecialType, TypeId>,
    assembly_attributes: Vec<AttributeData>,
    invocations: Vec<InvocationSite>,
    core: Option<CoreTypes>,
}

impl ProgramBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder preloaded with the well-known `System` types.
    pub fn with_core_library() -> Self {
        let mut builder = Self::new();
        let core = corlib::install(&mut builder);
        builder.core = Some(core);
        builder
    }

    /// Well-known `System` types, when installed.
    pub fn core(&self) -> Option<&CoreTypes> {
        self.core.as_ref()
    }

    /// Add a type. Fails when the metadata name is already taken.
    pub fn add(&mut self, symbol: TypeSymbol) -> ModelResult<TypeId> {
        let metadata_name = self.metadata_name_of(&symbol);
        if self.by_metadata_name.contains_key(&metadata_name) {
            return Err(ModelError::DuplicateType(metadata_name));
        }
        Ok(self.push(metadata_name, symbol))
    }

    /// Insert without the duplicate check; the caller guarantees a fresh name.
    pub(crate) fn push_unique(&mut self, symbol: TypeSymbol) -> TypeId {
        let metadata_name = self.metadata_name_of(&symbol);
        self.push(metadata_name, symbol)
    }

    fn push(&mut self, metadata_name: String, symbol: TypeSymbol) -> TypeId {
        let id = TypeId(self.types.len());
        if let Some(special) = symbol.special {
            self.special.insert(special, id);
        }
        debug!(id = id.0, name = %metadata_name, "Added type");
        self.by_metadata_name.insert(metadata_name, id);
        self.types.push(symbol);
        id
    }

    /// Whether a metadata name is already present.
    pub fn contains(&self, metadata_name: &str) -> bool {
        self.by_metadata_name.contains_key(metadata_name)
    }

    /// Resolve a metadata name among the types added so far.
    pub fn resolve(&self, metadata_name: &str) -> Option<TypeId> {
        self.by_metadata_name.get(metadata_name).copied()
    }

    /// Access a type added earlier.
    pub fn symbol(&self, id: TypeId) -> &TypeSymbol {
        &self.types[id.0]
    }

    pub(crate) fn symbol_mut(&mut self, id: TypeId) -> &mut TypeSymbol {
        &mut self.types[id.0]
    }

    /// Record a resolved invocation.
    pub fn add_invocation(&mut self, site: InvocationSite) -> &mut Self {
        self.invocations.push(site);
        self
    }

    /// Record an assembly-level attribute.
    pub fn add_assembly_attribute(&mut self, attribute: AttributeData) -> &mut Self {
        self.assembly_attributes.push(attribute);
        self
    }

    /// Finish the model.
    pub fn build(self) -> ProgramModel {
        debug!(
            types = self.types.len(),
            invocations = self.invocations.len(),
            assembly_attributes = self.assembly_attributes.len(),
            "Built program model"
        );

        ProgramModel {
            types: self.types,
            by_metadata_name: self.by_metadata_name,
            special: self.special,
            assembly_attributes: self.assembly_attributes,
            invocations: self.invocations,
            core: self.core,
            qualified_names: DashMap::new(),
        }
    }

    fn metadata_name_of(&self, symbol: &TypeSymbol) -> String {
        match symbol.containing_type {
            Some(outer) => {
                let outer = &self.types[outer.0];
                format!("{}+{}", self.metadata_name_of(outer), symbol.metadata_simple_name())
            }
            None if symbol.namespace.is_empty() => symbol.metadata_simple_name(),
            None => format!("{}.{}", symbol.namespace, symbol.metadata_simple_name()),
        }
    }
}

impl std::fmt::Debug for ProgramBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramBuilder")
            .field("types", &self.types.len())
            .field("has_core", &self.core.is_some())
            .finish()
    }
}
