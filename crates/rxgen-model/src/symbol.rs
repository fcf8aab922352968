//! Symbol types held by a program model.
//!
//! Symbols are plain data. Cross references between types go through
//! [`TypeId`] indices into the owning [`ProgramModel`](crate::ProgramModel)
//! arena, so a model can be shared across threads without reference
//! counting.

use serde::{Deserialize, Serialize};

/// Index of a type symbol inside its program model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub(crate) usize);

impl TypeId {
    /// Arena index of this type.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Reference type.
    #[default]
    Class,
    /// Value type.
    Struct,
    /// Interface.
    Interface,
    /// Delegate type; carries an invoke signature.
    Delegate,
    /// Enumeration.
    Enum,
}

/// Declared accessibility of a type or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// `public`
    #[default]
    Public,
    /// `internal`
    Internal,
    /// `protected`
    Protected,
    /// `protected internal`
    ProtectedInternal,
    /// `private protected`
    PrivateProtected,
    /// `private`
    Private,
}

/// Built-in types that have a language keyword or special meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialType {
    /// `System.Object`, the universal base type.
    Object,
    /// `System.Void`
    Void,
    /// `System.Boolean`
    Boolean,
    /// `System.Char`
    Char,
    /// `System.SByte`
    SByte,
    /// `System.Byte`
    Byte,
    /// `System.Int16`
    Int16,
    /// `System.UInt16`
    UInt16,
    /// `System.Int32`
    Int32,
    /// `System.UInt32`
    UInt32,
    /// `System.Int64`
    Int64,
    /// `System.UInt64`
    UInt64,
    /// `System.Single`
    Single,
    /// `System.Double`
    Double,
    /// `System.Decimal`
    Decimal,
    /// `System.String`
    String,
}

impl SpecialType {
    /// Every special type, in declaration order.
    pub const ALL: [SpecialType; 16] = [
        SpecialType::Object,
        SpecialType::Void,
        SpecialType::Boolean,
        SpecialType::Char,
        SpecialType::SByte,
        SpecialType::Byte,
        SpecialType::Int16,
        SpecialType::UInt16,
        SpecialType::Int32,
        SpecialType::UInt32,
        SpecialType::Int64,
        SpecialType::UInt64,
        SpecialType::Single,
        SpecialType::Double,
        SpecialType::Decimal,
        SpecialType::String,
    ];

    /// The C# keyword spelling of this type.
    pub fn keyword(self) -> &'static str {
        match self {
            SpecialType::Object => "object",
            SpecialType::Void => "void",
            SpecialType::Boolean => "bool",
            SpecialType::Char => "char",
            SpecialType::SByte => "sbyte",
            SpecialType::Byte => "byte",
            SpecialType::Int16 => "short",
            SpecialType::UInt16 => "ushort",
            SpecialType::Int32 => "int",
            SpecialType::UInt32 => "uint",
            SpecialType::Int64 => "long",
            SpecialType::UInt64 => "ulong",
            SpecialType::Single => "float",
            SpecialType::Double => "double",
            SpecialType::Decimal => "decimal",
            SpecialType::String => "string",
        }
    }

    /// The simple name of this type inside the `System` namespace.
    pub fn system_name(self) -> &'static str {
        match self {
            SpecialType::Object => "Object",
            SpecialType::Void => "Void",
            SpecialType::Boolean => "Boolean",
            SpecialType::Char => "Char",
            SpecialType::SByte => "SByte",
            SpecialType::Byte => "Byte",
            SpecialType::Int16 => "Int16",
            SpecialType::UInt16 => "UInt16",
            SpecialType::Int32 => "Int32",
            SpecialType::UInt32 => "UInt32",
            SpecialType::Int64 => "Int64",
            SpecialType::UInt64 => "UInt64",
            SpecialType::Single => "Single",
            SpecialType::Double => "Double",
            SpecialType::Decimal => "Decimal",
            SpecialType::String => "String",
        }
    }

    /// Look up a special type by its C# keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.keyword() == keyword)
    }

    /// Whether this is a value type.
    pub fn is_value_type(self) -> bool {
        !matches!(self, SpecialType::Object | SpecialType::String)
    }
}

/// A generic type parameter together with its constraints.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeParameter {
    /// Parameter name, e.g. `T`.
    pub name: String,
    /// `where T : class`
    pub reference_type: bool,
    /// `where T : struct`
    pub value_type: bool,
    /// `where T : new()`
    pub constructor: bool,
    /// `where T : IFoo, Bar`
    pub constraint_types: Vec<TypeRef>,
}

impl TypeParameter {
    /// Create an unconstrained type parameter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Require a reference type argument.
    pub fn with_class_constraint(mut self) -> Self {
        self.reference_type = true;
        self
    }

    /// Require a value type argument.
    pub fn with_struct_constraint(mut self) -> Self {
        self.value_type = true;
        self
    }

    /// Require a public parameterless constructor.
    pub fn with_new_constraint(mut self) -> Self {
        self.constructor = true;
        self
    }

    /// Require the argument to derive from or implement a type.
    pub fn with_constraint_type(mut self, ty: TypeRef) -> Self {
        self.constraint_types.push(ty);
        self
    }

    /// Whether any constraint applies.
    pub fn has_constraints(&self) -> bool {
        self.reference_type || self.value_type || self.constructor || !self.constraint_types.is_empty()
    }
}

/// A reference to a type as it appears in a signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A named type, optionally constructed with type arguments.
    Named {
        /// The referenced type definition.
        id: TypeId,
        /// Type arguments, empty for non-generic types.
        type_arguments: Vec<TypeRef>,
    },
    /// A reference to a type parameter in scope.
    Parameter(String),
    /// An array of the element type.
    Array {
        /// Element type.
        element: Box<TypeRef>,
        /// Array rank, 1 for `T[]`.
        rank: u32,
    },
    /// A nullable wrapper, `T?`.
    Nullable(Box<TypeRef>),
}

impl TypeRef {
    /// Reference a non-generic type.
    pub fn named(id: TypeId) -> Self {
        TypeRef::Named {
            id,
            type_arguments: Vec::new(),
        }
    }

    /// Reference a constructed generic type.
    pub fn generic(id: TypeId, type_arguments: Vec<TypeRef>) -> Self {
        TypeRef::Named { id, type_arguments }
    }

    /// Reference a type parameter by name.
    pub fn parameter(name: impl Into<String>) -> Self {
        TypeRef::Parameter(name.into())
    }

    /// A single-dimension array of `element`.
    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array {
            element: Box::new(element),
            rank: 1,
        }
    }

    /// `inner?`
    pub fn nullable(inner: TypeRef) -> Self {
        TypeRef::Nullable(Box::new(inner))
    }

    /// The referenced type definition, if this is a named reference.
    pub fn named_id(&self) -> Option<TypeId> {
        match self {
            TypeRef::Named { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Type arguments of a named reference.
    pub fn type_arguments(&self) -> &[TypeRef] {
        match self {
            TypeRef::Named { type_arguments, .. } => type_arguments,
            _ => &[],
        }
    }

    /// Whether this is a named type constructed with type arguments.
    pub fn is_constructed_generic(&self) -> bool {
        matches!(self, TypeRef::Named { type_arguments, .. } if !type_arguments.is_empty())
    }

    /// Strip a single nullable wrapper.
    pub fn without_nullable(&self) -> &TypeRef {
        match self {
            TypeRef::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Replace type parameters named in `parameters` by the matching
    /// entry of `arguments`. Parameters without a matching argument are
    /// left in place.
    pub fn substitute(&self, parameters: &[TypeParameter], arguments: &[TypeRef]) -> TypeRef {
        match self {
            TypeRef::Parameter(name) => parameters
                .iter()
                .position(|p| &p.name == name)
                .and_then(|index| arguments.get(index))
                .cloned()
                .unwrap_or_else(|| self.clone()),
            TypeRef::Named { id, type_arguments } => TypeRef::Named {
                id: *id,
                type_arguments: type_arguments
                    .iter()
                    .map(|arg| arg.substitute(parameters, arguments))
                    .collect(),
            },
            TypeRef::Array { element, rank } => TypeRef::Array {
                element: Box::new(element.substitute(parameters, arguments)),
                rank: *rank,
            },
            TypeRef::Nullable(inner) => {
                TypeRef::Nullable(Box::new(inner.substitute(parameters, arguments)))
            }
        }
    }
}

/// A named, typed method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub ty: TypeRef,
}

impl Parameter {
    /// Create a parameter.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A delegate's invoke signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Return type.
    pub return_type: TypeRef,
    /// Ordered parameters.
    pub parameters: Vec<Parameter>,
}

impl MethodSignature {
    /// Create a signature.
    pub fn new(return_type: TypeRef, parameters: Vec<Parameter>) -> Self {
        Self {
            return_type,
            parameters,
        }
    }

    /// Substitute type parameters through the whole signature.
    pub fn substitute(&self, parameters: &[TypeParameter], arguments: &[TypeRef]) -> Self {
        Self {
            return_type: self.return_type.substitute(parameters, arguments),
            parameters: self
                .parameters
                .iter()
                .map(|p| Parameter::new(p.name.clone(), p.ty.substitute(parameters, arguments)))
                .collect(),
        }
    }
}

/// A positional attribute constructor argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeArg {
    /// String literal.
    String(String),
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// `typeof(T)`
    Type(TypeRef),
    /// `null`
    Null,
}

/// An applied attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeData {
    /// Metadata name of the attribute class, e.g. `System.ObsoleteAttribute`.
    pub class_name: String,
    /// Positional constructor arguments.
    pub arguments: Vec<AttributeArg>,
    /// Where the attribute was applied.
    pub location: Location,
}

impl AttributeData {
    /// Create an attribute application without arguments.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            arguments: Vec::new(),
            location: Location::none(),
        }
    }

    /// Create a `[System.Obsolete(message, is_error)]` application.
    pub fn obsolete(message: impl Into<String>, is_error: bool) -> Self {
        Self::new(OBSOLETE_ATTRIBUTE)
            .with_argument(AttributeArg::String(message.into()))
            .with_argument(AttributeArg::Bool(is_error))
    }

    /// Append a positional argument.
    pub fn with_argument(mut self, argument: AttributeArg) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Set the application location.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// The first argument, when it is a `typeof` expression.
    pub fn type_argument(&self) -> Option<&TypeRef> {
        match self.arguments.first() {
            Some(AttributeArg::Type(ty)) => Some(ty),
            _ => None,
        }
    }
}

/// Metadata name of the deprecation attribute.
pub const OBSOLETE_ATTRIBUTE: &str = "System.ObsoleteAttribute";

/// Deprecation data carried by an `[Obsolete]` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObsoleteInfo {
    /// Deprecation message; may be empty.
    pub message: String,
    /// Whether use is a compile error rather than a warning.
    pub is_error: bool,
}

impl ObsoleteInfo {
    /// Extract deprecation data from an attribute list.
    pub fn from_attributes(attributes: &[AttributeData]) -> Option<Self> {
        let attribute = attributes.iter().find(|a| a.class_name == OBSOLETE_ATTRIBUTE)?;
        let message = match attribute.arguments.first() {
            Some(AttributeArg::String(message)) => message.clone(),
            _ => String::new(),
        };
        let is_error = matches!(attribute.arguments.get(1), Some(AttributeArg::Bool(true)));
        Some(Self { message, is_error })
    }
}

/// A source location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    /// Source file path, empty when unknown.
    #[serde(default)]
    pub file: String,
    /// One-based line.
    #[serde(default)]
    pub line: u32,
    /// One-based column.
    #[serde(default)]
    pub column: u32,
}

impl Location {
    /// Create a location.
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// The unknown location.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether this is the unknown location.
    pub fn is_none(&self) -> bool {
        self.file.is_empty()
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "<unknown>")
        } else {
            write!(f, "{}({},{})", self.file, self.line, self.column)
        }
    }
}

/// A resolved method invocation in user code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSite {
    /// Name of the invoked method.
    pub method_name: String,
    /// Containing type of the method the call bound to, if it bound.
    pub containing_type: Option<TypeId>,
    /// Method type arguments after inference.
    pub type_arguments: Vec<TypeRef>,
    /// Location of the invocation expression.
    pub location: Location,
}

/// An event declared on a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSymbol {
    /// Event name.
    pub name: String,
    /// The event's delegate type.
    pub delegate: TypeRef,
    /// Declared accessibility.
    pub accessibility: Accessibility,
    /// Whether the event is static.
    pub is_static: bool,
    /// Applied attributes.
    pub attributes: Vec<AttributeData>,
}

impl EventSymbol {
    /// Create a public instance event.
    pub fn new(name: impl Into<String>, delegate: TypeRef) -> Self {
        Self {
            name: name.into(),
            delegate,
            accessibility: Accessibility::Public,
            is_static: false,
            attributes: Vec::new(),
        }
    }

    /// Mark the event static.
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Set the declared accessibility.
    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    /// Apply an attribute.
    pub fn with_attribute(mut self, attribute: AttributeData) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Deprecation data, if the event is obsolete.
    pub fn obsolete(&self) -> Option<ObsoleteInfo> {
        ObsoleteInfo::from_attributes(&self.attributes)
    }
}

/// A declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSymbol {
    /// Simple name without arity suffix.
    pub name: String,
    /// Dotted namespace, empty for the global namespace.
    pub namespace: String,
    /// Enclosing type for nested types.
    pub containing_type: Option<TypeId>,
    /// Type kind.
    pub kind: TypeKind,
    /// Declared accessibility.
    pub accessibility: Accessibility,
    /// `static class`
    pub is_static: bool,
    /// `abstract`
    pub is_abstract: bool,
    /// `sealed`
    pub is_sealed: bool,
    /// Generic parameters declared on this type.
    pub type_parameters: Vec<TypeParameter>,
    /// Base class, if any.
    pub base_type: Option<TypeRef>,
    /// Declared events, in declaration order.
    pub events: Vec<EventSymbol>,
    /// Applied attributes.
    pub attributes: Vec<AttributeData>,
    /// Invoke signature, for delegate types.
    pub invoke: Option<MethodSignature>,
    /// Set for built-in keyword types.
    pub special: Option<SpecialType>,
    /// Declaration location.
    pub location: Location,
}

impl TypeSymbol {
    /// Create an empty type declaration.
    pub fn new(kind: TypeKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            containing_type: None,
            kind,
            accessibility: Accessibility::Public,
            is_static: false,
            is_abstract: false,
            is_sealed: false,
            type_parameters: Vec::new(),
            base_type: None,
            events: Vec::new(),
            attributes: Vec::new(),
            invoke: None,
            special: None,
            location: Location::none(),
        }
    }

    /// Create a class declaration.
    pub fn class(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(TypeKind::Class, namespace, name)
    }

    /// Create a struct declaration.
    pub fn structure(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(TypeKind::Struct, namespace, name)
    }

    /// Create a delegate declaration with its invoke signature.
    pub fn delegate(
        namespace: impl Into<String>,
        name: impl Into<String>,
        invoke: MethodSignature,
    ) -> Self {
        let mut symbol = Self::new(TypeKind::Delegate, namespace, name);
        symbol.invoke = Some(invoke);
        symbol
    }

    /// Add a generic parameter.
    pub fn with_type_parameter(mut self, parameter: TypeParameter) -> Self {
        self.type_parameters.push(parameter);
        self
    }

    /// Set the base class.
    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.base_type = Some(base);
        self
    }

    /// Declare an event.
    pub fn with_event(mut self, event: EventSymbol) -> Self {
        self.events.push(event);
        self
    }

    /// Apply an attribute.
    pub fn with_attribute(mut self, attribute: AttributeData) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Set the declared accessibility.
    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    /// Mark the type `static`.
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Mark the type `abstract`.
    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    /// Mark the type `sealed`.
    pub fn with_sealed(mut self, is_sealed: bool) -> Self {
        self.is_sealed = is_sealed;
        self
    }

    /// Nest this type inside another.
    pub fn nested_in(mut self, containing_type: TypeId) -> Self {
        self.containing_type = Some(containing_type);
        self
    }

    /// Set the declaration location.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Number of generic parameters declared directly on this type.
    pub fn arity(&self) -> usize {
        self.type_parameters.len()
    }

    /// Whether the type declares generic parameters.
    pub fn is_generic(&self) -> bool {
        !self.type_parameters.is_empty()
    }

    /// `Name` or ``Name`N`` for generic types.
    pub fn metadata_simple_name(&self) -> String {
        if self.is_generic() {
            format!("{}`{}", self.name, self.arity())
        } else {
            self.name.clone()
        }
    }

    /// References to this type's own parameters, in order.
    pub fn type_parameter_refs(&self) -> Vec<TypeRef> {
        self.type_parameters
            .iter()
            .map(|p| TypeRef::Parameter(p.name.clone()))
            .collect()
    }

    /// Deprecation data, if the type is obsolete.
    pub fn obsolete(&self) -> Option<ObsoleteInfo> {
        ObsoleteInfo::from_attributes(&self.attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_replaces_parameters_by_position() {
        let params = vec![TypeParameter::new("T1"), TypeParameter::new("T2")];
        let args = vec![TypeRef::named(TypeId(3)), TypeRef::named(TypeId(4))];

        let sig = MethodSignature::new(
            TypeRef::named(TypeId(0)),
            vec![
                Parameter::new("a", TypeRef::parameter("T2")),
                Parameter::new("b", TypeRef::array(TypeRef::parameter("T1"))),
                Parameter::new("c", TypeRef::parameter("U")),
            ],
        );

        let substituted = sig.substitute(&params, &args);
        assert_eq!(substituted.parameters[0].ty, TypeRef::named(TypeId(4)));
        assert_eq!(
            substituted.parameters[1].ty,
            TypeRef::array(TypeRef::named(TypeId(3)))
        );
        assert_eq!(substituted.parameters[2].ty, TypeRef::parameter("U"));
    }

    #[test]
    fn test_obsolete_info_from_attributes() {
        let attrs = vec![
            AttributeData::new("Sample.OtherAttribute"),
            AttributeData::obsolete("Use Bar", true),
        ];
        let info = ObsoleteInfo::from_attributes(&attrs).unwrap();
        assert_eq!(info.message, "Use Bar");
        assert!(info.is_error);

        let bare = vec![AttributeData::new(OBSOLETE_ATTRIBUTE)];
        let info = ObsoleteInfo::from_attributes(&bare).unwrap();
        assert!(info.message.is_empty());
        assert!(!info.is_error);
    }

    #[test]
    fn test_metadata_simple_name() {
        let plain = TypeSymbol::class("Sample", "Foo");
        assert_eq!(plain.metadata_simple_name(), "Foo");

        let generic = TypeSymbol::class("Sample", "Foo")
            .with_type_parameter(TypeParameter::new("T"))
            .with_type_parameter(TypeParameter::new("U"));
        assert_eq!(generic.metadata_simple_name(), "Foo`2");
    }

    #[test]
    fn test_special_type_keywords() {
        assert_eq!(SpecialType::from_keyword("int"), Some(SpecialType::Int32));
        assert_eq!(SpecialType::Object.keyword(), "object");
        assert!(SpecialType::from_keyword("Int32").is_none());
        assert!(!SpecialType::String.is_value_type());
    }

    #[test]
    fn test_location_display() {
        assert_eq!(Location::new("Foo.cs", 3, 9).to_string(), "Foo.cs(3,9)");
        assert_eq!(Location::none().to_string(), "<unknown>");
    }
}
