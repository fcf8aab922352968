//! Serialized program model documents.
//!
//! A document is the JSON form a front-end hands to the generator. Types
//! reference each other by metadata name (``System.EventHandler`1``) or by
//! C# keyword (`int`, `object`), so a document can be written by hand.
//!
//! ```json
//! {
//!   "types": [
//!     {
//!       "namespace": "Sample",
//!       "name": "Foo",
//!       "events": [{ "name": "Changed", "type": "System.EventHandler" }]
//!     }
//!   ],
//!   "invocations": [
//!     {
//!       "method": "Events",
//!       "containing_type": "ObservableEvents.ObservableGeneratorExtensions",
//!       "type_arguments": ["Sample.Foo"]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ModelError, ModelResult};
use crate::program::{ProgramBuilder, ProgramModel};
use crate::symbol::{
    Accessibility, AttributeArg, AttributeData, EventSymbol, InvocationSite, Location,
    MethodSignature, Parameter, SpecialType, TypeId, TypeKind, TypeParameter, TypeRef, TypeSymbol,
};

/// Root of a model document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDocument {
    /// Declared types.
    #[serde(default)]
    pub types: Vec<TypeDocument>,
    /// Assembly-level attributes.
    #[serde(default)]
    pub assembly_attributes: Vec<AttributeDocument>,
    /// Resolved invocations.
    #[serde(default)]
    pub invocations: Vec<InvocationDocument>,
}

/// A declared type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDocument {
    /// Dotted namespace.
    #[serde(default)]
    pub namespace: String,
    /// Simple name without arity suffix.
    pub name: String,
    /// Metadata name of the enclosing type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containing_type: Option<String>,
    /// Type kind.
    #[serde(default)]
    pub kind: TypeKind,
    /// Declared accessibility.
    #[serde(default)]
    pub accessibility: Accessibility,
    /// `static`
    #[serde(default)]
    pub is_static: bool,
    /// `abstract`
    #[serde(default)]
    pub is_abstract: bool,
    /// `sealed`
    #[serde(default)]
    pub is_sealed: bool,
    /// Generic parameters.
    #[serde(default)]
    pub type_parameters: Vec<TypeParameterDocument>,
    /// Base class.
    #[serde(default, rename = "base", skip_serializing_if = "Option::is_none")]
    pub base_type: Option<TypeRefDocument>,
    /// Declared events.
    #[serde(default)]
    pub events: Vec<EventDocument>,
    /// Applied attributes.
    #[serde(default)]
    pub attributes: Vec<AttributeDocument>,
    /// Invoke signature, for delegates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoke: Option<SignatureDocument>,
    /// Declaration location.
    #[serde(default)]
    pub location: Location,
}

/// A generic parameter and its constraints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeParameterDocument {
    /// Parameter name.
    pub name: String,
    /// `class` constraint.
    #[serde(default)]
    pub reference_type: bool,
    /// `struct` constraint.
    #[serde(default)]
    pub value_type: bool,
    /// `new()` constraint.
    #[serde(default)]
    pub constructor: bool,
    /// Type constraints.
    #[serde(default)]
    pub types: Vec<TypeRefDocument>,
}

/// A type reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeRefDocument {
    /// A metadata name, a C# keyword, or a type parameter in scope.
    Name(String),
    /// A constructed generic type.
    Generic {
        /// Metadata name of the generic definition.
        name: String,
        /// Type arguments.
        arguments: Vec<TypeRefDocument>,
    },
    /// An array type.
    Array {
        /// Element type.
        array: Box<TypeRefDocument>,
        /// Rank, defaults to 1.
        #[serde(default = "default_rank")]
        rank: u32,
    },
    /// A nullable type.
    Nullable {
        /// Wrapped type.
        nullable: Box<TypeRefDocument>,
    },
}

fn default_rank() -> u32 {
    1
}

/// An event declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDocument {
    /// Event name.
    pub name: String,
    /// Delegate type.
    #[serde(rename = "type")]
    pub delegate: TypeRefDocument,
    /// Declared accessibility.
    #[serde(default)]
    pub accessibility: Accessibility,
    /// `static`
    #[serde(default)]
    pub is_static: bool,
    /// Applied attributes.
    #[serde(default)]
    pub attributes: Vec<AttributeDocument>,
}

/// A delegate invoke signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureDocument {
    /// Return type; `void` when omitted.
    #[serde(default, rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRefDocument>,
    /// Parameters.
    #[serde(default)]
    pub parameters: Vec<ParameterDocument>,
}

/// A parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDocument {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    #[serde(rename = "type")]
    pub ty: TypeRefDocument,
}

/// An applied attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDocument {
    /// Metadata name of the attribute class.
    pub name: String,
    /// Positional arguments.
    #[serde(default)]
    pub arguments: Vec<AttributeArgDocument>,
    /// Application location.
    #[serde(default)]
    pub location: Location,
}

/// A positional attribute argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeArgDocument {
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// String literal.
    String(String),
    /// `typeof(T)`
    Type {
        /// The referenced type.
        #[serde(rename = "type")]
        ty: TypeRefDocument,
    },
    /// `null`
    Null,
}

/// A resolved invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationDocument {
    /// Invoked method name.
    pub method: String,
    /// Containing type of the bound method, absent when binding failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containing_type: Option<String>,
    /// Method type arguments.
    #[serde(default)]
    pub type_arguments: Vec<TypeRefDocument>,
    /// Invocation location.
    #[serde(default)]
    pub location: Location,
}

impl ModelDocument {
    /// Parse a document from JSON text.
    pub fn from_json(text: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a document file.
    pub fn from_file(path: &Path) -> ModelResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let document = Self::from_json(&text)?;
        info!(
            path = %path.display(),
            types = document.types.len(),
            invocations = document.invocations.len(),
            "Loaded model document"
        );
        Ok(document)
    }
}

impl ProgramModel {
    /// Build a model from the core library plus a document.
    pub fn from_document(document: ModelDocument) -> ModelResult<Self> {
        let mut builder = ProgramBuilder::with_core_library();
        builder.load_document(document)?;
        Ok(builder.build())
    }
}

impl ProgramBuilder {
    /// Add every type, attribute and invocation from a document.
    ///
    /// References may point at types added earlier or at any type in the
    /// same document, regardless of order.
    pub fn load_document(&mut self, document: ModelDocument) -> ModelResult<()> {
        let ids = self.declare_types(&document.types)?;

        for (doc, &id) in document.types.iter().zip(&ids) {
            let scope = self.type_parameter_scope(id);
            let context = doc.name.as_str();

            let mut type_parameters = Vec::with_capacity(doc.type_parameters.len());
            for param in &doc.type_parameters {
                type_parameters.push(TypeParameter {
                    name: param.name.clone(),
                    reference_type: param.reference_type,
                    value_type: param.value_type,
                    constructor: param.constructor,
                    constraint_types: param
                        .types
                        .iter()
                        .map(|t| self.resolve_ref(t, &scope, context))
                        .collect::<ModelResult<_>>()?,
                });
            }

            let base_type = doc
                .base_type
                .as_ref()
                .map(|b| self.resolve_ref(b, &scope, context))
                .transpose()?;

            let mut events = Vec::with_capacity(doc.events.len());
            for event in &doc.events {
                events.push(EventSymbol {
                    name: event.name.clone(),
                    delegate: self.resolve_ref(&event.delegate, &scope, context)?,
                    accessibility: event.accessibility,
                    is_static: event.is_static,
                    attributes: self.resolve_attributes(&event.attributes, &scope, context)?,
                });
            }

            let attributes = self.resolve_attributes(&doc.attributes, &scope, context)?;

            let invoke = match &doc.invoke {
                Some(signature) => Some(self.resolve_signature(signature, &scope, context)?),
                None => None,
            };

            let symbol = self.symbol_mut(id);
            symbol.type_parameters = type_parameters;
            symbol.base_type = base_type;
            symbol.events = events;
            symbol.attributes = attributes;
            symbol.invoke = invoke;
        }

        for attribute in &document.assembly_attributes {
            let resolved = self.resolve_attribute(attribute, &[], "assembly")?;
            self.add_assembly_attribute(resolved);
        }

        for invocation in &document.invocations {
            let context = format!("invocation of '{}'", invocation.method);
            let containing_type = invocation
                .containing_type
                .as_deref()
                .map(|name| self.resolve_name(name, &context))
                .transpose()?;
            let type_arguments = invocation
                .type_arguments
                .iter()
                .map(|t| self.resolve_ref(t, &[], &context))
                .collect::<ModelResult<Vec<_>>>()?;
            self.add_invocation(InvocationSite {
                method_name: invocation.method.clone(),
                containing_type,
                type_arguments,
                location: invocation.location.clone(),
            });
        }

        debug!(types = ids.len(), "Loaded document into builder");
        Ok(())
    }

    /// Add header symbols for every document type so that references
    /// resolve regardless of declaration order. Enclosing types must be
    /// declared before the types nested in them.
    fn declare_types(&mut self, types: &[TypeDocument]) -> ModelResult<Vec<TypeId>> {
        let mut ids = Vec::with_capacity(types.len());
        for doc in types {
            if doc.name.is_empty() {
                return Err(ModelError::InvalidDocument(
                    "type declared without a name".to_string(),
                ));
            }
            if doc.kind == TypeKind::Delegate && doc.invoke.is_none() {
                return Err(ModelError::InvalidDocument(format!(
                    "delegate '{}' has no invoke signature",
                    doc.name
                )));
            }

            let containing_type = doc
                .containing_type
                .as_deref()
                .map(|name| self.resolve_name(name, &doc.name))
                .transpose()?;

            let mut symbol = TypeSymbol::new(doc.kind, doc.namespace.clone(), doc.name.clone())
                .with_accessibility(doc.accessibility)
                .with_static(doc.is_static)
                .with_abstract(doc.is_abstract)
                .with_sealed(doc.is_sealed)
                .with_location(doc.location.clone());
            symbol.containing_type = containing_type;
            // Parameter names are needed up front for the arity suffix.
            symbol.type_parameters = doc
                .type_parameters
                .iter()
                .map(|p| TypeParameter::new(p.name.clone()))
                .collect();

            ids.push(self.add(symbol)?);
        }
        Ok(ids)
    }

    fn type_parameter_scope(&self, id: TypeId) -> Vec<String> {
        let mut scope = Vec::new();
        let mut current = Some(id);
        while let Some(id) = current {
            let symbol = self.symbol(id);
            scope.extend(symbol.type_parameters.iter().map(|p| p.name.clone()));
            current = symbol.containing_type;
        }
        scope
    }

    fn resolve_name(&self, name: &str, context: &str) -> ModelResult<TypeId> {
        self.resolve(name).ok_or_else(|| ModelError::UnknownType {
            name: name.to_string(),
            context: context.to_string(),
        })
    }

    fn resolve_ref(
        &self,
        doc: &TypeRefDocument,
        scope: &[String],
        context: &str,
    ) -> ModelResult<TypeRef> {
        match doc {
            TypeRefDocument::Name(name) => {
                if scope.iter().any(|p| p == name) {
                    return Ok(TypeRef::Parameter(name.clone()));
                }
                if let Some(special) = SpecialType::from_keyword(name) {
                    let metadata_name = format!("System.{}", special.system_name());
                    return Ok(TypeRef::named(self.resolve_name(&metadata_name, context)?));
                }
                Ok(TypeRef::named(self.resolve_name(name, context)?))
            }
            TypeRefDocument::Generic { name, arguments } => {
                let id = self.resolve_name(name, context)?;
                let arity = self.symbol(id).arity();
                if arity != arguments.len() {
                    return Err(ModelError::InvalidDocument(format!(
                        "'{}' expects {} type arguments but {} were given in {}",
                        name,
                        arity,
                        arguments.len(),
                        context
                    )));
                }
                let type_arguments = arguments
                    .iter()
                    .map(|a| self.resolve_ref(a, scope, context))
                    .collect::<ModelResult<Vec<_>>>()?;
                Ok(TypeRef::generic(id, type_arguments))
            }
            TypeRefDocument::Array { array, rank } => Ok(TypeRef::Array {
                element: Box::new(self.resolve_ref(array, scope, context)?),
                rank: (*rank).max(1),
            }),
            TypeRefDocument::Nullable { nullable } => Ok(TypeRef::nullable(
                self.resolve_ref(nullable, scope, context)?,
            )),
        }
    }

    fn resolve_signature(
        &self,
        doc: &SignatureDocument,
        scope: &[String],
        context: &str,
    ) -> ModelResult<MethodSignature> {
        let return_type = match &doc.return_type {
            Some(ty) => self.resolve_ref(ty, scope, context)?,
            None => self.resolve_ref(&TypeRefDocument::Name("void".to_string()), scope, context)?,
        };
        let parameters = doc
            .parameters
            .iter()
            .map(|p| -> ModelResult<Parameter> {
                Ok(Parameter::new(p.name.clone(), self.resolve_ref(&p.ty, scope, context)?))
            })
            .collect::<ModelResult<Vec<_>>>()?;
        Ok(MethodSignature::new(return_type, parameters))
    }

    fn resolve_attributes(
        &self,
        docs: &[AttributeDocument],
        scope: &[String],
        context: &str,
    ) -> ModelResult<Vec<AttributeData>> {
        docs.iter()
            .map(|a| self.resolve_attribute(a, scope, context))
            .collect()
    }

    fn resolve_attribute(
        &self,
        doc: &AttributeDocument,
        scope: &[String],
        context: &str,
    ) -> ModelResult<AttributeData> {
        let mut attribute = AttributeData::new(doc.name.clone()).with_location(doc.location.clone());
        for arg in &doc.arguments {
            let resolved = match arg {
                AttributeArgDocument::Bool(value) => AttributeArg::Bool(*value),
                AttributeArgDocument::Int(value) => AttributeArg::Int(*value),
                AttributeArgDocument::String(value) => AttributeArg::String(value.clone()),
                AttributeArgDocument::Type { ty } => {
                    AttributeArg::Type(self.resolve_ref(ty, scope, context)?)
                }
                AttributeArgDocument::Null => AttributeArg::Null,
            };
            attribute.arguments.push(resolved);
        }
        Ok(attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SymbolQuery;

    const SAMPLE: &str = r#"
    {
        "types": [
            {
                "namespace": "Sample",
                "name": "Derived",
                "type_parameters": [{ "name": "T", "reference_type": true }],
                "base": { "name": "Sample.Base`1", "arguments": ["T"] },
                "events": [
                    { "name": "Pair", "type": { "name": "System.Action`2", "arguments": ["int", "string"] } }
                ]
            },
            {
                "namespace": "Sample",
                "name": "Base",
                "type_parameters": [{ "name": "TItem" }],
                "events": [
                    {
                        "name": "Changed",
                        "type": "System.EventHandler",
                        "attributes": [{ "name": "System.ObsoleteAttribute", "arguments": ["Use Updated", false] }]
                    }
                ]
            },
            {
                "namespace": "Sample",
                "name": "Ticker",
                "is_static": true,
                "events": [{ "name": "Tick", "type": "System.EventHandler", "is_static": true }]
            }
        ],
        "assembly_attributes": [
            {
                "name": "ObservableEvents.GenerateStaticEventObservablesAttribute",
                "arguments": [{ "type": "Sample.Ticker" }],
                "location": { "file": "AssemblyInfo.cs", "line": 3, "column": 12 }
            }
        ],
        "invocations": [
            {
                "method": "Events",
                "type_arguments": [{ "name": "Sample.Derived`1", "arguments": ["string"] }],
                "location": { "file": "Program.cs", "line": 10, "column": 5 }
            }
        ]
    }
    "#;

    #[test]
    fn test_document_loads_with_forward_references() {
        let doc = ModelDocument::from_json(SAMPLE).unwrap();
        let model = ProgramModel::from_document(doc).unwrap();

        let derived = model.resolve_metadata_name("Sample.Derived`1").unwrap();
        let base = model.resolve_metadata_name("Sample.Base`1").unwrap();

        assert_eq!(model.base_type_id(derived), Some(base));
        assert_eq!(
            model.base_type(derived).unwrap().type_arguments(),
            &[TypeRef::parameter("T")]
        );
        assert!(model.type_symbol(derived).type_parameters[0].reference_type);
    }

    #[test]
    fn test_document_event_attributes_and_keywords() {
        let model = ProgramModel::from_document(ModelDocument::from_json(SAMPLE).unwrap()).unwrap();
        let base = model.resolve_metadata_name("Sample.Base`1").unwrap();
        let changed = &model.events(base)[0];
        let obsolete = changed.obsolete().unwrap();
        assert_eq!(obsolete.message, "Use Updated");
        assert!(!obsolete.is_error);

        let derived = model.resolve_metadata_name("Sample.Derived`1").unwrap();
        let pair = &model.events(derived)[0];
        let invoke = model.delegate_invoke(&pair.delegate).unwrap();
        assert!(model.is_special(&invoke.parameters[0].ty, SpecialType::Int32));
        assert!(model.is_special(&invoke.parameters[1].ty, SpecialType::String));
    }

    #[test]
    fn test_document_triggers() {
        let model = ProgramModel::from_document(ModelDocument::from_json(SAMPLE).unwrap()).unwrap();
        let ticker = model.resolve_metadata_name("Sample.Ticker").unwrap();

        let attribute = &model.assembly_attributes()[0];
        assert_eq!(attribute.type_argument(), Some(&TypeRef::named(ticker)));
        assert_eq!(attribute.location.line, 3);

        let site = &model.invocation_sites()[0];
        assert_eq!(site.method_name, "Events");
        assert!(site.containing_type.is_none());
        assert_eq!(site.type_arguments.len(), 1);
    }

    #[test]
    fn test_unknown_reference_is_an_error() {
        let json = r#"{ "types": [ { "name": "Foo", "base": "Missing.Type" } ] }"#;
        let err = ProgramModel::from_document(ModelDocument::from_json(json).unwrap()).unwrap_err();
        assert!(matches!(err, ModelError::UnknownType { ref name, .. } if name == "Missing.Type"));
    }

    #[test]
    fn test_generic_arity_mismatch_is_an_error() {
        let json = r#"{ "types": [ { "name": "Foo", "events": [
            { "name": "E", "type": { "name": "System.EventHandler`1", "arguments": ["int", "int"] } }
        ] } ] }"#;
        let err = ProgramModel::from_document(ModelDocument::from_json(json).unwrap()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidDocument(_)));
    }

    #[test]
    fn test_delegate_without_invoke_is_an_error() {
        let json = r#"{ "types": [ { "name": "MyHandler", "kind": "delegate" } ] }"#;
        let err = ProgramModel::from_document(ModelDocument::from_json(json).unwrap()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidDocument(_)));
    }

    #[test]
    fn test_custom_delegate_defaults_to_void() {
        let json = r#"{ "types": [ { "namespace": "Sample", "name": "Handler", "kind": "delegate",
            "invoke": { "parameters": [ { "name": "value", "type": "double" } ] } } ] }"#;
        let model = ProgramModel::from_document(ModelDocument::from_json(json).unwrap()).unwrap();
        let id = model.resolve_metadata_name("Sample.Handler").unwrap();
        let invoke = model.type_symbol(id).invoke.as_ref().unwrap();
        assert!(model.is_special(&invoke.return_type, SpecialType::Void));
        assert_eq!(invoke.parameters[0].name, "value");
    }
}
