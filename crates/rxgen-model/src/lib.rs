//! rxgen Program Model
//!
//! This crate provides the read-only view of an analyzed program that the
//! rxgen event generator works against. It includes:
//!
//! - [`SymbolQuery`]: The query surface the generator consumes
//! - [`ProgramModel`]: An arena-backed implementation of that surface
//! - [`ModelDocument`]: The serialized JSON form of a program
//! - [`CoreTypes`]: Well-known `System` types installed by default
//!
//! # Building a model by hand
//!
//! ```ignore
//! use rxgen_model::prelude::*;
//!
//! let mut builder = ProgramBuilder::with_core_library();
//! let core = *builder.core().unwrap();
//!
//! builder.add(
//!     TypeSymbol::class("Sample", "Foo")
//!         .with_event(EventSymbol::new("Changed", TypeRef::named(core.event_handler))),
//! )?;
//!
//! let model = builder.build();
//! ```
//!
//! # Loading a document
//!
//! ```ignore
//! let document = ModelDocument::from_file(Path::new("model.json"))?;
//! let model = ProgramModel::from_document(document)?;
//! ```

pub mod corlib;
pub mod document;
pub mod error;
pub mod program;
pub mod query;
pub mod symbol;

// Re-export main types
pub use corlib::CoreTypes;
pub use document::{
    AttributeArgDocument, AttributeDocument, EventDocument, InvocationDocument, ModelDocument,
    ParameterDocument, SignatureDocument, TypeDocument, TypeParameterDocument, TypeRefDocument,
};
pub use error::{ModelError, ModelResult};
pub use program::{ProgramBuilder, ProgramModel};
pub use query::SymbolQuery;
pub use symbol::{
    Accessibility, AttributeArg, AttributeData, EventSymbol, InvocationSite, Location,
    MethodSignature, ObsoleteInfo, Parameter, SpecialType, TypeId, TypeKind, TypeParameter,
    TypeRef, TypeSymbol, OBSOLETE_ATTRIBUTE,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::corlib::CoreTypes;
    pub use crate::document::ModelDocument;
    pub use crate::error::{ModelError, ModelResult};
    pub use crate::program::{ProgramBuilder, ProgramModel};
    pub use crate::query::SymbolQuery;
    pub use crate::symbol::{
        Accessibility, AttributeArg, AttributeData, EventSymbol, InvocationSite, Location,
        MethodSignature, Parameter, TypeId, TypeParameter, TypeRef, TypeSymbol,
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let builder = ProgramBuilder::with_core_library();
        assert!(builder.core().is_some());
        let model = builder.build();
        assert!(!model.is_empty());
    }
}
