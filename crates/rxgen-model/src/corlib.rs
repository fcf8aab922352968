//! Well-known `System` types.
//!
//! Installs the subset of the base class library that event signatures
//! commonly reference: the keyword types, `EventArgs` and the standard
//! handler delegates, the `Action`/`Func` families, and the task types.

use crate::program::ProgramBuilder;
use crate::symbol::{
    MethodSignature, Parameter, SpecialType, TypeId, TypeKind, TypeParameter, TypeRef, TypeSymbol,
};

const SYSTEM: &str = "System";
const TASKS: &str = "System.Threading.Tasks";
const COMPONENT_MODEL: &str = "System.ComponentModel";

/// Ids of the installed `System` types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreTypes {
    /// `System.Object`
    pub object: TypeId,
    /// `System.Void`
    pub void: TypeId,
    /// `System.String`
    pub string: TypeId,
    /// `System.Boolean`
    pub boolean: TypeId,
    /// `System.Int32`
    pub int32: TypeId,
    /// `System.Int64`
    pub int64: TypeId,
    /// `System.Double`
    pub double: TypeId,
    /// `System.EventArgs`
    pub event_args: TypeId,
    /// `System.EventHandler`
    pub event_handler: TypeId,
    /// ``System.EventHandler`1``
    pub event_handler_t: TypeId,
    /// `System.Action`
    pub action: TypeId,
    /// ``System.Action`1``
    pub action_t1: TypeId,
    /// ``System.Action`2``
    pub action_t2: TypeId,
    /// ``System.Action`3``
    pub action_t3: TypeId,
    /// ``System.Func`1``
    pub func_t1: TypeId,
    /// `System.Threading.Tasks.Task`
    pub task: TypeId,
    /// ``System.Threading.Tasks.Task`1``
    pub task_t1: TypeId,
    /// `System.Threading.Tasks.ValueTask`
    pub value_task: TypeId,
    /// `System.ObsoleteAttribute`
    pub obsolete_attribute: TypeId,
    /// `System.ComponentModel.PropertyChangedEventArgs`
    pub property_changed_event_args: TypeId,
    /// `System.ComponentModel.PropertyChangedEventHandler`
    pub property_changed_event_handler: TypeId,
}

/// Metadata name of `System.Threading.Tasks.Task`.
pub const TASK: &str = "System.Threading.Tasks.Task";

/// Metadata name of `System.Threading.Tasks.ValueTask`.
pub const VALUE_TASK: &str = "System.Threading.Tasks.ValueTask";

/// Metadata name of `System.EventArgs`.
pub const EVENT_ARGS: &str = "System.EventArgs";

pub(crate) fn install(builder: &mut ProgramBuilder) -> CoreTypes {
    let mut keyword_ids = Vec::with_capacity(SpecialType::ALL.len());
    for special in SpecialType::ALL {
        let kind = if special.is_value_type() {
            TypeKind::Struct
        } else {
            TypeKind::Class
        };
        let mut symbol = TypeSymbol::new(kind, SYSTEM, special.system_name());
        symbol.special = Some(special);
        keyword_ids.push((special, builder.push_unique(symbol)));
    }
    let id_of = |special: SpecialType| {
        keyword_ids
            .iter()
            .find(|(s, _)| *s == special)
            .map(|(_, id)| *id)
            .unwrap_or(TypeId(0))
    };

    let object = id_of(SpecialType::Object);
    let void = TypeRef::named(id_of(SpecialType::Void));
    let object_ref = TypeRef::named(object);

    let event_args = builder.push_unique(TypeSymbol::class(SYSTEM, "EventArgs").with_base(object_ref.clone()));

    let event_handler = builder.push_unique(TypeSymbol::delegate(
        SYSTEM,
        "EventHandler",
        MethodSignature::new(
            void.clone(),
            vec![
                Parameter::new("sender", object_ref.clone()),
                Parameter::new("e", TypeRef::named(event_args)),
            ],
        ),
    ));

    let event_handler_t = builder.push_unique(
        TypeSymbol::delegate(
            SYSTEM,
            "EventHandler",
            MethodSignature::new(
                void.clone(),
                vec![
                    Parameter::new("sender", object_ref.clone()),
                    Parameter::new("e", TypeRef::parameter("TEventArgs")),
                ],
            ),
        )
        .with_type_parameter(TypeParameter::new("TEventArgs")),
    );

    let action = builder.push_unique(TypeSymbol::delegate(
        SYSTEM,
        "Action",
        MethodSignature::new(void.clone(), Vec::new()),
    ));

    let action_t1 = builder.push_unique(
        TypeSymbol::delegate(
            SYSTEM,
            "Action",
            MethodSignature::new(void.clone(), vec![Parameter::new("obj", TypeRef::parameter("T"))]),
        )
        .with_type_parameter(TypeParameter::new("T")),
    );

    let action_t2 = builder.push_unique(action_n(2, &void));
    let action_t3 = builder.push_unique(action_n(3, &void));

    let func_t1 = builder.push_unique(
        TypeSymbol::delegate(
            SYSTEM,
            "Func",
            MethodSignature::new(TypeRef::parameter("TResult"), Vec::new()),
        )
        .with_type_parameter(TypeParameter::new("TResult")),
    );

    let task = builder.push_unique(TypeSymbol::class(TASKS, "Task").with_base(object_ref.clone()));
    let task_t1 = builder.push_unique(
        TypeSymbol::class(TASKS, "Task")
            .with_type_parameter(TypeParameter::new("TResult"))
            .with_base(TypeRef::named(task)),
    );
    let value_task = builder.push_unique(TypeSymbol::structure(TASKS, "ValueTask"));

    let obsolete_attribute = builder.push_unique(
        TypeSymbol::class(SYSTEM, "ObsoleteAttribute")
            .with_base(object_ref.clone())
            .with_sealed(true),
    );

    let property_changed_event_args = builder.push_unique(
        TypeSymbol::class(COMPONENT_MODEL, "PropertyChangedEventArgs")
            .with_base(TypeRef::named(event_args)),
    );
    let property_changed_event_handler = builder.push_unique(TypeSymbol::delegate(
        COMPONENT_MODEL,
        "PropertyChangedEventHandler",
        MethodSignature::new(
            void,
            vec![
                Parameter::new("sender", object_ref),
                Parameter::new("e", TypeRef::named(property_changed_event_args)),
            ],
        ),
    ));

    CoreTypes {
        object,
        void: id_of(SpecialType::Void),
        string: id_of(SpecialType::String),
        boolean: id_of(SpecialType::Boolean),
        int32: id_of(SpecialType::Int32),
        int64: id_of(SpecialType::Int64),
        double: id_of(SpecialType::Double),
        event_args,
        event_handler,
        event_handler_t,
        action,
        action_t1,
        action_t2,
        action_t3,
        func_t1,
        task,
        task_t1,
        value_task,
        obsolete_attribute,
        property_changed_event_args,
        property_changed_event_handler,
    }
}

fn action_n(arity: usize, void: &TypeRef) -> TypeSymbol {
    let mut symbol = TypeSymbol::delegate(SYSTEM, "Action", MethodSignature::new(void.clone(), Vec::new()));
    let mut parameters = Vec::with_capacity(arity);
    for n in 1..=arity {
        let name = format!("T{}", n);
        parameters.push(Parameter::new(format!("arg{}", n), TypeRef::parameter(name.clone())));
        symbol.type_parameters.push(TypeParameter::new(name));
    }
    symbol.invoke = Some(MethodSignature::new(void.clone(), parameters));
    symbol
}
