//! Event discovery.
//!
//! Collects the events of a type that can be exposed as observables. The
//! ancestor walk is an explicit loop over base-type ids; names are
//! recorded from the most derived type upward, and a recorded name hides
//! every ancestor event of the same name whether or not the recording
//! event itself qualified.

use std::collections::HashSet;

use rxgen_model::corlib::{TASK, VALUE_TASK};
use rxgen_model::{
    Accessibility, EventSymbol, MethodSignature, ObsoleteInfo, SpecialType, SymbolQuery, TypeId,
    TypeRef,
};
use tracing::{trace, warn};

/// Completion kind of an event delegate's return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    /// `void`
    Void,
    /// `System.Threading.Tasks.Task`
    Task,
    /// `System.Threading.Tasks.ValueTask`
    ValueTask,
}

/// An eligible event with its resolved invoke signature.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDescriptor {
    /// Event name.
    pub name: String,
    /// Type that declares the event.
    pub declaring_type: TypeId,
    /// The event's delegate type, with type arguments expressed in terms of
    /// the collected type's own parameters.
    pub delegate: TypeRef,
    /// Invoke signature of the delegate.
    pub invoke: MethodSignature,
    /// Completion kind of the invoke return type.
    pub return_kind: ReturnKind,
    /// Whether the event is static.
    pub is_static: bool,
    /// Declared accessibility. Always public for collected events.
    pub accessibility: Accessibility,
    /// Deprecation data from the event declaration.
    pub obsolete: Option<ObsoleteInfo>,
}

/// A type together with its eligible events, sorted and unique by name.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeEvents {
    type_id: TypeId,
    events: Vec<EventDescriptor>,
}

impl TypeEvents {
    /// The collected type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Events, sorted by name.
    pub fn events(&self) -> &[EventDescriptor] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events qualified.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Event names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|e| e.name.as_str())
    }

    /// Look up an event by name.
    pub fn get(&self, name: &str) -> Option<&EventDescriptor> {
        self.events.iter().find(|e| e.name == name)
    }
}

/// Collect the eligible events of `type_id`.
///
/// With `include_inherited`, ancestors that declare at least one eligible
/// event of the requested staticness are visited after the type itself.
pub fn collect<Q: SymbolQuery + ?Sized>(
    query: &Q,
    type_id: TypeId,
    include_inherited: bool,
    want_static: bool,
) -> TypeEvents {
    let root = query.type_symbol(type_id);
    let mut worklist = vec![(type_id, root.type_parameter_refs())];
    if include_inherited {
        worklist.extend(ancestors_with_events(query, type_id, want_static));
    }

    let mut seen = HashSet::new();
    let mut events = Vec::new();

    for (declaring_type, type_arguments) in &worklist {
        let symbol = query.type_symbol(*declaring_type);
        for event in &symbol.events {
            if !seen.insert(event.name.as_str()) {
                trace!(event = %event.name, "Hidden by a more derived declaration");
                continue;
            }

            let delegate = event.delegate.substitute(&symbol.type_parameters, type_arguments);
            if let Some(descriptor) =
                describe(query, *declaring_type, event, delegate, want_static)
            {
                events.push(descriptor);
            }
        }
    }

    events.sort_by(|a, b| a.name.cmp(&b.name));

    TypeEvents { type_id, events }
}

/// Whether a type itself declares at least one eligible event.
pub fn has_eligible_events<Q: SymbolQuery + ?Sized>(
    query: &Q,
    type_id: TypeId,
    want_static: bool,
) -> bool {
    let symbol = query.type_symbol(type_id);
    let mut seen = HashSet::new();
    symbol.events.iter().any(|event| {
        seen.insert(event.name.as_str())
            && describe(query, type_id, event, event.delegate.clone(), want_static).is_some()
    })
}

/// Ancestors of `type_id` that declare eligible events, most derived
/// first, each paired with its type arguments as seen from `type_id`.
pub fn ancestors_with_events<Q: SymbolQuery + ?Sized>(
    query: &Q,
    type_id: TypeId,
    want_static: bool,
) -> Vec<(TypeId, Vec<TypeRef>)> {
    let mut result = Vec::new();
    let mut visited = HashSet::from([type_id]);

    let mut current = type_id;
    let mut current_args = query.type_symbol(type_id).type_parameter_refs();

    while let Some(base_ref) = query.base_type(current) {
        let Some(base) = base_ref.named_id() else {
            break;
        };
        if !visited.insert(base) {
            warn!(
                type_name = %query.metadata_name(type_id),
                "Cycle in base type chain"
            );
            break;
        }

        let parameters = &query.type_symbol(current).type_parameters;
        let base_args: Vec<TypeRef> = base_ref
            .type_arguments()
            .iter()
            .map(|arg| arg.substitute(parameters, &current_args))
            .collect();

        if has_eligible_events(query, base, want_static) {
            result.push((base, base_args.clone()));
        }

        current = base;
        current_args = base_args;
    }

    result
}

fn describe<Q: SymbolQuery + ?Sized>(
    query: &Q,
    declaring_type: TypeId,
    event: &EventSymbol,
    delegate: TypeRef,
    want_static: bool,
) -> Option<EventDescriptor> {
    if event.accessibility != Accessibility::Public {
        return None;
    }
    if event.is_static != want_static {
        return None;
    }

    let invoke = query.delegate_invoke(&delegate)?;

    // Constructed generic returns such as Task<T> are not supported.
    if invoke.return_type.is_constructed_generic() {
        trace!(event = %event.name, "Skipping event with generic return type");
        return None;
    }
    let return_kind = return_kind(query, &invoke.return_type)?;

    Some(EventDescriptor {
        name: event.name.clone(),
        declaring_type,
        delegate,
        invoke,
        return_kind,
        is_static: event.is_static,
        accessibility: event.accessibility,
        obsolete: event.obsolete(),
    })
}

fn return_kind<Q: SymbolQuery + ?Sized>(query: &Q, return_type: &TypeRef) -> Option<ReturnKind> {
    if query.is_special(return_type, SpecialType::Void) {
        return Some(ReturnKind::Void);
    }
    let id = return_type.named_id()?;
    match query.metadata_name(id).as_str() {
        TASK => Some(ReturnKind::Task),
        VALUE_TASK => Some(ReturnKind::ValueTask),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxgen_model::{
        AttributeData, CoreTypes, EventSymbol, MethodSignature, Parameter, ProgramBuilder,
        ProgramModel, TypeParameter, TypeSymbol,
    };

    fn handler(core: &CoreTypes) -> TypeRef {
        TypeRef::named(core.event_handler)
    }

    fn model_with(
        build: impl FnOnce(&mut ProgramBuilder, CoreTypes) -> Vec<TypeId>,
    ) -> (ProgramModel, Vec<TypeId>, CoreTypes) {
        let mut builder = ProgramBuilder::with_core_library();
        let core = *builder.core().unwrap();
        let ids = build(&mut builder, core);
        (builder.build(), ids, core)
    }

    #[test]
    fn test_collect_sorts_by_name() {
        let (model, ids, _) = model_with(|b, core| {
            vec![
                b.add(
                    TypeSymbol::class("Sample", "Foo")
                        .with_event(EventSymbol::new("Zed", handler(&core)))
                        .with_event(EventSymbol::new("Alpha", handler(&core)))
                        .with_event(EventSymbol::new("Mid", handler(&core))),
                )
                .unwrap(),
            ]
        });

        let events = collect(&model, ids[0], true, false);
        assert_eq!(events.names().collect::<Vec<_>>(), ["Alpha", "Mid", "Zed"]);
    }

    #[test]
    fn test_collect_filters_visibility_and_staticness() {
        let (model, ids, _) = model_with(|b, core| {
            vec![
                b.add(
                    TypeSymbol::class("Sample", "Foo")
                        .with_event(EventSymbol::new("Public", handler(&core)))
                        .with_event(
                            EventSymbol::new("Hidden", handler(&core))
                                .with_accessibility(Accessibility::Internal),
                        )
                        .with_event(EventSymbol::new("Shared", handler(&core)).with_static(true)),
                )
                .unwrap(),
            ]
        });

        let instance = collect(&model, ids[0], false, false);
        assert_eq!(instance.names().collect::<Vec<_>>(), ["Public"]);

        let statics = collect(&model, ids[0], false, true);
        assert_eq!(statics.names().collect::<Vec<_>>(), ["Shared"]);
    }

    #[test]
    fn test_collect_return_kinds() {
        let (model, ids, _) = model_with(|b, core| {
            let async_handler = b
                .add(TypeSymbol::delegate(
                    "Sample",
                    "AsyncHandler",
                    MethodSignature::new(TypeRef::named(core.task), Vec::new()),
                ))
                .unwrap();
            let value_handler = b
                .add(TypeSymbol::delegate(
                    "Sample",
                    "ValueHandler",
                    MethodSignature::new(TypeRef::named(core.value_task), Vec::new()),
                ))
                .unwrap();
            let int_handler = b
                .add(TypeSymbol::delegate(
                    "Sample",
                    "IntHandler",
                    MethodSignature::new(TypeRef::named(core.int32), Vec::new()),
                ))
                .unwrap();
            vec![
                b.add(
                    TypeSymbol::class("Sample", "Foo")
                        .with_event(EventSymbol::new("Async", TypeRef::named(async_handler)))
                        .with_event(EventSymbol::new("Value", TypeRef::named(value_handler)))
                        .with_event(EventSymbol::new("Number", TypeRef::named(int_handler)))
                        .with_event(EventSymbol::new(
                            "Generic",
                            TypeRef::generic(
                                core.func_t1,
                                vec![TypeRef::generic(core.task_t1, vec![TypeRef::named(core.int32)])],
                            ),
                        )),
                )
                .unwrap(),
            ]
        });

        let events = collect(&model, ids[0], false, false);
        assert_eq!(events.names().collect::<Vec<_>>(), ["Async", "Value"]);
        assert_eq!(events.get("Async").unwrap().return_kind, ReturnKind::Task);
        assert_eq!(events.get("Value").unwrap().return_kind, ReturnKind::ValueTask);
    }

    #[test]
    fn test_collect_skips_unresolvable_delegate() {
        let (model, ids, _) = model_with(|b, core| {
            vec![
                b.add(
                    TypeSymbol::class("Sample", "Foo")
                        .with_event(EventSymbol::new("Broken", TypeRef::named(core.object)))
                        .with_event(EventSymbol::new("Fine", handler(&core))),
                )
                .unwrap(),
            ]
        });

        let events = collect(&model, ids[0], false, false);
        assert_eq!(events.names().collect::<Vec<_>>(), ["Fine"]);
    }

    #[test]
    fn test_collect_most_derived_wins() {
        let (model, ids, _) = model_with(|b, core| {
            let base = b
                .add(
                    TypeSymbol::class("Sample", "Base")
                        .with_event(EventSymbol::new("Changed", handler(&core)))
                        .with_event(EventSymbol::new("Closed", handler(&core))),
                )
                .unwrap();
            let derived = b
                .add(
                    TypeSymbol::class("Sample", "Derived")
                        .with_base(TypeRef::named(base))
                        .with_event(EventSymbol::new("Changed", handler(&core))),
                )
                .unwrap();
            vec![base, derived]
        });
        let (base, derived) = (ids[0], ids[1]);

        let events = collect(&model, derived, true, false);
        assert_eq!(events.names().collect::<Vec<_>>(), ["Changed", "Closed"]);
        assert_eq!(events.get("Changed").unwrap().declaring_type, derived);
        assert_eq!(events.get("Closed").unwrap().declaring_type, base);

        let own = collect(&model, derived, false, false);
        assert_eq!(own.names().collect::<Vec<_>>(), ["Changed"]);
    }

    #[test]
    fn test_collect_ineligible_derived_hides_ancestor() {
        let (model, ids, _) = model_with(|b, core| {
            let base = b
                .add(
                    TypeSymbol::class("Sample", "Base")
                        .with_event(EventSymbol::new("Changed", handler(&core))),
                )
                .unwrap();
            let derived = b
                .add(
                    TypeSymbol::class("Sample", "Derived")
                        .with_base(TypeRef::named(base))
                        .with_event(
                            EventSymbol::new("Changed", handler(&core))
                                .with_accessibility(Accessibility::Protected),
                        )
                        .with_event(EventSymbol::new("Other", handler(&core))),
                )
                .unwrap();
            vec![derived]
        });

        let events = collect(&model, ids[0], true, false);
        assert_eq!(events.names().collect::<Vec<_>>(), ["Other"]);
    }

    #[test]
    fn test_ancestor_walk_skips_bases_without_events() {
        let (model, ids, _) = model_with(|b, core| {
            let root = b
                .add(
                    TypeSymbol::class("Sample", "Root")
                        .with_event(EventSymbol::new("Ping", handler(&core))),
                )
                .unwrap();
            let middle = b
                .add(TypeSymbol::class("Sample", "Middle").with_base(TypeRef::named(root)))
                .unwrap();
            let leaf = b
                .add(TypeSymbol::class("Sample", "Leaf").with_base(TypeRef::named(middle)))
                .unwrap();
            vec![root, leaf]
        });

        let ancestors = ancestors_with_events(&model, ids[1], false);
        assert_eq!(ancestors.len(), 1);
        assert_eq!(ancestors[0].0, ids[0]);
    }

    #[test]
    fn test_ancestor_walk_substitutes_type_arguments() {
        let (model, ids, core) = model_with(|b, core| {
            let base = b
                .add(
                    TypeSymbol::class("Sample", "Base")
                        .with_type_parameter(TypeParameter::new("TItem"))
                        .with_event(EventSymbol::new(
                            "ItemAdded",
                            TypeRef::generic(core.event_handler_t, vec![TypeRef::parameter("TItem")]),
                        )),
                )
                .unwrap();
            let derived = b
                .add(
                    TypeSymbol::class("Sample", "Derived").with_base(TypeRef::generic(
                        base,
                        vec![TypeRef::named(core.string)],
                    )),
                )
                .unwrap();
            vec![derived]
        });

        let events = collect(&model, ids[0], true, false);
        let item_added = events.get("ItemAdded").unwrap();
        assert!(model.is_special(&item_added.invoke.parameters[1].ty, SpecialType::String));
        assert_eq!(
            item_added.delegate,
            TypeRef::generic(core.event_handler_t, vec![TypeRef::named(core.string)])
        );
    }

    #[test]
    fn test_obsolete_event_metadata() {
        let (model, ids, _) = model_with(|b, core| {
            vec![
                b.add(
                    TypeSymbol::class("Sample", "Foo").with_event(
                        EventSymbol::new("Old", handler(&core))
                            .with_attribute(AttributeData::obsolete("Use New", false)),
                    ),
                )
                .unwrap(),
            ]
        });

        let events = collect(&model, ids[0], false, false);
        let old = events.get("Old").unwrap();
        assert_eq!(old.obsolete.as_ref().unwrap().message, "Use New");
    }

    #[test]
    fn test_has_eligible_events() {
        let (model, ids, _) = model_with(|b, core| {
            let empty = b.add(TypeSymbol::class("Sample", "Empty")).unwrap();
            let custom = b
                .add(TypeSymbol::delegate(
                    "Sample",
                    "Custom",
                    MethodSignature::new(
                        TypeRef::named(core.void),
                        vec![Parameter::new("x", TypeRef::named(core.int32))],
                    ),
                ))
                .unwrap();
            let full = b
                .add(
                    TypeSymbol::class("Sample", "Full")
                        .with_event(EventSymbol::new("X", TypeRef::named(custom))),
                )
                .unwrap();
            vec![empty, full]
        });

        assert!(!has_eligible_events(&model, ids[0], false));
        assert!(has_eligible_events(&model, ids[1], false));
        assert!(!has_eligible_events(&model, ids[1], true));
    }
}
