//! Delegate signature classification.
//!
//! Maps an event's invoke signature onto the element type of the generated
//! observable and the expression the handler forwards to `OnNext`.

use rxgen_model::corlib::EVENT_ARGS;
use rxgen_model::{MethodSignature, SpecialType, SymbolQuery, TypeRef};
use serde::Serialize;

use crate::collector::EventDescriptor;

/// Argument pattern of a delegate signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentShape {
    /// No parameters.
    Empty,
    /// Two parameters, the first typed `object`.
    SenderAndSingleArg,
    /// Exactly one parameter.
    SingleArg,
    /// Two or more parameters not matching the sender pattern.
    MultiArg,
}

impl std::fmt::Display for ArgumentShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArgumentShape::Empty => "empty",
            ArgumentShape::SenderAndSingleArg => "sender+arg",
            ArgumentShape::SingleArg => "single",
            ArgumentShape::MultiArg => "multi",
        };
        f.write_str(name)
    }
}

/// Element type of the generated observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    /// The reactive unit type.
    Unit,
    /// A single parameter type.
    Type(TypeRef),
    /// A named tuple over the parameters, in declaration order.
    Tuple(Vec<(TypeRef, String)>),
}

/// What the generated handler passes to `OnNext`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Forwarding {
    /// The unit value.
    Unit,
    /// One handler parameter, by name.
    Parameter(String),
    /// A tuple of handler parameters, by name.
    Tuple(Vec<String>),
}

/// Result of classifying one signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// The matched argument pattern.
    pub shape: ArgumentShape,
    /// Observable element type.
    pub element: ElementType,
    /// Handler forwarding expression.
    pub forward: Forwarding,
}

/// Classify an invoke signature. Total over all signatures.
///
/// With `collapse_plain_event_args`, a sender pattern whose argument is
/// exactly `System.EventArgs` carries no payload and is forwarded as unit.
/// The reported shape is unchanged.
pub fn classify_signature<Q: SymbolQuery + ?Sized>(
    query: &Q,
    invoke: &MethodSignature,
    collapse_plain_event_args: bool,
) -> Classification {
    let params = &invoke.parameters;

    match params.len() {
        2 if query.is_special(params[0].ty.without_nullable(), SpecialType::Object) => {
            let arg = &params[1];
            if collapse_plain_event_args && is_plain_event_args(query, &arg.ty) {
                Classification {
                    shape: ArgumentShape::SenderAndSingleArg,
                    element: ElementType::Unit,
                    forward: Forwarding::Unit,
                }
            } else {
                Classification {
                    shape: ArgumentShape::SenderAndSingleArg,
                    element: ElementType::Type(arg.ty.clone()),
                    forward: Forwarding::Parameter(arg.name.clone()),
                }
            }
        }
        1 => Classification {
            shape: ArgumentShape::SingleArg,
            element: ElementType::Type(params[0].ty.clone()),
            forward: Forwarding::Parameter(params[0].name.clone()),
        },
        0 => Classification {
            shape: ArgumentShape::Empty,
            element: ElementType::Unit,
            forward: Forwarding::Unit,
        },
        _ => Classification {
            shape: ArgumentShape::MultiArg,
            element: ElementType::Tuple(
                params.iter().map(|p| (p.ty.clone(), p.name.clone())).collect(),
            ),
            forward: Forwarding::Tuple(params.iter().map(|p| p.name.clone()).collect()),
        },
    }
}

/// Classify a collected event.
pub fn classify<Q: SymbolQuery + ?Sized>(
    query: &Q,
    event: &EventDescriptor,
    collapse_plain_event_args: bool,
) -> Classification {
    classify_signature(query, &event.invoke, collapse_plain_event_args)
}

fn is_plain_event_args<Q: SymbolQuery + ?Sized>(query: &Q, ty: &TypeRef) -> bool {
    match ty {
        TypeRef::Named { id, type_arguments } if type_arguments.is_empty() => {
            query.metadata_name(*id) == EVENT_ARGS
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxgen_model::{CoreTypes, Parameter, ProgramBuilder, ProgramModel};

    fn model() -> (ProgramModel, CoreTypes) {
        let builder = ProgramBuilder::with_core_library();
        let core = *builder.core().unwrap();
        (builder.build(), core)
    }

    fn sig(params: Vec<Parameter>, core: &CoreTypes) -> MethodSignature {
        MethodSignature::new(TypeRef::named(core.void), params)
    }

    #[test]
    fn test_classify_empty() {
        let (model, core) = model();
        let c = classify_signature(&model, &sig(vec![], &core), true);
        assert_eq!(c.shape, ArgumentShape::Empty);
        assert_eq!(c.element, ElementType::Unit);
        assert_eq!(c.forward, Forwarding::Unit);
    }

    #[test]
    fn test_classify_sender_and_arg() {
        let (model, core) = model();
        let invoke = sig(
            vec![
                Parameter::new("sender", TypeRef::named(core.object)),
                Parameter::new("e", TypeRef::named(core.int32)),
            ],
            &core,
        );
        let c = classify_signature(&model, &invoke, true);
        assert_eq!(c.shape, ArgumentShape::SenderAndSingleArg);
        assert_eq!(c.element, ElementType::Type(TypeRef::named(core.int32)));
        assert_eq!(c.forward, Forwarding::Parameter("e".to_string()));
    }

    #[test]
    fn test_classify_nullable_sender() {
        // `void Handler(object? sender, int e)` from nullable-annotated code.
        let (model, core) = model();
        let invoke = sig(
            vec![
                Parameter::new("sender", TypeRef::nullable(TypeRef::named(core.object))),
                Parameter::new("e", TypeRef::named(core.int32)),
            ],
            &core,
        );
        let c = classify_signature(&model, &invoke, true);
        assert_eq!(c.shape, ArgumentShape::SenderAndSingleArg);
        assert_eq!(c.element, ElementType::Type(TypeRef::named(core.int32)));
        assert_eq!(c.forward, Forwarding::Parameter("e".to_string()));
    }

    #[test]
    fn test_classify_sender_heuristic_ignores_convention() {
        // Any (object, X) pair matches, whatever the parameter names say.
        let (model, core) = model();
        let invoke = sig(
            vec![
                Parameter::new("payload", TypeRef::named(core.object)),
                Parameter::new("count", TypeRef::named(core.string)),
            ],
            &core,
        );
        let c = classify_signature(&model, &invoke, true);
        assert_eq!(c.shape, ArgumentShape::SenderAndSingleArg);
        assert_eq!(c.forward, Forwarding::Parameter("count".to_string()));
    }

    #[test]
    fn test_classify_plain_event_args_collapse() {
        let (model, core) = model();
        let invoke = model.delegate_invoke(&TypeRef::named(core.event_handler)).unwrap();

        let collapsed = classify_signature(&model, &invoke, true);
        assert_eq!(collapsed.shape, ArgumentShape::SenderAndSingleArg);
        assert_eq!(collapsed.element, ElementType::Unit);
        assert_eq!(collapsed.forward, Forwarding::Unit);

        let raw = classify_signature(&model, &invoke, false);
        assert_eq!(raw.shape, ArgumentShape::SenderAndSingleArg);
        assert_eq!(raw.element, ElementType::Type(TypeRef::named(core.event_args)));
    }

    #[test]
    fn test_classify_derived_event_args_not_collapsed() {
        let (model, core) = model();
        let invoke = model
            .delegate_invoke(&TypeRef::named(core.property_changed_event_handler))
            .unwrap();
        let c = classify_signature(&model, &invoke, true);
        assert_eq!(
            c.element,
            ElementType::Type(TypeRef::named(core.property_changed_event_args))
        );
    }

    #[test]
    fn test_classify_single_arg() {
        let (model, core) = model();
        let invoke = sig(vec![Parameter::new("obj", TypeRef::named(core.object))], &core);
        let c = classify_signature(&model, &invoke, true);
        assert_eq!(c.shape, ArgumentShape::SingleArg);
        assert_eq!(c.element, ElementType::Type(TypeRef::named(core.object)));
    }

    #[test]
    fn test_classify_multi_arg() {
        let (model, core) = model();
        let invoke = model
            .delegate_invoke(&TypeRef::generic(
                core.action_t2,
                vec![TypeRef::named(core.int32), TypeRef::named(core.string)],
            ))
            .unwrap();
        let c = classify_signature(&model, &invoke, true);
        assert_eq!(c.shape, ArgumentShape::MultiArg);
        assert_eq!(
            c.element,
            ElementType::Tuple(vec![
                (TypeRef::named(core.int32), "arg1".to_string()),
                (TypeRef::named(core.string), "arg2".to_string()),
            ])
        );
        assert_eq!(
            c.forward,
            Forwarding::Tuple(vec!["arg1".to_string(), "arg2".to_string()])
        );
    }

    #[test]
    fn test_classify_three_params_with_object_first_is_multi() {
        let (model, core) = model();
        let invoke = sig(
            vec![
                Parameter::new("sender", TypeRef::named(core.object)),
                Parameter::new("a", TypeRef::named(core.int32)),
                Parameter::new("b", TypeRef::named(core.int32)),
            ],
            &core,
        );
        assert_eq!(
            classify_signature(&model, &invoke, true).shape,
            ArgumentShape::MultiArg
        );
    }
}
