//! Generation pass orchestration.
//!
//! A pass finds the wrap requests in a program, builds the wrappers for
//! each requested type and hands every unit to the host:
//!
//! ```text
//! discover ──▶ dedupe + sort ──▶ per type: collect ▶ synthesize ▶ deliver ──▶ extensions
//! ```
//!
//! Per-type failures become diagnostics, including output the host refuses
//! to add. Only a missing extension holder and cancellation stop a pass.

use std::any::Any;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use rxgen_core::bootstrap::bootstrap_source;
use rxgen_core::naming::{compare_definitions, definition_key};
use rxgen_core::{
    ancestors_with_events, collect, emit_factory, render_extensions, synthesize, Diagnostic,
    FactoryMethod, GenerateError, GeneratorConfig, ParentWrapper, Result, WrapperMode,
    WrapperRequest, WrapperType, BOOTSTRAP_FILE_NAME, EVENTS_NOT_FOUND, EXTENSIONS_FILE_NAME,
    GENERATION_FAILED, OUTPUT_CONFLICT,
};
use rxgen_host::{GeneratorHost, HostError};
use rxgen_model::{Location, SymbolQuery, TypeId, TypeRef};
use rxgen_observe::{
    EventDispatcher, GeneratedUnit, MetricsCollector, PassEvent, PassOutcome, PassReport, UnitKind,
};
use tracing::{debug, info, warn};

/// A type the program asked to wrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRequest {
    /// The requested type definition.
    pub type_id: TypeId,
    /// Instance or static wrapping.
    pub mode: WrapperMode,
    /// Where the request was made.
    pub location: Location,
}

/// The requests of one pass, deduplicated and sorted.
#[derive(Debug, Clone, Default)]
pub struct Requests {
    /// Instance requests from `Events()` call sites.
    pub instance: Vec<TypeRequest>,
    /// Static requests from assembly attributes.
    pub statics: Vec<TypeRequest>,
    /// Requests dropped because an earlier one named the same type.
    pub duplicates: Vec<TypeRequest>,
}

impl Requests {
    /// Number of distinct requests.
    pub fn len(&self) -> usize {
        self.instance.len() + self.statics.len()
    }

    /// Whether there is nothing to generate.
    pub fn is_empty(&self) -> bool {
        self.instance.is_empty() && self.statics.is_empty()
    }

    /// Distinct requests, static ones first.
    pub fn iter(&self) -> impl Iterator<Item = &TypeRequest> {
        self.statics.iter().chain(self.instance.iter())
    }
}

/// Find every wrap request in `query`.
///
/// Fails when the extension holder class cannot be resolved, since no
/// `Events()` call could have bound to it.
pub fn discover<Q: SymbolQuery + ?Sized>(query: &Q, config: &GeneratorConfig) -> Result<Requests> {
    let holder_name = config.holder_metadata_name();
    let holder = query
        .resolve_metadata_name(&holder_name)
        .ok_or_else(|| GenerateError::MissingExtensionsHolder(holder_name.clone()))?;

    let mut instance = Vec::new();
    for site in query.invocation_sites() {
        if site.method_name != config.factory_method || site.containing_type != Some(holder) {
            continue;
        }
        let [argument] = site.type_arguments.as_slice() else {
            continue;
        };
        let Some(type_id) = argument.without_nullable().named_id() else {
            continue;
        };
        instance.push(TypeRequest {
            type_id,
            mode: WrapperMode::Instance,
            location: site.location.clone(),
        });
    }

    let attribute_name = config.static_attribute_metadata_name();
    let mut statics = Vec::new();
    for attribute in query.assembly_attributes() {
        if attribute.class_name != attribute_name {
            continue;
        }
        let Some(type_id) = attribute.type_argument().and_then(TypeRef::named_id) else {
            continue;
        };
        statics.push(TypeRequest {
            type_id,
            mode: WrapperMode::Static,
            location: attribute.location.clone(),
        });
    }

    let (instance, mut duplicates) = dedupe(query, instance);
    let (statics, static_duplicates) = dedupe(query, statics);
    duplicates.extend(static_duplicates);

    debug!(
        instance = instance.len(),
        statics = statics.len(),
        duplicates = duplicates.len(),
        "Discovered wrap requests"
    );

    Ok(Requests {
        instance,
        statics,
        duplicates,
    })
}

/// Keep the first request per type definition, then order by name.
fn dedupe<Q: SymbolQuery + ?Sized>(
    query: &Q,
    requests: Vec<TypeRequest>,
) -> (Vec<TypeRequest>, Vec<TypeRequest>) {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    let mut dropped = Vec::new();
    for request in requests {
        if seen.insert(definition_key(query, request.type_id)) {
            kept.push(request);
        } else {
            dropped.push(request);
        }
    }
    kept.sort_by(|a, b| compare_definitions(query, a.type_id, b.type_id));
    (kept, dropped)
}

/// What processing one request produced.
enum TypeOutcome {
    /// Wrappers to deliver, root ancestor first. Empty when every link was
    /// already generated earlier in the pass.
    Wrappers(Vec<WrapperType>),
    /// Neither the type nor its ancestors expose eligible events.
    NoEvents,
}

/// Run one generation pass.
pub fn run<Q, H>(
    query: &Q,
    host: &mut H,
    config: &GeneratorConfig,
    dispatcher: &EventDispatcher,
) -> Result<PassReport>
where
    Q: SymbolQuery + ?Sized,
    H: GeneratorHost + ?Sized,
{
    let mut pass = Pass {
        query,
        host,
        config,
        dispatcher,
        metrics: MetricsCollector::new(),
        units: Vec::new(),
        diagnostics: Vec::new(),
        generated: HashMap::new(),
        claimed: HashMap::new(),
        factories: Vec::new(),
        processed: 0,
    };

    match pass.execute() {
        Ok(()) => Ok(pass.finish(PassOutcome::Completed)),
        Err(GenerateError::Cancelled) => {
            info!(processed = pass.processed, "Generation pass cancelled");
            pass.dispatcher.emit(PassEvent::PassCancelled {
                processed: pass.processed,
            });
            Err(GenerateError::Cancelled)
        }
        Err(e) => Err(e),
    }
}

struct Pass<'a, Q: ?Sized, H: ?Sized> {
    query: &'a Q,
    host: &'a mut H,
    config: &'a GeneratorConfig,
    dispatcher: &'a EventDispatcher,
    metrics: MetricsCollector,
    units: Vec<GeneratedUnit>,
    diagnostics: Vec<Diagnostic>,
    /// Instance wrappers built so far and the events each one exposes.
    generated: HashMap<TypeId, BTreeSet<String>>,
    /// Wrapper classes delivered so far, by namespace, name and arity.
    claimed: HashMap<(String, String, usize), TypeId>,
    factories: Vec<FactoryMethod>,
    processed: usize,
}

impl<Q, H> Pass<'_, Q, H>
where
    Q: SymbolQuery + ?Sized,
    H: GeneratorHost + ?Sized,
{
    fn execute(&mut self) -> Result<()> {
        self.metrics.record_start();

        let started = Instant::now();
        let requests = discover(self.query, self.config)?;
        self.metrics.record_discovery_time(started.elapsed());

        for request in requests.iter() {
            self.metrics.record_request(request.mode);
        }
        for duplicate in &requests.duplicates {
            self.metrics.record_duplicate();
            self.dispatcher.emit(PassEvent::RequestDeduplicated {
                type_name: self.query.qualified_name(duplicate.type_id),
                mode: duplicate.mode,
            });
        }
        self.dispatcher.emit(PassEvent::PassStarted {
            instance_requests: requests.instance.len(),
            static_requests: requests.statics.len(),
        });

        if self.config.emit_bootstrap {
            self.check_cancelled()?;
            let text = bootstrap_source(self.config);
            self.add_source(
                BOOTSTRAP_FILE_NAME,
                &text,
                UnitKind::Bootstrap,
                &self.config.holder_metadata_name(),
                &Location::none(),
            )?;
        }

        for request in requests.iter() {
            self.check_cancelled()?;
            self.process(request)?;
            self.processed += 1;
        }

        self.check_cancelled()?;
        if let Some(text) = render_extensions(self.config, &self.factories) {
            let factories = self.factories.len();
            self.add_source(
                EXTENSIONS_FILE_NAME,
                &text,
                UnitKind::Extensions { factories },
                &self.config.holder_metadata_name(),
                &Location::none(),
            )?;
        }

        self.metrics.record_end();
        Ok(())
    }

    fn process(&mut self, request: &TypeRequest) -> Result<()> {
        let query = self.query;
        let config = self.config;
        let generated = &self.generated;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match request.mode {
            WrapperMode::Instance => instance_wrappers(query, config, request.type_id, generated),
            WrapperMode::Static => static_wrapper(query, config, request.type_id),
        }));

        // Work finished after cancellation is dropped, never delivered.
        self.check_cancelled()?;

        match outcome {
            Ok(TypeOutcome::Wrappers(wrappers)) => {
                // Later links derive from earlier ones, so stop at the
                // first wrapper that could not be delivered.
                for wrapper in &wrappers {
                    if !self.deliver(wrapper, &request.location)? {
                        break;
                    }
                }
            }
            Ok(TypeOutcome::NoEvents) => {
                let type_name = query.qualified_name(request.type_id);
                let mode = request.mode.to_string();
                debug!(type_name = %type_name, mode = %mode, "No events found");
                self.report(Diagnostic::create(
                    &EVENTS_NOT_FOUND,
                    request.location.clone(),
                    &[type_name.as_str(), mode.as_str()],
                ));
            }
            Err(payload) => {
                let type_name = query.qualified_name(request.type_id);
                let message = panic_message(payload.as_ref());
                warn!(type_name = %type_name, message = %message, "Generation failed for type");
                self.dispatcher.emit(PassEvent::TypeFailed {
                    type_name: type_name.clone(),
                    message: message.clone(),
                });
                self.report(Diagnostic::create(
                    &GENERATION_FAILED,
                    request.location.clone(),
                    &[type_name.as_str(), message.as_str()],
                ));
            }
        }
        Ok(())
    }

    /// Hand one wrapper to the host. Returns `false` when it was refused.
    fn deliver(&mut self, wrapper: &WrapperType, location: &Location) -> Result<bool> {
        let type_name = self.query.qualified_name(wrapper.source_type);

        let class_key = (
            wrapper.namespace.clone(),
            wrapper.name.clone(),
            wrapper.declaration.type_parameters.len(),
        );
        if let Some(&owner) = self.claimed.get(&class_key) {
            if owner != wrapper.source_type {
                let reason = format!(
                    "wrapper class '{}' is already generated for '{}'",
                    wrapper.name,
                    self.query.qualified_name(owner)
                );
                self.refuse(&type_name, &reason, location);
                return Ok(false);
            }
        }

        let text = wrapper.render(self.config);
        let added = self.add_source(
            &wrapper.file_name,
            &text,
            UnitKind::Wrapper {
                source_type: type_name.clone(),
                mode: wrapper.mode,
                events: wrapper.events.clone(),
            },
            &type_name,
            location,
        )?;
        if !added {
            return Ok(false);
        }

        self.claimed.insert(class_key, wrapper.source_type);
        self.metrics.record_wrapper(wrapper.mode, wrapper.events.len());
        self.dispatcher.emit(PassEvent::WrapperGenerated {
            type_name,
            mode: wrapper.mode,
            file_name: wrapper.file_name.clone(),
            events: wrapper.events.len(),
        });

        if wrapper.mode == WrapperMode::Instance {
            self.generated
                .insert(wrapper.source_type, wrapper.exposed_events());
        }
        if let Some(factory) = emit_factory(self.query, self.config, wrapper) {
            self.metrics.record_factory();
            self.factories.push(factory);
        }
        Ok(true)
    }

    /// Add a unit to the compilation. A refusal other than cancellation
    /// is reported against `subject` and yields `false`.
    fn add_source(
        &mut self,
        hint_name: &str,
        text: &str,
        kind: UnitKind,
        subject: &str,
        location: &Location,
    ) -> Result<bool> {
        match self.host.add_source(hint_name, text) {
            Ok(()) => {}
            Err(HostError::Cancelled) => return Err(GenerateError::Cancelled),
            Err(e) => {
                self.refuse(subject, &e.to_string(), location);
                return Ok(false);
            }
        }

        self.metrics.record_source(text.len());
        self.dispatcher.emit(PassEvent::SourceAdded {
            hint_name: hint_name.to_string(),
            bytes: text.len(),
        });
        self.units.push(GeneratedUnit {
            file_name: hint_name.to_string(),
            kind,
            bytes: text.len(),
        });
        Ok(true)
    }

    fn refuse(&mut self, subject: &str, reason: &str, location: &Location) {
        warn!(subject = %subject, reason = %reason, "Generated output was not added");
        self.report(Diagnostic::create(
            &OUTPUT_CONFLICT,
            location.clone(),
            &[subject, reason],
        ));
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.metrics
            .record_diagnostic(&diagnostic.id, diagnostic.severity);
        self.dispatcher.emit(PassEvent::DiagnosticReported {
            diagnostic: diagnostic.clone(),
        });
        self.host.report_diagnostic(diagnostic.clone());
        self.diagnostics.push(diagnostic);
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.host.is_cancellation_requested() {
            return Err(GenerateError::Cancelled);
        }
        Ok(())
    }

    fn finish(&mut self, outcome: PassOutcome) -> PassReport {
        let snapshot = self.metrics.snapshot();
        self.dispatcher.emit(PassEvent::PassCompleted {
            sources: self.units.len(),
            diagnostics: self.diagnostics.len(),
            duration: snapshot.timing.total_time,
        });

        let mut report = PassReport::new(outcome, snapshot);
        for unit in self.units.drain(..) {
            report.add_unit(unit);
        }
        for diagnostic in self.diagnostics.drain(..) {
            report.add_diagnostic(diagnostic);
        }
        report
    }
}

/// Wrappers for an instance request: the requested type plus every
/// ancestor with events that has no wrapper yet, root first, each derived
/// from the wrapper of its nearest ancestor with events.
fn instance_wrappers<Q: SymbolQuery + ?Sized>(
    query: &Q,
    config: &GeneratorConfig,
    type_id: TypeId,
    generated: &HashMap<TypeId, BTreeSet<String>>,
) -> TypeOutcome {
    let ancestors = ancestors_with_events(query, type_id, false);
    let own = collect(query, type_id, false, false);
    if own.is_empty() && ancestors.is_empty() {
        return TypeOutcome::NoEvents;
    }

    let mut chain: Vec<TypeId> = ancestors.iter().rev().map(|(id, _)| *id).collect();
    chain.push(type_id);

    let mut built: HashMap<TypeId, BTreeSet<String>> = HashMap::new();
    let mut wrappers = Vec::new();

    for link in chain {
        if generated.contains_key(&link) || built.contains_key(&link) {
            continue;
        }

        let events = if link == type_id {
            own.clone()
        } else {
            collect(query, link, false, false)
        };

        let parent = ancestors_with_events(query, link, false)
            .into_iter()
            .next()
            .map(|(parent, type_arguments)| ParentWrapper {
                type_id: parent,
                type_arguments,
                inherited_events: generated
                    .get(&parent)
                    .or_else(|| built.get(&parent))
                    .cloned()
                    .unwrap_or_default(),
            });

        let mut request =
            WrapperRequest::new(&events, WrapperMode::Instance).with_generate_empty(parent.is_some());
        if let Some(parent) = parent {
            request = request.with_parent(parent);
        }

        if let Some(wrapper) = synthesize(query, config, request) {
            built.insert(link, wrapper.exposed_events());
            wrappers.push(wrapper);
        }
    }

    TypeOutcome::Wrappers(wrappers)
}

/// The static holder for a static request. Static events declared on base
/// classes are reachable through the derived type and are included.
fn static_wrapper<Q: SymbolQuery + ?Sized>(
    query: &Q,
    config: &GeneratorConfig,
    type_id: TypeId,
) -> TypeOutcome {
    let events = collect(query, type_id, true, true);
    match synthesize(query, config, WrapperRequest::new(&events, WrapperMode::Static)) {
        Some(wrapper) => TypeOutcome::Wrappers(vec![wrapper]),
        None => TypeOutcome::NoEvents,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxgen_core::bootstrap::install;
    use rxgen_host::CollectingHost;
    use rxgen_model::{
        AttributeArg, AttributeData, EventSymbol, InvocationSite, ProgramBuilder, ProgramModel,
        TypeSymbol,
    };

    fn events_call(holder: TypeId, target: TypeId, line: u32) -> InvocationSite {
        InvocationSite {
            method_name: "Events".to_string(),
            containing_type: Some(holder),
            type_arguments: vec![TypeRef::named(target)],
            location: Location::new("Program.cs", line, 1),
        }
    }

    fn model_with_requests() -> (ProgramModel, TypeId, TypeId) {
        let config = GeneratorConfig::default();
        let mut builder = ProgramBuilder::with_core_library();
        let core = *builder.core().unwrap();
        let bootstrap = install(&mut builder, &config).unwrap();

        let zulu = builder
            .add(
                TypeSymbol::class("Sample", "Zulu")
                    .with_event(EventSymbol::new("Changed", TypeRef::named(core.event_handler))),
            )
            .unwrap();
        let alpha = builder
            .add(
                TypeSymbol::class("Sample", "Alpha")
                    .with_event(EventSymbol::new("Changed", TypeRef::named(core.event_handler))),
            )
            .unwrap();

        builder
            .add_invocation(events_call(bootstrap.holder, zulu, 1))
            .add_invocation(events_call(bootstrap.holder, alpha, 2))
            .add_invocation(events_call(bootstrap.holder, zulu, 3))
            .add_invocation(InvocationSite {
                method_name: "Events".to_string(),
                containing_type: None,
                type_arguments: vec![TypeRef::named(alpha)],
                location: Location::none(),
            })
            .add_assembly_attribute(
                AttributeData::new("ObservableEvents.GenerateStaticEventObservablesAttribute")
                    .with_argument(AttributeArg::Type(TypeRef::named(alpha))),
            );

        (builder.build(), alpha, zulu)
    }

    #[test]
    fn test_discover_dedupes_and_sorts() {
        let (model, alpha, zulu) = model_with_requests();
        let requests = discover(&model, &GeneratorConfig::default()).unwrap();

        let instance: Vec<TypeId> = requests.instance.iter().map(|r| r.type_id).collect();
        assert_eq!(instance, [alpha, zulu]);
        assert_eq!(requests.instance[1].location, Location::new("Program.cs", 1, 1));
        assert_eq!(requests.duplicates.len(), 1);
        assert_eq!(requests.statics.len(), 1);
        assert_eq!(requests.len(), 3);
    }

    #[test]
    fn test_discover_requires_holder() {
        let model = ProgramBuilder::with_core_library().build();
        let result = discover(&model, &GeneratorConfig::default());
        assert!(matches!(
            result,
            Err(GenerateError::MissingExtensionsHolder(name))
                if name == "ObservableEvents.ObservableGeneratorExtensions"
        ));
    }

    #[test]
    fn test_run_reports_units_in_order() {
        let (model, _, _) = model_with_requests();
        let mut host = CollectingHost::new();
        let report = run(
            &model,
            &mut host,
            &GeneratorConfig::default(),
            &EventDispatcher::new(),
        )
        .unwrap();

        assert!(report.is_success());
        // Alpha declares no static events.
        assert_eq!(report.warning_count(), 1);
        assert_eq!(
            host.hint_names(),
            [
                BOOTSTRAP_FILE_NAME,
                "SourceClassSample.Alpha-InstanceEvents.SourceGenerated.cs",
                "SourceClassSample.Zulu-InstanceEvents.SourceGenerated.cs",
                EXTENSIONS_FILE_NAME,
            ]
        );
        assert_eq!(report.file_names(), host.hint_names());
        assert_eq!(report.metrics.requests.duplicates, 1);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
