//! Inspect command - Show requested types and the events they expose.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use rxgen::prelude::*;
use rxgen::TypeRequest;
use rxgen_core::{classify, collect, element_display, ArgumentShape};
use rxgen_model::Location;

use crate::OutputFormat;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Path to the program model document (JSON)
    #[arg(required = true)]
    pub model: PathBuf,

    /// Only show the type with this name (simple or namespace-qualified)
    #[arg(short, long = "type")]
    pub type_name: Option<String>,
}

/// Inspection result.
#[derive(Debug, Serialize)]
struct InspectionResult {
    path: String,
    requests: Vec<RequestDisplay>,
    duplicates: usize,
}

#[derive(Debug, Serialize)]
struct RequestDisplay {
    type_name: String,
    mode: WrapperMode,
    location: String,
    events: Vec<EventDisplay>,
}

#[derive(Debug, Serialize)]
struct EventDisplay {
    name: String,
    declared_by: String,
    shape: ArgumentShape,
    element: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    obsolete: Option<String>,
}

/// Execute the inspect command.
pub fn execute(args: InspectArgs, config: GeneratorConfig, format: OutputFormat) -> Result<()> {
    let generator = RxGen::builder()
        .with_config(config)
        .build()
        .context("Failed to create generator")?;

    let model = generator
        .load_model_file(&args.model)
        .with_context(|| format!("Failed to load model {}", args.model.display()))?;
    let requests = generator.discover(&model).context("Failed to discover requests")?;

    let mut result = InspectionResult {
        path: args.model.display().to_string(),
        requests: Vec::new(),
        duplicates: requests.duplicates.len(),
    };

    for request in requests.iter() {
        let type_name = model.qualified_name(request.type_id);
        if let Some(filter) = &args.type_name {
            let simple = &model.type_symbol(request.type_id).name;
            if filter != &type_name && filter != simple {
                continue;
            }
        }
        result
            .requests
            .push(describe(&model, generator.config(), request, type_name));
    }

    if let Some(filter) = &args.type_name {
        if result.requests.is_empty() {
            anyhow::bail!("Type '{}' is not requested by the model", filter);
        }
    }

    match format {
        OutputFormat::Human => print_human(&result),
        OutputFormat::Json | OutputFormat::JsonCompact => println!("{}", format.json(&result)?),
    }

    Ok(())
}

fn describe(
    model: &ProgramModel,
    config: &GeneratorConfig,
    request: &TypeRequest,
    type_name: String,
) -> RequestDisplay {
    let is_static = request.mode == WrapperMode::Static;
    let collected = collect(model, request.type_id, true, is_static);

    let events = collected
        .events()
        .iter()
        .map(|event| {
            let classification = classify(model, event, config.collapse_plain_event_args);
            EventDisplay {
                name: event.name.clone(),
                declared_by: model.qualified_name(event.declaring_type),
                shape: classification.shape,
                element: element_display(model, &classification.element, &config.reactive),
                obsolete: event.obsolete.as_ref().map(|o| o.message.clone()),
            }
        })
        .collect();

    RequestDisplay {
        type_name,
        mode: request.mode,
        location: location_text(&request.location),
        events,
    }
}

fn location_text(location: &Location) -> String {
    if location.is_none() {
        "<unknown>".to_string()
    } else {
        location.to_string()
    }
}

fn print_human(result: &InspectionResult) {
    println!("Model: {}", result.path);
    println!("Requests: {} ({} duplicates)", result.requests.len(), result.duplicates);

    for request in &result.requests {
        println!();
        println!("{} [{}] at {}", request.type_name, request.mode, request.location);
        if request.events.is_empty() {
            println!("  (no eligible events)");
        }
        for event in &request.events {
            let mut line = format!(
                "  {:<24} {:<12} {}",
                event.name,
                event.shape.to_string(),
                event.element
            );
            if event.declared_by != request.type_name {
                line.push_str(&format!("  (from {})", event.declared_by));
            }
            if let Some(message) = &event.obsolete {
                line.push_str(&format!("  [obsolete: {}]", message));
            }
            println!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxgen_model::ModelDocument;

    const MODEL: &str = r#"{
        "types": [
            {
                "namespace": "Sample",
                "name": "Base",
                "events": [{ "name": "Closed", "type": "System.EventHandler" }]
            },
            {
                "namespace": "Sample",
                "name": "Window",
                "base": "Sample.Base",
                "events": [
                    {
                        "name": "Resized",
                        "type": { "name": "System.EventHandler`1", "arguments": ["int"] }
                    }
                ]
            }
        ],
        "invocations": [
            {
                "method": "Events",
                "containing_type": "ObservableEvents.ObservableGeneratorExtensions",
                "type_arguments": ["Sample.Window"]
            }
        ]
    }"#;

    #[test]
    fn test_describe_lists_inherited_events() {
        let generator = RxGen::with_defaults().unwrap();
        let model = generator
            .load_model(ModelDocument::from_json(MODEL).unwrap())
            .unwrap();
        let requests = generator.discover(&model).unwrap();
        let request = &requests.instance[0];

        let display = describe(
            &model,
            generator.config(),
            request,
            model.qualified_name(request.type_id),
        );

        assert_eq!(display.type_name, "Sample.Window");
        let names: Vec<&str> = display.events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Closed", "Resized"]);
        assert_eq!(display.events[0].declared_by, "Sample.Base");
        assert_eq!(display.events[0].element, "global::System.Reactive.Unit");
        assert_eq!(display.events[1].shape, ArgumentShape::SenderAndSingleArg);
        assert_eq!(display.events[1].element, "int");
    }

    #[test]
    fn test_unknown_type_filter_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, MODEL).unwrap();

        let args = InspectArgs {
            model: path,
            type_name: Some("Missing".to_string()),
        };

        assert!(execute(args, GeneratorConfig::default(), OutputFormat::Human).is_err());
    }
}
