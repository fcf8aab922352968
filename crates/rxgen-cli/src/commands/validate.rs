//! Validate command - Check that a program model can be generated from.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use rxgen::prelude::*;
use rxgen_core::collect;

use crate::OutputFormat;

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the program model document (JSON)
    #[arg(required = true)]
    pub model: PathBuf,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Validation result.
#[derive(Debug, Serialize)]
struct ValidationResult {
    valid: bool,
    path: String,
    types: usize,
    instance_requests: usize,
    static_requests: usize,
    warnings: Vec<String>,
    errors: Vec<String>,
}

/// Execute the validate command.
pub fn execute(args: ValidateArgs, config: GeneratorConfig, format: OutputFormat) -> Result<()> {
    let generator = RxGen::builder()
        .with_config(config)
        .build()
        .context("Failed to create generator")?;

    let mut result = ValidationResult {
        valid: true,
        path: args.model.display().to_string(),
        types: 0,
        instance_requests: 0,
        static_requests: 0,
        warnings: Vec::new(),
        errors: Vec::new(),
    };

    match generator.load_model_file(&args.model) {
        Ok(model) => check_model(&generator, &model, &mut result),
        Err(e) => {
            result.valid = false;
            result.errors.push(e.to_string());
        }
    }

    if args.strict && !result.warnings.is_empty() {
        result.valid = false;
    }

    // Output results
    match format {
        OutputFormat::Human => {
            if result.valid {
                println!("Model is valid: {}", args.model.display());
                println!("  Types: {}", result.types);
                println!("  Instance requests: {}", result.instance_requests);
                println!("  Static requests: {}", result.static_requests);
            } else {
                println!("Model is INVALID: {}", args.model.display());
                for error in &result.errors {
                    println!("  Error: {}", error);
                }
            }

            if !result.warnings.is_empty() {
                println!("\nWarnings:");
                for warning in &result.warnings {
                    println!("  - {}", warning);
                }
            }
        }
        OutputFormat::Json | OutputFormat::JsonCompact => {
            println!("{}", format.json(&result)?);
        }
    }

    if result.valid {
        Ok(())
    } else {
        Err(anyhow::anyhow!("Validation failed"))
    }
}

fn check_model(generator: &Generator, model: &ProgramModel, result: &mut ValidationResult) {
    let config = generator.config();
    result.types = model.len();

    let holder = model.resolve_metadata_name(&config.holder_metadata_name());

    // Call sites that look like triggers but will be ignored.
    for site in model.invocation_sites() {
        if site.method_name != config.factory_method {
            continue;
        }
        if site.containing_type != holder {
            result.warnings.push(format!(
                "{}: '{}' call does not bind to {}",
                site.location,
                site.method_name,
                config.holder_metadata_name()
            ));
        } else if site.type_arguments.len() != 1 {
            result.warnings.push(format!(
                "{}: '{}' call has {} type arguments, expected 1",
                site.location,
                site.method_name,
                site.type_arguments.len()
            ));
        }
    }

    let attribute_name = config.static_attribute_metadata_name();
    for attribute in model.assembly_attributes() {
        if attribute.class_name == attribute_name && attribute.type_argument().is_none() {
            result.warnings.push(format!(
                "{}: {} has no typeof argument",
                attribute.location, config.static_attribute
            ));
        }
    }

    let requests = match generator.discover(model) {
        Ok(requests) => requests,
        Err(e) => {
            result.valid = false;
            result.errors.push(e.to_string());
            return;
        }
    };

    result.instance_requests = requests.instance.len();
    result.static_requests = requests.statics.len();

    if requests.is_empty() {
        result
            .warnings
            .push("Model contains no wrap requests".to_string());
    }

    for request in requests.iter() {
        let is_static = request.mode == WrapperMode::Static;
        if collect(model, request.type_id, true, is_static).is_empty() {
            result.warnings.push(format!(
                "{}: type '{}' does not have any public {} events to wrap",
                request.location,
                model.qualified_name(request.type_id),
                request.mode
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxgen_model::ModelDocument;

    fn check(document: &str) -> ValidationResult {
        let generator = RxGen::with_defaults().unwrap();
        let model = generator
            .load_model(ModelDocument::from_json(document).unwrap())
            .unwrap();
        let mut result = ValidationResult {
            valid: true,
            path: "model.json".to_string(),
            types: 0,
            instance_requests: 0,
            static_requests: 0,
            warnings: Vec::new(),
            errors: Vec::new(),
        };
        check_model(&generator, &model, &mut result);
        result
    }

    #[test]
    fn test_valid_model() {
        let result = check(
            r#"{
                "types": [
                    {
                        "namespace": "Sample",
                        "name": "Clock",
                        "is_static": true,
                        "events": [
                            { "name": "Tick", "type": "System.EventHandler", "is_static": true }
                        ]
                    }
                ],
                "assembly_attributes": [
                    {
                        "name": "ObservableEvents.GenerateStaticEventObservablesAttribute",
                        "arguments": [{ "type": "Sample.Clock" }]
                    }
                ]
            }"#,
        );

        assert!(result.valid);
        assert_eq!(result.static_requests, 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_warnings_for_ignored_triggers() {
        let result = check(
            r#"{
                "types": [
                    { "namespace": "Sample", "name": "Quiet" },
                    { "namespace": "Sample", "name": "Elsewhere" }
                ],
                "invocations": [
                    {
                        "method": "Events",
                        "containing_type": "ObservableEvents.ObservableGeneratorExtensions",
                        "type_arguments": ["Sample.Quiet"]
                    },
                    {
                        "method": "Events",
                        "containing_type": "Sample.Elsewhere",
                        "type_arguments": ["Sample.Quiet"]
                    }
                ]
            }"#,
        );

        assert!(result.valid);
        assert_eq!(result.instance_requests, 1);
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[0].contains("does not bind to"));
        assert!(result.warnings[1].contains("'Sample.Quiet' does not have any public instance events"));
    }
}
