//! Generate command - Write wrapper sources for a program model.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use rxgen::prelude::*;

use crate::OutputFormat;

/// Arguments for the generate command.
#[derive(Args)]
pub struct GenerateArgs {
    /// Path to the program model document (JSON)
    #[arg(required = true)]
    pub model: PathBuf,

    /// Directory the generated sources are written to
    #[arg(short, long, default_value = "generated")]
    pub out: PathBuf,

    /// Do not emit the holder class and marker attribute declarations
    #[arg(long)]
    pub no_bootstrap: bool,

    /// Keep `(sender, EventArgs)` events as streams of EventArgs
    #[arg(long)]
    pub keep_event_args: bool,

    /// Omit XML documentation comments
    #[arg(long)]
    pub no_docs: bool,
}

/// Execute the generate command.
pub fn execute(
    args: GenerateArgs,
    config: GeneratorConfig,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let mut builder = RxGen::builder().with_config(config);

    if args.no_bootstrap {
        builder = builder.with_bootstrap(false);
    }
    if args.keep_event_args {
        builder = builder.with_collapse_plain_event_args(false);
    }
    if args.no_docs {
        builder = builder.with_documentation(false);
    }
    if !quiet {
        builder = builder.with_event_subscriber(Arc::new(LoggingSubscriber::new()));
    }

    let generator = builder.build().context("Failed to create generator")?;

    let model = generator
        .load_model_file(&args.model)
        .with_context(|| format!("Failed to load model {}", args.model.display()))?;

    tracing::info!(
        model = %args.model.display(),
        out = %args.out.display(),
        "Generating observables"
    );

    let mut host = DirectoryHost::new(&args.out);
    let report = generator
        .run(&model, &mut host)
        .context("Generation failed")?;

    match format {
        OutputFormat::Human => {
            if !quiet {
                println!("{}", report.to_text());
                println!("Wrote {} files to {}", host.written_files().len(), args.out.display());
            }
        }
        OutputFormat::Json => println!("{}", report.to_json_pretty()),
        OutputFormat::JsonCompact => println!("{}", serde_json::to_string(&report.to_json())?),
    }

    Ok(())
}
