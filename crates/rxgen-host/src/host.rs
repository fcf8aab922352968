//! Output sinks a generation pass writes to.
//!
//! A host compiler hands the generator two sinks: one for generated
//! source units and one for diagnostics. [`CollectingHost`] keeps both in
//! memory, [`DirectoryHost`] writes units to disk.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rxgen_core::Diagnostic;
use tracing::{debug, trace};

use crate::cancellation::CancellationToken;
use crate::error::{HostError, HostResult};

/// The sinks and cancellation signal of a host compiler.
pub trait GeneratorHost {
    /// Add a generated source unit under `hint_name`.
    fn add_source(&mut self, hint_name: &str, text: &str) -> HostResult<()>;

    /// Report a diagnostic.
    fn report_diagnostic(&mut self, diagnostic: Diagnostic);

    /// Whether the host wants the pass to stop.
    fn is_cancellation_requested(&self) -> bool {
        false
    }
}

/// A generated source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    /// Hint name, used as the file name.
    pub hint_name: String,
    /// Source text.
    pub text: String,
}

/// Check that a hint name can be used as a file name.
///
/// Hint names are flat file names ending in `.cs`. Anything that could
/// escape the output directory is rejected.
pub fn validate_hint_name(hint_name: &str) -> HostResult<()> {
    let invalid = |reason: &str| HostError::InvalidFileName {
        name: hint_name.to_string(),
        reason: reason.to_string(),
    };

    if hint_name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }
    if hint_name.contains(['/', '\\', ':']) {
        return Err(invalid("name contains a path separator"));
    }
    if hint_name.starts_with('.') {
        return Err(invalid("name starts with '.'"));
    }
    if hint_name
        .chars()
        .any(|c| c.is_control() || matches!(c, '"' | '<' | '>' | '|' | '?' | '*'))
    {
        return Err(invalid("name contains a reserved character"));
    }
    if !hint_name.ends_with(".cs") {
        return Err(invalid("name must end with '.cs'"));
    }
    Ok(())
}

/// A host that keeps everything in memory.
#[derive(Debug, Default)]
pub struct CollectingHost {
    sources: Vec<GeneratedSource>,
    diagnostics: Vec<Diagnostic>,
    cancellation: CancellationToken,
}

impl CollectingHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `token` as the cancellation signal.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Collected source units, in the order they were added.
    pub fn sources(&self) -> &[GeneratedSource] {
        &self.sources
    }

    /// Look up a source unit by hint name.
    pub fn source(&self, hint_name: &str) -> Option<&str> {
        self.sources
            .iter()
            .find(|s| s.hint_name == hint_name)
            .map(|s| s.text.as_str())
    }

    /// Hint names of the collected units.
    pub fn hint_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.hint_name.as_str()).collect()
    }

    /// Reported diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take the collected output, leaving the host empty.
    pub fn take(&mut self) -> (Vec<GeneratedSource>, Vec<Diagnostic>) {
        (
            std::mem::take(&mut self.sources),
            std::mem::take(&mut self.diagnostics),
        )
    }
}

impl GeneratorHost for CollectingHost {
    fn add_source(&mut self, hint_name: &str, text: &str) -> HostResult<()> {
        validate_hint_name(hint_name)?;
        if self.sources.iter().any(|s| s.hint_name == hint_name) {
            return Err(HostError::InvalidFileName {
                name: hint_name.to_string(),
                reason: "hint name was already added".to_string(),
            });
        }
        trace!(hint = hint_name, bytes = text.len(), "Collected source");
        self.sources.push(GeneratedSource {
            hint_name: hint_name.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn report_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn is_cancellation_requested(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// A host that writes each unit to a file in one directory.
#[derive(Debug)]
pub struct DirectoryHost {
    root: PathBuf,
    written: BTreeSet<String>,
    diagnostics: Vec<Diagnostic>,
    cancellation: CancellationToken,
}

impl DirectoryHost {
    /// Create a host writing into `root`. The directory is created on
    /// demand.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: BTreeSet::new(),
            diagnostics: Vec::new(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Use `token` as the cancellation signal.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// The output directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths of the files written so far, sorted by name.
    pub fn written_files(&self) -> Vec<PathBuf> {
        self.written.iter().map(|name| self.root.join(name)).collect()
    }

    /// Reported diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl GeneratorHost for DirectoryHost {
    fn add_source(&mut self, hint_name: &str, text: &str) -> HostResult<()> {
        if self.cancellation.is_cancelled() {
            return Err(HostError::Cancelled);
        }
        validate_hint_name(hint_name)?;
        if self.written.contains(hint_name) {
            return Err(HostError::InvalidFileName {
                name: hint_name.to_string(),
                reason: "hint name was already added".to_string(),
            });
        }

        std::fs::create_dir_all(&self.root)?;
        let path = self.root.join(hint_name);
        std::fs::write(&path, text)?;
        debug!(path = %path.display(), bytes = text.len(), "Wrote source");

        self.written.insert(hint_name.to_string());
        Ok(())
    }

    fn report_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn is_cancellation_requested(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
