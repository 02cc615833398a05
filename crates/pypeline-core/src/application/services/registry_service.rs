//! Registry Updater - keeps aggregator files in sync with generated classes.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::{
    application::ports::Filesystem, domain::registry::update_registry, error::PypelineResult,
};

pub struct RegistryUpdater {
    filesystem: Arc<dyn Filesystem>,
}

impl RegistryUpdater {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Register `export` (imported by `import_line`) in the aggregator at
    /// `path`. The file is rewritten only when something changed.
    ///
    /// Returns whether the file was written.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn register(&self, path: &Path, import_line: &str, export: &str) -> PypelineResult<bool> {
        let source = self.filesystem.read_to_string(path)?;
        let update = update_registry(&source, import_line, export)?;

        if update.changed {
            self.filesystem.write_file(path, &update.content)?;
            info!(export, "Registered in aggregator");
        } else {
            debug!(export, "Already registered");
        }
        Ok(update.changed)
    }
}
