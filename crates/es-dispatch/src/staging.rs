//! Runtime-support staging.
//!
//! The simulator reads a parasite-density reference table and its versioned
//! scenario schema from the working directory. Both must be staged into the
//! run root before any invocation starts; once staged they are read-only and
//! shared by every invocation. Unreadable staging files abort the dispatch
//! phase, since no invocation could succeed without them.

use std::path::Path;

use tracing::debug;

use crate::{DispatchError, DispatchResult};

pub const DENSITIES_FILE: &str = "densities.csv";

pub fn schema_file_name(version: u32) -> String {
    format!("scenario_{version}.xsd")
}

pub fn stage_support_files(
    simulator_home: &Path,
    version: u32,
    run_root: &Path,
) -> DispatchResult<()> {
    for name in [DENSITIES_FILE.to_string(), schema_file_name(version)] {
        let from = simulator_home.join(&name);
        let to = run_root.join(&name);
        std::fs::copy(&from, &to).map_err(|source| DispatchError::Staging {
            path: from.clone(),
            source,
        })?;
        debug!(file = %name, "staged support file");
    }
    Ok(())
}
