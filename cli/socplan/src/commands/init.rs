//! `socplan init`: project scaffolding.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::manifest::{SocplanManifest, MANIFEST_FILE};

/// Create a new project directory `name` relative to the cwd.
pub fn run(name: &str) -> Result<()> {
    create_project(Path::new(name), name)
}

pub(crate) fn create_project(project_dir: &Path, name: &str) -> Result<()> {
    if project_dir.exists() {
        bail!("directory '{}' already exists", project_dir.display());
    }

    fs::create_dir_all(project_dir.join("boards")).context("creating boards/ directory")?;
    fs::write(project_dir.join(MANIFEST_FILE), SocplanManifest::template(name))
        .with_context(|| format!("writing {MANIFEST_FILE}"))?;

    println!("Created project '{name}'");
    println!("  {name}/{MANIFEST_FILE}");
    println!("  {name}/boards/");

    Ok(())
}
