//! Config File Generator
//!
//! Writes the provider declaration (`main.tf`) and one `import` block per
//! record (`auth0_import.tf`) into the output directory.

use super::ImportRecord;
use std::fmt::Write as _;
use std::fs::DirBuilder;
use std::io;
use std::path::Path;

pub const MAIN_FILE_NAME: &str = "main.tf";
pub const IMPORT_FILE_NAME: &str = "auth0_import.tf";

/// Mode for created output directories (rwxr-xr-x)
#[cfg(unix)]
const OUTPUT_DIR_MODE: u32 = 0o755;

const MAIN_FILE_CONTENT: &str = r#"terraform {
  required_version = "~> 1.5.0"
  required_providers {
    auth0 = {
      source  = "auth0/auth0"
      version = "1.0.0-beta.1"
    }
  }
}

provider "auth0" {
  debug = true
}
"#;

const IMPORT_FILE_HEADER: &str = "\
# This file is automatically generated via the Auth0 CLI.
# It can be safely removed after the successful generation
# of Terraform resource definition files.
";

/// Errors raised while writing the config files
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("no import data available")]
    NoImportData,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to render auth0_import.tf: {0}")]
    Template(#[from] std::fmt::Error),
}

/// Write `main.tf` and `auth0_import.tf` into `output_dir`
///
/// The two files are written one after the other; when the import file
/// fails, an already written `main.tf` stays in place.
pub fn generate_config_files(
    output_dir: impl AsRef<Path>,
    data: &[ImportRecord],
) -> Result<(), GenerateError> {
    if data.is_empty() {
        return Err(GenerateError::NoImportData);
    }

    let output_dir = output_dir.as_ref();
    create_output_dir(output_dir)?;

    create_main_file(output_dir)?;
    create_import_file(output_dir, data)?;

    tracing::info!(
        "Wrote {} import block(s) to {}",
        data.len(),
        output_dir.display()
    );
    Ok(())
}

fn create_output_dir(output_dir: &Path) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(OUTPUT_DIR_MODE);
    }

    match builder.create(output_dir) {
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && output_dir.is_dir() => Ok(()),
        result => result,
    }
}

fn create_main_file(output_dir: &Path) -> io::Result<()> {
    let path = output_dir.join(MAIN_FILE_NAME);
    tracing::debug!("Writing {}", path.display());
    std::fs::write(path, MAIN_FILE_CONTENT)
}

fn create_import_file(output_dir: &Path, data: &[ImportRecord]) -> Result<(), GenerateError> {
    let content = render_import_file(data)?;

    let path = output_dir.join(IMPORT_FILE_NAME);
    tracing::debug!("Writing {}", path.display());
    std::fs::write(path, content)?;
    Ok(())
}

/// Render the header followed by one import block per record
///
/// Each block is preceded by a blank line and the file ends with one.
fn render_import_file(data: &[ImportRecord]) -> Result<String, std::fmt::Error> {
    let mut out = String::from(IMPORT_FILE_HEADER);

    for record in data {
        write!(
            out,
            "\nimport {{\n  id = \"{}\"\n  to = {}\n}}\n",
            record.import_id, record.resource_name
        )?;
    }
    out.push('\n');

    Ok(out)
}
