//! Baseline Commands

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;

use screencheck::{CaptureStore, ComparatorConfig};

use crate::output::{print_list, print_success, print_warning, OutputFormat, TableDisplay};

#[derive(Subcommand)]
pub enum BaselineCommands {
    /// Delete all captures of a folder
    Clear {
        /// Capture folder, usually the test class name
        folder: String,
    },

    /// Copy the captures of a folder over its reference images
    Promote {
        folder: String,
    },

    /// List the images of a folder
    List {
        folder: String,

        /// List reference images instead of captures
        #[arg(long)]
        references: bool,
    },
}

/// Image file display wrapper for serialization
#[derive(Serialize)]
pub struct ImageDisplay {
    pub folder: String,
    pub file_name: String,
}

impl TableDisplay for ImageDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Folder", "File"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.folder.clone(), self.file_name.clone()]
    }
}

pub fn execute(cmd: BaselineCommands, config: &ComparatorConfig, format: OutputFormat) -> Result<bool> {
    let captures = CaptureStore::new(&config.capture_root);

    match cmd {
        BaselineCommands::Clear { folder } => {
            captures.clear_all(&folder)?;
            print_success(&format!("Cleared captures of '{}'", folder));
        }

        BaselineCommands::Promote { folder } => {
            let promoted = captures.promote(&folder, &config.reference_root)?;
            if promoted.is_empty() {
                print_warning(&format!("No captures to promote in '{}'", folder));
            } else {
                print_success(&format!(
                    "Promoted {} capture(s) of '{}' to {}",
                    promoted.len(),
                    folder,
                    config.reference_root.display()
                ));
            }
        }

        BaselineCommands::List { folder, references } => {
            // References live in the same folder layout as captures
            let store = if references {
                CaptureStore::new(&config.reference_root)
            } else {
                captures
            };
            let displays: Vec<ImageDisplay> = store
                .list(&folder)?
                .into_iter()
                .map(|file_name| ImageDisplay {
                    folder: folder.clone(),
                    file_name,
                })
                .collect();
            print_list(&displays, format);
        }
    }

    Ok(true)
}
