//! Import and export commands - storage dumps from the browser app

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use super::{confirm, get_context, print_json};
use crate::output;
use trimtrack_core::services::{ImportMode, ImportOptions};

pub fn run_import(file: PathBuf, replace: bool, preview: bool, force: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;

    if replace && !preview {
        let prompt = "Replace mode deletes every member, trainer, batch and plan first. Continue?";
        if !confirm(prompt, force || json)? {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let options = ImportOptions {
        mode: if replace { ImportMode::Replace } else { ImportMode::Merge },
        preview_only: preview,
    };
    let result = ctx.import_service.import_file(&file, &options)?;

    if json {
        return print_json(&result);
    }

    if result.preview {
        output::info("Preview only; nothing was written.");
    }
    let mut table = output::create_table();
    table.set_header(vec!["Key", "Records"]);
    for (key, count) in &result.imported {
        table.add_row(vec![key.clone(), output::opt(*count)]);
    }
    println!("{table}");

    for (key, reason) in &result.skipped {
        output::warning(&format!("Skipped {key}: {reason}"));
    }
    if !result.preview {
        output::success(&format!("Imported {} key(s) from {}", result.imported.len(), file.display()));
    }

    Ok(())
}

pub fn run_export(output_path: Option<PathBuf>) -> Result<()> {
    let ctx = get_context()?;
    let dump = ctx.import_service.export_string()?;

    match output_path {
        Some(path) => {
            std::fs::write(&path, dump).with_context(|| format!("writing {}", path.display()))?;
            output::success(&format!("Exported to {}", path.display()));
        }
        None => println!("{dump}"),
    }

    Ok(())
}
