//! Paths command implementation
//!
//! Print every location prehook derives for the current repository.

use clap::Args;
use owo_colors::OwoColorize;
use prehook_core::HookType;
use prehook_engine::ExecutionContext;
use std::fmt::Display;
use std::path::Path;

use crate::command::Command;
use crate::error::Result;

const MISSING: &str = "missing";

/// Paths command
#[derive(Debug, Args)]
pub struct PathsCommand {
    /// Also open the store and list its installed environments
    #[arg(long)]
    pub store: bool,
}

impl Command for PathsCommand {
    /// Number of installed environments listed (0 without `--store`)
    type Output = usize;

    fn execute(&self, context: &ExecutionContext) -> Result<usize> {
        print_row("root", context.root());
        print_path("config", context.config_file_path());

        for hook_type in HookType::ALL {
            print_path(hook_type.name(), context.hook_path_for(hook_type));
            print_path(
                &format!("{hook_type} (legacy)"),
                &context.legacy_path_for(hook_type),
            );
            match context.template_for(hook_type) {
                Ok(template) => print_row(&format!("{hook_type} template"), template.display()),
                Err(e) => print_row(&format!("{hook_type} template"), e.red()),
            }
        }

        if !self.store {
            return Ok(0);
        }

        let store = context.store()?;
        print_row("store", store.directory().display());
        let installed = store.installed()?;
        for environment in &installed {
            print_row(
                &environment.identity.to_string(),
                environment.directory.display().dimmed(),
            );
        }
        Ok(installed.len())
    }
}

fn print_path(label: &str, path: &Path) {
    if path.exists() {
        print_row(label, path.display());
    } else {
        print_row(label, format!("{} ({MISSING})", path.display()).dimmed());
    }
}

fn print_row(label: &str, value: impl Display) {
    println!("{:>22}  {value}", label.bold());
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use prehook_core::{AbsPath, HookSelection, HookSourceDescriptor};
    use prehook_engine::Store;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_paths_lists_installed_environments() {
        let temp = TempDir::new().unwrap();
        let store_dir = temp.path().join("store");
        let context = ExecutionContext::builder(AbsPath::new(temp.path().join("repo")).unwrap())
            .store_factory(move || Ok(Store::in_memory(&store_dir)))
            .build();

        let source = HookSourceDescriptor {
            repo: "https://example.com/hooks".to_string(),
            rev: "v1".to_string(),
            hooks: vec![HookSelection {
                id: "lint".to_string(),
                args: vec![],
                files: None,
                exclude: None,
            }],
        };
        let store = context.store().unwrap();
        let dir = store.environment_dir(&source.identity());
        fs::create_dir_all(&dir).unwrap();
        store.register_environment(&source, dir).unwrap();

        assert_eq!(PathsCommand { store: false }.execute(&context).unwrap(), 0);
        assert_eq!(PathsCommand { store: true }.execute(&context).unwrap(), 1);
    }
}
