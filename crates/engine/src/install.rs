//! Installing prehook's scripts into `.git/hooks`
//!
//! A script that already occupies a hook slot and was not written by prehook
//! is moved to its legacy path, where the bundled template chains to it.

use crate::runner::ExecutionContext;
use prehook_core::{Error, HookType, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Marker line carried by every script prehook writes
pub const MANAGED_MARKER: &str = "prehook-managed";

/// Result of [`install`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The template was written into the hook slot
    Installed,
    /// The slot already holds the current template
    AlreadyInstalled,
    /// A foreign script was moved to the legacy path first
    Migrated,
    /// A foreign script (and any legacy backup) was removed first
    Replaced,
}

/// Result of [`uninstall`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    /// Our script was removed, nothing to restore
    Removed,
    /// Our script was removed and the legacy backup moved back into the slot
    Restored,
    /// The slot holds a script prehook did not write; left alone
    NotOurs,
    /// Nothing installed
    NotInstalled,
}

/// Whether the file at `path` was written by prehook
pub fn is_our_script(path: &Path) -> bool {
    fs::read(path)
        .map(|content| contains_marker(&content))
        .unwrap_or(false)
}

fn contains_marker(content: &[u8]) -> bool {
    content
        .windows(MANAGED_MARKER.len())
        .any(|window| window == MANAGED_MARKER.as_bytes())
}

/// Install the bundled script for `hook_type`
///
/// # Errors
///
/// Returns `ResourceNotFound` if the template is missing, `Message` if a
/// foreign script would displace an existing legacy backup without
/// `overwrite`, or an IO error.
pub fn install(
    ctx: &ExecutionContext,
    hook_type: HookType,
    overwrite: bool,
) -> Result<InstallOutcome> {
    let template = fs::read(ctx.template_for(hook_type)?)?;
    let hook_path = ctx.hook_path_for(hook_type);
    let legacy_path = ctx.legacy_path_for(hook_type);

    if let Some(hooks_dir) = hook_path.parent() {
        fs::create_dir_all(hooks_dir)?;
    }

    let outcome = match fs::read(hook_path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => InstallOutcome::Installed,
        Err(e) => return Err(e.into()),
        Ok(existing) if contains_marker(&existing) => {
            if existing == template {
                debug!("{} already installed at {}", hook_type, hook_path.display());
                return Ok(InstallOutcome::AlreadyInstalled);
            }
            InstallOutcome::Installed
        }
        Ok(_) if overwrite => {
            fs::remove_file(hook_path)?;
            if legacy_path.exists() {
                fs::remove_file(&legacy_path)?;
            }
            InstallOutcome::Replaced
        }
        Ok(_) => {
            if legacy_path.exists() {
                warn!(
                    "Both {} and {} exist",
                    hook_path.display(),
                    legacy_path.display()
                );
                return Err(Error::Message(format!(
                    "Refusing to install {hook_type}: {} already exists. \
                     Use --overwrite to replace the existing script",
                    legacy_path.display()
                )));
            }
            fs::rename(hook_path, &legacy_path)?;
            info!(
                "Moved existing {} script to {}",
                hook_type,
                legacy_path.display()
            );
            InstallOutcome::Migrated
        }
    };

    write_executable(hook_path, &template)?;
    debug!("Installed {} at {}", hook_type, hook_path.display());
    Ok(outcome)
}

/// Remove prehook's script for `hook_type`, restoring any legacy backup
///
/// # Errors
///
/// Returns an IO error if a file cannot be removed or renamed.
pub fn uninstall(ctx: &ExecutionContext, hook_type: HookType) -> Result<UninstallOutcome> {
    let hook_path = ctx.hook_path_for(hook_type);
    let legacy_path = ctx.legacy_path_for(hook_type);

    // A dangling symlink still occupies the slot
    match fs::symlink_metadata(hook_path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(UninstallOutcome::NotInstalled);
        }
        Err(e) => return Err(e.into()),
        Ok(_) => {}
    }
    if !is_our_script(hook_path) {
        debug!("{} is not managed by prehook", hook_path.display());
        return Ok(UninstallOutcome::NotOurs);
    }

    fs::remove_file(hook_path)?;
    if legacy_path.exists() {
        fs::rename(&legacy_path, hook_path)?;
        info!("Restored previous {} script", hook_type);
        return Ok(UninstallOutcome::Restored);
    }
    Ok(UninstallOutcome::Removed)
}

fn write_executable(path: &Path, content: &[u8]) -> Result<()> {
    fs::write(path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::store::Store;
    use prehook_core::AbsPath;
    use tempfile::TempDir;

    const FOREIGN: &str = "#!/bin/sh\necho mine\n";

    fn setup() -> (TempDir, ExecutionContext) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("repo");
        fs::create_dir_all(root.join(".git")).unwrap();
        let store_dir = temp.path().join("store");
        let ctx = ExecutionContext::builder(AbsPath::new(root).unwrap())
            .store_factory(move || Ok(Store::in_memory(&store_dir)))
            .build();
        (temp, ctx)
    }

    #[test]
    fn test_install_into_empty_slot() {
        let (_temp, ctx) = setup();

        let outcome = install(&ctx, HookType::PreCommit, false).unwrap();
        assert_eq!(outcome, InstallOutcome::Installed);
        assert!(is_our_script(ctx.pre_commit_path()));
        assert!(!ctx.pre_commit_legacy_path().exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(ctx.pre_commit_path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_install_is_idempotent() {
        let (_temp, ctx) = setup();

        install(&ctx, HookType::PrePush, false).unwrap();
        let outcome = install(&ctx, HookType::PrePush, false).unwrap();
        assert_eq!(outcome, InstallOutcome::AlreadyInstalled);
        assert!(!ctx.pre_push_legacy_path().exists());
    }

    #[test]
    fn test_install_refreshes_outdated_script() {
        let (_temp, ctx) = setup();
        fs::create_dir_all(ctx.pre_commit_path().parent().unwrap()).unwrap();
        fs::write(ctx.pre_commit_path(), "#!/bin/sh\n# prehook-managed: old\n").unwrap();

        let outcome = install(&ctx, HookType::PreCommit, false).unwrap();
        assert_eq!(outcome, InstallOutcome::Installed);
        assert_eq!(
            fs::read(ctx.pre_commit_path()).unwrap(),
            fs::read(ctx.pre_template().unwrap()).unwrap()
        );
        assert!(!ctx.pre_commit_legacy_path().exists());
    }

    #[test]
    fn test_install_migrates_foreign_script_once() {
        let (_temp, ctx) = setup();
        fs::create_dir_all(ctx.pre_commit_path().parent().unwrap()).unwrap();
        fs::write(ctx.pre_commit_path(), FOREIGN).unwrap();

        let outcome = install(&ctx, HookType::PreCommit, false).unwrap();
        assert_eq!(outcome, InstallOutcome::Migrated);
        assert_eq!(
            fs::read_to_string(ctx.pre_commit_legacy_path()).unwrap(),
            FOREIGN
        );
        assert!(is_our_script(ctx.pre_commit_path()));

        // Second install leaves the backup alone
        let outcome = install(&ctx, HookType::PreCommit, false).unwrap();
        assert_eq!(outcome, InstallOutcome::AlreadyInstalled);
        assert_eq!(
            fs::read_to_string(ctx.pre_commit_legacy_path()).unwrap(),
            FOREIGN
        );
    }

    #[test]
    fn test_install_refuses_to_clobber_backup() {
        let (_temp, ctx) = setup();
        fs::create_dir_all(ctx.pre_commit_path().parent().unwrap()).unwrap();
        fs::write(ctx.pre_commit_path(), FOREIGN).unwrap();
        fs::write(ctx.pre_commit_legacy_path(), "#!/bin/sh\necho older\n").unwrap();

        let err = install(&ctx, HookType::PreCommit, false).unwrap_err();
        assert!(matches!(err, Error::Message(_)));
        assert_eq!(fs::read_to_string(ctx.pre_commit_path()).unwrap(), FOREIGN);
    }

    #[test]
    fn test_install_overwrite_replaces() {
        let (_temp, ctx) = setup();
        fs::create_dir_all(ctx.pre_push_path().parent().unwrap()).unwrap();
        fs::write(ctx.pre_push_path(), FOREIGN).unwrap();
        fs::write(ctx.pre_push_legacy_path(), "#!/bin/sh\necho older\n").unwrap();

        let outcome = install(&ctx, HookType::PrePush, true).unwrap();
        assert_eq!(outcome, InstallOutcome::Replaced);
        assert!(is_our_script(ctx.pre_push_path()));
        assert!(!ctx.pre_push_legacy_path().exists());
    }

    #[test]
    fn test_uninstall_restores_legacy() {
        let (_temp, ctx) = setup();
        fs::create_dir_all(ctx.pre_commit_path().parent().unwrap()).unwrap();
        fs::write(ctx.pre_commit_path(), FOREIGN).unwrap();
        install(&ctx, HookType::PreCommit, false).unwrap();

        let outcome = uninstall(&ctx, HookType::PreCommit).unwrap();
        assert_eq!(outcome, UninstallOutcome::Restored);
        assert_eq!(fs::read_to_string(ctx.pre_commit_path()).unwrap(), FOREIGN);
        assert!(!ctx.pre_commit_legacy_path().exists());
    }

    #[test]
    fn test_uninstall_without_backup() {
        let (_temp, ctx) = setup();
        install(&ctx, HookType::PreCommit, false).unwrap();

        assert_eq!(
            uninstall(&ctx, HookType::PreCommit).unwrap(),
            UninstallOutcome::Removed
        );
        assert!(!ctx.pre_commit_path().exists());
        assert_eq!(
            uninstall(&ctx, HookType::PreCommit).unwrap(),
            UninstallOutcome::NotInstalled
        );
    }

    #[test]
    fn test_uninstall_leaves_foreign_script() {
        let (_temp, ctx) = setup();
        fs::create_dir_all(ctx.pre_push_path().parent().unwrap()).unwrap();
        fs::write(ctx.pre_push_path(), FOREIGN).unwrap();

        assert_eq!(
            uninstall(&ctx, HookType::PrePush).unwrap(),
            UninstallOutcome::NotOurs
        );
        assert_eq!(fs::read_to_string(ctx.pre_push_path()).unwrap(), FOREIGN);
    }

    #[test]
    #[cfg(unix)]
    fn test_uninstall_dangling_symlink_is_not_ours() {
        let (temp, ctx) = setup();
        fs::create_dir_all(ctx.pre_commit_path().parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(temp.path().join("gone"), ctx.pre_commit_path()).unwrap();
        fs::write(ctx.pre_commit_legacy_path(), FOREIGN).unwrap();

        assert_eq!(
            uninstall(&ctx, HookType::PreCommit).unwrap(),
            UninstallOutcome::NotOurs
        );
        assert!(fs::symlink_metadata(ctx.pre_commit_path()).is_ok());
        assert_eq!(
            fs::read_to_string(ctx.pre_commit_legacy_path()).unwrap(),
            FOREIGN
        );
    }

    #[test]
    fn test_is_our_script_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(!is_our_script(&temp.path().join("nope")));
    }
}
