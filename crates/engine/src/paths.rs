//! Canonical hook-script and config locations
//!
//! Pure functions of the git root. Nothing here touches the filesystem.

use prehook_core::{CONFIG_FILE, HookType};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to a live hook path to form its legacy backup path
pub const LEGACY_SUFFIX: &str = ".legacy";

/// `root/.prehook.toml`
pub fn config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// `root/.git/hooks`
pub fn hooks_dir(root: &Path) -> PathBuf {
    root.join(".git").join("hooks")
}

/// `root/.git/hooks/<hook_type>`; existence is not checked
pub fn hook_path(root: &Path, hook_type: HookType) -> PathBuf {
    hooks_dir(root).join(hook_type.name())
}

/// `<hook_path>.legacy`
///
/// The legacy file holds a user script displaced by installation. It is never
/// an active hook and is never deleted here.
pub fn legacy_path(hook_path: &Path) -> PathBuf {
    let mut path = OsString::from(hook_path.as_os_str());
    path.push(LEGACY_SUFFIX);
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_config_file_path() {
        assert_eq!(
            config_file_path(Path::new("/srv/repo")),
            PathBuf::from("/srv/repo/.prehook.toml")
        );
    }

    #[test]
    fn test_hook_paths() {
        let root = Path::new("/srv/repo");
        assert_eq!(
            hook_path(root, HookType::PreCommit),
            PathBuf::from("/srv/repo/.git/hooks/pre-commit")
        );
        assert_eq!(
            hook_path(root, HookType::PrePush),
            PathBuf::from("/srv/repo/.git/hooks/pre-push")
        );
    }

    #[test]
    fn test_legacy_path_is_suffix_of_hook_path() {
        for root in ["/srv/repo", "/home/user/with space", "/tmp/x.y", "/"] {
            for hook_type in HookType::ALL {
                let live = hook_path(Path::new(root), hook_type);
                let legacy = legacy_path(&live);
                assert_eq!(
                    legacy.to_string_lossy(),
                    format!("{}.legacy", live.to_string_lossy())
                );
                assert_eq!(legacy.parent(), live.parent());
            }
        }
    }

    #[test]
    fn test_legacy_path_does_not_replace_extension() {
        let legacy = legacy_path(Path::new("/repo/.git/hooks/pre-commit.sample"));
        assert_eq!(
            legacy,
            PathBuf::from("/repo/.git/hooks/pre-commit.sample.legacy")
        );
    }
}
