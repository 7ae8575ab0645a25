//! Repository resolution
//!
//! Turns the configured hook-source descriptors into installed, runnable
//! repositories. Resolution never installs anything: a source without an
//! installed environment aborts the whole resolution with
//! [`Error::InstallationMissing`].

use crate::store::{InstalledEnvironment, Store};
use prehook_core::{Error, HookSourceDescriptor, Result};
use std::path::Path;
use tracing::debug;

/// A configured hook source bound to a store, not yet verified
#[derive(Debug)]
pub struct Repository<'s> {
    descriptor: HookSourceDescriptor,
    store: &'s Store,
}

impl<'s> Repository<'s> {
    /// Construct a handle for `descriptor`; performs no lookup and no install
    pub fn create(descriptor: HookSourceDescriptor, store: &'s Store) -> Self {
        Self { descriptor, store }
    }

    /// The descriptor this handle was created from
    pub fn descriptor(&self) -> &HookSourceDescriptor {
        &self.descriptor
    }

    /// Verify the store holds an installed environment for this source
    ///
    /// A record whose environment directory has disappeared counts as missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InstallationMissing`] if the source is not installed,
    /// or a store error if the lookup itself fails.
    pub fn require_installed(&self) -> Result<InstalledEnvironment> {
        let identity = self.descriptor.identity();
        let missing = || Error::InstallationMissing {
            repo: identity.repo.clone(),
            rev: identity.rev.clone(),
        };

        let environment = self.store.lookup(&identity)?.ok_or_else(missing)?;
        if !environment.directory.is_dir() {
            debug!(
                "Environment for {} recorded at {} but the directory is gone",
                identity,
                environment.directory.display()
            );
            return Err(missing());
        }

        Ok(environment)
    }

    /// Verify installation and pair the descriptor with its environment
    ///
    /// # Errors
    ///
    /// See [`Repository::require_installed`].
    pub fn into_resolved(self) -> Result<ResolvedRepository> {
        let environment = self.require_installed()?;
        Ok(ResolvedRepository {
            descriptor: self.descriptor,
            environment,
        })
    }
}

/// A hook source whose installed environment has been verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRepository {
    descriptor: HookSourceDescriptor,
    environment: InstalledEnvironment,
}

impl ResolvedRepository {
    /// The configured descriptor
    pub fn descriptor(&self) -> &HookSourceDescriptor {
        &self.descriptor
    }

    /// The installed environment
    pub fn environment(&self) -> &InstalledEnvironment {
        &self.environment
    }

    /// Directory of the installed environment
    pub fn environment_dir(&self) -> &Path {
        &self.environment.directory
    }
}

/// Resolve every descriptor against `store`, preserving configuration order
///
/// Verification is sequential and fail-fast: the first source that is not
/// installed aborts resolution, later sources are not checked, and no partial
/// list is returned.
///
/// # Errors
///
/// Returns [`Error::InstallationMissing`] for the first uninstalled source.
pub fn resolve(
    descriptors: Vec<HookSourceDescriptor>,
    store: &Store,
) -> Result<Vec<ResolvedRepository>> {
    let repositories: Vec<Repository<'_>> = descriptors
        .into_iter()
        .map(|descriptor| Repository::create(descriptor, store))
        .collect();

    let resolved = repositories
        .into_iter()
        .map(Repository::into_resolved)
        .collect::<Result<Vec<_>>>()?;

    debug!("Resolved {} repositories", resolved.len());
    Ok(resolved)
}
