//! Execution context for one prehook invocation
//!
//! An [`ExecutionContext`] is bound to the root of the repository under test.
//! Everything it exposes (config location, hook script paths, templates, the
//! store handle and the resolved repositories) is computed lazily on first
//! access and then cached for the life of the context. A failed computation is
//! returned to the caller and not cached, so a later access may succeed once
//! the cause has been fixed.
//!
//! # Examples
//!
//! ```no_run
//! use prehook_engine::ExecutionContext;
//!
//! # fn main() -> prehook_core::Result<()> {
//! let ctx = ExecutionContext::create()?;
//! for repo in ctx.repositories()? {
//!     println!("{}", repo.descriptor().identity());
//! }
//! println!("hook installed at {}", ctx.pre_commit_path().display());
//! # Ok(())
//! # }
//! ```

use crate::command::PrefixedCommandRunner;
use crate::paths;
use crate::repository::{self, ResolvedRepository};
use crate::resources;
use crate::store::Store;
use prehook_config::{Git2RootFinder, TomlConfigLoader};
use prehook_core::{AbsPath, ConfigLoader, HookType, Memo, Result, RootFinder};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Factory producing the store handle on first use
pub type StoreFactory = Box<dyn Fn() -> Result<Store>>;

/// The execution context of the hooks: the repository under test and
/// everything derived from it
pub struct ExecutionContext {
    root: AbsPath,
    resources_dir: PathBuf,
    config_loader: Box<dyn ConfigLoader>,
    store_factory: StoreFactory,

    config_file_path: Memo<PathBuf>,
    repositories: Memo<Vec<ResolvedRepository>>,
    pre_commit_path: Memo<PathBuf>,
    pre_push_path: Memo<PathBuf>,
    pre_template: Memo<PathBuf>,
    pre_push_template: Memo<PathBuf>,
    store: Memo<Store>,
    cmd_runner: Memo<PrefixedCommandRunner>,
}

impl ExecutionContext {
    /// Create a context for the repository containing the current directory
    ///
    /// This:
    /// - finds the root of the enclosing git repository
    /// - changes the process working directory to that root, so hook commands
    ///   spawned later observe the same root
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAGitRepository`](prehook_core::Error::NotAGitRepository)
    /// if the current directory is not inside a git working tree.
    pub fn create() -> Result<Self> {
        Self::create_with(&Git2RootFinder)
    }

    /// [`ExecutionContext::create`] with an explicit root finder
    ///
    /// # Errors
    ///
    /// Propagates the root finder's error unchanged.
    pub fn create_with(finder: &dyn RootFinder) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let root = AbsPath::new(finder.find_root(&cwd)?)?;

        // The only place prehook mutates ambient process state
        std::env::set_current_dir(root.as_path())?;
        debug!("Changed working directory to {}", root);

        Ok(Self::new(root))
    }

    /// Context for `root` with the default collaborators
    pub fn new(root: AbsPath) -> Self {
        Self::builder(root).build()
    }

    /// Start building a context for `root`
    pub fn builder(root: AbsPath) -> ExecutionContextBuilder {
        ExecutionContextBuilder::new(root)
    }

    /// Root of the repository under test
    pub fn root(&self) -> &AbsPath {
        &self.root
    }

    /// `<root>/.prehook.toml`
    pub fn config_file_path(&self) -> &Path {
        self.config_file_path
            .get_or_init(|| paths::config_file_path(self.root.as_path()))
    }

    /// The configured repositories, in configuration order, each verified as
    /// installed
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the config fails to load, `InstallationMissing`
    /// if a configured source is not installed, or a store error. Failures are
    /// not cached.
    pub fn repositories(&self) -> Result<&[ResolvedRepository]> {
        self.repositories
            .get_or_try_init(|| {
                let descriptors = self.config_loader.load_config(self.config_file_path())?;
                repository::resolve(descriptors, self.store()?)
            })
            .map(Vec::as_slice)
    }

    /// `<root>/.git/hooks/<hook_type>`
    pub fn get_hook_path(&self, hook_type: HookType) -> PathBuf {
        paths::hook_path(self.root.as_path(), hook_type)
    }

    /// `<root>/.git/hooks/pre-commit`
    pub fn pre_commit_path(&self) -> &Path {
        self.pre_commit_path
            .get_or_init(|| self.get_hook_path(HookType::PreCommit))
    }

    /// `<root>/.git/hooks/pre-push`
    pub fn pre_push_path(&self) -> &Path {
        self.pre_push_path
            .get_or_init(|| self.get_hook_path(HookType::PrePush))
    }

    /// Where an existing pre-commit script is kept while prehook occupies the slot
    pub fn pre_commit_legacy_path(&self) -> PathBuf {
        paths::legacy_path(self.pre_commit_path())
    }

    /// Where an existing pre-push script is kept while prehook occupies the slot
    pub fn pre_push_legacy_path(&self) -> PathBuf {
        paths::legacy_path(self.pre_push_path())
    }

    /// Bundled pre-commit script template
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the template is missing.
    pub fn pre_template(&self) -> Result<&Path> {
        self.pre_template
            .get_or_try_init(|| {
                resources::resource_path(&self.resources_dir, resources::HOOK_TEMPLATE)
            })
            .map(PathBuf::as_path)
    }

    /// Bundled pre-push script template
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the template is missing.
    pub fn pre_push_template(&self) -> Result<&Path> {
        self.pre_push_template
            .get_or_try_init(|| {
                resources::resource_path(&self.resources_dir, resources::PRE_PUSH_TEMPLATE)
            })
            .map(PathBuf::as_path)
    }

    /// Live hook path for `hook_type` (memoized)
    pub fn hook_path_for(&self, hook_type: HookType) -> &Path {
        match hook_type {
            HookType::PreCommit => self.pre_commit_path(),
            HookType::PrePush => self.pre_push_path(),
        }
    }

    /// Legacy backup path for `hook_type`
    pub fn legacy_path_for(&self, hook_type: HookType) -> PathBuf {
        match hook_type {
            HookType::PreCommit => self.pre_commit_legacy_path(),
            HookType::PrePush => self.pre_push_legacy_path(),
        }
    }

    /// Bundled template for `hook_type` (memoized)
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the template is missing.
    pub fn template_for(&self, hook_type: HookType) -> Result<&Path> {
        match hook_type {
            HookType::PreCommit => self.pre_template(),
            HookType::PrePush => self.pre_push_template(),
        }
    }

    /// The store handle, opened once per context
    ///
    /// All resolution and installation work in this invocation goes through
    /// this single handle.
    ///
    /// # Errors
    ///
    /// Returns a store error if the store cannot be opened; not cached.
    pub fn store(&self) -> Result<&Store> {
        self.store.get_or_try_init(|| (self.store_factory)())
    }

    /// Command runner scoped to the context's store directory
    ///
    /// # Errors
    ///
    /// Returns a store error if the store cannot be opened; not cached.
    pub fn cmd_runner(&self) -> Result<&PrefixedCommandRunner> {
        self.cmd_runner
            .get_or_try_init(|| Ok(self.store()?.cmd_runner()))
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("root", &self.root)
            .field("resources_dir", &self.resources_dir)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ExecutionContext`]
///
/// ```no_run
/// use prehook_core::AbsPath;
/// use prehook_engine::{ExecutionContext, Store};
///
/// # fn main() -> prehook_core::Result<()> {
/// let ctx = ExecutionContext::builder(AbsPath::new("/srv/repo".into())?)
///     .store_factory(|| Store::open("/tmp/prehook-store"))
///     .build();
/// # Ok(())
/// # }
/// ```
pub struct ExecutionContextBuilder {
    root: AbsPath,
    resources_dir: Option<PathBuf>,
    config_loader: Box<dyn ConfigLoader>,
    store_factory: StoreFactory,
}

impl ExecutionContextBuilder {
    /// Builder with the TOML config loader and the default on-disk store
    pub fn new(root: AbsPath) -> Self {
        Self {
            root,
            resources_dir: None,
            config_loader: Box::new(TomlConfigLoader),
            store_factory: Box::new(Store::open_default),
        }
    }

    /// Use a different config loader
    #[must_use]
    pub fn config_loader(mut self, loader: impl ConfigLoader + 'static) -> Self {
        self.config_loader = Box::new(loader);
        self
    }

    /// Use a different store factory
    #[must_use]
    pub fn store_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<Store> + 'static,
    {
        self.store_factory = Box::new(factory);
        self
    }

    /// Look for bundled templates in `dir`
    #[must_use]
    pub fn resources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resources_dir = Some(dir.into());
        self
    }

    /// Build the context; nothing is computed yet
    pub fn build(self) -> ExecutionContext {
        ExecutionContext {
            root: self.root,
            resources_dir: self
                .resources_dir
                .unwrap_or_else(resources::default_resources_dir),
            config_loader: self.config_loader,
            store_factory: self.store_factory,
            config_file_path: Memo::new(),
            repositories: Memo::new(),
            pre_commit_path: Memo::new(),
            pre_push_path: Memo::new(),
            pre_template: Memo::new(),
            pre_push_template: Memo::new(),
            store: Memo::new(),
            cmd_runner: Memo::new(),
        }
    }
}
