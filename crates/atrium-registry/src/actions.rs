//! Batch action dispatch
//!
//! One admin request carries at most one command (delete, install,
//! activate, deactivate, update, clone, select, manual package) applied
//! to one or more selected modules. The dispatcher resolves the command
//! from the POST body in a fixed priority order, gates it on permissions
//! and writability, processes the selected items best-effort and finishes
//! with a notice plus a redirect back to the list.

use atrium_core::types::ModuleInfo;
use atrium_core::{Auth, Error, NoticeSink, PreferenceStore, RequestContext, Result};
use tracing::{debug, info, warn};

use crate::hooks::RegistryHooks;
use crate::registry::{version_newer, ModuleRegistry};
use crate::source::ModuleSource;
use crate::store::{InstallOutcome, Store};

/// POST field carrying the re-entered password for manual packages
const PASSWORD_FIELD: &str = "your_pwd";

/// Transient result of one batch command
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Items processed successfully
    pub count: usize,
    /// Skipped items with their reasons
    pub failed: Vec<(String, String)>,
}

impl BatchOutcome {
    fn succeed(&mut self) {
        self.count += 1;
    }

    fn fail(&mut self, id: &str, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("Skipping {}: {}", id, reason);
        self.failed.push((id.to_string(), reason));
    }
}

/// Post-action redirect target (redirect-after-POST)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect(pub String);

/// The closed command set, in dispatch priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Select,
    Delete,
    Install,
    Activate,
    Deactivate,
    Update,
    Clone,
    UploadPackage,
    FetchPackage,
}

impl Command {
    fn field(self) -> &'static str {
        match self {
            Command::Select => "select",
            Command::Delete => "delete",
            Command::Install => "install",
            Command::Activate => "activate",
            Command::Deactivate => "deactivate",
            Command::Update => "update",
            Command::Clone => "clone",
            Command::UploadPackage => "upload_pkg",
            Command::FetchPackage => "fetch_pkg",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            Command::Select => "selected",
            Command::Delete => "deleted",
            Command::Install => "installed",
            Command::Activate => "activated",
            Command::Deactivate => "deactivated",
            Command::Update => "updated",
            Command::Clone => "cloned",
            Command::UploadPackage | Command::FetchPackage => "installed",
        }
    }
}

/// Executes batch commands against one registry's installed set
///
/// Collaborators are borrowed so callers keep ownership of their mocks
/// and state; the dispatcher itself is request-scoped.
pub struct ActionDispatcher<'a> {
    list_type: String,
    list_url: String,
    source: &'a mut dyn ModuleSource,
    store: Option<&'a Store>,
    auth: &'a dyn Auth,
    prefs: &'a mut dyn PreferenceStore,
    notices: &'a mut dyn NoticeSink,
    hooks: Option<&'a mut dyn RegistryHooks>,
    dev_mode: bool,
    multi_install: bool,
    selectable: bool,
}

impl<'a> ActionDispatcher<'a> {
    pub fn new(
        list_type: impl Into<String>,
        list_url: impl Into<String>,
        source: &'a mut dyn ModuleSource,
        auth: &'a dyn Auth,
        prefs: &'a mut dyn PreferenceStore,
        notices: &'a mut dyn NoticeSink,
    ) -> Self {
        Self {
            list_type: list_type.into(),
            list_url: list_url.into(),
            source,
            store: None,
            auth,
            prefs,
            notices,
            hooks: None,
            dev_mode: false,
            multi_install: false,
            selectable: false,
        }
    }

    pub fn with_store(mut self, store: &'a Store) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_hooks(mut self, hooks: &'a mut dyn RegistryHooks) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Allow deleting module roots outside the managed root
    pub fn with_dev_mode(mut self, enabled: bool) -> Self {
        self.dev_mode = enabled;
        self
    }

    /// Install updates side by side instead of replacing in place
    pub fn with_multi_install(mut self, enabled: bool) -> Self {
        self.multi_install = enabled;
        self
    }

    /// Enable the theme `select` command
    pub fn with_selection(mut self, enabled: bool) -> Self {
        self.selectable = enabled;
        self
    }

    /// Dispatch at most one command from the request
    ///
    /// Returns the redirect target when a command ran, None when the
    /// request carried no recognized command and no hook claimed it.
    pub async fn do_actions(
        &mut self,
        ctx: &RequestContext,
        registry: &ModuleRegistry,
    ) -> Result<Option<Redirect>> {
        let commands = [
            Command::Select,
            Command::Delete,
            Command::Install,
            Command::Activate,
            Command::Deactivate,
            Command::Update,
            Command::Clone,
            Command::UploadPackage,
            Command::FetchPackage,
        ];

        // First matching non-empty field wins; at most one command per request.
        let Some(command) = commands
            .into_iter()
            .filter(|c| self.selectable || *c != Command::Select)
            .find(|c| ctx.post_set(c.field()))
        else {
            if let Some(hooks) = self.hooks.as_deref_mut() {
                if hooks.custom_action(ctx) {
                    debug!("Request handled by custom action hook");
                    return Ok(Some(Redirect(self.list_url.clone())));
                }
            }
            return Ok(None);
        };

        self.gate(command, ctx)?;

        let outcome = match command {
            Command::Select => self.do_select(ctx, registry)?,
            Command::Delete => self.do_delete(ctx, registry)?,
            Command::Activate => self.do_activate(ctx, registry)?,
            Command::Deactivate => self.do_deactivate(ctx, registry)?,
            Command::Clone => self.do_clone(ctx)?,
            Command::Install => self.do_install(ctx).await?,
            Command::Update => self.do_update(ctx, registry).await?,
            Command::UploadPackage => self.do_upload(ctx)?,
            Command::FetchPackage => self.do_fetch(ctx).await?,
        };

        self.finish(command, outcome)?;
        Ok(Some(Redirect(self.list_url.clone())))
    }

    /// Privilege and writability gates shared by every command
    fn gate(&self, command: Command, ctx: &RequestContext) -> Result<()> {
        if command == Command::Select {
            // Selection only needs the page's own write permission.
            if !self.auth.check("admin", &self.list_type) {
                return Err(Error::permission_denied("select"));
            }
            return Ok(());
        }

        if !self.auth.is_super_admin() {
            return Err(Error::permission_denied(command.field()));
        }
        if !self.source.root_writable() {
            return Err(Error::source_not_writable(
                self.source.root().display().to_string(),
            ));
        }

        if matches!(command, Command::UploadPackage | Command::FetchPackage) {
            let password = ctx.post_text(PASSWORD_FIELD).unwrap_or("");
            if !self.auth.verify_password(password) {
                return Err(Error::permission_denied("package upload: bad password"));
            }
        }
        Ok(())
    }

    /// Theme selection: single target, first id wins
    fn do_select(&mut self, ctx: &RequestContext, registry: &ModuleRegistry) -> Result<BatchOutcome> {
        let ids = ctx.post_ids(Command::Select.field());
        let id = ids
            .first()
            .ok_or_else(|| Error::not_found("theme", "<none>"))?;
        if registry.module(id).is_none() {
            return Err(Error::not_found("theme", id));
        }

        if let Some(hooks) = self.hooks.as_deref_mut() {
            hooks.before_select(id);
        }
        self.prefs.set_current_theme(id);
        if let Some(hooks) = self.hooks.as_deref_mut() {
            hooks.after_select(id);
        }
        info!("Selected theme {}", id);

        let mut outcome = BatchOutcome::default();
        outcome.succeed();
        Ok(outcome)
    }

    fn do_delete(&mut self, ctx: &RequestContext, registry: &ModuleRegistry) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        for id in ctx.post_ids(Command::Delete.field()) {
            let Some(module) = registry.module(&id) else {
                outcome.fail(&id, "not installed");
                continue;
            };
            if let Some(reason) = self.delete_blocker(module) {
                outcome.fail(&id, reason);
                continue;
            }

            let module = module.clone();
            if let Some(hooks) = self.hooks.as_deref_mut() {
                hooks.before_delete(&id);
            }
            match self.source.delete(&id) {
                Ok(()) => {
                    if let Some(hooks) = self.hooks.as_deref_mut() {
                        hooks.after_delete(&module);
                    }
                    outcome.succeed();
                }
                Err(e) => outcome.fail(&id, e.to_string()),
            }
        }
        Ok(outcome)
    }

    /// Why a module must not be deleted, if anything blocks it
    fn delete_blocker(&self, module: &ModuleInfo) -> Option<String> {
        if !module.cannot_disable.is_empty() {
            return Some(format!("required by {}", module.cannot_disable.join(", ")));
        }
        if self.list_type == "themes" && module.distributed {
            return Some("distributed themes cannot be deleted".to_string());
        }
        if !module.root_writable {
            return Some("module files are not writable".to_string());
        }
        if !self.dev_mode && !module.root.starts_with(self.source.root()) {
            return Some("module lives outside the managed root".to_string());
        }
        None
    }

    fn do_activate(&mut self, ctx: &RequestContext, registry: &ModuleRegistry) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        for id in ctx.post_ids(Command::Activate.field()) {
            let Some(module) = registry.module(&id) else {
                outcome.fail(&id, "not installed");
                continue;
            };
            if !module.cannot_enable.is_empty() {
                outcome.fail(&id, module.cannot_enable.join(", "));
                continue;
            }

            if let Some(hooks) = self.hooks.as_deref_mut() {
                hooks.before_activate(&id);
            }
            match self.source.activate(&id) {
                Ok(()) => {
                    if let Some(hooks) = self.hooks.as_deref_mut() {
                        hooks.after_activate(&id);
                    }
                    outcome.succeed();
                }
                Err(e) => outcome.fail(&id, e.to_string()),
            }
        }
        Ok(outcome)
    }

    fn do_deactivate(&mut self, ctx: &RequestContext, registry: &ModuleRegistry) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        for id in ctx.post_ids(Command::Deactivate.field()) {
            let Some(module) = registry.module(&id) else {
                outcome.fail(&id, "not installed");
                continue;
            };
            if !module.cannot_disable.is_empty() {
                outcome.fail(&id, format!("required by {}", module.cannot_disable.join(", ")));
                continue;
            }
            if !module.root_writable {
                outcome.fail(&id, "module files are not writable");
                continue;
            }

            if let Some(hooks) = self.hooks.as_deref_mut() {
                hooks.before_deactivate(&id);
            }
            match self.source.deactivate(&id) {
                Ok(()) => {
                    if let Some(hooks) = self.hooks.as_deref_mut() {
                        hooks.after_deactivate(&id);
                    }
                    outcome.succeed();
                }
                Err(e) => outcome.fail(&id, e.to_string()),
            }
        }
        Ok(outcome)
    }

    fn do_clone(&mut self, ctx: &RequestContext) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        for id in ctx.post_ids(Command::Clone.field()) {
            if let Some(hooks) = self.hooks.as_deref_mut() {
                hooks.before_clone(&id);
            }
            match self.source.clone_module(&id) {
                Ok(clone_id) => {
                    if let Some(hooks) = self.hooks.as_deref_mut() {
                        hooks.after_clone(&id, &clone_id);
                    }
                    outcome.succeed();
                }
                Err(e) => outcome.fail(&id, e.to_string()),
            }
        }
        Ok(outcome)
    }

    async fn do_install(&mut self, ctx: &RequestContext) -> Result<BatchOutcome> {
        let store = self.require_store()?;
        let feed = store.get(false).await?;

        let mut outcome = BatchOutcome::default();
        for id in ctx.post_ids(Command::Install.field()) {
            let Some(entry) = feed.get(&id) else {
                outcome.fail(&id, "not available in the repository");
                continue;
            };
            if self.source.module_exists(&id) {
                outcome.fail(&id, "already installed");
                continue;
            }

            if let Some(hooks) = self.hooks.as_deref_mut() {
                hooks.before_install(&id);
            }
            match self.install_package(store, &entry.file, &entry.checksum, &id).await {
                Ok(result) => {
                    if let Some(hooks) = self.hooks.as_deref_mut() {
                        hooks.after_install(&id, result);
                    }
                    outcome.succeed();
                }
                Err(e) => outcome.fail(&id, e.to_string()),
            }
        }
        Ok(outcome)
    }

    async fn do_update(&mut self, ctx: &RequestContext, registry: &ModuleRegistry) -> Result<BatchOutcome> {
        let store = self.require_store()?;
        let feed = store.get(false).await?;

        let mut outcome = BatchOutcome::default();
        for id in ctx.post_ids(Command::Update.field()) {
            let Some(module) = registry.module(&id) else {
                outcome.fail(&id, "not installed");
                continue;
            };
            let Some(entry) = feed.get(&id) else {
                outcome.fail(&id, "not available in the repository");
                continue;
            };
            if !version_newer(&entry.version, &module.version) {
                outcome.fail(&id, "already up to date");
                continue;
            }
            if !self.multi_install && !module.root_writable {
                outcome.fail(&id, "module files are not writable");
                continue;
            }

            // Side-by-side mode keeps the old version under its own path.
            let dest_id = if self.multi_install {
                format!("{id}-{}", entry.version)
            } else {
                id.clone()
            };

            if let Some(hooks) = self.hooks.as_deref_mut() {
                hooks.before_update(&id);
            }
            match self
                .install_package(store, &entry.file, &entry.checksum, &dest_id)
                .await
            {
                Ok(result) => {
                    if let Some(hooks) = self.hooks.as_deref_mut() {
                        hooks.after_update(&id, result);
                    }
                    outcome.succeed();
                }
                Err(e) => outcome.fail(&id, e.to_string()),
            }
        }
        Ok(outcome)
    }

    /// Manual upload: the request carried the package file itself
    fn do_upload(&mut self, ctx: &RequestContext) -> Result<BatchOutcome> {
        let archive = ctx
            .upload()
            .ok_or_else(|| Error::package("no package file uploaded"))?;
        let id = Store::package_id(archive)?;

        if let Some(hooks) = self.hooks.as_deref_mut() {
            hooks.before_install(&id);
        }
        let dest = self.source.root().join(&id);
        let result = Store::install(archive, &dest)?;
        if let Some(hooks) = self.hooks.as_deref_mut() {
            hooks.after_install(&id, result);
        }
        info!("Manually installed {} from upload ({:?})", id, result);

        let mut outcome = BatchOutcome::default();
        outcome.succeed();
        Ok(outcome)
    }

    /// Manual fetch: the request carried a package URL
    async fn do_fetch(&mut self, ctx: &RequestContext) -> Result<BatchOutcome> {
        let url = ctx
            .post_text(Command::FetchPackage.field())
            .ok_or_else(|| Error::package("no package URL given"))?
            .to_string();
        let store = self.require_store()?;

        let archive = store.download(&url).await?;
        let id = Store::package_id(&archive)?;

        if let Some(hooks) = self.hooks.as_deref_mut() {
            hooks.before_install(&id);
        }
        let dest = self.source.root().join(&id);
        let result = Store::install(&archive, &dest)?;
        if let Some(hooks) = self.hooks.as_deref_mut() {
            hooks.after_install(&id, result);
        }
        info!("Manually installed {} from {} ({:?})", id, url, result);

        let mut outcome = BatchOutcome::default();
        outcome.succeed();
        Ok(outcome)
    }

    async fn install_package(
        &self,
        store: &Store,
        url: &str,
        checksum: &str,
        dest_id: &str,
    ) -> Result<InstallOutcome> {
        let archive = store.download(url).await?;
        Store::verify_checksum(&archive, checksum)?;
        Store::install(&archive, &self.source.root().join(dest_id))
    }

    fn require_store(&self) -> Result<&'a Store> {
        self.store
            .ok_or_else(|| Error::feed("no repository configured for this list"))
    }

    /// Surface the batch outcome and decide fatal vs warning vs success
    ///
    /// Zero successes with at least one failure is fatal, whatever the
    /// batch size. Partial failure is a warning, full success a notice.
    fn finish(&mut self, command: Command, outcome: BatchOutcome) -> Result<()> {
        if outcome.count == 0 && !outcome.failed.is_empty() {
            return Err(Error::all_failed(&outcome.failed));
        }

        let noun = if self.list_type == "themes" { "theme" } else { "plugin" };
        if !outcome.failed.is_empty() {
            let details: Vec<String> = outcome
                .failed
                .iter()
                .map(|(id, why)| format!("{id}: {why}"))
                .collect();
            self.notices.warning(&format!(
                "{} {}{} {}, {} skipped ({})",
                outcome.count,
                noun,
                plural(outcome.count),
                command.past_tense(),
                outcome.failed.len(),
                details.join("; ")
            ));
        } else {
            self.notices.success(&format!(
                "{} {}{} {}",
                outcome.count,
                noun,
                plural(outcome.count),
                command.past_tense()
            ));
        }
        Ok(())
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
