use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use directories::BaseDirs;
use log::{info, warn};
use walkdir::WalkDir;
use crate::capability::{Capabilities, PermissionState};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::extensions::BuiltinFeature;
use crate::model::{AppEntry, ExtensionEntry, ExtensionKind};
use crate::state::Message;
use crate::store::Store;

#[derive(Debug, Clone, Copy)]
pub enum LaunchTarget<'a> {
    App(&'a AppEntry),
    Extension(&'a ExtensionEntry),
}

impl LaunchTarget<'_> {
    pub fn key(&self) -> &str {
        match self {
            LaunchTarget::App(app) => &app.package_name,
            LaunchTarget::Extension(ext) => &ext.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            LaunchTarget::App(app) => &app.label,
            LaunchTarget::Extension(ext) => &ext.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileItem {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    Started,
    Files(Vec<FileItem>),
    Scanned(String),
    Terminated(i32),
    /// A capability check failed; nothing ran and no usage was recorded.
    Blocked(Message),
}

impl LaunchOutcome {
    pub fn message(&self, label: &str) -> Message {
        match self {
            LaunchOutcome::Started => Message::success(format!("Launched {label}")),
            LaunchOutcome::Files(items) => Message::success(format!("{} items", items.len())),
            LaunchOutcome::Scanned(payload) => Message::success(format!("Scanned: {payload}")),
            LaunchOutcome::Terminated(pid) => Message::success(format!("Sent SIGTERM to {pid}")),
            LaunchOutcome::Blocked(message) => message.clone(),
        }
    }
}

pub struct Launcher<'a> {
    config: &'a Config,
    store: &'a mut Store,
    capabilities: &'a Capabilities,
}

impl<'a> Launcher<'a> {
    pub fn new(config: &'a Config, store: &'a mut Store, capabilities: &'a Capabilities) -> Self {
        Self { config, store, capabilities }
    }

    /// Runs the target and, if it actually ran, bumps its priority and logs a usage event.
    pub fn launch(&mut self, target: LaunchTarget<'_>, arg: Option<&str>) -> Result<LaunchOutcome> {
        let outcome = match target {
            LaunchTarget::App(app) => self.launch_app(app)?,
            LaunchTarget::Extension(ext) => self.launch_extension(ext, arg)?,
        };

        if let LaunchOutcome::Blocked(message) = &outcome {
            warn!("Launch of {} blocked: {}", target.key(), message.text);
        } else {
            self.store.record_launch(target.key())?;
            info!("Launched {}", target.key());
        }
        Ok(outcome)
    }

    fn launch_app(&self, app: &AppEntry) -> Result<LaunchOutcome> {
        let command = match &app.command {
            Some(command) => command.clone(),
            None => self
                .config
                .general
                .launch_command
                .replace("{package}", &app.package_name),
        };
        spawn(&command, None)?;
        Ok(LaunchOutcome::Started)
    }

    fn launch_extension(&self, ext: &ExtensionEntry, arg: Option<&str>) -> Result<LaunchOutcome> {
        match ext.kind {
            ExtensionKind::Scheme => {
                spawn(&self.config.general.opener, Some(&ext.invocation))?;
                Ok(LaunchOutcome::Started)
            }
            ExtensionKind::Intent => {
                spawn(&self.config.general.intent_command, Some(&ext.invocation))?;
                Ok(LaunchOutcome::Started)
            }
            ExtensionKind::Action => {
                spawn(&ext.invocation, arg)?;
                Ok(LaunchOutcome::Started)
            }
            ExtensionKind::Internal => {
                let feature = BuiltinFeature::from_invocation(&ext.invocation)
                    .ok_or_else(|| Error::Unavailable(ext.invocation.clone()))?;
                self.run_builtin(feature, arg)
            }
        }
    }

    fn run_builtin(&self, feature: BuiltinFeature, arg: Option<&str>) -> Result<LaunchOutcome> {
        match feature {
            BuiltinFeature::Files => {
                let dir = match arg {
                    Some(dir) => PathBuf::from(dir),
                    None => BaseDirs::new()
                        .map(|d| d.home_dir().to_path_buf())
                        .unwrap_or_else(|| PathBuf::from("/")),
                };
                Ok(LaunchOutcome::Files(list_dir(&dir)?))
            }
            BuiltinFeature::KillProcess => {
                let pid: i32 = arg
                    .and_then(|a| a.trim().parse().ok())
                    .ok_or_else(|| Error::Launch("kill-process needs a numeric pid".into()))?;
                match self.capabilities.processes.permission(pid)? {
                    PermissionState::Granted => {
                        self.capabilities.processes.terminate(pid)?;
                        Ok(LaunchOutcome::Terminated(pid))
                    }
                    PermissionState::Denied => Ok(LaunchOutcome::Blocked(Message::warning(format!(
                        "Not allowed to stop process {pid}"
                    )))),
                    PermissionState::NotInstalled => Ok(LaunchOutcome::Blocked(Message::warning(
                        "Process control is not available",
                    ))),
                }
            }
            BuiltinFeature::Scanner => match self.capabilities.scanner.permission() {
                PermissionState::Granted => Ok(LaunchOutcome::Scanned(self.capabilities.scanner.scan()?)),
                PermissionState::Denied => Ok(LaunchOutcome::Blocked(Message::warning(
                    "Camera permission is required to scan",
                ))),
                PermissionState::NotInstalled => Ok(LaunchOutcome::Blocked(Message::warning(
                    "Scanner is not installed",
                ))),
            },
        }
    }
}

/// Splits `base` on whitespace and appends `extra` as a single argument.
fn spawn(base: &str, extra: Option<&str>) -> Result<()> {
    let mut parts: Vec<&str> = base.split_whitespace().collect();
    parts.extend(extra);

    let Some((program, args)) = parts.split_first() else {
        return Err(Error::Launch("empty command".into()));
    };

    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::Launch(format!("{program}: {e}")))?;
    Ok(())
}

/// Direct children of `dir`, directories first, then by name.
fn list_dir(dir: &Path) -> Result<Vec<FileItem>> {
    if !dir.is_dir() {
        return Err(Error::NotFound(dir.display().to_string()));
    }

    let mut items: Vec<FileItem> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| FileItem {
            name: e.file_name().to_string_lossy().into_owned(),
            is_dir: e.file_type().is_dir(),
            path: e.into_path(),
        })
        .collect();
    items.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{NoScanner, ProcessControl};
    use crate::extensions::builtin_extensions;
    use crate::model::InstalledPackage;
    use crate::state::MessageLevel;
    use crate::transliterate::Transliterator;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FakeProcesses {
        state: PermissionState,
        killed: Mutex<Vec<i32>>,
    }

    impl ProcessControl for FakeProcesses {
        fn permission(&self, _pid: i32) -> Result<PermissionState> {
            Ok(self.state)
        }

        fn terminate(&self, pid: i32) -> Result<()> {
            self.killed.lock().unwrap().push(pid);
            Ok(())
        }
    }

    fn caps(state: PermissionState) -> Capabilities {
        Capabilities {
            scanner: Box::new(NoScanner),
            processes: Box::new(FakeProcesses { state, killed: Mutex::new(Vec::new()) }),
        }
    }

    fn seeded_store(command: Option<&str>) -> (Store, AppEntry, Vec<ExtensionEntry>) {
        let tr = Transliterator::new();
        let mut store = Store::open_in_memory().unwrap();
        let app = AppEntry::from_package(
            InstalledPackage {
                label: "True".into(),
                package_name: "org.true".into(),
                command: command.map(String::from),
            },
            &tr,
        );
        store.replace_apps(std::slice::from_ref(&app)).unwrap();
        let extensions = builtin_extensions(&tr);
        store.replace_extensions(&extensions).unwrap();
        (store, app, extensions)
    }

    fn builtin<'a>(extensions: &'a [ExtensionEntry], id: &str) -> &'a ExtensionEntry {
        extensions.iter().find(|e| e.id == id).unwrap()
    }

    #[test]
    fn app_launch_records_usage() {
        let (mut store, app, _) = seeded_store(Some("true"));
        let config = Config::default();
        let caps = Capabilities::default();

        let outcome = Launcher::new(&config, &mut store, &caps)
            .launch(LaunchTarget::App(&app), None)
            .unwrap();
        assert_eq!(outcome, LaunchOutcome::Started);
        assert_eq!(store.get_app("org.true").unwrap().unwrap().priority, 1);
        assert_eq!(store.usage_count("org.true").unwrap(), 1);
    }

    #[test]
    fn failed_spawn_records_nothing() {
        let (mut store, app, _) = seeded_store(Some("/nonexistent/leap-test-binary"));
        let config = Config::default();
        let caps = Capabilities::default();

        let err = Launcher::new(&config, &mut store, &caps)
            .launch(LaunchTarget::App(&app), None)
            .unwrap_err();
        assert!(matches!(err, Error::Launch(_)));
        assert_eq!(store.usage_count("org.true").unwrap(), 0);
    }

    #[test]
    fn launch_template_is_used_without_command() {
        let (mut store, app, _) = seeded_store(None);
        let mut config = Config::default();
        config.general.launch_command = "true {package}".into();
        let caps = Capabilities::default();

        Launcher::new(&config, &mut store, &caps)
            .launch(LaunchTarget::App(&app), None)
            .unwrap();
        assert_eq!(store.usage_count("org.true").unwrap(), 1);
    }

    #[test]
    fn empty_command_is_an_error() {
        assert!(matches!(spawn("   ", None), Err(Error::Launch(_))));
    }

    #[test]
    fn files_lists_directory() {
        let (mut store, _, extensions) = seeded_store(None);
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("z")).unwrap();
        fs::write(dir.path().join("z").join("nested.txt"), "n").unwrap();

        let config = Config::default();
        let caps = Capabilities::default();
        let outcome = Launcher::new(&config, &mut store, &caps)
            .launch(
                LaunchTarget::Extension(builtin(&extensions, "files")),
                dir.path().to_str(),
            )
            .unwrap();

        let LaunchOutcome::Files(items) = outcome else { panic!("expected listing") };
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a.txt", "b.txt"]);
        assert!(items[0].is_dir);
        assert_eq!(store.usage_count("files").unwrap(), 1);
    }

    #[test]
    fn kill_process_checks_permission_first() {
        let (mut store, _, extensions) = seeded_store(None);
        let config = Config::default();
        let kill = builtin(&extensions, "kill-process");

        let denied = caps(PermissionState::Denied);
        let outcome = Launcher::new(&config, &mut store, &denied)
            .launch(LaunchTarget::Extension(kill), Some("4242"))
            .unwrap();
        let LaunchOutcome::Blocked(message) = outcome else { panic!("expected blocked") };
        assert_eq!(message.level, MessageLevel::Warning);
        assert_eq!(store.usage_count("kill-process").unwrap(), 0);

        let granted = caps(PermissionState::Granted);
        let outcome = Launcher::new(&config, &mut store, &granted)
            .launch(LaunchTarget::Extension(kill), Some(" 4242 "))
            .unwrap();
        assert_eq!(outcome, LaunchOutcome::Terminated(4242));
        assert_eq!(store.usage_count("kill-process").unwrap(), 1);

        let err = Launcher::new(&config, &mut store, &granted)
            .launch(LaunchTarget::Extension(kill), Some("abc"))
            .unwrap_err();
        assert!(matches!(err, Error::Launch(_)));
    }

    #[test]
    fn missing_scanner_is_blocked() {
        let (mut store, _, extensions) = seeded_store(None);
        let config = Config::default();
        let caps = Capabilities::default();
        let outcome = Launcher::new(&config, &mut store, &caps)
            .launch(LaunchTarget::Extension(builtin(&extensions, "scanner")), None)
            .unwrap();
        assert!(matches!(outcome, LaunchOutcome::Blocked(_)));
        assert_eq!(store.usage_count("scanner").unwrap(), 0);
    }

    #[test]
    fn unknown_internal_feature_is_unavailable() {
        let (mut store, _, _) = seeded_store(None);
        let ext = ExtensionEntry::new("x", "X", "", ExtensionKind::Internal, "teleport");
        let config = Config::default();
        let caps = Capabilities::default();
        let err = Launcher::new(&config, &mut store, &caps)
            .launch(LaunchTarget::Extension(&ext), None)
            .unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
    }
}
