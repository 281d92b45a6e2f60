use cutgraph_config::{ConfigError, ManagerSetup, load_cut_config};
use cutgraph_kernel::test_utils::{ECHO_CUT, EchoCut};
use cutgraph_kernel::{CutError, CutFactory, SelectionStatus};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "cutgraph-config-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.path.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dir should be created");
        }
        fs::write(&path, text).expect("file should be written");
        path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

const LEAVES: &str = r#"
[[cut]]
name = "yes"
type = "cuts::accept_cut"

[[cut]]
name = "no"
type = "cuts::reject_cut"
"#;

const COMBINED: &str = r#"
[[cut]]
name = "either"
type = "cuts::or_cut"
cut_1 = "yes"
cut_2 = "no"

[[cut]]
name = "neither"
type = "cuts::nor_cut"
cut_1 = "yes"
cut_2 = "no"
"#;

#[test]
fn setup_concatenates_files_in_order() {
    let dir = TempDirGuard::new("concat");
    dir.write("cuts/leaves.toml", LEAVES);
    dir.write("cuts/combined.toml", COMBINED);
    let setup_path = dir.write(
        "setup.toml",
        r#"
        [manager]
        logging.priority = "debug"
        cuts.configuration_files = ["cuts/leaves.toml", "cuts/combined.toml"]
        "#,
    );

    let setup = ManagerSetup::load(&setup_path).unwrap();
    assert_eq!(
        setup.configuration_files,
        [
            dir.path().join("cuts/leaves.toml"),
            dir.path().join("cuts/combined.toml"),
        ]
    );

    let manager = setup.build().unwrap();
    assert_eq!(
        manager.cut_names().collect::<Vec<_>>(),
        ["yes", "no", "either", "neither"]
    );
    assert_eq!(
        manager.process("either").unwrap(),
        SelectionStatus::Accepted
    );
    assert_eq!(
        manager.process("neither").unwrap(),
        SelectionStatus::Rejected
    );
}

#[test]
fn no_preload_needs_a_custom_factory() {
    let dir = TempDirGuard::new("no-preload");
    dir.write(
        "echo.toml",
        &format!("[[cut]]\nname = \"echo\"\ntype = \"{ECHO_CUT}\"\n"),
    );
    let setup_path = dir.write(
        "setup.toml",
        "[manager]\nfactory.no_preload = true\ncuts.configuration_files = [\"echo.toml\"]\n",
    );
    let setup = ManagerSetup::load(&setup_path).unwrap();

    assert!(matches!(
        setup.build(),
        Err(ConfigError::Cut(CutError::UnknownTypeId { .. }))
    ));

    let mut factory = setup.factory();
    factory.register_kind::<EchoCut>(ECHO_CUT).unwrap();
    let manager = setup.build_with(factory).unwrap();
    manager
        .set_user_data("echo", Arc::new(SelectionStatus::Rejected))
        .unwrap();
    assert_eq!(manager.process("echo").unwrap(), SelectionStatus::Rejected);
}

#[test]
fn cross_file_references_are_forward_references() {
    let dir = TempDirGuard::new("forward");
    dir.write("combined.toml", COMBINED);
    dir.write("leaves.toml", LEAVES);
    let setup_path = dir.write(
        "setup.toml",
        "[manager]\ncuts.configuration_files = [\"combined.toml\", \"leaves.toml\"]\n",
    );
    let manager = ManagerSetup::load(&setup_path).unwrap().build().unwrap();
    assert_eq!(
        manager.process("either").unwrap(),
        SelectionStatus::Accepted
    );
}

#[test]
fn missing_cut_file_reports_its_path() {
    let dir = TempDirGuard::new("missing");
    let setup_path = dir.write(
        "setup.toml",
        "[manager]\ncuts.configuration_files = [\"absent.toml\"]\n",
    );
    let err = ManagerSetup::load(&setup_path).unwrap().build().unwrap_err();
    assert!(
        matches!(&err, ConfigError::Io { path, .. } if path.ends_with("absent.toml"))
    );
}

#[test]
fn load_cut_config_reads_a_single_file() {
    let dir = TempDirGuard::new("single");
    let path = dir.write("leaves.toml", LEAVES);
    let config = load_cut_config(&path).unwrap();
    assert_eq!(config.len(), 2);

    let mut manager = cutgraph_kernel::Manager::new(CutFactory::with_builtins());
    manager.initialize(&config).unwrap();
    assert_eq!(manager.process("no").unwrap(), SelectionStatus::Rejected);
}
