use super::*;
use std::fs;
use tempfile::tempdir;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_no_files_yields_defaults() {
    let dir = tempdir().unwrap();
    let config = LoopConfig::load_with_paths(
        Some(&dir.path().join("user.toml")),
        &dir.path().join("project.toml"),
    )
    .unwrap();

    assert_eq!(config, LoopConfig::default());
    assert_eq!(config.extract.since, "2 hours ago");
    assert_eq!(config.extract.base, "HEAD~5");
    assert_eq!(config.targets.doc_file, "CLAUDE.md");
    assert_eq!(config.targets.max_agent_targets, 3);
}

#[test]
fn test_user_path_unavailable() {
    let dir = tempdir().unwrap();
    let project = dir.path().join("config.toml");
    write(&project, "[extract]\nbase = \"main\"\n");

    let config = LoopConfig::load_with_paths(None, &project).unwrap();
    assert_eq!(config.extract.base, "main");
    assert_eq!(config.extract.since, "2 hours ago");
}

#[test]
fn test_project_overrides_user() {
    let dir = tempdir().unwrap();
    let user = dir.path().join("user/config.toml");
    let project = dir.path().join("project/.learning-loop/config.toml");
    write(
        &user,
        r#"
        [extract]
        since = "1 day ago"
        base = "origin/main"

        [targets]
        max_agent_targets = 5
        "#,
    );
    write(
        &project,
        r#"
        [extract]
        base = "HEAD~2"
        "#,
    );

    let config = LoopConfig::load_with_paths(Some(&user), &project).unwrap();
    assert_eq!(config.extract.since, "1 day ago");
    assert_eq!(config.extract.base, "HEAD~2");
    assert_eq!(config.targets.max_agent_targets, 5);
    assert_eq!(config.targets.agents_dir, "agents");
}

#[test]
fn test_unknown_keys_are_ignored() {
    let dir = tempdir().unwrap();
    let project = dir.path().join("config.toml");
    write(
        &project,
        r#"
        flavour = "vanilla"
        [targets]
        doc_file = "AGENTS.md"
        colour = "blue"
        "#,
    );

    let config = LoopConfig::load_with_paths(None, &project).unwrap();
    assert_eq!(config.targets.doc_file, "AGENTS.md");
}

#[test]
fn test_parse_failure_is_error() {
    let dir = tempdir().unwrap();
    let project = dir.path().join("config.toml");
    write(&project, "[extract\nsince = ");

    let err = LoopConfig::load_with_paths(None, &project).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse config"));
}

#[test]
fn test_wrong_type_is_error() {
    let dir = tempdir().unwrap();
    let project = dir.path().join("config.toml");
    write(&project, "[targets]\nmax_agent_targets = \"three\"\n");

    assert!(LoopConfig::load_with_paths(None, &project).is_err());
}

#[test]
fn test_load_reads_project_storage_dir() {
    let dir = tempdir().unwrap();
    write(
        &dir.path().join(".learning-loop/config.toml"),
        "[targets]\nagents_dir = \"capabilities\"\n",
    );

    // The user layer is whatever the environment provides; the project key
    // wins either way.
    let config = LoopConfig::load(dir.path()).unwrap();
    assert_eq!(config.targets.agents_dir, "capabilities");
}

#[test]
fn test_storage_dir_resolution() {
    let root = Path::new("/work/project");

    let config = LoopConfig::default();
    assert_eq!(
        config.storage_dir(root),
        PathBuf::from("/work/project/.learning-loop")
    );

    let config = LoopConfig {
        storage: StorageConfig {
            dir: PathBuf::from("/var/lib/learnloop"),
        },
        ..LoopConfig::default()
    };
    assert_eq!(
        config.storage_dir(root),
        PathBuf::from("/var/lib/learnloop")
    );
}

#[test]
fn test_user_config_path_shape() {
    if let Some(path) = LoopConfig::user_config_path() {
        assert!(path.ends_with("config.toml"));
        assert!(path.to_string_lossy().contains("learnloop"));
    }
}
