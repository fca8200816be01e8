use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn catalog_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_catalog"))
}

fn setup_test_env(with_db: bool) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let products_dir = root.join("products");
    fs::create_dir_all(&products_dir).unwrap();
    fs::write(
        products_dir.join("foo.json"),
        r#"{"slug": "foo", "name": "Foo Pro", "categories": ["privacy"]}"#,
    )
    .unwrap();
    fs::write(
        products_dir.join("qux.json"),
        r#"{"slug": "qux", "name": "Qux", "categories": ["tools"]}"#,
    )
    .unwrap();

    fs::write(
        root.join("extensions.json"),
        r#"[
            {"slug": "foo", "name": "Foo", "topics": ["vpn"]},
            {"slug": "bar", "name": "Bar", "isActive": false, "topics": ["ghost"]},
            {"slug": "baz", "name": "Baz", "isPopular": true, "developerUsername": "bazco",
             "topics": ["vpn", "password-manager"]}
        ]"#,
    )
    .unwrap();

    let db_section = if with_db {
        format!("[db]\npath = \"{}/data/catalog.sqlite\"\n\n", root.display())
    } else {
        String::new()
    };
    let config_content = format!(
        r#"{}[snapshot]
path = "{root}/extensions.json"
products_dir = "{root}/products"

[site]
base_url = "https://catalog.test"

[log]
level = "warn"
"#,
        db_section,
        root = root.display()
    );

    let config_path = config_dir.join("catalog.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_catalog(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = catalog_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run catalog binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_init_idempotent() {
    let (tmp, config_path) = setup_test_env(true);

    let (stdout, stderr, success) = run_catalog(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/catalog.sqlite").exists());

    let (_, stderr, success) = run_catalog(&config_path, &["init"]);
    assert!(success, "second init failed: {}", stderr);
}

#[test]
fn test_init_requires_db_section() {
    let (_tmp, config_path) = setup_test_env(false);
    let (_, stderr, success) = run_catalog(&config_path, &["init"]);
    assert!(!success);
    assert!(stderr.contains("[db] is not configured"));
}

#[test]
fn test_source_report() {
    let (_tmp, config_path) = setup_test_env(true);
    run_catalog(&config_path, &["init"]);

    // Tables exist but hold no rows, so the database serves reads.
    let (stdout, _, success) = run_catalog(&config_path, &["source"]);
    assert!(success);
    assert!(stdout.contains("CONNECTED"));
    assert!(stdout.contains("serving reads from: database"));

    let (_tmp2, snapshot_only) = setup_test_env(false);
    let (stdout, _, success) = run_catalog(&snapshot_only, &["source"]);
    assert!(success);
    assert!(stdout.contains("NOT CONFIGURED"));
    assert!(stdout.contains("4 listings"));
    assert!(stdout.contains("serving reads from: snapshot"));
}

#[test]
fn test_list_merges_product_files() {
    let (_tmp, config_path) = setup_test_env(false);

    let (stdout, stderr, success) = run_catalog(&config_path, &["list", "extensions"]);
    assert!(success, "list failed: {}", stderr);
    assert!(stdout.contains("foo"));
    assert!(stdout.contains("qux"));
    assert!(!stdout.contains("bar "));
    assert!(stdout.contains("3 extension(s)"));

    let (stdout, _, success) = run_catalog(&config_path, &["list", "categories"]);
    assert!(success);
    assert!(stdout.contains("privacy"));
    assert!(stdout.contains("tools"));
}

#[test]
fn test_list_featured_limit_and_topic_counts() {
    let (_tmp, config_path) = setup_test_env(false);

    let (stdout, _, success) = run_catalog(&config_path, &["list", "featured", "--limit", "1"]);
    assert!(success);
    assert!(stdout.contains("baz"));
    assert!(stdout.contains("1 extension(s)"));

    let (stdout, _, success) = run_catalog(&config_path, &["list", "topics", "--counts"]);
    assert!(success);
    // foo's product file replaces the dataset entry, topics included.
    let vpn_line = stdout.lines().find(|l| l.starts_with("vpn")).unwrap();
    assert!(vpn_line.trim_end().ends_with('1'), "got: {}", vpn_line);
    assert!(!stdout.contains("ghost"));
}

#[test]
fn test_get_extension() {
    let (_tmp, config_path) = setup_test_env(false);

    let (stdout, _, success) = run_catalog(&config_path, &["get", "bazco", "baz"]);
    assert!(success);
    assert!(stdout.contains("/extensions/bazco/baz"));
    assert!(stdout.contains("--- Topics (2) ---"));

    let (_, stderr, success) = run_catalog(&config_path, &["get", "nobody", "baz"]);
    assert!(!success);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_sitemap_index_output() {
    let (_tmp, config_path) = setup_test_env(false);

    let (stdout, _, success) = run_catalog(&config_path, &["sitemap", "index"]);
    assert!(success);
    assert!(stdout.starts_with("<?xml"));
    assert!(stdout.contains("https://catalog.test/extensions-sitemap.xml"));

    let (stdout, _, success) = run_catalog(&config_path, &["sitemap", "best"]);
    assert!(success);
    assert!(stdout.contains("https://catalog.test/best/vpn"));
    assert!(stdout.contains("https://catalog.test/best/password-manager"));
}

#[test]
fn test_missing_config_uses_bundled_dataset() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("absent.toml");

    let (stdout, stderr, success) = run_catalog(&missing, &["list", "featured", "--limit", "2"]);
    assert!(success, "stderr={}", stderr);
    assert!(stdout.contains("ublock-origin"));
    assert!(stdout.contains("proton-vpn"));
    assert!(!stdout.contains("legacy-flash-player"));
}
