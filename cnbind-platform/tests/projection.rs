use camino::Utf8PathBuf;
use cnbind_platform::{BindingLayout, PlatformView, read_bindings};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn platform_fixture() -> (TempDir, Utf8PathBuf) {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");

    fs::create_dir_all(root.join("env")).unwrap();
    fs::write(root.join("env").join("BP_NODE_VERSION"), "20.*").unwrap();

    let db = root.join("bindings").join("db");
    fs::create_dir_all(&db).unwrap();
    fs::write(db.join("type"), "postgresql\n").unwrap();
    fs::write(db.join("provider"), "  acme  ").unwrap();
    fs::write(db.join("password"), "hunter2\n").unwrap();
    fs::write(db.join(".ignored"), "x").unwrap();

    let legacy = root.join("bindings").join("ca-certs");
    fs::create_dir_all(legacy.join("metadata")).unwrap();
    fs::create_dir_all(legacy.join("secret")).unwrap();
    fs::write(legacy.join("metadata").join("kind"), "ca-certificates").unwrap();
    fs::write(legacy.join("secret").join("cert.pem"), "PEM\n").unwrap();

    fs::write(root.join("bindings").join("stray-file"), "x").unwrap();

    (temp, root)
}

#[test]
fn platform_view_projects_env_and_bindings() {
    let (_temp, root) = platform_fixture();
    let view = PlatformView::load(&root, &root.join("bindings"), BindingLayout::Flat)
        .expect("load platform");

    assert_eq!(view.var("BP_NODE_VERSION"), Some("20.*"));
    let names: Vec<&str> = view.bindings().iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["ca-certs", "db"]);

    let db = &view.bindings()[1];
    assert_eq!(db.binding_type(), Some("postgresql"));
    assert_eq!(db.provider(), Some("acme"));
    assert_eq!(db.get("password"), Some("hunter2"));
    assert!(db.get(".ignored").is_none());
    assert_eq!(db.path, root.join("bindings").join("db"));

    let pg: Vec<&str> = view
        .bindings_of_type("postgresql")
        .map(|b| b.name.as_str())
        .collect();
    assert_eq!(pg, vec!["db"]);
}

#[test]
fn flat_layout_ignores_legacy_subdirectories() {
    let (_temp, root) = platform_fixture();
    let bindings = read_bindings(&root.join("bindings"), BindingLayout::Flat).expect("read");
    let legacy = &bindings[0];
    assert_eq!(legacy.name, "ca-certs");
    assert!(legacy.secret.is_empty());
}

#[test]
fn legacy_layout_folds_metadata_and_secret() {
    let (_temp, root) = platform_fixture();
    let bindings =
        read_bindings(&root.join("bindings"), BindingLayout::AllowLegacySubdirs).expect("read");
    let legacy = &bindings[0];
    assert_eq!(legacy.binding_type(), Some("ca-certificates"));
    assert_eq!(legacy.get("cert.pem"), Some("PEM"));
}

#[test]
fn missing_bindings_root_is_empty() {
    let (_temp, root) = platform_fixture();
    let view = PlatformView::load(&root, &root.join("nope"), BindingLayout::Flat).expect("load");
    assert!(view.bindings().is_empty());
}

#[test]
fn top_level_keys_win_over_legacy_subdirectories() {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
    let binding = root.join("cache");
    fs::create_dir_all(binding.join("metadata")).unwrap();
    fs::create_dir_all(binding.join("secret")).unwrap();
    fs::write(binding.join("type"), "redis").unwrap();
    fs::write(binding.join("metadata").join("type"), "memcached").unwrap();
    fs::write(binding.join("metadata").join("host"), "metadata-host").unwrap();
    fs::write(binding.join("secret").join("host"), "secret-host").unwrap();
    fs::write(binding.join("secret").join("password"), "pw").unwrap();

    let bindings = read_bindings(&root, BindingLayout::AllowLegacySubdirs).expect("read");
    let cache = &bindings[0];
    assert_eq!(cache.binding_type(), Some("redis"));
    assert_eq!(cache.get("host"), Some("metadata-host"));
    assert_eq!(cache.get("password"), Some("pw"));
    assert_eq!(cache.secret.len(), 3);
}
