//! Integration tests for atomic-templates.
//!
//! Every test builds its own template tree in a temporary directory, so tests
//! can run in parallel without sharing state.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use atomic_templates::{FuncMap, ManagerConfig, ManagerError, TemplateManager, NAMESPACE_ROOT};
use minijinja::{Error, ErrorKind};
use serde_json::json;
use tempfile::TempDir;

fn create_file(dir: &Path, relative_path: &str, content: &str) {
    let full_path = dir.join(relative_path);
    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(full_path, content).unwrap();
}

/// The reference tree: five templates and one file with a foreign extension.
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    create_file(dir.path(), "top-level.html", "top");
    create_file(dir.path(), "none.none", "not a template");
    create_file(dir.path(), "atoms/atom-1.html", "atom-1");
    create_file(dir.path(), "atoms/atom-2.tpl", "atom-2");
    create_file(dir.path(), "atoms/subatoms/sub-atom-1.html", "sub-atom-1");
    create_file(
        dir.path(),
        "pages/page-1.html",
        "<main>{% include 'atoms-atom-1' %}</main>",
    );
    dir
}

fn compiled(dir: &TempDir) -> TemplateManager {
    let mut manager = TemplateManager::new();
    manager.add_directories([dir.path()]).unwrap();
    let errors = manager.parse_templates();
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    manager
}

struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// Discovery and aliases
// ============================================================================

#[test]
fn compiles_only_allow_listed_files() {
    let dir = fixture();
    let manager = compiled(&dir);

    assert_eq!(manager.templates().len(), 5);
    assert!(manager.lookup("none").is_none());
    assert!(manager.lookup("none.none").is_none());
}

#[test]
fn short_aliases_keep_first_and_last_segment() {
    let dir = fixture();
    let manager = compiled(&dir);

    for (short, body) in [
        ("top-level", "top"),
        ("atoms-atom-1", "atom-1"),
        ("atoms-atom-2", "atom-2"),
        ("atoms-sub-atom-1", "sub-atom-1"),
    ] {
        assert_eq!(manager.render(short, &()).unwrap(), body, "alias {short}");
    }
}

#[test]
fn long_aliases_are_relative_paths() {
    let dir = fixture();
    let manager = compiled(&dir);

    let long = Path::new("atoms").join("subatoms").join("sub-atom-1.html");
    let long = long.to_str().unwrap();
    assert_eq!(manager.render(long, &()).unwrap(), "sub-atom-1");

    let tmpl = manager.lookup(long).unwrap();
    assert_eq!(tmpl.name(), long);
    assert_eq!(tmpl.path(), dir.path().join(long));
    assert!(tmpl.aliases().iter().any(|a| a == "atoms-sub-atom-1"));
}

#[test]
fn aliases_can_include_each_other() {
    let dir = fixture();
    let manager = compiled(&dir);

    assert_eq!(
        manager.render("pages-page-1", &()).unwrap(),
        "<main>atom-1</main>"
    );
}

#[test]
fn fresh_manager_knows_no_names() {
    let manager = TemplateManager::new();

    for name in ["top-level", "pages/page-1.html", NAMESPACE_ROOT, ""] {
        let err = manager.render(name, &()).unwrap_err();
        assert!(matches!(err, ManagerError::TemplateNotFound(_)), "{name}");
    }
}

#[test]
fn namespace_root_is_never_a_template() {
    let dir = fixture();
    let manager = compiled(&dir);

    assert!(manager.lookup(NAMESPACE_ROOT).is_none());
    assert!(!manager.names().iter().any(|n| n == NAMESPACE_ROOT));
}

#[test]
fn numeric_prefixes_stripped_from_short_alias() {
    let dir = TempDir::new().unwrap();
    create_file(dir.path(), "00-atoms/00-subdir/template-1.html", "t1");

    let mut manager = TemplateManager::new();
    manager
        .add_directories([dir.path()])
        .unwrap()
        .set_strip_numeric_prefixes(true);
    assert!(manager.parse_templates().is_empty());

    assert_eq!(manager.render("atoms-template-1", &()).unwrap(), "t1");
    assert!(manager.lookup("00-atoms-template-1").is_none());
}

// ============================================================================
// Recompilation
// ============================================================================

#[test]
fn recompile_is_idempotent() {
    let dir = fixture();
    let manager = compiled(&dir);
    let before = manager.names();

    assert!(manager.parse_templates().is_empty());
    assert_eq!(manager.names(), before);
    assert_eq!(manager.templates().len(), 5);
}

#[test]
fn extension_changes_apply_on_next_compile() {
    let dir = fixture();
    let mut manager = compiled(&dir);

    manager.remove_extension("tpl");
    // Still served from the previous compile.
    assert_eq!(manager.render("atoms-atom-2", &()).unwrap(), "atom-2");

    assert!(manager.parse_templates().is_empty());
    assert_eq!(manager.templates().len(), 4);
    assert!(matches!(
        manager.render("atoms-atom-2", &()),
        Err(ManagerError::TemplateNotFound(_))
    ));

    manager.add_extension("none");
    assert!(manager.parse_templates().is_empty());
    assert_eq!(manager.render("none", &()).unwrap(), "not a template");
}

#[test]
fn reparse_on_execute_picks_up_edits() {
    let dir = fixture();
    let mut manager = compiled(&dir);
    manager.set_reparse_on_execute(true);

    assert_eq!(manager.render("top-level", &()).unwrap(), "top");

    create_file(dir.path(), "top-level.html", "edited");
    create_file(dir.path(), "pages/page-2.html", "new page");

    assert_eq!(manager.render("top-level", &()).unwrap(), "edited");
    assert_eq!(manager.render("pages-page-2", &()).unwrap(), "new page");
}

#[test]
fn without_reparse_edits_wait_for_compile() {
    let dir = fixture();
    let manager = compiled(&dir);

    create_file(dir.path(), "top-level.html", "edited");
    assert_eq!(manager.render("top-level", &()).unwrap(), "top");

    assert!(manager.parse_templates().is_empty());
    assert_eq!(manager.render("top-level", &()).unwrap(), "edited");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn parse_error_stops_only_its_own_root() {
    let broken = TempDir::new().unwrap();
    create_file(broken.path(), "a-ok.html", "ok");
    create_file(broken.path(), "b-broken.html", "{% if %}");
    create_file(broken.path(), "c-unreached.html", "never");
    let good = fixture();

    let mut manager = TemplateManager::new();
    manager
        .add_directories([broken.path(), good.path()])
        .unwrap();
    let errors = manager.parse_templates();

    assert_eq!(errors.len(), 1);
    assert!(
        matches!(&errors[0], ManagerError::Parse { name, .. } if name == "b-broken.html"),
        "got {:?}",
        errors[0]
    );
    assert_eq!(manager.render("a-ok", &()).unwrap(), "ok");
    assert!(manager.lookup("c-unreached").is_none());
    assert_eq!(manager.render("pages-page-1", &()).unwrap(), "<main>atom-1</main>");
}

#[test]
fn missing_directory_is_reported_as_walk_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing");

    let mut manager = TemplateManager::new();
    manager.add_directories([&missing]).unwrap();
    let errors = manager.parse_templates();

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ManagerError::Walk { .. }));
    assert!(!errors[0].is_recoverable());
}

#[test]
fn file_registered_as_root_is_reported() {
    let dir = fixture();
    let file = dir.path().join("top-level.html");

    let mut manager = TemplateManager::new();
    manager.add_directories([&file, &dir.path().join("pages")]).unwrap();
    let errors = manager.parse_templates();

    assert_eq!(errors.len(), 1);
    assert!(
        matches!(&errors[0], ManagerError::NotADirectory { path } if path == &file),
        "got {:?}",
        errors[0]
    );
    assert_eq!(manager.templates().len(), 1);
    assert!(manager.lookup("page-1").is_some());
}

#[test]
fn empty_delimiters_keep_the_default_syntax() {
    let dir = fixture();
    let mut manager = compiled(&dir);

    manager.delims("", "");
    assert!(manager.parse_templates().is_empty());
    assert_eq!(manager.templates().len(), 5);
}

#[test]
fn empty_path_fails_to_register() {
    let mut manager = TemplateManager::new();
    let err = manager.add_directories([""]).err().unwrap();

    assert!(matches!(err, ManagerError::PathResolution { .. }));
    assert_eq!(manager.directories().count(), 0);
}

#[test]
fn failing_function_is_a_render_error() {
    let dir = TempDir::new().unwrap();
    create_file(dir.path(), "boom.html", "before {{ fail() }}");

    let funcs = FuncMap::new().add("fail", || -> Result<String, Error> {
        Err(Error::new(ErrorKind::InvalidOperation, "boom"))
    });
    let mut manager = TemplateManager::new();
    manager.add_directories([dir.path()]).unwrap().funcs(funcs);
    assert!(manager.parse_templates().is_empty());

    let err = manager.render("boom", &()).unwrap_err();
    assert!(matches!(err, ManagerError::Render(_)), "got {err:?}");
}

#[test]
fn writer_failure_is_an_io_error() {
    let dir = fixture();
    let manager = compiled(&dir);

    let err = manager
        .execute(FailingWriter, "top-level", &())
        .unwrap_err();
    assert!(matches!(err, ManagerError::Io(_)), "got {err:?}");
}

// ============================================================================
// Functions, delimiters, escaping
// ============================================================================

#[test]
fn functions_are_callable_from_templates() {
    let dir = TempDir::new().unwrap();
    create_file(dir.path(), "func.html", "{{ func2(name) }}");

    let funcs = FuncMap::new().add("func2", |arg: String| format!("{arg}2"));
    let mut manager = TemplateManager::new();
    manager.add_directories([dir.path()]).unwrap().funcs(funcs);
    assert!(manager.parse_templates().is_empty());

    let out = manager.render("func", &json!({"name": "value"})).unwrap();
    assert_eq!(out, "value2");
}

#[test]
fn custom_delimiters() {
    let dir = TempDir::new().unwrap();
    create_file(dir.path(), "delims.html", "[[ greeting ]], {{ literal }}");

    let mut manager = TemplateManager::new();
    manager.add_directories([dir.path()]).unwrap().delims("[[", "]]");
    assert!(manager.parse_templates().is_empty());

    let out = manager.render("delims", &json!({"greeting": "hi"})).unwrap();
    assert_eq!(out, "hi, {{ literal }}");
}

#[test]
fn custom_delimiters_leave_block_tags_alone() {
    let dir = TempDir::new().unwrap();
    create_file(dir.path(), "cond.html", "{% if show %}[[ value ]]{% endif %}");

    let mut manager = TemplateManager::new();
    manager.add_directories([dir.path()]).unwrap().delims("[[", "]]");
    assert!(manager.parse_templates().is_empty());

    let out = manager.render("cond", &json!({"show": true, "value": "v"})).unwrap();
    assert_eq!(out, "v");
}

#[test]
fn output_is_html_escaped() {
    let dir = TempDir::new().unwrap();
    create_file(dir.path(), "escape.tpl", "<p>{{ body }}</p>");
    let manager = compiled(&dir);

    let out = manager
        .render("escape", &json!({"body": "<script>&"}))
        .unwrap();
    assert_eq!(out, "<p>&lt;script&gt;&amp;</p>");
}

// ============================================================================
// Configuration and sharing
// ============================================================================

#[test]
fn manager_from_yaml_config() {
    let dir = TempDir::new().unwrap();
    create_file(dir.path(), "pages/home.jinja", "<< title >>");

    let yaml = format!(
        "directories: [{:?}]\nextensions: [jinja]\ndelimiters: {{ left: \"<<\", right: \">>\" }}\n",
        dir.path()
    );
    let config = ManagerConfig::from_yaml(&yaml).unwrap();
    let manager = TemplateManager::from_config(config).unwrap();
    assert!(manager.parse_templates().is_empty());

    let out = manager.render("pages-home", &json!({"title": "Home"})).unwrap();
    assert_eq!(out, "Home");
}

#[test]
fn concurrent_renders_share_one_manager() {
    let dir = fixture();
    let manager = Arc::new(compiled(&dir));

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let manager = Arc::clone(&manager);
            scope.spawn(move || {
                for _ in 0..20 {
                    assert_eq!(
                        manager.render("pages-page-1", &()).unwrap(),
                        "<main>atom-1</main>"
                    );
                }
            });
        }
    });
}
