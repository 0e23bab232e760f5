//! End-to-end generation through the public library API.
//!
//! Builds small web roots in temp directories (and walks `fixtures/fs/`),
//! runs the full pipeline and checks the generated C source and the
//! assembled chain.

use makefsdata::chain::FileFlag;
use makefsdata::config::{self, GeneratorConfig};
use makefsdata::generate::{self, GenerateError};
use makefsdata::scan::{self, ScanError};
use makefsdata::writer::WriteOutcome;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/fs")
}

fn write_site(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (rel, contents) in files {
        let path = tmp.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    tmp
}

// =========================================================================
// Fixture site
// =========================================================================

#[test]
fn fixture_site_generates_in_walk_order() {
    let input = scan::walk(&fixture_root()).unwrap();
    let config = config::load_config(&fixture_root()).unwrap();
    let out = TempDir::new().unwrap();
    let target = out.path().join("fsdata.c");

    let report = generate::generate(&input, &config, &target).unwrap();

    let declared: Vec<_> = report
        .chain
        .descriptors()
        .iter()
        .map(|d| d.virtual_path())
        .collect();
    assert_eq!(
        declared,
        vec![
            "/404.html",
            "/data.json",
            "/index.html",
            "/status.shtml",
            "/style.css",
            "/img/logo.svg",
            "/js/app.js",
        ]
    );

    let source = fs::read_to_string(&target).unwrap();
    assert!(source.ends_with("#define FS_ROOT file_js_app_js\n#define FS_NUMFILES 7\n"));
    assert!(!source.contains("makefsdata.toml"));
}

#[test]
fn fixture_site_descriptor_flags() {
    let input = scan::walk(&fixture_root()).unwrap();
    let chain = generate::assemble(&input, &GeneratorConfig::default()).unwrap();

    for path in ["/data.json", "/status.shtml"] {
        let flags = chain.find(path).unwrap().flags();
        assert!(flags.contains(FileFlag::Ssi), "{path}");
        assert!(!flags.contains(FileFlag::HeaderPersistent), "{path}");
    }
    for path in ["/404.html", "/index.html", "/style.css", "/img/logo.svg"] {
        let flags = chain.find(path).unwrap().flags();
        assert!(flags.contains(FileFlag::HeaderPersistent), "{path}");
        assert!(!flags.contains(FileFlag::Ssi), "{path}");
    }
}

// =========================================================================
// Response buffers
// =========================================================================

#[test]
fn buffers_split_into_name_and_response() {
    let tmp = write_site(&[("index.html", "<h1>hello</h1>"), ("404.html", "nope")]);
    let input = scan::walk(tmp.path()).unwrap();
    let chain = generate::assemble(&input, &GeneratorConfig::default()).unwrap();

    let index = chain.find("/index.html").unwrap();
    assert_eq!(index.name(), b"/index.html\0");
    assert_eq!(index.name_len() + index.response_len(), index.data().len());
    let response = std::str::from_utf8(index.response()).unwrap();
    assert!(response.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(response.contains("Content-Length: 14\r\n"));
    assert!(response.ends_with("Content-Type: text/html\r\n\r\n<h1>hello</h1>"));

    let missing = chain.find("/404.html").unwrap();
    assert_eq!(missing.name(), b"/404.html\0\0\0");
    assert!(missing.response().starts_with(b"HTTP/1.0 404 File not found\r\n"));
}

#[test]
fn dynamic_files_have_no_content_length() {
    let tmp = write_site(&[("cgi/state.xml", "<x/>")]);
    let input = scan::walk(tmp.path()).unwrap();
    let chain = generate::assemble(&input, &GeneratorConfig::default()).unwrap();

    let response = std::str::from_utf8(chain.root().unwrap().response()).unwrap();
    assert!(!response.contains("Content-Length"));
    assert!(response.ends_with("Content-Type: text/xml\r\n\r\n<x/>"));
}

#[test]
fn uppercase_dynamic_extension_is_static() {
    let tmp = write_site(&[("DATA.JSON", "{}")]);
    let input = scan::walk(tmp.path()).unwrap();
    let chain = generate::assemble(&input, &GeneratorConfig::default()).unwrap();

    let root = chain.root().unwrap();
    assert!(root.flags().contains(FileFlag::HeaderPersistent));
    assert!(!root.flags().contains(FileFlag::Ssi));
    let response = std::str::from_utf8(root.response()).unwrap();
    assert!(response.contains("Content-Length: 2\r\n"));
    assert!(response.contains("Content-Type: application/json\r\n\r\n"));
}

#[test]
fn binary_bodies_are_embedded_verbatim() {
    let tmp = TempDir::new().unwrap();
    let body: Vec<u8> = (0u8..=255).collect();
    fs::write(tmp.path().join("blob.png"), &body).unwrap();
    let input = scan::walk(tmp.path()).unwrap();
    let chain = generate::assemble(&input, &GeneratorConfig::default()).unwrap();
    assert!(chain.root().unwrap().data().ends_with(&body));
}

#[test]
fn walk_without_top_level_files_roots_at_first_file() {
    let tmp = write_site(&[("site/index.html", "hi"), ("site/img/logo.svg", "<svg/>")]);
    let input = scan::walk(tmp.path()).unwrap();
    let out = TempDir::new().unwrap();
    let target = out.path().join("fsdata.c");

    let report = generate::generate(&input, &GeneratorConfig::default(), &target).unwrap();

    let declared: Vec<_> = report
        .chain
        .descriptors()
        .iter()
        .map(|d| d.virtual_path())
        .collect();
    assert_eq!(declared, vec!["/index.html", "/img/logo.svg"]);
    let source = fs::read_to_string(&target).unwrap();
    assert!(source.contains("static const unsigned char data_index_html[]"));
    assert!(source.contains("#define FS_ROOT file_img_logo_svg\n"));
}

// =========================================================================
// Chain
// =========================================================================

#[test]
fn explicit_list_chain_order() {
    let tmp = write_site(&[("a.html", "a"), ("b.json", "{}"), ("404.html", "nf")]);
    let paths = ["a.html", "b.json", "404.html"].map(|n| tmp.path().join(n));
    let input = scan::from_paths(&paths).unwrap();
    let out = tmp.path().join("fsdata.c");

    let report = generate::generate(&input, &GeneratorConfig::default(), &out).unwrap();

    let traversal: Vec<_> = report.chain.traverse().map(|d| d.virtual_path()).collect();
    assert_eq!(traversal, vec!["/404.html", "/b.json", "/a.html"]);
    assert_eq!(report.chain.count(), 3);

    let source = fs::read_to_string(&out).unwrap();
    assert!(source.contains("const struct fsdata_file file_404_html[] = {{\n    file_b_json,"));
    assert!(source.contains("const struct fsdata_file file_b_json[] = {{\n    file_a_html,"));
    assert!(source.contains("const struct fsdata_file file_a_html[] = {{\n    NULL,"));
    assert!(source.contains("#define FS_ROOT file_404_html\n#define FS_NUMFILES 3\n"));
}

#[test]
fn duplicate_paths_shadow_and_stay_valid_c() {
    let tmp = write_site(&[("a.html", "first")]);
    let path = tmp.path().join("a.html");
    let input = scan::from_paths(&[path.clone(), path]).unwrap();
    let out = tmp.path().join("fsdata.c");

    let report = generate::generate(&input, &GeneratorConfig::default(), &out).unwrap();

    assert_eq!(report.chain.count(), 2);
    let source = fs::read_to_string(&out).unwrap();
    assert!(source.contains("static const unsigned char data_a_html[]"));
    assert!(source.contains("static const unsigned char data_a_html_2[]"));
    assert!(source.contains("#define FS_ROOT file_a_html_2\n"));
}

// =========================================================================
// Determinism and failure
// =========================================================================

#[test]
fn rerun_is_byte_identical() {
    let input = scan::walk(&fixture_root()).unwrap();
    let config = GeneratorConfig::default();
    let out = TempDir::new().unwrap();
    let first = out.path().join("one.c");
    let second = out.path().join("two.c");

    generate::generate(&input, &config, &first).unwrap();
    let again = scan::walk(&fixture_root()).unwrap();
    generate::generate(&again, &config, &second).unwrap();

    assert_eq!(fs::read(first).unwrap(), fs::read(second).unwrap());
}

#[test]
fn unchanged_output_is_not_rewritten() {
    let input = scan::walk(&fixture_root()).unwrap();
    let config = GeneratorConfig::default();
    let out = TempDir::new().unwrap();
    let target = out.path().join("fsdata.c");

    assert_eq!(
        generate::generate(&input, &config, &target).unwrap().outcome,
        WriteOutcome::Created
    );
    assert_eq!(
        generate::generate(&input, &config, &target).unwrap().outcome,
        WriteOutcome::Unchanged
    );
}

#[test]
fn unsupported_extension_leaves_no_output() {
    let tmp = write_site(&[("index.html", "ok"), ("readme.md", "# no")]);
    let input = scan::walk(tmp.path()).unwrap();
    let out = TempDir::new().unwrap();
    let target = out.path().join("fsdata.c");

    let err = generate::generate(&input, &GeneratorConfig::default(), &target).unwrap_err();

    assert!(matches!(err, GenerateError::Encode(_)));
    assert!(err.to_string().contains("readme.md"));
    assert!(!target.exists());
}

#[test]
fn missing_input_file_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("gone.html");
    let err = scan::from_paths(&[missing]).unwrap_err();
    assert!(matches!(err, ScanError::NotFound(_)));
    assert!(err.to_string().contains("gone.html"));
}

// =========================================================================
// Configuration
// =========================================================================

#[test]
fn config_file_overrides_apply() {
    let tmp = write_site(&[
        ("index.html", "hi"),
        (
            "makefsdata.toml",
            r#"
server_agent = "acme-httpd/1.0"

[content_types]
md = "text/markdown"

[output]
header = "lwip/apps/fs.h"
bytes_per_line = 8
"#,
        ),
        ("notes.md", "*hi*"),
    ]);
    let config = config::load_config(tmp.path()).unwrap();
    let input = scan::walk(tmp.path()).unwrap();
    let out = tmp.path().join("build/fsdata.c");

    let report = generate::generate(&input, &config, &out).unwrap();

    let notes = report.chain.find("/notes.md").unwrap();
    let response = std::str::from_utf8(notes.response()).unwrap();
    assert!(response.contains("Server: acme-httpd/1.0\r\n"));
    assert!(response.contains("Content-Type: text/markdown\r\n\r\n"));

    let source = fs::read_to_string(&out).unwrap();
    assert!(source.starts_with("#include \"lwip/apps/fs.h\"\n"));
    assert!(source.contains("    0x2F,0x69,0x6E,0x64,0x65,0x78,0x2E,0x68,\n"));
}

#[test]
fn http11_status_lines_set_flag() {
    let tmp = write_site(&[
        ("index.html", "hi"),
        (
            "makefsdata.toml",
            "[status_lines]\n200 = \"HTTP/1.1 200 OK\"\n",
        ),
    ]);
    let config = config::load_config(tmp.path()).unwrap();
    let input = scan::walk(tmp.path()).unwrap();
    let chain = generate::assemble(&input, &config).unwrap();

    let index = chain.root().unwrap();
    assert!(index.flags().contains(FileFlag::HeaderHttpVer11));
    assert!(index.response().starts_with(b"HTTP/1.1 200 OK\r\n"));
}
