use std::fs::File;
use std::io::Read;

use pkg_index_core::archive::archive_site;
use pkg_index_core::config::SiteConfig;
use pkg_index_core::index::build_index;
use pkg_index_core::render::{render, write_site};
use tempfile::tempdir;
use zip::ZipArchive;

fn rendered_routes() -> std::collections::BTreeMap<String, String> {
    let index = build_index(vec!["pkgA/a.whl", "pkgA/b.whl", "pkgB/c.whl"]);
    let site = SiteConfig {
        bucket: "wheels".to_string(),
        storage_host: "storage.googleapis.com".to_string(),
    };
    render(&index, &site)
}

#[test]
fn archive_contains_exactly_the_rendered_routes() {
    let routes = rendered_routes();
    let dir = tempdir().expect("temp dir");
    let site_dir = dir.path().join("site");
    write_site(&routes, &site_dir).expect("write_site should succeed");
    let zip_path = dir.path().join("site.zip");

    archive_site(&site_dir, &zip_path).expect("archive_site should succeed");

    let mut archive = ZipArchive::new(File::open(&zip_path).expect("open zip"))
        .expect("archive should be readable");
    let mut entry_names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).expect("entry").name().to_string())
        .collect();
    entry_names.sort();
    let mut expected: Vec<String> = routes.keys().cloned().collect();
    expected.sort();
    assert_eq!(entry_names, expected, "One zip entry per rendered route");
}

#[test]
fn archive_entries_round_trip_their_content() {
    let routes = rendered_routes();
    let dir = tempdir().expect("temp dir");
    let site_dir = dir.path().join("site");
    write_site(&routes, &site_dir).expect("write_site should succeed");
    let zip_path = dir.path().join("site.zip");

    archive_site(&site_dir, &zip_path).expect("archive_site should succeed");

    let mut archive = ZipArchive::new(File::open(&zip_path).expect("open zip"))
        .expect("archive should be readable");
    let mut root = archive
        .by_name("index.html")
        .expect("root route must be an entry");
    let mut contents = String::new();
    root.read_to_string(&mut contents).expect("read entry");
    assert_eq!(
        &contents, &routes["index.html"],
        "Entry content must match the rendered document"
    );
}
