//! Static site rendering: package index -> HTML routes.
//!
//! [`render`] is a pure function from an index and site config to a
//! `route -> document` map, so it can be unit tested without touching the
//! filesystem; [`write_site`] materialises that map as a directory tree.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use tracing::info;

use crate::config::SiteConfig;
use crate::index::PackageIndex;

/// A single rendered hyperlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    pub name: String,
}

/// Render the full static site as a `route -> HTML document` map.
///
/// Routes are `index.html` (one link per package, sorted lexicographically,
/// pointing at `/<package>/index.html`) and `<package>/index.html` (one link
/// per file in listing order, pointing at the public object URL). Rendering
/// is deterministic: the same index and config produce byte-identical
/// output.
pub fn render(index: &PackageIndex, site: &SiteConfig) -> BTreeMap<String, String> {
    let mut routes = BTreeMap::new();

    let mut names: Vec<&String> = index.keys().collect();
    names.sort();
    let root_links: Vec<Link> = names
        .iter()
        .map(|package| Link {
            url: format!("/{package}/index.html"),
            name: package.to_string(),
        })
        .collect();
    routes.insert("index.html".to_string(), render_page("Package index", &root_links));

    for (package, files) in index {
        let links: Vec<Link> = files
            .iter()
            .map(|file| Link {
                url: site.object_url(package, file),
                name: file.clone(),
            })
            .collect();
        routes.insert(format!("{package}/index.html"), render_page(package, &links));
    }

    routes
}

/// Write each rendered route into `dir`, creating package subdirectories.
pub fn write_site(routes: &BTreeMap<String, String>, dir: &Path) -> io::Result<()> {
    for (route, html) in routes {
        let path = dir.join(route);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, html)?;
    }
    info!(routes = routes.len(), dir = %dir.display(), "Wrote rendered site");
    Ok(())
}

fn render_page(title: &str, links: &[Link]) -> String {
    let mut items = String::new();
    for link in links {
        items.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            escape_html(&link.url),
            escape_html(&link.name)
        ));
    }
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<ul>\n{}</ul>\n</body>\n</html>\n",
        escape_html(title),
        items
    )
}

/// Minimal HTML escaping for text content and attribute values.
fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
