//! Zip packaging of the rendered site directory.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Compress the contents of `site_dir` into a single zip at `dest`.
///
/// Entries are named by their path relative to `site_dir` and written in
/// sorted order, so repeated runs over identical input produce an identical
/// entry list. Full rebuild every run; no delta logic.
pub fn archive_site(site_dir: &Path, dest: &Path) -> io::Result<()> {
    let mut entries = Vec::new();
    collect_files(site_dir, site_dir, &mut entries)?;
    entries.sort();

    let file = File::create(dest)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for relative in &entries {
        let name = relative.to_string_lossy().replace('\\', "/");
        zip.start_file(name, options).map_err(zip_to_io)?;
        let mut source = File::open(site_dir.join(relative))?;
        let mut contents = Vec::new();
        source.read_to_end(&mut contents)?;
        io::Write::write_all(&mut zip, &contents)?;
    }
    zip.finish().map_err(zip_to_io)?;

    info!(entries = entries.len(), dest = %dest.display(), "Wrote site archive");
    Ok(())
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(root, &path, out)?;
        } else {
            let relative = path
                .strip_prefix(root)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            out.push(relative.to_path_buf());
        }
    }
    Ok(())
}

fn zip_to_io(e: zip::result::ZipError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}
