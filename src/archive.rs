//! Zip import/export for whole projects.
//!
//! Import expands every non-directory archive entry into a virtual file —
//! text-like extensions stay text, everything else becomes a data URI — and
//! synthesizes folder entries for every path prefix. All entries are decoded
//! before the combined set is returned, so callers never observe a partially
//! extracted project.

use std::io::{Cursor, Read, Seek, Write};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use zip::write::SimpleFileOptions;

use crate::error::{StudioError, StudioResult};
use crate::file::{extension, FileKind, ProjectFile};

/// Extensions decoded as UTF-8 text on import.
pub const TEXT_EXTENSIONS: &[&str] = &["html", "css", "js", "json", "txt", "md", "svg", "xml"];

/// Builds the virtual file for one archive entry (or one on-disk file).
///
/// `svg` is promoted to the Image kind and wrapped as a base64 data URI even
/// though it is text. Binary extensions get a data URI with the mime from a
/// fixed table; unknown extensions fall back to `application/octet-stream`
/// and keep the default Javascript kind.
pub fn classify_entry(name: &str, bytes: &[u8]) -> ProjectFile {
    let ext = extension(name);

    if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        let text = String::from_utf8_lossy(bytes).into_owned();
        return match ext.as_str() {
            "html" => ProjectFile::new(name, FileKind::Html, text),
            "css" => ProjectFile::new(name, FileKind::Css, text),
            "svg" => ProjectFile::new(
                name,
                FileKind::Image,
                format!("data:image/svg+xml;base64,{}", BASE64.encode(text.as_bytes())),
            ),
            _ => ProjectFile::new(name, FileKind::Javascript, text),
        };
    }

    let (mime, kind) = match ext.as_str() {
        "png" | "gif" | "webp" => (format!("image/{ext}"), FileKind::Image),
        "jpg" | "jpeg" => ("image/jpeg".to_string(), FileKind::Image),
        "woff" | "woff2" | "ttf" | "otf" | "eot" => (format!("font/{ext}"), FileKind::Javascript),
        _ => ("application/octet-stream".to_string(), FileKind::Javascript),
    };
    ProjectFile::new(
        name,
        kind,
        format!("data:{mime};base64,{}", BASE64.encode(bytes)),
    )
}

/// Prepends a synthesized folder entry for every path prefix occurring in
/// `files`, in first-encounter order.
pub fn with_folder_entries(files: Vec<ProjectFile>) -> Vec<ProjectFile> {
    let mut folder_names: Vec<String> = Vec::new();
    for file in &files {
        let segments: Vec<&str> = file.name.split('/').collect();
        let mut current = String::new();
        for segment in &segments[..segments.len().saturating_sub(1)] {
            if current.is_empty() {
                current = (*segment).to_string();
            } else {
                current = format!("{current}/{segment}");
            }
            if !folder_names.contains(&current) {
                folder_names.push(current.clone());
            }
        }
    }

    let mut combined: Vec<ProjectFile> =
        folder_names.into_iter().map(ProjectFile::folder).collect();
    combined.extend(files);
    combined
}

/// Expands a zip archive into the virtual file set. Directory entries and
/// anything under `__MACOSX/` are skipped.
pub fn import_archive<R: Read + Seek>(reader: R) -> StudioResult<Vec<ProjectFile>> {
    let mut archive =
        zip::ZipArchive::new(reader).map_err(|e| StudioError::Archive(e.to_string()))?;

    let mut files = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| StudioError::Archive(e.to_string()))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if name.starts_with("__MACOSX/") {
            continue;
        }
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| StudioError::Archive(e.to_string()))?;
        files.push(classify_entry(&name, &bytes));
    }

    Ok(with_folder_entries(files))
}

/// Writes every non-folder file into a zip archive. Image files carrying a
/// data URI have the base64 payload decoded back to binary; everything else
/// is written as raw text verbatim.
pub fn export_archive(files: &[ProjectFile]) -> StudioResult<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for file in files.iter().filter(|f| !f.is_folder()) {
        writer
            .start_file(file.name.as_str(), options)
            .map_err(|e| StudioError::Archive(e.to_string()))?;

        if file.kind == FileKind::Image && file.content.starts_with("data:") {
            let payload = file.content.split_once(',').map(|(_, p)| p).ok_or_else(|| {
                StudioError::Archive(format!("malformed data URI in \"{}\"", file.name))
            })?;
            let bytes = BASE64.decode(payload).map_err(|e| {
                StudioError::Archive(format!("invalid base64 payload in \"{}\": {e}", file.name))
            })?;
            writer
                .write_all(&bytes)
                .map_err(|e| StudioError::Archive(e.to_string()))?;
        } else {
            writer
                .write_all(file.content.as_bytes())
                .map_err(|e| StudioError::Archive(e.to_string()))?;
        }
    }

    let cursor = writer
        .finish()
        .map_err(|e| StudioError::Archive(e.to_string()))?;
    Ok(cursor.into_inner())
}
