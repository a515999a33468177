use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use pagecraft::archive::{classify_entry, import_archive, with_folder_entries};
use pagecraft::{build_preview_document, ProjectFile};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: pagecraft-preview <project-dir | project.zip> [out.html]");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  pagecraft-preview ./my-site");
        eprintln!("  pagecraft-preview site.zip preview.html");
        process::exit(1);
    }

    let source = Path::new(&args[1]);
    let files = match load_project(source) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("✗ failed to load {}: {}", source.display(), e);
            process::exit(1);
        }
    };

    let document = build_preview_document(&files);

    match args.get(2) {
        Some(out_path) => {
            if let Err(e) = fs::write(out_path, &document) {
                eprintln!("✗ failed to write {}: {}", out_path, e);
                process::exit(1);
            }
            println!("✓ wrote preview to {}", out_path);
        }
        None => print!("{document}"),
    }
}

fn load_project(source: &Path) -> Result<Vec<ProjectFile>, String> {
    if source.is_dir() {
        let mut files = Vec::new();
        collect_files(source, source, &mut files).map_err(|e| e.to_string())?;
        files.sort_by(|a, b| a.name.cmp(&b.name));
        return Ok(with_folder_entries(files));
    }

    let file = fs::File::open(source).map_err(|e| e.to_string())?;
    import_archive(file).map_err(|e| e.to_string())
}

fn collect_files(root: &Path, dir: &Path, files: &mut Vec<ProjectFile>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, files)?;
        } else {
            let name = relative_name(root, &path);
            let bytes = fs::read(&path)?;
            files.push(classify_entry(&name, &bytes));
        }
    }
    Ok(())
}

fn relative_name(root: &Path, path: &Path) -> String {
    let relative: PathBuf = path.strip_prefix(root).unwrap_or(path).to_path_buf();
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
