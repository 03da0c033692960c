use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use std::fs;
use std::path::{Path, PathBuf};

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "wmv", "mkv", "flv", "m4v", "webm", "ts"];

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Video files directly inside `dir`, sorted by name.
pub fn list_video_files(dir: &Path) -> Result<Vec<VideoFile>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() || !is_video_file(&path) {
            continue;
        }
        let metadata = entry
            .metadata()
            .with_context(|| format!("Failed to read metadata for {}", path.display()))?;
        files.push(VideoFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            size_bytes: metadata.len(),
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.1}", bytes as f64 / BYTES_PER_MB)
}

pub fn render_file_table(files: &[VideoFile]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["No.", "File Name", "Size (MB)"]);

    for (i, file) in files.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&file.name),
            Cell::new(format_size_mb(file.size_bytes)).set_alignment(CellAlignment::Right),
        ]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(is_video_file(Path::new("clip.MP4")));
        assert!(is_video_file(Path::new("dir/holiday.mkv")));
        assert!(!is_video_file(Path::new("notes.txt")));
        assert!(!is_video_file(Path::new("mp4")));
    }

    #[test]
    fn lists_only_videos_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.mov"), vec![0u8; 2048]).unwrap();
        fs::write(dir.path().join("a.mp4"), b"x").unwrap();
        fs::write(dir.path().join("readme.md"), b"x").unwrap();
        fs::create_dir(dir.path().join("folder.mp4")).unwrap();

        let files = list_video_files(dir.path()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names, vec!["a.mp4", "b.mov"]);
        assert_eq!(files[1].size_bytes, 2048);
    }

    #[test]
    fn empty_directory_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_video_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(list_video_files(Path::new("/definitely/not/here")).is_err());
    }

    #[test]
    fn table_shows_sizes_in_mb() {
        let files = vec![VideoFile {
            name: "clip.mp4".to_string(),
            path: PathBuf::from("clip.mp4"),
            size_bytes: 5 * 1024 * 1024 + 512 * 1024,
        }];
        let rendered = render_file_table(&files);
        assert!(rendered.contains("clip.mp4"));
        assert!(rendered.contains("5.5"));
        assert!(rendered.contains("Size (MB)"));
    }
}
