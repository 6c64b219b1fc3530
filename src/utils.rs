use std::path::Path;

/// Extensions offered by the open dialogs and accepted from folders
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

/// Paths longer than this are shortened for display
pub const TRUNCATE_MAX: usize = 50;
const TRUNCATE_HEAD: usize = 20;
const TRUNCATE_TAIL: usize = 40;

/// Get file extension in lowercase
pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Check if a path has one of the supported image extensions
pub fn is_image_file(path: &Path) -> bool {
    match get_file_extension(path) {
        Some(ext) => IMAGE_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}

/// Shorten long paths to `head...tail` for combo boxes and lists
pub fn truncate_file_path(path: &str) -> String {
    let char_count = path.chars().count();
    if char_count <= TRUNCATE_MAX {
        return path.to_string();
    }

    let head: String = path.chars().take(TRUNCATE_HEAD).collect();
    let tail: String = path.chars().skip(char_count - TRUNCATE_TAIL).collect();
    format!("{}...{}", head, tail)
}

/// Generate a safe filename segment by replacing characters that are
/// invalid on common filesystems
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
