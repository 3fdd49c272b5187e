const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Base-1024 size with two decimals, e.g. `1.50 KB`.
pub fn human_size(bytes: f64) -> String {
    let mut size = bytes;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} PB", size)
}
