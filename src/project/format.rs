pub struct FileSizeUtils;

impl FileSizeUtils {
    /// Human readable size in base 1024, e.g. `1.5 MB`.
    pub fn format_size(size: u64) -> String {
        const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
        if size == 0 {
            return "0 Bytes".to_string();
        }

        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        let rounded = format!("{:.2}", size);
        let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
        format!("{} {}", trimmed, UNITS[unit_index])
    }
}

pub fn format_percent(progress: f32) -> String {
    format!("{}%", progress.round() as i64)
}
