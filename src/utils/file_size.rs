/// Size the upload card advertises ("up to 10MB"). Shown to the user only;
/// nothing rejects larger files.
pub const ADVERTISED_UPLOAD_LIMIT: u64 = 10 * 1024 * 1024;

/// Human readable size in binary units, e.g. `1.50 KB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = *next;
    }
    format!("{:.2} {}", value, unit)
}
