use std::time::Duration;

const SIZE_UNITS: &[&str] = &["KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Byte count in base-1024 units with two decimals, e.g. `1.50 KB`.
pub fn readable_size(bytes: usize) -> String {
    let kilobyte = 1024.0;
    let mut size = bytes as f64;
    if size < kilobyte {
        return format!("{:.2} bytes", size);
    }
    size /= kilobyte;
    let mut unit = SIZE_UNITS[0];
    for next in &SIZE_UNITS[1..] {
        if size <= kilobyte {
            break;
        }
        size /= kilobyte;
        unit = next;
    }
    format!("{:.2} {}", size, unit)
}

/// Elapsed time as `us`, `ms`, `s` or `Xm Ys`.
pub fn readable_time(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs > 60.0 {
        let rounded = secs.round() as u64;
        format!("{}m {}s", rounded / 60, rounded % 60)
    } else if secs > 1.0 {
        format!("{:.3} s", secs)
    } else if secs > 0.001 {
        format!("{} ms", (secs * 1_000.0).round())
    } else {
        format!("{} us", (secs * 1_000_000.0).round())
    }
}
