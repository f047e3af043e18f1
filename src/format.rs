const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Human-readable size with one decimal place, e.g. `1536` -> `"1.5KB"`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }
    scale(bytes as f64)
}

/// Transfer rate, formatted like [`format_size`] with a `/s` suffix.
///
/// Negative or non-finite rates render as zero.
pub fn format_speed(bytes_per_sec: f64) -> String {
    if !bytes_per_sec.is_finite() || bytes_per_sec <= 0.0 {
        return "0B/s".to_string();
    }
    format!("{}/s", scale(bytes_per_sec))
}

fn scale(mut size: f64) -> String {
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{}{}", one_decimal(size), UNITS[unit])
}

/// One decimal place, with exact ties rounded up rather than to even.
fn one_decimal(value: f64) -> String {
    // A tenths tie is always a multiple of 0.25, so both products are exact.
    let tenths = value * 10.0;
    if (value * 4.0).fract() == 0.0 && tenths.fract() == 0.5 {
        format!("{:.1}", tenths.ceil() / 10.0)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_well_formed(s: &str) -> bool {
        let Some(number) = UNITS
            .iter()
            .rev()
            .find_map(|unit| s.strip_suffix(unit))
        else {
            return false;
        };
        let (whole, frac) = match number.split_once('.') {
            Some((whole, frac)) => (whole, Some(frac)),
            None => (number, None),
        };
        !whole.is_empty()
            && whole.chars().all(|c| c.is_ascii_digit())
            && frac.is_none_or(|f| f.len() == 1 && f.chars().all(|c| c.is_ascii_digit()))
    }

    #[test]
    fn golden_sizes() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(500), "500.0B");
        assert_eq!(format_size(1023), "1023.0B");
        assert_eq!(format_size(1024), "1.0KB");
        assert_eq!(format_size(1536), "1.5KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0MB");
        assert_eq!(format_size(1073741824), "1.0GB");
    }

    #[test]
    fn exact_ties_round_up() {
        assert_eq!(format_size(1280), "1.3KB");
        assert_eq!(format_size(3328), "3.3KB");
        assert_eq!(format_size(1024 * 1024 * 5 / 4), "1.3MB");
        assert_eq!(format_speed(0.25), "0.3B/s");
        assert_eq!(format_speed(0.75), "0.8B/s");
    }

    #[test]
    fn near_ties_follow_the_stored_value() {
        // 1.15 is stored just below the tie.
        assert_eq!(format_speed(1.15), "1.1B/s");
        assert_eq!(format_speed(1.5), "1.5B/s");
    }

    #[test]
    fn gigabytes_is_the_largest_unit() {
        assert_eq!(format_size(2048 * 1024 * 1024 * 1024), "2048.0GB");
    }

    #[test]
    fn sizes_match_display_pattern() {
        let mut bytes = 1u64;
        while bytes < u64::MAX / 4 {
            let formatted = format_size(bytes);
            assert!(is_well_formed(&formatted), "{bytes} -> {formatted}");
            bytes = bytes * 3 + 7;
        }
        assert!(is_well_formed(&format_size(u64::MAX)));
        assert!(is_well_formed(&format_size(0)));
    }

    #[test]
    fn speed_has_suffix() {
        assert_eq!(format_speed(100.0), "100.0B/s");
        assert_eq!(format_speed(1536.0), "1.5KB/s");
        assert_eq!(format_speed(0.0), "0B/s");
    }

    #[test]
    fn bogus_speed_is_zero() {
        assert_eq!(format_speed(-12.0), "0B/s");
        assert_eq!(format_speed(f64::NAN), "0B/s");
        assert_eq!(format_speed(f64::INFINITY), "0B/s");
    }
}
