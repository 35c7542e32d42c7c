//! Unit formatting for table cells.

const BYTE_UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
const BIT_UNITS: &[&str] = &["bits", "Kbits", "Mbits", "Gbits", "Tbits"];

/// Milliseconds rendered as seconds, e.g. `0.30 sec`
pub fn seconds(ms: f64) -> String {
    format!("{:.2} sec", ms / 1000.0)
}

/// Fixed precision number followed by `unit`
pub fn number(value: f64, accuracy: usize, unit: &str) -> String {
    format!("{:.*}{}", accuracy, value, unit)
}

/// Per-second rate, e.g. `0.40/sec`
pub fn rate(per_sec: f64) -> String {
    number(per_sec, 2, "/sec")
}

/// Byte count with binary scaling, e.g. `1.22 KB`
pub fn byte_size(bytes: f64) -> String {
    let (value, unit) = scale(bytes, BYTE_UNITS);
    format!("{:.2} {}", value, unit)
}

/// Byte throughput as a bit rate with binary scaling, e.g. `5.73 Mbits/sec`
pub fn bit_rate(bytes_per_sec: f64) -> String {
    let (value, unit) = scale(bytes_per_sec * 8.0, BIT_UNITS);
    format!("{:.2} {}/sec", value, unit)
}

fn scale(mut value: f64, units: &[&'static str]) -> (f64, &'static str) {
    let mut idx = 0;
    while value.abs() >= 1024.0 && idx < units.len() - 1 {
        value /= 1024.0;
        idx += 1;
    }
    (value, units[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_size() {
        assert_eq!(byte_size(1245.0), "1.22 KB");
        assert_eq!(byte_size(124.0), "124.00 B");
        assert_eq!(byte_size(3.0 * 1024.0 * 1024.0), "3.00 MB");
        assert_eq!(byte_size(0.0), "0.00 B");
    }

    #[test]
    fn test_byte_size_caps_at_largest_unit() {
        let petabyte = 1024f64.powi(5);
        assert_eq!(byte_size(petabyte), "1024.00 TB");
    }

    #[test]
    fn test_bit_rate() {
        assert_eq!(bit_rate(751005.0), "5.73 Mbits/sec");
        assert_eq!(bit_rate(10.0), "80.00 bits/sec");
        assert_eq!(bit_rate(128.0), "1.00 Kbits/sec");
    }

    #[test]
    fn test_seconds_and_rates() {
        assert_eq!(seconds(300.0), "0.30 sec");
        assert_eq!(seconds(1234.0), "1.23 sec");
        assert_eq!(rate(0.4), "0.40/sec");
        assert_eq!(number(42.5, 2, "%"), "42.50%");
        assert_eq!(number(1.0, 2, " MB"), "1.00 MB");
    }
}
