const BYTES_PER_GIB: f64 = 1_073_741_824.0;
const BYTES_PER_MIB: f64 = 1_048_576.0;

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub fn bytes_to_gib(bytes: u64) -> f64 {
    round_to(bytes as f64 / BYTES_PER_GIB, 2)
}

pub fn bytes_per_sec_to_mbps(bytes_per_sec: f64) -> f64 {
    round_to(bytes_per_sec / BYTES_PER_MIB, 2)
}

pub fn seconds_to_ms(seconds: f64) -> f64 {
    round_to(seconds * 1000.0, 2)
}

/// Share of free space, 0 for a zero-sized volume.
pub fn free_percent(free_bytes: u64, total_bytes: u64) -> f64 {
    if total_bytes == 0 {
        return 0.0;
    }
    round_to(free_bytes as f64 / total_bytes as f64 * 100.0, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_percent_of_empty_volume_is_zero() {
        assert_eq!(free_percent(0, 0), 0.0);
        assert_eq!(free_percent(123, 0), 0.0);
    }

    #[test]
    fn free_percent_rounds_to_one_decimal() {
        assert_eq!(free_percent(1, 3), 33.3);
        assert_eq!(free_percent(50, 100), 50.0);
    }

    #[test]
    fn sizes_use_binary_units() {
        assert_eq!(bytes_to_gib(1_073_741_824), 1.0);
        assert_eq!(bytes_to_gib(500_107_862_016), 465.76);
        assert_eq!(bytes_per_sec_to_mbps(1_572_864.0), 1.5);
    }

    #[test]
    fn latency_converts_seconds_to_ms() {
        assert_eq!(seconds_to_ms(0.000_6), 0.6);
        assert_eq!(seconds_to_ms(0.012_34), 12.34);
    }
}
