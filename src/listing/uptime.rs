//! Human-readable elapsed time
//!
//! Produces strings such as `1h2m3.5s`, `4m0.25s`, `12.000301s` or `350ms`.
//! Fractions keep nanosecond precision with trailing zeros trimmed.

use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

pub fn format_elapsed(elapsed: Duration) -> String {
    let nanos = elapsed.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }

    if nanos < NANOS_PER_SEC {
        let (scale, unit) = if nanos < 1_000 {
            (1, "ns")
        } else if nanos < 1_000_000 {
            (1_000, "µs")
        } else {
            (1_000_000, "ms")
        };
        return format!("{}{unit}", decimal(nanos, scale));
    }

    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs / 60) % 60;
    let secs_nanos = u128::from(total_secs % 60) * NANOS_PER_SEC
        + u128::from(elapsed.subsec_nanos());
    let secs = decimal(secs_nanos, NANOS_PER_SEC);

    if hours > 0 {
        format!("{hours}h{minutes}m{secs}s")
    } else if minutes > 0 {
        format!("{minutes}m{secs}s")
    } else {
        format!("{secs}s")
    }
}

/// `value / scale` as a decimal string without trailing zeros
fn decimal(value: u128, scale: u128) -> String {
    let whole = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let width = scale.to_string().len() - 1;
    let digits = format!("{frac:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
