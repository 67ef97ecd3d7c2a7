//! Number formatting for human-readable summaries.

/// Formats an integer with `,` thousands separators.
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Fixed two-decimal rendering used for MiB and GFLOPs columns.
pub fn fixed2(value: f64) -> String {
    format!("{:.2}", value)
}
