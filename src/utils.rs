/// Formats an optional f64 to 4 decimal places, or returns "—" if None or non-finite.
pub fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.4}"),
        Some(x) if x.is_infinite() => if x > 0.0 { "inf" } else { "-inf" }.to_owned(),
        _ => "—".to_owned(),
    }
}

/// Formats a p-value, switching to scientific notation below 1e-4.
pub fn fmt_p(p: f64) -> String {
    if !p.is_finite() {
        return fmt_opt(None);
    }
    if p != 0.0 && p < 1e-4 {
        format!("{p:.2e}")
    } else {
        format!("{p:.4}")
    }
}

/// Turns a batch label into something safe to use as a file name stem.
pub fn sanitize_file_stem(label: &str) -> String {
    let stem: String = label
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('.');
    if stem.is_empty() {
        "batch".to_owned()
    } else {
        stem.to_owned()
    }
}
