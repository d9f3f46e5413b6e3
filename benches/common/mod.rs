//! Shared fixture generators for benches.

/// Delimited text with a header and `rows` consistent data rows.
pub fn generate_csv(delimiter: char, rows: usize) -> String {
    let d = delimiter;
    let mut out = format!("id{d}name{d}score{d}city\n");
    for i in 0..rows {
        out.push_str(&format!(
            "{i}{d}name_{i}{d}{}{d}\"city, {}\"\n",
            (i * 37) % 1000,
            i % 7
        ));
    }
    out
}
