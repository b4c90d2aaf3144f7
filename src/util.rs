pub fn format_count(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 10_000 {
        format!("{:.0}k", count as f64 / 1_000.0)
    } else if count >= 1_000 {
        format!("{:.1}k", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

pub fn truncate_middle(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars || max_chars < 5 {
        return text.to_string();
    }

    let keep = max_chars - 3;
    let head = keep / 2 + keep % 2;
    let tail = keep / 2;

    let start = text.chars().take(head).collect::<String>();
    let end = text.chars().skip(char_count - tail).collect::<String>();
    format!("{start}...{end}")
}
