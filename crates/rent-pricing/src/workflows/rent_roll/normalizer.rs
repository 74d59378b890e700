pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned: String = value
        .replace(['\u{feff}', '\u{200b}'], "")
        .chars()
        .map(|c| match c {
            '_' | '.' | ':' | '#' => ' ',
            other => other,
        })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_lowercase()
}

#[cfg(test)]
pub(crate) fn normalize_for_tests(value: &str) -> String {
    normalize_header(value)
}
