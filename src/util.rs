//! Small text helpers used across modules.

/// Lowercase a single character without changing the cell count.
/// Characters whose lowercase form expands to several chars keep their first one.
pub fn fold_letter(ch: char) -> char {
  ch.to_lowercase().next().unwrap_or(ch)
}

/// Uppercase counterpart of `fold_letter`.
pub fn upper_letter(ch: char) -> char {
  ch.to_uppercase().next().unwrap_or(ch)
}

/// First character upper-cased, the rest lower-cased ("ho-OH" -> "Ho-oh").
pub fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first
      .to_uppercase()
      .chain(chars.flat_map(char::to_lowercase))
      .collect(),
    None => String::new(),
  }
}

/// Key used for cache files and API lookups.
pub fn normalize_name(name: &str) -> String {
  name.trim().to_lowercase()
}

/// Log-safe truncation for user-supplied input.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    format!("{}… ({} chars total)", s.chars().take(max).collect::<String>(), s.chars().count())
  }
}
