use crate::filters::format_price;

/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Price with a currency sign, e.g. `$49.5`
pub fn dollars(price: f64) -> String {
  format!("${}", format_price(price))
}
