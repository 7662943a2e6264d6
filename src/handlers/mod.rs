//! Request handlers, one module per area. The router picks the handler;
//! handlers authenticate, call into `services`/`db`, and render.

pub mod auth;
pub mod campaigns;
pub mod coordination;
pub mod pages;
pub mod planning;
pub mod teams;

/// Filesystem-safe stem for download names.
pub(crate) fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let stem = stem.trim_matches('-').to_string();
    if stem.is_empty() {
        "campaign".to_string()
    } else {
        stem
    }
}
