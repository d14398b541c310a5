pub mod app_config;
pub mod cors_config;
pub mod database_config;
pub mod import_config;
pub mod server_config;

/// Reads an environment variable as a positive number, falling back to `default`
/// when it is unset, malformed or zero.
pub fn positive_or(raw: Option<String>, default: usize) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}
