pub const SEED_QUERY_PARAM: &str = "seed";
/// Fresh seeds are drawn from `[0, SEED_RANGE)` so they stay short in URLs.
pub const SEED_RANGE: u32 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeedError {
    #[error("seed is empty")]
    Empty,
    #[error("seed `{0}` is not an integer")]
    NotAnInteger(String),
}

/// Parses a decimal or `0x` hex seed. Underscores are ignored and values
/// outside `u32` wrap modulo 2^32, matching the generator's arithmetic.
pub fn parse_seed(raw: &str) -> Result<u32, SeedError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SeedError::Empty);
    }
    let normalized = trimmed.replace('_', "");
    let invalid = || SeedError::NotAnInteger(trimmed.to_string());
    let value = if let Some(hex) = normalized
        .strip_prefix("0x")
        .or_else(|| normalized.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).map_err(|_| invalid())?
    } else {
        normalized.parse::<i64>().map_err(|_| invalid())?
    };
    Ok(value as u32)
}

/// Maps a uniform `[0, 1)` sample from platform randomness to a fresh seed.
pub fn seed_from_unit(unit: f64) -> u32 {
    let unit = if unit.is_finite() { unit.clamp(0.0, 1.0) } else { 0.0 };
    ((unit * SEED_RANGE as f64).floor() as u32).min(SEED_RANGE - 1)
}
