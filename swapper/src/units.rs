use crate::types::SwapError;

/// Largest decimal precision accepted for an asset
pub const MAX_DECIMALS: u8 = 18;

/// Convert a human-readable amount into base units, truncating.
///
/// The amount is scaled on its shortest decimal representation, so `0.29`
/// at 2 decimals is `29` rather than the `28` a binary float product would
/// floor to. The result never exceeds the amount the caller wrote.
pub fn to_base_units(amount_ui: f64, decimals: u8) -> Result<u64, SwapError> {
    if !amount_ui.is_finite() {
        return Err(SwapError::InvalidAmount(format!(
            "amount must be finite, got {}",
            amount_ui
        )));
    }
    if amount_ui < 0.0 {
        return Err(SwapError::InvalidAmount(format!(
            "amount must not be negative, got {}",
            amount_ui
        )));
    }
    if decimals > MAX_DECIMALS {
        return Err(SwapError::InvalidAmount(format!(
            "decimals must be at most {}, got {}",
            MAX_DECIMALS, decimals
        )));
    }

    if amount_ui == 0.0 {
        return Ok(0);
    }

    // f64 Display never uses exponent notation
    let rendered = amount_ui.to_string();
    let (whole, fraction) = rendered.split_once('.').unwrap_or((&rendered, ""));

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    let kept = fraction.len().min(decimals as usize);
    digits.push_str(&fraction[..kept]);
    for _ in kept..decimals as usize {
        digits.push('0');
    }

    let scaled: u128 = digits
        .parse()
        .map_err(|e| SwapError::InvalidAmount(format!("cannot scale {}: {}", amount_ui, e)))?;

    u64::try_from(scaled).map_err(|_| {
        SwapError::InvalidAmount(format!(
            "{} with {} decimals does not fit in a u64",
            amount_ui, decimals
        ))
    })
}

/// Convert base units back into a human-readable amount
pub fn to_ui_amount(raw_amount: u64, decimals: u8) -> f64 {
    raw_amount as f64 / 10f64.powi(decimals as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_base_units_truncates() {
        assert_eq!(to_base_units(0.005, 9).unwrap(), 5_000_000);
        assert_eq!(to_base_units(1.0000000009, 9).unwrap(), 1_000_000_000);
        assert_eq!(to_base_units(1.999, 2).unwrap(), 199);
        assert_eq!(to_base_units(0.29, 2).unwrap(), 29);
        assert_eq!(to_base_units(42.0, 0).unwrap(), 42);
        assert_eq!(to_base_units(42.9, 0).unwrap(), 42);
        assert_eq!(to_base_units(0.0, 9).unwrap(), 0);
    }

    #[test]
    fn test_to_base_units_tiny_amounts() {
        assert_eq!(to_base_units(0.0000001, 9).unwrap(), 100);
        assert_eq!(to_base_units(0.0000000001, 9).unwrap(), 0);
        assert_eq!(to_base_units(0.000000000000000001, 18).unwrap(), 1);
    }

    #[test]
    fn test_to_base_units_rejects_bad_input() {
        assert!(matches!(to_base_units(-0.5, 9), Err(SwapError::InvalidAmount(_))));
        assert!(matches!(to_base_units(f64::NAN, 9), Err(SwapError::InvalidAmount(_))));
        assert!(matches!(to_base_units(f64::INFINITY, 9), Err(SwapError::InvalidAmount(_))));
        assert!(matches!(to_base_units(1.0, 19), Err(SwapError::InvalidAmount(_))));
    }

    #[test]
    fn test_to_base_units_overflow() {
        // 100 tokens at 18 decimals is 1e20 base units
        assert!(matches!(to_base_units(100.0, 18), Err(SwapError::InvalidAmount(_))));
        assert_eq!(to_base_units(18.0, 18).unwrap(), 18_000_000_000_000_000_000);
    }

    #[test]
    fn test_ui_amount_matches_base_units() {
        for (raw, decimals) in [(1_000_000_000u64, 9u8), (5_000_000, 9), (123_456, 6), (7, 0)] {
            let ui = to_ui_amount(raw, decimals);
            assert!((ui * 10f64.powi(decimals as i32) - raw as f64).abs() < 1e-6);
        }
    }
}
