//! Input validation utilities

/// Returns the trimmed value, or an error naming the field if it is blank
pub fn require<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(format!("{} is required", field)),
    }
}

/// Validate password
///
/// Strength rules are left to the client; only presence and an upper bound
/// are enforced here.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Parse and validate a gift price
pub fn parse_price(raw: &str) -> Result<f64, String> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("Invalid price: {}", raw))?;

    if !price.is_finite() {
        return Err(format!("Invalid price: {}", raw));
    }

    if price < 0.0 {
        return Err("Price must not be negative".to_string());
    }

    Ok(price)
}
