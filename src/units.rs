use rust_decimal::Decimal;
use thiserror::Error;

/// Base-unit amount of native currency or of a token.
pub type Amount = u128;

/// Fractional digits shared by the native currency and every custodied token.
pub const DECIMALS: u32 = 18;

/// `10^DECIMALS`, one whole unit expressed in base units.
pub const ONE_UNIT: Amount = 10u128.pow(DECIMALS);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
    #[error("Amount must not be negative: {0}")]
    Negative(Decimal),
    #[error("Amount {value} has more than {decimals} fractional digits")]
    TooPrecise { value: Decimal, decimals: u32 },
    #[error("Amount {0} does not fit into base units")]
    Overflow(Decimal),
}

/// Converts whole units (e.g. `1.5`) into base units (`1.5 * 10^decimals`).
pub fn parse_units(value: Decimal, decimals: u32) -> Result<Amount, UnitsError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(UnitsError::Negative(value));
    }
    let value = value.normalize();
    let scale = value.scale();
    if scale > decimals {
        return Err(UnitsError::TooPrecise { value, decimals });
    }
    // non-negative, so the mantissa fits
    let mantissa = value.mantissa().unsigned_abs();
    10u128
        .checked_pow(decimals - scale)
        .and_then(|factor| mantissa.checked_mul(factor))
        .ok_or(UnitsError::Overflow(value))
}

/// Renders base units as whole units, with trailing zeros removed.
///
/// Works on the integer directly, so every [`Amount`] has a rendering.
pub fn format_units(amount: Amount, decimals: u32) -> String {
    // 10^39 and above exceed u128: the whole part is then always zero
    let (whole, fraction) = match 10u128.checked_pow(decimals) {
        Some(factor) => (amount / factor, amount % factor),
        None => (0, amount),
    };
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{fraction:0width$}", width = decimals as usize);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
