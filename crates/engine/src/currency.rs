use crate::EngineError;

/// ISO-like three letter currency code of an account (e.g. `USD`).
///
/// The engine treats amounts as currency agnostic: a transfer between two
/// accounts with different currencies moves the same face value. The code is
/// informational (display/export) and always stored upper-cased.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Currency([u8; 3]);

impl Currency {
    /// Currency used when an account is opened without one.
    pub const DEFAULT: Currency = Currency(*b"UAH");

    /// Canonical currency code.
    #[must_use]
    pub fn code(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let upper = value.trim().to_ascii_uppercase();
        match upper.as_bytes() {
            [a, b, c] if upper.bytes().all(|byte| byte.is_ascii_uppercase()) => {
                Ok(Currency([*a, *b, *c]))
            }
            _ => Err(EngineError::InvalidField(format!(
                "invalid currency code: {value}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_normalized() {
        assert_eq!(Currency::try_from("usd").unwrap().code(), "USD");
        assert_eq!(Currency::try_from(" Eur ").unwrap().to_string(), "EUR");
        assert_eq!(Currency::default().code(), "UAH");
    }

    #[test]
    fn rejects_anything_but_three_letters() {
        for raw in ["", "US", "USDT", "U5D", "€€€"] {
            assert!(Currency::try_from(raw).is_err(), "{raw:?} should be rejected");
        }
    }
}
