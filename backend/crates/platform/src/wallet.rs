//! Wallet address format checks
//!
//! Structural validation for EVM-style account addresses: a `0x` prefix
//! followed by 40 hexadecimal digits. EIP-55 checksum verification is not
//! performed here; mixed-case input is accepted as-is.

/// Required prefix for account addresses
pub const ADDRESS_PREFIX: &str = "0x";

/// Total address length including the prefix
pub const ADDRESS_LEN: usize = 42;

/// Why a string is not a well-formed address
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressFormatError {
    #[error("address is empty")]
    Empty,

    #[error("address must start with {ADDRESS_PREFIX}")]
    MissingPrefix,

    #[error("address must be {expected} characters long, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid character {character:?} at position {position}")]
    InvalidCharacter { position: usize, character: char },
}

/// Check that `raw` is a structurally valid address.
///
/// The input is expected to be trimmed by the caller.
///
/// ## Examples
/// ```
/// use platform::wallet::check_address_format;
///
/// assert!(check_address_format("0x242c0c356cbaea0e1a80a574f1d3571a0babe772").is_ok());
/// assert!(check_address_format("not-a-wallet").is_err());
/// ```
pub fn check_address_format(raw: &str) -> Result<(), AddressFormatError> {
    if raw.is_empty() {
        return Err(AddressFormatError::Empty);
    }

    let Some(digits) = raw.strip_prefix(ADDRESS_PREFIX) else {
        return Err(AddressFormatError::MissingPrefix);
    };

    let actual = raw.chars().count();
    if actual != ADDRESS_LEN {
        return Err(AddressFormatError::InvalidLength {
            expected: ADDRESS_LEN,
            actual,
        });
    }

    if let Some((offset, character)) = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_hexdigit())
    {
        return Err(AddressFormatError::InvalidCharacter {
            position: offset + ADDRESS_PREFIX.len(),
            character,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "0x242c0c356cbaea0e1a80a574f1d3571a0babe772";

    #[test]
    fn test_valid_addresses() {
        assert!(check_address_format(VALID).is_ok());
        assert!(check_address_format("0x242C0C356CBAEA0E1A80A574F1D3571A0BABE772").is_ok());
        assert!(check_address_format("0x0000000000000000000000000000000000000000").is_ok());
    }

    #[test]
    fn test_empty() {
        assert_eq!(check_address_format(""), Err(AddressFormatError::Empty));
    }

    #[test]
    fn test_missing_prefix() {
        assert_eq!(
            check_address_format("not-a-wallet"),
            Err(AddressFormatError::MissingPrefix)
        );
        assert_eq!(
            check_address_format("242c0c356cbaea0e1a80a574f1d3571a0babe77200"),
            Err(AddressFormatError::MissingPrefix)
        );
    }

    #[test]
    fn test_wrong_length() {
        assert_eq!(
            check_address_format("0x1234"),
            Err(AddressFormatError::InvalidLength {
                expected: 42,
                actual: 6
            })
        );

        let too_long = format!("{VALID}0");
        assert!(matches!(
            check_address_format(&too_long),
            Err(AddressFormatError::InvalidLength { actual: 43, .. })
        ));
    }

    #[test]
    fn test_non_hex_character() {
        let bad = "0x242c0c356cbaea0e1a80a574f1d3571a0babe77g";
        assert_eq!(
            check_address_format(bad),
            Err(AddressFormatError::InvalidCharacter {
                position: 41,
                character: 'g'
            })
        );
    }

    #[test]
    fn test_multibyte_input_is_rejected() {
        // 42 chars but not all ASCII hex
        let bad = "0x242c0c356cbaea0e1a80a574f1d3571a0babe77é";
        assert!(check_address_format(bad).is_err());
    }
}
