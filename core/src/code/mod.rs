//! Security-code generation.

use rand::{rngs::OsRng, Rng};

/// Default number of digits in a security code.
pub const DEFAULT_TOKEN_LENGTH: usize = 6;

/// Maximum supported number of digits in a security code.
pub const MAX_TOKEN_LENGTH: usize = 10;

/// Generates a uniformly random decimal security code of exactly
/// `length` digits. Leading zeros are allowed.
///
/// Uses `OsRng` (OS-provided CSPRNG); each digit is drawn independently,
/// so the distribution over codes is uniform. A zero `length` is a
/// configuration error and is rejected by settings validation before
/// this function is ever reached.
pub fn generate_security_code(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generates_exact_length_all_digits() {
        for length in 1..=MAX_TOKEN_LENGTH {
            let code = generate_security_code(length);
            assert_eq!(code.len(), length);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn default_length_codes_parse_as_numbers() {
        for _ in 0..100 {
            let code = generate_security_code(DEFAULT_TOKEN_LENGTH);
            let num: u32 = code.parse().expect("code should be numeric");
            assert!(num < 1_000_000);
        }
    }

    #[test]
    fn codes_are_not_constant() {
        let codes: HashSet<String> = (0..100)
            .map(|_| generate_security_code(DEFAULT_TOKEN_LENGTH))
            .collect();
        assert!(codes.len() > 1);
    }

    #[test]
    fn leading_zeros_are_preserved() {
        // With single-digit codes a zero shows up quickly.
        let saw_zero = (0..200).any(|_| generate_security_code(1) == "0");
        assert!(saw_zero);
    }
}
