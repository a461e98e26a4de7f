//! Share pack passcode hashing.
//!
//! Digests are scrypt-derived with a server-side pepper. Two stored formats
//! coexist:
//!
//! - Current: bare hex of a 64-byte digest; the base64-decoded pepper doubles
//!   as the salt. This is the only format `hash_passcode` produces.
//! - Legacy: `s1$<salt hex>$<digest hex>` with a per-record salt and older
//!   cost parameters. Verified but never produced; legacy digests are not
//!   rehashed on successful verification, so they persist until the pack is
//!   recreated.
//!
//! Comparison is constant-time: passcodes gate medical documents, and a
//! timing side-channel that narrows the search space is a confidentiality
//! defect.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use scrypt::Params;
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::Zeroize;

const CURRENT_LOG_N: u8 = 14; // N = 16384
const CURRENT_R: u32 = 8;
const CURRENT_P: u32 = 1;
const CURRENT_KEY_LENGTH: usize = 64;

const LEGACY_PREFIX: &str = "s1$";
const LEGACY_LOG_N: u8 = 15; // N = 32768
const LEGACY_R: u32 = 8;
const LEGACY_P: u32 = 1;
const LEGACY_KEY_LENGTH: usize = 32;

#[derive(Error, Debug)]
pub enum PasscodeError {
    #[error("Pepper is not valid base64")]
    InvalidPepper,

    #[error("Stored passcode digest is malformed")]
    MalformedDigest,

    #[error("Key derivation failed: {0}")]
    Derivation(String),
}

/// A stored digest, decoded into its format variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasscodeHash {
    /// `s1$`-prefixed digest embedding its own salt.
    Legacy { salt: Vec<u8>, digest: Vec<u8> },
    /// Bare hex digest; the pepper supplies the salt.
    Current { digest: Vec<u8> },
}

impl PasscodeHash {
    /// Decode a stored digest string. The format is selected by a literal
    /// prefix check; anything that is neither a legacy string nor bare hex
    /// is rejected.
    pub fn parse(stored: &str) -> Result<Self, PasscodeError> {
        if let Some(rest) = stored.strip_prefix(LEGACY_PREFIX) {
            let (salt_hex, digest_hex) =
                rest.split_once('$').ok_or(PasscodeError::MalformedDigest)?;
            let salt = hex::decode(salt_hex).map_err(|_| PasscodeError::MalformedDigest)?;
            let digest = hex::decode(digest_hex).map_err(|_| PasscodeError::MalformedDigest)?;
            if salt.is_empty() || digest.len() != LEGACY_KEY_LENGTH {
                return Err(PasscodeError::MalformedDigest);
            }
            return Ok(PasscodeHash::Legacy { salt, digest });
        }

        let digest = hex::decode(stored).map_err(|_| PasscodeError::MalformedDigest)?;
        if digest.len() != CURRENT_KEY_LENGTH {
            return Err(PasscodeError::MalformedDigest);
        }
        Ok(PasscodeHash::Current { digest })
    }

    /// Encode back to the stored string form.
    pub fn encode(&self) -> String {
        match self {
            PasscodeHash::Legacy { salt, digest } => {
                format!("{LEGACY_PREFIX}{}${}", hex::encode(salt), hex::encode(digest))
            }
            PasscodeHash::Current { digest } => hex::encode(digest),
        }
    }

    /// Derive under this format's parameters and compare in constant time.
    pub fn verify(&self, passcode: &str, pepper: &str) -> Result<bool, PasscodeError> {
        let mut derived = match self {
            PasscodeHash::Legacy { salt, .. } => {
                derive(passcode, salt, LEGACY_LOG_N, LEGACY_R, LEGACY_P, LEGACY_KEY_LENGTH)?
            }
            PasscodeHash::Current { .. } => {
                let salt = decode_pepper(pepper)?;
                derive(passcode, &salt, CURRENT_LOG_N, CURRENT_R, CURRENT_P, CURRENT_KEY_LENGTH)?
            }
        };

        let stored = match self {
            PasscodeHash::Legacy { digest, .. } => digest,
            PasscodeHash::Current { digest } => digest,
        };

        let matches = stored.ct_eq(&derived).unwrap_u8() == 1;
        derived.zeroize();
        Ok(matches)
    }
}

/// Hash a passcode in the current format.
pub fn hash_passcode(passcode: &str, pepper: &str) -> Result<String, PasscodeError> {
    let salt = decode_pepper(pepper)?;
    let digest = derive(passcode, &salt, CURRENT_LOG_N, CURRENT_R, CURRENT_P, CURRENT_KEY_LENGTH)?;
    Ok(PasscodeHash::Current { digest }.encode())
}

/// Verify a passcode against a stored digest of either format.
pub fn verify_passcode(passcode: &str, stored: &str, pepper: &str) -> Result<bool, PasscodeError> {
    PasscodeHash::parse(stored)?.verify(passcode, pepper)
}

fn decode_pepper(pepper: &str) -> Result<Vec<u8>, PasscodeError> {
    let salt = BASE64
        .decode(pepper)
        .map_err(|_| PasscodeError::InvalidPepper)?;
    if salt.is_empty() {
        return Err(PasscodeError::InvalidPepper);
    }
    Ok(salt)
}

fn derive(
    passcode: &str,
    salt: &[u8],
    log_n: u8,
    r: u32,
    p: u32,
    len: usize,
) -> Result<Vec<u8>, PasscodeError> {
    let params =
        Params::new(log_n, r, p, len).map_err(|e| PasscodeError::Derivation(e.to_string()))?;
    let mut out = vec![0u8; len];
    scrypt::scrypt(passcode.as_bytes(), salt, &params, &mut out)
        .map_err(|e| PasscodeError::Derivation(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_pepper() -> String {
        BASE64.encode("test-pepper")
    }

    fn make_legacy(passcode: &str, salt: &[u8]) -> String {
        let digest =
            derive(passcode, salt, LEGACY_LOG_N, LEGACY_R, LEGACY_P, LEGACY_KEY_LENGTH).unwrap();
        PasscodeHash::Legacy {
            salt: salt.to_vec(),
            digest,
        }
        .encode()
    }

    #[test]
    fn hash_verify_round_trip() {
        let pepper = test_pepper();
        let stored = hash_passcode("1234", &pepper).unwrap();
        assert!(stored.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(verify_passcode("1234", &stored, &pepper).unwrap());
    }

    #[test]
    fn wrong_passcode_fails() {
        let pepper = test_pepper();
        let stored = hash_passcode("1234", &pepper).unwrap();
        assert!(!verify_passcode("9999", &stored, &pepper).unwrap());
    }

    #[test]
    fn wrong_pepper_fails() {
        let stored = hash_passcode("1234", &test_pepper()).unwrap();
        let other = BASE64.encode("other-pepper");
        assert!(!verify_passcode("1234", &stored, &other).unwrap());
    }

    #[test]
    fn legacy_digest_verifies_under_legacy_derivation() {
        let stored = make_legacy("1234", b"per-record-salt");
        assert!(stored.starts_with("s1$"));
        assert!(verify_passcode("1234", &stored, &test_pepper()).unwrap());
        assert!(!verify_passcode("9999", &stored, &test_pepper()).unwrap());
    }

    #[test]
    fn formats_do_not_cross_verify() {
        let pepper = test_pepper();
        // A current digest re-encoded as legacy (with the pepper as salt)
        // must not verify: the cost parameters and digest length differ.
        let current = hash_passcode("1234", &pepper).unwrap();
        let digest = hex::decode(&current).unwrap();
        let cross = PasscodeHash::Legacy {
            salt: BASE64.decode(&pepper).unwrap(),
            digest: digest[..LEGACY_KEY_LENGTH].to_vec(),
        }
        .encode();
        assert!(!verify_passcode("1234", &cross, &pepper).unwrap());
    }

    #[test]
    fn parse_detects_format_by_prefix() {
        let pepper = test_pepper();
        let current = hash_passcode("abcd", &pepper).unwrap();
        assert!(matches!(
            PasscodeHash::parse(&current).unwrap(),
            PasscodeHash::Current { .. }
        ));

        let legacy = make_legacy("abcd", b"salty");
        assert!(matches!(
            PasscodeHash::parse(&legacy).unwrap(),
            PasscodeHash::Legacy { .. }
        ));
    }

    #[test]
    fn parse_rejects_malformed_digests() {
        assert!(PasscodeHash::parse("not-hex-at-all!").is_err());
        assert!(PasscodeHash::parse("s1$zz$zz").is_err());
        assert!(PasscodeHash::parse("s1$deadbeef").is_err());
        // Valid hex but wrong length
        assert!(PasscodeHash::parse("deadbeef").is_err());
    }

    #[test]
    fn encode_round_trips() {
        let legacy = make_legacy("pw", b"abc");
        assert_eq!(PasscodeHash::parse(&legacy).unwrap().encode(), legacy);
    }

    #[test]
    fn invalid_pepper_is_an_error() {
        assert!(hash_passcode("1234", "***not base64***").is_err());
    }
}
