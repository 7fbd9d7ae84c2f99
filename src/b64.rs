//! The two base64 conventions used by Hawk.
//!
//! MACs and payload hashes travel in headers as standard-alphabet, padded
//! base64.  Bewits travel inside URLs as url-safe base64 without padding.

/// Encode with the standard alphabet, padded.
pub(crate) fn encode(data: &[u8]) -> String {
    base64::encode(data)
}

/// Encode a bewit token: url-safe alphabet, no padding.
pub(crate) fn bewit_encode(data: &[u8]) -> String {
    base64::encode_config(data, base64::URL_SAFE_NO_PAD)
}

/// Decode a bewit token.  Padded input is rejected.
pub(crate) fn bewit_decode(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::decode_config(data, base64::URL_SAFE_NO_PAD)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bewit_round_trip_has_no_padding() {
        let encoded = bewit_encode(b"me\\1353832834\\mac\\");
        assert!(!encoded.contains('='));
        assert_eq!(bewit_decode(&encoded).unwrap(), b"me\\1353832834\\mac\\");
    }

    #[test]
    fn bewit_decode_rejects_padding() {
        assert!(bewit_decode("YWJjZA==").is_err());
    }

    #[test]
    fn bewit_decode_rejects_standard_alphabet() {
        assert!(bewit_decode("a+/b").is_err());
    }
}
