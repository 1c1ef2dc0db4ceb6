use rand::{thread_rng, Rng};

const NONCE_BYTES: usize = 32;

/// How the per-request `oauth_nonce` is generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NonceStrategy {
    /// 32 bytes from the thread-local CSPRNG, hex encoded.
    #[default]
    Random,
    /// 32 bytes each drawn from `0..=9`, hex encoded. Only ~106 bits of entropy. Use this only when talking to a
    /// verifier that expects nonces of this exact shape.
    DecimalBytes,
}

/// Generate a fresh nonce. Every call draws from the calling thread's own generator, so this is safe to use
/// concurrently without any shared state.
pub fn generate_nonce(strategy: NonceStrategy) -> String {
    let mut rng = thread_rng();
    let bytes: [u8; NONCE_BYTES] = match strategy {
        NonceStrategy::Random => rng.gen(),
        NonceStrategy::DecimalBytes => std::array::from_fn(|_| rng.gen_range(0..10u8)),
    };
    hex::encode(bytes)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn random_nonce_is_hex() {
        let nonce = generate_nonce(NonceStrategy::Random);
        assert_eq!(nonce.len(), 2 * NONCE_BYTES);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn random_nonces_are_unique() {
        let a = generate_nonce(NonceStrategy::Random);
        let b = generate_nonce(NonceStrategy::Random);
        assert_ne!(a, b);
    }

    #[test]
    fn decimal_nonce_has_legacy_shape() {
        let nonce = generate_nonce(NonceStrategy::DecimalBytes);
        assert_eq!(nonce.len(), 2 * NONCE_BYTES);
        let bytes = nonce.as_bytes();
        for pair in bytes.chunks(2) {
            assert_eq!(pair[0], b'0');
            assert!(pair[1].is_ascii_digit());
        }
    }
}
