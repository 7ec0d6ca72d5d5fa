use ring::rand::{SecureRandom, SystemRandom};
use spark_dns_domain::DomainError;

const ALPHANUM: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

pub const PROBE_LABEL_LEN: usize = 5;

/// Longest name that still fits once `<label>.` is prepended.
pub const MAX_RANDOMIZABLE_LEN: usize = 249;

/// `n` alphanumeric characters drawn from the system CSPRNG.
pub fn random_label(n: usize) -> Result<String, DomainError> {
    let mut bytes = vec![0u8; n];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| DomainError::Io("system random source unavailable".to_string()))?;

    Ok(bytes
        .iter()
        .map(|b| ALPHANUM[(*b as usize) % ALPHANUM.len()] as char)
        .collect())
}

/// Prepends a fresh random label to `name`.
pub fn probe_name(name: &str) -> Result<String, DomainError> {
    Ok(format!("{}.{}", random_label(PROBE_LABEL_LEN)?, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_label_is_alphanumeric() {
        let label = random_label(64).unwrap();
        assert_eq!(label.len(), 64);
        assert!(label.bytes().all(|b| b.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_probe_name_shape() {
        let name = probe_name("example.com").unwrap();
        let (label, rest) = name.split_once('.').unwrap();
        assert_eq!(label.len(), PROBE_LABEL_LEN);
        assert_eq!(rest, "example.com");
    }

    #[test]
    fn test_probe_names_differ() {
        let a = probe_name("example.com").unwrap();
        let b = probe_name("example.com").unwrap();
        let c = probe_name("example.com").unwrap();
        assert!(a != b || b != c);
    }
}
