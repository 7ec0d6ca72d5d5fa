use super::types::{DnskeyRecord, DsRecord, RrsigRecord};
use super::validation::SignedRrset;
use crate::dns::forwarding::record_type_map::RecordTypeMapper;
use hickory_proto::dnssec::rdata::sig::SigInput;
use hickory_proto::dnssec::tbs::TBS;
use hickory_proto::dnssec::Algorithm;
use hickory_proto::rr::{DNSClass, Name, Record, SerialNumber};
use ring::signature;
use sha1::Digest as Sha1Digest;
use sha2::{Sha256, Sha384};
use spark_dns_domain::{canonical_name, DomainError};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Seconds since the epoch in RRSIG time arithmetic.
pub fn unix_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

pub struct SignatureVerifier;

impl SignatureVerifier {
    /// True when at least one RRSIG of the set verifies under one of `keys`.
    pub fn verify_rrset(&self, rrset: &SignedRrset, keys: &[DnskeyRecord], now: u32) -> bool {
        rrset.rrsigs.iter().any(|rrsig| {
            keys.iter()
                .filter(|key| key.can_sign() && key.algorithm == rrsig.algorithm)
                .filter(|key| key.calculate_key_tag() == rrsig.key_tag)
                .any(|key| {
                    match self.verify_rrsig(rrsig, key, &rrset.owner, &rrset.records, now) {
                        Ok(valid) => valid,
                        Err(e) => {
                            debug!(owner = %rrset.owner, rrsig = %rrsig, error = %e, "RRSIG not usable");
                            false
                        }
                    }
                })
        })
    }

    pub fn verify_rrsig(
        &self,
        rrsig: &RrsigRecord,
        dnskey: &DnskeyRecord,
        owner: &str,
        records: &[Record],
        now: u32,
    ) -> Result<bool, DomainError> {
        if !rrsig.is_valid_at(now) {
            return Ok(false);
        }

        if dnskey.calculate_key_tag() != rrsig.key_tag || dnskey.algorithm != rrsig.algorithm {
            return Ok(false);
        }

        let name = Name::from_str(&canonical_name(owner))
            .map_err(|e| DomainError::InvalidDnsResponse(e.to_string()))?;
        let signer_name = Name::from_str(&rrsig.signer_name)
            .map_err(|e| DomainError::InvalidDnsResponse(e.to_string()))?;

        let sig_input = SigInput {
            type_covered: RecordTypeMapper::to_hickory(&rrsig.type_covered),
            algorithm: Algorithm::from_u8(rrsig.algorithm),
            num_labels: rrsig.labels,
            original_ttl: rrsig.original_ttl,
            sig_expiration: SerialNumber::from(rrsig.signature_expiration),
            sig_inception: SerialNumber::from(rrsig.signature_inception),
            key_tag: rrsig.key_tag,
            signer_name,
        };

        let tbs = TBS::from_input(&name, DNSClass::IN, &sig_input, records.iter())
            .map_err(|e| DomainError::InvalidDnsResponse(e.to_string()))?;
        let data = tbs.as_ref();
        let sig = rrsig.signature.as_slice();

        match rrsig.algorithm {
            5 | 7 => self.verify_rsa(
                &signature::RSA_PKCS1_1024_8192_SHA1_FOR_LEGACY_USE_ONLY,
                data,
                sig,
                dnskey,
            ),
            8 => self.verify_rsa(
                &signature::RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY,
                data,
                sig,
                dnskey,
            ),
            10 => self.verify_rsa(
                &signature::RSA_PKCS1_1024_8192_SHA512_FOR_LEGACY_USE_ONLY,
                data,
                sig,
                dnskey,
            ),
            13 => self.verify_ecdsa(&signature::ECDSA_P256_SHA256_FIXED, 64, data, sig, dnskey),
            14 => self.verify_ecdsa(&signature::ECDSA_P384_SHA384_FIXED, 96, data, sig, dnskey),
            15 => self.verify_ed25519(data, sig, dnskey),
            16 => Err(DomainError::InvalidDnsResponse(
                "Ed448 (algorithm 16) is not supported by this build".into(),
            )),
            other => Err(DomainError::InvalidDnsResponse(format!(
                "Unsupported DNSSEC algorithm: {}",
                other
            ))),
        }
    }

    /// Checks that `ds` is the digest of `dnskey` owned by `owner_name`.
    pub fn verify_ds(
        &self,
        ds: &DsRecord,
        dnskey: &DnskeyRecord,
        owner_name: &str,
    ) -> Result<bool, DomainError> {
        if dnskey.calculate_key_tag() != ds.key_tag || dnskey.algorithm != ds.algorithm {
            return Ok(false);
        }

        let dnskey_data = Self::build_dnskey_data(dnskey, owner_name)?;

        let computed_digest = match ds.digest_type {
            1 => sha1::Sha1::digest(&dnskey_data).to_vec(),
            2 => Sha256::digest(&dnskey_data).to_vec(),
            4 => Sha384::digest(&dnskey_data).to_vec(),
            other => {
                return Err(DomainError::InvalidDnsResponse(format!(
                    "Unsupported DS digest type: {}",
                    other
                )))
            }
        };

        Ok(computed_digest == ds.digest)
    }

    fn verify_rsa(
        &self,
        params: &'static signature::RsaParameters,
        data: &[u8],
        sig: &[u8],
        dnskey: &DnskeyRecord,
    ) -> Result<bool, DomainError> {
        let (exponent, modulus) = Self::parse_rsa_key(&dnskey.public_key)?;
        let public_key = signature::RsaPublicKeyComponents {
            n: modulus,
            e: exponent,
        };
        Ok(public_key.verify(params, data, sig).is_ok())
    }

    fn verify_ecdsa(
        &self,
        algorithm: &'static signature::EcdsaVerificationAlgorithm,
        key_len: usize,
        data: &[u8],
        sig: &[u8],
        dnskey: &DnskeyRecord,
    ) -> Result<bool, DomainError> {
        if dnskey.public_key.len() != key_len {
            return Err(DomainError::InvalidDnsResponse(format!(
                "Invalid ECDSA public key length: {}",
                dnskey.public_key.len()
            )));
        }
        if sig.len() != key_len {
            return Err(DomainError::InvalidDnsResponse(format!(
                "Invalid ECDSA signature length: {}",
                sig.len()
            )));
        }

        // DNSKEY carries bare X||Y; ring wants the uncompressed SEC1 point.
        let mut pk = Vec::with_capacity(key_len + 1);
        pk.push(0x04);
        pk.extend_from_slice(&dnskey.public_key);

        let public_key = signature::UnparsedPublicKey::new(algorithm, &pk);
        Ok(public_key.verify(data, sig).is_ok())
    }

    fn verify_ed25519(
        &self,
        data: &[u8],
        sig: &[u8],
        dnskey: &DnskeyRecord,
    ) -> Result<bool, DomainError> {
        if dnskey.public_key.len() != 32 {
            return Err(DomainError::InvalidDnsResponse(
                "Invalid Ed25519 public key length".into(),
            ));
        }
        if sig.len() != 64 {
            return Err(DomainError::InvalidDnsResponse(
                "Invalid Ed25519 signature length".into(),
            ));
        }

        let public_key = signature::UnparsedPublicKey::new(&signature::ED25519, &dnskey.public_key);
        Ok(public_key.verify(data, sig).is_ok())
    }

    /// RFC 3110 §2: exponent length in one byte, or zero followed by two.
    fn parse_rsa_key(key_data: &[u8]) -> Result<(&[u8], &[u8]), DomainError> {
        let (exp_len, exp_start) = match key_data {
            [] => {
                return Err(DomainError::InvalidDnsResponse(
                    "Empty RSA public key".into(),
                ))
            }
            [0, hi, lo, ..] => (u16::from_be_bytes([*hi, *lo]) as usize, 3),
            [0, ..] => {
                return Err(DomainError::InvalidDnsResponse(
                    "RSA key too short for long form".into(),
                ))
            }
            [len, ..] => (*len as usize, 1),
        };

        let exp_end = exp_start + exp_len;
        if exp_end >= key_data.len() {
            return Err(DomainError::InvalidDnsResponse(
                "RSA exponent leaves no room for a modulus".into(),
            ));
        }

        Ok((&key_data[exp_start..exp_end], &key_data[exp_end..]))
    }

    fn build_dnskey_data(dnskey: &DnskeyRecord, owner_name: &str) -> Result<Vec<u8>, DomainError> {
        let mut data = Self::name_to_wire(owner_name)?;
        data.extend_from_slice(&dnskey.flags.to_be_bytes());
        data.push(dnskey.protocol);
        data.push(dnskey.algorithm);
        data.extend_from_slice(&dnskey.public_key);
        Ok(data)
    }

    /// Canonical (lower-case, uncompressed) wire form.
    fn name_to_wire(name: &str) -> Result<Vec<u8>, DomainError> {
        let name = name.trim_end_matches('.');
        if name.is_empty() {
            return Ok(vec![0]);
        }

        let mut wire = Vec::with_capacity(name.len() + 2);
        for label in name.split('.') {
            if label.is_empty() {
                return Err(DomainError::InvalidDnsResponse("Empty DNS label".into()));
            }
            if label.len() > 63 {
                return Err(DomainError::InvalidDnsResponse("DNS label too long".into()));
            }
            wire.push(label.len() as u8);
            wire.extend_from_slice(label.to_ascii_lowercase().as_bytes());
        }
        wire.push(0);
        Ok(wire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rsa_key_short_form() {
        let key = [3, 1, 0, 1, 0xaa, 0xbb];
        let (e, n) = SignatureVerifier::parse_rsa_key(&key).unwrap();
        assert_eq!(e, &[1, 0, 1]);
        assert_eq!(n, &[0xaa, 0xbb]);
    }

    #[test]
    fn test_parse_rsa_key_long_form() {
        let key = [0, 0, 1, 3, 0xcc];
        let (e, n) = SignatureVerifier::parse_rsa_key(&key).unwrap();
        assert_eq!(e, &[3]);
        assert_eq!(n, &[0xcc]);
    }

    #[test]
    fn test_parse_rsa_key_rejects_missing_modulus() {
        assert!(SignatureVerifier::parse_rsa_key(&[]).is_err());
        assert!(SignatureVerifier::parse_rsa_key(&[3, 1, 0, 1]).is_err());
        assert!(SignatureVerifier::parse_rsa_key(&[0, 1]).is_err());
    }

    #[test]
    fn test_name_to_wire_lowercases() {
        assert_eq!(
            SignatureVerifier::name_to_wire("Example.COM.").unwrap(),
            b"\x07example\x03com\x00".to_vec()
        );
        assert_eq!(SignatureVerifier::name_to_wire(".").unwrap(), vec![0]);
    }

    #[test]
    fn test_verify_ds_rejects_tag_mismatch() {
        let key = DnskeyRecord::new(257, 8, vec![3, 1, 0, 1, 0xaa]);
        let ds = DsRecord::new(key.calculate_key_tag().wrapping_add(1), 8, 2, vec![0; 32]).unwrap();
        assert!(!SignatureVerifier.verify_ds(&ds, &key, "example.").unwrap());
    }

    #[test]
    fn test_verify_ds_matches_computed_digest() {
        let key = DnskeyRecord::new(257, 13, vec![7; 64]);
        let mut data = b"\x07example\x00".to_vec();
        data.extend_from_slice(&257u16.to_be_bytes());
        data.push(3);
        data.push(13);
        data.extend_from_slice(&[7; 64]);
        let digest = Sha256::digest(&data).to_vec();

        let ds = DsRecord::new(key.calculate_key_tag(), 13, 2, digest).unwrap();
        assert!(SignatureVerifier.verify_ds(&ds, &key, "EXAMPLE.").unwrap());
    }
}
