//! NØNOS Manifest Signature Interface
//!
//! Detached Ed25519 signatures over the exact manifest bytes. No pre-hash,
//! truncation or normalisation happens here; Ed25519 does its own hashing.
//! Key material is checked before any curve operation so malformed keys show
//! up as `InvalidKey`, never as a failed verification.

use ed25519_dalek::{Keypair, PublicKey, SecretKey, Signature, Signer};
use tracing::{debug, warn};

use crate::error::{ManifestError, Result};
use crate::header::SigAlgo;
use crate::parser::{decode, Manifest};

pub const PUBLIC_KEY_LEN: usize = ed25519_dalek::PUBLIC_KEY_LENGTH;
pub const SECRET_KEY_LEN: usize = ed25519_dalek::SECRET_KEY_LENGTH;
pub const SIGNATURE_LEN: usize = ed25519_dalek::SIGNATURE_LENGTH;

fn decode_key_hex<const N: usize>(kind: &str, key_hex: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(key_hex.trim())
        .map_err(|e| ManifestError::InvalidKey(format!("{} key is not hex: {}", kind, e)))?;
    bytes.as_slice().try_into().map_err(|_| {
        ManifestError::InvalidKey(format!("{} key must be {} bytes, got {}", kind, N, bytes.len()))
    })
}

/// Holds the signing keypair derived from a 32-byte Ed25519 seed.
pub struct ManifestSigner {
    keypair: Keypair,
}

impl ManifestSigner {
    pub fn from_bytes(seed: &[u8; SECRET_KEY_LEN]) -> Result<Self> {
        let secret = SecretKey::from_bytes(seed)
            .map_err(|e| ManifestError::InvalidKey(format!("private key rejected: {}", e)))?;
        let public = PublicKey::from(&secret);
        Ok(Self { keypair: Keypair { secret, public } })
    }

    /// Seed as 64 hex characters.
    pub fn from_hex(secret_hex: &str) -> Result<Self> {
        let seed = decode_key_hex::<SECRET_KEY_LEN>("private", secret_hex)?;
        Self::from_bytes(&seed)
    }

    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.keypair.public.to_bytes()
    }

    pub fn verifier(&self) -> ManifestVerifier {
        ManifestVerifier { key: self.keypair.public }
    }

    pub fn sign(&self, manifest: &[u8]) -> [u8; SIGNATURE_LEN] {
        let sig: Signature = self.keypair.sign(manifest);
        debug!(len = manifest.len(), "manifest signed");
        sig.to_bytes()
    }
}

/// Checks detached signatures against one public key.
#[derive(Debug, Clone, Copy)]
pub struct ManifestVerifier {
    key: PublicKey,
}

impl ManifestVerifier {
    pub fn from_bytes(public: &[u8; PUBLIC_KEY_LEN]) -> Result<Self> {
        let key = PublicKey::from_bytes(public)
            .map_err(|e| ManifestError::InvalidKey(format!("public key rejected: {}", e)))?;
        Ok(Self { key })
    }

    /// Public key as 64 hex characters.
    pub fn from_hex(public_hex: &str) -> Result<Self> {
        let public = decode_key_hex::<PUBLIC_KEY_LEN>("public", public_hex)?;
        Self::from_bytes(&public)
    }

    /// True iff `signature` is a valid signature over exactly `manifest`.
    /// A signature of the wrong size is simply invalid.
    pub fn verify(&self, manifest: &[u8], signature: &[u8]) -> bool {
        let sig = match Signature::try_from(signature) {
            Ok(s) => s,
            Err(_) => {
                warn!(len = signature.len(), "signature has wrong size");
                return false;
            }
        };
        let ok = self.key.verify_strict(manifest, &sig).is_ok();
        if !ok {
            warn!(len = manifest.len(), "manifest signature INVALID");
        }
        ok
    }
}

/// Sign `manifest` with a hex-encoded private seed.
pub fn sign(manifest: &[u8], secret_hex: &str) -> Result<Vec<u8>> {
    let signer = ManifestSigner::from_hex(secret_hex)?;
    Ok(signer.sign(manifest).to_vec())
}

/// Verify a detached signature with a hex-encoded public key. Only key
/// problems are errors; every signature mismatch is `Ok(false)`.
pub fn verify(manifest: &[u8], signature: &[u8], public_hex: &str) -> Result<bool> {
    let verifier = ManifestVerifier::from_hex(public_hex)?;
    Ok(verifier.verify(manifest, signature))
}

/// Consumer path: authenticate the bytes first, then decode them. Nothing is
/// parsed out of a manifest whose signature does not hold.
pub fn authenticate(manifest: &[u8], signature: &[u8], verifier: &ManifestVerifier) -> Result<Manifest> {
    if !verifier.verify(manifest, signature) {
        return Err(ManifestError::BadSignature);
    }
    let m = decode(manifest)?;
    match m.header.sig_algo() {
        SigAlgo::Ed25519 => Ok(m),
        SigAlgo::Unknown(id) => Err(ManifestError::UnsupportedSigAlg(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::encode;
    use crate::facts::{BridgeConfig, ManifestFacts};
    use std::net::Ipv4Addr;

    // RFC 8032, section 7.1, TEST 1
    const RFC_SECRET: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const RFC_PUBLIC: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";
    const RFC_SIG_EMPTY: &str = "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065\
                                 224901555fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b";

    fn manifest() -> Vec<u8> {
        encode(&ManifestFacts {
            build_uuid: *b"nonos-build-0042",
            bridge: BridgeConfig::new(Ipv4Addr::new(10, 0, 0, 1), 24),
            egress_nat: true,
        })
        .unwrap()
    }

    #[test]
    fn rfc8032_vector() {
        let signer = ManifestSigner::from_hex(RFC_SECRET).unwrap();
        assert_eq!(hex::encode(signer.public_key()), RFC_PUBLIC);
        assert_eq!(hex::encode(signer.sign(b"")), RFC_SIG_EMPTY);
        let sig = hex::decode(RFC_SIG_EMPTY).unwrap();
        assert!(verify(b"", &sig, RFC_PUBLIC).unwrap());
    }

    #[test]
    fn sign_then_verify() {
        let m = manifest();
        let sig = sign(&m, RFC_SECRET).unwrap();
        assert_eq!(sig.len(), SIGNATURE_LEN);
        assert!(verify(&m, &sig, RFC_PUBLIC).unwrap());
    }

    #[test]
    fn any_flipped_byte_fails() {
        let m = manifest();
        let signer = ManifestSigner::from_hex(RFC_SECRET).unwrap();
        let verifier = signer.verifier();
        let sig = signer.sign(&m);
        for i in 0..m.len() {
            let mut tampered = m.clone();
            tampered[i] ^= 0x01;
            assert!(!verifier.verify(&tampered, &sig), "flip at {} verified", i);
        }
    }

    #[test]
    fn appended_or_truncated_bytes_fail() {
        let m = manifest();
        let signer = ManifestSigner::from_hex(RFC_SECRET).unwrap();
        let sig = signer.sign(&m);
        let mut longer = m.clone();
        longer.push(0);
        assert!(!signer.verifier().verify(&longer, &sig));
        assert!(!signer.verifier().verify(&m[..m.len() - 1], &sig));
    }

    #[test]
    fn wrong_size_signature_is_false() {
        let m = manifest();
        let sig = sign(&m, RFC_SECRET).unwrap();
        assert!(!verify(&m, &sig[..63], RFC_PUBLIC).unwrap());
        assert!(!verify(&m, &[], RFC_PUBLIC).unwrap());
    }

    #[test]
    fn other_key_fails() {
        let m = manifest();
        let sig = sign(&m, RFC_SECRET).unwrap();
        let other = ManifestSigner::from_bytes(&[7u8; 32]).unwrap();
        assert!(!other.verifier().verify(&m, &sig));
    }

    #[test]
    fn malformed_keys_are_invalid_key() {
        assert!(matches!(sign(b"x", "zz"), Err(ManifestError::InvalidKey(_))));
        assert!(matches!(sign(b"x", "abcd"), Err(ManifestError::InvalidKey(_))));
        assert!(matches!(verify(b"x", &[0; 64], "12"), Err(ManifestError::InvalidKey(_))));
        assert!(matches!(
            verify(b"x", &[0; 64], &"0".repeat(66)),
            Err(ManifestError::InvalidKey(_))
        ));
    }

    #[test]
    fn authenticate_checks_signature_before_parsing() {
        let m = manifest();
        let signer = ManifestSigner::from_hex(RFC_SECRET).unwrap();
        let sig = signer.sign(&m);
        let decoded = authenticate(&m, &sig, &signer.verifier()).unwrap();
        assert_eq!(&decoded.facts.build_uuid, b"nonos-build-0042");

        let mut garbage = m.clone();
        garbage[0] = 0;
        assert_eq!(authenticate(&garbage, &sig, &signer.verifier()), Err(ManifestError::BadSignature));
    }

    #[test]
    fn authenticate_rejects_unknown_sig_alg() {
        let mut m = manifest();
        m[6] = 9;
        let signer = ManifestSigner::from_hex(RFC_SECRET).unwrap();
        let sig = signer.sign(&m);
        assert_eq!(
            authenticate(&m, &sig, &signer.verifier()),
            Err(ManifestError::UnsupportedSigAlg(9))
        );
    }
}
