//! NØNOS Provisioning Manifest
//!
//! A small signed record handed from the build host to the device at first
//! boot: build identifier, bridge IPv4 address/prefix and the egress-NAT
//! flag, packed as a fixed header followed by TLV records and authenticated
//! by a detached Ed25519 signature over the exact bytes.
//!
//! ```text
//!   fact sheet --source--> RawFacts --build--> manifest.tlv --sign--> manifest.sig
//!   manifest.tlv + manifest.sig --authenticate--> Manifest
//! ```
//!
//! Every operation is a pure function of its inputs; nothing here keeps
//! state between calls.

pub mod builder;
pub mod codec;
pub mod error;
pub mod facts;
pub mod header;
pub mod parser;
pub mod sig;
pub mod source;
pub mod tlv;

pub use builder::{build, encode, MANIFEST_LEN};
pub use error::{ManifestError, Result};
pub use facts::{BridgeConfig, ManifestFacts, RawFacts};
pub use header::{ManifestHeader, SigAlgo, FORMAT_VERSION, HEADER_LEN, MANIFEST_MAGIC};
pub use parser::{decode, parse, Manifest};
pub use sig::{authenticate, sign, verify, ManifestSigner, ManifestVerifier, SIGNATURE_LEN};
pub use source::{parse_fact_sheet, read_fact_sheet};
pub use tlv::{Tag, TlvRecord};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn shareable_across_threads() {
        assert_send_sync::<Manifest>();
        assert_send_sync::<ManifestSigner>();
        assert_send_sync::<ManifestVerifier>();
        assert_send_sync::<ManifestError>();
    }

    #[test]
    fn parallel_builds_agree() {
        let raw = RawFacts {
            build_uuid: Some(vec![0x11; 16]),
            bridge_ipv4: Some(vec![192, 168, 0, 1]),
            prefix: Some(24),
            egress_nat: false,
        };
        let expected = build(&raw).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let raw = raw.clone();
                std::thread::spawn(move || build(&raw).unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    }
}
