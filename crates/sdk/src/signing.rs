// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! RSA-SHA256 signing and verification
//!
//! Signatures are RSASSA-PKCS1-v1_5 over the SHA-256 digest of the message,
//! carried as standard (padded) base64.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

/// Error types for signing operations
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
	#[error("Signing error: {0}")]
	Signing(String),
}

/// Signature algorithm advertised in the authorization header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
	/// RSA PKCS#1 v1.5 with SHA-256
	#[default]
	Rsa2,
}

impl SignatureAlgorithm {
	/// Wire name of the algorithm
	pub const fn as_str(&self) -> &'static str {
		match self {
			SignatureAlgorithm::Rsa2 => "RSA2",
		}
	}

	/// Parse a wire name. Matching is exact.
	pub fn from_wire(value: &str) -> Option<Self> {
		match value {
			"RSA2" => Some(SignatureAlgorithm::Rsa2),
			_ => None,
		}
	}
}

impl fmt::Display for SignatureAlgorithm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Sign a message and return the base64 signature.
pub fn sign_message(private_key: &RsaPrivateKey, message: &[u8]) -> Result<String, SigningError> {
	let digest = Sha256::digest(message);
	let signature = private_key
		.sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
		.map_err(|e| SigningError::Signing(e.to_string()))?;

	Ok(STANDARD.encode(signature))
}

/// Verify a base64 signature over a message.
///
/// Malformed base64, a wrong key and a tampered message all yield `false`.
pub fn verify_message(public_key: &RsaPublicKey, message: &[u8], signature: &str) -> bool {
	let Ok(signature) = STANDARD.decode(signature) else {
		return false;
	};
	let digest = Sha256::digest(message);

	public_key
		.verify(Pkcs1v15Sign::new::<Sha256>(), &digest, &signature)
		.is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};

	const SIGN_BASE: &str = "GET /v1/cards?page=1&limit=20\napp1\n1700000000000\n\n";
	const SIGN_BASE_SIGNATURE: &str = "EE+5o9JuIj6NRXDfjdVhyGd57bz3xe3IKDgCTsHHtjuov3fKp/Ei/V6BjdvrcCwbblOx/+XttPdYcTuitegCjN5dl9pT6t/UQ/DsyxLbjcgwuDZWGCr/ZrTtITr9JOFoqAe0PoGRL5s/YBzLliFGsyadxP7wNJRQIzO1ttw16NTBERoaXZ47rAfpdHPb7kIoTvULEOYLuIbser2QdbBbIZu03aVKqTixSb2k9q7a4f75XXZ5O36rDv6kSLmywrTJpO59wrzYMomnq9yxhtkhSTeG00UwCvHeH38sGvQ8Ob4uMY7gfYwqnApYG+suahZQRDLQZvfM33yZUb6qbF0Alg==";

	fn private_key() -> RsaPrivateKey {
		RsaPrivateKey::from_pkcs8_pem(include_str!("../tests/fixtures/client_private_key.pem"))
			.unwrap()
	}

	fn public_key() -> RsaPublicKey {
		RsaPublicKey::from_public_key_pem(include_str!("../tests/fixtures/client_public_key.pem"))
			.unwrap()
	}

	fn other_public_key() -> RsaPublicKey {
		RsaPublicKey::from_public_key_pem(include_str!("../tests/fixtures/other_public_key.pem"))
			.unwrap()
	}

	#[test]
	fn test_sign_is_deterministic_and_matches_fixture() {
		let signature = sign_message(&private_key(), SIGN_BASE.as_bytes()).unwrap();
		assert_eq!(signature, SIGN_BASE_SIGNATURE);
	}

	#[test]
	fn test_sign_then_verify() {
		let signature = sign_message(&private_key(), SIGN_BASE.as_bytes()).unwrap();
		assert!(verify_message(&public_key(), SIGN_BASE.as_bytes(), &signature));
	}

	#[test]
	fn test_verify_rejects_changed_timestamp() {
		let tampered = SIGN_BASE.replace("1700000000000", "1700000000001");
		assert!(!verify_message(
			&public_key(),
			tampered.as_bytes(),
			SIGN_BASE_SIGNATURE
		));
	}

	#[test]
	fn test_verify_rejects_any_flipped_message_byte() {
		let public_key = public_key();
		let message = SIGN_BASE.as_bytes();
		for i in 0..message.len() {
			let mut tampered = message.to_vec();
			tampered[i] ^= 0x01;
			assert!(
				!verify_message(&public_key, &tampered, SIGN_BASE_SIGNATURE),
				"byte {} flip verified",
				i
			);
		}
	}

	#[test]
	fn test_verify_rejects_flipped_signature_byte() {
		let public_key = public_key();
		let raw = STANDARD.decode(SIGN_BASE_SIGNATURE).unwrap();
		for i in [0, 1, raw.len() / 2, raw.len() - 1] {
			let mut tampered = raw.clone();
			tampered[i] ^= 0x80;
			assert!(!verify_message(
				&public_key,
				SIGN_BASE.as_bytes(),
				&STANDARD.encode(&tampered)
			));
		}
	}

	#[test]
	fn test_verify_rejects_wrong_key() {
		assert!(!verify_message(
			&other_public_key(),
			SIGN_BASE.as_bytes(),
			SIGN_BASE_SIGNATURE
		));
	}

	#[test]
	fn test_verify_rejects_garbage_signature() {
		let public_key = public_key();
		assert!(!verify_message(&public_key, SIGN_BASE.as_bytes(), ""));
		assert!(!verify_message(&public_key, SIGN_BASE.as_bytes(), "not base64!"));
		assert!(!verify_message(&public_key, SIGN_BASE.as_bytes(), "AAAA"));
	}

	#[test]
	fn test_algorithm_wire_name() {
		assert_eq!(SignatureAlgorithm::Rsa2.as_str(), "RSA2");
		assert_eq!(SignatureAlgorithm::from_wire("RSA2"), Some(SignatureAlgorithm::Rsa2));
		assert_eq!(SignatureAlgorithm::from_wire("rsa2"), None);
		assert_eq!(SignatureAlgorithm::from_wire("RSA"), None);
	}
}
