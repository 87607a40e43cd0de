//! Stateless bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the account id and role. Nothing is stored
//! server-side; a token stays valid until `exp`.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use qp_core::{AccountId, Error, Result, Role};
use rand::RngCore;
use serde::{Deserialize, Serialize};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims carried inside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: AccountId,
    pub role: Role,
    /// Issued at, unix seconds.
    pub iat: u64,
    /// Expiry, unix seconds.
    pub exp: u64,
}

/// Issues and verifies tokens with a single HMAC secret.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>, ttl_hours: u64) -> Self {
        let secret = secret.as_ref();

        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs: ttl_hours.saturating_mul(3600),
        }
    }

    /// 32 random bytes, hex-encoded.
    pub fn generate_secret() -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Issue a token for `account` valid for the configured TTL.
    pub fn issue(&self, account: AccountId, role: Role) -> Result<String> {
        let now = get_current_timestamp();
        self.sign(&Claims {
            sub: account,
            role,
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        })
    }

    pub fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("failed to sign token: {e}")))
    }

    /// Verify signature, algorithm and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => Error::Unauthenticated("token expired".into()),
                ErrorKind::InvalidSignature => {
                    Error::Unauthenticated("invalid token signature".into())
                }
                _ => Error::Unauthenticated("malformed token".into()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new("test-secret-test-secret-test-secret", 1)
    }

    fn claims(exp: u64) -> Claims {
        Claims {
            sub: AccountId::new(),
            role: Role::Reader,
            iat: 0,
            exp,
        }
    }

    #[test]
    fn issue_then_verify() {
        let s = signer();
        let id = AccountId::new();
        let token = s.issue(id, Role::Author).unwrap();
        let claims = s.verify(&token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Role::Author);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn expired_token_rejected() {
        let s = signer();
        let token = s.sign(&claims(get_current_timestamp() - 1)).unwrap();
        let err = s.verify(&token).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn zero_ttl_token_is_dead_on_arrival() {
        let s = TokenSigner::new("test-secret-test-secret-test-secret", 0);
        let token = s.issue(AccountId::new(), Role::Reader).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert!(matches!(s.verify(&token), Err(Error::Unauthenticated(_))));
    }

    #[test]
    fn swapped_claims_rejected() {
        let s = signer();
        let genuine = s.issue(AccountId::new(), Role::Reader).unwrap();
        let other = TokenSigner::new("attacker-controlled-secret-value", 1);
        let forged = other.sign(&Claims {
            role: Role::Author,
            ..claims(u64::MAX / 2)
        })
        .unwrap();

        // Forged payload, genuine signature.
        let (header, forged_payload) = {
            let mut parts = forged.split('.');
            (parts.next().unwrap(), parts.next().unwrap())
        };
        let genuine_sig = genuine.rsplit('.').next().unwrap();
        let spliced = format!("{header}.{forged_payload}.{genuine_sig}");

        let err = s.verify(&spliced).unwrap_err();
        assert_eq!(err.to_string(), Error::Unauthenticated("invalid token signature".into()).to_string());
    }

    #[test]
    fn other_secret_rejected() {
        let token = signer().issue(AccountId::new(), Role::Author).unwrap();
        let other = TokenSigner::new("a-completely-different-secret-value", 1);
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn garbage_rejected() {
        let s = signer();
        for bad in ["", "abc", "abc.def", "....", "eyJ.zz.yy"] {
            assert!(matches!(s.verify(bad), Err(Error::Unauthenticated(_))), "{bad}");
        }
    }

    #[test]
    fn generated_secret_is_random_hex() {
        let a = TokenSigner::generate_secret();
        let b = TokenSigner::generate_secret();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert!(hex::decode(&a).is_ok());
    }
}
