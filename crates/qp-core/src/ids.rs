//! Typed ID wrappers providing compile-time safety for entity identifiers.
//!
//! Each ID type is a newtype over `Uuid`, so an `AccountId` can never be
//! passed where a `PostId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Generate a newtype ID wrapper over `Uuid`.
///
/// Ids render as lowercase hyphenated UUIDs, which is also how they are
/// stored and how they appear in URLs and token claims.
macro_rules! typed_id {
    ($($(#[doc = $doc:expr])* $name:ident),+ $(,)?) => {
        $(
            $(#[doc = $doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(Uuid);

            impl $name {
                /// Create a new random ID.
                #[must_use]
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self {
                    Self(Uuid::new_v4())
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $name {
                type Err = uuid::Error;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    Uuid::parse_str(s).map(Self)
                }
            }

            impl From<Uuid> for $name {
                fn from(uuid: Uuid) -> Self {
                    Self(uuid)
                }
            }
        )+
    };
}

typed_id! {
    /// Unique identifier for a registered account.
    AccountId,
    /// Unique identifier for a blog post.
    PostId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_id_renders_as_stored_text() {
        let id = PostId::new();
        let text = id.to_string();
        assert_eq!(text.len(), 36);
        assert_eq!(text, text.to_lowercase());
        assert_eq!(text.parse::<PostId>().unwrap(), id);
    }

    #[test]
    fn path_spellings_name_the_same_post() {
        let id = PostId::new();
        let upper = id.to_string().to_uppercase();
        let simple = id.to_string().replace('-', "");
        assert_eq!(upper.parse::<PostId>().unwrap(), id);
        assert_eq!(simple.parse::<PostId>().unwrap(), id);
    }

    #[test]
    fn account_id_in_claims_json() {
        #[derive(Deserialize, Serialize)]
        struct Sub {
            sub: AccountId,
        }

        let id = AccountId::new();
        let json = serde_json::to_value(Sub { sub: id }).unwrap();
        assert_eq!(json["sub"], id.to_string());
        let back: Sub = serde_json::from_value(json).unwrap();
        assert_eq!(back.sub, id);

        assert!(serde_json::from_str::<Sub>(r#"{"sub": 42}"#).is_err());
        assert!(serde_json::from_str::<Sub>(r#"{"sub": "admin"}"#).is_err());
    }

    #[test]
    fn rejects_non_uuid_path_segments() {
        for raw in ["", "mine", "1", "../etc/passwd", "00000000-0000-0000-0000-00000000000g"] {
            assert!(raw.parse::<PostId>().is_err(), "{raw}");
        }
    }
}
