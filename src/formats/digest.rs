use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use sha2::{Digest, Sha256};

/// A layer identifier.
///
/// Registries name layer blobs either by a `sha256:HEX` content digest
/// or, for old images, by a bare 64-hex image id. The hex portion keys
/// the on-disk cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LayerId {
    hex: String,
    prefixed: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Invalid {
    Algorithm,
    Encoding,
    Length,
}

impl std::error::Error for Invalid {}
impl fmt::Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invalid::Algorithm => f.write_str("invalid digest algorithm"),
            Invalid::Encoding => f.write_str("invalid digest encoding"),
            Invalid::Length => f.write_str("invalid digest length"),
        }
    }
}

fn checked(hex: &str) -> Result<String, Invalid> {
    if hex.len() != 64 {
        return Err(Invalid::Length);
    }

    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Invalid::Encoding);
    }

    Ok(hex.to_ascii_lowercase())
}

impl FromStr for LayerId {
    type Err = Invalid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((algo, hex)) => {
                if !algo.eq_ignore_ascii_case("sha256") {
                    return Err(Invalid::Algorithm);
                }

                Ok(Self {
                    hex: checked(hex)?,
                    prefixed: true,
                })
            }

            None => Ok(Self {
                hex: checked(s)?,
                prefixed: false,
            }),
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefixed {
            write!(f, "sha256:{}", self.hex)
        } else {
            f.write_str(&self.hex)
        }
    }
}

impl<'de> Deserialize<'de> for LayerId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl LayerId {
    /// The hex portion without any algorithm prefix.
    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// Starts an incremental content check for this id.
    pub fn verifier(&self) -> Verifier {
        Verifier {
            hasher: Sha256::new(),
            // Legacy image ids are not content digests, so there is
            // nothing to check the bytes against.
            want: self.prefixed.then(|| self.hex.clone()),
        }
    }
}

/// Hashes bytes as they arrive and confirms they match the layer id.
pub struct Verifier {
    hasher: Sha256,
    want: Option<String>,
}

impl Verifier {
    pub fn update(&mut self, buf: &[u8]) {
        self.hasher.update(buf);
    }

    pub fn matches(self) -> bool {
        match self.want {
            Some(want) => hex::encode(self.hasher.finalize()) == want,
            None => true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const HEX: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn parses_prefixed() {
        let id: LayerId = format!("sha256:{}", HEX).parse().unwrap();
        assert_eq!(id.hex(), HEX);
        assert_eq!(id.to_string(), format!("sha256:{}", HEX));
    }

    #[test]
    fn parses_legacy() {
        let id: LayerId = HEX.parse().unwrap();
        assert_eq!(id.hex(), HEX);
        assert_eq!(id.to_string(), HEX);
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!("md5:abcd".parse::<LayerId>(), Err(Invalid::Algorithm));
        assert_eq!("sha256:abcd".parse::<LayerId>(), Err(Invalid::Length));
        assert_eq!(
            format!("sha256:{}zz", &HEX[2..]).parse::<LayerId>(),
            Err(Invalid::Encoding)
        );
        assert_eq!("not an id".parse::<LayerId>(), Err(Invalid::Length));
    }

    #[test]
    fn verifies_content() {
        // HEX is the sha256 of b"hello"
        let id: LayerId = format!("sha256:{}", HEX).parse().unwrap();

        let mut good = id.verifier();
        good.update(b"hel");
        good.update(b"lo");
        assert!(good.matches());

        let mut bad = id.verifier();
        bad.update(b"goodbye");
        assert!(!bad.matches());
    }

    #[test]
    fn legacy_ids_always_verify() {
        let id: LayerId = HEX.parse().unwrap();
        let mut v = id.verifier();
        v.update(b"anything at all");
        assert!(v.matches());
    }
}
