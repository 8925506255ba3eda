use strum_macros::{Display, EnumString};

/// Algorithms registered with the bundled crypto provider.
#[derive(Debug, Copy, Clone, Display, EnumString, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyAlgorithmType {
    #[strum(serialize = "ES256")]
    Es256,
    #[strum(serialize = "HS256")]
    Hs256,
    #[strum(serialize = "C20P")]
    C20p,
}
