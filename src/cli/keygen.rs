//! Key generation for the local backends.
//!
//! Keys go to stdout so they can be piped into a config file or a secret
//! store.

use ::age::x25519;

use crate::cli::KeyKind;
use crate::core::cipher::{age, AesGcm};
use crate::error::Result;

pub fn execute(kind: KeyKind) -> Result<()> {
    match kind {
        KeyKind::Aes => println!("{}", AesGcm::generate_key()),
        KeyKind::Age => {
            let identity = x25519::Identity::generate();
            println!("# public key: {}", identity.to_public());
            println!("{}", age::identity_to_string(&identity));
        }
    }
    Ok(())
}
