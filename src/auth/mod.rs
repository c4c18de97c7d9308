mod gate;

pub use gate::{Credential, CredentialGate, Validity};
