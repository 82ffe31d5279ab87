pub mod google_sign_in;
pub mod provider;

pub use google_sign_in::{MockAuthConfig, MockGoogleSignIn};
pub use provider::AuthProvider;

#[cfg(test)]
pub use provider::MockAuthProvider;
