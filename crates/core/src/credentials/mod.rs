pub mod credentials_model;
pub mod credentials_traits;
pub mod in_memory;
pub mod resolver;

pub use credentials_model::{Credential, NewCredential};
pub use credentials_traits::CredentialStoreTrait;
pub use in_memory::InMemoryCredentialStore;
pub use resolver::{CredentialResolver, CredentialState};
