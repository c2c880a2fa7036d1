//! Authentication: session composition, refresh recovery, auth state.

pub mod bootstrap;
pub mod refresh;
pub mod session;
pub mod state;

pub use crate::api::Credentials;
pub use bootstrap::BootstrapOutcome;
pub use refresh::RefreshCoordinator;
pub use session::{Session, SessionBuilder};
pub use state::{AuthState, AuthStore, AuthWriter, UserProfile, auth_store};
