//! mbxd-cli library - Musicboxd terminal shell
//!
//! The shell talks to the services through two seams: [`AuthProvider`] for
//! the session and [`ProfileProvider`] for rendering the logged-in profile.

pub mod auth;
pub mod page;
pub mod profile;
pub mod shell;

pub use auth::{AuthProvider, ServiceAuthProvider};
pub use page::{PageLauncher, PageOpened, ProfilePageLocator};
pub use profile::{ConsoleProfileProvider, ProfileProvider};
pub use shell::{Shell, ShellExit};
