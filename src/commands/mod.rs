pub mod config;
mod create;
mod edit;
mod init;
mod install;
mod list;
mod paths;
mod publish;
mod session;
mod uninstall;

pub use create::create;
pub use edit::edit;
pub use init::init;
pub use install::{install, run};
pub use list::list;
pub use publish::{publish, set_tier};
pub use session::{login, logout, whoami};
pub use uninstall::uninstall;
