pub mod auth;
pub mod init;
pub mod node;
pub mod policy;
pub mod version;
pub mod whoami;

pub use auth::Auth;
pub use init::Init;
pub use node::Node;
pub use policy::Policy;
pub use version::Version;
pub use whoami::Whoami;
