pub mod fetch;
pub mod health;
pub mod serve;
pub mod state;
pub mod status;
pub mod upload;
pub mod version;

pub use fetch::Fetch;
pub use health::Health;
pub use serve::Serve;
pub use state::State;
pub use status::Status;
pub use upload::Upload;
pub use version::Version;
