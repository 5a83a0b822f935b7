pub mod extractors;
pub mod state;

pub use extractors::AuthUser;
pub use state::AppState;
