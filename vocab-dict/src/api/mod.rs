//! HTTP API handlers

pub mod audio;
pub mod cache_admin;
pub mod health;
pub mod lookup;
pub mod translate;

pub use audio::audio_routes;
pub use cache_admin::cache_routes;
pub use health::health_routes;
pub use lookup::lookup_routes;
pub use translate::translate_routes;
