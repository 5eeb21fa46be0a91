pub mod api;
pub mod fetcher;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod pacer;
pub mod platform;
pub mod sign;
pub mod sink;
pub mod transport;
pub mod window;
