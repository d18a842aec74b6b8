pub mod alert;
pub mod client;
pub mod dashboard;
pub mod export;
pub mod normalize;
pub mod record;
pub mod transform;
