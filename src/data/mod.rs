pub mod model;

pub use model::TriggerPayload;
