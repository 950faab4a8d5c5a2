//! Domain model (request contract, phases, actor model selector).

pub mod actor_model;
pub mod phase;
pub mod request;

pub use self::actor_model::ActorModel;
pub use self::phase::Phase;
pub use self::request::{Request, RequestState};
