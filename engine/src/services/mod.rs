//! Business logic services for the rewards engine

pub mod collection;
pub mod rewards;

pub use collection::{CollectionEvent, CollectionKind, CollectionService, PaygRequest};
pub use rewards::RewardService;
