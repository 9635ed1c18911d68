pub mod conversation_service;
pub mod delivery_tracker;
pub mod fanout_service;
pub mod message_service;
pub mod presence;
pub mod query_service;

pub use conversation_service::ConversationService;
pub use delivery_tracker::MessageDeliveryTracker;
pub use fanout_service::ConversationFanout;
pub use message_service::MessageService;
pub use presence::{PresenceOracle, RegistryPresence};
pub use query_service::DeliveryQueryService;
