pub mod conversations;
pub mod deliveries;
pub mod messages;

pub use conversations::ConversationStore;
pub use deliveries::{AdvanceOutcome, DeliveryStore};
pub use messages::MessageStore;
