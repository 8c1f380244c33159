//! Result delivery to the escalation conversation.
//!
//! - [`conversation`]: the [`Conversation`] trait and message shape.
//! - [`slack`]: [`SlackConversation`], the `chat.postMessage` implementation.
//! - [`message`]: answer message composition and target selection.
//! - [`publisher`]: [`ResultPublisher`], outcome to message (or report).

pub mod conversation;
pub mod message;
pub mod publisher;
pub mod slack;

pub use conversation::{Conversation, ConversationError, DeliveryAck, OutboundMessage};
pub use message::{DeliveryTarget, ThreadRef};
pub use publisher::{PublishReport, ResultPublisher};
pub use slack::SlackConversation;
