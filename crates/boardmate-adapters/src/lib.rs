//! Service adapters for boardmate — task board and message delivery.
//!
//! Each adapter is a thin, swappable client over one external API:
//!
//! - [`TrelloClient`] implements the [`TaskBoard`] trait against the Trello
//!   REST API (boards, lists, cards).
//! - [`SlackClient`] implements the [`MessageDelivery`] trait against the
//!   Slack Web API (`chat.postMessage`).
//!
//! The workflow core depends only on the traits in [`traits`]; concrete
//! clients are wired in at the application edge.

pub mod error;
pub mod slack;
pub mod traits;
pub mod trello;

pub use error::{AdapterError, Result};
pub use slack::{SlackClient, SlackConfig};
pub use traits::{CardRecord, CardUpdate, MessageDelivery, NameIndex, TaskBoard};
pub use trello::{TrelloClient, TrelloConfig};
