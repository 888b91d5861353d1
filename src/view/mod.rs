//! Network-free presentation components. They only ever see data that a
//! container already fetched.

pub mod card;
pub mod confirm;

pub use card::{Badge, BadgeColor, CardView, ElectionCard, StatusCategory};
pub use confirm::{ConfirmAction, DeleteConfirmation};
