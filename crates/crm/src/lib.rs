pub mod client;
pub mod contact;
pub mod static_store;

pub use client::{CrmClient, HubSpotClient};
pub use contact::CrmContact;
pub use static_store::StaticCrm;
