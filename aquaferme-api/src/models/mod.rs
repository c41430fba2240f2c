mod alerte;
mod auth;
mod bassin;
mod client;
mod ferme;
mod historique;
mod iot;
mod lot;
mod mesure;
mod user;
mod vente;

pub use alerte::*;
pub use auth::*;
pub use bassin::*;
pub use client::*;
pub use ferme::*;
pub use historique::*;
pub use iot::*;
pub use lot::*;
pub use mesure::*;
pub use user::*;
pub use vente::*;

pub type Id = i32;
