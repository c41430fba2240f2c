mod alerte_handle;
mod auth_handle;
mod bassin_handle;
mod client_handle;
mod docs_handle;
mod ferme_handle;
mod historique_handle;
mod iot_handle;
mod lot_handle;
mod user_handle;
mod vente_handle;

pub use alerte_handle::*;
pub use auth_handle::*;
pub use bassin_handle::*;
pub use client_handle::*;
pub use docs_handle::*;
pub use ferme_handle::*;
pub use historique_handle::*;
pub use iot_handle::*;
pub use lot_handle::*;
pub use user_handle::*;
pub use vente_handle::*;
