mod alerte;
mod bassin;
mod client;
mod device;
mod ferme;
mod lot;
mod lot_event;
mod mesure;
mod user;
mod vente;

pub use alerte::AlerteRepository;
pub use bassin::BassinRepository;
pub use client::ClientRepository;
pub use device::DeviceRepository;
pub use ferme::FermeRepository;
pub use lot::LotRepository;
pub use lot_event::LotEventRepository;
pub use mesure::MesureRepository;
pub use user::UserRepository;
pub use vente::VenteRepository;
