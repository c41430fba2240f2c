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

pub use alerte::{Alerte, AlerteTable};
pub use bassin::{Bassin, BassinTable};
pub use client::{Client, ClientTable};
pub use device::{Device, DeviceTable};
pub use ferme::{Ferme, FermeTable};
pub use lot::{Lot, LotChanges, LotRow, LotTable};
pub use lot_event::{LotEvent, LotEventTable};
pub use mesure::{Mesure, MesureTable};
pub use user::{User, UserTable};
pub use vente::{Vente, VenteRow, VenteTable};

pub trait Table {
    /// The name of the table
    fn name(&self) -> &'static str;

    /// The SQL statement to create the table
    fn create(&self) -> String;

    /// The SQL statement to dispose the table
    fn dispose(&self) -> String;

    /// The dependencies of the table
    fn dependencies(&self) -> Vec<&'static str>;

    /// Rows the table must contain once created
    fn seed(&self) -> Option<String> {
        None
    }
}
