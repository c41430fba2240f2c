mod alert_service;
mod auth_service;
mod iot_service;
mod live_service;
mod mesure_service;
mod permission_service;
mod statistics_service;
mod stock_service;
mod token_service;

pub use alert_service::*;
pub use auth_service::*;
pub use iot_service::*;
pub use live_service::*;
pub use mesure_service::*;
pub use permission_service::*;
pub use statistics_service::*;
pub use stock_service::*;
pub use token_service::*;
