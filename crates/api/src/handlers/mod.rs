pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod kiosk;
pub mod kiosks;
pub mod members;
pub mod registration;
pub mod stations;
pub mod visitor;
