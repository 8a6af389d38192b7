pub mod classificationdb;
pub mod db;
pub mod gamificationdb;
pub mod pickupdb;

pub use db::DBClient;
