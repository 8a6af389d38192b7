pub mod classificationmodel;
pub mod gamificationmodel;
pub mod pickupmodel;
