pub mod chatdtos;
pub mod classifydtos;
pub mod gamificationdtos;
pub mod pickupdtos;
