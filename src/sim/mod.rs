pub mod heat_transfer;
pub mod index;
pub mod materials;
pub mod point_cloud;
