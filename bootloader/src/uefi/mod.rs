pub mod block_io;
pub mod boot_services;
pub mod firmware_disk;
pub mod status;

pub use firmware_disk::FirmwareDisk;
