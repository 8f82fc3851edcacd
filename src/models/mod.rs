pub mod mount;
pub mod nfs;
