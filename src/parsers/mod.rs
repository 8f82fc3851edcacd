pub mod mountstats;
mod nfs;
