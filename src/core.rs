pub mod activation;
pub mod archive;
pub mod backup;
pub mod discovery;
pub mod flight_sim;
pub mod installer;
pub mod linker;
pub mod mod_record;
pub mod registry;
pub mod update;
