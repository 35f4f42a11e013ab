//! Database access layer
//!
//! Player preferences and session state stored in the shared `settings`
//! table created by `nwp_common::db::init_database`.

pub mod settings;
