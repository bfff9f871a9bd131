pub mod status_sync;
