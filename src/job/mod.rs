pub mod sync_job;
