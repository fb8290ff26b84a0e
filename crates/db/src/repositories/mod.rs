//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod downtime_log_repo;
pub mod machine_repo;
pub mod pm_schedule_repo;
pub mod work_order_repo;

pub use downtime_log_repo::DowntimeLogRepo;
pub use machine_repo::MachineRepo;
pub use pm_schedule_repo::PmScheduleRepo;
pub use work_order_repo::WorkOrderRepo;
