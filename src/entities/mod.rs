//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod field;
pub mod machine;
pub mod scheduler_run;
pub mod user;
pub mod work_plan;

// Re-export specific types to avoid conflicts
pub use field::{Column as FieldColumn, Entity as Field, Model as FieldModel};
pub use machine::{Column as MachineColumn, Entity as Machine, Model as MachineModel};
pub use scheduler_run::{
    Column as SchedulerRunColumn, Entity as SchedulerRun, Model as SchedulerRunModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
pub use work_plan::{
    Column as WorkPlanColumn, Entity as WorkPlan, Model as WorkPlanModel, WorkType,
};
