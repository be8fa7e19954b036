mod activity;
mod toggle;
mod user;

pub use activity::{ActivityKind, ActivityRecord, NewActivity};
pub use toggle::{NewToggle, Table, Target, TargetType, ToggleRecord};
pub use user::User;
