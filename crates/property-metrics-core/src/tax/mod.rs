pub mod fhl;
pub mod stamp_duty;
