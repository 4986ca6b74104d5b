pub mod evaluate;
pub mod exit_code;
