pub mod cuts;
pub mod run;
pub mod validate;
