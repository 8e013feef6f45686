pub const SUCCESS: i32 = 0;
pub const INPUT_ERROR: i32 = 2;
pub const EXECUTION_ERROR: i32 = 3;
pub const PARTIAL_FAILURE: i32 = 4;
