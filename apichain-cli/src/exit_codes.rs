/// Process exit codes.
pub const SUCCESS: i32 = 0;
/// The workflow file did not parse or failed structural validation.
pub const VALIDATION_FAILED: i32 = 2;
/// The run started but at least one step failed.
pub const RUN_FAILED: i32 = 3;
/// I/O, store or configuration problems.
pub const RUNTIME_ERROR: i32 = 4;
