pub(crate) mod grading;
pub(crate) mod presence;
pub(crate) mod quiz_generation;
