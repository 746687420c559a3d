pub(crate) mod answers;
pub(crate) mod attempts;
pub(crate) mod passages;
pub(crate) mod questions;
pub(crate) mod study_plans;
