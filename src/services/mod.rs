pub(crate) mod scoring;
pub(crate) mod study_plan;
pub(crate) mod test_resolver;
