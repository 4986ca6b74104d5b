use attrclass_classifiers::{ClassifierError, ErrorKind};

/// Process exit status for a failed run. The first [`ClassifierError`] in the
/// chain decides; anything else (config loading, argument checks) is 1.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    let kind = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<ClassifierError>())
        .map(ClassifierError::kind);
    match kind {
        Some(ErrorKind::Schema) => 2,
        Some(ErrorKind::InvalidAttribute) => 3,
        Some(ErrorKind::AttributeNotSet) => 4,
        Some(ErrorKind::Training) => 5,
        Some(ErrorKind::Inference) => 6,
        Some(ErrorKind::DatasetParse) => 7,
        Some(ErrorKind::UnknownLabel) => 8,
        Some(ErrorKind::Io) => 9,
        None => 1,
    }
}
