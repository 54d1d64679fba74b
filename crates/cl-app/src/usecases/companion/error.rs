use cl_core::companion::ArtifactError;

#[derive(Debug, thiserror::Error)]
pub enum CompanionError {
    #[error("companion rejected `{command}` (status {status:?}): {stderr}")]
    Rejected {
        command: &'static str,
        status: Option<i32>,
        stderr: String,
    },

    #[error("malformed image artifact: {0}")]
    Artifact(#[from] ArtifactError),
}
