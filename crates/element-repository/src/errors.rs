use thiserror::Error;

use selfheal_core_types::DocumentError;

#[derive(Clone, Debug, Error)]
pub enum RepoErrKind {
    #[error("document error: {0}")]
    Document(#[from] DocumentError),
    #[error("screenshot unavailable: {0}")]
    Screenshot(String),
}

#[derive(Clone, Debug, Error)]
#[error(transparent)]
pub struct RepoError(pub RepoErrKind);

impl From<RepoErrKind> for RepoError {
    fn from(kind: RepoErrKind) -> Self {
        RepoError(kind)
    }
}

impl From<DocumentError> for RepoError {
    fn from(err: DocumentError) -> Self {
        RepoError(RepoErrKind::Document(err))
    }
}
