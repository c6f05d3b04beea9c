use common::CommonError;
use thiserror::Error;

pub type PodHelperResult<T> = Result<T, PodHelperError>;

#[derive(Error, Debug)]
pub enum PodHelperError {
    #[error("Kubernetes error: {0}")]
    Kubernetes(String),

    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<kube::Error> for PodHelperError {
    fn from(err: kube::Error) -> Self {
        PodHelperError::Kubernetes(err.to_string())
    }
}
