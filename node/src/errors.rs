// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use tally_kernel::KernelError;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("couldn't decode: {0}")]
    Decode(String),
    #[error("invalid chain submitted")]
    InvalidChain,
    #[error("already seen this record")]
    Duplicate,
    #[error("mempool is full")]
    MempoolFull,
    #[error("empty data!")]
    EmptyPayload,
    #[error("peer request failed: {0}")]
    Network(String),
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

impl IntoResponse for NodeError {
    fn into_response(self) -> Response {
        // Bodies keep the historical literal strings; peers parse statuses,
        // humans read the text.
        let (status, body) = match self {
            NodeError::Decode(_) => (StatusCode::BAD_REQUEST, "couldn't decode"),
            NodeError::InvalidChain => (StatusCode::BAD_REQUEST, "invalid chain submitted"),
            NodeError::Duplicate => (StatusCode::NOT_ACCEPTABLE, "already seen this record"),
            NodeError::EmptyPayload => (StatusCode::NOT_ACCEPTABLE, "empty data!"),
            NodeError::MempoolFull | NodeError::Network(_) | NodeError::Kernel(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "error")
            }
        };
        (status, body).into_response()
    }
}
