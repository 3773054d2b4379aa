//! Gateway types module
//!
//! ## Input Types
//! - [`CreateAccountRequest`], [`CreateTransferRequest`]: JSON bodies
//! - [`HistoryQuery`]: transfer history query string
//!
//! ## Output Types
//! - [`ApiResponse<T>`]: Unified API response wrapper
//! - [`ApiError`]: error responses in the same envelope

pub mod request;
pub mod response;

pub use request::{AccountCreated, CreateAccountRequest, CreateTransferRequest, HistoryQuery};
pub use response::{ApiError, ApiResponse, ApiResult, created, error_codes, ok};
