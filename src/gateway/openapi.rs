//! OpenAPI Documentation
//!
//! Auto-generated OpenAPI 3.0 document for the transfer ledger API.
//!
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use axum::Json;
use utoipa::OpenApi;

use crate::account::AccountView;
use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{AccountCreated, CreateAccountRequest, CreateTransferRequest};
use crate::ledger::TransferView;

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Transfer Ledger API",
        version = "1.0.0",
        description = "Accounts with exact decimal balances and atomic transfers between them.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::account::create_account,
        crate::gateway::handlers::account::get_account,
        crate::gateway::handlers::account::list_account_transactions,
        crate::gateway::handlers::transfer::create_transaction,
    ),
    components(
        schemas(
            HealthResponse,
            AccountView,
            AccountCreated,
            CreateAccountRequest,
            CreateTransferRequest,
            TransferView,
        )
    ),
    tags(
        (name = "Account", description = "Account creation and queries"),
        (name = "Transfer", description = "Transfers between accounts"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;

/// GET /api-docs/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Transfer Ledger API");
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn test_openapi_json_serializable() {
        let json = ApiDoc::openapi().to_json();
        assert!(json.is_ok());
        assert!(json.unwrap().contains("Transfer Ledger API"));
    }

    #[test]
    fn test_endpoints_registered() {
        let paths = ApiDoc::openapi().paths;
        assert!(paths.paths.contains_key("/api/v1/health"));
        assert!(paths.paths.contains_key("/api/v1/accounts"));
        assert!(paths.paths.contains_key("/api/v1/accounts/{account_id}"));
        assert!(paths
            .paths
            .contains_key("/api/v1/accounts/{account_id}/transactions"));
        assert!(paths.paths.contains_key("/api/v1/transactions"));
    }
}
