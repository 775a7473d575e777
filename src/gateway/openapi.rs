//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:3000/docs`
//! - OpenAPI JSON: `http://localhost:3000/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::account::{AccountCreation, AccountView, LoginRequest};
use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::ErrorBody;
use crate::transfer::{TransferCreation, TransferView};
use crate::user_auth::TokenResponse;

/// Bearer token issued by `POST /login`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Authorization: Bearer {access_token}"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "STN Accounts API",
        version = "1.0.0",
        description = "Accounts and transfers between them. Balances are kept in cents and every transfer is applied atomically."
    ),
    servers(
        (url = "http://localhost:3000", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::account::get_accounts,
        crate::gateway::handlers::account::create_account,
        crate::gateway::handlers::account::get_balance,
        crate::gateway::handlers::login::login,
        crate::gateway::handlers::transfer::get_transfers,
        crate::gateway::handlers::transfer::create_transfer,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorBody,
            AccountCreation,
            AccountView,
            LoginRequest,
            TokenResponse,
            TransferCreation,
            TransferView,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Accounts", description = "Account registration and balance queries"),
        (name = "Auth", description = "Token issuance"),
        (name = "Transfers", description = "Transfers from the authenticated account (auth required)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
