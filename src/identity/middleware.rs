//! Caller middleware
//!
//! Extracts the caller principal from requests.

use crate::dao::DaoError;
use crate::error::AppError;
use crate::identity::{Caller, Principal};
use axum::{extract::Request, middleware::Next, response::Response};
use tracing::debug;

/// Header carrying the caller's textual principal
pub const PRINCIPAL_HEADER: &str = "x-principal";

/// Attach a [`Caller`] to every request. A missing header means anonymous.
pub async fn caller_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    let caller = match request.headers().get(PRINCIPAL_HEADER) {
        None => Caller::anonymous(),
        Some(value) => {
            let text = value
                .to_str()
                .map_err(|_| AppError::BadRequest("Principal header is not valid text".to_string()))?;
            let principal = Principal::parse(text)
                .map_err(|e| AppError::BadRequest(format!("Invalid caller principal: {}", e)))?;
            Caller(principal)
        }
    };

    debug!("Request from caller {}", caller.principal());
    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}

/// Settings changes are open to any identified caller unless admins are configured
pub fn require_admin(caller: &Principal, admins: &[Principal]) -> Result<(), DaoError> {
    if admins.is_empty() || admins.contains(caller) {
        return Ok(());
    }
    Err(DaoError::NotGovernanceAdmin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_admin_open_without_admins() {
        let caller = Principal::parse("aaaaa-aa").unwrap();
        assert!(require_admin(&caller, &[]).is_ok());
    }

    #[test]
    fn test_require_admin_restricts_to_list() {
        let admin = Principal::parse("rrkah-fqaaa-aaaaa-aaaaq-cai").unwrap();
        let other = Principal::parse("aaaaa-aa").unwrap();
        let admins = vec![admin.clone()];

        assert!(require_admin(&admin, &admins).is_ok());
        assert_eq!(require_admin(&other, &admins), Err(DaoError::NotGovernanceAdmin));
    }
}
