//! Role guard middleware

use axum::{extract::Request, middleware::Next, response::Response};
use shared::error::AppError;
use std::future::Future;
use std::pin::Pin;

use super::{Identity, Role};

/// Route layer admitting only `roles`
///
/// ```ignore
/// Router::new()
///     .route("/orders", get(handler::queue))
///     .route_layer(middleware::from_fn_with_state(
///         state.clone(),
///         require_role(&[Role::Admin, Role::Kitchen]),
///     ));
/// ```
pub fn require_role(
    roles: &'static [Role],
) -> impl Fn(
    Identity,
    Request,
    Next,
) -> Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |identity: Identity, req: Request, next: Next| {
        Box::pin(async move {
            if let Err(e) = identity.require(roles) {
                tracing::warn!(
                    target: "security",
                    user_id = %identity.user_id,
                    role = %identity.role,
                    uri = %req.uri(),
                    "Role rejected"
                );
                return Err(e);
            }
            Ok(next.run(req).await)
        })
    }
}
