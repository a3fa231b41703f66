use super::*;
use actix_web::FromRequest;
use actix_web::HttpRequest;
use actix_web::dev::Payload;
use actix_web::web;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_postgres::Client;

/// Extractor for authenticated requests.
/// Verifies the bearer token and checks the session is not revoked.
pub struct Auth(pub AccessToken);

impl Auth {
    pub fn token(&self) -> &AccessToken {
        &self.0
    }
    pub fn handle(&self) -> &UserHandle {
        self.0.handle()
    }
}

impl FromRequest for Auth {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;
    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let sessions = req.app_data::<web::Data<Sessions>>().cloned();
        let db = req.app_data::<web::Data<Arc<Client>>>().cloned();
        let auth_header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_owned());
        Box::pin(async move {
            let header = auth_header.ok_or_else(|| {
                actix_web::error::ErrorUnauthorized("missing authorization header")
            })?;
            let bearer = header.strip_prefix("Bearer ").ok_or_else(|| {
                actix_web::error::ErrorUnauthorized("invalid authorization format")
            })?;
            let sessions = sessions.ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("session service not configured")
            })?;
            // failure detail stays out of responses to untrusted callers
            let token = sessions.key().verify_access(bearer).map_err(|e| match e {
                AuthError::Expired(_) => actix_web::error::ErrorUnauthorized("token expired"),
                _ => actix_web::error::ErrorUnauthorized("invalid token"),
            })?;
            let db = db.ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("session store not configured")
            })?;
            let session = db
                .lookup(token.session())
                .await
                .map_err(|_| actix_web::error::ErrorInternalServerError("session store error"))?
                .ok_or_else(|| actix_web::error::ErrorUnauthorized("session not found"))?;
            if session.revoked() {
                return Err(actix_web::error::ErrorUnauthorized("session revoked"));
            }
            Ok(Auth(token))
        })
    }
}

/// Optional authentication extractor - does not fail if unauthenticated.
pub struct MaybeAuth(pub Option<AccessToken>);

impl MaybeAuth {
    pub fn token(&self) -> Option<&AccessToken> {
        self.0.as_ref()
    }
    pub fn handle(&self) -> Option<&UserHandle> {
        self.0.as_ref().map(|t| t.handle())
    }
}

impl FromRequest for MaybeAuth {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;
    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let auth_future = Auth::from_request(req, payload);
        Box::pin(async move {
            match auth_future.await {
                Ok(Auth(token)) => Ok(MaybeAuth(Some(token))),
                Err(_) => Ok(MaybeAuth(None)),
            }
        })
    }
}
