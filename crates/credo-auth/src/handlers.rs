use super::*;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use std::sync::Arc;
use tokio_postgres::Client;

/// Exchanges a refresh token for a fresh pair and rotates the stored hash.
/// A rotated-out refresh token no longer matches the stored digest and is
/// rejected.
pub async fn renew(
    db: web::Data<Arc<Client>>,
    sessions: web::Data<Sessions>,
    req: web::Json<RenewRequest>,
) -> impl Responder {
    let issued = match sessions.renew(&req.refresh) {
        Ok(issued) => issued,
        Err(AuthError::Expired(_)) => {
            return HttpResponse::Unauthorized().body("refresh token expired");
        }
        Err(_) => return HttpResponse::Unauthorized().body("invalid refresh token"),
    };
    let stored = match db.lookup(issued.access.session()).await {
        Ok(Some(session)) => session,
        Ok(None) => return HttpResponse::Unauthorized().body("session not found"),
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    };
    if stored.revoked() {
        return HttpResponse::Unauthorized().body("session revoked");
    }
    if stored.hash() != ServerKey::hash(&req.refresh).as_slice() {
        return HttpResponse::Unauthorized().body("refresh token superseded");
    }
    let rotated = stored.rotated(
        ServerKey::hash(&issued.refresh_jwt),
        issued.refresh.expires_at(),
    );
    if let Err(e) = db.rotate(&rotated).await {
        return HttpResponse::InternalServerError().body(e.to_string());
    }
    HttpResponse::Ok().json(TokenResponse {
        access: issued.access_jwt.clone(),
        refresh: issued.refresh_jwt.clone(),
        user: UserInfo {
            handle: issued.access.handle().to_string(),
            session: issued.access.session().to_string(),
        },
    })
}

/// Revokes the authenticated session.
pub async fn logout(db: web::Data<Arc<Client>>, auth: Auth) -> impl Responder {
    match db.revoke(auth.token().session()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({"status": "logged_out"})),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Echoes the authenticated identity.
pub async fn me(auth: Auth) -> impl Responder {
    HttpResponse::Ok().json(UserInfo {
        handle: auth.handle().to_string(),
        session: auth.token().session().to_string(),
    })
}

/// Publishes the verification key set.
pub async fn jwks(sessions: web::Data<Sessions>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "keys": [sessions.key().params().public_jwk.clone()]
    }))
}
