use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::context::ActorContext;

/// Header carrying the authenticated user's handle.
pub const ACTOR_HEADER: &str = "x-market-user";

pub async fn actor_middleware(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let actor = extract_actor(req.headers())?.to_string();

    req.extensions_mut().insert(ActorContext::new(actor));

    Ok(next.run(req).await)
}

fn extract_actor(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers.get(ACTOR_HEADER).ok_or(StatusCode::UNAUTHORIZED)?;

    let actor = header
        .to_str()
        .map_err(|_| StatusCode::UNAUTHORIZED)?
        .trim();

    if actor.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(actor)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn header_value_is_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(ACTOR_HEADER, HeaderValue::from_static("  alice "));
        assert_eq!(extract_actor(&headers), Ok("alice"));
    }

    #[test]
    fn missing_or_blank_header_is_unauthorized() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_actor(&headers), Err(StatusCode::UNAUTHORIZED));

        headers.insert(ACTOR_HEADER, HeaderValue::from_static("   "));
        assert_eq!(extract_actor(&headers), Err(StatusCode::UNAUTHORIZED));
    }
}
