use ntex::{http::Payload, web};
use subtle::ConstantTimeEq;

use crate::{
    consts,
    front::{AppState, errors},
};

/// Extractor guarding Admin console endpoints.
///
/// The request must carry the configured pin in the `X-Admin-Pin` header.
pub struct AdminAccess;

fn is_admin_pin_valid(req: &web::HttpRequest) -> bool {
    let Some(app_state) = req.app_state::<AppState>() else {
        return false;
    };

    if app_state.admin_pin.is_empty() {
        return false;
    }

    let provided = req
        .headers()
        .get(consts::ADMIN_PIN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    provided
        .as_bytes()
        .ct_eq(app_state.admin_pin.as_bytes())
        .into()
}

impl<Err> web::FromRequest<Err> for AdminAccess {
    type Error = web::Error;

    fn from_request(
        req: &web::HttpRequest,
        _: &mut Payload,
    ) -> impl std::future::Future<Output = Result<Self, Self::Error>> {
        if !is_admin_pin_valid(req) {
            log::warn!("admin request rejected: {}", req.path());
            return std::future::ready(Err(errors::UserError::Unauthorized.into()));
        }

        std::future::ready(Ok(Self))
    }
}
