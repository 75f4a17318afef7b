use derive_more::{Display, Error};
use log::error;
use ntex::{http, web};
use serde_json::json;

#[derive(Debug, Display, Error)]
pub enum UserError {
    UrlNotFound,
    Unauthorized,
    FormInputValueError(#[error(not(source))] String),
}

impl web::error::WebResponseError for UserError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        error!("{:#?}", self);

        let msg_details = match self {
            UserError::UrlNotFound => "resource not found".to_string(),
            UserError::Unauthorized => "admin pin missing or invalid".to_string(),
            UserError::FormInputValueError(msg) => format!("invalid input values: {msg}"),
        };

        web::HttpResponse::build(self.status_code()).json(&json!({ "error": msg_details }))
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            UserError::UrlNotFound => http::StatusCode::NOT_FOUND,
            UserError::Unauthorized => http::StatusCode::UNAUTHORIZED,
            UserError::FormInputValueError(_) => http::StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Display, Error)]
pub enum ServerError {
    InternalServerError(#[error(not(source))] String),
}

impl ServerError {
    fn get_error_message(&self) -> String {
        match self {
            ServerError::InternalServerError(msg) => format!("[InternalServerError] {:#?}", msg),
        }
    }
}

impl web::error::WebResponseError for ServerError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        error!("{}", self.get_error_message());

        web::HttpResponse::build(self.status_code())
            .json(&json!({ "error": "internal server error" }))
    }

    fn status_code(&self) -> http::StatusCode {
        http::StatusCode::INTERNAL_SERVER_ERROR
    }
}
