//! Success envelope and download helpers shared by the REST handlers.
//!
//! Every JSON success body is wrapped as `{ "data": ... }`; errors use the
//! bare [`crate::domain::Error`] payload.

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::cache_control::private_no_store_header;

/// `{ "data": T }` success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    /// Response payload.
    pub data: T,
}

impl<T> Envelope<T> {
    /// Wrap `data` as a JSON responder.
    pub fn json(data: T) -> web::Json<Self> {
        web::Json(Self { data })
    }
}

/// Serve `body` as a downloadable CSV file.
pub fn csv_attachment(filename: &str, body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename.to_owned())],
        })
        .insert_header(private_no_store_header())
        .body(body)
}
