// src/server.rs
// actix-web routes that hand requests to the dispatcher and stream replies back

use actix_web::body::SizedStream;
use actix_web::http::header::CONTENT_LENGTH;
use actix_web::{web, HttpRequest, HttpResponse};
use bytes::Bytes;
use futures_util::stream;
use std::io;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;

use crate::dispatcher::{Dispatcher, Reply, ReplyBody};

/// Register the index route and the catch-all file route.
///
/// The dispatcher must already be available as `web::Data<Dispatcher>`.
pub fn configure(cfg: &mut web::ServiceConfig, index_route: &str) {
    cfg.route(index_route, web::route().to(serve_index))
        .default_service(web::route().to(serve_file));
}

async fn serve_index(req: HttpRequest, dispatcher: web::Data<Dispatcher>) -> HttpResponse {
    into_response(dispatcher.serve_index(req.method()))
}

async fn serve_file(req: HttpRequest, dispatcher: web::Data<Dispatcher>) -> HttpResponse {
    into_response(dispatcher.serve_path(req.method(), req.path()).await)
}

/// Turn a dispatcher reply into an actix response.
///
/// Content-Length is carried by the sized body so actix writes it itself,
/// including for HEAD where no payload follows.
pub fn into_response(reply: Reply) -> HttpResponse {
    let mut builder = HttpResponse::build(reply.status);
    for (name, value) in reply.headers.iter() {
        if name != CONTENT_LENGTH {
            builder.insert_header((name.clone(), value.clone()));
        }
    }

    match reply.body {
        ReplyBody::Empty => builder.finish(),
        ReplyBody::Html(html) => builder.body(html),
        ReplyBody::File { file, len } => {
            // Cap the stream at the advertised length in case the file grew.
            let reader = ReaderStream::new(file.take(len));
            builder.body(SizedStream::new(len, reader))
        }
        ReplyBody::Omitted { len } => {
            builder.body(SizedStream::new(len, stream::empty::<Result<Bytes, io::Error>>()))
        }
    }
}
