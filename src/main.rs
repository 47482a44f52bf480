mod config;
mod content_type;
mod dispatcher;
mod logger;
mod network;
mod registry;
mod server;
mod shutdown;
mod tls;
mod upnp;

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    middleware::DefaultHeaders,
    web, App, Error, HttpServer,
};
use futures_util::future::LocalBoxFuture;
use std::net::IpAddr;
use std::process::exit;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{build_cli, ConfigError, ServeConfig};
use crate::content_type::ContentTypeTable;
use crate::dispatcher::Dispatcher;
use crate::network::NetworkUtils;
use crate::registry::FileRegistry;

const PKG_NAME: &str = env!("CARGO_PKG_NAME");
const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
const SERVER_SIGNATURE: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

// Access log middleware
pub struct AccessLog;

impl<S, B> Transform<S, ServiceRequest> for AccessLog
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AccessLogMiddleware<S>;
    type InitError = ();
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AccessLogMiddleware { service }))
    }
}

pub struct AccessLogMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AccessLogMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();

        let method = req.method().to_string();
        let path = req.path().to_string();
        let peer = req
            .peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            logger::get_logger().http(
                &peer,
                &method,
                &path,
                res.status().as_u16(),
                started.elapsed().as_millis(),
            );
            Ok(res)
        })
    }
}

fn fail(err: ConfigError) -> ! {
    logger::get_logger().error(&err.to_string());
    exit(1)
}

/// Hosts the self-signed certificate is issued for.
fn certificate_hosts(bind: IpAddr, external: Option<IpAddr>) -> Vec<String> {
    let mut hosts = vec!["localhost".to_string()];
    for addr in [Some(bind), external].into_iter().flatten() {
        let host = addr.to_string();
        if !addr.is_unspecified() && !hosts.contains(&host) {
            hosts.push(host);
        }
    }
    hosts
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let mut cli = build_cli();
    let matches = cli.get_matches_mut();

    let config = match ServeConfig::from_matches(&matches) {
        Ok(config) => config,
        Err(e) => fail(e),
    };

    logger::init_logger(config.request_logging, config.timestamps);
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));

    let app_logger = logger::get_logger();
    app_logger.startup_info(PKG_NAME, PKG_VERSION);

    let registry = match FileRegistry::build(&config.files, config.prefix.as_deref()) {
        Ok(registry) => registry,
        Err(ConfigError::NoFiles) => {
            app_logger.error(&ConfigError::NoFiles.to_string());
            eprintln!("{}", cli.render_help());
            exit(1);
        }
        Err(e) => fail(e),
    };

    let port = match NetworkUtils::resolve_port(config.bind, config.port) {
        Ok(port) => port,
        Err(msg) => fail(ConfigError::Network(msg)),
    };

    let mut external = NetworkUtils::external_address(config.bind);
    let port_mapping = match external {
        Some(local) if config.upnp => upnp::redirect_if_needed(local, port),
        _ => None,
    };
    if let Some(mapping) = &port_mapping {
        external = Some(mapping.external_ip());
    }

    let rustls_config = match config
        .tls
        .server_config(&certificate_hosts(config.bind, external))
    {
        Ok(rustls_config) => rustls_config,
        Err(e) => fail(e.into()),
    };

    let bound = match config.bind {
        IpAddr::V6(v6) => format!("[{}]:{}", v6, port),
        IpAddr::V4(v4) => format!("{}:{}", v4, port),
    };
    let reachable_url =
        external.map(|host| NetworkUtils::server_url(config.tls.scheme(), host, port, &registry));
    app_logger.server_info(registry.len(), &bound, reachable_url.as_deref());
    if let Some(url) = reachable_url.as_deref().filter(|_| config.qrcode) {
        app_logger.qr_code(url);
    }

    let index_route = registry.index_route();
    let dispatcher = web::Data::new(Dispatcher::new(
        Arc::new(registry),
        Arc::new(ContentTypeTable::new()),
    ));

    let server = HttpServer::new(move || {
        let index_route = index_route.clone();
        App::new()
            .wrap(AccessLog)
            .wrap(DefaultHeaders::new().add(("Server", SERVER_SIGNATURE)))
            .app_data(dispatcher.clone())
            .configure(move |cfg| server::configure(cfg, &index_route))
    })
    .disable_signals();

    let server = match rustls_config {
        Some(rustls_config) => server.bind_rustls_0_23((config.bind, port), rustls_config)?,
        None => server.bind((config.bind, port))?,
    }
    .run();

    let signals = shutdown::listen_for_termination(server.handle(), app_logger)?;
    let result = server.await;
    signals.close();
    drop(port_mapping);
    result
}
