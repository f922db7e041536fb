pub mod api;
pub mod error;

use crate::cli::Args;
use self::api::{ build_router, AppState };
use std::error::Error;
use std::net::SocketAddr;
use axum_server::tls_rustls::RustlsConfig;
use log::{ info, error };

pub struct Server {
    addr: String,
    state: AppState,
    args: Args,
}

/// Cert and key paths when TLS is enabled, `None` for plain HTTP.
fn tls_paths(args: &Args) -> Result<Option<(&str, &str)>, Box<dyn Error + Send + Sync>> {
    if !args.enable_tls {
        return Ok(None);
    }
    match (&args.tls_cert_path, &args.tls_key_path) {
        (Some(cert_path), Some(key_path)) => Ok(Some((cert_path.as_str(), key_path.as_str()))),
        (Some(_), None) | (None, Some(_)) => {
            error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
            Err("Missing TLS certificate or key path".into())
        }
        (None, None) => {
            error!("--enable-tls was set but no certificate/key paths provided.");
            Err("TLS enabled without cert/key".into())
        }
    }
}

impl Server {
    pub fn new(addr: String, state: AppState, args: Args) -> Self {
        Self { addr, state, args }
    }

    pub async fn run(self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let tls = tls_paths(&self.args)?;
        let app = build_router(self.state, Some(self.args.static_dir.as_str()));
        info!("Serving static files from: {}", self.args.static_dir);

        if let Some((cert_path, key_path)) = tls {
            let addr = self.addr.parse::<SocketAddr>()?;
            info!("TLS enabled. Loading certificate from '{}' and key from '{}'", cert_path, key_path);

            let _ = rustls::crypto::ring::default_provider().install_default();
            let tls_config = RustlsConfig::from_pem_file(cert_path, key_path).await?;

            info!("HTTPS server listening on: https://{}", addr);
            axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service()).await?;
        } else {
            let listener = tokio::net::TcpListener::bind(&self.addr).await.map_err(|e| {
                error!("Failed to bind HTTP server to {}: {}. Try a different port.", self.addr, e);
                e
            })?;
            info!("HTTP server listening on: http://{}", listener.local_addr()?);
            axum::serve(listener, app.into_make_service()).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["gemini-relay"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn plain_http_without_tls_flag() {
        let a = args(&["--tls-cert-path", "cert.pem"]);
        assert_eq!(tls_paths(&a).unwrap(), None);
    }

    #[test]
    fn tls_needs_both_paths() {
        let a = args(&["--enable-tls", "--tls-cert-path", "cert.pem"]);
        assert!(tls_paths(&a).is_err());

        let a = args(&["--enable-tls"]);
        assert!(tls_paths(&a).is_err());

        let a = args(&["--enable-tls", "--tls-cert-path", "cert.pem", "--tls-key-path", "key.pem"]);
        assert_eq!(tls_paths(&a).unwrap(), Some(("cert.pem", "key.pem")));
    }
}
