//! # rpideploy Template System
//!
//! File: cli/src/core/templating.rs
//!
//! ## Overview
//!
//! This module renders the files derived from a `ServiceLocation`:
//! - the development environment file (`.env`)
//! - the production environment file (`.env.production`)
//! - the GitHub Pages workflow (`.github/workflows/deploy.yml`)
//!
//! and the web server script installed on the device.
//!
//! ## Architecture
//!
//! Templates are embedded at compile time (`cli/templates/*.tera`) and
//! rendered with Tera from a serialized context. Rendering is a pure function
//! of the location and the artifact settings, so rendering twice for the same
//! location yields byte-identical output.
//!
//! `render_artifacts` only renders; `location::record` writes the result
//! together with the location record. The workflow file is replaced
//! wholesale.
//!
//! ## Examples
//!
//! ```rust
//! let location = ServiceLocation::confirmed_now(addr, API_PORT);
//! for artifact in templating::render_artifacts(&location, &cfg.artifacts)? {
//!     println!("{}", artifact.path.display());
//! }
//! ```
//!
use crate::core::config::ArtifactsConfig;
use crate::core::error::{DeployError, Result};
use crate::core::location::ServiceLocation;
use anyhow::anyhow;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tera::Tera;

const ENV_TEMPLATE: &str = include_str!("../../templates/env.tera");
const WORKFLOW_TEMPLATE: &str = include_str!("../../templates/deploy.yml.tera");
const WEB_SERVER_TEMPLATE: &str = include_str!("../../templates/web_server.py.tera");

/// Frontend build environment tag (`VITE_ENVIRONMENT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn header(self) -> &'static str {
        match self {
            Environment::Development => "Dynamic configuration",
            Environment::Production => "Production configuration",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Serialize)]
struct ArtifactContext {
    header: &'static str,
    base_url: String,
    stream_url: String,
    update_interval_ms: u64,
    environment: String,
}

impl ArtifactContext {
    fn new(location: &ServiceLocation, environment: Environment, update_interval_ms: u64) -> Self {
        Self {
            header: environment.header(),
            base_url: location.base_url(),
            stream_url: location.stream_url(),
            update_interval_ms,
            environment: environment.to_string(),
        }
    }
}

/// A rendered file waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub path: PathBuf,
    pub content: String,
}

fn render(name: &str, template: &str, context: &impl Serialize) -> Result<String> {
    let tera_context = tera::Context::from_serialize(context).map_err(|e| {
        anyhow!(DeployError::Template { source: e }).context("Failed to create Tera context")
    })?;
    Tera::one_off(template, &tera_context, false).map_err(|e| {
        anyhow!(DeployError::Template { source: e })
            .context(format!("Tera rendering failed for template '{}'", name))
    })
}

/// Renders one `KEY=VALUE` environment file.
pub fn render_env_file(
    location: &ServiceLocation,
    environment: Environment,
    update_interval_ms: u64,
) -> Result<String> {
    let context = ArtifactContext::new(location, environment, update_interval_ms);
    render("env.tera", ENV_TEMPLATE, &context)
}

/// Renders the GitHub Pages workflow. The build step always targets production.
pub fn render_workflow(location: &ServiceLocation, update_interval_ms: u64) -> Result<String> {
    let context = ArtifactContext::new(location, Environment::Production, update_interval_ms);
    render("deploy.yml.tera", WORKFLOW_TEMPLATE, &context)
}

/// Renders the static file server script installed on the device.
pub fn render_web_server_script(remote_root: &str, port: u16) -> Result<String> {
    #[derive(Serialize)]
    struct ScriptContext<'a> {
        remote_root: &'a str,
        port: u16,
    }
    render(
        "web_server.py.tera",
        WEB_SERVER_TEMPLATE,
        &ScriptContext { remote_root, port },
    )
}

/// Renders every artifact derived from `location`, without writing.
pub fn render_artifacts(
    location: &ServiceLocation,
    artifacts: &ArtifactsConfig,
) -> Result<Vec<RenderedArtifact>> {
    let interval = artifacts.update_interval_ms;
    Ok(vec![
        RenderedArtifact {
            path: PathBuf::from(&artifacts.env_file),
            content: render_env_file(location, Environment::Development, interval)?,
        },
        RenderedArtifact {
            path: PathBuf::from(&artifacts.production_env_file),
            content: render_env_file(location, Environment::Production, interval)?,
        },
        RenderedArtifact {
            path: PathBuf::from(&artifacts.workflow_file),
            content: render_workflow(location, interval)?,
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::net::Ipv4Addr;

    fn location() -> ServiceLocation {
        ServiceLocation::new(
            Ipv4Addr::new(192, 168, 0, 101),
            5000,
            Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        )
    }

    #[test]
    fn test_render_development_env() -> Result<()> {
        let content = render_env_file(&location(), Environment::Development, 2000)?;
        assert_eq!(
            content,
            "# Dynamic configuration - Auto-generated by rpideploy, do not edit\n\
             VITE_API_BASE_URL=http://192.168.0.101:5000\n\
             VITE_STREAM_URL=http://192.168.0.101:5000/video_feed\n\
             VITE_UPDATE_INTERVAL=2000\n\
             VITE_ENVIRONMENT=development\n"
        );
        Ok(())
    }

    #[test]
    fn test_render_production_env_uses_interval() -> Result<()> {
        let content = render_env_file(&location(), Environment::Production, 750)?;
        assert!(content.starts_with("# Production configuration"));
        assert!(content.contains("VITE_UPDATE_INTERVAL=750\n"));
        assert!(content.contains("VITE_ENVIRONMENT=production\n"));
        Ok(())
    }

    #[test]
    fn test_render_workflow_keeps_github_expression() -> Result<()> {
        let content = render_workflow(&location(), 2000)?;
        assert!(content.contains("VITE_API_BASE_URL: http://192.168.0.101:5000\n"));
        assert!(content.contains("VITE_STREAM_URL: http://192.168.0.101:5000/video_feed\n"));
        assert!(content.contains("github_token: ${{ secrets.GITHUB_TOKEN }}\n"));
        assert!(content.contains("publish_dir: ./dist"));
        Ok(())
    }

    #[test]
    fn test_render_web_server_script() -> Result<()> {
        let script = render_web_server_script("~/robot", 8080)?;
        assert!(script.contains("PORT = 8080\n"));
        assert!(script.contains("ROOT = os.path.expanduser(\"~/robot\")"));
        assert!(script.contains("f\"Serving {os.getcwd()}/web/dist on port {PORT}\""));
        Ok(())
    }

    #[test]
    fn test_render_artifacts_targets_configured_paths() -> Result<()> {
        let artifacts = ArtifactsConfig {
            location_file: "rpi_config.json".to_string(),
            env_file: "web/.env".to_string(),
            production_env_file: "web/.env.production".to_string(),
            workflow_file: ".github/workflows/deploy.yml".to_string(),
            update_interval_ms: 2000,
        };
        let rendered = render_artifacts(&location(), &artifacts)?;

        let paths: Vec<PathBuf> = rendered.iter().map(|a| a.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("web/.env"),
                PathBuf::from("web/.env.production"),
                PathBuf::from(".github/workflows/deploy.yml"),
            ]
        );
        assert!(rendered
            .iter()
            .all(|a| a.content.contains("http://192.168.0.101:5000")));
        Ok(())
    }
}
