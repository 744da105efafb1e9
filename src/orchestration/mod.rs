//! Deploying the operator to test clusters
//!
//! Image loading is host specific:
//! - macOS: clusters run in Lima guests, images go through `limactl shell`
//! - Linux: clusters run in minikube, images go through `minikube image load`
//!
//! Rendering, applying and waiting for rollout go through kubectl the same
//! way everywhere, as does configuring the hub after deploy.

mod deployer;
pub mod e2e;
pub mod hub;
pub mod kubectl;
pub mod lima;
mod loader;
pub mod minikube;
pub mod platform;
pub mod podman;
pub mod templates;

pub use deployer::{DeployReport, DeploySettings, Deployer, TargetOutcome};
pub use e2e::dump_e2e_config;
pub use hub::HubConfigurator;
pub use kubectl::Kubectl;
pub use lima::LimaLoader;
pub use loader::ImageLoader;
pub use minikube::MinikubeLoader;
pub use platform::{create_loader, Platform};
