//! CRD installation on startup using server-side apply

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{Api, Patch, PatchParams};
use kube::{Client, CustomResourceExt};

use reqres_common::crd::User;
use reqres_common::FIELD_MANAGER;

/// Name of the User CRD object
pub const USER_CRD_NAME: &str = "users.users.reqres.in";

/// Install or update the User CRD so its schema always matches this binary
pub async fn ensure_crds_installed(client: &Client) -> anyhow::Result<()> {
    let crds: Api<CustomResourceDefinition> = Api::all(client.clone());
    let params = PatchParams::apply(FIELD_MANAGER).force();

    tracing::info!("Installing {} CRD...", USER_CRD_NAME);
    crds.patch(USER_CRD_NAME, &params, &Patch::Apply(&User::crd()))
        .await
        .map_err(|e| anyhow::anyhow!("failed to install {} CRD: {}", USER_CRD_NAME, e))?;
    tracing::info!("User CRD installed/updated");
    Ok(())
}
