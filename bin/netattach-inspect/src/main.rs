use anyhow::{bail, Context, Result};
use k8s_openapi::api::core::v1::Pod;
use kube::api::ListParams;
use kube::{Api, Client, CustomResourceExt, ResourceExt};
use netattach_api::v1::NetworkAttachmentDefinitionList;
use netattach_api::NetworkAttachmentDefinition;
use netattach_core::{get_network_status, parse_pod_network_annotation, NetAttachError};
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::init as tracing_init;

const USAGE: &str = "usage: netattach-inspect crd | list [namespace] | status [namespace] <pod>";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["crd"] => print_crd(),
        ["list"] => list_definitions(&namespace_from_env()).await,
        ["list", namespace] => list_definitions(namespace).await,
        ["status", pod] => show_pod_networks(&namespace_from_env(), pod).await,
        ["status", namespace, pod] => show_pod_networks(namespace, pod).await,
        _ => bail!(USAGE),
    }
}

/// Namespace to use when none is given on the command line
fn namespace_from_env() -> String {
    match std::env::var("NETATTACH_NAMESPACE") {
        Ok(namespace) if !namespace.is_empty() => namespace,
        _ => "default".to_string(),
    }
}

/// Print the CustomResourceDefinition manifest for NetworkAttachmentDefinition
fn print_crd() -> Result<()> {
    let crd = NetworkAttachmentDefinition::crd();
    print!("{}", serde_yaml::to_string(&crd)?);
    Ok(())
}

async fn list_definitions(namespace: &str) -> Result<()> {
    let client = Client::try_default().await?;
    let definitions: Api<NetworkAttachmentDefinition> = Api::namespaced(client, namespace);

    let list: NetworkAttachmentDefinitionList = definitions
        .list(&ListParams::default())
        .await
        .with_context(|| format!("listing network attachment definitions in {}", namespace))?;
    info!(
        "Found {} network attachment definitions in {}",
        list.items.len(),
        namespace
    );

    for nad in &list.items {
        let state = nad.reconciler_state();
        println!(
            "{}/{} [{}] {}",
            namespace,
            nad.name_any(),
            state.state,
            nad.spec.config
        );
        debug!("{} observation: {}", nad.name_any(), state.observation);
    }
    Ok(())
}

async fn show_pod_networks(namespace: &str, name: &str) -> Result<()> {
    let client = Client::try_default().await?;
    let pods: Api<Pod> = Api::namespaced(client, namespace);
    let pod = pods
        .get(name)
        .await
        .with_context(|| format!("getting pod {}/{}", namespace, name))?;

    match parse_pod_network_annotation(&pod) {
        Ok(selection) => {
            println!("networks:");
            println!("{}", serde_json::to_string_pretty(&selection)?);
        }
        Err(NetAttachError::NoNetwork(reason)) => info!("No network selection: {}", reason),
        Err(e) => warn!("Invalid network selection on {}/{}: {}", namespace, name, e),
    }

    match get_network_status(&pod) {
        Ok(statuses) => {
            println!("network-status:");
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }
        Err(NetAttachError::MissingAnnotation(key)) => info!("Pod has no {} annotation", key),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
