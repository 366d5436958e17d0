// Component Registry - static table of the programs the launcher manages

use std::collections::HashSet;

use super::constants::*;
use crate::domain::{
    ComponentDescriptor, ComponentFamily, ComponentId, PerOs, PostInstall, RpcEndpoint,
    StopProcedure,
};
use crate::error::{LauncherError, Result};

const RELEASES: &str = "https://releases.drivechain.info";
const GRPCURL_RELEASES: &str = "https://github.com/fullstorydev/grpcurl/releases/download/v1.9.1";

/// Registry of component families and descriptors
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Registry {
    families: Vec<ComponentFamily>,
    components: Vec<ComponentDescriptor>,
}

impl Registry {
    /// Build a registry, validating that ids are unique and families exist
    ///
    /// # Errors
    /// - LauncherError::Config on duplicate ids or dangling family keys
    pub fn new(
        families: Vec<ComponentFamily>,
        components: Vec<ComponentDescriptor>,
    ) -> Result<Self> {
        let mut family_keys = HashSet::new();
        for family in &families {
            if !family_keys.insert(family.key.as_str()) {
                return Err(LauncherError::Config(format!(
                    "duplicate family key '{}'",
                    family.key
                )));
            }
        }

        let mut ids = HashSet::new();
        for component in &components {
            if !ids.insert(component.id.as_str()) {
                return Err(LauncherError::Config(format!(
                    "duplicate component id '{}'",
                    component.id
                )));
            }
            if !family_keys.contains(component.family.as_str()) {
                return Err(LauncherError::Config(format!(
                    "component '{}' refers to unknown family '{}'",
                    component.id, component.family
                )));
            }
        }

        Ok(Self {
            families,
            components,
        })
    }

    /// The drivechain component table
    pub fn builtin() -> Self {
        let families = vec![
            ComponentFamily::new("l1", "l1"),
            ComponentFamily::new("thunder", "l2"),
        ];

        let node_rpc = RpcEndpoint {
            url: format!("http://127.0.0.1:{}", NODE_RPC_PORT),
            user: NODE_RPC_USER.to_string(),
            password: NODE_RPC_PASSWORD.to_string(),
        };

        let components = vec![
            ComponentDescriptor {
                id: ComponentId::new("bitcoind"),
                display_name: "Bitcoin Core (patched)".to_string(),
                family: "l1".to_string(),
                download_url: PerOs::new(
                    format!("{RELEASES}/L1-bitcoin-patched-latest-x86_64-w64-msvc.zip"),
                    format!("{RELEASES}/L1-bitcoin-patched-latest-x86_64-apple-darwin.zip"),
                    format!("{RELEASES}/L1-bitcoin-patched-latest-x86_64-unknown-linux-gnu.zip"),
                ),
                archive_filename: PerOs::uniform("bitcoinpatched.zip".to_string()),
                executable: PerOs::from_strs(
                    "L1-bitcoin-patched-latest-x86_64-w64-msvc/bitcoind.exe",
                    "L1-bitcoin-patched-latest-x86_64-apple-darwin/bitcoind",
                    "L1-bitcoin-patched-latest-x86_64-unknown-linux-gnu/bitcoind",
                ),
                args: vec![],
                launchable: true,
                stop: StopProcedure::JsonRpcStop(node_rpc),
                grace_period: NODE_GRACE_PERIOD,
                shutdown_rank: 3,
                post_install: vec![PostInstall::MarkExecutable, PostInstall::WriteNodeConfig],
            },
            ComponentDescriptor {
                id: ComponentId::new(WALLET_TOOL),
                display_name: "grpcurl".to_string(),
                family: "l1".to_string(),
                download_url: PerOs::new(
                    format!("{GRPCURL_RELEASES}/grpcurl_1.9.1_windows_x86_64.zip"),
                    format!("{GRPCURL_RELEASES}/grpcurl_1.9.1_osx_x86_64.tar.gz"),
                    format!("{GRPCURL_RELEASES}/grpcurl_1.9.1_linux_x86_64.tar.gz"),
                ),
                archive_filename: PerOs::from_strs("grpcurl.zip", "grpcurl.tar.gz", "grpcurl.tar.gz"),
                executable: PerOs::from_strs("grpcurl.exe", "grpcurl", "grpcurl"),
                args: vec![],
                launchable: false,
                stop: StopProcedure::Signal,
                grace_period: UI_GRACE_PERIOD,
                shutdown_rank: u8::MAX,
                post_install: vec![PostInstall::MarkExecutable],
            },
            ComponentDescriptor {
                id: ComponentId::new("bitwindow"),
                display_name: "BitWindow".to_string(),
                family: "l1".to_string(),
                download_url: PerOs::new(
                    format!("{RELEASES}/BitWindow-latest-x86_64-pc-windows-msvc.zip"),
                    format!("{RELEASES}/BitWindow-latest-x86_64-apple-darwin.zip"),
                    format!("{RELEASES}/BitWindow-latest-x86_64-unknown-linux-gnu.zip"),
                ),
                archive_filename: PerOs::uniform("bitwindow.zip".to_string()),
                executable: PerOs::from_strs("bitwindow.exe", "bitwindow", "bitwindow"),
                args: vec![],
                launchable: true,
                stop: StopProcedure::Signal,
                grace_period: UI_GRACE_PERIOD,
                shutdown_rank: 1,
                post_install: vec![PostInstall::MarkExecutable],
            },
            ComponentDescriptor {
                id: ComponentId::new("enforcer"),
                display_name: "BIP300/301 Enforcer".to_string(),
                family: "l1".to_string(),
                download_url: PerOs::new(
                    format!("{RELEASES}/bip300301-enforcer-latest-x86_64-pc-windows-gnu.zip"),
                    format!("{RELEASES}/bip300301-enforcer-latest-x86_64-apple-darwin.zip"),
                    format!("{RELEASES}/bip300301-enforcer-latest-x86_64-unknown-linux-gnu.zip"),
                ),
                archive_filename: PerOs::uniform("300301enforcer.zip".to_string()),
                executable: PerOs::from_strs(
                    "bip300301-enforcer-latest-x86_64-pc-windows-gnu.exe",
                    "bip300301-enforcer-latest-x86_64-apple-darwin",
                    "bip300301-enforcer-latest-x86_64-unknown-linux-gnu",
                ),
                args: vec![
                    format!("--node-rpc-addr=127.0.0.1:{}", NODE_RPC_PORT),
                    format!("--node-rpc-user={}", NODE_RPC_USER),
                    format!("--node-rpc-pass={}", NODE_RPC_PASSWORD),
                    format!("--node-zmq-addr-sequence=tcp://127.0.0.1:{}", NODE_ZMQ_PORT),
                    "--enable-wallet".to_string(),
                ],
                launchable: true,
                stop: StopProcedure::Signal,
                grace_period: ENFORCER_GRACE_PERIOD,
                shutdown_rank: 2,
                post_install: vec![PostInstall::MarkExecutable],
            },
            ComponentDescriptor {
                id: ComponentId::new("thunder"),
                display_name: "Thunder".to_string(),
                family: "thunder".to_string(),
                download_url: PerOs::new(
                    format!("{RELEASES}/L2-S9-Thunder-latest-x86_64-pc-windows-gnu.zip"),
                    format!("{RELEASES}/L2-S9-Thunder-latest-x86_64-apple-darwin.zip"),
                    format!("{RELEASES}/L2-S9-Thunder-latest-x86_64-unknown-linux-gnu.zip"),
                ),
                archive_filename: PerOs::uniform("thunder.zip".to_string()),
                executable: PerOs::from_strs(
                    "thunder-latest-x86_64-pc-windows-gnu.exe",
                    "thunder-latest-x86_64-apple-darwin",
                    "thunder-latest-x86_64-unknown-linux-gnu",
                ),
                args: vec![],
                launchable: true,
                stop: StopProcedure::Signal,
                grace_period: SIDECHAIN_GRACE_PERIOD,
                shutdown_rank: 0,
                post_install: vec![PostInstall::MarkExecutable],
            },
        ];

        // The built-in table is valid by construction
        Self {
            families,
            components,
        }
    }

    pub fn families(&self) -> &[ComponentFamily] {
        &self.families
    }

    pub fn components(&self) -> &[ComponentDescriptor] {
        &self.components
    }

    pub fn family(&self, key: &str) -> Result<&ComponentFamily> {
        self.families
            .iter()
            .find(|f| f.key == key)
            .ok_or_else(|| LauncherError::UnknownFamily(key.to_string()))
    }

    pub fn component(&self, id: &str) -> Result<&ComponentDescriptor> {
        self.components
            .iter()
            .find(|c| c.id.as_str() == id)
            .ok_or_else(|| LauncherError::UnknownComponent(id.to_string()))
    }

    /// Members of a family, in registration order
    pub fn family_members(&self, key: &str) -> Result<Vec<&ComponentDescriptor>> {
        let family = self.family(key)?;
        Ok(self
            .components
            .iter()
            .filter(|c| c.family == family.key)
            .collect())
    }

    /// Launchable components ordered for a full shutdown: dependents first,
    /// foundational components last
    pub fn shutdown_order(&self) -> Vec<&ComponentDescriptor> {
        let mut launchable: Vec<&ComponentDescriptor> =
            self.components.iter().filter(|c| c.launchable).collect();
        launchable.sort_by_key(|c| c.shutdown_rank);
        launchable
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HostOs;

    #[test]
    fn test_builtin_is_valid() {
        let builtin = Registry::builtin();
        let rebuilt = Registry::new(
            builtin.families().to_vec(),
            builtin.components().to_vec(),
        );
        assert!(rebuilt.is_ok());

        for os in [HostOs::Windows, HostOs::MacOs, HostOs::Linux] {
            for component in builtin.components() {
                assert!(
                    component.resolve(os).is_ok(),
                    "{} does not resolve on {:?}",
                    component.id,
                    os
                );
            }
        }
    }

    #[test]
    fn test_shutdown_order_dependents_first() {
        let registry = Registry::builtin();
        let order: Vec<&str> = registry
            .shutdown_order()
            .iter()
            .map(|c| c.id.as_str())
            .collect();

        assert_eq!(order, vec!["thunder", "bitwindow", "enforcer", "bitcoind"]);
    }

    #[test]
    fn test_family_members() {
        let registry = Registry::builtin();
        let l1: Vec<&str> = registry
            .family_members("l1")
            .unwrap()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(l1, vec!["bitcoind", "grpcurl", "bitwindow", "enforcer"]);

        assert!(matches!(
            registry.family_members("l3"),
            Err(LauncherError::UnknownFamily(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let builtin = Registry::builtin();
        let mut components = builtin.components().to_vec();
        components.push(components[0].clone());

        let result = Registry::new(builtin.families().to_vec(), components);
        assert!(matches!(result, Err(LauncherError::Config(_))));
    }

    #[test]
    fn test_grpcurl_archive_differs_on_windows() {
        let registry = Registry::builtin();
        let grpcurl = registry.component("grpcurl").unwrap();
        assert_eq!(
            grpcurl.resolve(HostOs::Windows).unwrap().archive_filename,
            "grpcurl.zip"
        );
        assert_eq!(
            grpcurl.resolve(HostOs::Linux).unwrap().archive_filename,
            "grpcurl.tar.gz"
        );
    }
}
