// Launcher context: registry + layout + host, shared by every service

use std::path::PathBuf;

use super::layout::DataLayout;
use super::registry::Registry;
use crate::domain::{ComponentDescriptor, ComponentFamily, HostOs, ResolvedComponent};
use crate::error::Result;

/// Single place where (component, host OS) is resolved into concrete paths
#[derive(Debug, Clone)]
pub struct LauncherContext {
    pub registry: Registry,
    pub layout: DataLayout,
    pub os: HostOs,
}

impl LauncherContext {
    pub fn new(registry: Registry, layout: DataLayout, os: HostOs) -> Self {
        Self {
            registry,
            layout,
            os,
        }
    }

    pub fn resolve(&self, component: &ComponentDescriptor) -> Result<ResolvedComponent> {
        component.resolve(self.os)
    }

    pub fn family_of(&self, component: &ComponentDescriptor) -> Result<&ComponentFamily> {
        self.registry.family(&component.family)
    }

    pub fn family_dir(&self, key: &str) -> Result<PathBuf> {
        Ok(self.layout.family_dir(self.registry.family(key)?))
    }

    /// Absolute path of the component's installed executable
    pub fn executable_path(&self, component: &ComponentDescriptor) -> Result<PathBuf> {
        let family = self.family_of(component)?;
        let resolved = self.resolve(component)?;
        Ok(self.layout.family_dir(family).join(resolved.executable))
    }

    /// Absolute path the component's archive is downloaded to
    pub fn archive_path(&self, component: &ComponentDescriptor) -> Result<PathBuf> {
        let family = self.family_of(component)?;
        let resolved = self.resolve(component)?;
        Ok(self.layout.family_dir(family).join(resolved.archive_filename))
    }
}
