//! Host capability probing.
//!
//! Decides whether a prerequisite is already present on the machine from the
//! hints in its descriptor:
//!
//! 1. Registry keys are tried in order; the first present key is enough
//!    evidence of a prior install. No key at all means "not installed" and
//!    no DLL is probed.
//! 2. When a key matched and the descriptor lists DLLs, every one of them must
//!    load for the descriptor's architecture.
//! 3. When a key matched and no DLLs are listed, the registry evidence alone
//!    is accepted.
//!
//! A check that cannot be carried out is logged and counts as "not found".

use crate::catalog::{Arch, PrerequisiteDescriptor};
use crate::config::Config;
use crate::error::{PrereqError, Result};
use crate::shell::{execute_quiet, Invocation};

/// Primitive checks against the host.
pub trait HostProbe: Send + Sync {
    /// Whether a registry key exists.
    fn registry_key_exists(&self, key: &str) -> Result<bool>;

    /// Whether a DLL can be loaded for the given architecture.
    fn dll_loads(&self, dll: &str, arch: Arch) -> Result<bool>;
}

/// Probes the host with `reg query` and the `dllassert` helpers.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    reg_command: String,
    dll_assert_32: String,
    dll_assert_64: String,
}

impl SystemProbe {
    pub fn from_config(config: &Config) -> Self {
        Self {
            reg_command: config.reg_command.clone(),
            dll_assert_32: config.dll_assert_32.clone(),
            dll_assert_64: config.dll_assert_64.clone(),
        }
    }

    fn dll_assert_tool(&self, arch: Arch) -> &str {
        match arch {
            Arch::X86 => &self.dll_assert_32,
            Arch::X64 => &self.dll_assert_64,
        }
    }

    fn check(&self, invocation: Invocation) -> Result<bool> {
        let check = invocation.display();
        let result = execute_quiet(&invocation).map_err(|e| PrereqError::Probe {
            check,
            message: e.to_string(),
        })?;
        Ok(result.success())
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl HostProbe for SystemProbe {
    fn registry_key_exists(&self, key: &str) -> Result<bool> {
        self.check(Invocation::new(&self.reg_command, ["query", key]))
    }

    fn dll_loads(&self, dll: &str, arch: Arch) -> Result<bool> {
        self.check(Invocation::new(self.dll_assert_tool(arch), [dll]))
    }
}

/// Whether `descriptor` is already satisfied on the host.
pub fn probe(descriptor: &PrerequisiteDescriptor, host: &dyn HostProbe) -> bool {
    let Some(key) = descriptor
        .registry_keys
        .iter()
        .find(|key| registry_present(host, key))
    else {
        tracing::debug!("No registry trace of {}", descriptor.full_name);
        return false;
    };
    tracing::debug!("Found registry key {}", key);

    if descriptor.dlls.is_empty() {
        tracing::debug!(
            "Traces of {} found, no DLLs to test, assuming good",
            descriptor.full_name
        );
        return true;
    }

    let mut all_loaded = true;
    for dll in &descriptor.dlls {
        if !dll_present(host, dll, descriptor.arch) {
            tracing::debug!("Could not assert dll {} ({})", dll, descriptor.arch);
            all_loaded = false;
        }
    }
    all_loaded
}

fn registry_present(host: &dyn HostProbe, key: &str) -> bool {
    match host.registry_key_exists(key) {
        Ok(true) => true,
        Ok(false) => {
            tracing::debug!("Key not present: {}", key);
            false
        }
        Err(e) => {
            tracing::warn!("Registry check for {} failed: {}", key, e);
            false
        }
    }
}

fn dll_present(host: &dyn HostProbe, dll: &str, arch: Arch) -> bool {
    match host.dll_loads(dll, arch) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::warn!("DLL check for {} failed: {}", dll, e);
            false
        }
    }
}
