//! Domain payloads served by the gateway.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VmStatus {
    Running,
    Stopped,
    Paused,
    Error,
}

/// Full virtual machine (`qemu`) or container (`lxc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VmKind {
    Qemu,
    Lxc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmConfig {
    pub cores: u32,
    /// MiB
    pub memory: u64,
    /// GiB
    pub disk: u64,
    pub os: String,
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_keys: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_init_user: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachine {
    pub id: String,
    /// Hypervisor-side numeric id.
    pub vm_id: u64,
    pub name: String,
    pub tenant_id: String,
    pub node_id: String,
    pub status: VmStatus,
    #[serde(rename = "type")]
    pub kind: VmKind,
    pub config: VmConfig,
    pub ip_addresses: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVmConfig {
    pub cores: u32,
    pub memory: u64,
    pub disk: u64,
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_keys: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_init_user: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVmRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VmKind,
    pub node_id: String,
    pub config: CreateVmConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPricing {
    pub cpu_per_core: f64,
    pub memory_per_gib: f64,
    pub storage_per_gib: f64,
    pub network_per_gib: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    #[serde(rename = "maxVMs")]
    pub max_vms: u32,
    pub max_cores: u32,
    pub max_memory_gib: u64,
    pub max_storage_gib: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingPlan {
    pub id: String,
    pub name: String,
    pub description: String,
    pub pricing: PlanPricing,
    pub limits: PlanLimits,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Issued,
    Paid,
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub tenant_id: String,
    pub period: String,
    pub line_items: Vec<InvoiceLineItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub currency: String,
    pub status: InvoiceStatus,
    pub issued_at: String,
    pub due_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub tenant_id: String,
    pub plan_id: String,
    /// Subject identifier at the identity provider.
    pub oidc_sub: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub used: f64,
    pub total: f64,
}

impl Usage {
    /// Used fraction in `[0, 1]`; zero when `total` is zero.
    pub fn ratio(&self) -> f64 {
        if self.total <= 0.0 {
            0.0
        } else {
            (self.used / self.total).clamp(0.0, 1.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Throughput {
    #[serde(rename = "in")]
    pub inbound: f64,
    #[serde(rename = "out")]
    pub outbound: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadWrite {
    pub read: f64,
    pub write: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetrics {
    pub node_id: String,
    pub cpu: f64,
    pub memory: Usage,
    pub disk: Usage,
    pub network: Throughput,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmMetrics {
    pub vm_id: String,
    pub cpu: f64,
    pub memory: Usage,
    pub disk: ReadWrite,
    pub network: Throughput,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_virtual_machine_wire_shape() {
        let vm: VirtualMachine = serde_json::from_value(json!({
            "id": "vm-1",
            "vmId": 101,
            "name": "web",
            "tenantId": "t1",
            "nodeId": "pve-1",
            "status": "paused",
            "type": "lxc",
            "config": {"cores": 2, "memory": 2048, "disk": 20, "os": "debian", "template": "debian-12",
                       "sshKeys": ["ssh-ed25519 AAAA"]},
            "ipAddresses": [],
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-02T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(vm.status, VmStatus::Paused);
        assert_eq!(vm.kind, VmKind::Lxc);
        assert_eq!(vm.config.ssh_keys.as_deref(), Some(&["ssh-ed25519 AAAA".to_string()][..]));
        assert!(vm.config.cloud_init_user.is_none());
    }

    #[test]
    fn test_create_vm_request_serializes_type_field() {
        let req = CreateVmRequest {
            name: "db".into(),
            kind: VmKind::Qemu,
            node_id: "pve-2".into(),
            config: CreateVmConfig {
                cores: 4,
                memory: 8192,
                disk: 100,
                template: "ubuntu-24.04".into(),
                ssh_keys: None,
                cloud_init_user: Some("admin".into()),
            },
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["type"], "qemu");
        assert_eq!(v["nodeId"], "pve-2");
        assert_eq!(v["config"]["cloudInitUser"], "admin");
        assert!(v["config"].get("sshKeys").is_none());
    }

    #[test]
    fn test_plan_limits_keep_max_vms_spelling() {
        let limits = PlanLimits {
            max_vms: 5,
            max_cores: 16,
            max_memory_gib: 64,
            max_storage_gib: 500,
        };
        let v = serde_json::to_value(limits).unwrap();
        assert_eq!(v["maxVMs"], 5);
        assert_eq!(v["maxMemoryGib"], 64);
    }

    #[test]
    fn test_metrics_network_fields() {
        let m: NodeMetrics = serde_json::from_value(json!({
            "nodeId": "pve-1",
            "cpu": 0.5,
            "memory": {"used": 4.0, "total": 16.0},
            "disk": {"used": 0.0, "total": 0.0},
            "network": {"in": 10.0, "out": 20.0},
            "timestamp": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(m.network.inbound, 10.0);
        assert_eq!(m.memory.ratio(), 0.25);
        assert_eq!(m.disk.ratio(), 0.0);
    }
}
