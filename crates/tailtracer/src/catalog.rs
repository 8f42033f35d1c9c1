//! The simulated entities traces are fabricated from.
//!
//! Devices, backend systems and endpoints are plain tables; growing the
//! scenario means adding rows, not touching the synthesizer.

use rand::Rng;

/// An ATM unit that initiates calls to the backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceProfile {
    pub id: i64,
    pub version: String,
    pub name: String,
    pub state_id: String,
    pub serial_number: String,
    pub isp_network: String,
}

/// A backend process, independent of which endpoint is being called
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendSystem {
    pub version: String,
    pub process_name: String,
    /// Short OS code, see [`crate::lookup::OsType`]
    pub os_type: String,
    pub os_version: String,
    /// Short provider code, see [`crate::lookup::CloudProvider`]
    pub cloud_provider: String,
    pub cloud_region: String,
}

/// A backend system together with the endpoint a device is calling
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendProfile {
    pub system: BackendSystem,
    pub endpoint: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog table `{0}` has no entries")]
    Empty(&'static str),
}

/// Fixed set of entities with uniform selection over each table
#[derive(Clone, Debug)]
pub struct Catalog {
    devices: Vec<DeviceProfile>,
    backends: Vec<BackendSystem>,
    endpoints: Vec<String>,
}

impl Catalog {
    pub fn new(
        devices: Vec<DeviceProfile>,
        backends: Vec<BackendSystem>,
        endpoints: Vec<String>,
    ) -> Result<Self, CatalogError> {
        if devices.is_empty() {
            return Err(CatalogError::Empty("devices"));
        }
        if backends.is_empty() {
            return Err(CatalogError::Empty("backends"));
        }
        if endpoints.is_empty() {
            return Err(CatalogError::Empty("endpoints"));
        }

        Ok(Self {
            devices,
            backends,
            endpoints,
        })
    }

    /// Two ATMs calling the `accounts` service on AWS
    pub fn atm_scenario() -> Self {
        let devices = vec![
            DeviceProfile {
                id: 111,
                version: "v1.0".to_string(),
                name: "ATM-111-IL".to_string(),
                state_id: "IL".to_string(),
                serial_number: "atmxph-2022-111".to_string(),
                isp_network: "comcast-chicago".to_string(),
            },
            DeviceProfile {
                id: 222,
                version: "v1.0".to_string(),
                name: "ATM-222-CA".to_string(),
                state_id: "CA".to_string(),
                serial_number: "atmxph-2022-222".to_string(),
                isp_network: "comcast-sanfrancisco".to_string(),
            },
        ];

        let backends = vec![BackendSystem {
            version: "v2.5".to_string(),
            process_name: "accounts".to_string(),
            os_type: "lnx".to_string(),
            os_version: "4.16.10-300.fc28.x86_64".to_string(),
            cloud_provider: "amzn".to_string(),
            cloud_region: "us-east-2".to_string(),
        }];

        let endpoints = vec![
            "api/v2.5/balance".to_string(),
            "api/v2.5/deposit".to_string(),
            "api/v2.5/withdrawn".to_string(),
        ];

        Self {
            devices,
            backends,
            endpoints,
        }
    }

    pub fn devices(&self) -> &[DeviceProfile] {
        &self.devices
    }

    pub fn backends(&self) -> &[BackendSystem] {
        &self.backends
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn pick_device<R: Rng + ?Sized>(&self, rng: &mut R) -> DeviceProfile {
        self.devices[rng.random_range(0..self.devices.len())].clone()
    }

    /// Picks a backend system and, independently, the endpoint being called
    pub fn pick_backend<R: Rng + ?Sized>(&self, rng: &mut R) -> BackendProfile {
        let system = self.backends[rng.random_range(0..self.backends.len())].clone();
        let endpoint = self.endpoints[rng.random_range(0..self.endpoints.len())].clone();
        BackendProfile { system, endpoint }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::atm_scenario()
    }
}
