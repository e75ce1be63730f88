use serde::{Deserialize, Serialize};

use crate::event::{Dynamb, Raddec, Spatem};

/// Filter gate for location events, evaluated before any transform
/// work. Must be pure from the pipeline's perspective.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait RaddecFilter: Send + Sync {
    fn is_passing(&self, raddec: &Raddec) -> bool;
}

/// Filter gate for dynamic-ambient events.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait DynambFilter: Send + Sync {
    fn is_passing(&self, dynamb: &Dynamb) -> bool;
}

/// Filter gate for spatial events.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SpatemFilter: Send + Sync {
    fn is_passing(&self, spatem: &Spatem) -> bool;
}

/// Parameters for the supplied raddec filter. Absent parameters mean
/// pass-all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaddecFilterParameters {
    /// Transmitter signatures (`id/idType`) to accept.
    pub accepted_transmitter_signatures: Option<Vec<String>>,
    /// Minimum best RSSI across the rssi signature.
    pub min_rssi: Option<i16>,
}

impl RaddecFilterParameters {
    pub fn build(self) -> ParameterRaddecFilter {
        ParameterRaddecFilter { parameters: self }
    }
}

/// Raddec filter gate instantiated from a parameter bundle.
pub struct ParameterRaddecFilter {
    parameters: RaddecFilterParameters,
}

impl RaddecFilter for ParameterRaddecFilter {
    fn is_passing(&self, raddec: &Raddec) -> bool {
        if let Some(accepted) = &self.parameters.accepted_transmitter_signatures {
            if !accepted.contains(&raddec.signature()) {
                return false;
            }
        }
        if let Some(min_rssi) = self.parameters.min_rssi {
            let best_rssi = raddec
                .rssi_signature
                .iter()
                .map(|observation| observation.rssi)
                .max();
            if !matches!(best_rssi, Some(rssi) if rssi >= min_rssi) {
                return false;
            }
        }
        true
    }
}

/// Parameters for the supplied device-signature filters used by both
/// dynamb and spatem gates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceFilterParameters {
    /// Device signatures (`id/idType`) to accept.
    pub accepted_device_signatures: Option<Vec<String>>,
}

impl DeviceFilterParameters {
    fn accepts(&self, signature: &str) -> bool {
        match &self.accepted_device_signatures {
            Some(accepted) => accepted.iter().any(|candidate| candidate == signature),
            None => true,
        }
    }

    pub fn build_dynamb(self) -> ParameterDynambFilter {
        ParameterDynambFilter { parameters: self }
    }

    pub fn build_spatem(self) -> ParameterSpatemFilter {
        ParameterSpatemFilter { parameters: self }
    }
}

pub struct ParameterDynambFilter {
    parameters: DeviceFilterParameters,
}

impl DynambFilter for ParameterDynambFilter {
    fn is_passing(&self, dynamb: &Dynamb) -> bool {
        self.parameters.accepts(&dynamb.signature())
    }
}

pub struct ParameterSpatemFilter {
    parameters: DeviceFilterParameters,
}

impl SpatemFilter for ParameterSpatemFilter {
    fn is_passing(&self, spatem: &Spatem) -> bool {
        self.parameters.accepts(&spatem.signature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RssiObservation;

    fn raddec_with_rssi(rssi: i16) -> Raddec {
        Raddec {
            transmitter_id: "aabbccddeeff".to_string(),
            transmitter_id_type: 2,
            rssi_signature: vec![
                RssiObservation {
                    receiver_id: "receiver-1".to_string(),
                    receiver_id_type: 1,
                    rssi,
                    number_of_decodings: None,
                },
                RssiObservation {
                    receiver_id: "receiver-2".to_string(),
                    receiver_id_type: 1,
                    rssi: rssi - 10,
                    number_of_decodings: None,
                },
            ],
            initial_time: 1_700_000_000_000,
            packets: None,
        }
    }

    #[test]
    fn test_default_parameters_pass_everything() {
        let filter = RaddecFilterParameters::default().build();
        assert!(filter.is_passing(&raddec_with_rssi(-90)));
    }

    #[test]
    fn test_accepted_signatures_gate() {
        let filter = RaddecFilterParameters {
            accepted_transmitter_signatures: Some(vec!["aabbccddeeff/2".to_string()]),
            min_rssi: None,
        }
        .build();
        assert!(filter.is_passing(&raddec_with_rssi(-70)));

        let filter = RaddecFilterParameters {
            accepted_transmitter_signatures: Some(vec!["112233445566/2".to_string()]),
            min_rssi: None,
        }
        .build();
        assert!(!filter.is_passing(&raddec_with_rssi(-70)));
    }

    #[test]
    fn test_min_rssi_uses_best_observation() {
        let filter = RaddecFilterParameters {
            accepted_transmitter_signatures: None,
            min_rssi: Some(-75),
        }
        .build();
        assert!(filter.is_passing(&raddec_with_rssi(-70)));
        assert!(!filter.is_passing(&raddec_with_rssi(-80)));
    }

    #[test]
    fn test_min_rssi_rejects_empty_signature() {
        let filter = RaddecFilterParameters {
            accepted_transmitter_signatures: None,
            min_rssi: Some(-75),
        }
        .build();
        let mut raddec = raddec_with_rssi(-70);
        raddec.rssi_signature.clear();
        assert!(!filter.is_passing(&raddec));
    }

    #[test]
    fn test_device_signature_gate() {
        let dynamb = Dynamb {
            device_id: "aabbccddeeff".to_string(),
            device_id_type: 3,
            timestamp: 1_700_000_000_000,
            properties: serde_json::Map::new(),
        };

        let filter = DeviceFilterParameters::default().build_dynamb();
        assert!(filter.is_passing(&dynamb));

        let filter = DeviceFilterParameters {
            accepted_device_signatures: Some(vec!["112233445566/3".to_string()]),
        }
        .build_dynamb();
        assert!(!filter.is_passing(&dynamb));
    }
}
