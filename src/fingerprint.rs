use sha2::{Digest, Sha256};

/// Ambient browser/device signals used to derive the obfuscation key.
///
/// This is deliberately NOT a secret: two sessions on the same device and
/// browser always derive the same key, and anyone who can run code in the
/// same environment can reproduce it. It exists to keep stored answers from
/// being casually readable, nothing more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFingerprint {
    pub user_agent: String,
    /// Screen resolution as "WIDTHxHEIGHT".
    pub screen: String,
    /// IANA timezone name, e.g. "Asia/Manila".
    pub time_zone: String,
}

/// Source of fingerprint signals, injectable so non-browser harnesses can
/// supply a deterministic fingerprint.
pub trait FingerprintProvider {
    fn fingerprint(&self) -> DeviceFingerprint;
}

impl FingerprintProvider for DeviceFingerprint {
    fn fingerprint(&self) -> DeviceFingerprint {
        self.clone()
    }
}

impl DeviceFingerprint {
    pub fn new(user_agent: &str, screen: &str, time_zone: &str) -> Self {
        DeviceFingerprint {
            user_agent: user_agent.to_string(),
            screen: screen.to_string(),
            time_zone: time_zone.to_string(),
        }
    }

    fn base_string(&self) -> String {
        format!("{}|{}|{}", self.user_agent, self.screen, self.time_zone)
    }

    /// Device key: hex SHA-256 of the fingerprint, truncated to 32 chars.
    pub fn device_key(&self) -> String {
        let digest = Sha256::digest(self.base_string().as_bytes());
        let hex = digest.iter().map(|b| format!("{:02x}", b)).collect::<String>();
        hex[..32].to_string()
    }

    /// Derive the 32-byte symmetric key from the application salt, the
    /// device key and an optional caller-supplied salt.
    pub fn derive_key(&self, app_salt: &str, salt: &str) -> [u8; 32] {
        let master = format!("{}{}{}", app_salt, self.device_key(), salt);
        let digest = Sha256::digest(master.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        key
    }
}
