//! Compute instance records.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::resources::Ref;

/// Machine image selector.
///
/// The actual image lookup belongs to the provisioning engine; the
/// symbolic variant synthesizes to a well-known alias the engine resolves
/// to the latest matching image at deploy time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineImage {
    /// Latest Amazon Linux 2 image, resolved by the provisioning engine
    AmazonLinux2,
    /// A literal image id
    Id(String),
}

const AMAZON_LINUX_2_ALIAS: &str = "amazon-linux-2/latest";

impl MachineImage {
    /// The string the image synthesizes to.
    pub fn as_str(&self) -> &str {
        match self {
            MachineImage::AmazonLinux2 => AMAZON_LINUX_2_ALIAS,
            MachineImage::Id(id) => id,
        }
    }
}

impl Serialize for MachineImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MachineImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(if s == AMAZON_LINUX_2_ALIAS {
            MachineImage::AmazonLinux2
        } else {
            MachineImage::Id(s)
        })
    }
}

/// A boot-time initialization script.
///
/// Held as plain text in the declaration and base64-encoded in the
/// synthesized document, the way the provisioning engine expects user
/// data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData(String);

impl UserData {
    /// Wraps a plain-text shell script.
    pub fn shell(script: impl Into<String>) -> Self {
        Self(script.into())
    }

    /// The plain-text script.
    pub fn as_plain(&self) -> &str {
        &self.0
    }

    /// The base64 encoding used in the synthesized document.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0.as_bytes())
    }
}

impl Serialize for UserData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for UserData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let bytes = BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| de::Error::custom(format!("invalid base64 user data: {e}")))?;
        let script = String::from_utf8(bytes)
            .map_err(|e| de::Error::custom(format!("user data is not UTF-8: {e}")))?;
        Ok(Self(script))
    }
}

/// A compute instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Machine image to boot
    pub image: MachineImage,
    /// Instance size class, e.g. `t2.micro`
    pub instance_type: String,
    /// Subnet the instance is launched into
    pub subnet: Ref,
    /// Security group attached to the instance
    pub security_group: Ref,
    /// SSH key pair name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    /// Boot-time initialization script
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<UserData>,
    /// Display name tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Instance {
    /// Creates an instance record.
    pub fn new(
        image: MachineImage,
        instance_type: impl Into<String>,
        subnet: impl Into<Ref>,
        security_group: impl Into<Ref>,
    ) -> Self {
        Self {
            image,
            instance_type: instance_type.into(),
            subnet: subnet.into(),
            security_group: security_group.into(),
            key_name: None,
            user_data: None,
            name: None,
        }
    }

    /// Sets the SSH key pair name.
    pub fn with_key_name(mut self, key_name: impl Into<String>) -> Self {
        self.key_name = Some(key_name.into());
        self
    }

    /// Sets the boot script.
    pub fn with_user_data(mut self, user_data: UserData) -> Self {
        self.user_data = Some(user_data);
        self
    }

    /// Sets the display name tag.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
