//! Type definitions for mediums, payloads and upgrade strategies
//!
//! Every enum here carries fixed numeric codes that match the values used by
//! the Nearby Connections snippets and their logs. Codes are never derived
//! from declaration order; gaps are reserved and rejected on decode.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Declares a closed enum with explicit wire codes, canonical names and the
/// conversions every code-carrying enum in this crate shares.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        #[repr(u8)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $code ),+
        }

        impl $name {
            /// All variants in code order
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Numeric code used on the wire and in logs
            pub fn code(self) -> u8 {
                self as u8
            }

            /// Canonical upper-snake name
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = AppError;

            fn try_from(code: u8) -> Result<Self> {
                match code {
                    $( $code => Ok($name::$variant), )+
                    other => Err(AppError::parse(format!(
                        "Invalid {} code: {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value.code()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            /// Accepts the canonical name (any case, `-` or `_`) or the numeric code
            fn from_str(s: &str) -> Result<Self> {
                let trimmed = s.trim();
                if let Ok(code) = trimmed.parse::<u8>() {
                    return Self::try_from(code);
                }

                let normalized = trimmed.to_uppercase().replace('-', "_");
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.name() == normalized)
                    .ok_or_else(|| AppError::parse(format!(
                        "Invalid {} value: {}",
                        stringify!($name),
                        s
                    )))
            }
        }
    };
}

coded_enum! {
    /// Kind of payload a throughput sample was measured for
    PayloadType {
        File = 2 => "FILE",
        Stream = 3 => "STREAM",
    }
}

coded_enum! {
    /// Transport strategy requested for a trial
    NearbyMedium {
        Auto = 0 => "AUTO",
        BtOnly = 1 => "BT_ONLY",
        BleOnly = 2 => "BLE_ONLY",
        WifiLanOnly = 3 => "WIFILAN_ONLY",
        WifiAwareOnly = 4 => "WIFIAWARE_ONLY",
        UpgradeToWebRtc = 5 => "UPGRADE_TO_WEBRTC",
        UpgradeToWifiHotspot = 6 => "UPGRADE_TO_WIFIHOTSPOT",
        UpgradeToWifiDirect = 7 => "UPGRADE_TO_WIFIDIRECT",
        BleL2capOnly = 8 => "BLE_L2CAP_ONLY",
        /// WLAN, hotspot and direct together
        UpgradeToAllWifi = 9 => "UPGRADE_TO_ALL_WIFI",
    }
}

coded_enum! {
    /// Transport actually selected once bandwidth negotiation settles.
    ///
    /// Code 1 (legacy MDNS) and code 10 are reserved.
    NearbyConnectionMedium {
        Unknown = 0 => "UNKNOWN",
        Bluetooth = 2 => "BLUETOOTH",
        WifiHotspot = 3 => "WIFI_HOTSPOT",
        Ble = 4 => "BLE",
        WifiLan = 5 => "WIFI_LAN",
        WifiAware = 6 => "WIFI_AWARE",
        Nfc = 7 => "NFC",
        WifiDirect = 8 => "WIFI_DIRECT",
        WebRtc = 9 => "WEB_RTC",
        Usb = 11 => "USB",
    }
}

coded_enum! {
    /// How a medium upgrade transition is carried out
    MediumUpgradeType {
        Default = 0 => "DEFAULT",
        Disruptive = 1 => "DISRUPTIVE",
        NonDisruptive = 2 => "NON_DISRUPTIVE",
    }
}

impl Default for PayloadType {
    fn default() -> Self {
        PayloadType::Stream
    }
}

impl Default for MediumUpgradeType {
    fn default() -> Self {
        MediumUpgradeType::Default
    }
}

impl NearbyMedium {
    /// Whether this medium is broadband capable (WiFi class or an upgrade to one)
    pub fn is_high_quality(self) -> bool {
        is_high_quality_medium(self)
    }
}

/// Classify a requested medium as high quality.
///
/// Decides whether the WiFi or the BT throughput benchmark applies.
pub fn is_high_quality_medium(medium: NearbyMedium) -> bool {
    matches!(
        medium,
        NearbyMedium::WifiLanOnly
            | NearbyMedium::WifiAwareOnly
            | NearbyMedium::UpgradeToWebRtc
            | NearbyMedium::UpgradeToWifiHotspot
            | NearbyMedium::UpgradeToWifiDirect
            | NearbyMedium::UpgradeToAllWifi
    )
}
