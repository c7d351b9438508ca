use std::collections::HashSet;
use std::fmt::Display;
use thiserror::Error;

/// Every field of `/api/system/info` that is exposed as a sensor. Any other key in the document is ignored.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Clone, Copy)]
pub enum SensorKey {
    Power,
    Voltage,
    Current,
    Temp,
    VrTemp,
    HashRate,
    Frequency,
    FanSpeed,
    FanRpm,
    UptimeSeconds,
    FreeHeap,
    CoreVoltage,
    CoreVoltageActual,
    Ssid,
    MacAddr,
    Hostname,
    WifiStatus,
    SharesAccepted,
    SharesRejected,
    AsicCount,
    SmallCoreCount,
    AsicModel,
    StratumUrl,
    FallbackStratumUrl,
    StratumPort,
    FallbackStratumPort,
    StratumUser,
    FallbackStratumUser,
    Version,
    IdfVersion,
    BoardVersion,
    RunningPartition,
    FlipScreen,
    OverheatMode,
    InvertScreen,
    InvertFanPolarity,
    AutoFanSpeed,
}

#[derive(PartialEq, Debug)]
pub struct SensorDescriptor {
    pub key: SensorKey,
    pub label: &'static str,
    pub unit: Option<Unit>,
    pub icon: &'static str,
    pub device_class: Option<DeviceClass>,
}

impl SensorDescriptor {
    pub fn state_class(&self) -> Option<StateClass> {
        self.unit.as_ref().map(|_| StateClass::Measurement)
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Unit {
    Watt,
    Millivolt,
    Milliampere,
    Volt,
    DegreesCelsius,
    MegahashPerSecond,
    Hertz,
    Percentage,
    RevolutionsPerMinute,
    Seconds,
    Bytes,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Watt => "W",
            Unit::Millivolt => "mV",
            Unit::Milliampere => "mA",
            Unit::Volt => "V",
            Unit::DegreesCelsius => "°C",
            Unit::MegahashPerSecond => "MH/s",
            Unit::Hertz => "Hz",
            Unit::Percentage => "%",
            Unit::RevolutionsPerMinute => "rpm",
            Unit::Seconds => "s",
            Unit::Bytes => "bytes",
        }
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum DeviceClass {
    Power,
    Voltage,
    Current,
    Temperature,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Power => "power",
            DeviceClass::Voltage => "voltage",
            DeviceClass::Current => "current",
            DeviceClass::Temperature => "temperature",
        }
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum StateClass {
    Measurement,
}

macro_rules! descriptor {
    ($key:ident, $label:literal, $unit:expr, $icon:literal, $class:expr) => {{
        const DESCRIPTOR: SensorDescriptor = SensorDescriptor {
            key: SensorKey::$key,
            label: $label,
            unit: $unit,
            icon: $icon,
            device_class: $class,
        };
        &DESCRIPTOR
    }};
}

impl SensorKey {
    pub const ALL: [SensorKey; 37] = [
        SensorKey::Power,
        SensorKey::Voltage,
        SensorKey::Current,
        SensorKey::Temp,
        SensorKey::VrTemp,
        SensorKey::HashRate,
        SensorKey::Frequency,
        SensorKey::FanSpeed,
        SensorKey::FanRpm,
        SensorKey::UptimeSeconds,
        SensorKey::FreeHeap,
        SensorKey::CoreVoltage,
        SensorKey::CoreVoltageActual,
        SensorKey::Ssid,
        SensorKey::MacAddr,
        SensorKey::Hostname,
        SensorKey::WifiStatus,
        SensorKey::SharesAccepted,
        SensorKey::SharesRejected,
        SensorKey::AsicCount,
        SensorKey::SmallCoreCount,
        SensorKey::AsicModel,
        SensorKey::StratumUrl,
        SensorKey::FallbackStratumUrl,
        SensorKey::StratumPort,
        SensorKey::FallbackStratumPort,
        SensorKey::StratumUser,
        SensorKey::FallbackStratumUser,
        SensorKey::Version,
        SensorKey::IdfVersion,
        SensorKey::BoardVersion,
        SensorKey::RunningPartition,
        SensorKey::FlipScreen,
        SensorKey::OverheatMode,
        SensorKey::InvertScreen,
        SensorKey::InvertFanPolarity,
        SensorKey::AutoFanSpeed,
    ];

    /// The key as it appears in the device's JSON document.
    pub fn wire_key(&self) -> &'static str {
        match self {
            SensorKey::Power => "power",
            SensorKey::Voltage => "voltage",
            SensorKey::Current => "current",
            SensorKey::Temp => "temp",
            SensorKey::VrTemp => "vrTemp",
            SensorKey::HashRate => "hashRate",
            SensorKey::Frequency => "frequency",
            SensorKey::FanSpeed => "fanspeed",
            SensorKey::FanRpm => "fanrpm",
            SensorKey::UptimeSeconds => "uptimeSeconds",
            SensorKey::FreeHeap => "freeHeap",
            SensorKey::CoreVoltage => "coreVoltage",
            SensorKey::CoreVoltageActual => "coreVoltageActual",
            SensorKey::Ssid => "ssid",
            SensorKey::MacAddr => "macAddr",
            SensorKey::Hostname => "hostname",
            SensorKey::WifiStatus => "wifiStatus",
            SensorKey::SharesAccepted => "sharesAccepted",
            SensorKey::SharesRejected => "sharesRejected",
            SensorKey::AsicCount => "asicCount",
            SensorKey::SmallCoreCount => "smallCoreCount",
            SensorKey::AsicModel => "ASICModel",
            SensorKey::StratumUrl => "stratumURL",
            SensorKey::FallbackStratumUrl => "fallbackStratumURL",
            SensorKey::StratumPort => "stratumPort",
            SensorKey::FallbackStratumPort => "fallbackStratumPort",
            SensorKey::StratumUser => "stratumUser",
            SensorKey::FallbackStratumUser => "fallbackStratumUser",
            SensorKey::Version => "version",
            SensorKey::IdfVersion => "idfVersion",
            SensorKey::BoardVersion => "boardVersion",
            SensorKey::RunningPartition => "runningPartition",
            SensorKey::FlipScreen => "flipscreen",
            SensorKey::OverheatMode => "overheat_mode",
            SensorKey::InvertScreen => "invertscreen",
            SensorKey::InvertFanPolarity => "invertfanpolarity",
            SensorKey::AutoFanSpeed => "autofanspeed",
        }
    }

    pub fn from_wire_key(key: &str) -> Option<SensorKey> {
        SensorKey::ALL.into_iter().find(|sensor_key| sensor_key.wire_key() == key)
    }

    #[rustfmt::skip]
    pub fn descriptor(&self) -> &'static SensorDescriptor {
        match self {
            SensorKey::Power => descriptor!(Power, "Power", Some(Unit::Watt), "mdi:flash", Some(DeviceClass::Power)),
            SensorKey::Voltage => descriptor!(Voltage, "Voltage", Some(Unit::Millivolt), "mdi:flash", Some(DeviceClass::Voltage)),
            SensorKey::Current => descriptor!(Current, "Current", Some(Unit::Milliampere), "mdi:current-ac", Some(DeviceClass::Current)),
            SensorKey::Temp => descriptor!(Temp, "Temperature", Some(Unit::DegreesCelsius), "mdi:thermometer", Some(DeviceClass::Temperature)),
            SensorKey::VrTemp => descriptor!(VrTemp, "VR Temperature", Some(Unit::DegreesCelsius), "mdi:thermometer", Some(DeviceClass::Temperature)),
            SensorKey::HashRate => descriptor!(HashRate, "Hash Rate", Some(Unit::MegahashPerSecond), "mdi:chart-line", None),
            SensorKey::Frequency => descriptor!(Frequency, "Frequency", Some(Unit::Hertz), "mdi:wave", None),
            SensorKey::FanSpeed => descriptor!(FanSpeed, "Fan Speed", Some(Unit::Percentage), "mdi:fan", None),
            SensorKey::FanRpm => descriptor!(FanRpm, "Fan RPM", Some(Unit::RevolutionsPerMinute), "mdi:fan", None),
            SensorKey::UptimeSeconds => descriptor!(UptimeSeconds, "Uptime", Some(Unit::Seconds), "mdi:clock", None),
            SensorKey::FreeHeap => descriptor!(FreeHeap, "Free Heap", Some(Unit::Bytes), "mdi:memory", None),
            SensorKey::CoreVoltage => descriptor!(CoreVoltage, "Core Voltage", Some(Unit::Volt), "mdi:flash", Some(DeviceClass::Voltage)),
            SensorKey::CoreVoltageActual => descriptor!(CoreVoltageActual, "Core Voltage Actual", Some(Unit::Volt), "mdi:flash", Some(DeviceClass::Voltage)),
            SensorKey::Ssid => descriptor!(Ssid, "SSID", None, "mdi:wifi", None),
            SensorKey::MacAddr => descriptor!(MacAddr, "MAC Address", None, "mdi:network", None),
            SensorKey::Hostname => descriptor!(Hostname, "Hostname", None, "mdi:server", None),
            SensorKey::WifiStatus => descriptor!(WifiStatus, "WiFi Status", None, "mdi:wifi", None),
            SensorKey::SharesAccepted => descriptor!(SharesAccepted, "Shares Accepted", None, "mdi:check", None),
            SensorKey::SharesRejected => descriptor!(SharesRejected, "Shares Rejected", None, "mdi:close", None),
            SensorKey::AsicCount => descriptor!(AsicCount, "ASIC Count", None, "mdi:chip", None),
            SensorKey::SmallCoreCount => descriptor!(SmallCoreCount, "Small Core Count", None, "mdi:chip", None),
            SensorKey::AsicModel => descriptor!(AsicModel, "ASIC Model", None, "mdi:chip", None),
            SensorKey::StratumUrl => descriptor!(StratumUrl, "Stratum URL", None, "mdi:link", None),
            SensorKey::FallbackStratumUrl => descriptor!(FallbackStratumUrl, "Fallback Stratum URL", None, "mdi:link", None),
            SensorKey::StratumPort => descriptor!(StratumPort, "Stratum Port", None, "mdi:link", None),
            SensorKey::FallbackStratumPort => descriptor!(FallbackStratumPort, "Fallback Stratum Port", None, "mdi:link", None),
            SensorKey::StratumUser => descriptor!(StratumUser, "Stratum User", None, "mdi:account", None),
            SensorKey::FallbackStratumUser => descriptor!(FallbackStratumUser, "Fallback Stratum User", None, "mdi:account", None),
            SensorKey::Version => descriptor!(Version, "Version", None, "mdi:information", None),
            SensorKey::IdfVersion => descriptor!(IdfVersion, "IDF Version", None, "mdi:information", None),
            SensorKey::BoardVersion => descriptor!(BoardVersion, "Board Version", None, "mdi:information", None),
            SensorKey::RunningPartition => descriptor!(RunningPartition, "Running Partition", None, "mdi:information", None),
            SensorKey::FlipScreen => descriptor!(FlipScreen, "Flip Screen", None, "mdi:rotate-3d", None),
            SensorKey::OverheatMode => descriptor!(OverheatMode, "Overheat Mode", None, "mdi:thermometer-alert", None),
            SensorKey::InvertScreen => descriptor!(InvertScreen, "Invert Screen", None, "mdi:rotate-3d", None),
            SensorKey::InvertFanPolarity => descriptor!(InvertFanPolarity, "Invert Fan Polarity", None, "mdi:fan", None),
            SensorKey::AutoFanSpeed => descriptor!(AutoFanSpeed, "Auto Fan Speed", None, "mdi:fan", None),
        }
    }
}

impl Display for SensorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_key())
    }
}

/// Checks the compiled-in descriptor table once at startup.
pub fn validate_descriptors() -> Result<(), DescriptorError> {
    let mut wire_keys = HashSet::with_capacity(SensorKey::ALL.len());
    let mut labels = HashSet::with_capacity(SensorKey::ALL.len());

    for key in SensorKey::ALL {
        let descriptor = key.descriptor();
        if descriptor.key != key {
            return Err(DescriptorError::Mismatch { key });
        }

        if !wire_keys.insert(key.wire_key()) || SensorKey::from_wire_key(key.wire_key()) != Some(key) {
            return Err(DescriptorError::DuplicateWireKey { wire_key: key.wire_key() });
        }

        if descriptor.label.trim().is_empty() || !labels.insert(descriptor.label) {
            return Err(DescriptorError::InvalidLabel { key });
        }

        if !descriptor.icon.starts_with("mdi:") {
            return Err(DescriptorError::InvalidIcon { key, icon: descriptor.icon });
        }
    }

    Ok(())
}

#[derive(Error, Debug, PartialEq)]
pub enum DescriptorError {
    #[error("descriptor for '{key}' is registered under another key")]
    Mismatch { key: SensorKey },
    #[error("wire key '{wire_key}' is used by more than one sensor")]
    DuplicateWireKey { wire_key: &'static str },
    #[error("sensor '{key}' has an empty or duplicate label")]
    InvalidLabel { key: SensorKey },
    #[error("sensor '{key}' has icon '{icon}', expected an 'mdi:' icon")]
    InvalidIcon { key: SensorKey, icon: &'static str },
}
