//! Field-name classification.

/// Display class of a column, derived from its name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    Plain,
    /// Milliseconds since the Unix epoch.
    EpochMillisTime,
    /// RFC 3339 / ISO-8601 timestamp string.
    Iso8601Time,
    /// Floating-point seconds.
    Duration,
    /// Byte count.
    MemoryBytes,
    Percentage,
    Boolean,
}

const FIELD_TABLE: &[(&str, FieldClass)] = &[
    ("time", FieldClass::EpochMillisTime),
    ("createdAt", FieldClass::EpochMillisTime),
    ("updatedAt", FieldClass::EpochMillisTime),
    ("accessedAt", FieldClass::EpochMillisTime),
    ("expiresAt", FieldClass::EpochMillisTime),
    ("startsAt", FieldClass::EpochMillisTime),
    ("localTimeMs", FieldClass::EpochMillisTime),
    ("activeSince", FieldClass::EpochMillisTime),
    ("timeOfLastNotification", FieldClass::EpochMillisTime),
    ("discoveryStartTime", FieldClass::Iso8601Time),
    ("discoveryFinishTime", FieldClass::Iso8601Time),
    ("processingFinishTime", FieldClass::Iso8601Time),
    ("systemUptime", FieldClass::Duration),
    ("processUptime", FieldClass::Duration),
    ("fsFreeSpace", FieldClass::MemoryBytes),
    ("fsTotalSpace", FieldClass::MemoryBytes),
    ("systemMemTotal", FieldClass::MemoryBytes),
    ("jvmMemFree", FieldClass::MemoryBytes),
    ("jvmMemMax", FieldClass::MemoryBytes),
    ("jvmMemTotal", FieldClass::MemoryBytes),
    ("jvmMemUsed", FieldClass::MemoryBytes),
    ("redisUsedMemory", FieldClass::MemoryBytes),
    ("redisMaxMemory", FieldClass::MemoryBytes),
    ("cpuUsage", FieldClass::Percentage),
    ("systemMemFreePercent", FieldClass::Percentage),
    ("fsUtil", FieldClass::Percentage),
    ("discoveryPingStatus", FieldClass::Boolean),
    ("discoverySnmpStatus", FieldClass::Boolean),
];

impl FieldClass {
    /// Classify a field name. Matching is exact and case-sensitive.
    pub fn of(field_name: &str) -> FieldClass {
        FIELD_TABLE
            .iter()
            .find(|(name, _)| *name == field_name)
            .map(|(_, class)| *class)
            .unwrap_or(FieldClass::Plain)
    }

    /// Whether titles of this class get a timezone suffix.
    pub fn is_time(self) -> bool {
        matches!(self, FieldClass::EpochMillisTime | FieldClass::Iso8601Time)
    }
}
