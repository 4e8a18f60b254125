//! Completion and reason codes
//!
//! Every native call returns a coarse [`CompletionCode`] and a fine-grained
//! [`ReasonCode`]. The reason codes are looked up in a static table that
//! carries the symbolic name and the [`ReasonClass`] of each code.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::constants::{MqLong, MQCC_FAILED, MQCC_OK, MQCC_WARNING};

/// Coarse outcome of a native call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompletionCode {
    /// `MQCC_OK`
    Ok,
    /// `MQCC_WARNING`
    Warning,
    /// `MQCC_FAILED`
    Failed,
}

impl CompletionCode {
    /// Maps the raw value returned by the native layer. Any value other than
    /// `MQCC_OK` or `MQCC_WARNING` is treated as a failure.
    pub fn from_raw(value: MqLong) -> Self {
        match value {
            MQCC_OK => Self::Ok,
            MQCC_WARNING => Self::Warning,
            _ => Self::Failed,
        }
    }

    /// The raw value
    pub fn as_raw(&self) -> MqLong {
        match self {
            Self::Ok => MQCC_OK,
            Self::Warning => MQCC_WARNING,
            Self::Failed => MQCC_FAILED,
        }
    }

    /// Symbolic name of the completion code
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ok => "MQCC_OK",
            Self::Warning => "MQCC_WARNING",
            Self::Failed => "MQCC_FAILED",
        }
    }
}

impl Display for CompletionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Severity class of a reason code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReasonClass {
    /// `MQRC_NONE`
    Success,

    /// Only ever reported together with a warning completion
    Informational,

    /// No message is currently available. This is an expected steady-state
    /// condition, not an error.
    Empty,

    /// The condition may clear by itself; the caller may retry with backoff
    Transient,

    /// Configuration, authorization or usage problem that retrying will not fix
    Permanent,
}

/// Fine-grained outcome of a native call
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReasonCode(pub MqLong);

impl ReasonCode {
    fn lookup(&self) -> Option<&'static (MqLong, &'static str, ReasonClass)> {
        REASON_TABLE
            .binary_search_by_key(&self.0, |entry| entry.0)
            .ok()
            .map(|index| &REASON_TABLE[index])
    }

    /// The raw value
    pub fn as_raw(&self) -> MqLong {
        self.0
    }

    /// Whether the code is present in the reason table
    pub fn is_known(&self) -> bool {
        self.lookup().is_some()
    }

    /// Symbolic name, e.g. `"MQRC_NO_MSG_AVAILABLE"`. Codes missing from the
    /// table are reported as `"MQRC_UNKNOWN"`.
    pub fn name(&self) -> &'static str {
        self.lookup().map(|entry| entry.1).unwrap_or("MQRC_UNKNOWN")
    }

    /// Severity class. Codes missing from the table are permanent.
    pub fn class(&self) -> ReasonClass {
        self.lookup()
            .map(|entry| entry.2)
            .unwrap_or(ReasonClass::Permanent)
    }
}

impl From<MqLong> for ReasonCode {
    fn from(value: MqLong) -> Self {
        Self(value)
    }
}

impl std::fmt::Debug for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name(), self.0)
    }
}

impl Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

reason_codes! {
    NONE = 0 => Success,
    ALIAS_BASE_Q_TYPE_ERROR = 2001 => Permanent,
    ALREADY_CONNECTED = 2002 => Informational,
    BACKED_OUT = 2003 => Transient,
    BUFFER_ERROR = 2004 => Permanent,
    BUFFER_LENGTH_ERROR = 2005 => Permanent,
    CHAR_ATTR_LENGTH_ERROR = 2006 => Permanent,
    CHAR_ATTRS_ERROR = 2007 => Permanent,
    CHAR_ATTRS_TOO_SHORT = 2008 => Informational,
    CONNECTION_BROKEN = 2009 => Transient,
    DATA_LENGTH_ERROR = 2010 => Permanent,
    DYNAMIC_Q_NAME_ERROR = 2011 => Permanent,
    ENVIRONMENT_ERROR = 2012 => Permanent,
    EXPIRY_ERROR = 2013 => Permanent,
    FEEDBACK_ERROR = 2014 => Permanent,
    GET_INHIBITED = 2016 => Transient,
    HANDLE_NOT_AVAILABLE = 2017 => Transient,
    HCONN_ERROR = 2018 => Permanent,
    HOBJ_ERROR = 2019 => Permanent,
    INHIBIT_VALUE_ERROR = 2020 => Permanent,
    INT_ATTR_COUNT_ERROR = 2021 => Permanent,
    INT_ATTR_COUNT_TOO_SMALL = 2022 => Informational,
    INT_ATTRS_ARRAY_ERROR = 2023 => Permanent,
    SYNCPOINT_LIMIT_REACHED = 2024 => Transient,
    MAX_CONNS_LIMIT_REACHED = 2025 => Transient,
    MD_ERROR = 2026 => Permanent,
    MISSING_REPLY_TO_Q = 2027 => Permanent,
    MSG_TYPE_ERROR = 2029 => Permanent,
    MSG_TOO_BIG_FOR_Q = 2030 => Permanent,
    MSG_TOO_BIG_FOR_Q_MGR = 2031 => Permanent,
    NO_MSG_AVAILABLE = 2033 => Empty,
    NO_MSG_UNDER_CURSOR = 2034 => Permanent,
    NOT_AUTHORIZED = 2035 => Permanent,
    NOT_OPEN_FOR_BROWSE = 2036 => Permanent,
    NOT_OPEN_FOR_INPUT = 2037 => Permanent,
    NOT_OPEN_FOR_INQUIRE = 2038 => Permanent,
    NOT_OPEN_FOR_OUTPUT = 2039 => Permanent,
    NOT_OPEN_FOR_SET = 2040 => Permanent,
    OBJECT_CHANGED = 2041 => Permanent,
    OBJECT_IN_USE = 2042 => Transient,
    OBJECT_TYPE_ERROR = 2043 => Permanent,
    OD_ERROR = 2044 => Permanent,
    OPTION_NOT_VALID_FOR_TYPE = 2045 => Permanent,
    OPTIONS_ERROR = 2046 => Permanent,
    PERSISTENCE_ERROR = 2047 => Permanent,
    PERSISTENT_NOT_ALLOWED = 2048 => Permanent,
    PRIORITY_EXCEEDS_MAXIMUM = 2049 => Informational,
    PRIORITY_ERROR = 2050 => Permanent,
    PUT_INHIBITED = 2051 => Transient,
    Q_DELETED = 2052 => Permanent,
    Q_FULL = 2053 => Transient,
    Q_NOT_EMPTY = 2055 => Permanent,
    Q_SPACE_NOT_AVAILABLE = 2056 => Transient,
    Q_TYPE_ERROR = 2057 => Permanent,
    Q_MGR_NAME_ERROR = 2058 => Permanent,
    Q_MGR_NOT_AVAILABLE = 2059 => Transient,
    REPORT_OPTIONS_ERROR = 2061 => Permanent,
    SECOND_MARK_NOT_ALLOWED = 2062 => Permanent,
    SECURITY_ERROR = 2063 => Permanent,
    SELECTOR_COUNT_ERROR = 2065 => Permanent,
    SELECTOR_LIMIT_EXCEEDED = 2066 => Permanent,
    SELECTOR_ERROR = 2067 => Permanent,
    SELECTOR_NOT_FOR_TYPE = 2068 => Permanent,
    SIGNAL_OUTSTANDING = 2069 => Permanent,
    SIGNAL_REQUEST_ACCEPTED = 2070 => Informational,
    STORAGE_NOT_AVAILABLE = 2071 => Transient,
    SYNCPOINT_NOT_AVAILABLE = 2072 => Permanent,
    TRIGGER_CONTROL_ERROR = 2075 => Permanent,
    TRIGGER_DEPTH_ERROR = 2076 => Permanent,
    TRIGGER_MSG_PRIORITY_ERR = 2077 => Permanent,
    TRIGGER_TYPE_ERROR = 2078 => Permanent,
    TRUNCATED_MSG_ACCEPTED = 2079 => Informational,
    TRUNCATED_MSG_FAILED = 2080 => Permanent,
    UNKNOWN_ALIAS_BASE_Q = 2082 => Permanent,
    UNKNOWN_OBJECT_NAME = 2085 => Permanent,
    UNKNOWN_OBJECT_Q_MGR = 2086 => Permanent,
    UNKNOWN_REMOTE_Q_MGR = 2087 => Permanent,
    WAIT_INTERVAL_ERROR = 2090 => Permanent,
    XMIT_Q_TYPE_ERROR = 2091 => Permanent,
    XMIT_Q_USAGE_ERROR = 2092 => Permanent,
    NOT_OPEN_FOR_PASS_ALL = 2093 => Permanent,
    NOT_OPEN_FOR_PASS_IDENT = 2094 => Permanent,
    NOT_OPEN_FOR_SET_ALL = 2095 => Permanent,
    NOT_OPEN_FOR_SET_IDENT = 2096 => Permanent,
    CONTEXT_HANDLE_ERROR = 2097 => Permanent,
    CONTEXT_NOT_AVAILABLE = 2098 => Permanent,
    SIGNAL1_ERROR = 2099 => Permanent,
    OBJECT_ALREADY_EXISTS = 2100 => Permanent,
    OBJECT_DAMAGED = 2101 => Permanent,
    RESOURCE_PROBLEM = 2102 => Transient,
    ANOTHER_Q_MGR_CONNECTED = 2103 => Permanent,
    UNKNOWN_REPORT_OPTION = 2104 => Informational,
    STORAGE_CLASS_ERROR = 2105 => Permanent,
    COD_NOT_VALID_FOR_XCF_Q = 2106 => Permanent,
    SUPPRESSED_BY_EXIT = 2109 => Permanent,
    FORMAT_ERROR = 2110 => Permanent,
    SOURCE_CCSID_ERROR = 2111 => Permanent,
    SOURCE_INTEGER_ENC_ERROR = 2112 => Permanent,
    SOURCE_DECIMAL_ENC_ERROR = 2113 => Permanent,
    SOURCE_FLOAT_ENC_ERROR = 2114 => Permanent,
    TARGET_CCSID_ERROR = 2115 => Permanent,
    TARGET_INTEGER_ENC_ERROR = 2116 => Permanent,
    TARGET_DECIMAL_ENC_ERROR = 2117 => Permanent,
    TARGET_FLOAT_ENC_ERROR = 2118 => Permanent,
    NOT_CONVERTED = 2119 => Informational,
    CONVERTED_MSG_TOO_BIG = 2120 => Permanent,
    NO_EXTERNAL_PARTICIPANTS = 2121 => Informational,
    PARTICIPANT_NOT_AVAILABLE = 2122 => Informational,
    OUTCOME_MIXED = 2123 => Permanent,
    OUTCOME_PENDING = 2124 => Informational,
    BRIDGE_STARTED = 2125 => Informational,
    BRIDGE_STOPPED = 2126 => Informational,
    ADAPTER_STORAGE_SHORTAGE = 2127 => Transient,
    UOW_IN_PROGRESS = 2128 => Permanent,
    ADAPTER_CONN_LOAD_ERROR = 2129 => Permanent,
    ADAPTER_SERV_LOAD_ERROR = 2130 => Permanent,
    ADAPTER_DEFS_ERROR = 2131 => Permanent,
    ADAPTER_DEFS_LOAD_ERROR = 2132 => Permanent,
    ADAPTER_CONV_LOAD_ERROR = 2133 => Permanent,
    BO_ERROR = 2134 => Permanent,
    DH_ERROR = 2135 => Permanent,
    MULTIPLE_REASONS = 2136 => Permanent,
    OPEN_FAILED = 2137 => Permanent,
    ADAPTER_DISC_LOAD_ERROR = 2138 => Permanent,
    CNO_ERROR = 2139 => Permanent,
    CICS_WAIT_FAILED = 2140 => Permanent,
    DLH_ERROR = 2141 => Permanent,
    HEADER_ERROR = 2142 => Permanent,
    SOURCE_LENGTH_ERROR = 2143 => Permanent,
    TARGET_LENGTH_ERROR = 2144 => Permanent,
    SOURCE_BUFFER_ERROR = 2145 => Permanent,
    TARGET_BUFFER_ERROR = 2146 => Permanent,
    IIH_ERROR = 2148 => Permanent,
    PCF_ERROR = 2149 => Permanent,
    DBCS_ERROR = 2150 => Permanent,
    OBJECT_NAME_ERROR = 2152 => Permanent,
    OBJECT_Q_MGR_NAME_ERROR = 2153 => Permanent,
    RECS_PRESENT_ERROR = 2154 => Permanent,
    OBJECT_RECORDS_ERROR = 2155 => Permanent,
    RESPONSE_RECORDS_ERROR = 2156 => Permanent,
    ASID_MISMATCH = 2157 => Permanent,
    PMO_RECORD_FLAGS_ERROR = 2158 => Permanent,
    PUT_MSG_RECORDS_ERROR = 2159 => Permanent,
    CONN_ID_IN_USE = 2160 => Transient,
    Q_MGR_QUIESCING = 2161 => Transient,
    Q_MGR_STOPPING = 2162 => Transient,
    DUPLICATE_RECOV_COORD = 2163 => Permanent,
    PMO_ERROR = 2173 => Permanent,
    API_EXIT_LOAD_ERROR = 2183 => Permanent,
    REMOTE_Q_NAME_ERROR = 2184 => Permanent,
    INCONSISTENT_PERSISTENCE = 2185 => Permanent,
    GMO_ERROR = 2186 => Permanent,
    CLUSTER_RESOLUTION_ERROR = 2189 => Permanent,
    UNEXPECTED_ERROR = 2195 => Permanent,
    CONNECTION_QUIESCING = 2202 => Transient,
    CONNECTION_STOPPING = 2203 => Transient,
    ADAPTER_NOT_AVAILABLE = 2204 => Transient,
    CORREL_ID_ERROR = 2207 => Permanent,
    CONNECTION_NOT_AUTHORIZED = 2217 => Permanent,
    CALL_IN_PROGRESS = 2219 => Transient,
    MATCH_OPTIONS_ERROR = 2247 => Permanent,
    UOW_NOT_AVAILABLE = 2255 => Permanent,
    WRONG_GMO_VERSION = 2256 => Permanent,
    WRONG_MD_VERSION = 2257 => Permanent,
    INCONSISTENT_BROWSE = 2259 => Permanent,
    CD_ERROR = 2277 => Permanent,
    CLIENT_CONN_ERROR = 2278 => Permanent,
    CHANNEL_STOPPED_BY_USER = 2279 => Transient,
    UOW_CANCELED = 2297 => Permanent,
    RFH_ERROR = 2334 => Permanent,
    KEY_REPOSITORY_ERROR = 2381 => Permanent,
    SSL_INITIALIZATION_ERROR = 2393 => Permanent,
    SSL_PEER_NAME_MISMATCH = 2398 => Permanent,
    SSL_PEER_NAME_ERROR = 2399 => Permanent,
    UNSUPPORTED_CIPHER_SUITE = 2400 => Permanent,
    CHANNEL_NOT_AVAILABLE = 2537 => Transient,
    HOST_NOT_AVAILABLE = 2538 => Transient,
    CHANNEL_CONFIG_ERROR = 2539 => Permanent,
    UNKNOWN_CHANNEL_NAME = 2540 => Permanent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_codes() {
        assert_eq!(ReasonCode::NO_MSG_AVAILABLE.name(), "MQRC_NO_MSG_AVAILABLE");
        assert_eq!(ReasonCode(2033), ReasonCode::NO_MSG_AVAILABLE);
        assert_eq!(ReasonCode::NO_MSG_AVAILABLE.class(), ReasonClass::Empty);
        assert_eq!(ReasonCode::CONNECTION_BROKEN.class(), ReasonClass::Transient);
        assert_eq!(ReasonCode::Q_FULL.class(), ReasonClass::Transient);
        assert_eq!(ReasonCode::OBJECT_IN_USE.class(), ReasonClass::Transient);
        assert_eq!(ReasonCode::Q_MGR_QUIESCING.class(), ReasonClass::Transient);
        assert_eq!(ReasonCode::UNKNOWN_OBJECT_NAME.class(), ReasonClass::Permanent);
        assert_eq!(ReasonCode::NOT_AUTHORIZED.class(), ReasonClass::Permanent);
        assert_eq!(ReasonCode::NONE.class(), ReasonClass::Success);
    }

    #[test]
    fn unknown_code_is_permanent() {
        let code = ReasonCode(9999);
        assert!(!code.is_known());
        assert_eq!(code.name(), "MQRC_UNKNOWN");
        assert_eq!(code.class(), ReasonClass::Permanent);
        assert_eq!(code.to_string(), "MQRC_UNKNOWN (9999)");
    }

    #[test]
    fn completion_code_from_raw() {
        assert_eq!(CompletionCode::from_raw(0), CompletionCode::Ok);
        assert_eq!(CompletionCode::from_raw(1), CompletionCode::Warning);
        assert_eq!(CompletionCode::from_raw(2), CompletionCode::Failed);
        assert_eq!(CompletionCode::from_raw(-1), CompletionCode::Failed);
        assert_eq!(CompletionCode::Warning.as_raw(), 1);
    }
}
