//! Numeric constants of the message queue interface
//!
//! The values mirror the vendor's published `cmqc.h` definitions. Only the
//! subset consumed by this binding is listed.

/// 32-bit signed integer used for every numeric field of the interface
pub type MqLong = i32;

/* -------------------------------- Lengths --------------------------------- */

/// Length of a queue name
pub const MQ_Q_NAME_LENGTH: usize = 48;
/// Length of a queue manager name
pub const MQ_Q_MGR_NAME_LENGTH: usize = 48;
/// Length of a message or correlation identifier
pub const MQ_MSG_ID_LENGTH: usize = 24;
/// Length of a format name
pub const MQ_FORMAT_LENGTH: usize = 8;
/// Length of a user identifier
pub const MQ_USER_ID_LENGTH: usize = 12;
/// Length of an accounting token
pub const MQ_ACCOUNTING_TOKEN_LENGTH: usize = 32;
/// Length of application identity data
pub const MQ_APPL_IDENTITY_DATA_LENGTH: usize = 32;
/// Length of a put application name
pub const MQ_PUT_APPL_NAME_LENGTH: usize = 28;
/// Length of the put date
pub const MQ_PUT_DATE_LENGTH: usize = 8;
/// Length of the put time
pub const MQ_PUT_TIME_LENGTH: usize = 8;
/// Length of application origin data
pub const MQ_APPL_ORIGIN_DATA_LENGTH: usize = 4;
/// Length of a security identifier
pub const MQ_SECURITY_ID_LENGTH: usize = 40;
/// Length of a channel name
pub const MQ_CHANNEL_NAME_LENGTH: usize = 20;
/// Length of a connection name
pub const MQ_CONN_NAME_LENGTH: usize = 264;

/* ---------------------------- Completion codes ---------------------------- */

/// Successful completion
pub const MQCC_OK: MqLong = 0;
/// Warning (partial completion)
pub const MQCC_WARNING: MqLong = 1;
/// Call failed
pub const MQCC_FAILED: MqLong = 2;
/// Completion code not known
pub const MQCC_UNKNOWN: MqLong = -1;

/* ------------------------------ Object handles ---------------------------- */

/// Default connection handle
pub const MQHC_DEF_HCONN: MqLong = 0;
/// Unusable connection handle
pub const MQHC_UNUSABLE_HCONN: MqLong = -1;
/// Unusable object handle
pub const MQHO_UNUSABLE_HOBJ: MqLong = -1;
/// No object handle
pub const MQHO_NONE: MqLong = 0;

/* ------------------------------ Open options ------------------------------ */

/// Open to get messages using queue-defined default
pub const MQOO_INPUT_AS_Q_DEF: MqLong = 0x0000_0001;
/// Open to get messages with shared access
pub const MQOO_INPUT_SHARED: MqLong = 0x0000_0002;
/// Open to get messages with exclusive access
pub const MQOO_INPUT_EXCLUSIVE: MqLong = 0x0000_0004;
/// Open to browse messages
pub const MQOO_BROWSE: MqLong = 0x0000_0008;
/// Open to put messages
pub const MQOO_OUTPUT: MqLong = 0x0000_0010;
/// Open for inquiry
pub const MQOO_INQUIRE: MqLong = 0x0000_0020;
/// Open to set attributes
pub const MQOO_SET: MqLong = 0x0000_0040;
/// Save context when message retrieved
pub const MQOO_SAVE_ALL_CONTEXT: MqLong = 0x0000_0080;
/// Allow identity context to be passed
pub const MQOO_PASS_IDENTITY_CONTEXT: MqLong = 0x0000_0100;
/// Allow all context to be passed
pub const MQOO_PASS_ALL_CONTEXT: MqLong = 0x0000_0200;
/// Allow identity context to be set
pub const MQOO_SET_IDENTITY_CONTEXT: MqLong = 0x0000_0400;
/// Allow all context to be set
pub const MQOO_SET_ALL_CONTEXT: MqLong = 0x0000_0800;
/// Validate with specified user identifier
pub const MQOO_ALTERNATE_USER_AUTHORITY: MqLong = 0x0000_1000;
/// Fail if queue manager is quiescing
pub const MQOO_FAIL_IF_QUIESCING: MqLong = 0x0000_2000;
/// Bind handle to destination when queue is opened
pub const MQOO_BIND_ON_OPEN: MqLong = 0x0000_4000;
/// Do not bind to a specific destination
pub const MQOO_BIND_NOT_FIXED: MqLong = 0x0000_8000;
/// Use the binding defined by the queue
pub const MQOO_BIND_AS_Q_DEF: MqLong = 0x0000_0000;

/// Every open option that grants input access
pub const MQOO_INPUT_ANY: MqLong = MQOO_INPUT_AS_Q_DEF | MQOO_INPUT_SHARED | MQOO_INPUT_EXCLUSIVE;

/* ------------------------------ Close options ----------------------------- */

/// No close options
pub const MQCO_NONE: MqLong = 0x0000_0000;
/// Delete a permanent dynamic queue if it is empty
pub const MQCO_DELETE: MqLong = 0x0000_0001;
/// Delete a dynamic queue, purging any messages
pub const MQCO_DELETE_PURGE: MqLong = 0x0000_0002;

/* ---------------------------- Get-message options ------------------------- */

/// Return immediately if no suitable message
pub const MQGMO_NO_WAIT: MqLong = 0x0000_0000;
/// Wait for a message to arrive
pub const MQGMO_WAIT: MqLong = 0x0000_0001;
/// Get message within unit of work
pub const MQGMO_SYNCPOINT: MqLong = 0x0000_0002;
/// Get message outside unit of work
pub const MQGMO_NO_SYNCPOINT: MqLong = 0x0000_0004;
/// Browse from start of queue
pub const MQGMO_BROWSE_FIRST: MqLong = 0x0000_0010;
/// Browse from current position in queue
pub const MQGMO_BROWSE_NEXT: MqLong = 0x0000_0020;
/// Allow truncation of message data
pub const MQGMO_ACCEPT_TRUNCATED_MSG: MqLong = 0x0000_0040;
/// Get message under browse cursor
pub const MQGMO_MSG_UNDER_CURSOR: MqLong = 0x0000_0100;
/// Browse message under browse cursor
pub const MQGMO_BROWSE_MSG_UNDER_CURSOR: MqLong = 0x0000_0800;
/// Fail if queue manager is quiescing
pub const MQGMO_FAIL_IF_QUIESCING: MqLong = 0x0000_2000;
/// Convert message data
pub const MQGMO_CONVERT: MqLong = 0x0000_4000;
/// No get-message options
pub const MQGMO_NONE: MqLong = 0x0000_0000;

/// Every get option that moves or reads at the browse cursor
pub const MQGMO_BROWSE_ANY: MqLong =
    MQGMO_BROWSE_FIRST | MQGMO_BROWSE_NEXT | MQGMO_BROWSE_MSG_UNDER_CURSOR;

/// Unlimited wait interval
pub const MQWI_UNLIMITED: MqLong = -1;

/* ------------------------------ Match options ----------------------------- */

/// No matching required
pub const MQMO_NONE: MqLong = 0x0000_0000;
/// Retrieve message with specified message identifier
pub const MQMO_MATCH_MSG_ID: MqLong = 0x0000_0001;
/// Retrieve message with specified correlation identifier
pub const MQMO_MATCH_CORREL_ID: MqLong = 0x0000_0002;

/* ---------------------------- Put-message options ------------------------- */

/// No put-message options
pub const MQPMO_NONE: MqLong = 0x0000_0000;
/// Put message within unit of work
pub const MQPMO_SYNCPOINT: MqLong = 0x0000_0002;
/// Put message outside unit of work
pub const MQPMO_NO_SYNCPOINT: MqLong = 0x0000_0004;
/// Use default context
pub const MQPMO_DEFAULT_CONTEXT: MqLong = 0x0000_0020;
/// Generate a new message identifier
pub const MQPMO_NEW_MSG_ID: MqLong = 0x0000_0040;
/// Generate a new correlation identifier
pub const MQPMO_NEW_CORREL_ID: MqLong = 0x0000_0080;
/// Pass identity context
pub const MQPMO_PASS_IDENTITY_CONTEXT: MqLong = 0x0000_0100;
/// Pass all context
pub const MQPMO_PASS_ALL_CONTEXT: MqLong = 0x0000_0200;
/// Set identity context
pub const MQPMO_SET_IDENTITY_CONTEXT: MqLong = 0x0000_0400;
/// Set all context
pub const MQPMO_SET_ALL_CONTEXT: MqLong = 0x0000_0800;
/// Validate with specified user identifier
pub const MQPMO_ALTERNATE_USER_AUTHORITY: MqLong = 0x0000_1000;
/// Fail if queue manager is quiescing
pub const MQPMO_FAIL_IF_QUIESCING: MqLong = 0x0000_2000;
/// No context is to be associated with the message
pub const MQPMO_NO_CONTEXT: MqLong = 0x0000_4000;

/* ------------------------------ Message types ----------------------------- */

/// Message requiring a reply
pub const MQMT_REQUEST: MqLong = 1;
/// Reply to an earlier request
pub const MQMT_REPLY: MqLong = 2;
/// Report message
pub const MQMT_REPORT: MqLong = 4;
/// Message not requiring a reply
pub const MQMT_DATAGRAM: MqLong = 8;
/// Lowest application-defined message type
pub const MQMT_APPL_FIRST: MqLong = 65536;

/* ----------------------------- Report options ----------------------------- */

/// No reports required
pub const MQRO_NONE: MqLong = 0x0000_0000;
/// Positive action notification
pub const MQRO_PAN: MqLong = 0x0000_0001;
/// Negative action notification
pub const MQRO_NAN: MqLong = 0x0000_0002;
/// Set correlation identifier of the report from the original's correlation identifier
pub const MQRO_PASS_CORREL_ID: MqLong = 0x0000_0040;
/// Pass the message identifier of the original to the report or reply
pub const MQRO_PASS_MSG_ID: MqLong = 0x0000_0080;
/// Confirm on arrival
pub const MQRO_COA: MqLong = 0x0000_0100;
/// Confirm on delivery
pub const MQRO_COD: MqLong = 0x0000_0800;
/// Expiration report
pub const MQRO_EXPIRATION: MqLong = 0x0020_0000;
/// Exception report
pub const MQRO_EXCEPTION: MqLong = 0x0100_0000;
/// Discard message if it cannot be delivered
pub const MQRO_DISCARD_MSG: MqLong = 0x0800_0000;
/// Generate new message identifier for the report (default)
pub const MQRO_NEW_MSG_ID: MqLong = 0x0000_0000;
/// Copy message identifier to correlation identifier (default)
pub const MQRO_COPY_MSG_ID_TO_CORREL_ID: MqLong = 0x0000_0000;

/* -------------------------------- Feedback -------------------------------- */

/// No feedback provided
pub const MQFB_NONE: MqLong = 0;

/* ------------------------------- Persistence ------------------------------ */

/// Message is not persistent
pub const MQPER_NOT_PERSISTENT: MqLong = 0;
/// Message is persistent
pub const MQPER_PERSISTENT: MqLong = 1;
/// Message has default persistence of the queue
pub const MQPER_PERSISTENCE_AS_Q_DEF: MqLong = 2;

/// Priority as queue default
pub const MQPRI_PRIORITY_AS_Q_DEF: MqLong = -1;

/// Unlimited lifetime
pub const MQEI_UNLIMITED: MqLong = -1;

/// Original length not known
pub const MQOL_UNDEFINED: MqLong = -1;

/* -------------------------------- Encodings ------------------------------- */

/// Mask for the integer encoding
pub const MQENC_INTEGER_MASK: MqLong = 0x0000_000f;
/// Big-endian integers
pub const MQENC_INTEGER_NORMAL: MqLong = 0x0000_0001;
/// Little-endian integers
pub const MQENC_INTEGER_REVERSED: MqLong = 0x0000_0002;

/// Native encoding of the running platform
#[cfg(target_endian = "little")]
pub const MQENC_NATIVE: MqLong = 0x0000_0222;
/// Native encoding of the running platform
#[cfg(target_endian = "big")]
pub const MQENC_NATIVE: MqLong = 0x0000_0111;

/// Character set of the queue manager
pub const MQCCSI_Q_MGR: MqLong = 0;
/// Character set is inherited from the preceding structure
pub const MQCCSI_INHERIT: MqLong = -2;
/// UTF-8
pub const MQCCSI_UTF8: MqLong = 1208;

/* ---------------------------------- Formats ------------------------------- */

/// No format name
pub const MQFMT_NONE: &str = "        ";
/// Message consisting entirely of characters
pub const MQFMT_STRING: &str = "MQSTR   ";
/// Dead-letter header
pub const MQFMT_DEAD_LETTER_HEADER: &str = "MQDEAD  ";
/// Rules and formatting header, version 2
pub const MQFMT_RF_HEADER_2: &str = "MQHRF2  ";
/// Transmission queue header
pub const MQFMT_XMIT_Q_HEADER: &str = "MQXMIT  ";
/// Administrative command format
pub const MQFMT_ADMIN: &str = "MQADMIN ";
/// Trigger message
pub const MQFMT_TRIGGER: &str = "MQTRIG  ";

/// Prefix shared by the format names of vendor header structures
pub const MQFMT_HEADER_PREFIX: &str = "MQH";

/* -------------------------------- Identifiers ----------------------------- */

/// No message identifier
pub const MQMI_NONE: [u8; MQ_MSG_ID_LENGTH] = [0; MQ_MSG_ID_LENGTH];
/// No correlation identifier
pub const MQCI_NONE: [u8; MQ_MSG_ID_LENGTH] = [0; MQ_MSG_ID_LENGTH];
/// No group identifier
pub const MQGI_NONE: [u8; MQ_MSG_ID_LENGTH] = [0; MQ_MSG_ID_LENGTH];
/// No accounting token
pub const MQACT_NONE: [u8; MQ_ACCOUNTING_TOKEN_LENGTH] = [0; MQ_ACCOUNTING_TOKEN_LENGTH];
/// No security identifier
pub const MQSID_NONE: [u8; MQ_SECURITY_ID_LENGTH] = [0; MQ_SECURITY_ID_LENGTH];

/* ---------------------------- Application types --------------------------- */

/// No put application type
pub const MQAT_NO_CONTEXT: MqLong = 0;
/// UNIX application
pub const MQAT_UNIX: MqLong = 6;
/// Queue manager
pub const MQAT_QMGR: MqLong = 7;

/* ------------------------------- Object types ----------------------------- */

/// Queue object
pub const MQOT_Q: MqLong = 1;
/// Queue manager object
pub const MQOT_Q_MGR: MqLong = 5;

/* ------------------------------- Queue types ------------------------------ */

/// Local queue
pub const MQQT_LOCAL: MqLong = 1;
/// Model queue definition
pub const MQQT_MODEL: MqLong = 2;
/// Alias queue definition
pub const MQQT_ALIAS: MqLong = 3;
/// Local definition of a remote queue
pub const MQQT_REMOTE: MqLong = 6;
/// Every queue type, used as a filter
pub const MQQT_ALL: MqLong = 1001;

/// Predefined permanent queue
pub const MQQDT_PREDEFINED: MqLong = 1;
/// Dynamically defined permanent queue
pub const MQQDT_PERMANENT_DYNAMIC: MqLong = 2;
/// Dynamically defined temporary queue
pub const MQQDT_TEMPORARY_DYNAMIC: MqLong = 3;

/// Queue is shareable for input
pub const MQQA_SHAREABLE: MqLong = 1;
/// Queue is not shareable for input
pub const MQQA_NOT_SHAREABLE: MqLong = 0;

/// Queue is not get or put inhibited
pub const MQQA_GET_ALLOWED: MqLong = 0;
/// Gets are inhibited
pub const MQQA_GET_INHIBITED: MqLong = 1;
/// Puts are allowed
pub const MQQA_PUT_ALLOWED: MqLong = 0;
/// Puts are inhibited
pub const MQQA_PUT_INHIBITED: MqLong = 1;

/* ----------------------------- Attribute selectors ------------------------ */

/// Current queue depth
pub const MQIA_CURRENT_Q_DEPTH: MqLong = 3;
/// Default input open option
pub const MQIA_DEF_INPUT_OPEN_OPTION: MqLong = 4;
/// Default persistence
pub const MQIA_DEF_PERSISTENCE: MqLong = 5;
/// Default priority
pub const MQIA_DEF_PRIORITY: MqLong = 6;
/// Queue definition type
pub const MQIA_DEFINITION_TYPE: MqLong = 7;
/// Get inhibited
pub const MQIA_INHIBIT_GET: MqLong = 9;
/// Put inhibited
pub const MQIA_INHIBIT_PUT: MqLong = 10;
/// Maximum message length
pub const MQIA_MAX_MSG_LENGTH: MqLong = 13;
/// Maximum queue depth
pub const MQIA_MAX_Q_DEPTH: MqLong = 15;
/// Number of handles open for input
pub const MQIA_OPEN_INPUT_COUNT: MqLong = 17;
/// Number of handles open for output
pub const MQIA_OPEN_OUTPUT_COUNT: MqLong = 18;
/// Queue type
pub const MQIA_Q_TYPE: MqLong = 20;
/// Shareability
pub const MQIA_SHAREABILITY: MqLong = 23;
/// Queue description
pub const MQCA_Q_DESC: MqLong = 2013;
/// Queue name
pub const MQCA_Q_NAME: MqLong = 2016;

/* ------------------------------ Connect options --------------------------- */

/// No connect options
pub const MQCNO_NONE: MqLong = 0x0000_0000;
/// Standard binding
pub const MQCNO_STANDARD_BINDING: MqLong = 0x0000_0000;
/// Fastpath binding
pub const MQCNO_FASTPATH_BINDING: MqLong = 0x0000_0001;
/// Shared binding
pub const MQCNO_SHARED_BINDING: MqLong = 0x0000_0100;
/// Isolated binding
pub const MQCNO_ISOLATED_BINDING: MqLong = 0x0000_0200;
/// Enable MQI accounting
pub const MQCNO_ACCOUNTING_MQI_ENABLED: MqLong = 0x0000_1000;
/// Disable MQI accounting
pub const MQCNO_ACCOUNTING_MQI_DISABLED: MqLong = 0x0000_2000;
/// Enable queue accounting
pub const MQCNO_ACCOUNTING_Q_ENABLED: MqLong = 0x0000_4000;
/// Disable queue accounting
pub const MQCNO_ACCOUNTING_Q_DISABLED: MqLong = 0x0000_8000;

/* ------------------------------ Transport types --------------------------- */

/// Local transport
pub const MQXPT_LOCAL: MqLong = 0;
/// LU 6.2 transport
pub const MQXPT_LU62: MqLong = 1;
/// TCP/IP transport
pub const MQXPT_TCP: MqLong = 2;
/// NetBIOS transport
pub const MQXPT_NETBIOS: MqLong = 3;
/// SPX transport
pub const MQXPT_SPX: MqLong = 4;
/// DECnet transport
pub const MQXPT_DECNET: MqLong = 5;
/// UDP transport
pub const MQXPT_UDP: MqLong = 6;

/* ------------------------------- Administration ---------------------------- */

/// Escape type: MQSC command text
pub const MQET_MQSC: MqLong = 1;
/// Clear queue command
pub const MQCMD_CLEAR_Q: MqLong = 9;
/// Inquire queue names command
pub const MQCMD_INQUIRE_Q_NAMES: MqLong = 18;
/// Escape command
pub const MQCMD_ESCAPE: MqLong = 38;
/// Ping queue manager command
pub const MQCMD_PING_Q_MGR: MqLong = 40;

/// Well-known name of the default server-connection channel
pub const DEFAULT_CHANNEL_NAME: &str = "SYSTEM.DEF.SVRCONN";
/// Well-known name of the administrative dead-letter queue
pub const DEFAULT_DEAD_LETTER_Q_NAME: &str = "SYSTEM.DEAD.LETTER.QUEUE";
