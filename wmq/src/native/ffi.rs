//! C layouts and entry points of the vendor library

use std::{
    ffi::{c_char, c_void},
    ptr,
};

use wmq_types::constants::{
    MqLong, MQ_CHANNEL_NAME_LENGTH, MQ_CONN_NAME_LENGTH, MQ_Q_MGR_NAME_LENGTH, MQ_Q_NAME_LENGTH,
    MQ_SECURITY_ID_LENGTH, MQ_USER_ID_LENGTH,
};

pub type MqHconn = MqLong;
pub type MqHobj = MqLong;
pub type MqHbag = MqLong;

pub const MQ_EXIT_NAME_LENGTH: usize = 128;
pub const MQ_EXIT_DATA_LENGTH: usize = 32;
pub const MQ_Q_DESC_LENGTH: usize = 64;
pub const MQ_CONN_TAG_LENGTH: usize = 128;
pub const MQ_CONNECTION_ID_LENGTH: usize = 24;
pub const MQ_SSL_CIPHER_SPEC_LENGTH: usize = 32;
pub const MQ_SSL_KEY_REPOSITORY_LENGTH: usize = 256;
pub const MQ_SSL_CRYPTO_HARDWARE_LENGTH: usize = 256;
pub const MQ_LOCAL_ADDRESS_LENGTH: usize = 48;

pub const MQCNO_VERSION_5: MqLong = 5;
pub const MQOD_VERSION_3: MqLong = 3;
pub const MQGMO_VERSION_2: MqLong = 2;
pub const MQPMO_VERSION_1: MqLong = 1;
pub const MQCD_VERSION_7: MqLong = 7;
pub const MQSCO_VERSION_1: MqLong = 1;
pub const MQCSP_VERSION_1: MqLong = 1;

pub const MQCHT_CLNTCONN: MqLong = 6;
pub const MQCSP_AUTH_NONE: MqLong = 0;
pub const MQCSP_AUTH_USER_ID_AND_PWD: MqLong = 1;
pub const MQKAI_AUTO: MqLong = -1;

pub const MQCBO_ADMIN_BAG: MqLong = 0x0000_0001;
pub const MQHB_UNUSABLE_HBAG: MqHbag = -1;
pub const MQHB_NONE: MqHbag = -2;
pub const MQHA_BAG_HANDLE: MqLong = 4001;
pub const MQIACF_ESCAPE_TYPE: MqLong = 1017;
pub const MQCACF_Q_NAMES: MqLong = 3011;
pub const MQCACF_ESCAPE_TEXT: MqLong = 3014;

/// Blank-padded character field
pub fn chars<const N: usize>(value: &str) -> [u8; N] {
    let mut field = [b' '; N];
    for (slot, byte) in field.iter_mut().zip(value.bytes()) {
        *slot = byte;
    }
    field
}

/// Zero-padded byte field
pub fn padded<const N: usize>(value: &[u8]) -> [u8; N] {
    let mut field = [0u8; N];
    for (slot, byte) in field.iter_mut().zip(value) {
        *slot = *byte;
    }
    field
}

/// Text of a character field up to the first blank padding or NUL
pub fn text(field: &[u8]) -> String {
    let end = field.iter().position(|b| *b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end])
        .trim_end_matches(' ')
        .to_string()
}

/// `MQCNO` up to version 5
#[repr(C)]
pub struct Mqcno {
    pub struc_id: [u8; 4],
    pub version: MqLong,
    pub options: MqLong,
    pub client_conn_offset: MqLong,
    pub client_conn_ptr: *mut c_void,
    pub conn_tag: [u8; MQ_CONN_TAG_LENGTH],
    pub ssl_config_ptr: *mut Mqsco,
    pub ssl_config_offset: MqLong,
    pub connection_id: [u8; MQ_CONNECTION_ID_LENGTH],
    pub security_parms_offset: MqLong,
    pub security_parms_ptr: *mut Mqcsp,
}

impl Default for Mqcno {
    fn default() -> Self {
        Self {
            struc_id: *b"CNO ",
            version: MQCNO_VERSION_5,
            options: 0,
            client_conn_offset: 0,
            client_conn_ptr: ptr::null_mut(),
            conn_tag: [0; MQ_CONN_TAG_LENGTH],
            ssl_config_ptr: ptr::null_mut(),
            ssl_config_offset: 0,
            connection_id: [0; MQ_CONNECTION_ID_LENGTH],
            security_parms_offset: 0,
            security_parms_ptr: ptr::null_mut(),
        }
    }
}

/// `MQSCO` version 1
#[repr(C)]
pub struct Mqsco {
    pub struc_id: [u8; 4],
    pub version: MqLong,
    pub key_repository: [u8; MQ_SSL_KEY_REPOSITORY_LENGTH],
    pub crypto_hardware: [u8; MQ_SSL_CRYPTO_HARDWARE_LENGTH],
    pub auth_info_rec_count: MqLong,
    pub auth_info_rec_offset: MqLong,
    pub auth_info_rec_ptr: *mut c_void,
}

impl Default for Mqsco {
    fn default() -> Self {
        Self {
            struc_id: *b"SCO ",
            version: MQSCO_VERSION_1,
            key_repository: [b' '; MQ_SSL_KEY_REPOSITORY_LENGTH],
            crypto_hardware: [b' '; MQ_SSL_CRYPTO_HARDWARE_LENGTH],
            auth_info_rec_count: 0,
            auth_info_rec_offset: 0,
            auth_info_rec_ptr: ptr::null_mut(),
        }
    }
}

/// `MQCSP` version 1
#[repr(C)]
pub struct Mqcsp {
    pub struc_id: [u8; 4],
    pub version: MqLong,
    pub authentication_type: MqLong,
    pub reserved1: [u8; 4],
    pub user_id_ptr: *mut c_void,
    pub user_id_offset: MqLong,
    pub user_id_length: MqLong,
    pub reserved2: [u8; 8],
    pub password_ptr: *mut c_void,
    pub password_offset: MqLong,
    pub password_length: MqLong,
}

impl Default for Mqcsp {
    fn default() -> Self {
        Self {
            struc_id: *b"CSP ",
            version: MQCSP_VERSION_1,
            authentication_type: MQCSP_AUTH_NONE,
            reserved1: [0; 4],
            user_id_ptr: ptr::null_mut(),
            user_id_offset: 0,
            user_id_length: 0,
            reserved2: [0; 8],
            password_ptr: ptr::null_mut(),
            password_offset: 0,
            password_length: 0,
        }
    }
}

/// Client channel definition, `MQCD` up to version 7
#[repr(C)]
pub struct Mqcd {
    pub channel_name: [u8; MQ_CHANNEL_NAME_LENGTH],
    pub version: MqLong,
    pub channel_type: MqLong,
    pub transport_type: MqLong,
    pub desc: [u8; 64],
    pub q_mgr_name: [u8; MQ_Q_MGR_NAME_LENGTH],
    pub xmit_q_name: [u8; MQ_Q_NAME_LENGTH],
    pub short_connection_name: [u8; 20],
    pub mca_name: [u8; 20],
    pub mode_name: [u8; 8],
    pub tp_name: [u8; 64],
    pub batch_size: MqLong,
    pub disc_interval: MqLong,
    pub short_retry_count: MqLong,
    pub short_retry_interval: MqLong,
    pub long_retry_count: MqLong,
    pub long_retry_interval: MqLong,
    pub security_exit: [u8; MQ_EXIT_NAME_LENGTH],
    pub msg_exit: [u8; MQ_EXIT_NAME_LENGTH],
    pub send_exit: [u8; MQ_EXIT_NAME_LENGTH],
    pub receive_exit: [u8; MQ_EXIT_NAME_LENGTH],
    pub seq_number_wrap: MqLong,
    pub max_msg_length: MqLong,
    pub put_authority: MqLong,
    pub data_conversion: MqLong,
    pub security_user_data: [u8; MQ_EXIT_DATA_LENGTH],
    pub msg_user_data: [u8; MQ_EXIT_DATA_LENGTH],
    pub send_user_data: [u8; MQ_EXIT_DATA_LENGTH],
    pub receive_user_data: [u8; MQ_EXIT_DATA_LENGTH],
    // Version 2
    pub user_identifier: [u8; MQ_USER_ID_LENGTH],
    pub password: [u8; MQ_USER_ID_LENGTH],
    pub mca_user_identifier: [u8; MQ_USER_ID_LENGTH],
    pub mca_type: MqLong,
    pub connection_name: [u8; MQ_CONN_NAME_LENGTH],
    pub remote_user_identifier: [u8; MQ_USER_ID_LENGTH],
    pub remote_password: [u8; MQ_USER_ID_LENGTH],
    // Version 3
    pub msg_retry_exit: [u8; MQ_EXIT_NAME_LENGTH],
    pub msg_retry_user_data: [u8; MQ_EXIT_DATA_LENGTH],
    pub msg_retry_count: MqLong,
    pub msg_retry_interval: MqLong,
    // Version 4
    pub heartbeat_interval: MqLong,
    pub batch_interval: MqLong,
    pub non_persistent_msg_speed: MqLong,
    pub struc_length: MqLong,
    pub exit_name_length: MqLong,
    pub exit_data_length: MqLong,
    pub msg_exits_defined: MqLong,
    pub send_exits_defined: MqLong,
    pub receive_exits_defined: MqLong,
    pub msg_exit_ptr: *mut c_void,
    pub msg_user_data_ptr: *mut c_void,
    pub send_exit_ptr: *mut c_void,
    pub send_user_data_ptr: *mut c_void,
    pub receive_exit_ptr: *mut c_void,
    pub receive_user_data_ptr: *mut c_void,
    // Version 5
    pub cluster_ptr: *mut c_void,
    pub clusters_defined: MqLong,
    pub network_priority: MqLong,
    // Version 6
    pub long_mca_user_id_length: MqLong,
    pub long_remote_user_id_length: MqLong,
    pub long_mca_user_id_ptr: *mut c_void,
    pub long_remote_user_id_ptr: *mut c_void,
    pub mca_security_id: [u8; MQ_SECURITY_ID_LENGTH],
    pub remote_security_id: [u8; MQ_SECURITY_ID_LENGTH],
    // Version 7
    pub ssl_cipher_spec: [u8; MQ_SSL_CIPHER_SPEC_LENGTH],
    pub ssl_peer_name_ptr: *mut c_void,
    pub ssl_peer_name_length: MqLong,
    pub ssl_client_auth: MqLong,
    pub keep_alive_interval: MqLong,
    pub local_address: [u8; MQ_LOCAL_ADDRESS_LENGTH],
    pub batch_heartbeat: MqLong,
}

impl Default for Mqcd {
    fn default() -> Self {
        Self {
            channel_name: [b' '; MQ_CHANNEL_NAME_LENGTH],
            version: MQCD_VERSION_7,
            channel_type: MQCHT_CLNTCONN,
            transport_type: 2,
            desc: [b' '; 64],
            q_mgr_name: [b' '; MQ_Q_MGR_NAME_LENGTH],
            xmit_q_name: [b' '; MQ_Q_NAME_LENGTH],
            short_connection_name: [b' '; 20],
            mca_name: [b' '; 20],
            mode_name: [b' '; 8],
            tp_name: [b' '; 64],
            batch_size: 50,
            disc_interval: 6000,
            short_retry_count: 10,
            short_retry_interval: 60,
            long_retry_count: 999_999_999,
            long_retry_interval: 1200,
            security_exit: [b' '; MQ_EXIT_NAME_LENGTH],
            msg_exit: [b' '; MQ_EXIT_NAME_LENGTH],
            send_exit: [b' '; MQ_EXIT_NAME_LENGTH],
            receive_exit: [b' '; MQ_EXIT_NAME_LENGTH],
            seq_number_wrap: 999_999_999,
            max_msg_length: 4_194_304,
            put_authority: 1,
            data_conversion: 0,
            security_user_data: [b' '; MQ_EXIT_DATA_LENGTH],
            msg_user_data: [b' '; MQ_EXIT_DATA_LENGTH],
            send_user_data: [b' '; MQ_EXIT_DATA_LENGTH],
            receive_user_data: [b' '; MQ_EXIT_DATA_LENGTH],
            user_identifier: [b' '; MQ_USER_ID_LENGTH],
            password: [b' '; MQ_USER_ID_LENGTH],
            mca_user_identifier: [b' '; MQ_USER_ID_LENGTH],
            mca_type: 1,
            connection_name: [b' '; MQ_CONN_NAME_LENGTH],
            remote_user_identifier: [b' '; MQ_USER_ID_LENGTH],
            remote_password: [b' '; MQ_USER_ID_LENGTH],
            msg_retry_exit: [b' '; MQ_EXIT_NAME_LENGTH],
            msg_retry_user_data: [b' '; MQ_EXIT_DATA_LENGTH],
            msg_retry_count: 10,
            msg_retry_interval: 1000,
            heartbeat_interval: 300,
            batch_interval: 0,
            non_persistent_msg_speed: 2,
            struc_length: MqLong::try_from(std::mem::size_of::<Mqcd>()).unwrap_or(0),
            exit_name_length: MQ_EXIT_NAME_LENGTH as MqLong,
            exit_data_length: MQ_EXIT_DATA_LENGTH as MqLong,
            msg_exits_defined: 0,
            send_exits_defined: 0,
            receive_exits_defined: 0,
            msg_exit_ptr: ptr::null_mut(),
            msg_user_data_ptr: ptr::null_mut(),
            send_exit_ptr: ptr::null_mut(),
            send_user_data_ptr: ptr::null_mut(),
            receive_exit_ptr: ptr::null_mut(),
            receive_user_data_ptr: ptr::null_mut(),
            cluster_ptr: ptr::null_mut(),
            clusters_defined: 0,
            network_priority: 0,
            long_mca_user_id_length: 0,
            long_remote_user_id_length: 0,
            long_mca_user_id_ptr: ptr::null_mut(),
            long_remote_user_id_ptr: ptr::null_mut(),
            mca_security_id: [0; MQ_SECURITY_ID_LENGTH],
            remote_security_id: [0; MQ_SECURITY_ID_LENGTH],
            ssl_cipher_spec: [b' '; MQ_SSL_CIPHER_SPEC_LENGTH],
            ssl_peer_name_ptr: ptr::null_mut(),
            ssl_peer_name_length: 0,
            ssl_client_auth: 0,
            keep_alive_interval: MQKAI_AUTO,
            local_address: [b' '; MQ_LOCAL_ADDRESS_LENGTH],
            batch_heartbeat: 0,
        }
    }
}

/// `MQOD` version 3
#[repr(C)]
pub struct Mqod {
    pub struc_id: [u8; 4],
    pub version: MqLong,
    pub object_type: MqLong,
    pub object_name: [u8; MQ_Q_NAME_LENGTH],
    pub object_q_mgr_name: [u8; MQ_Q_MGR_NAME_LENGTH],
    pub dynamic_q_name: [u8; MQ_Q_NAME_LENGTH],
    pub alternate_user_id: [u8; MQ_USER_ID_LENGTH],
    pub recs_present: MqLong,
    pub known_dest_count: MqLong,
    pub unknown_dest_count: MqLong,
    pub invalid_dest_count: MqLong,
    pub object_rec_offset: MqLong,
    pub response_rec_offset: MqLong,
    pub object_rec_ptr: *mut c_void,
    pub response_rec_ptr: *mut c_void,
    pub alternate_security_id: [u8; MQ_SECURITY_ID_LENGTH],
    pub resolved_q_name: [u8; MQ_Q_NAME_LENGTH],
    pub resolved_q_mgr_name: [u8; MQ_Q_MGR_NAME_LENGTH],
}

/// `MQGMO` version 2
#[repr(C)]
pub struct Mqgmo {
    pub struc_id: [u8; 4],
    pub version: MqLong,
    pub options: MqLong,
    pub wait_interval: MqLong,
    pub signal1: MqLong,
    pub signal2: MqLong,
    pub resolved_q_name: [u8; MQ_Q_NAME_LENGTH],
    pub match_options: MqLong,
    pub group_status: u8,
    pub segment_status: u8,
    pub segmentation: u8,
    pub reserved1: u8,
}

/// `MQPMO` version 1
#[repr(C)]
pub struct Mqpmo {
    pub struc_id: [u8; 4],
    pub version: MqLong,
    pub options: MqLong,
    pub timeout: MqLong,
    pub context: MqHobj,
    pub known_dest_count: MqLong,
    pub unknown_dest_count: MqLong,
    pub invalid_dest_count: MqLong,
    pub resolved_q_name: [u8; MQ_Q_NAME_LENGTH],
    pub resolved_q_mgr_name: [u8; MQ_Q_MGR_NAME_LENGTH],
}

/// `MQBO` version 1
#[repr(C)]
pub struct Mqbo {
    pub struc_id: [u8; 4],
    pub version: MqLong,
    pub options: MqLong,
}

impl Default for Mqbo {
    fn default() -> Self {
        Self {
            struc_id: *b"BO  ",
            version: 1,
            options: 0,
        }
    }
}

/// `MQMD` version 2 image, aligned for the integer fields
#[repr(C, align(4))]
pub struct MdImage(pub [u8; wmq_types::descriptor::MQMD_LENGTH_2]);

pub type MqConnx =
    unsafe extern "C" fn(*mut c_char, *mut Mqcno, *mut MqHconn, *mut MqLong, *mut MqLong);
pub type MqDisc = unsafe extern "C" fn(*mut MqHconn, *mut MqLong, *mut MqLong);
pub type MqOpen =
    unsafe extern "C" fn(MqHconn, *mut Mqod, MqLong, *mut MqHobj, *mut MqLong, *mut MqLong);
pub type MqClose = unsafe extern "C" fn(MqHconn, *mut MqHobj, MqLong, *mut MqLong, *mut MqLong);
pub type MqPut = unsafe extern "C" fn(
    MqHconn,
    MqHobj,
    *mut c_void,
    *mut Mqpmo,
    MqLong,
    *mut c_void,
    *mut MqLong,
    *mut MqLong,
);
pub type MqPut1 = unsafe extern "C" fn(
    MqHconn,
    *mut Mqod,
    *mut c_void,
    *mut Mqpmo,
    MqLong,
    *mut c_void,
    *mut MqLong,
    *mut MqLong,
);
pub type MqGet = unsafe extern "C" fn(
    MqHconn,
    MqHobj,
    *mut c_void,
    *mut Mqgmo,
    MqLong,
    *mut c_void,
    *mut MqLong,
    *mut MqLong,
    *mut MqLong,
);
pub type MqInq = unsafe extern "C" fn(
    MqHconn,
    MqHobj,
    MqLong,
    *mut MqLong,
    MqLong,
    *mut MqLong,
    MqLong,
    *mut c_char,
    *mut MqLong,
    *mut MqLong,
);
pub type MqBegin = unsafe extern "C" fn(MqHconn, *mut Mqbo, *mut MqLong, *mut MqLong);
pub type MqSync = unsafe extern "C" fn(MqHconn, *mut MqLong, *mut MqLong);

pub type MqCreateBag = unsafe extern "C" fn(MqLong, *mut MqHbag, *mut MqLong, *mut MqLong);
pub type MqDeleteBag = unsafe extern "C" fn(*mut MqHbag, *mut MqLong, *mut MqLong);
pub type MqAddInteger = unsafe extern "C" fn(MqHbag, MqLong, MqLong, *mut MqLong, *mut MqLong);
pub type MqAddString =
    unsafe extern "C" fn(MqHbag, MqLong, MqLong, *mut c_char, *mut MqLong, *mut MqLong);
pub type MqExecute = unsafe extern "C" fn(
    MqHconn,
    MqLong,
    MqHbag,
    MqHbag,
    MqHbag,
    MqHobj,
    MqHobj,
    *mut MqLong,
    *mut MqLong,
);
pub type MqCountItems =
    unsafe extern "C" fn(MqHbag, MqLong, *mut MqLong, *mut MqLong, *mut MqLong);
pub type MqInquireBag =
    unsafe extern "C" fn(MqHbag, MqLong, MqLong, *mut MqHbag, *mut MqLong, *mut MqLong);
pub type MqInquireString = unsafe extern "C" fn(
    MqHbag,
    MqLong,
    MqLong,
    MqLong,
    *mut c_char,
    *mut MqLong,
    *mut MqLong,
    *mut MqLong,
    *mut MqLong,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_fields() {
        let field: [u8; 8] = chars("QM1");
        assert_eq!(&field, b"QM1     ");
        assert_eq!(text(&field), "QM1");
        assert_eq!(text(b"APP.Q\0\0\0"), "APP.Q");

        let id: [u8; 4] = padded(b"ab");
        assert_eq!(id, [b'a', b'b', 0, 0]);
    }

    #[test]
    fn fixed_layouts() {
        assert_eq!(std::mem::size_of::<MdImage>(), 364);
        assert_eq!(std::mem::size_of::<Mqpmo>(), 128);
        assert_eq!(std::mem::size_of::<Mqgmo>(), 80);
        assert_eq!(std::mem::size_of::<Mqbo>(), 12);
    }
}
