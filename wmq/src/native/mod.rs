//! Runtime-loaded vendor library
//!
//! [`NativeMqi`] loads the server library (`libmqm_r`) or the client library
//! (`libmqic_r`) when it is created and forwards every [`Mqi`] call to the
//! entry points it resolved. Nothing is linked at build time, so the crate
//! builds on hosts without the vendor installation.
//!
//! ```rust,no_run
//! use wmq::{native::NativeMqi, QueueManager};
//!
//! let builder = QueueManager::<NativeMqi>::builder()
//!     .q_mgr_name("QM1")
//!     .connection_name("localhost(1414)");
//! let mqi = NativeMqi::for_builder(&builder)?;
//! let mut qmgr = builder.connect(mqi)?;
//! qmgr.disconnect()?;
//! # Ok::<_, wmq::Error>(())
//! ```

use std::{
    ffi::{c_void, OsStr},
    fmt, ptr,
};

use libloading::Library;
use wmq_types::{
    constants::{
        MqLong, MQCA_Q_NAME, MQHO_NONE, MQIA_Q_TYPE, MQ_Q_MGR_NAME_LENGTH, MQ_Q_NAME_LENGTH,
    },
    descriptor::MQMD_LENGTH_2,
    options::{
        AttributeValue, ChannelDefinition, ConnectOptions, GetOptions, ObjectDescriptor,
        PutOptions, Selector, SslConfiguration,
    },
    CompletionCode, MessageDescriptor, ReasonCode,
};

use crate::{
    command::{Command, ParameterValue, Parameters, ESCAPE_TEXT, Q_NAMES},
    connection::Builder,
    error::Error,
    mqi::{Hconn, Hobj, Mqi, Status},
};

mod ffi;

type Outcome<T> = Result<T, Status>;

#[cfg(target_os = "windows")]
const SERVER_LIBRARY: &str = "mqm.dll";
#[cfg(target_os = "windows")]
const CLIENT_LIBRARY: &str = "mqic.dll";

#[cfg(target_os = "macos")]
const SERVER_LIBRARY: &str = "libmqm_r.dylib";
#[cfg(target_os = "macos")]
const CLIENT_LIBRARY: &str = "libmqic_r.dylib";

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const SERVER_LIBRARY: &str = "libmqm_r.so";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const CLIENT_LIBRARY: &str = "libmqic_r.so";

const STRING_BUFFER_LENGTH: usize = 256;

/// Which vendor library to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryKind {
    /// Server bindings, for a queue manager on the same host
    Server,

    /// Client bindings, connecting over a channel
    Client,
}

impl LibraryKind {
    /// Client bindings when any client channel field is set on the builder
    pub fn for_builder(builder: &Builder) -> Self {
        if builder.is_client() {
            LibraryKind::Client
        } else {
            LibraryKind::Server
        }
    }

    /// Client bindings when the options carry a channel definition
    pub fn for_options(options: &ConnectOptions) -> Self {
        if options.is_client() {
            LibraryKind::Client
        } else {
            LibraryKind::Server
        }
    }

    /// File name of the library on this platform
    pub fn library_name(&self) -> &'static str {
        match self {
            LibraryKind::Server => SERVER_LIBRARY,
            LibraryKind::Client => CLIENT_LIBRARY,
        }
    }
}

#[derive(Clone, Copy)]
struct Entries {
    connx: ffi::MqConnx,
    disc: ffi::MqDisc,
    open: ffi::MqOpen,
    close: ffi::MqClose,
    put: ffi::MqPut,
    put1: ffi::MqPut1,
    get: ffi::MqGet,
    inq: ffi::MqInq,
    begin: ffi::MqBegin,
    cmit: ffi::MqSync,
    back: ffi::MqSync,
    create_bag: ffi::MqCreateBag,
    delete_bag: ffi::MqDeleteBag,
    add_integer: ffi::MqAddInteger,
    add_string: ffi::MqAddString,
    execute: ffi::MqExecute,
    count_items: ffi::MqCountItems,
    inquire_bag: ffi::MqInquireBag,
    inquire_string: ffi::MqInquireString,
}

impl Entries {
    fn resolve(library: &Library, path: &str) -> Result<Self, Error> {
        Ok(Self {
            connx: symbol(library, path, "MQCONNX")?,
            disc: symbol(library, path, "MQDISC")?,
            open: symbol(library, path, "MQOPEN")?,
            close: symbol(library, path, "MQCLOSE")?,
            put: symbol(library, path, "MQPUT")?,
            put1: symbol(library, path, "MQPUT1")?,
            get: symbol(library, path, "MQGET")?,
            inq: symbol(library, path, "MQINQ")?,
            begin: symbol(library, path, "MQBEGIN")?,
            cmit: symbol(library, path, "MQCMIT")?,
            back: symbol(library, path, "MQBACK")?,
            create_bag: symbol(library, path, "mqCreateBag")?,
            delete_bag: symbol(library, path, "mqDeleteBag")?,
            add_integer: symbol(library, path, "mqAddInteger")?,
            add_string: symbol(library, path, "mqAddString")?,
            execute: symbol(library, path, "mqExecute")?,
            count_items: symbol(library, path, "mqCountItems")?,
            inquire_bag: symbol(library, path, "mqInquireBag")?,
            inquire_string: symbol(library, path, "mqInquireString")?,
        })
    }
}

fn symbol<T: Copy>(library: &Library, path: &str, name: &str) -> Result<T, Error> {
    let mut symbol_name = name.as_bytes().to_vec();
    symbol_name.push(0);
    // SAFETY: `T` is the documented signature of the entry point and the
    // pointer is only called while `library` is loaded
    let symbol = unsafe { library.get::<T>(&symbol_name) }
        .map_err(|err| Error::Config(format!("{} not found in {}: {}", name, path, err)))?;
    Ok(*symbol)
}

/// [`Mqi`] backed by the vendor library loaded at runtime
pub struct NativeMqi {
    path: String,
    entries: Entries,
    _library: Library,
}

impl fmt::Debug for NativeMqi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeMqi").field("path", &self.path).finish()
    }
}

impl NativeMqi {
    /// Loads the server or client library by its platform file name
    pub fn load(kind: LibraryKind) -> Result<Self, Error> {
        Self::load_from(kind.library_name())
    }

    /// Loads the library a connection built from `builder` needs
    pub fn for_builder(builder: &Builder) -> Result<Self, Error> {
        Self::load(LibraryKind::for_builder(builder))
    }

    /// Loads the library at `path`, a file name or a full path.
    ///
    /// A library that cannot be loaded, or that lacks one of the entry
    /// points, is reported as [`Error::Config`].
    pub fn load_from(path: impl AsRef<OsStr>) -> Result<Self, Error> {
        let path = path.as_ref().to_string_lossy().into_owned();

        #[cfg(feature = "tracing")]
        tracing::debug!(library = %path, "Loading MQ library");
        #[cfg(feature = "log")]
        log::debug!("Loading MQ library {}", path);

        // SAFETY: loading runs the library initialisers, which the vendor
        // library allows from any thread
        let library = unsafe { Library::new(&path) }
            .map_err(|err| Error::Config(format!("Cannot load MQ library {}: {}", path, err)))?;
        let entries = Entries::resolve(&library, &path)?;
        Ok(Self {
            path,
            entries,
            _library: library,
        })
    }

    /// The path the library was loaded from
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn status(completion: MqLong, reason: MqLong) -> Status {
    Status {
        completion: CompletionCode::from_raw(completion),
        reason: ReasonCode(reason),
    }
}

fn outcome(result: Outcome<Status>) -> Status {
    result.unwrap_or_else(|status| status)
}

fn length(len: usize) -> Outcome<MqLong> {
    MqLong::try_from(len).map_err(|_| Status::failed(ReasonCode::DATA_LENGTH_ERROR))
}

fn md_image(md: &MessageDescriptor) -> ffi::MdImage {
    let mut image = ffi::MdImage([0; MQMD_LENGTH_2]);
    let mut buf = &mut image.0[..];
    md.encode(&mut buf);
    image
}

fn md_restore(md: &mut MessageDescriptor, image: &ffi::MdImage) {
    if let Ok((decoded, _)) = MessageDescriptor::decode(&image.0) {
        *md = decoded;
    }
}

fn od_image(od: &ObjectDescriptor) -> ffi::Mqod {
    ffi::Mqod {
        struc_id: *b"OD  ",
        version: ffi::MQOD_VERSION_3,
        object_type: od.object_type,
        object_name: ffi::chars(&od.object_name),
        object_q_mgr_name: ffi::chars(&od.object_q_mgr_name),
        dynamic_q_name: ffi::chars(&od.dynamic_q_name),
        alternate_user_id: ffi::chars(&od.alternate_user_id),
        recs_present: 0,
        known_dest_count: 0,
        unknown_dest_count: 0,
        invalid_dest_count: 0,
        object_rec_offset: 0,
        response_rec_offset: 0,
        object_rec_ptr: ptr::null_mut(),
        response_rec_ptr: ptr::null_mut(),
        alternate_security_id: ffi::padded(&od.alternate_security_id),
        resolved_q_name: ffi::chars(""),
        resolved_q_mgr_name: ffi::chars(""),
    }
}

fn od_restore(od: &mut ObjectDescriptor, image: &ffi::Mqod) {
    od.object_name = ffi::text(&image.object_name);
    od.object_q_mgr_name = ffi::text(&image.object_q_mgr_name);
    od.resolved_q_name = ffi::text(&image.resolved_q_name);
    od.resolved_q_mgr_name = ffi::text(&image.resolved_q_mgr_name);
}

fn pmo_image(pmo: &PutOptions) -> ffi::Mqpmo {
    ffi::Mqpmo {
        struc_id: *b"PMO ",
        version: ffi::MQPMO_VERSION_1,
        options: pmo.options,
        timeout: -1,
        context: MQHO_NONE,
        known_dest_count: 0,
        unknown_dest_count: 0,
        invalid_dest_count: 0,
        resolved_q_name: ffi::chars(""),
        resolved_q_mgr_name: ffi::chars(""),
    }
}

fn pmo_restore(pmo: &mut PutOptions, image: &ffi::Mqpmo) {
    pmo.resolved_q_name = ffi::text(&image.resolved_q_name);
    pmo.resolved_q_mgr_name = ffi::text(&image.resolved_q_mgr_name);
}

fn char_attr_length(selector: Selector) -> usize {
    match selector {
        Selector::QDesc => ffi::MQ_Q_DESC_LENGTH,
        _ => MQ_Q_NAME_LENGTH,
    }
}

/// Channel definition with the buffers its pointer fields refer to
struct ChannelImage {
    cd: ffi::Mqcd,
    _peer_name: Vec<u8>,
    _long_remote_user_id: Vec<u8>,
}

impl ChannelImage {
    fn new(definition: &ChannelDefinition) -> Outcome<Self> {
        let mut cd = ffi::Mqcd {
            channel_name: ffi::chars(&definition.channel_name),
            connection_name: ffi::chars(&definition.connection_name),
            transport_type: definition.transport_type.as_raw(),
            ..Default::default()
        };
        if let Some(value) = definition.max_msg_length {
            cd.max_msg_length = value;
        }
        if let Some(value) = definition.heartbeat_interval {
            cd.heartbeat_interval = value;
        }
        if let Some(value) = definition.keep_alive_interval {
            cd.keep_alive_interval = value;
        }
        if let Some(value) = &definition.security_exit {
            cd.security_exit = ffi::chars(value);
        }
        if let Some(value) = &definition.send_exit {
            cd.send_exit = ffi::chars(value);
        }
        if let Some(value) = &definition.receive_exit {
            cd.receive_exit = ffi::chars(value);
        }
        if let Some(value) = &definition.security_user_data {
            cd.security_user_data = ffi::chars(value);
        }
        if let Some(value) = &definition.send_user_data {
            cd.send_user_data = ffi::chars(value);
        }
        if let Some(value) = &definition.receive_user_data {
            cd.receive_user_data = ffi::chars(value);
        }
        if let Some(value) = &definition.remote_security_id {
            cd.remote_security_id = ffi::padded(value.as_bytes());
        }
        if let Some(value) = &definition.ssl_cipher_spec {
            cd.ssl_cipher_spec = ffi::chars(value);
        }
        if let Some(value) = &definition.mode_name {
            cd.mode_name = ffi::chars(value);
        }
        if let Some(value) = &definition.tp_name {
            cd.tp_name = ffi::chars(value);
        }
        if let Some(value) = &definition.user_identifier {
            cd.user_identifier = ffi::chars(value);
        }
        if let Some(value) = &definition.password {
            cd.password = ffi::chars(value);
        }

        let mut peer_name = definition
            .ssl_peer_name
            .clone()
            .unwrap_or_default()
            .into_bytes();
        if !peer_name.is_empty() {
            cd.ssl_peer_name_length = length(peer_name.len())?;
            cd.ssl_peer_name_ptr = peer_name.as_mut_ptr().cast();
        }
        let mut long_remote_user_id = definition
            .long_remote_user_id
            .clone()
            .unwrap_or_default()
            .into_bytes();
        if !long_remote_user_id.is_empty() {
            cd.long_remote_user_id_length = length(long_remote_user_id.len())?;
            cd.long_remote_user_id_ptr = long_remote_user_id.as_mut_ptr().cast();
        }

        Ok(Self {
            cd,
            _peer_name: peer_name,
            _long_remote_user_id: long_remote_user_id,
        })
    }
}

/// Security parameters with the buffers its pointer fields refer to
struct Credentials {
    csp: ffi::Mqcsp,
    _user: Vec<u8>,
    _password: Vec<u8>,
}

impl Credentials {
    fn new(definition: &ChannelDefinition) -> Outcome<Option<Self>> {
        let (user, password) = match (&definition.user_identifier, &definition.password) {
            (Some(user), Some(password)) => (user, password),
            _ => return Ok(None),
        };
        let mut user = user.clone().into_bytes();
        let mut password = password.clone().into_bytes();
        let csp = ffi::Mqcsp {
            authentication_type: ffi::MQCSP_AUTH_USER_ID_AND_PWD,
            user_id_ptr: user.as_mut_ptr().cast(),
            user_id_length: length(user.len())?,
            password_ptr: password.as_mut_ptr().cast(),
            password_length: length(password.len())?,
            ..Default::default()
        };
        Ok(Some(Self {
            csp,
            _user: user,
            _password: password,
        }))
    }
}

fn sco_image(ssl: &SslConfiguration) -> ffi::Mqsco {
    ffi::Mqsco {
        key_repository: ffi::chars(ssl.key_repository.as_deref().unwrap_or("")),
        crypto_hardware: ffi::chars(ssl.crypto_hardware.as_deref().unwrap_or("")),
        ..Default::default()
    }
}

/// Administration bag created by this process, deleted on drop
struct Bag<'a> {
    handle: ffi::MqHbag,
    entries: &'a Entries,
}

impl<'a> Bag<'a> {
    fn create(entries: &'a Entries) -> Outcome<Self> {
        let mut handle = ffi::MQHB_UNUSABLE_HBAG;
        let (mut cc, mut rc) = (0, 0);
        // SAFETY: every pointer refers to a live local
        unsafe { (entries.create_bag)(ffi::MQCBO_ADMIN_BAG, &mut handle, &mut cc, &mut rc) };
        check(status(cc, rc))?;
        Ok(Self { handle, entries })
    }

    fn add_integer(&self, selector: MqLong, value: MqLong) -> Outcome<()> {
        let (mut cc, mut rc) = (0, 0);
        // SAFETY: every pointer refers to a live local
        unsafe { (self.entries.add_integer)(self.handle, selector, value, &mut cc, &mut rc) };
        check(status(cc, rc)).map(|_| ())
    }

    fn add_string(&self, selector: MqLong, value: &str) -> Outcome<()> {
        let mut buffer = value.as_bytes().to_vec();
        let buffer_length = length(buffer.len())?;
        let (mut cc, mut rc) = (0, 0);
        // SAFETY: `buffer` holds `buffer_length` bytes and outlives the call
        unsafe {
            (self.entries.add_string)(
                self.handle,
                selector,
                buffer_length,
                buffer.as_mut_ptr().cast(),
                &mut cc,
                &mut rc,
            )
        };
        check(status(cc, rc)).map(|_| ())
    }
}

impl Drop for Bag<'_> {
    fn drop(&mut self) {
        let (mut cc, mut rc) = (0, 0);
        // SAFETY: the handle came from `mqCreateBag` and is deleted once
        unsafe { (self.entries.delete_bag)(&mut self.handle, &mut cc, &mut rc) };
    }
}

fn check(status: Status) -> Outcome<Status> {
    if status.is_failed() {
        Err(status)
    } else {
        Ok(status)
    }
}

fn count_items(entries: &Entries, bag: ffi::MqHbag, selector: MqLong) -> Outcome<usize> {
    let mut count = 0;
    let (mut cc, mut rc) = (0, 0);
    // SAFETY: every pointer refers to a live local
    unsafe { (entries.count_items)(bag, selector, &mut count, &mut cc, &mut rc) };
    check(status(cc, rc))?;
    Ok(usize::try_from(count).unwrap_or(0))
}

fn inquire_bag(entries: &Entries, bag: ffi::MqHbag, index: usize) -> Outcome<ffi::MqHbag> {
    let mut nested = ffi::MQHB_UNUSABLE_HBAG;
    let (mut cc, mut rc) = (0, 0);
    // SAFETY: every pointer refers to a live local
    unsafe {
        (entries.inquire_bag)(
            bag,
            ffi::MQHA_BAG_HANDLE,
            length(index)?,
            &mut nested,
            &mut cc,
            &mut rc,
        )
    };
    check(status(cc, rc))?;
    Ok(nested)
}

fn inquire_string(
    entries: &Entries,
    bag: ffi::MqHbag,
    selector: MqLong,
    index: usize,
) -> Outcome<String> {
    let index = length(index)?;
    let mut buffer = vec![0u8; STRING_BUFFER_LENGTH];
    loop {
        let mut string_length = 0;
        let mut ccsid = 0;
        let (mut cc, mut rc) = (0, 0);
        // SAFETY: `buffer` holds the announced number of bytes
        unsafe {
            (entries.inquire_string)(
                bag,
                selector,
                index,
                length(buffer.len())?,
                buffer.as_mut_ptr().cast(),
                &mut string_length,
                &mut ccsid,
                &mut cc,
                &mut rc,
            )
        };
        check(status(cc, rc))?;
        let string_length = usize::try_from(string_length).unwrap_or(0);
        if string_length <= buffer.len() {
            buffer.truncate(string_length);
            return Ok(ffi::text(&buffer));
        }
        buffer.resize(string_length, 0);
    }
}

impl NativeMqi {
    fn connx_inner(
        &self,
        q_mgr_name: &str,
        options: &ConnectOptions,
        hconn: &mut Hconn,
    ) -> Outcome<Status> {
        let mut name: [u8; MQ_Q_MGR_NAME_LENGTH] = ffi::chars(q_mgr_name);
        let mut cno = ffi::Mqcno {
            options: options.options,
            ..Default::default()
        };

        let mut channel = options.client.as_ref().map(ChannelImage::new).transpose()?;
        let mut credentials = match &options.client {
            Some(definition) => Credentials::new(definition)?,
            None => None,
        };
        let mut sco = options.ssl.as_ref().map(sco_image);
        if let Some(channel) = channel.as_mut() {
            cno.client_conn_ptr = (&mut channel.cd as *mut ffi::Mqcd).cast();
        }
        if let Some(credentials) = credentials.as_mut() {
            cno.security_parms_ptr = &mut credentials.csp;
        }
        if let Some(sco) = sco.as_mut() {
            cno.ssl_config_ptr = sco;
        }

        let mut handle = hconn.0;
        let (mut cc, mut rc) = (0, 0);
        // SAFETY: the connect options and everything they point to live
        // until the call returns
        unsafe {
            (self.entries.connx)(
                name.as_mut_ptr().cast(),
                &mut cno,
                &mut handle,
                &mut cc,
                &mut rc,
            )
        };
        *hconn = Hconn(handle);
        Ok(status(cc, rc))
    }

    fn put_inner(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        md: &mut MessageDescriptor,
        pmo: &mut PutOptions,
        buffer: &[u8],
    ) -> Outcome<Status> {
        let buffer_length = length(buffer.len())?;
        let mut md_image = md_image(md);
        let mut pmo_image = pmo_image(pmo);
        let (mut cc, mut rc) = (0, 0);
        // SAFETY: the native layer only reads `buffer_length` bytes of the
        // message data
        unsafe {
            (self.entries.put)(
                hconn.0,
                hobj.0,
                md_image.0.as_mut_ptr().cast(),
                &mut pmo_image,
                buffer_length,
                buffer.as_ptr() as *mut c_void,
                &mut cc,
                &mut rc,
            )
        };
        md_restore(md, &md_image);
        pmo_restore(pmo, &pmo_image);
        Ok(status(cc, rc))
    }

    fn put1_inner(
        &self,
        hconn: Hconn,
        od: &mut ObjectDescriptor,
        md: &mut MessageDescriptor,
        pmo: &mut PutOptions,
        buffer: &[u8],
    ) -> Outcome<Status> {
        let buffer_length = length(buffer.len())?;
        let mut od_image = od_image(od);
        let mut md_image = md_image(md);
        let mut pmo_image = pmo_image(pmo);
        let (mut cc, mut rc) = (0, 0);
        // SAFETY: the native layer only reads `buffer_length` bytes of the
        // message data
        unsafe {
            (self.entries.put1)(
                hconn.0,
                &mut od_image,
                md_image.0.as_mut_ptr().cast(),
                &mut pmo_image,
                buffer_length,
                buffer.as_ptr() as *mut c_void,
                &mut cc,
                &mut rc,
            )
        };
        od_restore(od, &od_image);
        md_restore(md, &md_image);
        pmo_restore(pmo, &pmo_image);
        Ok(status(cc, rc))
    }

    fn get_inner(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        md: &mut MessageDescriptor,
        gmo: &mut GetOptions,
        buffer: &mut [u8],
        data_length: &mut usize,
    ) -> Outcome<Status> {
        let buffer_length = length(buffer.len())?;
        md.msg_id = gmo.msg_id;
        md.correl_id = gmo.correl_id;
        let mut md_image = md_image(md);
        let mut gmo_image = ffi::Mqgmo {
            struc_id: *b"GMO ",
            version: ffi::MQGMO_VERSION_2,
            options: gmo.options,
            wait_interval: gmo.wait_interval,
            signal1: 0,
            signal2: 0,
            resolved_q_name: ffi::chars(""),
            match_options: gmo.match_options,
            group_status: b' ',
            segment_status: b' ',
            segmentation: b' ',
            reserved1: b' ',
        };
        let mut received = 0;
        let (mut cc, mut rc) = (0, 0);
        // SAFETY: the native layer writes at most `buffer_length` bytes
        unsafe {
            (self.entries.get)(
                hconn.0,
                hobj.0,
                md_image.0.as_mut_ptr().cast(),
                &mut gmo_image,
                buffer_length,
                buffer.as_mut_ptr().cast(),
                &mut received,
                &mut cc,
                &mut rc,
            )
        };
        md_restore(md, &md_image);
        gmo.resolved_q_name = ffi::text(&gmo_image.resolved_q_name);
        *data_length = usize::try_from(received).unwrap_or(0);
        Ok(status(cc, rc))
    }

    fn inq_inner(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        selectors: &[Selector],
        values: &mut Vec<AttributeValue>,
    ) -> Outcome<Status> {
        let mut raw: Vec<MqLong> = selectors.iter().map(Selector::as_raw).collect();
        let mut int_attrs: Vec<MqLong> = vec![0; selectors.iter().filter(|s| !s.is_string()).count()];
        let mut char_attrs: Vec<u8> = vec![
            b' ';
            selectors
                .iter()
                .filter(|s| s.is_string())
                .map(|s| char_attr_length(*s))
                .sum()
        ];
        let (mut cc, mut rc) = (0, 0);
        // SAFETY: each array holds the number of entries announced with it
        unsafe {
            (self.entries.inq)(
                hconn.0,
                hobj.0,
                length(raw.len())?,
                raw.as_mut_ptr(),
                length(int_attrs.len())?,
                int_attrs.as_mut_ptr(),
                length(char_attrs.len())?,
                char_attrs.as_mut_ptr().cast(),
                &mut cc,
                &mut rc,
            )
        };
        let status = check(status(cc, rc))?;

        values.clear();
        let mut ints = int_attrs.into_iter();
        let mut offset = 0;
        for selector in selectors {
            if selector.is_string() {
                let end = offset + char_attr_length(*selector);
                values.push(AttributeValue::String(ffi::text(&char_attrs[offset..end])));
                offset = end;
            } else {
                values.push(AttributeValue::Integer(ints.next().unwrap_or_default()));
            }
        }
        Ok(status)
    }

    fn execute_inner(
        &self,
        hconn: Hconn,
        command: &Command,
        responses: &mut Vec<Parameters>,
    ) -> Outcome<Status> {
        let admin = Bag::create(&self.entries)?;
        let response = Bag::create(&self.entries)?;
        match command {
            Command::PingQueueManager => {}
            Command::Escape {
                escape_type,
                escape_text,
            } => {
                admin.add_integer(ffi::MQIACF_ESCAPE_TYPE, *escape_type)?;
                admin.add_string(ffi::MQCACF_ESCAPE_TEXT, escape_text)?;
            }
            Command::InquireQueueNames { q_name, q_type } => {
                admin.add_string(MQCA_Q_NAME, q_name)?;
                if let Some(q_type) = q_type {
                    admin.add_integer(MQIA_Q_TYPE, *q_type)?;
                }
            }
            Command::ClearQueue { q_name } => {
                admin.add_string(MQCA_Q_NAME, q_name)?;
            }
        }

        let (mut cc, mut rc) = (0, 0);
        // SAFETY: both bags are live for the duration of the call
        unsafe {
            (self.entries.execute)(
                hconn.0,
                command.code(),
                ffi::MQHB_NONE,
                admin.handle,
                response.handle,
                MQHO_NONE,
                MQHO_NONE,
                &mut cc,
                &mut rc,
            )
        };
        let status = status(cc, rc);

        // Failed commands still carry the command server's responses
        let records = count_items(&self.entries, response.handle, ffi::MQHA_BAG_HANDLE)?;
        for index in 0..records {
            let record = inquire_bag(&self.entries, response.handle, index)?;
            let mut parameters = Parameters::new();
            match command {
                Command::Escape { .. } => {
                    for item in 0..count_items(&self.entries, record, ffi::MQCACF_ESCAPE_TEXT)? {
                        let text =
                            inquire_string(&self.entries, record, ffi::MQCACF_ESCAPE_TEXT, item)?;
                        parameters.insert(ESCAPE_TEXT.into(), ParameterValue::String(text));
                    }
                }
                Command::InquireQueueNames { .. } => {
                    let mut names = Vec::new();
                    for item in 0..count_items(&self.entries, record, ffi::MQCACF_Q_NAMES)? {
                        names.push(inquire_string(&self.entries, record, ffi::MQCACF_Q_NAMES, item)?);
                    }
                    parameters.insert(Q_NAMES.into(), ParameterValue::StringList(names));
                }
                Command::PingQueueManager | Command::ClearQueue { .. } => {}
            }
            if !parameters.is_empty() {
                responses.push(parameters);
            }
        }
        Ok(status)
    }
}

impl Mqi for NativeMqi {
    fn connx(&self, q_mgr_name: &str, options: &ConnectOptions, hconn: &mut Hconn) -> Status {
        outcome(self.connx_inner(q_mgr_name, options, hconn))
    }

    fn disc(&self, hconn: &mut Hconn) -> Status {
        let mut handle = hconn.0;
        let (mut cc, mut rc) = (0, 0);
        // SAFETY: every pointer refers to a live local
        unsafe { (self.entries.disc)(&mut handle, &mut cc, &mut rc) };
        *hconn = Hconn(handle);
        status(cc, rc)
    }

    fn open(
        &self,
        hconn: Hconn,
        od: &mut ObjectDescriptor,
        options: MqLong,
        hobj: &mut Hobj,
    ) -> Status {
        let mut image = od_image(od);
        let mut handle = hobj.0;
        let (mut cc, mut rc) = (0, 0);
        // SAFETY: every pointer refers to a live local
        unsafe { (self.entries.open)(hconn.0, &mut image, options, &mut handle, &mut cc, &mut rc) };
        *hobj = Hobj(handle);
        od_restore(od, &image);
        status(cc, rc)
    }

    fn close(&self, hconn: Hconn, hobj: &mut Hobj, options: MqLong) -> Status {
        let mut handle = hobj.0;
        let (mut cc, mut rc) = (0, 0);
        // SAFETY: every pointer refers to a live local
        unsafe { (self.entries.close)(hconn.0, &mut handle, options, &mut cc, &mut rc) };
        *hobj = Hobj(handle);
        status(cc, rc)
    }

    fn put(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        md: &mut MessageDescriptor,
        pmo: &mut PutOptions,
        buffer: &[u8],
    ) -> Status {
        outcome(self.put_inner(hconn, hobj, md, pmo, buffer))
    }

    fn put1(
        &self,
        hconn: Hconn,
        od: &mut ObjectDescriptor,
        md: &mut MessageDescriptor,
        pmo: &mut PutOptions,
        buffer: &[u8],
    ) -> Status {
        outcome(self.put1_inner(hconn, od, md, pmo, buffer))
    }

    fn get(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        md: &mut MessageDescriptor,
        gmo: &mut GetOptions,
        buffer: &mut [u8],
        data_length: &mut usize,
    ) -> Status {
        outcome(self.get_inner(hconn, hobj, md, gmo, buffer, data_length))
    }

    fn inq(
        &self,
        hconn: Hconn,
        hobj: Hobj,
        selectors: &[Selector],
        values: &mut Vec<AttributeValue>,
    ) -> Status {
        outcome(self.inq_inner(hconn, hobj, selectors, values))
    }

    fn begin(&self, hconn: Hconn) -> Status {
        let mut bo = ffi::Mqbo::default();
        let (mut cc, mut rc) = (0, 0);
        // SAFETY: every pointer refers to a live local
        unsafe { (self.entries.begin)(hconn.0, &mut bo, &mut cc, &mut rc) };
        status(cc, rc)
    }

    fn cmit(&self, hconn: Hconn) -> Status {
        let (mut cc, mut rc) = (0, 0);
        // SAFETY: every pointer refers to a live local
        unsafe { (self.entries.cmit)(hconn.0, &mut cc, &mut rc) };
        status(cc, rc)
    }

    fn back(&self, hconn: Hconn) -> Status {
        let (mut cc, mut rc) = (0, 0);
        // SAFETY: every pointer refers to a live local
        unsafe { (self.entries.back)(hconn.0, &mut cc, &mut rc) };
        status(cc, rc)
    }

    fn execute(&self, hconn: Hconn, command: &Command, responses: &mut Vec<Parameters>) -> Status {
        outcome(self.execute_inner(hconn, command, responses))
    }
}

#[cfg(test)]
mod tests {
    use wmq_types::options::TransportType;

    use super::*;

    #[test]
    fn library_follows_connection_kind() {
        let server = Builder::new().q_mgr_name("QM1");
        assert_eq!(LibraryKind::for_builder(&server), LibraryKind::Server);

        let client = Builder::new()
            .q_mgr_name("QM1")
            .connection_name("localhost(1414)");
        assert_eq!(LibraryKind::for_builder(&client), LibraryKind::Client);

        let channel_only = Builder::new().channel_name("APP.SVRCONN");
        assert_eq!(LibraryKind::for_builder(&channel_only), LibraryKind::Client);

        let transport_only = Builder::new().transport_type(TransportType::Tcp);
        assert_eq!(LibraryKind::for_builder(&transport_only), LibraryKind::Client);

        let options = client.build_connect_options().unwrap();
        assert_eq!(LibraryKind::for_options(&options), LibraryKind::Client);
        assert_eq!(
            LibraryKind::for_options(&ConnectOptions::default()),
            LibraryKind::Server
        );
    }

    #[test]
    fn library_names() {
        let server = LibraryKind::Server.library_name();
        let client = LibraryKind::Client.library_name();
        assert_ne!(server, client);

        if cfg!(target_os = "windows") {
            assert_eq!(server, "mqm.dll");
            assert_eq!(client, "mqic.dll");
        } else {
            assert!(server.starts_with("libmqm_r."));
            assert!(client.starts_with("libmqic_r."));
        }
    }

    #[test]
    fn missing_library_is_a_config_error() {
        let err = NativeMqi::load_from("/nonexistent/wmq/libmqm_r.so").unwrap_err();
        match &err {
            Error::Config(message) => assert!(message.contains("/nonexistent/wmq/libmqm_r.so")),
            other => panic!("expected a config error, got {:?}", other),
        }
        assert_eq!(err.kind(), crate::ErrorKind::Permanent);
    }

    #[test]
    fn descriptor_image_keeps_fields() {
        let mut md = MessageDescriptor {
            priority: 7,
            ..Default::default()
        };
        md.msg_id[0] = 1;
        let image = md_image(&md);
        assert_eq!(&image.0[..4], b"MD  ");

        let mut restored = MessageDescriptor::default();
        md_restore(&mut restored, &image);
        assert_eq!(restored.priority, 7);
        assert_eq!(restored.msg_id, md.msg_id);
    }

    #[test]
    fn object_descriptor_image() {
        let mut od = ObjectDescriptor {
            object_name: "APP.MODEL".into(),
            ..Default::default()
        };
        let mut image = od_image(&od);
        assert_eq!(ffi::text(&image.dynamic_q_name), "AMQ.*");

        image.object_name = ffi::chars("AMQ.5F3A0001");
        image.resolved_q_name = ffi::chars("AMQ.5F3A0001");
        od_restore(&mut od, &image);
        assert_eq!(od.object_name, "AMQ.5F3A0001");
        assert_eq!(od.resolved_q_name, "AMQ.5F3A0001");
    }

    #[test]
    fn channel_image_copies_client_fields() {
        let definition = ChannelDefinition {
            channel_name: "APP.SVRCONN".into(),
            connection_name: "mq1(1414),mq2(1414)".into(),
            heartbeat_interval: Some(60),
            ssl_peer_name: Some("CN=QM1".into()),
            ..Default::default()
        };
        let image = ChannelImage::new(&definition).unwrap();
        assert_eq!(ffi::text(&image.cd.channel_name), "APP.SVRCONN");
        assert_eq!(ffi::text(&image.cd.connection_name), "mq1(1414),mq2(1414)");
        assert_eq!(image.cd.heartbeat_interval, 60);
        assert_eq!(image.cd.ssl_peer_name_length, 6);
        assert!(!image.cd.ssl_peer_name_ptr.is_null());
        assert!(image.cd.long_remote_user_id_ptr.is_null());
    }
}
