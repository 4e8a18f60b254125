/// Declares the reason-code constants together with the static lookup table
/// that maps each code to its symbolic name and severity class.
///
/// Entries must be listed in ascending numeric order; the lookup is a binary
/// search over the generated table.
macro_rules! reason_codes {
    ($($name:ident = $code:literal => $class:ident),* $(,)?) => {
        impl ReasonCode {
            $(
                #[doc = concat!("`MQRC_", stringify!($name), "` (", stringify!($code), ")")]
                pub const $name: ReasonCode = ReasonCode($code);
            )*
        }

        pub(crate) static REASON_TABLE: &[(MqLong, &str, ReasonClass)] = &[
            $(($code, concat!("MQRC_", stringify!($name)), ReasonClass::$class)),*
        ];
    };
}
