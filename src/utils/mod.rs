pub(crate) mod format;
pub(crate) mod timezone;

pub(crate) use format::format_bytes;
pub(crate) use timezone::Timezone;
