pub type CmdResult<T> = bridge_callback::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

pub mod classify;
pub mod error;
pub mod send;
pub mod watch;
