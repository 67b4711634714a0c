pub(crate) mod soft;
pub(crate) type Backend<'a, R> = soft::Backend<'a, R>;
