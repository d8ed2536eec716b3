mod core;
mod file;

pub(crate) use self::core::{
    native_new_array, native_new_exception, native_new_object, native_print, native_println,
};
pub(crate) use self::file::{
    FileTable, define_std_streams, native_fclose, native_fgets, native_fopen, native_fputs,
};
pub use self::file::FILE_POINTER_INFO;
