pub mod file_handler;

pub use file_handler::{
    __path_clear_files, __path_delete_file, __path_list_files, __path_serve_file,
    __path_upload_file, clear_files, delete_file, list_files, serve_file, upload_file,
};
