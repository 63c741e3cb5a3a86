mod service_lifecycle;
mod store_files;
mod support;
