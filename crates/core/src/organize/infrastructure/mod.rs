pub mod filesystem_materializer;
