pub mod image_avatar_writer;
