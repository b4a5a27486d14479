pub mod books;
pub mod covers;
pub mod files;
pub mod meta;
