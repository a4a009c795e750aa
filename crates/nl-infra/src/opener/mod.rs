pub mod process_opener;

pub use process_opener::ProcessOpener;
